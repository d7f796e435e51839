//! Named command scripts and the paced runner that executes them.
//!
//! A script is a plain text file of command lines. Blank lines and lines
//! starting with `#` are skipped. The runner dispatches one line per step
//! and then waits for a completion signal before moving on, with a soft
//! timeout so an unacknowledged line stalls the script only briefly.

use std::collections::VecDeque;
use std::fs;
use std::path::Path;
use std::time::{Duration, Instant};

use crate::buffer::{LogBuffer, LogKind};
use crate::shell::{Environment, Shell};

/// In-memory store of named scripts.
#[derive(Debug, Default)]
pub struct ScriptLibrary {
    scripts: std::collections::HashMap<String, String>,
}

impl ScriptLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a script under `name`.
    pub fn insert(&mut self, name: impl Into<String>, source: impl Into<String>) {
        self.scripts.insert(name.into(), source.into());
    }

    pub fn contains(&self, name: &str) -> bool {
        self.scripts.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.scripts.get(name).map(String::as_str)
    }

    /// Load every `*.{ext}` file in `dir` as a script named after its file
    /// stem. Returns the number of scripts loaded.
    pub fn load_dir(&mut self, dir: &Path, ext: &str) -> conch_types::Result<usize> {
        let mut loaded = 0;
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some(ext) {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let source = fs::read_to_string(&path)?;
            log::debug!("loaded script {stem:?} from {}", path.display());
            self.insert(stem, source);
            loaded += 1;
        }
        Ok(loaded)
    }
}

/// Executable lines of a script source: trimmed, with blanks and
/// `#`-comments removed.
pub fn script_lines(source: &str) -> Vec<String> {
    source
        .split(['\r', '\n'])
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}

enum RunnerState {
    Idle,
    /// Ready to dispatch the next queued line.
    Dispatching,
    /// A line was dispatched; waiting for completion or the deadline.
    Waiting {
        line: String,
        deadline: Instant,
        completed: bool,
    },
}

/// Steps one script at a time, one line per completion window.
pub struct ScriptRunner {
    queue: VecDeque<String>,
    state: RunnerState,
    completion_window: Duration,
}

impl ScriptRunner {
    pub fn new(completion_window: Duration) -> Self {
        Self {
            queue: VecDeque::new(),
            state: RunnerState::Idle,
            completion_window,
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.state, RunnerState::Idle) && self.queue.is_empty()
    }

    /// Queue the named script for execution. Refuses (with a log entry)
    /// when the script is unknown or another script is still running.
    /// Returns whether the script was accepted.
    pub fn load_and_run(
        &mut self,
        name: &str,
        library: &ScriptLibrary,
        buffer: &mut LogBuffer,
    ) -> bool {
        if !self.is_idle() {
            buffer.log(
                LogKind::Warning,
                format!("script {name} ignored, another script is still running"),
            );
            return false;
        }
        let Some(source) = library.get(name) else {
            buffer.log(
                LogKind::Error,
                format!("script {name} could not be found"),
            );
            return false;
        };
        self.queue.extend(script_lines(source));
        self.state = RunnerState::Dispatching;
        log::info!("running script {name:?} ({} lines)", self.queue.len());
        true
    }

    /// Mark the current line as complete so the next `step` advances
    /// without waiting out the window.
    pub fn notify_complete(&mut self) {
        if let RunnerState::Waiting { completed, .. } = &mut self.state {
            *completed = true;
        }
    }

    /// Advance the runner by at most one dispatched line.
    pub fn step(&mut self, shell: &mut Shell, env: &mut Environment<'_>, now: Instant) {
        match &self.state {
            RunnerState::Idle => {}
            RunnerState::Dispatching => {
                let Some(line) = self.queue.pop_front() else {
                    self.state = RunnerState::Idle;
                    return;
                };
                env.buffer.log(LogKind::Input, line.clone());
                shell.run(&line, env);
                if let Some(error) = shell.take_error() {
                    env.buffer.log(LogKind::Error, error.to_string());
                }
                self.state = RunnerState::Waiting {
                    line,
                    deadline: now + self.completion_window,
                    completed: false,
                };
            }
            RunnerState::Waiting {
                line,
                deadline,
                completed,
            } => {
                if *completed {
                    log::debug!("script line {line:?} completed");
                    self.state = RunnerState::Dispatching;
                } else if now >= *deadline {
                    // Soft timeout: warn and keep going.
                    env.buffer.log(
                        LogKind::Warning,
                        format!("script line {line:?} did not complete in time"),
                    );
                    self.state = RunnerState::Dispatching;
                }
            }
        }
    }
}
