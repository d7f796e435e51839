//! External process launcher with a bounded concurrency pool.
//!
//! Each launch runs on its own thread, gated by a counting semaphore so at
//! most `max_processes` children run at once. Child stdout is streamed to
//! the bridge line by line; stderr is collected and reported as a single
//! error entry after the child exits.

use std::io::{BufRead, BufReader, Read};
use std::process::{Command, Stdio};
use std::sync::{Arc, Condvar, Mutex, PoisonError};
use std::thread::{self, JoinHandle};

use crate::bridge::BridgeHandle;

struct Semaphore {
    count: Mutex<usize>,
    available: Condvar,
}

/// Holds one semaphore slot; released on drop.
struct Permit<'a> {
    semaphore: &'a Semaphore,
}

impl Semaphore {
    fn new(count: usize) -> Self {
        Self {
            count: Mutex::new(count),
            available: Condvar::new(),
        }
    }

    fn acquire(&self) -> Permit<'_> {
        let mut count = self.count.lock().unwrap_or_else(PoisonError::into_inner);
        while *count == 0 {
            count = self
                .available
                .wait(count)
                .unwrap_or_else(PoisonError::into_inner);
        }
        *count -= 1;
        Permit { semaphore: self }
    }
}

impl Drop for Permit<'_> {
    fn drop(&mut self) {
        let mut count = self
            .semaphore
            .count
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        *count += 1;
        self.semaphore.available.notify_one();
    }
}

/// Launches external programs, at most `max_processes` at a time.
pub struct ProcessPool {
    permits: Arc<Semaphore>,
}

impl ProcessPool {
    pub fn new(max_processes: usize) -> Self {
        Self {
            permits: Arc::new(Semaphore::new(max_processes.max(1))),
        }
    }

    /// Spawn `program` with `args` on a worker thread. The thread blocks
    /// until a pool slot is free, then streams output through `bridge`.
    pub fn launch(
        &self,
        program: impl Into<String>,
        args: Vec<String>,
        bridge: BridgeHandle,
    ) -> JoinHandle<()> {
        let permits = Arc::clone(&self.permits);
        let program = program.into();
        thread::spawn(move || {
            let _permit = permits.acquire();
            run_child(&program, &args, &bridge);
        })
    }
}

fn run_child(program: &str, args: &[String], bridge: &BridgeHandle) {
    let spawned = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn();

    let mut child = match spawned {
        Ok(child) => child,
        Err(error) => {
            bridge.log_error(format!("failed to start {program}: {error}"));
            return;
        }
    };
    log::debug!("started process {program}");

    if let Some(stdout) = child.stdout.take() {
        for line in BufReader::new(stdout).lines() {
            match line {
                Ok(line) => bridge.log(line),
                Err(error) => {
                    bridge.log_error(format!("reading {program} output: {error}"));
                    break;
                }
            }
        }
    }

    // Stderr is reported whole, as one entry, after stdout closes.
    if let Some(mut stderr) = child.stderr.take() {
        let mut captured = String::new();
        if stderr.read_to_string(&mut captured).is_ok() {
            let captured = captured.trim();
            if !captured.is_empty() {
                bridge.log_error(format!("{program}: {captured}"));
            }
        }
    }

    match child.wait() {
        Ok(status) => log::debug!("process {program} exited with {status}"),
        Err(error) => bridge.log_error(format!("waiting on {program}: {error}")),
    }
}
