//! Top-level console facade tying the shell, buffer, history, bridge, and
//! script runner together for a host application.

use std::time::Instant;

use crate::boot::run_boot_lines;
use crate::bridge::{BridgeHandle, ThreadBridge};
use crate::buffer::{LogBuffer, LogKind};
use crate::commands::register_builtins;
use crate::config::ConsoleConfig;
use crate::history::History;
use crate::script::{ScriptLibrary, ScriptRunner};
use crate::shell::{Environment, Shell};

/// An embeddable command console.
///
/// The host owns one `Console` on a single thread. Other threads get a
/// [`BridgeHandle`] from [`Console::handle`] and everything they enqueue is
/// applied during [`Console::tick`]. Builtins are pre-registered; domain
/// commands are added through the public `shell` field.
pub struct Console {
    pub shell: Shell,
    pub buffer: LogBuffer,
    pub history: History,
    pub library: ScriptLibrary,
    runner: ScriptRunner,
    bridge: ThreadBridge,
}

impl Console {
    pub fn new(config: &ConsoleConfig) -> Self {
        let mut shell = Shell::new();
        register_builtins(&mut shell);
        Self {
            shell,
            buffer: LogBuffer::new(config.buffer_capacity),
            history: History::new(),
            library: ScriptLibrary::new(),
            runner: ScriptRunner::new(config.completion_window()),
            bridge: ThreadBridge::new(),
        }
    }

    /// A clonable producer handle for other threads.
    pub fn handle(&self) -> BridgeHandle {
        self.bridge.handle()
    }

    /// Submit one interactive line: echo it, record it in history, and
    /// dispatch it. Latched errors surface as error log entries.
    pub fn submit(&mut self, line: &str) {
        let line = line.trim();
        if line.is_empty() {
            return;
        }
        self.buffer.log(LogKind::Input, line);
        self.history.push(line);

        let mut env = Environment {
            buffer: &mut self.buffer,
            history: &mut self.history,
            bridge: self.bridge.handle(),
            library: &self.library,
            script_requests: Vec::new(),
        };
        self.shell.run(line, &mut env);
        if let Some(error) = self.shell.take_error() {
            env.buffer.log(LogKind::Error, error.to_string());
        }
        let requests = std::mem::take(&mut env.script_requests);
        drop(env);
        self.start_scripts(requests);
    }

    /// Run a boot script synchronously. Returns the number of lines run.
    pub fn run_boot(&mut self, source: &str) -> usize {
        let mut env = Environment {
            buffer: &mut self.buffer,
            history: &mut self.history,
            bridge: self.bridge.handle(),
            library: &self.library,
            script_requests: Vec::new(),
        };
        run_boot_lines(&mut self.shell, &mut env, source)
    }

    /// One host tick: drain the bridge, advance the script runner, and pick
    /// up any script start requested by a handler.
    ///
    /// Dispatch here is synchronous, so each stepped script line is
    /// acknowledged immediately after the step rather than waiting out the
    /// completion window.
    pub fn tick(&mut self, now: Instant) {
        let mut env = Environment {
            buffer: &mut self.buffer,
            history: &mut self.history,
            bridge: self.bridge.handle(),
            library: &self.library,
            script_requests: Vec::new(),
        };
        self.bridge.drain(&mut self.shell, &mut env);
        self.runner.step(&mut self.shell, &mut env, now);
        self.runner.notify_complete();

        let requests = std::mem::take(&mut env.script_requests);
        drop(env);
        self.start_scripts(requests);
    }

    /// Start requested scripts in arrival order. The first acceptable one
    /// wins; later requests hit the runner's busy-refusal warning instead of
    /// vanishing.
    fn start_scripts(&mut self, requests: Vec<String>) {
        for name in requests {
            self.runner
                .load_and_run(&name, &self.library, &mut self.buffer);
        }
    }

    /// Whether a script is currently queued or running.
    pub fn script_active(&self) -> bool {
        !self.runner.is_idle()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Instant;

    use super::*;
    use crate::shell::{CommandSpec, Handler};

    fn console() -> Console {
        Console::new(&ConsoleConfig::default())
    }

    fn texts(console: &Console) -> Vec<String> {
        console
            .buffer
            .live_entries()
            .map(|e| e.format_line())
            .collect()
    }

    #[test]
    fn submit_echoes_dispatches_and_records_history() {
        let mut console = console();
        console.submit("print hello");
        assert_eq!(texts(&console), ["> print hello", "hello"]);
        assert_eq!(console.history.entries(), ["print hello"]);
    }

    #[test]
    fn submit_surfaces_errors_in_the_buffer() {
        let mut console = console();
        console.submit("frobnicate");
        let lines = texts(&console);
        assert_eq!(lines[0], "> frobnicate");
        assert_eq!(lines[1], "[error] command FROBNICATE could not be found");
    }

    #[test]
    fn blank_submissions_do_nothing() {
        let mut console = console();
        console.submit("   ");
        assert!(texts(&console).is_empty());
        assert!(console.history.is_empty());
    }

    #[test]
    fn bridged_work_is_applied_on_tick() {
        let mut console = console();
        let handle = console.handle();
        handle.log("background note");
        handle.command("print bridged");

        console.tick(Instant::now());
        let lines = texts(&console);
        assert!(lines.contains(&"background note".to_string()));
        assert!(lines.contains(&"bridged".to_string()));
    }

    #[test]
    fn run_builtin_starts_a_script_that_ticks_to_completion() {
        let mut console = console();
        console.library.insert("demo", "print one\nprint two\n");

        console.submit("run demo");
        assert!(console.script_active());

        let start = Instant::now();
        for _ in 0..6 {
            console.tick(start);
        }
        assert!(!console.script_active());

        let lines = texts(&console);
        assert!(lines.contains(&"one".to_string()));
        assert!(lines.contains(&"two".to_string()));
    }

    #[test]
    fn bridged_run_commands_in_one_tick_start_first_and_refuse_second() {
        let mut console = console();
        console.library.insert("a", "print from-a\n");
        console.library.insert("b", "print from-b\n");

        let handle = console.handle();
        handle.command("run a");
        handle.command("run b");

        let start = Instant::now();
        for _ in 0..8 {
            console.tick(start);
        }
        assert!(!console.script_active());

        let lines = texts(&console);
        assert!(lines.contains(&"from-a".to_string()));
        assert!(!lines.contains(&"from-b".to_string()));
        assert!(
            lines
                .iter()
                .any(|l| l.contains("script b ignored") && l.starts_with("[warn]"))
        );
    }

    #[test]
    fn run_builtin_with_unknown_script_reports_error() {
        let mut console = console();
        console.submit("run ghost");
        assert!(!console.script_active());
        assert!(
            texts(&console)
                .iter()
                .any(|l| l.contains("script ghost could not be found"))
        );
    }

    #[test]
    fn boot_script_can_register_and_use_procedures() {
        let mut console = console();
        console.shell.add_procedure("greet", |args, env| {
            env.buffer
                .log(LogKind::Message, format!("hello {}", args[0].as_str()));
            Ok(())
        });
        let ran = console.run_boot(
            "# startup\nregister greet 1 1 \"Greets someone\"\ngreet console\n",
        );
        assert_eq!(ran, 2);
        assert!(texts(&console).contains(&"hello console".to_string()));
    }

    #[test]
    fn custom_commands_dispatch_through_the_environment() {
        let mut console = console();
        console.shell.register(CommandSpec::new(
            "shout",
            1,
            None,
            "Uppercase the arguments",
            Handler::func(|args, env| {
                let joined = args
                    .iter()
                    .map(|a| a.as_str().to_uppercase())
                    .collect::<Vec<_>>()
                    .join(" ");
                env.buffer.log(LogKind::Message, joined);
                Ok(())
            }),
        ));
        console.submit("shout loud words");
        assert!(texts(&console).contains(&"LOUD WORDS".to_string()));
    }
}
