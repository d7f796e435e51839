//! Boot sequence: feed a startup script straight through the shell.
//!
//! Boot lines run synchronously with no completion pacing; they are meant
//! for setup work such as `REGISTER` directives, which bind procedure
//! names to commands before the console goes interactive.

use crate::buffer::LogKind;
use crate::script::script_lines;
use crate::shell::{Environment, Shell};

/// Run every executable line of `source` through the shell, surfacing
/// latched errors into the buffer. Returns the number of lines run.
pub fn run_boot_lines(shell: &mut Shell, env: &mut Environment<'_>, source: &str) -> usize {
    let lines = script_lines(source);
    let count = lines.len();
    for line in lines {
        shell.run(&line, env);
        if let Some(error) = shell.take_error() {
            env.buffer.log(LogKind::Error, error.to_string());
        }
    }
    log::debug!("boot ran {count} lines");
    count
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::ThreadBridge;
    use crate::buffer::LogBuffer;
    use crate::commands::register_builtins;
    use crate::history::History;
    use crate::script::ScriptLibrary;

    #[test]
    fn boot_registers_commands_via_directive() {
        let mut shell = Shell::new();
        register_builtins(&mut shell);
        shell.add_procedure("greet", |args, env| {
            env.buffer.log(
                crate::buffer::LogKind::Message,
                format!("hello {}", args[0].as_str()),
            );
            Ok(())
        });

        let mut buffer = LogBuffer::new(32);
        let mut history = History::new();
        let library = ScriptLibrary::new();
        let bridge = ThreadBridge::new();
        let mut env = Environment {
            buffer: &mut buffer,
            history: &mut history,
            bridge: bridge.handle(),
            library: &library,
            script_requests: Vec::new(),
        };

        let source = "\
# boot script
register greet 1 1 \"Greets someone by name\"
greet world
";
        let ran = run_boot_lines(&mut shell, &mut env, source);
        assert_eq!(ran, 2);
        assert!(shell.contains("GREET"));
        assert!(
            buffer
                .live_entries()
                .any(|e| e.text == "hello world")
        );
    }

    #[test]
    fn boot_errors_are_logged_and_do_not_abort() {
        let mut shell = Shell::new();
        register_builtins(&mut shell);

        let mut buffer = LogBuffer::new(32);
        let mut history = History::new();
        let library = ScriptLibrary::new();
        let bridge = ThreadBridge::new();
        let mut env = Environment {
            buffer: &mut buffer,
            history: &mut history,
            bridge: bridge.handle(),
            library: &library,
            script_requests: Vec::new(),
        };

        run_boot_lines(&mut shell, &mut env, "missing\nprint survived\n");
        assert!(
            buffer
                .live_entries()
                .any(|e| e.kind == LogKind::Error && e.text.contains("MISSING"))
        );
        assert!(buffer.live_entries().any(|e| e.text == "survived"));
    }

    #[test]
    fn blank_sources_run_nothing() {
        let mut shell = Shell::new();
        let mut buffer = LogBuffer::new(8);
        let mut history = History::new();
        let library = ScriptLibrary::new();
        let bridge = ThreadBridge::new();
        let mut env = Environment {
            buffer: &mut buffer,
            history: &mut history,
            bridge: bridge.handle(),
            library: &library,
            script_requests: Vec::new(),
        };
        assert_eq!(run_boot_lines(&mut shell, &mut env, "# only comments\n\n"), 0);
    }
}
