//! Built-in commands.
//!
//! Builtins that need access to the registry itself (help listings,
//! registration) dispatch through [`Builtin`] markers handled inside the
//! shell rather than through boxed closures; they still go through the same
//! descriptor and arity machinery as every other command.

use crate::arg::{Argument, join_arguments};
use crate::buffer::LogKind;
use crate::shell::{CommandSpec, Environment, Handler, Shell, ShellError};

/// Marker for a built-in command implementation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
    /// `help [name]`
    Help,
    /// `clear [--reset]`
    Clear,
    /// `print <text...>` / `echo <text...>`
    Print,
    /// `register <name> <min> <max> <help>`
    Register,
    /// `unregister <name>`
    Unregister,
    /// `history [clear]`
    History,
    /// `run <script>`
    Run,
}

/// Register all built-in commands into a shell.
pub fn register_builtins(shell: &mut Shell) {
    shell.register(CommandSpec::new(
        "help",
        0,
        Some(1),
        "Lists all commands, or displays help for one",
        Handler::Builtin(Builtin::Help),
    ));
    shell.register(CommandSpec::new(
        "clear",
        0,
        Some(1),
        "Archives the live log; 'clear --reset' hard-resets the buffer",
        Handler::Builtin(Builtin::Clear),
    ));
    shell.register(CommandSpec::new(
        "print",
        1,
        None,
        "Outputs a message",
        Handler::Builtin(Builtin::Print),
    ));
    shell.register(CommandSpec::new(
        "echo",
        1,
        None,
        "Outputs a message",
        Handler::Builtin(Builtin::Print),
    ));
    shell.register(CommandSpec::new(
        "register",
        4,
        Some(4),
        "Binds a known procedure: register <name> <min> <max> <help>",
        Handler::Builtin(Builtin::Register),
    ));
    shell.register(CommandSpec::new(
        "unregister",
        1,
        Some(1),
        "Removes a registered command",
        Handler::Builtin(Builtin::Unregister),
    ));
    shell.register(CommandSpec::new(
        "history",
        0,
        Some(1),
        "Lists submitted lines; 'history clear' empties the list",
        Handler::Builtin(Builtin::History),
    ));
    shell.register(CommandSpec::new(
        "run",
        1,
        Some(1),
        "Replays a named script through the console",
        Handler::Builtin(Builtin::Run),
    ));
}

impl Shell {
    /// Execute a built-in. Arity has already been validated by the caller.
    pub(crate) fn run_builtin(
        &mut self,
        builtin: Builtin,
        args: &[Argument],
        env: &mut Environment<'_>,
    ) {
        match builtin {
            Builtin::Help => self.builtin_help(args, env),
            Builtin::Clear => self.builtin_clear(args, env),
            Builtin::Print => env.buffer.log(LogKind::Message, join_arguments(args)),
            Builtin::Register => self.builtin_register(args, env),
            Builtin::Unregister => self.builtin_unregister(args, env),
            Builtin::History => self.builtin_history(args, env),
            Builtin::Run => self.builtin_run(args, env),
        }
    }

    fn builtin_help(&mut self, args: &[Argument], env: &mut Environment<'_>) {
        let Some(arg) = args.first() else {
            for (name, help) in self.list_commands() {
                env.buffer.log(LogKind::Shell, format!("{name:<16} {help}"));
            }
            return;
        };
        let key = arg.as_str().to_uppercase();
        match self.commands.get(&key) {
            Some(spec) if spec.help().is_empty() => {
                env.buffer.log(
                    LogKind::Shell,
                    format!("{key} does not provide any help documentation"),
                );
            },
            Some(spec) => {
                let help = spec.help().to_string();
                env.buffer.log(LogKind::Shell, help);
            },
            None => self.latch(ShellError::UnknownCommand(key)),
        }
    }

    fn builtin_clear(&mut self, args: &[Argument], env: &mut Environment<'_>) {
        match args.first().map(Argument::as_str) {
            None => env.buffer.archive(),
            Some("--reset") => env.buffer.reset(),
            Some(other) => self.latch(ShellError::Failed(format!("unknown clear option: {other}"))),
        }
    }

    fn builtin_register(&mut self, args: &[Argument], env: &mut Environment<'_>) {
        let name = args[0].as_str().to_uppercase();
        let Some(&procedure) = self.procedures.get(&name) else {
            self.latch(ShellError::MissingHandlerBinding(name));
            return;
        };

        let min_args = args[1].as_int().max(0) as usize;
        // A negative max is the unbounded sentinel.
        let raw_max = args[2].as_int();
        let max_args = if raw_max < 0 {
            None
        } else {
            Some(raw_max as usize)
        };
        if let Some(max) = max_args
            && min_args > max
        {
            self.latch(ShellError::Failed(format!(
                "register {name}: min {min_args} exceeds max {max}"
            )));
            return;
        }

        let spec = CommandSpec::new(
            &name,
            min_args,
            max_args,
            args[3].as_str(),
            Handler::func(procedure),
        );
        if self.register(spec) {
            log::info!("registered command {name} via directive");
            env.buffer.log(LogKind::Shell, format!("register: \"{name}\""));
        }
    }

    fn builtin_unregister(&mut self, args: &[Argument], env: &mut Environment<'_>) {
        let name = args[0].as_str().to_uppercase();
        if self.unregister(&name) {
            env.buffer
                .log(LogKind::Shell, format!("unregister: \"{name}\""));
        }
    }

    fn builtin_history(&mut self, args: &[Argument], env: &mut Environment<'_>) {
        match args.first().map(Argument::as_str) {
            None => {
                if env.history.is_empty() {
                    env.buffer.log(LogKind::Shell, "(no history)");
                    return;
                }
                let numbered: Vec<String> = env
                    .history
                    .entries()
                    .iter()
                    .enumerate()
                    .map(|(i, line)| format!("{:4}  {line}", i + 1))
                    .collect();
                for line in numbered {
                    env.buffer.log(LogKind::Shell, line);
                }
            },
            Some("clear") => {
                env.history.clear();
                env.buffer.log(LogKind::Shell, "history cleared");
            },
            Some(other) => {
                self.latch(ShellError::Failed(format!(
                    "unknown history option: {other}"
                )));
            },
        }
    }

    fn builtin_run(&mut self, args: &[Argument], env: &mut Environment<'_>) {
        let name = args[0].as_str();
        if !env.library.contains(name) {
            self.latch(ShellError::ScriptNotFound(name.to_string()));
            return;
        }
        env.script_requests.push(name.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::ThreadBridge;
    use crate::buffer::LogBuffer;
    use crate::history::History;
    use crate::script::ScriptLibrary;

    struct Fixture {
        buffer: LogBuffer,
        history: History,
        library: ScriptLibrary,
        bridge: ThreadBridge,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                buffer: LogBuffer::new(64),
                history: History::new(),
                library: ScriptLibrary::new(),
                bridge: ThreadBridge::new(),
            }
        }

        fn env(&mut self) -> Environment<'_> {
            Environment {
                buffer: &mut self.buffer,
                history: &mut self.history,
                bridge: self.bridge.handle(),
                library: &self.library,
                script_requests: Vec::new(),
            }
        }

        fn lines(&self) -> Vec<String> {
            self.buffer.live_entries().map(|e| e.text.clone()).collect()
        }
    }

    fn shell_with_builtins() -> Shell {
        let mut shell = Shell::new();
        register_builtins(&mut shell);
        shell
    }

    fn greet(args: &[Argument], env: &mut Environment<'_>) -> Result<(), ShellError> {
        env.buffer
            .log(LogKind::Message, format!("hello {}", args[0].as_str()));
        Ok(())
    }

    #[test]
    fn print_and_echo_log_joined_text() {
        let mut shell = shell_with_builtins();
        let mut fixture = Fixture::new();
        shell.run("print one \"two three\"", &mut fixture.env());
        shell.run("echo four", &mut fixture.env());
        assert_eq!(fixture.lines(), ["one two three", "four"]);
    }

    #[test]
    fn print_without_text_is_an_arity_error() {
        let mut shell = shell_with_builtins();
        let mut fixture = Fixture::new();
        shell.run("print", &mut fixture.env());
        assert_eq!(
            shell.error_message().as_deref(),
            Some("PRINT requires at least 1 argument")
        );
    }

    #[test]
    fn help_lists_every_registered_command() {
        let mut shell = shell_with_builtins();
        let mut fixture = Fixture::new();
        shell.run("help", &mut fixture.env());
        let lines = fixture.lines();
        assert_eq!(lines.len(), shell.list_commands().len());
        assert!(lines.iter().any(|l| l.starts_with("CLEAR")));
        assert!(lines.iter().any(|l| l.starts_with("REGISTER")));
    }

    #[test]
    fn help_for_one_command_shows_its_text() {
        let mut shell = shell_with_builtins();
        let mut fixture = Fixture::new();
        shell.run("help print", &mut fixture.env());
        assert_eq!(fixture.lines(), ["Outputs a message"]);
    }

    #[test]
    fn help_for_unknown_command_is_latched() {
        let mut shell = shell_with_builtins();
        let mut fixture = Fixture::new();
        shell.run("help nothing", &mut fixture.env());
        assert_eq!(
            shell.take_error(),
            Some(ShellError::UnknownCommand("NOTHING".into()))
        );
    }

    #[test]
    fn clear_archives_and_clear_reset_wipes() {
        let mut shell = shell_with_builtins();
        let mut fixture = Fixture::new();
        shell.run("print keep me", &mut fixture.env());
        shell.run("clear", &mut fixture.env());
        assert_eq!(fixture.buffer.live_len(), 0);
        assert_eq!(fixture.buffer.archive_len(), 1);

        shell.run("print more", &mut fixture.env());
        shell.run("clear --reset", &mut fixture.env());
        assert_eq!(fixture.buffer.live_len(), 0);
        assert_eq!(fixture.buffer.archive_len(), 0);
    }

    #[test]
    fn register_directive_binds_a_known_procedure() {
        let mut shell = shell_with_builtins();
        shell.add_procedure("greet", greet);
        let mut fixture = Fixture::new();

        shell.run("register greet 1 1 \"Greets someone\"", &mut fixture.env());
        assert!(shell.last_error().is_none());
        assert!(shell.contains("GREET"));

        shell.run("greet world", &mut fixture.env());
        assert!(fixture.lines().contains(&"hello world".to_string()));

        // The new command carries the directive's arity contract.
        shell.run("greet a b", &mut fixture.env());
        assert_eq!(
            shell.error_message().as_deref(),
            Some("GREET requires exactly 1 argument")
        );
    }

    #[test]
    fn register_directive_with_unknown_procedure_is_latched() {
        let mut shell = shell_with_builtins();
        let mut fixture = Fixture::new();
        shell.run("register mystery 0 0 \"no binding\"", &mut fixture.env());
        assert_eq!(
            shell.take_error(),
            Some(ShellError::MissingHandlerBinding("MYSTERY".into()))
        );
        assert!(!shell.contains("MYSTERY"));
    }

    #[test]
    fn register_directive_negative_max_is_unbounded() {
        let mut shell = shell_with_builtins();
        shell.add_procedure("greet", greet);
        let mut fixture = Fixture::new();
        shell.run("register greet 1 -1 \"Greets many\"", &mut fixture.env());
        assert!(shell.last_error().is_none());
        shell.run("greet a b c d e f", &mut fixture.env());
        assert!(shell.last_error().is_none());
    }

    #[test]
    fn unregister_removes_and_reports() {
        let mut shell = shell_with_builtins();
        shell.add_procedure("greet", greet);
        let mut fixture = Fixture::new();
        shell.run("register greet 1 1 \"Greets someone\"", &mut fixture.env());
        shell.run("unregister greet", &mut fixture.env());
        assert!(shell.last_error().is_none());
        assert!(!shell.contains("GREET"));

        shell.run("unregister greet", &mut fixture.env());
        assert_eq!(
            shell.take_error(),
            Some(ShellError::NotFound("GREET".into()))
        );
    }

    #[test]
    fn history_builtin_lists_and_clears() {
        let mut shell = shell_with_builtins();
        let mut fixture = Fixture::new();
        fixture.history.push("print hi");
        fixture.history.push("help");

        shell.run("history", &mut fixture.env());
        let lines = fixture.lines();
        assert!(lines.iter().any(|l| l.contains("print hi")));
        assert!(lines.iter().any(|l| l.contains("help")));

        shell.run("history clear", &mut fixture.env());
        assert!(fixture.history.is_empty());
    }

    #[test]
    fn run_builtin_requests_a_known_script() {
        let mut shell = shell_with_builtins();
        let mut fixture = Fixture::new();
        fixture.library.insert("boot", "print booted");
        let mut env = fixture.env();
        shell.run("run boot", &mut env);
        assert_eq!(env.script_requests, ["boot"]);
    }

    #[test]
    fn run_builtin_keeps_every_request_in_order() {
        let mut shell = shell_with_builtins();
        let mut fixture = Fixture::new();
        fixture.library.insert("a", "print from-a");
        fixture.library.insert("b", "print from-b");
        let mut env = fixture.env();
        shell.run("run a", &mut env);
        shell.run("run b", &mut env);
        assert_eq!(env.script_requests, ["a", "b"]);
    }

    #[test]
    fn run_builtin_latches_missing_script() {
        let mut shell = shell_with_builtins();
        let mut fixture = Fixture::new();
        let mut env = fixture.env();
        shell.run("run ghost", &mut env);
        assert!(env.script_requests.is_empty());
        assert_eq!(
            shell.take_error(),
            Some(ShellError::ScriptNotFound("ghost".into()))
        );
    }
}
