//! Command registry, arity validation, and dispatch.
//!
//! The shell owns a name-keyed map of command descriptors and a single
//! latched-error slot. Every dispatch path -- interactive input, bridged
//! commands, script lines -- funnels through [`Shell::run`], so quoting and
//! arity semantics are identical everywhere. Arity is validated before the
//! handler runs; a handler can therefore assume its argument-count contract
//! holds.

use std::collections::HashMap;
use std::rc::Rc;

use crate::arg::Argument;
use crate::bridge::BridgeHandle;
use crate::buffer::LogBuffer;
use crate::commands::Builtin;
use crate::history::History;
use crate::script::ScriptLibrary;
use crate::tokenizer::tokenize;

fn plural(count: &usize) -> &'static str {
    if *count == 1 { "" } else { "s" }
}

/// Dispatch-path errors, surfaced through the shell's latched-error slot.
///
/// Nothing here propagates out of a dispatch call; the caller reads the
/// latch afterwards and the shell keeps going.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ShellError {
    #[error("command {0} could not be found")]
    UnknownCommand(String),

    #[error("{name} requires {word} {required} argument{}", plural(.required))]
    Arity {
        name: String,
        word: &'static str,
        required: usize,
    },

    #[error("command {0} is already defined")]
    DuplicateRegistration(String),

    #[error("command {0} is not registered")]
    NotFound(String),

    #[error("no procedure bound for {0}")]
    MissingHandlerBinding(String),

    #[error("script {0} could not be found")]
    ScriptNotFound(String),

    #[error("{0}")]
    Failed(String),
}

/// Boxed handler capability invoked with the parsed arguments.
pub type HandlerFn = Rc<dyn Fn(&[Argument], &mut Environment<'_>) -> Result<(), ShellError>>;

/// Signature for procedures eligible for the `REGISTER` directive.
pub type ProcedureFn = fn(&[Argument], &mut Environment<'_>) -> Result<(), ShellError>;

/// How a command executes: an arbitrary closure, or one of the built-ins
/// that need access to the shell itself (help listings, registration).
pub enum Handler {
    Func(HandlerFn),
    Builtin(Builtin),
}

impl Handler {
    /// Wrap a plain closure.
    pub fn func(
        f: impl Fn(&[Argument], &mut Environment<'_>) -> Result<(), ShellError> + 'static,
    ) -> Self {
        Handler::Func(Rc::new(f))
    }
}

enum Dispatch {
    Func(HandlerFn),
    Builtin(Builtin),
}

/// A registered command: unique upcased name, handler, arity contract, and
/// help text. Never mutated in place; replaced only by explicit
/// unregister + register.
pub struct CommandSpec {
    pub(crate) name: String,
    pub(crate) handler: Handler,
    pub(crate) min_args: usize,
    /// `None` is the unbounded sentinel.
    pub(crate) max_args: Option<usize>,
    pub(crate) help: String,
}

impl CommandSpec {
    pub fn new(
        name: &str,
        min_args: usize,
        max_args: Option<usize>,
        help: impl Into<String>,
        handler: Handler,
    ) -> Self {
        debug_assert!(max_args.is_none_or(|max| min_args <= max));
        Self {
            name: name.to_uppercase(),
            handler,
            min_args,
            max_args,
            help: help.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn help(&self) -> &str {
        &self.help
    }
}

/// Mutable context handed to every command handler.
///
/// This replaces any process-wide "current terminal" access: the host
/// constructs one per dispatch batch and passes it down explicitly.
pub struct Environment<'a> {
    /// The console's log buffer; handlers write user-visible output here.
    pub buffer: &'a mut LogBuffer,
    /// Input history (the `history` builtin reads and clears it).
    pub history: &'a mut History,
    /// Hand-off for work a handler pushes to other threads.
    pub bridge: BridgeHandle,
    /// Named script resources available to the `run` builtin.
    pub library: &'a ScriptLibrary,
    /// Outbox: the `run` builtin pushes script names here; the console
    /// hands them to the runner in order once the dispatch batch has
    /// unwound, so none are lost when several arrive in one tick.
    pub script_requests: Vec<String>,
}

/// Command registry with dispatch and a single latched-error slot.
pub struct Shell {
    pub(crate) commands: HashMap<String, CommandSpec>,
    pub(crate) procedures: HashMap<String, ProcedureFn>,
    pub(crate) pending: Option<ShellError>,
}

impl Shell {
    /// Create an empty shell. Most hosts follow up with
    /// [`crate::commands::register_builtins`].
    pub fn new() -> Self {
        Self {
            commands: HashMap::new(),
            procedures: HashMap::new(),
            pending: None,
        }
    }

    /// Register a command. A name collision latches
    /// [`ShellError::DuplicateRegistration`] and leaves the existing command
    /// in place.
    pub fn register(&mut self, spec: CommandSpec) -> bool {
        if self.commands.contains_key(&spec.name) {
            self.latch(ShellError::DuplicateRegistration(spec.name.clone()));
            return false;
        }
        log::debug!("registered command {}", spec.name);
        self.commands.insert(spec.name.clone(), spec);
        true
    }

    /// Remove a command; latches [`ShellError::NotFound`] if absent.
    pub fn unregister(&mut self, name: &str) -> bool {
        let key = name.to_uppercase();
        if self.commands.remove(&key).is_some() {
            log::debug!("unregistered command {key}");
            true
        } else {
            self.latch(ShellError::NotFound(key));
            false
        }
    }

    /// Bind a procedure name for the `REGISTER` directive. The table is
    /// assembled explicitly at startup; there is no runtime discovery.
    pub fn add_procedure(&mut self, name: &str, procedure: ProcedureFn) {
        self.procedures.insert(name.to_uppercase(), procedure);
    }

    /// Tokenize and dispatch one line.
    ///
    /// Clears the latch first. An empty or whitespace-only line is a silent
    /// no-op. The first token, upcased, is the command name; the rest are
    /// its arguments.
    pub fn run(&mut self, line: &str, env: &mut Environment<'_>) {
        self.pending = None;
        let args = tokenize(line);
        let Some((name, rest)) = args.split_first() else {
            return;
        };
        let name = name.as_str().to_uppercase();
        if !self.commands.contains_key(&name) {
            self.latch(ShellError::UnknownCommand(name));
            return;
        }
        self.run_args(&name, rest, env);
    }

    /// Dispatch an already-tokenized invocation.
    ///
    /// Validates the arity contract before touching the handler; on
    /// violation the latch carries the exactly/at-least/at-most message and
    /// the handler is never invoked. A handler error is latched but does not
    /// roll back side effects the handler already performed.
    pub fn run_args(&mut self, name: &str, args: &[Argument], env: &mut Environment<'_>) {
        let key = name.to_uppercase();
        let Some(spec) = self.commands.get(&key) else {
            self.latch(ShellError::UnknownCommand(key));
            return;
        };

        let count = args.len();
        let exact = spec.max_args == Some(spec.min_args);
        let violation = if count < spec.min_args {
            Some((if exact { "exactly" } else { "at least" }, spec.min_args))
        } else if let Some(max) = spec.max_args
            && count > max
        {
            Some((if exact { "exactly" } else { "at most" }, max))
        } else {
            None
        };
        if let Some((word, required)) = violation {
            self.latch(ShellError::Arity {
                name: key,
                word,
                required,
            });
            return;
        }

        let dispatch = match &spec.handler {
            Handler::Func(f) => Dispatch::Func(Rc::clone(f)),
            Handler::Builtin(builtin) => Dispatch::Builtin(*builtin),
        };
        match dispatch {
            Dispatch::Func(f) => {
                if let Err(e) = f(args, env) {
                    self.latch(e);
                }
            },
            Dispatch::Builtin(builtin) => self.run_builtin(builtin, args, env),
        }
    }

    /// Latch an error, overwriting any earlier one from this dispatch.
    pub(crate) fn latch(&mut self, error: ShellError) {
        log::debug!("shell error: {error}");
        self.pending = Some(error);
    }

    /// Latch free-form error text (for handlers reporting their own
    /// failures through the standard surface).
    pub fn issue_error(&mut self, message: impl Into<String>) {
        self.latch(ShellError::Failed(message.into()));
    }

    /// Peek at the latched error.
    pub fn last_error(&self) -> Option<&ShellError> {
        self.pending.as_ref()
    }

    /// Read-once: take the latched error, clearing the slot.
    pub fn take_error(&mut self) -> Option<ShellError> {
        self.pending.take()
    }

    /// The latched error rendered as user-visible text, if any.
    pub fn error_message(&self) -> Option<String> {
        self.pending.as_ref().map(ShellError::to_string)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.commands.contains_key(&name.to_uppercase())
    }

    /// Registered `(name, help)` pairs, sorted by name.
    pub fn list_commands(&self) -> Vec<(&str, &str)> {
        let mut commands: Vec<(&str, &str)> = self
            .commands
            .values()
            .map(|spec| (spec.name.as_str(), spec.help.as_str()))
            .collect();
        commands.sort_by_key(|(name, _)| *name);
        commands
    }
}

impl Default for Shell {
    fn default() -> Self {
        Self::new()
    }
}
