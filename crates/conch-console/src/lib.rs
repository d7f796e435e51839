//! Embeddable command console subsystem.
//!
//! The console is a registry-based dispatch system built for host
//! applications with a fixed update tick. Lines are tokenized with
//! quote/escape handling, resolved against a name-keyed registry of
//! arity-checked commands, and executed on the single thread that owns the
//! [`Console`]. Other threads feed log lines and command strings in through
//! a [`ThreadBridge`], which the owner drains once per tick. Scripts replay
//! through the exact same dispatch path as interactive input.

pub mod arg;
pub mod boot;
pub mod bridge;
pub mod buffer;
pub mod commands;
pub mod config;
pub mod console;
pub mod history;
pub mod logger;
pub mod proc;
pub mod script;
pub mod shell;
pub mod tokenizer;

/// A single command argument with zero-default typed views.
pub use arg::Argument;
/// Synchronous boot-script execution.
pub use boot::run_boot_lines;
/// Clonable multi-producer handle into the thread bridge.
pub use bridge::BridgeHandle;
/// Multi-producer/single-consumer hand-off for log lines and commands.
pub use bridge::ThreadBridge;
/// Two-tier (live + archive) bounded log buffer.
pub use buffer::{LogBuffer, LogEntry, LogKind};
/// Register the built-in commands into a shell.
pub use commands::register_builtins;
/// Console configuration loaded from TOML.
pub use config::ConsoleConfig;
/// Owning facade: shell + buffer + history + bridge + script runner.
pub use console::Console;
/// Navigable input history.
pub use history::History;
/// Buffered, thread-safe file logger.
pub use logger::FileLogger;
/// Bounded-concurrency external process launcher.
pub use proc::ProcessPool;
/// Script resources and the sequential script runner.
pub use script::{ScriptLibrary, ScriptRunner};
/// Command registry with arity validation and a latched-error slot.
pub use shell::{CommandSpec, Environment, Handler, Shell, ShellError};
/// Quote/escape-aware line tokenizer.
pub use tokenizer::{next_token, tokenize};
