//! Multi-producer/single-consumer hand-off between arbitrary threads and
//! the thread that owns the console.
//!
//! Producers never touch the shell or log buffer directly; they clone a
//! [`BridgeHandle`] and enqueue. The owning thread drains both queues once
//! per tick. FIFO order holds within each queue; no order is defined
//! between the two.

use std::sync::mpsc::{Receiver, Sender, channel};

use crate::buffer::{LogEntry, LogKind};
use crate::shell::{Environment, Shell};

/// Clonable, `Send` producer side of the bridge.
#[derive(Clone)]
pub struct BridgeHandle {
    log_tx: Sender<LogEntry>,
    cmd_tx: Sender<String>,
}

impl BridgeHandle {
    /// Enqueue a plain log message.
    pub fn log(&self, text: impl Into<String>) {
        self.log_entry(LogEntry::new(LogKind::Message, text));
    }

    /// Enqueue an error log entry.
    pub fn log_error(&self, text: impl Into<String>) {
        self.log_entry(LogEntry::new(LogKind::Error, text));
    }

    /// Enqueue a full log entry.
    pub fn log_entry(&self, entry: LogEntry) {
        // A closed receiver means the console is gone; drop silently.
        let _ = self.log_tx.send(entry);
    }

    /// Enqueue a command line for dispatch on the owning thread.
    pub fn command(&self, line: impl Into<String>) {
        let _ = self.cmd_tx.send(line.into());
    }
}

/// The bridge itself; owned by the console thread.
pub struct ThreadBridge {
    log_tx: Sender<LogEntry>,
    log_rx: Receiver<LogEntry>,
    cmd_tx: Sender<String>,
    cmd_rx: Receiver<String>,
}

impl ThreadBridge {
    pub fn new() -> Self {
        let (log_tx, log_rx) = channel();
        let (cmd_tx, cmd_rx) = channel();
        Self {
            log_tx,
            log_rx,
            cmd_tx,
            cmd_rx,
        }
    }

    /// A new producer handle; hand one to every thread that needs to talk
    /// to the console.
    pub fn handle(&self) -> BridgeHandle {
        BridgeHandle {
            log_tx: self.log_tx.clone(),
            cmd_tx: self.cmd_tx.clone(),
        }
    }

    /// Pop *everything* currently queued (not a fixed batch): log entries
    /// into the buffer, command lines through the shell. Called once per
    /// tick by the owning thread. Latched errors from bridged commands are
    /// surfaced as error log entries since there is no interactive caller
    /// to read them.
    ///
    /// Returns `(log_items, command_items)` drained.
    pub fn drain(&self, shell: &mut Shell, env: &mut Environment<'_>) -> (usize, usize) {
        let mut logs = 0;
        while let Ok(entry) = self.log_rx.try_recv() {
            env.buffer.append(entry);
            logs += 1;
        }

        let mut commands = 0;
        while let Ok(line) = self.cmd_rx.try_recv() {
            env.buffer.log(LogKind::Input, line.clone());
            shell.run(&line, env);
            if let Some(error) = shell.take_error() {
                env.buffer.log(LogKind::Error, error.to_string());
            }
            commands += 1;
        }

        if logs > 0 || commands > 0 {
            log::trace!("bridge drained {logs} log items, {commands} commands");
        }
        (logs, commands)
    }
}

impl Default for ThreadBridge {
    fn default() -> Self {
        Self::new()
    }
}
