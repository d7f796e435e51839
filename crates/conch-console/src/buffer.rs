//! Two-tier log buffer: a bounded live ring plus an unbounded archive.

use std::collections::VecDeque;
use std::fmt;

/// Category of a log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogKind {
    /// Ordinary output text.
    Message,
    /// Non-fatal warning.
    Warning,
    /// Error text (including surfaced latched errors).
    Error,
    /// Echo of a submitted input line.
    Input,
    /// Text produced by the shell itself (help listings, registrations).
    Shell,
    /// Assertion/panic-equivalent diagnostics.
    Fault,
}

impl LogKind {
    /// Prefix used when formatting an entry into a display line.
    fn prefix(self) -> &'static str {
        match self {
            LogKind::Message => "",
            LogKind::Warning => "[warn] ",
            LogKind::Error => "[error] ",
            LogKind::Input => "> ",
            LogKind::Shell => "",
            LogKind::Fault => "[fault] ",
        }
    }
}

impl fmt::Display for LogKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LogKind::Message => "message",
            LogKind::Warning => "warning",
            LogKind::Error => "error",
            LogKind::Input => "input",
            LogKind::Shell => "shell",
            LogKind::Fault => "fault",
        };
        f.write_str(name)
    }
}

/// One immutable log entry, ordered by creation time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub kind: LogKind,
    pub text: String,
    /// Optional diagnostic trace attached at creation.
    pub trace: Option<String>,
}

impl LogEntry {
    pub fn new(kind: LogKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
            trace: None,
        }
    }

    pub fn with_trace(kind: LogKind, text: impl Into<String>, trace: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
            trace: Some(trace.into()),
        }
    }

    /// Render the entry as a single display line.
    pub fn format_line(&self) -> String {
        format!("{}{}", self.kind.prefix(), self.text)
    }
}

/// Bounded FIFO-evicting log store with an explicit archive tier.
///
/// The live tier never grows past its capacity; the archive tier grows
/// until [`LogBuffer::reset`]. Not internally synchronized -- only the
/// owning thread may touch it (other threads go through the bridge).
pub struct LogBuffer {
    live: VecDeque<LogEntry>,
    archive: Vec<LogEntry>,
    capacity: usize,
    /// Entries from the newest end of the archive already consumed by
    /// [`LogBuffer::window`]. Persistent across calls, reset by `reset`.
    archive_cursor: usize,
    total_appended: u64,
}

impl LogBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            live: VecDeque::with_capacity(capacity),
            archive: Vec::new(),
            capacity,
            archive_cursor: 0,
            total_appended: 0,
        }
    }

    /// Push an entry into the live tier, evicting oldest-first past capacity.
    pub fn append(&mut self, entry: LogEntry) {
        self.live.push_back(entry);
        while self.live.len() > self.capacity {
            self.live.pop_front();
        }
        self.total_appended += 1;
    }

    /// Convenience append without a trace.
    pub fn log(&mut self, kind: LogKind, text: impl Into<String>) {
        self.append(LogEntry::new(kind, text));
    }

    /// Move every live entry (in order) into the archive tier.
    pub fn archive(&mut self) {
        self.archive.extend(self.live.drain(..));
    }

    /// Clear both tiers and reset window bookkeeping.
    pub fn reset(&mut self) {
        self.live.clear();
        self.archive.clear();
        self.archive_cursor = 0;
        self.total_appended = 0;
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn live_len(&self) -> usize {
        self.live.len()
    }

    pub fn archive_len(&self) -> usize {
        self.archive.len()
    }

    /// Total entries ever appended (monotonic until `reset`). Lets a host
    /// render only entries it has not seen yet.
    pub fn total_appended(&self) -> u64 {
        self.total_appended
    }

    /// Live entries, oldest first.
    pub fn live_entries(&self) -> impl Iterator<Item = &LogEntry> {
        self.live.iter()
    }

    /// Collect formatted lines walking newest-to-oldest under a character
    /// budget.
    ///
    /// Starts `live_offset` entries before the newest live entry. When the
    /// live tier is exhausted and budget remains, continues into the archive
    /// tier from a persistent cursor, so repeated calls page deeper into the
    /// archive. The final line is truncated if it would overflow the budget;
    /// a truncated archive entry is not consumed, so the next window resumes
    /// at it.
    pub fn window(&mut self, live_offset: usize, max_chars: usize) -> Vec<String> {
        let mut lines = Vec::new();
        let mut remaining = max_chars;

        if let Some(start) = self.live.len().checked_sub(live_offset + 1) {
            for entry in self.live.iter().take(start + 1).rev() {
                if remaining == 0 {
                    return lines;
                }
                if !push_line(entry, &mut lines, &mut remaining) {
                    return lines;
                }
            }
        }

        while remaining > 0 {
            let Some(index) = self.archive.len().checked_sub(self.archive_cursor + 1) else {
                break;
            };
            let full = push_line(&self.archive[index], &mut lines, &mut remaining);
            if !full {
                break;
            }
            self.archive_cursor += 1;
        }

        lines
    }
}

/// Append a formatted line within the budget. Returns `false` once the
/// budget is exhausted (the last line may have been truncated).
fn push_line(entry: &LogEntry, lines: &mut Vec<String>, remaining: &mut usize) -> bool {
    let line = entry.format_line();
    let length = line.chars().count();
    if length <= *remaining {
        lines.push(line);
        *remaining -= length;
        true
    } else {
        lines.push(line.chars().take(*remaining).collect());
        *remaining = 0;
        false
    }
}
