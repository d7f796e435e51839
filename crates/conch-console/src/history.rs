//! Submitted-line history with a navigation cursor.

/// A navigable list of previously submitted lines.
///
/// The cursor sits past-the-end after a push; `previous`/`next` move it and
/// return the entry under it, with an empty string once either end is
/// passed.
#[derive(Debug, Default)]
pub struct History {
    entries: Vec<String>,
    position: usize,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a line; empty lines are ignored. Resets the cursor to
    /// past-the-end.
    pub fn push(&mut self, line: &str) {
        if line.is_empty() {
            return;
        }
        self.entries.push(line.to_string());
        self.position = self.entries.len();
    }

    /// Step back toward the oldest entry (floored at index 0).
    pub fn previous(&mut self) -> String {
        if self.entries.is_empty() {
            return String::new();
        }
        self.position = self.position.saturating_sub(1);
        self.entries[self.position].clone()
    }

    /// Step forward toward the newest entry; past the end yields an empty
    /// string and the cursor clamps at the length.
    pub fn next(&mut self) -> String {
        self.position += 1;
        if self.position >= self.entries.len() {
            self.position = self.entries.len();
            return String::new();
        }
        self.entries[self.position].clone()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.position = 0;
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries oldest first.
    pub fn entries(&self) -> &[String] {
        &self.entries
    }
}
