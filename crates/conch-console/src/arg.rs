//! Command arguments.

use std::fmt;

/// A single argument passed to a command handler.
///
/// Wraps the raw token text and offers typed views that return a
/// zero/false default instead of erroring, so handlers can read loosely
/// typed input without their own parse plumbing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Argument {
    raw: String,
}

impl Argument {
    pub fn new(raw: impl Into<String>) -> Self {
        Self { raw: raw.into() }
    }

    /// The raw token text.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Integer view; `0` if the text is not a valid integer.
    pub fn as_int(&self) -> i64 {
        self.raw.parse().unwrap_or(0)
    }

    /// Float view; `0.0` if the text is not a valid float.
    pub fn as_float(&self) -> f64 {
        self.raw.parse().unwrap_or(0.0)
    }

    /// Boolean view; `TRUE`/`FALSE` case-insensitively, anything else `false`.
    pub fn as_bool(&self) -> bool {
        self.raw.eq_ignore_ascii_case("true")
    }
}

impl fmt::Display for Argument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl From<&str> for Argument {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

/// Join raw argument text with single spaces (used by `print`/`echo`).
pub fn join_arguments(args: &[Argument]) -> String {
    let mut out = String::new();
    for (i, arg) in args.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        out.push_str(arg.as_str());
    }
    out
}
