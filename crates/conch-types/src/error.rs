//! Error types for the conch console framework.

use std::io;

/// Errors produced by the conch framework.
///
/// Dispatch-path errors (unknown command, arity violations, ...) are not
/// represented here: those are recovered locally and surfaced through the
/// shell's latched-error slot. This enum covers the framework edges where a
/// call can genuinely fail: configuration, script resources, the file logger,
/// and child-process launching.
#[derive(Debug, thiserror::Error)]
pub enum ConchError {
    #[error("config error: {0}")]
    Config(String),

    #[error("script error: {0}")]
    Script(String),

    #[error("logger error: {0}")]
    Logger(String),

    #[error("process error: {0}")]
    Process(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, ConchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_display() {
        let e = ConchError::Config("missing key".into());
        assert_eq!(format!("{e}"), "config error: missing key");
    }

    #[test]
    fn script_error_display() {
        let e = ConchError::Script("bad line".into());
        assert_eq!(format!("{e}"), "script error: bad line");
    }

    #[test]
    fn logger_error_display() {
        let e = ConchError::Logger("flush failed".into());
        assert_eq!(format!("{e}"), "logger error: flush failed");
    }

    #[test]
    fn process_error_display() {
        let e = ConchError::Process("spawn failed".into());
        assert_eq!(format!("{e}"), "process error: spawn failed");
    }

    #[test]
    fn io_error_from_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "gone");
        let e: ConchError = io_err.into();
        let msg = format!("{e}");
        assert!(msg.contains("I/O error"));
        assert!(msg.contains("gone"));
    }

    #[test]
    fn toml_error_from_conversion() {
        let bad_toml = "this is [[[not valid toml";
        let toml_err = toml::from_str::<toml::Value>(bad_toml).unwrap_err();
        let e: ConchError = toml_err.into();
        let msg = format!("{e}");
        assert!(msg.contains("TOML parse error"));
    }
}
