//! Console configuration, loaded from TOML with per-field defaults.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

/// Tunable settings for a [`crate::Console`] host.
///
/// Every field has a default, so a partial (or absent) config file works.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ConsoleConfig {
    /// Live-tier capacity of the log buffer, in entries.
    pub buffer_capacity: usize,
    /// How long a script line may stay unacknowledged before the runner
    /// moves on, in milliseconds.
    pub completion_window_ms: u64,
    /// Host tick interval, in milliseconds.
    pub tick_ms: u64,
    /// Directory scanned for script files at startup.
    pub script_dir: Option<PathBuf>,
    /// Extension of script files in `script_dir`.
    pub script_ext: String,
    /// Optional file log destination.
    pub log_file: Option<PathBuf>,
    /// Buffered messages before the file logger flushes.
    pub log_flush_threshold: usize,
    /// Upper bound on concurrently running external processes.
    pub max_processes: usize,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            buffer_capacity: 512,
            completion_window_ms: 5000,
            tick_ms: 100,
            script_dir: None,
            script_ext: "cmds".to_string(),
            log_file: None,
            log_flush_threshold: 100,
            max_processes: 16,
        }
    }
}

impl ConsoleConfig {
    pub fn from_toml_str(source: &str) -> conch_types::Result<Self> {
        Ok(toml::from_str(source)?)
    }

    pub fn load(path: &Path) -> conch_types::Result<Self> {
        let source = fs::read_to_string(path)?;
        let config = Self::from_toml_str(&source)?;
        log::debug!("loaded config from {}", path.display());
        Ok(config)
    }

    pub fn completion_window(&self) -> Duration {
        Duration::from_millis(self.completion_window_ms)
    }

    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }
}
