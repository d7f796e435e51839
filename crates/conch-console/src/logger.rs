//! Buffered, thread-safe file logger.
//!
//! Messages accumulate in memory and hit the disk once the buffer reaches
//! its flush threshold, on an explicit [`FileLogger::flush`], or when the
//! logger is dropped. Safe to share behind an `Arc` across threads.

use std::fs::OpenOptions;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{SystemTime, UNIX_EPOCH};

use conch_types::Result;

struct Inner {
    pending: Vec<String>,
    writer: BufWriter<std::fs::File>,
    threshold: usize,
}

/// Append-only log file with in-memory batching.
pub struct FileLogger {
    inner: Mutex<Inner>,
}

impl FileLogger {
    /// Open (or create) `path` for appending. `threshold` is the number of
    /// buffered messages that triggers an automatic flush.
    pub fn create(path: &Path, threshold: usize) -> Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            inner: Mutex::new(Inner {
                pending: Vec::new(),
                writer: BufWriter::new(file),
                threshold: threshold.max(1),
            }),
        })
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // A panicked writer leaves the buffer intact; keep logging.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Buffer one timestamped message, flushing if the threshold is hit.
    /// Write failures are reported through the host logger rather than the
    /// caller; logging must never take the console down.
    pub fn log(&self, message: &str) {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or(0);
        let mut inner = self.lock();
        inner.pending.push(format!("[{millis}] {message}"));
        if inner.pending.len() >= inner.threshold
            && let Err(error) = flush_inner(&mut inner)
        {
            log::error!("log flush failed: {error}");
        }
    }

    /// Number of messages waiting in memory.
    pub fn pending(&self) -> usize {
        self.lock().pending.len()
    }

    /// Write every buffered message to disk.
    pub fn flush(&self) -> Result<()> {
        flush_inner(&mut self.lock())
    }
}

fn flush_inner(inner: &mut Inner) -> Result<()> {
    for line in inner.pending.drain(..) {
        writeln!(inner.writer, "{line}")?;
    }
    inner.writer.flush()?;
    Ok(())
}

impl Drop for FileLogger {
    fn drop(&mut self) {
        if let Err(error) = self.flush() {
            log::error!("final log flush failed: {error}");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;

    use super::*;

    #[test]
    fn messages_buffer_until_threshold() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("console.log");
        let logger = FileLogger::create(&path, 3).unwrap();

        logger.log("one");
        logger.log("two");
        assert_eq!(logger.pending(), 2);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "");

        logger.log("three");
        assert_eq!(logger.pending(), 0);
        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents.lines().count(), 3);
        assert!(contents.lines().next().unwrap().ends_with("] one"));
    }

    #[test]
    fn explicit_flush_writes_partial_buffer() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("console.log");
        let logger = FileLogger::create(&path, 100).unwrap();
        logger.log("early");
        logger.flush().unwrap();
        assert!(std::fs::read_to_string(&path).unwrap().contains("early"));
    }

    #[test]
    fn drop_flushes_remaining_messages() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("console.log");
        {
            let logger = FileLogger::create(&path, 100).unwrap();
            logger.log("last words");
        }
        assert!(
            std::fs::read_to_string(&path)
                .unwrap()
                .contains("last words")
        );
    }

    #[test]
    fn append_mode_preserves_earlier_runs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("console.log");
        {
            let logger = FileLogger::create(&path, 1).unwrap();
            logger.log("run one");
        }
        {
            let logger = FileLogger::create(&path, 1).unwrap();
            logger.log("run two");
        }
        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("run one"));
        assert!(contents.contains("run two"));
    }

    #[test]
    fn concurrent_loggers_lose_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("console.log");
        let logger = Arc::new(FileLogger::create(&path, 10).unwrap());

        let mut workers = Vec::new();
        for t in 0..4 {
            let logger = Arc::clone(&logger);
            workers.push(thread::spawn(move || {
                for i in 0..50 {
                    logger.log(&format!("thread {t} message {i}"));
                }
            }));
        }
        for worker in workers {
            worker.join().unwrap();
        }
        logger.flush().unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents.lines().count(), 200);
    }
}
