//! Event Logger
//!
//! Append-only JSONL history log. Implements [`HistoryRecorder`], honoring
//! once keys across restarts when opened in append mode.

use std::collections::HashSet;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};

use spectrum_events::HistoryEvent;

use crate::error::PersistenceError;
use crate::persistence::{HistoryRecorder, StoreResult};

#[derive(Debug)]
struct LoggerState {
    writer: Option<BufWriter<File>>,
    event_count: u64,
    once_keys: HashSet<String>,
}

/// History recorder writing one event per line
#[derive(Debug)]
pub struct EventLogger {
    state: Mutex<LoggerState>,
}

impl EventLogger {
    /// Create a new event logger writing to the specified path, truncating it
    pub fn new(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)?;
        Ok(Self::with_writer(Some(BufWriter::new(file)), HashSet::new()))
    }

    /// Open an existing log for appending, remembering the once keys it holds
    pub fn append(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        let mut once_keys = HashSet::new();
        if path.exists() {
            let reader = BufReader::new(File::open(path)?);
            for (number, line) in reader.lines().enumerate() {
                let line = line?;
                if line.trim().is_empty() {
                    continue;
                }
                match HistoryEvent::from_jsonl(&line) {
                    Ok(event) => once_keys.extend(event.once_key),
                    Err(e) => tracing::warn!("{:?} line {}: unreadable event: {}", path, number + 1, e),
                }
            }
        }
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self::with_writer(Some(BufWriter::new(file)), once_keys))
    }

    /// Create a logger that discards events (for testing)
    pub fn null() -> Self {
        Self::with_writer(None, HashSet::new())
    }

    fn with_writer(writer: Option<BufWriter<File>>, once_keys: HashSet<String>) -> Self {
        Self {
            state: Mutex::new(LoggerState {
                writer,
                event_count: 0,
                once_keys,
            }),
        }
    }

    fn state(&self) -> MutexGuard<'_, LoggerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Events accepted by this logger
    pub fn event_count(&self) -> u64 {
        self.state().event_count
    }

    /// Flush the buffer to disk
    pub fn flush(&self) -> std::io::Result<()> {
        if let Some(writer) = self.state().writer.as_mut() {
            writer.flush()?;
        }
        Ok(())
    }
}

impl HistoryRecorder for EventLogger {
    fn record(&self, event: &HistoryEvent) -> StoreResult<bool> {
        let mut state = self.state();
        if let Some(key) = &event.once_key {
            if state.once_keys.contains(key) {
                return Ok(false);
            }
        }
        if let Some(writer) = state.writer.as_mut() {
            let json = event.to_jsonl().map_err(PersistenceError::Serialization)?;
            writeln!(writer, "{}", json)?;
        }
        if let Some(key) = &event.once_key {
            state.once_keys.insert(key.clone());
        }
        state.event_count += 1;
        Ok(true)
    }
}

impl Drop for EventLogger {
    fn drop(&mut self) {
        if let Err(e) = self.flush() {
            tracing::warn!("Failed to flush event logger: {}", e);
        }
    }
}
