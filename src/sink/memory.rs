//! In-memory sink.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

use super::{LogSink, SinkError};
use crate::entry::{LogEntry, LogRecord};

/// Sink that keeps every record in memory.
///
/// Can be switched into a failing mode to simulate an unavailable backend.
#[derive(Debug, Default)]
pub struct MemorySink {
    records: Mutex<Vec<LogRecord>>,
    failing: AtomicBool,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent writes fail with [`SinkError::Closed`].
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::Relaxed);
    }

    /// Snapshot of all records written so far.
    pub fn records(&self) -> Vec<LogRecord> {
        self.lock().clone()
    }

    /// Snapshot of entries written to the given log name.
    pub fn entries(&self, log_name: &str) -> Vec<LogEntry> {
        self.lock()
            .iter()
            .filter(|r| r.log_name == log_name)
            .map(|r| r.entry.clone())
            .collect()
    }

    /// Snapshot of entries carrying the given trace.
    pub fn entries_for_trace(&self, trace: &str) -> Vec<LogRecord> {
        self.lock()
            .iter()
            .filter(|r| r.entry.trace == trace)
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> MutexGuard<'_, Vec<LogRecord>> {
        // A panicking writer cannot leave a Vec half-pushed
        self.records.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl LogSink for MemorySink {
    fn write(&self, record: LogRecord) -> Result<(), SinkError> {
        if self.failing.load(Ordering::Relaxed) {
            return Err(SinkError::Closed);
        }
        self.lock().push(record);
        Ok(())
    }
}
