//! Log sinks.
//!
//! A [`LogSink`] is the boundary to the log backend. Writes must not block
//! the caller on network or disk I/O: implementations buffer and deliver in
//! the background, or fail fast.
//!
//! A [`LogStream`] binds a sink to a log name and a monitored resource, the
//! way a backend client hands out named loggers. Streams contain every sink
//! failure: the entry is dropped and the failure goes to the process
//! diagnostics log.
//!
//! Provided sinks:
//!
//! - [`WriterSink`] - JSON lines to any `AsyncWrite` (stdout in production)
//! - [`MemorySink`] - keeps records in memory, for tests and inspection
//! - [`TracingSink`] - forwards entries as `tracing` events

mod diagnostic;
mod memory;
mod writer;

pub use diagnostic::TracingSink;
pub use memory::MemorySink;
pub use writer::{WriterSink, DEFAULT_CAPACITY};

use std::fmt;
use std::sync::Arc;

use crate::entry::{LogEntry, LogRecord, MonitoredResource};

/// Error returned by a sink that could not accept a record.
#[derive(Debug)]
pub enum SinkError {
    /// Sink is shut down or unavailable.
    Closed,
    /// Buffer is full; the record was not queued.
    Full,
    /// Record could not be serialized.
    Serialize(serde_json::Error),
}

impl fmt::Display for SinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SinkError::Closed => write!(f, "log sink is closed"),
            SinkError::Full => write!(f, "log sink buffer is full"),
            SinkError::Serialize(e) => write!(f, "failed to serialize log record: {}", e),
        }
    }
}

impl std::error::Error for SinkError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SinkError::Serialize(e) => Some(e),
            _ => None,
        }
    }
}

/// Destination for log records.
pub trait LogSink: Send + Sync {
    /// Accept a record without blocking.
    fn write(&self, record: LogRecord) -> Result<(), SinkError>;
}

/// A named log stream on a shared sink.
pub struct LogStream {
    name: String,
    resource: Arc<MonitoredResource>,
    sink: Arc<dyn LogSink>,
}

impl LogStream {
    /// Create a stream.
    pub fn new(
        name: impl Into<String>,
        resource: Arc<MonitoredResource>,
        sink: Arc<dyn LogSink>,
    ) -> Self {
        Self {
            name: name.into(),
            resource,
            sink,
        }
    }

    /// Log name of this stream.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Monitored resource attached to every record.
    #[inline]
    pub fn resource(&self) -> &MonitoredResource {
        &self.resource
    }

    /// Write an entry. Failures are reported on the diagnostics log only.
    pub fn log(&self, entry: LogEntry) {
        let severity = entry.severity;
        let record = LogRecord {
            log_name: self.name.clone(),
            resource: Arc::clone(&self.resource),
            entry,
        };

        if let Err(err) = self.sink.write(record) {
            tracing::warn!(
                target: "reqlog::sink",
                log_name = %self.name,
                severity = %severity,
                error = %err,
                "dropped log entry"
            );
        }
    }
}

impl fmt::Debug for LogStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogStream")
            .field("name", &self.name)
            .field("resource", &self.resource)
            .finish_non_exhaustive()
    }
}
