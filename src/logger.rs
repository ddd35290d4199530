//! Per-request severity-aggregating logger.
//!
//! A [`RequestLogger`] is created for one request. Every entry it forwards is
//! stamped with the request's trace and span, and it remembers the highest
//! severity it was asked to log so that the access-log entry can carry it.
//!
//! Aggregation and forwarding are separate: every call raises the maximum
//! severity, while only calls at or above the threshold reach the sink.
//!
//! ```rust,ignore
//! let logger = RequestLogger::new(stream, "projects/p/traces/abc", "0000000000000001");
//! logger.set_level(Severity::Info);
//!
//! logger.debug("cache miss");      // not forwarded, still aggregated
//! logger.warning("slow backend");  // forwarded
//! assert_eq!(logger.max_severity(), Severity::Warning);
//! ```

use std::fmt;
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::entry::LogEntry;
use crate::severity::{AtomicSeverity, Severity};
use crate::sink::LogStream;

/// Logger bound to one request's trace.
///
/// Safe to share between sub-tasks of the same request through an `Arc`.
pub struct RequestLogger {
    stream: Arc<LogStream>,
    trace: String,
    span_id: String,
    level: AtomicSeverity,
    max_severity: AtomicSeverity,
}

impl RequestLogger {
    /// Create a logger that forwards every severity.
    pub fn new(stream: Arc<LogStream>, trace: impl Into<String>, span_id: impl Into<String>) -> Self {
        Self {
            stream,
            trace: trace.into(),
            span_id: span_id.into(),
            level: AtomicSeverity::new(Severity::Debug),
            max_severity: AtomicSeverity::new(Severity::Default),
        }
    }

    /// Fully-qualified trace name.
    #[inline]
    pub fn trace(&self) -> &str {
        &self.trace
    }

    #[inline]
    pub fn span_id(&self) -> &str {
        &self.span_id
    }

    /// Minimum severity forwarded to the sink.
    #[inline]
    pub fn level(&self) -> Severity {
        self.level.load()
    }

    /// Set the minimum severity forwarded to the sink.
    ///
    /// Meant to be called once, right after construction.
    #[inline]
    pub fn set_level(&self, level: Severity) {
        self.level.store(level);
    }

    /// Check if entries of this severity reach the sink.
    #[inline]
    pub fn enabled(&self, severity: Severity) -> bool {
        severity >= self.level()
    }

    /// Highest severity logged so far, or [`Severity::Default`].
    #[inline]
    pub fn max_severity(&self) -> Severity {
        self.max_severity.load()
    }

    /// Log a message.
    pub fn log(&self, severity: Severity, message: impl Into<String>) {
        self.log_with(severity, message, Map::new());
    }

    /// Log a message with structured fields.
    pub fn log_with(&self, severity: Severity, message: impl Into<String>, fields: Map<String, Value>) {
        self.max_severity.raise(severity);

        if !self.enabled(severity) {
            return;
        }

        self.stream.log(LogEntry::application(
            severity,
            message,
            fields,
            self.trace.as_str(),
            self.span_id.as_str(),
        ));
    }

    pub fn debug(&self, message: impl Into<String>) {
        self.log(Severity::Debug, message);
    }

    pub fn info(&self, message: impl Into<String>) {
        self.log(Severity::Info, message);
    }

    pub fn notice(&self, message: impl Into<String>) {
        self.log(Severity::Notice, message);
    }

    pub fn warning(&self, message: impl Into<String>) {
        self.log(Severity::Warning, message);
    }

    pub fn error(&self, message: impl Into<String>) {
        self.log(Severity::Error, message);
    }

    /// Fatal-equivalent. Logs only; never aborts the request.
    pub fn critical(&self, message: impl Into<String>) {
        self.log(Severity::Critical, message);
    }

    pub fn alert(&self, message: impl Into<String>) {
        self.log(Severity::Alert, message);
    }

    pub fn emergency(&self, message: impl Into<String>) {
        self.log(Severity::Emergency, message);
    }
}

impl fmt::Debug for RequestLogger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestLogger")
            .field("log_name", &self.stream.name())
            .field("trace", &self.trace)
            .field("span_id", &self.span_id)
            .field("level", &self.level())
            .field("max_severity", &self.max_severity())
            .finish()
    }
}
