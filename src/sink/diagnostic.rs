//! Sink that forwards entries to the process `tracing` subscriber.

use tracing::{debug, error, info, warn};

use super::{LogSink, SinkError};
use crate::entry::LogRecord;
use crate::severity::Severity;

/// Forwards each entry as a `tracing` event with target `reqlog::app`.
///
/// This is what a request context logs to before a request logger is
/// installed.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn write(&self, record: LogRecord) -> Result<(), SinkError> {
        let entry = &record.entry;
        let message = entry.message.as_deref().unwrap_or("");

        match entry.severity {
            Severity::Default | Severity::Debug => debug!(
                target: "reqlog::app",
                log_name = %record.log_name,
                trace = %entry.trace,
                span_id = %entry.span_id,
                "{}",
                message
            ),
            Severity::Info | Severity::Notice => info!(
                target: "reqlog::app",
                log_name = %record.log_name,
                trace = %entry.trace,
                span_id = %entry.span_id,
                "{}",
                message
            ),
            Severity::Warning => warn!(
                target: "reqlog::app",
                log_name = %record.log_name,
                trace = %entry.trace,
                span_id = %entry.span_id,
                "{}",
                message
            ),
            _ => error!(
                target: "reqlog::app",
                log_name = %record.log_name,
                severity = %entry.severity,
                trace = %entry.trace,
                span_id = %entry.span_id,
                "{}",
                message
            ),
        }

        Ok(())
    }
}
