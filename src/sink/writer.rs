//! Buffered JSON-lines sink.

use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::JoinHandle;
use tracing::debug;

use super::{LogSink, SinkError};
use crate::entry::LogRecord;

/// Default channel capacity (records).
pub const DEFAULT_CAPACITY: usize = 1024;

/// Sink that serializes records to JSON and hands them to a background
/// writer task over a bounded channel.
///
/// `write` never waits: when the channel is full the record is rejected
/// with [`SinkError::Full`]. The writer task exits once every clone of the
/// sink has been dropped, after flushing what was queued.
#[derive(Clone, Debug)]
pub struct WriterSink {
    tx: mpsc::Sender<String>,
}

impl WriterSink {
    /// Write to stdout. Must be called inside a Tokio runtime.
    pub fn stdout(capacity: usize) -> (Self, JoinHandle<()>) {
        Self::spawn(tokio::io::stdout(), capacity)
    }

    /// Write to an arbitrary async writer. Must be called inside a Tokio runtime.
    pub fn spawn<W>(writer: W, capacity: usize) -> (Self, JoinHandle<()>)
    where
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let handle = tokio::spawn(run_writer(writer, rx));
        (Self { tx }, handle)
    }
}

impl LogSink for WriterSink {
    fn write(&self, record: LogRecord) -> Result<(), SinkError> {
        let mut line = serde_json::to_string(&record).map_err(SinkError::Serialize)?;
        line.push('\n');

        self.tx.try_send(line).map_err(|e| match e {
            TrySendError::Full(_) => SinkError::Full,
            TrySendError::Closed(_) => SinkError::Closed,
        })
    }
}

async fn run_writer<W>(mut writer: W, mut rx: mpsc::Receiver<String>)
where
    W: AsyncWrite + Unpin,
{
    while let Some(line) = rx.recv().await {
        if let Err(e) = writer.write_all(line.as_bytes()).await {
            debug!(target: "reqlog::sink", error = %e, "log writer failed, dropping record");
            continue;
        }

        // Flush once the queue drains
        if rx.is_empty() {
            if let Err(e) = writer.flush().await {
                debug!(target: "reqlog::sink", error = %e, "log writer flush failed");
            }
        }
    }

    let _ = writer.flush().await;
}
