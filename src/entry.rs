//! Log record types written to sinks.
//!
//! Field names follow the Cloud Logging `LogEntry` JSON representation so that
//! records can be shipped to the backend unchanged:
//!
//! ```json
//! {"logName":"default_request","resource":{"type":"gae_app","labels":{...}},
//!  "timestamp":"2024-12-28T15:04:05.123Z","severity":"WARNING",
//!  "httpRequest":{"requestMethod":"GET","requestUrl":"/","status":200,...},
//!  "trace":"projects/p/traces/abcd...","spanId":"0000000000000001","traceSampled":true}
//! ```

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

use crate::severity::Severity;

/// Resource type for App Engine applications.
pub const GAE_APP_RESOURCE: &str = "gae_app";

/// Monitored-resource descriptor attached to every record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MonitoredResource {
    #[serde(rename = "type")]
    pub resource_type: String,
    pub labels: BTreeMap<String, String>,
}

impl MonitoredResource {
    /// Create a resource with the given type and no labels.
    pub fn new(resource_type: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            labels: BTreeMap::new(),
        }
    }

    /// Add a label.
    pub fn with_label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.insert(key.into(), value.into());
        self
    }

    /// Get a label value.
    pub fn label(&self, key: &str) -> Option<&str> {
        self.labels.get(key).map(|s| s.as_str())
    }
}

/// HTTP request/response descriptor of an access-log entry.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpRequest {
    pub request_method: String,
    pub request_url: String,
    pub status: u16,
    #[serde(serialize_with = "serialize_latency")]
    pub latency: Duration,
    pub remote_ip: String,
    pub response_size: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_size: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub referer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protocol: Option<String>,
}

/// A single log entry, application or access.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub severity: Severity,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Structured payload fields
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub fields: Map<String, Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub http_request: Option<HttpRequest>,
    pub trace: String,
    pub span_id: String,
    pub trace_sampled: bool,
}

impl LogEntry {
    /// Application entry stamped with the current time.
    ///
    /// Trace sampling is always reported as true; sampling decisions are
    /// left to the backend.
    pub fn application(
        severity: Severity,
        message: impl Into<String>,
        fields: Map<String, Value>,
        trace: impl Into<String>,
        span_id: impl Into<String>,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            severity,
            message: Some(message.into()),
            fields,
            http_request: None,
            trace: trace.into(),
            span_id: span_id.into(),
            trace_sampled: true,
        }
    }

    /// Access entry stamped with the current time.
    pub fn access(
        severity: Severity,
        http_request: HttpRequest,
        trace: impl Into<String>,
        span_id: impl Into<String>,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            severity,
            message: None,
            fields: Map::new(),
            http_request: Some(http_request),
            trace: trace.into(),
            span_id: span_id.into(),
            trace_sampled: true,
        }
    }
}

/// What a sink receives: an entry plus the stream it belongs to.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogRecord {
    pub log_name: String,
    pub resource: Arc<MonitoredResource>,
    #[serde(flatten)]
    pub entry: LogEntry,
}

/// Latency as a protobuf JSON duration, e.g. `"0.012000000s"`.
fn serialize_latency<S: Serializer>(latency: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&format!(
        "{}.{:09}s",
        latency.as_secs(),
        latency.subsec_nanos()
    ))
}
