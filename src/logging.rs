//! Process diagnostics as JSON lines.
//!
//! Diagnostics use the same severity names as the request log streams so a
//! log router can treat both uniformly:
//! ```json
//! {"timestamp":"2024-12-28T15:04:05.123Z","severity":"INFO","message":"Server listening","target":"reqlog::server","fields":{"addr":"0.0.0.0:8080"},"serviceContext":{"service":"reqlog","version":"0.1.0"}}
//! ```

use std::collections::BTreeMap;

use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use serde_json::Value;
use tracing::{Event, Subscriber};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;
use crate::severity::Severity;

/// One diagnostics line.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DiagnosticLine<'a> {
    timestamp: String,
    severity: Severity,
    message: &'a str,
    target: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    fields: Option<&'a BTreeMap<String, Value>>,
    service_context: ServiceContext<'a>,
}

#[derive(Serialize)]
struct ServiceContext<'a> {
    service: &'a str,
    version: &'a str,
}

/// Custom JSON formatter for tracing.
pub struct JsonFormatter {
    service_name: String,
}

impl JsonFormatter {
    pub fn new(service_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
        }
    }

    fn render(&self, severity: Severity, target: &str, visitor: &FieldVisitor) -> String {
        let line = DiagnosticLine {
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            severity,
            message: visitor.message.as_deref().unwrap_or_default(),
            target,
            fields: (!visitor.fields.is_empty()).then_some(&visitor.fields),
            service_context: ServiceContext {
                service: &self.service_name,
                version: crate::PKG_VERSION,
            },
        };
        serde_json::to_string(&line).unwrap_or_default()
    }
}

impl<S, N> FormatEvent<S, N> for JsonFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> std::fmt::Result {
        let meta = event.metadata();

        let mut visitor = FieldVisitor::new();
        event.record(&mut visitor);

        writeln!(
            writer,
            "{}",
            self.render(Severity::from(*meta.level()), meta.target(), &visitor)
        )
    }
}

/// Field visitor for collecting tracing fields.
struct FieldVisitor {
    message: Option<String>,
    fields: BTreeMap<String, Value>,
}

impl FieldVisitor {
    fn new() -> Self {
        Self {
            message: None,
            fields: BTreeMap::new(),
        }
    }

    fn insert(&mut self, field: &tracing::field::Field, value: Value) {
        self.fields.insert(field.name().to_string(), value);
    }
}

impl tracing::field::Visit for FieldVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.message = Some(format!("{:?}", value));
        } else {
            self.insert(field, Value::String(format!("{:?}", value)));
        }
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        if field.name() == "message" {
            self.message = Some(value.to_string());
        } else {
            self.insert(field, Value::String(value.to_string()));
        }
    }

    fn record_i64(&mut self, field: &tracing::field::Field, value: i64) {
        self.insert(field, serde_json::json!(value));
    }

    fn record_u64(&mut self, field: &tracing::field::Field, value: u64) {
        self.insert(field, serde_json::json!(value));
    }

    fn record_f64(&mut self, field: &tracing::field::Field, value: f64) {
        self.insert(field, serde_json::json!(value));
    }

    fn record_bool(&mut self, field: &tracing::field::Field, value: bool) {
        self.insert(field, serde_json::json!(value));
    }
}

/// Install the global diagnostics subscriber.
///
/// Writes to stderr so diagnostics never interleave with the request log
/// records written to stdout.
pub fn init(config: &LoggingConfig) {
    let filter =
        EnvFilter::try_new(&config.filter).unwrap_or_else(|_| EnvFilter::new("reqlog=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .event_format(JsonFormatter::new(config.service_name.clone()))
                .with_writer(std::io::stderr),
        )
        .init();
}
