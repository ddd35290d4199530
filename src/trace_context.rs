//! Inbound trace context propagation.
//!
//! Two header formats are understood, checked in this order:
//!
//! - Google Cloud: `X-Cloud-Trace-Context: {trace-id}/{span-id};o={options}`
//!   where `span-id` is a decimal u64 and `;o=` is optional.
//!   Example: `X-Cloud-Trace-Context: 105445aa7843bc8bf206b12000100000/1;o=1`
//! - W3C: `traceparent: {version}-{trace-id}-{parent-id}-{trace-flags}`
//!   Example: `traceparent: 00-0af7651916cd43dd8448eb211c80319c-b7ad6b7169203331-01`
//!
//! IDs are never generated here. A request without a usable header gets the
//! zero trace and span IDs.

use std::fmt;

use http::HeaderMap;

/// Google Cloud propagation header.
pub const CLOUD_TRACE_HEADER: &str = "x-cloud-trace-context";

/// W3C propagation header.
pub const TRACEPARENT_HEADER: &str = "traceparent";

/// Headers longer than this are ignored without parsing.
const MAX_HEADER_LEN: usize = 200;

/// Trace ID length in hex chars (16 bytes).
const TRACE_ID_LEN: usize = 32;

/// Span ID length in hex chars (8 bytes).
const SPAN_ID_LEN: usize = 16;

/// Trace flags: sampled bit.
const FLAG_SAMPLED: u8 = 0x01;

/// Trace and span identifiers extracted from an inbound request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpanContext {
    /// 16-byte trace ID as 32 lowercase hex chars
    pub trace_id: String,
    /// 8-byte span ID as 16 lowercase hex chars
    pub span_id: String,
    /// Trace options (bit 0 = sampled)
    pub flags: u8,
}

impl SpanContext {
    /// The zero context used when nothing could be extracted.
    pub fn empty() -> Self {
        Self {
            trace_id: "0".repeat(TRACE_ID_LEN),
            span_id: "0".repeat(SPAN_ID_LEN),
            flags: 0,
        }
    }

    /// Extract from request headers, falling back to [`SpanContext::empty`].
    pub fn from_headers(headers: &HeaderMap) -> Self {
        Self::try_from_headers(headers).unwrap_or_else(Self::empty)
    }

    /// Extract from request headers.
    ///
    /// A present but malformed `X-Cloud-Trace-Context` does not fall through
    /// to `traceparent`.
    pub fn try_from_headers(headers: &HeaderMap) -> Option<Self> {
        if let Some(value) = headers.get(CLOUD_TRACE_HEADER) {
            return value.to_str().ok().and_then(Self::parse_cloud);
        }

        headers
            .get(TRACEPARENT_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(Self::parse_traceparent)
    }

    /// Parse an `X-Cloud-Trace-Context` value.
    pub fn parse_cloud(header: &str) -> Option<Self> {
        if header.is_empty() || header.len() > MAX_HEADER_LEN {
            return None;
        }

        let (trace_id, rest) = header.split_once('/')?;
        let trace_id = normalize_trace_id(trace_id)?;

        let (span_str, options) = match rest.split_once(';') {
            Some((span, options)) => (span, Some(options)),
            None => (rest, None),
        };
        let span: u64 = span_str.parse().ok()?;

        let flags = match options.and_then(|o| o.strip_prefix("o=")) {
            Some(o) => o.parse::<u64>().ok()? as u8,
            None => 0,
        };

        Some(Self {
            trace_id,
            span_id: format!("{:016x}", span),
            flags,
        })
    }

    /// Parse a W3C `traceparent` value.
    ///
    /// The span ID is the caller's parent-id.
    pub fn parse_traceparent(header: &str) -> Option<Self> {
        let parts: Vec<&str> = header.trim().split('-').collect();
        if parts.len() != 4 {
            return None;
        }

        let version = parts[0];
        let trace_id = parts[1];
        let parent_id = parts[2];
        let flags_str = parts[3];

        if version != "00" {
            return None;
        }

        // trace-id: 32 hex chars, not all zeros
        if trace_id.len() != TRACE_ID_LEN || !is_valid_hex(trace_id) || is_all_zeros(trace_id) {
            return None;
        }

        // parent-id: 16 hex chars, not all zeros
        if parent_id.len() != SPAN_ID_LEN || !is_valid_hex(parent_id) || is_all_zeros(parent_id)
        {
            return None;
        }

        if flags_str.len() != 2 || !is_valid_hex(flags_str) {
            return None;
        }

        let flags = u8::from_str_radix(flags_str, 16).ok()?;

        Some(Self {
            trace_id: trace_id.to_lowercase(),
            span_id: parent_id.to_lowercase(),
            flags,
        })
    }

    /// Check if the upstream marked this trace as sampled.
    #[inline]
    pub fn is_sampled(&self) -> bool {
        self.flags & FLAG_SAMPLED != 0
    }
}

impl Default for SpanContext {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Display for SpanContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.trace_id, self.span_id)
    }
}

/// Compose the fully-qualified trace name used in log records.
///
/// ```
/// assert_eq!(
///     reqlog::trace_context::format_trace("proj1", "abcd"),
///     "projects/proj1/traces/abcd"
/// );
/// ```
pub fn format_trace(project_id: &str, trace_id: &str) -> String {
    format!("projects/{}/traces/{}", project_id, trace_id)
}

/// Validate a hex trace ID and widen it to 16 bytes.
///
/// Shorter IDs are right-padded with zero bytes, longer ones truncated.
fn normalize_trace_id(s: &str) -> Option<String> {
    if s.len() % 2 != 0 || !is_valid_hex(s) {
        return None;
    }

    let mut id = s[..s.len().min(TRACE_ID_LEN)].to_lowercase();
    while id.len() < TRACE_ID_LEN {
        id.push('0');
    }
    Some(id)
}

#[inline]
fn is_valid_hex(s: &str) -> bool {
    s.chars().all(|c| c.is_ascii_hexdigit())
}

#[inline]
fn is_all_zeros(s: &str) -> bool {
    s.chars().all(|c| c == '0')
}
