//! Request context passed to handlers.

use std::net::IpAddr;
use std::sync::{Arc, LazyLock};
use std::time::Instant;

use crate::entry::MonitoredResource;
use crate::logger::RequestLogger;
use crate::sink::{LogStream, TracingSink};

/// HTTP version as static string (no allocation).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HttpVersion(&'static str);

impl HttpVersion {
    pub const HTTP_10: Self = Self("HTTP/1.0");
    pub const HTTP_11: Self = Self("HTTP/1.1");
    pub const HTTP_20: Self = Self("HTTP/2.0");

    /// Get the version string.
    #[inline]
    pub const fn as_str(&self) -> &'static str {
        self.0
    }

    /// Create from http::Version.
    #[inline]
    pub fn from_http(version: http::Version) -> Self {
        match version {
            http::Version::HTTP_10 => Self::HTTP_10,
            http::Version::HTTP_11 => Self::HTTP_11,
            http::Version::HTTP_2 => Self::HTTP_20,
            _ => Self::HTTP_11, // fallback
        }
    }
}

impl std::fmt::Display for HttpVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.0)
    }
}

impl Default for HttpVersion {
    fn default() -> Self {
        Self::HTTP_11
    }
}

/// Stream used by contexts that have no request logger installed yet.
static DEFAULT_STREAM: LazyLock<Arc<LogStream>> = LazyLock::new(|| {
    Arc::new(LogStream::new(
        "default",
        Arc::new(MonitoredResource::new("global")),
        Arc::new(TracingSink),
    ))
});

/// Request-scoped state shared between the server, middleware and handlers.
///
/// Handlers get their logger from [`Context::logger`]. Until a logging
/// middleware installs a request logger, the context carries a default one
/// that forwards to the process diagnostics log.
pub struct Context {
    /// Peer address of the connection.
    pub client_ip: IpAddr,

    /// Request start time; access-log latency is measured from here.
    pub started_at: Instant,

    /// HTTP version (no allocation, Copy).
    pub http_version: HttpVersion,

    logger: Arc<RequestLogger>,
}

impl Context {
    /// Create a context with the default logger.
    #[inline]
    pub fn new(client_ip: IpAddr) -> Self {
        Self {
            client_ip,
            started_at: Instant::now(),
            http_version: HttpVersion::HTTP_11,
            logger: Arc::new(RequestLogger::new(Arc::clone(&DEFAULT_STREAM), "", "")),
        }
    }

    /// Set the HTTP version.
    #[inline]
    pub fn with_http_version(mut self, version: HttpVersion) -> Self {
        self.http_version = version;
        self
    }

    /// The logger for this request.
    #[inline]
    pub fn logger(&self) -> &RequestLogger {
        &self.logger
    }

    /// Shared handle to the logger, for sub-tasks spawned by a handler.
    #[inline]
    pub fn logger_handle(&self) -> Arc<RequestLogger> {
        Arc::clone(&self.logger)
    }

    /// Install a logger, returning the previous one.
    #[inline]
    pub fn replace_logger(&mut self, logger: Arc<RequestLogger>) -> Arc<RequestLogger> {
        std::mem::replace(&mut self.logger, logger)
    }
}
