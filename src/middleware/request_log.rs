//! Request-logging middleware.
//!
//! Wraps a handler so that every request gets its own [`RequestLogger`] and
//! produces exactly one access-log entry, whose severity is the highest
//! severity the handler logged.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use http::StatusCode;

use super::{DefaultErrorHandler, ErrorHandler, Handler};
use crate::config::ResourceConfig;
use crate::core::{Context, Error, Request, Response, Result};
use crate::entry::{HttpRequest, LogEntry};
use crate::logger::RequestLogger;
use crate::severity::Severity;
use crate::sink::{LogSink, LogStream};
use crate::trace_context::{format_trace, SpanContext};

/// Status recorded when the request future is dropped before completion.
pub const STATUS_CLIENT_CLOSED: u16 = 499;

/// Middleware that installs a per-request logger and writes the access log.
pub struct LoggerMiddleware<H> {
    inner: H,
    access: Arc<LogStream>,
    application: Arc<LogStream>,
    project_id: String,
    level: Severity,
    timeout: Option<Duration>,
    error_handler: Arc<dyn ErrorHandler>,
}

impl<H: Handler> LoggerMiddleware<H> {
    /// Wrap `inner`, writing access entries to `access_sink` and handler
    /// entries to `application_sink`.
    ///
    /// Both streams carry the monitored resource built from `resource` and
    /// are named `<module_id>_request` and `<module_id>_application`.
    pub fn new(
        inner: H,
        access_sink: Arc<dyn LogSink>,
        application_sink: Arc<dyn LogSink>,
        resource: &ResourceConfig,
    ) -> Self {
        let monitored = Arc::new(resource.monitored_resource());

        Self {
            inner,
            access: Arc::new(LogStream::new(
                resource.request_log_name(),
                Arc::clone(&monitored),
                access_sink,
            )),
            application: Arc::new(LogStream::new(
                resource.application_log_name(),
                monitored,
                application_sink,
            )),
            project_id: resource.project_id.clone(),
            level: Severity::Info,
            timeout: None,
            error_handler: Arc::new(DefaultErrorHandler),
        }
    }

    /// Minimum severity forwarded to the application stream.
    pub fn with_level(mut self, level: Severity) -> Self {
        self.level = level;
        self
    }

    /// Deadline for the wrapped handler. Expiry is handled as [`Error::Timeout`].
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_error_handler(mut self, error_handler: Arc<dyn ErrorHandler>) -> Self {
        self.error_handler = error_handler;
        self
    }

    /// Run the wrapped handler and log the request.
    ///
    /// Never fails: handler errors become responses through the error
    /// handler, and logging failures stay on the diagnostics channel.
    pub async fn handle(&self, req: Request, ctx: &mut Context) -> Response {
        let span = SpanContext::from_headers(req.headers());
        let logger = Arc::new(RequestLogger::new(
            Arc::clone(&self.application),
            format_trace(&self.project_id, &span.trace_id),
            span.span_id,
        ));
        logger.set_level(self.level);

        let guard = AccessLogGuard::new(
            Arc::clone(&self.access),
            Arc::clone(&logger),
            describe_request(&req, ctx),
            ctx.started_at,
        );

        let previous = ctx.replace_logger(logger);
        let result = self.call_inner(req, ctx).await;
        let response = match result {
            Ok(response) => response,
            Err(err) => self.error_handler.handle_error(err, ctx),
        };
        ctx.replace_logger(previous);

        guard.finish(response.status(), response.body_len() as u64);
        response
    }

    async fn call_inner(&self, req: Request, ctx: &mut Context) -> Result<Response> {
        match self.timeout {
            Some(timeout) => tokio::time::timeout(timeout, self.inner.call(req, ctx))
                .await
                .unwrap_or_else(|_| {
                    Err(Error::Timeout {
                        duration_ms: timeout.as_millis() as u64,
                    })
                }),
            None => self.inner.call(req, ctx).await,
        }
    }
}

#[async_trait]
impl<H: Handler> Handler for LoggerMiddleware<H> {
    async fn call(&self, req: Request, ctx: &mut Context) -> Result<Response> {
        Ok(self.handle(req, ctx).await)
    }
}

/// Request half of the access-log descriptor, captured before the handler
/// consumes the request.
fn describe_request(req: &Request, ctx: &Context) -> HttpRequest {
    let remote_ip = req
        .forwarded_client()
        .map(str::to_string)
        .unwrap_or_else(|| ctx.client_ip.to_string());

    HttpRequest {
        request_method: req.method().to_string(),
        request_url: req.uri().to_string(),
        status: 0,
        latency: Duration::ZERO,
        remote_ip,
        response_size: 0,
        request_size: Some(req.body().len() as u64),
        user_agent: req.user_agent().map(str::to_string),
        referer: req.referer().map(str::to_string),
        protocol: Some(ctx.http_version.as_str().to_string()),
    }
}

/// Emits the access-log entry exactly once.
///
/// If dropped before [`AccessLogGuard::finish`], the entry is written with an
/// empty response and [`STATUS_CLIENT_CLOSED`], or 500 when the drop happens
/// while a panic unwinds.
struct AccessLogGuard {
    stream: Arc<LogStream>,
    logger: Arc<RequestLogger>,
    request: Option<HttpRequest>,
    started: Instant,
}

impl AccessLogGuard {
    fn new(
        stream: Arc<LogStream>,
        logger: Arc<RequestLogger>,
        request: HttpRequest,
        started: Instant,
    ) -> Self {
        Self {
            stream,
            logger,
            request: Some(request),
            started,
        }
    }

    fn finish(mut self, status: StatusCode, response_size: u64) {
        self.emit(status.as_u16(), response_size);
    }

    fn emit(&mut self, status: u16, response_size: u64) {
        let Some(mut request) = self.request.take() else {
            return;
        };
        request.status = status;
        request.latency = self.started.elapsed();
        request.response_size = response_size;

        // Timestamp is emission time.
        self.stream.log(LogEntry::access(
            self.logger.max_severity(),
            request,
            self.logger.trace(),
            self.logger.span_id(),
        ));
    }
}

impl Drop for AccessLogGuard {
    fn drop(&mut self) {
        let status = if std::thread::panicking() {
            StatusCode::INTERNAL_SERVER_ERROR.as_u16()
        } else {
            STATUS_CLIENT_CLOSED
        };
        self.emit(status, 0);
    }
}
