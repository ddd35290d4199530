//! Request handlers and the request-logging middleware.
//!
//! A [`Handler`] turns a [`Request`] into a [`Response`]. Middleware is a
//! handler that wraps another handler, so layers compose by nesting:
//!
//! ```text
//! Server → LoggerMiddleware → App
//!               │
//!               ├─ installs a RequestLogger in the Context
//!               ├─ routes App errors to the ErrorHandler
//!               └─ emits one access-log entry
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use reqlog::middleware::{handler_fn, LoggerMiddleware};
//! use reqlog::core::Response;
//!
//! let app = handler_fn(|req, ctx| {
//!     ctx.logger().info(format!("serving {}", req.path()));
//!     Ok(Response::ok("Hello"))
//! });
//!
//! let hook = LoggerMiddleware::new(app, access_sink, app_sink, &config.resource);
//! ```

mod request_log;

pub use request_log::{LoggerMiddleware, STATUS_CLIENT_CLOSED};

use std::sync::Arc;

use async_trait::async_trait;

use crate::core::{Context, Error, Request, Response, Result};

/// Asynchronous request handler.
///
/// Handlers read the per-request logger from [`Context::logger`].
#[async_trait]
pub trait Handler: Send + Sync {
    /// Handle one request.
    async fn call(&self, req: Request, ctx: &mut Context) -> Result<Response>;
}

#[async_trait]
impl<H> Handler for Arc<H>
where
    H: Handler + ?Sized,
{
    #[inline]
    async fn call(&self, req: Request, ctx: &mut Context) -> Result<Response> {
        (**self).call(req, ctx).await
    }
}

/// Handler built from a synchronous closure. See [`handler_fn`].
pub struct HandlerFn<F> {
    f: F,
}

/// Wrap a closure as a [`Handler`].
pub fn handler_fn<F>(f: F) -> HandlerFn<F>
where
    F: Fn(&Request, &Context) -> Result<Response> + Send + Sync,
{
    HandlerFn { f }
}

#[async_trait]
impl<F> Handler for HandlerFn<F>
where
    F: Fn(&Request, &Context) -> Result<Response> + Send + Sync,
{
    async fn call(&self, req: Request, ctx: &mut Context) -> Result<Response> {
        (self.f)(&req, ctx)
    }
}

/// Converts handler errors into responses.
pub trait ErrorHandler: Send + Sync {
    fn handle_error(&self, err: Error, ctx: &Context) -> Response;
}

/// Answers with the error's status and its reason phrase.
///
/// Server errors are logged at ERROR through the request logger, so they
/// show up in the access-log severity. Client errors are not logged.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultErrorHandler;

impl ErrorHandler for DefaultErrorHandler {
    fn handle_error(&self, err: Error, ctx: &Context) -> Response {
        let status = err.status_code();
        if status.is_server_error() {
            ctx.logger().error(err.to_string());
        }
        Response::from_status(status)
    }
}
