//! reqlog - per-request severity-aggregating logging for HTTP services.
//!
//! Every request gets its own logger. Entries it writes go to the
//! application log stream tagged with the request's trace and span; when the
//! request completes, exactly one access-log entry is written whose severity
//! is the highest severity logged while handling it. Operators see the worst
//! outcome of a request on its access-log line and pivot to the details via
//! the shared trace.
//!
//! # Architecture
//!
//! ```text
//! Server ──► LoggerMiddleware ──► Handler
//!                 │                  │ ctx.logger().warning(..)
//!                 │                  ▼
//!                 │            RequestLogger ──► "<module>_application"
//!                 ▼
//!         "<module>_request"  (severity = max logged)
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use reqlog::middleware::{handler_fn, LoggerMiddleware};
//! use reqlog::sink::WriterSink;
//! use reqlog::{Config, Server};
//!
//! let config = Config::from_env()?;
//! let (sink, writer) = WriterSink::stdout(config.server.log_buffer);
//! let sink = Arc::new(sink);
//!
//! let app = handler_fn(|_req, ctx| {
//!     ctx.logger().info("hello");
//!     Ok(reqlog::core::Response::ok("Hello"))
//! });
//! let hook = LoggerMiddleware::new(app, sink.clone(), sink, &config.resource);
//! Server::new(config.server, hook).run().await?;
//! ```

/// Package version from Cargo.toml
pub const PKG_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Git commit hash (8 chars), empty outside a git checkout
pub const BUILD_VERSION: &str = env!("BUILD_VERSION");

pub mod config;
pub mod core;
pub mod entry;
pub mod logger;
pub mod logging;
pub mod middleware;
pub mod server;
pub mod severity;
pub mod sink;
pub mod trace_context;

// Re-exports for convenience
pub use config::Config;
pub use logger::RequestLogger;
pub use middleware::{Handler, LoggerMiddleware};
pub use server::Server;
pub use severity::Severity;
