//! Core types for HTTP request/response handling.
//!
//! - [`Request`] - HTTP request with a buffered body
//! - [`Response`] - HTTP response
//! - [`Context`] - request-scoped state, including the request logger
//! - [`Error`] - errors returned by handlers
//!
//! # Example
//!
//! ```rust,ignore
//! use reqlog::core::{Context, Request, Response};
//!
//! fn handle_request(req: &Request, ctx: &Context) -> Response {
//!     ctx.logger().info(format!("serving {}", req.path()));
//!     Response::ok("Hello, World!")
//! }
//! ```

mod context;
mod error;
mod request;
mod response;

pub use context::{Context, HttpVersion};
pub use error::{Error, Result};
pub use request::Request;
pub use response::Response;
