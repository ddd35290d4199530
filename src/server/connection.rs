//! Per-connection request handling.

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming as IncomingBody;
use hyper::service::service_fn;
use hyper_util::rt::{TokioExecutor, TokioIo, TokioTimer};
use hyper_util::server::conn::auto;
use tokio::net::TcpStream;
use tracing::debug;

use crate::core::{Context, HttpVersion, Request, Response};
use crate::middleware::Handler;

/// Check if an error is a common connection reset or timeout.
#[inline]
fn is_connection_error(err_str: &str) -> bool {
    err_str.contains("connection reset")
        || err_str.contains("broken pipe")
        || err_str.contains("Connection reset")
        || err_str.contains("os error 104")
        || err_str.contains("os error 32")
        || err_str.contains("timed out")
        || err_str.contains("deadline has elapsed")
        || err_str.contains("HeaderTimeout") // Slowloris protection timeout
}

/// State shared by all connections of one server.
pub(super) struct ConnectionContext<H> {
    pub handler: Arc<H>,
    /// Header read timeout (HEADER_TIMEOUT_SECS, default: 5s).
    pub header_timeout: Duration,
    pub active_connections: Arc<AtomicUsize>,
}

impl<H: Handler + 'static> ConnectionContext<H> {
    /// Serve one TCP connection until the peer closes it.
    pub async fn handle_connection(self: Arc<Self>, stream: TcpStream, remote_addr: SocketAddr) {
        self.active_connections.fetch_add(1, Ordering::Relaxed);

        let ctx = Arc::clone(&self);
        let service = service_fn(move |req| {
            let ctx = Arc::clone(&ctx);
            async move { ctx.handle_request(req, remote_addr).await }
        });

        let io = TokioIo::new(stream);
        if let Err(err) = auto::Builder::new(TokioExecutor::new())
            .http1()
            .timer(TokioTimer::new())
            .header_read_timeout(Some(self.header_timeout))
            .keep_alive(true)
            .http2()
            .max_concurrent_streams(250)
            .serve_connection(io, service)
            .await
        {
            let err_str = format!("{:?}", err);
            if !is_connection_error(&err_str) {
                debug!("Connection error: {:?}", err);
            }
        }

        self.active_connections.fetch_sub(1, Ordering::Relaxed);
    }

    async fn handle_request(
        &self,
        req: hyper::Request<IncomingBody>,
        remote_addr: SocketAddr,
    ) -> Result<hyper::Response<Full<Bytes>>, Infallible> {
        let (parts, body) = req.into_parts();
        let body = match body.collect().await {
            Ok(collected) => collected.to_bytes(),
            Err(e) => {
                debug!(peer = %remote_addr, "Failed to read request body: {}", e);
                return Ok(into_hyper(Response::from_status(
                    http::StatusCode::BAD_REQUEST,
                )));
            }
        };

        let version = HttpVersion::from_http(parts.version);
        let request = Request::from(http::Request::from_parts(parts, body));
        let mut ctx = Context::new(remote_addr.ip()).with_http_version(version);

        let response = match self.handler.call(request, &mut ctx).await {
            Ok(response) => response,
            Err(err) => {
                debug!(peer = %remote_addr, "Unhandled handler error: {}", err);
                Response::from_status(err.status_code())
            }
        };

        Ok(into_hyper(response))
    }
}

#[inline]
fn into_hyper(response: Response) -> hyper::Response<Full<Bytes>> {
    http::Response::<Bytes>::from(response).map(Full::new)
}
