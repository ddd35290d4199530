//! HTTP server that feeds requests to a [`Handler`].
//!
//! Serves HTTP/1.1 and HTTP/2 (auto-detected) on a single listener, one task
//! per connection. Request bodies are buffered before the handler runs.
//!
//! # Example
//!
//! ```rust,ignore
//! use reqlog::config::ServerConfig;
//! use reqlog::server::Server;
//!
//! let server = Server::new(ServerConfig::new(addr), handler);
//! server.run().await?;
//! ```
//!
//! # Graceful Shutdown
//!
//! [`Server::trigger_shutdown`] stops the accept loop. Connections already
//! accepted finish their in-flight requests; [`Server::wait_for_drain`] waits
//! for them.

mod connection;

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use connection::ConnectionContext;

use crate::config::ServerConfig;
use crate::middleware::Handler;

/// HTTP server generic over the request [`Handler`].
pub struct Server<H: Handler> {
    config: ServerConfig,
    handler: Arc<H>,
    /// Active connections counter
    active_connections: Arc<AtomicUsize>,
    /// Shutdown signal sender
    shutdown_tx: watch::Sender<bool>,
    /// Shutdown signal receiver (cloneable)
    shutdown_rx: watch::Receiver<bool>,
    /// Shutdown initiated flag
    shutdown_initiated: Arc<AtomicBool>,
}

impl<H: Handler + 'static> Server<H> {
    pub fn new(config: ServerConfig, handler: H) -> Self {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        Self {
            config,
            handler: Arc::new(handler),
            active_connections: Arc::new(AtomicUsize::new(0)),
            shutdown_tx,
            shutdown_rx,
            shutdown_initiated: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Bind the configured listen address.
    pub async fn bind(&self) -> std::io::Result<TcpListener> {
        TcpListener::bind(self.config.listen_addr).await
    }

    /// Bind and serve until shutdown is triggered.
    pub async fn run(&self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let listener = self.bind().await?;
        self.serve(listener).await
    }

    /// Serve connections from an already bound listener until shutdown is
    /// triggered.
    pub async fn serve(
        &self,
        listener: TcpListener,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        info!(addr = %listener.local_addr()?, "Server listening");

        let ctx = Arc::new(ConnectionContext {
            handler: Arc::clone(&self.handler),
            header_timeout: self.config.header_timeout,
            active_connections: Arc::clone(&self.active_connections),
        });
        let mut shutdown_rx = self.shutdown_rx.clone();

        loop {
            tokio::select! {
                result = listener.accept() => {
                    match result {
                        Ok((stream, remote_addr)) => {
                            let ctx = Arc::clone(&ctx);
                            tokio::spawn(async move {
                                ctx.handle_connection(stream, remote_addr).await;
                            });
                        }
                        Err(e) => {
                            error!("Accept error: {}", e);
                        }
                    }
                }
                _ = shutdown_rx.changed() => {
                    debug!("Received shutdown signal, stopping accept loop");
                    break;
                }
            }
        }

        Ok(())
    }

    /// Trigger graceful shutdown.
    /// Stops accepting new connections.
    pub fn trigger_shutdown(&self) {
        if self.shutdown_initiated.swap(true, Ordering::SeqCst) {
            return; // Already initiated
        }
        let _ = self.shutdown_tx.send(true);
    }

    /// Get current active connections count.
    pub fn active_connections(&self) -> usize {
        self.active_connections.load(Ordering::Relaxed)
    }

    /// Wait for all active connections to drain.
    /// Returns true if drained successfully, false if timeout was reached.
    pub async fn wait_for_drain(&self, timeout: Duration) -> bool {
        let start = std::time::Instant::now();
        let check_interval = Duration::from_millis(100);

        loop {
            let active = self.active_connections.load(Ordering::Relaxed);
            if active == 0 {
                return true;
            }

            if start.elapsed() >= timeout {
                warn!("Drain timeout reached with {} active connections", active);
                return false;
            }

            debug!("Waiting for {} connections to drain...", active);
            tokio::time::sleep(check_interval).await;
        }
    }
}
