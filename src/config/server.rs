//! Server configuration.

use std::net::SocketAddr;
use std::time::Duration;

use super::parse::{env_duration, env_opt, env_parse, parse_duration};
use super::ConfigError;
use crate::sink::DEFAULT_CAPACITY;

/// Request timeout configuration.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RequestTimeout(pub Option<Duration>);

impl RequestTimeout {
    /// Parse duration string (e.g., "30s", "2m", "off").
    pub fn parse(s: &str) -> Result<Self, String> {
        parse_duration(s).map(Self)
    }

    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.0.is_some()
    }

    #[inline]
    pub fn as_duration(&self) -> Option<Duration> {
        self.0
    }
}

/// Server configuration loaded from environment.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Listen address (default: 0.0.0.0:8080, or 0.0.0.0:$PORT).
    pub listen_addr: SocketAddr,
    /// Per-request deadline (default: off).
    pub request_timeout: RequestTimeout,
    /// HTTP/1 header read timeout.
    pub header_timeout: Duration,
    /// Capacity of the log writer channel.
    pub log_buffer: usize,
}

impl ServerConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let addr = resolve_listen_addr(env_opt("LISTEN_ADDR"), env_opt("PORT"));
        let listen_addr: SocketAddr = addr.parse().map_err(|e| ConfigError::Parse {
            key: "LISTEN_ADDR".into(),
            value: addr.clone(),
            error: format!("{}", e),
        })?;

        let request_timeout = RequestTimeout(env_duration("REQUEST_TIMEOUT", "off")?);

        let header_timeout_secs: u64 = env_parse("HEADER_TIMEOUT_SECS", 5)?;

        let log_buffer: usize = env_parse("LOG_BUFFER", DEFAULT_CAPACITY)?;
        if log_buffer == 0 {
            return Err(ConfigError::Invalid {
                key: "LOG_BUFFER".into(),
                message: "must be greater than 0".into(),
            });
        }

        Ok(Self {
            listen_addr,
            request_timeout,
            header_timeout: Duration::from_secs(header_timeout_secs),
            log_buffer,
        })
    }

    /// Configuration listening on `addr` with defaults for everything else.
    pub fn new(listen_addr: SocketAddr) -> Self {
        Self {
            listen_addr,
            request_timeout: RequestTimeout::default(),
            header_timeout: Duration::from_secs(5),
            log_buffer: DEFAULT_CAPACITY,
        }
    }
}

/// LISTEN_ADDR wins; otherwise PORT (set by App Engine) on all interfaces.
fn resolve_listen_addr(listen_addr: Option<String>, port: Option<String>) -> String {
    match (listen_addr, port) {
        (Some(addr), _) => addr,
        (None, Some(port)) => format!("0.0.0.0:{}", port),
        (None, None) => "0.0.0.0:8080".to_string(),
    }
}
