//! Configuration module for reqlog.
//!
//! This module provides centralized configuration loading from environment variables.
//!
//! # Example
//!
//! ```rust,ignore
//! use reqlog::config::Config;
//!
//! let config = Config::from_env()?;
//! println!("Listen address: {}", config.server.listen_addr);
//! println!("Request log: {}", config.resource.request_log_name());
//! ```

mod error;
mod logging;
mod parse;
mod resource;
mod server;

pub use error::ConfigError;
pub use logging::LoggingConfig;
pub use parse::parse_duration;
pub use resource::ResourceConfig;
pub use server::{RequestTimeout, ServerConfig};

/// Complete application configuration.
#[derive(Clone, Debug)]
pub struct Config {
    /// Server configuration.
    pub server: ServerConfig,
    /// Deployment identity attached to both log streams.
    pub resource: ResourceConfig,
    /// Logging configuration.
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            server: ServerConfig::from_env()?,
            resource: ResourceConfig::from_env()?,
            logging: LoggingConfig::from_env()?,
        })
    }

    /// Print configuration summary to log.
    pub fn log_summary(&self) {
        use tracing::info;

        info!("Configuration loaded:");
        info!("  Listen: {}", self.server.listen_addr);
        info!(
            "  Resource: module={} project={} version={} zone={}",
            self.resource.module_id,
            self.resource.project_id,
            self.resource.version_id,
            self.resource.zone
        );
        info!(
            "  Streams: {}, {}",
            self.resource.request_log_name(),
            self.resource.application_log_name()
        );
        info!("  Application log level: {}", self.logging.app_level);
        info!("  Log buffer: {}", self.server.log_buffer);

        match self.server.request_timeout.as_duration() {
            Some(timeout) => info!("  Request timeout: {:?}", timeout),
            None => info!("  Request timeout: disabled"),
        }
    }
}
