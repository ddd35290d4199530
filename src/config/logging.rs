//! Logging configuration.

use super::parse::{env_or, env_parse};
use super::ConfigError;
use crate::severity::Severity;

/// Logging configuration loaded from environment.
#[derive(Clone, Debug)]
pub struct LoggingConfig {
    /// Diagnostics filter (from LOG_LEVEL or RUST_LOG).
    pub filter: String,
    /// Service name for diagnostics output.
    pub service_name: String,
    /// Minimum severity forwarded to the application log stream.
    pub app_level: Severity,
}

impl LoggingConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            filter: resolve_log_filter(
                std::env::var("LOG_LEVEL").ok(),
                std::env::var("RUST_LOG").ok(),
            ),
            service_name: env_or("SERVICE_NAME", "reqlog"),
            app_level: env_parse("APP_LOG_LEVEL", Severity::Info)?,
        })
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "reqlog=info".to_string(),
            service_name: "reqlog".to_string(),
            app_level: Severity::Info,
        }
    }
}

/// Resolve the diagnostics filter.
///
/// Priority: LOG_LEVEL > RUST_LOG > default (info)
///
/// LOG_LEVEL accepts simple values: trace, debug, info, warn, error
/// RUST_LOG accepts full tracing filter syntax: reqlog=debug,hyper=warn
fn resolve_log_filter(log_level: Option<String>, rust_log: Option<String>) -> String {
    if let Some(level) = log_level {
        let level = level.to_lowercase();
        match level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {
                return format!("reqlog={}", level);
            }
            _ => {
                // Subscriber is not up yet
                eprintln!(
                    "Warning: Invalid LOG_LEVEL '{}', expected: trace, debug, info, warn, error",
                    level
                );
            }
        }
    }

    rust_log.unwrap_or_else(|| "reqlog=info".to_string())
}
