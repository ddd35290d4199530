//! Log severity levels.
//!
//! Severities follow the Cloud Logging scale and are totally ordered:
//!
//! ```text
//! DEFAULT < DEBUG < INFO < NOTICE < WARNING < ERROR < CRITICAL < ALERT < EMERGENCY
//! ```
//!
//! `DEFAULT` doubles as the "nothing logged" value of an aggregated severity.

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU8, Ordering};

use serde::{Deserialize, Serialize};

/// Ordered log severity.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "UPPERCASE")]
#[repr(u8)]
pub enum Severity {
    /// No severity assigned.
    #[default]
    Default = 0,
    Debug = 1,
    Info = 2,
    Notice = 3,
    Warning = 4,
    Error = 5,
    /// Fatal-equivalent.
    Critical = 6,
    Alert = 7,
    Emergency = 8,
}

impl Severity {
    /// All severities in ascending order.
    pub const ALL: [Severity; 9] = [
        Severity::Default,
        Severity::Debug,
        Severity::Info,
        Severity::Notice,
        Severity::Warning,
        Severity::Error,
        Severity::Critical,
        Severity::Alert,
        Severity::Emergency,
    ];

    /// Upper-case name as written to log records.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Severity::Default => "DEFAULT",
            Severity::Debug => "DEBUG",
            Severity::Info => "INFO",
            Severity::Notice => "NOTICE",
            Severity::Warning => "WARNING",
            Severity::Error => "ERROR",
            Severity::Critical => "CRITICAL",
            Severity::Alert => "ALERT",
            Severity::Emergency => "EMERGENCY",
        }
    }

    /// Numeric Cloud Logging code (0, 100, ..., 800).
    #[inline]
    pub const fn code(&self) -> u16 {
        (*self as u16) * 100
    }

    #[inline]
    const fn from_u8(value: u8) -> Self {
        match value {
            0 => Severity::Default,
            1 => Severity::Debug,
            2 => Severity::Info,
            3 => Severity::Notice,
            4 => Severity::Warning,
            5 => Severity::Error,
            6 => Severity::Critical,
            7 => Severity::Alert,
            _ => Severity::Emergency,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown severity name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseSeverityError(String);

impl fmt::Display for ParseSeverityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown severity '{}', expected one of: default, debug, info, notice, warning, error, critical, alert, emergency",
            self.0
        )
    }
}

impl std::error::Error for ParseSeverityError {}

impl FromStr for Severity {
    type Err = ParseSeverityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "default" => Ok(Severity::Default),
            "debug" | "trace" => Ok(Severity::Debug),
            "info" => Ok(Severity::Info),
            "notice" => Ok(Severity::Notice),
            "warning" | "warn" => Ok(Severity::Warning),
            "error" => Ok(Severity::Error),
            "critical" | "fatal" => Ok(Severity::Critical),
            "alert" => Ok(Severity::Alert),
            "emergency" => Ok(Severity::Emergency),
            _ => Err(ParseSeverityError(s.to_string())),
        }
    }
}

impl From<tracing::Level> for Severity {
    fn from(level: tracing::Level) -> Self {
        match level {
            tracing::Level::TRACE | tracing::Level::DEBUG => Severity::Debug,
            tracing::Level::INFO => Severity::Info,
            tracing::Level::WARN => Severity::Warning,
            tracing::Level::ERROR => Severity::Error,
        }
    }
}

/// Severity cell that can be shared across tasks.
///
/// `raise` is a fetch-max, so concurrent writers can only move the value up.
#[derive(Debug, Default)]
pub struct AtomicSeverity(AtomicU8);

impl AtomicSeverity {
    pub const fn new(severity: Severity) -> Self {
        Self(AtomicU8::new(severity as u8))
    }

    #[inline]
    pub fn load(&self) -> Severity {
        Severity::from_u8(self.0.load(Ordering::Acquire))
    }

    #[inline]
    pub fn store(&self, severity: Severity) {
        self.0.store(severity as u8, Ordering::Release);
    }

    /// Raise to `max(current, severity)`, returning the previous value.
    #[inline]
    pub fn raise(&self, severity: Severity) -> Severity {
        Severity::from_u8(self.0.fetch_max(severity as u8, Ordering::AcqRel))
    }
}
