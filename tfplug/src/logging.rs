//! Logging setup for provider processes
//!
//! Terraform reads provider output on stdout for the plugin handshake, so all
//! log output goes to stderr. The level follows `TF_LOG` unless given.

use crate::error::{Result, TfplugError};

/// Log level for the provider process
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Parse a `TF_LOG`-style level name; case-insensitive
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_uppercase().as_str() {
            "TRACE" | "JSON" => Some(LogLevel::Trace),
            "DEBUG" => Some(LogLevel::Debug),
            "INFO" => Some(LogLevel::Info),
            "WARN" => Some(LogLevel::Warn),
            "ERROR" => Some(LogLevel::Error),
            _ => None,
        }
    }

    /// Level from `TF_LOG`, defaulting to `Info`
    pub fn from_env() -> Self {
        std::env::var("TF_LOG")
            .ok()
            .and_then(|v| Self::parse(&v))
            .unwrap_or(LogLevel::Info)
    }
}

impl From<LogLevel> for tracing::Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => tracing::Level::TRACE,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Error => tracing::Level::ERROR,
        }
    }
}

/// Install a global stderr subscriber at `level`
/// Fails if a global subscriber has already been set
pub fn init(level: LogLevel) -> Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::from(level))
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| TfplugError::LoggingError(e.to_string()))
}

/// Like [`init`] with the level taken from `TF_LOG`; an already-installed
/// subscriber is left in place
pub fn init_from_env() {
    if let Err(e) = init(LogLevel::from_env()) {
        tracing::debug!("logging already initialised: {}", e);
    }
}
