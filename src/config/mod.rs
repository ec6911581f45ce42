//! # Configuration Management
//!
//! Environment-driven configuration for the bootplane binary. Only the
//! binary's own behavior is configurable; every infrastructure value inside
//! the rendered document is a fixed constant owned by the `bootstrap` module.

use crate::errors::{Error, Result};

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Default filter directive when `RUST_LOG` is unset.
    pub level: String,
    /// Output format.
    pub format: LogFormat,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Text,
        }
    }
}

/// Application configuration
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub log: LogConfig,
}

impl Config {
    /// Create configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let level =
            std::env::var("BOOTPLANE_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let format = match std::env::var("BOOTPLANE_LOG_FORMAT") {
            Ok(value) => match value.to_ascii_lowercase().as_str() {
                "text" => LogFormat::Text,
                "json" => LogFormat::Json,
                other => {
                    return Err(Error::config(format!(
                        "Invalid BOOTPLANE_LOG_FORMAT '{}', expected 'text' or 'json'",
                        other
                    )))
                }
            },
            Err(_) => LogFormat::Text,
        };

        Ok(Self {
            log: LogConfig { level, format },
        })
    }
}
