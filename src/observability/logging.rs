//! # Structured Logging
//!
//! Tracing subscriber setup for the bootplane binary. Log output goes to
//! stderr so a document rendered to stdout stays clean.

use tracing_subscriber::EnvFilter;

use crate::config::{LogConfig, LogFormat};
use crate::errors::{Error, Result};

/// Initialize the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over the configured level when set. Fails if
/// a subscriber is already installed or the filter directive does not parse.
pub fn init_logging(config: &LogConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .map_err(|e| Error::config(format!("Invalid log level '{}': {}", config.level, e)))?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    let initialized = match config.format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Text => builder.try_init(),
    };

    initialized.map_err(|e| Error::config(format!("Failed to initialize logging: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_level_is_a_config_error() {
        // RUST_LOG would shadow the configured level entirely.
        std::env::remove_var("RUST_LOG");
        let config = LogConfig {
            level: "not-a-directive=!!".to_string(),
            format: LogFormat::Text,
        };
        let err = init_logging(&config).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
