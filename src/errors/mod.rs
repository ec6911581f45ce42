//! # Error Handling
//!
//! This module defines the crate-wide error type and result alias used
//! throughout bootplane.

/// Custom result type for bootplane operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for bootplane operations
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Configuration errors (environment variables, policy files)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Shape validation failures on policy input
    #[error("Validation error: {0}")]
    Validation(String),

    /// Bootstrap document serialization failures
    #[error("Failed to render bootstrap config: {source}")]
    Render {
        #[from]
        source: serde_yaml::Error,
    },

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display() {
        let err = Error::config("missing value");
        assert_eq!(err.to_string(), "Configuration error: missing value");
    }

    #[test]
    fn test_validation_error_display() {
        let err = Error::validation("port out of range");
        assert_eq!(err.to_string(), "Validation error: port out of range");
    }

    #[test]
    fn test_render_error_wraps_yaml_source() {
        let yaml_err = serde_yaml::from_str::<serde_yaml::Value>("{").unwrap_err();
        let err = Error::from(yaml_err);
        assert!(matches!(err, Error::Render { .. }));
        assert!(err.to_string().starts_with("Failed to render bootstrap config:"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let err = Error::from(io_err);
        assert!(matches!(err, Error::Io(_)));
    }
}
