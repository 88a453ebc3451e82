//! Error types and handling for the forecast pipeline
//!
//! Only caller contract violations and configuration problems surface as
//! errors. Malformed forecast data is degraded locally by the pipeline
//! stages and never reaches this type.

use thiserror::Error;

/// Main error type for the forecast pipeline
#[derive(Error, Debug)]
pub enum ForecastError {
    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Rejected caller input (day count, device profile, format name)
    #[error("Invalid input: {message}")]
    Validation { message: String },

    /// I/O operation errors
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

impl ForecastError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Whether the error is a rejected request rather than a local fault
    #[must_use]
    pub fn is_rejected_input(&self) -> bool {
        matches!(self, ForecastError::Validation { .. })
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            ForecastError::Config { .. } => {
                "Configuration error. Please check your config file and device limits.".to_string()
            }
            ForecastError::Validation { message } => {
                format!("Invalid request: {message}")
            }
            ForecastError::Io { .. } => {
                "File operation failed. Please check file permissions.".to_string()
            }
        }
    }
}
