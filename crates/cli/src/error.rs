//! Error types for CLI operations.

use thiserror::Error;

/// CLI-specific error types
#[derive(Error, Debug)]
pub enum CliError {
    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: String },

    /// `--only` named a messenger absent from the configuration
    #[error("Unknown messenger '{name}' (configured: {available})")]
    UnknownMessenger { name: String, available: String },

    /// At least one messenger failed
    #[error("{failed} of {total} messengers failed")]
    SendFailed { failed: usize, total: usize },

    /// Configuration validation error
    #[error("Configuration validation failed: {message}")]
    ConfigValidation { message: String },
}

impl CliError {
    pub fn config_not_found(path: impl Into<String>) -> Self {
        Self::ConfigNotFound { path: path.into() }
    }

    pub fn unknown_messenger(name: impl Into<String>, available: &[&str]) -> Self {
        Self::UnknownMessenger {
            name: name.into(),
            available: available.join(", "),
        }
    }

    pub fn send_failed(failed: usize, total: usize) -> Self {
        Self::SendFailed { failed, total }
    }

    pub fn config_validation(message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            message: message.into(),
        }
    }
}
