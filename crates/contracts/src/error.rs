//! Layered error definitions
//!
//! Categorized by source: config / transport / provider / runtime fault / aggregate

use thiserror::Error;

/// Unified error type
#[derive(Debug, Error)]
pub enum NofyError {
    // ===== Configuration Errors =====
    /// A required option is missing or invalid at construction time
    #[error("{message}")]
    Config { field: String, message: String },

    // ===== Transport Errors =====
    /// Request construction, network send or body read failed
    #[error("{operation}: {source}")]
    Transport {
        operation: &'static str,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    // ===== Provider Errors =====
    /// The remote service answered but signaled failure
    #[error("{message}")]
    Provider { provider: String, message: String },

    /// Payload could not be encoded or a response could not be decoded
    #[error("{message}")]
    Serialization { message: String },

    // ===== Runtime Errors =====
    /// The send context was cancelled before completion
    #[error("context cancelled")]
    Cancelled,

    /// A messenger panicked and the fault barrier recovered it
    #[error("panic recovered in messenger '{messenger}': {message}")]
    Panicked { messenger: String, message: String },

    // ===== Aggregate =====
    /// One or more failures collected from a fan-out
    #[error("errors: {}", join_messages(.0))]
    Aggregate(Vec<NofyError>),

    /// Other error
    #[error("{0}")]
    Other(String),
}

fn join_messages(errors: &[NofyError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl NofyError {
    /// Create a configuration error for a missing option (`"missing <field>"`)
    pub fn missing(field: impl Into<String>) -> Self {
        let field = field.into();
        Self::Config {
            message: format!("missing {field}"),
            field,
        }
    }

    /// Create a configuration error with a custom message
    pub fn config(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Config {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a transport error wrapping the underlying cause
    pub fn transport(
        operation: &'static str,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::Transport {
            operation,
            source: source.into(),
        }
    }

    /// Create a provider rejection error
    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Provider {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Create a serialization error
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization {
            message: message.into(),
        }
    }

    /// Create a recovered-panic error
    pub fn panicked(messenger: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Panicked {
            messenger: messenger.into(),
            message: message.into(),
        }
    }

    /// Create an error with a verbatim message
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other(message.into())
    }

    /// Collapse a list of failures: empty means success
    pub fn aggregate(errors: Vec<NofyError>) -> Result<(), NofyError> {
        if errors.is_empty() {
            Ok(())
        } else {
            Err(Self::Aggregate(errors))
        }
    }

    /// Whether this error (or any aggregated error) is a recovered panic
    pub fn is_panic(&self) -> bool {
        match self {
            Self::Panicked { .. } => true,
            Self::Aggregate(errors) => errors.iter().any(Self::is_panic),
            _ => false,
        }
    }
}
