//! Result and error types for Spyglass.

use crate::clock::ClockError;
use thiserror::Error;

/// Result type for Spyglass operations
pub type SpyResult<T> = Result<T, SpyError>;

/// Errors that can occur in Spyglass
#[derive(Debug, Error)]
pub enum SpyError {
    /// Slot cannot be spied on or invoked
    #[error("Cannot use '{object}.{key}': {reason}")]
    InvalidTarget {
        /// Name of the target object
        object: String,
        /// Slot key
        key: String,
        /// Why the slot was rejected
        reason: String,
    },

    /// Handle was restored or retired by registry teardown
    #[error("Mock '{name}' is stale (restored or torn down)")]
    StaleHandle {
        /// Mock display name
        name: String,
    },

    /// Fake clock error
    #[error("Clock error: {0}")]
    Clock(#[from] ClockError),

    /// Configuration error
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
}

impl SpyError {
    /// Create an invalid target error
    #[must_use]
    pub fn invalid_target(
        object: impl Into<String>,
        key: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidTarget {
            object: object.into(),
            key: key.into(),
            reason: reason.into(),
        }
    }

    /// Create a stale handle error
    #[must_use]
    pub fn stale(name: impl Into<String>) -> Self {
        Self::StaleHandle { name: name.into() }
    }

    /// Create a configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }
}
