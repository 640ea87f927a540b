//! Error types for the rtichat client core.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A shared error type for the rtichat client core.
///
/// This provides typed, structured error variants with automatic conversion
/// from common error types via the `From` trait.
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
pub enum ChatError {
    /// The remote call never completed (connect failure or timeout).
    #[error("Network failure: {message}")]
    NetworkFailure { message: String },

    /// The remote store answered with a non-success status.
    #[error("Remote rejection ({status:?}): {message}")]
    RemoteRejection {
        status: Option<u16>,
        message: String,
    },

    /// The persisted snapshot could not be read back.
    #[error("Cache corruption: {message}")]
    CacheCorruption { message: String },

    /// The operation is not valid in the current session state.
    #[error("Invalid operation: {message}")]
    InvalidOperation { message: String },

    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization {
        format: String, // "JSON", "TOML", etc.
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ChatError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates a NetworkFailure error
    pub fn network_failure(message: impl Into<String>) -> Self {
        Self::NetworkFailure {
            message: message.into(),
        }
    }

    /// Creates a RemoteRejection error
    pub fn remote_rejection(status: Option<u16>, message: impl Into<String>) -> Self {
        Self::RemoteRejection {
            status,
            message: message.into(),
        }
    }

    /// Creates a CacheCorruption error
    pub fn cache_corruption(message: impl Into<String>) -> Self {
        Self::CacheCorruption {
            message: message.into(),
        }
    }

    /// Creates an InvalidOperation error
    pub fn invalid_operation(message: impl Into<String>) -> Self {
        Self::InvalidOperation {
            message: message.into(),
        }
    }

    /// Creates an IO error
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    /// Check if this is a NetworkFailure error
    pub fn is_network_failure(&self) -> bool {
        matches!(self, Self::NetworkFailure { .. })
    }

    /// Check if this is a RemoteRejection error
    pub fn is_remote_rejection(&self) -> bool {
        matches!(self, Self::RemoteRejection { .. })
    }

    /// Check if this is a CacheCorruption error
    pub fn is_cache_corruption(&self) -> bool {
        matches!(self, Self::CacheCorruption { .. })
    }

    /// Check if this is an InvalidOperation error
    pub fn is_invalid_operation(&self) -> bool {
        matches!(self, Self::InvalidOperation { .. })
    }

    /// Check if this error came back from the remote store, either as a
    /// transport failure or an explicit rejection.
    ///
    /// These are the failures `send_message` turns into an inline error
    /// notice instead of propagating.
    pub fn is_remote_failure(&self) -> bool {
        matches!(
            self,
            Self::NetworkFailure { .. } | Self::RemoteRejection { .. }
        )
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for ChatError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for ChatError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

/// Conversion from anyhow::Error (infrastructure internals)
impl From<anyhow::Error> for ChatError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// Conversion from String (for error messages)
impl From<String> for ChatError {
    fn from(err: String) -> Self {
        Self::Internal(err)
    }
}

/// A type alias for `Result<T, ChatError>`.
pub type Result<T> = std::result::Result<T, ChatError>;
