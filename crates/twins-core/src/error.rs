//! Error types for the Digital Twins orchestrator.
//!
//! Failures are scoped: [`SubmitError`], [`PollError`] and [`PollTimeout`]
//! belong to a single persona's job, [`StorageError`] belongs to the local
//! history store and is always absorbed. [`TwinsError`] is the crate-wide
//! error used for configuration and validation failures.

use std::time::Duration;

use thiserror::Error;

/// A shared error type for the orchestrator and its surrounding layers.
#[derive(Error, Debug, Clone)]
pub enum TwinsError {
    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization {
        format: String, // "TOML", "JSON", etc.
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Caller supplied an invalid request (e.g. an empty persona selection)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Entity not found error with type information
    #[error("Entity not found: {entity_type} '{id}'")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl TwinsError {
    /// Creates a NotFound error
    pub fn not_found(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type,
            id: id.into(),
        }
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates a Validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

impl From<std::io::Error> for TwinsError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for TwinsError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for TwinsError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::ser::Error> for TwinsError {
    fn from(err: toml::ser::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<StorageError> for TwinsError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Io(message) => Self::Io { message },
            StorageError::Serialization(message) => Self::Serialization {
                format: "JSON".to_string(),
                message,
            },
            StorageError::Unavailable(message) => Self::Internal(message),
        }
    }
}

/// Failure to create a job on the remote service.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SubmitError {
    /// The request never produced an HTTP response (connect, DNS, timeout).
    #[error("submission transport failure: {0}")]
    Transport(String),

    /// The service answered with a non-success status or without a job id.
    #[error("submission rejected ({status}): {message}")]
    Rejected { status: u16, message: String },
}

/// Failure to read a job's status (or any other read-only endpoint).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PollError {
    #[error("poll transport failure: {0}")]
    Transport(String),

    #[error("poll rejected ({status}): {message}")]
    Rejected { status: u16, message: String },

    /// The response body did not match the expected shape.
    #[error("malformed poll response: {0}")]
    Malformed(String),
}

/// A job did not reach a terminal status within the configured bound.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("generation timed out after {}s without a result", .elapsed.as_secs())]
pub struct PollTimeout {
    pub elapsed: Duration,
}

/// Local persistence failure. Never surfaced to the user.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    #[error("storage I/O error: {0}")]
    Io(String),

    #[error("storage serialization error: {0}")]
    Serialization(String),

    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

impl From<std::io::Error> for StorageError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(format!("{} (kind: {:?})", err, err.kind()))
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// A type alias for `Result<T, TwinsError>`.
pub type Result<T> = std::result::Result<T, TwinsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_message_mentions_elapsed_seconds() {
        let err = PollTimeout {
            elapsed: Duration::from_secs(120),
        };
        assert_eq!(
            err.to_string(),
            "generation timed out after 120s without a result"
        );
    }

    #[test]
    fn test_storage_error_converts_to_twins_error() {
        let err: TwinsError = StorageError::Serialization("bad json".into()).into();
        assert!(matches!(err, TwinsError::Serialization { ref format, .. } if format == "JSON"));
    }

    #[test]
    fn test_io_error_conversion_keeps_kind() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: TwinsError = io.into();
        assert!(err.to_string().contains("NotFound"));
    }
}
