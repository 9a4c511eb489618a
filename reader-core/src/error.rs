//! Error types for reader operations.

use thiserror::Error;

/// Result type for reader operations.
pub type ReaderResult<T> = Result<T, ReaderError>;

/// Errors that can occur outside the interactive pipeline.
///
/// The crop machine, selection layer and sentence reconstruction are total;
/// these errors only come from configuration and serialized input.
#[derive(Debug, Error)]
pub enum ReaderError {
    /// A configuration value is out of range.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// JSON serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Errors reported by a text detection collaborator.
///
/// The session turns every one of these into an empty region list.
#[derive(Debug, Error)]
pub enum DetectError {
    /// The request never completed (connection, timeout, ...).
    #[error("Detection transport failed: {0}")]
    Transport(String),

    /// The service answered with a non-success status.
    #[error("Detection service returned status {0}")]
    Status(u16),

    /// The response body was not a list of text annotations.
    #[error("Failed to parse detection payload: {0}")]
    Parse(#[from] serde_json::Error),
}
