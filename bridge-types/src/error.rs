//! Error types for meetbridge port messages.

use thiserror::Error;

/// Errors that can occur while encoding or decoding port messages.
#[derive(Debug, Error)]
pub enum TypesError {
    /// JSON serialization failed
    #[error("encoding failed: {0}")]
    Encode(#[source] serde_json::Error),

    /// JSON deserialization failed
    #[error("decoding failed: {0}")]
    Decode(#[source] serde_json::Error),
}
