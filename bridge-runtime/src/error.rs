//! Error types for bridge-runtime.

use bridge_backend::BackendError;
use thiserror::Error;

/// Errors from bridge operations.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// The backend call failed.
    #[error(transparent)]
    Backend(#[from] BackendError),

    /// The runtime is gone; its command receiver was dropped.
    #[error("bridge channel closed")]
    ChannelClosed,

    /// Invalid runtime configuration.
    #[error("invalid config: {0}")]
    InvalidConfig(String),
}

impl BridgeError {
    /// Code reported to the UI for this failure.
    pub fn code(&self) -> &str {
        match self {
            BridgeError::Backend(err) => err.code(),
            BridgeError::ChannelClosed => "cancelled",
            BridgeError::InvalidConfig(_) => "invalid-argument",
        }
    }
}
