//! Error types for the twinpane engine
//!
//! The diff, chunk, alignment and scroll functions are pure and total over
//! well-formed string inputs, so errors only arise at the edges: the worker
//! transport and the wire format. Stale worker responses are deliberately
//! not an error; callers discard them by request id.

use thiserror::Error;

/// Type alias for Results in the twinpane engine
pub type Result<T> = std::result::Result<T, TwinpaneError>;

/// Main error type for all twinpane operations
#[derive(Debug, Error)]
pub enum TwinpaneError {
    /// Wire request carried an unknown mode discriminator
    #[error("Invalid diff mode: {0} (expected 0 for line or 1 for word)")]
    InvalidMode(u8),

    /// The background diff worker has shut down or its channel closed
    #[error("Diff worker disconnected")]
    WorkerDisconnected,

    /// Errors during JSON serialization/deserialization of wire messages
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error for unexpected conditions
    #[error("Internal error: {0}")]
    Internal(String),
}

impl TwinpaneError {
    /// Create an internal error with a custom message
    pub fn internal(msg: impl Into<String>) -> Self {
        TwinpaneError::Internal(msg.into())
    }
}
