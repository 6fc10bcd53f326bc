//! Error types for avatar streaming.

use thiserror::Error;

/// Errors that can occur while driving an avatar stream.
#[derive(Debug, Clone, Error)]
pub enum StreamError {
    /// Client was misconfigured (missing key, bad URL, etc.)
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A signaling call was made out of order. Integration bug, fails fast.
    #[error("protocol violation: {0}")]
    Protocol(String),

    /// No live stream with that ID.
    #[error("unknown stream: {0}")]
    UnknownStream(String),

    /// The provider rejected a call.
    #[error("provider error ({status}): {message}")]
    Upstream { status: u16, message: String },

    /// Transport-level failure before a response was received.
    #[error("network error: {0}")]
    Network(String),
}
