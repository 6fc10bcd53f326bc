//! Error types for completion backends.

use thiserror::Error;

/// Errors that can occur while calling a text-completion service.
///
/// Variants carry owned strings so results can be cloned and shared across
/// deduplicated callers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompletionError {
    /// Backend was misconfigured (missing key, bad URL, etc.)
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Transport-level failure before a response was received.
    #[error("network error: {0}")]
    Network(String),

    /// The completion call did not finish within the configured budget.
    #[error("completion timed out after {secs}s")]
    Timeout { secs: u64 },

    /// The service answered with a non-success status.
    #[error("completion API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The service answered 2xx but the payload could not be decoded.
    #[error("invalid completion response: {0}")]
    InvalidResponse(String),

    /// The service answered with no usable text.
    #[error("completion response was empty")]
    EmptyResponse,
}
