//! Error types for turn processing.

use coach_core::{CompletionError, RateLimitExceeded};
use coach_database::DatabaseError;
use thiserror::Error;

/// Errors that can occur while handling a coaching turn.
///
/// Variants carry owned strings and derive `Clone`: a deduplicated turn hands
/// the same failure to every caller that joined it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// Caller does not own the session.
    #[error("not authorized for this session")]
    Unauthorized,

    /// Caller exhausted their admission window.
    #[error("too many requests, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    /// Message rejected before any processing.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// No such session.
    #[error("session not found: {0}")]
    SessionNotFound(String),

    /// Completion service failed; nothing was persisted for the turn.
    #[error("completion service failed: {0}")]
    Upstream(String),

    /// Storage failure.
    #[error("storage failure: {0}")]
    Database(String),

    /// Integration bug (e.g. an unrecognized persisted phase). Fatal.
    #[error("protocol violation: {0}")]
    Protocol(String),
}

impl From<RateLimitExceeded> for EngineError {
    fn from(err: RateLimitExceeded) -> Self {
        EngineError::RateLimited {
            retry_after_secs: err.retry_after_secs,
        }
    }
}

impl From<CompletionError> for EngineError {
    fn from(err: CompletionError) -> Self {
        match err {
            CompletionError::Timeout { secs } => {
                EngineError::Upstream(format!("timed out after {}s", secs))
            }
            other => EngineError::Upstream(other.to_string()),
        }
    }
}

impl From<DatabaseError> for EngineError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::NotFound {
                entity: "InterviewSession",
                id,
            } => EngineError::SessionNotFound(id),
            other => EngineError::Database(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_not_found_mapping() {
        let err: EngineError = DatabaseError::NotFound {
            entity: "InterviewSession",
            id: "sess-1".to_string(),
        }
        .into();
        assert_eq!(err, EngineError::SessionNotFound("sess-1".to_string()));
    }

    #[test]
    fn test_other_not_found_maps_to_database() {
        let err: EngineError = DatabaseError::NotFound {
            entity: "Application",
            id: "app-1".to_string(),
        }
        .into();
        assert!(matches!(err, EngineError::Database(_)));
    }

    #[test]
    fn test_timeout_maps_to_upstream_with_hint() {
        let err: EngineError = CompletionError::Timeout { secs: 90 }.into();
        assert_eq!(
            err,
            EngineError::Upstream("timed out after 90s".to_string())
        );
    }
}
