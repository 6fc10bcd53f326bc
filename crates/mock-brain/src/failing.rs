//! Failing backend - always errors.

use coach_core::{async_trait, ChatTurn, CompletionBackend, CompletionError};

/// A backend that fails every call with a configured error.
///
/// Useful for asserting that a failed turn persists nothing.
#[derive(Debug, Clone)]
pub struct FailingBrain {
    error: CompletionError,
}

impl FailingBrain {
    /// Fail with the given error.
    pub fn with_error(error: CompletionError) -> Self {
        Self { error }
    }

    /// Fail as if the upstream call timed out.
    pub fn timing_out(secs: u64) -> Self {
        Self::with_error(CompletionError::Timeout { secs })
    }

    /// Fail as if the service answered with a server error.
    pub fn unavailable() -> Self {
        Self::with_error(CompletionError::Api {
            status: 503,
            message: "service unavailable".to_string(),
        })
    }
}

#[async_trait]
impl CompletionBackend for FailingBrain {
    async fn complete(
        &self,
        _system_prompt: &str,
        _turns: &[ChatTurn],
    ) -> Result<String, CompletionError> {
        Err(self.error.clone())
    }

    fn name(&self) -> &str {
        "FailingBrain"
    }
}
