//! The completion backend trait.

use async_trait::async_trait;

use crate::error::CompletionError;
use crate::message::ChatTurn;

/// A text-completion service consumed by the session engine.
///
/// Implementations are opaque to the engine: they take a system instruction
/// plus the ordered transcript and return the assistant's reply text.
/// Failures are reported through [`CompletionError`], never swallowed.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Generate the next assistant reply.
    ///
    /// `turns` is the full ordered transcript including the current user
    /// message as its last element. An empty or unusable reply must surface
    /// as an error; the engine persists nothing for a failed turn.
    async fn complete(
        &self,
        system_prompt: &str,
        turns: &[ChatTurn],
    ) -> Result<String, CompletionError>;

    /// Human-readable backend name for logging.
    fn name(&self) -> &str;
}
