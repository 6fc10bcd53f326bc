//! Delayed backend - wraps another backend with artificial delay.

use std::time::Duration;

use coach_core::{async_trait, ChatTurn, CompletionBackend, CompletionError};
use tokio::time::sleep;

/// A backend that wraps another backend and adds artificial delay.
///
/// Useful for testing timeout handling and overlapping-request behavior.
pub struct DelayedBrain<B: CompletionBackend> {
    inner: B,
    delay: Duration,
}

impl<B: CompletionBackend> DelayedBrain<B> {
    /// Wrap `inner` with the specified delay.
    pub fn new(inner: B, delay: Duration) -> Self {
        Self { inner, delay }
    }

    /// Wrap `inner` with a delay in milliseconds.
    pub fn with_millis(inner: B, millis: u64) -> Self {
        Self::new(inner, Duration::from_millis(millis))
    }
}

#[async_trait]
impl<B: CompletionBackend> CompletionBackend for DelayedBrain<B> {
    async fn complete(
        &self,
        system_prompt: &str,
        turns: &[ChatTurn],
    ) -> Result<String, CompletionError> {
        sleep(self.delay).await;
        self.inner.complete(system_prompt, turns).await
    }

    fn name(&self) -> &str {
        "DelayedBrain"
    }
}

#[cfg(test)]
mod tests {
    use std::time::Instant;

    use super::*;
    use crate::ScriptedBrain;

    #[tokio::test]
    async fn test_delayed_brain() {
        let brain = DelayedBrain::with_millis(ScriptedBrain::with_reply("hello"), 100);

        let start = Instant::now();
        let reply = brain.complete("", &[]).await.unwrap();
        let elapsed = start.elapsed();

        assert_eq!(reply, "hello");
        assert!(elapsed >= Duration::from_millis(100));
    }
}
