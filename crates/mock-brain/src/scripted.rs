//! Scripted backend - replays canned replies.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use coach_core::{async_trait, ChatTurn, CompletionBackend, CompletionError};

/// A backend that replays a fixed script of replies.
///
/// Replies are consumed in order; once the script runs out, the last reply
/// repeats. Tracks how many completion calls were made, which is what the
/// deduplication tests assert on.
#[derive(Debug, Default)]
pub struct ScriptedBrain {
    replies: Mutex<VecDeque<String>>,
    fallback: String,
    calls: AtomicUsize,
}

impl ScriptedBrain {
    /// Create a backend that always answers with `reply`.
    pub fn with_reply(reply: impl Into<String>) -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
            fallback: reply.into(),
            calls: AtomicUsize::new(0),
        }
    }

    /// Create a backend that plays `replies` in order, then repeats the last.
    pub fn with_script(replies: impl IntoIterator<Item = impl Into<String>>) -> Self {
        let queue: VecDeque<String> = replies.into_iter().map(Into::into).collect();
        let fallback = queue
            .back()
            .cloned()
            .unwrap_or_else(|| "Understood.".to_string());
        Self {
            replies: Mutex::new(queue),
            fallback,
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of completion calls made so far.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CompletionBackend for ScriptedBrain {
    async fn complete(
        &self,
        _system_prompt: &str,
        _turns: &[ChatTurn],
    ) -> Result<String, CompletionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let next = self
            .replies
            .lock()
            .expect("scripted replies lock")
            .pop_front();
        Ok(next.unwrap_or_else(|| self.fallback.clone()))
    }

    fn name(&self) -> &str {
        "ScriptedBrain"
    }
}
