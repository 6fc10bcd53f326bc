//! Engine policy configuration.

use std::env;

use coach_core::{RateLimitSpec, DEFAULT_MAX_QUESTIONS};

/// Policy values for turn processing.
///
/// The question ceiling and admission specs are deployment policy, not
/// per-application data, so they live here rather than in the database.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Questions asked before the interviewer wraps up.
    pub max_questions: u32,

    /// Admission spec for chat turns.
    pub chat_limit: RateLimitSpec,

    /// Admission spec for read-only queries (transcript fetches).
    pub read_limit: RateLimitSpec,

    /// Minimum message length after sanitization.
    pub min_message_chars: usize,

    /// Maximum raw message length.
    pub max_message_chars: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_questions: DEFAULT_MAX_QUESTIONS,
            chat_limit: RateLimitSpec::CHAT,
            read_limit: RateLimitSpec::READ,
            min_message_chars: 3,
            max_message_chars: coach_core::sanitize::CHAT_MESSAGE_MAX_CHARS,
        }
    }
}

impl EngineConfig {
    /// Create configuration from environment variables.
    ///
    /// Optional environment variables:
    /// - `COACH_MAX_QUESTIONS` - question ceiling (default: 12)
    pub fn from_env() -> Self {
        let max_questions = env::var("COACH_MAX_QUESTIONS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_MAX_QUESTIONS);

        Self {
            max_questions,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert_eq!(config.max_questions, 12);
        assert_eq!(config.min_message_chars, 3);
        assert_eq!(config.max_message_chars, 2000);
        assert_eq!(config.chat_limit, RateLimitSpec::CHAT);
    }
}
