//! Per-subject admission control.
//!
//! The limiter is behind a trait so a multi-instance deployment can swap the
//! process-local window store for a shared one without touching the engine.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use indexmap::IndexMap;
use tokio::sync::Mutex;

/// Default maximum number of subject keys tracked before LRU eviction.
const DEFAULT_MAX_KEYS: usize = 10000;

/// Admission policy for one endpoint class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitSpec {
    /// Length of the sliding window.
    pub window: Duration,
    /// Requests admitted per key within the window.
    pub max_requests: usize,
}

impl RateLimitSpec {
    /// Chat turns: a completion call per request, keep it strict.
    pub const CHAT: RateLimitSpec = RateLimitSpec {
        window: Duration::from_secs(60),
        max_requests: 30,
    };

    /// Avatar speech: the most expensive downstream call.
    pub const SPEAK: RateLimitSpec = RateLimitSpec {
        window: Duration::from_secs(60),
        max_requests: 10,
    };

    /// Audio transcription.
    pub const TRANSCRIBE: RateLimitSpec = RateLimitSpec {
        window: Duration::from_secs(60),
        max_requests: 20,
    };

    /// Read-only queries (session/transcript fetches).
    pub const READ: RateLimitSpec = RateLimitSpec {
        window: Duration::from_secs(60),
        max_requests: 60,
    };
}

/// Denial returned when a subject exhausts its window.
///
/// Typed separately from every other failure so callers can surface a retry
/// hint instead of a generic error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("too many requests, retry after {retry_after_secs}s")]
pub struct RateLimitExceeded {
    /// Seconds until the oldest admitted request leaves the window.
    pub retry_after_secs: u64,
}

/// Admission control keyed by subject (e.g. per-user-per-endpoint).
#[async_trait]
pub trait RateLimit: Send + Sync {
    /// Admit or deny one request for `key` under `spec`.
    async fn check(&self, key: &str, spec: &RateLimitSpec) -> Result<(), RateLimitExceeded>;
}

/// In-memory sliding-window limiter.
///
/// Keeps the admission timestamps of each key's current window and admits a
/// request only if fewer than `max_requests` fall inside it. Check and admit
/// happen under one lock, so concurrent calls for the same key cannot both
/// slip through the last slot.
///
/// Keys are tracked in an LRU map bounded by `max_keys` so unique-key floods
/// cannot exhaust memory.
#[derive(Debug)]
pub struct SlidingWindowLimiter {
    windows: Mutex<IndexMap<String, VecDeque<Instant>>>,
    max_keys: usize,
}

impl Default for SlidingWindowLimiter {
    fn default() -> Self {
        Self::new()
    }
}

impl SlidingWindowLimiter {
    /// Create a limiter with the default key capacity.
    pub fn new() -> Self {
        Self::with_max_keys(DEFAULT_MAX_KEYS)
    }

    /// Create a limiter tracking at most `max_keys` subjects.
    pub fn with_max_keys(max_keys: usize) -> Self {
        Self {
            windows: Mutex::new(IndexMap::new()),
            max_keys,
        }
    }

    /// Number of subjects currently tracked.
    pub async fn key_count(&self) -> usize {
        self.windows.lock().await.len()
    }

    async fn check_at(
        &self,
        key: &str,
        spec: &RateLimitSpec,
        now: Instant,
    ) -> Result<(), RateLimitExceeded> {
        let mut windows = self.windows.lock().await;

        // Remove and re-insert to mark the key as recently used.
        let mut window = windows.shift_remove(key).unwrap_or_default();

        while let Some(oldest) = window.front() {
            if *oldest + spec.window <= now {
                window.pop_front();
            } else {
                break;
            }
        }

        if window.len() >= spec.max_requests {
            let oldest = window.front().copied().unwrap_or(now);
            let wait = (oldest + spec.window).saturating_duration_since(now);
            let mut retry_after_secs = wait.as_secs();
            if wait.subsec_nanos() > 0 || retry_after_secs == 0 {
                retry_after_secs += 1;
            }
            windows.insert(key.to_string(), window);
            return Err(RateLimitExceeded { retry_after_secs });
        }

        window.push_back(now);
        windows.insert(key.to_string(), window);

        // LRU eviction: drop the stalest subjects past capacity.
        while windows.len() > self.max_keys {
            windows.shift_remove_index(0);
        }

        Ok(())
    }
}

#[async_trait]
impl RateLimit for SlidingWindowLimiter {
    async fn check(&self, key: &str, spec: &RateLimitSpec) -> Result<(), RateLimitExceeded> {
        self.check_at(key, spec, Instant::now()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SPEC: RateLimitSpec = RateLimitSpec {
        window: Duration::from_secs(60),
        max_requests: 3,
    };

    #[tokio::test]
    async fn test_admits_up_to_limit_then_denies() {
        let limiter = SlidingWindowLimiter::new();
        let now = Instant::now();

        for _ in 0..3 {
            limiter.check_at("chat:alice", &SPEC, now).await.unwrap();
        }

        let denied = limiter
            .check_at("chat:alice", &SPEC, now)
            .await
            .unwrap_err();
        assert!(denied.retry_after_secs > 0);
    }

    #[tokio::test]
    async fn test_keys_are_independent() {
        let limiter = SlidingWindowLimiter::new();
        let now = Instant::now();

        for _ in 0..3 {
            limiter.check_at("chat:alice", &SPEC, now).await.unwrap();
        }

        limiter.check_at("chat:bob", &SPEC, now).await.unwrap();
    }

    #[tokio::test]
    async fn test_window_slides() {
        let limiter = SlidingWindowLimiter::new();
        let start = Instant::now();

        for _ in 0..3 {
            limiter.check_at("chat:alice", &SPEC, start).await.unwrap();
        }
        assert!(limiter.check_at("chat:alice", &SPEC, start).await.is_err());

        // Once the first admissions age out, the subject is admitted again.
        let later = start + Duration::from_secs(61);
        limiter.check_at("chat:alice", &SPEC, later).await.unwrap();
    }

    #[tokio::test]
    async fn test_retry_hint_reflects_oldest_entry() {
        let limiter = SlidingWindowLimiter::new();
        let start = Instant::now();

        for _ in 0..3 {
            limiter.check_at("chat:alice", &SPEC, start).await.unwrap();
        }

        let denied = limiter
            .check_at("chat:alice", &SPEC, start + Duration::from_secs(20))
            .await
            .unwrap_err();
        // 40s of the window remain; the hint rounds up.
        assert!(denied.retry_after_secs >= 40 && denied.retry_after_secs <= 41);
    }

    #[tokio::test]
    async fn test_denied_request_does_not_consume_a_slot() {
        let limiter = SlidingWindowLimiter::new();
        let start = Instant::now();

        for _ in 0..3 {
            limiter.check_at("chat:alice", &SPEC, start).await.unwrap();
        }
        for _ in 0..5 {
            assert!(limiter.check_at("chat:alice", &SPEC, start).await.is_err());
        }

        // The original three admissions expire together.
        let later = start + Duration::from_secs(61);
        limiter.check_at("chat:alice", &SPEC, later).await.unwrap();
    }

    #[tokio::test]
    async fn test_lru_eviction_bounds_tracked_keys() {
        let limiter = SlidingWindowLimiter::with_max_keys(2);
        let now = Instant::now();

        limiter.check_at("a", &SPEC, now).await.unwrap();
        limiter.check_at("b", &SPEC, now).await.unwrap();
        limiter.check_at("c", &SPEC, now).await.unwrap();

        assert_eq!(limiter.key_count().await, 2);
    }

    #[tokio::test]
    async fn test_concurrent_checks_admit_exactly_limit() {
        use std::sync::Arc;

        let limiter = Arc::new(SlidingWindowLimiter::new());
        let mut handles = Vec::new();

        for _ in 0..10 {
            let limiter = limiter.clone();
            handles.push(tokio::spawn(async move {
                limiter.check("chat:alice", &SPEC).await.is_ok()
            }));
        }

        let mut admitted = 0;
        for handle in handles {
            if handle.await.unwrap() {
                admitted += 1;
            }
        }
        assert_eq!(admitted, 3);
    }
}
