//! Core trait and types for the interview coaching engine.
//!
//! This crate provides the shared kernel used by the session engine and its
//! HTTP surface:
//!
//! - [`Phase`] / [`next_phase`] - The conversational phase machine
//! - [`CompletionBackend`] - The trait all text-completion backends implement
//! - [`ChatTurn`] / [`Role`] - Message types handed to a backend
//! - [`CompletionError`] - Error types for completion calls
//! - [`RateLimit`] / [`SlidingWindowLimiter`] - Per-subject admission control
//! - [`SingleFlight`] - Collapses concurrent identical requests
//! - [`sanitize`] - Injection-stripping policies for prompt-bound text
//!
//! # Example
//!
//! ```rust
//! use coach_core::{CompletionBackend, CompletionError, ChatTurn};
//! use async_trait::async_trait;
//!
//! struct CannedBackend;
//!
//! #[async_trait]
//! impl CompletionBackend for CannedBackend {
//!     async fn complete(
//!         &self,
//!         _system_prompt: &str,
//!         _turns: &[ChatTurn],
//!     ) -> Result<String, CompletionError> {
//!         Ok("Tell me about your last project.".to_string())
//!     }
//!
//!     fn name(&self) -> &str {
//!         "CannedBackend"
//!     }
//! }
//! ```

mod dedupe;
mod error;
mod fingerprint;
mod limiter;
mod message;
mod phase;
pub mod sanitize;
mod trait_def;

pub use dedupe::SingleFlight;
pub use error::CompletionError;
pub use fingerprint::fingerprint;
pub use limiter::{RateLimit, RateLimitExceeded, RateLimitSpec, SlidingWindowLimiter};
pub use message::{ChatTurn, Role};
pub use phase::{next_phase, phase_after_turns, Phase, DEFAULT_MAX_QUESTIONS};
pub use trait_def::CompletionBackend;

// Re-export async_trait for convenience
pub use async_trait::async_trait;
