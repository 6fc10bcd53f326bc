//! Mistral-backed completion backend for the interview coach.
//!
//! Implements [`coach_core::CompletionBackend`] against the Mistral
//! chat-completions API. The interviewer persona lives entirely in the
//! system prompt handed in by the engine; this crate only carries the wire
//! protocol, configuration, and timeout handling.

mod api_types;
mod brain;
mod config;

pub use api_types::{ChatCompletionRequest, ChatCompletionResponse, ChatMessage};
pub use brain::MistralBrain;
pub use config::{MistralConfig, MistralConfigBuilder};
