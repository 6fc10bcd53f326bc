//! MistralBrain implementation using the Mistral chat-completions API.

use std::time::Duration;

use coach_core::{async_trait, ChatTurn, CompletionBackend, CompletionError};
use reqwest::Client;
use tracing::{debug, warn};

use crate::api_types::{ApiError, ChatCompletionRequest, ChatCompletionResponse, ChatMessage};
use crate::config::MistralConfig;

/// A completion backend that uses the Mistral API.
///
/// The HTTP client carries the configured timeout; a call that exceeds it is
/// aborted and surfaced as [`CompletionError::Timeout`]. The engine treats
/// that as an upstream failure and persists nothing for the turn.
pub struct MistralBrain {
    client: Client,
    config: MistralConfig,
}

impl MistralBrain {
    /// Create a new MistralBrain with the given configuration.
    pub fn new(config: MistralConfig) -> Result<Self, CompletionError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| {
                CompletionError::Configuration(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self { client, config })
    }

    /// Create a MistralBrain from environment variables.
    ///
    /// See [`MistralConfig::from_env`] for required environment variables.
    pub fn from_env() -> Result<Self, CompletionError> {
        let config = MistralConfig::from_env()?;
        Self::new(config)
    }

    /// Get the configuration.
    pub fn config(&self) -> &MistralConfig {
        &self.config
    }

    fn build_messages(&self, system_prompt: &str, turns: &[ChatTurn]) -> Vec<ChatMessage> {
        let mut messages = Vec::with_capacity(turns.len() + 1);
        messages.push(ChatMessage::system(system_prompt));
        for turn in turns {
            messages.push(ChatMessage {
                role: turn.role.as_str().to_string(),
                content: turn.content.clone(),
            });
        }
        messages
    }

    async fn chat_completion(
        &self,
        messages: Vec<ChatMessage>,
    ) -> Result<ChatCompletionResponse, CompletionError> {
        let url = format!("{}/v1/chat/completions", self.config.api_url);

        let request = ChatCompletionRequest {
            model: self.config.model.clone(),
            messages,
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
        };

        debug!("Sending completion request for model {}", request.model);

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    CompletionError::Timeout {
                        secs: self.config.timeout_secs,
                    }
                } else {
                    CompletionError::Network(format!("Failed to send request: {}", e))
                }
            })?;

        let status = response.status();

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();

            // Try to parse as a structured API error
            if let Ok(api_error) = serde_json::from_str::<ApiError>(&error_text) {
                return Err(CompletionError::Api {
                    status: status.as_u16(),
                    message: api_error.message,
                });
            }

            return Err(CompletionError::Api {
                status: status.as_u16(),
                message: error_text,
            });
        }

        let completion: ChatCompletionResponse = response.json().await.map_err(|e| {
            if e.is_timeout() {
                CompletionError::Timeout {
                    secs: self.config.timeout_secs,
                }
            } else {
                CompletionError::InvalidResponse(format!("Failed to parse response: {}", e))
            }
        })?;

        Ok(completion)
    }
}

#[async_trait]
impl CompletionBackend for MistralBrain {
    async fn complete(
        &self,
        system_prompt: &str,
        turns: &[ChatTurn],
    ) -> Result<String, CompletionError> {
        let messages = self.build_messages(system_prompt, turns);
        let completion = self.chat_completion(messages).await?;

        let reply = completion
            .choices
            .first()
            .and_then(|c| c.message.content.as_deref())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .ok_or(CompletionError::EmptyResponse)?;

        if let Some(usage) = completion.usage {
            debug!(
                "Token usage - prompt: {}, completion: {}, total: {}",
                usage.prompt_tokens, usage.completion_tokens, usage.total_tokens
            );
        } else {
            warn!("Completion response carried no usage block");
        }

        Ok(reply)
    }

    fn name(&self) -> &str {
        "MistralBrain"
    }
}
