//! Configuration for MistralBrain.

use coach_core::CompletionError;
use std::env;

/// Configuration for MistralBrain.
#[derive(Debug, Clone)]
pub struct MistralConfig {
    /// Mistral API URL.
    pub api_url: String,

    /// API key for authentication.
    pub api_key: String,

    /// Model name to use.
    pub model: String,

    /// Maximum tokens for response. Kept low: interviewer replies are short.
    pub max_tokens: Option<u32>,

    /// Temperature for generation (0.0 - 1.0).
    pub temperature: Option<f32>,

    /// Ceiling for one completion call, in seconds.
    pub timeout_secs: u64,
}

impl Default for MistralConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.mistral.ai".to_string(),
            api_key: String::new(),
            model: "mistral-large-latest".to_string(),
            max_tokens: Some(300),
            temperature: Some(0.7),
            timeout_secs: 90,
        }
    }
}

impl MistralConfig {
    /// Create configuration from environment variables.
    ///
    /// Required environment variables:
    /// - `MISTRAL_API_KEY` - API key for authentication
    ///
    /// Optional environment variables:
    /// - `MISTRAL_API_URL` - API URL (default: https://api.mistral.ai)
    /// - `MISTRAL_MODEL` - Model name (default: mistral-large-latest)
    /// - `MISTRAL_MAX_TOKENS` - Max tokens (default: 300)
    /// - `MISTRAL_TEMPERATURE` - Temperature (default: 0.7)
    /// - `MISTRAL_TIMEOUT_SECS` - Completion timeout (default: 90)
    pub fn from_env() -> Result<Self, CompletionError> {
        let api_key = env::var("MISTRAL_API_KEY")
            .map_err(|_| CompletionError::Configuration("MISTRAL_API_KEY not set".to_string()))?;

        let api_url =
            env::var("MISTRAL_API_URL").unwrap_or_else(|_| "https://api.mistral.ai".to_string());

        let model =
            env::var("MISTRAL_MODEL").unwrap_or_else(|_| "mistral-large-latest".to_string());

        let max_tokens = env::var("MISTRAL_MAX_TOKENS")
            .ok()
            .and_then(|v| v.parse().ok())
            .or(Some(300));

        let temperature = env::var("MISTRAL_TEMPERATURE")
            .ok()
            .and_then(|v| v.parse().ok())
            .or(Some(0.7));

        let timeout_secs = env::var("MISTRAL_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(90);

        Ok(Self {
            api_url,
            api_key,
            model,
            max_tokens,
            temperature,
            timeout_secs,
        })
    }

    /// Create a new config builder.
    pub fn builder() -> MistralConfigBuilder {
        MistralConfigBuilder::default()
    }
}

/// Builder for MistralConfig.
#[derive(Debug, Default)]
pub struct MistralConfigBuilder {
    config: MistralConfig,
}

impl MistralConfigBuilder {
    /// Set the API key.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.api_key = key.into();
        self
    }

    /// Set the API URL.
    pub fn api_url(mut self, url: impl Into<String>) -> Self {
        self.config.api_url = url.into();
        self
    }

    /// Set the model name.
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    /// Set the max tokens.
    pub fn max_tokens(mut self, tokens: u32) -> Self {
        self.config.max_tokens = Some(tokens);
        self
    }

    /// Set the temperature.
    pub fn temperature(mut self, temp: f32) -> Self {
        self.config.temperature = Some(temp);
        self
    }

    /// Set the completion timeout in seconds.
    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.config.timeout_secs = secs;
        self
    }

    /// Build the configuration.
    pub fn build(self) -> MistralConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = MistralConfig::default();

        assert_eq!(config.api_url, "https://api.mistral.ai");
        assert!(config.api_key.is_empty());
        assert_eq!(config.model, "mistral-large-latest");
        assert_eq!(config.max_tokens, Some(300));
        assert_eq!(config.temperature, Some(0.7));
        assert_eq!(config.timeout_secs, 90);
    }

    #[test]
    fn test_builder_all_options() {
        let config = MistralConfig::builder()
            .api_key("my-key")
            .api_url("https://custom.api.com")
            .model("mistral-small-latest")
            .max_tokens(512)
            .temperature(0.5)
            .timeout_secs(30)
            .build();

        assert_eq!(config.api_key, "my-key");
        assert_eq!(config.api_url, "https://custom.api.com");
        assert_eq!(config.model, "mistral-small-latest");
        assert_eq!(config.max_tokens, Some(512));
        assert_eq!(config.temperature, Some(0.5));
        assert_eq!(config.timeout_secs, 30);
    }

    // Environment-based tests are combined into a single test to avoid
    // race conditions when tests run in parallel (env vars are process-global).
    #[test]
    fn test_from_env_scenarios() {
        use std::sync::Mutex;
        static ENV_LOCK: Mutex<()> = Mutex::new(());
        let _guard = ENV_LOCK.lock().unwrap();

        fn clear_all_mistral_vars() {
            std::env::remove_var("MISTRAL_API_KEY");
            std::env::remove_var("MISTRAL_API_URL");
            std::env::remove_var("MISTRAL_MODEL");
            std::env::remove_var("MISTRAL_MAX_TOKENS");
            std::env::remove_var("MISTRAL_TEMPERATURE");
            std::env::remove_var("MISTRAL_TIMEOUT_SECS");
        }

        // Missing API key should error
        clear_all_mistral_vars();
        let result = MistralConfig::from_env();
        match result {
            Err(CompletionError::Configuration(msg)) => {
                assert!(msg.contains("MISTRAL_API_KEY"));
            }
            other => panic!("Expected Configuration error, got {:?}", other),
        }

        // Only API key set, defaults used
        clear_all_mistral_vars();
        std::env::set_var("MISTRAL_API_KEY", "test-env-key");

        let config = MistralConfig::from_env().unwrap();
        assert_eq!(config.api_key, "test-env-key");
        assert_eq!(config.api_url, "https://api.mistral.ai");
        assert_eq!(config.model, "mistral-large-latest");
        assert_eq!(config.timeout_secs, 90);

        // All vars set
        clear_all_mistral_vars();
        std::env::set_var("MISTRAL_API_KEY", "full-test-key");
        std::env::set_var("MISTRAL_API_URL", "https://test.api.com");
        std::env::set_var("MISTRAL_MODEL", "mistral-medium");
        std::env::set_var("MISTRAL_MAX_TOKENS", "2048");
        std::env::set_var("MISTRAL_TEMPERATURE", "0.9");
        std::env::set_var("MISTRAL_TIMEOUT_SECS", "45");

        let config = MistralConfig::from_env().unwrap();
        assert_eq!(config.api_key, "full-test-key");
        assert_eq!(config.api_url, "https://test.api.com");
        assert_eq!(config.model, "mistral-medium");
        assert_eq!(config.max_tokens, Some(2048));
        assert_eq!(config.temperature, Some(0.9));
        assert_eq!(config.timeout_secs, 45);

        // Cleanup
        clear_all_mistral_vars();
    }
}
