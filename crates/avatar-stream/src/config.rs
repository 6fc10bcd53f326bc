//! Configuration for the avatar streaming client.

use std::env;

use crate::error::StreamError;

/// Configuration for [`crate::StreamClient`].
#[derive(Debug, Clone)]
pub struct AvatarConfig {
    /// Provider API base URL.
    pub api_url: String,

    /// API key. Either `user:pass` or a bare key (sent with an empty
    /// username) for HTTP Basic authentication.
    pub api_key: String,

    /// Presenter driver used when speaking.
    pub driver_url: String,

    /// Render the idle presenter before the first audio arrives.
    pub stream_warmup: bool,

    /// Per-request timeout for signaling calls, in seconds.
    pub timeout_secs: u64,

    /// Streams idle longer than this are torn down, in seconds.
    pub idle_ttl_secs: u64,
}

impl Default for AvatarConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.d-id.com".to_string(),
            api_key: String::new(),
            driver_url: "bank://lively/".to_string(),
            stream_warmup: true,
            timeout_secs: 30,
            idle_ttl_secs: 300,
        }
    }
}

impl AvatarConfig {
    /// Create configuration from environment variables.
    ///
    /// Required environment variables:
    /// - `AVATAR_API_KEY` - provider API key
    ///
    /// Optional environment variables:
    /// - `AVATAR_API_URL` - API base URL (default: https://api.d-id.com)
    /// - `AVATAR_DRIVER_URL` - presenter driver (default: bank://lively/)
    /// - `AVATAR_STREAM_WARMUP` - idle-presenter warmup (default: true)
    /// - `AVATAR_TIMEOUT_SECS` - signaling call timeout (default: 30)
    /// - `AVATAR_IDLE_TTL_SECS` - idle stream eviction (default: 300)
    pub fn from_env() -> Result<Self, StreamError> {
        let api_key = env::var("AVATAR_API_KEY")
            .map_err(|_| StreamError::Configuration("AVATAR_API_KEY not set".to_string()))?;

        let api_url =
            env::var("AVATAR_API_URL").unwrap_or_else(|_| "https://api.d-id.com".to_string());

        let driver_url =
            env::var("AVATAR_DRIVER_URL").unwrap_or_else(|_| "bank://lively/".to_string());

        let stream_warmup = env::var("AVATAR_STREAM_WARMUP")
            .ok()
            .map(|v| v.to_lowercase() == "true" || v == "1")
            .unwrap_or(true);

        let timeout_secs = env::var("AVATAR_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(30);

        let idle_ttl_secs = env::var("AVATAR_IDLE_TTL_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(300);

        Ok(Self {
            api_url,
            api_key,
            driver_url,
            stream_warmup,
            timeout_secs,
            idle_ttl_secs,
        })
    }

    /// Create a new config builder.
    pub fn builder() -> AvatarConfigBuilder {
        AvatarConfigBuilder::default()
    }
}

/// Builder for AvatarConfig.
#[derive(Debug, Default)]
pub struct AvatarConfigBuilder {
    config: AvatarConfig,
}

impl AvatarConfigBuilder {
    /// Set the API key.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.api_key = key.into();
        self
    }

    /// Set the API base URL.
    pub fn api_url(mut self, url: impl Into<String>) -> Self {
        self.config.api_url = url.into();
        self
    }

    /// Set the presenter driver.
    pub fn driver_url(mut self, url: impl Into<String>) -> Self {
        self.config.driver_url = url.into();
        self
    }

    /// Enable or disable the idle-presenter warmup.
    pub fn stream_warmup(mut self, warmup: bool) -> Self {
        self.config.stream_warmup = warmup;
        self
    }

    /// Set the signaling call timeout in seconds.
    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.config.timeout_secs = secs;
        self
    }

    /// Set the idle eviction TTL in seconds.
    pub fn idle_ttl_secs(mut self, secs: u64) -> Self {
        self.config.idle_ttl_secs = secs;
        self
    }

    /// Build the configuration.
    pub fn build(self) -> AvatarConfig {
        self.config
    }
}
