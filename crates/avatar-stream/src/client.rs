//! Stateless HTTPS wrapper over the provider's signaling API.

use std::time::Duration;

use reqwest::{Client, RequestBuilder};
use tracing::{debug, info};

use crate::api_types::{
    CloseStreamRequest, CreateStreamRequest, CreateStreamResponse, IceCandidate, SdpAnswer,
    SpeakConfig, SpeakRequest, SpeakScript, SubmitAnswerRequest, SubmitIceRequest,
};
use crate::config::AvatarConfig;
use crate::error::StreamError;
use crate::session::StreamSource;

/// Signaling client for one provider account.
///
/// Ordering and ownership guarantees live in [`crate::StreamRegistry`]; this
/// type only knows the wire protocol. Every call after stream creation
/// carries the session token as a `Cookie` header so the provider routes it
/// to the same backing worker.
pub struct StreamClient {
    client: Client,
    config: AvatarConfig,
}

impl StreamClient {
    /// Create a new client with the given configuration.
    pub fn new(config: AvatarConfig) -> Result<Self, StreamError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| {
                StreamError::Configuration(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self { client, config })
    }

    /// Create a client from environment variables.
    ///
    /// See [`AvatarConfig::from_env`] for the variables involved.
    pub fn from_env() -> Result<Self, StreamError> {
        Self::new(AvatarConfig::from_env()?)
    }

    /// Get the configuration.
    pub fn config(&self) -> &AvatarConfig {
        &self.config
    }

    /// Split the configured key into Basic-auth credentials.
    ///
    /// Keys may arrive as `user:pass` or as a bare secret; bare secrets go
    /// out with an empty username.
    fn credentials(&self) -> (&str, &str) {
        match self.config.api_key.split_once(':') {
            Some((user, pass)) => (user, pass),
            None => ("", self.config.api_key.as_str()),
        }
    }

    fn authed(&self, builder: RequestBuilder) -> RequestBuilder {
        let (user, pass) = self.credentials();
        builder.basic_auth(user, Some(pass))
    }

    fn affinity(&self, builder: RequestBuilder, session_token: &str) -> RequestBuilder {
        self.authed(builder).header("Cookie", session_token)
    }

    async fn check_status(
        response: reqwest::Response,
        what: &str,
    ) -> Result<reqwest::Response, StreamError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let message = response.text().await.unwrap_or_default();
        Err(StreamError::Upstream {
            status: status.as_u16(),
            message: format!("{}: {}", what, message),
        })
    }

    /// Initiate the handshake for a new stream.
    ///
    /// Returns the stream ID, the session token, the SDP offer the caller
    /// must answer, and the ICE servers to gather candidates against. Must
    /// be called exactly once per stream.
    pub async fn create_stream(
        &self,
        source: &StreamSource,
    ) -> Result<CreateStreamResponse, StreamError> {
        let (source_url, driver_url) = match source {
            StreamSource::SourceImage(url) => (Some(url.clone()), None),
            StreamSource::Presenter(name) => (None, Some(name.clone())),
        };

        let request = CreateStreamRequest {
            stream_warmup: self.config.stream_warmup,
            source_url,
            driver_url,
        };

        let url = format!("{}/talks/streams", self.config.api_url);
        let response = self
            .authed(self.client.post(&url))
            .json(&request)
            .send()
            .await
            .map_err(|e| StreamError::Network(e.to_string()))?;
        let response = Self::check_status(response, "stream creation").await?;

        let created: CreateStreamResponse = response
            .json()
            .await
            .map_err(|e| StreamError::Network(format!("Invalid creation response: {}", e)))?;

        info!(stream_id = %created.id, "Avatar stream created");
        Ok(created)
    }

    /// Complete the SDP handshake.
    pub async fn submit_answer(
        &self,
        stream_id: &str,
        session_token: &str,
        answer: &SdpAnswer,
    ) -> Result<(), StreamError> {
        let url = format!("{}/talks/streams/{}/sdp", self.config.api_url, stream_id);
        let request = SubmitAnswerRequest {
            answer: answer.clone(),
            session_id: session_token.to_string(),
        };

        let response = self
            .affinity(self.client.post(&url), session_token)
            .json(&request)
            .send()
            .await
            .map_err(|e| StreamError::Network(e.to_string()))?;
        Self::check_status(response, "SDP answer").await?;

        debug!(stream_id, "SDP answer submitted");
        Ok(())
    }

    /// Forward one ICE candidate.
    ///
    /// Candidates are advisory; callers treat failures as best-effort.
    pub async fn submit_ice_candidate(
        &self,
        stream_id: &str,
        session_token: &str,
        candidate: &IceCandidate,
    ) -> Result<(), StreamError> {
        let url = format!("{}/talks/streams/{}/ice", self.config.api_url, stream_id);
        let request = SubmitIceRequest {
            candidate: candidate.clone(),
            session_id: session_token.to_string(),
        };

        let response = self
            .affinity(self.client.post(&url), session_token)
            .json(&request)
            .send()
            .await
            .map_err(|e| StreamError::Network(e.to_string()))?;
        Self::check_status(response, "ICE candidate").await?;

        debug!(stream_id, "ICE candidate submitted");
        Ok(())
    }

    /// Play a publicly reachable audio resource through the presenter.
    pub async fn speak(
        &self,
        stream_id: &str,
        session_token: &str,
        audio_url: &str,
    ) -> Result<(), StreamError> {
        let url = format!("{}/talks/streams/{}", self.config.api_url, stream_id);
        let request = SpeakRequest {
            script: SpeakScript {
                kind: "audio".to_string(),
                audio_url: audio_url.to_string(),
            },
            driver_url: self.config.driver_url.clone(),
            config: SpeakConfig { stitch: true },
            session_id: session_token.to_string(),
        };

        let response = self
            .affinity(self.client.post(&url), session_token)
            .json(&request)
            .send()
            .await
            .map_err(|e| StreamError::Network(e.to_string()))?;
        Self::check_status(response, "speak").await?;

        info!(stream_id, "Audio pushed to avatar stream");
        Ok(())
    }

    /// Tear the stream down on the provider side.
    pub async fn close(&self, stream_id: &str, session_token: &str) -> Result<(), StreamError> {
        let url = format!("{}/talks/streams/{}", self.config.api_url, stream_id);
        let request = CloseStreamRequest {
            session_id: session_token.to_string(),
        };

        let response = self
            .affinity(self.client.delete(&url), session_token)
            .json(&request)
            .send()
            .await
            .map_err(|e| StreamError::Network(e.to_string()))?;
        Self::check_status(response, "stream close").await?;

        info!(stream_id, "Avatar stream closed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client_with_key(key: &str) -> StreamClient {
        StreamClient::new(AvatarConfig::builder().api_key(key).build()).unwrap()
    }

    #[test]
    fn test_bare_key_gets_empty_username() {
        let client = client_with_key("secret");
        assert_eq!(client.credentials(), ("", "secret"));
    }

    #[test]
    fn test_user_pass_key_splits_once() {
        let client = client_with_key("alice:s3cret:with:colons");
        assert_eq!(client.credentials(), ("alice", "s3cret:with:colons"));
    }
}
