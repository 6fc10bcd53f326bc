//! Live-stream ownership and lifecycle.

use std::collections::HashMap;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::api_types::{IceCandidate, IceServer, SdpAnswer, SdpOffer};
use crate::client::StreamClient;
use crate::error::StreamError;
use crate::session::{StreamSession, StreamSource, StreamState};

/// What the caller needs to finish the handshake locally.
///
/// The session token stays inside the registry: one token, one stream, one
/// owning client, and nothing for the caller to leak.
#[derive(Debug, Clone, Serialize)]
pub struct StreamOpened {
    /// Registry/provider stream ID; the handle for all subsequent calls.
    pub stream_id: String,
    /// The offer to answer locally.
    pub offer: SdpOffer,
    /// ICE servers for local candidate gathering.
    pub ice_servers: Vec<IceServer>,
}

/// Owns every live avatar stream in this process.
///
/// Serializes state transitions per stream, enforces that a session token is
/// never shared across two live streams, and evicts idle streams on access.
pub struct StreamRegistry {
    client: StreamClient,
    sessions: Mutex<HashMap<String, StreamSession>>,
    idle_ttl: Duration,
}

impl StreamRegistry {
    /// Create a registry around a signaling client.
    pub fn new(client: StreamClient) -> Self {
        let idle_ttl = Duration::from_secs(client.config().idle_ttl_secs);
        Self {
            client,
            sessions: Mutex::new(HashMap::new()),
            idle_ttl,
        }
    }

    /// Number of live streams.
    pub async fn live_streams(&self) -> usize {
        self.sessions.lock().await.len()
    }

    /// Create a stream and start tracking it.
    pub async fn open(&self, source: &StreamSource) -> Result<StreamOpened, StreamError> {
        self.sweep_idle().await;

        let created = self.client.create_stream(source).await?;

        {
            let mut sessions = self.sessions.lock().await;
            let conflict = sessions.contains_key(&created.id)
                || sessions
                    .values()
                    .any(|s| s.session_token() == created.session_id);
            if conflict {
                drop(sessions);
                // Don't leak the provider-side stream we just created.
                if let Err(e) = self.client.close(&created.id, &created.session_id).await {
                    warn!(stream_id = %created.id, error = %e, "Conflict teardown failed (ignored)");
                }
                return Err(StreamError::Protocol(
                    "stream or session token already bound to a live stream".to_string(),
                ));
            }
            sessions.insert(
                created.id.clone(),
                StreamSession::new(&created.id, &created.session_id),
            );
        }

        Ok(StreamOpened {
            stream_id: created.id,
            offer: created.offer,
            ice_servers: created.ice_servers,
        })
    }

    /// Submit the local SDP answer for a stream.
    ///
    /// The negotiation slot is reserved before the provider call so a
    /// concurrent duplicate fails fast; a provider rejection rolls the
    /// stream back so the caller can retry.
    pub async fn submit_answer(
        &self,
        stream_id: &str,
        answer: &SdpAnswer,
    ) -> Result<(), StreamError> {
        let token = {
            let mut sessions = self.sessions.lock().await;
            let session = Self::session_mut(&mut sessions, stream_id)?;
            session.begin_negotiation()?;
            session.session_token().to_string()
        };

        let result = self.client.submit_answer(stream_id, &token, answer).await;

        let queued = {
            let mut sessions = self.sessions.lock().await;
            match sessions.get_mut(stream_id) {
                Some(session) if result.is_ok() => {
                    session.touch();
                    session.drain_pending()
                }
                Some(session) => {
                    session.abort_negotiation();
                    Vec::new()
                }
                None => Vec::new(),
            }
        };

        // Flush candidates that trickled in while the answer was in flight.
        for candidate in queued {
            if let Err(e) = self
                .client
                .submit_ice_candidate(stream_id, &token, &candidate)
                .await
            {
                warn!(stream_id, error = %e, "Queued ICE candidate failed (ignored)");
            }
        }

        result
    }

    /// Forward one ICE candidate, or an end-of-candidates signal.
    ///
    /// `None` marks local gathering as complete and promotes the stream to
    /// ready. Candidates arriving before the answer has gone out are queued
    /// and flushed after it. Provider failures are logged and swallowed:
    /// candidates are advisory and more are expected.
    pub async fn submit_ice_candidate(
        &self,
        stream_id: &str,
        candidate: Option<IceCandidate>,
    ) -> Result<(), StreamError> {
        let mut sessions = self.sessions.lock().await;
        let session = Self::session_mut(&mut sessions, stream_id)?;
        if !session.accepts_candidates() {
            return Err(StreamError::Protocol(format!(
                "ICE candidate in state {:?}",
                session.state()
            )));
        }

        let candidate = match candidate {
            Some(candidate) => candidate,
            None => {
                session.mark_ready()?;
                return Ok(());
            }
        };

        if session.state() == StreamState::Created {
            // Answer not out yet; hold the candidate.
            session.queue_candidate(candidate);
            return Ok(());
        }

        session.touch();
        let token = session.session_token().to_string();
        drop(sessions);

        if let Err(e) = self
            .client
            .submit_ice_candidate(stream_id, &token, &candidate)
            .await
        {
            warn!(stream_id, error = %e, "ICE candidate submission failed (ignored)");
        }

        Ok(())
    }

    /// Push audio through the presenter.
    ///
    /// A provider rejection fails the turn: a silent avatar is a visible
    /// product defect. The stream returns to ready either way.
    pub async fn speak(&self, stream_id: &str, audio_url: &str) -> Result<(), StreamError> {
        let token = {
            let mut sessions = self.sessions.lock().await;
            let session = Self::session_mut(&mut sessions, stream_id)?;
            session.begin_speaking()?;
            session.session_token().to_string()
        };

        let result = self.client.speak(stream_id, &token, audio_url).await;

        let mut sessions = self.sessions.lock().await;
        if let Some(session) = sessions.get_mut(stream_id) {
            session.finish_speaking();
        }

        result
    }

    /// Tear down a stream. Never fails: cleanup must not be blocked by
    /// provider errors, and closing an unknown stream is a no-op.
    pub async fn close(&self, stream_id: &str) {
        let token = {
            let mut sessions = self.sessions.lock().await;
            match sessions.remove(stream_id) {
                Some(mut session) => {
                    session.close();
                    session.session_token().to_string()
                }
                None => return,
            }
        };

        if let Err(e) = self.client.close(stream_id, &token).await {
            warn!(stream_id, error = %e, "Stream teardown failed (ignored)");
        }
        info!(stream_id, "Avatar stream released");
    }

    /// Tear down streams whose last activity is older than the TTL.
    async fn sweep_idle(&self) {
        let idle: Vec<(String, String)> = {
            let mut sessions = self.sessions.lock().await;
            let idle_ids: Vec<String> = sessions
                .iter()
                .filter(|(_, s)| s.is_idle(self.idle_ttl))
                .map(|(id, _)| id.clone())
                .collect();
            idle_ids
                .into_iter()
                .filter_map(|id| {
                    sessions
                        .remove(&id)
                        .map(|s| (id, s.session_token().to_string()))
                })
                .collect()
        };

        for (stream_id, token) in idle {
            warn!(stream_id = %stream_id, "Closing idle avatar stream");
            if let Err(e) = self.client.close(&stream_id, &token).await {
                warn!(stream_id = %stream_id, error = %e, "Idle teardown failed (ignored)");
            }
        }
    }

    fn session_mut<'a>(
        sessions: &'a mut HashMap<String, StreamSession>,
        stream_id: &str,
    ) -> Result<&'a mut StreamSession, StreamError> {
        sessions
            .get_mut(stream_id)
            .ok_or_else(|| StreamError::UnknownStream(stream_id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AvatarConfig;

    fn registry() -> StreamRegistry {
        let client =
            StreamClient::new(AvatarConfig::builder().api_key("test-key").build()).unwrap();
        StreamRegistry::new(client)
    }

    async fn register(registry: &StreamRegistry, id: &str, token: &str) {
        registry
            .sessions
            .lock()
            .await
            .insert(id.to_string(), StreamSession::new(id, token));
    }

    #[tokio::test]
    async fn test_unknown_stream_is_reported() {
        let registry = registry();
        let err = registry
            .speak("missing", "https://cdn.example/a.mp3")
            .await
            .unwrap_err();
        assert!(matches!(err, StreamError::UnknownStream(_)));
    }

    #[tokio::test]
    async fn test_speak_before_answer_is_protocol_violation() {
        let registry = registry();
        register(&registry, "strm_1", "tok_1").await;

        let err = registry
            .speak("strm_1", "https://cdn.example/a.mp3")
            .await
            .unwrap_err();
        assert!(matches!(err, StreamError::Protocol(_)));
    }

    #[tokio::test]
    async fn test_end_of_candidates_promotes_to_ready() {
        let registry = registry();
        register(&registry, "strm_1", "tok_1").await;
        {
            let mut sessions = registry.sessions.lock().await;
            sessions.get_mut("strm_1").unwrap().begin_negotiation().unwrap();
        }

        registry.submit_ice_candidate("strm_1", None).await.unwrap();

        let sessions = registry.sessions.lock().await;
        assert_eq!(sessions.get("strm_1").unwrap().state(), StreamState::Ready);
    }

    #[tokio::test]
    async fn test_ice_completion_before_answer_is_rejected() {
        let registry = registry();
        register(&registry, "strm_1", "tok_1").await;

        let err = registry
            .submit_ice_candidate("strm_1", None)
            .await
            .unwrap_err();
        assert!(matches!(err, StreamError::Protocol(_)));
    }

    #[tokio::test]
    async fn test_candidates_queue_until_answer_goes_out() {
        let registry = registry();
        register(&registry, "strm_1", "tok_1").await;

        registry
            .submit_ice_candidate(
                "strm_1",
                Some(IceCandidate {
                    candidate: "candidate:1".to_string(),
                    sdp_mid: Some("0".to_string()),
                    sdp_m_line_index: Some(0),
                }),
            )
            .await
            .unwrap();

        let mut sessions = registry.sessions.lock().await;
        let session = sessions.get_mut("strm_1").unwrap();
        assert_eq!(session.state(), StreamState::Created);
        assert_eq!(session.drain_pending().len(), 1);
    }

    #[tokio::test]
    async fn test_close_unknown_stream_is_a_noop() {
        let registry = registry();
        registry.close("missing").await;
        assert_eq!(registry.live_streams().await, 0);
    }
}
