//! Per-stream state tracking.

use std::time::{Duration, Instant};

use crate::api_types::IceCandidate;
use crate::error::StreamError;

/// What drives the presenter's face.
///
/// Exactly one of a static source image or a named presenter; the enum makes
/// supplying both (or neither) unrepresentable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamSource {
    /// Publicly reachable still image to animate.
    SourceImage(String),
    /// Provider presenter (e.g. "bank://lively/adult-woman").
    Presenter(String),
}

/// Lifecycle state of one avatar stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamState {
    /// Handshake created; offer handed to the caller, answer pending.
    Created,
    /// Answer submitted; ICE exchange in progress.
    Negotiating,
    /// Media path established; the avatar can speak.
    Ready,
    /// Audio is being pushed through the presenter.
    Speaking,
    /// Torn down. Terminal.
    Closed,
}

/// One live avatar stream owned by the client connection that created it.
///
/// Enforces the signaling order: the answer must be submitted before audio,
/// and nothing happens after close. The session token is held here and never
/// shared across streams.
#[derive(Debug)]
pub struct StreamSession {
    stream_id: String,
    session_token: String,
    state: StreamState,
    pending_candidates: Vec<IceCandidate>,
    last_activity: Instant,
}

impl StreamSession {
    /// Track a freshly created stream.
    pub fn new(stream_id: impl Into<String>, session_token: impl Into<String>) -> Self {
        Self {
            stream_id: stream_id.into(),
            session_token: session_token.into(),
            state: StreamState::Created,
            pending_candidates: Vec::new(),
            last_activity: Instant::now(),
        }
    }

    /// Provider stream ID.
    pub fn stream_id(&self) -> &str {
        &self.stream_id
    }

    /// The affinity token sent on every signaling call.
    pub fn session_token(&self) -> &str {
        &self.session_token
    }

    /// Current lifecycle state.
    pub fn state(&self) -> StreamState {
        self.state
    }

    /// Record activity for idle-eviction purposes.
    pub fn touch(&mut self) {
        self.last_activity = Instant::now();
    }

    /// Whether the stream has been inactive longer than `ttl`.
    pub fn is_idle(&self, ttl: Duration) -> bool {
        self.last_activity.elapsed() >= ttl
    }

    /// Reserve the answer slot: CREATED -> NEGOTIATING.
    pub fn begin_negotiation(&mut self) -> Result<(), StreamError> {
        match self.state {
            StreamState::Created => {
                self.state = StreamState::Negotiating;
                self.touch();
                Ok(())
            }
            other => Err(StreamError::Protocol(format!(
                "answer submitted in state {:?}",
                other
            ))),
        }
    }

    /// Roll back a failed answer submission so the caller can retry.
    pub fn abort_negotiation(&mut self) {
        if self.state == StreamState::Negotiating {
            self.state = StreamState::Created;
        }
    }

    /// ICE gathering finished: NEGOTIATING -> READY.
    pub fn mark_ready(&mut self) -> Result<(), StreamError> {
        match self.state {
            StreamState::Negotiating => {
                self.state = StreamState::Ready;
                self.touch();
                Ok(())
            }
            StreamState::Ready => Ok(()),
            other => Err(StreamError::Protocol(format!(
                "ICE completion signaled in state {:?}",
                other
            ))),
        }
    }

    /// Whether candidate submission is legal right now.
    ///
    /// Candidates may trickle any time after creation; they are advisory, so
    /// the window is wide. Only a closed stream refuses them.
    pub fn accepts_candidates(&self) -> bool {
        self.state != StreamState::Closed
    }

    /// Hold a candidate that arrived before the answer went out.
    pub fn queue_candidate(&mut self, candidate: IceCandidate) {
        self.touch();
        self.pending_candidates.push(candidate);
    }

    /// Take the candidates queued while the answer was pending.
    pub fn drain_pending(&mut self) -> Vec<IceCandidate> {
        std::mem::take(&mut self.pending_candidates)
    }

    /// Reserve the audio slot: READY -> SPEAKING.
    ///
    /// Speaking before the answer has been submitted is a protocol
    /// violation, not an upstream failure.
    pub fn begin_speaking(&mut self) -> Result<(), StreamError> {
        match self.state {
            StreamState::Ready => {
                self.state = StreamState::Speaking;
                self.touch();
                Ok(())
            }
            StreamState::Created | StreamState::Negotiating => Err(StreamError::Protocol(
                "speak requested before the SDP answer was submitted".to_string(),
            )),
            other => Err(StreamError::Protocol(format!(
                "speak requested in state {:?}",
                other
            ))),
        }
    }

    /// Audio push finished (success or failure): SPEAKING -> READY.
    pub fn finish_speaking(&mut self) {
        if self.state == StreamState::Speaking {
            self.state = StreamState::Ready;
        }
    }

    /// Tear down from any state. Terminal.
    pub fn close(&mut self) {
        self.state = StreamState::Closed;
    }
}
