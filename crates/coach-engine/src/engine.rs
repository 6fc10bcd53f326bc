//! The session engine that answers one coaching turn.

use std::sync::Arc;

use coach_core::{
    fingerprint, next_phase, phase_after_turns, sanitize::sanitize_chat_message, ChatTurn,
    CompletionBackend, Phase, RateLimit, Role, SingleFlight, SlidingWindowLimiter,
};
use coach_database::models::{InterviewMessage, InterviewSession};
use coach_database::{application, message, now_rfc3339, session, Database, DatabaseError};
use futures::FutureExt;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::prompts;

/// Result of one completed turn.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct TurnOutcome {
    /// The interviewer's reply.
    pub reply: String,
    /// Phase the session is in after this turn.
    pub phase: Phase,
    /// Questions asked so far.
    pub question_count: u32,
}

type TurnResult = Result<TurnOutcome, EngineError>;

/// Orchestrates one chat turn end to end.
///
/// Composes admission control, request deduplication, sanitization, message
/// persistence, and a completion backend. This is the only component that
/// mutates a session's phase or question count.
#[derive(Clone)]
pub struct SessionEngine {
    db: Database,
    brain: Arc<dyn CompletionBackend>,
    limiter: Arc<dyn RateLimit>,
    turns_in_flight: Arc<SingleFlight<TurnResult>>,
    config: EngineConfig,
}

impl SessionEngine {
    /// Create an engine with a process-local sliding-window limiter.
    pub fn new(db: Database, brain: Arc<dyn CompletionBackend>, config: EngineConfig) -> Self {
        Self::with_limiter(db, brain, Arc::new(SlidingWindowLimiter::new()), config)
    }

    /// Create an engine with a caller-supplied limiter.
    ///
    /// Multi-instance deployments swap in a shared-store limiter here.
    pub fn with_limiter(
        db: Database,
        brain: Arc<dyn CompletionBackend>,
        limiter: Arc<dyn RateLimit>,
        config: EngineConfig,
    ) -> Self {
        info!(
            backend = brain.name(),
            max_questions = config.max_questions,
            "Session engine initialized"
        );
        Self {
            db,
            brain,
            limiter,
            turns_in_flight: Arc::new(SingleFlight::new()),
            config,
        }
    }

    /// The engine configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Start a coaching run for an application.
    ///
    /// The session begins in INTRO with zero questions asked.
    pub async fn start_session(
        &self,
        application_id: &str,
        owner_id: &str,
    ) -> Result<InterviewSession, EngineError> {
        self.limiter
            .check(&format!("session:{}", owner_id), &self.config.read_limit)
            .await?;

        let app = application::get_application(self.db.pool(), application_id)
            .await
            .map_err(|e| match e {
                DatabaseError::NotFound { .. } => {
                    EngineError::InvalidInput(format!("unknown application: {}", application_id))
                }
                other => other.into(),
            })?;
        if app.owner_id != owner_id {
            warn!(application_id, "Session start rejected: ownership mismatch");
            return Err(EngineError::Unauthorized);
        }

        let new_session = InterviewSession {
            id: Uuid::new_v4().to_string(),
            application_id: application_id.to_string(),
            owner_id: owner_id.to_string(),
            phase: Phase::Intro.as_str().to_string(),
            question_count: 0,
            started_at: now_rfc3339(),
            completed_at: None,
            overall_score: None,
            feedback_summary: None,
        };
        session::create_session(self.db.pool(), &new_session).await?;

        info!(session_id = %new_session.id, application_id, "Coaching session started");
        Ok(new_session)
    }

    /// Fetch a session and its ordered transcript, owner-checked.
    pub async fn session_transcript(
        &self,
        session_id: &str,
        owner_id: &str,
    ) -> Result<(InterviewSession, Vec<InterviewMessage>), EngineError> {
        self.limiter
            .check(&format!("read:{}", owner_id), &self.config.read_limit)
            .await?;

        let stored = session::get_session(self.db.pool(), session_id).await?;
        if stored.owner_id != owner_id {
            return Err(EngineError::Unauthorized);
        }

        let messages = message::list_messages(self.db.pool(), session_id).await?;
        Ok((stored, messages))
    }

    /// Handle one chat turn.
    ///
    /// Admission, validation, and deduplication run here; everything that
    /// touches the session itself runs once per dedup key in
    /// [`Self::execute_turn`]. Concurrent identical retries share a single
    /// execution and therefore a single persisted message pair.
    pub async fn handle_turn(
        &self,
        session_id: &str,
        owner_id: &str,
        raw_message: &str,
    ) -> Result<TurnOutcome, EngineError> {
        self.limiter
            .check(&format!("chat:{}", owner_id), &self.config.chat_limit)
            .await?;

        if raw_message.trim().is_empty() {
            return Err(EngineError::InvalidInput("message is empty".to_string()));
        }
        if raw_message.chars().count() > self.config.max_message_chars {
            return Err(EngineError::InvalidInput(format!(
                "message exceeds {} characters",
                self.config.max_message_chars
            )));
        }

        let sanitized = sanitize_chat_message(raw_message);
        if sanitized.chars().count() < self.config.min_message_chars {
            // Catches inputs that were pure injection payloads.
            return Err(EngineError::InvalidInput(
                "message too short after sanitization".to_string(),
            ));
        }

        let key = fingerprint(&format!(
            "{}\u{1f}{}\u{1f}{}",
            owner_id, session_id, sanitized
        ));

        let (outcome, leader) = self
            .turns_in_flight
            .run(&key, {
                let engine = self.clone();
                let session_id = session_id.to_string();
                let owner_id = owner_id.to_string();
                let sanitized = sanitized.clone();
                move || {
                    async move {
                        engine
                            .execute_turn(&session_id, &owner_id, &sanitized)
                            .await
                    }
                    .boxed()
                }
            })
            .await;

        if !leader {
            debug!(session_id, "Joined an in-flight identical turn");
        }

        outcome
    }

    /// Execute one turn against the session. Runs once per dedup key.
    async fn execute_turn(
        &self,
        session_id: &str,
        owner_id: &str,
        sanitized: &str,
    ) -> TurnResult {
        let pool = self.db.pool();

        let stored = session::get_session(pool, session_id).await?;
        if stored.owner_id != owner_id {
            warn!(session_id, "Turn rejected: ownership mismatch");
            return Err(EngineError::Unauthorized);
        }

        let app = application::get_application(pool, &stored.application_id).await?;
        let transcript = message::list_messages(pool, session_id).await?;

        let (phase, question_count) = self.reconcile_phase(&stored, transcript.len()).await?;

        // Replay the transcript into the completion call, ending with the
        // current (sanitized) user message.
        let system_prompt = prompts::build_system_prompt(&app, phase, question_count);
        let mut turns: Vec<ChatTurn> = transcript
            .iter()
            .map(|m| {
                if m.role == Role::Assistant.as_str() {
                    ChatTurn::assistant(m.content.clone())
                } else {
                    ChatTurn::user(m.content.clone())
                }
            })
            .collect();
        turns.push(ChatTurn::user(sanitized));

        // Completion failure fails the whole turn before anything is
        // persisted: a user turn with no reply would corrupt the transcript.
        let reply = self.brain.complete(&system_prompt, &turns).await?;

        message::append_message(pool, session_id, Role::User.as_str(), sanitized, &now_rfc3339())
            .await?;
        message::append_message(
            pool,
            session_id,
            Role::Assistant.as_str(),
            &reply,
            &now_rfc3339(),
        )
        .await?;

        let next = next_phase(phase, question_count, self.config.max_questions);
        let next_count = if phase == Phase::Feedback && next == Phase::Ask {
            question_count + 1
        } else {
            question_count
        };

        if next != phase || next_count != question_count {
            let completed_at = (next == Phase::Completed).then(now_rfc3339);
            session::update_phase(
                pool,
                session_id,
                next.as_str(),
                next_count as i64,
                completed_at.as_deref(),
            )
            .await?;
        }

        info!(
            session_id,
            phase = %next,
            question_count = next_count,
            "Turn completed"
        );

        Ok(TurnOutcome {
            reply,
            phase: next,
            question_count: next_count,
        })
    }

    /// Resolve the authoritative phase for a session.
    ///
    /// The stored phase must be one of the six known states (anything else
    /// fails closed). If it lags the phase replayed from the transcript
    /// length - a crash landed between message persistence and the phase
    /// update - the session row is repaired before the turn proceeds.
    async fn reconcile_phase(
        &self,
        stored: &InterviewSession,
        transcript_len: usize,
    ) -> Result<(Phase, u32), EngineError> {
        let stored_phase = Phase::parse(&stored.phase).ok_or_else(|| {
            tracing::error!(
                session_id = %stored.id,
                phase = %stored.phase,
                "Unrecognized session phase"
            );
            EngineError::Protocol(format!("unrecognized session phase: {}", stored.phase))
        })?;

        let completed_turns = (transcript_len / 2) as u64;
        let (expected_phase, expected_count) =
            phase_after_turns(completed_turns, self.config.max_questions);

        if stored_phase == expected_phase && stored.question_count == i64::from(expected_count) {
            return Ok((stored_phase, expected_count));
        }

        warn!(
            session_id = %stored.id,
            stored_phase = %stored_phase,
            expected_phase = %expected_phase,
            "Session phase lagged transcript, repairing"
        );
        let completed_at = (expected_phase == Phase::Completed).then(now_rfc3339);
        session::update_phase(
            self.db.pool(),
            &stored.id,
            expected_phase.as_str(),
            i64::from(expected_count),
            completed_at.as_deref(),
        )
        .await?;

        Ok((expected_phase, expected_count))
    }
}
