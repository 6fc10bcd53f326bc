//! Coaching session routes.

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use coach_core::Phase;
use coach_database::models::{InterviewMessage, InterviewSession};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::routes::require_owner;
use crate::state::AppState;

/// Request to start a coaching session.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionRequest {
    pub application_id: String,
}

/// Session plus its ordered transcript.
#[derive(Serialize)]
pub struct SessionResponse {
    pub session: InterviewSession,
    pub messages: Vec<InterviewMessage>,
}

/// One chat turn from the candidate.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnRequest {
    pub user_message: String,
}

/// Result of one completed turn.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnResponse {
    pub reply: String,
    pub phase: Phase,
    pub question_count: u32,
}

/// Start a coaching run for an application.
pub async fn create_session(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<CreateSessionRequest>,
) -> Result<(StatusCode, Json<InterviewSession>)> {
    let owner = require_owner(&headers)?;
    let session = state.engine.start_session(&req.application_id, &owner).await?;
    Ok((StatusCode::CREATED, Json(session)))
}

/// Fetch a session and its transcript.
pub async fn get_session(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(session_id): Path<String>,
) -> Result<Json<SessionResponse>> {
    let owner = require_owner(&headers)?;
    let (session, messages) = state.engine.session_transcript(&session_id, &owner).await?;
    Ok(Json(SessionResponse { session, messages }))
}

/// Answer one chat turn.
pub async fn post_turn(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(session_id): Path<String>,
    Json(req): Json<TurnRequest>,
) -> Result<Json<TurnResponse>> {
    let owner = require_owner(&headers)?;
    let outcome = state
        .engine
        .handle_turn(&session_id, &owner, &req.user_message)
        .await?;

    Ok(Json(TurnResponse {
        reply: outcome.reply,
        phase: outcome.phase,
        question_count: outcome.question_count,
    }))
}
