//! Avatar stream signaling routes.
//!
//! These endpoints relay the browser's side of the offer/answer/ICE exchange
//! to the provider. The session token never leaves the server: the registry
//! holds it per stream, which is what enforces one-token-one-stream.

use avatar_stream::{IceCandidate, SdpAnswer, StreamOpened, StreamSource};
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use coach_core::RateLimitSpec;
use coach_engine::EngineError;
use serde::Deserialize;

use crate::error::{ApiError, Result};
use crate::routes::require_owner;
use crate::state::AppState;

/// Request to open an avatar stream.
///
/// Exactly one of `source_url` or `presenter_id` must be supplied.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateStreamRequest {
    pub source_url: Option<String>,
    pub presenter_id: Option<String>,
}

/// The browser's local SDP answer.
#[derive(Deserialize)]
pub struct SubmitAnswerRequest {
    pub answer: SdpAnswer,
}

/// One trickled ICE candidate; an absent candidate marks gathering complete.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitIceRequest {
    pub candidate: Option<String>,
    pub sdp_mid: Option<String>,
    pub sdp_m_line_index: Option<u32>,
}

/// Audio to play through the presenter.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeakRequest {
    pub audio_url: String,
}

/// Open a new avatar stream.
pub async fn create_stream(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<CreateStreamRequest>,
) -> Result<(StatusCode, Json<StreamOpened>)> {
    let owner = require_owner(&headers)?;
    state
        .limiter
        .check(&format!("stream:{}", owner), &RateLimitSpec::READ)
        .await
        .map_err(EngineError::from)?;

    let source = match (req.source_url, req.presenter_id) {
        (Some(url), None) => StreamSource::SourceImage(url),
        (None, Some(name)) => StreamSource::Presenter(name),
        _ => {
            return Err(ApiError::BadRequest(
                "supply exactly one of sourceUrl or presenterId".to_string(),
            ))
        }
    };

    let opened = state.streams.open(&source).await?;
    Ok((StatusCode::CREATED, Json(opened)))
}

/// Complete the SDP handshake for a stream.
pub async fn submit_answer(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(stream_id): Path<String>,
    Json(req): Json<SubmitAnswerRequest>,
) -> Result<StatusCode> {
    require_owner(&headers)?;
    state.streams.submit_answer(&stream_id, &req.answer).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Forward one ICE candidate (or the end-of-candidates signal).
///
/// Provider-side failures are already swallowed by the registry; only
/// ordering violations and unknown streams surface here.
pub async fn submit_ice(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(stream_id): Path<String>,
    Json(req): Json<SubmitIceRequest>,
) -> Result<StatusCode> {
    require_owner(&headers)?;

    let candidate = req.candidate.map(|candidate| IceCandidate {
        candidate,
        sdp_mid: req.sdp_mid,
        sdp_m_line_index: req.sdp_m_line_index,
    });

    state.streams.submit_ice_candidate(&stream_id, candidate).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Drive audio through the presenter.
pub async fn speak(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(stream_id): Path<String>,
    Json(req): Json<SpeakRequest>,
) -> Result<StatusCode> {
    let owner = require_owner(&headers)?;
    state
        .limiter
        .check(&format!("speak:{}", owner), &RateLimitSpec::SPEAK)
        .await
        .map_err(EngineError::from)?;

    state.streams.speak(&stream_id, &req.audio_url).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Tear down a stream. Always succeeds.
pub async fn close_stream(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(stream_id): Path<String>,
) -> Result<StatusCode> {
    require_owner(&headers)?;
    state.streams.close(&stream_id).await;
    Ok(StatusCode::NO_CONTENT)
}
