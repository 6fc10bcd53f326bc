//! Route handlers for the coach API.

pub mod chat;
pub mod health;
pub mod stream;

use axum::http::HeaderMap;
use axum::routing::{delete, get, post};
use axum::Router;

use crate::error::ApiError;
use crate::state::AppState;

/// Header carrying the authenticated caller's ID.
///
/// Authentication itself is an upstream concern; the surrounding product's
/// session middleware injects this header before requests reach us.
pub const OWNER_HEADER: &str = "x-owner-id";

/// Build the router with all routes.
pub fn router() -> Router<AppState> {
    Router::new()
        // Health check
        .route("/health", get(health::health))
        // Coaching sessions
        .route("/api/coach/sessions", post(chat::create_session))
        .route("/api/coach/sessions/:id", get(chat::get_session))
        .route("/api/coach/sessions/:id/turn", post(chat::post_turn))
        // Avatar streams
        .route("/api/coach/streams", post(stream::create_stream))
        .route("/api/coach/streams/:id/sdp", post(stream::submit_answer))
        .route("/api/coach/streams/:id/ice", post(stream::submit_ice))
        .route("/api/coach/streams/:id/speak", post(stream::speak))
        .route("/api/coach/streams/:id", delete(stream::close_stream))
}

/// Extract the caller's owner ID from the request headers.
pub fn require_owner(headers: &HeaderMap) -> Result<String, ApiError> {
    headers
        .get(OWNER_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .ok_or(ApiError::MissingOwner)
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    #[test]
    fn test_require_owner_present() {
        let mut headers = HeaderMap::new();
        headers.insert(OWNER_HEADER, HeaderValue::from_static("user-1"));
        assert_eq!(require_owner(&headers).unwrap(), "user-1");
    }

    #[test]
    fn test_require_owner_missing_or_blank() {
        assert!(require_owner(&HeaderMap::new()).is_err());

        let mut headers = HeaderMap::new();
        headers.insert(OWNER_HEADER, HeaderValue::from_static("   "));
        assert!(require_owner(&headers).is_err());
    }
}
