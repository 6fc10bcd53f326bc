//! Error-to-status mapping for the HTTP surface.

use avatar_stream::StreamError;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use coach_engine::EngineError;
use thiserror::Error;

/// Errors surfaced by API handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Turn engine failure.
    #[error(transparent)]
    Engine(#[from] EngineError),

    /// Avatar signaling failure.
    #[error(transparent)]
    Stream(#[from] StreamError),

    /// Request rejected before reaching a component.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Missing or unusable caller identity.
    #[error("missing caller identity")]
    MissingOwner,
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Engine(err) => match err {
                EngineError::Unauthorized => StatusCode::UNAUTHORIZED,
                EngineError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
                EngineError::InvalidInput(_) => StatusCode::BAD_REQUEST,
                EngineError::SessionNotFound(_) => StatusCode::NOT_FOUND,
                EngineError::Upstream(_)
                | EngineError::Database(_)
                | EngineError::Protocol(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::Stream(err) => match err {
                StreamError::UnknownStream(_) => StatusCode::NOT_FOUND,
                StreamError::Protocol(_) => StatusCode::CONFLICT,
                StreamError::Upstream { .. } | StreamError::Network(_) => StatusCode::BAD_GATEWAY,
                StreamError::Configuration(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::MissingOwner => StatusCode::UNAUTHORIZED,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.to_string();

        if status.is_server_error() {
            tracing::error!("Request failed: {}", message);
        } else {
            tracing::debug!("Request rejected ({}): {}", status, message);
        }

        let body = Json(serde_json::json!({ "error": message }));

        if let ApiError::Engine(EngineError::RateLimited { retry_after_secs }) = &self {
            return (
                status,
                [(header::RETRY_AFTER, retry_after_secs.to_string())],
                body,
            )
                .into_response();
        }

        (status, body).into_response()
    }
}

/// Result type for API handlers.
pub type Result<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_error_statuses() {
        let cases = [
            (EngineError::Unauthorized, StatusCode::UNAUTHORIZED),
            (
                EngineError::RateLimited {
                    retry_after_secs: 5,
                },
                StatusCode::TOO_MANY_REQUESTS,
            ),
            (
                EngineError::InvalidInput("bad".to_string()),
                StatusCode::BAD_REQUEST,
            ),
            (
                EngineError::SessionNotFound("s".to_string()),
                StatusCode::NOT_FOUND,
            ),
            (
                EngineError::Upstream("down".to_string()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                EngineError::Protocol("bad phase".to_string()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, expected) in cases {
            assert_eq!(ApiError::from(err).status(), expected);
        }
    }

    #[test]
    fn test_stream_error_statuses() {
        assert_eq!(
            ApiError::from(StreamError::UnknownStream("x".to_string())).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::from(StreamError::Protocol("early".to_string())).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::from(StreamError::Upstream {
                status: 500,
                message: "boom".to_string()
            })
            .status(),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn test_rate_limited_carries_retry_after() {
        let response = ApiError::from(EngineError::RateLimited {
            retry_after_secs: 7,
        })
        .into_response();

        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(
            response.headers().get(header::RETRY_AFTER).unwrap(),
            "7"
        );
    }
}
