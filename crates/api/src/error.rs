//! API error types with HTTP response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use engine::EngineError;
use stats::StatsError;
use store::StoreError;

/// API-level error type that maps to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    /// Resource not found.
    NotFound(String),
    /// Bad request from the client.
    BadRequest(String),
    /// Reconciliation engine error.
    Engine(EngineError),
    /// Internal server error.
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Engine(err) => engine_error_to_response(err),
            ApiError::Internal(msg) => {
                tracing::error!(error = %msg, "internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
        };

        let body = serde_json::json!({ "error": message });
        (status, axum::Json(body)).into_response()
    }
}

fn engine_error_to_response(err: EngineError) -> (StatusCode, String) {
    match &err {
        EngineError::Invalid(_) => (StatusCode::BAD_REQUEST, err.to_string()),
        EngineError::NotFound(_) => (StatusCode::NOT_FOUND, err.to_string()),
        EngineError::Gateway(_) => (StatusCode::BAD_GATEWAY, err.to_string()),
        EngineError::UnknownResponse { .. } => {
            tracing::error!(error = %err, "unrecognized provider response");
            (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
        }
        EngineError::Store(StoreError::VersionConflict { .. }) => {
            (StatusCode::CONFLICT, err.to_string())
        }
        EngineError::Store(_) => (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()),
    }
}

impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        ApiError::Engine(err)
    }
}

impl From<StatsError> for ApiError {
    fn from(err: StatsError) -> Self {
        ApiError::Internal(err.to_string())
    }
}
