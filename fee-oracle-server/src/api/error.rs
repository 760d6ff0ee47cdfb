use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// API-specific error types with proper HTTP status code mapping
#[derive(Error, Debug)]
pub enum ApiError {
    /// Requested resource does not exist (404)
    #[error("Not found: {0}")]
    NotFound(String),

    /// Service unavailable - no estimate yet (503)
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::ServiceUnavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg),
        };

        (status, message).into_response()
    }
}
