//! Error types for lcm-admin

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use lcm_common::api::ErrorResponse;
use thiserror::Error;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing or wrong credentials (401)
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Resource not found (404)
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Invalid request (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Conflict (409), e.g. the same action is already saving
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Internal server error (500)
    #[error("Internal server error: {0}")]
    Internal(String),

    /// lcm-common error
    #[error(transparent)]
    Common(#[from] lcm_common::Error),
}

impl ApiError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        use lcm_common::Error as E;

        match self {
            ApiError::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            ApiError::NotFound(_) | ApiError::Common(E::NotFound(_)) => {
                (StatusCode::NOT_FOUND, "NOT_FOUND")
            }
            ApiError::BadRequest(_) | ApiError::Common(E::InvalidInput(_)) => {
                (StatusCode::BAD_REQUEST, "BAD_REQUEST")
            }
            ApiError::Conflict(_) | ApiError::Common(E::Conflict(_)) => {
                (StatusCode::CONFLICT, "CONFLICT")
            }
            ApiError::Common(E::Database(_)) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "DATABASE_ERROR")
            }
            ApiError::Internal(_) | ApiError::Common(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        let message = match &self {
            ApiError::Common(err) => err.to_string(),
            ApiError::Unauthorized(msg)
            | ApiError::NotFound(msg)
            | ApiError::BadRequest(msg)
            | ApiError::Conflict(msg)
            | ApiError::Internal(msg) => msg.clone(),
        };

        (status, Json(ErrorResponse::new(code, message))).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
