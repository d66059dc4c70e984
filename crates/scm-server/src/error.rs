//! Server error types and HTTP response handling.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// Server error type for HTTP handlers.
#[derive(Error, Debug)]
pub enum ServerError {
    /// Core registry error.
    #[error("registry error: {0}")]
    Core(#[from] scm_core::Error),

    /// Malformed request body.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("internal server error: {0}")]
    Internal(String),
}

pub type ServerResult<T> = Result<T, ServerError>;

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            Self::Core(scm_core::Error::NotFound(_)) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            Self::Core(scm_core::Error::AlreadyExists(_)) => {
                (StatusCode::CONFLICT, "ALREADY_EXISTS")
            }
            Self::Core(scm_core::Error::NotLeader) => (StatusCode::CONFLICT, "NOT_LEADER"),
            Self::Core(scm_core::Error::PipelineNotFound(_)) => {
                (StatusCode::NOT_FOUND, "PIPELINE_NOT_FOUND")
            }
            Self::Core(scm_core::Error::LayoutMismatch { .. }) => {
                (StatusCode::CONFLICT, "LAYOUT_MISMATCH")
            }
            Self::Core(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
            Self::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            Self::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        };

        let body = serde_json::json!({
            "error": self.to_string(),
            "code": code,
            "success": false,
        });
        (status, Json(body)).into_response()
    }
}
