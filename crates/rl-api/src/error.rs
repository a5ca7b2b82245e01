//! Centralized error → status-code mapping: every handler funnels its
//! failure path through one `IntoResponse` impl instead of matching
//! status codes locally.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

use rl_core::orchestrator::OrchestratorError;
use rl_persistence::PersistenceError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("unauthorized")]
    Unauthorized,
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = serde_json::json!({ "error": self.to_string() });
        (status, Json(body)).into_response()
    }
}

impl From<PersistenceError> for ApiError {
    fn from(e: PersistenceError) -> Self {
        ApiError::Internal(e.to_string())
    }
}

impl From<OrchestratorError<PersistenceError>> for ApiError {
    fn from(e: OrchestratorError<PersistenceError>) -> Self {
        match e {
            OrchestratorError::Malformed(msg) => ApiError::BadRequest(msg),
            OrchestratorError::Unsupported => ApiError::BadRequest("unsupported event type".to_string()),
            OrchestratorError::MultipleOpenPeriods => ApiError::Conflict("multiple open periods".to_string()),
            OrchestratorError::Store(e) => ApiError::Internal(e.to_string()),
        }
    }
}
