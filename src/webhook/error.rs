//! JSON error responses for the webhook endpoints
//!
//! Every failure surfaces as `{"error": <code>, "message": <text>}` with a
//! matching status code.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::orchestrator::OrchestratorError;

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct ErrorBody {
    /// Machine-readable error code
    pub error: String,
    pub message: String,
}

#[derive(Debug)]
pub enum ApiError {
    /// 500, the reply could not be produced
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", msg),
        };

        let body = ErrorBody {
            error: code.to_string(),
            message,
        };

        (status, Json(body)).into_response()
    }
}

impl From<OrchestratorError> for ApiError {
    fn from(err: OrchestratorError) -> Self {
        error!(error = %err, "Failed to answer webhook message");
        ApiError::Internal(err.to_string())
    }
}
