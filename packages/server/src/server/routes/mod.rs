//! REST route handlers and the error-to-response mapping.

pub mod borrow_requests;
pub mod health;
pub mod notifications;
pub mod tools;
pub mod users;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::error;

use crate::common::LendingError;

/// JSON error envelope for the REST surface.
///
/// Each `LendingError` kind maps to a distinct status code and stable
/// `error` code so clients can render "not found", "not allowed", "wrong
/// state" and "conflict" distinctly.
pub struct ApiError(pub LendingError);

impl From<LendingError> for ApiError {
    fn from(e: LendingError) -> Self {
        ApiError(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = match &self.0 {
            LendingError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            LendingError::Unauthorized(_) => (StatusCode::FORBIDDEN, "unauthorized"),
            LendingError::InvalidState { .. } => (StatusCode::CONFLICT, "invalid_state"),
            LendingError::ResourceConflict(_) => (StatusCode::CONFLICT, "resource_conflict"),
            LendingError::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, "validation_error"),
            LendingError::Internal(e) => {
                error!(error = %e, "internal error serving request");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error")
            }
        };

        let message = match &self.0 {
            LendingError::Internal(_) => "internal server error".to_string(),
            other => other.to_string(),
        };

        (status, Json(json!({ "error": code, "message": message }))).into_response()
    }
}
