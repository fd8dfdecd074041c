//! Service-level errors and their HTTP rendering

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::forms::ValidationErrors;

/// Where the UI should go after a missing record
pub const NOT_FOUND_REDIRECT: &str = "/doctors";

/// Delay before the not-found redirect
pub const NOT_FOUND_REDIRECT_MS: u64 = 2000;

/// Failure of a flow or handler
#[derive(Error, Debug)]
pub enum AppError {
    /// One or more form fields failed validation; nothing was written
    #[error("Validation failed")]
    Validation(ValidationErrors),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Store, identity or blob collaborator failure
    #[error("{0}")]
    Collaborator(#[from] docfinder_common::Error),
}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        AppError::Validation(errors)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        use docfinder_common::Error as CommonError;

        match self {
            AppError::Validation(errors) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(json!({
                    "error": "Please correct the highlighted fields",
                    "fields": errors.errors,
                })),
            )
                .into_response(),
            AppError::NotFound(message) => (
                StatusCode::NOT_FOUND,
                Json(json!({
                    "error": message,
                    "redirect": NOT_FOUND_REDIRECT,
                    "redirect_after_ms": NOT_FOUND_REDIRECT_MS,
                })),
            )
                .into_response(),
            AppError::Unauthorized(message) => {
                (StatusCode::UNAUTHORIZED, Json(json!({ "error": message }))).into_response()
            }
            AppError::BadRequest(message) => {
                (StatusCode::BAD_REQUEST, Json(json!({ "error": message }))).into_response()
            }
            AppError::Collaborator(e) => {
                let status = match &e {
                    CommonError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
                    CommonError::NotFound(_) => StatusCode::NOT_FOUND,
                    CommonError::InvalidInput(_) => StatusCode::BAD_REQUEST,
                    CommonError::Blob(_) => StatusCode::BAD_GATEWAY,
                    _ => StatusCode::INTERNAL_SERVER_ERROR,
                };
                if status.is_server_error() {
                    error!("Request failed: {}", e);
                }
                (status, Json(json!({ "error": e.to_string() }))).into_response()
            }
        }
    }
}
