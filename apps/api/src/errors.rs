use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::llm_client::normalize::NormalizeError;
use crate::llm_client::{LlmError, LlmErrorKind};
use crate::store::StoreError;

/// Shown whenever model output fails to parse or validate.
pub const PARSE_FAILURE_MESSAGE: &str = "Failed to parse generated content. Please try again.";

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
/// Every failure renders as `{ "success": false, "error": <message>, "code": <CODE> }`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    #[error("Malformed model output: {0}")]
    MalformedOutput(String),

    #[error("Upstream error: {0}")]
    Upstream(String),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<NormalizeError> for AppError {
    fn from(e: NormalizeError) -> Self {
        AppError::MalformedOutput(e.to_string())
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl AppError {
    /// The message a caller may display, without internal detail.
    pub fn public_message(&self) -> String {
        match self {
            AppError::NotFound(msg) | AppError::Validation(msg) | AppError::Upstream(msg) => {
                msg.clone()
            }
            AppError::Llm(e) => e.user_message(),
            AppError::MalformedOutput(_) => PARSE_FAILURE_MESSAGE.to_string(),
            AppError::Store(_) => "A database error occurred".to_string(),
            AppError::Internal(_) => "An internal server error occurred".to_string(),
        }
    }

    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            AppError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            AppError::Llm(e) => match e.kind() {
                LlmErrorKind::Credentials => (StatusCode::BAD_GATEWAY, "LLM_CREDENTIALS"),
                LlmErrorKind::RateLimited => (StatusCode::TOO_MANY_REQUESTS, "LLM_RATE_LIMITED"),
                LlmErrorKind::Network => (StatusCode::BAD_GATEWAY, "LLM_NETWORK"),
                LlmErrorKind::Other => (StatusCode::BAD_GATEWAY, "LLM_ERROR"),
            },
            AppError::MalformedOutput(_) => (StatusCode::BAD_GATEWAY, "MALFORMED_OUTPUT"),
            AppError::Upstream(_) => (StatusCode::BAD_GATEWAY, "UPSTREAM_ERROR"),
            AppError::Store(_) => (StatusCode::INTERNAL_SERVER_ERROR, "DATABASE_ERROR"),
            AppError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match &self {
            AppError::Llm(e) => tracing::error!("LLM error: {e}"),
            AppError::MalformedOutput(msg) => tracing::error!("Malformed model output: {msg}"),
            AppError::Upstream(msg) => tracing::warn!("Upstream error: {msg}"),
            AppError::Store(e) => tracing::error!("Store error: {e}"),
            AppError::Internal(e) => tracing::error!("Internal error: {e:?}"),
            AppError::NotFound(_) | AppError::Validation(_) => {}
        }

        let (status, code) = self.status_and_code();
        let body = Json(json!({
            "success": false,
            "error": self.public_message(),
            "code": code,
        }));

        (status, body).into_response()
    }
}
