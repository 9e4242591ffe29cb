use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::extraction::ExtractionError;
use crate::llm_client::LlmError;
use crate::session::models::ApplyError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Already applied: {0}")]
    AlreadyApplied(String),

    #[error("Rewrite not located: {0}")]
    RewriteNotLocated(String),

    #[error("Extraction failed: {0}")]
    Extraction(#[from] ExtractionError),

    #[error("Content rejected: {0}")]
    ContentRejected(String),

    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("LLM configuration error: {0}")]
    LlmConfiguration(String),

    #[error("LLM bad response: {0}")]
    LlmBadResponse(String),

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<LlmError> for AppError {
    fn from(e: LlmError) -> Self {
        match e {
            LlmError::RateLimited { .. } => AppError::RateLimited(e.to_string()),
            LlmError::SafetyRejected(_) => AppError::ContentRejected(e.to_string()),
            LlmError::InvalidCredentials(_) => AppError::LlmConfiguration(e.to_string()),
            LlmError::Malformed(_) | LlmError::Parse(_) | LlmError::EmptyContent => {
                AppError::LlmBadResponse(e.to_string())
            }
            LlmError::Http(_) | LlmError::Api { .. } => AppError::Llm(e.to_string()),
        }
    }
}

impl From<ApplyError> for AppError {
    fn from(e: ApplyError) -> Self {
        match e {
            ApplyError::UnknownSuggestion(_) => AppError::NotFound(e.to_string()),
            ApplyError::AlreadyApplied(_) => AppError::AlreadyApplied(e.to_string()),
            ApplyError::NotLocated(_) => AppError::RewriteNotLocated(e.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::AlreadyApplied(msg) => (StatusCode::CONFLICT, "ALREADY_APPLIED", msg.clone()),
            AppError::RewriteNotLocated(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "REWRITE_NOT_LOCATED",
                msg.clone(),
            ),
            AppError::Extraction(e) => {
                tracing::warn!("Extraction failed: {e}");
                (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    "EXTRACTION_FAILED",
                    e.to_string(),
                )
            }
            AppError::ContentRejected(msg) => {
                tracing::warn!("Content rejected: {msg}");
                (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    "CONTENT_REJECTED",
                    "The analysis service declined to process this content".to_string(),
                )
            }
            AppError::RateLimited(msg) => {
                tracing::warn!("Rate limited: {msg}");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "RATE_LIMITED",
                    "The analysis service is busy, try again shortly".to_string(),
                )
            }
            AppError::LlmConfiguration(msg) => {
                tracing::error!("LLM configuration error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "LLM_CONFIGURATION",
                    "The analysis service is misconfigured".to_string(),
                )
            }
            AppError::LlmBadResponse(msg) => {
                tracing::error!("LLM bad response: {msg}");
                (
                    StatusCode::BAD_GATEWAY,
                    "LLM_BAD_RESPONSE",
                    "The analysis service returned an unusable response".to_string(),
                )
            }
            AppError::Llm(msg) => {
                tracing::error!("LLM error: {msg}");
                (
                    StatusCode::BAD_GATEWAY,
                    "LLM_ERROR",
                    "An AI processing error occurred".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
