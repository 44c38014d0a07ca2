use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::evaluation::errors::EvaluationError;
use crate::llm_client::LlmError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Upload error: {0}")]
    Upload(#[from] MultipartError),

    #[error("Evaluation error: {0}")]
    Evaluation(#[from] EvaluationError),

    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Upload(e) if e.status() == StatusCode::PAYLOAD_TOO_LARGE => (
                StatusCode::BAD_REQUEST,
                "FILE_TOO_LARGE",
                "File too large. Maximum size is 10MB.".to_string(),
            ),
            AppError::Upload(e) => (
                StatusCode::BAD_REQUEST,
                "UPLOAD_ERROR",
                format!("File upload error: {}", e.body_text()),
            ),
            AppError::Evaluation(EvaluationError::Validation(msg)) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
            }
            AppError::Evaluation(e @ EvaluationError::UpstreamCapability(_)) => {
                tracing::error!("Upstream capability error: {e}");
                (
                    StatusCode::BAD_GATEWAY,
                    "UPSTREAM_ERROR",
                    "The AI service rejected the request".to_string(),
                )
            }
            AppError::Evaluation(e) => {
                tracing::error!("Evaluation failed: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "EVALUATION_FAILED",
                    format!("AI analysis failed: {e}"),
                )
            }
            AppError::Llm(e) => {
                tracing::error!("LLM error: {e}");
                (
                    StatusCode::BAD_GATEWAY,
                    "LLM_ERROR",
                    format!("AI connection failed: {e}"),
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
