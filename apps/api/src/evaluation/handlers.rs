use axum::{
    extract::{Multipart, State},
    Json,
};
use bytes::Bytes;
use serde::Serialize;
use tracing::info;

use crate::errors::AppError;
use crate::evaluation::models::{AssessmentResult, Document, JobDescription, PDF_MIME_TYPE};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct EvaluateResponse {
    pub success: bool,
    pub result: AssessmentResult,
    pub message: String,
}

/// An uploaded résumé before validation.
struct Upload {
    file_name: Option<String>,
    content_type: Option<String>,
    data: Bytes,
}

/// POST /evaluate
///
/// Multipart fields: `file` (PDF) and `job_description` (text).
pub async fn handle_evaluate(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<EvaluateResponse>, AppError> {
    let mut job_description: Option<String> = None;
    let mut upload: Option<Upload> = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("job_description") => job_description = Some(field.text().await?),
            Some("file") => {
                let file_name = field.file_name().map(str::to_string);
                let content_type = field.content_type().map(str::to_string);
                let data = field.bytes().await?;
                upload = Some(Upload {
                    file_name,
                    content_type,
                    data,
                });
            }
            _ => {}
        }
    }

    let job_description = JobDescription::new(job_description.as_deref().unwrap_or_default())?;
    let upload = upload
        .ok_or_else(|| AppError::Validation("Please upload a PDF resume file.".to_string()))?;
    if upload
        .content_type
        .as_deref()
        .is_some_and(|ct| ct != PDF_MIME_TYPE)
    {
        return Err(AppError::Validation("Only PDF files are allowed!".to_string()));
    }

    info!(
        "Processing uploaded file: {}",
        upload.file_name.as_deref().unwrap_or("<unnamed>")
    );
    let document = Document::new(upload.data)?;

    let result = state.evaluator.evaluate(&document, &job_description).await?;

    Ok(Json(EvaluateResponse {
        success: true,
        result,
        message: "Resume analyzed successfully!".to_string(),
    }))
}
