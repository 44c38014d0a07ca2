//! Structured Assessment Generator: builds the evaluation prompt and returns
//! whatever text the generator produced. Interpretation is the sanitizer's job.

use base64::Engine;
use tracing::info;

use crate::evaluation::errors::EvaluationError;
use crate::evaluation::models::{Document, EvaluationMode, JobDescription, PDF_MIME_TYPE};
use crate::evaluation::prompts::{
    OUTPUT_SCHEMA, SEMANTIC_HINT_TEMPLATE, TEXT_EVALUATION_TEMPLATE, VISION_EVALUATION_TEMPLATE,
};
use crate::llm_client::prompts::{fill_template, JSON_ONLY_INSTRUCTION};
use crate::llm_client::{PromptPart, ResponseFormat, TextGenerator};

/// What the generator gets to look at.
#[derive(Debug, Clone, Copy)]
pub enum Evidence<'a> {
    Text {
        resume_text: &'a str,
        semantic_hint: Option<u8>,
    },
    Vision {
        document: &'a Document,
    },
}

impl Evidence<'_> {
    pub fn mode(&self) -> EvaluationMode {
        match self {
            Evidence::Text { .. } => EvaluationMode::TextSemantic,
            Evidence::Vision { .. } => EvaluationMode::Vision,
        }
    }
}

/// Builds the prompt parts for one generator call.
pub fn build_prompt(job_description: &JobDescription, evidence: Evidence<'_>) -> Vec<PromptPart> {
    match evidence {
        Evidence::Text {
            resume_text,
            semantic_hint,
        } => {
            let hint = semantic_hint
                .map(|score| {
                    fill_template(SEMANTIC_HINT_TEMPLATE, &[("semantic_score", &score.to_string())])
                })
                .unwrap_or_default();
            let prompt = fill_template(
                TEXT_EVALUATION_TEMPLATE,
                &[
                    ("job_description", job_description.as_str()),
                    ("resume_text", resume_text),
                    ("semantic_hint", &hint),
                    ("output_schema", OUTPUT_SCHEMA),
                    ("json_only", JSON_ONLY_INSTRUCTION),
                ],
            );
            vec![PromptPart::Text(prompt)]
        }
        Evidence::Vision { document } => {
            let prompt = fill_template(
                VISION_EVALUATION_TEMPLATE,
                &[
                    ("job_description", job_description.as_str()),
                    ("output_schema", OUTPUT_SCHEMA),
                    ("json_only", JSON_ONLY_INSTRUCTION),
                ],
            );
            let encoded = base64::engine::general_purpose::STANDARD.encode(document.bytes());
            info!("Document converted to base64, size: {}", encoded.len());
            vec![
                PromptPart::Text(prompt),
                PromptPart::InlineData {
                    mime_type: PDF_MIME_TYPE.to_string(),
                    data: encoded,
                },
            ]
        }
    }
}

/// Calls the generator and returns its raw text.
pub async fn generate(
    generator: &dyn TextGenerator,
    job_description: &JobDescription,
    evidence: Evidence<'_>,
) -> Result<String, EvaluationError> {
    let parts = build_prompt(job_description, evidence);
    info!("Requesting {} assessment", evidence.mode().as_str());

    let text = generator
        .generate(&parts, ResponseFormat::Json)
        .await
        .map_err(EvaluationError::from_generation)?;

    if text.trim().is_empty() {
        return Err(EvaluationError::EmptyResponse);
    }
    Ok(text)
}
