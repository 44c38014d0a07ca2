//! Evaluation pipeline: orchestrates one résumé/JD evaluation.
//!
//! Flow: [text+semantic] extract → embed both (concurrently) → score →
//!       generate → sanitize → blend
//!       [vision] base64 document → generate → sanitize
//!
//! Attempts run in `ATTEMPT_ORDER`. A recoverable failure moves on to the
//! next attempt; the last attempt's failure is what the caller sees.
//! Upstream rejections (auth, quota) abort immediately.

use std::sync::Arc;

use tracing::{info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::evaluation::assessor::{generate, Evidence};
use crate::evaluation::errors::EvaluationError;
use crate::evaluation::models::{AssessmentResult, Document, EvaluationMode, JobDescription};
use crate::evaluation::sanitizer::sanitize;
use crate::evaluation::semantic::score_texts;
use crate::extraction::{TextExtractor, USABLE_TEXT_MIN_CHARS};
use crate::llm_client::{Embedder, TextGenerator};

const ATTEMPT_ORDER: [EvaluationMode; 2] = [EvaluationMode::TextSemantic, EvaluationMode::Vision];

/// Stateless across requests; share it behind an `Arc`.
pub struct Evaluator {
    extractor: TextExtractor,
    embedder: Arc<dyn Embedder>,
    generator: Arc<dyn TextGenerator>,
}

impl Evaluator {
    pub fn new(
        extractor: TextExtractor,
        embedder: Arc<dyn Embedder>,
        generator: Arc<dyn TextGenerator>,
    ) -> Self {
        Self {
            extractor,
            embedder,
            generator,
        }
    }

    pub async fn evaluate(
        &self,
        document: &Document,
        job_description: &JobDescription,
    ) -> Result<AssessmentResult, EvaluationError> {
        let span = info_span!("evaluate", request_id = %Uuid::new_v4());

        async move {
            info!("Evaluating document of {} bytes", document.size());
            let mut last_error = None;

            for mode in ATTEMPT_ORDER {
                match self.attempt(mode, document, job_description).await {
                    Ok(result) => {
                        info!(
                            "Evaluation succeeded in {} mode: match_score={}",
                            mode.as_str(),
                            result.match_score
                        );
                        return Ok(result);
                    }
                    Err(e) if e.is_recoverable() => {
                        warn!("{} attempt failed: {e}", mode.as_str());
                        last_error = Some(e);
                    }
                    Err(e) => return Err(e),
                }
            }

            Err(last_error.unwrap_or_else(|| {
                EvaluationError::GenerationFailed("no evaluation attempt was made".to_string())
            }))
        }
        .instrument(span)
        .await
    }

    async fn attempt(
        &self,
        mode: EvaluationMode,
        document: &Document,
        job_description: &JobDescription,
    ) -> Result<AssessmentResult, EvaluationError> {
        match mode {
            EvaluationMode::TextSemantic => self.text_attempt(document, job_description).await,
            EvaluationMode::Vision => self.vision_attempt(document, job_description).await,
        }
    }

    async fn text_attempt(
        &self,
        document: &Document,
        job_description: &JobDescription,
    ) -> Result<AssessmentResult, EvaluationError> {
        let extracted = self.extractor.extract(document).await?;
        if extracted.char_count() <= USABLE_TEXT_MIN_CHARS {
            return Err(EvaluationError::ExtractionFailed(format!(
                "Insufficient text extracted ({} characters via {})",
                extracted.char_count(),
                extracted.strategy
            )));
        }

        let semantic_score =
            score_texts(self.embedder.as_ref(), &extracted.text, job_description.as_str()).await?;
        info!("Semantic score: {}/100", semantic_score);

        let raw = generate(
            self.generator.as_ref(),
            job_description,
            Evidence::Text {
                resume_text: &extracted.text,
                semantic_hint: Some(semantic_score),
            },
        )
        .await?;

        Ok(sanitize(&raw)?.into_blended_result(semantic_score))
    }

    async fn vision_attempt(
        &self,
        document: &Document,
        job_description: &JobDescription,
    ) -> Result<AssessmentResult, EvaluationError> {
        info!("Falling back to AI vision");
        let raw = generate(
            self.generator.as_ref(),
            job_description,
            Evidence::Vision { document },
        )
        .await?;

        Ok(sanitize(&raw)?.into_vision_result())
    }
}
