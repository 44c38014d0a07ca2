use thiserror::Error;

use crate::extraction::ExtractionError;
use crate::llm_client::LlmError;

/// Failure taxonomy of the evaluation pipeline.
///
/// Everything except `Validation` and `UpstreamCapability` is recoverable
/// inside the text attempt (the orchestrator falls back to vision mode).
#[derive(Debug, Error)]
pub enum EvaluationError {
    #[error("{0}")]
    Validation(String),

    #[error("Text extraction failed: {0}")]
    ExtractionFailed(String),

    #[error("Embedding service failure: {0}")]
    EmbeddingServiceFailure(String),

    #[error("Generation failed: {0}")]
    GenerationFailed(String),

    #[error("Generator returned an empty response")]
    EmptyResponse,

    #[error("Malformed generator response: {0}")]
    MalformedResponse(String),

    #[error("Upstream capability error: {0}")]
    UpstreamCapability(String),
}

impl EvaluationError {
    /// Whether the orchestrator may absorb this failure and try the next attempt.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            EvaluationError::ExtractionFailed(_)
                | EvaluationError::EmbeddingServiceFailure(_)
                | EvaluationError::GenerationFailed(_)
                | EvaluationError::EmptyResponse
                | EvaluationError::MalformedResponse(_)
        )
    }

    /// Maps an embedding capability error into the taxonomy.
    pub fn from_embedding(err: LlmError) -> Self {
        if err.is_upstream_rejection() {
            EvaluationError::UpstreamCapability(err.to_string())
        } else {
            EvaluationError::EmbeddingServiceFailure(err.to_string())
        }
    }

    /// Maps a generation capability error into the taxonomy.
    pub fn from_generation(err: LlmError) -> Self {
        match err {
            LlmError::EmptyContent => EvaluationError::EmptyResponse,
            e if e.is_upstream_rejection() => EvaluationError::UpstreamCapability(e.to_string()),
            e => EvaluationError::GenerationFailed(e.to_string()),
        }
    }
}

impl From<ExtractionError> for EvaluationError {
    fn from(err: ExtractionError) -> Self {
        EvaluationError::ExtractionFailed(err.to_string())
    }
}
