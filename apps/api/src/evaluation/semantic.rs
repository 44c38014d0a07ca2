//! Semantic scoring: cosine similarity between résumé and JD embeddings.

use tracing::debug;

use crate::evaluation::errors::EvaluationError;
use crate::llm_client::Embedder;

/// Cosine similarity in [-1, 1]. Zero-length vectors score 0.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let mut dot = 0.0_f32;
    let mut norm_a = 0.0_f32;
    let mut norm_b = 0.0_f32;
    for (x, y) in a.iter().zip(b) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    (dot / (norm_a.sqrt() * norm_b.sqrt())).clamp(-1.0, 1.0)
}

/// Scales similarity to a percentage. Anti-correlated embeddings would go
/// negative; the result is clamped to [0, 100] before anyone blends it.
pub fn semantic_score(a: &[f32], b: &[f32]) -> Result<u8, EvaluationError> {
    if a.len() != b.len() {
        return Err(EvaluationError::EmbeddingServiceFailure(format!(
            "embedding dimensions differ ({} vs {})",
            a.len(),
            b.len()
        )));
    }
    let percentage = (cosine_similarity(a, b) * 100.0).round();
    Ok(percentage.clamp(0.0, 100.0) as u8)
}

/// Embeds both texts concurrently and scores their similarity.
pub async fn score_texts(
    embedder: &dyn Embedder,
    resume_text: &str,
    job_description: &str,
) -> Result<u8, EvaluationError> {
    let (resume_vec, jd_vec) = tokio::try_join!(
        embedder.embed(resume_text),
        embedder.embed(job_description)
    )
    .map_err(EvaluationError::from_embedding)?;

    let score = semantic_score(&resume_vec, &jd_vec)?;
    debug!("Semantic score {} over {} dims", score, resume_vec.len());
    Ok(score)
}
