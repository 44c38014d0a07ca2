use axum::{extract::State, Json};
use chrono::Utc;
use serde_json::{json, Value};

use crate::errors::AppError;
use crate::llm_client::prompts::CONNECTIVITY_CHECK_PROMPT;
use crate::llm_client::{PromptPart, ResponseFormat};
use crate::state::AppState;

/// GET /health
/// Returns a simple status object with service version and uptime.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    let now = Utc::now();
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "atscore",
        "timestamp": now.to_rfc3339(),
        "uptime_secs": (now - state.started_at).num_seconds(),
        "ai_configured": true
    }))
}

/// GET /test-ai
/// Round-trips a trivial prompt through the generator.
pub async fn test_ai_handler(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    let response = state
        .generator
        .generate(&[PromptPart::text(CONNECTIVITY_CHECK_PROMPT)], ResponseFormat::PlainText)
        .await?;

    Ok(Json(json!({
        "status": "AI connection successful",
        "response": response.trim()
    })))
}
