use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::evaluation::pipeline::Evaluator;
use crate::llm_client::TextGenerator;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub evaluator: Arc<Evaluator>,
    /// Same generator the evaluator uses; called directly by `GET /test-ai`.
    pub generator: Arc<dyn TextGenerator>,
    pub started_at: DateTime<Utc>,
}
