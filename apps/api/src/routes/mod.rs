pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    http::Uri,
    routing::{get, post},
    Router,
};

use crate::errors::AppError;
use crate::evaluation::handlers;
use crate::evaluation::models::MAX_DOCUMENT_BYTES;
use crate::state::AppState;

/// Room for the job description and multipart framing on top of the document.
const MULTIPART_OVERHEAD_BYTES: usize = 1024 * 1024;

async fn not_found(uri: Uri) -> AppError {
    AppError::NotFound(format!("Endpoint {} not found", uri.path()))
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/test-ai", get(health::test_ai_handler))
        .route(
            "/evaluate",
            post(handlers::handle_evaluate)
                .layer(DefaultBodyLimit::max(MAX_DOCUMENT_BYTES + MULTIPART_OVERHEAD_BYTES)),
        )
        .fallback(not_found)
        .with_state(state)
}
