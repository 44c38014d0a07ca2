mod config;
mod errors;
mod evaluation;
mod extraction;
mod llm_client;
mod routes;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use std::sync::Arc;

use crate::config::Config;
use crate::evaluation::pipeline::Evaluator;
use crate::extraction::TextExtractor;
use crate::llm_client::{GeminiClient, TextGenerator};
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting ATS evaluator v{}", env!("CARGO_PKG_VERSION"));

    // Initialize Gemini client (generation + embeddings)
    let gemini = Arc::new(GeminiClient::new(
        config.google_api_key.clone(),
        config.gemini_base_url.clone(),
    )?);
    info!(
        "LLM client initialized (model: {}, embeddings: {})",
        llm_client::MODEL,
        llm_client::EMBEDDING_MODEL
    );

    let generator: Arc<dyn TextGenerator> = gemini.clone();
    let evaluator = Evaluator::new(TextExtractor::default(), gemini, generator.clone());

    // Build app state
    let state = AppState {
        evaluator: Arc::new(evaluator),
        generator,
        started_at: chrono::Utc::now(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
