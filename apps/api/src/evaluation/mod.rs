// Résumé evaluation: text extraction → semantic score → LLM assessment →
// sanitization, with a vision fallback for documents without a text layer.
// All LLM calls go through llm_client; nothing here talks to Gemini directly.

pub mod assessor;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod pipeline;
pub mod prompts;
pub mod sanitizer;
pub mod semantic;
