/// LLM Client: the single point of entry for all Gemini API calls.
///
/// ARCHITECTURAL RULE: No other module may call the Gemini API directly.
/// Pipeline code depends on the `TextGenerator` / `Embedder` traits only;
/// `GeminiClient` is the production implementation of both.
///
/// Models are hardcoded. Do not make them configurable.
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

pub mod prompts;

/// The generation model used for every assessment.
pub const MODEL: &str = "gemini-1.5-flash";
/// The embedding model used for semantic scoring.
pub const EMBEDDING_MODEL: &str = "text-embedding-004";
const REQUEST_TIMEOUT_SECS: u64 = 120;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("LLM returned empty content")]
    EmptyContent,
}

impl LlmError {
    /// Authentication and quota rejections. These are not content problems,
    /// so no fallback strategy can fix them.
    pub fn is_upstream_rejection(&self) -> bool {
        matches!(
            self,
            LlmError::Api {
                status: 401 | 403 | 429,
                ..
            }
        )
    }
}

/// One part of a multi-part prompt.
#[derive(Debug, Clone, PartialEq)]
pub enum PromptPart {
    Text(String),
    /// Inline binary payload, already base64-encoded.
    InlineData { mime_type: String, data: String },
}

impl PromptPart {
    pub fn text(text: impl Into<String>) -> Self {
        PromptPart::Text(text.into())
    }
}

/// What shape of reply the caller expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseFormat {
    Json,
    PlainText,
}

impl ResponseFormat {
    fn mime_type(self) -> Option<&'static str> {
        match self {
            ResponseFormat::Json => Some("application/json"),
            ResponseFormat::PlainText => None,
        }
    }
}

/// Generative-language capability.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(
        &self,
        parts: &[PromptPart],
        format: ResponseFormat,
    ) -> Result<String, LlmError>;
}

/// Embedding capability. Vectors are only comparable when produced by the
/// same implementation.
#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, LlmError>;
}

// ────────────────────────────────────────────────────────────────────────────
// Wire types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<GeminiContent<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct GeminiContent<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'a str>,
    parts: Vec<GeminiPart<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum GeminiPart<'a> {
    Text {
        text: &'a str,
    },
    #[serde(rename_all = "camelCase")]
    Inline { inline_data: InlineData<'a> },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData<'a> {
    mime_type: &'a str,
    data: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<&'static str>,
}

impl<'a> From<&'a PromptPart> for GeminiPart<'a> {
    fn from(part: &'a PromptPart) -> Self {
        match part {
            PromptPart::Text(text) => GeminiPart::Text { text },
            PromptPart::InlineData { mime_type, data } => GeminiPart::Inline {
                inline_data: InlineData { mime_type, data },
            },
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    pub usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
pub struct Candidate {
    pub content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
pub struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
pub struct ResponsePart {
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageMetadata {
    #[serde(default)]
    pub prompt_token_count: u32,
    #[serde(default)]
    pub candidates_token_count: u32,
}

impl GenerateContentResponse {
    /// Concatenates the text parts of the first candidate.
    pub fn text(&self) -> Option<String> {
        let parts = &self.candidates.first()?.content.as_ref()?.parts;
        let text: String = parts.iter().filter_map(|p| p.text.as_deref()).collect();
        if text.trim().is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

#[derive(Debug, Serialize)]
struct EmbedContentRequest<'a> {
    model: String,
    content: GeminiContent<'a>,
}

#[derive(Debug, Deserialize)]
struct EmbedContentResponse {
    embedding: EmbeddingValues,
}

#[derive(Debug, Deserialize)]
struct EmbeddingValues {
    values: Vec<f32>,
}

#[derive(Debug, Deserialize)]
struct GeminiError {
    error: GeminiErrorBody,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorBody {
    message: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Client
// ────────────────────────────────────────────────────────────────────────────

/// The single Gemini client used by all services.
/// Wraps `generateContent` and `embedContent`. No retries: the evaluation
/// pipeline owns the only fallback policy.
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl GeminiClient {
    pub fn new(api_key: String, base_url: String) -> Result<Self, LlmError> {
        Ok(Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
                .build()?,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Makes a raw `generateContent` call, returning the full response object.
    pub async fn call(
        &self,
        parts: &[PromptPart],
        format: ResponseFormat,
    ) -> Result<GenerateContentResponse, LlmError> {
        let request_body = GenerateContentRequest {
            contents: vec![GeminiContent {
                role: Some("user"),
                parts: parts.iter().map(GeminiPart::from).collect(),
            }],
            generation_config: GenerationConfig {
                temperature: 0.2,
                response_mime_type: format.mime_type(),
            },
        };

        let url = format!("{}/models/{}:generateContent", self.base_url, MODEL);
        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&request_body)
            .send()
            .await?;

        let response = check_status(response).await?;
        let body: GenerateContentResponse = response.json().await?;

        if let Some(usage) = &body.usage_metadata {
            debug!(
                "LLM call succeeded: prompt_tokens={}, candidate_tokens={}",
                usage.prompt_token_count, usage.candidates_token_count
            );
        }

        Ok(body)
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(
        &self,
        parts: &[PromptPart],
        format: ResponseFormat,
    ) -> Result<String, LlmError> {
        self.call(parts, format)
            .await?
            .text()
            .ok_or(LlmError::EmptyContent)
    }
}

#[async_trait]
impl Embedder for GeminiClient {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, LlmError> {
        let request_body = EmbedContentRequest {
            model: format!("models/{EMBEDDING_MODEL}"),
            content: GeminiContent {
                role: None,
                parts: vec![GeminiPart::Text { text }],
            },
        };

        let url = format!("{}/models/{}:embedContent", self.base_url, EMBEDDING_MODEL);
        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&request_body)
            .send()
            .await?;

        let response = check_status(response).await?;
        let body: EmbedContentResponse = response.json().await?;
        if body.embedding.values.is_empty() {
            return Err(LlmError::EmptyContent);
        }

        debug!("Embedded {} chars into {} dims", text.len(), body.embedding.values.len());
        Ok(body.embedding.values)
    }
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, LlmError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    // Try to parse error message
    let message = serde_json::from_str::<GeminiError>(&body)
        .map(|e| e.error.message)
        .unwrap_or(body);

    if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
        tracing::warn!("LLM API returned {}: {}", status, message);
    }

    Err(LlmError::Api {
        status: status.as_u16(),
        message,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> GeminiClient {
        GeminiClient::new("test-key".to_string(), server.uri()).unwrap()
    }

    #[test]
    fn test_inline_part_serializes_camel_case() {
        let part = PromptPart::InlineData {
            mime_type: "application/pdf".to_string(),
            data: "JVBERi0=".to_string(),
        };
        let value = serde_json::to_value(GeminiPart::from(&part)).unwrap();
        assert_eq!(value["inlineData"]["mimeType"], "application/pdf");
        assert_eq!(value["inlineData"]["data"], "JVBERi0=");
    }

    #[test]
    fn test_response_text_joins_parts_of_first_candidate() {
        let body: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [
                {"content": {"parts": [{"text": "{\"match_score\":"}, {"text": " 70}"}]}},
                {"content": {"parts": [{"text": "ignored"}]}}
            ]
        }))
        .unwrap();
        assert_eq!(body.text().as_deref(), Some("{\"match_score\": 70}"));
    }

    #[test]
    fn test_response_text_none_when_blank() {
        let body: GenerateContentResponse =
            serde_json::from_value(json!({"candidates": [{"content": {"parts": [{"text": "  "}]}}]}))
                .unwrap();
        assert!(body.text().is_none());

        let empty: GenerateContentResponse = serde_json::from_value(json!({})).unwrap();
        assert!(empty.text().is_none());
    }

    #[test]
    fn test_upstream_rejection_classification() {
        for status in [401, 403, 429] {
            let err = LlmError::Api {
                status,
                message: String::new(),
            };
            assert!(err.is_upstream_rejection(), "status {status}");
        }
        let err = LlmError::Api {
            status: 500,
            message: String::new(),
        };
        assert!(!err.is_upstream_rejection());
        assert!(!LlmError::EmptyContent.is_upstream_rejection());
    }

    #[tokio::test]
    async fn test_generate_sends_key_and_returns_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/models/gemini-1.5-flash:generateContent"))
            .and(header("x-goog-api-key", "test-key"))
            .and(body_partial_json(json!({
                "contents": [{"role": "user", "parts": [{"text": "hello"}]}]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{"content": {"parts": [{"text": "AI Working"}]}}],
                "usageMetadata": {"promptTokenCount": 3, "candidatesTokenCount": 2}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let text = client_for(&server)
            .generate(&[PromptPart::text("hello")], ResponseFormat::Json)
            .await
            .unwrap();
        assert_eq!(text, "AI Working");
    }

    async fn sent_generation_config(server: &MockServer) -> serde_json::Value {
        let requests = server.received_requests().await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
        body["generationConfig"].clone()
    }

    #[tokio::test]
    async fn test_json_format_requests_json_mime_type() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/models/gemini-1.5-flash:generateContent"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{"content": {"parts": [{"text": "{\"match_score\": 70}"}]}}]
            })))
            .mount(&server)
            .await;

        client_for(&server)
            .generate(&[PromptPart::text("assess")], ResponseFormat::Json)
            .await
            .unwrap();
        let config = sent_generation_config(&server).await;
        assert_eq!(config["responseMimeType"], "application/json");
    }

    #[tokio::test]
    async fn test_plain_text_format_omits_mime_type() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/models/gemini-1.5-flash:generateContent"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{"content": {"parts": [{"text": "AI Working"}]}}]
            })))
            .mount(&server)
            .await;

        let text = client_for(&server)
            .generate(&[PromptPart::text("ping")], ResponseFormat::PlainText)
            .await
            .unwrap();
        assert_eq!(text, "AI Working");
        let config = sent_generation_config(&server).await;
        assert!(config.get("responseMimeType").is_none());
        assert!(config.get("temperature").is_some());
    }

    #[tokio::test]
    async fn test_generate_empty_candidates_is_empty_content() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/models/gemini-1.5-flash:generateContent"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"candidates": []})))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .generate(&[PromptPart::text("hello")], ResponseFormat::Json)
            .await
            .unwrap_err();
        assert!(matches!(err, LlmError::EmptyContent));
    }

    #[tokio::test]
    async fn test_api_error_message_is_parsed_and_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/models/gemini-1.5-flash:generateContent"))
            .respond_with(ResponseTemplate::new(403).set_body_json(json!({
                "error": {"code": 403, "message": "API key not valid"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let err = client_for(&server)
            .generate(&[PromptPart::text("hello")], ResponseFormat::Json)
            .await
            .unwrap_err();
        match err {
            LlmError::Api { status, ref message } => {
                assert_eq!(status, 403);
                assert_eq!(message, "API key not valid");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(err.is_upstream_rejection());
    }

    #[tokio::test]
    async fn test_embed_returns_values() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/models/text-embedding-004:embedContent"))
            .and(body_partial_json(json!({
                "model": "models/text-embedding-004",
                "content": {"parts": [{"text": "Rust engineer"}]}
            })))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"embedding": {"values": [0.1, 0.2, 0.3]}})),
            )
            .mount(&server)
            .await;

        let vector = client_for(&server).embed("Rust engineer").await.unwrap();
        assert_eq!(vector, vec![0.1, 0.2, 0.3]);
    }

    #[tokio::test]
    async fn test_embed_server_error_surfaces_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/models/text-embedding-004:embedContent"))
            .respond_with(ResponseTemplate::new(503).set_body_string("unavailable"))
            .mount(&server)
            .await;

        let err = client_for(&server).embed("text").await.unwrap_err();
        assert!(matches!(err, LlmError::Api { status: 503, .. }));
        assert!(!err.is_upstream_rejection());
    }
}
