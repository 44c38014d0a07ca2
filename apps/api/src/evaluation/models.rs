use bytes::Bytes;
use serde::Serialize;

use crate::evaluation::errors::EvaluationError;

/// Upload ceiling for a résumé document.
pub const MAX_DOCUMENT_BYTES: usize = 10 * 1024 * 1024;
/// Media type every accepted document is declared as.
pub const PDF_MIME_TYPE: &str = "application/pdf";

const PDF_MAGIC: &[u8] = b"%PDF-";
/// PDF readers tolerate junk before the header; so do we, up to this offset.
const PDF_HEADER_WINDOW: usize = 1024;

/// A résumé document as uploaded. Read-only for the lifetime of one evaluation.
#[derive(Debug, Clone)]
pub struct Document {
    bytes: Bytes,
}

impl Document {
    /// Validates size and basic PDF structure.
    pub fn new(bytes: impl Into<Bytes>) -> Result<Self, EvaluationError> {
        let bytes = bytes.into();
        if bytes.is_empty() {
            return Err(EvaluationError::Validation(
                "Please upload a PDF resume file.".to_string(),
            ));
        }
        if bytes.len() > MAX_DOCUMENT_BYTES {
            return Err(EvaluationError::Validation(
                "File too large. Maximum size is 10MB.".to_string(),
            ));
        }
        let window = &bytes[..bytes.len().min(PDF_HEADER_WINDOW)];
        if !window.windows(PDF_MAGIC.len()).any(|w| w == PDF_MAGIC) {
            return Err(EvaluationError::Validation(
                "Only PDF files are allowed!".to_string(),
            ));
        }
        Ok(Self { bytes })
    }

    pub fn bytes(&self) -> &Bytes {
        &self.bytes
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }
}

/// Non-empty, trimmed job description text.
#[derive(Debug, Clone, PartialEq)]
pub struct JobDescription(String);

impl JobDescription {
    pub fn new(text: &str) -> Result<Self, EvaluationError> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(EvaluationError::Validation(
                "Please provide a valid job description.".to_string(),
            ));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Plain text pulled out of a document, tagged with the strategy that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedText {
    pub text: String,
    pub strategy: &'static str,
}

impl ExtractedText {
    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }
}

/// Which evidence the generator was given.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EvaluationMode {
    /// Extracted text plus an embedding-based semantic score.
    #[serde(rename = "text+semantic")]
    TextSemantic,
    /// The raw document, sent inline to a multimodal model.
    #[serde(rename = "vision")]
    Vision,
}

impl EvaluationMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            EvaluationMode::TextSemantic => "text+semantic",
            EvaluationMode::Vision => "vision",
        }
    }
}

/// Final evaluation record delivered to the caller.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssessmentResult {
    pub match_score: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub semantic_score: Option<u8>,
    pub missing_keywords: Vec<String>,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub mode: EvaluationMode,
}
