//! Text Extraction: turns résumé bytes into plain text.
//!
//! Strategy order: every configured text layer (highest fidelity first), then
//! the lossy printable-bytes fallback. A text layer wins as soon as it yields
//! more than `USABLE_TEXT_MIN_CHARS`; the fallback only needs
//! `FALLBACK_TEXT_MIN_CHARS`.

use bytes::Bytes;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::evaluation::models::{Document, ExtractedText};

pub mod layers;

pub use layers::{PdfExtractLayer, PdftotextLayer, TextLayer};

/// Text must be strictly longer than this to be used for primary analysis.
pub const USABLE_TEXT_MIN_CHARS: usize = 100;
/// Below this the lossy fallback gives up.
pub const FALLBACK_TEXT_MIN_CHARS: usize = 50;

pub const FALLBACK_STRATEGY: &str = "printable-bytes";

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("{strategy} is not available: {message}")]
    Unavailable {
        strategy: &'static str,
        message: String,
    },

    #[error("{strategy} failed: {message}")]
    Decoder {
        strategy: &'static str,
        message: String,
    },

    #[error("Unable to extract readable text from PDF ({chars} usable characters)")]
    Unreadable { chars: usize },
}

/// Ordered chain of extraction strategies.
pub struct TextExtractor {
    layers: Vec<Box<dyn TextLayer>>,
}

impl Default for TextExtractor {
    /// poppler's `pdftotext` first, then the in-process `pdf-extract` decoder.
    fn default() -> Self {
        Self::with_layers(vec![
            Box::new(PdftotextLayer::default()),
            Box::new(PdfExtractLayer),
        ])
    }
}

impl TextExtractor {
    pub fn with_layers(layers: Vec<Box<dyn TextLayer>>) -> Self {
        Self { layers }
    }

    pub async fn extract(&self, document: &Document) -> Result<ExtractedText, ExtractionError> {
        for layer in &self.layers {
            match layer.extract(document.bytes().clone()).await {
                Ok(text) => {
                    let text = text.trim();
                    let chars = text.chars().count();
                    if chars > USABLE_TEXT_MIN_CHARS {
                        info!("Extracted {} characters using {}", chars, layer.name());
                        return Ok(ExtractedText {
                            text: text.to_string(),
                            strategy: layer.name(),
                        });
                    }
                    debug!("{} produced only {} characters", layer.name(), chars);
                }
                Err(e) => warn!("Text layer skipped: {e}"),
            }
        }

        let text = printable_text(document.bytes());
        let chars = text.chars().count();
        if chars < FALLBACK_TEXT_MIN_CHARS {
            return Err(ExtractionError::Unreadable { chars });
        }

        info!("Extracted {} characters using {}", chars, FALLBACK_STRATEGY);
        Ok(ExtractedText {
            text,
            strategy: FALLBACK_STRATEGY,
        })
    }
}

/// Lossy last resort: keep printable ASCII and whitespace, collapse runs of
/// whitespace into single spaces.
pub fn printable_text(bytes: &Bytes) -> String {
    let cleaned: String = bytes
        .iter()
        .map(|&b| match b {
            0x20..=0x7E | b'\n' | b'\r' | b'\t' => b as char,
            _ => ' ',
        })
        .collect();
    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}
