use std::process::Stdio;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use crate::extraction::ExtractionError;

/// A best-effort decoder for a document's embedded text layer.
#[async_trait]
pub trait TextLayer: Send + Sync {
    fn name(&self) -> &'static str;

    async fn extract(&self, bytes: Bytes) -> Result<String, ExtractionError>;
}

/// Shells out to poppler's `pdftotext`, streaming the document over stdin.
pub struct PdftotextLayer {
    program: String,
}

impl Default for PdftotextLayer {
    fn default() -> Self {
        Self {
            program: "pdftotext".to_string(),
        }
    }
}

#[async_trait]
impl TextLayer for PdftotextLayer {
    fn name(&self) -> &'static str {
        "pdftotext"
    }

    async fn extract(&self, bytes: Bytes) -> Result<String, ExtractionError> {
        let mut child = Command::new(&self.program)
            .args(["-layout", "-", "-"])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| ExtractionError::Unavailable {
                strategy: self.name(),
                message: e.to_string(),
            })?;

        // Feed stdin from a separate task so a full stdout pipe cannot deadlock us.
        let mut stdin = child.stdin.take().ok_or_else(|| ExtractionError::Decoder {
            strategy: "pdftotext",
            message: "stdin was not captured".to_string(),
        })?;
        let writer = tokio::spawn(async move {
            let result = stdin.write_all(&bytes).await;
            drop(stdin);
            result
        });

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| ExtractionError::Decoder {
                strategy: self.name(),
                message: e.to_string(),
            })?;

        // A broken pipe here just means pdftotext stopped reading early; the
        // exit status below is authoritative.
        let _ = writer.await;

        if !output.status.success() {
            return Err(ExtractionError::Decoder {
                strategy: self.name(),
                message: format!("exited with {}", output.status),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// In-process decoder backed by the `pdf-extract` crate.
pub struct PdfExtractLayer;

#[async_trait]
impl TextLayer for PdfExtractLayer {
    fn name(&self) -> &'static str {
        "pdf-extract"
    }

    async fn extract(&self, bytes: Bytes) -> Result<String, ExtractionError> {
        // pdf-extract can panic on malformed input; a panicking blocking task
        // surfaces as a JoinError instead of taking the request down.
        let joined = tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&bytes))
            .await
            .map_err(|e| ExtractionError::Decoder {
                strategy: "pdf-extract",
                message: format!("decoder aborted: {e}"),
            })?;

        joined.map_err(|e| ExtractionError::Decoder {
            strategy: self.name(),
            message: format!("{e:?}"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_pdftotext_binary_is_unavailable() {
        let layer = PdftotextLayer {
            program: "pdftotext-definitely-not-installed".to_string(),
        };
        let err = layer
            .extract(Bytes::from_static(b"%PDF-1.4"))
            .await
            .unwrap_err();
        assert!(matches!(err, ExtractionError::Unavailable { .. }));
    }

    #[tokio::test]
    async fn test_pdf_extract_yields_nothing_usable_for_garbage() {
        let result = PdfExtractLayer
            .extract(Bytes::from_static(b"%PDF-1.4\nthis is not really a pdf"))
            .await;
        assert!(result.map(|t| t.trim().is_empty()).unwrap_or(true));
    }
}
