//! Résumé text extraction. Turns uploaded PDF bytes into one plain-text string.

use async_trait::async_trait;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("document could not be parsed as a PDF: {0}")]
    Unreadable(String),

    #[error("document contains no extractable text")]
    NoText,

    #[error("extraction task failed: {0}")]
    Task(String),
}

/// Extracts the text of an uploaded document.
///
/// Carried in the pipeline as `Arc<dyn DocumentExtractor>` so tests can swap it out.
#[async_trait]
pub trait DocumentExtractor: Send + Sync {
    async fn extract(&self, bytes: &[u8]) -> Result<String, ExtractionError>;
}

/// Default extractor backed by `pdf-extract`.
pub struct PdfTextExtractor;

#[async_trait]
impl DocumentExtractor for PdfTextExtractor {
    async fn extract(&self, bytes: &[u8]) -> Result<String, ExtractionError> {
        let owned = bytes.to_vec();
        // PDF parsing is CPU-bound; keep it off the async executor.
        let pages = tokio::task::spawn_blocking(move || {
            pdf_extract::extract_text_from_mem_by_pages(&owned)
        })
        .await
        .map_err(|e| {
            // pdf-extract panics on some malformed inputs instead of returning Err.
            if e.is_panic() {
                ExtractionError::Unreadable("parser panicked on malformed input".to_string())
            } else {
                ExtractionError::Task(e.to_string())
            }
        })?
        .map_err(|e| ExtractionError::Unreadable(e.to_string()))?;

        debug!("extracted {} page(s) from {} bytes", pages.len(), bytes.len());

        let text = join_pages(&pages);
        if text.is_empty() {
            return Err(ExtractionError::NoText);
        }
        Ok(text)
    }
}

/// Concatenates per-page text in document order, one line break between pages.
///
/// Each page is trimmed first; a page with no text contributes an empty line.
/// The joined result is trimmed as a whole.
pub fn join_pages<S: AsRef<str>>(pages: &[S]) -> String {
    pages
        .iter()
        .map(|p| p.as_ref().trim())
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}
