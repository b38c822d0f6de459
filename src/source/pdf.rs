//! PDF loader: one document per page.

use super::{DocumentLoader, Metadata, RawDocument, SourceHandle};
use crate::error::{DocQaError, Result};
use async_trait::async_trait;
use tracing::{info, instrument, warn};

/// Loads PDF files page by page.
pub struct PdfLoader;

impl PdfLoader {
    pub fn new() -> Self {
        Self
    }

    /// Extract text per page. Blank pages and pages whose text cannot be
    /// decoded are skipped.
    fn extract_pages(name: &str, bytes: &[u8]) -> Result<Vec<RawDocument>> {
        let document = lopdf::Document::load_mem(bytes)
            .map_err(|e| DocQaError::Processing(format!("Failed to load PDF {}: {}", name, e)))?;

        if document.is_encrypted() {
            return Err(DocQaError::Processing(format!(
                "PDF {} is encrypted and cannot be read",
                name
            )));
        }

        let pages = document.get_pages();
        let total_pages = pages.len();
        let mut documents = Vec::with_capacity(total_pages);

        for page_number in pages.keys() {
            let text = match document.extract_text(&[*page_number]) {
                Ok(text) => text,
                Err(e) => {
                    warn!("Skipping page {} of {}: {}", page_number, name, e);
                    continue;
                }
            };

            if text.trim().is_empty() {
                warn!("Skipping page {} of {}: no text", page_number, name);
                continue;
            }

            let mut metadata = Metadata::new();
            metadata.insert("source".to_string(), name.to_string());
            metadata.insert("source_file".to_string(), name.to_string());
            metadata.insert("page_number".to_string(), page_number.to_string());
            metadata.insert("total_pages".to_string(), total_pages.to_string());

            documents.push(RawDocument::new(text, metadata, name)?);
        }

        Ok(documents)
    }
}

impl Default for PdfLoader {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentLoader for PdfLoader {
    fn name(&self) -> &'static str {
        "pdf"
    }

    fn extensions(&self) -> &[&'static str] {
        &["pdf"]
    }

    #[instrument(skip(self, handle), fields(source = %handle.describe()))]
    async fn load(&self, handle: &SourceHandle) -> Result<Vec<RawDocument>> {
        let (name, bytes) = match handle {
            SourceHandle::File { name, bytes } => (name.clone(), bytes.clone()),
            SourceHandle::Url(url) => {
                return Err(DocQaError::UnsupportedSource(format!(
                    "PDF loader expects a file, got URL {}",
                    url
                )))
            }
        };

        // Text extraction is CPU-bound.
        let documents = tokio::task::spawn_blocking(move || Self::extract_pages(&name, &bytes))
            .await
            .map_err(|e| DocQaError::Processing(format!("PDF extraction task failed: {}", e)))??;

        info!("Loaded {} pages from PDF", documents.len());
        Ok(documents)
    }
}
