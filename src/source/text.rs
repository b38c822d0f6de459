//! Plain-text and markdown loader.

use super::{DocumentLoader, Metadata, RawDocument, SourceHandle};
use crate::error::{DocQaError, Result};
use async_trait::async_trait;
use tracing::warn;

/// Loads UTF-8 text files as a single document.
pub struct TextLoader;

impl TextLoader {
    pub fn new() -> Self {
        Self
    }
}

impl Default for TextLoader {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentLoader for TextLoader {
    fn name(&self) -> &'static str {
        "text"
    }

    fn extensions(&self) -> &[&'static str] {
        &["txt", "md", "markdown"]
    }

    async fn load(&self, handle: &SourceHandle) -> Result<Vec<RawDocument>> {
        let SourceHandle::File { name, bytes } = handle else {
            return Err(DocQaError::UnsupportedSource(format!(
                "Text loader expects a file, got {}",
                handle.describe()
            )));
        };

        let content = std::str::from_utf8(bytes).map_err(|e| {
            DocQaError::Processing(format!("{} is not valid UTF-8: {}", name, e))
        })?;

        if content.trim().is_empty() {
            warn!("{} contains no text", name);
            return Ok(Vec::new());
        }

        let mut metadata = Metadata::new();
        metadata.insert("source".to_string(), name.clone());
        metadata.insert("source_file".to_string(), name.clone());

        Ok(vec![RawDocument::new(content, metadata, name.as_str())?])
    }
}
