//! Source loading for docqa.
//!
//! Turns source handles (uploaded files, video URLs) into [`RawDocument`]s.
//! Loaders are picked through an explicitly constructed [`LoaderRegistry`]:
//! files by extension, URLs by pattern.

mod pdf;
mod text;
mod youtube;

pub use pdf::PdfLoader;
pub use text::TextLoader;
pub use youtube::{
    extract_video_id, TranscriptFetcher, TranscriptSegment, YoutubeTranscriptLoader,
    YtDlpTranscriptFetcher,
};

use crate::config::TranscriptSettings;
use crate::error::{DocQaError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// Key/value metadata attached to documents and chunks.
pub type Metadata = BTreeMap<String, String>;

/// One loaded unit of source text (a PDF page, a text file, a transcript).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawDocument {
    /// Text content. Never blank when built through [`RawDocument::new`].
    pub content: String,
    /// Metadata such as page number or source URL.
    pub metadata: Metadata,
    /// Identifier of the source this document came from.
    pub origin: String,
}

impl RawDocument {
    /// Create a document, rejecting blank content.
    pub fn new(content: impl Into<String>, metadata: Metadata, origin: impl Into<String>) -> Result<Self> {
        let content = content.into();
        let origin = origin.into();
        if content.trim().is_empty() {
            return Err(DocQaError::Processing(format!(
                "Document content from {} is empty",
                origin
            )));
        }
        Ok(Self {
            content,
            metadata,
            origin,
        })
    }
}

/// A source to ingest.
#[derive(Debug, Clone)]
pub enum SourceHandle {
    /// File contents plus the file name used for extension dispatch.
    File { name: String, bytes: Vec<u8> },
    /// A URL, e.g. a YouTube video.
    Url(String),
}

impl SourceHandle {
    /// Build a file handle from in-memory bytes.
    pub fn file(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        SourceHandle::File {
            name: name.into(),
            bytes,
        }
    }

    /// Build a URL handle.
    pub fn url(url: impl Into<String>) -> Self {
        SourceHandle::Url(url.into())
    }

    /// Read a file from disk into a handle.
    pub fn from_path(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        let name = path.to_string_lossy().to_string();
        Ok(Self::file(name, bytes))
    }

    /// Human-readable identity for logs and errors.
    pub fn describe(&self) -> &str {
        match self {
            SourceHandle::File { name, .. } => name,
            SourceHandle::Url(url) => url,
        }
    }

    /// Lowercased file extension, for file handles that have one.
    pub fn extension(&self) -> Option<String> {
        match self {
            SourceHandle::File { name, .. } => Path::new(name)
                .extension()
                .and_then(|ext| ext.to_str())
                .map(|ext| ext.to_lowercase()),
            SourceHandle::Url(_) => None,
        }
    }
}

/// Trait for source loaders.
#[async_trait]
pub trait DocumentLoader: Send + Sync {
    /// Loader name for logs.
    fn name(&self) -> &'static str;

    /// File extensions (lowercase, without dot) this loader handles.
    fn extensions(&self) -> &[&'static str] {
        &[]
    }

    /// Check if this loader handles the given URL.
    fn handles_url(&self, _url: &str) -> bool {
        false
    }

    /// Load a source into one or more documents.
    async fn load(&self, handle: &SourceHandle) -> Result<Vec<RawDocument>>;
}

/// Immutable mapping from source type to loader.
///
/// Built once at startup and handed to the ingestion pipeline.
pub struct LoaderRegistry {
    by_extension: HashMap<String, Arc<dyn DocumentLoader>>,
    url_loaders: Vec<Arc<dyn DocumentLoader>>,
}

impl LoaderRegistry {
    /// Start building a registry.
    pub fn builder() -> LoaderRegistryBuilder {
        LoaderRegistryBuilder::default()
    }

    /// Registry with the PDF, plain-text and YouTube transcript loaders.
    pub fn with_defaults(transcript: &TranscriptSettings) -> Self {
        let fetcher = Arc::new(YtDlpTranscriptFetcher::new(&transcript.yt_dlp_path));
        Self::builder()
            .register(Arc::new(PdfLoader::new()))
            .register(Arc::new(TextLoader::new()))
            .register(Arc::new(YoutubeTranscriptLoader::new(
                fetcher,
                transcript.languages.clone(),
            )))
            .build()
    }

    /// Find the loader for a source.
    pub fn resolve(&self, handle: &SourceHandle) -> Result<Arc<dyn DocumentLoader>> {
        let loader = match handle {
            SourceHandle::File { .. } => handle
                .extension()
                .and_then(|ext| self.by_extension.get(&ext).cloned()),
            SourceHandle::Url(url) => self
                .url_loaders
                .iter()
                .find(|loader| loader.handles_url(url))
                .cloned(),
        };

        match loader {
            Some(loader) => {
                debug!("Selected {} for {}", loader.name(), handle.describe());
                Ok(loader)
            }
            None => Err(DocQaError::UnsupportedSource(match handle {
                SourceHandle::File { name, .. } => format!(
                    "No loader available for file type of {} (supported: {})",
                    name,
                    self.supported_extensions().join(", ")
                ),
                SourceHandle::Url(url) => format!("No loader available for URL: {}", url),
            })),
        }
    }

    /// Resolve and run the loader for a source.
    pub async fn load(&self, handle: &SourceHandle) -> Result<Vec<RawDocument>> {
        self.resolve(handle)?.load(handle).await
    }

    /// All registered file extensions, sorted.
    pub fn supported_extensions(&self) -> Vec<String> {
        let mut extensions: Vec<String> = self.by_extension.keys().cloned().collect();
        extensions.sort();
        extensions
    }
}

/// Builder for [`LoaderRegistry`].
#[derive(Default)]
pub struct LoaderRegistryBuilder {
    by_extension: HashMap<String, Arc<dyn DocumentLoader>>,
    url_loaders: Vec<Arc<dyn DocumentLoader>>,
}

impl LoaderRegistryBuilder {
    /// Register a loader under its extensions and as a URL candidate.
    ///
    /// Later registrations win for a shared extension.
    pub fn register(mut self, loader: Arc<dyn DocumentLoader>) -> Self {
        for ext in loader.extensions() {
            self.by_extension
                .insert(ext.trim_start_matches('.').to_lowercase(), loader.clone());
        }
        self.url_loaders.push(loader);
        self
    }

    pub fn build(self) -> LoaderRegistry {
        LoaderRegistry {
            by_extension: self.by_extension,
            url_loaders: self.url_loaders,
        }
    }
}
