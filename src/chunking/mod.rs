//! Text chunking: splitting loaded documents into overlapping, bounded segments.

mod recursive;

pub use recursive::RecursiveSplitter;

use crate::config::ChunkingSettings;
use crate::error::{DocQaError, Result};
use crate::source::{Metadata, RawDocument};
use serde::{Deserialize, Serialize};

/// A bounded slice of a [`RawDocument`], the unit of retrieval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    /// Text content of this chunk.
    pub content: String,
    /// Copy of the parent document's metadata.
    pub metadata: Metadata,
    /// Position of this chunk in the ingestion run, counted across all sources.
    pub chunk_index: usize,
    /// Identifier of the source the parent document came from.
    pub origin: String,
}

impl Chunk {
    /// Page number, when the chunk came from a paged document.
    pub fn page_number(&self) -> Option<&str> {
        self.metadata.get("page_number").map(String::as_str)
    }
}

/// Size limits for chunking, in characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkingConfig {
    pub chunk_size: usize,
    pub chunk_overlap: usize,
}

impl ChunkingConfig {
    /// Create a config, requiring `0 <= chunk_overlap < chunk_size`.
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(DocQaError::Configuration(
                "chunk_size must be greater than 0".to_string(),
            ));
        }
        if chunk_overlap >= chunk_size {
            return Err(DocQaError::Configuration(format!(
                "chunk_overlap ({}) must be smaller than chunk_size ({})",
                chunk_overlap, chunk_size
            )));
        }
        Ok(Self {
            chunk_size,
            chunk_overlap,
        })
    }
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            chunk_overlap: 200,
        }
    }
}

impl TryFrom<&ChunkingSettings> for ChunkingConfig {
    type Error = DocQaError;

    fn try_from(settings: &ChunkingSettings) -> Result<Self> {
        Self::new(settings.chunk_size, settings.chunk_overlap)
    }
}

/// Trait for document splitters.
pub trait TextSplitter: Send + Sync {
    /// Split documents into chunks.
    ///
    /// `chunk_index` values start at `first_index` and increase by one per
    /// chunk across the whole batch, in document order.
    fn split(&self, documents: &[RawDocument], first_index: usize) -> Result<Vec<Chunk>>;
}
