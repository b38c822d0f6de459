//! Vector index abstraction for docqa.
//!
//! Provides a trait-based interface for vector index backends. The index is
//! append-only and lives for the lifetime of the process.

mod memory;

pub use memory::MemoryVectorStore;

use crate::chunking::Chunk;
use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A chunk stored in the index together with its embedding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexEntry {
    /// The indexed chunk.
    pub chunk: Chunk,
    /// Embedding vector of the chunk's content.
    pub embedding: Vec<f32>,
    /// Insertion position in the index, starting at 0.
    pub position: usize,
}

/// A search result with score.
#[derive(Debug, Clone)]
pub struct SearchResult {
    /// The matched chunk.
    pub chunk: Chunk,
    /// Similarity score (higher is better).
    pub score: f32,
}

/// Trait for vector index implementations.
///
/// `add` must commit each chunk/vector pair atomically so concurrent readers
/// never see a half-written entry.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Append chunks with their embeddings. Returns the number of entries added.
    ///
    /// Each stored chunk's `chunk_index` is set to its insertion position, so
    /// indices stay unique when several ingestions share one index.
    ///
    /// Fails with `InvariantViolation`, leaving the index unchanged, when the
    /// counts differ or a vector has the wrong dimensionality.
    async fn add(&self, chunks: Vec<Chunk>, embeddings: Vec<Vec<f32>>) -> Result<usize>;

    /// Return up to `k` chunks most similar to `query_embedding`, best first.
    ///
    /// Fails with `EmptyIndex` if nothing has been added yet.
    async fn search(&self, query_embedding: &[f32], k: usize) -> Result<Vec<SearchResult>>;

    /// Number of stored entries.
    async fn len(&self) -> usize;

    /// Whether the index has no entries.
    async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Dimensionality of stored vectors, once known.
    async fn dimensions(&self) -> Option<usize>;
}

/// Compute cosine similarity between two vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product / (norm_a * norm_b)
}
