//! In-memory vector store implementation.

use super::{cosine_similarity, IndexEntry, SearchResult, VectorStore};
use crate::chunking::Chunk;
use crate::error::{DocQaError, Result};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, instrument};

#[derive(Default)]
struct Entries {
    items: Vec<Arc<IndexEntry>>,
    dimensions: Option<usize>,
}

/// In-memory, append-only vector store with exact cosine search.
///
/// Writers take the lock once per `add` and append a fully built batch, so a
/// concurrent search sees either none or all of it.
pub struct MemoryVectorStore {
    entries: RwLock<Entries>,
}

impl MemoryVectorStore {
    /// Create a store whose dimensionality is fixed by the first `add`.
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(Entries::default()),
        }
    }

    /// Create a store that only accepts vectors of the given length.
    pub fn with_dimensions(dimensions: usize) -> Self {
        Self {
            entries: RwLock::new(Entries {
                items: Vec::new(),
                dimensions: Some(dimensions),
            }),
        }
    }
}

impl Default for MemoryVectorStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VectorStore for MemoryVectorStore {
    #[instrument(skip(self, chunks, embeddings), fields(count = chunks.len()))]
    async fn add(&self, chunks: Vec<Chunk>, embeddings: Vec<Vec<f32>>) -> Result<usize> {
        if chunks.len() != embeddings.len() {
            return Err(DocQaError::InvariantViolation(format!(
                "{} chunks but {} embeddings",
                chunks.len(),
                embeddings.len()
            )));
        }

        let mut entries = self.entries.write().await;

        let expected = entries
            .dimensions
            .or_else(|| embeddings.first().map(Vec::len));
        if let Some(expected) = expected {
            if expected == 0 {
                return Err(DocQaError::InvariantViolation(
                    "embeddings must not be empty".to_string(),
                ));
            }
            if let Some(bad) = embeddings.iter().find(|e| e.len() != expected) {
                return Err(DocQaError::InvariantViolation(format!(
                    "embedding has {} dimensions, index expects {}",
                    bad.len(),
                    expected
                )));
            }
        }

        // Build the whole batch before touching shared state.
        let start = entries.items.len();
        let batch: Vec<Arc<IndexEntry>> = chunks
            .into_iter()
            .zip(embeddings)
            .enumerate()
            .map(|(offset, (mut chunk, embedding))| {
                chunk.chunk_index = start + offset;
                Arc::new(IndexEntry {
                    chunk,
                    embedding,
                    position: start + offset,
                })
            })
            .collect();

        let added = batch.len();
        if added > 0 {
            entries.dimensions = expected;
        }
        entries.items.extend(batch);

        debug!("Added {} entries ({} total)", added, entries.items.len());
        Ok(added)
    }

    #[instrument(skip(self, query_embedding), fields(k = k))]
    async fn search(&self, query_embedding: &[f32], k: usize) -> Result<Vec<SearchResult>> {
        // Score against a snapshot so writers are not blocked for the whole scan.
        let snapshot: Vec<Arc<IndexEntry>> = {
            let entries = self.entries.read().await;
            if entries.items.is_empty() {
                return Err(DocQaError::EmptyIndex);
            }
            if let Some(dimensions) = entries.dimensions {
                if query_embedding.len() != dimensions {
                    return Err(DocQaError::InvariantViolation(format!(
                        "query embedding has {} dimensions, index expects {}",
                        query_embedding.len(),
                        dimensions
                    )));
                }
            }
            entries.items.clone()
        };

        if k == 0 {
            return Ok(Vec::new());
        }

        let mut scored: Vec<(f32, &IndexEntry)> = snapshot
            .iter()
            .map(|entry| (cosine_similarity(query_embedding, &entry.embedding), entry.as_ref()))
            .collect();

        // Highest score first; equal scores keep insertion order.
        scored.sort_by(|a, b| b.0.total_cmp(&a.0).then(a.1.position.cmp(&b.1.position)));
        scored.truncate(k);

        Ok(scored
            .into_iter()
            .map(|(score, entry)| SearchResult {
                chunk: entry.chunk.clone(),
                score,
            })
            .collect())
    }

    async fn len(&self) -> usize {
        self.entries.read().await.items.len()
    }

    async fn dimensions(&self) -> Option<usize> {
        self.entries.read().await.dimensions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::Metadata;

    fn chunk(content: &str, index: usize) -> Chunk {
        Chunk {
            content: content.to_string(),
            metadata: Metadata::new(),
            chunk_index: index,
            origin: "test".to_string(),
        }
    }

    #[tokio::test]
    async fn test_memory_vector_store() {
        let store = MemoryVectorStore::new();

        let added = store
            .add(
                vec![chunk("Hello world", 0), chunk("Goodbye world", 1)],
                vec![vec![1.0, 0.0, 0.0], vec![0.0, 1.0, 0.0]],
            )
            .await
            .unwrap();
        assert_eq!(added, 2);
        assert_eq!(store.len().await, 2);
        assert_eq!(store.dimensions().await, Some(3));

        let results = store.search(&[1.0, 0.0, 0.0], 10).await.unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].chunk.content, "Hello world");
        assert!(results[0].score > results[1].score);
    }

    #[tokio::test]
    async fn test_search_returns_exactly_k() {
        let store = MemoryVectorStore::new();
        store
            .add(
                vec![chunk("a", 0), chunk("b", 1), chunk("c", 2), chunk("d", 3)],
                vec![
                    vec![1.0, 0.0],
                    vec![0.9, 0.1],
                    vec![0.5, 0.5],
                    vec![0.0, 1.0],
                ],
            )
            .await
            .unwrap();

        let results = store.search(&[1.0, 0.0], 2).await.unwrap();
        let contents: Vec<_> = results.iter().map(|r| r.chunk.content.as_str()).collect();
        assert_eq!(contents, vec!["a", "b"]);

        let results = store.search(&[1.0, 0.0], 0).await.unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_search_with_k_above_count_returns_all() {
        let store = MemoryVectorStore::new();
        store
            .add(vec![chunk("only", 0)], vec![vec![0.3, 0.4]])
            .await
            .unwrap();

        let results = store.search(&[1.0, 0.0], 10).await.unwrap();
        assert_eq!(results.len(), 1);
    }

    #[tokio::test]
    async fn test_search_before_add_is_empty_index() {
        let store = MemoryVectorStore::new();
        let err = store.search(&[1.0, 0.0], 3).await.unwrap_err();
        assert!(matches!(err, DocQaError::EmptyIndex));
    }

    #[tokio::test]
    async fn test_ties_break_by_insertion_order() {
        let store = MemoryVectorStore::new();
        store
            .add(
                vec![chunk("first", 0), chunk("second", 1), chunk("third", 2)],
                vec![vec![0.0, 1.0], vec![1.0, 0.0], vec![1.0, 0.0]],
            )
            .await
            .unwrap();
        store
            .add(vec![chunk("fourth", 3)], vec![vec![2.0, 0.0]])
            .await
            .unwrap();

        let results = store.search(&[1.0, 0.0], 3).await.unwrap();
        let contents: Vec<_> = results.iter().map(|r| r.chunk.content.as_str()).collect();
        assert_eq!(contents, vec!["second", "third", "fourth"]);
    }

    #[tokio::test]
    async fn test_mismatched_counts_leave_index_unchanged() {
        let store = MemoryVectorStore::new();
        store
            .add(vec![chunk("kept", 0)], vec![vec![1.0, 0.0]])
            .await
            .unwrap();

        let err = store
            .add(vec![chunk("a", 1), chunk("b", 2)], vec![vec![1.0, 0.0]])
            .await
            .unwrap_err();
        assert!(matches!(err, DocQaError::InvariantViolation(_)));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_dimension_mismatch_rejected() {
        let store = MemoryVectorStore::with_dimensions(2);
        let err = store
            .add(vec![chunk("a", 0)], vec![vec![1.0, 0.0, 0.0]])
            .await
            .unwrap_err();
        assert!(matches!(err, DocQaError::InvariantViolation(_)));
        assert!(store.is_empty().await);

        store
            .add(vec![chunk("a", 0)], vec![vec![1.0, 0.0]])
            .await
            .unwrap();
        let err = store.search(&[1.0, 0.0, 0.0], 1).await.unwrap_err();
        assert!(matches!(err, DocQaError::InvariantViolation(_)));
    }

    #[tokio::test]
    async fn test_add_is_append_only() {
        let store = MemoryVectorStore::new();
        for _ in 0..2 {
            store
                .add(vec![chunk("same", 0)], vec![vec![1.0, 1.0]])
                .await
                .unwrap();
        }
        assert_eq!(store.len().await, 2);
    }

    #[tokio::test]
    async fn test_concurrent_adds_and_searches() {
        let store = Arc::new(MemoryVectorStore::new());
        store
            .add(vec![chunk("seed", 0)], vec![vec![1.0, 0.0]])
            .await
            .unwrap();

        let mut handles = Vec::new();
        for i in 0..8 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store
                    .add(
                        vec![chunk("x", i * 2 + 1), chunk("y", i * 2 + 2)],
                        vec![vec![0.5, 0.5], vec![0.0, 1.0]],
                    )
                    .await
                    .unwrap();
                let results = store.search(&[1.0, 0.0], 100).await.unwrap();
                // Batches land whole: seed plus an even number of added entries.
                assert_eq!(results.len() % 2, 1);
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(store.len().await, 17);

        let results = store.search(&[1.0, 0.0], 100).await.unwrap();
        let mut indices: Vec<usize> = results.iter().map(|r| r.chunk.chunk_index).collect();
        indices.sort_unstable();
        assert_eq!(indices, (0..17).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn test_add_numbers_chunks_by_position() {
        let store = MemoryVectorStore::new();
        store
            .add(vec![chunk("a", 0), chunk("b", 1)], vec![vec![1.0, 0.0], vec![0.0, 1.0]])
            .await
            .unwrap();
        store
            .add(vec![chunk("c", 0)], vec![vec![1.0, 1.0]])
            .await
            .unwrap();

        let results = store.search(&[1.0, 1.0], 1).await.unwrap();
        assert_eq!(results[0].chunk.content, "c");
        assert_eq!(results[0].chunk.chunk_index, 2);
    }
}
