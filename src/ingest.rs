//! Ingestion pipeline: sources -> documents -> chunks -> embeddings -> index.

use crate::chunking::TextSplitter;
use crate::embedding::Embedder;
use crate::error::{DocQaError, Result};
use crate::source::{LoaderRegistry, SourceHandle};
use crate::vector_store::{MemoryVectorStore, VectorStore};
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Outcome of one ingestion call.
pub struct IngestionReport {
    /// The index that now holds the new chunks.
    pub store: Arc<dyn VectorStore>,
    /// Number of documents produced by the loaders.
    pub documents_loaded: usize,
    /// Number of chunks added to the index by this call.
    pub chunks_indexed: usize,
}

/// Turns raw sources into a queryable vector index.
pub struct IngestionPipeline {
    registry: Arc<LoaderRegistry>,
    splitter: Arc<dyn TextSplitter>,
    embedder: Arc<dyn Embedder>,
}

impl IngestionPipeline {
    pub fn new(
        registry: Arc<LoaderRegistry>,
        splitter: Arc<dyn TextSplitter>,
        embedder: Arc<dyn Embedder>,
    ) -> Self {
        Self {
            registry,
            splitter,
            embedder,
        }
    }

    pub fn registry(&self) -> &LoaderRegistry {
        &self.registry
    }

    /// Load, chunk, embed and index `sources`.
    ///
    /// With `existing_store`, new entries are appended and chunk indices
    /// continue from the store's size at commit time, so concurrent ingestions
    /// into one store never reuse an index. Any failure before the final `add`
    /// leaves the store untouched.
    #[instrument(skip(self, sources, existing_store), fields(sources = sources.len()))]
    pub async fn ingest(
        &self,
        sources: &[SourceHandle],
        existing_store: Option<Arc<dyn VectorStore>>,
    ) -> Result<IngestionReport> {
        // Resolve every loader up front so an unsupported source fails before any I/O.
        let loaders = sources
            .iter()
            .map(|source| self.registry.resolve(source))
            .collect::<Result<Vec<_>>>()?;

        let mut documents = Vec::new();
        for (source, loader) in sources.iter().zip(loaders) {
            info!("Loading {} with {} loader", source.describe(), loader.name());
            let loaded = loader.load(source).await?;
            debug!("{} produced {} documents", source.describe(), loaded.len());
            documents.extend(loaded);
        }

        if documents.is_empty() {
            return Err(DocQaError::Processing(
                "No documents were loaded from the given sources".to_string(),
            ));
        }

        let store: Arc<dyn VectorStore> = match existing_store {
            Some(store) => store,
            None => Arc::new(MemoryVectorStore::new()),
        };
        let first_index = store.len().await;

        let chunks = self.splitter.split(&documents, first_index)?;
        if chunks.is_empty() {
            return Err(DocQaError::Processing(
                "Chunking produced no content".to_string(),
            ));
        }
        info!(
            "Split {} documents into {} chunks",
            documents.len(),
            chunks.len()
        );

        let texts: Vec<String> = chunks.iter().map(|c| c.content.clone()).collect();
        let embeddings = self.embedder.embed_batch(&texts).await.map_err(|e| match e {
            DocQaError::Embedding(_) => e,
            other => DocQaError::Embedding(other.to_string()),
        })?;

        let chunks_indexed = store.add(chunks, embeddings).await?;
        info!("Indexed {} chunks ({} total)", chunks_indexed, store.len().await);

        Ok(IngestionReport {
            store,
            documents_loaded: documents.len(),
            chunks_indexed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunking::{ChunkingConfig, RecursiveSplitter};
    use crate::source::{PdfLoader, YoutubeTranscriptLoader};
    use crate::testing::{pdf_with_pages, FakeEmbedder, FakeTranscriptFetcher, StaticLoader};

    fn pipeline_with(registry: LoaderRegistry, embedder: Arc<FakeEmbedder>) -> IngestionPipeline {
        let splitter = RecursiveSplitter::new(ChunkingConfig::new(100, 20).unwrap());
        IngestionPipeline::new(Arc::new(registry), Arc::new(splitter), embedder)
    }

    fn full_registry() -> LoaderRegistry {
        let fetcher = Arc::new(FakeTranscriptFetcher::new(vec![
            "Welcome to the show.",
            "Today we talk about rockets.",
        ]));
        LoaderRegistry::builder()
            .register(Arc::new(PdfLoader::new()))
            .register(Arc::new(YoutubeTranscriptLoader::new(
                fetcher,
                vec!["en".to_string()],
            )))
            .build()
    }

    #[tokio::test]
    async fn test_no_sources_is_processing_error() {
        let embedder = Arc::new(FakeEmbedder::new());
        let pipeline = pipeline_with(full_registry(), embedder.clone());

        let err = pipeline.ingest(&[], None).await.err().unwrap();
        assert!(matches!(err, DocQaError::Processing(_)));
        assert_eq!(embedder.calls(), 0);
    }

    #[tokio::test]
    async fn test_unsupported_source_stops_before_embedding() {
        let embedder = Arc::new(FakeEmbedder::new());
        let pipeline = pipeline_with(full_registry(), embedder.clone());

        let sources = vec![
            SourceHandle::file("notes.pdf", pdf_with_pages(&["Some text"])),
            SourceHandle::file("sheet.xlsx", vec![1, 2, 3]),
        ];
        let err = pipeline.ingest(&sources, None).await.err().unwrap();
        assert!(matches!(err, DocQaError::UnsupportedSource(_)));
        assert_eq!(embedder.calls(), 0);
    }

    #[tokio::test]
    async fn test_loader_yielding_nothing_is_processing_error() {
        let registry = LoaderRegistry::builder()
            .register(Arc::new(StaticLoader::new("dat", vec![])))
            .build();
        let pipeline = pipeline_with(registry, Arc::new(FakeEmbedder::new()));

        let err = pipeline
            .ingest(&[SourceHandle::file("empty.dat", Vec::new())], None)
            .await
            .err()
            .unwrap();
        assert!(matches!(err, DocQaError::Processing(_)));
    }

    #[tokio::test]
    async fn test_indices_start_at_zero_across_sources() {
        let registry = LoaderRegistry::builder()
            .register(Arc::new(StaticLoader::new(
                "dat",
                vec!["First page text.", "Second page text."],
            )))
            .build();
        let pipeline = pipeline_with(registry, Arc::new(FakeEmbedder::new()));

        let report = pipeline
            .ingest(
                &[
                    SourceHandle::file("a.dat", Vec::new()),
                    SourceHandle::file("b.dat", Vec::new()),
                ],
                None,
            )
            .await
            .unwrap();

        assert_eq!(report.documents_loaded, 4);
        assert_eq!(report.chunks_indexed, 4);

        let results = report
            .store
            .search(&FakeEmbedder::vectorize("page text"), 10)
            .await
            .unwrap();
        let mut indices: Vec<usize> = results.iter().map(|r| r.chunk.chunk_index).collect();
        indices.sort_unstable();
        assert_eq!(indices, vec![0, 1, 2, 3]);
    }

    #[tokio::test]
    async fn test_embedding_failure_leaves_existing_store_untouched() {
        let registry = LoaderRegistry::builder()
            .register(Arc::new(StaticLoader::new("dat", vec!["Kept content."])))
            .build();
        let good = pipeline_with(registry, Arc::new(FakeEmbedder::new()));
        let report = good
            .ingest(&[SourceHandle::file("a.dat", Vec::new())], None)
            .await
            .unwrap();
        assert_eq!(report.store.len().await, 1);

        let registry = LoaderRegistry::builder()
            .register(Arc::new(StaticLoader::new("dat", vec!["New content."])))
            .build();
        let failing = pipeline_with(registry, Arc::new(FakeEmbedder::failing()));
        let err = failing
            .ingest(
                &[SourceHandle::file("b.dat", Vec::new())],
                Some(report.store.clone()),
            )
            .await
            .err()
            .unwrap();

        assert!(matches!(err, DocQaError::Embedding(_)));
        assert_eq!(report.store.len().await, 1);
    }

    #[tokio::test]
    async fn test_embedding_count_mismatch_is_invariant_violation() {
        let registry = LoaderRegistry::builder()
            .register(Arc::new(StaticLoader::new("dat", vec!["One.", "Two."])))
            .build();
        let pipeline = pipeline_with(registry, Arc::new(FakeEmbedder::dropping_last()));

        let store: Arc<dyn VectorStore> = Arc::new(MemoryVectorStore::new());
        let err = pipeline
            .ingest(&[SourceHandle::file("a.dat", Vec::new())], Some(store.clone()))
            .await
            .err()
            .unwrap();

        assert!(matches!(err, DocQaError::InvariantViolation(_)));
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_incremental_ingestion_continues_chunk_indices() {
        let pipeline = pipeline_with(full_registry(), Arc::new(FakeEmbedder::new()));

        let first = pipeline
            .ingest(
                &[SourceHandle::url("https://www.youtube.com/watch?v=dQw4w9WgXcQ")],
                None,
            )
            .await
            .unwrap();
        let video_chunks = first.chunks_indexed;
        assert!(video_chunks > 0);

        let second = pipeline
            .ingest(
                &[SourceHandle::file(
                    "animals.pdf",
                    pdf_with_pages(&["Alpha the cat", "Beta the dog"]),
                )],
                Some(first.store.clone()),
            )
            .await
            .unwrap();

        assert!(Arc::ptr_eq(&first.store, &second.store));
        assert_eq!(second.store.len().await, video_chunks + second.chunks_indexed);

        let results = second
            .store
            .search(&FakeEmbedder::vectorize("anything"), 100)
            .await
            .unwrap();
        let mut indices: Vec<usize> = results.iter().map(|r| r.chunk.chunk_index).collect();
        indices.sort_unstable();
        let expected: Vec<usize> = (0..second.store.len().await).collect();
        assert_eq!(indices, expected);

        let pdf_min = results
            .iter()
            .filter(|r| r.chunk.origin == "animals.pdf")
            .map(|r| r.chunk.chunk_index)
            .min()
            .unwrap();
        assert_eq!(pdf_min, video_chunks);
    }

    #[tokio::test]
    async fn test_concurrent_ingestions_get_distinct_indices() {
        let registry = Arc::new(
            LoaderRegistry::builder()
                .register(Arc::new(StaticLoader::new(
                    "dat",
                    vec!["Shared page one.", "Shared page two.", "Shared page three."],
                )))
                .build(),
        );
        let splitter = Arc::new(RecursiveSplitter::new(ChunkingConfig::new(100, 20).unwrap()));
        let first = IngestionPipeline::new(
            registry.clone(),
            splitter.clone(),
            Arc::new(FakeEmbedder::new()),
        );
        let second = IngestionPipeline::new(registry, splitter, Arc::new(FakeEmbedder::new()));

        let store: Arc<dyn VectorStore> = Arc::new(MemoryVectorStore::new());
        let a = [SourceHandle::file("a.dat", Vec::new())];
        let b = [SourceHandle::file("b.dat", Vec::new())];
        let (left, right) = tokio::join!(
            first.ingest(&a, Some(store.clone())),
            second.ingest(&b, Some(store.clone())),
        );
        assert_eq!(left.unwrap().chunks_indexed, 3);
        assert_eq!(right.unwrap().chunks_indexed, 3);

        let results = store
            .search(&FakeEmbedder::vectorize("shared page"), 10)
            .await
            .unwrap();
        let mut indices: Vec<usize> = results.iter().map(|r| r.chunk.chunk_index).collect();
        indices.sort_unstable();
        assert_eq!(indices, vec![0, 1, 2, 3, 4, 5]);
    }
}
