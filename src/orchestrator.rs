//! Pipeline orchestrator for docqa.
//!
//! Wires providers, loaders and the splitter from settings, and coordinates
//! ingestion and question answering over one in-memory index.

use crate::chunking::{ChunkingConfig, RecursiveSplitter};
use crate::config::{Prompts, Settings};
use crate::embedding::{Embedder, OpenAIEmbedder};
use crate::error::Result;
use crate::generation::{Generator, OpenAIGenerator};
use crate::ingest::{IngestionPipeline, IngestionReport};
use crate::openai::create_client;
use crate::rag::{Answer, QaEngine, Question};
use crate::source::{LoaderRegistry, SourceHandle};
use crate::vector_store::{SearchResult, VectorStore};
use std::sync::Arc;
use tracing::{info, instrument};

/// The main orchestrator for the docqa pipeline.
pub struct Orchestrator {
    settings: Settings,
    ingestion: IngestionPipeline,
    engine: QaEngine,
}

impl Orchestrator {
    /// Create a new orchestrator backed by the OpenAI providers.
    ///
    /// Fails with `Configuration` on invalid settings or a missing API key.
    pub fn new(settings: Settings) -> Result<Self> {
        settings.validate()?;

        let prompts = Prompts::load(
            settings.prompts.custom_dir.as_deref(),
            Some(&settings.prompts.variables),
        )?;

        // One HTTP client shared by both providers.
        let client = create_client(&settings.openai)?;
        let embedder: Arc<dyn Embedder> =
            Arc::new(OpenAIEmbedder::with_client(client.clone(), &settings.embedding));
        let generator: Arc<dyn Generator> =
            Arc::new(OpenAIGenerator::with_client(client, &settings.generation));

        info!(
            "Using {} for embeddings and {} for answers",
            settings.embedding.model, settings.generation.model
        );

        let registry = Arc::new(LoaderRegistry::with_defaults(&settings.transcript));

        Self::with_components(settings, prompts, registry, embedder, generator)
    }

    /// Create an orchestrator with custom components.
    pub fn with_components(
        settings: Settings,
        prompts: Prompts,
        registry: Arc<LoaderRegistry>,
        embedder: Arc<dyn Embedder>,
        generator: Arc<dyn Generator>,
    ) -> Result<Self> {
        let splitter = Arc::new(RecursiveSplitter::new(ChunkingConfig::try_from(
            &settings.chunking,
        )?));
        let ingestion = IngestionPipeline::new(registry, splitter, embedder.clone());
        let engine =
            QaEngine::new(embedder, generator, settings.retrieval.k).with_prompts(prompts);

        Ok(Self {
            settings,
            ingestion,
            engine,
        })
    }

    /// Get the settings.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Get the QA engine.
    pub fn engine(&self) -> &QaEngine {
        &self.engine
    }

    /// File extensions the loaders accept.
    pub fn supported_extensions(&self) -> Vec<String> {
        self.ingestion.registry().supported_extensions()
    }

    /// Ingest sources into a new index, or append to `existing_store`.
    #[instrument(skip(self, sources, existing_store))]
    pub async fn ingest(
        &self,
        sources: &[SourceHandle],
        existing_store: Option<Arc<dyn VectorStore>>,
    ) -> Result<IngestionReport> {
        self.ingestion.ingest(sources, existing_store).await
    }

    /// Answer a question from `store`.
    pub async fn ask(&self, question: &str, store: &dyn VectorStore) -> Result<Answer> {
        let question = Question::new(question)?;
        self.engine.answer(&question, store).await
    }

    /// Top-`k` chunks for a query, without generation.
    pub async fn search(
        &self,
        query: &str,
        store: &dyn VectorStore,
        k: usize,
    ) -> Result<Vec<SearchResult>> {
        self.engine.retrieve(query, store, k).await
    }
}
