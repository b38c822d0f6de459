//! RAG response generation.

use super::context::{format_context_for_prompt, source_label};
use super::Question;
use crate::chunking::Chunk;
use crate::config::Prompts;
use crate::embedding::Embedder;
use crate::error::{DocQaError, Result};
use crate::generation::Generator;
use crate::vector_store::{SearchResult, VectorStore};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Question-answering engine over a vector index.
pub struct QaEngine {
    embedder: Arc<dyn Embedder>,
    generator: Arc<dyn Generator>,
    prompts: Prompts,
    retrieval_k: usize,
}

impl QaEngine {
    /// Create a new QA engine retrieving `retrieval_k` chunks per question.
    pub fn new(
        embedder: Arc<dyn Embedder>,
        generator: Arc<dyn Generator>,
        retrieval_k: usize,
    ) -> Self {
        Self {
            embedder,
            generator,
            prompts: Prompts::default(),
            retrieval_k,
        }
    }

    /// Set custom prompts (with user-defined variables).
    pub fn with_prompts(mut self, prompts: Prompts) -> Self {
        self.prompts = prompts;
        self
    }

    pub fn retrieval_k(&self) -> usize {
        self.retrieval_k
    }

    /// Embed a query and return the `k` closest chunks, without generation.
    #[instrument(skip(self, store))]
    pub async fn retrieve(
        &self,
        query: &str,
        store: &dyn VectorStore,
        k: usize,
    ) -> Result<Vec<SearchResult>> {
        let query_embedding = self.embedder.embed(query).await?;
        store.search(&query_embedding, k).await
    }

    /// Answer a question from the chunks in `store`.
    ///
    /// Embedding and generation failures are reported as `Generation`;
    /// an empty index fails with `EmptyIndex` before the generator is called.
    #[instrument(skip(self, question, store), fields(question = %question.text()))]
    pub async fn answer(&self, question: &Question, store: &dyn VectorStore) -> Result<Answer> {
        info!("Processing question: {}", question.text());

        let query_embedding = self.embedder.embed(question.text()).await.map_err(|e| {
            DocQaError::Generation(format!("Failed to embed question: {}", e))
        })?;

        let results = store.search(&query_embedding, self.retrieval_k).await?;
        debug!("Retrieved {} chunks", results.len());

        let context = format_context_for_prompt(&results);
        let prompt = self.prompts.render_qa(&context, question.text());

        let text = self
            .generator
            .generate(&prompt)
            .await
            .map_err(|e| match e {
                DocQaError::Generation(_) => e,
                other => DocQaError::Generation(other.to_string()),
            })?;

        let (source_documents, source_scores): (Vec<Chunk>, Vec<f32>) = results
            .into_iter()
            .map(|result| (result.chunk, result.score))
            .unzip();

        Ok(Answer {
            text,
            question: question.text().to_string(),
            source_documents,
            source_scores,
            timestamp: Utc::now(),
            confidence: None,
        })
    }

    /// Answer a question given as plain text and return only the answer text.
    pub async fn ask_text(&self, question: &str, store: &dyn VectorStore) -> Result<String> {
        let question = Question::new(question)?;
        Ok(self.answer(&question, store).await?.text)
    }
}

/// An answer with the chunks it was generated from.
#[derive(Debug, Clone)]
pub struct Answer {
    /// The generated answer.
    pub text: String,
    /// The question this answers.
    pub question: String,
    /// Retrieved chunks, most relevant first.
    pub source_documents: Vec<Chunk>,
    /// Similarity score of each source chunk.
    pub source_scores: Vec<f32>,
    pub timestamp: DateTime<Utc>,
    pub confidence: Option<f32>,
}

impl Answer {
    /// Format the answer for display.
    pub fn format_for_display(&self) -> String {
        let mut output = self.text.clone();

        if !self.source_documents.is_empty() {
            output.push_str("\n\n--- Sources ---\n");
            for (chunk, score) in self.source_documents.iter().zip(&self.source_scores) {
                output.push_str(&format!("\n{} (score: {:.2})", source_label(chunk), score));
            }
        }

        output
    }
}
