//! docqa - Document and Video Question Answering
//!
//! Ask natural-language questions about PDFs, text files and YouTube videos,
//! answered by retrieval-augmented generation with source attributions.
//!
//! # Overview
//!
//! docqa allows you to:
//! - Load PDF pages, text files and YouTube transcripts
//! - Split them into overlapping chunks and embed them into an in-memory index
//! - Ask questions answered only from the retrieved chunks
//! - Search the index semantically without generation
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - `config` - Settings and prompt templates
//! - `source` - Source loaders (PDF, text, YouTube transcripts) and their registry
//! - `chunking` - Recursive text splitting
//! - `embedding` - Embedding generation
//! - `vector_store` - Vector index abstraction
//! - `generation` - Text generation
//! - `ingest` - Ingestion pipeline
//! - `rag` - Question answering engine
//! - `orchestrator` - Pipeline coordination
//!
//! # Example
//!
//! ```rust,no_run
//! use docqa::config::Settings;
//! use docqa::orchestrator::Orchestrator;
//! use docqa::source::SourceHandle;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let orchestrator = Orchestrator::new(settings)?;
//!
//!     let sources = [SourceHandle::url("https://youtu.be/dQw4w9WgXcQ")];
//!     let report = orchestrator.ingest(&sources, None).await?;
//!     let answer = orchestrator.ask("What is this video about?", report.store.as_ref()).await?;
//!     println!("{}", answer.format_for_display());
//!
//!     Ok(())
//! }
//! ```

pub mod chunking;
pub mod cli;
pub mod config;
pub mod embedding;
pub mod error;
pub mod generation;
pub mod ingest;
pub mod openai;
pub mod orchestrator;
pub mod rag;
pub mod source;
pub mod vector_store;

#[cfg(test)]
pub(crate) mod testing;

pub use error::{DocQaError, Result};
