//! Turning command-line arguments into sources and an index.

use crate::cli::Output;
use crate::error::{DocQaError, Result};
use crate::ingest::IngestionReport;
use crate::orchestrator::Orchestrator;
use crate::source::SourceHandle;
use crate::vector_store::VectorStore;
use std::path::PathBuf;
use std::sync::Arc;

/// Read files and wrap video references into source handles, files first.
pub fn collect_sources(files: &[PathBuf], videos: &[String]) -> Result<Vec<SourceHandle>> {
    let mut sources = Vec::with_capacity(files.len() + videos.len());

    for path in files {
        if !path.is_file() {
            return Err(DocQaError::InvalidInput(format!(
                "File not found: {}",
                path.display()
            )));
        }
        sources.push(SourceHandle::from_path(path)?);
    }

    for video in videos {
        let video = video.trim();
        if video.is_empty() {
            return Err(DocQaError::InvalidInput("Empty video reference".to_string()));
        }
        sources.push(SourceHandle::url(normalize_video(video)));
    }

    if sources.is_empty() {
        return Err(DocQaError::InvalidInput(
            "Provide at least one --file or --video source".to_string(),
        ));
    }

    Ok(sources)
}

/// Bare video IDs become watch URLs so the URL dispatch can match them.
fn normalize_video(video: &str) -> String {
    if video.contains("://") || video.contains('/') {
        video.to_string()
    } else {
        format!("https://www.youtube.com/watch?v={}", video)
    }
}

/// Ingest sources with a spinner, printing what was indexed.
pub async fn build_index(
    orchestrator: &Orchestrator,
    sources: &[SourceHandle],
    existing_store: Option<Arc<dyn VectorStore>>,
) -> Result<IngestionReport> {
    let spinner = Output::spinner(&format!("Loading and indexing {} source(s)...", sources.len()));
    let result = orchestrator.ingest(sources, existing_store).await;
    spinner.finish_and_clear();

    let report = result?;
    Output::success(&format!(
        "Indexed {} chunks from {} documents",
        report.chunks_indexed, report.documents_loaded
    ));
    Ok(report)
}
