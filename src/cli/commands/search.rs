//! Search command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::sources::{build_index, collect_sources};
use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::Orchestrator;
use crate::rag::context::source_label;
use anyhow::Result;
use std::path::PathBuf;

/// Run the search command.
pub async fn run_search(
    query: &str,
    files: &[PathBuf],
    videos: &[String],
    limit: usize,
    settings: Settings,
) -> Result<()> {
    preflight::check(Operation::Index { videos: !videos.is_empty() }, &settings)?;

    let sources = collect_sources(files, videos)?;
    let orchestrator = Orchestrator::new(settings)?;
    let report = build_index(&orchestrator, &sources, None).await?;

    let spinner = Output::spinner("Searching...");
    let results = orchestrator
        .search(query, report.store.as_ref(), limit)
        .await;
    spinner.finish_and_clear();
    let results = results?;

    if results.is_empty() {
        Output::warning("No results found matching your query.");
    } else {
        Output::success(&format!("Found {} results", results.len()));
        for result in &results {
            Output::search_result(&source_label(&result.chunk), result.score, &result.chunk.content);
        }
    }

    Ok(())
}
