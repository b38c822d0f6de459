//! Ask command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::sources::{build_index, collect_sources};
use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::Orchestrator;
use crate::rag::context::source_label;
use anyhow::Result;
use std::path::PathBuf;

/// Run the ask command.
pub async fn run_ask(
    question: &str,
    files: &[PathBuf],
    videos: &[String],
    k: Option<usize>,
    model: Option<String>,
    mut settings: Settings,
) -> Result<()> {
    if let Some(k) = k {
        settings.retrieval.k = k;
    }
    if let Some(model) = model {
        settings.generation.model = model;
    }

    // Pre-flight checks
    if let Err(e) = preflight::check(Operation::Index { videos: !videos.is_empty() }, &settings) {
        Output::info("Run 'docqa doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    let sources = collect_sources(files, videos)?;
    let orchestrator = Orchestrator::new(settings)?;
    let report = build_index(&orchestrator, &sources, None).await?;

    let spinner = Output::spinner("Thinking...");
    let result = orchestrator.ask(question, report.store.as_ref()).await;
    spinner.finish_and_clear();
    let answer = result?;

    println!("\n{}\n", answer.text);

    if !answer.source_documents.is_empty() {
        Output::header("Sources");
        for (chunk, score) in answer.source_documents.iter().zip(&answer.source_scores) {
            Output::search_result(&source_label(chunk), *score, &chunk.content);
        }
    }

    Ok(())
}
