//! Context formatting for RAG prompts and output.

use crate::chunking::Chunk;
use crate::vector_store::SearchResult;

/// Join retrieved chunk texts, in search-result order, for the prompt.
pub fn format_context_for_prompt(results: &[SearchResult]) -> String {
    results
        .iter()
        .map(|result| result.chunk.content.as_str())
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Short label for where a chunk came from, e.g. `report.pdf (page 3)`.
pub fn source_label(chunk: &Chunk) -> String {
    match chunk.page_number() {
        Some(page) => format!("{} (page {})", chunk.origin, page),
        None => chunk.origin.clone(),
    }
}
