//! Recursive character splitting.
//!
//! Text is first broken into pieces that fit `chunk_size`, trying the coarsest
//! separator first (paragraphs, lines, sentences, words) and falling back to
//! raw character windows that advance by `chunk_size - chunk_overlap`. The
//! pieces are then packed into chunks, carrying up to `chunk_overlap`
//! characters from the end of one chunk into the next.
//!
//! The splitting runs on an explicit work stack, so adversarial input (a single
//! huge line without punctuation) cannot blow the call stack.

use super::{Chunk, ChunkingConfig, TextSplitter};
use crate::error::{DocQaError, Result};
use crate::source::RawDocument;
use std::collections::VecDeque;
use tracing::debug;

/// Separators in priority order. The empty separator means character slicing.
const DEFAULT_SEPARATORS: &[&str] = &["\n\n", "\n", ". ", "! ", "? ", "; ", ", ", " ", ""];

/// Splitter that recursively falls back to finer separators.
#[derive(Debug, Clone)]
pub struct RecursiveSplitter {
    config: ChunkingConfig,
    separators: Vec<String>,
}

impl RecursiveSplitter {
    pub fn new(config: ChunkingConfig) -> Self {
        Self {
            config,
            separators: DEFAULT_SEPARATORS.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Split a single text into trimmed, non-empty chunk texts.
    pub fn split_text(&self, text: &str) -> Vec<String> {
        let pieces = self.break_down(text);
        self.pack(&pieces)
    }

    /// Break text into in-order pieces, each at most `chunk_size` characters.
    fn break_down<'a>(&self, text: &'a str) -> Vec<&'a str> {
        let limit = self.config.chunk_size;
        let stride = limit - self.config.chunk_overlap;
        let mut pieces = Vec::new();
        let mut stack: Vec<(&'a str, usize)> = vec![(text, 0)];

        while let Some((piece, level)) = stack.pop() {
            if piece.is_empty() {
                continue;
            }
            if char_len(piece) <= limit {
                pieces.push(piece);
                continue;
            }

            match self.separators.get(level) {
                Some(separator) if !separator.is_empty() => {
                    // Reverse so the first part is popped first.
                    for part in split_keeping_separator(piece, separator).into_iter().rev() {
                        stack.push((part, level + 1));
                    }
                }
                _ => pieces.extend(slice_chars(piece, limit, stride)),
            }
        }

        pieces
    }

    /// Pack pieces into chunks with overlap.
    fn pack(&self, pieces: &[&str]) -> Vec<String> {
        let ChunkingConfig {
            chunk_size,
            chunk_overlap,
        } = self.config;

        let mut chunks = Vec::new();
        let mut window: VecDeque<(&str, usize)> = VecDeque::new();
        let mut total = 0;

        for piece in pieces {
            let len = char_len(piece);

            if total + len > chunk_size && !window.is_empty() {
                emit(&window, &mut chunks);

                // Keep at most `chunk_overlap` characters, and leave room for the new piece.
                while total > chunk_overlap || (total > 0 && total + len > chunk_size) {
                    match window.pop_front() {
                        Some((_, dropped)) => total -= dropped,
                        None => break,
                    }
                }
            }

            window.push_back((piece, len));
            total += len;
        }

        if !window.is_empty() {
            emit(&window, &mut chunks);
        }

        chunks
    }
}

impl Default for RecursiveSplitter {
    fn default() -> Self {
        Self::new(ChunkingConfig::default())
    }
}

impl TextSplitter for RecursiveSplitter {
    fn split(&self, documents: &[RawDocument], first_index: usize) -> Result<Vec<Chunk>> {
        let mut chunks = Vec::new();
        let mut next_index = first_index;

        for document in documents {
            if document.content.trim().is_empty() {
                return Err(DocQaError::Processing(format!(
                    "Document from {} has no content to split",
                    document.origin
                )));
            }

            for content in self.split_text(&document.content) {
                chunks.push(Chunk {
                    content,
                    metadata: document.metadata.clone(),
                    chunk_index: next_index,
                    origin: document.origin.clone(),
                });
                next_index += 1;
            }
        }

        debug!(
            "Split {} documents into {} chunks (size={}, overlap={})",
            documents.len(),
            chunks.len(),
            self.config.chunk_size,
            self.config.chunk_overlap
        );

        Ok(chunks)
    }
}

fn char_len(text: &str) -> usize {
    text.chars().count()
}

fn emit(window: &VecDeque<(&str, usize)>, chunks: &mut Vec<String>) {
    let joined: String = window.iter().map(|(piece, _)| *piece).collect();
    let trimmed = joined.trim();
    if !trimmed.is_empty() {
        chunks.push(trimmed.to_string());
    }
}

/// Split text at a separator while keeping the separator attached to the preceding segment.
fn split_keeping_separator<'a>(text: &'a str, separator: &str) -> Vec<&'a str> {
    let mut result = Vec::new();
    let mut start = 0;

    while let Some(pos) = text[start..].find(separator) {
        let end = start + pos + separator.len();
        result.push(&text[start..end]);
        start = end;
    }

    if start < text.len() {
        result.push(&text[start..]);
    }

    result
}

/// Cut text into windows of at most `limit` characters, starting every
/// `stride` characters, so consecutive windows share `limit - stride`.
fn slice_chars(text: &str, limit: usize, stride: usize) -> Vec<&str> {
    let bounds: Vec<usize> = text
        .char_indices()
        .map(|(offset, _)| offset)
        .chain(std::iter::once(text.len()))
        .collect();
    let chars = bounds.len() - 1;

    let mut slices = Vec::new();
    let mut start = 0;
    while start < chars {
        let end = (start + limit).min(chars);
        slices.push(&text[bounds[start]..bounds[end]]);
        if end == chars {
            break;
        }
        start += stride.max(1);
    }

    slices
}
