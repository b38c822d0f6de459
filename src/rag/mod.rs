//! RAG (Retrieval-Augmented Generation) for question answering with sources.
//!
//! Embeds the question, retrieves the closest chunks from a vector index, and
//! asks the generator to answer from that context only.

pub mod context;
mod response;

pub use response::{Answer, QaEngine};

use crate::error::{DocQaError, Result};
use chrono::{DateTime, Utc};

/// A user's natural-language question.
#[derive(Debug, Clone, PartialEq)]
pub struct Question {
    text: String,
    timestamp: DateTime<Utc>,
}

impl Question {
    /// Create a question, rejecting blank text.
    pub fn new(text: impl Into<String>) -> Result<Self> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(DocQaError::InvalidInput(
                "Question must not be empty".to_string(),
            ));
        }
        Ok(Self {
            text,
            timestamp: Utc::now(),
        })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}
