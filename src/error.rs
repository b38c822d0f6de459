//! Error types for docqa.

use thiserror::Error;

/// Library-level error type for docqa operations.
///
/// Both pipelines surface this single type, so a caller handles one failure
/// kind for the whole ingest/query flow.
#[derive(Error, Debug)]
pub enum DocQaError {
    #[error("Unsupported source: {0}")]
    UnsupportedSource(String),

    #[error("Processing error: {0}")]
    Processing(String),

    #[error("Embedding generation failed: {0}")]
    Embedding(String),

    #[error("Vector index is empty; ingest documents before searching")]
    EmptyIndex,

    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    #[error("Answer generation failed: {0}")]
    Generation(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("External tool not found: {0}. Please install it and ensure it's in your PATH.")]
    ToolNotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl DocQaError {
    /// Short stable label for logs and user-facing messages.
    pub fn kind(&self) -> &'static str {
        match self {
            DocQaError::UnsupportedSource(_) => "unsupported_source",
            DocQaError::Processing(_) => "processing",
            DocQaError::Embedding(_) => "embedding",
            DocQaError::EmptyIndex => "empty_index",
            DocQaError::InvariantViolation(_) => "invariant_violation",
            DocQaError::Generation(_) => "generation",
            DocQaError::Configuration(_) => "configuration",
            DocQaError::InvalidInput(_) => "invalid_input",
            DocQaError::ToolNotFound(_) => "tool_not_found",
            DocQaError::Io(_) => "io",
            DocQaError::Json(_) => "json",
            DocQaError::TomlParse(_) => "toml",
            DocQaError::Http(_) => "http",
        }
    }
}

/// Result type alias for docqa operations.
pub type Result<T> = std::result::Result<T, DocQaError>;
