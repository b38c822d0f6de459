//! Configuration module for docqa.
//!
//! Handles loading and managing application settings and prompt templates.

mod prompts;
mod settings;

pub use prompts::{Prompts, QaPrompts};
pub use settings::{
    ChunkingSettings, EmbeddingSettings, GenerationSettings, OpenAiSettings, PromptSettings,
    RetrievalSettings, Settings, TranscriptSettings,
};
