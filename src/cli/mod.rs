//! CLI module for docqa.

pub mod commands;
mod output;
pub mod preflight;
pub mod sources;

pub use output::Output;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// docqa - Document and Video Question Answering
///
/// Load PDFs, text files and YouTube transcripts into an in-memory index and
/// ask questions answered from their content.
#[derive(Parser, Debug)]
#[command(name = "docqa")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Load sources and answer a single question
    Ask {
        /// The question to ask
        question: String,

        /// Document to load (PDF, .txt, .md); repeatable
        #[arg(short, long = "file")]
        files: Vec<PathBuf>,

        /// YouTube URL or video ID whose transcript to load; repeatable
        #[arg(long = "video")]
        videos: Vec<String>,

        /// Number of chunks to retrieve as context
        #[arg(short)]
        k: Option<usize>,

        /// Chat model to use for the answer
        #[arg(short, long)]
        model: Option<String>,
    },

    /// Load sources once, then ask questions interactively
    Chat {
        /// Document to load (PDF, .txt, .md); repeatable
        #[arg(short, long = "file")]
        files: Vec<PathBuf>,

        /// YouTube URL or video ID whose transcript to load; repeatable
        #[arg(long = "video")]
        videos: Vec<String>,

        /// Chat model to use for answers
        #[arg(short, long)]
        model: Option<String>,
    },

    /// Show the chunks most similar to a query, without generating an answer
    Search {
        /// Search query
        query: String,

        /// Document to load (PDF, .txt, .md); repeatable
        #[arg(short, long = "file")]
        files: Vec<PathBuf>,

        /// YouTube URL or video ID whose transcript to load; repeatable
        #[arg(long = "video")]
        videos: Vec<String>,

        /// Maximum number of results
        #[arg(short, long, default_value = "5")]
        limit: usize,
    },

    /// Check system requirements and configuration
    Doctor,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,

    /// Write a default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },
}
