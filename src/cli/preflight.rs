//! Pre-flight checks before expensive operations.
//!
//! Validates that required tools and configuration are available
//! before starting operations that would otherwise fail midway.

use crate::config::Settings;
use crate::error::{DocQaError, Result};
use std::process::Command;

/// Requirements for different operations.
#[derive(Debug, Clone, Copy)]
pub enum Operation {
    /// Building an index (ask, chat, search) needs the API key, and yt-dlp
    /// when videos are among the sources.
    Index { videos: bool },
}

/// Run pre-flight checks for the given operation.
///
/// Returns Ok(()) if all checks pass, or an error describing what's missing.
pub fn check(operation: Operation, settings: &Settings) -> Result<()> {
    match operation {
        Operation::Index { videos } => {
            settings.validate()?;
            check_api_key(settings)?;
            if videos {
                check_tool(&settings.transcript.yt_dlp_path)?;
            }
        }
    }
    Ok(())
}

/// Check if OpenAI API key is configured.
fn check_api_key(settings: &Settings) -> Result<()> {
    settings.api_key().map(|_| ()).map_err(|_| {
        DocQaError::Configuration(
            "OpenAI API key not set. Set it with: export OPENAI_API_KEY='sk-...' \
             or add api_key under [openai] in the config file"
                .to_string(),
        )
    })
}

/// Check if an external tool is available.
pub fn check_tool(program: &str) -> Result<()> {
    match Command::new(program).arg("--version").output() {
        Ok(output) if output.status.success() => Ok(()),
        Ok(_) => Err(DocQaError::ToolNotFound(format!(
            "{} is installed but not working correctly",
            program
        ))),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(DocQaError::ToolNotFound(program.to_string()))
        }
        Err(e) => Err(DocQaError::ToolNotFound(format!("{}: {}", program, e))),
    }
}
