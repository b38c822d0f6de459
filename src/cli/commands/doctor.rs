//! Doctor command - verify system requirements and configuration.

use crate::cli::{preflight, Output};
use crate::config::Settings;
use crate::source::LoaderRegistry;
use console::style;
use std::path::PathBuf;

/// Check result for a single item.
#[derive(Debug)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub message: String,
    pub hint: Option<String>,
}

#[derive(Debug, PartialEq)]
pub enum CheckStatus {
    Ok,
    Warning,
    Error,
}

impl CheckResult {
    fn ok(name: &str, message: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Ok,
            message: message.to_string(),
            hint: None,
        }
    }

    fn warning(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Warning,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn error(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Error,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn print(&self) {
        let icon = match self.status {
            CheckStatus::Ok => style("✓").green(),
            CheckStatus::Warning => style("!").yellow(),
            CheckStatus::Error => style("✗").red(),
        };

        println!("  {} {} - {}", icon, style(&self.name).bold(), self.message);

        if let Some(hint) = &self.hint {
            println!("    {} {}", style("→").dim(), style(hint).dim());
        }
    }
}

/// Run all diagnostic checks.
pub fn run_doctor(settings: &Settings, config_path: Option<&PathBuf>) -> anyhow::Result<()> {
    Output::header("docqa Doctor");
    println!();
    println!("Checking system requirements and configuration...\n");

    let mut checks = Vec::new();

    println!("{}", style("API Configuration").bold());
    let api_check = check_api_key(settings);
    api_check.print();
    checks.push(api_check);

    println!();

    // Missing yt-dlp only disables video sources.
    println!("{}", style("External Tools").bold());
    let tool_check = check_transcript_tool(settings);
    tool_check.print();
    checks.push(tool_check);

    println!();

    println!("{}", style("Configuration").bold());
    let config_checks = vec![check_config_file(config_path), check_settings(settings)];
    for check in &config_checks {
        check.print();
    }
    checks.extend(config_checks);

    println!();

    println!("{}", style("Supported Sources").bold());
    let registry = LoaderRegistry::with_defaults(&settings.transcript);
    for ext in registry.supported_extensions() {
        Output::list_item(&format!(".{} files", ext));
    }
    Output::list_item("YouTube videos (URL or video ID)");

    println!();

    // Summary
    let errors = checks.iter().filter(|c| c.status == CheckStatus::Error).count();
    let warnings = checks.iter().filter(|c| c.status == CheckStatus::Warning).count();

    if errors > 0 {
        anyhow::bail!("{} error(s) found. Please fix them before using docqa.", errors);
    } else if warnings > 0 {
        Output::warning(&format!("All checks passed with {} warning(s).", warnings));
    } else {
        Output::success("All checks passed! docqa is ready to use.");
    }

    Ok(())
}

/// Check if the OpenAI API key is configured.
fn check_api_key(settings: &Settings) -> CheckResult {
    match settings.api_key() {
        Ok(key) if key.starts_with("sk-") && key.chars().count() > 20 => {
            let chars: Vec<char> = key.chars().collect();
            let masked = format!(
                "{}...{}",
                chars[..7].iter().collect::<String>(),
                chars[chars.len() - 4..].iter().collect::<String>()
            );
            CheckResult::ok("OpenAI API key", &format!("configured ({})", masked))
        }
        Ok(_) => CheckResult::warning(
            "OpenAI API key",
            "set but format looks unusual",
            "Expected format: sk-... (fine for OpenAI-compatible servers)",
        ),
        Err(_) => CheckResult::error(
            "OpenAI API key",
            "not set",
            "Set with: export OPENAI_API_KEY='sk-...'",
        ),
    }
}

/// Check that yt-dlp can run.
fn check_transcript_tool(settings: &Settings) -> CheckResult {
    let program = &settings.transcript.yt_dlp_path;
    match preflight::check_tool(program) {
        Ok(()) => CheckResult::ok("yt-dlp", &format!("available ({})", program)),
        Err(e) => CheckResult::warning("yt-dlp", &e.to_string(), install_hint_ytdlp()),
    }
}

/// Check if config file exists.
fn check_config_file(config_path: Option<&PathBuf>) -> CheckResult {
    let config_path = config_path
        .cloned()
        .unwrap_or_else(Settings::default_config_path);
    if config_path.exists() {
        CheckResult::ok("Config file", &format!("{}", config_path.display()))
    } else {
        CheckResult::warning(
            "Config file",
            "using defaults",
            "Create with: docqa config init",
        )
    }
}

/// Check value ranges in the loaded settings.
fn check_settings(settings: &Settings) -> CheckResult {
    match settings.validate() {
        Ok(()) => CheckResult::ok(
            "Settings",
            &format!(
                "chunk size {}, overlap {}, k {}, model {}",
                settings.chunking.chunk_size,
                settings.chunking.chunk_overlap,
                settings.retrieval.k,
                settings.generation.model
            ),
        ),
        Err(e) => CheckResult::error("Settings", &e.to_string(), "Fix the value in the config file"),
    }
}

/// Platform-specific install hint for yt-dlp.
fn install_hint_ytdlp() -> &'static str {
    if cfg!(target_os = "macos") {
        "Install with: brew install yt-dlp (needed for --video sources)"
    } else if cfg!(target_os = "linux") {
        "Install with: pip install yt-dlp (needed for --video sources)"
    } else {
        "Install from: https://github.com/yt-dlp/yt-dlp (needed for --video sources)"
    }
}
