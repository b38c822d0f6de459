//! docqa CLI entry point.

use anyhow::Result;
use clap::Parser;
use docqa::cli::{commands, Cli, Commands, Output};
use docqa::config::Settings;
use docqa::DocQaError;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| format!("docqa={}", log_level)),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    if let Err(e) = run(cli).await {
        match e.downcast_ref::<DocQaError>() {
            Some(err) => Output::error(&format!("[{}] {}", err.kind(), err)),
            None => Output::error(&format!("Unexpected error: {:#}", e)),
        }
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    // Load configuration
    let settings = Settings::load_from(cli.config.as_ref())?;

    // Execute command
    match &cli.command {
        Commands::Ask {
            question,
            files,
            videos,
            k,
            model,
        } => {
            commands::run_ask(question, files, videos, *k, model.clone(), settings).await?;
        }

        Commands::Chat {
            files,
            videos,
            model,
        } => {
            commands::run_chat(files, videos, model.clone(), settings).await?;
        }

        Commands::Search {
            query,
            files,
            videos,
            limit,
        } => {
            commands::run_search(query, files, videos, *limit, settings).await?;
        }

        Commands::Doctor => {
            commands::run_doctor(&settings, cli.config.as_ref())?;
        }

        Commands::Config { action } => {
            commands::run_config(action, settings, cli.config.as_ref())?;
        }
    }

    Ok(())
}
