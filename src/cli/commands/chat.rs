//! Interactive question-answering session over one in-memory index.

use crate::cli::preflight::{self, Operation};
use crate::cli::sources::{build_index, collect_sources};
use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::Orchestrator;
use crate::source::SourceHandle;
use crate::vector_store::VectorStore;
use anyhow::Result;
use console::{style, Term};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

/// A line typed at the chat prompt.
#[derive(Debug, PartialEq)]
enum ChatInput<'a> {
    Empty,
    Exit,
    Clear,
    Help,
    /// `add <path or video>`: ingest another source into the same index.
    Add(&'a str),
    Question(&'a str),
}

fn parse_input(line: &str) -> ChatInput<'_> {
    let line = line.trim();
    if line.is_empty() {
        return ChatInput::Empty;
    }
    if line.eq_ignore_ascii_case("exit") || line.eq_ignore_ascii_case("quit") {
        return ChatInput::Exit;
    }
    if line.eq_ignore_ascii_case("clear") {
        return ChatInput::Clear;
    }
    if line.eq_ignore_ascii_case("help") {
        return ChatInput::Help;
    }
    match line.split_once(char::is_whitespace) {
        Some((command, rest)) if command.eq_ignore_ascii_case("add") && !rest.trim().is_empty() => {
            ChatInput::Add(rest.trim())
        }
        _ => ChatInput::Question(line),
    }
}

/// Run the interactive chat command.
pub async fn run_chat(
    files: &[PathBuf],
    videos: &[String],
    model: Option<String>,
    mut settings: Settings,
) -> Result<()> {
    if let Some(model) = model {
        settings.generation.model = model;
    }

    if let Err(e) = preflight::check(Operation::Index { videos: !videos.is_empty() }, &settings) {
        Output::info("Run 'docqa doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    let sources = collect_sources(files, videos)?;
    let orchestrator = Orchestrator::new(settings)?;
    let report = build_index(&orchestrator, &sources, None).await?;
    let store = report.store;

    println!("\n{}", style("docqa chat").bold().cyan());
    println!(
        "{}\n",
        style("Ask questions about your sources. 'add <file or video>' loads more, 'exit' quits.").dim()
    );

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("{} ", style("You:").green().bold());
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }

        match parse_input(&line) {
            ChatInput::Empty => continue,
            ChatInput::Exit => {
                Output::info("Goodbye!");
                break;
            }
            ChatInput::Clear => {
                Term::stdout().clear_screen()?;
            }
            ChatInput::Help => {
                Output::kv("add <file or video>", "load another source into this session");
                Output::kv("clear", "clear the screen");
                Output::kv("exit", "leave the session");
            }
            ChatInput::Add(reference) => {
                if let Err(e) = add_source(&orchestrator, reference, store.clone()).await {
                    Output::error(&format!("[{}] {}", e.kind(), e));
                }
            }
            ChatInput::Question(question) => {
                let spinner = Output::spinner("Thinking...");
                let result = orchestrator.ask(question, store.as_ref()).await;
                spinner.finish_and_clear();

                match result {
                    Ok(answer) => {
                        println!("\n{} {}\n", style("docqa:").cyan().bold(), answer.format_for_display());
                    }
                    Err(e) => Output::error(&format!("[{}] {}", e.kind(), e)),
                }
            }
        }
    }

    Ok(())
}

/// Ingest one more file or video into the session's index.
async fn add_source(
    orchestrator: &Orchestrator,
    reference: &str,
    store: Arc<dyn VectorStore>,
) -> crate::error::Result<()> {
    let path = PathBuf::from(reference);
    let sources: Vec<SourceHandle> = if path.is_file() {
        collect_sources(&[path], &[])?
    } else {
        collect_sources(&[], &[reference.to_string()])?
    };
    debug!("Adding {} to chat session", reference);
    build_index(orchestrator, &sources, Some(store)).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_input() {
        assert_eq!(parse_input("   \n"), ChatInput::Empty);
        assert_eq!(parse_input("EXIT\n"), ChatInput::Exit);
        assert_eq!(parse_input("quit"), ChatInput::Exit);
        assert_eq!(parse_input("clear"), ChatInput::Clear);
        assert_eq!(parse_input("help"), ChatInput::Help);
        assert_eq!(parse_input("add  notes.pdf \n"), ChatInput::Add("notes.pdf"));
        assert_eq!(
            parse_input("What animal is Alpha?\n"),
            ChatInput::Question("What animal is Alpha?")
        );
        assert_eq!(parse_input("add"), ChatInput::Question("add"));
        assert_eq!(
            parse_input("additional info?"),
            ChatInput::Question("additional info?")
        );
    }
}
