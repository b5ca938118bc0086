// SPDX-FileCopyrightText: 2026 Mnemos Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `mnemos shell` command implementation.
//!
//! An interactive REPL with a colored prompt and readline history. Lines
//! starting with `/` are shell commands; everything else is a chat turn.

use colored::Colorize;
use mnemos_agent::{ChatResult, ConversationOrchestrator};
use mnemos_config::MnemosConfig;
use mnemos_core::error::MnemosError;
use mnemos_core::types::ChatRole;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tracing::info;

use crate::bootstrap::build_orchestrator;
use crate::memory_cmd::{format_record, format_statistics};

/// Memories listed by `/memories`.
const LISTED_MEMORIES: usize = 10;

/// A parsed input line.
#[derive(Debug, PartialEq, Eq)]
enum ShellInput<'a> {
    Quit,
    Memories,
    Stats,
    Clear,
    History,
    Help,
    Unknown(&'a str),
    Message(&'a str),
    Empty,
}

fn parse_input(line: &str) -> ShellInput<'_> {
    let trimmed = line.trim();
    match trimmed {
        "" => ShellInput::Empty,
        "/quit" | "/exit" => ShellInput::Quit,
        "/memories" => ShellInput::Memories,
        "/stats" => ShellInput::Stats,
        "/clear" => ShellInput::Clear,
        "/history" => ShellInput::History,
        "/help" => ShellInput::Help,
        cmd if cmd.starts_with('/') => ShellInput::Unknown(cmd),
        message => ShellInput::Message(message),
    }
}

/// Runs the `mnemos shell` interactive REPL.
///
/// A fresh session id is generated when none is given, so history from an
/// earlier invocation is never mixed in.
pub async fn run_shell(
    config: &MnemosConfig,
    user_id: &str,
    session_id: Option<String>,
    use_memory: bool,
) -> Result<(), MnemosError> {
    let orchestrator = build_orchestrator(config).await?;
    let session_id = session_id.unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
    info!(user_id, session_id = %session_id, use_memory, "shell session started");

    let mut rl = DefaultEditor::new()
        .map_err(|e| MnemosError::Internal(format!("failed to initialize readline: {e}")))?;

    println!("{}", "mnemos shell".bold().green());
    println!(
        "{}",
        format!(
            "user {user_id} | session {session_id} | {}",
            orchestrator.store().backend_label()
        )
        .dimmed()
    );
    if config.vector.enabled && !orchestrator.store().has_vector_index() {
        println!(
            "{}",
            "vector index unavailable, searching the ledger lexically".yellow()
        );
    }
    if !use_memory {
        println!("{}", "memory recall is off for this session".yellow());
    }
    println!("Type {} for commands, {} to exit.\n", "/help".yellow(), "/quit".yellow());

    let prompt = format!("{}> ", config.agent.name.green());
    loop {
        let line = match rl.readline(&prompt) {
            Ok(line) => line,
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("{}: {e}", "error".red());
                break;
            }
        };

        let input = parse_input(&line);
        if input != ShellInput::Empty {
            let _ = rl.add_history_entry(line.as_str());
        }

        match input {
            ShellInput::Empty => {}
            ShellInput::Quit => break,
            ShellInput::Help => print_help(),
            ShellInput::Unknown(cmd) => {
                println!("{}", format!("unknown command {cmd}, try /help").yellow());
            }
            ShellInput::Memories => {
                let records = orchestrator.store().get_all(user_id, LISTED_MEMORIES).await;
                if records.is_empty() {
                    println!("{}", "no memories yet".dimmed());
                }
                for record in &records {
                    println!("  {}", format_record(record));
                }
            }
            ShellInput::Stats => {
                let stats = orchestrator.store().statistics(user_id).await;
                print!("{}", format_statistics(&stats));
            }
            ShellInput::Clear => {
                orchestrator.clear_session(&session_id).await;
                println!("{}", "session history cleared".dimmed());
            }
            ShellInput::History => print_history(&orchestrator, &session_id).await,
            ShellInput::Message(message) => {
                let result = orchestrator
                    .respond(message, user_id, Some(&session_id), use_memory)
                    .await;
                print_turn(&result);
            }
        }
    }

    println!("{}", "bye".dimmed());
    Ok(())
}

fn print_help() {
    println!("  /memories  list your most recent memories");
    println!("  /stats     memory statistics");
    println!("  /clear     forget this session's history");
    println!("  /history   show this session's history");
    println!("  /quit      leave the shell");
}

async fn print_history(orchestrator: &ConversationOrchestrator, session_id: &str) {
    let history = orchestrator.session_history(session_id).await;
    if history.is_empty() {
        println!("{}", "no history yet".dimmed());
    }
    for message in history {
        let speaker = match message.role {
            ChatRole::User => "you".cyan(),
            _ => "assistant".green(),
        };
        println!("{speaker}: {}", message.content);
    }
}

fn print_turn(result: &ChatResult) {
    println!("{}\n", result.response);
    for note in turn_notes(result) {
        println!("{}", note.dimmed());
    }
    if let Some(error) = &result.error {
        eprintln!("{}: {error}", "error".red());
    }
}

/// Short notes on recalled and newly stored memories.
fn turn_notes(result: &ChatResult) -> Vec<String> {
    let mut notes = Vec::new();
    if !result.used_memories.is_empty() {
        let recalled = result
            .used_memories
            .iter()
            .map(|m| format!("{} ({:.2})", m.text, m.score))
            .collect::<Vec<_>>()
            .join("; ");
        notes.push(format!("recalled: {recalled}"));
    }
    if !result.extracted_memory_ids.is_empty() {
        notes.push(format!(
            "remembered {} new memory(ies)",
            result.extracted_memory_ids.len()
        ));
    }
    notes
}
