// SPDX-FileCopyrightText: 2026 Mnemos Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mnemos - a personal chat assistant with long-term memory.
//!
//! This is the binary entry point.

mod bootstrap;
mod config_cmd;
mod doctor;
mod memory_cmd;
mod shell;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use mnemos_config::MnemosConfig;

use crate::config_cmd::ConfigCommand;
use crate::memory_cmd::MemoryCommand;

/// User id used when none is given.
pub const DEFAULT_USER: &str = "default";

/// Mnemos - a personal chat assistant with long-term memory.
#[derive(Parser, Debug)]
#[command(name = "mnemos", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the XDG hierarchy.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Launch an interactive chat session.
    Shell {
        #[arg(long, default_value = DEFAULT_USER)]
        user: String,
        /// Session id; a fresh one is generated when omitted.
        #[arg(long)]
        session: Option<String>,
        /// Do not recall stored memories; new facts are still remembered.
        #[arg(long)]
        no_memory: bool,
    },
    /// Run a single chat turn and print the result as JSON.
    Chat {
        message: String,
        #[arg(long, default_value = DEFAULT_USER)]
        user: String,
        #[arg(long)]
        session: Option<String>,
        /// Do not recall stored memories.
        #[arg(long)]
        no_memory: bool,
    },
    /// Inspect and edit stored memories.
    Memory {
        #[command(subcommand)]
        action: MemoryCommand,
    },
    /// Show or validate the configuration.
    Config {
        #[command(subcommand)]
        action: ConfigCommand,
    },
    /// Check the ledger, the gateway, and the vector index.
    Doctor {
        /// Disable colored output.
        #[arg(long)]
        plain: bool,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(errors) => {
            mnemos_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    init_tracing(&config.agent.log_level);

    let outcome = match cli.command {
        Some(Commands::Shell {
            user,
            session,
            no_memory,
        }) => shell::run_shell(&config, &user, session, !no_memory).await,
        Some(Commands::Chat {
            message,
            user,
            session,
            no_memory,
        }) => run_chat(&config, &message, &user, session.as_deref(), !no_memory).await,
        Some(Commands::Memory { action }) => memory_cmd::run_memory(&config, action).await,
        Some(Commands::Config { action }) => config_cmd::run_config(&config, action),
        Some(Commands::Doctor { plain }) => doctor::run_doctor(&config, plain).await,
        None => {
            println!("mnemos: use --help for available commands");
            Ok(())
        }
    };

    if let Err(e) = outcome {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn load_config(
    path: Option<&std::path::Path>,
) -> Result<MnemosConfig, Vec<mnemos_config::ConfigError>> {
    match path {
        Some(path) => mnemos_config::load_and_validate_path(path),
        None => mnemos_config::load_and_validate(),
    }
}

/// Runs one turn and prints the [`mnemos_agent::ChatResult`] as JSON.
async fn run_chat(
    config: &MnemosConfig,
    message: &str,
    user: &str,
    session: Option<&str>,
    use_memory: bool,
) -> Result<(), mnemos_core::MnemosError> {
    let orchestrator = bootstrap::build_orchestrator(config).await?;
    let result = orchestrator
        .respond(message, user, session, use_memory)
        .await;
    let json = serde_json::to_string_pretty(&result)
        .map_err(|e| mnemos_core::MnemosError::Serialization(format!("failed to encode result: {e}")))?;
    println!("{json}");
    Ok(())
}

/// Initializes the tracing subscriber with the given log level.
///
/// Logs go to stderr so `mnemos chat` output stays valid JSON.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "mnemos={log_level},mnemos_memory={log_level},mnemos_agent={log_level},warn"
        ))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_names(false)
        .init();
}
