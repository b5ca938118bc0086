// SPDX-FileCopyrightText: 2026 Mnemos Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `mnemos config` subcommands.

use clap::Subcommand;
use mnemos_config::MnemosConfig;
use mnemos_core::error::MnemosError;

/// Placeholder printed instead of secrets.
const REDACTED: &str = "***";

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Print the effective configuration as TOML.
    Show,
    /// Check the configuration and report whether it is valid.
    Validate,
}

pub fn run_config(config: &MnemosConfig, action: ConfigCommand) -> Result<(), MnemosError> {
    match action {
        ConfigCommand::Show => {
            print!("{}", render_config(config)?);
            Ok(())
        }
        // Loading already validated; reaching here means the file is fine.
        ConfigCommand::Validate => {
            println!("configuration is valid");
            Ok(())
        }
    }
}

/// The effective configuration as TOML, with secrets redacted.
pub fn render_config(config: &MnemosConfig) -> Result<String, MnemosError> {
    let mut shown = config.clone();
    if shown.vector.api_key.is_some() {
        shown.vector.api_key = Some(REDACTED.to_string());
    }
    toml::to_string_pretty(&shown)
        .map_err(|e| MnemosError::Config(format!("failed to render configuration: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn show_redacts_the_vector_api_key() {
        let config = mnemos_config::load_and_validate_str(
            "[vector]\nenabled = true\napi_key = \"s3cret\"\n",
        )
        .expect("valid config");
        let rendered = render_config(&config).unwrap();
        assert!(rendered.contains("api_key = \"***\""));
        assert!(!rendered.contains("s3cret"));
    }

    #[test]
    fn show_round_trips_through_the_loader() {
        let config = mnemos_config::load_and_validate_str("[ollama]\nchat_model = \"llama3\"\n")
            .expect("valid config");
        let rendered = render_config(&config).unwrap();
        let reloaded = mnemos_config::load_and_validate_str(&rendered).expect("reloads");
        assert_eq!(reloaded.ollama.chat_model, "llama3");
        assert_eq!(reloaded.memory.ledger_path, config.memory.ledger_path);
    }
}
