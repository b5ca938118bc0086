// SPDX-FileCopyrightText: 2026 Mnemos Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde attributes,
//! such as URL schemes, window sizes, and unique category keys.

use std::collections::HashSet;

use crate::diagnostic::ConfigError;
use crate::model::MnemosConfig;

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &MnemosConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();
    let mut fail = |message: String| errors.push(ConfigError::Validation { message });

    for (key, url) in [
        ("ollama.base_url", &config.ollama.base_url),
        ("vector.url", &config.vector.url),
    ] {
        let url = url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            fail(format!("{key} `{url}` must start with http:// or https://"));
        }
    }

    if config.ollama.chat_model.trim().is_empty() {
        fail("ollama.chat_model must not be empty".to_string());
    }

    if config.vector.enabled && config.ollama.embedding_model.trim().is_empty() {
        fail("ollama.embedding_model must not be empty when the vector index is enabled".to_string());
    }

    if config.vector.collection.trim().is_empty() {
        fail("vector.collection must not be empty".to_string());
    }

    for (key, secs) in [
        ("ollama.timeout_secs", config.ollama.timeout_secs),
        ("vector.timeout_secs", config.vector.timeout_secs),
        ("agent.turn_timeout_secs", config.agent.turn_timeout_secs),
    ] {
        if secs == 0 {
            fail(format!("{key} must be greater than zero"));
        }
    }

    if config.memory.ledger_path.trim().is_empty() {
        fail("memory.ledger_path must not be empty".to_string());
    }

    if let Some(threshold) = config.memory.similarity_threshold
        && !(0.0..=1.0).contains(&threshold)
    {
        fail(format!(
            "memory.similarity_threshold must be between 0.0 and 1.0, got {threshold}"
        ));
    }

    if config.memory.min_utterance_chars == 0 {
        fail("memory.min_utterance_chars must be at least 1".to_string());
    }

    if config.agent.max_session_turns == 0 {
        fail("agent.max_session_turns must be at least 1".to_string());
    }

    if config.agent.history_window > config.agent.max_session_turns {
        fail(format!(
            "agent.history_window ({}) must not exceed agent.max_session_turns ({})",
            config.agent.history_window, config.agent.max_session_turns
        ));
    }

    if !(0.0..=2.0).contains(&config.ollama.temperature) {
        fail(format!(
            "ollama.temperature must be between 0.0 and 2.0, got {}",
            config.ollama.temperature
        ));
    }

    let mut seen_keys = HashSet::new();
    for (i, category) in config.classification.categories.iter().enumerate() {
        let key = category.key.trim();
        if key.is_empty() {
            fail(format!("classification.categories[{i}].key must not be empty"));
        } else if key == "uncategorized" {
            fail(format!(
                "classification.categories[{i}].key `uncategorized` is reserved"
            ));
        } else if !seen_keys.insert(key) {
            fail(format!(
                "duplicate category key `{key}` in [[classification.categories]]"
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
