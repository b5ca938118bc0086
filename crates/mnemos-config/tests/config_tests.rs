// SPDX-FileCopyrightText: 2026 Mnemos Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the Mnemos configuration system.

use mnemos_config::diagnostic::ConfigError;
use mnemos_config::model::{ExtractionMode, MnemosConfig};
use mnemos_config::{load_and_validate_str, load_config_from_str};

/// Valid TOML with all known fields deserializes successfully.
#[test]
fn valid_toml_deserializes_into_mnemos_config() {
    let toml = r#"
[agent]
name = "test-assistant"
log_level = "debug"
history_window = 4
max_session_turns = 10
turn_timeout_secs = 30

[ollama]
base_url = "http://gpu-box:11434"
chat_model = "llama3.1:8b"
classification_model = "llama3.2:1b"
embedding_model = "bge-m3"
timeout_secs = 60
max_retries = 2

[vector]
enabled = false
url = "http://qdrant:6333"
collection = "personal"

[memory]
ledger_path = "/tmp/ledger.json"
search_limit = 3
similarity_threshold = 0.4
extraction_mode = "llm"
"#;

    let config = load_config_from_str(toml).expect("valid TOML should deserialize");
    assert_eq!(config.agent.name, "test-assistant");
    assert_eq!(config.agent.history_window, 4);
    assert_eq!(config.agent.max_session_turns, 10);
    assert_eq!(config.ollama.base_url, "http://gpu-box:11434");
    assert_eq!(config.ollama.classification_model(), "llama3.2:1b");
    assert_eq!(config.ollama.max_retries, 2);
    assert!(!config.vector.enabled);
    assert_eq!(config.vector.collection, "personal");
    assert_eq!(config.memory.ledger_path, "/tmp/ledger.json");
    assert_eq!(config.memory.similarity_threshold, Some(0.4));
    assert_eq!(config.memory.extraction_mode, ExtractionMode::Llm);
}

/// Empty TOML falls back to the defaults the assistant ships with.
#[test]
fn missing_optional_sections_use_defaults() {
    let config = load_config_from_str("").expect("empty TOML should use defaults");

    assert_eq!(config.agent.name, "mnemos");
    assert_eq!(config.agent.history_window, 6);
    assert_eq!(config.agent.max_session_turns, 20);
    assert_eq!(config.ollama.base_url, "http://localhost:11434");
    assert_eq!(config.ollama.timeout_secs, 120);
    assert_eq!(config.ollama.chat_model, "qwen2.5:7b");
    assert_eq!(config.ollama.classification_model(), "qwen2.5:3b");
    assert_eq!(config.ollama.embedding_model, "nomic-embed-text");
    assert!(config.vector.enabled);
    assert_eq!(config.vector.url, "http://localhost:6333");
    assert_eq!(config.vector.collection, "memories");
    assert_eq!(config.memory.search_limit, 5);
    assert_eq!(config.memory.recent_limit, 10);
    assert_eq!(config.memory.min_utterance_chars, 5);
    assert!(config.memory.similarity_threshold.is_none());
    assert_eq!(config.memory.extraction_mode, ExtractionMode::Heuristic);
    assert!(config.memory.ledger_path.ends_with("local_memories.json"));
}

/// An empty classification model falls back to the chat model.
#[test]
fn blank_classification_model_uses_chat_model() {
    let toml = r#"
[ollama]
chat_model = "gemma2:9b"
classification_model = ""
"#;
    let config = load_config_from_str(toml).expect("should parse");
    assert_eq!(config.ollama.classification_model(), "gemma2:9b");
}

/// Unknown field in [ollama] section produces an UnknownField error.
#[test]
fn unknown_field_in_ollama_produces_error() {
    let toml = r#"
[ollama]
chat_modle = "x"
"#;

    let err = load_config_from_str(toml).expect_err("should reject unknown field");
    let err_str = format!("{err}");
    assert!(
        err_str.contains("unknown field") || err_str.contains("chat_modle"),
        "error should mention unknown field or the bad key, got: {err_str}"
    );
}

/// Unknown keys are turned into diagnostics carrying a suggestion.
#[test]
fn unknown_key_diagnostic_suggests_correction() {
    let toml = r#"
[memory]
serch_limit = 3
"#;

    let errors = load_and_validate_str(toml).expect_err("should fail");
    let suggestion = errors.iter().find_map(|e| match e {
        ConfigError::UnknownKey {
            key, suggestion, ..
        } if key == "serch_limit" => suggestion.clone(),
        _ => None,
    });
    assert_eq!(suggestion.as_deref(), Some("search_limit"));
}

/// A misspelled extraction mode is reported with the accepted values.
#[test]
fn bad_extraction_mode_is_reported() {
    let toml = r#"
[memory]
extraction_mode = "llmm"
"#;

    let errors = load_and_validate_str(toml).expect_err("should fail");
    let rendered = errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("\n");
    assert!(rendered.contains("llmm"), "got: {rendered}");
}

/// Validation runs after a successful parse.
#[test]
fn load_and_validate_str_runs_validation() {
    let toml = r#"
[agent]
history_window = 50
"#;

    let errors = load_and_validate_str(toml).expect_err("should fail validation");
    assert!(errors
        .iter()
        .any(|e| matches!(e, ConfigError::Validation { message } if message.contains("history_window"))));
}

/// Extra categories are read from an array of tables.
#[test]
fn custom_categories_deserialize() {
    let toml = r#"
[[classification.categories]]
key = "pets"
name = "반려동물"
keywords = ["강아지", "고양이"]
description = "반려동물 관련 정보"

[[classification.categories]]
key = "finance"
name = "재정"
"#;

    let config = load_and_validate_str(toml).expect("should validate");
    let categories = &config.classification.categories;
    assert_eq!(categories.len(), 2);
    assert_eq!(categories[0].key, "pets");
    assert_eq!(categories[0].keywords, vec!["강아지", "고양이"]);
    assert!(categories[1].keywords.is_empty());
    assert!(categories[1].description.is_empty());
}

/// Environment overrides land on the dotted key, as produced by the env mapper.
#[test]
fn env_style_override_wins_over_toml() {
    use figment::{
        providers::{Format, Serialized, Toml},
        Figment,
    };

    let toml_content = r#"
[ollama]
chat_model = "from-toml"
"#;

    let config: MnemosConfig = Figment::new()
        .merge(Serialized::defaults(MnemosConfig::default()))
        .merge(Toml::string(toml_content))
        .merge(("ollama.chat_model", "from-env"))
        .extract()
        .expect("should merge env override");

    assert_eq!(config.ollama.chat_model, "from-env");
}

/// Missing config files are silently skipped.
#[test]
fn missing_config_files_silently_skipped() {
    let config = mnemos_config::load_config_from_path(std::path::Path::new(
        "/nonexistent/path/mnemos.toml",
    ))
    .expect("missing file should be silently skipped");

    assert_eq!(config.agent.name, "mnemos");
}

/// The explicit-path loader reports a missing file instead of using defaults.
#[test]
fn load_and_validate_path_rejects_missing_file() {
    let errors = mnemos_config::load_and_validate_path(std::path::Path::new(
        "/nonexistent/path/mnemos.toml",
    ))
    .expect_err("should fail");
    assert!(matches!(&errors[0], ConfigError::Other(msg) if msg.contains("does not exist")));
}

/// The default config survives a TOML round trip (used by `mnemos config show`).
#[test]
fn default_config_serializes_to_toml() {
    let rendered = toml::to_string_pretty(&MnemosConfig::default()).expect("should serialize");
    let reparsed = load_config_from_str(&rendered).expect("should parse back");
    assert_eq!(reparsed.ollama.chat_model, "qwen2.5:7b");
    assert_eq!(reparsed.agent.max_session_turns, 20);
}
