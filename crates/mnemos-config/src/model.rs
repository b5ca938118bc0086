// SPDX-FileCopyrightText: 2026 Mnemos Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Mnemos memory assistant.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level Mnemos configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct MnemosConfig {
    /// Assistant identity, session, and deadline settings.
    #[serde(default)]
    pub agent: AgentConfig,

    /// Ollama gateway settings.
    #[serde(default)]
    pub ollama: OllamaConfig,

    /// Vector index settings.
    #[serde(default)]
    pub vector: VectorConfig,

    /// Memory store, retrieval, and extraction settings.
    #[serde(default)]
    pub memory: MemoryConfig,

    /// Extra categories registered with the classifier at startup.
    #[serde(default)]
    pub classification: ClassificationConfig,
}

/// Assistant identity and conversation behavior.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AgentConfig {
    /// Display name of the assistant.
    #[serde(default = "default_agent_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Inline persona prompt. Overridden by `system_prompt_file` if both set.
    #[serde(default)]
    pub system_prompt: Option<String>,

    /// Path to a file containing the persona prompt.
    /// Takes precedence over `system_prompt` if both are set.
    #[serde(default)]
    pub system_prompt_file: Option<String>,

    /// Number of most recent session turns sent with each request.
    #[serde(default = "default_history_window")]
    pub history_window: usize,

    /// Number of turns retained per session; older turns are evicted first.
    #[serde(default = "default_max_session_turns")]
    pub max_session_turns: usize,

    /// Deadline in seconds for each backend call made while handling a turn.
    #[serde(default = "default_turn_timeout_secs")]
    pub turn_timeout_secs: u64,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: default_agent_name(),
            log_level: default_log_level(),
            system_prompt: None,
            system_prompt_file: None,
            history_window: default_history_window(),
            max_session_turns: default_max_session_turns(),
            turn_timeout_secs: default_turn_timeout_secs(),
        }
    }
}

fn default_agent_name() -> String {
    "mnemos".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_history_window() -> usize {
    6
}

fn default_max_session_turns() -> usize {
    20
}

fn default_turn_timeout_secs() -> u64 {
    150
}

/// Ollama gateway configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct OllamaConfig {
    /// Base URL of the Ollama HTTP API.
    #[serde(default = "default_ollama_url")]
    pub base_url: String,

    /// HTTP client timeout in seconds.
    #[serde(default = "default_ollama_timeout_secs")]
    pub timeout_secs: u64,

    /// Retries on transient HTTP statuses (429, 500, 502, 503).
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Model used for conversation replies.
    #[serde(default = "default_chat_model")]
    pub chat_model: String,

    /// Model used for category classification. Falls back to `chat_model` when unset.
    #[serde(default = "default_classification_model")]
    pub classification_model: Option<String>,

    /// Model used for memory embeddings.
    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,

    /// Sampling temperature for conversation replies.
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Nucleus sampling cutoff for conversation replies.
    #[serde(default = "default_top_p")]
    pub top_p: f32,

    /// Token budget for conversation replies.
    #[serde(default = "default_num_predict")]
    pub num_predict: u32,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            base_url: default_ollama_url(),
            timeout_secs: default_ollama_timeout_secs(),
            max_retries: default_max_retries(),
            chat_model: default_chat_model(),
            classification_model: default_classification_model(),
            embedding_model: default_embedding_model(),
            temperature: default_temperature(),
            top_p: default_top_p(),
            num_predict: default_num_predict(),
        }
    }
}

impl OllamaConfig {
    /// The model to use for classification, falling back to the chat model.
    pub fn classification_model(&self) -> &str {
        self.classification_model
            .as_deref()
            .filter(|m| !m.trim().is_empty())
            .unwrap_or(&self.chat_model)
    }
}

fn default_ollama_url() -> String {
    "http://localhost:11434".to_string()
}

fn default_ollama_timeout_secs() -> u64 {
    120
}

fn default_max_retries() -> u32 {
    1
}

fn default_chat_model() -> String {
    "qwen2.5:7b".to_string()
}

fn default_classification_model() -> Option<String> {
    Some("qwen2.5:3b".to_string())
}

fn default_embedding_model() -> String {
    "nomic-embed-text".to_string()
}

fn default_temperature() -> f32 {
    0.7
}

fn default_top_p() -> f32 {
    0.9
}

fn default_num_predict() -> u32 {
    512
}

/// Vector index (Qdrant) configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct VectorConfig {
    /// Enable the vector index. When false, search always uses the lexical scorer.
    #[serde(default = "default_vector_enabled")]
    pub enabled: bool,

    /// Base URL of the Qdrant REST API.
    #[serde(default = "default_vector_url")]
    pub url: String,

    /// Optional Qdrant API key, sent as the `api-key` header.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Collection holding every user's memories.
    #[serde(default = "default_collection")]
    pub collection: String,

    /// HTTP client timeout in seconds.
    #[serde(default = "default_vector_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for VectorConfig {
    fn default() -> Self {
        Self {
            enabled: default_vector_enabled(),
            url: default_vector_url(),
            api_key: None,
            collection: default_collection(),
            timeout_secs: default_vector_timeout_secs(),
        }
    }
}

fn default_vector_enabled() -> bool {
    true
}

fn default_vector_url() -> String {
    "http://localhost:6333".to_string()
}

fn default_collection() -> String {
    "memories".to_string()
}

fn default_vector_timeout_secs() -> u64 {
    10
}

/// How facts are pulled out of a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractionMode {
    /// Keyword and pattern matching over the user's message.
    #[default]
    Heuristic,
    /// Ask the gateway to list facts from the exchange.
    Llm,
}

/// Memory system configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct MemoryConfig {
    /// Enable memory retrieval and extraction during chat.
    #[serde(default = "default_memory_enabled")]
    pub enabled: bool,

    /// Path to the JSON ledger file.
    #[serde(default = "default_ledger_path")]
    pub ledger_path: String,

    /// Number of relevant memories retrieved per turn.
    #[serde(default = "default_search_limit")]
    pub search_limit: usize,

    /// Number of stored memories scanned when building the user profile block.
    #[serde(default = "default_recent_limit")]
    pub recent_limit: usize,

    /// Minimum score for a memory to be considered relevant (0.0-1.0).
    #[serde(default)]
    pub similarity_threshold: Option<f32>,

    /// Extraction strategy applied after each turn.
    #[serde(default)]
    pub extraction_mode: ExtractionMode,

    /// Utterances shorter than this many characters are never remembered.
    #[serde(default = "default_min_utterance_chars")]
    pub min_utterance_chars: usize,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            enabled: default_memory_enabled(),
            ledger_path: default_ledger_path(),
            search_limit: default_search_limit(),
            recent_limit: default_recent_limit(),
            similarity_threshold: None,
            extraction_mode: ExtractionMode::default(),
            min_utterance_chars: default_min_utterance_chars(),
        }
    }
}

fn default_memory_enabled() -> bool {
    true
}

fn default_ledger_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("mnemos").join("local_memories.json"))
        .unwrap_or_else(|| std::path::PathBuf::from("local_memories.json"))
        .to_string_lossy()
        .into_owned()
}

fn default_search_limit() -> usize {
    5
}

fn default_recent_limit() -> usize {
    10
}

fn default_min_utterance_chars() -> usize {
    5
}

/// Classifier configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ClassificationConfig {
    /// Categories appended to (or replacing) the built-in registry entries.
    #[serde(default)]
    pub categories: Vec<CategoryConfig>,
}

/// A user-defined category.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CategoryConfig {
    /// Registry key returned by the classifier.
    pub key: String,

    /// Human-readable label.
    pub name: String,

    /// Substrings that vote for this category.
    #[serde(default)]
    pub keywords: Vec<String>,

    /// Description shown to the gateway when keyword matching is inconclusive.
    #[serde(default)]
    pub description: String,
}
