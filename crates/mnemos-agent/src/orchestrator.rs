// SPDX-FileCopyrightText: 2026 Mnemos Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The per-turn conversation pipeline.
//!
//! A turn recalls memories, builds the context block, asks the gateway for
//! a reply, extracts new memories from the user's message, and records both
//! turns in the session. Every failure is absorbed: the caller always gets a
//! [`ChatResult`], carrying an apology and the error detail when the turn
//! could not run.

use std::sync::Arc;
use std::time::Duration;

use mnemos_config::MnemosConfig;
use mnemos_core::error::MnemosError;
use mnemos_core::traits::ProviderAdapter;
use mnemos_core::types::{ChatMessage, ChatRequest, Metadata, SamplingOptions, ScoredMemory};
use mnemos_memory::strategy::within;
use mnemos_memory::{
    Category, Classifier, ExtractionHeuristic, MemoryExtractor, MemoryStore, conversation_metadata,
    keys,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::context::{build_memory_context, compose_messages, load_system_prompt};
use crate::prompts::{GATEWAY_APOLOGY, TURN_APOLOGY};
use crate::session::SessionRegistry;

/// Longest memory context snippet returned in a [`ChatResult`].
const CONTEXT_SNIPPET_CHARS: usize = 500;

/// Number of recalled memories reported back to the caller.
const REPORTED_MEMORIES: usize = 3;

/// A recalled memory as reported to the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsedMemory {
    pub id: String,
    pub text: String,
    pub score: f32,
}

impl From<&ScoredMemory> for UsedMemory {
    fn from(hit: &ScoredMemory) -> Self {
        Self {
            id: hit.memory.id.clone(),
            text: hit.memory.text.clone(),
            score: hit.score,
        }
    }
}

/// Outcome of one conversation turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatResult {
    pub response: String,
    pub user_message: String,
    pub used_memories: Vec<UsedMemory>,
    /// Leading part of the memory context block sent with the turn.
    pub memory_context: String,
    pub extracted_memory_ids: Vec<String>,
    pub session_id: Option<String>,
    /// RFC 3339 time the turn finished.
    pub timestamp: String,
    /// Error detail when the turn could not run.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ChatResult {
    fn failed(user_message: &str, session_id: Option<&str>, error: &MnemosError) -> Self {
        Self {
            response: TURN_APOLOGY.to_string(),
            user_message: user_message.to_string(),
            used_memories: Vec::new(),
            memory_context: String::new(),
            extracted_memory_ids: Vec::new(),
            session_id: session_id.map(str::to_string),
            timestamp: chrono::Utc::now().to_rfc3339(),
            error: Some(error.to_string()),
        }
    }
}

/// Per-turn knobs taken from configuration.
#[derive(Debug, Clone)]
pub struct TurnSettings {
    pub chat_model: String,
    pub sampling: SamplingOptions,
    pub history_window: usize,
    pub search_limit: usize,
    pub recent_limit: usize,
    pub similarity_threshold: Option<f32>,
    pub memory_enabled: bool,
    pub turn_timeout: Duration,
}

impl TurnSettings {
    pub fn from_config(config: &MnemosConfig) -> Self {
        Self {
            chat_model: config.ollama.chat_model.clone(),
            sampling: SamplingOptions {
                temperature: Some(config.ollama.temperature),
                top_p: Some(config.ollama.top_p),
                num_predict: Some(config.ollama.num_predict),
            },
            history_window: config.agent.history_window,
            search_limit: config.memory.search_limit,
            recent_limit: config.memory.recent_limit,
            similarity_threshold: config.memory.similarity_threshold,
            memory_enabled: config.memory.enabled,
            turn_timeout: Duration::from_secs(config.agent.turn_timeout_secs),
        }
    }
}

/// Owns the memory store, the classifier, and the live sessions.
pub struct ConversationOrchestrator {
    store: Arc<MemoryStore>,
    classifier: Arc<Classifier>,
    extractor: MemoryExtractor,
    gateway: Arc<dyn ProviderAdapter>,
    sessions: SessionRegistry,
    persona: String,
    settings: TurnSettings,
}

impl ConversationOrchestrator {
    /// Wires the pipeline from configuration.
    ///
    /// Every gateway and vector index call made on a turn is bounded by
    /// `agent.turn_timeout_secs`. Categories from `[classification]` are
    /// registered on top of the built-in ones.
    pub async fn new(
        config: &MnemosConfig,
        store: MemoryStore,
        gateway: Arc<dyn ProviderAdapter>,
    ) -> Self {
        let settings = TurnSettings::from_config(config);
        let timeout = settings.turn_timeout;

        let classifier = Classifier::new(
            gateway.clone(),
            config.ollama.classification_model(),
            config.ollama.chat_model.clone(),
        )
        .with_timeout(timeout);
        for category in &config.classification.categories {
            classifier
                .add_custom_category(Category::from(category.clone()))
                .await;
        }

        let extractor = MemoryExtractor::new(
            config.memory.extraction_mode,
            ExtractionHeuristic::new(config.memory.min_utterance_chars),
            gateway.clone(),
            config.ollama.chat_model.clone(),
        )
        .with_timeout(timeout);

        let persona = load_system_prompt(&config.agent).await;

        info!(
            chat_model = %settings.chat_model,
            backends = %store.backend_label(),
            extraction = ?config.memory.extraction_mode,
            "conversation orchestrator ready"
        );

        Self {
            store: Arc::new(store.with_vector_timeout(timeout)),
            classifier: Arc::new(classifier),
            extractor,
            gateway,
            sessions: SessionRegistry::new(config.agent.max_session_turns),
            persona,
            settings,
        }
    }

    /// The memory store.
    pub fn store(&self) -> &Arc<MemoryStore> {
        &self.store
    }

    /// The category classifier.
    pub fn classifier(&self) -> &Arc<Classifier> {
        &self.classifier
    }

    /// Runs one conversation turn. Never fails.
    ///
    /// Without a session id the turn has no history and is not recorded.
    /// With `use_memory` off nothing is recalled, but the user's message
    /// still goes through extraction. With memory disabled in config nothing
    /// is recalled or stored.
    pub async fn respond(
        &self,
        message: &str,
        user_id: &str,
        session_id: Option<&str>,
        use_memory: bool,
    ) -> ChatResult {
        match self.run_turn(message, user_id, session_id, use_memory).await {
            Ok(result) => result,
            Err(e) => {
                error!(user_id, session_id, error = %e, "conversation turn failed");
                ChatResult::failed(message, session_id, &e)
            }
        }
    }

    async fn run_turn(
        &self,
        message: &str,
        user_id: &str,
        session_id: Option<&str>,
        use_memory: bool,
    ) -> Result<ChatResult, MnemosError> {
        if message.trim().is_empty() {
            return Err(MnemosError::InvalidInput("message is empty".to_string()));
        }
        let recall = use_memory && self.settings.memory_enabled;

        let (relevant, recent) = if recall {
            let relevant = self
                .store
                .search(
                    message,
                    user_id,
                    self.settings.search_limit,
                    self.settings.similarity_threshold,
                )
                .await;
            let recent = self.store.get_all(user_id, self.settings.recent_limit).await;
            (relevant, recent)
        } else {
            (Vec::new(), Vec::new())
        };

        let memory_context = build_memory_context(&recent, &relevant);
        let history = match session_id {
            Some(id) => self.sessions.recent(id, self.settings.history_window).await,
            None => Vec::new(),
        };
        let messages = compose_messages(&self.persona, &memory_context, history, message);

        let response = self.generate_reply(messages).await;

        let extracted_memory_ids = if self.settings.memory_enabled {
            self.remember_from_turn(message, &response, user_id).await
        } else {
            Vec::new()
        };

        if let Some(id) = session_id {
            self.sessions
                .append(
                    id,
                    [ChatMessage::user(message), ChatMessage::assistant(&response)],
                )
                .await;
        }

        debug!(
            user_id,
            recalled = relevant.len(),
            extracted = extracted_memory_ids.len(),
            "turn complete"
        );

        Ok(ChatResult {
            response,
            user_message: message.to_string(),
            used_memories: relevant
                .iter()
                .take(REPORTED_MEMORIES)
                .map(UsedMemory::from)
                .collect(),
            memory_context: memory_context.chars().take(CONTEXT_SNIPPET_CHARS).collect(),
            extracted_memory_ids,
            session_id: session_id.map(str::to_string),
            timestamp: chrono::Utc::now().to_rfc3339(),
            error: None,
        })
    }

    /// Asks the gateway for a reply; any failure becomes the apology text.
    async fn generate_reply(&self, messages: Vec<ChatMessage>) -> String {
        let request = ChatRequest {
            model: self.settings.chat_model.clone(),
            messages,
            options: self.settings.sampling.clone(),
        };

        match within(Some(self.settings.turn_timeout), self.gateway.chat(request)).await {
            Ok(response) if !response.content.trim().is_empty() => response.content.trim().to_string(),
            Ok(_) => {
                warn!("gateway returned an empty reply");
                GATEWAY_APOLOGY.to_string()
            }
            Err(e) => {
                warn!(error = %e, "gateway chat failed");
                GATEWAY_APOLOGY.to_string()
            }
        }
    }

    async fn remember_from_turn(&self, message: &str, reply: &str, user_id: &str) -> Vec<String> {
        let mut ids = Vec::new();
        for text in self.extractor.candidates(message, reply).await {
            let category = self.classifier.classify(&text).await;
            let id = self
                .store
                .add(&text, user_id, conversation_metadata(&category))
                .await;
            debug!(id = %id, category = %category, "memory extracted from turn");
            ids.push(id);
        }
        ids
    }

    /// Stores a memory directly, classifying it unless a category is given.
    pub async fn add_memory(
        &self,
        text: &str,
        user_id: &str,
        category: Option<&str>,
        mut metadata: Metadata,
    ) -> String {
        let category = match category {
            Some(c) => c.to_string(),
            None => self.classifier.classify(text).await,
        };
        metadata.insert(keys::CATEGORY.to_string(), category.into());
        self.store.add(text, user_id, metadata).await
    }

    /// Forgets a session's history. Returns whether it existed.
    pub async fn clear_session(&self, session_id: &str) -> bool {
        self.sessions.clear(session_id).await
    }

    /// The retained turns of a session, oldest first.
    pub async fn session_history(&self, session_id: &str) -> Vec<ChatMessage> {
        self.sessions.history(session_id).await
    }
}
