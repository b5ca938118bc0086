// SPDX-FileCopyrightText: 2026 Mnemos Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ollama gateway adapter for the Mnemos memory assistant.
//!
//! This crate implements [`ProviderAdapter`] (chat and single-prompt
//! generation) and [`EmbeddingAdapter`] for a local or remote Ollama server.

pub mod client;
pub mod types;

use std::time::Duration;

use async_trait::async_trait;
use mnemos_config::model::OllamaConfig;
use mnemos_core::error::MnemosError;
use mnemos_core::traits::{EmbeddingAdapter, PluginAdapter, ProviderAdapter};
use mnemos_core::types::{
    AdapterType, ChatRequest, ChatResponse, EmbeddingInput, EmbeddingOutput, GenerateRequest,
    GenerateResponse, HealthStatus,
};
use tracing::{debug, info};

use crate::client::OllamaClient;
use crate::types::{
    ApiChatRequest, ApiChatResponse, ApiEmbedRequest, ApiEmbedResponse, ApiGenerateRequest,
    ApiGenerateResponse,
};

/// Ollama gateway implementing [`ProviderAdapter`] and [`EmbeddingAdapter`].
///
/// Requests carry their own model name; the configured chat and embedding
/// models are only used for embeddings and the health check.
pub struct OllamaProvider {
    client: OllamaClient,
    chat_model: String,
    embedding_model: String,
}

impl OllamaProvider {
    /// Creates a provider from the `[ollama]` config section.
    pub fn new(config: &OllamaConfig) -> Result<Self, MnemosError> {
        let client = OllamaClient::new(
            &config.base_url,
            Duration::from_secs(config.timeout_secs),
            config.max_retries,
        )?;

        info!(
            base_url = %client.base_url(),
            chat_model = %config.chat_model,
            embedding_model = %config.embedding_model,
            "Ollama provider initialized"
        );

        Ok(Self {
            client,
            chat_model: config.chat_model.clone(),
            embedding_model: config.embedding_model.clone(),
        })
    }
}

/// Whether an installed tag satisfies a configured model name.
/// Ollama reports untagged pulls as `name:latest`.
fn model_installed(installed: &[String], wanted: &str) -> bool {
    installed
        .iter()
        .any(|name| name == wanted || name.strip_suffix(":latest") == Some(wanted))
}

#[async_trait]
impl PluginAdapter for OllamaProvider {
    fn name(&self) -> &str {
        "ollama"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Provider
    }

    async fn health_check(&self) -> Result<HealthStatus, MnemosError> {
        let installed = match self.client.list_models().await {
            Ok(models) => models,
            Err(e) => return Ok(HealthStatus::Unhealthy(e.to_string())),
        };

        let missing: Vec<&str> = [self.chat_model.as_str(), self.embedding_model.as_str()]
            .into_iter()
            .filter(|m| !model_installed(&installed, m))
            .collect();

        if missing.is_empty() {
            Ok(HealthStatus::Healthy)
        } else {
            Ok(HealthStatus::Degraded(format!(
                "models not pulled: {}",
                missing.join(", ")
            )))
        }
    }

    async fn shutdown(&self) -> Result<(), MnemosError> {
        debug!("Ollama provider shutting down");
        Ok(())
    }
}

#[async_trait]
impl ProviderAdapter for OllamaProvider {
    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse, MnemosError> {
        let body = ApiChatRequest {
            model: &request.model,
            messages: &request.messages,
            stream: false,
            options: &request.options,
        };
        let reply: ApiChatResponse = self.client.post_json("/api/chat", &body).await?;

        Ok(ChatResponse {
            content: reply.message.content,
            model: if reply.model.is_empty() {
                request.model
            } else {
                reply.model
            },
            prompt_tokens: reply.prompt_eval_count,
            completion_tokens: reply.eval_count,
        })
    }

    async fn generate(&self, request: GenerateRequest) -> Result<GenerateResponse, MnemosError> {
        let body = ApiGenerateRequest {
            model: &request.model,
            prompt: &request.prompt,
            stream: false,
            format: request.json.then_some("json"),
            options: &request.options,
        };
        let reply: ApiGenerateResponse = self.client.post_json("/api/generate", &body).await?;

        Ok(GenerateResponse {
            text: reply.response,
            model: request.model,
        })
    }
}

#[async_trait]
impl EmbeddingAdapter for OllamaProvider {
    async fn embed(&self, input: EmbeddingInput) -> Result<EmbeddingOutput, MnemosError> {
        let body = ApiEmbedRequest {
            model: &self.embedding_model,
            input: &input.texts,
        };
        let reply: ApiEmbedResponse = self.client.post_json("/api/embed", &body).await?;

        if reply.embeddings.len() != input.texts.len() {
            return Err(MnemosError::Provider {
                message: format!(
                    "expected {} embeddings, got {}",
                    input.texts.len(),
                    reply.embeddings.len()
                ),
                source: None,
            });
        }

        let dimensions = reply.embeddings.first().map(Vec::len).unwrap_or(0);
        Ok(EmbeddingOutput {
            embeddings: reply.embeddings,
            dimensions,
        })
    }
}
