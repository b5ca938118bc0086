// SPDX-FileCopyrightText: 2026 Mnemos Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wire types for the Ollama HTTP API.

use mnemos_core::{ChatMessage, SamplingOptions};
use serde::{Deserialize, Serialize};

/// Body of `POST /api/chat`.
#[derive(Debug, Clone, Serialize)]
pub struct ApiChatRequest<'a> {
    pub model: &'a str,
    pub messages: &'a [ChatMessage],
    pub stream: bool,
    pub options: &'a SamplingOptions,
}

/// Non-streaming reply of `POST /api/chat`.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiChatResponse {
    #[serde(default)]
    pub model: String,
    pub message: ApiChatMessage,
    #[serde(default)]
    pub prompt_eval_count: Option<u32>,
    #[serde(default)]
    pub eval_count: Option<u32>,
}

/// The assistant message inside a chat reply.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiChatMessage {
    #[serde(default)]
    pub role: String,
    pub content: String,
}

/// Body of `POST /api/generate`.
#[derive(Debug, Clone, Serialize)]
pub struct ApiGenerateRequest<'a> {
    pub model: &'a str,
    pub prompt: &'a str,
    pub stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<&'static str>,
    pub options: &'a SamplingOptions,
}

/// Non-streaming reply of `POST /api/generate`.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiGenerateResponse {
    #[serde(default)]
    pub model: String,
    pub response: String,
}

/// Body of `POST /api/embed`.
#[derive(Debug, Clone, Serialize)]
pub struct ApiEmbedRequest<'a> {
    pub model: &'a str,
    pub input: &'a [String],
}

/// Reply of `POST /api/embed`.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiEmbedResponse {
    pub embeddings: Vec<Vec<f32>>,
}

/// Reply of `GET /api/tags`.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiTagsResponse {
    #[serde(default)]
    pub models: Vec<ApiModelTag>,
}

/// One locally installed model.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiModelTag {
    pub name: String,
}

/// Error body returned by Ollama on non-2xx statuses.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorResponse {
    pub error: String,
}
