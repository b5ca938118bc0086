// SPDX-FileCopyrightText: 2026 Mnemos Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Provider adapter trait for the language-model gateway.

use async_trait::async_trait;

use crate::error::MnemosError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{ChatRequest, ChatResponse, GenerateRequest, GenerateResponse};

/// Adapter for the language-model gateway.
///
/// The gateway is an unreliable remote dependency: callers are expected to
/// degrade gracefully when either call fails.
#[async_trait]
pub trait ProviderAdapter: PluginAdapter {
    /// Sends a role-tagged message list and returns the assistant reply.
    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse, MnemosError>;

    /// Sends a single prompt and returns the generated text.
    async fn generate(&self, request: GenerateRequest) -> Result<GenerateResponse, MnemosError>;
}
