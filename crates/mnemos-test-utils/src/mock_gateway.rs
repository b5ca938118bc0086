// SPDX-FileCopyrightText: 2026 Mnemos Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock language-model gateway for deterministic testing.
//!
//! `MockGateway` implements `ProviderAdapter` with a FIFO of canned replies
//! shared by `chat` and `generate`, records every request, and can be
//! switched into a failing or slow mode.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use mnemos_core::traits::{PluginAdapter, ProviderAdapter};
use mnemos_core::types::{
    AdapterType, ChatRequest, ChatResponse, GenerateRequest, GenerateResponse, HealthStatus,
};
use mnemos_core::MnemosError;

/// Reply used when the queue is empty.
pub const DEFAULT_REPLY: &str = "mock response";

/// A mock gateway that returns pre-configured replies.
#[derive(Default)]
pub struct MockGateway {
    responses: Mutex<VecDeque<String>>,
    chat_requests: Mutex<Vec<ChatRequest>>,
    generate_requests: Mutex<Vec<GenerateRequest>>,
    failing: AtomicBool,
    delay: Mutex<Option<Duration>>,
}

impl MockGateway {
    /// Create a gateway with an empty reply queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a gateway pre-loaded with replies, consumed in order.
    pub fn with_responses(responses: Vec<String>) -> Self {
        Self {
            responses: Mutex::new(VecDeque::from(responses)),
            ..Self::default()
        }
    }

    /// Queue another reply.
    pub async fn add_response(&self, text: impl Into<String>) {
        self.responses.lock().await.push_back(text.into());
    }

    /// Make every subsequent call fail with a provider error.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Sleep this long before answering each call.
    pub async fn set_delay(&self, delay: Duration) {
        *self.delay.lock().await = Some(delay);
    }

    /// Chat requests received so far.
    pub async fn chat_requests(&self) -> Vec<ChatRequest> {
        self.chat_requests.lock().await.clone()
    }

    /// Generate requests received so far.
    pub async fn generate_requests(&self) -> Vec<GenerateRequest> {
        self.generate_requests.lock().await.clone()
    }

    /// Total number of chat and generate calls.
    pub async fn call_count(&self) -> usize {
        self.chat_requests.lock().await.len() + self.generate_requests.lock().await.len()
    }

    async fn next_reply(&self) -> Result<String, MnemosError> {
        let delay = *self.delay.lock().await;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.failing.load(Ordering::SeqCst) {
            return Err(MnemosError::Provider {
                message: "mock gateway is failing".to_string(),
                source: None,
            });
        }
        Ok(self
            .responses
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| DEFAULT_REPLY.to_string()))
    }
}

#[async_trait]
impl PluginAdapter for MockGateway {
    fn name(&self) -> &str {
        "mock-gateway"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Provider
    }

    async fn health_check(&self) -> Result<HealthStatus, MnemosError> {
        if self.failing.load(Ordering::SeqCst) {
            Ok(HealthStatus::Unhealthy("mock gateway is failing".to_string()))
        } else {
            Ok(HealthStatus::Healthy)
        }
    }

    async fn shutdown(&self) -> Result<(), MnemosError> {
        Ok(())
    }
}

#[async_trait]
impl ProviderAdapter for MockGateway {
    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse, MnemosError> {
        let model = request.model.clone();
        self.chat_requests.lock().await.push(request);
        let content = self.next_reply().await?;
        Ok(ChatResponse {
            content,
            model,
            prompt_tokens: Some(10),
            completion_tokens: Some(20),
        })
    }

    async fn generate(&self, request: GenerateRequest) -> Result<GenerateResponse, MnemosError> {
        let model = request.model.clone();
        self.generate_requests.lock().await.push(request);
        let text = self.next_reply().await?;
        Ok(GenerateResponse { text, model })
    }
}
