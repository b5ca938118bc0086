// SPDX-FileCopyrightText: 2026 Mnemos Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end conversation tests.
//!
//! `TestHarness` assembles a complete orchestrator over a temp ledger, a
//! mock gateway, and optionally a mock vector index.

use std::sync::Arc;

use mnemos_agent::{ChatResult, ConversationOrchestrator};
use mnemos_config::MnemosConfig;
use mnemos_core::traits::VectorIndexAdapter;
use mnemos_core::MnemosError;
use mnemos_memory::{Ledger, MemoryStore};

use crate::mock_gateway::MockGateway;
use crate::mock_vector::MockVectorIndex;

/// User id used by [`TestHarness::send`].
pub const TEST_USER: &str = "test-user";

/// Session id used by [`TestHarness::send`].
pub const TEST_SESSION: &str = "test-session";

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    responses: Vec<String>,
    with_vector_index: bool,
    config: MnemosConfig,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            responses: Vec::new(),
            with_vector_index: false,
            config: MnemosConfig::default(),
        }
    }

    /// Queue gateway replies, consumed in call order.
    pub fn with_mock_responses(mut self, responses: Vec<String>) -> Self {
        self.responses = responses;
        self
    }

    /// Back the store with a [`MockVectorIndex`].
    pub fn with_vector_index(mut self) -> Self {
        self.with_vector_index = true;
        self
    }

    /// Adjust the configuration before the harness is built. The ledger
    /// path is always replaced by one inside the harness temp directory.
    pub fn with_config(mut self, edit: impl FnOnce(&mut MnemosConfig)) -> Self {
        edit(&mut self.config);
        self
    }

    /// Build the harness.
    pub async fn build(self) -> Result<TestHarness, MnemosError> {
        let temp_dir =
            tempfile::TempDir::new().map_err(|e| MnemosError::Storage { source: e.into() })?;
        let ledger_path = temp_dir.path().join("local_memories.json");

        let mut config = self.config;
        config.memory.ledger_path = ledger_path.to_string_lossy().into_owned();

        let gateway = Arc::new(MockGateway::with_responses(self.responses));
        let vector = self.with_vector_index.then(|| Arc::new(MockVectorIndex::new()));

        let ledger = Ledger::open(&ledger_path).await?;
        let store = MemoryStore::new(
            ledger,
            vector
                .clone()
                .map(|index| index as Arc<dyn VectorIndexAdapter>),
        );
        let orchestrator =
            Arc::new(ConversationOrchestrator::new(&config, store, gateway.clone()).await);

        Ok(TestHarness {
            orchestrator,
            gateway,
            vector,
            config,
            _temp_dir: temp_dir,
        })
    }
}

/// A complete test environment with mock adapters and a temp ledger.
pub struct TestHarness {
    /// The orchestrator under test.
    pub orchestrator: Arc<ConversationOrchestrator>,
    /// The mock gateway.
    pub gateway: Arc<MockGateway>,
    /// The mock vector index, when enabled.
    pub vector: Option<Arc<MockVectorIndex>>,
    /// Effective configuration.
    pub config: MnemosConfig,
    /// Temp directory kept alive for cleanup on drop.
    _temp_dir: tempfile::TempDir,
}

impl TestHarness {
    /// Create a new builder for configuring the test harness.
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// Send a message as [`TEST_USER`] in [`TEST_SESSION`] with memory on.
    pub async fn send(&self, message: &str) -> ChatResult {
        self.orchestrator
            .respond(message, TEST_USER, Some(TEST_SESSION), true)
            .await
    }

    /// Path of the ledger file.
    pub fn ledger_path(&self) -> &str {
        &self.config.memory.ledger_path
    }
}
