// SPDX-FileCopyrightText: 2026 Mnemos Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Mnemos integration tests.
//!
//! Provides mock adapters and a test harness for fast, deterministic tests
//! without a running Ollama or Qdrant.
//!
//! # Components
//!
//! - [`MockGateway`] - Mock language-model gateway with queued replies
//! - [`MockVectorIndex`] - In-memory vector index with a failure switch
//! - [`MockEmbedder`] - Deterministic embedding adapter
//! - [`TestHarness`] - Orchestrator over a temp ledger and the mocks

pub mod harness;
pub mod mock_embedder;
pub mod mock_gateway;
pub mod mock_vector;

pub use harness::TestHarness;
pub use mock_embedder::MockEmbedder;
pub use mock_gateway::MockGateway;
pub use mock_vector::MockVectorIndex;
