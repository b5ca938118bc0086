// SPDX-FileCopyrightText: 2026 Mnemos Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Vector index adapter trait for semantic memory search.

use async_trait::async_trait;

use crate::error::MnemosError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{MemoryRecord, ScoredMemory};

/// Adapter for an embedding-backed similarity index.
///
/// The index is an optional accelerant. Every operation is scoped by
/// `user_id` and no record from one user may be returned for another.
#[async_trait]
pub trait VectorIndexAdapter: PluginAdapter {
    /// Inserts or replaces a record, keyed by its id.
    async fn upsert(&self, record: &MemoryRecord) -> Result<(), MnemosError>;

    /// Returns up to `limit` records most similar to `query`, best first.
    async fn search(
        &self,
        query: &str,
        user_id: &str,
        limit: usize,
        threshold: Option<f32>,
    ) -> Result<Vec<ScoredMemory>, MnemosError>;

    /// Returns up to `limit` records for the user in the index's natural order.
    async fn list(&self, user_id: &str, limit: usize) -> Result<Vec<MemoryRecord>, MnemosError>;

    /// Removes a record. Removing an unknown id is not an error.
    async fn delete(&self, id: &str, user_id: &str) -> Result<(), MnemosError>;
}
