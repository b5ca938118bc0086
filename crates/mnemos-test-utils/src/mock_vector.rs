// SPDX-FileCopyrightText: 2026 Mnemos Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory vector index with a failure switch.
//!
//! Similarity is approximated by token overlap so tests stay deterministic
//! without an embedding model.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use mnemos_core::traits::{PluginAdapter, VectorIndexAdapter};
use mnemos_core::types::{AdapterType, HealthStatus, MemoryRecord, ScoredMemory};
use mnemos_core::MnemosError;

/// A mock [`VectorIndexAdapter`] keeping records in insertion order.
#[derive(Default)]
pub struct MockVectorIndex {
    records: Mutex<Vec<MemoryRecord>>,
    failing: AtomicBool,
    delay: Mutex<Option<Duration>>,
    searches: AtomicUsize,
}

impl MockVectorIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent call fail.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Sleep this long before answering each call.
    pub async fn set_delay(&self, delay: Duration) {
        *self.delay.lock().await = Some(delay);
    }

    /// Drop every stored record.
    pub async fn clear(&self) {
        self.records.lock().await.clear();
    }

    /// Number of stored records across all users.
    pub async fn len(&self) -> usize {
        self.records.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Number of search calls received, failed ones included.
    pub async fn search_count(&self) -> usize {
        self.searches.load(Ordering::SeqCst)
    }

    async fn gate(&self) -> Result<(), MnemosError> {
        let delay = *self.delay.lock().await;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.failing.load(Ordering::SeqCst) {
            return Err(MnemosError::VectorIndex {
                message: "mock vector index is failing".to_string(),
                source: None,
            });
        }
        Ok(())
    }
}

/// 0.9 for a substring match, otherwise 0.8 times the share of query tokens
/// found in the text.
fn similarity(query: &str, text: &str) -> f32 {
    let query = query.to_lowercase();
    let text = text.to_lowercase();
    if text.contains(&query) {
        return 0.9;
    }
    let terms: HashSet<&str> = query.split_whitespace().collect();
    if terms.is_empty() {
        return 0.0;
    }
    let found = terms.iter().filter(|t| text.contains(*t)).count();
    0.8 * found as f32 / terms.len() as f32
}

#[async_trait]
impl PluginAdapter for MockVectorIndex {
    fn name(&self) -> &str {
        "mock-vector"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::VectorIndex
    }

    async fn health_check(&self) -> Result<HealthStatus, MnemosError> {
        if self.failing.load(Ordering::SeqCst) {
            Ok(HealthStatus::Unhealthy("mock vector index is failing".to_string()))
        } else {
            Ok(HealthStatus::Healthy)
        }
    }

    async fn shutdown(&self) -> Result<(), MnemosError> {
        Ok(())
    }
}

#[async_trait]
impl VectorIndexAdapter for MockVectorIndex {
    async fn upsert(&self, record: &MemoryRecord) -> Result<(), MnemosError> {
        self.gate().await?;
        let mut records = self.records.lock().await;
        match records.iter_mut().find(|r| r.id == record.id) {
            Some(existing) => *existing = record.clone(),
            None => records.push(record.clone()),
        }
        Ok(())
    }

    async fn search(
        &self,
        query: &str,
        user_id: &str,
        limit: usize,
        threshold: Option<f32>,
    ) -> Result<Vec<ScoredMemory>, MnemosError> {
        self.searches.fetch_add(1, Ordering::SeqCst);
        self.gate().await?;

        let threshold = threshold.filter(|t| *t > 0.0).unwrap_or(0.0);
        let mut hits: Vec<ScoredMemory> = self
            .records
            .lock()
            .await
            .iter()
            .filter(|r| r.user_id == user_id)
            .map(|r| ScoredMemory {
                score: similarity(query, &r.text),
                memory: r.clone(),
            })
            .filter(|hit| hit.score > 0.0 && hit.score >= threshold)
            .collect();
        hits.sort_by(|a, b| b.score.total_cmp(&a.score));
        hits.truncate(limit);
        Ok(hits)
    }

    async fn list(&self, user_id: &str, limit: usize) -> Result<Vec<MemoryRecord>, MnemosError> {
        self.gate().await?;
        Ok(self
            .records
            .lock()
            .await
            .iter()
            .filter(|r| r.user_id == user_id)
            .take(limit)
            .cloned()
            .collect())
    }

    async fn delete(&self, id: &str, user_id: &str) -> Result<(), MnemosError> {
        self.gate().await?;
        self.records
            .lock()
            .await
            .retain(|r| !(r.id == id && r.user_id == user_id));
        Ok(())
    }
}
