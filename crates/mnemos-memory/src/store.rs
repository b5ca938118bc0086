// SPDX-FileCopyrightText: 2026 Mnemos Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Dual-backend memory store.
//!
//! The ledger is the source of truth and is always written first. The
//! vector index, when configured, is an accelerant: its failures are logged
//! and the store falls back to lexical search over the ledger. No public
//! operation here returns an error to the caller.

use std::collections::HashSet;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use mnemos_core::error::MnemosError;
use mnemos_core::traits::VectorIndexAdapter;
use mnemos_core::types::{MemoryRecord, Metadata, ScoredMemory};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::ledger::Ledger;
use crate::lexical;
use crate::strategy::{first_usable, non_empty, within, Tier};
use crate::types::{complete_metadata, MemoryStatistics};

const LEDGER_ONLY_LABEL: &str = "Ledger only";

/// Upper bound for whole-space scans (lookup by id, statistics).
const SCAN_LIMIT: usize = 10_000;

/// Persistent per-user memory store.
pub struct MemoryStore {
    ledger: Ledger,
    vector: Option<Arc<dyn VectorIndexAdapter>>,
    vector_timeout: Option<Duration>,
}

impl MemoryStore {
    /// Creates a store over an opened ledger and an optional vector index.
    pub fn new(ledger: Ledger, vector: Option<Arc<dyn VectorIndexAdapter>>) -> Self {
        match &vector {
            Some(index) => info!(index = index.name(), "memory store using ledger and vector index"),
            None => info!("memory store using ledger only"),
        }
        Self {
            ledger,
            vector,
            vector_timeout: None,
        }
    }

    /// Bounds every vector index call by `timeout`. A call that runs over is
    /// treated as a failed call.
    pub fn with_vector_timeout(mut self, timeout: Duration) -> Self {
        self.vector_timeout = Some(timeout);
        self
    }

    /// The ledger backing this store.
    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// Whether a vector index is configured.
    pub fn has_vector_index(&self) -> bool {
        self.vector.is_some()
    }

    /// Stores a new memory and returns its id.
    ///
    /// Missing metadata keys are filled with defaults. The record is
    /// appended to the ledger first; a vector index failure is logged and
    /// ignored. A ledger write failure is logged too: the record is kept in
    /// memory and persisted by the next successful write.
    pub async fn add(&self, text: &str, user_id: &str, metadata: Metadata) -> String {
        let now = chrono::Utc::now().to_rfc3339();
        let record = MemoryRecord {
            id: Uuid::new_v4().to_string(),
            text: text.to_string(),
            user_id: user_id.to_string(),
            metadata: complete_metadata(metadata, &now),
        };

        if let Err(e) = self.ledger.append(&record).await {
            error!(id = %record.id, error = %e, "failed to persist memory to ledger");
        }

        if let Some(index) = &self.vector
            && let Err(e) = self.bounded(index.upsert(&record)).await
        {
            warn!(id = %record.id, error = %e, "vector index upsert failed, ledger copy kept");
        }

        debug!(id = %record.id, user_id, category = record.category(), "memory added");
        record.id
    }

    /// Returns up to `limit` memories relevant to `query`, best first.
    ///
    /// The vector index is tried first. When it is absent, fails, or finds
    /// nothing, the ledger is ranked lexically instead.
    pub async fn search(
        &self,
        query: &str,
        user_id: &str,
        limit: usize,
        threshold: Option<f32>,
    ) -> Vec<ScoredMemory> {
        let resolved = first_usable(
            "memory search",
            || async {
                let Some(index) = &self.vector else {
                    return Ok(None);
                };
                let hits = self
                    .bounded(index.search(query, user_id, limit, threshold))
                    .await?;
                Ok(non_empty(hits))
            },
            || async {
                let records = self.ledger.records(user_id).await;
                lexical::rank(query, records, limit, threshold)
            },
        )
        .await;

        debug!(
            user_id,
            results = resolved.value.len(),
            lexical = resolved.tier == Tier::Secondary,
            "memory search complete"
        );
        resolved.value
    }

    /// Returns up to `limit` memories of a user.
    ///
    /// Vector records come first in the index's order, followed by ledger
    /// records the index does not know about, in write order.
    pub async fn get_all(&self, user_id: &str, limit: usize) -> Vec<MemoryRecord> {
        let mut merged = match &self.vector {
            Some(index) => match self.bounded(index.list(user_id, limit)).await {
                Ok(records) => records,
                Err(e) => {
                    warn!(user_id, error = %e, "vector index list failed, using ledger");
                    Vec::new()
                }
            },
            None => Vec::new(),
        };

        let mut seen: HashSet<String> = merged.iter().map(|m| m.id.clone()).collect();
        for record in self.ledger.records(user_id).await {
            if merged.len() >= limit {
                break;
            }
            if seen.insert(record.id.clone()) {
                merged.push(record);
            }
        }

        merged.truncate(limit);
        merged
    }

    /// Looks a memory up by id within a user's space.
    pub async fn get_by_id(&self, id: &str, user_id: &str) -> Option<MemoryRecord> {
        self.get_all(user_id, SCAN_LIMIT)
            .await
            .into_iter()
            .find(|r| r.id == id)
    }

    /// Memories similar to an existing one, excluding the memory itself.
    pub async fn related(&self, id: &str, user_id: &str, limit: usize) -> Vec<ScoredMemory> {
        let Some(anchor) = self.get_by_id(id, user_id).await else {
            return Vec::new();
        };

        let mut hits = self
            .search(&anchor.text, user_id, limit.saturating_add(1), None)
            .await;
        hits.retain(|hit| hit.memory.id != anchor.id);
        hits.truncate(limit);
        hits
    }

    /// Deletes a memory. Returns `true` iff the ledger held it.
    ///
    /// The vector copy is removed best-effort; deleting an unknown id is a
    /// no-op that returns `false`.
    pub async fn delete(&self, id: &str, user_id: &str) -> bool {
        if let Some(index) = &self.vector
            && let Err(e) = self.bounded(index.delete(id, user_id)).await
        {
            warn!(id, user_id, error = %e, "vector index delete failed");
        }

        match self.ledger.remove(id, user_id).await {
            Ok(removed) => {
                debug!(id, user_id, removed, "memory delete");
                removed
            }
            Err(e) => {
                error!(id, user_id, error = %e, "failed to persist ledger after delete");
                false
            }
        }
    }

    /// Summary of a user's memory space.
    pub async fn statistics(&self, user_id: &str) -> MemoryStatistics {
        let records = self.get_all(user_id, SCAN_LIMIT).await;
        MemoryStatistics::from_records(&records, &self.backend_label())
    }

    /// Describes which backends are active.
    pub fn backend_label(&self) -> String {
        match &self.vector {
            Some(index) => format!("Ledger + {}", display_name(index.name())),
            None => LEDGER_ONLY_LABEL.to_string(),
        }
    }

    async fn bounded<T>(
        &self,
        call: impl Future<Output = Result<T, MnemosError>>,
    ) -> Result<T, MnemosError> {
        within(self.vector_timeout, call).await
    }
}

fn display_name(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
