// SPDX-FileCopyrightText: 2026 Mnemos Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Memory domain types and metadata conventions.

use std::collections::BTreeMap;

use mnemos_core::{MemoryRecord, Metadata};
use serde::{Deserialize, Serialize};

/// Category assigned when nothing better is known.
pub const UNCATEGORIZED: &str = "uncategorized";

/// Metadata keys every record carries.
pub mod keys {
    pub const CATEGORY: &str = "category";
    pub const TIMESTAMP: &str = "timestamp";
    pub const SOURCE: &str = "source";
    pub const AUTO_EXTRACTED: &str = "auto_extracted";
    /// Id of the record a newer record supersedes.
    pub const REPLACES: &str = "replaces";
}

/// How a memory entered the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemorySource {
    /// Added directly by the user or an application.
    Manual,
    /// Extracted from a conversation turn.
    Conversation,
}

impl MemorySource {
    /// Convert to the string stored in metadata.
    pub fn as_str(&self) -> &'static str {
        match self {
            MemorySource::Manual => "manual",
            MemorySource::Conversation => "conversation",
        }
    }
}

/// Fill in the metadata keys a caller did not provide.
///
/// Caller-supplied values always win; extra keys are kept verbatim.
pub fn complete_metadata(mut metadata: Metadata, now: &str) -> Metadata {
    let defaults = [
        (keys::CATEGORY, serde_json::Value::from(UNCATEGORIZED)),
        (keys::TIMESTAMP, serde_json::Value::from(now)),
        (keys::SOURCE, serde_json::Value::from(MemorySource::Manual.as_str())),
        (keys::AUTO_EXTRACTED, serde_json::Value::from(false)),
    ];
    for (key, value) in defaults {
        metadata.entry(key).or_insert(value);
    }
    metadata
}

/// Metadata for a memory extracted from conversation.
pub fn conversation_metadata(category: &str) -> Metadata {
    let mut metadata = Metadata::new();
    metadata.insert(keys::CATEGORY.into(), category.into());
    metadata.insert(
        keys::SOURCE.into(),
        MemorySource::Conversation.as_str().into(),
    );
    metadata.insert(keys::AUTO_EXTRACTED.into(), true.into());
    metadata
}

/// Summary of one user's memory space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryStatistics {
    /// Number of records.
    pub total: usize,
    /// Record count per category label.
    pub category_counts: BTreeMap<String, usize>,
    /// Most recent write timestamp, if any record carries one.
    pub last_updated: Option<String>,
    /// Human-readable description of the active backends.
    pub backend_label: String,
}

impl MemoryStatistics {
    /// Derive statistics from a list of records.
    pub fn from_records(records: &[MemoryRecord], backend_label: &str) -> Self {
        let mut category_counts = BTreeMap::new();
        for record in records {
            *category_counts
                .entry(record.category().to_string())
                .or_insert(0) += 1;
        }

        Self {
            total: records.len(),
            category_counts,
            last_updated: latest_timestamp(records),
            backend_label: backend_label.to_string(),
        }
    }
}

/// Most recent timestamp, comparing parsed instants where possible.
fn latest_timestamp(records: &[MemoryRecord]) -> Option<String> {
    records
        .iter()
        .filter_map(|r| r.timestamp())
        .max_by_key(|ts| (chrono::DateTime::parse_from_rfc3339(ts).ok(), *ts))
        .map(str::to_string)
}
