// SPDX-FileCopyrightText: 2026 Mnemos Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wire types for the Qdrant REST API.

use mnemos_core::{MemoryRecord, Metadata};
use serde::{Deserialize, Serialize};

/// Standard Qdrant response envelope.
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    pub result: T,
}

/// Payload stored with every point; enough to rebuild a [`MemoryRecord`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PointPayload {
    pub text: String,
    pub user_id: String,
    #[serde(default)]
    pub metadata: Metadata,
}

/// A point as returned by search (`score` set) or scroll (`score` absent).
#[derive(Debug, Deserialize)]
pub struct ScoredPoint {
    pub id: serde_json::Value,
    #[serde(default)]
    pub score: Option<f32>,
    #[serde(default)]
    pub payload: Option<PointPayload>,
}

impl ScoredPoint {
    /// Rebuilds the memory record, or `None` when the payload is missing.
    pub fn into_record(self) -> Option<MemoryRecord> {
        let payload = self.payload?;
        let id = match self.id {
            serde_json::Value::String(s) => s,
            other => other.to_string(),
        };
        Some(MemoryRecord {
            id,
            text: payload.text,
            user_id: payload.user_id,
            metadata: payload.metadata,
        })
    }
}

/// `result` of a scroll request.
#[derive(Debug, Deserialize)]
pub struct ScrollResult {
    pub points: Vec<ScoredPoint>,
}

/// Filter restricting a request to one user's points.
pub fn user_filter(user_id: &str) -> serde_json::Value {
    serde_json::json!({
        "must": [{"key": "user_id", "match": {"value": user_id}}]
    })
}
