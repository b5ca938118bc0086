// SPDX-FileCopyrightText: 2026 Mnemos Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! JSON file ledger: the durable home of every memory record.
//!
//! The whole file maps `user_id` to that user's records in write order and is
//! rewritten on every mutation (temp file + rename). Mutations inside one
//! process are serialised by the state mutex; several processes sharing one
//! file still race, last writer wins.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use mnemos_core::{MemoryRecord, Metadata, MnemosError};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// One record as stored in the ledger file. The owner is the enclosing key.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct LedgerEntry {
    id: String,
    text: String,
    #[serde(default)]
    metadata: Metadata,
}

impl LedgerEntry {
    fn into_record(self, user_id: &str) -> MemoryRecord {
        MemoryRecord {
            id: self.id,
            text: self.text,
            user_id: user_id.to_string(),
            metadata: self.metadata,
        }
    }
}

type LedgerState = BTreeMap<String, Vec<LedgerEntry>>;

fn storage_err(e: impl std::error::Error + Send + Sync + 'static) -> MnemosError {
    MnemosError::Storage {
        source: Box::new(e),
    }
}

/// File-backed ledger with an in-memory copy of its contents.
pub struct Ledger {
    path: PathBuf,
    state: Mutex<LedgerState>,
}

impl Ledger {
    /// Open the ledger at `path`, creating parent directories as needed.
    ///
    /// A missing file is an empty ledger. An unreadable or corrupt file is
    /// moved aside to `<path>.corrupt` and the ledger starts empty.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, MnemosError> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(storage_err)?;
        }

        let state = match tokio::fs::read(&path).await {
            Ok(bytes) => match serde_json::from_slice::<LedgerState>(&bytes) {
                Ok(state) => state,
                Err(e) => {
                    let backup = sibling(&path, "corrupt");
                    warn!(
                        path = %path.display(),
                        backup = %backup.display(),
                        error = %e,
                        "ledger is not valid JSON, starting empty"
                    );
                    tokio::fs::rename(&path, &backup).await.map_err(storage_err)?;
                    LedgerState::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => LedgerState::new(),
            Err(e) => return Err(storage_err(e)),
        };

        debug!(
            path = %path.display(),
            users = state.len(),
            "ledger opened"
        );

        Ok(Self {
            path,
            state: Mutex::new(state),
        })
    }

    /// Location of the ledger file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append a record to its owner's list and rewrite the file.
    ///
    /// The record stays in the in-memory copy even when the rewrite fails,
    /// so it is persisted by the next successful write.
    pub async fn append(&self, record: &MemoryRecord) -> Result<(), MnemosError> {
        let mut state = self.state.lock().await;
        state
            .entry(record.user_id.clone())
            .or_default()
            .push(LedgerEntry {
                id: record.id.clone(),
                text: record.text.clone(),
                metadata: record.metadata.clone(),
            });
        persist(&self.path, &state).await
    }

    /// All records of one user, in write order.
    pub async fn records(&self, user_id: &str) -> Vec<MemoryRecord> {
        let state = self.state.lock().await;
        state
            .get(user_id)
            .map(|entries| {
                entries
                    .iter()
                    .cloned()
                    .map(|e| e.into_record(user_id))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Remove a record. Returns `Ok(false)` without touching the file when
    /// the user has no record with that id.
    ///
    /// If the rewrite fails the removal is rolled back.
    pub async fn remove(&self, id: &str, user_id: &str) -> Result<bool, MnemosError> {
        let mut state = self.state.lock().await;
        let Some(entries) = state.get_mut(user_id) else {
            return Ok(false);
        };
        let Some(index) = entries.iter().position(|e| e.id == id) else {
            return Ok(false);
        };

        let removed = entries.remove(index);
        if let Err(e) = persist(&self.path, &state).await {
            if let Some(entries) = state.get_mut(user_id) {
                entries.insert(index, removed);
            }
            return Err(e);
        }
        Ok(true)
    }

    /// Number of users with at least one record.
    pub async fn user_count(&self) -> usize {
        self.state
            .lock()
            .await
            .values()
            .filter(|entries| !entries.is_empty())
            .count()
    }
}

fn sibling(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(format!(".{suffix}"));
    path.with_file_name(name)
}

/// Rewrite the whole ledger: pretty JSON (two-space indent, UTF-8 kept as is)
/// into a temp file, then rename over the original.
async fn persist(path: &Path, state: &LedgerState) -> Result<(), MnemosError> {
    let bytes = serde_json::to_vec_pretty(state)
        .map_err(|e| MnemosError::Serialization(format!("failed to encode ledger: {e}")))?;
    let temp = sibling(path, "tmp");
    tokio::fs::write(&temp, &bytes).await.map_err(storage_err)?;
    tokio::fs::rename(&temp, path).await.map_err(storage_err)?;
    debug!(path = %path.display(), bytes = bytes.len(), "ledger written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, user: &str, text: &str) -> MemoryRecord {
        let mut metadata = Metadata::new();
        metadata.insert("category".into(), "preferences".into());
        MemoryRecord {
            id: id.into(),
            text: text.into(),
            user_id: user.into(),
            metadata,
        }
    }

    #[tokio::test]
    async fn missing_file_opens_empty() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = Ledger::open(dir.path().join("nested/ledger.json")).await.unwrap();
        assert!(ledger.records("u1").await.is_empty());
        assert_eq!(ledger.user_count().await, 0);
    }

    #[tokio::test]
    async fn append_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.json");

        let ledger = Ledger::open(&path).await.unwrap();
        ledger.append(&record("a", "u1", "첫 번째")).await.unwrap();
        ledger.append(&record("b", "u1", "두 번째")).await.unwrap();
        ledger.append(&record("c", "u2", "other user")).await.unwrap();
        drop(ledger);

        let reopened = Ledger::open(&path).await.unwrap();
        let texts: Vec<String> = reopened
            .records("u1")
            .await
            .into_iter()
            .map(|r| r.text)
            .collect();
        assert_eq!(texts, vec!["첫 번째", "두 번째"]);
        assert_eq!(reopened.records("u2").await.len(), 1);
        assert_eq!(reopened.user_count().await, 2);
    }

    #[tokio::test]
    async fn file_layout_maps_users_to_entries() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.json");
        let ledger = Ledger::open(&path).await.unwrap();
        ledger.append(&record("a", "u1", "저는 커피를 좋아합니다")).await.unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.contains("저는 커피를 좋아합니다"), "non-ASCII must be kept verbatim");
        assert!(raw.contains("\n  \"u1\""), "two-space indent expected: {raw}");

        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        let entry = &value["u1"][0];
        assert_eq!(entry["id"], "a");
        assert_eq!(entry["metadata"]["category"], "preferences");
        assert!(entry.get("user_id").is_none());
    }

    #[tokio::test]
    async fn remove_unknown_id_leaves_file_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.json");
        let ledger = Ledger::open(&path).await.unwrap();
        ledger.append(&record("a", "u1", "x")).await.unwrap();
        let before = std::fs::read(&path).unwrap();
        let modified = std::fs::metadata(&path).unwrap().modified().unwrap();

        assert!(!ledger.remove("missing", "u1").await.unwrap());
        assert!(!ledger.remove("a", "someone-else").await.unwrap());

        assert_eq!(std::fs::read(&path).unwrap(), before);
        assert_eq!(std::fs::metadata(&path).unwrap().modified().unwrap(), modified);
    }

    #[tokio::test]
    async fn remove_existing_id_rewrites_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.json");
        let ledger = Ledger::open(&path).await.unwrap();
        ledger.append(&record("a", "u1", "x")).await.unwrap();
        ledger.append(&record("b", "u1", "y")).await.unwrap();

        assert!(ledger.remove("a", "u1").await.unwrap());
        drop(ledger);

        let reopened = Ledger::open(&path).await.unwrap();
        let ids: Vec<String> = reopened.records("u1").await.into_iter().map(|r| r.id).collect();
        assert_eq!(ids, vec!["b"]);
    }

    #[tokio::test]
    async fn corrupt_file_is_moved_aside() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.json");
        std::fs::write(&path, "{not json").unwrap();

        let ledger = Ledger::open(&path).await.unwrap();
        assert!(ledger.records("u1").await.is_empty());
        assert!(dir.path().join("ledger.json.corrupt").exists());
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn reads_entries_without_metadata() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.json");
        std::fs::write(&path, r#"{"u1": [{"id": "legacy", "text": "옛 기록"}]}"#).unwrap();

        let ledger = Ledger::open(&path).await.unwrap();
        let records = ledger.records("u1").await;
        assert_eq!(records[0].id, "legacy");
        assert_eq!(records[0].user_id, "u1");
        assert!(records[0].metadata.is_empty());
    }

    #[tokio::test]
    async fn concurrent_appends_are_not_lost() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.json");
        let ledger = std::sync::Arc::new(Ledger::open(&path).await.unwrap());

        let mut handles = Vec::new();
        for i in 0..20 {
            let ledger = ledger.clone();
            handles.push(tokio::spawn(async move {
                let user = if i % 2 == 0 { "even" } else { "odd" };
                ledger
                    .append(&record(&format!("id-{i}"), user, "t"))
                    .await
                    .unwrap();
            }));
        }
        for h in handles {
            h.await.unwrap();
        }
        drop(ledger);

        let reopened = Ledger::open(&path).await.unwrap();
        assert_eq!(reopened.records("even").await.len(), 10);
        assert_eq!(reopened.records("odd").await.len(), 10);
    }
}
