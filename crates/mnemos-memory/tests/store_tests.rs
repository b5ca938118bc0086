// SPDX-FileCopyrightText: 2026 Mnemos Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the dual-backend memory store.

use std::sync::Arc;

use mnemos_core::{MemoryRecord, Metadata, VectorIndexAdapter};
use mnemos_memory::{Classifier, Ledger, MemoryStore, conversation_metadata};
use mnemos_test_utils::{MockGateway, MockVectorIndex};

async fn store_with_index(path: &std::path::Path) -> (MemoryStore, Arc<MockVectorIndex>) {
    let index = Arc::new(MockVectorIndex::new());
    let ledger = Ledger::open(path).await.unwrap();
    let store = MemoryStore::new(ledger, Some(index.clone() as Arc<dyn VectorIndexAdapter>));
    (store, index)
}

#[tokio::test]
async fn writes_survive_a_failing_vector_index() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("local_memories.json");

    let id = {
        let (store, index) = store_with_index(&path).await;
        index.set_failing(true);
        store.add("저는 김치찌개를 좋아해요", "u1", Metadata::new()).await
    };

    let reopened = Ledger::open(&path).await.unwrap();
    let records = reopened.records("u1").await;
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].id, id);
    assert_eq!(records[0].text, "저는 김치찌개를 좋아해요");
}

#[tokio::test]
async fn ledger_file_keeps_hangul_verbatim() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("local_memories.json");
    let store = MemoryStore::new(Ledger::open(&path).await.unwrap(), None);

    store.add("서울에 살아요", "u1", Metadata::new()).await;

    let raw = std::fs::read_to_string(&path).unwrap();
    assert!(raw.contains("서울에 살아요"));
    assert!(raw.contains("\n  \"u1\""));
}

#[tokio::test]
async fn get_all_merges_without_duplicates() {
    let dir = tempfile::tempdir().unwrap();
    let (store, index) = store_with_index(&dir.path().join("m.json")).await;

    let shared = store.add("indexed fact", "u1", Metadata::new()).await;
    let ledger_only = MemoryRecord {
        id: "ledger-only".into(),
        text: "ledger fact".into(),
        user_id: "u1".into(),
        metadata: Metadata::new(),
    };
    store.ledger().append(&ledger_only).await.unwrap();

    assert_eq!(index.len().await, 1);
    let ids: Vec<_> = store
        .get_all("u1", 10)
        .await
        .into_iter()
        .map(|r| r.id)
        .collect();
    assert_eq!(ids, [shared, "ledger-only".to_string()]);
}

#[tokio::test]
async fn get_all_survives_index_failure() {
    let dir = tempfile::tempdir().unwrap();
    let (store, index) = store_with_index(&dir.path().join("m.json")).await;
    store.add("one", "u1", Metadata::new()).await;
    store.add("two", "u1", Metadata::new()).await;
    index.set_failing(true);

    assert_eq!(store.get_all("u1", 10).await.len(), 2);
}

#[tokio::test]
async fn delete_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let (store, index) = store_with_index(&dir.path().join("m.json")).await;
    let id = store.add("forget me", "u1", Metadata::new()).await;

    assert!(store.delete(&id, "u1").await);
    assert!(!store.delete(&id, "u1").await);
    assert!(store.get_all("u1", 10).await.is_empty());
    assert_eq!(index.len().await, 0);
}

#[tokio::test]
async fn delete_reports_ledger_outcome_even_if_index_fails() {
    let dir = tempfile::tempdir().unwrap();
    let (store, index) = store_with_index(&dir.path().join("m.json")).await;
    let id = store.add("forget me", "u1", Metadata::new()).await;
    index.set_failing(true);

    assert!(store.delete(&id, "u1").await);
}

#[tokio::test]
async fn vector_hits_take_priority_over_lexical() {
    let dir = tempfile::tempdir().unwrap();
    let (store, index) = store_with_index(&dir.path().join("m.json")).await;
    store.add("커피를 좋아한다", "u1", Metadata::new()).await;

    let hits = store.search("커피", "u1", 5, None).await;
    assert_eq!(hits.len(), 1);
    assert!(index.search_count().await >= 1);
}

#[tokio::test]
async fn caller_metadata_wins_over_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let store = MemoryStore::new(Ledger::open(dir.path().join("m.json")).await.unwrap(), None);

    let mut metadata = conversation_metadata("health");
    metadata.insert("mood".into(), "good".into());
    let id = store.add("매일 운동해요", "u1", metadata).await;

    let record = store.get_by_id(&id, "u1").await.unwrap();
    assert_eq!(record.category(), "health");
    assert_eq!(record.meta_str("source"), Some("conversation"));
    assert_eq!(record.metadata["auto_extracted"], serde_json::json!(true));
    assert_eq!(record.meta_str("mood"), Some("good"));
}

#[tokio::test]
async fn keyword_classification_makes_no_gateway_call() {
    let gateway = Arc::new(MockGateway::new());
    let classifier = Classifier::new(gateway.clone(), "small", "large");

    assert_eq!(classifier.classify("가족과 주말에 만났어요").await, "relationships");
    assert_eq!(classifier.classify("요즘 스트레스가 많아요").await, "emotions");
    assert_eq!(gateway.call_count().await, 0);
}

#[tokio::test]
async fn concurrent_adds_are_all_persisted() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("m.json");
    let store = Arc::new(MemoryStore::new(Ledger::open(&path).await.unwrap(), None));

    let mut handles = Vec::new();
    for i in 0..16 {
        let store = store.clone();
        handles.push(tokio::spawn(async move {
            store.add(&format!("fact {i}"), "u1", Metadata::new()).await
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    let reopened = Ledger::open(&path).await.unwrap();
    assert_eq!(reopened.records("u1").await.len(), 16);
}
