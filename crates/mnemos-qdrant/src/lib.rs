// SPDX-FileCopyrightText: 2026 Mnemos Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Qdrant vector index adapter for the Mnemos memory assistant.
//!
//! Memories of every user share one collection; each point carries the
//! record text, owner, and metadata as payload, and every read, list, and
//! delete is filtered on `user_id`. The collection is created lazily on the
//! first upsert, sized to the embedding model's output.

pub mod types;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use mnemos_config::model::VectorConfig;
use mnemos_core::error::MnemosError;
use mnemos_core::traits::{EmbeddingAdapter, PluginAdapter, VectorIndexAdapter};
use mnemos_core::types::{
    AdapterType, EmbeddingInput, HealthStatus, MemoryRecord, ScoredMemory,
};
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use tokio::sync::OnceCell;
use tracing::{debug, info};

use crate::types::{Envelope, PointPayload, ScoredPoint, ScrollResult, user_filter};

/// Qdrant-backed [`VectorIndexAdapter`].
pub struct QdrantIndex {
    client: reqwest::Client,
    base_url: String,
    collection: String,
    embedder: Arc<dyn EmbeddingAdapter>,
    collection_ready: OnceCell<()>,
}

impl QdrantIndex {
    /// Creates an index client from the `[vector]` config section.
    pub fn new(
        config: &VectorConfig,
        embedder: Arc<dyn EmbeddingAdapter>,
    ) -> Result<Self, MnemosError> {
        let mut headers = HeaderMap::new();
        if let Some(key) = config.api_key.as_deref().filter(|k| !k.is_empty()) {
            headers.insert(
                "api-key",
                HeaderValue::from_str(key).map_err(|e| {
                    MnemosError::Config(format!("invalid Qdrant API key header value: {e}"))
                })?,
            );
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| MnemosError::VectorIndex {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        info!(url = %config.url, collection = %config.collection, "Qdrant index initialized");

        Ok(Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
            collection: config.collection.clone(),
            embedder,
            collection_ready: OnceCell::new(),
        })
    }

    fn collection_url(&self, suffix: &str) -> String {
        format!("{}/collections/{}{suffix}", self.base_url, self.collection)
    }

    /// Sends a JSON request and decodes the `result` field of the reply.
    async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        url: String,
        body: Option<serde_json::Value>,
    ) -> Result<T, MnemosError> {
        let mut builder = self.client.request(method, &url);
        if let Some(body) = &body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(|e| MnemosError::VectorIndex {
            message: format!("Qdrant request failed: {e}"),
            source: Some(Box::new(e)),
        })?;

        let status = response.status();
        debug!(url = %url, status = %status, "Qdrant response received");

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MnemosError::VectorIndex {
                message: format!("Qdrant returned {status}: {body}"),
                source: None,
            });
        }

        let envelope: Envelope<T> = response.json().await.map_err(|e| MnemosError::VectorIndex {
            message: format!("malformed Qdrant response: {e}"),
            source: Some(Box::new(e)),
        })?;
        Ok(envelope.result)
    }

    async fn embed_one(&self, text: &str) -> Result<Vec<f32>, MnemosError> {
        let output = self
            .embedder
            .embed(EmbeddingInput {
                texts: vec![text.to_string()],
            })
            .await?;
        output
            .embeddings
            .into_iter()
            .next()
            .filter(|v| !v.is_empty())
            .ok_or_else(|| MnemosError::VectorIndex {
                message: "embedding adapter returned no vector".into(),
                source: None,
            })
    }

    /// Creates the collection if it does not exist yet.
    async fn ensure_collection(&self, dimensions: usize) -> Result<(), MnemosError> {
        self.collection_ready
            .get_or_try_init(|| async {
                let probe = self
                    .client
                    .get(self.collection_url(""))
                    .send()
                    .await
                    .map_err(|e| MnemosError::VectorIndex {
                        message: format!("Qdrant request failed: {e}"),
                        source: Some(Box::new(e)),
                    })?;

                if probe.status() == StatusCode::NOT_FOUND {
                    info!(collection = %self.collection, dimensions, "creating Qdrant collection");
                    let _: serde_json::Value = self
                        .request(
                            Method::PUT,
                            self.collection_url(""),
                            Some(serde_json::json!({
                                "vectors": {"size": dimensions, "distance": "Cosine"}
                            })),
                        )
                        .await?;
                } else if !probe.status().is_success() {
                    return Err(MnemosError::VectorIndex {
                        message: format!("Qdrant returned {} for collection probe", probe.status()),
                        source: None,
                    });
                }
                Ok::<(), MnemosError>(())
            })
            .await
            .map(|_| ())
    }
}

#[async_trait]
impl PluginAdapter for QdrantIndex {
    fn name(&self) -> &str {
        "qdrant"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::VectorIndex
    }

    async fn health_check(&self) -> Result<HealthStatus, MnemosError> {
        let response = match self.client.get(self.collection_url("")).send().await {
            Ok(r) => r,
            Err(e) => return Ok(HealthStatus::Unhealthy(format!("Qdrant unreachable: {e}"))),
        };

        Ok(match response.status() {
            s if s.is_success() => HealthStatus::Healthy,
            StatusCode::NOT_FOUND => HealthStatus::Degraded(format!(
                "collection `{}` not created yet",
                self.collection
            )),
            s => HealthStatus::Unhealthy(format!("Qdrant returned {s}")),
        })
    }

    async fn shutdown(&self) -> Result<(), MnemosError> {
        debug!("Qdrant index shutting down");
        Ok(())
    }
}

#[async_trait]
impl VectorIndexAdapter for QdrantIndex {
    async fn upsert(&self, record: &MemoryRecord) -> Result<(), MnemosError> {
        let vector = self.embed_one(&record.text).await?;
        self.ensure_collection(vector.len()).await?;

        let payload = PointPayload {
            text: record.text.clone(),
            user_id: record.user_id.clone(),
            metadata: record.metadata.clone(),
        };
        let _: serde_json::Value = self
            .request(
                Method::PUT,
                self.collection_url("/points?wait=true"),
                Some(serde_json::json!({
                    "points": [{"id": record.id, "vector": vector, "payload": payload}]
                })),
            )
            .await?;
        Ok(())
    }

    async fn search(
        &self,
        query: &str,
        user_id: &str,
        limit: usize,
        threshold: Option<f32>,
    ) -> Result<Vec<ScoredMemory>, MnemosError> {
        let vector = self.embed_one(query).await?;

        let mut body = serde_json::json!({
            "vector": vector,
            "limit": limit,
            "filter": user_filter(user_id),
            "with_payload": true,
        });
        if let Some(threshold) = threshold.filter(|t| *t > 0.0) {
            body["score_threshold"] = serde_json::json!(threshold);
        }

        let points: Vec<ScoredPoint> = self
            .request(Method::POST, self.collection_url("/points/search"), Some(body))
            .await?;

        Ok(points
            .into_iter()
            .filter_map(|point| {
                let score = point.score.unwrap_or(0.0);
                point
                    .into_record()
                    .filter(|record| record.user_id == user_id)
                    .map(|memory| ScoredMemory { memory, score })
            })
            .collect())
    }

    async fn list(&self, user_id: &str, limit: usize) -> Result<Vec<MemoryRecord>, MnemosError> {
        let result: ScrollResult = self
            .request(
                Method::POST,
                self.collection_url("/points/scroll"),
                Some(serde_json::json!({
                    "filter": user_filter(user_id),
                    "limit": limit,
                    "with_payload": true,
                    "with_vector": false,
                })),
            )
            .await?;

        Ok(result
            .points
            .into_iter()
            .filter_map(ScoredPoint::into_record)
            .filter(|record| record.user_id == user_id)
            .collect())
    }

    async fn delete(&self, id: &str, user_id: &str) -> Result<(), MnemosError> {
        let _: serde_json::Value = self
            .request(
                Method::POST,
                self.collection_url("/points/delete?wait=true"),
                Some(serde_json::json!({
                    "filter": {
                        "must": [
                            {"has_id": [id]},
                            {"key": "user_id", "match": {"value": user_id}}
                        ]
                    }
                })),
            )
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mnemos_core::Metadata;
    use mnemos_test_utils::MockEmbedder;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const ID: &str = "3f1c2b7a-9d8e-4f6a-b5c4-2e1d0f9a8b7c";

    fn index_for(server: &MockServer, api_key: Option<&str>) -> QdrantIndex {
        let config = VectorConfig {
            url: server.uri(),
            api_key: api_key.map(str::to_string),
            ..VectorConfig::default()
        };
        QdrantIndex::new(&config, Arc::new(MockEmbedder::new(4))).unwrap()
    }

    fn record() -> MemoryRecord {
        let mut metadata = Metadata::new();
        metadata.insert("category".into(), serde_json::json!("preferences"));
        MemoryRecord {
            id: ID.into(),
            text: "저는 커피를 좋아합니다".into(),
            user_id: "u1".into(),
            metadata,
        }
    }

    #[tokio::test]
    async fn upsert_creates_missing_collection_once() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/collections/memories"))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .and(path("/collections/memories"))
            .and(body_partial_json(serde_json::json!({
                "vectors": {"size": 4, "distance": "Cosine"}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "result": true, "status": "ok"
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .and(path("/collections/memories/points"))
            .and(body_partial_json(serde_json::json!({
                "points": [{"id": ID, "payload": {"user_id": "u1"}}]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "result": {"operation_id": 1, "status": "completed"}, "status": "ok"
            })))
            .expect(2)
            .mount(&server)
            .await;

        let index = index_for(&server, None);
        index.upsert(&record()).await.unwrap();
        index.upsert(&record()).await.unwrap();
    }

    #[tokio::test]
    async fn search_filters_by_user_and_maps_scores() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/collections/memories/points/search"))
            .and(body_partial_json(serde_json::json!({
                "limit": 5,
                "with_payload": true,
                "filter": {"must": [{"key": "user_id", "match": {"value": "u1"}}]}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "result": [
                    {"id": ID, "score": 0.91, "payload": {
                        "text": "저는 커피를 좋아합니다", "user_id": "u1",
                        "metadata": {"category": "preferences"}
                    }},
                    {"id": "other", "score": 0.5, "payload": {
                        "text": "leak", "user_id": "u2", "metadata": {}
                    }}
                ],
                "status": "ok"
            })))
            .mount(&server)
            .await;

        let index = index_for(&server, None);
        let hits = index.search("커피", "u1", 5, None).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].memory.id, ID);
        assert!((hits[0].score - 0.91).abs() < 1e-6);
    }

    #[tokio::test]
    async fn search_sends_positive_threshold_only() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/collections/memories/points/search"))
            .and(body_partial_json(serde_json::json!({"score_threshold": 0.5})))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "result": []
            })))
            .expect(1)
            .mount(&server)
            .await;

        let index = index_for(&server, None);
        let hits = index.search("q", "u1", 3, Some(0.5)).await.unwrap();
        assert!(hits.is_empty());
    }

    #[tokio::test]
    async fn missing_collection_is_an_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/collections/memories/points/scroll"))
            .respond_with(ResponseTemplate::new(404).set_body_string("Not found"))
            .mount(&server)
            .await;

        let index = index_for(&server, None);
        let err = index.list("u1", 10).await.unwrap_err();
        assert!(matches!(err, MnemosError::VectorIndex { .. }));
    }

    #[tokio::test]
    async fn list_returns_payload_records() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/collections/memories/points/scroll"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "result": {"points": [
                    {"id": ID, "payload": {"text": "a", "user_id": "u1", "metadata": {}}}
                ], "next_page_offset": null}
            })))
            .mount(&server)
            .await;

        let index = index_for(&server, None);
        let records = index.list("u1", 10).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].text, "a");
    }

    #[tokio::test]
    async fn delete_is_scoped_to_owner() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/collections/memories/points/delete"))
            .and(body_partial_json(serde_json::json!({
                "filter": {"must": [
                    {"has_id": [ID]},
                    {"key": "user_id", "match": {"value": "u1"}}
                ]}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "result": {"operation_id": 2, "status": "completed"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let index = index_for(&server, None);
        index.delete(ID, "u1").await.unwrap();
    }

    #[tokio::test]
    async fn api_key_header_is_sent() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/collections/memories"))
            .and(header("api-key", "secret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "result": {"status": "green"}
            })))
            .mount(&server)
            .await;

        let index = index_for(&server, Some("secret"));
        assert_eq!(index.health_check().await.unwrap(), HealthStatus::Healthy);
    }

    #[tokio::test]
    async fn health_check_degraded_without_collection() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/collections/memories"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let index = index_for(&server, None);
        assert!(matches!(
            index.health_check().await.unwrap(),
            HealthStatus::Degraded(_)
        ));
    }
}
