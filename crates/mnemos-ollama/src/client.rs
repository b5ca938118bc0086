// SPDX-FileCopyrightText: 2026 Mnemos Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the Ollama REST API.
//!
//! Provides [`OllamaClient`] which handles request construction, JSON
//! decoding, and transient error retry for the chat, generate, and embed
//! endpoints.

use std::time::Duration;

use mnemos_core::MnemosError;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::types::{ApiErrorResponse, ApiTagsResponse};

/// Delay between a transient failure and the retry.
const RETRY_DELAY: Duration = Duration::from_millis(500);

/// HTTP client for Ollama API communication.
///
/// Manages connection pooling, the request timeout, and retry logic for
/// transient statuses (429, 500, 502, 503).
#[derive(Debug, Clone)]
pub struct OllamaClient {
    client: reqwest::Client,
    base_url: String,
    max_retries: u32,
}

impl OllamaClient {
    /// Creates a new client for the Ollama server at `base_url`.
    pub fn new(base_url: &str, timeout: Duration, max_retries: u32) -> Result<Self, MnemosError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| MnemosError::Provider {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            max_retries,
        })
    }

    /// Returns the server base URL, without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// POSTs `body` as JSON to `endpoint` and decodes the JSON reply.
    ///
    /// On transient statuses the request is retried up to `max_retries` times.
    pub async fn post_json<B, R>(&self, endpoint: &str, body: &B) -> Result<R, MnemosError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let url = format!("{}{endpoint}", self.base_url);
        let mut last_error = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                warn!(endpoint, attempt, "retrying Ollama request after transient error");
                tokio::time::sleep(RETRY_DELAY).await;
            }

            let response = self
                .client
                .post(&url)
                .json(body)
                .send()
                .await
                .map_err(|e| MnemosError::Provider {
                    message: format!("HTTP request to {endpoint} failed: {e}"),
                    source: Some(Box::new(e)),
                })?;

            let status = response.status();
            debug!(endpoint, status = %status, attempt, "Ollama response received");

            if status.is_success() {
                let text = response.text().await.map_err(|e| MnemosError::Provider {
                    message: format!("failed to read response body: {e}"),
                    source: Some(Box::new(e)),
                })?;
                return serde_json::from_str(&text).map_err(|e| MnemosError::Provider {
                    message: format!("malformed response from {endpoint}: {e}"),
                    source: Some(Box::new(e)),
                });
            }

            let body = response.text().await.unwrap_or_default();
            let error = MnemosError::Provider {
                message: describe_error(status, &body),
                source: None,
            };

            if is_transient_error(status) && attempt < self.max_retries {
                warn!(endpoint, status = %status, "transient error, will retry");
                last_error = Some(error);
                continue;
            }
            return Err(error);
        }

        Err(last_error.unwrap_or_else(|| MnemosError::Provider {
            message: format!("request to {endpoint} failed after retries"),
            source: None,
        }))
    }

    /// Lists locally installed model names (`GET /api/tags`).
    pub async fn list_models(&self) -> Result<Vec<String>, MnemosError> {
        let response = self
            .client
            .get(format!("{}/api/tags", self.base_url))
            .send()
            .await
            .map_err(|e| MnemosError::Provider {
                message: format!("Ollama is unreachable at {}: {e}", self.base_url),
                source: Some(Box::new(e)),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MnemosError::Provider {
                message: describe_error(status, &body),
                source: None,
            });
        }

        let tags: ApiTagsResponse = response.json().await.map_err(|e| MnemosError::Provider {
            message: format!("malformed response from /api/tags: {e}"),
            source: Some(Box::new(e)),
        })?;
        Ok(tags.models.into_iter().map(|m| m.name).collect())
    }
}

fn describe_error(status: reqwest::StatusCode, body: &str) -> String {
    match serde_json::from_str::<ApiErrorResponse>(body) {
        Ok(api_err) => format!("Ollama error ({status}): {}", api_err.error),
        Err(_) => format!("Ollama returned {status}: {body}"),
    }
}

/// Returns true for HTTP status codes that indicate transient errors worth retrying.
fn is_transient_error(status: reqwest::StatusCode) -> bool {
    matches!(status.as_u16(), 429 | 500 | 502 | 503)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ApiGenerateResponse;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_client(base_url: &str) -> OllamaClient {
        OllamaClient::new(base_url, Duration::from_secs(5), 1).unwrap()
    }

    fn generate_body() -> serde_json::Value {
        serde_json::json!({"model": "qwen2.5:3b", "prompt": "hi", "stream": false})
    }

    #[tokio::test]
    async fn post_json_decodes_success() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .and(body_partial_json(serde_json::json!({"stream": false})))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "model": "qwen2.5:3b",
                "response": "preferences",
                "done": true
            })))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let reply: ApiGenerateResponse = client
            .post_json("/api/generate", &generate_body())
            .await
            .unwrap();
        assert_eq!(reply.response, "preferences");
    }

    #[tokio::test]
    async fn post_json_retries_on_503() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .respond_with(ResponseTemplate::new(503).set_body_json(serde_json::json!({
                "error": "server busy"
            })))
            .up_to_n_times(1)
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "response": "after retry"
            })))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let reply: ApiGenerateResponse = client
            .post_json("/api/generate", &generate_body())
            .await
            .unwrap();
        assert_eq!(reply.response, "after retry");
    }

    #[tokio::test]
    async fn post_json_fails_on_404_with_ollama_message() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
                "error": "model 'nope' not found"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let err = client
            .post_json::<_, ApiGenerateResponse>("/api/generate", &generate_body())
            .await
            .unwrap_err()
            .to_string();
        assert!(err.contains("model 'nope' not found"), "got: {err}");
    }

    #[tokio::test]
    async fn post_json_exhausts_retries_on_500() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .expect(2)
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let err = client
            .post_json::<_, ApiGenerateResponse>("/api/generate", &generate_body())
            .await
            .unwrap_err()
            .to_string();
        assert!(err.contains("boom"), "got: {err}");
    }

    #[tokio::test]
    async fn malformed_body_is_a_provider_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let err = client
            .post_json::<_, ApiGenerateResponse>("/api/generate", &generate_body())
            .await
            .unwrap_err();
        assert!(matches!(err, MnemosError::Provider { .. }));
    }

    #[tokio::test]
    async fn list_models_reads_tags() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/tags"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "models": [{"name": "qwen2.5:7b"}, {"name": "nomic-embed-text:latest"}]
            })))
            .mount(&server)
            .await;

        let client = test_client(&format!("{}/", server.uri()));
        let models = client.list_models().await.unwrap();
        assert_eq!(models, vec!["qwen2.5:7b", "nomic-embed-text:latest"]);
    }

    #[tokio::test]
    async fn unreachable_server_is_a_provider_error() {
        let client = test_client("http://127.0.0.1:9");
        let err = client.list_models().await.unwrap_err();
        assert!(matches!(err, MnemosError::Provider { .. }));
    }
}
