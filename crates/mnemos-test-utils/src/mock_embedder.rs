// SPDX-FileCopyrightText: 2026 Mnemos Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Deterministic embedding adapter.

use async_trait::async_trait;

use mnemos_core::traits::{EmbeddingAdapter, PluginAdapter};
use mnemos_core::types::{AdapterType, EmbeddingInput, EmbeddingOutput, HealthStatus};
use mnemos_core::MnemosError;

/// Embeds text by folding its bytes into a fixed number of buckets and
/// normalising. Equal texts always get equal vectors.
pub struct MockEmbedder {
    dimensions: usize,
}

impl MockEmbedder {
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions: dimensions.max(1),
        }
    }

    fn embed_one(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimensions];
        for (i, byte) in text.bytes().enumerate() {
            vector[i % self.dimensions] += f32::from(byte);
        }
        let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            vector.iter_mut().for_each(|v| *v /= norm);
        }
        vector
    }
}

#[async_trait]
impl PluginAdapter for MockEmbedder {
    fn name(&self) -> &str {
        "mock-embedder"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Embedding
    }

    async fn health_check(&self) -> Result<HealthStatus, MnemosError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), MnemosError> {
        Ok(())
    }
}

#[async_trait]
impl EmbeddingAdapter for MockEmbedder {
    async fn embed(&self, input: EmbeddingInput) -> Result<EmbeddingOutput, MnemosError> {
        Ok(EmbeddingOutput {
            embeddings: input.texts.iter().map(|t| self.embed_one(t)).collect(),
            dimensions: self.dimensions,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn embeddings_are_deterministic_and_unit_length() {
        let embedder = MockEmbedder::new(4);
        let output = embedder
            .embed(EmbeddingInput {
                texts: vec!["hello".into(), "hello".into()],
            })
            .await
            .unwrap();
        assert_eq!(output.dimensions, 4);
        assert_eq!(output.embeddings[0], output.embeddings[1]);
        let norm: f32 = output.embeddings[0].iter().map(|v| v * v).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
    }
}
