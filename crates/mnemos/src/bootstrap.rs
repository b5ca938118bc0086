// SPDX-FileCopyrightText: 2026 Mnemos Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Builds the adapter stack and orchestrator from configuration.

use std::sync::Arc;

use mnemos_agent::ConversationOrchestrator;
use mnemos_config::MnemosConfig;
use mnemos_core::error::MnemosError;
use mnemos_core::traits::{PluginAdapter, VectorIndexAdapter};
use mnemos_core::types::HealthStatus;
use mnemos_memory::{Ledger, MemoryStore};
use mnemos_ollama::OllamaProvider;
use mnemos_qdrant::QdrantIndex;
use tracing::{info, warn};

/// The Ollama gateway plus the vector index, when one is enabled and
/// reachable.
pub struct Adapters {
    pub gateway: Arc<OllamaProvider>,
    pub vector: Option<Arc<QdrantIndex>>,
}

/// Creates the adapters. An unreachable vector index is dropped with a
/// warning so the store runs on the ledger alone.
pub async fn build_adapters(config: &MnemosConfig) -> Result<Adapters, MnemosError> {
    let gateway = Arc::new(OllamaProvider::new(&config.ollama)?);

    let vector = if config.vector.enabled {
        match QdrantIndex::new(&config.vector, gateway.clone()) {
            Ok(index) => match index.health_check().await {
                Ok(HealthStatus::Unhealthy(reason)) => {
                    warn!(%reason, "vector index unavailable, using ledger only");
                    None
                }
                Err(e) => {
                    warn!(error = %e, "vector index unreachable, using ledger only");
                    None
                }
                Ok(_) => Some(Arc::new(index)),
            },
            Err(e) => {
                warn!(error = %e, "failed to create vector index client, using ledger only");
                None
            }
        }
    } else {
        info!("vector index disabled by configuration");
        None
    };

    Ok(Adapters { gateway, vector })
}

/// Builds a ready-to-use orchestrator.
pub async fn build_orchestrator(
    config: &MnemosConfig,
) -> Result<ConversationOrchestrator, MnemosError> {
    let adapters = build_adapters(config).await?;
    let ledger = Ledger::open(&config.memory.ledger_path).await?;
    let store = MemoryStore::new(
        ledger,
        adapters
            .vector
            .map(|index| index as Arc<dyn VectorIndexAdapter>),
    );
    Ok(ConversationOrchestrator::new(config, store, adapters.gateway).await)
}
