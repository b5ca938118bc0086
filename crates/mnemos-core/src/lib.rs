// SPDX-FileCopyrightText: 2026 Mnemos Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Mnemos memory assistant.
//!
//! This crate provides the trait definitions, error type, and shared types
//! used throughout the workspace. Every backend adapter implements traits
//! defined here.

pub mod error;
pub mod traits;
pub mod types;

pub use error::MnemosError;
pub use types::{
    AdapterType, ChatMessage, ChatRequest, ChatResponse, ChatRole, EmbeddingInput,
    EmbeddingOutput, GenerateRequest, GenerateResponse, HealthStatus, MemoryRecord, Metadata,
    SamplingOptions, ScoredMemory,
};

pub use traits::{EmbeddingAdapter, PluginAdapter, ProviderAdapter, VectorIndexAdapter};
