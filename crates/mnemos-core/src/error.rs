// SPDX-FileCopyrightText: 2026 Mnemos Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Mnemos memory assistant.

use thiserror::Error;

/// The primary error type used across all Mnemos adapter traits and core operations.
///
/// Public memory and conversation operations never surface these to their
/// callers; they are logged and converted into a degraded result instead.
#[derive(Debug, Error)]
pub enum MnemosError {
    /// Configuration errors (invalid TOML, unreadable prompt file, bad values).
    #[error("configuration error: {0}")]
    Config(String),

    /// Local persistence errors (ledger I/O).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Language-model gateway errors (unreachable host, bad status, malformed body).
    #[error("provider error: {message}")]
    Provider {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Vector index errors (collection missing, embedding failure, malformed response).
    #[error("vector index error: {message}")]
    VectorIndex {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// JSON encoding or decoding failed.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Adapter health check failed.
    #[error("health check failed for {name}: {source}")]
    HealthCheckFailed {
        name: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Caller input rejected before any backend was touched.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Operation exceeded its deadline.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}
