// SPDX-FileCopyrightText: 2026 Mnemos Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Two-stage degradation: try a primary stage, fall back to a secondary one.
//!
//! The primary stage may produce a value, produce nothing useful, or fail.
//! The secondary stage is infallible and runs in the last two cases. Search
//! (vector, then lexical) and classification (keywords, then gateway) are
//! both expressed this way.

use std::future::Future;
use std::time::Duration;

use mnemos_core::MnemosError;
use tracing::{debug, warn};

/// Which stage produced a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    Primary,
    Secondary,
}

/// A value together with the stage that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolved<T> {
    pub value: T,
    pub tier: Tier,
}

/// Run `primary`; if it fails or returns `None`, run `secondary`.
///
/// Primary failures are logged at `warn`, empty results at `debug`.
pub async fn first_usable<T, P, PF, S, SF>(
    operation: &'static str,
    primary: P,
    secondary: S,
) -> Resolved<T>
where
    P: FnOnce() -> PF,
    PF: Future<Output = Result<Option<T>, MnemosError>>,
    S: FnOnce() -> SF,
    SF: Future<Output = T>,
{
    match primary().await {
        Ok(Some(value)) => {
            return Resolved {
                value,
                tier: Tier::Primary,
            };
        }
        Ok(None) => debug!(operation, "primary stage had no result, using fallback"),
        Err(e) => warn!(operation, error = %e, "primary stage failed, using fallback"),
    }

    Resolved {
        value: secondary().await,
        tier: Tier::Secondary,
    }
}

/// `None` for an empty vector, so an empty primary result triggers the fallback.
pub fn non_empty<T>(values: Vec<T>) -> Option<Vec<T>> {
    if values.is_empty() { None } else { Some(values) }
}

/// Bound a fallible call by an optional deadline. Running over becomes
/// [`MnemosError::Timeout`].
pub async fn within<T>(
    deadline: Option<Duration>,
    call: impl Future<Output = Result<T, MnemosError>>,
) -> Result<T, MnemosError> {
    match deadline {
        Some(duration) => tokio::time::timeout(duration, call)
            .await
            .map_err(|_| MnemosError::Timeout { duration })?,
        None => call.await,
    }
}
