// SPDX-FileCopyrightText: 2026 Mnemos Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Long-term memory for the Mnemos assistant.
//!
//! ## Architecture
//!
//! - **Ledger**: JSON file of every user's records, rewritten atomically
//! - **MemoryStore**: ledger first, optional vector index as accelerant
//! - **lexical**: substring and token-overlap ranking used when the index
//!   is unavailable
//! - **strategy**: the primary/fallback helper shared by search and
//!   classification
//! - **Classifier**: keyword-first category labelling, entity and
//!   sentiment prompts
//! - **MemoryExtractor**: picks what to remember from a conversation turn
//! - **Types**: metadata keys, `MemorySource`, `MemoryStatistics`

pub mod classifier;
pub mod extractor;
pub mod ledger;
pub mod lexical;
pub mod store;
pub mod strategy;
pub mod types;

pub use classifier::{Category, Classifier, Entities, Sentiment, default_categories};
pub use extractor::{ExtractionHeuristic, MemoryExtractor};
pub use ledger::Ledger;
pub use store::MemoryStore;
pub use types::*;
