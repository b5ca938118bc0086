// SPDX-FileCopyrightText: 2026 Mnemos Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation orchestration for the Mnemos memory assistant.
//!
//! The [`ConversationOrchestrator`] runs each chat turn through recall,
//! context assembly, generation, extraction, and session bookkeeping.

pub mod context;
pub mod orchestrator;
pub mod prompts;
pub mod session;

pub use orchestrator::{ChatResult, ConversationOrchestrator, TurnSettings, UsedMemory};
pub use session::SessionRegistry;
