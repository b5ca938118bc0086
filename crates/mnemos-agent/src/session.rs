// SPDX-FileCopyrightText: 2026 Mnemos Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory conversation sessions.
//!
//! A session is the ordered list of turns exchanged under one session id.
//! Sessions live only as long as the process and are capped at a fixed
//! number of turns; the oldest turns are dropped first.

use std::collections::HashMap;

use mnemos_core::types::ChatMessage;
use tokio::sync::RwLock;
use tracing::debug;

/// All live sessions, keyed by session id.
pub struct SessionRegistry {
    sessions: RwLock<HashMap<String, Vec<ChatMessage>>>,
    max_turns: usize,
}

impl SessionRegistry {
    /// Creates an empty registry keeping at most `max_turns` per session.
    pub fn new(max_turns: usize) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            max_turns,
        }
    }

    /// Appends turns to a session, creating it if needed, then trims it.
    pub async fn append(&self, session_id: &str, turns: impl IntoIterator<Item = ChatMessage>) {
        let mut sessions = self.sessions.write().await;
        let history = sessions.entry(session_id.to_string()).or_default();
        history.extend(turns);

        if history.len() > self.max_turns {
            let excess = history.len() - self.max_turns;
            history.drain(..excess);
            debug!(session_id, dropped = excess, "session trimmed");
        }
    }

    /// The last `n` turns of a session, oldest first.
    pub async fn recent(&self, session_id: &str, n: usize) -> Vec<ChatMessage> {
        let sessions = self.sessions.read().await;
        sessions
            .get(session_id)
            .map(|history| history[history.len().saturating_sub(n)..].to_vec())
            .unwrap_or_default()
    }

    /// Every retained turn of a session.
    pub async fn history(&self, session_id: &str) -> Vec<ChatMessage> {
        self.sessions
            .read()
            .await
            .get(session_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Forgets a session. Returns whether it existed.
    pub async fn clear(&self, session_id: &str) -> bool {
        self.sessions.write().await.remove(session_id).is_some()
    }

    /// Number of live sessions.
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
