// SPDX-FileCopyrightText: 2026 Mnemos Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Prompt assembly for a conversation turn.
//!
//! Loads the persona, condenses recalled memories into a sectioned context
//! block, and lays out the message list sent to the gateway.

use mnemos_config::model::AgentConfig;
use mnemos_core::types::{ChatMessage, MemoryRecord, ScoredMemory};
use tracing::{info, warn};

use crate::prompts::{DEFAULT_PERSONA, memory_context_message};

const MAX_PREFERENCES: usize = 3;
const MAX_EXPERIENCES: usize = 2;
const MAX_RELEVANT: usize = 3;

/// Loads the persona prompt following config priority: file > inline > default.
pub async fn load_system_prompt(config: &AgentConfig) -> String {
    if let Some(path) = config.system_prompt_file.as_deref() {
        match tokio::fs::read_to_string(path).await {
            Ok(content) if !content.trim().is_empty() => {
                info!(path, "loaded system prompt from file");
                return content.trim().to_string();
            }
            Ok(_) => warn!(path, "system prompt file is empty, falling back"),
            Err(e) => warn!(path, error = %e, "failed to read system prompt file, falling back"),
        }
    }

    match config.system_prompt.as_deref() {
        Some(prompt) if !prompt.trim().is_empty() => prompt.to_string(),
        _ => DEFAULT_PERSONA.to_string(),
    }
}

/// Identity slot a memory fills, judged from cue words.
fn identity_slot(lowered: &str) -> Option<&'static str> {
    if lowered.contains("이름") || lowered.contains("name") {
        Some("name")
    } else if lowered.contains("나이") || lowered.contains("age") || lowered.contains("살") {
        Some("age")
    } else if lowered.contains("직업") || lowered.contains("job") || lowered.contains("일") {
        Some("job")
    } else {
        None
    }
}

fn is_preference(lowered: &str) -> bool {
    ["좋아", "싫어", "prefer"].iter().any(|cue| lowered.contains(cue))
}

fn is_experience(record: &MemoryRecord, lowered: &str) -> bool {
    record.category() == "experiences" || lowered.contains("경험") || lowered.contains("했")
}

/// Builds the memory context block.
///
/// Identity facts keep one text per slot (the last one seen wins, in the
/// slot's first position). Preferences and experiences keep the first
/// matches. Relevant matches are the top search results. Empty groups are
/// omitted; no memories at all yields an empty string.
pub fn build_memory_context(all: &[MemoryRecord], relevant: &[ScoredMemory]) -> String {
    let mut identity: Vec<(&'static str, &str)> = Vec::new();
    let mut preferences = Vec::new();
    let mut experiences = Vec::new();

    for record in all {
        let lowered = record.text.to_lowercase();

        if let Some(slot) = identity_slot(&lowered) {
            match identity.iter_mut().find(|(s, _)| *s == slot) {
                Some(entry) => entry.1 = &record.text,
                None => identity.push((slot, &record.text)),
            }
        }
        if is_preference(&lowered) {
            preferences.push(record.text.as_str());
        }
        if is_experience(record, &lowered) {
            experiences.push(record.text.as_str());
        }
    }

    let mut lines: Vec<String> = Vec::new();
    let mut section = |header: &str, items: &mut dyn Iterator<Item = &str>| {
        let items: Vec<String> = items.map(|text| format!("- {text}")).collect();
        if items.is_empty() {
            return;
        }
        if lines.is_empty() {
            lines.push(header.to_string());
        } else {
            lines.push(format!("\n{header}"));
        }
        lines.extend(items);
    };

    section("=== 사용자 정보 ===", &mut identity.iter().map(|(_, text)| *text));
    section("=== 선호도 ===", &mut preferences.into_iter().take(MAX_PREFERENCES));
    section("=== 과거 경험 ===", &mut experiences.into_iter().take(MAX_EXPERIENCES));
    section(
        "=== 현재 대화와 관련된 정보 ===",
        &mut relevant.iter().take(MAX_RELEVANT).map(|hit| hit.memory.text.as_str()),
    );

    lines.join("\n")
}

/// Lays out the gateway messages: persona, memory context (when present),
/// recent session turns, then the new user message.
pub fn compose_messages(
    persona: &str,
    memory_context: &str,
    history: Vec<ChatMessage>,
    user_message: &str,
) -> Vec<ChatMessage> {
    let mut messages = Vec::with_capacity(history.len() + 3);
    messages.push(ChatMessage::system(persona));
    if !memory_context.is_empty() {
        messages.push(ChatMessage::system(memory_context_message(memory_context)));
    }
    messages.extend(history);
    messages.push(ChatMessage::user(user_message));
    messages
}

#[cfg(test)]
mod tests {
    use super::*;
    use mnemos_core::types::{ChatRole, Metadata};

    fn record(text: &str) -> MemoryRecord {
        MemoryRecord {
            id: text.into(),
            text: text.into(),
            user_id: "u".into(),
            metadata: Metadata::new(),
        }
    }

    fn scored(text: &str, score: f32) -> ScoredMemory {
        ScoredMemory {
            memory: record(text),
            score,
        }
    }

    #[test]
    fn empty_memories_build_empty_context() {
        assert_eq!(build_memory_context(&[], &[]), "");
    }

    #[test]
    fn sections_are_ordered_and_headed() {
        let all = [
            record("제 이름은 민수입니다"),
            record("저는 피자를 좋아해요"),
            record("작년에 제주도 여행을 했다"),
        ];
        let relevant = [scored("저는 피자를 좋아해요", 0.95)];

        let context = build_memory_context(&all, &relevant);
        assert_eq!(
            context,
            "=== 사용자 정보 ===\n\
             - 제 이름은 민수입니다\n\
             \n=== 선호도 ===\n\
             - 저는 피자를 좋아해요\n\
             \n=== 과거 경험 ===\n\
             - 작년에 제주도 여행을 했다\n\
             \n=== 현재 대화와 관련된 정보 ===\n\
             - 저는 피자를 좋아해요"
        );
    }

    #[test]
    fn identity_slot_prefers_name_over_age() {
        assert_eq!(identity_slot("my name is kim, 30 years of age"), Some("name"));
        assert_eq!(identity_slot("저는 서른 살이에요"), Some("age"));
        assert_eq!(identity_slot("my job is teaching"), Some("job"));
        assert_eq!(identity_slot("the sky is blue"), None);
    }

    #[test]
    fn later_identity_fact_replaces_earlier() {
        let all = [record("my name is A"), record("my name is B")];
        let context = build_memory_context(&all, &[]);
        assert_eq!(context, "=== 사용자 정보 ===\n- my name is B");
    }

    #[test]
    fn groups_are_capped() {
        let all: Vec<_> = (0..5).map(|i| record(&format!("I prefer tea {i}"))).collect();
        let relevant: Vec<_> = (0..5).map(|i| scored(&format!("hit {i}"), 0.9)).collect();

        let context = build_memory_context(&all, &relevant);
        assert_eq!(context.matches("I prefer tea").count(), 3);
        assert_eq!(context.matches("- hit").count(), 3);
    }

    #[test]
    fn experience_category_counts_without_cue_words() {
        let mut r = record("Kyoto trip");
        r.metadata.insert("category".into(), "experiences".into());
        let context = build_memory_context(&[r], &[]);
        assert_eq!(context, "=== 과거 경험 ===\n- Kyoto trip");
    }

    #[test]
    fn compose_skips_empty_context() {
        let messages = compose_messages("persona", "", vec![ChatMessage::user("old")], "new");
        let roles: Vec<_> = messages.iter().map(|m| m.role).collect();
        assert_eq!(roles, [ChatRole::System, ChatRole::User, ChatRole::User]);
        assert_eq!(messages[2].content, "new");
    }

    #[test]
    fn compose_wraps_context() {
        let messages = compose_messages("persona", "- fact", vec![], "hi");
        assert_eq!(messages.len(), 3);
        assert!(messages[1].content.contains("- fact"));
        assert!(messages[1].content.starts_with("다음은 사용자에 대해 기억하고 있는 정보입니다"));
    }

    #[tokio::test]
    async fn default_persona_when_nothing_configured() {
        let config = AgentConfig::default();
        assert_eq!(load_system_prompt(&config).await, DEFAULT_PERSONA);
    }

    #[tokio::test]
    async fn prompt_file_overrides_inline() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("persona.md");
        std::fs::write(&path, "  File persona.\n").unwrap();

        let config = AgentConfig {
            system_prompt: Some("Inline persona.".into()),
            system_prompt_file: Some(path.to_string_lossy().into_owned()),
            ..AgentConfig::default()
        };
        assert_eq!(load_system_prompt(&config).await, "File persona.");
    }

    #[tokio::test]
    async fn missing_prompt_file_falls_back_to_inline() {
        let config = AgentConfig {
            system_prompt: Some("Inline persona.".into()),
            system_prompt_file: Some("/nonexistent/persona.md".into()),
            ..AgentConfig::default()
        };
        assert_eq!(load_system_prompt(&config).await, "Inline persona.");
    }
}
