// SPDX-FileCopyrightText: 2026 Mnemos Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Decides what in a conversation turn is worth remembering.
//!
//! Two modes are available. The heuristic mode keeps the user's utterance
//! verbatim when it looks personal or topical. The gateway mode asks the
//! model to list facts from the whole exchange, one per line.

use std::sync::Arc;
use std::time::Duration;

use mnemos_config::model::ExtractionMode;
use mnemos_core::traits::ProviderAdapter;
use mnemos_core::types::{GenerateRequest, SamplingOptions};
use tracing::{debug, warn};

use crate::strategy::within;

/// Topical keywords that make an utterance worth keeping.
const IMPORTANT_KEYWORDS: &[&str] = &[
    "이름", "나이", "살", "직업", "일", "회사", "좋아", "싫어", "관심", "취미", "즐겨", "선호",
    "사는", "거주", "출신", "살아", "집", "공부", "전공", "학교", "대학", "졸업", "가족", "부모",
    "형제", "자매", "친구", "음식", "먹", "마시", "요리", "여행", "가", "갔", "갈", "방문", "운동",
    "스포츠", "건강", "영화", "책", "음악", "게임", "습니다", "입니다", "에요", "이에요", "예요",
];

/// Self-reference patterns.
const PERSONAL_PATTERNS: &[&str] = &[
    "저는", "제가", "나는", "내가", "제 이름", "내 이름", "저의", "나의", "제", "내", "전 ", "난 ",
    "저 ", "있습니다", "있어요", "합니다", "해요",
];

/// At most this many fact lines are taken from a gateway answer.
const MAX_FACT_CANDIDATES: usize = 5;

/// Fact lines of this many characters or fewer are discarded.
const MIN_FACT_CHARS: usize = 10;

/// Keyword heuristic applied to user utterances.
#[derive(Debug, Clone, Copy)]
pub struct ExtractionHeuristic {
    min_chars: usize,
}

impl ExtractionHeuristic {
    pub fn new(min_chars: usize) -> Self {
        Self { min_chars }
    }

    /// True when the utterance is long enough and mentions a personal
    /// pattern or a topical keyword.
    pub fn should_remember(&self, utterance: &str) -> bool {
        if utterance.chars().count() < self.min_chars {
            return false;
        }
        let lowered = utterance.to_lowercase();
        IMPORTANT_KEYWORDS.iter().any(|k| lowered.contains(k))
            || PERSONAL_PATTERNS.iter().any(|p| lowered.contains(p))
    }
}

impl Default for ExtractionHeuristic {
    fn default() -> Self {
        Self::new(5)
    }
}

/// Keeps fact lines from a gateway answer: comment lines (`#`) are skipped,
/// at most five candidates are considered, and short lines are dropped.
pub fn parse_fact_lines(raw: &str) -> Vec<String> {
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .take(MAX_FACT_CANDIDATES)
        .filter(|line| line.chars().count() > MIN_FACT_CHARS)
        .map(str::to_string)
        .collect()
}

/// Produces the texts to remember from a conversation turn.
pub struct MemoryExtractor {
    mode: ExtractionMode,
    heuristic: ExtractionHeuristic,
    gateway: Arc<dyn ProviderAdapter>,
    model: String,
    timeout: Option<Duration>,
}

impl MemoryExtractor {
    pub fn new(
        mode: ExtractionMode,
        heuristic: ExtractionHeuristic,
        gateway: Arc<dyn ProviderAdapter>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            mode,
            heuristic,
            gateway,
            model: model.into(),
            timeout: None,
        }
    }

    /// Bounds the gateway call of the LLM mode by `timeout`.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Candidate memory texts for one turn. Never fails; a gateway error
    /// yields no candidates.
    pub async fn candidates(&self, user_message: &str, reply: &str) -> Vec<String> {
        match self.mode {
            ExtractionMode::Heuristic => {
                if self.heuristic.should_remember(user_message) {
                    vec![user_message.to_string()]
                } else {
                    Vec::new()
                }
            }
            ExtractionMode::Llm => self.ask_gateway(user_message, reply).await,
        }
    }

    async fn ask_gateway(&self, user_message: &str, reply: &str) -> Vec<String> {
        let prompt = format!(
            "다음 대화에서 기억해야 할 중요한 정보를 추출하세요.\n\
             사실, 선호도, 개인정보, 경험 등을 찾아주세요.\n\n\
             대화:\nUser: {user_message}\nAssistant: {reply}\n\n\
             추출할 정보 (한 줄에 하나씩):"
        );
        let request = GenerateRequest {
            model: self.model.clone(),
            prompt,
            options: SamplingOptions::precise(0.3, 256),
            json: false,
        };

        match within(self.timeout, self.gateway.generate(request)).await {
            Ok(response) => {
                let facts = parse_fact_lines(&response.text);
                debug!(count = facts.len(), "facts extracted by gateway");
                facts
            }
            Err(e) => {
                warn!(error = %e, "fact extraction failed");
                Vec::new()
            }
        }
    }
}
