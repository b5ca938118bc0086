// SPDX-FileCopyrightText: 2026 Mnemos Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Category classification, entity extraction, and sentiment analysis.
//!
//! Classification is keyword-first: a text is labelled by the category with
//! the most keyword hits, and only when no keyword matches is the gateway
//! asked. Every gateway failure degrades to a default answer.

use std::sync::Arc;
use std::time::Duration;

use mnemos_config::model::CategoryConfig;
use mnemos_core::traits::ProviderAdapter;
use mnemos_core::types::{GenerateRequest, SamplingOptions};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::strategy::{first_usable, within};
use crate::types::UNCATEGORIZED;

/// A classification label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub key: String,
    pub name: String,
    pub keywords: Vec<String>,
    pub description: String,
}

impl Category {
    pub fn new(
        key: impl Into<String>,
        name: impl Into<String>,
        keywords: &[&str],
        description: impl Into<String>,
    ) -> Self {
        Self {
            key: key.into(),
            name: name.into(),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
            description: description.into(),
        }
    }

    /// Number of keywords occurring in an already-lowercased text.
    fn hits(&self, lowered: &str) -> usize {
        self.keywords
            .iter()
            .filter(|k| lowered.contains(&k.to_lowercase()))
            .count()
    }
}

impl From<CategoryConfig> for Category {
    fn from(c: CategoryConfig) -> Self {
        Self {
            key: c.key,
            name: c.name,
            keywords: c.keywords,
            description: c.description,
        }
    }
}

/// The built-in categories, in registry order.
pub fn default_categories() -> Vec<Category> {
    vec![
        Category::new(
            "personal_info",
            "개인정보",
            &["이름", "나이", "생일", "주소", "연락처", "이메일", "직업", "학교"],
            "개인 신상 정보",
        ),
        Category::new(
            "preferences",
            "선호도",
            &["좋아", "싫어", "선호", "취향", "즐겨", "관심", "취미"],
            "좋아하거나 싫어하는 것들",
        ),
        Category::new(
            "experiences",
            "경험",
            &["여행", "경험", "추억", "사건", "일화", "갔", "했", "봤"],
            "과거 경험이나 추억",
        ),
        Category::new(
            "knowledge",
            "지식",
            &["알고", "배웠", "공부", "학습", "정보", "지식", "팁"],
            "학습한 정보나 지식",
        ),
        Category::new(
            "relationships",
            "관계",
            &["가족", "친구", "동료", "아는", "관계", "사람", "지인"],
            "인간관계 정보",
        ),
        Category::new(
            "goals",
            "목표",
            &["목표", "계획", "희망", "꿈", "하고싶", "될거", "예정"],
            "목표나 계획",
        ),
        Category::new(
            "health",
            "건강",
            &["건강", "운동", "식단", "질병", "아프", "병원", "약"],
            "건강 관련 정보",
        ),
        Category::new(
            "work",
            "업무",
            &["일", "업무", "회사", "프로젝트", "직장", "근무"],
            "업무나 경력 관련",
        ),
        Category::new(
            "emotions",
            "감정",
            &["기쁘", "슬프", "화나", "행복", "우울", "스트레스", "감정"],
            "감정 상태",
        ),
    ]
}

/// Key of the category with the most keyword hits. Ties go to the category
/// registered first; no hits at all yields `None`.
pub fn keyword_match(text: &str, categories: &[Category]) -> Option<String> {
    let lowered = text.to_lowercase();
    let mut best: Option<(&Category, usize)> = None;
    for category in categories {
        let hits = category.hits(&lowered);
        if hits > 0 && best.is_none_or(|(_, top)| hits > top) {
            best = Some((category, hits));
        }
    }
    best.map(|(c, _)| c.key.clone())
}

/// Entities mentioned in a text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Entities {
    pub people: Vec<String>,
    pub places: Vec<String>,
    pub dates: Vec<String>,
    pub organizations: Vec<String>,
    pub keywords: Vec<String>,
}

/// Emotional tone of a text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sentiment {
    /// `positive`, `negative`, or `neutral`.
    pub sentiment: String,
    /// 1 (very weak) to 5 (very strong).
    pub intensity: u8,
    pub emotion: String,
}

impl Default for Sentiment {
    fn default() -> Self {
        Self {
            sentiment: "neutral".to_string(),
            intensity: 3,
            emotion: "neutral".to_string(),
        }
    }
}

/// Classifies texts into registry categories with gateway assistance.
pub struct Classifier {
    registry: RwLock<Vec<Category>>,
    gateway: Arc<dyn ProviderAdapter>,
    classification_model: String,
    analysis_model: String,
    timeout: Option<Duration>,
}

impl Classifier {
    /// Creates a classifier with the built-in registry.
    ///
    /// `classification_model` answers category questions; `analysis_model`
    /// is used for entity and sentiment prompts.
    pub fn new(
        gateway: Arc<dyn ProviderAdapter>,
        classification_model: impl Into<String>,
        analysis_model: impl Into<String>,
    ) -> Self {
        Self {
            registry: RwLock::new(default_categories()),
            gateway,
            classification_model: classification_model.into(),
            analysis_model: analysis_model.into(),
            timeout: None,
        }
    }

    /// Bounds every gateway call by `timeout`.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Registers a category, replacing an existing one with the same key in
    /// place so its tie-break position is kept.
    pub async fn add_custom_category(&self, category: Category) {
        let mut registry = self.registry.write().await;
        match registry.iter_mut().find(|c| c.key == category.key) {
            Some(existing) => *existing = category,
            None => registry.push(category),
        }
    }

    /// A snapshot of the registry, in order.
    pub async fn categories(&self) -> Vec<Category> {
        self.registry.read().await.clone()
    }

    /// Classifies against the registry.
    pub async fn classify(&self, text: &str) -> String {
        let categories = self.categories().await;
        self.classify_with(text, &categories).await
    }

    /// Classifies against an explicit category list.
    ///
    /// Returns a key of `categories` or `"uncategorized"`.
    pub async fn classify_with(&self, text: &str, categories: &[Category]) -> String {
        let resolved = first_usable(
            "classification",
            || async { Ok(keyword_match(text, categories)) },
            || self.ask_gateway(text, categories),
        )
        .await;
        debug!(category = %resolved.value, tier = ?resolved.tier, "text classified");
        resolved.value
    }

    async fn ask_gateway(&self, text: &str, categories: &[Category]) -> String {
        if categories.is_empty() {
            return UNCATEGORIZED.to_string();
        }

        let listing = categories
            .iter()
            .map(|c| format!("- {}: {}", c.key, c.description))
            .collect::<Vec<_>>()
            .join("\n");
        let prompt = format!(
            "다음 텍스트를 가장 적절한 카테고리로 분류하세요.\n\n\
             텍스트: \"{text}\"\n\n\
             카테고리:\n{listing}\n\n\
             가장 적절한 카테고리의 키(key)만 응답하세요. \
             적절한 카테고리가 없으면 'uncategorized'라고 응답하세요.\n\n\
             카테고리:"
        );

        let Some(answer) = self
            .generate(&self.classification_model, prompt, SamplingOptions::precise(0.1, 20), false)
            .await
        else {
            return UNCATEGORIZED.to_string();
        };

        let answer = answer.trim().to_lowercase();
        if categories.iter().any(|c| c.key == answer) {
            answer
        } else {
            debug!(answer = %answer, "gateway answered with an unknown category");
            UNCATEGORIZED.to_string()
        }
    }

    /// Pulls people, places, dates, organizations, and keywords out of a
    /// text. Any failure yields empty lists.
    pub async fn extract_entities(&self, text: &str) -> Entities {
        let prompt = format!(
            "다음 텍스트에서 중요한 정보를 추출하세요.\n\n\
             텍스트: \"{text}\"\n\n\
             다음 정보를 JSON 형식으로 추출하세요:\n\
             - people: 사람 이름들\n\
             - places: 장소들\n\
             - dates: 날짜/시간\n\
             - organizations: 조직/회사\n\
             - keywords: 핵심 키워드\n\n\
             JSON:"
        );

        let Some(raw) = self
            .generate(&self.analysis_model, prompt, SamplingOptions::precise(0.1, 256), true)
            .await
        else {
            return Entities::default();
        };

        serde_json::from_str(raw.trim()).unwrap_or_else(|e| {
            warn!(error = %e, "entity extraction returned invalid JSON");
            Entities::default()
        })
    }

    /// Rates the sentiment of a text. Any failure yields neutral/3/neutral.
    pub async fn analyze_sentiment(&self, text: &str) -> Sentiment {
        let prompt = format!(
            "다음 텍스트의 감정을 분석하세요.\n\n\
             텍스트: \"{text}\"\n\n\
             1. 감정 상태: positive/negative/neutral\n\
             2. 감정 강도: 1-5 (1=매우 약함, 5=매우 강함)\n\
             3. 주요 감정: 기쁨/슬픔/화남/두려움/놀람/혐오 중 선택\n\n\
             형식:\n\
             sentiment: [positive/negative/neutral]\n\
             intensity: [1-5]\n\
             emotion: [주요감정]"
        );

        match self
            .generate(&self.analysis_model, prompt, SamplingOptions::precise(0.1, 50), false)
            .await
        {
            Some(raw) => parse_sentiment(&raw),
            None => Sentiment::default(),
        }
    }

    async fn generate(
        &self,
        model: &str,
        prompt: String,
        options: SamplingOptions,
        json: bool,
    ) -> Option<String> {
        let request = GenerateRequest {
            model: model.to_string(),
            prompt,
            options,
            json,
        };
        match within(self.timeout, self.gateway.generate(request)).await {
            Ok(response) => Some(response.text),
            Err(e) => {
                warn!(model, error = %e, "gateway generate failed");
                None
            }
        }
    }
}

/// Parses `sentiment:`, `intensity:`, and `emotion:` lines. Missing or
/// malformed fields keep their defaults.
pub fn parse_sentiment(raw: &str) -> Sentiment {
    let mut result = Sentiment::default();
    for line in raw.lines() {
        let lowered = line.to_lowercase();
        let Some(value) = line.rsplit(':').next().map(clean_value) else {
            continue;
        };
        if value.is_empty() {
            continue;
        }

        if lowered.contains("sentiment:") {
            result.sentiment = value.to_lowercase();
        } else if lowered.contains("intensity:") {
            if let Ok(n) = value.parse::<u8>() {
                result.intensity = n.clamp(1, 5);
            }
        } else if lowered.contains("emotion:") {
            result.emotion = value;
        }
    }
    result
}

fn clean_value(raw: &str) -> String {
    raw.trim()
        .trim_matches(|c| c == '[' || c == ']')
        .trim()
        .to_string()
}
