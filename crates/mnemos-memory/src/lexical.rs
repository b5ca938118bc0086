// SPDX-FileCopyrightText: 2026 Mnemos Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Lexical scorer used when vector search is unavailable.
//!
//! Scoring, in order:
//! 1. `0.95` when the lowercased query is a substring of the lowercased text.
//! 2. Otherwise, if any whitespace-separated query term occurs inside the
//!    text, `0.5 + 0.4 * |q ∩ t| / |q ∪ t|` over the whitespace token sets.
//! 3. Otherwise `0.0`, and the record is dropped.

use std::collections::HashSet;

use mnemos_core::{MemoryRecord, ScoredMemory};

/// Score for a literal substring match.
pub const SUBSTRING_SCORE: f32 = 0.95;

/// Floor of the token-overlap score.
const OVERLAP_BASE: f32 = 0.5;

/// Weight of the Jaccard ratio in the token-overlap score.
const OVERLAP_WEIGHT: f32 = 0.4;

/// Score one text against a query.
pub fn lexical_score(query: &str, text: &str) -> f32 {
    let query = query.to_lowercase();
    let text = text.to_lowercase();

    if text.contains(&query) {
        return SUBSTRING_SCORE;
    }

    let query_terms: HashSet<&str> = query.split_whitespace().collect();
    if !query_terms.iter().any(|term| text.contains(term)) {
        return 0.0;
    }

    let text_terms: HashSet<&str> = text.split_whitespace().collect();
    let intersection = query_terms.intersection(&text_terms).count();
    let union = query_terms.union(&text_terms).count();
    if union == 0 {
        return 0.0;
    }

    OVERLAP_BASE + OVERLAP_WEIGHT * intersection as f32 / union as f32
}

/// Rank records against a query.
///
/// Zero scores are dropped, as are scores under a positive `threshold`.
/// Ties keep ledger order.
pub fn rank(
    query: &str,
    records: Vec<MemoryRecord>,
    limit: usize,
    threshold: Option<f32>,
) -> Vec<ScoredMemory> {
    let threshold = threshold.filter(|t| *t > 0.0);

    let mut scored: Vec<ScoredMemory> = records
        .into_iter()
        .filter_map(|memory| {
            let score = lexical_score(query, &memory.text);
            if score <= 0.0 || threshold.is_some_and(|t| score < t) {
                return None;
            }
            Some(ScoredMemory { memory, score })
        })
        .collect();

    scored.sort_by(|a, b| b.score.total_cmp(&a.score));
    scored.truncate(limit);
    scored
}

#[cfg(test)]
mod tests {
    use super::*;
    use mnemos_core::Metadata;
    use proptest::prelude::*;

    fn records(texts: &[&str]) -> Vec<MemoryRecord> {
        texts
            .iter()
            .enumerate()
            .map(|(i, t)| MemoryRecord {
                id: format!("m{i}"),
                text: t.to_string(),
                user_id: "u".into(),
                metadata: Metadata::new(),
            })
            .collect()
    }

    #[test]
    fn substring_match_scores_095() {
        let ranked = rank(
            "파이썬",
            records(&["저는 파이썬 개발자입니다", "등산을 즐깁니다"]),
            5,
            None,
        );
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].memory.id, "m0");
        assert_eq!(ranked[0].score, SUBSTRING_SCORE);
    }

    #[test]
    fn token_overlap_uses_jaccard_formula() {
        // query {개발자, 파이썬}; text {저는, 파이썬, 개발자입니다}
        // intersection {파이썬} = 1, union = 4
        let score = lexical_score("개발자 파이썬", "저는 파이썬 개발자입니다");
        let expected = 0.5 + 0.4 * 1.0 / 4.0;
        assert!((score - expected).abs() < 1e-6, "got {score}");
    }

    #[test]
    fn partial_term_without_shared_token_scores_base() {
        // "개발" occurs inside "개발자입니다" but no whole token is shared.
        let score = lexical_score("개발 여행", "저는 개발자입니다");
        assert!((score - 0.5).abs() < 1e-6, "got {score}");
    }

    #[test]
    fn matching_is_case_insensitive() {
        assert_eq!(lexical_score("RUST", "I write rust daily"), SUBSTRING_SCORE);
    }

    #[test]
    fn no_shared_terms_scores_zero() {
        assert_eq!(lexical_score("바다", "저는 등산을 좋아합니다"), 0.0);
    }

    #[test]
    fn threshold_drops_low_scores_but_zero_threshold_is_ignored() {
        let texts = ["저는 파이썬 개발자입니다", "파이썬"];
        let with_threshold = rank("개발자 파이썬", records(&texts), 5, Some(0.75));
        assert!(with_threshold.is_empty());

        let zero = rank("개발자 파이썬", records(&texts), 5, Some(0.0));
        assert_eq!(zero.len(), 2);
    }

    #[test]
    fn ranking_is_descending_and_stable() {
        let ranked = rank(
            "커피",
            records(&["차 좋아", "커피 좋아", "아침 커피", "커피 커피"]),
            10,
            None,
        );
        let ids: Vec<&str> = ranked.iter().map(|s| s.memory.id.as_str()).collect();
        assert_eq!(ids, vec!["m1", "m2", "m3"]);
    }

    #[test]
    fn limit_truncates() {
        let ranked = rank("a", records(&["a", "ab", "abc"]), 2, None);
        assert_eq!(ranked.len(), 2);
    }

    proptest! {
        #[test]
        fn scores_are_zero_substring_or_bounded_overlap(
            query in "[a-c ]{0,8}",
            text in "[a-c ]{0,12}",
        ) {
            let score = lexical_score(&query, &text);
            prop_assert!(
                score == 0.0
                    || score == SUBSTRING_SCORE
                    || (OVERLAP_BASE..=OVERLAP_BASE + OVERLAP_WEIGHT).contains(&score)
            );
        }
    }
}
