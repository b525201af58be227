//! Multi-signal relevance scoring between a source and a candidate target.
//!
//! Scoring:
//! - Keyword overlap: shared phrases / smaller phrase set, up to 25
//! - Tag/category overlap: 5 per shared term, up to 15
//! - Body similarity: Jaccard over word sets of both body prefixes, up to 20
//! - Target published: 10
//! - Recency of target publication: 10 / 7 / 4 / 1 by age band
//! - Target popularity: log10(views + 1) * 2.5, up to 10
//! - Target length: 10 / 6 / 3 by word count tier
//!
//! The score is a pure function of its inputs; the clock is passed in.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::index::ContentIndexEntry;
use crate::utils::string_utils::{safe_truncate_chars, tokenize_words};

const KEYWORD_WEIGHT: f64 = 25.0;
const TERM_POINTS: f64 = 5.0;
const TERM_CAP: f64 = 15.0;
const SIMILARITY_WEIGHT: f64 = 20.0;
const PUBLISHED_BONUS: f64 = 10.0;
const POPULARITY_CAP: f64 = 10.0;
const POPULARITY_SCALE: f64 = 2.5;

/// Tokens shorter than this are ignored for body similarity.
const MIN_SIMILARITY_TOKEN_CHARS: usize = 3;

/// Per-signal contribution, useful for debugging a surprising score.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct RelevanceBreakdown {
    pub keyword_overlap: f64,
    pub term_overlap: f64,
    pub body_similarity: f64,
    pub published: f64,
    pub recency: f64,
    pub popularity: f64,
    pub quality: f64,
}

impl RelevanceBreakdown {
    /// Rounded sum, clamped to 0..=100.
    #[must_use]
    pub fn total(&self) -> u8 {
        let sum = self.keyword_overlap
            + self.term_overlap
            + self.body_similarity
            + self.published
            + self.recency
            + self.popularity
            + self.quality;
        sum.round().clamp(0.0, 100.0) as u8
    }
}

/// Score every signal separately.
pub fn score_breakdown(
    source: &ContentIndexEntry,
    target: &ContentIndexEntry,
    now: DateTime<Utc>,
    similarity_prefix_chars: usize,
) -> RelevanceBreakdown {
    RelevanceBreakdown {
        keyword_overlap: keyword_overlap(&source.phrases, &target.phrases) * KEYWORD_WEIGHT,
        term_overlap: term_overlap(source, target),
        body_similarity: jaccard(
            &similarity_tokens(&source.plain_text, similarity_prefix_chars),
            &similarity_tokens(&target.plain_text, similarity_prefix_chars),
        ) * SIMILARITY_WEIGHT,
        published: if target.is_published() { PUBLISHED_BONUS } else { 0.0 },
        recency: recency_points(target.published_at, now),
        popularity: popularity_points(target.view_count),
        quality: quality_points(target.word_count),
    }
}

/// Relevance of `target` as a link destination from `source`, 0..=100.
pub fn calculate_relevance(
    source: &ContentIndexEntry,
    target: &ContentIndexEntry,
    now: DateTime<Utc>,
    similarity_prefix_chars: usize,
) -> u8 {
    score_breakdown(source, target, now, similarity_prefix_chars).total()
}

fn keyword_overlap(source: &[String], target: &[String]) -> f64 {
    let smaller = source.len().min(target.len());
    if smaller == 0 {
        return 0.0;
    }
    let source: HashSet<&str> = source.iter().map(String::as_str).collect();
    let shared = target
        .iter()
        .map(String::as_str)
        .collect::<HashSet<_>>()
        .intersection(&source)
        .count();
    (shared as f64 / smaller as f64).min(1.0)
}

fn term_overlap(source: &ContentIndexEntry, target: &ContentIndexEntry) -> f64 {
    let shared = source.terms().intersection(&target.terms()).count();
    (shared as f64 * TERM_POINTS).min(TERM_CAP)
}

fn similarity_tokens(text: &str, prefix_chars: usize) -> HashSet<String> {
    tokenize_words(safe_truncate_chars(text, prefix_chars))
        .into_iter()
        .filter(|w| w.chars().count() >= MIN_SIMILARITY_TOKEN_CHARS)
        .collect()
}

/// |A ∩ B| / |A ∪ B|, zero when both are empty.
pub fn jaccard(a: &HashSet<String>, b: &HashSet<String>) -> f64 {
    let union = a.union(b).count();
    if union == 0 {
        return 0.0;
    }
    a.intersection(b).count() as f64 / union as f64
}

fn recency_points(published_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> f64 {
    let Some(published_at) = published_at else {
        return 0.0;
    };
    // Future publish dates count as brand new
    match (now - published_at).num_days() {
        ..=30 => 10.0,
        31..=90 => 7.0,
        91..=365 => 4.0,
        _ => 1.0,
    }
}

fn popularity_points(views: u64) -> f64 {
    ((views as f64 + 1.0).log10() * POPULARITY_SCALE).min(POPULARITY_CAP)
}

fn quality_points(word_count: usize) -> f64 {
    match word_count {
        1500.. => 10.0,
        800..=1499 => 6.0,
        300..=799 => 3.0,
        _ => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::InterlinkConfig;
    use crate::content::{Article, ContentItem, ContentStatus};
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap()
    }

    fn entry(
        id: i64,
        title: &str,
        tags: &[&str],
        body: &str,
        views: u64,
        words: Option<usize>,
        age_days: Option<i64>,
    ) -> ContentIndexEntry {
        let item = ContentItem::Article(Article {
            id,
            title: title.to_string(),
            slug: format!("post-{id}"),
            body: body.to_string(),
            status: ContentStatus::Published,
            tags: tags.iter().map(|t| (*t).to_string()).collect(),
            categories: Vec::new(),
            keywords: Vec::new(),
            view_count: views,
            word_count: words,
            published_at: age_days.map(|d| now() - Duration::days(d)),
            updated_at: now(),
        });
        ContentIndexEntry::from_item(&item, &InterlinkConfig::default())
    }

    #[test]
    fn test_recency_bands() {
        assert_eq!(recency_points(None, now()), 0.0);
        assert_eq!(recency_points(Some(now() - Duration::days(30)), now()), 10.0);
        assert_eq!(recency_points(Some(now() - Duration::days(31)), now()), 7.0);
        assert_eq!(recency_points(Some(now() - Duration::days(365)), now()), 4.0);
        assert_eq!(recency_points(Some(now() - Duration::days(900)), now()), 1.0);
        assert_eq!(recency_points(Some(now() + Duration::days(3)), now()), 10.0);
    }

    #[test]
    fn test_popularity_and_quality() {
        assert_eq!(popularity_points(0), 0.0);
        assert!((popularity_points(99) - 5.0).abs() < 1e-9);
        assert_eq!(popularity_points(10_000_000), 10.0);
        assert_eq!(quality_points(299), 0.0);
        assert_eq!(quality_points(300), 3.0);
        assert_eq!(quality_points(800), 6.0);
        assert_eq!(quality_points(1500), 10.0);
    }

    #[test]
    fn test_jaccard() {
        let a: HashSet<String> = ["cache", "layer"].iter().map(|s| s.to_string()).collect();
        let b: HashSet<String> = ["cache", "memory"].iter().map(|s| s.to_string()).collect();
        assert!((jaccard(&a, &b) - 1.0 / 3.0).abs() < 1e-9);
        assert_eq!(jaccard(&HashSet::new(), &HashSet::new()), 0.0);
    }

    #[test]
    fn test_tag_overlap_is_capped() {
        let tags = ["caching", "performance", "memory", "latency"];
        let a = entry(1, "A", &tags, "", 0, Some(0), None);
        let b = entry(2, "B", &tags, "", 0, Some(0), None);
        assert_eq!(score_breakdown(&a, &b, now(), 3000).term_overlap, 15.0);
    }

    #[test]
    fn test_related_content_outscores_unrelated() {
        let body = "<p>Caching layers reduce latency by keeping hot data in memory.</p>";
        let source = entry(1, "Intro to Caching", &["caching", "performance"], body, 0, Some(400), Some(5));
        let related = entry(2, "Cache Eviction Policies", &["caching", "eviction"], body, 500, Some(900), Some(10));
        let unrelated = entry(3, "Gardening Tips", &["garden"], "<p>Tomatoes need sun.</p>", 0, Some(100), None);

        let related_score = calculate_relevance(&source, &related, now(), 3000);
        let unrelated_score = calculate_relevance(&source, &unrelated, now(), 3000);
        assert!(related_score > unrelated_score);
        assert!(related_score >= 35);
        assert!(unrelated_score < 35);
    }

    #[test]
    fn test_deterministic_and_bounded() {
        let body = "<p>same words here for both entries</p>";
        let a = entry(1, "Same title", &["x1", "x2", "x3", "x4"], body, u64::MAX, Some(5000), Some(1));
        let b = entry(2, "Same title", &["x1", "x2", "x3", "x4"], body, u64::MAX, Some(5000), Some(1));
        let first = calculate_relevance(&a, &b, now(), 3000);
        assert_eq!(first, calculate_relevance(&a, &b, now(), 3000));
        assert_eq!(first, 100);
    }
}
