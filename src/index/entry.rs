//! Derived per-item search data.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::keywords::extract_keywords;
use crate::config::InterlinkConfig;
use crate::content::{ContentItem, ContentKey, ContentStatus};
use crate::html::plain_text;
use crate::utils::string_utils::{safe_truncate_chars, word_count};

/// Everything the scanner and scorer need to know about one item.
///
/// Built from a `ContentItem` at the start of an operation and never
/// mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContentIndexEntry {
    pub key: ContentKey,
    pub title: String,
    pub slug: String,
    /// Canonical site-relative URL
    pub url: String,
    pub status: ContentStatus,
    pub view_count: u64,
    pub word_count: usize,
    pub published_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
    /// Visible body text, capped to `max_body_chars`
    pub plain_text: String,
    /// Lowercase search phrases, multi-word phrases first
    pub phrases: Vec<String>,
    /// Lowercase tags
    pub tags: Vec<String>,
    /// Lowercase categories
    pub categories: Vec<String>,
}

impl ContentIndexEntry {
    pub fn from_item(item: &ContentItem, config: &InterlinkConfig) -> Self {
        let full_text = plain_text(item.body());
        let word_count = item.word_count().unwrap_or_else(|| word_count(&full_text));
        let plain_text = safe_truncate_chars(&full_text, config.max_body_chars()).to_string();

        let tags = lowercase_all(item.tags());
        let categories = lowercase_all(item.categories());
        let extracted = extract_keywords(
            &plain_text,
            config.max_body_keywords(),
            config.min_anchor_length(),
        );

        let title = [item.title().to_string()];
        let sources = title
            .iter()
            .chain(item.keywords())
            .chain(&tags)
            .chain(&categories)
            .chain(&extracted);
        let phrases = build_phrases(sources, config.min_anchor_length());

        Self {
            key: item.key(),
            title: item.title().to_string(),
            slug: item.slug().to_string(),
            url: config.content_url(item.kind(), item.slug()),
            status: item.status(),
            view_count: item.view_count(),
            word_count,
            published_at: item.published_at(),
            updated_at: item.updated_at(),
            plain_text,
            phrases,
            tags,
            categories,
        }
    }

    #[must_use]
    pub fn is_published(&self) -> bool {
        self.status == ContentStatus::Published
    }

    /// Tags and categories as one lowercase term set.
    pub fn terms(&self) -> HashSet<&str> {
        self.tags
            .iter()
            .chain(&self.categories)
            .map(String::as_str)
            .collect()
    }
}

fn lowercase_all(values: &[String]) -> Vec<String> {
    values
        .iter()
        .map(|v| normalize_phrase(v))
        .filter(|v| !v.is_empty())
        .collect()
}

/// Lowercase and collapse inner whitespace.
fn normalize_phrase(raw: &str) -> String {
    raw.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Deduplicate in first-seen order, drop short phrases, then move
/// multi-word phrases ahead of single words (stable).
fn build_phrases<'a>(sources: impl Iterator<Item = &'a String>, min_chars: usize) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut phrases: Vec<String> = sources
        .map(|raw| normalize_phrase(raw))
        .filter(|p| p.chars().count() >= min_chars)
        .filter(|p| seen.insert(p.clone()))
        .collect();
    phrases.sort_by_key(|p| std::cmp::Reverse(p.split(' ').count()));
    phrases
}
