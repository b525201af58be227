//! Core configuration type for interlinking
//!
//! This module contains the `InterlinkConfig` struct that carries every
//! threshold and limit used by discovery, injection and reporting.

use serde::{Deserialize, Serialize};

use crate::utils::{
    DEFAULT_ARTICLE_URL_PREFIX, DEFAULT_BATCH_LIMIT, DEFAULT_HUB_COUNT,
    DEFAULT_INBOUND_SCAN_WINDOW, DEFAULT_MAX_BODY_CHARS, DEFAULT_MAX_BODY_KEYWORDS,
    DEFAULT_MAX_LINKS_PER_ITEM, DEFAULT_MIN_ANCHOR_LENGTH, DEFAULT_MIN_RELEVANCE,
    DEFAULT_MIN_SINGLE_WORD_LENGTH, DEFAULT_MIN_SOURCE_WORDS, DEFAULT_PAGE_URL_PREFIX,
    DEFAULT_SIMILARITY_PREFIX_CHARS, DEFAULT_STATIC_ROUTES,
};

/// Main configuration struct for interlinking operations
///
/// Unknown fields are rejected and missing fields take their defaults, so a
/// JSON file only needs to list what it overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InterlinkConfig {
    /// Candidates scoring below this (0-100) are discarded.
    ///
    /// Default: 35
    pub(crate) min_relevance: u8,

    /// Maximum anchors injected into one body per pass.
    ///
    /// Scans return up to twice this many candidates, leaving headroom
    /// for manual curation.
    ///
    /// Default: 8
    pub(crate) max_links_per_item: usize,

    /// Sources with fewer words are never scanned.
    ///
    /// Default: 100
    pub(crate) min_source_words: usize,

    /// Minimum phrase length kept in the index.
    ///
    /// Default: 4
    pub(crate) min_anchor_length: usize,

    /// Minimum length for single-word phrases to be matched.
    ///
    /// Default: 5
    pub(crate) min_single_word_length: usize,

    /// Keywords extracted from each body.
    ///
    /// Default: 15
    pub(crate) max_body_keywords: usize,

    /// Plain-text cap per index entry (characters).
    ///
    /// Default: 10000
    pub(crate) max_body_chars: usize,

    /// Prefix compared by body similarity (characters).
    ///
    /// Default: 3000
    pub(crate) similarity_prefix_chars: usize,

    /// Recently updated items scanned for inbound links when content is created.
    ///
    /// Default: 50
    pub(crate) inbound_scan_window: usize,

    /// Batch size used when the caller does not pass one.
    ///
    /// Default: 20
    pub(crate) default_batch_limit: usize,

    /// Hub entries listed in reports.
    ///
    /// Default: 10
    pub(crate) hub_count: usize,

    /// URL prefix for articles.
    ///
    /// Default: "/blog"
    pub(crate) article_url_prefix: String,

    /// URL prefix for pages.
    ///
    /// Default: "" (pages live at `/{slug}`)
    pub(crate) page_url_prefix: String,

    /// Routes that always resolve even though no content item backs them.
    pub(crate) static_routes: Vec<String>,
}

impl Default for InterlinkConfig {
    fn default() -> Self {
        Self {
            min_relevance: DEFAULT_MIN_RELEVANCE,
            max_links_per_item: DEFAULT_MAX_LINKS_PER_ITEM,
            min_source_words: DEFAULT_MIN_SOURCE_WORDS,
            min_anchor_length: DEFAULT_MIN_ANCHOR_LENGTH,
            min_single_word_length: DEFAULT_MIN_SINGLE_WORD_LENGTH,
            max_body_keywords: DEFAULT_MAX_BODY_KEYWORDS,
            max_body_chars: DEFAULT_MAX_BODY_CHARS,
            similarity_prefix_chars: DEFAULT_SIMILARITY_PREFIX_CHARS,
            inbound_scan_window: DEFAULT_INBOUND_SCAN_WINDOW,
            default_batch_limit: DEFAULT_BATCH_LIMIT,
            hub_count: DEFAULT_HUB_COUNT,
            article_url_prefix: DEFAULT_ARTICLE_URL_PREFIX.to_string(),
            page_url_prefix: DEFAULT_PAGE_URL_PREFIX.to_string(),
            static_routes: DEFAULT_STATIC_ROUTES.iter().map(|s| (*s).to_string()).collect(),
        }
    }
}
