//! Getter methods for `InterlinkConfig`
//!
//! This module provides all the accessor methods for retrieving configuration
//! values from an `InterlinkConfig` instance.

use crate::content::ContentKind;

use super::types::InterlinkConfig;

impl InterlinkConfig {
    #[must_use]
    pub fn min_relevance(&self) -> u8 {
        self.min_relevance
    }

    #[must_use]
    pub fn max_links_per_item(&self) -> usize {
        self.max_links_per_item
    }

    /// Cap on candidates returned by one scan.
    #[must_use]
    pub fn max_candidates(&self) -> usize {
        self.max_links_per_item.saturating_mul(2)
    }

    #[must_use]
    pub fn min_source_words(&self) -> usize {
        self.min_source_words
    }

    #[must_use]
    pub fn min_anchor_length(&self) -> usize {
        self.min_anchor_length
    }

    #[must_use]
    pub fn min_single_word_length(&self) -> usize {
        self.min_single_word_length
    }

    #[must_use]
    pub fn max_body_keywords(&self) -> usize {
        self.max_body_keywords
    }

    #[must_use]
    pub fn max_body_chars(&self) -> usize {
        self.max_body_chars
    }

    #[must_use]
    pub fn similarity_prefix_chars(&self) -> usize {
        self.similarity_prefix_chars
    }

    #[must_use]
    pub fn inbound_scan_window(&self) -> usize {
        self.inbound_scan_window
    }

    #[must_use]
    pub fn default_batch_limit(&self) -> usize {
        self.default_batch_limit
    }

    #[must_use]
    pub fn hub_count(&self) -> usize {
        self.hub_count
    }

    #[must_use]
    pub fn article_url_prefix(&self) -> &str {
        &self.article_url_prefix
    }

    #[must_use]
    pub fn page_url_prefix(&self) -> &str {
        &self.page_url_prefix
    }

    #[must_use]
    pub fn static_routes(&self) -> &[String] {
        &self.static_routes
    }

    /// Canonical site-relative URL for a content item.
    #[must_use]
    pub fn content_url(&self, kind: ContentKind, slug: &str) -> String {
        let prefix = match kind {
            ContentKind::Article => self.article_url_prefix.trim_end_matches('/'),
            ContentKind::Page => self.page_url_prefix.trim_end_matches('/'),
        };
        format!("{prefix}/{}", slug.trim_matches('/'))
    }
}
