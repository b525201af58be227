//! Fluent builder for `InterlinkConfig`
//!
//! Every field has a default, so the builder only validates the overrides
//! when `build()` is called.

use std::path::Path;

use anyhow::{Context, Result, anyhow};

use super::types::InterlinkConfig;

#[derive(Debug, Clone, Default)]
pub struct InterlinkConfigBuilder {
    config: InterlinkConfig,
}

impl InterlinkConfig {
    /// Start building a configuration from the defaults.
    #[must_use]
    pub fn builder() -> InterlinkConfigBuilder {
        InterlinkConfigBuilder::default()
    }

    /// Load a configuration from a JSON file, validating it.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is not valid JSON,
    /// or holds out-of-range values.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: InterlinkConfig =
            serde_json::from_str(&raw).context("Failed to parse interlink config")?;
        validate(&config)?;
        Ok(config)
    }
}

impl InterlinkConfigBuilder {
    #[must_use]
    pub fn min_relevance(mut self, score: u8) -> Self {
        self.config.min_relevance = score;
        self
    }

    #[must_use]
    pub fn max_links_per_item(mut self, max: usize) -> Self {
        self.config.max_links_per_item = max;
        self
    }

    #[must_use]
    pub fn min_source_words(mut self, words: usize) -> Self {
        self.config.min_source_words = words;
        self
    }

    #[must_use]
    pub fn min_anchor_length(mut self, chars: usize) -> Self {
        self.config.min_anchor_length = chars;
        self
    }

    #[must_use]
    pub fn min_single_word_length(mut self, chars: usize) -> Self {
        self.config.min_single_word_length = chars;
        self
    }

    #[must_use]
    pub fn max_body_keywords(mut self, count: usize) -> Self {
        self.config.max_body_keywords = count;
        self
    }

    #[must_use]
    pub fn max_body_chars(mut self, chars: usize) -> Self {
        self.config.max_body_chars = chars;
        self
    }

    #[must_use]
    pub fn similarity_prefix_chars(mut self, chars: usize) -> Self {
        self.config.similarity_prefix_chars = chars;
        self
    }

    #[must_use]
    pub fn inbound_scan_window(mut self, items: usize) -> Self {
        self.config.inbound_scan_window = items;
        self
    }

    #[must_use]
    pub fn default_batch_limit(mut self, items: usize) -> Self {
        self.config.default_batch_limit = items;
        self
    }

    #[must_use]
    pub fn hub_count(mut self, count: usize) -> Self {
        self.config.hub_count = count;
        self
    }

    #[must_use]
    pub fn article_url_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.config.article_url_prefix = prefix.into();
        self
    }

    #[must_use]
    pub fn page_url_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.config.page_url_prefix = prefix.into();
        self
    }

    #[must_use]
    pub fn static_routes(mut self, routes: Vec<String>) -> Self {
        self.config.static_routes = routes;
        self
    }

    /// Validate and produce the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any value is outside its valid range.
    pub fn build(self) -> Result<InterlinkConfig> {
        validate(&self.config)?;
        Ok(self.config)
    }
}

fn validate(config: &InterlinkConfig) -> Result<()> {
    if config.min_relevance > 100 {
        return Err(anyhow!(
            "min_relevance must be between 0 and 100, got {}",
            config.min_relevance
        ));
    }
    if config.max_links_per_item == 0 {
        return Err(anyhow!("max_links_per_item must be at least 1"));
    }
    if config.min_anchor_length == 0 {
        return Err(anyhow!("min_anchor_length must be at least 1"));
    }
    if config.max_body_chars == 0 || config.similarity_prefix_chars == 0 {
        return Err(anyhow!("body size limits must be non-zero"));
    }
    for prefix in [&config.article_url_prefix, &config.page_url_prefix] {
        if !prefix.is_empty() && !prefix.starts_with('/') {
            return Err(anyhow!("URL prefix '{prefix}' must start with '/'"));
        }
    }
    if let Some(route) = config.static_routes.iter().find(|r| !r.starts_with('/')) {
        return Err(anyhow!("static route '{route}' must start with '/'"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::ContentKind;

    #[test]
    fn test_defaults() {
        let config = InterlinkConfig::builder().build().unwrap();
        assert_eq!(config.min_relevance(), 35);
        assert_eq!(config.max_links_per_item(), 8);
        assert_eq!(config.max_candidates(), 16);
        assert_eq!(config.content_url(ContentKind::Article, "hello"), "/blog/hello");
        assert_eq!(config.content_url(ContentKind::Page, "about-us"), "/about-us");
    }

    #[test]
    fn test_rejects_out_of_range_values() {
        assert!(InterlinkConfig::builder().min_relevance(101).build().is_err());
        assert!(InterlinkConfig::builder().max_links_per_item(0).build().is_err());
        assert!(InterlinkConfig::builder().article_url_prefix("blog").build().is_err());
        assert!(
            InterlinkConfig::builder()
                .static_routes(vec!["about".to_string()])
                .build()
                .is_err()
        );
    }

    #[test]
    fn test_overrides() {
        let config = InterlinkConfig::builder()
            .min_relevance(50)
            .article_url_prefix("/posts/")
            .build()
            .unwrap();
        assert_eq!(config.min_relevance(), 50);
        assert_eq!(config.content_url(ContentKind::Article, "/x/"), "/posts/x");
    }

    #[test]
    fn test_from_json_file_partial() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("interlink.json");
        std::fs::write(&path, r#"{ "min_relevance": 40, "hub_count": 3 }"#).unwrap();

        let config = InterlinkConfig::from_json_file(&path).unwrap();
        assert_eq!(config.min_relevance(), 40);
        assert_eq!(config.hub_count(), 3);
        assert_eq!(config.max_links_per_item(), 8);
    }

    #[test]
    fn test_from_json_file_rejects_unknown_fields() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("interlink.json");
        std::fs::write(&path, r#"{ "min_relevanse": 40 }"#).unwrap();
        assert!(InterlinkConfig::from_json_file(&path).is_err());
    }
}
