//! In-memory catalogue of linkable content.
//!
//! A `ContentIndex` is a value object: it is built fresh at the start of each
//! top-level operation and passed explicitly to whatever needs it.

pub mod entry;
pub mod keywords;

use std::collections::{HashMap, HashSet};

use anyhow::Result;

pub use entry::ContentIndexEntry;
pub use keywords::{extract_keywords, is_stop_word};

use crate::config::InterlinkConfig;
use crate::content::{ContentItem, ContentKey, ContentKind, ContentRepository};

/// Published content in a fixed order, with lookups by key and URL.
#[derive(Debug, Clone, Default)]
pub struct ContentIndex {
    entries: Vec<ContentIndexEntry>,
    positions: HashMap<ContentKey, usize>,
    known_urls: HashSet<String>,
}

impl ContentIndex {
    /// Index the published items among `items`, keeping their order.
    pub fn build(items: &[ContentItem], config: &InterlinkConfig) -> Self {
        let mut index = Self::default();
        for item in items.iter().filter(|item| item.is_published()) {
            if index.positions.contains_key(&item.key()) {
                continue;
            }
            let entry = ContentIndexEntry::from_item(item, config);
            index.positions.insert(entry.key, index.entries.len());
            index.known_urls.insert(entry.url.clone());
            index.entries.push(entry);
        }
        index
    }

    /// Load every published article, then every published page.
    pub async fn load<R: ContentRepository>(repo: &R, config: &InterlinkConfig) -> Result<Self> {
        let mut items = Vec::new();
        for kind in ContentKind::ALL {
            items.extend(repo.list_published(kind).await?);
        }
        let index = Self::build(&items, config);
        log::debug!(
            "Built content index: {} entries, {} known URLs",
            index.len(),
            index.known_urls.len()
        );
        Ok(index)
    }

    pub fn get(&self, key: ContentKey) -> Option<&ContentIndexEntry> {
        self.positions.get(&key).map(|&idx| &self.entries[idx])
    }

    pub fn entries(&self) -> &[ContentIndexEntry] {
        &self.entries
    }

    /// Canonical URLs of every indexed item.
    pub fn known_urls(&self) -> &HashSet<String> {
        &self.known_urls
    }

    #[must_use]
    pub fn contains_url(&self, url: &str) -> bool {
        self.known_urls.contains(url)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
