//! In-memory `ContentRepository`.
//!
//! Backs the command-line runner (content loaded from a JSON file) and the
//! test suites.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::RwLock;

use super::model::{ContentItem, ContentKey, ContentKind};
use super::repository::ContentRepository;

/// Content held in a sorted map keyed by `ContentKey`.
#[derive(Clone, Default)]
pub struct MemoryContentRepository {
    items: Arc<RwLock<BTreeMap<ContentKey, ContentItem>>>,
}

impl MemoryContentRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a repository from a list of items. Later duplicates win.
    #[must_use]
    pub fn with_items(items: impl IntoIterator<Item = ContentItem>) -> Self {
        let map = items.into_iter().map(|item| (item.key(), item)).collect();
        Self {
            items: Arc::new(RwLock::new(map)),
        }
    }

    /// Load a JSON array of content items.
    pub async fn load_json(path: &Path) -> Result<Self> {
        let raw = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read content file {}", path.display()))?;
        let items: Vec<ContentItem> =
            serde_json::from_str(&raw).context("Failed to parse content file")?;
        Ok(Self::with_items(items))
    }

    /// Write all items back as a pretty-printed JSON array.
    pub async fn save_json(&self, path: &Path) -> Result<()> {
        let items = self.snapshot().await;
        let raw = serde_json::to_string_pretty(&items).context("Failed to serialize content")?;
        tokio::fs::write(path, raw)
            .await
            .with_context(|| format!("Failed to write content file {}", path.display()))
    }

    /// Insert or replace an item (as the CMS would on save).
    pub async fn upsert(&self, item: ContentItem) {
        self.items.write().await.insert(item.key(), item);
    }

    /// Remove an item, returning it if it existed.
    pub async fn remove(&self, key: ContentKey) -> Option<ContentItem> {
        self.items.write().await.remove(&key)
    }

    /// All items in key order.
    pub async fn snapshot(&self) -> Vec<ContentItem> {
        self.items.read().await.values().cloned().collect()
    }
}

impl ContentRepository for MemoryContentRepository {
    async fn find(&self, key: ContentKey) -> Result<Option<ContentItem>> {
        Ok(self.items.read().await.get(&key).cloned())
    }

    async fn list_published(&self, kind: ContentKind) -> Result<Vec<ContentItem>> {
        Ok(self
            .items
            .read()
            .await
            .values()
            .filter(|item| item.kind() == kind && item.is_published())
            .cloned()
            .collect())
    }

    async fn recently_updated(&self, kind: ContentKind, limit: usize) -> Result<Vec<ContentItem>> {
        let mut items = self.list_published(kind).await?;
        // Newest first; id breaks ties so the order is stable
        items.sort_by(|a, b| {
            b.updated_at()
                .cmp(&a.updated_at())
                .then_with(|| b.id().cmp(&a.id()))
        });
        items.truncate(limit);
        Ok(items)
    }

    async fn count_published(&self, kind: ContentKind) -> Result<usize> {
        Ok(self
            .items
            .read()
            .await
            .values()
            .filter(|item| item.kind() == kind && item.is_published())
            .count())
    }

    async fn find_containing(&self, needle: &str) -> Result<Vec<ContentItem>> {
        Ok(self
            .items
            .read()
            .await
            .values()
            .filter(|item| item.body().contains(needle))
            .cloned()
            .collect())
    }

    async fn update_body(&self, key: ContentKey, body: &str) -> Result<bool> {
        let mut items = self.items.write().await;
        match items.get_mut(&key) {
            Some(item) => {
                item.set_body(body.to_string());
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{Article, ContentStatus};
    use chrono::{Duration, TimeZone, Utc};

    fn article(id: i64, status: ContentStatus, age_days: i64) -> ContentItem {
        let base = Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap();
        ContentItem::Article(Article {
            id,
            title: format!("Article {id}"),
            slug: format!("article-{id}"),
            body: format!("<p>body {id} /blog/article-1</p>"),
            status,
            tags: vec![],
            categories: vec![],
            keywords: vec![],
            view_count: 0,
            word_count: None,
            published_at: Some(base),
            updated_at: base - Duration::days(age_days),
        })
    }

    #[tokio::test]
    async fn test_recently_updated_orders_newest_first() -> Result<()> {
        let repo = MemoryContentRepository::with_items(vec![
            article(1, ContentStatus::Published, 10),
            article(2, ContentStatus::Published, 1),
            article(3, ContentStatus::Draft, 0),
            article(4, ContentStatus::Published, 5),
        ]);

        let recent = repo.recently_updated(ContentKind::Article, 2).await?;
        let ids: Vec<i64> = recent.iter().map(ContentItem::id).collect();
        assert_eq!(ids, vec![2, 4]);
        assert_eq!(repo.count_published(ContentKind::Article).await?, 3);
        assert_eq!(repo.count_published(ContentKind::Page).await?, 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_update_body_and_find_containing() -> Result<()> {
        let repo = MemoryContentRepository::with_items(vec![
            article(1, ContentStatus::Published, 0),
            article(2, ContentStatus::Draft, 0),
        ]);

        assert_eq!(repo.find_containing("/blog/article-1").await?.len(), 2);
        assert!(repo.update_body(ContentKey::article(2), "<p>new</p>").await?);
        assert!(!repo.update_body(ContentKey::article(99), "<p>x</p>").await?);
        assert_eq!(repo.find_containing("/blog/article-1").await?.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_json_round_trip() -> Result<()> {
        let dir = tempfile::TempDir::new()?;
        let path = dir.path().join("content.json");
        let repo = MemoryContentRepository::with_items(vec![article(1, ContentStatus::Published, 0)]);
        repo.save_json(&path).await?;

        let loaded = MemoryContentRepository::load_json(&path).await?;
        assert_eq!(loaded.snapshot().await, repo.snapshot().await);
        Ok(())
    }
}
