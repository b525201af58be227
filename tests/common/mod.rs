//! Shared fixtures for the interlinking integration tests

use anyhow::{Result, anyhow};
use chrono::{Duration, Utc};
use kodegen_tools_interlink::{
    Article, ContentItem, ContentKey, ContentKind, ContentRepository, ContentStatus,
    InterlinkConfig, Interlinker, LinkStore, MemoryContentRepository, Page,
};

/// A published article that scores well as a link target from any source:
/// recent, popular and long.
#[allow(dead_code)]
pub fn article(id: i64, title: &str, slug: &str, body: &str) -> ContentItem {
    ContentItem::Article(Article {
        id,
        title: title.to_string(),
        slug: slug.to_string(),
        body: body.to_string(),
        status: ContentStatus::Published,
        tags: Vec::new(),
        categories: Vec::new(),
        keywords: Vec::new(),
        view_count: 10_000,
        word_count: Some(1500),
        published_at: Some(Utc::now() - Duration::days(2)),
        updated_at: Utc::now() - Duration::minutes(id),
    })
}

#[allow(dead_code)]
pub fn page(id: i64, title: &str, slug: &str, body: &str) -> ContentItem {
    ContentItem::Page(Page {
        id,
        title: title.to_string(),
        slug: slug.to_string(),
        body: body.to_string(),
        status: ContentStatus::Published,
        keywords: Vec::new(),
        view_count: 10_000,
        word_count: Some(1500),
        published_at: Some(Utc::now() - Duration::days(2)),
        updated_at: Utc::now() - Duration::minutes(id),
    })
}

/// Same item with a different status.
#[allow(dead_code)]
pub fn with_status(item: ContentItem, status: ContentStatus) -> ContentItem {
    match item {
        ContentItem::Article(mut a) => {
            a.status = status;
            ContentItem::Article(a)
        }
        ContentItem::Page(mut p) => {
            p.status = status;
            ContentItem::Page(p)
        }
    }
}

/// Same item with a different slug.
#[allow(dead_code)]
pub fn with_slug(item: ContentItem, slug: &str) -> ContentItem {
    match item {
        ContentItem::Article(mut a) => {
            a.slug = slug.to_string();
            ContentItem::Article(a)
        }
        ContentItem::Page(mut p) => {
            p.slug = slug.to_string();
            ContentItem::Page(p)
        }
    }
}

/// Source article: mentions its target in a heading, a paragraph and a
/// code block. Only the paragraph is linkable.
#[allow(dead_code)]
pub fn redis_basics() -> ContentItem {
    article(
        1,
        "Redis Basics",
        "redis-basics",
        "<h2>Cache eviction policies</h2>\
         <p>Redis keeps hot keys in memory. Choosing between cache eviction policies \
         matters for hit rates.</p>\
         <pre><code>cache eviction policies</code></pre>",
    )
}

/// Target article for `redis_basics`.
#[allow(dead_code)]
pub fn eviction_policies() -> ContentItem {
    article(
        2,
        "Cache Eviction Policies",
        "cache-eviction-policies",
        "<p>LRU and LFU decide which entries leave first.</p>",
    )
}

/// Published article sharing no phrase with the others.
#[allow(dead_code)]
pub fn gardening() -> ContentItem {
    article(
        3,
        "Tomato Gardening",
        "tomato-gardening",
        "<p>Seedlings want sunshine, compost and patience.</p>",
    )
}

#[allow(dead_code)]
pub const EVICTION_URL: &str = "/blog/cache-eviction-policies";

/// Engine over an in-memory repository and an in-memory store.
#[allow(dead_code)]
pub async fn engine(items: Vec<ContentItem>) -> Result<Interlinker<MemoryContentRepository>> {
    engine_with(items, InterlinkConfig::default()).await
}

#[allow(dead_code)]
pub async fn engine_with(
    items: Vec<ContentItem>,
    config: InterlinkConfig,
) -> Result<Interlinker<MemoryContentRepository>> {
    let store = LinkStore::open_in_memory().await?;
    Ok(Interlinker::new(
        MemoryContentRepository::with_items(items),
        store,
        config,
    ))
}

/// Titles, tags and SEO keywords only: body keywords are not extracted, so
/// each item is reachable through its title alone.
#[allow(dead_code)]
pub fn titles_only() -> Result<InterlinkConfig> {
    InterlinkConfig::builder().max_body_keywords(0).build()
}

/// Current body of an item, failing the test if it is missing.
#[allow(dead_code)]
pub async fn body_of<R: ContentRepository>(repo: &R, key: ContentKey) -> Result<String> {
    repo.find(key)
        .await?
        .map(|item| item.body().to_string())
        .ok_or_else(|| anyhow!("{key} not found"))
}

/// Memory repository whose body writes fail for one item.
#[allow(dead_code)]
#[derive(Clone)]
pub struct FlakyRepository {
    pub inner: MemoryContentRepository,
    pub fail_on: ContentKey,
}

impl ContentRepository for FlakyRepository {
    async fn find(&self, key: ContentKey) -> Result<Option<ContentItem>> {
        self.inner.find(key).await
    }

    async fn list_published(&self, kind: ContentKind) -> Result<Vec<ContentItem>> {
        self.inner.list_published(kind).await
    }

    async fn recently_updated(&self, kind: ContentKind, limit: usize) -> Result<Vec<ContentItem>> {
        self.inner.recently_updated(kind, limit).await
    }

    async fn count_published(&self, kind: ContentKind) -> Result<usize> {
        self.inner.count_published(kind).await
    }

    async fn find_containing(&self, needle: &str) -> Result<Vec<ContentItem>> {
        self.inner.find_containing(needle).await
    }

    async fn update_body(&self, key: ContentKey, body: &str) -> Result<bool> {
        if key == self.fail_on {
            return Err(anyhow!("write rejected for {key}"));
        }
        self.inner.update_body(key, body).await
    }
}
