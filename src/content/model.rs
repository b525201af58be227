//! Content records consumed by the interlinking engine.
//!
//! Articles and pages share most fields; pages have no tags or categories.
//! Those differences are defaulted here once so the rest of the engine works
//! against `ContentItem` accessors only.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The two kinds of linkable content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Article,
    Page,
}

impl ContentKind {
    pub const ALL: [ContentKind; 2] = [ContentKind::Article, ContentKind::Page];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ContentKind::Article => "article",
            ContentKind::Page => "page",
        }
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContentKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "article" => Ok(ContentKind::Article),
            "page" => Ok(ContentKind::Page),
            other => Err(format!("unknown content kind '{other}'")),
        }
    }
}

/// Publication state of a content item. Only `Published` items are linkable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentStatus {
    #[default]
    Draft,
    Scheduled,
    Published,
    Archived,
}

/// Identity of a content item across both kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ContentKey {
    pub id: i64,
    pub kind: ContentKind,
}

impl ContentKey {
    #[must_use]
    pub fn new(id: i64, kind: ContentKind) -> Self {
        Self { id, kind }
    }

    #[must_use]
    pub fn article(id: i64) -> Self {
        Self::new(id, ContentKind::Article)
    }

    #[must_use]
    pub fn page(id: i64) -> Self {
        Self::new(id, ContentKind::Page)
    }
}

impl fmt::Display for ContentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.kind, self.id)
    }
}

/// A blog article.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub id: i64,
    pub title: String,
    pub slug: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub status: ContentStatus,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub categories: Vec<String>,
    /// SEO keywords entered by editors
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub view_count: u64,
    #[serde(default)]
    pub word_count: Option<usize>,
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

/// A static page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    pub id: i64,
    pub title: String,
    pub slug: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub status: ContentStatus,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub view_count: u64,
    #[serde(default)]
    pub word_count: Option<usize>,
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

/// Any linkable content record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ContentItem {
    Article(Article),
    Page(Page),
}

impl ContentItem {
    #[must_use]
    pub fn key(&self) -> ContentKey {
        ContentKey::new(self.id(), self.kind())
    }

    #[must_use]
    pub fn kind(&self) -> ContentKind {
        match self {
            ContentItem::Article(_) => ContentKind::Article,
            ContentItem::Page(_) => ContentKind::Page,
        }
    }

    #[must_use]
    pub fn id(&self) -> i64 {
        match self {
            ContentItem::Article(a) => a.id,
            ContentItem::Page(p) => p.id,
        }
    }

    #[must_use]
    pub fn title(&self) -> &str {
        match self {
            ContentItem::Article(a) => &a.title,
            ContentItem::Page(p) => &p.title,
        }
    }

    #[must_use]
    pub fn slug(&self) -> &str {
        match self {
            ContentItem::Article(a) => &a.slug,
            ContentItem::Page(p) => &p.slug,
        }
    }

    #[must_use]
    pub fn body(&self) -> &str {
        match self {
            ContentItem::Article(a) => &a.body,
            ContentItem::Page(p) => &p.body,
        }
    }

    pub fn set_body(&mut self, body: String) {
        match self {
            ContentItem::Article(a) => a.body = body,
            ContentItem::Page(p) => p.body = body,
        }
    }

    #[must_use]
    pub fn status(&self) -> ContentStatus {
        match self {
            ContentItem::Article(a) => a.status,
            ContentItem::Page(p) => p.status,
        }
    }

    #[must_use]
    pub fn is_published(&self) -> bool {
        self.status() == ContentStatus::Published
    }

    /// Tags; always empty for pages.
    #[must_use]
    pub fn tags(&self) -> &[String] {
        match self {
            ContentItem::Article(a) => &a.tags,
            ContentItem::Page(_) => &[],
        }
    }

    /// Categories; always empty for pages.
    #[must_use]
    pub fn categories(&self) -> &[String] {
        match self {
            ContentItem::Article(a) => &a.categories,
            ContentItem::Page(_) => &[],
        }
    }

    #[must_use]
    pub fn keywords(&self) -> &[String] {
        match self {
            ContentItem::Article(a) => &a.keywords,
            ContentItem::Page(p) => &p.keywords,
        }
    }

    #[must_use]
    pub fn view_count(&self) -> u64 {
        match self {
            ContentItem::Article(a) => a.view_count,
            ContentItem::Page(p) => p.view_count,
        }
    }

    /// Stored word count, if the CMS tracks one.
    #[must_use]
    pub fn word_count(&self) -> Option<usize> {
        match self {
            ContentItem::Article(a) => a.word_count,
            ContentItem::Page(p) => p.word_count,
        }
    }

    #[must_use]
    pub fn published_at(&self) -> Option<DateTime<Utc>> {
        match self {
            ContentItem::Article(a) => a.published_at,
            ContentItem::Page(p) => p.published_at,
        }
    }

    #[must_use]
    pub fn updated_at(&self) -> DateTime<Utc> {
        match self {
            ContentItem::Article(a) => a.updated_at,
            ContentItem::Page(p) => p.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_defaults_tags_and_categories() {
        let json = r#"{
            "type": "page",
            "id": 3,
            "title": "About",
            "slug": "about",
            "updated_at": "2025-01-01T00:00:00Z"
        }"#;
        let item: ContentItem = serde_json::from_str(json).unwrap();
        assert_eq!(item.key(), ContentKey::page(3));
        assert!(item.tags().is_empty());
        assert!(item.categories().is_empty());
        assert_eq!(item.status(), ContentStatus::Draft);
        assert_eq!(item.body(), "");
    }

    #[test]
    fn test_article_round_trip_tagging() {
        let json = r#"{
            "type": "article",
            "id": 1,
            "title": "Intro",
            "slug": "intro",
            "status": "published",
            "tags": ["caching"],
            "updated_at": "2025-01-01T00:00:00Z"
        }"#;
        let item: ContentItem = serde_json::from_str(json).unwrap();
        assert!(item.is_published());
        assert_eq!(item.tags(), &["caching".to_string()]);
        let back = serde_json::to_value(&item).unwrap();
        assert_eq!(back["type"], "article");
    }

    #[test]
    fn test_kind_parsing() {
        assert_eq!("Article".parse::<ContentKind>().unwrap(), ContentKind::Article);
        assert_eq!("page".parse::<ContentKind>().unwrap(), ContentKind::Page);
        assert!("video".parse::<ContentKind>().is_err());
        assert_eq!(ContentKey::article(9).to_string(), "article#9");
    }
}
