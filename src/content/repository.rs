//! Content repository seam.
//!
//! Content storage belongs to the surrounding CMS. The engine only needs the
//! handful of reads and the single write declared here.

use std::future::Future;

use anyhow::Result;

use super::model::{ContentItem, ContentKey, ContentKind};

/// Read/write access to content records.
///
/// Errors returned here surface as `InterlinkError::Repository`.
pub trait ContentRepository: Send + Sync {
    /// Fetch one item regardless of status.
    fn find(&self, key: ContentKey) -> impl Future<Output = Result<Option<ContentItem>>> + Send;

    /// All published items of one kind, in a stable order.
    fn list_published(&self, kind: ContentKind)
    -> impl Future<Output = Result<Vec<ContentItem>>> + Send;

    /// Published items of one kind, most recently updated first.
    fn recently_updated(
        &self,
        kind: ContentKind,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<ContentItem>>> + Send;

    /// Number of published items of one kind.
    fn count_published(&self, kind: ContentKind) -> impl Future<Output = Result<usize>> + Send;

    /// Items of any status whose body markup contains `needle`.
    fn find_containing(&self, needle: &str)
    -> impl Future<Output = Result<Vec<ContentItem>>> + Send;

    /// Replace an item's body markup. Returns `false` if the item is gone.
    fn update_body(&self, key: ContentKey, body: &str) -> impl Future<Output = Result<bool>> + Send;
}
