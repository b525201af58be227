//! Bounded batch runs over the most recently updated content.

use serde::Serialize;

use super::Interlinker;
use crate::content::{ContentKey, ContentKind, ContentRepository};
use crate::error::{InterlinkError, InterlinkResult};
use crate::links::LinkOrigin;

/// Per-item result of a batch run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchItemDetail {
    pub key: ContentKey,
    pub title: String,
    pub inserted: usize,
    pub broken_fixed: usize,
    /// Set when this item failed; the batch carried on
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Totals and details of one batch run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub scanned: usize,
    pub total_inserted: usize,
    pub total_broken: usize,
    pub details: Vec<BatchItemDetail>,
}

impl BatchSummary {
    #[must_use]
    pub fn failed(&self) -> usize {
        self.details.iter().filter(|d| d.error.is_some()).count()
    }
}

/// Split `limit` slots between articles and pages by their published counts.
///
/// A kind with content gets at least one slot when `limit` allows it, and
/// slots one kind cannot use go to the other.
#[must_use]
pub fn split_batch(limit: usize, articles: usize, pages: usize) -> (usize, usize) {
    let total = articles + pages;
    if limit == 0 || total == 0 {
        return (0, 0);
    }

    let share = (limit as f64 * articles as f64 / total as f64).round() as usize;
    let mut article_slots = share.min(limit);
    if articles > 0 && article_slots == 0 {
        article_slots = 1;
    }
    if pages > 0 && article_slots == limit && limit > 1 {
        article_slots = limit - 1;
    }
    let mut page_slots = limit - article_slots;

    if article_slots > articles {
        page_slots += article_slots - articles;
        article_slots = articles;
    }
    if page_slots > pages {
        article_slots = (article_slots + page_slots - pages).min(articles);
        page_slots = pages;
    }

    (article_slots, page_slots)
}

impl<R: ContentRepository> Interlinker<R> {
    /// Auto-link up to `limit` items (the configured default when `None`),
    /// most recently updated first.
    ///
    /// A failing item is recorded in its detail entry and the run continues.
    /// Only connectivity failures abort the run.
    pub async fn auto_link_all(&self, limit: Option<usize>) -> InterlinkResult<BatchSummary> {
        let limit = limit.unwrap_or(self.config.default_batch_limit());
        crate::log_operation!("auto_link_all", limit, self.run_batch(limit).await)
    }

    async fn run_batch(&self, limit: usize) -> InterlinkResult<BatchSummary> {
        let articles = self.count_published(ContentKind::Article).await?;
        let pages = self.count_published(ContentKind::Page).await?;
        let (article_slots, page_slots) = split_batch(limit, articles, pages);
        log::info!(
            "Batch run: {article_slots} of {articles} articles, {page_slots} of {pages} pages"
        );

        let mut items = Vec::with_capacity(article_slots + page_slots);
        for (kind, slots) in [
            (ContentKind::Article, article_slots),
            (ContentKind::Page, page_slots),
        ] {
            if slots > 0 {
                items.extend(
                    self.repo
                        .recently_updated(kind, slots)
                        .await
                        .map_err(InterlinkError::repository)?,
                );
            }
        }

        let (index, exclusions) = self.load_context().await?;
        let mut summary = BatchSummary::default();

        for item in &items {
            let key = item.key();
            summary.scanned += 1;

            match self
                .auto_link_with(item, &index, &exclusions, LinkOrigin::Cron)
                .await
            {
                Ok(outcome) => {
                    summary.total_inserted += outcome.inserted;
                    summary.total_broken += outcome.broken_fixed;
                    summary.details.push(BatchItemDetail {
                        key,
                        title: item.title().to_string(),
                        inserted: outcome.inserted,
                        broken_fixed: outcome.broken_fixed,
                        error: None,
                    });
                }
                Err(e) if e.is_connectivity() => return Err(e),
                Err(e) => {
                    log::warn!("Batch item {key} failed: {e}");
                    summary.details.push(BatchItemDetail {
                        key,
                        title: item.title().to_string(),
                        inserted: 0,
                        broken_fixed: 0,
                        error: Some(e.to_string()),
                    });
                }
            }
        }

        log::info!(
            "Batch complete: {} scanned, {} inserted, {} broken removed, {} failed",
            summary.scanned,
            summary.total_inserted,
            summary.total_broken,
            summary.failed()
        );
        Ok(summary)
    }

    async fn count_published(&self, kind: ContentKind) -> InterlinkResult<usize> {
        self.repo
            .count_published(kind)
            .await
            .map_err(InterlinkError::repository)
    }
}
