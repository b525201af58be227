//! Reactions to content lifecycle events.
//!
//! Every hook is safe to re-run after a partial failure: inserts are
//! idempotent, status updates skip rows already in their final state and
//! markup rewrites find nothing left to change.

use std::collections::{BTreeMap, HashSet};

use serde::Serialize;

use super::Interlinker;
use crate::content::{ContentItem, ContentKey, ContentKind, ContentRepository};
use crate::error::{InterlinkError, InterlinkResult};
use crate::html::{rewrite_urls_in_html, unlink_urls_in_html};
use crate::index::ContentIndex;
use crate::links::{ExclusionSet, LinkOrigin};

/// Suggestions created by discovery for a new or changed item.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DiscoveryOutcome {
    /// New SUGGESTED records with the item as source
    pub outbound_suggested: usize,
    /// New SUGGESTED records from other items pointing at this one
    pub inbound_suggested: usize,
}

/// Cleanup after an item stops being linkable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RetireOutcome {
    pub records_broken: u64,
    pub bodies_repaired: usize,
    pub anchors_removed: usize,
    pub source_records_deleted: u64,
}

/// Everything `on_content_updated` did.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UpdateOutcome {
    /// Hrefs rewritten from the old URL to the new one
    pub urls_rewritten: usize,
    /// Bodies that contained at least one rewritten href
    pub bodies_rewritten: usize,
    pub records_retargeted: u64,
    pub stale_suggestions_removed: u64,
    pub discovery: DiscoveryOutcome,
    /// Set when the update unpublished the item
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retired: Option<RetireOutcome>,
}

impl<R: ContentRepository> Interlinker<R> {
    /// Discover outbound and inbound suggestions for newly published content.
    pub async fn on_content_created(&self, key: ContentKey) -> InterlinkResult<DiscoveryOutcome> {
        crate::log_operation!("on_content_created", key, self.discover_created(key).await)
    }

    /// Reconcile link state after an edit. `previous` is the item as it was
    /// before the edit; the current version is read from the repository.
    pub async fn on_content_updated(&self, previous: &ContentItem) -> InterlinkResult<UpdateOutcome> {
        let key = previous.key();
        crate::log_operation!("on_content_updated", key, self.reconcile_update(previous).await)
    }

    /// Break records targeting a deleted item, strip its anchors from other
    /// bodies, and drop the records it was the source of.
    pub async fn on_content_deleted(&self, item: &ContentItem) -> InterlinkResult<RetireOutcome> {
        let key = item.key();
        let url = self.config.content_url(item.kind(), item.slug());
        crate::log_operation!("on_content_deleted", key, self.delete(key, url).await)
    }

    /// Same cleanup as deletion, for an item that still exists but is no
    /// longer published. Its REJECTED and REMOVED records are kept so the
    /// pairs stay suppressed if it is published again.
    pub async fn on_content_unpublished(&self, key: ContentKey) -> InterlinkResult<RetireOutcome> {
        crate::log_operation!("on_content_unpublished", key, self.unpublish(key).await)
    }

    async fn discover_created(&self, key: ContentKey) -> InterlinkResult<DiscoveryOutcome> {
        let Some(item) = self.find(key).await? else {
            return Ok(DiscoveryOutcome::default());
        };
        self.discover(&item).await
    }

    async fn unpublish(&self, key: ContentKey) -> InterlinkResult<RetireOutcome> {
        let url = self
            .find(key)
            .await?
            .map(|item| self.config.content_url(item.kind(), item.slug()));
        self.retire_unpublished(key, url).await
    }

    async fn retire_unpublished(
        &self,
        key: ContentKey,
        url: Option<String>,
    ) -> InterlinkResult<RetireOutcome> {
        let mut outcome = self.retire(key, url).await?;
        outcome.source_records_deleted = self.store.delete_live_for_source(key).await?;
        Ok(outcome)
    }

    async fn delete(&self, key: ContentKey, url: String) -> InterlinkResult<RetireOutcome> {
        let mut outcome = self.retire(key, Some(url)).await?;
        outcome.source_records_deleted = self.store.delete_for_source(key).await?;
        Ok(outcome)
    }

    async fn reconcile_update(&self, previous: &ContentItem) -> InterlinkResult<UpdateOutcome> {
        let key = previous.key();
        let mut outcome = UpdateOutcome::default();

        let Some(mut current) = self.find(key).await? else {
            log::debug!("Update skipped: {key} no longer exists");
            return Ok(outcome);
        };

        if previous.slug() != current.slug() {
            let old_url = self.config.content_url(key.kind, previous.slug());
            let new_url = self.config.content_url(key.kind, current.slug());
            let (urls, bodies) = self.propagate_rename(&old_url, &new_url).await?;
            outcome.urls_rewritten = urls;
            outcome.bodies_rewritten = bodies;
            outcome.records_retargeted = self.store.update_target_url(key, &new_url).await?;
            log::info!(
                "Renamed {key}: {old_url} -> {new_url}, {urls} hrefs in {bodies} bodies"
            );

            // The item may have linked to itself
            if let Some(refreshed) = self.find(key).await? {
                current = refreshed;
            }
        }

        if previous.is_published() && !current.is_published() {
            let url = self.config.content_url(key.kind, current.slug());
            outcome.retired = Some(self.retire_unpublished(key, Some(url)).await?);
            return Ok(outcome);
        }

        let body_changed = previous.body() != current.body();
        let status_changed = previous.status() != current.status();
        if (body_changed || status_changed) && current.is_published() {
            outcome.stale_suggestions_removed = self.store.delete_suggested_for_source(key).await?;
            outcome.discovery = self.discover(&current).await?;
        }

        Ok(outcome)
    }

    /// Rewrite `old_url` to `new_url` in every body that mentions it.
    /// Returns (hrefs rewritten, bodies changed).
    async fn propagate_rename(&self, old_url: &str, new_url: &str) -> InterlinkResult<(usize, usize)> {
        let referencing = self
            .repo
            .find_containing(old_url)
            .await
            .map_err(InterlinkError::repository)?;

        let mut rewritten = 0;
        let mut bodies = 0;
        for item in referencing {
            let result =
                rewrite_urls_in_html(item.body(), old_url, new_url).map_err(InterlinkError::markup)?;
            if result.count == 0 {
                continue;
            }
            let updated = self
                .repo
                .update_body(item.key(), &result.html)
                .await
                .map_err(InterlinkError::repository)?;
            if updated {
                rewritten += result.count;
                bodies += 1;
            }
        }
        Ok((rewritten, bodies))
    }

    /// Outbound and inbound discovery for one published item.
    async fn discover(&self, item: &ContentItem) -> InterlinkResult<DiscoveryOutcome> {
        let key = item.key();
        if !item.is_published() {
            return Ok(DiscoveryOutcome::default());
        }

        let (index, exclusions) = self.load_context().await?;
        if exclusions.is_source_excluded(key) {
            log::debug!("Discovery skipped: {key} is an excluded source");
            return Ok(DiscoveryOutcome::default());
        }

        let entry = self.entry_for(item, &index);
        let outbound = self.scanner(&index, &exclusions).scan(&entry, item.body());
        let outbound_suggested = self.persist_suggestions(&outbound, LinkOrigin::Auto).await?;

        let inbound_suggested = self.discover_inbound(key, &index, &exclusions).await?;

        Ok(DiscoveryOutcome {
            outbound_suggested,
            inbound_suggested,
        })
    }

    /// Scan the most recently updated content for links pointing at `target`.
    async fn discover_inbound(
        &self,
        target: ContentKey,
        index: &ContentIndex,
        exclusions: &ExclusionSet,
    ) -> InterlinkResult<usize> {
        let window = self.config.inbound_scan_window();
        let mut recent = Vec::new();
        for kind in ContentKind::ALL {
            recent.extend(
                self.repo
                    .recently_updated(kind, window)
                    .await
                    .map_err(InterlinkError::repository)?,
            );
        }
        recent.sort_by(|a, b| {
            b.updated_at()
                .cmp(&a.updated_at())
                .then_with(|| a.key().cmp(&b.key()))
        });
        recent.truncate(window);

        let targets = HashSet::from([target]);
        let scanner = self.scanner(index, exclusions);
        let mut inserted = 0;
        for source in recent.iter().filter(|s| s.key() != target) {
            let entry = self.entry_for(source, index);
            let candidates = scanner.scan_targets(&entry, source.body(), &targets);
            inserted += self.persist_suggestions(&candidates, LinkOrigin::Auto).await?;
        }
        Ok(inserted)
    }

    /// Cleanup shared by deleted and unpublished items: break inbound
    /// records and strip anchors to the item from other bodies.
    async fn retire(&self, key: ContentKey, url: Option<String>) -> InterlinkResult<RetireOutcome> {
        let mut outcome = RetireOutcome {
            records_broken: self.store.mark_broken_for_target(key).await?,
            ..RetireOutcome::default()
        };

        let mut urls: Vec<String> = url.into_iter().collect();
        for stored in self.store.target_urls_for(key).await? {
            if !urls.contains(&stored) {
                urls.push(stored);
            }
        }

        // Each referencing body is rewritten once even if it mentions
        // several of the URLs
        let mut referencing: BTreeMap<ContentKey, ContentItem> = BTreeMap::new();
        for url in &urls {
            for item in self
                .repo
                .find_containing(url)
                .await
                .map_err(InterlinkError::repository)?
            {
                if item.key() != key {
                    referencing.entry(item.key()).or_insert(item);
                }
            }
        }

        for (source, item) in referencing {
            let result = unlink_urls_in_html(item.body(), &urls).map_err(InterlinkError::markup)?;
            if result.count == 0 {
                continue;
            }
            let updated = self
                .repo
                .update_body(source, &result.html)
                .await
                .map_err(InterlinkError::repository)?;
            if updated {
                outcome.bodies_repaired += 1;
                outcome.anchors_removed += result.count;
            }
        }

        log::info!(
            "Retired {key}: {} records broken, {} anchors removed from {} bodies",
            outcome.records_broken,
            outcome.anchors_removed,
            outcome.bodies_repaired
        );
        Ok(outcome)
    }
}
