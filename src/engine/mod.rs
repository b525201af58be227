//! The interlinking engine.
//!
//! `Interlinker` ties the content repository, the link store and the pure
//! discovery/injection pipeline together. Every public operation is a
//! sequential unit of work: the index and exclusion snapshot are rebuilt at
//! its start and passed down explicitly.

pub mod batch;
pub mod lifecycle;
pub mod manual;
pub mod report;

use chrono::Utc;
use serde::Serialize;

pub use batch::{BatchItemDetail, BatchSummary, split_batch};
pub use lifecycle::{DiscoveryOutcome, RetireOutcome, UpdateOutcome};
pub use manual::ManualLinkRequest;
pub use report::{InboundDistribution, InterlinkReport, ReportItem};

use crate::config::InterlinkConfig;
use crate::content::{ContentItem, ContentKey, ContentRepository};
use crate::error::{InterlinkError, InterlinkResult};
use crate::html::{
    BrokenLink, InjectedLink, InjectionOptions, count_injected_anchors, detect_broken_links,
    inject_links, remove_broken_links_from_html,
};
use crate::index::{ContentIndex, ContentIndexEntry};
use crate::links::{ExclusionSet, InternalLinkRecord, LinkFilter, LinkOrigin, LinkStatus, NewLink};
use crate::matching::{LinkCandidate, Scanner};
use crate::store::LinkStore;
use crate::utils::normalize_path;

/// What a scan found for one source item.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ScanReport {
    /// Records already persisted with this item as source
    pub existing_links: Vec<InternalLinkRecord>,
    /// Candidates not yet present in the markup, now stored as suggestions
    pub new_candidates: Vec<LinkCandidate>,
    /// Internal anchors whose target no longer resolves
    pub broken_links: Vec<BrokenLink>,
}

/// Effect of auto-linking one item.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AutoLinkOutcome {
    pub inserted: usize,
    pub broken_fixed: usize,
    pub links: Vec<InjectedLink>,
}

/// Auto-interlinking engine over a content repository and a link store.
pub struct Interlinker<R: ContentRepository> {
    repo: R,
    store: LinkStore,
    config: InterlinkConfig,
}

impl<R: ContentRepository> Interlinker<R> {
    pub fn new(repo: R, store: LinkStore, config: InterlinkConfig) -> Self {
        Self {
            repo,
            store,
            config,
        }
    }

    pub fn repo(&self) -> &R {
        &self.repo
    }

    pub fn store(&self) -> &LinkStore {
        &self.store
    }

    pub fn config(&self) -> &InterlinkConfig {
        &self.config
    }

    /// Fresh index and exclusion snapshot for one top-level operation.
    ///
    /// Rejected and removed records are folded into the pair exclusions.
    pub async fn load_context(&self) -> InterlinkResult<(ContentIndex, ExclusionSet)> {
        let index = ContentIndex::load(&self.repo, &self.config)
            .await
            .map_err(InterlinkError::repository)?;
        let rules = self.store.list_exclusions().await?;
        let suppressed = self.store.suppressed_pairs().await?;
        let exclusions = ExclusionSet::from_rules(&rules).with_suppressed_pairs(suppressed);
        Ok((index, exclusions))
    }

    /// Report existing links, new candidates and broken links for one item.
    ///
    /// New candidates are persisted as SUGGESTED. A missing item yields an
    /// empty report.
    pub async fn scan(&self, key: ContentKey) -> InterlinkResult<ScanReport> {
        crate::log_operation!("scan", key, self.scan_item(key).await)
    }

    async fn scan_item(&self, key: ContentKey) -> InterlinkResult<ScanReport> {
        let Some(item) = self.find(key).await? else {
            log::debug!("Scan skipped: {key} not found");
            return Ok(ScanReport::default());
        };
        let (index, exclusions) = self.load_context().await?;
        let entry = self.entry_for(&item, &index);

        let new_candidates: Vec<LinkCandidate> = self
            .scanner(&index, &exclusions)
            .scan(&entry, item.body())
            .into_iter()
            .filter(|c| !c.already_linked)
            .collect();
        self.persist_suggestions(&new_candidates, LinkOrigin::Auto).await?;

        let broken_links =
            detect_broken_links(item.body(), index.known_urls(), self.config.static_routes());
        let existing_links = self
            .store
            .list_links(&LinkFilter::default().with_source(key))
            .await?;

        Ok(ScanReport {
            existing_links,
            new_candidates,
            broken_links,
        })
    }

    /// Scan, inject, repair broken links and persist what was inserted.
    pub async fn auto_link(&self, key: ContentKey) -> InterlinkResult<AutoLinkOutcome> {
        crate::log_operation!("auto_link", key, self.auto_link_item(key).await)
    }

    async fn auto_link_item(&self, key: ContentKey) -> InterlinkResult<AutoLinkOutcome> {
        let Some(item) = self.find(key).await? else {
            log::debug!("Auto-link skipped: {key} not found");
            return Ok(AutoLinkOutcome::default());
        };
        let (index, exclusions) = self.load_context().await?;
        self.auto_link_with(&item, &index, &exclusions, LinkOrigin::Auto)
            .await
    }

    /// Auto-link one item against an already built snapshot.
    pub(crate) async fn auto_link_with(
        &self,
        item: &ContentItem,
        index: &ContentIndex,
        exclusions: &ExclusionSet,
        origin: LinkOrigin,
    ) -> InterlinkResult<AutoLinkOutcome> {
        let key = item.key();
        if exclusions.is_source_excluded(key) {
            return Ok(AutoLinkOutcome::default());
        }

        let entry = self.entry_for(item, index);
        let candidates = self.scanner(index, exclusions).scan(&entry, item.body());

        // Anchors from earlier passes count against the per-item cap
        let mut options = InjectionOptions::from_config(&self.config);
        options.max_links = options
            .max_links
            .saturating_sub(count_injected_anchors(item.body()));
        let injection = inject_links(item.body(), &candidates, options);

        let broken = detect_broken_links(
            &injection.html,
            index.known_urls(),
            self.config.static_routes(),
        );
        let broken_urls: Vec<String> = broken.iter().map(|b| b.href.clone()).collect();
        let repaired = remove_broken_links_from_html(&injection.html, &broken_urls)
            .map_err(InterlinkError::markup)?;

        if repaired.html != item.body() {
            let updated = self
                .repo
                .update_body(key, &repaired.html)
                .await
                .map_err(InterlinkError::repository)?;
            if !updated {
                log::warn!("{key} disappeared before its body could be updated");
                return Ok(AutoLinkOutcome::default());
            }
        }

        for link in &injection.inserted {
            self.store
                .activate_link(&NewLink {
                    source: key,
                    target: link.target,
                    anchor_text: link.anchor_text.clone(),
                    target_url: link.target_url.clone(),
                    relevance: link.relevance,
                    status: LinkStatus::Active,
                    origin,
                })
                .await?;
        }

        if !broken_urls.is_empty() {
            let paths: Vec<String> = broken_urls
                .iter()
                .filter_map(|href| normalize_path(href))
                .collect();
            self.store.mark_broken_from_source(key, &paths).await?;
        }

        if injection.inserted_count() > 0 || repaired.count > 0 {
            log::info!(
                "Auto-linked {key}: {} inserted, {} broken removed",
                injection.inserted_count(),
                repaired.count
            );
        }

        Ok(AutoLinkOutcome {
            inserted: injection.inserted_count(),
            broken_fixed: repaired.count,
            links: injection.inserted,
        })
    }

    /// Links with `filter` applied.
    pub async fn list_links(&self, filter: &LinkFilter) -> InterlinkResult<Vec<InternalLinkRecord>> {
        self.store.list_links(filter).await
    }

    pub(crate) async fn find(&self, key: ContentKey) -> InterlinkResult<Option<ContentItem>> {
        self.repo.find(key).await.map_err(InterlinkError::repository)
    }

    pub(crate) fn scanner<'a>(
        &'a self,
        index: &'a ContentIndex,
        exclusions: &'a ExclusionSet,
    ) -> Scanner<'a> {
        Scanner::new(index, exclusions, &self.config, Utc::now())
    }

    /// Index entry for an item, derived on the spot when it is not indexed
    /// (drafts, or items changed since the snapshot was taken).
    pub(crate) fn entry_for(&self, item: &ContentItem, index: &ContentIndex) -> ContentIndexEntry {
        match index.get(item.key()) {
            Some(entry) if entry.slug == item.slug() => entry.clone(),
            _ => ContentIndexEntry::from_item(item, &self.config),
        }
    }

    /// Store candidates as suggestions; returns how many rows were new.
    pub(crate) async fn persist_suggestions(
        &self,
        candidates: &[LinkCandidate],
        origin: LinkOrigin,
    ) -> InterlinkResult<usize> {
        let mut inserted = 0;
        for candidate in candidates.iter().filter(|c| !c.already_linked) {
            let outcome = self
                .store
                .insert_link(&NewLink::from_candidate(
                    candidate,
                    LinkStatus::Suggested,
                    origin,
                ))
                .await?;
            if outcome.is_inserted() {
                inserted += 1;
            }
        }
        Ok(inserted)
    }
}
