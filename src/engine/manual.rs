//! Editor-driven link curation.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::Interlinker;
use crate::content::{ContentKey, ContentRepository};
use crate::error::{InterlinkError, InterlinkResult};
use crate::html::{InjectionOptions, LinkedState, inject_links, unlink_injected_in_html};
use crate::index::ContentIndexEntry;
use crate::links::{
    ExclusionRule, ExclusionScope, InternalLinkRecord, LinkOrigin, LinkStatus, NewLink,
};
use crate::matching::{LinkCandidate, calculate_relevance};

/// An editor's request to link `anchor_text` in `source` to `target`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManualLinkRequest {
    pub source: ContentKey,
    pub target: ContentKey,
    pub anchor_text: String,
}

impl<R: ContentRepository> Interlinker<R> {
    /// Record an APPROVED manual link.
    ///
    /// Returns `None` when either item does not exist. An existing record
    /// with the same identity is returned as-is, except that a SUGGESTED one
    /// is promoted to APPROVED.
    pub async fn create_manual_link(
        &self,
        request: &ManualLinkRequest,
    ) -> InterlinkResult<Option<InternalLinkRecord>> {
        if request.source == request.target {
            return Err(InterlinkError::InvalidRequest(format!(
                "{} cannot link to itself",
                request.source
            )));
        }
        let anchor_text = request
            .anchor_text
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ");
        if anchor_text.is_empty() {
            return Err(InterlinkError::InvalidRequest(
                "Anchor text must not be empty".to_string(),
            ));
        }

        let (Some(source), Some(target)) =
            (self.find(request.source).await?, self.find(request.target).await?)
        else {
            return Ok(None);
        };

        let source_entry = ContentIndexEntry::from_item(&source, &self.config);
        let target_entry = ContentIndexEntry::from_item(&target, &self.config);
        let relevance = calculate_relevance(
            &source_entry,
            &target_entry,
            Utc::now(),
            self.config.similarity_prefix_chars(),
        );

        let outcome = self
            .store
            .insert_link(&NewLink {
                source: request.source,
                target: request.target,
                anchor_text,
                target_url: target_entry.url,
                relevance,
                status: LinkStatus::Approved,
                origin: LinkOrigin::Manual,
            })
            .await?;

        let Some(record) = self.store.get_link(outcome.id()).await? else {
            return Ok(None);
        };
        if record.status == LinkStatus::Suggested {
            return self.store.set_status(record.id, LinkStatus::Approved).await;
        }
        Ok(Some(record))
    }

    /// Write an approved link into its source's markup and mark it ACTIVE.
    ///
    /// The relevance threshold does not apply to curated links. Returns
    /// `false` when the record, its source or its target is missing, the
    /// anchor text no longer occurs in linkable text, or another anchor in
    /// the source already uses it.
    pub async fn apply_manual_link(&self, id: i64) -> InterlinkResult<bool> {
        crate::log_operation!("apply_manual_link", id, self.apply_link(id).await)
    }

    async fn apply_link(&self, id: i64) -> InterlinkResult<bool> {
        let Some(record) = self.store.get_link(id).await? else {
            return Ok(false);
        };
        if record.status == LinkStatus::Active {
            return Ok(true);
        }
        if !record.status.can_transition_to(LinkStatus::Active) {
            return Err(InterlinkError::InvalidTransition {
                id,
                from: record.status,
                to: LinkStatus::Active,
            });
        }

        let (Some(source), Some(target)) =
            (self.find(record.source).await?, self.find(record.target).await?)
        else {
            return Ok(false);
        };
        let target_url = self.config.content_url(target.kind(), target.slug());

        let linked = LinkedState::from_html(source.body());
        // Someone already linked the target by hand
        if linked.links_to(&target_url) {
            self.store.set_status(id, LinkStatus::Active).await?;
            return Ok(true);
        }
        if linked.phrase_in_anchor(&record.anchor_text) {
            log::debug!(
                "Manual link {id}: '{}' is already anchor text in {}",
                record.anchor_text,
                record.source
            );
            return Ok(false);
        }

        let candidate = LinkCandidate {
            source: record.source,
            target: record.target,
            anchor_text: record.anchor_text.clone(),
            offset: 0,
            relevance: record.relevance,
            already_linked: false,
            target_url,
            target_title: target.title().to_string(),
        };
        let options = InjectionOptions {
            min_relevance: 0,
            max_links: 1,
            min_single_word_length: 1,
        };
        let injection = inject_links(source.body(), &[candidate], options);
        if injection.inserted_count() == 0 {
            log::debug!("Manual link {id}: '{}' not found in linkable text", record.anchor_text);
            return Ok(false);
        }

        let updated = self
            .repo
            .update_body(record.source, &injection.html)
            .await
            .map_err(InterlinkError::repository)?;
        if !updated {
            return Ok(false);
        }
        self.store.set_status(id, LinkStatus::Active).await?;
        Ok(true)
    }

    /// SUGGESTED → APPROVED. Active links are returned unchanged.
    pub async fn approve_link(&self, id: i64) -> InterlinkResult<Option<InternalLinkRecord>> {
        let Some(record) = self.store.get_link(id).await? else {
            return Ok(None);
        };
        if record.status == LinkStatus::Active {
            return Ok(Some(record));
        }
        self.store.set_status(id, LinkStatus::Approved).await
    }

    /// Reject a link for good, unlinking it first if it is live in markup.
    ///
    /// The (source, target) pair is never auto-suggested again.
    pub async fn reject_link(&self, id: i64) -> InterlinkResult<Option<InternalLinkRecord>> {
        self.retire_link(id, LinkStatus::Rejected).await
    }

    /// Remove a link from markup and mark it REMOVED.
    pub async fn remove_link(&self, id: i64) -> InterlinkResult<Option<InternalLinkRecord>> {
        self.retire_link(id, LinkStatus::Removed).await
    }

    async fn retire_link(
        &self,
        id: i64,
        status: LinkStatus,
    ) -> InterlinkResult<Option<InternalLinkRecord>> {
        let Some(record) = self.store.get_link(id).await? else {
            return Ok(None);
        };
        if record.status == status {
            return Ok(Some(record));
        }
        if !record.status.can_transition_to(status) {
            return Err(InterlinkError::InvalidTransition {
                id,
                from: record.status,
                to: status,
            });
        }

        if record.status == LinkStatus::Active {
            self.unlink_from_source(&record).await?;
        }
        self.store.set_status(id, status).await
    }

    async fn unlink_from_source(&self, record: &InternalLinkRecord) -> InterlinkResult<()> {
        let Some(source) = self.find(record.source).await? else {
            return Ok(());
        };
        let result = unlink_injected_in_html(source.body(), &record.target_url)
            .map_err(InterlinkError::markup)?;
        if result.count > 0 {
            self.repo
                .update_body(record.source, &result.html)
                .await
                .map_err(InterlinkError::repository)?;
            log::debug!(
                "Unlinked {} anchors to {} from {}",
                result.count,
                record.target_url,
                record.source
            );
        }
        Ok(())
    }

    /// Persist a new exclusion rule.
    pub async fn add_exclusion(
        &self,
        scope: &ExclusionScope,
        reason: Option<&str>,
    ) -> InterlinkResult<ExclusionRule> {
        self.store.add_exclusion(scope, reason).await
    }

    /// Delete an exclusion rule. Returns whether it existed.
    pub async fn remove_exclusion(&self, id: i64) -> InterlinkResult<bool> {
        self.store.remove_exclusion(id).await
    }

    pub async fn list_exclusions(&self) -> InterlinkResult<Vec<ExclusionRule>> {
        self.store.list_exclusions().await
    }
}
