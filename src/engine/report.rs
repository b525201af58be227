//! Link graph health report.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::Interlinker;
use crate::content::{ContentItem, ContentKey, ContentKind, ContentRepository};
use crate::error::{InterlinkError, InterlinkResult};
use crate::links::{LinkOrigin, LinkStatus};

/// One published item with its ACTIVE link counts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportItem {
    pub key: ContentKey,
    pub title: String,
    pub url: String,
    pub inbound: u64,
    pub outbound: u64,
}

impl ReportItem {
    #[must_use]
    pub fn total(&self) -> u64 {
        self.inbound + self.outbound
    }
}

/// Published items bucketed by inbound ACTIVE link count.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct InboundDistribution {
    pub none: usize,
    pub one_to_two: usize,
    pub three_to_five: usize,
    pub six_to_ten: usize,
    pub eleven_plus: usize,
}

impl InboundDistribution {
    pub fn record(&mut self, inbound: u64) {
        match inbound {
            0 => self.none += 1,
            1..=2 => self.one_to_two += 1,
            3..=5 => self.three_to_five += 1,
            6..=10 => self.six_to_ten += 1,
            _ => self.eleven_plus += 1,
        }
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.none + self.one_to_two + self.three_to_five + self.six_to_ten + self.eleven_plus
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InterlinkReport {
    pub generated_at: DateTime<Utc>,
    /// Published articles and pages
    pub total_content: usize,
    /// Link records in any status
    pub total_links: u64,
    pub active_links: u64,
    /// Published items with no inbound ACTIVE link
    pub orphans: Vec<ReportItem>,
    /// Best-connected items, most links first
    pub hubs: Vec<ReportItem>,
    pub distribution: InboundDistribution,
    /// Every status, zero when unused
    pub by_status: BTreeMap<LinkStatus, u64>,
    pub by_origin: BTreeMap<LinkOrigin, u64>,
    pub exclusion_rules: u64,
}

impl<R: ContentRepository> Interlinker<R> {
    /// Summarize the link graph over all published content.
    pub async fn generate_report(&self) -> InterlinkResult<InterlinkReport> {
        crate::log_operation!("generate_report", "all", self.build_report().await)
    }

    async fn build_report(&self) -> InterlinkResult<InterlinkReport> {
        let mut published: Vec<ContentItem> = Vec::new();
        for kind in ContentKind::ALL {
            let items = self
                .repo
                .list_published(kind)
                .await
                .map_err(InterlinkError::repository)?;
            published.extend(items);
        }
        published.sort_by_key(ContentItem::key);
        published.dedup_by_key(|item| item.key());

        let counts = self.store.active_link_counts().await?;
        let items = report_items(&published, &counts, |item| {
            self.config.content_url(item.kind(), item.slug())
        });

        let mut distribution = InboundDistribution::default();
        for item in &items {
            distribution.record(item.inbound);
        }

        let orphans: Vec<ReportItem> = items.iter().filter(|i| i.inbound == 0).cloned().collect();
        let hubs = top_hubs(&items, self.config.hub_count());

        let mut by_status: BTreeMap<LinkStatus, u64> =
            LinkStatus::ALL.iter().map(|status| (*status, 0)).collect();
        by_status.extend(self.store.count_by_status().await?);
        let mut by_origin: BTreeMap<LinkOrigin, u64> =
            LinkOrigin::ALL.iter().map(|origin| (*origin, 0)).collect();
        by_origin.extend(self.store.count_by_origin().await?);

        let report = InterlinkReport {
            generated_at: Utc::now(),
            total_content: items.len(),
            total_links: self.store.link_count().await?,
            active_links: by_status.get(&LinkStatus::Active).copied().unwrap_or(0),
            orphans,
            hubs,
            distribution,
            by_status,
            by_origin,
            exclusion_rules: self.store.exclusion_count().await?,
        };

        log::info!(
            "Report: {} items, {} active links, {} orphans",
            report.total_content,
            report.active_links,
            report.orphans.len()
        );
        Ok(report)
    }
}

fn report_items(
    published: &[ContentItem],
    counts: &HashMap<ContentKey, (u64, u64)>,
    url_for: impl Fn(&ContentItem) -> String,
) -> Vec<ReportItem> {
    published
        .iter()
        .map(|item| {
            let (outbound, inbound) = counts.get(&item.key()).copied().unwrap_or((0, 0));
            ReportItem {
                key: item.key(),
                title: item.title().to_string(),
                url: url_for(item),
                inbound,
                outbound,
            }
        })
        .collect()
}

/// Up to `count` items with any links, by total links descending then key.
fn top_hubs(items: &[ReportItem], count: usize) -> Vec<ReportItem> {
    let mut hubs: Vec<ReportItem> = items.iter().filter(|i| i.total() > 0).cloned().collect();
    hubs.sort_by(|a, b| b.total().cmp(&a.total()).then(a.key.cmp(&b.key)));
    hubs.truncate(count);
    hubs
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: i64, inbound: u64, outbound: u64) -> ReportItem {
        ReportItem {
            key: ContentKey::article(id),
            title: format!("Post {id}"),
            url: format!("/blog/post-{id}"),
            inbound,
            outbound,
        }
    }

    #[test]
    fn test_distribution_buckets() {
        let mut distribution = InboundDistribution::default();
        for inbound in [0, 0, 1, 2, 3, 5, 6, 10, 11, 40] {
            distribution.record(inbound);
        }
        assert_eq!(
            distribution,
            InboundDistribution {
                none: 2,
                one_to_two: 2,
                three_to_five: 2,
                six_to_ten: 2,
                eleven_plus: 2,
            }
        );
        assert_eq!(distribution.total(), 10);
    }

    #[test]
    fn test_top_hubs_order_and_cap() {
        let items = vec![item(1, 2, 1), item(2, 0, 0), item(3, 1, 2), item(4, 5, 5)];
        let hubs = top_hubs(&items, 2);
        let keys: Vec<i64> = hubs.iter().map(|h| h.key.id).collect();
        assert_eq!(keys, vec![4, 1]);

        let all = top_hubs(&items, 10);
        assert_eq!(all.len(), 3, "items without links are never hubs");
    }
}
