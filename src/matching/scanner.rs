//! Candidate discovery for one source item.
//!
//! Combines the index, exclusion rules, relevance scorer and phrase matcher.
//! Discovery is deterministic for a given index, exclusion snapshot and clock.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::phrase::PhraseMatcher;
use super::scorer::calculate_relevance;
use crate::config::InterlinkConfig;
use crate::content::ContentKey;
use crate::html::LinkedState;
use crate::html::inject::find_insertion_point;
use crate::html::segment::{Segment, segment_html};
use crate::index::{ContentIndex, ContentIndexEntry};
use crate::links::ExclusionSet;

/// A proposed link from a source to a target. Never persisted as-is.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinkCandidate {
    pub source: ContentKey,
    pub target: ContentKey,
    /// Lowercase phrase that matched in the source text
    pub anchor_text: String,
    /// Character offset of the first match in the source's plain text
    pub offset: usize,
    pub relevance: u8,
    /// The source markup already links this phrase or target
    pub already_linked: bool,
    pub target_url: String,
    pub target_title: String,
}

/// Scans sources against one index and exclusion snapshot.
pub struct Scanner<'a> {
    index: &'a ContentIndex,
    exclusions: &'a ExclusionSet,
    config: &'a InterlinkConfig,
    now: DateTime<Utc>,
}

impl<'a> Scanner<'a> {
    pub fn new(
        index: &'a ContentIndex,
        exclusions: &'a ExclusionSet,
        config: &'a InterlinkConfig,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            index,
            exclusions,
            config,
            now,
        }
    }

    /// Candidates from `source` to any indexed target.
    pub fn scan(&self, source: &ContentIndexEntry, source_html: &str) -> Vec<LinkCandidate> {
        self.scan_filtered(source, source_html, |_| true)
    }

    /// Candidates from `source` restricted to `targets`.
    pub fn scan_targets(
        &self,
        source: &ContentIndexEntry,
        source_html: &str,
        targets: &HashSet<ContentKey>,
    ) -> Vec<LinkCandidate> {
        self.scan_filtered(source, source_html, |entry| targets.contains(&entry.key))
    }

    fn scan_filtered(
        &self,
        source: &ContentIndexEntry,
        source_html: &str,
        include: impl Fn(&ContentIndexEntry) -> bool,
    ) -> Vec<LinkCandidate> {
        if self.exclusions.is_source_excluded(source.key) {
            log::debug!("Source {} is excluded from auto-linking", source.key);
            return Vec::new();
        }
        if source.word_count < self.config.min_source_words() {
            log::debug!(
                "Source {} has {} words, below minimum {}",
                source.key,
                source.word_count,
                self.config.min_source_words()
            );
            return Vec::new();
        }

        let linked = LinkedState::from_html(source_html);
        let segments = segment_html(source_html);
        let mut matched_targets: HashSet<ContentKey> = HashSet::new();
        let mut candidates = Vec::new();

        for target in self.index.entries() {
            if target.key == source.key
                || !target.is_published()
                || !include(target)
                || self.exclusions.blocks(source.key, target.key)
                || matched_targets.contains(&target.key)
            {
                continue;
            }

            let relevance = calculate_relevance(
                source,
                target,
                self.now,
                self.config.similarity_prefix_chars(),
            );
            if relevance < self.config.min_relevance() {
                continue;
            }

            if let Some(candidate) =
                self.first_matching_phrase(source, target, relevance, &linked, &segments)
            {
                matched_targets.insert(target.key);
                candidates.push(candidate);
            }
        }

        candidates.sort_by(|a, b| b.relevance.cmp(&a.relevance));
        candidates.truncate(self.config.max_candidates());
        candidates
    }

    /// Greedy: the first non-excluded phrase that occurs in the source wins.
    ///
    /// An occurrence only counts where the phrase could be linked: outside
    /// headings, code and existing anchors, on word boundaries.
    fn first_matching_phrase(
        &self,
        source: &ContentIndexEntry,
        target: &ContentIndexEntry,
        relevance: u8,
        linked: &LinkedState,
        segments: &[Segment],
    ) -> Option<LinkCandidate> {
        target
            .phrases
            .iter()
            .filter(|phrase| !self.exclusions.is_phrase_excluded(phrase))
            .find_map(|phrase| {
                let matcher = PhraseMatcher::new(phrase, self.config.min_single_word_length())?;
                let found = matcher.find_first(&source.plain_text)?;
                find_insertion_point(segments, &matcher)?;
                Some(LinkCandidate {
                    source: source.key,
                    target: target.key,
                    anchor_text: phrase.clone(),
                    offset: source.plain_text[..found.offset].chars().count(),
                    relevance,
                    already_linked: linked.is_linked(phrase, &target.url),
                    target_url: target.url.clone(),
                    target_title: target.title.clone(),
                })
            })
    }
}

/// Scan one source against the whole index.
pub fn scan_content_for_links(
    source: &ContentIndexEntry,
    source_html: &str,
    index: &ContentIndex,
    exclusions: &ExclusionSet,
    config: &InterlinkConfig,
    now: DateTime<Utc>,
) -> Vec<LinkCandidate> {
    Scanner::new(index, exclusions, config, now).scan(source, source_html)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{Article, ContentItem, ContentStatus};
    use crate::links::{ExclusionRule, ExclusionScope};
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap()
    }

    const FILLER: &str = "Caching layers reduce latency by keeping frequently requested data close \
        to the application. Memory is fast while disks and networks are slow, so a cache \
        trades memory for latency. Invalidation remains the hard part of every caching design.";

    fn article(id: i64, title: &str, tags: &[&str], extra: &str) -> ContentItem {
        ContentItem::Article(Article {
            id,
            title: title.to_string(),
            slug: format!("post-{id}"),
            body: format!("<p>{FILLER}</p><p>{extra}</p>"),
            status: ContentStatus::Published,
            tags: tags.iter().map(|t| (*t).to_string()).collect(),
            categories: Vec::new(),
            keywords: Vec::new(),
            view_count: 1000,
            word_count: Some(900),
            published_at: Some(now() - Duration::days(3)),
            updated_at: now(),
        })
    }

    fn corpus() -> Vec<ContentItem> {
        vec![
            article(1, "Intro to Caching", &["caching"], "Read about write-through caches and cache eviction policies."),
            article(2, "Cache Eviction Policies", &["caching"], "LRU versus LFU."),
            article(3, "Write-Through Caches", &["caching"], "Writes go to both layers."),
        ]
    }

    fn config() -> InterlinkConfig {
        InterlinkConfig::builder().min_source_words(10).build().unwrap()
    }

    fn scan_first(exclusions: &ExclusionSet) -> Vec<LinkCandidate> {
        let items = corpus();
        let config = config();
        let index = ContentIndex::build(&items, &config);
        let source = index.get(ContentKey::article(1)).unwrap();
        scan_content_for_links(source, items[0].body(), &index, exclusions, &config, now())
    }

    #[test]
    fn test_finds_one_candidate_per_target_without_self_links() {
        let candidates = scan_first(&ExclusionSet::default());

        let targets: Vec<ContentKey> = candidates.iter().map(|c| c.target).collect();
        assert_eq!(targets.len(), 2);
        assert!(targets.contains(&ContentKey::article(2)));
        assert!(targets.contains(&ContentKey::article(3)));
        assert!(candidates.iter().all(|c| c.relevance >= 35 && !c.already_linked));

        let eviction = candidates
            .iter()
            .find(|c| c.target == ContentKey::article(2))
            .unwrap();
        assert_eq!(eviction.anchor_text, "cache eviction policies");
        assert_eq!(eviction.target_url, "/blog/post-2");
    }

    #[test]
    fn test_offset_is_character_based() {
        let candidates = scan_first(&ExclusionSet::default());
        let items = corpus();
        let config = config();
        let source = ContentIndexEntry::from_item(&items[0], &config);
        for candidate in candidates {
            let found: String = source
                .plain_text
                .chars()
                .skip(candidate.offset)
                .take(candidate.anchor_text.chars().count())
                .collect();
            assert_eq!(found.to_lowercase(), candidate.anchor_text);
        }
    }

    #[test]
    fn test_exclusions_suppress_candidates() {
        let rules = vec![
            ExclusionRule::new(1, ExclusionScope::Target { target: ContentKey::article(3) }),
            ExclusionRule::new(2, ExclusionScope::Phrase { phrase: "Cache Eviction Policies".into() }),
        ];
        let candidates = scan_first(&ExclusionSet::from_rules(&rules));
        // Title phrase is excluded; another phrase of the same target may still match
        assert!(candidates.iter().all(|c| c.target != ContentKey::article(3)));
        assert!(candidates.iter().all(|c| c.anchor_text != "cache eviction policies"));

        let source_rule = vec![ExclusionRule::new(
            3,
            ExclusionScope::Source { source: ContentKey::article(1) },
        )];
        assert!(scan_first(&ExclusionSet::from_rules(&source_rule)).is_empty());
    }

    #[test]
    fn test_phrase_in_heading_does_not_claim_target() {
        let mut items = corpus();
        if let ContentItem::Article(source) = &mut items[0] {
            source.body = format!(
                "<h2>Cache eviction policies</h2><p>{FILLER}</p><p>Compare LRU versus LFU first.</p>"
            );
        }
        let config = config();
        let index = ContentIndex::build(&items, &config);
        let source = index.get(ContentKey::article(1)).unwrap();
        let candidates = scan_content_for_links(
            source,
            items[0].body(),
            &index,
            &ExclusionSet::default(),
            &config,
            now(),
        );

        // The title only appears in the heading; a body phrase of the same
        // target that sits in a paragraph is used instead
        let eviction = candidates
            .iter()
            .find(|c| c.target == ContentKey::article(2))
            .unwrap();
        assert_ne!(eviction.anchor_text, "cache eviction policies");
        let result = crate::html::inject_links(
            items[0].body(),
            std::slice::from_ref(eviction),
            crate::html::InjectionOptions::from_config(&config),
        );
        assert_eq!(result.inserted_count(), 1);
    }

    #[test]
    fn test_short_source_yields_nothing() {
        let items = corpus();
        let config = InterlinkConfig::default();
        let index = ContentIndex::build(&items, &config);
        let mut source = index.get(ContentKey::article(1)).unwrap().clone();
        source.word_count = 20;
        let candidates = scan_content_for_links(
            &source,
            items[0].body(),
            &index,
            &ExclusionSet::default(),
            &config,
            now(),
        );
        assert!(candidates.is_empty());
    }

    #[test]
    fn test_already_linked_flag() {
        let items = corpus();
        let config = config();
        let index = ContentIndex::build(&items, &config);
        let source = index.get(ContentKey::article(1)).unwrap();
        let html = format!(r#"{}<p><a href="/blog/post-2">see</a></p>"#, items[0].body());

        let candidates = Scanner::new(&index, &ExclusionSet::default(), &config, now())
            .scan_targets(source, &html, &HashSet::from([ContentKey::article(2)]));
        assert_eq!(candidates.len(), 1);
        assert!(candidates[0].already_linked);
    }
}
