//! Anchor injection into eligible text segments.
//!
//! Each candidate is placed at most once, at its first boundary-safe match in
//! text that is not inside a skip element. Within one pass no anchor text and
//! no target is used twice. The matched text itself becomes ineligible, so a
//! later candidate can never land inside an anchor this pass created.

use std::collections::HashSet;

use serde::Serialize;

use super::segment::{
    Segment, SegmentKind, TagRole, char_after, char_before, join_segments, segment_html,
};
use crate::config::InterlinkConfig;
use crate::content::ContentKey;
use crate::matching::{PhraseMatch, PhraseMatcher};
use crate::matching::scanner::LinkCandidate;
use crate::utils::MARKER_ATTRIBUTE;

/// Limits applied to one injection pass.
#[derive(Debug, Clone, Copy)]
pub struct InjectionOptions {
    pub min_relevance: u8,
    pub max_links: usize,
    pub min_single_word_length: usize,
}

impl InjectionOptions {
    #[must_use]
    pub fn from_config(config: &InterlinkConfig) -> Self {
        Self {
            min_relevance: config.min_relevance(),
            max_links: config.max_links_per_item(),
            min_single_word_length: config.min_single_word_length(),
        }
    }
}

/// A link written into the markup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InjectedLink {
    pub target: ContentKey,
    /// Lowercased phrase, as stored on the link record
    pub anchor_text: String,
    pub target_url: String,
    pub relevance: u8,
}

/// Markup after injection plus what was inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InjectionResult {
    pub html: String,
    pub inserted: Vec<InjectedLink>,
}

impl InjectionResult {
    #[must_use]
    pub fn inserted_count(&self) -> usize {
        self.inserted.len()
    }
}

/// Inject anchors for `candidates` into `html`.
///
/// Candidates flagged as already linked or below the relevance floor are
/// ignored. Markup outside the replaced text runs is preserved byte for byte.
pub fn inject_links(
    html: &str,
    candidates: &[LinkCandidate],
    options: InjectionOptions,
) -> InjectionResult {
    let mut ranked: Vec<&LinkCandidate> = candidates
        .iter()
        .filter(|c| !c.already_linked && c.relevance >= options.min_relevance)
        .collect();
    ranked.sort_by(|a, b| b.relevance.cmp(&a.relevance));

    let mut segments = segment_html(html);
    let mut used_phrases: HashSet<String> = HashSet::new();
    let mut used_targets: HashSet<ContentKey> = HashSet::new();
    let mut inserted = Vec::new();

    for candidate in ranked {
        if inserted.len() >= options.max_links {
            break;
        }

        let phrase = candidate.anchor_text.to_lowercase();
        if used_phrases.contains(&phrase) || used_targets.contains(&candidate.target) {
            continue;
        }

        let Some(matcher) = PhraseMatcher::new(&phrase, options.min_single_word_length) else {
            continue;
        };

        if inject_first(&mut segments, &matcher, candidate) {
            used_phrases.insert(phrase.clone());
            used_targets.insert(candidate.target);
            inserted.push(InjectedLink {
                target: candidate.target,
                anchor_text: phrase,
                target_url: candidate.target_url.clone(),
                relevance: candidate.relevance,
            });
        }
    }

    let html = if inserted.is_empty() {
        html.to_string()
    } else {
        join_segments(&segments)
    };

    InjectionResult { html, inserted }
}

/// Number of anchors in `html` that an earlier injection pass created.
pub fn count_injected_anchors(html: &str) -> usize {
    segment_html(html)
        .iter()
        .filter(|segment| {
            matches!(&segment.kind, SegmentKind::Tag { name, role: TagRole::Open } if name == "a")
                && segment.raw.contains(MARKER_ATTRIBUTE)
        })
        .count()
}

/// First eligible text run where `matcher` could be linked, with the match.
///
/// Word boundaries are checked against the visible text around each run, so
/// a match cannot start or end inside a word split by inline markup.
pub(crate) fn find_insertion_point(
    segments: &[Segment],
    matcher: &PhraseMatcher,
) -> Option<(usize, PhraseMatch)> {
    segments
        .iter()
        .enumerate()
        .filter(|(_, segment)| segment.is_eligible_text())
        .find_map(|(idx, segment)| {
            matcher
                .find_first_between(
                    &segment.raw,
                    char_before(segments, idx),
                    char_after(segments, idx),
                )
                .map(|found| (idx, found))
        })
}

/// Wrap the first eligible match; returns whether anything was wrapped.
fn inject_first(
    segments: &mut Vec<Segment>,
    matcher: &PhraseMatcher,
    candidate: &LinkCandidate,
) -> bool {
    let Some((idx, found)) = find_insertion_point(segments, matcher) else {
        return false;
    };

    let raw = std::mem::take(&mut segments[idx].raw);
    let before = &raw[..found.offset];
    let matched = &raw[found.offset..found.end()];
    let after = &raw[found.end()..];

    let mut replacement = Vec::with_capacity(5);
    if !before.is_empty() {
        replacement.push(Segment::text(before, true));
    }
    replacement.push(Segment {
        raw: open_anchor(&candidate.target_url, &candidate.target_title),
        kind: SegmentKind::Tag {
            name: "a".to_string(),
            role: TagRole::Open,
        },
    });
    replacement.push(Segment::text(matched, false));
    replacement.push(Segment {
        raw: "</a>".to_string(),
        kind: SegmentKind::Tag {
            name: "a".to_string(),
            role: TagRole::Close,
        },
    });
    if !after.is_empty() {
        replacement.push(Segment::text(after, true));
    }

    segments.splice(idx..=idx, replacement);
    true
}

/// Opening anchor tag with escaped attribute values.
fn open_anchor(url: &str, title: &str) -> String {
    let url = html_escape::encode_double_quoted_attribute(url);
    let title = html_escape::encode_double_quoted_attribute(title);
    format!(r#"<a href="{url}" title="{title}" {MARKER_ATTRIBUTE}="{url}">"#)
}
