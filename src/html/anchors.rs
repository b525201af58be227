//! Read-only anchor extraction.
//!
//! Uses scraper for extraction (simpler than lol_html for read-only work).

use std::collections::HashSet;
use std::sync::LazyLock;

use scraper::{Html, Selector};

use crate::utils::{MARKER_ATTRIBUTE, normalize_path};

static ANCHOR_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a").expect("ANCHOR_SELECTOR: hardcoded selector is valid"));

/// An anchor found in markup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Anchor {
    pub href: Option<String>,
    /// Value of the injection marker attribute, if present
    pub marker: Option<String>,
    /// Visible text with whitespace collapsed
    pub text: String,
}

/// Extract every `<a>` element from a markup fragment.
pub fn extract_anchors(html: &str) -> Vec<Anchor> {
    if !html.contains("<a") && !html.contains("<A") {
        return Vec::new();
    }

    let fragment = Html::parse_fragment(html);
    fragment
        .select(&ANCHOR_SELECTOR)
        .map(|element| {
            let text = element.text().collect::<String>();
            Anchor {
                href: element.value().attr("href").map(|h| h.trim().to_string()),
                marker: element
                    .value()
                    .attr(MARKER_ATTRIBUTE)
                    .map(|m| m.trim().to_string()),
                text: text.split_whitespace().collect::<Vec<_>>().join(" "),
            }
        })
        .collect()
}

/// Snapshot of what a body already links, for repeated lookups.
#[derive(Debug, Clone, Default)]
pub struct LinkedState {
    /// Lowercased visible text of every anchor
    anchor_texts: Vec<String>,
    /// Normalized internal paths found in hrefs or markers
    paths: HashSet<String>,
    /// Raw hrefs/markers that could not be normalized (absolute URLs)
    raw: HashSet<String>,
}

impl LinkedState {
    pub fn from_html(html: &str) -> Self {
        let mut state = Self::default();
        for anchor in extract_anchors(html) {
            state.anchor_texts.push(anchor.text.to_lowercase());
            for value in [anchor.href, anchor.marker].into_iter().flatten() {
                match normalize_path(&value) {
                    Some(path) => {
                        state.paths.insert(path);
                    }
                    None => {
                        state.raw.insert(value);
                    }
                }
            }
        }
        state
    }

    /// The target URL is already referenced by an href or marker.
    #[must_use]
    pub fn links_to(&self, url: &str) -> bool {
        match normalize_path(url) {
            Some(path) => self.paths.contains(&path),
            None => self.raw.contains(url.trim()),
        }
    }

    /// Some existing anchor's visible text contains the phrase.
    #[must_use]
    pub fn phrase_in_anchor(&self, phrase: &str) -> bool {
        let phrase = phrase.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase();
        !phrase.is_empty() && self.anchor_texts.iter().any(|text| text.contains(&phrase))
    }

    #[must_use]
    pub fn is_linked(&self, phrase: &str, target_url: &str) -> bool {
        self.phrase_in_anchor(phrase) || self.links_to(target_url)
    }
}
