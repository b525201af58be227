//! Broken internal link detection and repair.

use std::collections::{BTreeSet, HashSet};

use anyhow::Result;
use serde::Serialize;

use super::anchors::extract_anchors;
use super::rewrite::{RewriteOutcome, unlink_urls_in_html};
use crate::utils::{is_internal_href, normalize_path};

/// An internal anchor whose target no longer resolves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BrokenLink {
    pub href: String,
    pub anchor_text: String,
}

/// Find internal anchors pointing at paths that are neither known content
/// URLs nor static routes.
///
/// `known_urls` holds normalized paths. Each broken href is reported once.
pub fn detect_broken_links(
    html: &str,
    known_urls: &HashSet<String>,
    static_routes: &[String],
) -> Vec<BrokenLink> {
    let static_paths: HashSet<String> = static_routes
        .iter()
        .filter_map(|route| normalize_path(route))
        .collect();

    let mut seen = HashSet::new();
    let mut broken = Vec::new();

    for anchor in extract_anchors(html) {
        let Some(href) = anchor.href else {
            continue;
        };
        if !is_internal_href(&href) {
            continue;
        }
        let Some(path) = normalize_path(&href) else {
            continue;
        };
        if known_urls.contains(&path) || static_paths.contains(&path) {
            continue;
        }
        if seen.insert(href.clone()) {
            broken.push(BrokenLink {
                href,
                anchor_text: anchor.text,
            });
        }
    }

    broken
}

/// Unwrap every anchor pointing at one of `broken_urls`, keeping the text.
pub fn remove_broken_links_from_html(html: &str, broken_urls: &[String]) -> Result<RewriteOutcome> {
    // Deduplicate by normalized path so `/a` and `/a/` count once
    let unique: BTreeSet<String> = broken_urls
        .iter()
        .map(|url| normalize_path(url).unwrap_or_else(|| url.trim().to_string()))
        .collect();
    let urls: Vec<String> = unique.into_iter().collect();
    unlink_urls_in_html(html, &urls)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn known(urls: &[&str]) -> HashSet<String> {
        urls.iter().map(|u| (*u).to_string()).collect()
    }

    #[test]
    fn test_detects_only_unknown_internal_paths() {
        let html = r##"<p>
            <a href="/blog/live/">Live</a>
            <a href="/blog/gone?x=1">Gone</a>
            <a href="/blog/gone#top">Gone again</a>
            <a href="/about">About</a>
            <a href="/api/v1/thing">Api</a>
            <a href="#section">Jump</a>
            <a href="https://example.com/blog/gone">External</a>
            <a href="//cdn.example.com/x">Cdn</a>
            <a>No href</a>
        </p>"##;
        let broken = detect_broken_links(html, &known(&["/blog/live"]), &["/about".to_string()]);

        assert_eq!(
            broken,
            vec![
                BrokenLink {
                    href: "/blog/gone?x=1".to_string(),
                    anchor_text: "Gone".to_string(),
                },
                BrokenLink {
                    href: "/blog/gone#top".to_string(),
                    anchor_text: "Gone again".to_string(),
                },
            ]
        );
    }

    #[test]
    fn test_remove_broken_links_keeps_text() {
        let html = r#"<p>See <a href="/blog/gone/">the old post</a> and <a href="/blog/live">this</a>.</p>"#;
        let outcome = remove_broken_links_from_html(
            html,
            &["/blog/gone".to_string(), "/blog/gone/".to_string()],
        )
        .unwrap();

        assert_eq!(outcome.count, 1);
        assert_eq!(
            outcome.html,
            r#"<p>See the old post and <a href="/blog/live">this</a>.</p>"#
        );
    }
}
