//! Streaming href rewriting using lol_html.
//!
//! Two operations back the lifecycle flows:
//! 1. When a target is renamed, rewrite hrefs that point at its old URL
//! 2. When a target disappears, unwrap anchors that point at it, keeping
//!    their inner content
//!
//! Retiring a single link only unwraps anchors carrying the injection marker.

use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::{Context, Result, anyhow};
use lol_html::{HtmlRewriter, Settings, element};

use crate::utils::{MARKER_ATTRIBUTE, same_target, split_suffix};

/// Markup after a rewrite plus how many anchors were touched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewriteOutcome {
    pub html: String,
    pub count: usize,
}

/// Rewrite hrefs pointing at `old_url` so they point at `new_url`.
///
/// Query strings and fragments on the original href are carried over.
/// Anchor text and all other attributes are untouched; the injection marker
/// is updated alongside the href.
pub fn rewrite_urls_in_html(html: &str, old_url: &str, new_url: &str) -> Result<RewriteOutcome> {
    let mut output = Vec::with_capacity(html.len());
    let rewrite_count = AtomicUsize::new(0);

    let mut rewriter = HtmlRewriter::new(
        Settings {
            element_content_handlers: vec![element!("a[href]", |el| {
                let Some(href) = el.get_attribute("href") else {
                    return Ok(());
                };
                if !same_target(&href, old_url) {
                    return Ok(());
                }

                let (_, suffix) = split_suffix(href.trim());
                el.set_attribute("href", &format!("{new_url}{suffix}"))?;
                rewrite_count.fetch_add(1, Ordering::Relaxed);

                if el
                    .get_attribute(MARKER_ATTRIBUTE)
                    .is_some_and(|marker| same_target(&marker, old_url))
                {
                    el.set_attribute(MARKER_ATTRIBUTE, new_url)?;
                }
                Ok(())
            })],
            ..Settings::default()
        },
        |c: &[u8]| output.extend_from_slice(c),
    );

    rewriter
        .write(html.as_bytes())
        .map_err(|e| anyhow!("HTML rewrite error: {e}"))?;
    rewriter
        .end()
        .map_err(|e| anyhow!("HTML rewrite finalization error: {e}"))?;

    Ok(RewriteOutcome {
        html: String::from_utf8(output).context("Invalid UTF-8 in rewritten HTML")?,
        count: rewrite_count.load(Ordering::Relaxed),
    })
}

/// Replace every anchor whose href points at one of `urls` with its inner
/// content.
pub fn unlink_urls_in_html(html: &str, urls: &[String]) -> Result<RewriteOutcome> {
    if urls.is_empty() {
        return Ok(RewriteOutcome {
            html: html.to_string(),
            count: 0,
        });
    }
    unwrap_anchors(html, |href, _| urls.iter().any(|url| same_target(href, url)))
}

/// Unwrap only the anchors an injection pass created for `url`.
///
/// Hand-written anchors to the same target have no marker and are kept.
pub fn unlink_injected_in_html(html: &str, url: &str) -> Result<RewriteOutcome> {
    unwrap_anchors(html, |_, marker| {
        marker.is_some_and(|marker| same_target(marker, url))
    })
}

/// Unwrap anchors for which `should_unwrap(href, marker)` holds.
fn unwrap_anchors(
    html: &str,
    should_unwrap: impl Fn(&str, Option<&str>) -> bool,
) -> Result<RewriteOutcome> {
    let mut output = Vec::with_capacity(html.len());
    let removed = AtomicUsize::new(0);

    let mut rewriter = HtmlRewriter::new(
        Settings {
            element_content_handlers: vec![element!("a[href]", |el| {
                let Some(href) = el.get_attribute("href") else {
                    return Ok(());
                };
                let marker = el.get_attribute(MARKER_ATTRIBUTE);
                if should_unwrap(&href, marker.as_deref()) {
                    el.remove_and_keep_content();
                    removed.fetch_add(1, Ordering::Relaxed);
                }
                Ok(())
            })],
            ..Settings::default()
        },
        |c: &[u8]| output.extend_from_slice(c),
    );

    rewriter
        .write(html.as_bytes())
        .map_err(|e| anyhow!("HTML unlink error: {e}"))?;
    rewriter
        .end()
        .map_err(|e| anyhow!("HTML unlink finalization error: {e}"))?;

    Ok(RewriteOutcome {
        html: String::from_utf8(output).context("Invalid UTF-8 in rewritten HTML")?,
        count: removed.load(Ordering::Relaxed),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rewrite_urls_in_html() {
        let html = r#"<p><a href="/blog/old-slug" class="btn" data-interlink-target="/blog/old-slug">Old</a>
            <a href="/blog/old-slug/#part-2">Part</a>
            <a href="/blog/old-slug-two">Other</a>
            <a href="https://other.com/blog/old-slug">External</a></p>"#;

        let outcome = rewrite_urls_in_html(html, "/blog/old-slug", "/blog/new-slug").unwrap();

        assert_eq!(outcome.count, 2);
        assert!(outcome.html.contains(r#"href="/blog/new-slug" class="btn""#));
        assert!(outcome.html.contains(r#"data-interlink-target="/blog/new-slug""#));
        assert!(outcome.html.contains(r#"href="/blog/new-slug#part-2""#));
        assert!(outcome.html.contains(r#"href="/blog/old-slug-two""#));
        assert!(outcome.html.contains(r#"href="https://other.com/blog/old-slug""#));
        assert!(outcome.html.contains(">Old</a>"));
    }

    #[test]
    fn test_unlink_keeps_inner_content() {
        let html = r#"<p>Read <a href="/blog/gone"><em>the guide</em></a> or <a href="/blog/kept">this</a>.</p>"#;
        let outcome = unlink_urls_in_html(html, &["/blog/gone".to_string()]).unwrap();

        assert_eq!(outcome.count, 1);
        assert_eq!(
            outcome.html,
            r#"<p>Read <em>the guide</em> or <a href="/blog/kept">this</a>.</p>"#
        );
    }

    #[test]
    fn test_unlink_injected_keeps_hand_written_anchors() {
        let html = r#"<p><a href="/blog/t" data-interlink-target="/blog/t">auto</a> and <a href="/blog/t">manual</a></p>"#;
        let outcome = unlink_injected_in_html(html, "/blog/t").unwrap();

        assert_eq!(outcome.count, 1);
        assert_eq!(outcome.html, r#"<p>auto and <a href="/blog/t">manual</a></p>"#);
    }

    #[test]
    fn test_unlink_without_urls_is_noop() {
        let html = r#"<a href="/x">x</a>"#;
        let outcome = unlink_urls_in_html(html, &[]).unwrap();
        assert_eq!(outcome.count, 0);
        assert_eq!(outcome.html, html);
    }
}
