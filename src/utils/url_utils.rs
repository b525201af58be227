//! Internal URL helpers.
//!
//! Content URLs are site-relative paths (`/blog/my-post`). Hrefs found in
//! markup are normalized to the same shape before any comparison.

use url::Url;

/// Placeholder origin used to resolve site-relative hrefs.
const SITE_BASE: &str = "https://interlink.invalid/";

/// Normalize a site-relative href to a bare path.
///
/// Handles:
/// - Strip query string and fragment
/// - Remove trailing slash (unless root)
/// - Resolve `.` / `..` segments and duplicate slashes
///
/// Returns `None` for anything that is not a site-relative path.
pub fn normalize_path(href: &str) -> Option<String> {
    let href = href.trim();
    if !href.starts_with('/') || href.starts_with("//") {
        return None;
    }

    let base = Url::parse(SITE_BASE).ok()?;
    let resolved = base.join(href).ok()?;
    if resolved.host_str() != base.host_str() {
        return None;
    }

    let mut path = resolved.path().to_string();
    while path.contains("//") {
        path = path.replace("//", "/");
    }
    if path.len() > 1 && path.ends_with('/') {
        path.pop();
    }

    Some(path)
}

/// Split an href into its path and the query/fragment suffix (`?a=1#x`).
pub fn split_suffix(href: &str) -> (&str, &str) {
    match href.find(['?', '#']) {
        Some(idx) => (&href[..idx], &href[idx..]),
        None => (href, ""),
    }
}

/// Whether an href looks like a link into this site's own content.
///
/// Fragment-only links, protocol-relative links and API endpoints are not.
#[must_use]
pub fn is_internal_href(href: &str) -> bool {
    let href = href.trim();
    href.starts_with('/') && !href.starts_with("//") && !href.starts_with("/api/") && href != "/api"
}

/// Two hrefs point to the same internal page.
#[must_use]
pub fn same_target(a: &str, b: &str) -> bool {
    match (normalize_path(a), normalize_path(b)) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_path() {
        assert_eq!(normalize_path("/blog/post/"), Some("/blog/post".to_string()));
        assert_eq!(normalize_path("/blog/post?ref=x#top"), Some("/blog/post".to_string()));
        assert_eq!(normalize_path("/"), Some("/".to_string()));
        assert_eq!(normalize_path("/blog/../about"), Some("/about".to_string()));
        assert_eq!(normalize_path("https://other.com/x"), None);
        assert_eq!(normalize_path("//cdn.example.com/x"), None);
        assert_eq!(normalize_path("#section"), None);
    }

    #[test]
    fn test_split_suffix() {
        assert_eq!(split_suffix("/a/b?x=1#y"), ("/a/b", "?x=1#y"));
        assert_eq!(split_suffix("/a/b#y"), ("/a/b", "#y"));
        assert_eq!(split_suffix("/a/b"), ("/a/b", ""));
    }

    #[test]
    fn test_is_internal_href() {
        assert!(is_internal_href("/blog/post"));
        assert!(!is_internal_href("/api/posts"));
        assert!(!is_internal_href("#top"));
        assert!(!is_internal_href("//cdn.example.com/a.js"));
        assert!(!is_internal_href("https://example.com/"));
    }

    #[test]
    fn test_same_target() {
        assert!(same_target("/blog/a/", "/blog/a?utm=1"));
        assert!(!same_target("/blog/a", "/blog/b"));
        assert!(!same_target("https://x.com/blog/a", "/blog/a"));
    }
}
