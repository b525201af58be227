//! Shared configuration constants for interlinking
//!
//! This module contains default values and configuration constants used
//! throughout the codebase to ensure consistency and avoid magic numbers.

/// Minimum relevance score (0-100) a candidate needs to be kept.
///
/// Below this, the signal is mostly shared boilerplate vocabulary.
pub const DEFAULT_MIN_RELEVANCE: u8 = 35;

/// Maximum number of links auto-injected into a single content body.
pub const DEFAULT_MAX_LINKS_PER_ITEM: usize = 8;

/// Minimum word count a source body needs before it is scanned at all.
pub const DEFAULT_MIN_SOURCE_WORDS: usize = 100;

/// Minimum length (characters) of any search phrase kept in the index.
pub const DEFAULT_MIN_ANCHOR_LENGTH: usize = 4;

/// Single-word phrases shorter than this are never matched.
///
/// Keeps common short words ("data", "code") from turning into links.
pub const DEFAULT_MIN_SINGLE_WORD_LENGTH: usize = 5;

/// Number of keywords extracted from each body.
pub const DEFAULT_MAX_BODY_KEYWORDS: usize = 15;

/// Plain-text body cap stored in each index entry (characters).
pub const DEFAULT_MAX_BODY_CHARS: usize = 10_000;

/// Body prefix (characters) compared by the Jaccard similarity signal.
pub const DEFAULT_SIMILARITY_PREFIX_CHARS: usize = 3_000;

/// How many recently updated items are scanned for inbound links to new content.
pub const DEFAULT_INBOUND_SCAN_WINDOW: usize = 50;

/// Default number of items processed by one batch run.
pub const DEFAULT_BATCH_LIMIT: usize = 20;

/// Number of hub entries listed in reports.
pub const DEFAULT_HUB_COUNT: usize = 10;

/// URL prefix for articles (`/blog/{slug}`).
pub const DEFAULT_ARTICLE_URL_PREFIX: &str = "/blog";

/// URL prefix for pages (`/{slug}`).
pub const DEFAULT_PAGE_URL_PREFIX: &str = "";

/// Routes served by the application itself that are never content items.
pub const DEFAULT_STATIC_ROUTES: &[&str] = &[
    "/",
    "/blog",
    "/about",
    "/contact",
    "/search",
    "/tags",
    "/categories",
    "/sitemap.xml",
    "/rss.xml",
];

/// Attribute written on every injected anchor, holding the target URL.
///
/// Later scans look for it to decide whether a target is already linked.
pub const MARKER_ATTRIBUTE: &str = "data-interlink-target";
