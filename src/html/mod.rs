//! Markup handling: segmentation, anchor extraction, link injection and
//! href rewriting.
//!
//! Injection works on a lossless segment stream so untouched markup is kept
//! byte for byte. Rewrites that only touch attributes stream through
//! lol_html; read-only extraction goes through scraper.

pub mod anchors;
pub mod broken;
pub mod inject;
pub mod rewrite;
pub mod segment;

pub use anchors::{Anchor, LinkedState, extract_anchors};
pub use broken::{BrokenLink, detect_broken_links, remove_broken_links_from_html};
pub use inject::{InjectedLink, InjectionOptions, InjectionResult, count_injected_anchors, inject_links};
pub use rewrite::{
    RewriteOutcome, rewrite_urls_in_html, unlink_injected_in_html, unlink_urls_in_html,
};
pub use segment::{SKIP_TAGS, Segment, SegmentKind, TagRole, join_segments, plain_text, segment_html};
