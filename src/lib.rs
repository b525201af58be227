//! Automatic internal linking for content-managed sites.
//!
//! The pipeline indexes published articles and pages, scores every
//! source/target pair, finds boundary-safe anchor phrases in a body and
//! injects at most a handful of diverse links without touching anchors,
//! code or headings. Link records live in SQLite and follow content through
//! renames, edits, unpublishing and deletion.

pub mod config;
pub mod content;
pub mod engine;
pub mod error;
pub mod html;
pub mod index;
pub mod links;
pub mod matching;
pub mod store;
pub mod utils;

pub use config::{InterlinkConfig, InterlinkConfigBuilder};
pub use content::{
    Article, ContentItem, ContentKey, ContentKind, ContentRepository, ContentStatus,
    MemoryContentRepository, Page,
};
pub use engine::{
    AutoLinkOutcome, BatchItemDetail, BatchSummary, DiscoveryOutcome, InboundDistribution,
    InterlinkReport, Interlinker, ManualLinkRequest, ReportItem, RetireOutcome, ScanReport,
    UpdateOutcome, split_batch,
};
pub use error::{InterlinkError, InterlinkResult};
pub use html::{BrokenLink, InjectedLink, InjectionOptions, InjectionResult, inject_links};
pub use index::{ContentIndex, ContentIndexEntry};
pub use links::{
    ExclusionRule, ExclusionScope, ExclusionSet, ExclusionType, InternalLinkRecord, LinkFilter,
    LinkOrigin, LinkStatus, NewLink, UpsertOutcome,
};
pub use matching::{
    LinkCandidate, PhraseMatch, calculate_relevance, find_phrase_occurrences,
    is_phrase_already_linked, scan_content_for_links,
};
pub use store::LinkStore;
