//! Phrase matching, relevance scoring and candidate discovery.

pub mod phrase;
pub mod scanner;
pub mod scorer;

pub use phrase::{PhraseMatch, PhraseMatcher, find_phrase_occurrences, is_phrase_already_linked};
pub use scanner::{LinkCandidate, Scanner, scan_content_for_links};
pub use scorer::{RelevanceBreakdown, calculate_relevance, score_breakdown};
