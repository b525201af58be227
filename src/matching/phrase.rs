//! Boundary-safe phrase matching.
//!
//! Matches are case-insensitive and must sit between whitespace, punctuation
//! or the ends of the text. `-` and `_` are word characters, so hyphenated
//! terms match as a whole and never partially.

use regex::{Regex, RegexBuilder};
use serde::Serialize;

use crate::html::anchors::LinkedState;
use crate::utils::string_utils::is_boundary_char;

/// One occurrence of a phrase, as byte offsets into the searched text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PhraseMatch {
    pub offset: usize,
    pub length: usize,
}

impl PhraseMatch {
    #[must_use]
    pub fn end(&self) -> usize {
        self.offset + self.length
    }
}

/// A compiled phrase ready to be searched for repeatedly.
#[derive(Debug, Clone)]
pub struct PhraseMatcher {
    regex: Regex,
}

impl PhraseMatcher {
    /// Compile a phrase. Returns `None` for empty phrases and for single
    /// words shorter than `min_single_word_length` characters.
    #[must_use]
    pub fn new(phrase: &str, min_single_word_length: usize) -> Option<Self> {
        let words: Vec<&str> = phrase.split_whitespace().collect();
        match words.as_slice() {
            [] => return None,
            [word] if word.chars().count() < min_single_word_length => return None,
            _ => {}
        }

        // Line breaks and repeated spaces between words still match
        let pattern = words
            .iter()
            .map(|w| regex::escape(w))
            .collect::<Vec<_>>()
            .join(r"\s+");

        let regex = RegexBuilder::new(&pattern)
            .case_insensitive(true)
            .build()
            .ok()?;
        Some(Self { regex })
    }

    /// All boundary-respecting occurrences, in order, non-overlapping.
    pub fn find_all(&self, text: &str) -> Vec<PhraseMatch> {
        let mut matches = Vec::new();
        let mut pos = 0;
        while let Some(found) = self.next_match(text, pos, None, None) {
            pos = found.end();
            matches.push(found);
        }
        matches
    }

    /// First boundary-respecting occurrence.
    pub fn find_first(&self, text: &str) -> Option<PhraseMatch> {
        self.next_match(text, 0, None, None)
    }

    /// First occurrence in a text run embedded in longer text.
    ///
    /// `lead` and `trail` are the characters just outside the run; a match
    /// touching either end of `text` is bounded by them instead. `None`
    /// counts as a boundary.
    pub fn find_first_between(
        &self,
        text: &str,
        lead: Option<char>,
        trail: Option<char>,
    ) -> Option<PhraseMatch> {
        self.next_match(text, 0, lead, trail)
    }

    fn next_match(
        &self,
        text: &str,
        mut pos: usize,
        lead: Option<char>,
        trail: Option<char>,
    ) -> Option<PhraseMatch> {
        while pos <= text.len() {
            let m = self.regex.find_at(text, pos)?;
            let before_ok = text[..m.start()]
                .chars()
                .next_back()
                .or(lead)
                .is_none_or(is_boundary_char);
            let after_ok = text[m.end()..]
                .chars()
                .next()
                .or(trail)
                .is_none_or(is_boundary_char);

            if before_ok && after_ok && m.end() > m.start() {
                return Some(PhraseMatch {
                    offset: m.start(),
                    length: m.end() - m.start(),
                });
            }

            // Retry from the next character after the rejected start
            let step = text[m.start()..].chars().next().map_or(1, char::len_utf8);
            pos = m.start() + step;
        }
        None
    }
}

/// Find every boundary-safe occurrence of `phrase` in `text`.
///
/// Never fails: empty input, rejected phrases and misses all yield an
/// empty result.
pub fn find_phrase_occurrences(
    text: &str,
    phrase: &str,
    min_single_word_length: usize,
) -> Vec<PhraseMatch> {
    if text.is_empty() {
        return Vec::new();
    }
    PhraseMatcher::new(phrase, min_single_word_length)
        .map(|matcher| matcher.find_all(text))
        .unwrap_or_default()
}

/// Whether `html` already links the phrase or the target.
///
/// True when an existing anchor's visible text contains the phrase, or when
/// `target_url` already appears as an href or injection marker anywhere.
pub fn is_phrase_already_linked(html: &str, phrase: &str, target_url: &str) -> bool {
    LinkedState::from_html(html).is_linked(phrase, target_url)
}
