//! Frequency-weighted keyword extraction from body text.

use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

use crate::utils::string_utils::tokenize_words;

/// Common English words that never make useful anchors.
static STOP_WORDS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        "a", "about", "above", "after", "again", "against", "all", "also", "am", "an", "and",
        "any", "are", "aren't", "as", "at", "be", "because", "been", "before", "being", "below",
        "between", "both", "but", "by", "can", "could", "did", "do", "does", "doing", "don't",
        "down", "during", "each", "even", "every", "few", "for", "from", "further", "get", "gets",
        "had", "has", "have", "having", "he", "her", "here", "hers", "him", "his", "how", "i",
        "if", "in", "into", "is", "isn't", "it", "it's", "its", "itself", "just", "like", "make",
        "makes", "many", "may", "me", "might", "more", "most", "much", "must", "my", "need",
        "new", "no", "nor", "not", "now", "of", "off", "often", "on", "once", "one", "only",
        "or", "other", "our", "ours", "out", "over", "own", "same", "see", "she", "should", "so",
        "some", "such", "than", "that", "that's", "the", "their", "theirs", "them", "then",
        "there", "these", "they", "this", "those", "through", "to", "too", "two", "under",
        "until", "up", "us", "use", "used", "uses", "using", "very", "was", "way", "we", "well",
        "were", "what", "when", "where", "which", "while", "who", "whom", "why", "will", "with",
        "without", "would", "you", "your", "yours",
    ]
    .into_iter()
    .collect()
});

/// Shortest token considered a keyword.
const MIN_TOKEN_CHARS: usize = 3;

/// Bigrams must repeat at least this often to count.
const MIN_BIGRAM_FREQUENCY: usize = 2;

/// Weight applied to bigram frequency so repeated phrases outrank single
/// words of the same count.
const BIGRAM_WEIGHT: f64 = 1.5;

#[must_use]
pub fn is_stop_word(word: &str) -> bool {
    STOP_WORDS.contains(word)
}

fn is_content_word(word: &str) -> bool {
    word.chars().count() >= MIN_TOKEN_CHARS
        && !is_stop_word(word)
        && !word.chars().all(|c| c.is_ascii_digit())
}

/// Extract up to `max` keywords from plain text.
///
/// Unigrams score by frequency; bigrams of adjacent content words score by
/// frequency times 1.5 and only when seen at least twice. Ties break
/// alphabetically so the result is deterministic. Keywords shorter than
/// `min_chars` are dropped.
pub fn extract_keywords(text: &str, max: usize, min_chars: usize) -> Vec<String> {
    if max == 0 {
        return Vec::new();
    }

    let tokens = tokenize_words(text);
    let mut unigrams: HashMap<&str, usize> = HashMap::new();
    let mut bigrams: HashMap<String, usize> = HashMap::new();

    for (idx, token) in tokens.iter().enumerate() {
        if !is_content_word(token) {
            continue;
        }
        *unigrams.entry(token.as_str()).or_default() += 1;

        if let Some(next) = tokens.get(idx + 1) {
            if is_content_word(next) {
                *bigrams.entry(format!("{token} {next}")).or_default() += 1;
            }
        }
    }

    let mut scored: Vec<(String, f64)> = unigrams
        .into_iter()
        .map(|(word, count)| (word.to_string(), count as f64))
        .chain(
            bigrams
                .into_iter()
                .filter(|(_, count)| *count >= MIN_BIGRAM_FREQUENCY)
                .map(|(phrase, count)| (phrase, count as f64 * BIGRAM_WEIGHT)),
        )
        .filter(|(phrase, _)| phrase.chars().count() >= min_chars)
        .collect();

    scored.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    scored.into_iter().take(max).map(|(phrase, _)| phrase).collect()
}
