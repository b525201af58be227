//! UTF-8-safe string helpers shared by the indexer, matcher and scorer.

/// Safely truncate a string to a maximum number of CHARACTERS (not bytes).
///
/// This function respects UTF-8 character boundaries and will never panic,
/// even with multi-byte characters.
///
/// # Examples
/// ```
/// # use kodegen_tools_interlink::utils::string_utils::safe_truncate_chars;
/// assert_eq!(safe_truncate_chars("Hello, World!", 5), "Hello");
/// assert_eq!(safe_truncate_chars("Hi", 100), "Hi");
/// ```
#[inline]
pub fn safe_truncate_chars(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        None => s,
        Some((byte_idx, _)) => &s[..byte_idx],
    }
}

/// True for characters that terminate a phrase match.
///
/// Hyphen and underscore count as word characters so that
/// "cache-aside" is one term and "cache" does not match inside it.
#[inline]
pub fn is_boundary_char(c: char) -> bool {
    !(c.is_alphanumeric() || c == '-' || c == '_')
}

/// Split text into lowercase word tokens.
///
/// Tokens keep inner hyphens and apostrophes; leading/trailing ones are trimmed.
pub fn tokenize_words(text: &str) -> Vec<String> {
    text.split(|c: char| !(c.is_alphanumeric() || c == '-' || c == '\''))
        .map(|w| w.trim_matches(|c| c == '-' || c == '\''))
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// Count whitespace-separated words.
#[inline]
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_multibyte() {
        assert_eq!(safe_truncate_chars("ééé", 2), "éé");
        assert_eq!(safe_truncate_chars("", 3), "");
    }

    #[test]
    fn test_boundary_chars() {
        assert!(is_boundary_char(' '));
        assert!(is_boundary_char(','));
        assert!(is_boundary_char('('));
        assert!(is_boundary_char('“'));
        assert!(!is_boundary_char('-'));
        assert!(!is_boundary_char('_'));
        assert!(!is_boundary_char('a'));
        assert!(!is_boundary_char('9'));
    }

    #[test]
    fn test_tokenize_words() {
        let words = tokenize_words("Cache-aside, write-through -- and LRU's (eviction)!");
        assert_eq!(
            words,
            vec!["cache-aside", "write-through", "and", "lru's", "eviction"]
        );
    }

    #[test]
    fn test_word_count() {
        assert_eq!(word_count("  one two\nthree\t"), 3);
        assert_eq!(word_count(""), 0);
    }
}
