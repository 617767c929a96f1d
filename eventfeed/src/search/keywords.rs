//! Canonical tokenizer shared by scoring, similarity and explanations

use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashSet;

/// English function words ignored during matching
pub const STOP_WORDS: &[&str] = &[
    "a", "an", "the", "and", "or", "but", "if", "then", "else", "for", "of", "on", "in", "with",
    "to", "from", "at", "by", "about", "is", "are", "be", "this", "that", "it", "as", "you",
    "your", "our", "we", "they", "will", "their", "there", "here",
];

/// Keywords must be longer than this many characters
pub const MIN_KEYWORD_LEN: usize = 2;

lazy_static! {
    static ref WORD_RE: Regex = Regex::new(r"[A-Za-z0-9]+").unwrap();
    static ref STOP_SET: HashSet<&'static str> = STOP_WORDS.iter().copied().collect();
}

/// Whether a lowercase token is a stop word
pub fn is_stop_word(token: &str) -> bool {
    STOP_SET.contains(token)
}

/// Lowercase alphanumeric tokens in order, stop words removed
pub fn words(text: &str) -> Vec<String> {
    WORD_RE
        .find_iter(text)
        .map(|m| m.as_str().to_lowercase())
        .filter(|w| !is_stop_word(w))
        .collect()
}

/// Set of all non-stop-word tokens, short ones included
pub fn word_set(text: &str) -> HashSet<String> {
    words(text).into_iter().collect()
}

/// Set of keywords: non-stop-word tokens longer than [`MIN_KEYWORD_LEN`]
pub fn keyword_set(text: &str) -> HashSet<String> {
    words(text)
        .into_iter()
        .filter(|w| w.chars().count() > MIN_KEYWORD_LEN)
        .collect()
}

/// Lowercased, trimmed, non-empty tags
pub fn tag_set<S: AsRef<str>>(tags: &[S]) -> HashSet<String> {
    tags.iter()
        .map(|t| t.as_ref().trim().to_lowercase())
        .filter(|t| !t.is_empty())
        .collect()
}

/// Jaccard similarity; `0.0` when either side is empty or nothing overlaps
pub fn jaccard(a: &HashSet<String>, b: &HashSet<String>) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let inter = a.intersection(b).count();
    if inter == 0 {
        return 0.0;
    }
    let union = a.union(b).count();
    inter as f64 / union as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(items: &[&str]) -> HashSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_words_drop_stop_words_and_punctuation() {
        assert_eq!(
            words("The AI Workshop: build it with Rust!"),
            vec!["ai", "workshop", "build", "rust"]
        );
        assert!(words("").is_empty());
    }

    #[test]
    fn test_keyword_set_length_filter() {
        let kws = keyword_set("AI and ML for Data Science 101");
        assert!(!kws.contains("ai"));
        assert!(!kws.contains("ml"));
        assert!(kws.contains("data"));
        assert!(kws.contains("101"));

        let all = word_set("AI and ML");
        assert!(all.contains("ai"));
        assert!(all.contains("ml"));
    }

    #[test]
    fn test_tag_set_normalizes() {
        let tags = tag_set(&["Music", " music ", "", "Live"]);
        assert_eq!(tags, set(&["music", "live"]));
    }

    #[test]
    fn test_jaccard_properties() {
        let a = set(&["rust", "meetup"]);
        let b = set(&["rust", "talk", "pizza"]);
        let empty = HashSet::new();

        assert_eq!(jaccard(&a, &a), 1.0);
        assert_eq!(jaccard(&empty, &empty), 0.0);
        assert_eq!(jaccard(&a, &empty), 0.0);
        assert_eq!(jaccard(&a, &b), jaccard(&b, &a));
        assert!((jaccard(&a, &b) - 0.25).abs() < 1e-12);
        assert_eq!(jaccard(&a, &set(&["pottery"])), 0.0);
    }
}
