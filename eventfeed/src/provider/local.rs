//! Local rule-based provider

use async_trait::async_trait;
use lazy_static::lazy_static;
use regex::Regex;

use super::{capitalize_first, ExplanationProvider, ExplanationRequest, ProviderError, GENERIC_REASON};
use crate::search::keywords;

lazy_static! {
    static ref SENTENCE_END: Regex = Regex::new(r"[.!?]\s+").unwrap();
}

const MAX_LISTED: usize = 3;
const MAX_REASONS: usize = 2;
const REASON_SEPARATOR: &str = " • ";

/// Deterministic provider built on the shared tokenizer
#[derive(Debug, Clone, Default)]
pub struct LocalProvider;

impl LocalProvider {
    pub fn new() -> Self {
        Self
    }

    /// First sentence of `text`, cut to `max_words` words with a trailing ellipsis
    pub fn summarize_text(text: &str, max_words: usize) -> String {
        let text = text.trim();
        if text.is_empty() {
            return String::new();
        }

        let sentence = match SENTENCE_END.find(text) {
            Some(m) => &text[..m.start() + 1],
            None => text,
        };
        truncate_words(sentence, max_words)
    }

    /// Rule-based explanation
    pub fn explain_request(request: &ExplanationRequest) -> String {
        let text = format!(
            "{} {}",
            request.title,
            request.description.as_deref().unwrap_or("")
        );
        let words = keywords::word_set(&text);
        let kws = keywords::keyword_set(&text);

        let mut hits: Vec<String> = request
            .interests
            .iter()
            .map(|i| i.trim().to_lowercase())
            .filter(|i| !i.is_empty())
            .filter(|i| {
                words.contains(i) || kws.iter().any(|w| w.contains(i.as_str()) || i.contains(w.as_str()))
            })
            .collect();
        hits.sort();
        hits.dedup();

        let mut tag_hits: Vec<String> = request
            .tags
            .iter()
            .filter(|t| kws.contains(&t.trim().to_lowercase()))
            .cloned()
            .collect();
        tag_hits.sort();
        tag_hits.dedup();

        let mut reasons = Vec::new();
        if !hits.is_empty() {
            reasons.push(format!(
                "matches your interests: {}",
                hits.iter().take(MAX_LISTED).cloned().collect::<Vec<_>>().join(", ")
            ));
        }
        if !tag_hits.is_empty() {
            reasons.push(format!(
                "tagged {}",
                tag_hits.iter().take(MAX_LISTED).cloned().collect::<Vec<_>>().join(", ")
            ));
        }
        if request.is_free || kws.contains("free") {
            reasons.push("free to attend".to_string());
        }
        if kws.contains("career") || kws.contains("internship") {
            reasons.push("career-focused".to_string());
        }
        if reasons.is_empty() {
            reasons.push(GENERIC_REASON.to_string());
        }

        reasons.truncate(MAX_REASONS);
        capitalize_first(&reasons.join(REASON_SEPARATOR))
    }

    /// Labels whose lowercase form occurs in the text
    pub fn classify_text(text: &str, labels: &[String]) -> Vec<String> {
        let text = text.to_lowercase();
        labels
            .iter()
            .filter(|l| {
                let l = l.trim().to_lowercase();
                !l.is_empty() && text.contains(&l)
            })
            .cloned()
            .collect()
    }
}

/// First `max_words` whitespace-separated words, with "…" when cut
pub fn truncate_words(text: &str, max_words: usize) -> String {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.len() > max_words {
        format!("{}…", words[..max_words].join(" "))
    } else {
        words.join(" ")
    }
}

#[async_trait]
impl ExplanationProvider for LocalProvider {
    fn name(&self) -> String {
        "local".to_string()
    }

    async fn summarize(&self, text: &str, max_words: usize) -> Result<String, ProviderError> {
        Ok(Self::summarize_text(text, max_words))
    }

    async fn explain(&self, request: &ExplanationRequest) -> Result<String, ProviderError> {
        Ok(Self::explain_request(request))
    }

    async fn classify(&self, text: &str, labels: &[String]) -> Result<Vec<String>, ProviderError> {
        Ok(Self::classify_text(text, labels))
    }
}
