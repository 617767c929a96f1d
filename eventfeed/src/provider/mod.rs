//! Summarization and explanation capability
//!
//! The recommender consumes only the [`ExplanationProvider`] contract. One
//! local adapter, [`LocalProvider`], ships today; a hosted model can be added
//! behind the same trait.

pub mod cache;
pub mod local;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

pub use cache::{CacheStats, SummaryCache};
pub use local::LocalProvider;

/// Fallback explanation when no specific reason applies
pub const GENERIC_REASON: &str = "popular and coming up soon";

/// Error type for provider calls
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// The provider could not be reached or refused the call
    #[error("Provider unavailable: {0}")]
    Unavailable(String),

    /// The provider answered with something unusable
    #[error("Invalid provider response: {0}")]
    InvalidResponse(String),
}

/// Inputs for a "why recommended" explanation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExplanationRequest {
    /// Interests of the viewer, or the base event's tags for similar events
    pub interests: Vec<String>,
    pub title: String,
    pub description: Option<String>,
    pub tags: Vec<String>,
    /// Whether the event is known to be free
    pub is_free: bool,
}

/// Summaries, explanations and zero-shot labels for events
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ExplanationProvider: Send + Sync + Debug {
    /// Provider identifier
    fn name(&self) -> String;

    /// Short extractive synopsis of at most `max_words` words
    async fn summarize(&self, text: &str, max_words: usize) -> Result<String, ProviderError>;

    /// One or two reasons joined by " • ", first letter capitalized
    async fn explain(&self, request: &ExplanationRequest) -> Result<String, ProviderError>;

    /// Labels that apply to the text, in the order given
    async fn classify(&self, text: &str, labels: &[String]) -> Result<Vec<String>, ProviderError>;
}

/// Capitalize the first character of a string
pub fn capitalize_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
