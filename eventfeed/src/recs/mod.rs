//! Recommendation pipeline
//!
//! Request flow: [`retriever`] (vector search or chronological fallback),
//! then scoring through [`crate::search::ScoreCalculator`], then
//! [`annotate`] (summary + explanation). Feedback flows through [`profile`],
//! [`reindex`] backfills missing embeddings and [`saved`] keeps bookmarks.

pub mod annotate;
pub mod events;
pub mod feed;
pub mod profile;
pub mod reindex;
pub mod retriever;
pub mod saved;
pub mod search;
pub mod similar;
pub mod users;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::Event;

pub use annotate::Annotator;
pub use events::EventOperations;
pub use feed::FeedComposer;
pub use profile::{FeedbackOutcome, ProfileUpdater};
pub use reindex::{ReindexReport, Reindexer, TextEncoder};
pub use retriever::SimilarityRetriever;
pub use saved::SavedEvents;
pub use search::EventSearch;
pub use similar::SimilarEventsResolver;
pub use users::UserOperations;

/// One annotated entry of a feed, search or similar-events response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedEvent {
    pub id: String,
    pub title: String,
    pub start_time: DateTime<Utc>,
    pub location: Option<String>,
    pub tags: Vec<String>,
    pub url: Option<String>,
    /// Ranking score rounded to six decimals
    pub score: f64,
    pub summary: String,
    pub explanation: String,
}

impl RankedEvent {
    pub(crate) fn new(event: Event, score: f64, summary: String, explanation: String) -> Self {
        Self {
            id: event.id,
            title: event.title,
            start_time: event.start_time,
            location: event.location,
            tags: event.tags,
            url: event.url,
            score: round_score(score),
            summary,
            explanation,
        }
    }
}

/// Round to six decimal places
pub fn round_score(score: f64) -> f64 {
    (score * 1e6).round() / 1e6
}

/// Stable sort by descending score; equal scores keep their upstream order
pub(crate) fn sort_by_score_desc(scored: &mut [(Event, f64)]) {
    scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
}
