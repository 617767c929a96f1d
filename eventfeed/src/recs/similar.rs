//! "More like this" for a single event

use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::debug;

use crate::models::Event;
use crate::search::calculator::LexicalProfile;
use crate::search::ScoreCalculator;
use crate::storage::filters::EventFilter;
use crate::storage::traits::RecStore;
use crate::{EventFeedError, Result};

use super::{sort_by_score_desc, Annotator, RankedEvent, SimilarityRetriever};

/// Ranks upcoming events by similarity to a base event.
///
/// Events with an embedding go through the retriever; events without one
/// fall back to keyword and tag overlap. Explanations use the base event's
/// tags as the interests.
#[derive(Debug, Clone)]
pub struct SimilarEventsResolver {
    store: Arc<dyn RecStore>,
    retriever: SimilarityRetriever,
    annotator: Annotator,
    calculator: ScoreCalculator,
}

impl SimilarEventsResolver {
    pub fn new(
        store: Arc<dyn RecStore>,
        retriever: SimilarityRetriever,
        annotator: Annotator,
        calculator: ScoreCalculator,
    ) -> Self {
        Self {
            store,
            retriever,
            annotator,
            calculator,
        }
    }

    pub async fn similar(
        &self,
        event_id: &str,
        limit: usize,
        now: DateTime<Utc>,
    ) -> Result<Vec<RankedEvent>> {
        let base = self
            .store
            .get_event(event_id)
            .await?
            .ok_or_else(|| EventFeedError::EventNotFound(event_id.to_string()))?;

        if limit == 0 {
            return Ok(Vec::new());
        }

        let scored = match base.embedding.as_deref() {
            Some(embedding) => {
                debug!("Similar events for {} via vector index", base.id);
                self.retriever
                    .retrieve(embedding, limit, Some(&base.id), now)
                    .await?
                    .into_iter()
                    .map(|(event, similarity)| (event, similarity as f64))
                    .collect()
            }
            None => {
                debug!("Similar events for {} via lexical overlap", base.id);
                self.lexical_neighbours(&base, limit, now).await?
            }
        };

        Ok(self.annotator.annotate(scored, &base.tags).await)
    }

    async fn lexical_neighbours(
        &self,
        base: &Event,
        limit: usize,
        now: DateTime<Utc>,
    ) -> Result<Vec<(Event, f64)>> {
        let pool = self.calculator.config().candidate_pool;
        let candidates = self
            .store
            .list_events(Some(EventFilter::upcoming(now).excluding(&base.id)), Some(pool))
            .await?;

        let base_profile = LexicalProfile::from_event(base);
        let mut scored: Vec<(Event, f64)> = candidates
            .into_iter()
            .map(|event| {
                let score = self
                    .calculator
                    .lexical_similarity(&base_profile, &LexicalProfile::from_event(&event));
                (event, score)
            })
            .collect();

        sort_by_score_desc(&mut scored);
        scored.truncate(limit);
        Ok(scored)
    }
}
