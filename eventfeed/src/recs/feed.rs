//! Personalized feed composition

use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::debug;

use crate::ml::{normalize_or_zero, EMBEDDING_DIM};
use crate::models::{Event, User};
use crate::search::{ScoreCalculator, ScoringStrategy};
use crate::storage::filters::EventFilter;
use crate::storage::traits::RecStore;
use crate::Result;

use super::{sort_by_score_desc, Annotator, RankedEvent, SimilarityRetriever};

/// Builds a user's feed from one of the two scoring paths
#[derive(Debug, Clone)]
pub struct FeedComposer {
    store: Arc<dyn RecStore>,
    retriever: SimilarityRetriever,
    annotator: Annotator,
    calculator: ScoreCalculator,
}

impl FeedComposer {
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

    /// Scoring path chosen for this viewer
    pub fn strategy_for(&self, user: Option<&User>) -> ScoringStrategy {
        let has_embedding = user.and_then(usable_embedding).is_some();
        self.calculator.config().strategy.resolve(has_embedding)
    }

    /// Top `limit` upcoming events for the viewer; `None` is anonymous
    pub async fn compose(
        &self,
        user: Option<&User>,
        limit: usize,
        now: DateTime<Utc>,
    ) -> Result<Vec<RankedEvent>> {
        if limit == 0 {
            return Ok(Vec::new());
        }

        let interests: Vec<String> = user.map(|u| u.interests.clone()).unwrap_or_default();
        let strategy = self.strategy_for(user);
        debug!(
            "Composing feed of {} with {} strategy (anonymous: {})",
            limit,
            strategy,
            user.is_none()
        );

        let mut scored = match strategy {
            ScoringStrategy::LexicalRecency => self.lexical_candidates(&interests, now).await?,
            ScoringStrategy::VectorRerank => {
                let query = normalize_or_zero(user.and_then(usable_embedding));
                self.vector_candidates(&query, limit, now).await?
            }
        };

        sort_by_score_desc(&mut scored);
        scored.truncate(limit);
        Ok(self.annotator.annotate(scored, &interests).await)
    }

    async fn lexical_candidates(
        &self,
        interests: &[String],
        now: DateTime<Utc>,
    ) -> Result<Vec<(Event, f64)>> {
        let pool = self.calculator.config().candidate_pool;
        let events = self
            .store
            .list_events(Some(EventFilter::upcoming(now)), Some(pool))
            .await?;

        Ok(events
            .into_iter()
            .map(|event| {
                let score = self.calculator.lexical_score(interests, &event, now);
                (event, score)
            })
            .filter(|(_, score)| score.is_finite())
            .collect())
    }

    async fn vector_candidates(
        &self,
        query: &[f32],
        limit: usize,
        now: DateTime<Utc>,
    ) -> Result<Vec<(Event, f64)>> {
        let k = limit.saturating_mul(self.calculator.config().vector_overfetch.max(1));
        let neighbours = self.retriever.retrieve(query, k, None, now).await?;

        Ok(neighbours
            .into_iter()
            .map(|(event, similarity)| {
                let score = self.calculator.vector_score(similarity as f64, &event, now);
                (event, score)
            })
            .filter(|(_, score)| score.is_finite())
            .collect())
    }
}

/// The user's embedding when it has the right shape and is not the zero sentinel
fn usable_embedding(user: &User) -> Option<&[f32]> {
    user.embedding
        .as_deref()
        .filter(|v| v.len() == EMBEDDING_DIM && v.iter().any(|x| *x != 0.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EventBuilder, UserBuilder};
    use crate::provider::{LocalProvider, SummaryCache};
    use crate::search::{FeedStrategy, ScoringConfig};
    use crate::storage::traits::EventStore;
    use crate::storage::MemoryStore;
    use chrono::Duration as ChronoDuration;
    use std::time::Duration;

    fn axis(i: usize) -> Vec<f32> {
        let mut v = vec![0.0; EMBEDDING_DIM];
        v[i] = 1.0;
        v
    }

    fn composer(store: Arc<MemoryStore>, config: ScoringConfig) -> FeedComposer {
        let retriever =
            SimilarityRetriever::new(store.clone(), store.clone(), Duration::from_secs(1));
        let annotator = Annotator::new(
            Arc::new(LocalProvider::new()),
            SummaryCache::new(32),
            22,
            Duration::from_millis(500),
        );
        FeedComposer::new(store, retriever, annotator, ScoreCalculator::new(config))
    }

    #[tokio::test]
    async fn test_lexical_feed_prefers_interests() {
        let now = Utc::now();
        let store = Arc::new(MemoryStore::new());
        store
            .create_event(
                EventBuilder::new("Jazz night", now + ChronoDuration::days(1))
                    .id("jazz")
                    .build(),
            )
            .await
            .unwrap();
        store
            .create_event(
                EventBuilder::new("Rust workshop", now + ChronoDuration::days(2))
                    .id("rust")
                    .tag("technology")
                    .build(),
            )
            .await
            .unwrap();

        let feed = composer(store, ScoringConfig::default());
        let user = UserBuilder::new("a@example.com").interests(["rust"]).build();
        let ranked = feed.compose(Some(&user), 10, now).await.unwrap();

        assert_eq!(ranked[0].id, "rust");
        let expected = 1.0 + 2.0 * (-2.0f64 / 7.0).exp();
        assert!((ranked[0].score - expected).abs() < 1e-5);
        assert_eq!(ranked[1].id, "jazz");
    }

    #[tokio::test]
    async fn test_anonymous_feed_is_soonest_first() {
        let now = Utc::now();
        let store = Arc::new(MemoryStore::new());
        for (id, days) in [("c", 9), ("a", 1), ("b", 4)] {
            store
                .create_event(
                    EventBuilder::new(id, now + ChronoDuration::days(days))
                        .id(id)
                        .build(),
                )
                .await
                .unwrap();
        }
        store
            .create_event(
                EventBuilder::new("past", now - ChronoDuration::days(1))
                    .id("past")
                    .build(),
            )
            .await
            .unwrap();

        let feed = composer(store, ScoringConfig::default());
        let ranked = feed.compose(None, 2, now).await.unwrap();
        let ids: Vec<_> = ranked.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_vector_feed_uses_embedding() {
        let now = Utc::now();
        let store = Arc::new(MemoryStore::new());
        store
            .create_event(
                EventBuilder::new("near match", now + ChronoDuration::days(7))
                    .id("match")
                    .embedding(axis(3))
                    .build(),
            )
            .await
            .unwrap();
        store
            .create_event(
                EventBuilder::new("soon", now + ChronoDuration::days(1))
                    .id("soon")
                    .embedding(axis(4))
                    .build(),
            )
            .await
            .unwrap();

        let feed = composer(store, ScoringConfig::default());
        let user = UserBuilder::new("v@example.com").embedding(axis(3)).build();
        assert_eq!(feed.strategy_for(Some(&user)), ScoringStrategy::VectorRerank);

        let ranked = feed.compose(Some(&user), 1, now).await.unwrap();
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].id, "match");
        assert!((ranked[0].score - (0.7 + 0.3 * 0.5)).abs() < 1e-5);
    }

    #[tokio::test]
    async fn test_zero_embedding_uses_lexical_in_auto() {
        let store = Arc::new(MemoryStore::new());
        let feed = composer(store.clone(), ScoringConfig::default());
        let user = UserBuilder::new("z@example.com")
            .embedding(vec![0.0; EMBEDDING_DIM])
            .build();
        assert_eq!(feed.strategy_for(Some(&user)), ScoringStrategy::LexicalRecency);

        let forced = composer(
            store,
            ScoringConfig {
                strategy: FeedStrategy::Vector,
                ..ScoringConfig::default()
            },
        );
        assert_eq!(forced.strategy_for(None), ScoringStrategy::VectorRerank);
        assert!(forced.compose(None, 5, Utc::now()).await.unwrap().is_empty());
    }
}
