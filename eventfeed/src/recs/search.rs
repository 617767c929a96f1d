//! Keyword search over upcoming events

use chrono::{DateTime, Utc};
use std::sync::Arc;

use crate::storage::filters::EventFilter;
use crate::storage::traits::RecStore;
use crate::{EventFeedError, Result};

use super::{Annotator, RankedEvent};

/// Case-insensitive substring search on title and description.
///
/// Matches are returned soonest first with a fixed score of `0.0`.
#[derive(Debug, Clone)]
pub struct EventSearch {
    store: Arc<dyn RecStore>,
    annotator: Annotator,
}

impl EventSearch {
    pub fn new(store: Arc<dyn RecStore>, annotator: Annotator) -> Self {
        Self { store, annotator }
    }

    pub async fn search(
        &self,
        query: &str,
        interests: &[String],
        limit: usize,
        now: DateTime<Utc>,
    ) -> Result<Vec<RankedEvent>> {
        let query = query.trim();
        if query.is_empty() {
            return Err(EventFeedError::InvalidInput(
                "Search query must not be empty".to_string(),
            ));
        }
        if limit == 0 {
            return Ok(Vec::new());
        }

        let matches = self
            .store
            .list_events(Some(EventFilter::upcoming(now).containing(query)), Some(limit))
            .await?;

        let scored = matches.into_iter().map(|event| (event, 0.0)).collect();
        Ok(self.annotator.annotate(scored, interests).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EventBuilder;
    use crate::provider::{LocalProvider, SummaryCache};
    use crate::storage::traits::EventStore;
    use crate::storage::MemoryStore;
    use chrono::Duration as ChronoDuration;
    use std::time::Duration;

    async fn search_over(titles: &[(&str, i64)]) -> (EventSearch, DateTime<Utc>) {
        let now = Utc::now();
        let store = Arc::new(MemoryStore::new());
        for (title, days) in titles {
            store
                .create_event(
                    EventBuilder::new(*title, now + ChronoDuration::days(*days))
                        .id(*title)
                        .build(),
                )
                .await
                .unwrap();
        }
        let annotator = Annotator::new(
            Arc::new(LocalProvider::new()),
            SummaryCache::new(8),
            22,
            Duration::from_millis(500),
        );
        (EventSearch::new(store, annotator), now)
    }

    #[tokio::test]
    async fn test_search_matches_case_insensitively() {
        let (search, now) =
            search_over(&[("Late Jazz", 5), ("Early JAZZ brunch", 1), ("Chess", 2), ("Old jazz", -1)])
                .await;
        let results = search.search("jazz", &[], 10, now).await.unwrap();
        let ids: Vec<_> = results.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["Early JAZZ brunch", "Late Jazz"]);
        assert!(results.iter().all(|r| r.score == 0.0));
    }

    #[tokio::test]
    async fn test_search_without_matches_is_empty() {
        let (search, now) = search_over(&[("Chess", 2)]).await;
        assert!(search.search("zzzz", &[], 10, now).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_blank_query_is_invalid() {
        let (search, now) = search_over(&[]).await;
        let err = search.search("   ", &[], 10, now).await.unwrap_err();
        assert!(matches!(err, EventFeedError::InvalidInput(_)));
    }
}
