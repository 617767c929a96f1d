//! Similarity retriever with chronological fallback

use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::ml::{is_zero, normalize};
use crate::models::Event;
use crate::storage::filters::EventFilter;
use crate::storage::traits::{RecStore, VectorIndex, VectorQuery};
use crate::Result;

/// Nearest upcoming events to a query vector
#[derive(Debug, Clone)]
pub struct SimilarityRetriever {
    store: Arc<dyn RecStore>,
    index: Arc<dyn VectorIndex>,
    timeout: Duration,
}

impl SimilarityRetriever {
    pub fn new(store: Arc<dyn RecStore>, index: Arc<dyn VectorIndex>, timeout: Duration) -> Self {
        Self {
            store,
            index,
            timeout,
        }
    }

    /// Top-`k` upcoming events with their raw cosine similarity.
    ///
    /// A zero query vector, an index error or an index timeout all yield
    /// the soonest upcoming events with similarity `0.0`.
    pub async fn retrieve(
        &self,
        query: &[f32],
        k: usize,
        exclude_id: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<Vec<(Event, f32)>> {
        if k == 0 {
            return Ok(Vec::new());
        }

        if is_zero(query) {
            debug!("Zero query vector, using chronological fallback");
            return self.chronological(k, exclude_id, now).await;
        }

        let request = VectorQuery {
            vector: normalize(query),
            now,
            k,
            exclude_id: exclude_id.map(str::to_string),
        };

        match tokio::time::timeout(self.timeout, self.index.nearest_upcoming(request)).await {
            Ok(Ok(results)) => Ok(results),
            Ok(Err(e)) => {
                warn!("Vector search failed, using chronological fallback: {}", e);
                self.chronological(k, exclude_id, now).await
            }
            Err(_) => {
                warn!(
                    "Vector search timed out after {:?}, using chronological fallback",
                    self.timeout
                );
                self.chronological(k, exclude_id, now).await
            }
        }
    }

    async fn chronological(
        &self,
        k: usize,
        exclude_id: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<Vec<(Event, f32)>> {
        let mut filter = EventFilter::upcoming(now);
        filter.exclude_id = exclude_id.map(str::to_string);
        let events = self.store.list_events(Some(filter), Some(k)).await?;
        Ok(events.into_iter().map(|e| (e, 0.0)).collect())
    }
}
