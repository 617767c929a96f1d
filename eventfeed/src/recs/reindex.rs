//! Embedding backfill for events and users

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::ml::{Embedder, EmbeddingManager};
use crate::storage::filters::{EventFilter, UserFilter};
use crate::storage::traits::RecStore;
use crate::{EventFeedError, Result};

/// Embedder guarded by a timeout and validated output
#[derive(Debug, Clone)]
pub struct TextEncoder {
    embedder: Arc<dyn Embedder>,
    manager: EmbeddingManager,
    timeout: Duration,
}

impl TextEncoder {
    pub fn new(embedder: Arc<dyn Embedder>, manager: EmbeddingManager, timeout: Duration) -> Self {
        Self {
            embedder,
            manager,
            timeout,
        }
    }

    /// Embed `text` into a validated, normalized vector
    pub async fn encode(&self, text: &str) -> Result<Vec<f32>> {
        let embedding = tokio::time::timeout(self.timeout, self.embedder.embed(text))
            .await
            .map_err(|_| {
                EventFeedError::Timeout(format!("Embedding timed out after {:?}", self.timeout))
            })??;
        Ok(self.manager.prepare(embedding)?)
    }

    /// Validation rules for client-supplied vectors
    pub fn manager(&self) -> &EmbeddingManager {
        &self.manager
    }

    pub fn model_name(&self) -> String {
        self.embedder.model_name()
    }
}

/// Counts of entities that received an embedding
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReindexReport {
    pub events: usize,
    pub users: usize,
}

/// Fills in missing event and user embeddings in bounded batches
#[derive(Debug, Clone)]
pub struct Reindexer {
    store: Arc<dyn RecStore>,
    encoder: TextEncoder,
    event_batch: usize,
    user_batch: usize,
}

impl Reindexer {
    pub fn new(
        store: Arc<dyn RecStore>,
        encoder: TextEncoder,
        event_batch: usize,
        user_batch: usize,
    ) -> Self {
        Self {
            store,
            encoder,
            event_batch,
            user_batch,
        }
    }

    /// Run one backfill pass.
    ///
    /// A failure to embed one entity is logged and skipped; storage errors
    /// abort the pass. Each kind is written back in a single store call.
    pub async fn run(&self) -> Result<ReindexReport> {
        let mut report = ReindexReport::default();

        let events = self
            .store
            .list_events(Some(EventFilter::missing_embedding()), Some(self.event_batch))
            .await?;
        let mut event_embeddings = Vec::with_capacity(events.len());
        for event in events {
            match self.encoder.encode(&event.text()).await {
                Ok(embedding) => event_embeddings.push((event.id, embedding)),
                Err(e) => warn!("Skipping embedding for event {}: {}", event.id, e),
            }
        }
        let encoded = event_embeddings.len();
        report.events = self
            .store
            .set_event_embeddings_if_absent(event_embeddings)
            .await?;
        if report.events < encoded {
            debug!(
                "{} events were embedded concurrently",
                encoded - report.events
            );
        }

        let users = self
            .store
            .list_users(Some(UserFilter::missing_embedding()), Some(self.user_batch))
            .await?;
        let mut user_embeddings = Vec::with_capacity(users.len());
        for user in users {
            match self.encoder.encode(&user.interest_text()).await {
                Ok(embedding) => user_embeddings.push((user.id, embedding)),
                Err(e) => warn!("Skipping embedding for user {}: {}", user.id, e),
            }
        }
        report.users = self
            .store
            .set_user_embeddings_if_absent(user_embeddings)
            .await?;

        info!(
            "Reindex complete: {} events, {} users embedded",
            report.events, report.users
        );
        Ok(report)
    }
}
