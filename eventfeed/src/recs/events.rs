//! Event catalog operations

use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::ml::EmbeddingManager;
use crate::models::Event;
use crate::provider::ExplanationProvider;
use crate::storage::traits::RecStore;
use crate::{EventFeedError, Result};

/// Ingestion and lookup of catalog events
#[derive(Debug, Clone)]
pub struct EventOperations {
    store: Arc<dyn RecStore>,
    provider: Arc<dyn ExplanationProvider>,
    manager: EmbeddingManager,
    labels: Vec<String>,
    timeout: Duration,
}

impl EventOperations {
    pub fn new(
        store: Arc<dyn RecStore>,
        provider: Arc<dyn ExplanationProvider>,
        manager: EmbeddingManager,
        labels: Vec<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            store,
            provider,
            manager,
            labels,
            timeout,
        }
    }

    /// Add an event to the catalog.
    ///
    /// Untagged events are labelled by the provider; a supplied embedding
    /// must have the catalog dimension. Events without one are picked up by
    /// the next reindex.
    pub async fn create(&self, mut event: Event) -> Result<Event> {
        event.title = event.title.trim().to_string();
        if event.title.is_empty() {
            return Err(EventFeedError::InvalidInput(
                "Event title must not be empty".to_string(),
            ));
        }
        if let Some(end) = event.end_time
            && end < event.start_time
        {
            return Err(EventFeedError::InvalidInput(
                "Event end time precedes its start time".to_string(),
            ));
        }

        if let Some(embedding) = event.embedding.take() {
            let prepared = self
                .manager
                .prepare(embedding)
                .map_err(|e| EventFeedError::InvalidInput(e.to_string()))?;
            event.embedding = Some(prepared);
        }

        if event.tags.is_empty() && !self.labels.is_empty() {
            event.tags = self.auto_tags(&event).await;
        }

        let event = self.store.create_event(event).await?;
        info!("Created event {} ({} tags)", event.id, event.tags.len());
        Ok(event)
    }

    pub async fn get(&self, id: &str) -> Result<Event> {
        self.store
            .get_event(id)
            .await?
            .ok_or_else(|| EventFeedError::EventNotFound(id.to_string()))
    }

    async fn auto_tags(&self, event: &Event) -> Vec<String> {
        let text = event.text();
        match tokio::time::timeout(self.timeout, self.provider.classify(&text, &self.labels)).await
        {
            Ok(Ok(tags)) => {
                debug!("Auto-tagged event '{}' with {:?}", event.title, tags);
                tags
            }
            Ok(Err(e)) => {
                warn!("Auto-tagging failed for '{}': {}", event.title, e);
                Vec::new()
            }
            Err(_) => {
                warn!("Auto-tagging timed out for '{}'", event.title);
                Vec::new()
            }
        }
    }
}
