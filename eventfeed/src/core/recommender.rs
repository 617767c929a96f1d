//! Recommender interface for EventFeed
//!
//! This module provides the primary interface to the recommendation system.
//! It wires the storage, embedding and provider capabilities into the
//! pipeline components and delegates each operation to one of them.

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

use crate::config::EventFeedConfig;
use crate::ml::{Embedder, EmbeddingManager, HashingEmbedder, EMBEDDING_DIM};
use crate::models::{Event, FeedbackSignals, InteractionMetrics, User};
use crate::provider::{CacheStats, ExplanationProvider, LocalProvider, SummaryCache};
use crate::recs::{
    Annotator, EventOperations, EventSearch, FeedComposer, FeedbackOutcome, ProfileUpdater,
    RankedEvent, ReindexReport, Reindexer, SavedEvents, SimilarEventsResolver,
    SimilarityRetriever, TextEncoder, UserOperations,
};
use crate::search::{FeedStrategy, ScoreCalculator};
use crate::storage::filters::{EventFilter, UserFilter};
use crate::storage::traits::{RecStore, VectorIndex};
use crate::storage::create_storage_service;
use crate::{EventFeedError, Result};

/// Window reported by [`Recommender::metrics`]
pub const METRICS_WINDOW: &str = "last_24h";

/// Catalog counts and active settings, as reported by health checks
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatalogStatus {
    pub healthy: bool,
    pub events: usize,
    pub upcoming_events: usize,
    pub events_with_embedding: usize,
    pub users: usize,
    pub users_with_embedding: usize,
    pub feed_strategy: FeedStrategy,
    pub embedding_model: String,
    pub provider: String,
    pub summary_cache: CacheStats,
    /// Backend-specific details from the store
    pub storage: serde_json::Value,
}

/// The primary interface for ranking and recording interactions.
///
/// `Recommender` owns one instance of each pipeline component and exposes
/// every operation twice: once at the current time and once at an explicit
/// `now` (the `_at` variants) for deterministic callers.
#[derive(Debug, Clone)]
pub struct Recommender {
    store: Arc<dyn RecStore>,

    /// Personalized feed
    feed: FeedComposer,

    /// More-like-this
    similar: SimilarEventsResolver,

    /// Keyword search
    search: EventSearch,

    /// Feedback log and profile drift
    profiles: ProfileUpdater,

    /// Embedding backfill
    reindexer: Reindexer,

    users: UserOperations,
    events: EventOperations,
    saved: SavedEvents,
    annotator: Annotator,

    embedding_model: String,
    provider_name: String,
    config: EventFeedConfig,
}

impl Recommender {
    /// Create a recommender over the given capabilities
    pub fn new(
        store: Arc<dyn RecStore>,
        index: Arc<dyn VectorIndex>,
        embedder: Arc<dyn Embedder>,
        provider: Arc<dyn ExplanationProvider>,
        config: EventFeedConfig,
    ) -> Result<Self> {
        if embedder.dimension() != EMBEDDING_DIM {
            return Err(EventFeedError::Configuration(format!(
                "Embedder '{}' produces {} dimensions, expected {}",
                embedder.model_name(),
                embedder.dimension(),
                EMBEDDING_DIM
            )));
        }

        let calculator =
            ScoreCalculator::try_new(config.ranking.clone()).map_err(EventFeedError::Configuration)?;
        let manager = EmbeddingManager::with_expected_dimensions(EMBEDDING_DIM);
        let encoder = TextEncoder::new(embedder.clone(), manager.clone(), config.embedding.timeout);

        let retriever = SimilarityRetriever::new(
            Arc::clone(&store),
            index,
            config.embedding.timeout,
        );
        let annotator = Annotator::new(
            Arc::clone(&provider),
            SummaryCache::new(config.summary.cache_capacity),
            config.summary.max_words,
            config.summary.timeout,
        );

        let feed = FeedComposer::new(
            Arc::clone(&store),
            retriever.clone(),
            annotator.clone(),
            calculator.clone(),
        );
        let similar = SimilarEventsResolver::new(
            Arc::clone(&store),
            retriever,
            annotator.clone(),
            calculator,
        );
        let search = EventSearch::new(Arc::clone(&store), annotator.clone());
        let profiles = ProfileUpdater::new(
            Arc::clone(&store),
            config.profile.alpha,
            config.profile.max_retries,
        );
        let reindexer = Reindexer::new(
            Arc::clone(&store),
            encoder.clone(),
            config.reindex.event_batch,
            config.reindex.user_batch,
        );
        let users = UserOperations::new(Arc::clone(&store), encoder);
        let saved = SavedEvents::new(Arc::clone(&store));
        let events = EventOperations::new(
            Arc::clone(&store),
            Arc::clone(&provider),
            manager,
            config.ingest.labels.clone(),
            config.summary.timeout,
        );

        Ok(Self {
            store,
            feed,
            similar,
            search,
            profiles,
            reindexer,
            users,
            events,
            saved,
            annotator,
            embedding_model: embedder.model_name(),
            provider_name: provider.name(),
            config,
        })
    }

    /// Create a recommender from configuration with the local embedder and provider
    pub async fn from_config(config: EventFeedConfig) -> Result<Self> {
        let store = create_storage_service(&config).await?;
        let embedder = HashingEmbedder::new().with_model_name(config.embedding.model_name.clone());

        info!(
            "Initializing recommender (strategy: {}, embedder: {})",
            config.ranking.strategy, config.embedding.model_name
        );

        Self::new(
            store.clone(),
            store,
            Arc::new(embedder),
            Arc::new(LocalProvider::new()),
            config,
        )
    }

    /// Get the configuration
    pub fn config(&self) -> &EventFeedConfig {
        &self.config
    }

    // =============================================================================
    // Ranking
    // =============================================================================

    /// Personalized feed; `None` is an anonymous viewer
    pub async fn feed(&self, user_id: Option<&str>, limit: usize) -> Result<Vec<RankedEvent>> {
        self.feed_at(user_id, limit, Utc::now()).await
    }

    pub async fn feed_at(
        &self,
        user_id: Option<&str>,
        limit: usize,
        now: DateTime<Utc>,
    ) -> Result<Vec<RankedEvent>> {
        let viewer = self.users.resolve_viewer(user_id).await?;
        self.feed.compose(viewer.as_ref(), limit, now).await
    }

    /// Upcoming events similar to `event_id`
    pub async fn similar(&self, event_id: &str, limit: usize) -> Result<Vec<RankedEvent>> {
        self.similar_at(event_id, limit, Utc::now()).await
    }

    pub async fn similar_at(
        &self,
        event_id: &str,
        limit: usize,
        now: DateTime<Utc>,
    ) -> Result<Vec<RankedEvent>> {
        self.similar.similar(event_id, limit, now).await
    }

    /// Keyword search; the viewer only influences explanations
    pub async fn search(
        &self,
        query: &str,
        user_id: Option<&str>,
        limit: usize,
    ) -> Result<Vec<RankedEvent>> {
        self.search_at(query, user_id, limit, Utc::now()).await
    }

    pub async fn search_at(
        &self,
        query: &str,
        user_id: Option<&str>,
        limit: usize,
        now: DateTime<Utc>,
    ) -> Result<Vec<RankedEvent>> {
        let interests = self
            .users
            .resolve_viewer(user_id)
            .await?
            .map(|u| u.interests)
            .unwrap_or_default();
        self.search.search(query, &interests, limit, now).await
    }

    // =============================================================================
    // Feedback
    // =============================================================================

    /// Record an interaction and nudge the user's profile
    pub async fn record_feedback(
        &self,
        user_id: &str,
        event_id: &str,
        signals: FeedbackSignals,
    ) -> Result<FeedbackOutcome> {
        self.record_feedback_at(user_id, event_id, signals, Utc::now())
            .await
    }

    pub async fn record_feedback_at(
        &self,
        user_id: &str,
        event_id: &str,
        signals: FeedbackSignals,
        now: DateTime<Utc>,
    ) -> Result<FeedbackOutcome> {
        self.profiles.record(user_id, event_id, signals, now).await
    }

    /// Interaction counts over the last 24 hours
    pub async fn metrics(&self) -> Result<InteractionMetrics> {
        self.metrics_at(Utc::now()).await
    }

    pub async fn metrics_at(&self, now: DateTime<Utc>) -> Result<InteractionMetrics> {
        Ok(self
            .store
            .interaction_metrics(now - ChronoDuration::hours(24), METRICS_WINDOW)
            .await?)
    }

    // =============================================================================
    // Users
    // =============================================================================

    /// Create or update a user by email
    pub async fn bootstrap_user(
        &self,
        email: &str,
        display_name: Option<String>,
        interests: Vec<String>,
    ) -> Result<User> {
        self.users.bootstrap(email, display_name, interests).await
    }

    pub async fn get_user(&self, id: &str) -> Result<User> {
        self.users.get(id).await
    }

    /// Replace a user's interests without recomputing the embedding
    pub async fn replace_interests(&self, id: &str, interests: Vec<String>) -> Result<User> {
        self.users.replace_interests(id, interests).await
    }

    // =============================================================================
    // Events
    // =============================================================================

    pub async fn create_event(&self, event: Event) -> Result<Event> {
        self.events.create(event).await
    }

    pub async fn get_event(&self, id: &str) -> Result<Event> {
        self.events.get(id).await
    }

    // =============================================================================
    // Saved events
    // =============================================================================

    /// Bookmark an event; `false` if it was already saved
    pub async fn save_event(&self, user_id: &str, event_id: &str) -> Result<bool> {
        self.save_event_at(user_id, event_id, Utc::now()).await
    }

    pub async fn save_event_at(
        &self,
        user_id: &str,
        event_id: &str,
        now: DateTime<Utc>,
    ) -> Result<bool> {
        self.saved.save(user_id, event_id, now).await
    }

    pub async fn unsave_event(&self, user_id: &str, event_id: &str) -> Result<()> {
        self.saved.unsave(user_id, event_id).await
    }

    /// A user's saved events, soonest first
    pub async fn saved_events(&self, user_id: &str) -> Result<Vec<Event>> {
        self.saved.list(user_id).await
    }

    // =============================================================================
    // Maintenance
    // =============================================================================

    /// Backfill missing embeddings
    pub async fn reindex(&self) -> Result<ReindexReport> {
        self.reindexer.run().await
    }

    /// Catalog counts and active settings
    pub async fn status(&self) -> Result<CatalogStatus> {
        self.status_at(Utc::now()).await
    }

    pub async fn status_at(&self, now: DateTime<Utc>) -> Result<CatalogStatus> {
        let embedded = EventFilter::default().with_embedding(true);
        let embedded_users = UserFilter {
            embedding_present: Some(true),
            ..UserFilter::default()
        };

        Ok(CatalogStatus {
            healthy: self.store.health_check().await?,
            events: self.store.count_events(None).await?,
            upcoming_events: self
                .store
                .count_events(Some(EventFilter::upcoming(now)))
                .await?,
            events_with_embedding: self.store.count_events(Some(embedded)).await?,
            users: self.store.count_users(None).await?,
            users_with_embedding: self.store.count_users(Some(embedded_users)).await?,
            feed_strategy: self.config.ranking.strategy,
            embedding_model: self.embedding_model.clone(),
            provider: self.provider_name.clone(),
            summary_cache: self.annotator.cache().stats().await,
            storage: self.store.get_metadata().await?,
        })
    }

    /// Flush and release the store
    pub async fn shutdown(&self) -> Result<()> {
        info!("Shutting down recommender");
        Ok(self.store.close().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigBuilder;
    use crate::ml::embedder::MockEmbedder;
    use crate::models::EventBuilder;

    fn config() -> EventFeedConfig {
        ConfigBuilder::new().with_memory_storage().build().unwrap()
    }

    #[tokio::test]
    async fn test_rejects_wrong_embedder_dimension() {
        let store = Arc::new(crate::storage::MemoryStore::new());
        let mut embedder = MockEmbedder::new();
        embedder.expect_dimension().return_const(16usize);
        embedder
            .expect_model_name()
            .return_const("tiny".to_string());

        let err = Recommender::new(
            store.clone(),
            store,
            Arc::new(embedder),
            Arc::new(LocalProvider::new()),
            config(),
        )
        .unwrap_err();
        assert!(matches!(err, EventFeedError::Configuration(_)));
    }

    #[tokio::test]
    async fn test_status_counts() {
        let rec = Recommender::from_config(config()).await.unwrap();
        let now = Utc::now();
        rec.create_event(
            EventBuilder::new("Past", now - ChronoDuration::days(1))
                .tag("music")
                .build(),
        )
        .await
        .unwrap();
        rec.create_event(
            EventBuilder::new("Next", now + ChronoDuration::days(1))
                .tag("music")
                .build(),
        )
        .await
        .unwrap();
        rec.bootstrap_user("s@example.com", None, vec!["music".to_string()])
            .await
            .unwrap();

        let status = rec.status_at(now).await.unwrap();
        assert!(status.healthy);
        assert_eq!(status.events, 2);
        assert_eq!(status.upcoming_events, 1);
        assert_eq!(status.events_with_embedding, 0);
        assert_eq!(status.users_with_embedding, 1);
        assert_eq!(status.provider, "local");

        let report = rec.reindex().await.unwrap();
        assert_eq!(report.events, 2);
        let status = rec.status_at(now).await.unwrap();
        assert_eq!(status.events_with_embedding, 2);
        assert_eq!(status.storage["type"], "memory");
        assert_eq!(status.storage["event_count"], 2);
    }

    #[tokio::test]
    async fn test_saved_events_round_trip() {
        let rec = Recommender::from_config(config()).await.unwrap();
        let now = Utc::now();
        let event = rec
            .create_event(EventBuilder::new("Gig", now + ChronoDuration::days(1)).build())
            .await
            .unwrap();
        let user = rec.bootstrap_user("s@example.com", None, Vec::new()).await.unwrap();

        assert!(rec.save_event_at(&user.id, &event.id, now).await.unwrap());
        assert!(!rec.save_event(&user.id, &event.id).await.unwrap());
        assert_eq!(rec.saved_events(&user.id).await.unwrap().len(), 1);
        assert_eq!(rec.status().await.unwrap().storage["saved_count"], 1);

        rec.unsave_event(&user.id, &event.id).await.unwrap();
        assert!(rec.saved_events(&user.id).await.unwrap().is_empty());
        let err = rec.unsave_event(&user.id, &event.id).await.unwrap_err();
        assert!(matches!(err, EventFeedError::NotFound(_)));
    }
}
