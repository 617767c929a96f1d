//! Feedback recording and user profile drift
//!
//! A positive interaction moves the user's embedding toward the event's:
//! `normalize(alpha * user + (1 - alpha) * event)`, or just the normalized
//! event vector when the user has none yet. The record and the new
//! embedding commit together; a concurrent profile change is retried a
//! bounded number of times before falling back to last-writer-wins.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info};

use crate::ml::{blend, is_zero, normalize, EMBEDDING_DIM};
use crate::models::{Event, Feedback, FeedbackSignals, User};
use crate::storage::traits::{EmbeddingPrecondition, ProfileUpdate, RecStore};
use crate::{EventFeedError, Result};

/// Result of recording one feedback record
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeedbackOutcome {
    pub feedback_id: String,
    pub profile_updated: bool,
}

/// Applies feedback to the log and the user profile
#[derive(Debug, Clone)]
pub struct ProfileUpdater {
    store: Arc<dyn RecStore>,
    alpha: f32,
    max_retries: u32,
}

impl ProfileUpdater {
    pub fn new(store: Arc<dyn RecStore>, alpha: f32, max_retries: u32) -> Self {
        Self {
            store,
            alpha,
            max_retries,
        }
    }

    /// Record feedback from `user_id` on `event_id` at `now`
    pub async fn record(
        &self,
        user_id: &str,
        event_id: &str,
        signals: FeedbackSignals,
        now: DateTime<Utc>,
    ) -> Result<FeedbackOutcome> {
        let event = self
            .store
            .get_event(event_id)
            .await?
            .ok_or_else(|| EventFeedError::EventNotFound(event_id.to_string()))?;

        let mut attempt = 0;
        loop {
            let user = self
                .store
                .get_user(user_id)
                .await?
                .ok_or_else(|| EventFeedError::UserNotFound(user_id.to_string()))?;

            let update = if signals.is_positive() {
                self.next_embedding(&user, &event).map(|embedding| ProfileUpdate {
                    user_id: user.id.clone(),
                    precondition: if attempt < self.max_retries {
                        EmbeddingPrecondition::Expect(user.embedding.clone())
                    } else {
                        EmbeddingPrecondition::Unchecked
                    },
                    embedding,
                })
            } else {
                None
            };
            let profile_updated = update.is_some();

            let feedback = Feedback::new(user_id, event_id, signals, now);
            let feedback_id = feedback.id.clone();

            match self.store.commit_feedback(feedback, update).await {
                Ok(()) => {
                    debug!(
                        "Recorded feedback {} (profile updated: {})",
                        feedback_id, profile_updated
                    );
                    return Ok(FeedbackOutcome {
                        feedback_id,
                        profile_updated,
                    });
                }
                Err(e) if e.is_conflict() && attempt < self.max_retries => {
                    attempt += 1;
                    info!(
                        "Profile for user {} changed concurrently, retrying ({}/{})",
                        user_id, attempt, self.max_retries
                    );
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// New profile vector after a positive interaction, if the event has one
    pub fn next_embedding(&self, user: &User, event: &Event) -> Option<Vec<f32>> {
        let event_vec = event
            .embedding
            .as_deref()
            .filter(|v| v.len() == EMBEDDING_DIM && !is_zero(v))?;

        let current = user
            .embedding
            .as_deref()
            .filter(|v| v.len() == EMBEDDING_DIM && !is_zero(v));

        Some(match current {
            Some(user_vec) => normalize(&blend(user_vec, event_vec, self.alpha)),
            None => normalize(event_vec),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml::{cosine_similarity, l2_norm};
    use crate::models::{EventBuilder, InteractionMetrics, SavedEvent, UserBuilder};
    use crate::storage::errors::StorageError;
    use crate::storage::filters::{EventFilter, FeedbackFilter, UserFilter};
    use crate::storage::traits::{
        BaseStore, EventStore, FeedbackStore, SavedEventStore, UserStore,
    };
    use crate::storage::MemoryStore;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn axis(i: usize) -> Vec<f32> {
        let mut v = vec![0.0; EMBEDDING_DIM];
        v[i] = 1.0;
        v
    }

    async fn seeded(user_embedding: Option<Vec<f32>>) -> Arc<MemoryStore> {
        let store = Arc::new(MemoryStore::new());
        let mut user = UserBuilder::new("u@example.com").id("u1");
        if let Some(e) = user_embedding {
            user = user.embedding(e);
        }
        store.save_user(user.build()).await.unwrap();
        store
            .create_event(
                EventBuilder::new("Concert", Utc::now())
                    .id("e1")
                    .embedding(axis(1))
                    .build(),
            )
            .await
            .unwrap();
        store
            .create_event(EventBuilder::new("Plain", Utc::now()).id("e2").build())
            .await
            .unwrap();
        store
    }

    #[tokio::test]
    async fn test_first_positive_feedback_adopts_event_vector() {
        let store = seeded(None).await;
        let updater = ProfileUpdater::new(store.clone(), 0.9, 3);
        let outcome = updater
            .record("u1", "e1", FeedbackSignals::click(), Utc::now())
            .await
            .unwrap();
        assert!(outcome.profile_updated);

        let user = store.get_user("u1").await.unwrap().unwrap();
        assert_eq!(user.embedding, Some(axis(1)));
    }

    #[tokio::test]
    async fn test_positive_feedback_blends_toward_event() {
        let store = seeded(Some(axis(0))).await;
        let updater = ProfileUpdater::new(store.clone(), 0.9, 3);
        updater
            .record("u1", "e1", FeedbackSignals::click(), Utc::now())
            .await
            .unwrap();

        let updated = store.get_user("u1").await.unwrap().unwrap().embedding.unwrap();
        assert!((l2_norm(&updated) - 1.0).abs() < 1e-5);
        let toward_event = cosine_similarity(&updated, &axis(1));
        assert!(toward_event > 0.0);
        assert!(cosine_similarity(&updated, &axis(0)) > toward_event);
    }

    #[tokio::test]
    async fn test_non_positive_or_unembedded_leaves_profile() {
        let store = seeded(Some(axis(0))).await;
        let updater = ProfileUpdater::new(store.clone(), 0.9, 3);

        let dwell_only = FeedbackSignals {
            dwell_seconds: 30,
            ..FeedbackSignals::default()
        };
        let outcome = updater.record("u1", "e1", dwell_only, Utc::now()).await.unwrap();
        assert!(!outcome.profile_updated);

        let outcome = updater
            .record("u1", "e2", FeedbackSignals::click(), Utc::now())
            .await
            .unwrap();
        assert!(!outcome.profile_updated);

        let user = store.get_user("u1").await.unwrap().unwrap();
        assert_eq!(user.embedding, Some(axis(0)));
        assert_eq!(store.list_feedback(None, None).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_unknown_ids_are_not_found() {
        let store = seeded(None).await;
        let updater = ProfileUpdater::new(store.clone(), 0.9, 3);

        let err = updater
            .record("u1", "nope", FeedbackSignals::click(), Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(err, EventFeedError::EventNotFound(_)));

        let err = updater
            .record("nobody", "e1", FeedbackSignals::click(), Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(err, EventFeedError::UserNotFound(_)));
        assert!(store.list_feedback(None, None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_failed_snapshot_write_is_not_recorded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("snap.json");
        let store = Arc::new(MemoryStore::open(&path).await.unwrap());
        store
            .save_user(UserBuilder::new("u@example.com").id("u1").build())
            .await
            .unwrap();
        store
            .create_event(
                EventBuilder::new("Concert", Utc::now())
                    .id("e1")
                    .embedding(axis(1))
                    .build(),
            )
            .await
            .unwrap();
        std::fs::create_dir(path.with_extension("json.tmp")).unwrap();

        let updater = ProfileUpdater::new(store.clone(), 0.9, 3);
        let result = updater
            .record("u1", "e1", FeedbackSignals::click(), Utc::now())
            .await;
        assert!(result.is_err());
        assert!(store.list_feedback(None, None).await.unwrap().is_empty());
        let user = store.get_user("u1").await.unwrap().unwrap();
        assert!(user.embedding.is_none());

        std::fs::remove_dir(path.with_extension("json.tmp")).unwrap();
        let outcome = updater
            .record("u1", "e1", FeedbackSignals::click(), Utc::now())
            .await
            .unwrap();
        assert!(outcome.profile_updated);
        assert_eq!(store.list_feedback(None, None).await.unwrap().len(), 1);
        let user = store.get_user("u1").await.unwrap().unwrap();
        assert_eq!(user.embedding, Some(axis(1)));
    }

    /// Store that reports a conflict for the first `conflicts` profile commits
    #[derive(Debug)]
    struct ContendedStore {
        inner: MemoryStore,
        conflicts: AtomicU32,
    }

    #[async_trait]
    impl BaseStore for ContendedStore {
        async fn health_check(&self) -> std::result::Result<bool, StorageError> {
            self.inner.health_check().await
        }
        async fn get_metadata(&self) -> std::result::Result<serde_json::Value, StorageError> {
            self.inner.get_metadata().await
        }
        async fn close(&self) -> std::result::Result<(), StorageError> {
            self.inner.close().await
        }
    }

    #[async_trait]
    impl EventStore for ContendedStore {
        async fn create_event(&self, event: Event) -> std::result::Result<Event, StorageError> {
            self.inner.create_event(event).await
        }
        async fn get_event(&self, id: &str) -> std::result::Result<Option<Event>, StorageError> {
            self.inner.get_event(id).await
        }
        async fn list_events(
            &self,
            filter: Option<EventFilter>,
            limit: Option<usize>,
        ) -> std::result::Result<Vec<Event>, StorageError> {
            self.inner.list_events(filter, limit).await
        }
        async fn count_events(
            &self,
            filter: Option<EventFilter>,
        ) -> std::result::Result<usize, StorageError> {
            self.inner.count_events(filter).await
        }
        async fn set_event_embeddings_if_absent(
            &self,
            embeddings: Vec<(String, Vec<f32>)>,
        ) -> std::result::Result<usize, StorageError> {
            self.inner.set_event_embeddings_if_absent(embeddings).await
        }
    }

    #[async_trait]
    impl UserStore for ContendedStore {
        async fn get_user(&self, id: &str) -> std::result::Result<Option<User>, StorageError> {
            self.inner.get_user(id).await
        }
        async fn get_user_by_email(
            &self,
            email: &str,
        ) -> std::result::Result<Option<User>, StorageError> {
            self.inner.get_user_by_email(email).await
        }
        async fn save_user(&self, user: User) -> std::result::Result<User, StorageError> {
            self.inner.save_user(user).await
        }
        async fn replace_interests(
            &self,
            id: &str,
            interests: Vec<String>,
        ) -> std::result::Result<User, StorageError> {
            self.inner.replace_interests(id, interests).await
        }
        async fn list_users(
            &self,
            filter: Option<UserFilter>,
            limit: Option<usize>,
        ) -> std::result::Result<Vec<User>, StorageError> {
            self.inner.list_users(filter, limit).await
        }
        async fn count_users(
            &self,
            filter: Option<UserFilter>,
        ) -> std::result::Result<usize, StorageError> {
            self.inner.count_users(filter).await
        }
        async fn set_user_embeddings_if_absent(
            &self,
            embeddings: Vec<(String, Vec<f32>)>,
        ) -> std::result::Result<usize, StorageError> {
            self.inner.set_user_embeddings_if_absent(embeddings).await
        }
    }

    #[async_trait]
    impl FeedbackStore for ContendedStore {
        async fn commit_feedback(
            &self,
            feedback: Feedback,
            update: Option<ProfileUpdate>,
        ) -> std::result::Result<(), StorageError> {
            let checked = matches!(
                update.as_ref().map(|u| &u.precondition),
                Some(EmbeddingPrecondition::Expect(_))
            );
            if checked && self.conflicts.load(Ordering::SeqCst) > 0 {
                self.conflicts.fetch_sub(1, Ordering::SeqCst);
                return Err(StorageError::Conflict("profile changed".to_string()));
            }
            self.inner.commit_feedback(feedback, update).await
        }
        async fn list_feedback(
            &self,
            filter: Option<FeedbackFilter>,
            limit: Option<usize>,
        ) -> std::result::Result<Vec<Feedback>, StorageError> {
            self.inner.list_feedback(filter, limit).await
        }
        async fn interaction_metrics(
            &self,
            since: DateTime<Utc>,
            window: &str,
        ) -> std::result::Result<InteractionMetrics, StorageError> {
            self.inner.interaction_metrics(since, window).await
        }
    }

    #[async_trait]
    impl SavedEventStore for ContendedStore {
        async fn save_event(&self, saved: SavedEvent) -> std::result::Result<bool, StorageError> {
            self.inner.save_event(saved).await
        }
        async fn unsave_event(
            &self,
            user_id: &str,
            event_id: &str,
        ) -> std::result::Result<bool, StorageError> {
            self.inner.unsave_event(user_id, event_id).await
        }
        async fn list_saved_events(
            &self,
            user_id: &str,
        ) -> std::result::Result<Vec<Event>, StorageError> {
            self.inner.list_saved_events(user_id).await
        }
    }

    async fn contended(conflicts: u32) -> Arc<ContendedStore> {
        let inner = MemoryStore::new();
        inner
            .save_user(UserBuilder::new("u@example.com").id("u1").build())
            .await
            .unwrap();
        inner
            .create_event(
                EventBuilder::new("Concert", Utc::now())
                    .id("e1")
                    .embedding(axis(1))
                    .build(),
            )
            .await
            .unwrap();
        Arc::new(ContendedStore {
            inner,
            conflicts: AtomicU32::new(conflicts),
        })
    }

    #[tokio::test]
    async fn test_conflict_is_retried() {
        let store = contended(2).await;
        let updater = ProfileUpdater::new(store.clone(), 0.9, 3);
        let outcome = updater
            .record("u1", "e1", FeedbackSignals::click(), Utc::now())
            .await
            .unwrap();
        assert!(outcome.profile_updated);
        assert_eq!(store.conflicts.load(Ordering::SeqCst), 0);
        assert_eq!(store.list_feedback(None, None).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_exhausted_retries_fall_back_to_unchecked() {
        let store = contended(10).await;
        let updater = ProfileUpdater::new(store.clone(), 0.9, 2);
        let outcome = updater
            .record("u1", "e1", FeedbackSignals::click(), Utc::now())
            .await
            .unwrap();
        assert!(outcome.profile_updated);
        assert_eq!(store.conflicts.load(Ordering::SeqCst), 8);

        let user = store.get_user("u1").await.unwrap().unwrap();
        assert_eq!(user.embedding, Some(axis(1)));
    }
}
