//! Saved-event bookmarks

use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::debug;

use crate::models::{Event, SavedEvent};
use crate::storage::traits::RecStore;
use crate::{EventFeedError, Result};

/// Save, unsave and list a user's bookmarked events
#[derive(Debug, Clone)]
pub struct SavedEvents {
    store: Arc<dyn RecStore>,
}

impl SavedEvents {
    pub fn new(store: Arc<dyn RecStore>) -> Self {
        Self { store }
    }

    /// Bookmark `event_id` for `user_id`.
    ///
    /// Returns `false` when the event was already saved; the original
    /// `saved_at` is kept.
    pub async fn save(&self, user_id: &str, event_id: &str, now: DateTime<Utc>) -> Result<bool> {
        self.store
            .get_user(user_id)
            .await?
            .ok_or_else(|| EventFeedError::UserNotFound(user_id.to_string()))?;
        self.store
            .get_event(event_id)
            .await?
            .ok_or_else(|| EventFeedError::EventNotFound(event_id.to_string()))?;

        let created = self
            .store
            .save_event(SavedEvent::new(user_id, event_id, now))
            .await?;
        debug!(
            "Saved event {} for user {} (new: {})",
            event_id, user_id, created
        );
        Ok(created)
    }

    pub async fn unsave(&self, user_id: &str, event_id: &str) -> Result<()> {
        if self.store.unsave_event(user_id, event_id).await? {
            Ok(())
        } else {
            Err(EventFeedError::NotFound("Saved event not found".to_string()))
        }
    }

    /// Saved events of an existing user, soonest first
    pub async fn list(&self, user_id: &str) -> Result<Vec<Event>> {
        self.store
            .get_user(user_id)
            .await?
            .ok_or_else(|| EventFeedError::UserNotFound(user_id.to_string()))?;
        Ok(self.store.list_saved_events(user_id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EventBuilder, UserBuilder};
    use crate::storage::traits::{EventStore, UserStore};
    use crate::storage::MemoryStore;
    use chrono::Duration;

    async fn seeded() -> SavedEvents {
        let store = Arc::new(MemoryStore::new());
        let now = Utc::now();
        store
            .create_event(EventBuilder::new("Gala", now + Duration::days(5)).id("e1").build())
            .await
            .unwrap();
        store
            .create_event(EventBuilder::new("Brunch", now + Duration::days(1)).id("e2").build())
            .await
            .unwrap();
        store
            .save_user(UserBuilder::new("u@example.com").id("u1").build())
            .await
            .unwrap();
        SavedEvents::new(store)
    }

    #[tokio::test]
    async fn test_save_is_idempotent_and_listed_by_start() {
        let saved = seeded().await;
        let now = Utc::now();

        assert!(saved.save("u1", "e1", now).await.unwrap());
        assert!(!saved.save("u1", "e1", now).await.unwrap());
        assert!(saved.save("u1", "e2", now).await.unwrap());

        let titles: Vec<_> = saved
            .list("u1")
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.title)
            .collect();
        assert_eq!(titles, vec!["Brunch", "Gala"]);
    }

    #[tokio::test]
    async fn test_unknown_ids() {
        let saved = seeded().await;
        let now = Utc::now();

        let err = saved.save("u1", "missing", now).await.unwrap_err();
        assert!(matches!(err, EventFeedError::EventNotFound(_)));
        let err = saved.save("ghost", "e1", now).await.unwrap_err();
        assert!(matches!(err, EventFeedError::UserNotFound(_)));
        let err = saved.list("ghost").await.unwrap_err();
        assert!(matches!(err, EventFeedError::UserNotFound(_)));
    }

    #[tokio::test]
    async fn test_unsave() {
        let saved = seeded().await;
        saved.save("u1", "e1", Utc::now()).await.unwrap();

        saved.unsave("u1", "e1").await.unwrap();
        assert!(saved.list("u1").await.unwrap().is_empty());

        let err = saved.unsave("u1", "e1").await.unwrap_err();
        assert!(matches!(err, EventFeedError::NotFound(ref msg) if msg == "Saved event not found"));
    }
}
