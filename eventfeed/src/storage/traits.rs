//! Trait definitions for storage components

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::fmt::Debug;

use crate::models::{Event, Feedback, InteractionMetrics, SavedEvent, User};
use crate::storage::errors::StorageError;
use crate::storage::filters::{EventFilter, FeedbackFilter, UserFilter};

/// Base trait for all storage implementations
#[async_trait]
pub trait BaseStore: Send + Sync + 'static + Debug {
    /// Check if the store is healthy and available
    async fn health_check(&self) -> Result<bool, StorageError>;

    /// Get metadata about the store
    async fn get_metadata(&self) -> Result<serde_json::Value, StorageError>;

    /// Flush pending state and release resources
    async fn close(&self) -> Result<(), StorageError>;
}

/// Trait for event catalog operations
#[async_trait]
pub trait EventStore: BaseStore {
    /// Create a new event; fails with `AlreadyExists` on a duplicate id
    async fn create_event(&self, event: Event) -> Result<Event, StorageError>;

    /// Get an event by its ID
    async fn get_event(&self, id: &str) -> Result<Option<Event>, StorageError>;

    /// List events ordered by start time ascending, then id
    async fn list_events(
        &self,
        filter: Option<EventFilter>,
        limit: Option<usize>,
    ) -> Result<Vec<Event>, StorageError>;

    /// Count events with optional filtering
    async fn count_events(&self, filter: Option<EventFilter>) -> Result<usize, StorageError>;

    /// Set embeddings on events that have none yet, as one write.
    ///
    /// Events that already carry an embedding, or no longer exist, are left
    /// alone. Returns the number of events updated.
    async fn set_event_embeddings_if_absent(
        &self,
        embeddings: Vec<(String, Vec<f32>)>,
    ) -> Result<usize, StorageError>;
}

/// Trait for user operations
#[async_trait]
pub trait UserStore: BaseStore {
    /// Get a user by its ID
    async fn get_user(&self, id: &str) -> Result<Option<User>, StorageError>;

    /// Get a user by email
    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, StorageError>;

    /// Insert or replace a user by id; emails stay unique
    async fn save_user(&self, user: User) -> Result<User, StorageError>;

    /// Replace a user's interests without touching the embedding
    async fn replace_interests(
        &self,
        id: &str,
        interests: Vec<String>,
    ) -> Result<User, StorageError>;

    /// List users ordered by creation time, then id
    async fn list_users(
        &self,
        filter: Option<UserFilter>,
        limit: Option<usize>,
    ) -> Result<Vec<User>, StorageError>;

    /// Count users with optional filtering
    async fn count_users(&self, filter: Option<UserFilter>) -> Result<usize, StorageError>;

    /// Set embeddings on users that have none yet, as one write
    async fn set_user_embeddings_if_absent(
        &self,
        embeddings: Vec<(String, Vec<f32>)>,
    ) -> Result<usize, StorageError>;
}

/// Expected state of a user's embedding when a profile update commits
#[derive(Debug, Clone, PartialEq)]
pub enum EmbeddingPrecondition {
    /// Overwrite whatever is stored
    Unchecked,

    /// Commit only if the stored embedding still equals this value
    Expect(Option<Vec<f32>>),
}

/// New user embedding derived from a feedback record
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileUpdate {
    pub user_id: String,
    pub precondition: EmbeddingPrecondition,
    pub embedding: Vec<f32>,
}

/// Trait for the append-only feedback log
#[async_trait]
pub trait FeedbackStore: BaseStore {
    /// Append a feedback record and apply the optional profile update as one unit.
    ///
    /// Fails with `NotFound` if the user or event is missing and with
    /// `Conflict` if the precondition does not hold; nothing is written then.
    async fn commit_feedback(
        &self,
        feedback: Feedback,
        update: Option<ProfileUpdate>,
    ) -> Result<(), StorageError>;

    /// List feedback records in insertion order
    async fn list_feedback(
        &self,
        filter: Option<FeedbackFilter>,
        limit: Option<usize>,
    ) -> Result<Vec<Feedback>, StorageError>;

    /// Aggregate click, save and rsvp counts for records after `since`
    async fn interaction_metrics(
        &self,
        since: DateTime<Utc>,
        window: &str,
    ) -> Result<InteractionMetrics, StorageError>;
}

/// Trait for per-user event bookmarks
#[async_trait]
pub trait SavedEventStore: BaseStore {
    /// Bookmark an event.
    ///
    /// Returns `false` if it was already saved. Fails with `NotFound` if the
    /// user or event is missing.
    async fn save_event(&self, saved: SavedEvent) -> Result<bool, StorageError>;

    /// Remove a bookmark; returns `false` if there was none
    async fn unsave_event(&self, user_id: &str, event_id: &str) -> Result<bool, StorageError>;

    /// A user's saved events, start time ascending
    async fn list_saved_events(&self, user_id: &str) -> Result<Vec<Event>, StorageError>;
}

/// Combined repository used by the recommender
pub trait RecStore: EventStore + UserStore + FeedbackStore + SavedEventStore {}

impl<T> RecStore for T where T: EventStore + UserStore + FeedbackStore + SavedEventStore {}

/// Nearest-neighbour query against upcoming events
#[derive(Debug, Clone, PartialEq)]
pub struct VectorQuery {
    /// Normalized, non-zero query vector
    pub vector: Vec<f32>,

    /// Only events starting strictly after this instant
    pub now: DateTime<Utc>,

    /// Maximum number of results
    pub k: usize,

    /// Event excluded from the results
    pub exclude_id: Option<String>,
}

/// Vector similarity search over the event catalog
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VectorIndex: Send + Sync + Debug {
    /// Top-`k` upcoming events by cosine similarity, descending.
    ///
    /// Events without an embedding score `0.0`. Ties break by start time,
    /// then id.
    async fn nearest_upcoming(&self, query: VectorQuery) -> Result<Vec<(Event, f32)>, StorageError>;
}
