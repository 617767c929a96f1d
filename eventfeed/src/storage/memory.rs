//! In-memory store with optional JSON snapshot persistence
//!
//! All state lives behind one `tokio::sync::RwLock`. When a snapshot path is
//! configured, every mutation is applied to a staged copy of the state, the
//! copy is written to disk (temporary file, then rename) and only then
//! swapped in. A failed write leaves both the file and the in-memory state
//! as they were.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

use crate::ml::{cosine_similarity, EmbeddingManager, EMBEDDING_DIM};
use crate::models::{Event, Feedback, InteractionMetrics, SavedEvent, User};
use crate::storage::errors::StorageError;
use crate::storage::filters::{EventFilter, FeedbackFilter, UserFilter};
use crate::storage::traits::{
    BaseStore, EmbeddingPrecondition, EventStore, FeedbackStore, ProfileUpdate, SavedEventStore,
    UserStore, VectorIndex, VectorQuery,
};

#[derive(Debug, Clone, Default)]
struct StoreState {
    events: HashMap<String, Event>,
    users: HashMap<String, User>,
    feedback: Vec<Feedback>,
    saved: Vec<SavedEvent>,
}

/// On-disk layout of a snapshot
#[derive(Debug, Serialize, Deserialize)]
struct Snapshot<E, U, F, S> {
    #[serde(default = "Vec::new")]
    events: Vec<E>,
    #[serde(default = "Vec::new")]
    users: Vec<U>,
    #[serde(default = "Vec::new")]
    feedback: Vec<F>,
    #[serde(default = "Vec::new")]
    saved: Vec<S>,
}

/// Result of a mutation closure: its value and whether state changed
struct Applied<T> {
    value: T,
    changed: bool,
}

impl<T> Applied<T> {
    fn changed(value: T) -> Self {
        Self {
            value,
            changed: true,
        }
    }

    fn unchanged(value: T) -> Self {
        Self {
            value,
            changed: false,
        }
    }
}

/// In-memory implementation of every storage trait
#[derive(Debug)]
pub struct MemoryStore {
    state: RwLock<StoreState>,
    snapshot_path: Option<PathBuf>,
    persist_lock: Mutex<()>,
}

impl MemoryStore {
    /// Create an empty, non-persistent store
    pub fn new() -> Self {
        Self {
            state: RwLock::new(StoreState::default()),
            snapshot_path: None,
            persist_lock: Mutex::new(()),
        }
    }

    /// Open a store backed by a JSON snapshot.
    ///
    /// A missing file yields an empty store. Rows that fail to parse are
    /// skipped with a warning, and malformed embeddings are dropped.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let path = path.as_ref().to_path_buf();
        let state = if tokio::fs::try_exists(&path).await? {
            let raw = tokio::fs::read_to_string(&path).await?;
            load_state(&raw)?
        } else {
            info!("Snapshot {} not found, starting empty", path.display());
            StoreState::default()
        };

        info!(
            "Opened store at {} ({} events, {} users, {} feedback records)",
            path.display(),
            state.events.len(),
            state.users.len(),
            state.feedback.len()
        );

        Ok(Self {
            state: RwLock::new(state),
            snapshot_path: Some(path),
            persist_lock: Mutex::new(()),
        })
    }

    /// Path of the backing snapshot, if any
    pub fn snapshot_path(&self) -> Option<&Path> {
        self.snapshot_path.as_deref()
    }

    /// Write the current state to the snapshot file
    pub async fn persist(&self) -> Result<(), StorageError> {
        let Some(path) = &self.snapshot_path else {
            return Ok(());
        };

        let _guard = self.persist_lock.lock().await;
        let state = self.state.read().await;
        write_snapshot(path, &*state).await
    }

    /// Apply `f` as one unit.
    ///
    /// Without a snapshot `f` runs in place and must not change anything
    /// before it returns an error. With a snapshot `f` runs on a copy that
    /// replaces the live state only after it was written to disk.
    async fn mutate<T, F>(&self, f: F) -> Result<T, StorageError>
    where
        F: FnOnce(&mut StoreState) -> Result<Applied<T>, StorageError>,
    {
        let mut state = self.state.write().await;
        let Some(path) = &self.snapshot_path else {
            return f(&mut *state).map(|applied| applied.value);
        };

        let mut staged = (*state).clone();
        let applied = f(&mut staged)?;
        if applied.changed {
            write_snapshot(path, &staged).await?;
            *state = staged;
        }
        Ok(applied.value)
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

async fn write_snapshot(path: &Path, state: &StoreState) -> Result<(), StorageError> {
    let snapshot = Snapshot {
        events: sorted_events(state.events.values()),
        users: sorted_users(state.users.values()),
        feedback: state.feedback.iter().collect(),
        saved: state.saved.iter().collect(),
    };
    let body = serde_json::to_vec_pretty(&snapshot)?;

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        tokio::fs::create_dir_all(parent).await?;
    }
    let tmp = path.with_extension("json.tmp");
    tokio::fs::write(&tmp, body).await?;
    if let Err(e) = tokio::fs::rename(&tmp, path).await {
        let _ = tokio::fs::remove_file(&tmp).await;
        return Err(e.into());
    }
    debug!("Persisted snapshot to {}", path.display());
    Ok(())
}

fn load_state(raw: &str) -> Result<StoreState, StorageError> {
    let snapshot: Snapshot<
        serde_json::Value,
        serde_json::Value,
        serde_json::Value,
        serde_json::Value,
    > = serde_json::from_str(raw)?;
    let manager = EmbeddingManager::with_expected_dimensions(EMBEDDING_DIM);
    let mut state = StoreState::default();

    for row in snapshot.events {
        match serde_json::from_value::<Event>(row) {
            Ok(mut event) => {
                event.embedding = manager.sanitize(event.embedding.as_deref());
                state.events.insert(event.id.clone(), event);
            }
            Err(e) => warn!("Skipping malformed event row: {}", e),
        }
    }
    for row in snapshot.users {
        match serde_json::from_value::<User>(row) {
            Ok(mut user) => {
                user.embedding = manager.sanitize(user.embedding.as_deref());
                state.users.insert(user.id.clone(), user);
            }
            Err(e) => warn!("Skipping malformed user row: {}", e),
        }
    }
    for row in snapshot.feedback {
        match serde_json::from_value::<Feedback>(row) {
            Ok(record) => state.feedback.push(record),
            Err(e) => warn!("Skipping malformed feedback row: {}", e),
        }
    }
    for row in snapshot.saved {
        match serde_json::from_value::<SavedEvent>(row) {
            Ok(saved)
                if state.events.contains_key(&saved.event_id)
                    && state.users.contains_key(&saved.user_id) =>
            {
                state.saved.push(saved)
            }
            Ok(saved) => warn!(
                "Skipping saved event {} of user {}: dangling reference",
                saved.event_id, saved.user_id
            ),
            Err(e) => warn!("Skipping malformed saved event row: {}", e),
        }
    }

    Ok(state)
}

fn by_start(a: &Event, b: &Event) -> Ordering {
    a.start_time
        .cmp(&b.start_time)
        .then_with(|| a.id.cmp(&b.id))
}

fn sorted_events<'a>(events: impl Iterator<Item = &'a Event>) -> Vec<&'a Event> {
    let mut out: Vec<&Event> = events.collect();
    out.sort_by(|a, b| by_start(a, b));
    out
}

fn sorted_users<'a>(users: impl Iterator<Item = &'a User>) -> Vec<&'a User> {
    let mut out: Vec<&User> = users.collect();
    out.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
    out
}

fn event_matches(event: &Event, filter: &EventFilter) -> bool {
    if let Some(after) = filter.starts_after
        && event.start_time <= after
    {
        return false;
    }
    if let Some(exclude) = &filter.exclude_id
        && &event.id == exclude
    {
        return false;
    }
    if let Some(present) = filter.embedding_present
        && event.embedding.is_some() != present
    {
        return false;
    }
    if let Some(needle) = &filter.text_contains {
        let needle = needle.to_lowercase();
        let in_title = event.title.to_lowercase().contains(&needle);
        let in_desc = event.description_text().to_lowercase().contains(&needle);
        if !in_title && !in_desc {
            return false;
        }
    }
    true
}

fn user_matches(user: &User, filter: &UserFilter) -> bool {
    if let Some(email) = &filter.email
        && &user.email != email
    {
        return false;
    }
    if let Some(present) = filter.embedding_present
        && user.embedding.is_some() != present
    {
        return false;
    }
    true
}

fn feedback_matches(record: &Feedback, filter: &FeedbackFilter) -> bool {
    if let Some(user_id) = &filter.user_id
        && &record.user_id != user_id
    {
        return false;
    }
    if let Some(event_id) = &filter.event_id
        && &record.event_id != event_id
    {
        return false;
    }
    if let Some(after) = filter.created_after
        && record.created_at <= after
    {
        return false;
    }
    true
}

fn fill_missing<T>(
    items: &mut HashMap<String, T>,
    embeddings: Vec<(String, Vec<f32>)>,
    slot: impl Fn(&mut T) -> &mut Option<Vec<f32>>,
) -> usize {
    let mut updated = 0;
    for (id, embedding) in embeddings {
        let Some(item) = items.get_mut(&id) else {
            debug!("{} disappeared before its embedding was stored", id);
            continue;
        };
        let current = slot(item);
        if current.is_some() {
            debug!("{} was embedded concurrently", id);
            continue;
        }
        *current = Some(embedding);
        updated += 1;
    }
    updated
}

#[async_trait]
impl BaseStore for MemoryStore {
    async fn health_check(&self) -> Result<bool, StorageError> {
        Ok(true)
    }

    async fn get_metadata(&self) -> Result<serde_json::Value, StorageError> {
        let state = self.state.read().await;
        Ok(serde_json::json!({
            "type": "memory",
            "persistent": self.snapshot_path.is_some(),
            "event_count": state.events.len(),
            "user_count": state.users.len(),
            "feedback_count": state.feedback.len(),
            "saved_count": state.saved.len(),
        }))
    }

    async fn close(&self) -> Result<(), StorageError> {
        self.persist().await
    }
}

#[async_trait]
impl EventStore for MemoryStore {
    async fn create_event(&self, event: Event) -> Result<Event, StorageError> {
        self.mutate(|state| {
            if state.events.contains_key(&event.id) {
                return Err(StorageError::AlreadyExists(format!(
                    "Event with ID {} already exists",
                    event.id
                )));
            }
            state.events.insert(event.id.clone(), event.clone());
            Ok(Applied::changed(event))
        })
        .await
    }

    async fn get_event(&self, id: &str) -> Result<Option<Event>, StorageError> {
        let state = self.state.read().await;
        Ok(state.events.get(id).cloned())
    }

    async fn list_events(
        &self,
        filter: Option<EventFilter>,
        limit: Option<usize>,
    ) -> Result<Vec<Event>, StorageError> {
        let filter = filter.unwrap_or_default();
        let state = self.state.read().await;
        let mut events: Vec<&Event> = state
            .events
            .values()
            .filter(|e| event_matches(e, &filter))
            .collect();
        events.sort_by(|a, b| by_start(a, b));

        let limit = limit.unwrap_or(usize::MAX);
        Ok(events.into_iter().take(limit).cloned().collect())
    }

    async fn count_events(&self, filter: Option<EventFilter>) -> Result<usize, StorageError> {
        let filter = filter.unwrap_or_default();
        let state = self.state.read().await;
        Ok(state
            .events
            .values()
            .filter(|e| event_matches(e, &filter))
            .count())
    }

    async fn set_event_embeddings_if_absent(
        &self,
        embeddings: Vec<(String, Vec<f32>)>,
    ) -> Result<usize, StorageError> {
        if embeddings.is_empty() {
            return Ok(0);
        }
        self.mutate(|state| {
            let updated = fill_missing(&mut state.events, embeddings, |e| &mut e.embedding);
            Ok(Applied {
                value: updated,
                changed: updated > 0,
            })
        })
        .await
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn get_user(&self, id: &str) -> Result<Option<User>, StorageError> {
        let state = self.state.read().await;
        Ok(state.users.get(id).cloned())
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, StorageError> {
        let state = self.state.read().await;
        Ok(state.users.values().find(|u| u.email == email).cloned())
    }

    async fn save_user(&self, user: User) -> Result<User, StorageError> {
        self.mutate(|state| {
            if state
                .users
                .values()
                .any(|u| u.email == user.email && u.id != user.id)
            {
                return Err(StorageError::AlreadyExists(format!(
                    "User with email {} already exists",
                    user.email
                )));
            }
            state.users.insert(user.id.clone(), user.clone());
            Ok(Applied::changed(user))
        })
        .await
    }

    async fn replace_interests(
        &self,
        id: &str,
        interests: Vec<String>,
    ) -> Result<User, StorageError> {
        self.mutate(|state| {
            let user = state
                .users
                .get_mut(id)
                .ok_or_else(|| StorageError::NotFound(format!("User with ID {} not found", id)))?;
            user.interests = interests;
            Ok(Applied::changed(user.clone()))
        })
        .await
    }

    async fn list_users(
        &self,
        filter: Option<UserFilter>,
        limit: Option<usize>,
    ) -> Result<Vec<User>, StorageError> {
        let filter = filter.unwrap_or_default();
        let state = self.state.read().await;
        let users = sorted_users(state.users.values().filter(|u| user_matches(u, &filter)));
        let limit = limit.unwrap_or(usize::MAX);
        Ok(users.into_iter().take(limit).cloned().collect())
    }

    async fn count_users(&self, filter: Option<UserFilter>) -> Result<usize, StorageError> {
        let filter = filter.unwrap_or_default();
        let state = self.state.read().await;
        Ok(state
            .users
            .values()
            .filter(|u| user_matches(u, &filter))
            .count())
    }

    async fn set_user_embeddings_if_absent(
        &self,
        embeddings: Vec<(String, Vec<f32>)>,
    ) -> Result<usize, StorageError> {
        if embeddings.is_empty() {
            return Ok(0);
        }
        self.mutate(|state| {
            let updated = fill_missing(&mut state.users, embeddings, |u| &mut u.embedding);
            Ok(Applied {
                value: updated,
                changed: updated > 0,
            })
        })
        .await
    }
}

#[async_trait]
impl FeedbackStore for MemoryStore {
    async fn commit_feedback(
        &self,
        feedback: Feedback,
        update: Option<ProfileUpdate>,
    ) -> Result<(), StorageError> {
        self.mutate(|state| {
            if !state.events.contains_key(&feedback.event_id) {
                return Err(StorageError::NotFound(format!(
                    "Event with ID {} not found",
                    feedback.event_id
                )));
            }
            if !state.users.contains_key(&feedback.user_id) {
                return Err(StorageError::NotFound(format!(
                    "User with ID {} not found",
                    feedback.user_id
                )));
            }

            if let Some(update) = update {
                let user = state.users.get_mut(&update.user_id).ok_or_else(|| {
                    StorageError::NotFound(format!("User with ID {} not found", update.user_id))
                })?;
                if let EmbeddingPrecondition::Expect(expected) = &update.precondition
                    && user.embedding != *expected
                {
                    return Err(StorageError::Conflict(format!(
                        "Embedding of user {} changed concurrently",
                        update.user_id
                    )));
                }
                user.embedding = Some(update.embedding);
            }

            state.feedback.push(feedback);
            Ok(Applied::changed(()))
        })
        .await
    }

    async fn list_feedback(
        &self,
        filter: Option<FeedbackFilter>,
        limit: Option<usize>,
    ) -> Result<Vec<Feedback>, StorageError> {
        let filter = filter.unwrap_or_default();
        let state = self.state.read().await;
        let limit = limit.unwrap_or(usize::MAX);
        Ok(state
            .feedback
            .iter()
            .filter(|f| feedback_matches(f, &filter))
            .take(limit)
            .cloned()
            .collect())
    }

    async fn interaction_metrics(
        &self,
        since: DateTime<Utc>,
        window: &str,
    ) -> Result<InteractionMetrics, StorageError> {
        let filter = FeedbackFilter::since(since);
        let state = self.state.read().await;
        Ok(InteractionMetrics::from_records(
            window,
            state.feedback.iter().filter(|f| feedback_matches(f, &filter)),
        ))
    }
}

#[async_trait]
impl SavedEventStore for MemoryStore {
    async fn save_event(&self, saved: SavedEvent) -> Result<bool, StorageError> {
        self.mutate(|state| {
            if !state.users.contains_key(&saved.user_id) {
                return Err(StorageError::NotFound(format!(
                    "User with ID {} not found",
                    saved.user_id
                )));
            }
            if !state.events.contains_key(&saved.event_id) {
                return Err(StorageError::NotFound(format!(
                    "Event with ID {} not found",
                    saved.event_id
                )));
            }
            if state
                .saved
                .iter()
                .any(|s| s.links(&saved.user_id, &saved.event_id))
            {
                return Ok(Applied::unchanged(false));
            }
            state.saved.push(saved);
            Ok(Applied::changed(true))
        })
        .await
    }

    async fn unsave_event(&self, user_id: &str, event_id: &str) -> Result<bool, StorageError> {
        self.mutate(|state| {
            let before = state.saved.len();
            state.saved.retain(|s| !s.links(user_id, event_id));
            let removed = state.saved.len() != before;
            Ok(Applied {
                value: removed,
                changed: removed,
            })
        })
        .await
    }

    async fn list_saved_events(&self, user_id: &str) -> Result<Vec<Event>, StorageError> {
        let state = self.state.read().await;
        let events = sorted_events(
            state
                .saved
                .iter()
                .filter(|s| s.user_id == user_id)
                .filter_map(|s| state.events.get(&s.event_id)),
        );
        Ok(events.into_iter().cloned().collect())
    }
}

#[async_trait]
impl VectorIndex for MemoryStore {
    async fn nearest_upcoming(&self, query: VectorQuery) -> Result<Vec<(Event, f32)>, StorageError> {
        let mut filter = EventFilter::upcoming(query.now);
        filter.exclude_id = query.exclude_id.clone();

        let state = self.state.read().await;
        let mut scored: Vec<(&Event, f32)> = state
            .events
            .values()
            .filter(|e| event_matches(e, &filter))
            .map(|e| {
                let similarity = e
                    .embedding
                    .as_deref()
                    .map(|v| cosine_similarity(&query.vector, v))
                    .unwrap_or(0.0);
                (e, similarity)
            })
            .collect();

        scored.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(Ordering::Equal)
                .then_with(|| by_start(a.0, b.0))
        });
        scored.truncate(query.k);

        Ok(scored.into_iter().map(|(e, s)| (e.clone(), s)).collect())
    }
}
