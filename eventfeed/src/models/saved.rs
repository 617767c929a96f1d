//! Events a user bookmarked

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One bookmark; a user saves a given event at most once
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedEvent {
    pub user_id: String,
    pub event_id: String,
    pub saved_at: DateTime<Utc>,
}

impl SavedEvent {
    pub fn new(
        user_id: impl Into<String>,
        event_id: impl Into<String>,
        saved_at: DateTime<Utc>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            event_id: event_id.into(),
            saved_at,
        }
    }

    /// Whether this bookmark links `user_id` to `event_id`
    pub fn links(&self, user_id: &str, event_id: &str) -> bool {
        self.user_id == user_id && self.event_id == event_id
    }
}
