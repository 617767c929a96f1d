//! Filter types for storage queries

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Filter for event queries
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct EventFilter {
    /// Only events starting strictly after this instant
    pub starts_after: Option<DateTime<Utc>>,

    /// Case-insensitive substring of the title or description
    pub text_contains: Option<String>,

    /// Exclude one event id
    pub exclude_id: Option<String>,

    /// `Some(false)` selects events whose embedding has not been set
    pub embedding_present: Option<bool>,
}

impl EventFilter {
    /// Events starting after `now`
    pub fn upcoming(now: DateTime<Utc>) -> Self {
        Self {
            starts_after: Some(now),
            ..Self::default()
        }
    }

    /// Events with no embedding yet
    pub fn missing_embedding() -> Self {
        Self {
            embedding_present: Some(false),
            ..Self::default()
        }
    }

    pub fn excluding(mut self, id: impl Into<String>) -> Self {
        self.exclude_id = Some(id.into());
        self
    }

    pub fn containing(mut self, text: impl Into<String>) -> Self {
        self.text_contains = Some(text.into());
        self
    }

    pub fn with_embedding(mut self, present: bool) -> Self {
        self.embedding_present = Some(present);
        self
    }
}

/// Filter for user queries
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UserFilter {
    /// Exact email match
    pub email: Option<String>,

    /// `Some(false)` selects users whose embedding has not been set
    pub embedding_present: Option<bool>,
}

impl UserFilter {
    /// Users with no embedding yet
    pub fn missing_embedding() -> Self {
        Self {
            embedding_present: Some(false),
            ..Self::default()
        }
    }
}

/// Filter for feedback queries
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FeedbackFilter {
    pub user_id: Option<String>,
    pub event_id: Option<String>,

    /// Only records created strictly after this instant
    pub created_after: Option<DateTime<Utc>>,
}

impl FeedbackFilter {
    pub fn since(created_after: DateTime<Utc>) -> Self {
        Self {
            created_after: Some(created_after),
            ..Self::default()
        }
    }
}
