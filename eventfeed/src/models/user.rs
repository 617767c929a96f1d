//! User model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::ml::vector;

/// A user of the recommender
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    /// Unique identifier
    pub id: String,

    /// Email address, unique across users
    pub email: String,

    /// Optional display name
    #[serde(default)]
    pub display_name: Option<String>,

    /// Free-text interests
    #[serde(default)]
    pub interests: Vec<String>,

    /// Profile embedding; `None` until bootstrap, reindex or positive feedback
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vec<f32>>,

    /// When the user was created
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Create a new user with a generated id
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            email: email.into(),
            display_name: None,
            interests: Vec::new(),
            embedding: None,
            created_at: Utc::now(),
        }
    }

    /// Interests joined into a single text for embedding
    pub fn interest_text(&self) -> String {
        self.interests
            .iter()
            .map(|i| i.trim())
            .filter(|i| !i.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Whether the user carries a usable non-zero embedding
    pub fn has_embedding(&self) -> bool {
        self.embedding.as_deref().is_some_and(|e| !vector::is_zero(e))
    }
}

/// Builder for creating users
#[derive(Debug)]
pub struct UserBuilder {
    user: User,
}

impl UserBuilder {
    /// Start a new user
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            user: User::new(email),
        }
    }

    /// Set an explicit id
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.user.id = id.into();
        self
    }

    /// Set the display name
    pub fn display_name(mut self, name: impl Into<String>) -> Self {
        self.user.display_name = Some(name.into());
        self
    }

    /// Set the interests
    pub fn interests<I, S>(mut self, interests: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.user.interests = interests.into_iter().map(Into::into).collect();
        self
    }

    /// Set the embedding
    pub fn embedding(mut self, embedding: Vec<f32>) -> Self {
        self.user.embedding = Some(embedding);
        self
    }

    /// Build the user
    pub fn build(self) -> User {
        self.user
    }
}
