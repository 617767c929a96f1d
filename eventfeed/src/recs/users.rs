//! User profile operations

use std::sync::Arc;
use tracing::{info, warn};

use crate::models::User;
use crate::storage::errors::StorageError;
use crate::storage::traits::RecStore;
use crate::{EventFeedError, Result};

use super::TextEncoder;

/// Bootstrap, lookup and interest edits for users
#[derive(Debug, Clone)]
pub struct UserOperations {
    store: Arc<dyn RecStore>,
    encoder: TextEncoder,
}

impl UserOperations {
    pub fn new(store: Arc<dyn RecStore>, encoder: TextEncoder) -> Self {
        Self { store, encoder }
    }

    /// Create or update a user by email.
    ///
    /// Interests are replaced, and the embedding is recomputed from the
    /// interest text when there is any. An embedding failure keeps the
    /// previous embedding.
    pub async fn bootstrap(
        &self,
        email: &str,
        display_name: Option<String>,
        interests: Vec<String>,
    ) -> Result<User> {
        let email = email.trim();
        if email.is_empty() || !email.contains('@') {
            return Err(EventFeedError::InvalidInput(format!(
                "Invalid email address: '{}'",
                email
            )));
        }

        let mut user = match self.store.get_user_by_email(email).await? {
            Some(user) => user,
            None => {
                info!("Creating user for {}", email);
                User::new(email)
            }
        };

        if let Some(name) = display_name.map(|n| n.trim().to_string())
            && !name.is_empty()
        {
            user.display_name = Some(name);
        }
        user.interests = clean_interests(interests);

        let text = user.interest_text();
        if !text.is_empty() {
            match self.encoder.encode(&text).await {
                Ok(embedding) => user.embedding = Some(embedding),
                Err(e) => warn!("Could not embed interests for {}: {}", email, e),
            }
        }

        Ok(self.store.save_user(user).await?)
    }

    pub async fn get(&self, id: &str) -> Result<User> {
        self.store
            .get_user(id)
            .await?
            .ok_or_else(|| EventFeedError::UserNotFound(id.to_string()))
    }

    /// Replace interests; the embedding is left as is
    pub async fn replace_interests(&self, id: &str, interests: Vec<String>) -> Result<User> {
        match self
            .store
            .replace_interests(id, clean_interests(interests))
            .await
        {
            Ok(user) => Ok(user),
            Err(StorageError::NotFound(_)) => Err(EventFeedError::UserNotFound(id.to_string())),
            Err(e) => Err(e.into()),
        }
    }

    /// Resolve an optional viewer id; an unknown id is an error
    pub async fn resolve_viewer(&self, user_id: Option<&str>) -> Result<Option<User>> {
        match user_id {
            Some(id) => self.get(id).await.map(Some),
            None => Ok(None),
        }
    }
}

fn clean_interests(interests: Vec<String>) -> Vec<String> {
    let mut cleaned: Vec<String> = Vec::with_capacity(interests.len());
    for interest in interests {
        let interest = interest.trim();
        if !interest.is_empty() && !cleaned.iter().any(|i| i.eq_ignore_ascii_case(interest)) {
            cleaned.push(interest.to_string());
        }
    }
    cleaned
}
