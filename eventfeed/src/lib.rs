//! # EventFeed
//!
//! Event recommendation core: embeds events and user interests into a
//! shared 384-dimensional space, retrieves upcoming events by cosine
//! similarity, blends similarity with interest overlap and time proximity,
//! and annotates every result with a short summary and a "why recommended"
//! line.
//!
//! ## Quick Start
//!
//! ```rust
//! use eventfeed::prelude::*;
//! use chrono::{Duration, Utc};
//!
//! async fn example() -> Result<()> {
//!     let config = ConfigBuilder::new().with_memory_storage().build()?;
//!     let recommender = init(config).await?;
//!
//!     recommender
//!         .create_event(
//!             EventBuilder::new("Rust meetup", Utc::now() + Duration::days(2))
//!                 .tag("technology")
//!                 .build(),
//!         )
//!         .await?;
//!     let user = recommender
//!         .bootstrap_user("ada@example.com", None, vec!["rust".to_string()])
//!         .await?;
//!     recommender.reindex().await?;
//!
//!     let feed = recommender.feed(Some(&user.id), 20).await?;
//!     for item in feed {
//!         println!("{:.3} {} - {}", item.score, item.title, item.explanation);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! - **storage**: event catalog, user profiles, feedback log and the
//!   nearest-neighbour index behind traits, with an in-memory store
//! - **ml**: vector math, embedding validation and the `Embedder` capability
//! - **search**: tokenizer and the ranking formulas
//! - **provider**: summaries, explanations and auto-tagging
//! - **recs**: the request pipeline built from the pieces above
//! - **core**: the `Recommender` facade

pub mod config;
pub mod core;
pub mod logging;
pub mod ml;
pub mod models;
pub mod provider;
pub mod recs;
pub mod search;
pub mod storage;

/// The prelude re-exports commonly used types for convenience
pub mod prelude {
    pub use crate::init;

    pub use crate::config::{ConfigBuilder, ConfigLoader, EventFeedConfig, LogLevel};

    pub use crate::core::{CatalogStatus, Recommender};

    pub use crate::models::{
        Event, EventBuilder, FeedbackSignals, InteractionMetrics, User, UserBuilder,
    };

    pub use crate::recs::{FeedbackOutcome, RankedEvent, ReindexReport};

    pub use crate::search::{FeedStrategy, ScoringConfig};

    pub use crate::storage::StorageError;

    pub use crate::{EventFeedError, Result};
}

/// Current library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Error type for EventFeed operations
#[derive(Debug, thiserror::Error)]
pub enum EventFeedError {
    /// Error during storage operations
    #[error("Storage error: {0}")]
    Storage(String),

    /// Error during embedding operations
    #[error("ML error: {0}")]
    ML(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Logging error
    #[error("Logging error: {0}")]
    Logging(#[from] crate::logging::LogError),

    /// Summary, explanation or classification provider error
    #[error("Provider error: {0}")]
    Provider(String),

    /// No event with this id
    #[error("Event not found: {0}")]
    EventNotFound(String),

    /// No user with this id
    #[error("User not found: {0}")]
    UserNotFound(String),

    /// Some other record is missing
    #[error("Not found: {0}")]
    NotFound(String),

    /// The request was malformed
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Duplicate or concurrently modified record
    #[error("Conflict: {0}")]
    Conflict(String),

    /// A bounded call did not finish in time
    #[error("Timeout error: {0}")]
    Timeout(String),

    /// Other unclassified errors
    #[error("{0}")]
    Other(String),
}

impl EventFeedError {
    /// Whether the error means a referenced record does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::EventNotFound(_) | Self::UserNotFound(_) | Self::NotFound(_)
        )
    }
}

impl From<crate::config::ConfigError> for EventFeedError {
    fn from(err: crate::config::ConfigError) -> Self {
        EventFeedError::Configuration(err.to_string())
    }
}

impl From<crate::ml::error::MLError> for EventFeedError {
    fn from(err: crate::ml::error::MLError) -> Self {
        EventFeedError::ML(err.to_string())
    }
}

impl From<crate::provider::ProviderError> for EventFeedError {
    fn from(err: crate::provider::ProviderError) -> Self {
        EventFeedError::Provider(err.to_string())
    }
}

/// Result type for EventFeed operations
pub type Result<T> = std::result::Result<T, EventFeedError>;

/// Initialize EventFeed with the provided configuration
///
/// Sets up logging (unless a subscriber is already installed), opens the
/// configured store and returns a [`core::Recommender`] using the local
/// embedder and provider.
///
/// # Examples
///
/// ```rust
/// use eventfeed::prelude::*;
///
/// async fn example() -> Result<()> {
///     let config = ConfigBuilder::new()
///         .with_memory_storage()
///         .with_feed_strategy(FeedStrategy::Lexical)
///         .build()?;
///
///     let recommender = init(config).await?;
///     let feed = recommender.feed(None, 10).await?;
///     assert!(feed.is_empty());
///     Ok(())
/// }
/// ```
pub async fn init(config: config::EventFeedConfig) -> Result<core::Recommender> {
    // Ignore errors if tracing is already initialized
    let _ = logging::init(&config.logging);

    core::Recommender::from_config(config).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_classification() {
        assert!(EventFeedError::UserNotFound("u".to_string()).is_not_found());
        assert!(!EventFeedError::Conflict("c".to_string()).is_not_found());

        let err: EventFeedError = crate::ml::MLError::embedding("bad").into();
        assert!(matches!(err, EventFeedError::ML(_)));

        let err: EventFeedError =
            crate::provider::ProviderError::Unavailable("down".to_string()).into();
        assert_eq!(err.to_string(), "Provider error: Provider unavailable: down");
    }
}
