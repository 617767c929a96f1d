//! Storage abstractions and implementations
//!
//! Trait definitions for the event catalog, user profiles, feedback log,
//! saved events and the nearest-neighbour index, plus the in-memory [`MemoryStore`] that
//! implements all of them and optionally persists to a JSON snapshot.

pub mod errors;
pub mod filters;
pub mod memory;
pub mod traits;

use std::sync::Arc;
use tracing::info;

use crate::config::EventFeedConfig;

pub use errors::{StorageError, StorageResult};
pub use filters::{EventFilter, FeedbackFilter, UserFilter};
pub use memory::MemoryStore;
pub use traits::{
    BaseStore, EmbeddingPrecondition, EventStore, FeedbackStore, ProfileUpdate, RecStore,
    SavedEventStore, UserStore, VectorIndex, VectorQuery,
};

/// Create the storage service described by the configuration.
///
/// With persistence enabled the snapshot file is loaded (or started empty
/// when missing); otherwise the store lives purely in memory.
pub async fn create_storage_service(
    config: &EventFeedConfig,
) -> Result<Arc<MemoryStore>, StorageError> {
    match config.storage.snapshot_path() {
        Some(path) => {
            if let Some(parent) = path.parent()
                && !parent.as_os_str().is_empty()
            {
                tokio::fs::create_dir_all(parent).await?;
            }
            info!("Opening snapshot store at {}", path.display());
            Ok(Arc::new(MemoryStore::open(path).await?))
        }
        None => {
            info!("Using in-memory store");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}
