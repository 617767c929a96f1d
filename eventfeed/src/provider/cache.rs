//! Bounded summary cache
//!
//! Keys follow [`Event::summary_cache_key`](crate::models::Event::summary_cache_key),
//! so an edited description misses the cache instead of serving a stale summary.

use lru::LruCache;
use serde::Serialize;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::Mutex;

/// LRU cache of generated summaries, shared across requests
#[derive(Debug, Clone)]
pub struct SummaryCache {
    cache: Arc<Mutex<LruCache<String, String>>>,
    capacity: usize,
    hits: Arc<AtomicU64>,
    misses: Arc<AtomicU64>,
}

/// Cache statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub size: usize,
    pub capacity: usize,
    pub hits: u64,
    pub misses: u64,
}

impl SummaryCache {
    /// Create a cache holding at most `capacity` entries (minimum one)
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            cache: Arc::new(Mutex::new(LruCache::new(capacity))),
            capacity: capacity.get(),
            hits: Arc::new(AtomicU64::new(0)),
            misses: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Get a cached summary, refreshing its recency
    pub async fn get(&self, key: &str) -> Option<String> {
        let mut cache = self.cache.lock().await;
        let value = cache.get(key).cloned();
        match value {
            Some(_) => self.hits.fetch_add(1, Ordering::Relaxed),
            None => self.misses.fetch_add(1, Ordering::Relaxed),
        };
        value
    }

    /// Store a summary, evicting the least recently used entry when full
    pub async fn put(&self, key: String, summary: String) {
        let mut cache = self.cache.lock().await;
        cache.put(key, summary);
    }

    /// Drop every entry
    pub async fn clear(&self) {
        let mut cache = self.cache.lock().await;
        cache.clear();
    }

    /// Get cache statistics
    pub async fn stats(&self) -> CacheStats {
        let cache = self.cache.lock().await;
        CacheStats {
            size: cache.len(),
            capacity: self.capacity,
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}
