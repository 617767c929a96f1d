//! Configuration builder.
//!
//! This module provides a builder pattern API for creating configurations.

use super::{models::*, validation, Result};
use crate::search::{FeedStrategy, ScoringConfig};
use std::path::Path;
use std::time::Duration;

/// Builder for creating EventFeedConfig instances.
#[derive(Debug, Clone)]
pub struct ConfigBuilder {
    config: EventFeedConfig,
}

impl ConfigBuilder {
    /// Create a new configuration builder with default values.
    pub fn new() -> Self {
        Self {
            config: EventFeedConfig::default(),
        }
    }

    /// Set the base data directory.
    pub fn with_data_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config.storage.data_dir = path.as_ref().to_path_buf();
        self
    }

    /// Persist state to a JSON snapshot at `path`.
    pub fn with_snapshot<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config.storage.snapshot_file = Some(path.as_ref().to_path_buf());
        self.config.storage.persist = true;
        self
    }

    /// Keep all state in memory only (good for testing)
    pub fn with_memory_storage(mut self) -> Self {
        self.config.storage.persist = false;
        self.config.storage.snapshot_file = None;
        self
    }

    /// Set the embedding model name.
    pub fn with_embedding_model(mut self, model_name: impl Into<String>) -> Self {
        self.config.embedding.model_name = model_name.into();
        self
    }

    /// Replace the ranking configuration.
    pub fn with_ranking(mut self, ranking: ScoringConfig) -> Self {
        self.config.ranking = ranking;
        self
    }

    /// Select the feed strategy.
    pub fn with_feed_strategy(mut self, strategy: FeedStrategy) -> Self {
        self.config.ranking.strategy = strategy;
        self
    }

    /// Set the EMA weight kept from the previous profile.
    pub fn with_profile_alpha(mut self, alpha: f32) -> Self {
        self.config.profile.alpha = alpha;
        self
    }

    /// Set the summary cache capacity.
    pub fn with_summary_cache_capacity(mut self, capacity: usize) -> Self {
        self.config.summary.cache_capacity = capacity;
        self
    }

    /// Set the provider call timeout.
    pub fn with_summary_timeout(mut self, timeout: Duration) -> Self {
        self.config.summary.timeout = timeout;
        self
    }

    /// Set the background reindex interval; zero disables it.
    pub fn with_reindex_interval(mut self, interval: Duration) -> Self {
        self.config.reindex.interval = interval;
        self
    }

    /// Set the labels used to auto-tag ingested events.
    pub fn with_ingest_labels<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.ingest.labels = labels.into_iter().map(Into::into).collect();
        self
    }

    /// Set the log level.
    pub fn with_log_level(mut self, level: LogLevel) -> Self {
        self.config.logging.level = level;
        self
    }

    /// Set the log format.
    pub fn with_log_format(mut self, format: LogFormat) -> Self {
        self.config.logging.format = format;
        self
    }

    /// Set the log file.
    pub fn with_log_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config.logging.file = Some(path.as_ref().to_path_buf());
        self
    }

    /// Build and validate the configuration.
    pub fn build(self) -> Result<EventFeedConfig> {
        validation::validate_config(&self.config)?;
        Ok(self.config)
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
