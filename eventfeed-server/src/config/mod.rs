//! Server configuration module

use anyhow::Result;
use eventfeed::config::{ConfigLoader, EventFeedConfig};
use eventfeed::search::FeedStrategy;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Port to listen on
    pub port: u16,

    /// Maximum request body size in bytes
    pub max_request_size: usize,

    /// Attach a permissive CORS layer
    pub enable_cors: bool,

    /// Engine configuration file
    pub config_file: Option<PathBuf>,

    /// JSON snapshot overriding the engine's storage settings
    pub snapshot: Option<PathBuf>,

    /// Feed strategy overriding the engine's ranking settings
    pub feed_strategy: Option<FeedStrategy>,

    /// Background reindex interval overriding the engine's setting
    pub reindex_interval: Option<Duration>,

    /// Page size for feed and search when `limit` is absent
    pub default_limit: usize,

    /// Largest accepted `limit` for feed and search
    pub max_limit: usize,

    /// Page size for similar events when `limit` is absent
    pub default_similar_limit: usize,

    /// Largest accepted `limit` for similar events
    pub max_similar_limit: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            max_request_size: 1024 * 1024, // 1MB
            enable_cors: true,
            config_file: None,
            snapshot: None,
            feed_strategy: None,
            reindex_interval: None,
            default_limit: 20,
            max_limit: 100,
            default_similar_limit: 10,
            max_similar_limit: 50,
        }
    }
}

impl ServerConfig {
    /// Load configuration from CLI arguments and environment variables
    /// CLI arguments take precedence over environment variables
    pub fn from_cli_and_env(cli_args: crate::cli::CliArgs) -> Result<Self> {
        let mut config = Self::default();

        if let Some(port) = cli_args.port {
            config.port = port;
        } else if let Ok(port) = env::var("EVENTFEED_PORT") {
            config.port = port.parse()?;
        }

        if let Some(max_size) = cli_args.max_request_size {
            config.max_request_size = max_size;
        } else if let Ok(max_size) = env::var("EVENTFEED_MAX_REQUEST_SIZE") {
            config.max_request_size = max_size.parse()?;
        }

        if let Some(enable_cors) = cli_args.enable_cors {
            config.enable_cors = enable_cors;
        } else if let Ok(enable_cors) = env::var("EVENTFEED_ENABLE_CORS") {
            config.enable_cors = enable_cors.parse().unwrap_or(true);
        }

        if let Some(path) = cli_args.config_file {
            config.config_file = Some(path);
        } else if let Ok(path) = env::var("EVENTFEED_CONFIG_FILE") {
            config.config_file = Some(PathBuf::from(path));
        }

        if let Some(path) = cli_args.snapshot {
            config.snapshot = Some(path);
        } else if let Ok(path) = env::var("EVENTFEED_SNAPSHOT") {
            config.snapshot = Some(PathBuf::from(path));
        }

        if let Some(strategy) = cli_args.feed_strategy {
            config.feed_strategy = Some(strategy.parse().map_err(anyhow::Error::msg)?);
        } else if let Ok(strategy) = env::var("EVENTFEED_FEED_STRATEGY") {
            config.feed_strategy = Some(strategy.parse().map_err(anyhow::Error::msg)?);
        }

        if let Some(secs) = cli_args.reindex_interval_secs {
            config.reindex_interval = Some(Duration::from_secs(secs));
        } else if let Ok(secs) = env::var("EVENTFEED_REINDEX_INTERVAL") {
            config.reindex_interval = Some(Duration::from_secs(secs.parse()?));
        }

        if let Ok(limit) = env::var("EVENTFEED_DEFAULT_LIMIT") {
            config.default_limit = limit.parse()?;
        }

        if let Ok(limit) = env::var("EVENTFEED_MAX_LIMIT") {
            config.max_limit = limit.parse()?;
        }

        if config.default_limit == 0 || config.default_limit > config.max_limit {
            anyhow::bail!(
                "default limit {} must be between 1 and the max limit {}",
                config.default_limit,
                config.max_limit
            );
        }

        Ok(config)
    }

    /// Engine configuration with this server's overrides applied
    pub fn engine_config(&self) -> Result<EventFeedConfig> {
        let mut engine = ConfigLoader::load(self.config_file.as_deref())?;

        if let Some(path) = &self.snapshot {
            engine.storage.snapshot_file = Some(path.clone());
            engine.storage.persist = true;
        }
        if let Some(strategy) = self.feed_strategy {
            engine.ranking.strategy = strategy;
        }
        if let Some(interval) = self.reindex_interval {
            engine.reindex.interval = interval;
        }

        Ok(engine)
    }
}
