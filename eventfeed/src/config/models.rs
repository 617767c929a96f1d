//! Configuration model definitions.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::ml::EMBEDDING_DIM;
use crate::search::ScoringConfig;

/// Main configuration structure for eventfeed.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct EventFeedConfig {
    /// Storage configuration
    pub storage: StorageConfig,

    /// Embedding configuration
    pub embedding: EmbeddingConfig,

    /// Ranking weights and pool sizes
    pub ranking: ScoringConfig,

    /// Summary generation and caching
    pub summary: SummaryConfig,

    /// Online profile updates
    pub profile: ProfileConfig,

    /// Embedding backfill
    pub reindex: ReindexConfig,

    /// Event ingestion
    pub ingest: IngestConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Configuration for storage.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Base directory for storage
    pub data_dir: PathBuf,

    /// Snapshot file name, relative to `data_dir` unless absolute
    pub snapshot_file: Option<PathBuf>,

    /// Whether to load and rewrite the snapshot
    pub persist: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        let data_dir = directories::ProjectDirs::from("org", "eventfeed", "eventfeed")
            .map(|dirs| dirs.data_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from("./data"));

        Self {
            data_dir,
            snapshot_file: None,
            persist: false,
        }
    }
}

impl StorageConfig {
    /// Default snapshot file name
    pub const DEFAULT_SNAPSHOT: &'static str = "eventfeed.json";

    /// Resolved snapshot location when persistence is enabled
    pub fn snapshot_path(&self) -> Option<PathBuf> {
        if !self.persist {
            return None;
        }
        let file = self
            .snapshot_file
            .clone()
            .unwrap_or_else(|| PathBuf::from(Self::DEFAULT_SNAPSHOT));
        if file.is_absolute() {
            Some(file)
        } else {
            Some(self.data_dir.join(file))
        }
    }
}

/// Configuration for the embedding capability.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    /// Vector dimension; fixed system-wide
    pub dimension: usize,

    /// Informational model identifier
    pub model_name: String,

    /// Upper bound on a single embedding call
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            dimension: EMBEDDING_DIM,
            model_name: format!("feature-hash-sha256-{}", EMBEDDING_DIM),
            timeout: Duration::from_secs(2),
        }
    }
}

/// Configuration for summaries and explanations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SummaryConfig {
    /// Maximum words in a summary before truncation
    pub max_words: usize,

    /// Entries kept in the summary cache
    pub cache_capacity: usize,

    /// Upper bound on one provider call
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            max_words: 22,
            cache_capacity: 5000,
            timeout: Duration::from_millis(500),
        }
    }
}

/// Configuration for feedback-driven profile updates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileConfig {
    /// Weight kept from the previous profile
    pub alpha: f32,

    /// Compare-and-set attempts before falling back to last-writer-wins
    pub max_retries: u32,
}

impl Default for ProfileConfig {
    fn default() -> Self {
        Self {
            alpha: 0.9,
            max_retries: 3,
        }
    }
}

/// Configuration for embedding backfill.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReindexConfig {
    /// Events backfilled per pass
    pub event_batch: usize,

    /// Users backfilled per pass
    pub user_batch: usize,

    /// Background pass interval; zero disables
    #[serde(with = "humantime_serde")]
    pub interval: Duration,
}

impl Default for ReindexConfig {
    fn default() -> Self {
        Self {
            event_batch: 5000,
            user_batch: 5000,
            interval: Duration::ZERO,
        }
    }
}

/// Configuration for event ingestion.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    /// Labels offered to the classifier for events arriving without tags
    pub labels: Vec<String>,
}

impl Default for IngestConfig {
    fn default() -> Self {
        let labels = [
            "career", "technology", "music", "arts", "sports", "social", "workshop",
            "volunteering", "food", "free",
        ];
        Self {
            labels: labels.iter().map(|l| l.to_string()).collect(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level
    pub level: LogLevel,

    /// Log format
    pub format: LogFormat,

    /// File to log to (if any)
    pub file: Option<PathBuf>,

    /// Whether to log to stdout
    pub stdout: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            format: LogFormat::Default,
            file: None,
            stdout: true,
        }
    }
}

/// Log level.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Trace => write!(f, "trace"),
            LogLevel::Debug => write!(f, "debug"),
            LogLevel::Info => write!(f, "info"),
            LogLevel::Warn => write!(f, "warn"),
            LogLevel::Error => write!(f, "error"),
        }
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            _ => Err(format!("Invalid log level: {}", s)),
        }
    }
}

/// Log format.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Default format
    Default,

    /// JSON format
    Json,

    /// Compact format
    Compact,

    /// Pretty format
    Pretty,
}
