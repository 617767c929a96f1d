//! Configuration system for eventfeed.
//!
//! Configuration is layered: built-in defaults, then the first default
//! config file found, then an explicit file, then `EVENTFEED_` environment
//! variables (`__` separates nested keys, e.g. `EVENTFEED_PROFILE__ALPHA`).

mod builder;
mod loader;
mod models;
mod validation;

pub use builder::ConfigBuilder;
pub use loader::ConfigLoader;
pub use models::*;
pub use validation::validate_config;

/// Default configuration file names that the system will look for
pub const DEFAULT_CONFIG_FILES: &[&str] = &[
    "eventfeed.toml",
    "eventfeed.yaml",
    "eventfeed.yml",
    "eventfeed.json",
    ".eventfeed/config.toml",
    ".eventfeed/config.yaml",
    ".eventfeed/config.yml",
    ".eventfeed/config.json",
];

/// Environment variable prefix for eventfeed configuration
pub const ENV_PREFIX: &str = "EVENTFEED_";

/// Separator for nested keys in environment variables
pub const ENV_SEPARATOR: &str = "__";

/// Configuration error type
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Error occurred during file loading
    #[error("Failed to load configuration file: {0}")]
    FileLoadError(String),

    /// Error occurred during validation
    #[error("Configuration validation error: {0}")]
    ValidationError(String),

    /// Error occurred during parsing
    #[error("Configuration parsing error: {0}")]
    ParseError(String),

    /// General error
    #[error("{0}")]
    Other(String),
}

/// Result type for configuration operations
pub type Result<T> = std::result::Result<T, ConfigError>;
