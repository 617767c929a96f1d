//! Configuration validation utilities.

use super::models::*;
use super::ConfigError;
use crate::ml::EMBEDDING_DIM;

/// Validate the entire configuration.
pub fn validate_config(config: &EventFeedConfig) -> Result<(), ConfigError> {
    validate_storage_config(&config.storage)?;
    validate_embedding_config(&config.embedding)?;

    config
        .ranking
        .validate()
        .map_err(|e| ConfigError::ValidationError(format!("ranking: {}", e)))?;

    validate_summary_config(&config.summary)?;
    validate_profile_config(&config.profile)?;
    validate_reindex_config(&config.reindex)?;

    Ok(())
}

fn validate_storage_config(config: &StorageConfig) -> Result<(), ConfigError> {
    if config.persist && config.data_dir.as_os_str().is_empty() {
        return Err(ConfigError::ValidationError(
            "Data directory cannot be empty when persistence is enabled".to_string(),
        ));
    }

    if let Some(file) = &config.snapshot_file
        && file.as_os_str().is_empty()
    {
        return Err(ConfigError::ValidationError(
            "Snapshot file name cannot be empty".to_string(),
        ));
    }

    Ok(())
}

fn validate_embedding_config(config: &EmbeddingConfig) -> Result<(), ConfigError> {
    if config.dimension != EMBEDDING_DIM {
        return Err(ConfigError::ValidationError(format!(
            "Embedding dimension is fixed at {}, got {}",
            EMBEDDING_DIM, config.dimension
        )));
    }

    if config.model_name.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "Embedding model name cannot be empty".to_string(),
        ));
    }

    if config.timeout.is_zero() {
        return Err(ConfigError::ValidationError(
            "Embedding timeout must be greater than zero".to_string(),
        ));
    }

    Ok(())
}

fn validate_summary_config(config: &SummaryConfig) -> Result<(), ConfigError> {
    if config.max_words == 0 {
        return Err(ConfigError::ValidationError(
            "summary.max_words must be greater than 0".to_string(),
        ));
    }
    if config.cache_capacity == 0 {
        return Err(ConfigError::ValidationError(
            "summary.cache_capacity must be greater than 0".to_string(),
        ));
    }
    if config.timeout.is_zero() {
        return Err(ConfigError::ValidationError(
            "summary.timeout must be greater than zero".to_string(),
        ));
    }
    Ok(())
}

fn validate_profile_config(config: &ProfileConfig) -> Result<(), ConfigError> {
    if !(config.alpha > 0.0 && config.alpha < 1.0) {
        return Err(ConfigError::ValidationError(format!(
            "profile.alpha must be in (0, 1), got {}",
            config.alpha
        )));
    }
    Ok(())
}

fn validate_reindex_config(config: &ReindexConfig) -> Result<(), ConfigError> {
    if config.event_batch == 0 || config.user_batch == 0 {
        return Err(ConfigError::ValidationError(
            "reindex batch sizes must be greater than 0".to_string(),
        ));
    }
    Ok(())
}
