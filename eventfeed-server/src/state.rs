//! Application state management

use eventfeed::core::Recommender;

use crate::config::ServerConfig;
use crate::error::{bad_request, ServerResult};

/// Application state shared across all handlers
#[derive(Debug)]
pub struct AppState {
    /// Recommendation engine
    pub recommender: Recommender,

    /// Server configuration
    pub config: ServerConfig,
}

impl AppState {
    /// Create new application state
    pub fn new(recommender: Recommender, config: ServerConfig) -> Self {
        Self {
            recommender,
            config,
        }
    }

    /// Feed and search page size, defaulted and bounded
    pub fn page_limit(&self, requested: Option<usize>) -> ServerResult<usize> {
        bounded_limit(requested, self.config.default_limit, self.config.max_limit)
    }

    /// Similar-events page size, defaulted and bounded
    pub fn similar_limit(&self, requested: Option<usize>) -> ServerResult<usize> {
        bounded_limit(
            requested,
            self.config.default_similar_limit,
            self.config.max_similar_limit,
        )
    }
}

fn bounded_limit(requested: Option<usize>, default: usize, max: usize) -> ServerResult<usize> {
    match requested {
        None => Ok(default),
        Some(limit) if (1..=max).contains(&limit) => Ok(limit),
        Some(limit) => Err(bad_request(&format!(
            "limit must be between 1 and {}, got {}",
            max, limit
        ))),
    }
}
