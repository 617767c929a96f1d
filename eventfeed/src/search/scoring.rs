//! Ranking weights and feed strategy selection

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which scoring path the feed uses
///
/// `Auto` resolves per request: users with a usable embedding get the
/// vector path, everyone else the lexical one.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FeedStrategy {
    #[default]
    Auto,
    Lexical,
    Vector,
}

impl FeedStrategy {
    /// Resolve to a concrete scoring strategy for one request
    pub fn resolve(self, user_has_embedding: bool) -> ScoringStrategy {
        match self {
            Self::Lexical => ScoringStrategy::LexicalRecency,
            Self::Vector => ScoringStrategy::VectorRerank,
            Self::Auto if user_has_embedding => ScoringStrategy::VectorRerank,
            Self::Auto => ScoringStrategy::LexicalRecency,
        }
    }
}

impl fmt::Display for FeedStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Auto => write!(f, "auto"),
            Self::Lexical => write!(f, "lexical"),
            Self::Vector => write!(f, "vector"),
        }
    }
}

impl FromStr for FeedStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "lexical" => Ok(Self::Lexical),
            "vector" => Ok(Self::Vector),
            other => Err(format!("Unknown feed strategy: {}", other)),
        }
    }
}

/// Concrete scoring path applied to one candidate pool
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ScoringStrategy {
    /// Upcoming events by start time, scored `interest + recency`
    LexicalRecency,

    /// Nearest neighbours of the user embedding, scored
    /// `vector_weight * similarity + time_bonus_weight * time_bonus`
    VectorRerank,
}

impl fmt::Display for ScoringStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LexicalRecency => write!(f, "lexical_recency"),
            Self::VectorRerank => write!(f, "vector_rerank"),
        }
    }
}

/// Weights and pool sizes for ranking
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ScoringConfig {
    /// Feed path selection
    pub strategy: FeedStrategy,

    /// Upcoming events considered by the lexical paths
    pub candidate_pool: usize,

    /// The vector path retrieves `limit * vector_overfetch` neighbours
    pub vector_overfetch: usize,

    /// Added when an interest appears among the title/description words
    pub title_hit: f64,

    /// Added when an interest is a substring of a tag
    pub tag_hit: f64,

    /// Upper bound on the interest score
    pub interest_cap: f64,

    /// Recency boost for an event starting now
    pub recency_peak: f64,

    /// Exponential decay constant of the recency boost, in days
    pub recency_scale_days: f64,

    /// Weight of cosine similarity in the vector rerank
    pub vector_weight: f64,

    /// Weight of the time bonus in the vector rerank
    pub time_bonus_weight: f64,

    /// Days after which the time bonus reaches zero
    pub time_bonus_horizon_days: f64,

    /// Weight of title/description Jaccard in lexical similarity
    pub text_jaccard_weight: f64,

    /// Weight of tag Jaccard in lexical similarity
    pub tag_jaccard_weight: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            strategy: FeedStrategy::Auto,
            candidate_pool: 400,
            vector_overfetch: 2,
            title_hit: 1.0,
            tag_hit: 0.75,
            interest_cap: 3.0,
            recency_peak: 2.0,
            recency_scale_days: 7.0,
            vector_weight: 0.7,
            time_bonus_weight: 0.3,
            time_bonus_horizon_days: 14.0,
            text_jaccard_weight: 0.6,
            tag_jaccard_weight: 0.4,
        }
    }
}

impl ScoringConfig {
    /// Create a new scoring configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Always rank by interests and recency
    pub fn lexical_only() -> Self {
        Self {
            strategy: FeedStrategy::Lexical,
            ..Self::default()
        }
    }

    /// Always rank by vector similarity
    pub fn vector_only() -> Self {
        Self {
            strategy: FeedStrategy::Vector,
            ..Self::default()
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.candidate_pool == 0 {
            return Err("candidate_pool must be > 0".to_string());
        }
        if self.vector_overfetch == 0 {
            return Err("vector_overfetch must be > 0".to_string());
        }
        let weights = [
            ("title_hit", self.title_hit),
            ("tag_hit", self.tag_hit),
            ("interest_cap", self.interest_cap),
            ("recency_peak", self.recency_peak),
            ("vector_weight", self.vector_weight),
            ("time_bonus_weight", self.time_bonus_weight),
            ("text_jaccard_weight", self.text_jaccard_weight),
            ("tag_jaccard_weight", self.tag_jaccard_weight),
        ];
        for (name, value) in weights {
            if !value.is_finite() || value < 0.0 {
                return Err(format!("{} must be >= 0.0", name));
            }
        }
        if self.recency_scale_days.is_nan() || self.recency_scale_days <= 0.0 {
            return Err("recency_scale_days must be > 0.0".to_string());
        }
        if self.time_bonus_horizon_days.is_nan() || self.time_bonus_horizon_days <= 0.0 {
            return Err("time_bonus_horizon_days must be > 0.0".to_string());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_feed_strategy() {
        assert_eq!("Vector".parse::<FeedStrategy>().unwrap(), FeedStrategy::Vector);
        assert_eq!(" auto ".parse::<FeedStrategy>().unwrap(), FeedStrategy::Auto);
        assert!("hybrid".parse::<FeedStrategy>().is_err());
    }

    #[test]
    fn test_default_config() {
        let config = ScoringConfig::default();
        assert_eq!(config.candidate_pool, 400);
        assert_eq!(config.vector_overfetch, 2);
        assert_eq!(config.interest_cap, 3.0);
        assert_eq!(config.vector_weight, 0.7);
        assert_eq!(config.time_bonus_weight, 0.3);
        assert_eq!(config.strategy, FeedStrategy::Auto);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_strategy_resolution() {
        assert_eq!(
            FeedStrategy::Auto.resolve(true),
            ScoringStrategy::VectorRerank
        );
        assert_eq!(
            FeedStrategy::Auto.resolve(false),
            ScoringStrategy::LexicalRecency
        );
        assert_eq!(
            FeedStrategy::Lexical.resolve(true),
            ScoringStrategy::LexicalRecency
        );
        assert_eq!(
            FeedStrategy::Vector.resolve(false),
            ScoringStrategy::VectorRerank
        );
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let config = ScoringConfig {
            tag_hit: -0.5,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = ScoringConfig {
            recency_scale_days: 0.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = ScoringConfig {
            candidate_pool: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_presets() {
        assert_eq!(ScoringConfig::lexical_only().strategy, FeedStrategy::Lexical);
        assert_eq!(ScoringConfig::vector_only().strategy, FeedStrategy::Vector);
    }

    #[test]
    fn test_strategy_serde() {
        let json = serde_json::to_string(&FeedStrategy::Vector).unwrap();
        assert_eq!(json, "\"vector\"");
        let parsed: FeedStrategy = serde_json::from_str("\"auto\"").unwrap();
        assert_eq!(parsed, FeedStrategy::Auto);
    }
}
