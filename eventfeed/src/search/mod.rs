//! Lexical and vector scoring for event ranking
//!
//! This module holds the pure scoring side of the recommender:
//! - [`keywords`]: the canonical tokenizer, stop words and Jaccard overlap
//! - [`scoring`]: tunable weights and the feed strategy selection
//! - [`calculator`]: interest, recency and rerank formulas
//!
//! # Example
//!
//! ```
//! use eventfeed::search::{ScoreCalculator, ScoringConfig};
//!
//! let calculator = ScoreCalculator::new(ScoringConfig::default());
//!
//! // An event starting right now gets the full recency boost
//! assert!((calculator.recency_boost(0.0) - 2.0).abs() < 1e-9);
//! ```

pub mod calculator;
pub mod keywords;
pub mod scoring;

pub use calculator::ScoreCalculator;
pub use scoring::{FeedStrategy, ScoringConfig, ScoringStrategy};
