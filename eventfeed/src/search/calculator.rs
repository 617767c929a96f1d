//! Score calculator for feed and similar-event ranking
//!
//! Implements the two feed blends and the lexical similarity fallback:
//! - lexical: `interest_score + recency_boost`
//! - vector: `vector_weight * similarity + time_bonus_weight * time_bonus`
//! - similarity: `text_weight * jaccard(words) + tag_weight * jaccard(tags)`

use chrono::{DateTime, Utc};
use std::collections::HashSet;

use super::keywords;
use super::scoring::ScoringConfig;
use crate::models::Event;

/// Calculator for the ranking formulas
#[derive(Debug, Clone)]
pub struct ScoreCalculator {
    config: ScoringConfig,
}

impl ScoreCalculator {
    /// Create a new score calculator with the given configuration
    pub fn new(config: ScoringConfig) -> Self {
        Self { config }
    }

    /// Create a score calculator, returning an error if the configuration is invalid
    pub fn try_new(config: ScoringConfig) -> Result<Self, String> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Interest overlap between a user and an event's words and tags.
    ///
    /// Each trimmed, lowercased interest earns `title_hit` when it is one of
    /// the event's words and `tag_hit` when it is contained in any tag.
    /// The sum is capped at `interest_cap`.
    pub fn interest_score<S: AsRef<str>>(
        &self,
        interests: &[S],
        words: &HashSet<String>,
        tags: &[String],
    ) -> f64 {
        if interests.is_empty() {
            return 0.0;
        }

        let tags: Vec<String> = tags.iter().map(|t| t.to_lowercase()).collect();
        let mut score = 0.0;
        for interest in interests {
            let interest = interest.as_ref().trim().to_lowercase();
            if interest.is_empty() {
                continue;
            }
            if words.contains(&interest) {
                score += self.config.title_hit;
            }
            if tags.iter().any(|t| t.contains(&interest)) {
                score += self.config.tag_hit;
            }
        }

        score.min(self.config.interest_cap)
    }

    /// Interest score against an event
    pub fn event_interest_score<S: AsRef<str>>(&self, interests: &[S], event: &Event) -> f64 {
        let words = keywords::word_set(&event.text());
        self.interest_score(interests, &words, &event.tags)
    }

    /// `peak * exp(-max(days, 0) / scale)`; non-increasing in `days_until_start`
    pub fn recency_boost(&self, days_until_start: f64) -> f64 {
        let days = days_until_start.max(0.0);
        (self.config.recency_peak * (-days / self.config.recency_scale_days).exp()).max(0.0)
    }

    /// `max(0, 1 - days / horizon)`
    pub fn time_bonus(&self, days_until_start: f64) -> f64 {
        let days = days_until_start.max(0.0);
        (1.0 - days / self.config.time_bonus_horizon_days).max(0.0)
    }

    /// Score used by the lexical feed path
    pub fn lexical_score<S: AsRef<str>>(
        &self,
        interests: &[S],
        event: &Event,
        now: DateTime<Utc>,
    ) -> f64 {
        self.event_interest_score(interests, event) + self.recency_boost(event.days_until_start(now))
    }

    /// Score used by the vector feed path
    pub fn vector_score(&self, similarity: f64, event: &Event, now: DateTime<Utc>) -> f64 {
        self.config.vector_weight * similarity
            + self.config.time_bonus_weight * self.time_bonus(event.days_until_start(now))
    }

    /// Blend of keyword and tag Jaccard overlap between two events
    pub fn lexical_similarity(&self, base: &LexicalProfile, candidate: &LexicalProfile) -> f64 {
        self.config.text_jaccard_weight * keywords::jaccard(&base.keywords, &candidate.keywords)
            + self.config.tag_jaccard_weight * keywords::jaccard(&base.tags, &candidate.tags)
    }

    /// Get reference to the configuration
    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }
}

/// Tokenized view of an event used by the lexical similarity fallback
#[derive(Debug, Clone, Default)]
pub struct LexicalProfile {
    pub keywords: HashSet<String>,
    pub tags: HashSet<String>,
}

impl LexicalProfile {
    pub fn from_event(event: &Event) -> Self {
        Self {
            keywords: keywords::keyword_set(&event.text()),
            tags: keywords::tag_set(&event.tags),
        }
    }
}
