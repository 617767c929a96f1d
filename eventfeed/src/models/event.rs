//! Event model representing a catalog entry

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::ml::vector;

const SECONDS_PER_DAY: f64 = 86_400.0;

/// An event in the catalog
///
/// The recommender never mutates an event except to backfill a missing
/// embedding. A stored embedding is either unit length or all-zero.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Event {
    /// Unique identifier for the event
    pub id: String,

    /// Event title
    pub title: String,

    /// Longer free-text description
    #[serde(default)]
    pub description: Option<String>,

    /// When the event starts
    pub start_time: DateTime<Utc>,

    /// When the event ends
    #[serde(default)]
    pub end_time: Option<DateTime<Utc>>,

    /// Venue or address
    #[serde(default)]
    pub location: Option<String>,

    /// Organizing group or person
    #[serde(default)]
    pub host: Option<String>,

    /// Ticket price in cents; zero means free
    #[serde(default)]
    pub price_cents: Option<u32>,

    /// Short labels, ordered and without duplicates
    #[serde(default)]
    pub tags: Vec<String>,

    /// Link to the event page
    #[serde(default)]
    pub url: Option<String>,

    /// Semantic embedding; `None` until backfilled
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vec<f32>>,

    /// Popularity scalar
    #[serde(default)]
    pub popularity: f64,

    /// When the event was ingested
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl Event {
    /// Create a new event with a generated id
    pub fn new(title: impl Into<String>, start_time: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title: title.into(),
            description: None,
            start_time,
            end_time: None,
            location: None,
            host: None,
            price_cents: None,
            tags: Vec::new(),
            url: None,
            embedding: None,
            popularity: 0.0,
            created_at: Utc::now(),
        }
    }

    /// Description or empty string
    pub fn description_text(&self) -> &str {
        self.description.as_deref().unwrap_or("")
    }

    /// Title and description joined for tokenization and embedding
    pub fn text(&self) -> String {
        format!("{} {}", self.title, self.description_text())
            .trim()
            .to_string()
    }

    /// Text handed to the summarizer
    pub fn summary_source(&self) -> String {
        format!("{}. {}", self.title, self.description_text())
    }

    /// Key for the summary cache; changes whenever the description length does
    pub fn summary_cache_key(&self) -> String {
        format!("{}:{}", self.id, self.description_text().len())
    }

    /// Whether the event starts strictly after `now`
    pub fn is_upcoming(&self, now: DateTime<Utc>) -> bool {
        self.start_time > now
    }

    /// Fractional days from `now` until the start (negative for past events)
    pub fn days_until_start(&self, now: DateTime<Utc>) -> f64 {
        let delta = self.start_time - now;
        delta.num_milliseconds() as f64 / 1000.0 / SECONDS_PER_DAY
    }

    /// Whether the event carries a usable non-zero embedding
    pub fn has_embedding(&self) -> bool {
        self.embedding.as_deref().is_some_and(|e| !vector::is_zero(e))
    }

    /// Whether the event is free to attend
    pub fn is_free(&self) -> bool {
        self.price_cents == Some(0)
    }
}

/// Builder for creating events
#[derive(Debug)]
pub struct EventBuilder {
    event: Event,
}

impl EventBuilder {
    /// Start a new event
    pub fn new(title: impl Into<String>, start_time: DateTime<Utc>) -> Self {
        Self {
            event: Event::new(title, start_time),
        }
    }

    /// Set an explicit id
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.event.id = id.into();
        self
    }

    /// Set the description
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.event.description = Some(description.into());
        self
    }

    /// Set the end time
    pub fn end_time(mut self, end_time: DateTime<Utc>) -> Self {
        self.event.end_time = Some(end_time);
        self
    }

    /// Set the location
    pub fn location(mut self, location: impl Into<String>) -> Self {
        self.event.location = Some(location.into());
        self
    }

    /// Set the host
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.event.host = Some(host.into());
        self
    }

    /// Set the price in cents
    pub fn price_cents(mut self, price: u32) -> Self {
        self.event.price_cents = Some(price);
        self
    }

    /// Add a tag, ignoring blanks and duplicates
    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        let tag = tag.into();
        let tag = tag.trim();
        if !tag.is_empty() && !self.event.tags.iter().any(|t| t == tag) {
            self.event.tags.push(tag.to_string());
        }
        self
    }

    /// Add several tags
    pub fn tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for tag in tags {
            self = self.tag(tag);
        }
        self
    }

    /// Set the url
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.event.url = Some(url.into());
        self
    }

    /// Set the embedding
    pub fn embedding(mut self, embedding: Vec<f32>) -> Self {
        self.event.embedding = Some(embedding);
        self
    }

    /// Set the popularity
    pub fn popularity(mut self, popularity: f64) -> Self {
        self.event.popularity = popularity;
        self
    }

    /// Set the ingestion time
    pub fn created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.event.created_at = created_at;
        self
    }

    /// Build the event
    pub fn build(self) -> Event {
        self.event
    }
}
