//! Data Transfer Objects for the API

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use eventfeed::core::CatalogStatus;
use eventfeed::models::{Event, EventBuilder, FeedbackSignals, InteractionMetrics, User};
use eventfeed::recs::{RankedEvent, ReindexReport};

pub use crate::error::ErrorResponse;

/// One entry of a feed, search or similar-events response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RankedEventDto {
    pub id: String,
    pub title: String,

    /// ISO-8601 start time
    pub start_time: DateTime<Utc>,
    pub location: Option<String>,
    pub tags: Vec<String>,
    pub url: Option<String>,

    /// Ranking score rounded to six decimals
    #[schema(example = 2.503463)]
    pub score: f64,

    /// Short synopsis
    pub summary: String,

    /// Why the event was recommended
    #[schema(example = "Matches your interests: ai • Tagged technology")]
    pub explanation: String,
}

impl From<RankedEvent> for RankedEventDto {
    fn from(item: RankedEvent) -> Self {
        Self {
            id: item.id,
            title: item.title,
            start_time: item.start_time,
            location: item.location,
            tags: item.tags,
            url: item.url,
            score: item.score,
            summary: item.summary,
            explanation: item.explanation,
        }
    }
}

/// Full event detail
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct EventDto {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub location: Option<String>,
    pub host: Option<String>,
    pub price_cents: Option<u32>,
    pub tags: Vec<String>,
    pub url: Option<String>,
    pub popularity: f64,

    /// Whether the embedding has been backfilled
    pub has_embedding: bool,
    pub created_at: DateTime<Utc>,
}

impl From<Event> for EventDto {
    fn from(event: Event) -> Self {
        let has_embedding = event.has_embedding();
        Self {
            id: event.id,
            title: event.title,
            description: event.description,
            start_time: event.start_time,
            end_time: event.end_time,
            location: event.location,
            host: event.host,
            price_cents: event.price_cents,
            tags: event.tags,
            url: event.url,
            popularity: event.popularity,
            has_embedding,
            created_at: event.created_at,
        }
    }
}

/// Request to add an event to the catalog
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateEventRequest {
    pub title: String,
    pub description: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub location: Option<String>,
    pub host: Option<String>,
    pub price_cents: Option<u32>,

    /// Tags; when empty the event is auto-tagged
    #[serde(default)]
    pub tags: Vec<String>,
    pub url: Option<String>,
    #[serde(default)]
    pub popularity: f64,

    /// Optional precomputed 384-dimensional embedding
    pub embedding: Option<Vec<f32>>,
}

impl CreateEventRequest {
    pub fn into_event(self) -> Event {
        let mut builder = EventBuilder::new(self.title, self.start_time)
            .tags(self.tags)
            .popularity(self.popularity);
        if let Some(description) = self.description {
            builder = builder.description(description);
        }
        if let Some(end_time) = self.end_time {
            builder = builder.end_time(end_time);
        }
        if let Some(location) = self.location {
            builder = builder.location(location);
        }
        if let Some(host) = self.host {
            builder = builder.host(host);
        }
        if let Some(price) = self.price_cents {
            builder = builder.price_cents(price);
        }
        if let Some(url) = self.url {
            builder = builder.url(url);
        }
        if let Some(embedding) = self.embedding {
            builder = builder.embedding(embedding);
        }
        builder.build()
    }
}

/// User profile
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserDto {
    pub id: String,
    pub email: String,
    pub display_name: Option<String>,
    pub interests: Vec<String>,
    pub has_embedding: bool,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserDto {
    fn from(user: User) -> Self {
        let has_embedding = user.has_embedding();
        Self {
            id: user.id,
            email: user.email,
            display_name: user.display_name,
            interests: user.interests,
            has_embedding,
            created_at: user.created_at,
        }
    }
}

/// Request to create or update a user by email
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct BootstrapUserRequest {
    #[schema(example = "ada@example.com")]
    pub email: String,
    pub display_name: Option<String>,
    #[serde(default)]
    #[schema(example = json!(["ai", "music"]))]
    pub interests: Vec<String>,
}

/// Request to replace a user's interests
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ReplaceInterestsRequest {
    pub interests: Vec<String>,
}

/// Request to bookmark an event
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SaveEventRequest {
    pub event_id: String,
}

/// Outcome of saving or unsaving an event
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SavedEventResponse {
    #[schema(example = "Event saved successfully")]
    pub message: String,

    /// Whether the event is saved after the call
    pub saved: bool,
}

impl SavedEventResponse {
    pub fn saved(created: bool) -> Self {
        let message = if created {
            "Event saved successfully"
        } else {
            "Event already saved"
        };
        Self {
            message: message.to_string(),
            saved: true,
        }
    }

    pub fn removed() -> Self {
        Self {
            message: "Event removed from saved list".to_string(),
            saved: false,
        }
    }
}

/// Interaction report from a client
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct FeedbackRequest {
    pub user_id: String,
    pub event_id: String,
    #[serde(default)]
    pub clicked: bool,
    #[serde(default)]
    pub saved: bool,
    #[serde(default)]
    pub rsvp: bool,
    #[serde(default)]
    pub dwell_seconds: u32,
}

impl FeedbackRequest {
    pub fn signals(&self) -> FeedbackSignals {
        FeedbackSignals {
            clicked: self.clicked,
            saved: self.saved,
            rsvp: self.rsvp,
            dwell_seconds: self.dwell_seconds,
        }
    }
}

/// Query parameters for the feed
#[derive(Debug, Deserialize, IntoParams)]
pub struct FeedParams {
    /// Viewer id; omit for an anonymous feed
    pub user_id: Option<String>,

    /// Number of results (1-100, default 20)
    pub limit: Option<usize>,
}

/// Query parameters for keyword search
#[derive(Debug, Deserialize, IntoParams)]
pub struct SearchParams {
    /// Case-insensitive substring of the title or description
    pub q: String,

    /// Viewer id used for explanations
    pub user_id: Option<String>,

    /// Number of results (1-100, default 20)
    pub limit: Option<usize>,
}

/// Query parameters for similar events
#[derive(Debug, Deserialize, IntoParams)]
pub struct SimilarParams {
    /// Number of results (1-50, default 10)
    pub limit: Option<usize>,
}

/// Embedding backfill counts
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ReindexResponse {
    pub events: usize,
    pub users: usize,
}

impl From<ReindexReport> for ReindexResponse {
    fn from(report: ReindexReport) -> Self {
        Self {
            events: report.events,
            users: report.users,
        }
    }
}

/// Interaction counts over a window
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MetricsDto {
    #[schema(example = "last_24h")]
    pub window: String,
    pub clicks: u64,
    pub saves: u64,
    pub rsvps: u64,
    pub interactions: u64,
}

impl From<InteractionMetrics> for MetricsDto {
    fn from(metrics: InteractionMetrics) -> Self {
        Self {
            window: metrics.window,
            clicks: metrics.clicks,
            saves: metrics.saves,
            rsvps: metrics.rsvps,
            interactions: metrics.interactions,
        }
    }
}

/// Service health and catalog counts
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HealthDto {
    #[schema(example = "ok")]
    pub status: String,
    pub version: String,
    pub events: usize,
    pub upcoming_events: usize,
    pub events_with_embedding: usize,
    pub users: usize,
    pub users_with_embedding: usize,

    /// Configured feed strategy: auto, lexical or vector
    pub feed_strategy: String,
    pub embedding_model: String,
    pub provider: String,
    pub summary_cache_size: usize,

    /// Store backend details
    #[schema(value_type = Object)]
    pub storage: serde_json::Value,
}

impl From<CatalogStatus> for HealthDto {
    fn from(status: CatalogStatus) -> Self {
        Self {
            status: if status.healthy { "ok" } else { "degraded" }.to_string(),
            version: eventfeed::VERSION.to_string(),
            events: status.events,
            upcoming_events: status.upcoming_events,
            events_with_embedding: status.events_with_embedding,
            users: status.users,
            users_with_embedding: status.users_with_embedding,
            feed_strategy: status.feed_strategy.to_string(),
            embedding_model: status.embedding_model,
            provider: status.provider,
            summary_cache_size: status.summary_cache.size,
            storage: status.storage,
        }
    }
}
