//! Feedback records and aggregate interaction metrics

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Interaction flags reported by a client
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackSignals {
    #[serde(default)]
    pub clicked: bool,
    #[serde(default)]
    pub saved: bool,
    #[serde(default)]
    pub rsvp: bool,
    #[serde(default)]
    pub dwell_seconds: u32,
}

impl FeedbackSignals {
    /// Click-only signal
    pub fn click() -> Self {
        Self {
            clicked: true,
            ..Self::default()
        }
    }

    /// Whether any of clicked, saved or rsvp is set
    pub fn is_positive(&self) -> bool {
        self.clicked || self.saved || self.rsvp
    }
}

/// Append-only feedback record. Never modified once written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feedback {
    pub id: String,
    pub user_id: String,
    pub event_id: String,
    #[serde(flatten)]
    pub signals: FeedbackSignals,
    pub created_at: DateTime<Utc>,
}

impl Feedback {
    /// Create a feedback record stamped at `created_at`
    pub fn new(
        user_id: impl Into<String>,
        event_id: impl Into<String>,
        signals: FeedbackSignals,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.into(),
            event_id: event_id.into(),
            signals,
            created_at,
        }
    }

    /// Whether this record should nudge the user profile
    pub fn is_positive(&self) -> bool {
        self.signals.is_positive()
    }
}

/// Interaction counts over a time window
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InteractionMetrics {
    /// Human-readable window label
    pub window: String,
    pub clicks: u64,
    pub saves: u64,
    pub rsvps: u64,
    /// Sum of clicks, saves and rsvps
    pub interactions: u64,
}

impl InteractionMetrics {
    /// Aggregate the given records
    pub fn from_records<'a>(
        window: impl Into<String>,
        records: impl IntoIterator<Item = &'a Feedback>,
    ) -> Self {
        let mut metrics = Self {
            window: window.into(),
            ..Self::default()
        };
        for record in records {
            metrics.clicks += u64::from(record.signals.clicked);
            metrics.saves += u64::from(record.signals.saved);
            metrics.rsvps += u64::from(record.signals.rsvp);
        }
        metrics.interactions = metrics.clicks + metrics.saves + metrics.rsvps;
        metrics
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positive_signals() {
        assert!(!FeedbackSignals::default().is_positive());
        assert!(FeedbackSignals::click().is_positive());
        let dwell_only = FeedbackSignals {
            dwell_seconds: 120,
            ..Default::default()
        };
        assert!(!dwell_only.is_positive());
    }

    #[test]
    fn test_metrics_aggregate() {
        let now = Utc::now();
        let records = vec![
            Feedback::new("u", "e1", FeedbackSignals::click(), now),
            Feedback::new(
                "u",
                "e2",
                FeedbackSignals {
                    clicked: true,
                    saved: true,
                    rsvp: true,
                    dwell_seconds: 0,
                },
                now,
            ),
            Feedback::new("u", "e3", FeedbackSignals::default(), now),
        ];
        let metrics = InteractionMetrics::from_records("last_24h", &records);
        assert_eq!(metrics.clicks, 2);
        assert_eq!(metrics.saves, 1);
        assert_eq!(metrics.rsvps, 1);
        assert_eq!(metrics.interactions, 4);
        assert_eq!(metrics.window, "last_24h");
    }

    #[test]
    fn test_flattened_serialization() {
        let record = Feedback::new("u", "e", FeedbackSignals::click(), Utc::now());
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["clicked"], true);
        assert_eq!(json["dwell_seconds"], 0);
    }
}
