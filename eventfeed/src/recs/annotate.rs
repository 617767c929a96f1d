//! Summary and explanation annotation for ranked events

use futures::future::join_all;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::models::Event;
use crate::provider::local::truncate_words;
use crate::provider::{
    capitalize_first, ExplanationProvider, ExplanationRequest, SummaryCache, GENERIC_REASON,
};

use super::RankedEvent;

/// Attaches a summary and a "why recommended" line to each scored event.
///
/// Provider failures and timeouts never fail the request: summaries fall
/// back to the truncated raw text and explanations to the generic reason.
#[derive(Debug, Clone)]
pub struct Annotator {
    provider: Arc<dyn ExplanationProvider>,
    cache: SummaryCache,
    max_words: usize,
    timeout: Duration,
}

impl Annotator {
    pub fn new(
        provider: Arc<dyn ExplanationProvider>,
        cache: SummaryCache,
        max_words: usize,
        timeout: Duration,
    ) -> Self {
        Self {
            provider,
            cache,
            max_words,
            timeout,
        }
    }

    /// Shared summary cache
    pub fn cache(&self) -> &SummaryCache {
        &self.cache
    }

    /// Annotate scored events, preserving their order
    pub async fn annotate(&self, scored: Vec<(Event, f64)>, interests: &[String]) -> Vec<RankedEvent> {
        join_all(
            scored
                .into_iter()
                .map(|(event, score)| self.annotate_one(event, score, interests)),
        )
        .await
    }

    async fn annotate_one(&self, event: Event, score: f64, interests: &[String]) -> RankedEvent {
        let (summary, explanation) =
            futures::join!(self.summary(&event), self.explanation(&event, interests));
        RankedEvent::new(event, score, summary, explanation)
    }

    /// Cached summary for an event.
    ///
    /// Only provider output is cached; fallback text is recomputed.
    pub async fn summary(&self, event: &Event) -> String {
        let key = event.summary_cache_key();
        if let Some(summary) = self.cache.get(&key).await {
            return summary;
        }

        let source = event.summary_source();
        match tokio::time::timeout(self.timeout, self.provider.summarize(&source, self.max_words))
            .await
        {
            Ok(Ok(summary)) => {
                self.cache.put(key, summary.clone()).await;
                summary
            }
            Ok(Err(e)) => {
                warn!("Summary for event {} failed: {}", event.id, e);
                truncate_words(&source, self.max_words)
            }
            Err(_) => {
                warn!("Summary for event {} timed out", event.id);
                truncate_words(&source, self.max_words)
            }
        }
    }

    /// Explanation of why an event matches the given interests
    pub async fn explanation(&self, event: &Event, interests: &[String]) -> String {
        let request = ExplanationRequest {
            interests: interests.to_vec(),
            title: event.title.clone(),
            description: event.description.clone(),
            tags: event.tags.clone(),
            is_free: event.is_free(),
        };

        match tokio::time::timeout(self.timeout, self.provider.explain(&request)).await {
            Ok(Ok(explanation)) if !explanation.trim().is_empty() => explanation,
            Ok(Ok(_)) => {
                debug!("Empty explanation for event {}", event.id);
                capitalize_first(GENERIC_REASON)
            }
            Ok(Err(e)) => {
                warn!("Explanation for event {} failed: {}", event.id, e);
                capitalize_first(GENERIC_REASON)
            }
            Err(_) => {
                warn!("Explanation for event {} timed out", event.id);
                capitalize_first(GENERIC_REASON)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EventBuilder;
    use crate::provider::{LocalProvider, MockExplanationProvider, ProviderError};
    use chrono::Utc;

    fn event() -> Event {
        EventBuilder::new("Rust meetup", Utc::now())
            .id("e1")
            .description("Talks about async Rust. Pizza afterwards.")
            .tag("technology")
            .build()
    }

    fn annotator(provider: Arc<dyn ExplanationProvider>) -> Annotator {
        Annotator::new(provider, SummaryCache::new(16), 22, Duration::from_millis(500))
    }

    #[tokio::test]
    async fn test_summary_is_cached() {
        let mut provider = MockExplanationProvider::new();
        provider
            .expect_summarize()
            .times(1)
            .returning(|_, _| Ok("Rust meetup.".to_string()));

        let annotator = annotator(Arc::new(provider));
        let e = event();
        assert_eq!(annotator.summary(&e).await, "Rust meetup.");
        assert_eq!(annotator.summary(&e).await, "Rust meetup.");

        let stats = annotator.cache().stats().await;
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.size, 1);
    }

    #[tokio::test]
    async fn test_provider_failures_fall_back() {
        let mut provider = MockExplanationProvider::new();
        provider
            .expect_summarize()
            .returning(|_, _| Err(ProviderError::Unavailable("down".to_string())));
        provider
            .expect_explain()
            .returning(|_| Err(ProviderError::Unavailable("down".to_string())));

        let annotator = annotator(Arc::new(provider));
        let e = event();
        let summary = annotator.summary(&e).await;
        assert!(summary.starts_with("Rust meetup. Talks about async Rust."));
        assert_eq!(
            annotator.explanation(&e, &["rust".to_string()]).await,
            "Popular and coming up soon"
        );
        assert_eq!(annotator.cache().stats().await.size, 0);
    }

    #[tokio::test]
    async fn test_annotate_preserves_order_and_rounds() {
        let annotator = annotator(Arc::new(LocalProvider::new()));
        let now = Utc::now();
        let scored = vec![
            (Event::new("second", now), 2.1234567),
            (Event::new("first", now), 1.0),
        ];
        let ranked = annotator.annotate(scored, &[]).await;
        assert_eq!(ranked[0].title, "second");
        assert_eq!(ranked[0].score, 2.123457);
        assert_eq!(ranked[1].title, "first");
        assert!(!ranked[1].explanation.is_empty());
    }
}
