//! End-to-end ranking scenarios through the `Recommender` facade

use chrono::{DateTime, Duration, TimeZone, Utc};
use eventfeed::ml::{cosine_similarity, normalize, EMBEDDING_DIM};
use eventfeed::prelude::*;

fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 2, 12, 0, 0).unwrap()
}

async fn recommender(strategy: FeedStrategy) -> Recommender {
    let config = ConfigBuilder::new()
        .with_memory_storage()
        .with_feed_strategy(strategy)
        .build()
        .expect("valid config");
    Recommender::from_config(config)
        .await
        .expect("recommender should initialize")
}

fn vector(values: &[(usize, f32)]) -> Vec<f32> {
    let mut v = vec![0.0; EMBEDDING_DIM];
    for (i, x) in values {
        v[*i] = *x;
    }
    v
}

#[tokio::test]
async fn test_lexical_feed_scores_title_hit_plus_recency() {
    let rec = recommender(FeedStrategy::Lexical).await;
    let now = fixed_now();

    rec.create_event(
        EventBuilder::new("AI Workshop", now + Duration::days(2))
            .id("ai")
            .tag("technology")
            .build(),
    )
    .await
    .unwrap();

    let user = rec
        .bootstrap_user(
            "ai@example.com",
            None,
            vec!["ai".to_string(), "music".to_string()],
        )
        .await
        .unwrap();

    let feed = rec.feed_at(Some(&user.id), 20, now).await.unwrap();
    assert_eq!(feed.len(), 1);

    let expected = 1.0 + 2.0 * (-2.0f64 / 7.0).exp();
    assert!((feed[0].score - expected).abs() < 1e-5, "score {}", feed[0].score);
    assert!((feed[0].score - 2.5).abs() < 0.02);
    assert!(!feed[0].summary.is_empty());
    assert!(feed[0].explanation.starts_with("Matches your interests"));
}

#[tokio::test]
async fn test_similar_for_zero_embedding_is_soonest_first() {
    let rec = recommender(FeedStrategy::Auto).await;
    let now = fixed_now();

    rec.create_event(
        EventBuilder::new("Base", now + Duration::days(1))
            .id("base")
            .tag("social")
            .embedding(vec![0.0; EMBEDDING_DIM])
            .build(),
    )
    .await
    .unwrap();
    for (id, days, axis) in [("third", 9, 2), ("first", 2, 0), ("second", 5, 1)] {
        rec.create_event(
            EventBuilder::new(id, now + Duration::days(days))
                .id(id)
                .tag("social")
                .embedding(vector(&[(axis, 1.0)]))
                .build(),
        )
        .await
        .unwrap();
    }

    let similar = rec.similar_at("base", 10, now).await.unwrap();
    let ids: Vec<_> = similar.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["first", "second", "third"]);
    assert!(similar.iter().all(|r| r.score == 0.0));
}

#[tokio::test]
async fn test_first_click_sets_profile_to_event_vector() {
    let rec = recommender(FeedStrategy::Auto).await;
    let now = fixed_now();

    let raw = vector(&[(0, 3.0), (1, 4.0)]);
    rec.create_event(
        EventBuilder::new("Gallery opening", now + Duration::days(3))
            .id("gallery")
            .tag("arts")
            .embedding(raw.clone())
            .build(),
    )
    .await
    .unwrap();

    let user = rec
        .bootstrap_user("new@example.com", None, vec![])
        .await
        .unwrap();
    assert!(user.embedding.is_none());

    let outcome = rec
        .record_feedback_at(&user.id, "gallery", FeedbackSignals::click(), now)
        .await
        .unwrap();
    assert!(outcome.profile_updated);

    let updated = rec.get_user(&user.id).await.unwrap();
    let embedding = updated.embedding.expect("embedding set by feedback");
    let expected = normalize(&raw);
    for (a, b) in embedding.iter().zip(expected.iter()) {
        assert!((a - b).abs() < 1e-6);
    }
    assert!((embedding[0] - 0.6).abs() < 1e-6);
    assert!((embedding[1] - 0.8).abs() < 1e-6);
}

#[tokio::test]
async fn test_search_without_matches_is_empty() {
    let rec = recommender(FeedStrategy::Auto).await;
    let now = fixed_now();
    rec.create_event(
        EventBuilder::new("Board games", now + Duration::days(1))
            .tag("social")
            .build(),
    )
    .await
    .unwrap();

    let results = rec.search_at("underwater basket", None, 20, now).await.unwrap();
    assert!(results.is_empty());

    let results = rec.search_at("BOARD", None, 20, now).await.unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].score, 0.0);
}

#[tokio::test]
async fn test_similar_without_embedding_blends_jaccard() {
    let rec = recommender(FeedStrategy::Auto).await;
    let now = fixed_now();

    let events = [
        ("base", "alpha beta", vec!["music", "jazz"], 1),
        ("event1", "alpha gamma delta epsilon", vec!["music"], 2),
        ("event2", "zeta", vec!["sports"], 3),
        ("event3", "theta", vec!["music", "jazz"], 4),
    ];
    for (id, title, tags, days) in events {
        rec.create_event(
            EventBuilder::new(title, now + Duration::days(days))
                .id(id)
                .tags(tags)
                .build(),
        )
        .await
        .unwrap();
    }

    let similar = rec.similar_at("base", 10, now).await.unwrap();
    let ranked: Vec<_> = similar.iter().map(|r| (r.id.as_str(), r.score)).collect();
    assert_eq!(
        ranked,
        vec![("event3", 0.4), ("event1", 0.32), ("event2", 0.0)]
    );
}

#[tokio::test]
async fn test_feed_is_deterministic_for_fixed_now() {
    let rec = recommender(FeedStrategy::Auto).await;
    let now = fixed_now();

    for (i, title) in ["Jazz brunch", "Rust meetup", "Jazz and Rust", "Chess club"]
        .iter()
        .enumerate()
    {
        rec.create_event(
            EventBuilder::new(*title, now + Duration::hours(12 * (i as i64 + 1)))
                .tag("social")
                .build(),
        )
        .await
        .unwrap();
    }
    let user = rec
        .bootstrap_user("d@example.com", None, vec!["jazz".to_string()])
        .await
        .unwrap();
    rec.reindex().await.unwrap();

    let first = rec.feed_at(Some(&user.id), 10, now).await.unwrap();
    let second = rec.feed_at(Some(&user.id), 10, now).await.unwrap();
    assert_eq!(first, second);
    assert_eq!(first.len(), 4);
    assert!(first.windows(2).all(|w| w[0].score >= w[1].score));
}

#[tokio::test]
async fn test_positive_feedback_moves_profile_toward_event() {
    let rec = recommender(FeedStrategy::Auto).await;
    let now = fixed_now();

    let event_vec = vector(&[(7, 1.0)]);
    rec.create_event(
        EventBuilder::new("Pottery", now + Duration::days(1))
            .id("pottery")
            .tag("arts")
            .embedding(event_vec.clone())
            .build(),
    )
    .await
    .unwrap();
    let user = rec
        .bootstrap_user("p@example.com", None, vec!["robotics".to_string()])
        .await
        .unwrap();
    let before = user.embedding.clone().unwrap();

    let signals = FeedbackSignals {
        saved: true,
        ..FeedbackSignals::default()
    };
    rec.record_feedback_at(&user.id, "pottery", signals, now)
        .await
        .unwrap();
    let after = rec.get_user(&user.id).await.unwrap().embedding.unwrap();

    assert!(cosine_similarity(&after, &event_vec) >= cosine_similarity(&before, &event_vec));
    let norm: f32 = after.iter().map(|x| x * x).sum::<f32>().sqrt();
    assert!((norm - 1.0).abs() < 1e-5);
}

#[tokio::test]
async fn test_feedback_requires_known_user_and_event() {
    let rec = recommender(FeedStrategy::Auto).await;
    let now = fixed_now();
    rec.create_event(EventBuilder::new("Talk", now + Duration::days(1)).id("talk").tag("career").build())
        .await
        .unwrap();

    let err = rec
        .record_feedback_at("ghost", "talk", FeedbackSignals::click(), now)
        .await
        .unwrap_err();
    assert!(matches!(err, EventFeedError::UserNotFound(_)));

    let metrics = rec.metrics_at(now).await.unwrap();
    assert_eq!(metrics.interactions, 0);
    assert_eq!(metrics.window, "last_24h");
}

#[tokio::test]
async fn test_metrics_cover_last_day() {
    let rec = recommender(FeedStrategy::Auto).await;
    let now = fixed_now();
    rec.create_event(EventBuilder::new("Run club", now + Duration::days(1)).id("run").tag("sports").build())
        .await
        .unwrap();
    let user = rec.bootstrap_user("m@example.com", None, vec![]).await.unwrap();

    let old = FeedbackSignals {
        rsvp: true,
        ..FeedbackSignals::default()
    };
    rec.record_feedback_at(&user.id, "run", old, now - Duration::hours(30))
        .await
        .unwrap();
    rec.record_feedback_at(&user.id, "run", FeedbackSignals::click(), now - Duration::hours(1))
        .await
        .unwrap();

    let metrics = rec.metrics_at(now).await.unwrap();
    assert_eq!(metrics.clicks, 1);
    assert_eq!(metrics.rsvps, 0);
    assert_eq!(metrics.interactions, 1);
}

#[tokio::test]
async fn test_unknown_viewer_is_rejected() {
    let rec = recommender(FeedStrategy::Auto).await;
    let err = rec.feed(Some("nobody"), 10).await.unwrap_err();
    assert!(err.is_not_found());
    assert!(rec.feed(None, 10).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_reindex_enables_vector_feed() {
    let rec = recommender(FeedStrategy::Auto).await;
    let now = fixed_now();

    rec.create_event(
        EventBuilder::new("Jazz quartet live", now + Duration::days(6))
            .id("jazz")
            .description("An evening of jazz standards")
            .tag("music")
            .build(),
    )
    .await
    .unwrap();
    rec.create_event(
        EventBuilder::new("Tax filing clinic", now + Duration::days(1))
            .id("tax")
            .tag("career")
            .build(),
    )
    .await
    .unwrap();
    let user = rec
        .bootstrap_user("j@example.com", None, vec!["jazz".to_string()])
        .await
        .unwrap();

    let report = rec.reindex().await.unwrap();
    assert_eq!(report, ReindexReport { events: 2, users: 0 });

    let feed = rec.feed_at(Some(&user.id), 2, now).await.unwrap();
    assert_eq!(feed[0].id, "jazz");
}
