//! Interaction feedback endpoint

use std::sync::Arc;

use axum::{Json as JsonExtractor, extract::State, http::StatusCode};

use crate::{api::dto::FeedbackRequest, error::ServerResult, state::AppState};

/// Record a click, save, RSVP or dwell report
///
/// Positive signals move the user's profile toward the event. The response
/// body is empty.
#[utoipa::path(
    post,
    path = "/feedback",
    tag = "feedback",
    request_body = FeedbackRequest,
    responses(
        (status = 204, description = "Feedback recorded"),
        (status = 404, description = "Unknown user or event"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn record_feedback(
    State(state): State<Arc<AppState>>,
    JsonExtractor(request): JsonExtractor<FeedbackRequest>,
) -> ServerResult<StatusCode> {
    let outcome = state
        .recommender
        .record_feedback(&request.user_id, &request.event_id, request.signals())
        .await?;

    tracing::debug!(
        "Recorded feedback {} (profile updated: {})",
        outcome.feedback_id,
        outcome.profile_updated
    );

    Ok(StatusCode::NO_CONTENT)
}
