//! HTTP API for the eventfeed server

use std::sync::Arc;

use axum::{
    Router,
    extract::State,
    response::Json,
    routing::{delete, get, post, put},
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{error::ServerResult, state::AppState};

pub mod admin;
pub mod dto;
pub mod events;
pub mod feedback;
pub mod users;


use dto::HealthDto;

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        events::get_feed,
        events::search_events,
        events::get_event,
        events::get_similar_events,
        events::create_event,
        feedback::record_feedback,
        users::bootstrap_user,
        users::get_user,
        users::replace_interests,
        users::save_event,
        users::unsave_event,
        users::list_saved_events,
        admin::reindex,
        admin::metrics,
        health_check,
    ),
    components(
        schemas(
            dto::RankedEventDto,
            dto::EventDto,
            dto::CreateEventRequest,
            dto::UserDto,
            dto::BootstrapUserRequest,
            dto::ReplaceInterestsRequest,
            dto::SaveEventRequest,
            dto::SavedEventResponse,
            dto::FeedbackRequest,
            dto::ReindexResponse,
            dto::MetricsDto,
            dto::HealthDto,
            dto::ErrorResponse,
        )
    ),
    tags(
        (name = "events", description = "Feed, search, similar events and the event catalog"),
        (name = "feedback", description = "Interaction reports"),
        (name = "users", description = "User profiles, interests and saved events"),
        (name = "admin", description = "Embedding backfill and interaction metrics"),
        (name = "health", description = "Service health"),
    ),
    info(
        title = "Eventfeed Recommendation API",
        version = "1.0.0",
        description = "Personalized ranking of upcoming events by interest overlap, recency and embedding similarity.",
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    )
)]
pub struct ApiDoc;

/// Create the main router with all API endpoints
pub fn create_router(state: Arc<AppState>) -> Router {
    let api_router = Router::new()
        // Event endpoints
        .route("/events", post(events::create_event))
        .route("/events/feed", get(events::get_feed))
        .route("/events/search", get(events::search_events))
        .route("/events/{id}", get(events::get_event))
        .route("/events/{id}/similar", get(events::get_similar_events))
        // Feedback
        .route("/feedback", post(feedback::record_feedback))
        // User endpoints
        .route("/users/bootstrap", post(users::bootstrap_user))
        .route("/users/{id}", get(users::get_user))
        .route("/users/{id}/interests", put(users::replace_interests))
        .route(
            "/users/{id}/saved-events",
            post(users::save_event).get(users::list_saved_events),
        )
        .route(
            "/users/{id}/saved-events/{event_id}",
            delete(users::unsave_event),
        )
        // Maintenance
        .route("/admin/reindex", post(admin::reindex))
        .route("/admin/metrics", get(admin::metrics))
        .route("/health", get(health_check))
        .with_state(state);

    let swagger_router = SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi());

    api_router.merge(swagger_router)
}

/// Health check with catalog counts
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Service health and catalog counts", body = HealthDto),
        (status = 500, description = "Storage unavailable")
    )
)]
async fn health_check(State(state): State<Arc<AppState>>) -> ServerResult<Json<HealthDto>> {
    let status = state.recommender.status().await?;
    Ok(Json(HealthDto::from(status)))
}
