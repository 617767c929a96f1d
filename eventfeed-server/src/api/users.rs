//! User profile endpoints

use std::sync::Arc;

use axum::{
    Json as JsonExtractor,
    extract::{Path, State},
    response::Json,
};

use crate::{
    api::dto::{
        BootstrapUserRequest, EventDto, ReplaceInterestsRequest, SaveEventRequest,
        SavedEventResponse, UserDto,
    },
    error::ServerResult,
    state::AppState,
};

/// Create or update a user by email
#[utoipa::path(
    post,
    path = "/users/bootstrap",
    tag = "users",
    request_body = BootstrapUserRequest,
    responses(
        (status = 200, description = "User created or updated", body = UserDto),
        (status = 400, description = "Invalid email"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn bootstrap_user(
    State(state): State<Arc<AppState>>,
    JsonExtractor(request): JsonExtractor<BootstrapUserRequest>,
) -> ServerResult<Json<UserDto>> {
    let user = state
        .recommender
        .bootstrap_user(&request.email, request.display_name, request.interests)
        .await?;

    Ok(Json(UserDto::from(user)))
}

#[utoipa::path(
    get,
    path = "/users/{id}",
    tag = "users",
    params(
        ("id" = String, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "User found", body = UserDto),
        (status = 404, description = "User not found")
    )
)]
pub async fn get_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ServerResult<Json<UserDto>> {
    let user = state.recommender.get_user(&id).await?;
    Ok(Json(UserDto::from(user)))
}

/// Replace a user's interests
///
/// The embedding is left as is; it follows feedback and reindexing.
#[utoipa::path(
    put,
    path = "/users/{id}/interests",
    tag = "users",
    params(
        ("id" = String, Path, description = "User ID")
    ),
    request_body = ReplaceInterestsRequest,
    responses(
        (status = 200, description = "Interests replaced", body = UserDto),
        (status = 404, description = "User not found")
    )
)]
pub async fn replace_interests(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    JsonExtractor(request): JsonExtractor<ReplaceInterestsRequest>,
) -> ServerResult<Json<UserDto>> {
    let user = state
        .recommender
        .replace_interests(&id, request.interests)
        .await?;

    Ok(Json(UserDto::from(user)))
}

/// Bookmark an event for a user
///
/// Saving an already saved event succeeds and changes nothing.
#[utoipa::path(
    post,
    path = "/users/{id}/saved-events",
    tag = "users",
    params(
        ("id" = String, Path, description = "User ID")
    ),
    request_body = SaveEventRequest,
    responses(
        (status = 200, description = "Event saved", body = SavedEventResponse),
        (status = 404, description = "User or event not found")
    )
)]
pub async fn save_event(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    JsonExtractor(request): JsonExtractor<SaveEventRequest>,
) -> ServerResult<Json<SavedEventResponse>> {
    let created = state.recommender.save_event(&id, &request.event_id).await?;
    Ok(Json(SavedEventResponse::saved(created)))
}

#[utoipa::path(
    delete,
    path = "/users/{id}/saved-events/{event_id}",
    tag = "users",
    params(
        ("id" = String, Path, description = "User ID"),
        ("event_id" = String, Path, description = "Event ID")
    ),
    responses(
        (status = 200, description = "Event removed from saved list", body = SavedEventResponse),
        (status = 404, description = "Saved event not found")
    )
)]
pub async fn unsave_event(
    State(state): State<Arc<AppState>>,
    Path((id, event_id)): Path<(String, String)>,
) -> ServerResult<Json<SavedEventResponse>> {
    state.recommender.unsave_event(&id, &event_id).await?;
    Ok(Json(SavedEventResponse::removed()))
}

/// A user's saved events, soonest first
#[utoipa::path(
    get,
    path = "/users/{id}/saved-events",
    tag = "users",
    params(
        ("id" = String, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "Saved events", body = [EventDto]),
        (status = 404, description = "User not found")
    )
)]
pub async fn list_saved_events(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ServerResult<Json<Vec<EventDto>>> {
    let events = state.recommender.saved_events(&id).await?;
    Ok(Json(events.into_iter().map(EventDto::from).collect()))
}
