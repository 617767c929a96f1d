//! Event ranking and catalog endpoints

use std::sync::Arc;

use axum::{
    Json as JsonExtractor,
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};

use crate::{
    api::dto::{
        CreateEventRequest, EventDto, FeedParams, RankedEventDto, SearchParams, SimilarParams,
    },
    error::{ServerError, ServerResult},
    state::AppState,
};

/// Personalized feed of upcoming events
#[utoipa::path(
    get,
    path = "/events/feed",
    tag = "events",
    params(FeedParams),
    responses(
        (status = 200, description = "Ranked upcoming events", body = Vec<RankedEventDto>),
        (status = 400, description = "Limit out of range"),
        (status = 404, description = "Unknown user"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn get_feed(
    State(state): State<Arc<AppState>>,
    Query(params): Query<FeedParams>,
) -> ServerResult<Json<Vec<RankedEventDto>>> {
    let limit = state.page_limit(params.limit)?;
    let ranked = state
        .recommender
        .feed(params.user_id.as_deref(), limit)
        .await?;

    Ok(Json(ranked.into_iter().map(RankedEventDto::from).collect()))
}

/// Keyword search over upcoming events
#[utoipa::path(
    get,
    path = "/events/search",
    tag = "events",
    params(SearchParams),
    responses(
        (status = 200, description = "Matching events, soonest first", body = Vec<RankedEventDto>),
        (status = 400, description = "Empty query or limit out of range"),
        (status = 404, description = "Unknown user"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn search_events(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> ServerResult<Json<Vec<RankedEventDto>>> {
    let limit = state.page_limit(params.limit)?;
    let results = state
        .recommender
        .search(&params.q, params.user_id.as_deref(), limit)
        .await?;

    Ok(Json(results.into_iter().map(RankedEventDto::from).collect()))
}

/// Event detail
#[utoipa::path(
    get,
    path = "/events/{id}",
    tag = "events",
    params(
        ("id" = String, Path, description = "Event ID")
    ),
    responses(
        (status = 200, description = "Event found", body = EventDto),
        (status = 404, description = "Event not found"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn get_event(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ServerResult<Json<EventDto>> {
    let event = state.recommender.get_event(&id).await?;
    Ok(Json(EventDto::from(event)))
}

/// Upcoming events similar to the given one
#[utoipa::path(
    get,
    path = "/events/{id}/similar",
    tag = "events",
    params(
        ("id" = String, Path, description = "Event ID"),
        SimilarParams
    ),
    responses(
        (status = 200, description = "Similar upcoming events", body = Vec<RankedEventDto>),
        (status = 400, description = "Limit out of range"),
        (status = 404, description = "Event not found"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn get_similar_events(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(params): Query<SimilarParams>,
) -> ServerResult<Json<Vec<RankedEventDto>>> {
    let limit = state.similar_limit(params.limit)?;
    let similar = state.recommender.similar(&id, limit).await?;

    Ok(Json(similar.into_iter().map(RankedEventDto::from).collect()))
}

/// Add an event to the catalog
#[utoipa::path(
    post,
    path = "/events",
    tag = "events",
    request_body = CreateEventRequest,
    responses(
        (status = 201, description = "Event created", body = EventDto),
        (status = 400, description = "Invalid event"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn create_event(
    State(state): State<Arc<AppState>>,
    JsonExtractor(request): JsonExtractor<CreateEventRequest>,
) -> Result<(StatusCode, Json<EventDto>), ServerError> {
    let created = state.recommender.create_event(request.into_event()).await?;

    tracing::debug!("Created event {} ({} tags)", created.id, created.tags.len());

    Ok((StatusCode::CREATED, Json(EventDto::from(created))))
}
