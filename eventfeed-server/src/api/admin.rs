//! Maintenance endpoints

use std::sync::Arc;

use axum::{extract::State, response::Json};

use crate::{
    api::dto::{MetricsDto, ReindexResponse},
    error::ServerResult,
    state::AppState,
};

/// Backfill missing event and user embeddings
#[utoipa::path(
    post,
    path = "/admin/reindex",
    tag = "admin",
    responses(
        (status = 200, description = "Number of embeddings written", body = ReindexResponse),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn reindex(State(state): State<Arc<AppState>>) -> ServerResult<Json<ReindexResponse>> {
    let report = state.recommender.reindex().await?;

    tracing::info!(
        "Reindex wrote {} event and {} user embeddings",
        report.events,
        report.users
    );

    Ok(Json(ReindexResponse::from(report)))
}

/// Interaction counts over the last 24 hours
#[utoipa::path(
    get,
    path = "/admin/metrics",
    tag = "admin",
    responses(
        (status = 200, description = "Interaction counts", body = MetricsDto),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn metrics(State(state): State<Arc<AppState>>) -> ServerResult<Json<MetricsDto>> {
    let metrics = state.recommender.metrics().await?;
    Ok(Json(MetricsDto::from(metrics)))
}
