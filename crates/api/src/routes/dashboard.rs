//! Dashboard aggregation endpoints.

use std::sync::Arc;

use application::DashboardData;
use axum::Json;
use axum::extract::{Query, State};
use serde::Deserialize;
use storage::{CropStatistics, ProductiveFarm, Repositories, StateStatistics};

use crate::AppState;
use crate::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct TopFarmsParams {
    pub limit: Option<u32>,
}

/// GET /dashboard — full aggregation payload for the front-end charts.
#[tracing::instrument(skip(state))]
pub async fn summary<R: Repositories>(
    State(state): State<Arc<AppState<R>>>,
) -> Result<Json<DashboardData>, ApiError> {
    let data = state.dashboard.dashboard_data().await?;
    Ok(Json(data))
}

/// GET /dashboard/states — per-state farm statistics.
#[tracing::instrument(skip(state))]
pub async fn states<R: Repositories>(
    State(state): State<Arc<AppState<R>>>,
) -> Result<Json<Vec<StateStatistics>>, ApiError> {
    let stats = state.dashboard.state_statistics().await?;
    Ok(Json(stats))
}

/// GET /dashboard/crops — per-crop-type statistics.
#[tracing::instrument(skip(state))]
pub async fn crops<R: Repositories>(
    State(state): State<Arc<AppState<R>>>,
) -> Result<Json<Vec<CropStatistics>>, ApiError> {
    let stats = state.dashboard.crop_statistics().await?;
    Ok(Json(stats))
}

/// GET /dashboard/top-farms?limit= — most productive farms by
/// agricultural area.
#[tracing::instrument(skip(state))]
pub async fn top_farms<R: Repositories>(
    State(state): State<Arc<AppState<R>>>,
    Query(params): Query<TopFarmsParams>,
) -> Result<Json<Vec<ProductiveFarm>>, ApiError> {
    let farms = state
        .dashboard
        .top_productive_farms(params.limit.unwrap_or(10))
        .await?;
    Ok(Json(farms))
}
