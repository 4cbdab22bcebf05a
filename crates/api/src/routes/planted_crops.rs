//! Planted-crop CRUD endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use common::{CropId, FarmId};
use domain::{NewPlantedCrop, PlantedCrop, PlantedCropPatch, PlantedCropWithFarm};
use serde::Deserialize;
use storage::{DeleteResult, Page, Repositories};

use crate::AppState;
use crate::error::ApiError;
use crate::routes::PageParams;

// -- Request types --

#[derive(Debug, Deserialize)]
pub struct CreatePlantedCropRequest {
    pub name: String,
    pub farm_id: FarmId,
}

impl CreatePlantedCropRequest {
    fn validate(&self) -> Result<NewPlantedCrop, ApiError> {
        let mut errors = Vec::new();
        check_name(&self.name, &mut errors);

        if errors.is_empty() {
            Ok(NewPlantedCrop {
                name: self.name.clone(),
                farm_id: self.farm_id,
            })
        } else {
            Err(ApiError::Validation(errors))
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdatePlantedCropRequest {
    pub name: Option<String>,
    pub farm_id: Option<FarmId>,
}

impl UpdatePlantedCropRequest {
    fn validate(&self) -> Result<PlantedCropPatch, ApiError> {
        let mut errors = Vec::new();
        if let Some(name) = &self.name {
            check_name(name, &mut errors);
        }

        if errors.is_empty() {
            Ok(PlantedCropPatch {
                name: self.name.clone(),
                farm_id: self.farm_id,
            })
        } else {
            Err(ApiError::Validation(errors))
        }
    }
}

fn check_name(name: &str, errors: &mut Vec<String>) {
    let len = name.chars().count();
    if len == 0 || len > 100 {
        errors.push("O nome deve ter entre 1 e 100 caracteres".to_string());
    }
}

// -- Handlers --

/// POST /planted-crops — create a planted crop.
#[tracing::instrument(skip(state, req))]
pub async fn create<R: Repositories>(
    State(state): State<Arc<AppState<R>>>,
    Json(req): Json<CreatePlantedCropRequest>,
) -> Result<(StatusCode, Json<PlantedCrop>), ApiError> {
    let input = req.validate()?;
    let crop = state.planted_crops.create(input).await?;
    Ok((StatusCode::CREATED, Json(crop)))
}

/// GET /planted-crops — paginated listing.
#[tracing::instrument(skip(state))]
pub async fn list<R: Repositories>(
    State(state): State<Arc<AppState<R>>>,
    Query(params): Query<PageParams>,
) -> Result<Json<Page<PlantedCrop>>, ApiError> {
    let page = state
        .planted_crops
        .list(params.page(), params.limit())
        .await?;
    Ok(Json(page))
}

/// GET /planted-crops/:id — includes the owning farm.
#[tracing::instrument(skip(state))]
pub async fn get<R: Repositories>(
    State(state): State<Arc<AppState<R>>>,
    Path(id): Path<CropId>,
) -> Result<Json<PlantedCropWithFarm>, ApiError> {
    let crop = state.planted_crops.get_by_id(id).await?;
    Ok(Json(crop))
}

/// PATCH /planted-crops/:id — partial update; includes the owning farm.
#[tracing::instrument(skip(state, req))]
pub async fn update<R: Repositories>(
    State(state): State<Arc<AppState<R>>>,
    Path(id): Path<CropId>,
    Json(req): Json<UpdatePlantedCropRequest>,
) -> Result<Json<PlantedCropWithFarm>, ApiError> {
    let patch = req.validate()?;
    let crop = state.planted_crops.update(id, patch).await?;
    Ok(Json(crop))
}

/// DELETE /planted-crops/:id
#[tracing::instrument(skip(state))]
pub async fn delete<R: Repositories>(
    State(state): State<Arc<AppState<R>>>,
    Path(id): Path<CropId>,
) -> Result<Json<DeleteResult>, ApiError> {
    let result = state.planted_crops.delete(id).await?;
    Ok(Json(result))
}
