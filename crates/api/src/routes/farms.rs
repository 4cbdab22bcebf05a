//! Farm CRUD endpoints with area validation.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use common::{FarmId, ProducerId};
use domain::{Farm, FarmPatch, FarmWithProducer, NewFarm};
use serde::Deserialize;
use storage::{DeleteResult, Page, Repositories};

use crate::AppState;
use crate::error::ApiError;
use crate::routes::PageParams;

// -- Request types --

#[derive(Debug, Deserialize)]
pub struct CreateFarmRequest {
    pub name: String,
    pub producer_id: ProducerId,
    pub city: String,
    pub state: String,
    pub total_area: Option<f64>,
    pub agricultural_area: Option<f64>,
    pub vegetation_area: Option<f64>,
}

impl CreateFarmRequest {
    fn validate(&self) -> Result<NewFarm, ApiError> {
        let mut errors = Vec::new();

        check_length(&self.name, 3, 150, "O nome", &mut errors);
        check_length(&self.city, 1, 100, "A cidade", &mut errors);
        check_length(&self.state, 3, 50, "O estado", &mut errors);
        check_areas(
            self.total_area,
            self.agricultural_area,
            self.vegetation_area,
            &mut errors,
        );

        if errors.is_empty() {
            Ok(NewFarm {
                name: self.name.clone(),
                producer_id: self.producer_id,
                city: self.city.clone(),
                state: self.state.clone(),
                total_area: self.total_area,
                agricultural_area: self.agricultural_area,
                vegetation_area: self.vegetation_area,
            })
        } else {
            Err(ApiError::Validation(errors))
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateFarmRequest {
    pub name: Option<String>,
    pub producer_id: Option<ProducerId>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub total_area: Option<f64>,
    pub agricultural_area: Option<f64>,
    pub vegetation_area: Option<f64>,
}

impl UpdateFarmRequest {
    fn validate(&self) -> Result<FarmPatch, ApiError> {
        let mut errors = Vec::new();

        if let Some(name) = &self.name {
            check_length(name, 3, 150, "O nome", &mut errors);
        }
        if let Some(city) = &self.city {
            check_length(city, 1, 100, "A cidade", &mut errors);
        }
        if let Some(state) = &self.state {
            check_length(state, 3, 50, "O estado", &mut errors);
        }
        check_areas(
            self.total_area,
            self.agricultural_area,
            self.vegetation_area,
            &mut errors,
        );

        if errors.is_empty() {
            Ok(FarmPatch {
                name: self.name.clone(),
                producer_id: self.producer_id,
                city: self.city.clone(),
                state: self.state.clone(),
                total_area: self.total_area,
                agricultural_area: self.agricultural_area,
                vegetation_area: self.vegetation_area,
            })
        } else {
            Err(ApiError::Validation(errors))
        }
    }
}

fn check_length(value: &str, min: usize, max: usize, label: &str, errors: &mut Vec<String>) {
    let len = value.chars().count();
    if len < min || len > max {
        errors.push(format!("{label} deve ter entre {min} e {max} caracteres"));
    }
}

fn check_areas(
    total: Option<f64>,
    agricultural: Option<f64>,
    vegetation: Option<f64>,
    errors: &mut Vec<String>,
) {
    if total.is_some_and(|a| a < 0.0) {
        errors.push("A área total deve ser um valor positivo".to_string());
    }
    if agricultural.is_some_and(|a| a < 0.0) {
        errors.push("A área agricultável deve ser um valor positivo".to_string());
    }
    if vegetation.is_some_and(|a| a < 0.0) {
        errors.push("A área de vegetação deve ser um valor positivo".to_string());
    }

    if let Some(total) = total {
        let sum = agricultural.unwrap_or(0.0) + vegetation.unwrap_or(0.0);
        if total > 0.0 && sum > total {
            errors.push(
                "A soma da área agricultável e área de vegetação não pode ultrapassar a área total"
                    .to_string(),
            );
        }
    }
}

// -- Handlers --

/// POST /farms — create a farm; the area constraint is enforced here and
/// again in the service layer.
#[tracing::instrument(skip(state, req))]
pub async fn create<R: Repositories>(
    State(state): State<Arc<AppState<R>>>,
    Json(req): Json<CreateFarmRequest>,
) -> Result<(StatusCode, Json<Farm>), ApiError> {
    let input = req.validate()?;
    let farm = state.farms.create(input).await?;
    Ok((StatusCode::CREATED, Json(farm)))
}

/// GET /farms — paginated listing.
#[tracing::instrument(skip(state))]
pub async fn list<R: Repositories>(
    State(state): State<Arc<AppState<R>>>,
    Query(params): Query<PageParams>,
) -> Result<Json<Page<Farm>>, ApiError> {
    let page = state.farms.list(params.page(), params.limit()).await?;
    Ok(Json(page))
}

/// GET /farms/:id
#[tracing::instrument(skip(state))]
pub async fn get<R: Repositories>(
    State(state): State<Arc<AppState<R>>>,
    Path(id): Path<FarmId>,
) -> Result<Json<Farm>, ApiError> {
    let farm = state.farms.get_by_id(id).await?;
    Ok(Json(farm))
}

/// PATCH /farms/:id — partial update; returns the farm with its producer.
#[tracing::instrument(skip(state, req))]
pub async fn update<R: Repositories>(
    State(state): State<Arc<AppState<R>>>,
    Path(id): Path<FarmId>,
    Json(req): Json<UpdateFarmRequest>,
) -> Result<Json<FarmWithProducer>, ApiError> {
    let patch = req.validate()?;
    let farm = state.farms.update(id, patch).await?;
    Ok(Json(farm))
}

/// DELETE /farms/:id
#[tracing::instrument(skip(state))]
pub async fn delete<R: Repositories>(
    State(state): State<Arc<AppState<R>>>,
    Path(id): Path<FarmId>,
) -> Result<Json<DeleteResult>, ApiError> {
    let result = state.farms.delete(id).await?;
    Ok(Json(result))
}
