//! Producer CRUD endpoints, including the cascading delete.

use std::sync::Arc;

use application::DeleteOutcome;
use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use common::ProducerId;
use domain::{
    DocumentType, NewProducer, Producer, ProducerPatch, ProducerWithFarms, is_valid_document,
};
use serde::Deserialize;
use storage::{Page, Repositories};

use crate::AppState;
use crate::error::ApiError;
use crate::routes::PageParams;

// -- Request types --

#[derive(Debug, Deserialize)]
pub struct CreateProducerRequest {
    pub name: String,
    pub document: String,
    pub document_type: Option<String>,
}

impl CreateProducerRequest {
    fn validate(&self) -> Result<NewProducer, ApiError> {
        let mut errors = Vec::new();

        check_name(&self.name, &mut errors);
        check_document(&self.document, &mut errors);
        let document_type = parse_document_type(self.document_type.as_deref(), &mut errors);

        if errors.is_empty() {
            Ok(NewProducer {
                name: self.name.clone(),
                document: self.document.clone(),
                document_type,
            })
        } else {
            Err(ApiError::Validation(errors))
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateProducerRequest {
    pub name: Option<String>,
    pub document: Option<String>,
    pub document_type: Option<String>,
}

impl UpdateProducerRequest {
    fn validate(&self) -> Result<ProducerPatch, ApiError> {
        let mut errors = Vec::new();

        if let Some(name) = &self.name {
            check_name(name, &mut errors);
        }
        if let Some(document) = &self.document {
            check_document(document, &mut errors);
        }
        let document_type = parse_document_type(self.document_type.as_deref(), &mut errors);

        if errors.is_empty() {
            Ok(ProducerPatch {
                name: self.name.clone(),
                document: self.document.clone(),
                document_type,
            })
        } else {
            Err(ApiError::Validation(errors))
        }
    }
}

fn check_name(name: &str, errors: &mut Vec<String>) {
    let len = name.chars().count();
    if len == 0 || len > 150 {
        errors.push("O nome deve ter entre 1 e 150 caracteres".to_string());
    }
}

fn check_document(document: &str, errors: &mut Vec<String>) {
    if !is_valid_document(document) {
        errors.push("Documento deve ser um CPF ou CNPJ válido".to_string());
    }
}

fn parse_document_type(raw: Option<&str>, errors: &mut Vec<String>) -> Option<DocumentType> {
    match raw {
        None => None,
        Some(value) => match value.parse::<DocumentType>() {
            Ok(kind) => Some(kind),
            Err(err) => {
                errors.push(err.to_string());
                None
            }
        },
    }
}

// -- Handlers --

/// POST /producers — create a producer.
#[tracing::instrument(skip(state, req))]
pub async fn create<R: Repositories>(
    State(state): State<Arc<AppState<R>>>,
    Json(req): Json<CreateProducerRequest>,
) -> Result<(StatusCode, Json<Producer>), ApiError> {
    let input = req.validate()?;
    let producer = state.producers.create(input).await?;
    Ok((StatusCode::CREATED, Json(producer)))
}

/// GET /producers — paginated listing.
#[tracing::instrument(skip(state))]
pub async fn list<R: Repositories>(
    State(state): State<Arc<AppState<R>>>,
    Query(params): Query<PageParams>,
) -> Result<Json<Page<Producer>>, ApiError> {
    let page = state.producers.list(params.page(), params.limit()).await?;
    Ok(Json(page))
}

/// GET /producers/:id — fetch a producer with its farms.
#[tracing::instrument(skip(state))]
pub async fn get<R: Repositories>(
    State(state): State<Arc<AppState<R>>>,
    Path(id): Path<ProducerId>,
) -> Result<Json<ProducerWithFarms>, ApiError> {
    let producer = state.producers.get_by_id(id).await?;
    Ok(Json(producer))
}

/// PATCH /producers/:id — partial update.
#[tracing::instrument(skip(state, req))]
pub async fn update<R: Repositories>(
    State(state): State<Arc<AppState<R>>>,
    Path(id): Path<ProducerId>,
    Json(req): Json<UpdateProducerRequest>,
) -> Result<Json<Producer>, ApiError> {
    let patch = req.validate()?;
    let producer = state.producers.update(id, patch).await?;
    Ok(Json(producer))
}

/// DELETE /producers/:id — cascading delete of the producer and all its
/// farms and planted crops.
#[tracing::instrument(skip(state))]
pub async fn delete<R: Repositories>(
    State(state): State<Arc<AppState<R>>>,
    Path(id): Path<ProducerId>,
) -> Result<Json<DeleteOutcome>, ApiError> {
    let outcome = state.producers.delete(id).await?;
    Ok(Json(outcome))
}
