//! Farm use cases.

use common::FarmId;
use domain::{Farm, FarmPatch, FarmWithProducer, NewFarm, validate_areas};
use storage::{DeleteResult, FarmRepository, Page, Repositories, Repository};

use crate::Result;
use crate::error::ApplicationError;

/// Farm use cases over any repository provider.
#[derive(Clone)]
pub struct FarmService<R: Repositories> {
    repos: R,
}

impl<R: Repositories> FarmService<R> {
    pub fn new(repos: R) -> Self {
        Self { repos }
    }

    /// Creates a farm after re-checking the area-sum constraint.
    #[tracing::instrument(skip(self, input), fields(farm_name = %input.name, producer_id = %input.producer_id))]
    pub async fn create(&self, input: NewFarm) -> Result<Farm> {
        validate_areas(
            input.total_area,
            input.agricultural_area,
            input.vegetation_area,
        )?;

        let farm = self.repos.farms().create(input).await?;

        metrics::counter!("farms_created_total").increment(1);
        tracing::info!(
            event = "farm_created",
            farm_id = %farm.id,
            producer_id = %farm.producer_id,
            total_area = farm.total_area,
            "farm created"
        );

        Ok(farm)
    }

    #[tracing::instrument(skip(self))]
    pub async fn get_by_id(&self, id: FarmId) -> Result<Farm> {
        self.repos
            .farms()
            .find_one(id)
            .await?
            .ok_or_else(|| ApplicationError::NotFound("Farm not found".to_string()))
    }

    /// Paginated farm listing.
    pub async fn list(&self, page: u32, limit: u32) -> Result<Page<Farm>> {
        Ok(self.repos.farms().paginate(page, limit).await?)
    }

    /// Applies a partial patch and returns the farm with its producer.
    #[tracing::instrument(skip(self, patch))]
    pub async fn update(&self, id: FarmId, patch: FarmPatch) -> Result<FarmWithProducer> {
        validate_areas(patch.total_area, patch.agricultural_area, patch.vegetation_area)?;

        let updated = self.repos.farms().update(id, patch).await?;
        if updated.is_none() {
            return Err(ApplicationError::NotFound("Farm not found".to_string()));
        }

        self.repos
            .farms()
            .find_with_producer(id)
            .await?
            .ok_or_else(|| ApplicationError::NotFound("Farm not found".to_string()))
    }

    /// Hard-deletes a farm; `success` is false when the row was absent.
    #[tracing::instrument(skip(self))]
    pub async fn delete(&self, id: FarmId) -> Result<DeleteResult> {
        let farm = self.repos.farms().find_one(id).await?;
        let result = self.repos.farms().delete(id).await?;

        if result.success {
            tracing::info!(
                event = "farm_deleted",
                farm_id = %id,
                farm_name = farm.as_ref().map(|f| f.name.as_str()).unwrap_or("unknown"),
                "farm deleted"
            );
        }
        Ok(result)
    }
}
