//! Planted-crop use cases.

use common::CropId;
use domain::{NewPlantedCrop, PlantedCrop, PlantedCropPatch, PlantedCropWithFarm};
use storage::{DeleteResult, Page, PlantedCropRepository, Repositories, Repository};

use crate::Result;
use crate::error::ApplicationError;

fn not_found(id: CropId) -> ApplicationError {
    ApplicationError::NotFound(format!("Planted Crop with ID {id} not found"))
}

/// Planted-crop use cases over any repository provider.
#[derive(Clone)]
pub struct PlantedCropService<R: Repositories> {
    repos: R,
}

impl<R: Repositories> PlantedCropService<R> {
    pub fn new(repos: R) -> Self {
        Self { repos }
    }

    #[tracing::instrument(skip(self, input), fields(crop_name = %input.name, farm_id = %input.farm_id))]
    pub async fn create(&self, input: NewPlantedCrop) -> Result<PlantedCrop> {
        let crop = self.repos.planted_crops().create(input).await?;

        metrics::counter!("planted_crops_created_total").increment(1);
        tracing::info!(
            event = "planted_crop_created",
            crop_id = %crop.id,
            farm_id = %crop.farm_id,
            "planted crop created"
        );

        Ok(crop)
    }

    /// Fetches a crop with its owning farm eagerly loaded.
    #[tracing::instrument(skip(self))]
    pub async fn get_by_id(&self, id: CropId) -> Result<PlantedCropWithFarm> {
        self.repos
            .planted_crops()
            .find_with_farm(id)
            .await?
            .ok_or_else(|| not_found(id))
    }

    /// Paginated crop listing.
    pub async fn list(&self, page: u32, limit: u32) -> Result<Page<PlantedCrop>> {
        Ok(self.repos.planted_crops().paginate(page, limit).await?)
    }

    /// Applies a partial patch and returns the crop with its farm.
    #[tracing::instrument(skip(self, patch))]
    pub async fn update(&self, id: CropId, patch: PlantedCropPatch) -> Result<PlantedCropWithFarm> {
        let updated = self.repos.planted_crops().update(id, patch).await?;
        if updated.is_none() {
            return Err(not_found(id));
        }

        self.repos
            .planted_crops()
            .find_with_farm(id)
            .await?
            .ok_or_else(|| not_found(id))
    }

    /// Hard-deletes a crop; `success` is false when the row was absent.
    #[tracing::instrument(skip(self))]
    pub async fn delete(&self, id: CropId) -> Result<DeleteResult> {
        let result = self.repos.planted_crops().delete(id).await?;
        if result.success {
            tracing::info!(event = "planted_crop_deleted", crop_id = %id, "planted crop deleted");
        }
        Ok(result)
    }
}
