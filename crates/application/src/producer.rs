//! Producer use cases, including the cascading delete.

use std::time::Instant;

use common::{FarmId, ProducerId};
use domain::{
    DocumentType, FarmWithCrops, NewProducer, Producer, ProducerPatch, ProducerWithFarms,
    mask_document,
};
use serde::Serialize;
use storage::{DeleteResult, FarmRepository, Page, ProducerRepository, Repositories, Repository};

use crate::Result;
use crate::error::ApplicationError;

/// Counts and scope of a completed (or planned) cascade deletion.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletionStats {
    pub producer: u64,
    pub farms: u64,
    pub planted_crops: u64,
    pub total_entities: u64,
    pub farm_ids: Vec<FarmId>,
    pub total_farm_area: f64,
}

impl DeletionStats {
    fn from_farms(farms: &[FarmWithCrops]) -> Self {
        let planted_crops: u64 = farms.iter().map(|f| f.planted_crops.len() as u64).sum();
        Self {
            producer: 1,
            farms: farms.len() as u64,
            planted_crops,
            total_entities: 1 + farms.len() as u64 + planted_crops,
            farm_ids: farms.iter().map(|f| f.farm.id).collect(),
            total_farm_area: farms.iter().map(|f| f.farm.total_area).sum(),
        }
    }
}

/// Reply payload of a successful cascading delete.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteOutcome {
    pub success: bool,
    pub message: String,
    pub deleted_entities: DeletionStats,
    /// Wall-clock duration of the whole operation in milliseconds.
    pub duration: u64,
}

/// Producer use cases over any repository provider.
#[derive(Clone)]
pub struct ProducerService<R: Repositories> {
    repos: R,
}

impl<R: Repositories> ProducerService<R> {
    pub fn new(repos: R) -> Self {
        Self { repos }
    }

    /// Creates a producer, inferring the document type from the document
    /// length when the client did not supply one.
    #[tracing::instrument(skip(self, input), fields(producer_name = %input.name))]
    pub async fn create(&self, input: NewProducer) -> Result<Producer> {
        let document_type = input
            .document_type
            .unwrap_or_else(|| DocumentType::infer(&input.document));

        tracing::debug!(
            document = %mask_document(&input.document),
            %document_type,
            "document type determined"
        );

        let producer = self
            .repos
            .producers()
            .create(NewProducer {
                document_type: Some(document_type),
                ..input
            })
            .await?;

        metrics::counter!("producers_created_total").increment(1);
        tracing::info!(
            event = "producer_created",
            producer_id = %producer.id,
            document = %mask_document(&producer.document),
            %document_type,
            "producer created"
        );

        Ok(producer)
    }

    /// Fetches a producer with its farms eagerly loaded.
    #[tracing::instrument(skip(self))]
    pub async fn get_by_id(&self, id: ProducerId) -> Result<ProducerWithFarms> {
        self.repos
            .producers()
            .find_with_farms(id)
            .await?
            .ok_or_else(|| ApplicationError::NotFound(format!("Producer with ID {id} not found")))
    }

    /// Paginated producer listing.
    pub async fn list(&self, page: u32, limit: u32) -> Result<Page<Producer>> {
        Ok(self.repos.producers().paginate(page, limit).await?)
    }

    /// Applies a partial patch and returns the updated producer.
    #[tracing::instrument(skip(self, patch))]
    pub async fn update(&self, id: ProducerId, patch: ProducerPatch) -> Result<Producer> {
        self.repos
            .producers()
            .update(id, patch)
            .await?
            .ok_or_else(|| ApplicationError::NotFound(format!("Producer with ID {id} not found")))
    }

    /// Deletes a producer together with all its farms and planted crops.
    ///
    /// The cascade runs leaf-to-root (crops, then farms, then the
    /// producer), one row at a time, without a surrounding transaction. A
    /// failure partway leaves the already-deleted dependents gone; when
    /// the final producer delete reports no affected row the operation
    /// fails with [`ApplicationError::CascadeIncomplete`].
    #[tracing::instrument(skip(self))]
    pub async fn delete(&self, id: ProducerId) -> Result<DeleteOutcome> {
        let started = Instant::now();

        let Some(tree) = self.repos.producers().find_with_farm_tree(id).await? else {
            tracing::warn!(
                event = "producer_deletion_attempt_not_found",
                severity = "low",
                producer_id = %id,
                "producer not found for deletion"
            );
            return Err(ApplicationError::NotFound(format!(
                "Producer with ID {id} not found"
            )));
        };

        // Re-read the farm set independently to pin the deletion scope.
        let farms = self.repos.farms().find_by_producer_with_crops(id).await?;
        let stats = DeletionStats::from_farms(&farms);

        tracing::info!(
            event = "producer_deletion_started",
            producer_id = %id,
            producer_name = %tree.producer.name,
            document = %mask_document(&tree.producer.document),
            farms = stats.farms,
            planted_crops = stats.planted_crops,
            "starting cascade deletion"
        );

        self.execute_cascade(id, &farms).await?;

        let duration = started.elapsed().as_millis() as u64;
        metrics::counter!("producers_deleted_total").increment(1);
        metrics::histogram!("producer_deletion_duration_ms").record(duration as f64);

        tracing::info!(
            event = "producer_deleted",
            producer_id = %id,
            producer_name = %tree.producer.name,
            entities_deleted = stats.total_entities,
            duration_ms = duration,
            "cascade deletion completed"
        );

        Ok(DeleteOutcome {
            success: true,
            message: "Producer and all related entities deleted successfully".to_string(),
            deleted_entities: stats,
            duration,
        })
    }

    /// Sequential leaf-to-root cascade; intentionally not atomic.
    async fn execute_cascade(&self, id: ProducerId, farms: &[FarmWithCrops]) -> Result<()> {
        for farm in farms {
            for crop in &farm.planted_crops {
                self.repos.planted_crops().delete(crop.id).await?;
                tracing::debug!(crop_id = %crop.id, farm_id = %farm.farm.id, "planted crop deleted");
            }
        }

        for farm in farms {
            self.repos.farms().delete(farm.farm.id).await?;
            tracing::debug!(farm_id = %farm.farm.id, "farm deleted");
        }

        let result: DeleteResult = self.repos.producers().delete(id).await?;
        if !result.success {
            return Err(ApplicationError::CascadeIncomplete);
        }
        Ok(())
    }
}
