//! Generic repository contract and per-resource repository traits.
//!
//! The base [`Repository`] trait is the CRUD contract every entity type
//! implements once per backend; the resource traits layer the typed finder
//! methods and aggregate queries on top of it. Absence is modeled as
//! `Option`, never as an error.

use async_trait::async_trait;
use common::{CropId, FarmId, ProducerId};
use domain::{
    Farm, FarmPatch, FarmWithCrops, FarmWithProducer, NewFarm, NewPlantedCrop, NewProducer,
    PlantedCrop, PlantedCropPatch, PlantedCropWithFarm, Producer, ProducerPatch,
    ProducerWithFarmTree, ProducerWithFarms,
};
use serde::Serialize;

use crate::error::Result;

/// An entity type managed by a [`Repository`].
pub trait Entity: Clone + Send + Sync + 'static {
    type Id: Copy + Send + Sync + std::fmt::Display + 'static;
    type New: Send + 'static;
    type Patch: Send + 'static;

    fn id(&self) -> Self::Id;
}

impl Entity for Producer {
    type Id = ProducerId;
    type New = NewProducer;
    type Patch = ProducerPatch;

    fn id(&self) -> ProducerId {
        self.id
    }
}

impl Entity for Farm {
    type Id = FarmId;
    type New = NewFarm;
    type Patch = FarmPatch;

    fn id(&self) -> FarmId {
        self.id
    }
}

impl Entity for PlantedCrop {
    type Id = CropId;
    type New = NewPlantedCrop;
    type Patch = PlantedCropPatch;

    fn id(&self) -> CropId {
        self.id
    }
}

/// Outcome of a delete, soft-delete or restore operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DeleteResult {
    pub affected: u64,
    pub success: bool,
}

impl DeleteResult {
    pub fn from_affected(affected: u64) -> Self {
        Self {
            affected,
            success: affected > 0,
        }
    }
}

/// One page of a paginated listing.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub data: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub limit: u32,
    pub total_pages: u32,
}

impl<T> Page<T> {
    pub fn new(data: Vec<T>, total: u64, page: u32, limit: u32) -> Self {
        let total_pages = if limit == 0 {
            0
        } else {
            total.div_ceil(u64::from(limit)) as u32
        };
        Self {
            data,
            total,
            page,
            limit,
            total_pages,
        }
    }
}

/// Clamps pagination parameters to sane bounds (page >= 1, 1 <= limit <= 100).
pub(crate) fn clamp_page_params(page: u32, limit: u32) -> (u32, u32) {
    (page.max(1), limit.clamp(1, 100))
}

/// Row offset for a page, computed in i64 so large page numbers cannot
/// overflow u32 arithmetic.
pub(crate) fn page_offset(page: u32, limit: u32) -> i64 {
    (i64::from(page) - 1) * i64::from(limit)
}

/// Generic CRUD contract, implemented once per entity type and backend.
///
/// Soft-deleted rows are invisible to every read until restored; hard
/// delete removes the row regardless of its soft-delete state.
#[async_trait]
pub trait Repository<E: Entity>: Send + Sync {
    /// Persists a new row and returns the stored entity.
    async fn create(&self, data: E::New) -> Result<E>;

    /// Returns all live rows in creation order.
    async fn find_all(&self) -> Result<Vec<E>>;

    /// Single-row lookup; `None` when absent.
    async fn find_one(&self, id: E::Id) -> Result<Option<E>>;

    /// Number of live rows.
    async fn count(&self) -> Result<u64>;

    /// Whether a live row with this id exists.
    async fn exists(&self, id: E::Id) -> Result<bool>;

    /// Applies a partial patch, then re-fetches and returns the updated
    /// row, or `None` when absent.
    async fn update(&self, id: E::Id, patch: E::Patch) -> Result<Option<E>>;

    /// Hard delete.
    async fn delete(&self, id: E::Id) -> Result<DeleteResult>;

    /// Marks the row deleted without removing it.
    async fn soft_delete(&self, id: E::Id) -> Result<DeleteResult>;

    /// Brings a soft-deleted row back.
    async fn restore(&self, id: E::Id) -> Result<DeleteResult>;

    /// Paginated listing with `total_pages = ceil(total / limit)`.
    async fn paginate(&self, page: u32, limit: u32) -> Result<Page<E>>;
}

// -- Aggregate query results --

/// Farm count and area per state, ordered by count descending.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StateCount {
    pub name: String,
    pub value: i64,
    pub total_area: f64,
}

/// Planted-crop count per crop type, ordered by count descending.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CropCount {
    pub name: String,
    pub value: i64,
    /// Kept for chart-shape parity; crop records carry no area of their own.
    pub total_area: f64,
}

/// One slice of the two-category land-use split.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LandUse {
    pub name: String,
    pub value: f64,
}

/// Mean area figures across all farms; zero when there are no farms.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FarmAverages {
    pub avg_farm_size: f64,
    pub avg_agricultural_area: f64,
    pub avg_vegetation_area: f64,
}

/// Per-state farm statistics, ordered by total area descending.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StateStatistics {
    pub state: String,
    pub farm_count: i64,
    pub total_area: f64,
    pub avg_area: f64,
    pub total_agricultural: f64,
    pub total_vegetation: f64,
}

/// A top-N farm by agricultural area, with its producer and crop count.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductiveFarm {
    pub id: FarmId,
    pub name: String,
    pub city: String,
    pub state: String,
    pub total_area: f64,
    pub agricultural_area: f64,
    pub producer_name: Option<String>,
    pub crop_count: i64,
}

/// Per-crop-type statistics with the number of distinct farms growing it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CropStatistics {
    pub crop_name: String,
    pub plant_count: i64,
    pub farm_count: i64,
}

// -- Resource repositories --

/// Producer data access with eager relation loading.
#[async_trait]
pub trait ProducerRepository: Repository<Producer> {
    /// Producer with its farms.
    async fn find_with_farms(&self, id: ProducerId) -> Result<Option<ProducerWithFarms>>;

    /// Producer with farms and their planted crops, as needed by the
    /// cascading delete.
    async fn find_with_farm_tree(&self, id: ProducerId) -> Result<Option<ProducerWithFarmTree>>;
}

/// Farm data access plus the dashboard aggregate queries.
#[async_trait]
pub trait FarmRepository: Repository<Farm> {
    async fn find_by_producer(&self, producer_id: ProducerId) -> Result<Vec<Farm>>;

    async fn find_by_producer_with_crops(
        &self,
        producer_id: ProducerId,
    ) -> Result<Vec<FarmWithCrops>>;

    async fn find_with_producer(&self, id: FarmId) -> Result<Option<FarmWithProducer>>;

    /// Sum of all farm total areas; 0 when there are no farms.
    async fn total_hectares(&self) -> Result<f64>;

    /// Farm count and area grouped by state, count descending.
    async fn farms_by_state(&self) -> Result<Vec<StateCount>>;

    /// Fixed two-category split of agricultural vs. vegetation area.
    async fn land_use(&self) -> Result<Vec<LandUse>>;

    /// Mean total/agricultural/vegetation areas.
    async fn averages(&self) -> Result<FarmAverages>;

    /// Count, sums and mean per state, total area descending.
    async fn state_statistics(&self) -> Result<Vec<StateStatistics>>;

    /// Top farms by agricultural area with producer name and crop count.
    async fn top_productive_farms(&self, limit: u32) -> Result<Vec<ProductiveFarm>>;
}

/// Planted-crop data access plus crop aggregate queries.
#[async_trait]
pub trait PlantedCropRepository: Repository<PlantedCrop> {
    async fn find_by_farm(&self, farm_id: FarmId) -> Result<Vec<PlantedCrop>>;

    async fn find_with_farm(&self, id: CropId) -> Result<Option<PlantedCropWithFarm>>;

    /// Count per distinct crop name, descending.
    async fn crops_by_type(&self) -> Result<Vec<CropCount>>;

    /// Crop counts joined with distinct farm counts, descending.
    async fn crop_statistics(&self) -> Result<Vec<CropStatistics>>;
}

/// Provider bundling the three resource repositories over one backend.
pub trait Repositories: Clone + Send + Sync + 'static {
    type Producers: ProducerRepository + Clone + 'static;
    type Farms: FarmRepository + Clone + 'static;
    type Crops: PlantedCropRepository + Clone + 'static;

    fn producers(&self) -> &Self::Producers;
    fn farms(&self) -> &Self::Farms;
    fn planted_crops(&self) -> &Self::Crops;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delete_result_success_tracks_affected() {
        assert!(DeleteResult::from_affected(1).success);
        assert!(DeleteResult::from_affected(3).success);
        assert!(!DeleteResult::from_affected(0).success);
    }

    #[test]
    fn page_computes_ceiling_of_total_pages() {
        let page = Page::<u8>::new(vec![], 25, 2, 10);
        assert_eq!(page.total_pages, 3);
        assert_eq!(Page::<u8>::new(vec![], 20, 1, 10).total_pages, 2);
        assert_eq!(Page::<u8>::new(vec![], 0, 1, 10).total_pages, 0);
        assert_eq!(Page::<u8>::new(vec![], 1, 1, 10).total_pages, 1);
    }

    #[test]
    fn page_serializes_camel_case() {
        let json = serde_json::to_value(Page::<u8>::new(vec![], 25, 2, 10)).unwrap();
        assert_eq!(json["totalPages"], 3);
        assert_eq!(json["total"], 25);
        assert_eq!(json["page"], 2);
        assert_eq!(json["limit"], 10);
    }

    #[test]
    fn pagination_params_are_clamped() {
        assert_eq!(clamp_page_params(0, 0), (1, 1));
        assert_eq!(clamp_page_params(2, 10), (2, 10));
        assert_eq!(clamp_page_params(1, 1000), (1, 100));
    }

    #[test]
    fn page_offset_survives_huge_page_numbers() {
        assert_eq!(page_offset(1, 10), 0);
        assert_eq!(page_offset(3, 10), 20);
        assert_eq!(page_offset(u32::MAX, 100), (i64::from(u32::MAX) - 1) * 100);
    }
}
