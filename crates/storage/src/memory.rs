//! In-memory repository implementations for testing.
//!
//! All three repositories share one set of tables behind an
//! `Arc<RwLock<..>>` so relations and cascades behave like the database.
//! Delete-call counters let tests assert how many delete statements an
//! operation issued.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::{CropId, FarmId, ProducerId};
use domain::{
    DocumentType, Farm, FarmPatch, FarmWithCrops, FarmWithProducer, NewFarm, NewPlantedCrop,
    NewProducer, PlantedCrop, PlantedCropPatch, PlantedCropWithFarm, Producer, ProducerPatch,
    ProducerWithFarmTree, ProducerWithFarms,
};
use tokio::sync::RwLock;

use crate::error::Result;
use crate::repository::{
    CropCount, CropStatistics, DeleteResult, FarmAverages, FarmRepository, LandUse, Page,
    PlantedCropRepository, ProducerRepository, ProductiveFarm, Repositories, Repository,
    StateCount, StateStatistics, clamp_page_params, page_offset,
};

#[derive(Debug, Clone)]
struct StoredRow<T> {
    entity: T,
    deleted_at: Option<DateTime<Utc>>,
}

impl<T> StoredRow<T> {
    fn live(entity: T) -> Self {
        Self {
            entity,
            deleted_at: None,
        }
    }

    fn is_live(&self) -> bool {
        self.deleted_at.is_none()
    }
}

#[derive(Default)]
struct Tables {
    producers: Vec<StoredRow<Producer>>,
    farms: Vec<StoredRow<Farm>>,
    planted_crops: Vec<StoredRow<PlantedCrop>>,
}

#[derive(Default)]
struct DeleteCalls {
    producers: AtomicU64,
    farms: AtomicU64,
    planted_crops: AtomicU64,
}

/// In-memory repository provider sharing one table set.
#[derive(Clone)]
pub struct InMemoryRepositories {
    producers: InMemoryProducerRepository,
    farms: InMemoryFarmRepository,
    planted_crops: InMemoryPlantedCropRepository,
}

impl InMemoryRepositories {
    /// Creates an empty provider.
    pub fn new() -> Self {
        let tables = Arc::new(RwLock::new(Tables::default()));
        let delete_calls = Arc::new(DeleteCalls::default());
        Self {
            producers: InMemoryProducerRepository {
                tables: tables.clone(),
                delete_calls: delete_calls.clone(),
            },
            farms: InMemoryFarmRepository {
                tables: tables.clone(),
                delete_calls: delete_calls.clone(),
            },
            planted_crops: InMemoryPlantedCropRepository {
                tables,
                delete_calls,
            },
        }
    }

    /// Number of `delete` calls issued against the producer table.
    pub fn producer_delete_calls(&self) -> u64 {
        self.producers
            .delete_calls
            .producers
            .load(AtomicOrdering::SeqCst)
    }

    /// Number of `delete` calls issued against the farm table.
    pub fn farm_delete_calls(&self) -> u64 {
        self.farms.delete_calls.farms.load(AtomicOrdering::SeqCst)
    }

    /// Number of `delete` calls issued against the planted-crop table.
    pub fn crop_delete_calls(&self) -> u64 {
        self.planted_crops
            .delete_calls
            .planted_crops
            .load(AtomicOrdering::SeqCst)
    }
}

impl Default for InMemoryRepositories {
    fn default() -> Self {
        Self::new()
    }
}

impl Repositories for InMemoryRepositories {
    type Producers = InMemoryProducerRepository;
    type Farms = InMemoryFarmRepository;
    type Crops = InMemoryPlantedCropRepository;

    fn producers(&self) -> &InMemoryProducerRepository {
        &self.producers
    }

    fn farms(&self) -> &InMemoryFarmRepository {
        &self.farms
    }

    fn planted_crops(&self) -> &InMemoryPlantedCropRepository {
        &self.planted_crops
    }
}

fn desc_f64(a: f64, b: f64) -> Ordering {
    b.partial_cmp(&a).unwrap_or(Ordering::Equal)
}

fn paginate_slice<T: Clone>(items: &[T], page: u32, limit: u32) -> Page<T> {
    let (page, limit) = clamp_page_params(page, limit);
    let total = items.len() as u64;
    let start = usize::try_from(page_offset(page, limit)).unwrap_or(usize::MAX);
    let data = items
        .iter()
        .skip(start)
        .take(limit as usize)
        .cloned()
        .collect();
    Page::new(data, total, page, limit)
}

// -- Producers --

/// In-memory producer repository.
#[derive(Clone)]
pub struct InMemoryProducerRepository {
    tables: Arc<RwLock<Tables>>,
    delete_calls: Arc<DeleteCalls>,
}

#[async_trait]
impl Repository<Producer> for InMemoryProducerRepository {
    async fn create(&self, data: NewProducer) -> Result<Producer> {
        let now = Utc::now();
        let producer = Producer {
            id: ProducerId::new(),
            document_type: data
                .document_type
                .unwrap_or_else(|| DocumentType::infer(&data.document)),
            name: data.name,
            document: data.document,
            created_at: now,
            updated_at: now,
        };

        let mut tables = self.tables.write().await;
        tables.producers.push(StoredRow::live(producer.clone()));
        Ok(producer)
    }

    async fn find_all(&self) -> Result<Vec<Producer>> {
        let tables = self.tables.read().await;
        Ok(tables
            .producers
            .iter()
            .filter(|r| r.is_live())
            .map(|r| r.entity.clone())
            .collect())
    }

    async fn find_one(&self, id: ProducerId) -> Result<Option<Producer>> {
        let tables = self.tables.read().await;
        Ok(tables
            .producers
            .iter()
            .find(|r| r.is_live() && r.entity.id == id)
            .map(|r| r.entity.clone()))
    }

    async fn count(&self) -> Result<u64> {
        let tables = self.tables.read().await;
        Ok(tables.producers.iter().filter(|r| r.is_live()).count() as u64)
    }

    async fn exists(&self, id: ProducerId) -> Result<bool> {
        Ok(self.find_one(id).await?.is_some())
    }

    async fn update(&self, id: ProducerId, patch: ProducerPatch) -> Result<Option<Producer>> {
        let mut tables = self.tables.write().await;
        let Some(row) = tables
            .producers
            .iter_mut()
            .find(|r| r.is_live() && r.entity.id == id)
        else {
            return Ok(None);
        };

        if let Some(name) = patch.name {
            row.entity.name = name;
        }
        if let Some(document) = patch.document {
            row.entity.document = document;
        }
        if let Some(document_type) = patch.document_type {
            row.entity.document_type = document_type;
        }
        row.entity.updated_at = Utc::now();
        Ok(Some(row.entity.clone()))
    }

    async fn delete(&self, id: ProducerId) -> Result<DeleteResult> {
        self.delete_calls
            .producers
            .fetch_add(1, AtomicOrdering::SeqCst);
        let mut tables = self.tables.write().await;
        let before = tables.producers.len();
        tables.producers.retain(|r| r.entity.id != id);
        Ok(DeleteResult::from_affected(
            (before - tables.producers.len()) as u64,
        ))
    }

    async fn soft_delete(&self, id: ProducerId) -> Result<DeleteResult> {
        let mut tables = self.tables.write().await;
        let affected = tables
            .producers
            .iter_mut()
            .filter(|r| r.is_live() && r.entity.id == id)
            .map(|r| r.deleted_at = Some(Utc::now()))
            .count();
        Ok(DeleteResult::from_affected(affected as u64))
    }

    async fn restore(&self, id: ProducerId) -> Result<DeleteResult> {
        let mut tables = self.tables.write().await;
        let affected = tables
            .producers
            .iter_mut()
            .filter(|r| !r.is_live() && r.entity.id == id)
            .map(|r| r.deleted_at = None)
            .count();
        Ok(DeleteResult::from_affected(affected as u64))
    }

    async fn paginate(&self, page: u32, limit: u32) -> Result<Page<Producer>> {
        let all = self.find_all().await?;
        Ok(paginate_slice(&all, page, limit))
    }
}

#[async_trait]
impl ProducerRepository for InMemoryProducerRepository {
    async fn find_with_farms(&self, id: ProducerId) -> Result<Option<ProducerWithFarms>> {
        let tables = self.tables.read().await;
        let Some(producer) = tables
            .producers
            .iter()
            .find(|r| r.is_live() && r.entity.id == id)
            .map(|r| r.entity.clone())
        else {
            return Ok(None);
        };

        let farms = tables
            .farms
            .iter()
            .filter(|r| r.is_live() && r.entity.producer_id == id)
            .map(|r| r.entity.clone())
            .collect();
        Ok(Some(ProducerWithFarms { producer, farms }))
    }

    async fn find_with_farm_tree(&self, id: ProducerId) -> Result<Option<ProducerWithFarmTree>> {
        let Some(with_farms) = self.find_with_farms(id).await? else {
            return Ok(None);
        };

        let tables = self.tables.read().await;
        let farms = with_farms
            .farms
            .into_iter()
            .map(|farm| {
                let planted_crops = tables
                    .planted_crops
                    .iter()
                    .filter(|r| r.is_live() && r.entity.farm_id == farm.id)
                    .map(|r| r.entity.clone())
                    .collect();
                FarmWithCrops {
                    farm,
                    planted_crops,
                }
            })
            .collect();

        Ok(Some(ProducerWithFarmTree {
            producer: with_farms.producer,
            farms,
        }))
    }
}

// -- Farms --

/// In-memory farm repository.
#[derive(Clone)]
pub struct InMemoryFarmRepository {
    tables: Arc<RwLock<Tables>>,
    delete_calls: Arc<DeleteCalls>,
}

impl InMemoryFarmRepository {
    async fn live_farms(&self) -> Vec<Farm> {
        self.tables
            .read()
            .await
            .farms
            .iter()
            .filter(|r| r.is_live())
            .map(|r| r.entity.clone())
            .collect()
    }
}

#[async_trait]
impl Repository<Farm> for InMemoryFarmRepository {
    async fn create(&self, data: NewFarm) -> Result<Farm> {
        let now = Utc::now();
        let farm = Farm {
            id: FarmId::new(),
            producer_id: data.producer_id,
            name: data.name,
            city: data.city,
            state: data.state,
            total_area: data.total_area.unwrap_or(0.0),
            agricultural_area: data.agricultural_area.unwrap_or(0.0),
            vegetation_area: data.vegetation_area.unwrap_or(0.0),
            created_at: now,
            updated_at: now,
        };

        let mut tables = self.tables.write().await;
        tables.farms.push(StoredRow::live(farm.clone()));
        Ok(farm)
    }

    async fn find_all(&self) -> Result<Vec<Farm>> {
        Ok(self.live_farms().await)
    }

    async fn find_one(&self, id: FarmId) -> Result<Option<Farm>> {
        let tables = self.tables.read().await;
        Ok(tables
            .farms
            .iter()
            .find(|r| r.is_live() && r.entity.id == id)
            .map(|r| r.entity.clone()))
    }

    async fn count(&self) -> Result<u64> {
        Ok(self.live_farms().await.len() as u64)
    }

    async fn exists(&self, id: FarmId) -> Result<bool> {
        Ok(self.find_one(id).await?.is_some())
    }

    async fn update(&self, id: FarmId, patch: FarmPatch) -> Result<Option<Farm>> {
        let mut tables = self.tables.write().await;
        let Some(row) = tables
            .farms
            .iter_mut()
            .find(|r| r.is_live() && r.entity.id == id)
        else {
            return Ok(None);
        };

        if let Some(name) = patch.name {
            row.entity.name = name;
        }
        if let Some(producer_id) = patch.producer_id {
            row.entity.producer_id = producer_id;
        }
        if let Some(city) = patch.city {
            row.entity.city = city;
        }
        if let Some(state) = patch.state {
            row.entity.state = state;
        }
        if let Some(total_area) = patch.total_area {
            row.entity.total_area = total_area;
        }
        if let Some(agricultural_area) = patch.agricultural_area {
            row.entity.agricultural_area = agricultural_area;
        }
        if let Some(vegetation_area) = patch.vegetation_area {
            row.entity.vegetation_area = vegetation_area;
        }
        row.entity.updated_at = Utc::now();
        Ok(Some(row.entity.clone()))
    }

    async fn delete(&self, id: FarmId) -> Result<DeleteResult> {
        self.delete_calls.farms.fetch_add(1, AtomicOrdering::SeqCst);
        let mut tables = self.tables.write().await;
        let before = tables.farms.len();
        tables.farms.retain(|r| r.entity.id != id);
        Ok(DeleteResult::from_affected(
            (before - tables.farms.len()) as u64,
        ))
    }

    async fn soft_delete(&self, id: FarmId) -> Result<DeleteResult> {
        let mut tables = self.tables.write().await;
        let affected = tables
            .farms
            .iter_mut()
            .filter(|r| r.is_live() && r.entity.id == id)
            .map(|r| r.deleted_at = Some(Utc::now()))
            .count();
        Ok(DeleteResult::from_affected(affected as u64))
    }

    async fn restore(&self, id: FarmId) -> Result<DeleteResult> {
        let mut tables = self.tables.write().await;
        let affected = tables
            .farms
            .iter_mut()
            .filter(|r| !r.is_live() && r.entity.id == id)
            .map(|r| r.deleted_at = None)
            .count();
        Ok(DeleteResult::from_affected(affected as u64))
    }

    async fn paginate(&self, page: u32, limit: u32) -> Result<Page<Farm>> {
        let all = self.live_farms().await;
        Ok(paginate_slice(&all, page, limit))
    }
}

#[async_trait]
impl FarmRepository for InMemoryFarmRepository {
    async fn find_by_producer(&self, producer_id: ProducerId) -> Result<Vec<Farm>> {
        Ok(self
            .live_farms()
            .await
            .into_iter()
            .filter(|f| f.producer_id == producer_id)
            .collect())
    }

    async fn find_by_producer_with_crops(
        &self,
        producer_id: ProducerId,
    ) -> Result<Vec<FarmWithCrops>> {
        let farms = self.find_by_producer(producer_id).await?;
        let tables = self.tables.read().await;
        Ok(farms
            .into_iter()
            .map(|farm| {
                let planted_crops = tables
                    .planted_crops
                    .iter()
                    .filter(|r| r.is_live() && r.entity.farm_id == farm.id)
                    .map(|r| r.entity.clone())
                    .collect();
                FarmWithCrops {
                    farm,
                    planted_crops,
                }
            })
            .collect())
    }

    async fn find_with_producer(&self, id: FarmId) -> Result<Option<FarmWithProducer>> {
        let Some(farm) = self.find_one(id).await? else {
            return Ok(None);
        };

        let tables = self.tables.read().await;
        let producer = tables
            .producers
            .iter()
            .find(|r| r.is_live() && r.entity.id == farm.producer_id)
            .map(|r| r.entity.clone());
        Ok(Some(FarmWithProducer { farm, producer }))
    }

    async fn total_hectares(&self) -> Result<f64> {
        Ok(self.live_farms().await.iter().map(|f| f.total_area).sum())
    }

    async fn farms_by_state(&self) -> Result<Vec<StateCount>> {
        let mut by_state: BTreeMap<String, (i64, f64)> = BTreeMap::new();
        for farm in self.live_farms().await {
            let entry = by_state.entry(farm.state).or_insert((0, 0.0));
            entry.0 += 1;
            entry.1 += farm.total_area;
        }

        let mut counts: Vec<StateCount> = by_state
            .into_iter()
            .map(|(name, (value, total_area))| StateCount {
                name,
                value,
                total_area,
            })
            .collect();
        counts.sort_by(|a, b| b.value.cmp(&a.value).then_with(|| a.name.cmp(&b.name)));
        Ok(counts)
    }

    async fn land_use(&self) -> Result<Vec<LandUse>> {
        let farms = self.live_farms().await;
        Ok(vec![
            LandUse {
                name: "Área Agricultável".to_string(),
                value: farms.iter().map(|f| f.agricultural_area).sum(),
            },
            LandUse {
                name: "Área de Vegetação".to_string(),
                value: farms.iter().map(|f| f.vegetation_area).sum(),
            },
        ])
    }

    async fn averages(&self) -> Result<FarmAverages> {
        let farms = self.live_farms().await;
        if farms.is_empty() {
            return Ok(FarmAverages {
                avg_farm_size: 0.0,
                avg_agricultural_area: 0.0,
                avg_vegetation_area: 0.0,
            });
        }

        let n = farms.len() as f64;
        Ok(FarmAverages {
            avg_farm_size: farms.iter().map(|f| f.total_area).sum::<f64>() / n,
            avg_agricultural_area: farms.iter().map(|f| f.agricultural_area).sum::<f64>() / n,
            avg_vegetation_area: farms.iter().map(|f| f.vegetation_area).sum::<f64>() / n,
        })
    }

    async fn state_statistics(&self) -> Result<Vec<StateStatistics>> {
        let mut by_state: BTreeMap<String, Vec<Farm>> = BTreeMap::new();
        for farm in self.live_farms().await {
            by_state.entry(farm.state.clone()).or_default().push(farm);
        }

        let mut stats: Vec<StateStatistics> = by_state
            .into_iter()
            .map(|(state, farms)| {
                let total_area: f64 = farms.iter().map(|f| f.total_area).sum();
                StateStatistics {
                    state,
                    farm_count: farms.len() as i64,
                    total_area,
                    avg_area: total_area / farms.len() as f64,
                    total_agricultural: farms.iter().map(|f| f.agricultural_area).sum(),
                    total_vegetation: farms.iter().map(|f| f.vegetation_area).sum(),
                }
            })
            .collect();
        stats.sort_by(|a, b| {
            desc_f64(a.total_area, b.total_area).then_with(|| a.state.cmp(&b.state))
        });
        Ok(stats)
    }

    async fn top_productive_farms(&self, limit: u32) -> Result<Vec<ProductiveFarm>> {
        let tables = self.tables.read().await;
        let mut farms: Vec<ProductiveFarm> = tables
            .farms
            .iter()
            .filter(|r| r.is_live())
            .map(|r| {
                let farm = &r.entity;
                let producer_name = tables
                    .producers
                    .iter()
                    .find(|p| p.is_live() && p.entity.id == farm.producer_id)
                    .map(|p| p.entity.name.clone());
                let crop_count = tables
                    .planted_crops
                    .iter()
                    .filter(|c| c.is_live() && c.entity.farm_id == farm.id)
                    .count() as i64;
                ProductiveFarm {
                    id: farm.id,
                    name: farm.name.clone(),
                    city: farm.city.clone(),
                    state: farm.state.clone(),
                    total_area: farm.total_area,
                    agricultural_area: farm.agricultural_area,
                    producer_name,
                    crop_count,
                }
            })
            .collect();

        farms.sort_by(|a, b| {
            desc_f64(a.agricultural_area, b.agricultural_area).then_with(|| a.name.cmp(&b.name))
        });
        farms.truncate(limit as usize);
        Ok(farms)
    }
}

// -- Planted crops --

/// In-memory planted-crop repository.
#[derive(Clone)]
pub struct InMemoryPlantedCropRepository {
    tables: Arc<RwLock<Tables>>,
    delete_calls: Arc<DeleteCalls>,
}

#[async_trait]
impl Repository<PlantedCrop> for InMemoryPlantedCropRepository {
    async fn create(&self, data: NewPlantedCrop) -> Result<PlantedCrop> {
        let now = Utc::now();
        let crop = PlantedCrop {
            id: CropId::new(),
            farm_id: data.farm_id,
            name: data.name,
            created_at: now,
            updated_at: now,
        };

        let mut tables = self.tables.write().await;
        tables.planted_crops.push(StoredRow::live(crop.clone()));
        Ok(crop)
    }

    async fn find_all(&self) -> Result<Vec<PlantedCrop>> {
        let tables = self.tables.read().await;
        Ok(tables
            .planted_crops
            .iter()
            .filter(|r| r.is_live())
            .map(|r| r.entity.clone())
            .collect())
    }

    async fn find_one(&self, id: CropId) -> Result<Option<PlantedCrop>> {
        let tables = self.tables.read().await;
        Ok(tables
            .planted_crops
            .iter()
            .find(|r| r.is_live() && r.entity.id == id)
            .map(|r| r.entity.clone()))
    }

    async fn count(&self) -> Result<u64> {
        let tables = self.tables.read().await;
        Ok(tables.planted_crops.iter().filter(|r| r.is_live()).count() as u64)
    }

    async fn exists(&self, id: CropId) -> Result<bool> {
        Ok(self.find_one(id).await?.is_some())
    }

    async fn update(&self, id: CropId, patch: PlantedCropPatch) -> Result<Option<PlantedCrop>> {
        let mut tables = self.tables.write().await;
        let Some(row) = tables
            .planted_crops
            .iter_mut()
            .find(|r| r.is_live() && r.entity.id == id)
        else {
            return Ok(None);
        };

        if let Some(name) = patch.name {
            row.entity.name = name;
        }
        if let Some(farm_id) = patch.farm_id {
            row.entity.farm_id = farm_id;
        }
        row.entity.updated_at = Utc::now();
        Ok(Some(row.entity.clone()))
    }

    async fn delete(&self, id: CropId) -> Result<DeleteResult> {
        self.delete_calls
            .planted_crops
            .fetch_add(1, AtomicOrdering::SeqCst);
        let mut tables = self.tables.write().await;
        let before = tables.planted_crops.len();
        tables.planted_crops.retain(|r| r.entity.id != id);
        Ok(DeleteResult::from_affected(
            (before - tables.planted_crops.len()) as u64,
        ))
    }

    async fn soft_delete(&self, id: CropId) -> Result<DeleteResult> {
        let mut tables = self.tables.write().await;
        let affected = tables
            .planted_crops
            .iter_mut()
            .filter(|r| r.is_live() && r.entity.id == id)
            .map(|r| r.deleted_at = Some(Utc::now()))
            .count();
        Ok(DeleteResult::from_affected(affected as u64))
    }

    async fn restore(&self, id: CropId) -> Result<DeleteResult> {
        let mut tables = self.tables.write().await;
        let affected = tables
            .planted_crops
            .iter_mut()
            .filter(|r| !r.is_live() && r.entity.id == id)
            .map(|r| r.deleted_at = None)
            .count();
        Ok(DeleteResult::from_affected(affected as u64))
    }

    async fn paginate(&self, page: u32, limit: u32) -> Result<Page<PlantedCrop>> {
        let all = self.find_all().await?;
        Ok(paginate_slice(&all, page, limit))
    }
}

#[async_trait]
impl PlantedCropRepository for InMemoryPlantedCropRepository {
    async fn find_by_farm(&self, farm_id: FarmId) -> Result<Vec<PlantedCrop>> {
        Ok(self
            .find_all()
            .await?
            .into_iter()
            .filter(|c| c.farm_id == farm_id)
            .collect())
    }

    async fn find_with_farm(&self, id: CropId) -> Result<Option<PlantedCropWithFarm>> {
        let Some(crop) = self.find_one(id).await? else {
            return Ok(None);
        };

        let tables = self.tables.read().await;
        let farm = tables
            .farms
            .iter()
            .find(|r| r.is_live() && r.entity.id == crop.farm_id)
            .map(|r| r.entity.clone());
        Ok(Some(PlantedCropWithFarm { crop, farm }))
    }

    async fn crops_by_type(&self) -> Result<Vec<CropCount>> {
        let mut by_name: BTreeMap<String, i64> = BTreeMap::new();
        for crop in self.find_all().await? {
            *by_name.entry(crop.name).or_insert(0) += 1;
        }

        let mut counts: Vec<CropCount> = by_name
            .into_iter()
            .map(|(name, value)| CropCount {
                name,
                value,
                total_area: 0.0,
            })
            .collect();
        counts.sort_by(|a, b| b.value.cmp(&a.value).then_with(|| a.name.cmp(&b.name)));
        Ok(counts)
    }

    async fn crop_statistics(&self) -> Result<Vec<CropStatistics>> {
        let tables = self.tables.read().await;
        let mut by_name: BTreeMap<String, (i64, Vec<FarmId>)> = BTreeMap::new();
        for row in tables.planted_crops.iter().filter(|r| r.is_live()) {
            let entry = by_name
                .entry(row.entity.name.clone())
                .or_insert((0, Vec::new()));
            entry.0 += 1;
            let farm_is_live = tables
                .farms
                .iter()
                .any(|f| f.is_live() && f.entity.id == row.entity.farm_id);
            if farm_is_live && !entry.1.contains(&row.entity.farm_id) {
                entry.1.push(row.entity.farm_id);
            }
        }

        let mut stats: Vec<CropStatistics> = by_name
            .into_iter()
            .map(|(crop_name, (plant_count, farms))| CropStatistics {
                crop_name,
                plant_count,
                farm_count: farms.len() as i64,
            })
            .collect();
        stats.sort_by(|a, b| {
            b.plant_count
                .cmp(&a.plant_count)
                .then_with(|| a.crop_name.cmp(&b.crop_name))
        });
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_producer(name: &str, document: &str) -> NewProducer {
        NewProducer {
            name: name.to_string(),
            document: document.to_string(),
            document_type: None,
        }
    }

    fn new_farm(producer_id: ProducerId, name: &str, state: &str, areas: (f64, f64, f64)) -> NewFarm {
        NewFarm {
            name: name.to_string(),
            producer_id,
            city: "São Paulo".to_string(),
            state: state.to_string(),
            total_area: Some(areas.0),
            agricultural_area: Some(areas.1),
            vegetation_area: Some(areas.2),
        }
    }

    #[tokio::test]
    async fn create_infers_document_type() {
        let repos = InMemoryRepositories::new();
        let pf = repos
            .producers()
            .create(new_producer("Jhon", "52998224725"))
            .await
            .unwrap();
        let pj = repos
            .producers()
            .create(new_producer("Agro SA", "11222333000181"))
            .await
            .unwrap();

        assert_eq!(pf.document_type, DocumentType::Pf);
        assert_eq!(pj.document_type, DocumentType::Pj);
    }

    #[tokio::test]
    async fn pagination_over_25_rows() {
        let repos = InMemoryRepositories::new();
        for i in 0..25 {
            repos
                .producers()
                .create(new_producer(&format!("P{i}"), "52998224725"))
                .await
                .unwrap();
        }

        let page = repos.producers().paginate(2, 10).await.unwrap();
        assert_eq!(page.total, 25);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.data.len(), 10);
        assert_eq!(page.page, 2);

        let last = repos.producers().paginate(3, 10).await.unwrap();
        assert_eq!(last.data.len(), 5);
    }

    #[tokio::test]
    async fn pagination_with_huge_page_number_returns_empty_page() {
        let repos = InMemoryRepositories::new();
        repos
            .producers()
            .create(new_producer("Jhon", "52998224725"))
            .await
            .unwrap();

        let page = repos.producers().paginate(u32::MAX, 100).await.unwrap();
        assert_eq!(page.total, 1);
        assert!(page.data.is_empty());
    }

    #[tokio::test]
    async fn soft_delete_hides_and_restore_revives() {
        let repos = InMemoryRepositories::new();
        let producer = repos
            .producers()
            .create(new_producer("Jhon", "52998224725"))
            .await
            .unwrap();

        let result = repos.producers().soft_delete(producer.id).await.unwrap();
        assert!(result.success);
        assert!(repos.producers().find_one(producer.id).await.unwrap().is_none());
        assert_eq!(repos.producers().count().await.unwrap(), 0);

        let result = repos.producers().restore(producer.id).await.unwrap();
        assert!(result.success);
        assert!(repos.producers().find_one(producer.id).await.unwrap().is_some());

        // Restoring a live row affects nothing.
        assert!(!repos.producers().restore(producer.id).await.unwrap().success);
    }

    #[tokio::test]
    async fn delete_of_missing_row_reports_failure() {
        let repos = InMemoryRepositories::new();
        let result = repos.producers().delete(ProducerId::new()).await.unwrap();
        assert_eq!(result.affected, 0);
        assert!(!result.success);
    }

    #[tokio::test]
    async fn farms_by_state_orders_by_count_descending() {
        let repos = InMemoryRepositories::new();
        let producer = repos
            .producers()
            .create(new_producer("Jhon", "52998224725"))
            .await
            .unwrap();
        for (name, state, total) in [
            ("A", "SP", 100.0),
            ("B", "SP", 200.0),
            ("C", "MG", 50.0),
        ] {
            repos
                .farms()
                .create(new_farm(producer.id, name, state, (total, 0.0, 0.0)))
                .await
                .unwrap();
        }

        let by_state = repos.farms().farms_by_state().await.unwrap();
        assert_eq!(by_state.len(), 2);
        assert_eq!(by_state[0].name, "SP");
        assert_eq!(by_state[0].value, 2);
        assert_eq!(by_state[0].total_area, 300.0);
        assert_eq!(by_state[1].name, "MG");
        assert_eq!(by_state[1].value, 1);
    }

    #[tokio::test]
    async fn aggregates_on_empty_tables_are_zero() {
        let repos = InMemoryRepositories::new();
        assert_eq!(repos.farms().total_hectares().await.unwrap(), 0.0);
        assert!(repos.farms().farms_by_state().await.unwrap().is_empty());
        assert!(repos.farms().state_statistics().await.unwrap().is_empty());
        assert!(repos.planted_crops().crops_by_type().await.unwrap().is_empty());

        let averages = repos.farms().averages().await.unwrap();
        assert_eq!(averages.avg_farm_size, 0.0);

        let land_use = repos.farms().land_use().await.unwrap();
        assert_eq!(land_use.len(), 2);
        assert_eq!(land_use[0].value, 0.0);
        assert_eq!(land_use[1].value, 0.0);
    }

    #[tokio::test]
    async fn crop_statistics_count_distinct_farms() {
        let repos = InMemoryRepositories::new();
        let producer = repos
            .producers()
            .create(new_producer("Jhon", "52998224725"))
            .await
            .unwrap();
        let farm_a = repos
            .farms()
            .create(new_farm(producer.id, "A", "SP", (100.0, 60.0, 30.0)))
            .await
            .unwrap();
        let farm_b = repos
            .farms()
            .create(new_farm(producer.id, "B", "SP", (100.0, 40.0, 30.0)))
            .await
            .unwrap();

        for (farm, name) in [
            (farm_a.id, "Soja"),
            (farm_a.id, "Soja"),
            (farm_b.id, "Soja"),
            (farm_b.id, "Milho"),
        ] {
            repos
                .planted_crops()
                .create(NewPlantedCrop {
                    name: name.to_string(),
                    farm_id: farm,
                })
                .await
                .unwrap();
        }

        let stats = repos.planted_crops().crop_statistics().await.unwrap();
        assert_eq!(stats[0].crop_name, "Soja");
        assert_eq!(stats[0].plant_count, 3);
        assert_eq!(stats[0].farm_count, 2);
        assert_eq!(stats[1].crop_name, "Milho");
        assert_eq!(stats[1].farm_count, 1);
    }

    #[tokio::test]
    async fn top_productive_farms_sorted_by_agricultural_area() {
        let repos = InMemoryRepositories::new();
        let producer = repos
            .producers()
            .create(new_producer("Jhon", "52998224725"))
            .await
            .unwrap();
        repos
            .farms()
            .create(new_farm(producer.id, "Small", "SP", (100.0, 10.0, 30.0)))
            .await
            .unwrap();
        repos
            .farms()
            .create(new_farm(producer.id, "Big", "SP", (500.0, 400.0, 50.0)))
            .await
            .unwrap();

        let top = repos.farms().top_productive_farms(1).await.unwrap();
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].name, "Big");
        assert_eq!(top[0].producer_name.as_deref(), Some("Jhon"));
    }

    #[tokio::test]
    async fn update_applies_partial_patch() {
        let repos = InMemoryRepositories::new();
        let producer = repos
            .producers()
            .create(new_producer("Jhon", "52998224725"))
            .await
            .unwrap();

        let updated = repos
            .producers()
            .update(
                producer.id,
                ProducerPatch {
                    name: Some("Jane".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.name, "Jane");
        assert_eq!(updated.document, "52998224725");
        assert_eq!(updated.document_type, DocumentType::Pf);
    }
}
