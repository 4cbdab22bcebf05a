//! PostgreSQL repository implementations over `sqlx`.
//!
//! Every read filters out soft-deleted rows; aggregates COALESCE null
//! sums and averages to zero so an empty database yields all-zero
//! statistics instead of errors.

use async_trait::async_trait;
use chrono::Utc;
use common::{CropId, FarmId, ProducerId};
use domain::{
    DocumentType, Farm, FarmPatch, FarmWithCrops, FarmWithProducer, NewFarm, NewPlantedCrop,
    NewProducer, PlantedCrop, PlantedCropPatch, PlantedCropWithFarm, Producer, ProducerPatch,
    ProducerWithFarmTree, ProducerWithFarms,
};
use sqlx::{PgPool, Row, postgres::PgRow};
use uuid::Uuid;

use crate::error::{Result, StorageError};
use crate::repository::{
    CropCount, CropStatistics, DeleteResult, FarmAverages, FarmRepository, LandUse, Page,
    PlantedCropRepository, ProducerRepository, ProductiveFarm, Repositories, Repository,
    StateCount, StateStatistics, clamp_page_params, page_offset,
};

/// PostgreSQL-backed repository provider.
#[derive(Clone)]
pub struct PgRepositories {
    producers: PgProducerRepository,
    farms: PgFarmRepository,
    planted_crops: PgPlantedCropRepository,
    pool: PgPool,
}

impl PgRepositories {
    /// Creates the provider over an established connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self {
            producers: PgProducerRepository::new(pool.clone()),
            farms: PgFarmRepository::new(pool.clone()),
            planted_crops: PgPlantedCropRepository::new(pool.clone()),
            pool,
        }
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> Result<()> {
        tracing::info!("running database migrations");
        sqlx::migrate!("../../migrations").run(&self.pool).await?;
        tracing::info!("database migrations complete");
        Ok(())
    }
}

impl Repositories for PgRepositories {
    type Producers = PgProducerRepository;
    type Farms = PgFarmRepository;
    type Crops = PgPlantedCropRepository;

    fn producers(&self) -> &PgProducerRepository {
        &self.producers
    }

    fn farms(&self) -> &PgFarmRepository {
        &self.farms
    }

    fn planted_crops(&self) -> &PgPlantedCropRepository {
        &self.planted_crops
    }
}

// -- Row mapping --

fn row_to_producer(row: &PgRow) -> Result<Producer> {
    let document_type: String = row.try_get("document_type")?;
    let document_type: DocumentType = document_type
        .parse()
        .map_err(|e: domain::DomainError| StorageError::Decode(e.to_string()))?;

    Ok(Producer {
        id: ProducerId::from_uuid(row.try_get::<Uuid, _>("id")?),
        name: row.try_get("name")?,
        document: row.try_get("document")?,
        document_type,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn row_to_farm(row: &PgRow) -> Result<Farm> {
    Ok(Farm {
        id: FarmId::from_uuid(row.try_get::<Uuid, _>("id")?),
        producer_id: ProducerId::from_uuid(row.try_get::<Uuid, _>("producer_id")?),
        name: row.try_get("name")?,
        city: row.try_get("city")?,
        state: row.try_get("state")?,
        total_area: row.try_get("total_area")?,
        agricultural_area: row.try_get("agricultural_area")?,
        vegetation_area: row.try_get("vegetation_area")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn row_to_crop(row: &PgRow) -> Result<PlantedCrop> {
    Ok(PlantedCrop {
        id: CropId::from_uuid(row.try_get::<Uuid, _>("id")?),
        farm_id: FarmId::from_uuid(row.try_get::<Uuid, _>("farm_id")?),
        name: row.try_get("name")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

const PRODUCER_COLUMNS: &str = "id, name, document, document_type, created_at, updated_at";
const FARM_COLUMNS: &str = "id, producer_id, name, city, state, total_area, agricultural_area, \
                            vegetation_area, created_at, updated_at";
const CROP_COLUMNS: &str = "id, farm_id, name, created_at, updated_at";

// -- Producers --

/// Producer repository backed by PostgreSQL.
#[derive(Clone)]
pub struct PgProducerRepository {
    pool: PgPool,
}

impl PgProducerRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Repository<Producer> for PgProducerRepository {
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

        sqlx::query(
            "INSERT INTO producers (id, name, document, document_type, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(producer.id.as_uuid())
        .bind(&producer.name)
        .bind(&producer.document)
        .bind(producer.document_type.as_str())
        .bind(producer.created_at)
        .bind(producer.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(producer)
    }

    async fn find_all(&self) -> Result<Vec<Producer>> {
        let rows = sqlx::query(&format!(
            "SELECT {PRODUCER_COLUMNS} FROM producers WHERE deleted_at IS NULL \
             ORDER BY created_at, id"
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_producer).collect()
    }

    async fn find_one(&self, id: ProducerId) -> Result<Option<Producer>> {
        let row = sqlx::query(&format!(
            "SELECT {PRODUCER_COLUMNS} FROM producers WHERE id = $1 AND deleted_at IS NULL"
        ))
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(row_to_producer).transpose()
    }

    async fn count(&self) -> Result<u64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM producers WHERE deleted_at IS NULL")
                .fetch_one(&self.pool)
                .await?;
        Ok(count as u64)
    }

    async fn exists(&self, id: ProducerId) -> Result<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM producers WHERE id = $1 AND deleted_at IS NULL)",
        )
        .bind(id.as_uuid())
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    async fn update(&self, id: ProducerId, patch: ProducerPatch) -> Result<Option<Producer>> {
        sqlx::query(
            "UPDATE producers SET \
                 name = COALESCE($2, name), \
                 document = COALESCE($3, document), \
                 document_type = COALESCE($4, document_type), \
                 updated_at = $5 \
             WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id.as_uuid())
        .bind(patch.name)
        .bind(patch.document)
        .bind(patch.document_type.map(|t| t.as_str()))
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        self.find_one(id).await
    }

    async fn delete(&self, id: ProducerId) -> Result<DeleteResult> {
        let result = sqlx::query("DELETE FROM producers WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await?;
        tracing::debug!(producer_id = %id, affected = result.rows_affected(), "deleted producer row");
        Ok(DeleteResult::from_affected(result.rows_affected()))
    }

    async fn soft_delete(&self, id: ProducerId) -> Result<DeleteResult> {
        let result = sqlx::query(
            "UPDATE producers SET deleted_at = $2 WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id.as_uuid())
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;
        Ok(DeleteResult::from_affected(result.rows_affected()))
    }

    async fn restore(&self, id: ProducerId) -> Result<DeleteResult> {
        let result = sqlx::query(
            "UPDATE producers SET deleted_at = NULL WHERE id = $1 AND deleted_at IS NOT NULL",
        )
        .bind(id.as_uuid())
        .execute(&self.pool)
        .await?;
        Ok(DeleteResult::from_affected(result.rows_affected()))
    }

    async fn paginate(&self, page: u32, limit: u32) -> Result<Page<Producer>> {
        let (page, limit) = clamp_page_params(page, limit);
        let total = self.count().await?;

        let rows = sqlx::query(&format!(
            "SELECT {PRODUCER_COLUMNS} FROM producers WHERE deleted_at IS NULL \
             ORDER BY created_at, id LIMIT $1 OFFSET $2"
        ))
        .bind(i64::from(limit))
        .bind(page_offset(page, limit))
        .fetch_all(&self.pool)
        .await?;

        let data = rows.iter().map(row_to_producer).collect::<Result<_>>()?;
        Ok(Page::new(data, total, page, limit))
    }
}

#[async_trait]
impl ProducerRepository for PgProducerRepository {
    async fn find_with_farms(&self, id: ProducerId) -> Result<Option<ProducerWithFarms>> {
        let Some(producer) = self.find_one(id).await? else {
            return Ok(None);
        };

        let rows = sqlx::query(&format!(
            "SELECT {FARM_COLUMNS} FROM farms WHERE producer_id = $1 AND deleted_at IS NULL \
             ORDER BY created_at, id"
        ))
        .bind(id.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        let farms = rows.iter().map(row_to_farm).collect::<Result<Vec<_>>>()?;
        Ok(Some(ProducerWithFarms { producer, farms }))
    }

    async fn find_with_farm_tree(&self, id: ProducerId) -> Result<Option<ProducerWithFarmTree>> {
        let Some(with_farms) = self.find_with_farms(id).await? else {
            return Ok(None);
        };

        let farm_ids: Vec<Uuid> = with_farms.farms.iter().map(|f| f.id.as_uuid()).collect();

        let crop_rows = sqlx::query(&format!(
            "SELECT {CROP_COLUMNS} FROM planted_crops \
             WHERE farm_id = ANY($1) AND deleted_at IS NULL ORDER BY created_at, id"
        ))
        .bind(&farm_ids)
        .fetch_all(&self.pool)
        .await?;

        let crops = crop_rows
            .iter()
            .map(row_to_crop)
            .collect::<Result<Vec<_>>>()?;

        let farms = with_farms
            .farms
            .into_iter()
            .map(|farm| {
                let planted_crops = crops
                    .iter()
                    .filter(|c| c.farm_id == farm.id)
                    .cloned()
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

/// Farm repository backed by PostgreSQL.
#[derive(Clone)]
pub struct PgFarmRepository {
    pool: PgPool,
}

impl PgFarmRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Repository<Farm> for PgFarmRepository {
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

        sqlx::query(
            "INSERT INTO farms (id, producer_id, name, city, state, total_area, \
                 agricultural_area, vegetation_area, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
        )
        .bind(farm.id.as_uuid())
        .bind(farm.producer_id.as_uuid())
        .bind(&farm.name)
        .bind(&farm.city)
        .bind(&farm.state)
        .bind(farm.total_area)
        .bind(farm.agricultural_area)
        .bind(farm.vegetation_area)
        .bind(farm.created_at)
        .bind(farm.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(farm)
    }

    async fn find_all(&self) -> Result<Vec<Farm>> {
        let rows = sqlx::query(&format!(
            "SELECT {FARM_COLUMNS} FROM farms WHERE deleted_at IS NULL ORDER BY created_at, id"
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_farm).collect()
    }

    async fn find_one(&self, id: FarmId) -> Result<Option<Farm>> {
        let row = sqlx::query(&format!(
            "SELECT {FARM_COLUMNS} FROM farms WHERE id = $1 AND deleted_at IS NULL"
        ))
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(row_to_farm).transpose()
    }

    async fn count(&self) -> Result<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM farms WHERE deleted_at IS NULL")
            .fetch_one(&self.pool)
            .await?;
        Ok(count as u64)
    }

    async fn exists(&self, id: FarmId) -> Result<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM farms WHERE id = $1 AND deleted_at IS NULL)",
        )
        .bind(id.as_uuid())
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    async fn update(&self, id: FarmId, patch: FarmPatch) -> Result<Option<Farm>> {
        sqlx::query(
            "UPDATE farms SET \
                 name = COALESCE($2, name), \
                 producer_id = COALESCE($3, producer_id), \
                 city = COALESCE($4, city), \
                 state = COALESCE($5, state), \
                 total_area = COALESCE($6, total_area), \
                 agricultural_area = COALESCE($7, agricultural_area), \
                 vegetation_area = COALESCE($8, vegetation_area), \
                 updated_at = $9 \
             WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id.as_uuid())
        .bind(patch.name)
        .bind(patch.producer_id.map(|p| p.as_uuid()))
        .bind(patch.city)
        .bind(patch.state)
        .bind(patch.total_area)
        .bind(patch.agricultural_area)
        .bind(patch.vegetation_area)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        self.find_one(id).await
    }

    async fn delete(&self, id: FarmId) -> Result<DeleteResult> {
        let result = sqlx::query("DELETE FROM farms WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await?;
        Ok(DeleteResult::from_affected(result.rows_affected()))
    }

    async fn soft_delete(&self, id: FarmId) -> Result<DeleteResult> {
        let result =
            sqlx::query("UPDATE farms SET deleted_at = $2 WHERE id = $1 AND deleted_at IS NULL")
                .bind(id.as_uuid())
                .bind(Utc::now())
                .execute(&self.pool)
                .await?;
        Ok(DeleteResult::from_affected(result.rows_affected()))
    }

    async fn restore(&self, id: FarmId) -> Result<DeleteResult> {
        let result = sqlx::query(
            "UPDATE farms SET deleted_at = NULL WHERE id = $1 AND deleted_at IS NOT NULL",
        )
        .bind(id.as_uuid())
        .execute(&self.pool)
        .await?;
        Ok(DeleteResult::from_affected(result.rows_affected()))
    }

    async fn paginate(&self, page: u32, limit: u32) -> Result<Page<Farm>> {
        let (page, limit) = clamp_page_params(page, limit);
        let total = self.count().await?;

        let rows = sqlx::query(&format!(
            "SELECT {FARM_COLUMNS} FROM farms WHERE deleted_at IS NULL \
             ORDER BY created_at, id LIMIT $1 OFFSET $2"
        ))
        .bind(i64::from(limit))
        .bind(page_offset(page, limit))
        .fetch_all(&self.pool)
        .await?;

        let data = rows.iter().map(row_to_farm).collect::<Result<_>>()?;
        Ok(Page::new(data, total, page, limit))
    }
}

#[async_trait]
impl FarmRepository for PgFarmRepository {
    async fn find_by_producer(&self, producer_id: ProducerId) -> Result<Vec<Farm>> {
        let rows = sqlx::query(&format!(
            "SELECT {FARM_COLUMNS} FROM farms WHERE producer_id = $1 AND deleted_at IS NULL \
             ORDER BY created_at, id"
        ))
        .bind(producer_id.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_farm).collect()
    }

    async fn find_by_producer_with_crops(
        &self,
        producer_id: ProducerId,
    ) -> Result<Vec<FarmWithCrops>> {
        let farms = self.find_by_producer(producer_id).await?;
        let farm_ids: Vec<Uuid> = farms.iter().map(|f| f.id.as_uuid()).collect();

        let crop_rows = sqlx::query(&format!(
            "SELECT {CROP_COLUMNS} FROM planted_crops \
             WHERE farm_id = ANY($1) AND deleted_at IS NULL ORDER BY created_at, id"
        ))
        .bind(&farm_ids)
        .fetch_all(&self.pool)
        .await?;

        let crops = crop_rows
            .iter()
            .map(row_to_crop)
            .collect::<Result<Vec<_>>>()?;

        Ok(farms
            .into_iter()
            .map(|farm| {
                let planted_crops = crops
                    .iter()
                    .filter(|c| c.farm_id == farm.id)
                    .cloned()
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

        let row = sqlx::query(&format!(
            "SELECT {PRODUCER_COLUMNS} FROM producers WHERE id = $1 AND deleted_at IS NULL"
        ))
        .bind(farm.producer_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        let producer = row.as_ref().map(row_to_producer).transpose()?;
        Ok(Some(FarmWithProducer { farm, producer }))
    }

    async fn total_hectares(&self) -> Result<f64> {
        let total: f64 = sqlx::query_scalar(
            "SELECT COALESCE(SUM(total_area), 0) FROM farms WHERE deleted_at IS NULL",
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(total)
    }

    async fn farms_by_state(&self) -> Result<Vec<StateCount>> {
        let rows = sqlx::query(
            "SELECT state AS name, COUNT(id) AS value, \
                    COALESCE(SUM(total_area), 0) AS total_area \
             FROM farms WHERE deleted_at IS NULL \
             GROUP BY state ORDER BY value DESC, name ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| {
                Ok(StateCount {
                    name: row.try_get("name")?,
                    value: row.try_get("value")?,
                    total_area: row.try_get("total_area")?,
                })
            })
            .collect()
    }

    async fn land_use(&self) -> Result<Vec<LandUse>> {
        let row = sqlx::query(
            "SELECT COALESCE(SUM(agricultural_area), 0) AS agricultural, \
                    COALESCE(SUM(vegetation_area), 0) AS vegetation \
             FROM farms WHERE deleted_at IS NULL",
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(vec![
            LandUse {
                name: "Área Agricultável".to_string(),
                value: row.try_get("agricultural")?,
            },
            LandUse {
                name: "Área de Vegetação".to_string(),
                value: row.try_get("vegetation")?,
            },
        ])
    }

    async fn averages(&self) -> Result<FarmAverages> {
        let row = sqlx::query(
            "SELECT COALESCE(AVG(total_area), 0) AS avg_farm_size, \
                    COALESCE(AVG(agricultural_area), 0) AS avg_agricultural_area, \
                    COALESCE(AVG(vegetation_area), 0) AS avg_vegetation_area \
             FROM farms WHERE deleted_at IS NULL",
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(FarmAverages {
            avg_farm_size: row.try_get("avg_farm_size")?,
            avg_agricultural_area: row.try_get("avg_agricultural_area")?,
            avg_vegetation_area: row.try_get("avg_vegetation_area")?,
        })
    }

    async fn state_statistics(&self) -> Result<Vec<StateStatistics>> {
        let rows = sqlx::query(
            "SELECT state, COUNT(id) AS farm_count, \
                    COALESCE(SUM(total_area), 0) AS total_area, \
                    COALESCE(AVG(total_area), 0) AS avg_area, \
                    COALESCE(SUM(agricultural_area), 0) AS total_agricultural, \
                    COALESCE(SUM(vegetation_area), 0) AS total_vegetation \
             FROM farms WHERE deleted_at IS NULL \
             GROUP BY state ORDER BY total_area DESC, state ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| {
                Ok(StateStatistics {
                    state: row.try_get("state")?,
                    farm_count: row.try_get("farm_count")?,
                    total_area: row.try_get("total_area")?,
                    avg_area: row.try_get("avg_area")?,
                    total_agricultural: row.try_get("total_agricultural")?,
                    total_vegetation: row.try_get("total_vegetation")?,
                })
            })
            .collect()
    }

    async fn top_productive_farms(&self, limit: u32) -> Result<Vec<ProductiveFarm>> {
        let rows = sqlx::query(
            "SELECT f.id, f.name, f.city, f.state, f.total_area, f.agricultural_area, \
                    p.name AS producer_name, COUNT(c.id) AS crop_count \
             FROM farms f \
             LEFT JOIN producers p ON p.id = f.producer_id AND p.deleted_at IS NULL \
             LEFT JOIN planted_crops c ON c.farm_id = f.id AND c.deleted_at IS NULL \
             WHERE f.deleted_at IS NULL \
             GROUP BY f.id, f.name, f.city, f.state, f.total_area, f.agricultural_area, p.name \
             ORDER BY f.agricultural_area DESC, f.name ASC \
             LIMIT $1",
        )
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| {
                Ok(ProductiveFarm {
                    id: FarmId::from_uuid(row.try_get::<Uuid, _>("id")?),
                    name: row.try_get("name")?,
                    city: row.try_get("city")?,
                    state: row.try_get("state")?,
                    total_area: row.try_get("total_area")?,
                    agricultural_area: row.try_get("agricultural_area")?,
                    producer_name: row.try_get("producer_name")?,
                    crop_count: row.try_get("crop_count")?,
                })
            })
            .collect()
    }
}

// -- Planted crops --

/// Planted-crop repository backed by PostgreSQL.
#[derive(Clone)]
pub struct PgPlantedCropRepository {
    pool: PgPool,
}

impl PgPlantedCropRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Repository<PlantedCrop> for PgPlantedCropRepository {
    async fn create(&self, data: NewPlantedCrop) -> Result<PlantedCrop> {
        let now = Utc::now();
        let crop = PlantedCrop {
            id: CropId::new(),
            farm_id: data.farm_id,
            name: data.name,
            created_at: now,
            updated_at: now,
        };

        sqlx::query(
            "INSERT INTO planted_crops (id, farm_id, name, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(crop.id.as_uuid())
        .bind(crop.farm_id.as_uuid())
        .bind(&crop.name)
        .bind(crop.created_at)
        .bind(crop.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(crop)
    }

    async fn find_all(&self) -> Result<Vec<PlantedCrop>> {
        let rows = sqlx::query(&format!(
            "SELECT {CROP_COLUMNS} FROM planted_crops WHERE deleted_at IS NULL \
             ORDER BY created_at, id"
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_crop).collect()
    }

    async fn find_one(&self, id: CropId) -> Result<Option<PlantedCrop>> {
        let row = sqlx::query(&format!(
            "SELECT {CROP_COLUMNS} FROM planted_crops WHERE id = $1 AND deleted_at IS NULL"
        ))
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(row_to_crop).transpose()
    }

    async fn count(&self) -> Result<u64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM planted_crops WHERE deleted_at IS NULL")
                .fetch_one(&self.pool)
                .await?;
        Ok(count as u64)
    }

    async fn exists(&self, id: CropId) -> Result<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM planted_crops WHERE id = $1 AND deleted_at IS NULL)",
        )
        .bind(id.as_uuid())
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    async fn update(&self, id: CropId, patch: PlantedCropPatch) -> Result<Option<PlantedCrop>> {
        sqlx::query(
            "UPDATE planted_crops SET \
                 name = COALESCE($2, name), \
                 farm_id = COALESCE($3, farm_id), \
                 updated_at = $4 \
             WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id.as_uuid())
        .bind(patch.name)
        .bind(patch.farm_id.map(|f| f.as_uuid()))
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        self.find_one(id).await
    }

    async fn delete(&self, id: CropId) -> Result<DeleteResult> {
        let result = sqlx::query("DELETE FROM planted_crops WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await?;
        Ok(DeleteResult::from_affected(result.rows_affected()))
    }

    async fn soft_delete(&self, id: CropId) -> Result<DeleteResult> {
        let result = sqlx::query(
            "UPDATE planted_crops SET deleted_at = $2 WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id.as_uuid())
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;
        Ok(DeleteResult::from_affected(result.rows_affected()))
    }

    async fn restore(&self, id: CropId) -> Result<DeleteResult> {
        let result = sqlx::query(
            "UPDATE planted_crops SET deleted_at = NULL WHERE id = $1 AND deleted_at IS NOT NULL",
        )
        .bind(id.as_uuid())
        .execute(&self.pool)
        .await?;
        Ok(DeleteResult::from_affected(result.rows_affected()))
    }

    async fn paginate(&self, page: u32, limit: u32) -> Result<Page<PlantedCrop>> {
        let (page, limit) = clamp_page_params(page, limit);
        let total = self.count().await?;

        let rows = sqlx::query(&format!(
            "SELECT {CROP_COLUMNS} FROM planted_crops WHERE deleted_at IS NULL \
             ORDER BY created_at, id LIMIT $1 OFFSET $2"
        ))
        .bind(i64::from(limit))
        .bind(page_offset(page, limit))
        .fetch_all(&self.pool)
        .await?;

        let data = rows.iter().map(row_to_crop).collect::<Result<_>>()?;
        Ok(Page::new(data, total, page, limit))
    }
}

#[async_trait]
impl PlantedCropRepository for PgPlantedCropRepository {
    async fn find_by_farm(&self, farm_id: FarmId) -> Result<Vec<PlantedCrop>> {
        let rows = sqlx::query(&format!(
            "SELECT {CROP_COLUMNS} FROM planted_crops \
             WHERE farm_id = $1 AND deleted_at IS NULL ORDER BY created_at, id"
        ))
        .bind(farm_id.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_crop).collect()
    }

    async fn find_with_farm(&self, id: CropId) -> Result<Option<PlantedCropWithFarm>> {
        let Some(crop) = self.find_one(id).await? else {
            return Ok(None);
        };

        let row = sqlx::query(&format!(
            "SELECT {FARM_COLUMNS} FROM farms WHERE id = $1 AND deleted_at IS NULL"
        ))
        .bind(crop.farm_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        let farm = row.as_ref().map(row_to_farm).transpose()?;
        Ok(Some(PlantedCropWithFarm { crop, farm }))
    }

    async fn crops_by_type(&self) -> Result<Vec<CropCount>> {
        let rows = sqlx::query(
            "SELECT name, COUNT(id) AS value FROM planted_crops WHERE deleted_at IS NULL \
             GROUP BY name ORDER BY value DESC, name ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| {
                Ok(CropCount {
                    name: row.try_get("name")?,
                    value: row.try_get("value")?,
                    total_area: 0.0,
                })
            })
            .collect()
    }

    async fn crop_statistics(&self) -> Result<Vec<CropStatistics>> {
        let rows = sqlx::query(
            "SELECT c.name AS crop_name, COUNT(c.id) AS plant_count, \
                    COUNT(DISTINCT f.id) AS farm_count \
             FROM planted_crops c \
             LEFT JOIN farms f ON f.id = c.farm_id AND f.deleted_at IS NULL \
             WHERE c.deleted_at IS NULL \
             GROUP BY c.name ORDER BY plant_count DESC, crop_name ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| {
                Ok(CropStatistics {
                    crop_name: row.try_get("crop_name")?,
                    plant_count: row.try_get("plant_count")?,
                    farm_count: row.try_get("farm_count")?,
                })
            })
            .collect()
    }
}
