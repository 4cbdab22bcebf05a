//! Data access layer for the agro backend.
//!
//! This crate defines the generic repository contract shared by every
//! entity, the per-resource repository traits with their aggregate
//! queries, and two implementations:
//! - [`postgres`] — the production PostgreSQL implementation over `sqlx`
//! - [`memory`] — an in-memory implementation for tests

pub mod error;
pub mod memory;
pub mod postgres;
pub mod repository;

pub use error::{Result, StorageError};
pub use memory::{
    InMemoryFarmRepository, InMemoryPlantedCropRepository, InMemoryProducerRepository,
    InMemoryRepositories,
};
pub use postgres::{
    PgFarmRepository, PgPlantedCropRepository, PgProducerRepository, PgRepositories,
};
pub use repository::{
    CropCount, CropStatistics, DeleteResult, Entity, FarmAverages, FarmRepository, LandUse, Page,
    PlantedCropRepository, ProducerRepository, ProductiveFarm, Repositories, Repository,
    StateCount, StateStatistics,
};
