//! Domain layer for the agro backend.
//!
//! This crate provides the core domain model:
//! - Producer, Farm and PlantedCrop entities with their create/patch shapes
//! - CPF/CNPJ document validation and classification
//! - The cross-field farm area constraint
//! - Document masking for log output

pub mod area;
pub mod document;
pub mod entities;
pub mod error;

pub use area::validate_areas;
pub use document::{
    DocumentType, clean_document, is_valid_cnpj, is_valid_cpf, is_valid_document, mask_document,
};
pub use entities::{
    Farm, FarmPatch, FarmWithCrops, FarmWithProducer, NewFarm, NewPlantedCrop, NewProducer,
    PlantedCrop, PlantedCropPatch, PlantedCropWithFarm, Producer, ProducerPatch,
    ProducerWithFarmTree, ProducerWithFarms,
};
pub use error::DomainError;
