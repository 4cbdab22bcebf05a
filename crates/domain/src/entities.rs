//! Entities for the producer / farm / planted-crop domain.
//!
//! Each entity has three shapes: the persisted row, the `New*` creation
//! input and the `*Patch` partial update. Relation-bearing composites
//! flatten the owning entity so serialized output matches the flat entity
//! plus its relation fields.

use chrono::{DateTime, Utc};
use common::{CropId, FarmId, ProducerId};
use serde::{Deserialize, Serialize};

use crate::document::DocumentType;

/// An individual or company owning one or more farms.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Producer {
    pub id: ProducerId,
    pub name: String,
    /// CPF or CNPJ, stored as supplied (checksum-validated at the boundary).
    pub document: String,
    pub document_type: DocumentType,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Creation input for a producer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewProducer {
    pub name: String,
    pub document: String,
    /// Inferred from the document length when absent.
    pub document_type: Option<DocumentType>,
}

/// Partial update of a producer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProducerPatch {
    pub name: Option<String>,
    pub document: Option<String>,
    pub document_type: Option<DocumentType>,
}

impl ProducerPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.document.is_none() && self.document_type.is_none()
    }
}

/// A land property belonging to one producer. Areas are in hectares.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Farm {
    pub id: FarmId,
    pub producer_id: ProducerId,
    pub name: String,
    pub city: String,
    pub state: String,
    pub total_area: f64,
    pub agricultural_area: f64,
    pub vegetation_area: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Creation input for a farm. Missing areas default to zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewFarm {
    pub name: String,
    pub producer_id: ProducerId,
    pub city: String,
    pub state: String,
    pub total_area: Option<f64>,
    pub agricultural_area: Option<f64>,
    pub vegetation_area: Option<f64>,
}

/// Partial update of a farm. A `producer_id` moves the farm to another
/// producer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FarmPatch {
    pub name: Option<String>,
    pub producer_id: Option<ProducerId>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub total_area: Option<f64>,
    pub agricultural_area: Option<f64>,
    pub vegetation_area: Option<f64>,
}

impl FarmPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.producer_id.is_none()
            && self.city.is_none()
            && self.state.is_none()
            && self.total_area.is_none()
            && self.agricultural_area.is_none()
            && self.vegetation_area.is_none()
    }
}

/// A crop-type record belonging to one farm.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlantedCrop {
    pub id: CropId,
    pub farm_id: FarmId,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Creation input for a planted crop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewPlantedCrop {
    pub name: String,
    pub farm_id: FarmId,
}

/// Partial update of a planted crop.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlantedCropPatch {
    pub name: Option<String>,
    pub farm_id: Option<FarmId>,
}

impl PlantedCropPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.farm_id.is_none()
    }
}

/// A producer with its farms eagerly loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProducerWithFarms {
    #[serde(flatten)]
    pub producer: Producer,
    pub farms: Vec<Farm>,
}

/// A farm with its planted crops eagerly loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FarmWithCrops {
    #[serde(flatten)]
    pub farm: Farm,
    pub planted_crops: Vec<PlantedCrop>,
}

/// A producer with the full farm/crop tree, as needed by cascade deletion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProducerWithFarmTree {
    #[serde(flatten)]
    pub producer: Producer,
    pub farms: Vec<FarmWithCrops>,
}

impl ProducerWithFarmTree {
    /// Total number of planted crops across all farms.
    pub fn crop_count(&self) -> usize {
        self.farms.iter().map(|f| f.planted_crops.len()).sum()
    }
}

/// A farm with its owning producer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FarmWithProducer {
    #[serde(flatten)]
    pub farm: Farm,
    pub producer: Option<Producer>,
}

/// A planted crop with its owning farm.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlantedCropWithFarm {
    #[serde(flatten)]
    pub crop: PlantedCrop,
    pub farm: Option<Farm>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_producer() -> Producer {
        Producer {
            id: ProducerId::new(),
            name: "Jhon Doe".to_string(),
            document: "52998224725".to_string(),
            document_type: DocumentType::Pf,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn producer_with_farms_serializes_flat() {
        let producer = sample_producer();
        let with_farms = ProducerWithFarms {
            producer: producer.clone(),
            farms: vec![],
        };

        let json = serde_json::to_value(&with_farms).unwrap();
        assert_eq!(json["id"], serde_json::to_value(producer.id).unwrap());
        assert_eq!(json["name"], "Jhon Doe");
        assert_eq!(json["document_type"], "pf");
        assert!(json["farms"].as_array().unwrap().is_empty());
    }

    #[test]
    fn empty_patches_report_empty() {
        assert!(ProducerPatch::default().is_empty());
        assert!(FarmPatch::default().is_empty());
        assert!(PlantedCropPatch::default().is_empty());
        assert!(
            !ProducerPatch {
                name: Some("x".into()),
                ..Default::default()
            }
            .is_empty()
        );
    }

    #[test]
    fn farm_tree_crop_count_sums_over_farms() {
        let producer = sample_producer();
        let farm_id = FarmId::new();
        let farm = Farm {
            id: farm_id,
            producer_id: producer.id,
            name: "Fazenda São João".to_string(),
            city: "São Paulo".to_string(),
            state: "São Paulo".to_string(),
            total_area: 1000.0,
            agricultural_area: 600.0,
            vegetation_area: 300.0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let crop = |name: &str| PlantedCrop {
            id: CropId::new(),
            farm_id,
            name: name.to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let tree = ProducerWithFarmTree {
            producer,
            farms: vec![
                FarmWithCrops {
                    farm: farm.clone(),
                    planted_crops: vec![crop("Soja"), crop("Milho")],
                },
                FarmWithCrops {
                    farm,
                    planted_crops: vec![],
                },
            ],
        };

        assert_eq!(tree.crop_count(), 2);
    }
}
