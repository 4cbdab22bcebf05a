//! Integration tests for the producer cascading delete.

use application::{ApplicationError, FarmService, PlantedCropService, ProducerService};
use common::ProducerId;
use domain::{NewFarm, NewPlantedCrop, NewProducer};
use storage::{InMemoryRepositories, Repositories, Repository};

fn services(
    repos: &InMemoryRepositories,
) -> (
    ProducerService<InMemoryRepositories>,
    FarmService<InMemoryRepositories>,
    PlantedCropService<InMemoryRepositories>,
) {
    (
        ProducerService::new(repos.clone()),
        FarmService::new(repos.clone()),
        PlantedCropService::new(repos.clone()),
    )
}

fn new_farm(producer_id: common::ProducerId, name: &str, total_area: f64) -> NewFarm {
    NewFarm {
        name: name.to_string(),
        producer_id,
        city: "Ribeirão Preto".to_string(),
        state: "São Paulo".to_string(),
        total_area: Some(total_area),
        agricultural_area: Some(total_area / 2.0),
        vegetation_area: Some(total_area / 4.0),
    }
}

#[tokio::test]
async fn cascade_deletes_crops_then_farms_then_producer() {
    let repos = InMemoryRepositories::new();
    let (producers, farms, crops) = services(&repos);

    let producer = producers
        .create(NewProducer {
            name: "Jhon Doe".to_string(),
            document: "52998224725".to_string(),
            document_type: None,
        })
        .await
        .unwrap();

    let farm_with_crops = farms
        .create(new_farm(producer.id, "Fazenda São João", 1000.0))
        .await
        .unwrap();
    let farm_without_crops = farms
        .create(new_farm(producer.id, "Fazenda Nova", 500.0))
        .await
        .unwrap();

    for name in ["Soja", "Milho"] {
        crops
            .create(NewPlantedCrop {
                name: name.to_string(),
                farm_id: farm_with_crops.id,
            })
            .await
            .unwrap();
    }

    let outcome = producers.delete(producer.id).await.unwrap();

    assert!(outcome.success);
    assert_eq!(
        outcome.message,
        "Producer and all related entities deleted successfully"
    );
    assert_eq!(outcome.deleted_entities.producer, 1);
    assert_eq!(outcome.deleted_entities.farms, 2);
    assert_eq!(outcome.deleted_entities.planted_crops, 2);
    assert_eq!(outcome.deleted_entities.total_entities, 5);
    assert_eq!(outcome.deleted_entities.total_farm_area, 1500.0);
    assert_eq!(outcome.deleted_entities.farm_ids.len(), 2);
    assert!(outcome.deleted_entities.farm_ids.contains(&farm_with_crops.id));
    assert!(outcome.deleted_entities.farm_ids.contains(&farm_without_crops.id));

    // Exactly one delete call per row, leaf to root.
    assert_eq!(repos.crop_delete_calls(), 2);
    assert_eq!(repos.farm_delete_calls(), 2);
    assert_eq!(repos.producer_delete_calls(), 1);

    // Everything is gone.
    assert_eq!(repos.producers().count().await.unwrap(), 0);
    assert_eq!(repos.farms().count().await.unwrap(), 0);
    assert_eq!(repos.planted_crops().count().await.unwrap(), 0);
}

#[tokio::test]
async fn deleting_unknown_producer_issues_no_delete_calls() {
    let repos = InMemoryRepositories::new();
    let (producers, farms, crops) = services(&repos);

    let producer = producers
        .create(NewProducer {
            name: "Jane Doe".to_string(),
            document: "11144477735".to_string(),
            document_type: None,
        })
        .await
        .unwrap();
    let farm = farms
        .create(new_farm(producer.id, "Fazenda Boa Vista", 200.0))
        .await
        .unwrap();
    crops
        .create(NewPlantedCrop {
            name: "Café".to_string(),
            farm_id: farm.id,
        })
        .await
        .unwrap();

    let err = producers.delete(ProducerId::new()).await.unwrap_err();
    assert!(matches!(err, ApplicationError::NotFound(_)));

    assert_eq!(repos.crop_delete_calls(), 0);
    assert_eq!(repos.farm_delete_calls(), 0);
    assert_eq!(repos.producer_delete_calls(), 0);

    // Unrelated data is untouched.
    assert_eq!(repos.producers().count().await.unwrap(), 1);
    assert_eq!(repos.farms().count().await.unwrap(), 1);
    assert_eq!(repos.planted_crops().count().await.unwrap(), 1);
}

#[tokio::test]
async fn delete_outcome_serializes_expected_shape() {
    let repos = InMemoryRepositories::new();
    let (producers, _, _) = services(&repos);

    let producer = producers
        .create(NewProducer {
            name: "Jhon Doe".to_string(),
            document: "52998224725".to_string(),
            document_type: None,
        })
        .await
        .unwrap();

    let outcome = producers.delete(producer.id).await.unwrap();
    let json = serde_json::to_value(&outcome).unwrap();

    assert_eq!(json["success"], true);
    assert_eq!(json["deletedEntities"]["totalEntities"], 1);
    assert_eq!(json["deletedEntities"]["plantedCrops"], 0);
    assert_eq!(json["deletedEntities"]["totalFarmArea"], 0.0);
    assert!(json["duration"].is_u64());
}

#[tokio::test]
async fn producer_create_infers_type_and_get_loads_farms() {
    let repos = InMemoryRepositories::new();
    let (producers, farms, _) = services(&repos);

    let producer = producers
        .create(NewProducer {
            name: "Agro Ltda".to_string(),
            document: "11222333000181".to_string(),
            document_type: None,
        })
        .await
        .unwrap();
    assert_eq!(producer.document_type, domain::DocumentType::Pj);

    farms
        .create(new_farm(producer.id, "Fazenda Central", 300.0))
        .await
        .unwrap();

    let loaded = producers.get_by_id(producer.id).await.unwrap();
    assert_eq!(loaded.farms.len(), 1);
    assert_eq!(loaded.producer.id, producer.id);

    let err = producers.get_by_id(ProducerId::new()).await.unwrap_err();
    assert!(matches!(err, ApplicationError::NotFound(_)));
}

#[tokio::test]
async fn farm_create_rejects_area_sum_violation() {
    let repos = InMemoryRepositories::new();
    let (producers, farms, _) = services(&repos);

    let producer = producers
        .create(NewProducer {
            name: "Jhon Doe".to_string(),
            document: "52998224725".to_string(),
            document_type: None,
        })
        .await
        .unwrap();

    let err = farms
        .create(NewFarm {
            name: "Fazenda Errada".to_string(),
            producer_id: producer.id,
            city: "Campinas".to_string(),
            state: "São Paulo".to_string(),
            total_area: Some(100.0),
            agricultural_area: Some(80.0),
            vegetation_area: Some(30.0),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, ApplicationError::Validation(_)));

    // Equality is accepted.
    let farm = farms
        .create(NewFarm {
            name: "Fazenda Justa".to_string(),
            producer_id: producer.id,
            city: "Campinas".to_string(),
            state: "São Paulo".to_string(),
            total_area: Some(100.0),
            agricultural_area: Some(70.0),
            vegetation_area: Some(30.0),
        })
        .await
        .unwrap();
    assert_eq!(farm.total_area, 100.0);
}
