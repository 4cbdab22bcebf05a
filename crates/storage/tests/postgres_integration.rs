//! PostgreSQL integration tests
//!
//! These tests share a single PostgreSQL container; each test truncates
//! the tables, so they are serialized with `#[serial]`. Run with:
//!
//! ```bash
//! cargo test -p storage --test postgres_integration
//! ```

use std::sync::Arc;

use common::{FarmId, ProducerId};
use domain::{
    DocumentType, FarmPatch, NewFarm, NewPlantedCrop, NewProducer, ProducerPatch,
};
use serial_test::serial;
use sqlx::PgPool;
use storage::{
    FarmRepository, PgRepositories, PlantedCropRepository, ProducerRepository, Repositories,
    Repository,
};
use testcontainers::{ContainerAsync, runners::AsyncRunner};
use testcontainers_modules::postgres::Postgres;
use tokio::sync::OnceCell;

/// Shared container info - container stays alive for all tests
struct ContainerInfo {
    #[allow(dead_code)] // Container must stay alive for tests
    container: ContainerAsync<Postgres>,
    connection_string: String,
}

/// Global shared container
static CONTAINER: OnceCell<Arc<ContainerInfo>> = OnceCell::const_new();

async fn get_container_info() -> Arc<ContainerInfo> {
    CONTAINER
        .get_or_init(|| async {
            let container = Postgres::default().start().await.unwrap();

            let host = container.get_host().await.unwrap();
            let port = container.get_host_port_ipv4(5432).await.unwrap();

            let connection_string =
                format!("postgres://postgres:postgres@{}:{}/postgres", host, port);

            // Create a temporary pool just for migrations
            let temp_pool = PgPool::connect(&connection_string).await.unwrap();
            PgRepositories::new(temp_pool.clone())
                .run_migrations()
                .await
                .unwrap();
            temp_pool.close().await;

            Arc::new(ContainerInfo {
                container,
                connection_string,
            })
        })
        .await
        .clone()
}

/// Get fresh repositories with their own pool and cleared tables
async fn get_test_repos() -> PgRepositories {
    let info = get_container_info().await;

    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(5)
        .connect(&info.connection_string)
        .await
        .unwrap();

    // Clear tables for test isolation
    sqlx::query("TRUNCATE TABLE planted_crops, farms, producers")
        .execute(&pool)
        .await
        .unwrap();

    PgRepositories::new(pool)
}

fn john() -> NewProducer {
    NewProducer {
        name: "Jhon Doe".to_string(),
        document: "52998224725".to_string(),
        document_type: Some(DocumentType::Pf),
    }
}

fn farm_for(producer_id: ProducerId, name: &str, state: &str, total_area: f64) -> NewFarm {
    NewFarm {
        name: name.to_string(),
        producer_id,
        city: "Ribeirão Preto".to_string(),
        state: state.to_string(),
        total_area: Some(total_area),
        agricultural_area: Some(total_area / 2.0),
        vegetation_area: Some(total_area / 4.0),
    }
}

#[tokio::test]
#[serial]
async fn create_and_find_producer() {
    let repos = get_test_repos().await;

    let producer = repos.producers().create(john()).await.unwrap();
    assert_eq!(producer.name, "Jhon Doe");
    assert_eq!(producer.document_type, DocumentType::Pf);

    let found = repos.producers().find_one(producer.id).await.unwrap();
    assert_eq!(found, Some(producer.clone()));

    assert!(repos.producers().exists(producer.id).await.unwrap());
    assert!(!repos.producers().exists(ProducerId::new()).await.unwrap());
    assert_eq!(repos.producers().count().await.unwrap(), 1);
}

#[tokio::test]
#[serial]
async fn partial_update_keeps_untouched_columns() {
    let repos = get_test_repos().await;

    let producer = repos.producers().create(john()).await.unwrap();
    let updated = repos
        .producers()
        .update(
            producer.id,
            ProducerPatch {
                name: Some("Jane Doe".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .unwrap();

    assert_eq!(updated.name, "Jane Doe");
    assert_eq!(updated.document, producer.document);
    assert_eq!(updated.document_type, producer.document_type);
    assert!(updated.updated_at >= producer.updated_at);

    let missing = repos
        .producers()
        .update(ProducerId::new(), ProducerPatch::default())
        .await
        .unwrap();
    assert!(missing.is_none());
}

#[tokio::test]
#[serial]
async fn soft_delete_hides_and_restore_revives() {
    let repos = get_test_repos().await;

    let producer = repos.producers().create(john()).await.unwrap();

    let result = repos.producers().soft_delete(producer.id).await.unwrap();
    assert!(result.success);
    assert_eq!(result.affected, 1);

    assert!(repos.producers().find_one(producer.id).await.unwrap().is_none());
    assert_eq!(repos.producers().count().await.unwrap(), 0);

    let restored = repos.producers().restore(producer.id).await.unwrap();
    assert!(restored.success);
    assert!(repos.producers().find_one(producer.id).await.unwrap().is_some());
}

#[tokio::test]
#[serial]
async fn pagination_reports_total_pages() {
    let repos = get_test_repos().await;

    for i in 0..25 {
        repos
            .producers()
            .create(NewProducer {
                name: format!("Producer {i:02}"),
                document: "52998224725".to_string(),
                document_type: Some(DocumentType::Pf),
            })
            .await
            .unwrap();
    }

    let page = repos.producers().paginate(2, 10).await.unwrap();
    assert_eq!(page.data.len(), 10);
    assert_eq!(page.total, 25);
    assert_eq!(page.page, 2);
    assert_eq!(page.limit, 10);
    assert_eq!(page.total_pages, 3);

    // Stable creation order
    assert_eq!(page.data[0].name, "Producer 10");
}

#[tokio::test]
#[serial]
async fn farm_relations_and_delete_result() {
    let repos = get_test_repos().await;

    let producer = repos.producers().create(john()).await.unwrap();
    let farm = repos
        .farms()
        .create(farm_for(producer.id, "Fazenda São João", "São Paulo", 1000.0))
        .await
        .unwrap();

    repos
        .planted_crops()
        .create(NewPlantedCrop {
            name: "Soja".to_string(),
            farm_id: farm.id,
        })
        .await
        .unwrap();
    repos
        .planted_crops()
        .create(NewPlantedCrop {
            name: "Milho".to_string(),
            farm_id: farm.id,
        })
        .await
        .unwrap();

    let with_producer = repos.farms().find_with_producer(farm.id).await.unwrap().unwrap();
    assert_eq!(with_producer.producer.unwrap().id, producer.id);

    let with_crops = repos
        .farms()
        .find_by_producer_with_crops(producer.id)
        .await
        .unwrap();
    assert_eq!(with_crops.len(), 1);
    assert_eq!(with_crops[0].planted_crops.len(), 2);

    let tree = repos
        .producers()
        .find_with_farm_tree(producer.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(tree.farms.len(), 1);
    assert_eq!(tree.crop_count(), 2);

    let gone = repos.farms().delete(FarmId::new()).await.unwrap();
    assert!(!gone.success);
    assert_eq!(gone.affected, 0);

    // FK cascade removes the crops with the farm.
    let deleted = repos.farms().delete(farm.id).await.unwrap();
    assert!(deleted.success);
    assert_eq!(repos.planted_crops().count().await.unwrap(), 0);
}

#[tokio::test]
#[serial]
async fn dashboard_aggregates() {
    let repos = get_test_repos().await;

    let producer = repos.producers().create(john()).await.unwrap();
    let sp1 = repos
        .farms()
        .create(farm_for(producer.id, "Fazenda A", "São Paulo", 1000.0))
        .await
        .unwrap();
    repos
        .farms()
        .create(farm_for(producer.id, "Fazenda B", "São Paulo", 500.0))
        .await
        .unwrap();
    let mg = repos
        .farms()
        .create(farm_for(producer.id, "Fazenda C", "Minas Gerais", 2000.0))
        .await
        .unwrap();

    for (name, farm_id) in [("Soja", sp1.id), ("Soja", mg.id), ("Café", mg.id)] {
        repos
            .planted_crops()
            .create(NewPlantedCrop {
                name: name.to_string(),
                farm_id,
            })
            .await
            .unwrap();
    }

    assert_eq!(repos.farms().total_hectares().await.unwrap(), 3500.0);

    let by_state = repos.farms().farms_by_state().await.unwrap();
    assert_eq!(by_state.len(), 2);
    assert_eq!(by_state[0].name, "São Paulo");
    assert_eq!(by_state[0].value, 2);
    assert_eq!(by_state[1].name, "Minas Gerais");
    assert_eq!(by_state[1].value, 1);

    let by_type = repos.planted_crops().crops_by_type().await.unwrap();
    assert_eq!(by_type[0].name, "Soja");
    assert_eq!(by_type[0].value, 2);

    let land_use = repos.farms().land_use().await.unwrap();
    assert_eq!(land_use.len(), 2);
    let agricultural = land_use
        .iter()
        .find(|l| l.name == "Área Agricultável")
        .unwrap();
    assert_eq!(agricultural.value, 1750.0);

    let averages = repos.farms().averages().await.unwrap();
    assert!((averages.avg_farm_size - 3500.0 / 3.0).abs() < 1e-6);

    let stats = repos.farms().state_statistics().await.unwrap();
    assert_eq!(stats[0].state, "Minas Gerais");
    assert_eq!(stats[0].farm_count, 1);
    assert_eq!(stats[0].total_area, 2000.0);

    let top = repos.farms().top_productive_farms(2).await.unwrap();
    assert_eq!(top.len(), 2);
    assert_eq!(top[0].name, "Fazenda C");
    assert_eq!(top[0].crop_count, 2);
    assert_eq!(top[0].producer_name.as_deref(), Some("Jhon Doe"));

    let crop_stats = repos.planted_crops().crop_statistics().await.unwrap();
    let soja = crop_stats.iter().find(|c| c.crop_name == "Soja").unwrap();
    assert_eq!(soja.plant_count, 2);
    assert_eq!(soja.farm_count, 2);
}

#[tokio::test]
#[serial]
async fn aggregates_are_zero_on_empty_database() {
    let repos = get_test_repos().await;

    assert_eq!(repos.farms().total_hectares().await.unwrap(), 0.0);
    assert!(repos.farms().farms_by_state().await.unwrap().is_empty());
    assert!(repos.planted_crops().crops_by_type().await.unwrap().is_empty());

    let averages = repos.farms().averages().await.unwrap();
    assert_eq!(averages.avg_farm_size, 0.0);
    assert_eq!(averages.avg_agricultural_area, 0.0);
    assert_eq!(averages.avg_vegetation_area, 0.0);

    let land_use = repos.farms().land_use().await.unwrap();
    assert!(land_use.iter().all(|l| l.value == 0.0));
}

#[tokio::test]
#[serial]
async fn farm_patch_updates_areas() {
    let repos = get_test_repos().await;

    let producer = repos.producers().create(john()).await.unwrap();
    let farm = repos
        .farms()
        .create(farm_for(producer.id, "Fazenda Velha", "Goiás", 100.0))
        .await
        .unwrap();

    let updated = repos
        .farms()
        .update(
            farm.id,
            FarmPatch {
                total_area: Some(400.0),
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .unwrap();

    assert_eq!(updated.total_area, 400.0);
    assert_eq!(updated.name, "Fazenda Velha");
    assert_eq!(updated.agricultural_area, farm.agricultural_area);
}
