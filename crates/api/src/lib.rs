//! HTTP API server with observability for the rural producer backend.
//!
//! Provides REST endpoints for producers, farms and planted crops plus the
//! dashboard aggregation, with structured logging (tracing) and Prometheus
//! metrics. Handlers are generic over the [`storage::Repositories`]
//! provider, so the same router serves PostgreSQL in production and the
//! in-memory backend in tests.

pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use application::{DashboardService, FarmService, PlantedCropService, ProducerService};
use axum::Router;
use axum::routing::get;
use metrics_exporter_prometheus::PrometheusHandle;
use storage::Repositories;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Shared application state accessible from all handlers.
pub struct AppState<R: Repositories> {
    pub producers: ProducerService<R>,
    pub farms: FarmService<R>,
    pub planted_crops: PlantedCropService<R>,
    pub dashboard: DashboardService<R>,
}

/// Builds the application state on top of a repository provider.
pub fn create_state<R: Repositories>(repos: R) -> Arc<AppState<R>> {
    Arc::new(AppState {
        producers: ProducerService::new(repos.clone()),
        farms: FarmService::new(repos.clone()),
        planted_crops: PlantedCropService::new(repos.clone()),
        dashboard: DashboardService::new(repos),
    })
}

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<R: Repositories>(
    state: Arc<AppState<R>>,
    metrics_handle: PrometheusHandle,
) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        .route(
            "/producers",
            get(routes::producers::list::<R>).post(routes::producers::create::<R>),
        )
        .route(
            "/producers/{id}",
            get(routes::producers::get::<R>)
                .patch(routes::producers::update::<R>)
                .delete(routes::producers::delete::<R>),
        )
        .route(
            "/farms",
            get(routes::farms::list::<R>).post(routes::farms::create::<R>),
        )
        .route(
            "/farms/{id}",
            get(routes::farms::get::<R>)
                .patch(routes::farms::update::<R>)
                .delete(routes::farms::delete::<R>),
        )
        .route(
            "/planted-crops",
            get(routes::planted_crops::list::<R>).post(routes::planted_crops::create::<R>),
        )
        .route(
            "/planted-crops/{id}",
            get(routes::planted_crops::get::<R>)
                .patch(routes::planted_crops::update::<R>)
                .delete(routes::planted_crops::delete::<R>),
        )
        .route("/dashboard", get(routes::dashboard::summary::<R>))
        .route("/dashboard/states", get(routes::dashboard::states::<R>))
        .route("/dashboard/crops", get(routes::dashboard::crops::<R>))
        .route("/dashboard/top-farms", get(routes::dashboard::top_farms::<R>))
        .with_state(state)
        .merge(metrics_router)
        .layer(axum::middleware::from_fn(error::error_envelope))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}
