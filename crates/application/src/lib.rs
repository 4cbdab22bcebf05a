//! Use-case layer for the agro backend.
//!
//! One service per resource orchestrates repository calls, business-event
//! logging and metrics. Services are storage-agnostic: they work over any
//! [`storage::Repositories`] provider and propagate storage errors
//! unmodified. The most involved operation is the producer cascading
//! delete in [`producer`]; the dashboard aggregation lives in
//! [`dashboard`].

pub mod dashboard;
pub mod error;
pub mod farm;
pub mod planted_crop;
pub mod producer;

pub use dashboard::{
    ChartData, ChartSlice, ChartValue, DashboardData, DashboardService, calculate_percentages,
};
pub use error::ApplicationError;
pub use farm::FarmService;
pub use planted_crop::PlantedCropService;
pub use producer::{DeleteOutcome, DeletionStats, ProducerService};

/// Result type for use-case operations.
pub type Result<T> = std::result::Result<T, ApplicationError>;
