//! HTTP route handlers, one module per resource.

pub mod dashboard;
pub mod farms;
pub mod health;
pub mod metrics;
pub mod planted_crops;
pub mod producers;

use serde::Deserialize;

/// Pagination query parameters shared by every list endpoint.
#[derive(Debug, Deserialize)]
pub struct PageParams {
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl PageParams {
    pub fn page(&self) -> u32 {
        self.page.unwrap_or(1)
    }

    pub fn limit(&self) -> u32 {
        self.limit.unwrap_or(10)
    }
}
