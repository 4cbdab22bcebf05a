//! Dashboard aggregation.
//!
//! Issues the independent aggregate reads concurrently, then reshapes
//! them into chart data with percentages and top-5 truncations. Input
//! order from the repositories is preserved; no re-sorting happens here.

use serde::Serialize;
use storage::{
    CropCount, CropStatistics, FarmAverages, FarmRepository, LandUse, PlantedCropRepository,
    ProductiveFarm, Repositories, Repository, StateCount, StateStatistics,
};

use crate::Result;

const TOP_N: usize = 5;

/// One chart slice with its share of the chart total.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSlice {
    pub name: String,
    pub value: f64,
    pub percentage: f64,
}

/// Anything that can be turned into a chart slice.
pub trait ChartValue {
    fn name(&self) -> &str;
    fn value(&self) -> f64;
}

impl ChartValue for StateCount {
    fn name(&self) -> &str {
        &self.name
    }

    fn value(&self) -> f64 {
        self.value as f64
    }
}

impl ChartValue for CropCount {
    fn name(&self) -> &str {
        &self.name
    }

    fn value(&self) -> f64 {
        self.value as f64
    }
}

impl ChartValue for LandUse {
    fn name(&self) -> &str {
        &self.name
    }

    fn value(&self) -> f64 {
        self.value
    }
}

/// Computes each item's percentage of the list total, rounded to two
/// decimal places. A zero total yields zero percentages rather than a
/// division by zero.
pub fn calculate_percentages<T: ChartValue>(items: &[T]) -> Vec<ChartSlice> {
    let total: f64 = items.iter().map(ChartValue::value).sum();

    items
        .iter()
        .map(|item| {
            let percentage = if total > 0.0 {
                (item.value() / total * 100.0 * 100.0).round() / 100.0
            } else {
                0.0
            };
            ChartSlice {
                name: item.name().to_string(),
                value: item.value(),
                percentage,
            }
        })
        .collect()
}

/// Chart payload of the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartData {
    pub farms_by_state: Vec<ChartSlice>,
    pub crops_by_type: Vec<ChartSlice>,
    pub land_use: Vec<ChartSlice>,
}

/// Combined dashboard statistics payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardData {
    pub total_farms: u64,
    pub total_hectares: f64,
    pub total_producers: u64,
    pub chart_data: ChartData,
    pub averages: FarmAverages,
    pub top_states: Vec<StateCount>,
    pub top_crops: Vec<CropCount>,
}

/// Read-only dashboard aggregation over any repository provider.
#[derive(Clone)]
pub struct DashboardService<R: Repositories> {
    repos: R,
}

impl<R: Repositories> DashboardService<R> {
    pub fn new(repos: R) -> Self {
        Self { repos }
    }

    /// Gathers the full dashboard payload. The underlying aggregate reads
    /// are independent and read-only, so they run concurrently.
    #[tracing::instrument(skip(self))]
    pub async fn dashboard_data(&self) -> Result<DashboardData> {
        let farms = self.repos.farms();
        let producers = self.repos.producers();
        let crops = self.repos.planted_crops();

        let (
            total_farms,
            total_hectares,
            total_producers,
            farms_by_state,
            crops_by_type,
            land_use,
            averages,
        ) = tokio::try_join!(
            farms.count(),
            farms.total_hectares(),
            producers.count(),
            farms.farms_by_state(),
            crops.crops_by_type(),
            farms.land_use(),
            farms.averages(),
        )?;

        let chart_data = ChartData {
            farms_by_state: calculate_percentages(&farms_by_state),
            crops_by_type: calculate_percentages(&crops_by_type),
            land_use: calculate_percentages(&land_use),
        };

        let mut top_states = farms_by_state;
        top_states.truncate(TOP_N);
        let mut top_crops = crops_by_type;
        top_crops.truncate(TOP_N);

        Ok(DashboardData {
            total_farms,
            total_hectares,
            total_producers,
            chart_data,
            averages,
            top_states,
            top_crops,
        })
    }

    /// Per-state farm statistics passthrough.
    pub async fn state_statistics(&self) -> Result<Vec<StateStatistics>> {
        Ok(self.repos.farms().state_statistics().await?)
    }

    /// Per-crop statistics passthrough.
    pub async fn crop_statistics(&self) -> Result<Vec<CropStatistics>> {
        Ok(self.repos.planted_crops().crop_statistics().await?)
    }

    /// Top-N farms by agricultural area.
    pub async fn top_productive_farms(&self, limit: u32) -> Result<Vec<ProductiveFarm>> {
        Ok(self.repos.farms().top_productive_farms(limit).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn land(name: &str, value: f64) -> LandUse {
        LandUse {
            name: name.to_string(),
            value,
        }
    }

    #[test]
    fn percentages_sum_to_one_hundred() {
        let slices = calculate_percentages(&[land("a", 30.0), land("b", 70.0)]);
        assert_eq!(slices[0].percentage, 30.0);
        assert_eq!(slices[1].percentage, 70.0);
    }

    #[test]
    fn percentages_round_to_two_decimals() {
        let slices = calculate_percentages(&[land("a", 1.0), land("b", 2.0)]);
        assert_eq!(slices[0].percentage, 33.33);
        assert_eq!(slices[1].percentage, 66.67);
    }

    #[test]
    fn zero_total_yields_zero_percentages() {
        let slices = calculate_percentages(&[land("a", 0.0), land("b", 0.0)]);
        assert_eq!(slices[0].percentage, 0.0);
        assert_eq!(slices[1].percentage, 0.0);
    }

    #[test]
    fn input_order_is_preserved() {
        let slices = calculate_percentages(&[land("z", 10.0), land("a", 90.0)]);
        assert_eq!(slices[0].name, "z");
        assert_eq!(slices[1].name, "a");
    }

    #[test]
    fn empty_input_yields_empty_output() {
        let slices = calculate_percentages::<LandUse>(&[]);
        assert!(slices.is_empty());
    }
}
