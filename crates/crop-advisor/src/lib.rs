#![deny(warnings)]

//! Crop ranking and recommendations.
//!
//! Computes per-crop profit metrics from the economic models, picks the best
//! crop by profit per tile or per day, allocates tiles greedily, and answers
//! the searchable, sortable crop table query.

pub mod metrics;
pub mod optimizer;
pub mod query;

pub use metrics::{
    calculate_profit, crop_metrics, fixed_budget_multiplier, refresh_metrics, CropMetrics,
    ProfitReport, ProfitSettings, FIXED_BUDGET,
};
pub use optimizer::{
    best_crop_by_profit_per_day, best_crop_by_profit_per_tile, generate_optimal_plan,
    profit_per_day, profit_per_tile, Allocation, OptimalPlan, ProfitMetric, GREEDY_STRATEGY,
};
pub use query::{visible_crops, CropQuery, CropSortKey, VisibleCrops};

#[cfg(test)]
pub(crate) mod fixtures {
    use crop_core::{Crop, CropId, HarvestSpec, Season};
    use rust_decimal::Decimal;

    pub fn crop(id: &str, stages: &[u32], regrow: Option<u32>, seed: i64, sell: i64) -> Crop {
        Crop {
            id: CropId(id.to_string()),
            name: id.to_string(),
            sell: Decimal::from(sell),
            seed_price: Decimal::from(seed),
            stages: stages.to_vec(),
            regrow,
            seasons: vec![Season::Spring],
            harvest: HarvestSpec::default(),
            wild: false,
            note: String::new(),
        }
    }
}

