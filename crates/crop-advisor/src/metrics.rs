//! Per-crop profit metrics shown in the crop info table.

use crop_core::{Catalog, Crop, CropId, FertilizerRef, Profession, SEASON_DAYS};
use crop_econ::{
    average_sell_price, growth_days_with_modifiers, multi_season_profit, profession_sell_price,
    ProjectionOptions, MAX_PROJECTION_SEASONS,
};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

/// Gold spent per planting in the fixed-budget view.
pub const FIXED_BUDGET: u32 = 1000;

/// Inputs to [`calculate_profit`].
#[derive(Clone, Copy, Debug)]
pub struct ProfitSettings<'a> {
    pub profession: Profession,
    pub farming_level: u8,
    pub fertilizer: FertilizerRef<'a>,
    /// Seasons to project over; the crop's own season count when absent.
    pub season_count: Option<u32>,
    /// Buy as many seeds as [`FIXED_BUDGET`] allows instead of one.
    pub use_fixed_budget: bool,
}

impl Default for ProfitSettings<'_> {
    fn default() -> Self {
        Self {
            profession: Profession::None,
            farming_level: 0,
            fertilizer: FertilizerRef::Nothing,
            season_count: None,
            use_fixed_budget: false,
        }
    }
}

/// Result of [`calculate_profit`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ProfitReport {
    pub sell_price: Decimal,
    pub growth_days: u32,
    pub avg_sell_price: Decimal,
    pub season_count: u32,
    pub total_days: u32,
    pub total_season_profit: Decimal,
    /// Rounded to one decimal.
    pub profit_per_day: Decimal,
}

/// Seeds bought for one planting under the fixed budget, at least 1.
pub fn fixed_budget_multiplier(crop: &Crop) -> u32 {
    let seed = crop_econ::seed_unit_price(crop);
    if seed <= Decimal::ZERO {
        return 1;
    }
    crop_core::numeric::decimal_to_u32((Decimal::from(FIXED_BUDGET) / seed).floor()).max(1)
}

/// Project the profit of planting `crop` on day 1 and keeping the plot busy
/// for the requested seasons.
pub fn calculate_profit(crop: &Crop, settings: &ProfitSettings<'_>) -> ProfitReport {
    let season_count = settings
        .season_count
        .filter(|n| *n >= 1)
        .unwrap_or_else(|| crop.seasons.len().max(1) as u32)
        .min(MAX_PROJECTION_SEASONS);
    let farming_level = crop_core::numeric::clamp_farming_level(settings.farming_level.into());

    let sell_price = profession_sell_price(crop.sell, settings.profession);
    let growth_days = growth_days_with_modifiers(crop, settings.fertilizer, settings.profession);
    let avg_sell_price = average_sell_price(sell_price, farming_level, settings.fertilizer);
    let planting_multiplier = if settings.use_fixed_budget {
        fixed_budget_multiplier(crop)
    } else {
        1
    };

    let total_days = season_count * SEASON_DAYS;
    let total_season_profit = multi_season_profit(
        crop,
        1,
        season_count.into(),
        &ProjectionOptions {
            fertilizer: settings.fertilizer,
            avg_sell_price: Some(avg_sell_price),
            harvest_yield: Some(Decimal::from(crop.harvest.min.max(1))),
            planting_multiplier,
            profession: settings.profession,
            farming_level,
        },
    );
    let profit_per_day =
        crop_core::numeric::round(total_season_profit / Decimal::from(total_days), 1);

    ProfitReport {
        sell_price,
        growth_days,
        avg_sell_price,
        season_count,
        total_days,
        total_season_profit,
        profit_per_day,
    }
}

/// Cached ranking figures for one crop.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CropMetrics {
    pub id: CropId,
    pub name: String,
    pub sell_price: Decimal,
    pub growth_days: u32,
    pub profit_per_day: Decimal,
    /// Profit per day in the fixed-budget view.
    pub fixed_profit_per_day: Decimal,
    /// Net profit of one tile over the crop's seasons.
    pub net_profit: Decimal,
}

/// Metrics for one crop under the given player attributes.
pub fn crop_metrics(crop: &Crop, profession: Profession, farming_level: u8) -> CropMetrics {
    let settings = ProfitSettings {
        profession,
        farming_level,
        ..ProfitSettings::default()
    };
    let single = calculate_profit(crop, &settings);
    let fixed = calculate_profit(
        crop,
        &ProfitSettings {
            use_fixed_budget: true,
            ..settings
        },
    );
    CropMetrics {
        id: crop.id.clone(),
        name: crop.name.clone(),
        sell_price: single.sell_price,
        growth_days: single.growth_days,
        profit_per_day: single.profit_per_day,
        fixed_profit_per_day: fixed.profit_per_day,
        net_profit: single.total_season_profit,
    }
}

/// Recompute metrics for every catalog crop. Called whenever profession or
/// farming level changes.
pub fn refresh_metrics(
    catalog: &Catalog,
    profession: Profession,
    farming_level: u8,
) -> BTreeMap<CropId, CropMetrics> {
    catalog
        .crops()
        .iter()
        .map(|crop| (crop.id.clone(), crop_metrics(crop, profession, farming_level)))
        .collect()
}
