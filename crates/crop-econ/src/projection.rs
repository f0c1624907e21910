//! Profit projection over consecutive seasons with auto-replanting.

use crate::{average_sell_price, crop_lifecycle, total_planting_cost};
use crop_core::{Crop, FertilizerRef, Profession, SEASON_DAYS};
use rust_decimal::Decimal;

/// Longest projection in seasons; longer requests are cut to this.
pub const MAX_PROJECTION_SEASONS: u32 = 1_000;

/// Knobs for [`multi_season_profit`].
#[derive(Clone, Copy, Debug)]
pub struct ProjectionOptions<'a> {
    pub fertilizer: FertilizerRef<'a>,
    /// Expected price per produce; computed from the crop when absent.
    pub avg_sell_price: Option<Decimal>,
    /// Produce per harvest; the crop's minimum harvest when absent or not positive.
    pub harvest_yield: Option<Decimal>,
    /// Number of seeds bought per planting.
    pub planting_multiplier: u32,
    pub profession: Profession,
    pub farming_level: u8,
}

impl Default for ProjectionOptions<'_> {
    fn default() -> Self {
        Self {
            fertilizer: FertilizerRef::Nothing,
            avg_sell_price: None,
            harvest_yield: None,
            planting_multiplier: 1,
            profession: Profession::None,
            farming_level: 0,
        }
    }
}

/// Net profit of growing `crop` from `plant_day` for `season_count` seasons.
///
/// The planting day is clamped to at least 1 and the season count to
/// `1..=MAX_PROJECTION_SEASONS`; days past the end of the `u32` range are
/// never reached.
///
/// Non-regrowing crops are replanted on each harvest day while another
/// harvest still fits; regrowing crops are planted once. Each planting pays
/// the full seed and fertilizer cost.
pub fn multi_season_profit(
    crop: &Crop,
    plant_day: i64,
    season_count: i64,
    options: &ProjectionOptions<'_>,
) -> Decimal {
    let plant_day = u32::try_from(plant_day.max(1)).unwrap_or(u32::MAX);
    let season_count = u32::try_from(season_count.clamp(1, i64::from(MAX_PROJECTION_SEASONS)))
        .unwrap_or(MAX_PROJECTION_SEASONS);
    let limit = plant_day.saturating_add(season_count * SEASON_DAYS - 1);
    let multiplier = options.planting_multiplier.max(1);

    let harvest_yield = options
        .harvest_yield
        .filter(|y| *y > Decimal::ZERO)
        .unwrap_or_else(|| Decimal::from(crop.harvest.min.max(1)));
    let avg_price = options.avg_sell_price.unwrap_or_else(|| {
        average_sell_price(crop.sell, options.farming_level, options.fertilizer)
    });
    let harvest_value = avg_price * harvest_yield * Decimal::from(multiplier);
    let planting_cost =
        total_planting_cost(crop, options.fertilizer, i64::from(multiplier)).total_cost;

    let mut total = Decimal::ZERO;
    let mut current = plant_day;
    while current <= limit {
        let events = crop_lifecycle(
            crop,
            current,
            Some(limit),
            options.fertilizer,
            options.profession,
            false,
        );
        let Some(first) = events.first() else {
            break;
        };
        total -= planting_cost;
        total += harvest_value * Decimal::from(events.len());
        if crop.regrows() {
            break;
        }
        current = first.day;
    }
    total
}
