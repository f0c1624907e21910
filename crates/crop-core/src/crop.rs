//! Crop catalog entries.

use crate::calendar::{Season, YEAR_DAYS};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Catalog identifier of a crop, e.g. `"blue_jazz"`.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CropId(pub String);

impl CropId {
    /// Identifier derived from a display name: lower-case, whitespace → `_`.
    pub fn from_name(name: &str) -> Self {
        CropId(
            name.to_lowercase()
                .split_whitespace()
                .collect::<Vec<_>>()
                .join("_"),
        )
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CropId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Produce dropped by one harvest of one plant.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HarvestSpec {
    /// Guaranteed produce per plant.
    pub min: u32,
    /// Upper bound of produce per plant before level bonuses.
    pub max: u32,
    /// Farming levels per extra bonus drop.
    pub level_increase: Decimal,
    /// Chance of an extra drop.
    pub extra_chance: Decimal,
}

impl Default for HarvestSpec {
    fn default() -> Self {
        Self {
            min: 1,
            max: 1,
            level_increase: Decimal::ONE,
            extra_chance: Decimal::ZERO,
        }
    }
}

/// An immutable crop definition.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Crop {
    pub id: CropId,
    pub name: String,
    /// Base sell price of normal-quality produce.
    pub sell: Decimal,
    /// Price of one seed.
    pub seed_price: Decimal,
    /// Days spent in each growth stage.
    pub stages: Vec<u32>,
    /// Days between harvests; `None` for single-harvest crops.
    pub regrow: Option<u32>,
    /// Seasons the crop grows in, in calendar order.
    pub seasons: Vec<Season>,
    #[serde(default)]
    pub harvest: HarvestSpec,
    /// Wild seeds (forage mixes).
    #[serde(default)]
    pub wild: bool,
    #[serde(default)]
    pub note: String,
}

impl Crop {
    /// Sum of stage durations, at least 1.
    pub fn base_growth_days(&self) -> u32 {
        self.stages
            .iter()
            .fold(0u32, |total, days| total.saturating_add(*days))
            .max(1)
    }

    /// Regrow interval in days, if the crop regrows.
    pub fn regrow_days(&self) -> Option<u32> {
        self.regrow.filter(|days| *days > 0)
    }

    /// True when the crop keeps producing after the first harvest.
    pub fn regrows(&self) -> bool {
        self.regrow_days().is_some()
    }

    /// First and last day of the year the crop can be in the ground outdoors.
    pub fn growing_window(&self) -> Option<(u32, u32)> {
        let start = self.seasons.iter().map(|s| s.start()).min()?;
        let end = self.seasons.iter().map(|s| s.end()).max()?;
        Some((start, end))
    }

    /// Last day of the outdoor growing window (0 when the crop has no season).
    pub fn end_day(&self) -> u32 {
        self.growing_window().map_or(0, |(_, end)| end)
    }

    /// Whether a planting on `day` (1..=112) is allowed.
    pub fn can_grow_on(&self, day: u32, in_greenhouse: bool) -> bool {
        if in_greenhouse && (1..=YEAR_DAYS).contains(&day) {
            return true;
        }
        self.growing_window()
            .is_some_and(|(start, end)| day >= start && day <= end)
    }

    /// Whether the whole of `season` lies inside the growing window.
    pub fn can_grow_in_season(&self, season: Season) -> bool {
        self.growing_window()
            .is_some_and(|(start, end)| start <= season.start() && end >= season.end())
    }

    /// Store price for produce of the given quality (0 normal, 1 silver, 2 gold).
    pub fn sell_price_at(&self, quality: u8) -> Decimal {
        let factor = Decimal::ONE + Decimal::from(quality) * Decimal::new(25, 2);
        (self.sell * factor).floor()
    }
}
