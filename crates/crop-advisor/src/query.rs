//! Searching, filtering, and sorting the crop info table.

use crate::metrics::CropMetrics;
use crop_core::{Crop, CropId, Season};
use rust_decimal::Decimal;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Column the crop table is sorted by.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CropSortKey {
    Name,
    GrowthDays,
    SellPrice,
    #[default]
    ProfitPerDay,
    FixedProfit,
    Buy,
}

impl CropSortKey {
    /// Parse a column id, accepting the short aliases; unknown ids sort by name.
    pub fn from_id(id: &str) -> Self {
        match id {
            "growthDays" | "grow" => CropSortKey::GrowthDays,
            "sellPrice" | "sell" => CropSortKey::SellPrice,
            "profitPerDay" | "profit" => CropSortKey::ProfitPerDay,
            "fixed_profit" => CropSortKey::FixedProfit,
            "buy" => CropSortKey::Buy,
            _ => CropSortKey::Name,
        }
    }

    /// Numeric columns start out descending; names ascending.
    pub fn descending_by_default(self) -> bool {
        self != CropSortKey::Name
    }
}

/// Crop table settings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CropQuery {
    /// Case-insensitive substring of the crop name.
    pub search: String,
    /// A single season to show; `None` means all.
    pub season_filter: Option<Season>,
    /// With no single-season filter, show crops growing in any of these.
    pub seasons: Vec<Season>,
    pub regrows_only: bool,
    pub sort: CropSortKey,
    pub descending: bool,
    /// Rank profit columns by the fixed-budget figure.
    pub use_fixed_budget: bool,
}

impl Default for CropQuery {
    fn default() -> Self {
        Self {
            search: String::new(),
            season_filter: None,
            seasons: vec![Season::Spring],
            regrows_only: false,
            sort: CropSortKey::ProfitPerDay,
            descending: true,
            use_fixed_budget: false,
        }
    }
}

impl CropQuery {
    /// Select a sort column; selecting the current one flips the order.
    pub fn set_sort(&mut self, key: CropSortKey) {
        if self.sort == key {
            self.descending = !self.descending;
        } else {
            self.apply_sort(key);
        }
    }

    /// Select a sort column in its default order.
    pub fn apply_sort(&mut self, key: CropSortKey) {
        self.sort = key;
        self.descending = key.descending_by_default();
    }

    fn matches(&self, crop: &Crop) -> bool {
        if !self.search.is_empty()
            && !crop.name.to_lowercase().contains(&self.search.to_lowercase())
        {
            return false;
        }
        if self.regrows_only && !crop.regrows() {
            return false;
        }
        match self.season_filter {
            Some(season) => crop.seasons.contains(&season),
            None if !self.seasons.is_empty() => {
                self.seasons.iter().any(|s| crop.seasons.contains(s))
            }
            None => true,
        }
    }
}

/// Rows of the crop table plus the highest profit-per-day crop among them.
#[derive(Clone, Debug)]
pub struct VisibleCrops {
    pub rows: Vec<Arc<Crop>>,
    pub best_crop: Option<CropId>,
}

enum SortValue<'a> {
    Text(&'a str),
    Number(Decimal),
}

fn sort_value<'a>(
    crop: &'a Crop,
    metrics: Option<&CropMetrics>,
    key: CropSortKey,
    use_fixed_budget: bool,
) -> SortValue<'a> {
    let metric = |f: fn(&CropMetrics) -> Decimal| metrics.map(f).unwrap_or(Decimal::ZERO);
    match key {
        CropSortKey::Name => SortValue::Text(&crop.name),
        CropSortKey::GrowthDays => SortValue::Number(metric(|m| Decimal::from(m.growth_days))),
        CropSortKey::SellPrice => SortValue::Number(metric(|m| m.sell_price)),
        CropSortKey::ProfitPerDay | CropSortKey::FixedProfit if use_fixed_budget => {
            SortValue::Number(metric(|m| m.fixed_profit_per_day))
        }
        CropSortKey::ProfitPerDay | CropSortKey::FixedProfit => {
            SortValue::Number(metric(|m| m.profit_per_day))
        }
        CropSortKey::Buy => SortValue::Number(crop.seed_price),
    }
}

fn compare(a: &SortValue<'_>, b: &SortValue<'_>) -> Ordering {
    let text = |v: &SortValue<'_>| match v {
        SortValue::Text(s) => s.to_lowercase(),
        SortValue::Number(n) => n.to_string(),
    };
    match (a, b) {
        (SortValue::Number(x), SortValue::Number(y)) => x.cmp(y),
        _ => text(a).cmp(&text(b)),
    }
}

/// Apply `query` to the catalog crops.
///
/// Sorting is stable ascending and then reversed for descending order, so
/// ties also swap places.
pub fn visible_crops(
    crops: &[Arc<Crop>],
    metrics: &BTreeMap<CropId, CropMetrics>,
    query: &CropQuery,
) -> VisibleCrops {
    let mut rows: Vec<Arc<Crop>> = crops
        .iter()
        .filter(|c| query.matches(c))
        .cloned()
        .collect();
    rows.sort_by(|a, b| {
        let va = sort_value(a, metrics.get(&a.id), query.sort, query.use_fixed_budget);
        let vb = sort_value(b, metrics.get(&b.id), query.sort, query.use_fixed_budget);
        compare(&va, &vb)
    });
    if query.descending {
        rows.reverse();
    }

    let profit = |c: &Crop| {
        metrics
            .get(&c.id)
            .map_or(Decimal::ZERO, |m| m.profit_per_day)
    };
    let best_crop = rows
        .iter()
        .fold(None::<&Arc<Crop>>, |best, crop| match best {
            Some(b) if profit(crop) <= profit(b) => Some(b),
            _ => Some(crop),
        })
        .map(|c| c.id.clone());

    VisibleCrops { rows, best_crop }
}
