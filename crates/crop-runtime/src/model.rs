//! Plans, harvests, farms, and years.

use crate::finance::FarmTotals;
use crop_core::{
    fertilizer_effect, numeric::clean_zero, Crop, Fertilizer, FertilizerRef, Season, YEAR_DAYS,
};
use crop_econ::{total_planting_cost, Extent, PlantingCost, Span};
use persistence::{DayPlans, PlanRecord, YearRecord};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Open field or greenhouse.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FarmKind {
    #[default]
    Farm,
    Greenhouse,
}

impl FarmKind {
    pub fn id(self) -> &'static str {
        match self {
            FarmKind::Farm => "farm",
            FarmKind::Greenhouse => "greenhouse",
        }
    }

    /// Parse a mode id; anything but `greenhouse` is the open field.
    pub fn from_id(id: &str) -> Self {
        if id == "greenhouse" {
            FarmKind::Greenhouse
        } else {
            FarmKind::Farm
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            FarmKind::Farm => FarmKind::Greenhouse,
            FarmKind::Greenhouse => FarmKind::Farm,
        }
    }
}

impl fmt::Display for FarmKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Seeds planted on one day.
#[derive(Clone, Debug)]
pub struct Plan {
    pub day: u32,
    pub crop: Arc<Crop>,
    pub fertilizer: Arc<Fertilizer>,
    pub amount: u32,
    pub greenhouse: bool,
    pub cost: PlantingCost,
    pub water_retention_chance: Decimal,
    /// Harvests of the last aggregation.
    pub harvests: Vec<Harvest>,
}

impl Plan {
    pub fn new(
        day: u32,
        crop: Arc<Crop>,
        fertilizer: Arc<Fertilizer>,
        amount: u32,
        greenhouse: bool,
    ) -> Self {
        let mut plan = Self {
            day,
            crop,
            fertilizer,
            amount: amount.max(1),
            greenhouse,
            cost: PlantingCost::default(),
            water_retention_chance: Decimal::ZERO,
            harvests: Vec::new(),
        };
        plan.refresh_cost();
        plan
    }

    pub fn fertilizer_ref(&self) -> FertilizerRef<'_> {
        FertilizerRef::Item(&self.fertilizer)
    }

    /// Recompute the cost breakdown and water retention from crop, fertilizer and amount.
    pub fn refresh_cost(&mut self) -> PlantingCost {
        self.cost = total_planting_cost(&self.crop, self.fertilizer_ref(), self.amount.into());
        self.water_retention_chance = fertilizer_effect(self.fertilizer_ref())
            .water_retention
            .unwrap_or(Decimal::ZERO);
        self.cost
    }

    pub fn total_cost(&self) -> Decimal {
        clean_zero(self.cost.total_cost)
    }

    /// Sum of harvest revenue.
    pub fn revenue(&self, extent: Extent) -> Decimal {
        clean_zero(self.harvests.iter().map(|h| h.revenue.get(extent)).sum())
    }

    pub fn profit(&self, extent: Extent) -> Decimal {
        clean_zero(self.revenue(extent) - self.total_cost())
    }

    pub fn to_record(&self) -> PlanRecord {
        let fertilizer = (!self.fertilizer.is_none()).then(|| self.fertilizer.id.clone());
        PlanRecord::new(self.crop.id.as_str(), self.amount, fertilizer)
    }
}

/// Plans are the same planting when day, crop, fertilizer and amount match.
impl PartialEq for Plan {
    fn eq(&self, other: &Self) -> bool {
        self.day == other.day
            && self.crop.id == other.crop.id
            && self.fertilizer.id == other.fertilizer.id
            && self.amount == other.amount
    }
}

/// Produce picked from one plan on one day.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Harvest {
    pub plan_day: u32,
    pub plan_index: usize,
    pub day: u32,
    pub yields: Span,
    pub revenue: Span,
    /// Planting cost on the first harvest, zero for regrowths.
    pub cost: Decimal,
    pub profit: Span,
    pub is_regrowth: bool,
}

impl Harvest {
    pub fn cost(&self) -> Decimal {
        clean_zero(self.cost)
    }

    pub fn revenue(&self, extent: Extent) -> Decimal {
        clean_zero(self.revenue.get(extent))
    }

    pub fn profit(&self, extent: Extent) -> Decimal {
        clean_zero(self.profit.get(extent))
    }
}

/// Plans and their aggregated outcome for one farm in one year.
#[derive(Clone, Debug)]
pub struct Farm {
    pub kind: FarmKind,
    /// Day of year to plans, in insertion order. Empty days may be absent.
    pub plans: BTreeMap<u32, Vec<Plan>>,
    /// Harvest day to harvests, rebuilt by every aggregation.
    pub harvests: BTreeMap<u32, Vec<Harvest>>,
    pub totals: FarmTotals,
}

impl Farm {
    pub fn new(kind: FarmKind) -> Self {
        Self {
            kind,
            plans: BTreeMap::new(),
            harvests: BTreeMap::new(),
            totals: FarmTotals::default(),
        }
    }

    pub fn is_greenhouse(&self) -> bool {
        self.kind == FarmKind::Greenhouse
    }

    pub fn plans_on(&self, day: u32) -> &[Plan] {
        self.plans.get(&day).map_or(&[], Vec::as_slice)
    }

    pub fn harvests_on(&self, day: u32) -> &[Harvest] {
        self.harvests.get(&day).map_or(&[], Vec::as_slice)
    }

    pub fn plan_count(&self) -> usize {
        self.plans.values().map(Vec::len).sum()
    }

    /// Whether any plan, optionally limited to one season, is of a regrowing crop.
    pub fn has_regrowing_crops(&self, season: Option<Season>) -> bool {
        let (start, end) = season.map_or((1, YEAR_DAYS), |s| (s.start(), s.end()));
        self.plans
            .range(start..=end)
            .flat_map(|(_, plans)| plans)
            .any(|plan| plan.crop.regrows())
    }

    /// Drop every plan between `start` and `end` inclusive.
    pub fn clear_days(&mut self, start: u32, end: u32) {
        self.plans.retain(|day, _| *day < start || *day > end);
    }

    pub fn to_records(&self) -> DayPlans {
        self.plans
            .iter()
            .filter(|(_, plans)| !plans.is_empty())
            .map(|(day, plans)| (*day, plans.iter().map(Plan::to_record).collect()))
            .collect()
    }
}

/// One in-game year with an open field and a greenhouse.
#[derive(Clone, Debug)]
pub struct Year {
    pub index: usize,
    pub farm: Farm,
    pub greenhouse: Farm,
}

impl Year {
    pub fn new(index: usize) -> Self {
        Self {
            index,
            farm: Farm::new(FarmKind::Farm),
            greenhouse: Farm::new(FarmKind::Greenhouse),
        }
    }

    /// First absolute day of the year.
    pub fn start(&self) -> u32 {
        self.index as u32 * YEAR_DAYS + 1
    }

    pub fn end(&self) -> u32 {
        self.start() + YEAR_DAYS - 1
    }

    pub fn farm(&self, kind: FarmKind) -> &Farm {
        match kind {
            FarmKind::Farm => &self.farm,
            FarmKind::Greenhouse => &self.greenhouse,
        }
    }

    pub fn farm_mut(&mut self, kind: FarmKind) -> &mut Farm {
        match kind {
            FarmKind::Farm => &mut self.farm,
            FarmKind::Greenhouse => &mut self.greenhouse,
        }
    }

    pub fn plan_count(&self) -> usize {
        self.farm.plan_count() + self.greenhouse.plan_count()
    }

    pub fn to_record(&self) -> YearRecord {
        YearRecord {
            farm: self.farm.to_records(),
            greenhouse: self.greenhouse.to_records(),
        }
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use crop_core::{Catalog, Crop, CropId, Fertilizer, HarvestSpec, Season};
    use rust_decimal::Decimal;
    use std::sync::Arc;

    pub fn crop(id: &str, stages: &[u32], regrow: Option<u32>, seasons: &[Season]) -> Crop {
        Crop {
            id: CropId(id.to_string()),
            name: id.to_string(),
            sell: Decimal::from(35),
            seed_price: Decimal::from(20),
            stages: stages.to_vec(),
            regrow,
            seasons: seasons.to_vec(),
            harvest: HarvestSpec::default(),
            wild: false,
            note: String::new(),
        }
    }

    /// Parsnip (4 days), strawberry (8 days, regrows every 4), and kale.
    pub fn catalog() -> Arc<Catalog> {
        let mut kale = crop("kale", &[6], None, &[Season::Spring]);
        kale.sell = Decimal::from(110);
        kale.seed_price = Decimal::from(70);
        Arc::new(Catalog::new(
            vec![
                crop("parsnip", &[4], None, &[Season::Spring]),
                crop("strawberry", &[8], Some(4), &[Season::Spring]),
                kale,
                crop("melon", &[12], None, &[Season::Summer]),
            ],
            vec![
                Fertilizer {
                    id: "basic_fertilizer".into(),
                    name: "Basic Fertilizer".into(),
                    buy: Decimal::from(100),
                },
                Fertilizer {
                    id: "basic_retaining_soil".into(),
                    name: "Basic Retaining Soil".into(),
                    buy: Decimal::from(100),
                },
            ],
            vec![],
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::catalog;
    use super::*;

    #[test]
    fn plan_derives_cost_and_retention() {
        let c = catalog();
        let plan = Plan::new(
            3,
            Arc::clone(c.crop_by_str("parsnip").unwrap()),
            Arc::clone(c.fertilizer("basic_retaining_soil").unwrap()),
            5,
            false,
        );
        assert_eq!(plan.cost.seed_cost, Decimal::from(100));
        assert_eq!(plan.total_cost(), Decimal::from(600));
        assert_eq!(plan.water_retention_chance, Decimal::new(33, 2));
        assert_eq!(
            plan.to_record(),
            PlanRecord::new("parsnip", 5, Some("basic_retaining_soil".into()))
        );
    }

    #[test]
    fn plan_identity_ignores_derived_fields() {
        let c = catalog();
        let parsnip = Arc::clone(c.crop_by_str("parsnip").unwrap());
        let a = Plan::new(3, Arc::clone(&parsnip), c.no_fertilizer(), 2, false);
        let mut b = a.clone();
        b.water_retention_chance = Decimal::ONE;
        assert_eq!(a, b);
        b.amount = 3;
        assert_ne!(a, b);
        assert!(a.to_record().fertilizer.is_none());
    }

    #[test]
    fn farm_queries() {
        let c = catalog();
        let mut farm = Farm::new(FarmKind::Farm);
        let straw = Arc::clone(c.crop_by_str("strawberry").unwrap());
        farm.plans
            .entry(10)
            .or_default()
            .push(Plan::new(10, straw, c.no_fertilizer(), 1, false));
        farm.plans.insert(40, Vec::new());
        assert!(farm.has_regrowing_crops(None));
        assert!(farm.has_regrowing_crops(Some(Season::Spring)));
        assert!(!farm.has_regrowing_crops(Some(Season::Summer)));
        assert_eq!(farm.to_records().len(), 1);
        farm.clear_days(1, 28);
        assert_eq!(farm.plan_count(), 0);
    }

    #[test]
    fn year_bounds() {
        let y = Year::new(1);
        assert_eq!(y.start(), 113);
        assert_eq!(y.end(), 224);
        assert!(y.to_record().is_empty());
        assert_eq!(FarmKind::from_id("greenhouse").toggled(), FarmKind::Farm);
    }
}
