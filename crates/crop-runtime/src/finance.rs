//! Financial accumulators for a day, a season, or a year.

use crop_core::numeric::{clean_zero, format_number};
use crop_econ::{Extent, Span};
use rust_decimal::Decimal;
use serde::Serialize;
use std::ops::AddAssign;

/// Fraction digits shown by the `*_text` accessors.
const DISPLAY_DECIMALS: u32 = 3;

/// Money and produce flowing through one period.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Finance {
    pub cost: Decimal,
    pub revenue: Span,
    pub profit: Span,
    /// Seeds planted.
    pub plantings: u32,
    /// Produce harvested.
    pub harvests: Span,
}

impl Finance {
    /// Record a planting paid on this period.
    pub fn add_planting(&mut self, cost: Decimal) {
        self.cost += cost;
        self.profit = self.profit - cost;
    }

    /// Record harvest revenue earned in this period.
    pub fn add_revenue(&mut self, revenue: Span) {
        self.revenue += revenue;
        self.profit += revenue;
    }

    pub fn is_empty(&self) -> bool {
        *self == Finance::default()
    }

    pub fn cost(&self) -> Decimal {
        clean_zero(self.cost)
    }

    pub fn revenue(&self, extent: Extent) -> Decimal {
        clean_zero(self.revenue.get(extent))
    }

    pub fn profit(&self, extent: Extent) -> Decimal {
        clean_zero(self.profit.get(extent))
    }

    pub fn harvests(&self, extent: Extent) -> Decimal {
        self.harvests.get(extent)
    }

    pub fn cost_text(&self) -> String {
        format_number(self.cost(), DISPLAY_DECIMALS)
    }

    pub fn revenue_text(&self, extent: Extent) -> String {
        format_number(self.revenue(extent), DISPLAY_DECIMALS)
    }

    pub fn profit_text(&self, extent: Extent) -> String {
        format_number(self.profit(extent), DISPLAY_DECIMALS)
    }

    pub fn plantings_text(&self) -> String {
        format_number(Decimal::from(self.plantings), 0)
    }

    pub fn harvests_text(&self, extent: Extent) -> String {
        format_number(self.harvests(extent), DISPLAY_DECIMALS)
    }
}

impl AddAssign<&Finance> for Finance {
    fn add_assign(&mut self, rhs: &Finance) {
        self.cost += rhs.cost;
        self.revenue += rhs.revenue;
        self.profit += rhs.profit;
        self.plantings += rhs.plantings;
        self.harvests += rhs.harvests;
    }
}

/// Per-day, per-season, and yearly totals of one farm.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct FarmTotals {
    /// Only days with activity have an entry.
    pub day: std::collections::BTreeMap<u32, Finance>,
    pub season: [Finance; 4],
    pub year: Finance,
}

impl FarmTotals {
    pub fn day(&self, day: u32) -> Option<&Finance> {
        self.day.get(&day)
    }

    /// Recompute the year total from the season totals.
    pub fn sum_year(&mut self) {
        let mut year = Finance::default();
        for season in &self.season {
            year += season;
        }
        self.year = year;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn planting_then_harvest() {
        let mut f = Finance::default();
        f.add_planting(Decimal::from(450));
        f.add_revenue(Span::new(Decimal::from(300), Decimal::from(520)));
        assert_eq!(f.cost(), Decimal::from(450));
        assert_eq!(f.profit(Extent::Min), Decimal::from(-150));
        assert_eq!(f.profit(Extent::Max), Decimal::from(70));
        assert_eq!(f.revenue_text(Extent::Max), "520");
    }

    #[test]
    fn year_is_sum_of_seasons() {
        let mut totals = FarmTotals::default();
        totals.season[0].add_planting(Decimal::from(100));
        totals.season[0].plantings = 2;
        totals.season[3].add_revenue(Span::flat(Decimal::from(1500)));
        totals.sum_year();
        assert_eq!(totals.year.cost, Decimal::from(100));
        assert_eq!(totals.year.plantings, 2);
        assert_eq!(totals.year.profit, Span::flat(Decimal::from(1400)));
        assert_eq!(totals.year.profit_text(Extent::Min), "1,400");
    }

    #[test]
    fn empty_finance_reads_zero() {
        let f = Finance::default();
        assert!(f.is_empty());
        assert_eq!(f.profit_text(Extent::Min), "0");
        assert_eq!(f.plantings_text(), "0");
    }
}
