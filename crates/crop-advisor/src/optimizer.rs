//! Best-crop selection and greedy tile allocation.

use crate::metrics::CropMetrics;
use rust_decimal::Decimal;
use serde::Serialize;

/// Name of the only allocation strategy.
pub const GREEDY_STRATEGY: &str = "greedy-profit-per-day";

/// Figures a crop needs to take part in ranking.
pub trait ProfitMetric {
    fn name(&self) -> &str;
    /// Net profit of one tile.
    fn net_profit(&self) -> Decimal;
    /// Precomputed profit per day; zero when not known.
    fn profit_per_day_value(&self) -> Decimal {
        Decimal::ZERO
    }
    fn growth_days(&self) -> u32;
}

impl ProfitMetric for CropMetrics {
    fn name(&self) -> &str {
        &self.name
    }

    fn net_profit(&self) -> Decimal {
        self.net_profit
    }

    fn profit_per_day_value(&self) -> Decimal {
        self.profit_per_day
    }

    fn growth_days(&self) -> u32 {
        self.growth_days
    }
}

pub fn profit_per_tile<M: ProfitMetric + ?Sized>(metric: &M) -> Decimal {
    metric.net_profit()
}

/// The precomputed value when non-zero, else net profit over growth days.
pub fn profit_per_day<M: ProfitMetric + ?Sized>(metric: &M) -> Decimal {
    let existing = metric.profit_per_day_value();
    if !existing.is_zero() {
        return existing;
    }
    match metric.growth_days() {
        0 => Decimal::ZERO,
        days => metric.net_profit() / Decimal::from(days),
    }
}

/// Highest scorer; the earliest wins ties.
fn best_by<M, F>(crops: &[M], score: F) -> Option<&M>
where
    F: Fn(&M) -> Decimal,
{
    crops.iter().fold(None, |best: Option<&M>, crop| match best {
        Some(b) if score(crop) <= score(b) => Some(b),
        _ => Some(crop),
    })
}

pub fn best_crop_by_profit_per_tile<M: ProfitMetric>(crops: &[M]) -> Option<&M> {
    best_by(crops, |c| profit_per_tile(c))
}

pub fn best_crop_by_profit_per_day<M: ProfitMetric>(crops: &[M]) -> Option<&M> {
    best_by(crops, |c| profit_per_day(c))
}

/// Tiles given to one crop.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Allocation {
    pub crop_name: String,
    pub tiles_assigned: u32,
    pub expected_profit: Decimal,
    pub profit_per_day: Decimal,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct OptimalPlan {
    pub allocations: Vec<Allocation>,
    pub total_expected_profit: Decimal,
    pub strategy: &'static str,
}

impl OptimalPlan {
    fn empty() -> Self {
        Self {
            allocations: Vec::new(),
            total_expected_profit: Decimal::ZERO,
            strategy: GREEDY_STRATEGY,
        }
    }
}

/// Fill `tiles` greedily with the crop earning the most per day among those
/// that can finish a harvest within `days_remaining` and make a profit.
///
/// Fewer than one tile counts as one; fewer than one remaining day yields an
/// empty plan.
pub fn generate_optimal_plan<M: ProfitMetric>(
    crops: &[M],
    tiles: i64,
    days_remaining: i64,
) -> OptimalPlan {
    let tiles = u32::try_from(tiles.max(1)).unwrap_or(u32::MAX);
    if days_remaining < 1 {
        return OptimalPlan::empty();
    }

    let mut ranked: Vec<&M> = crops
        .iter()
        .filter(|c| {
            c.growth_days() > 0
                && i64::from(c.growth_days()) <= days_remaining
                && profit_per_day(*c) > Decimal::ZERO
        })
        .collect();
    ranked.sort_by(|a, b| profit_per_day(*b).cmp(&profit_per_day(*a)));

    let mut plan = OptimalPlan::empty();
    let mut remaining = tiles;
    for crop in ranked {
        if remaining == 0 {
            break;
        }
        let assigned = remaining;
        let expected_profit = profit_per_tile(crop) * Decimal::from(assigned);
        let name = if crop.name().is_empty() {
            "Unknown"
        } else {
            crop.name()
        };
        plan.allocations.push(Allocation {
            crop_name: name.to_string(),
            tiles_assigned: assigned,
            expected_profit,
            profit_per_day: profit_per_day(crop),
        });
        plan.total_expected_profit += expected_profit;
        remaining -= assigned;
    }
    plan
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    struct Row {
        name: &'static str,
        net: i64,
        per_day: i64,
        days: u32,
    }

    impl ProfitMetric for Row {
        fn name(&self) -> &str {
            self.name
        }
        fn net_profit(&self) -> Decimal {
            Decimal::from(self.net)
        }
        fn profit_per_day_value(&self) -> Decimal {
            Decimal::from(self.per_day)
        }
        fn growth_days(&self) -> u32 {
            self.days
        }
    }

    fn row(name: &'static str, net: i64, per_day: i64, days: u32) -> Row {
        Row {
            name,
            net,
            per_day,
            days,
        }
    }

    #[test]
    fn per_day_falls_back_to_growth() {
        assert_eq!(profit_per_day(&row("a", 100, 0, 4)), Decimal::from(25));
        assert_eq!(profit_per_day(&row("a", 100, 7, 4)), Decimal::from(7));
        assert_eq!(profit_per_day(&row("a", 100, 0, 0)), Decimal::ZERO);
    }

    #[test]
    fn best_keeps_first_on_ties() {
        let rows = [row("a", 10, 5, 1), row("b", 30, 5, 1), row("c", 30, 2, 1)];
        assert_eq!(best_crop_by_profit_per_tile(&rows).unwrap().name, "b");
        assert_eq!(best_crop_by_profit_per_day(&rows).unwrap().name, "a");
        assert!(best_crop_by_profit_per_day::<Row>(&[]).is_none());
    }

    #[test]
    fn greedy_assigns_all_tiles_to_top_crop() {
        let rows = [
            row("slow", 500, 50, 40),
            row("fast", 40, 10, 4),
            row("better", 60, 15, 6),
            row("loss", -5, -1, 2),
        ];
        let plan = generate_optimal_plan(&rows, 10, 28);
        assert_eq!(plan.strategy, GREEDY_STRATEGY);
        assert_eq!(plan.allocations.len(), 1);
        assert_eq!(plan.allocations[0].crop_name, "better");
        assert_eq!(plan.allocations[0].tiles_assigned, 10);
        assert_eq!(plan.total_expected_profit, Decimal::from(600));
    }

    #[test]
    fn degenerate_inputs() {
        let rows = [row("fast", 40, 10, 4)];
        assert!(generate_optimal_plan(&rows, 10, 0).allocations.is_empty());
        assert_eq!(generate_optimal_plan(&rows, -3, 28).allocations[0].tiles_assigned, 1);
        assert!(generate_optimal_plan(&rows, 10, 3).allocations.is_empty());
    }

    proptest! {
        #[test]
        fn plan_uses_every_tile(tiles in 1i64..1_000, days in 1i64..112) {
            let rows = [row("a", 40, 10, 4), row("b", 60, 15, 6)];
            let plan = generate_optimal_plan(&rows, tiles, days);
            let used: u32 = plan.allocations.iter().map(|a| a.tiles_assigned).sum();
            prop_assert!(used == 0 || i64::from(used) == tiles);
        }
    }
}
