//! Rebuild harvests and financial totals of a farm from its plans.

use crate::finance::FarmTotals;
use crate::model::{Farm, FarmKind, Harvest, Plan, Year};
use crop_core::numeric::clean_zero;
use crop_core::{fertilizer_effect, season_slot, PlayerSettings, Profession, YEAR_DAYS};
use crop_econ::{crop_lifecycle, harvest_revenue, harvest_yield};
use rust_decimal::Decimal;
use tracing::debug;

/// Player attributes the aggregation depends on.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AggregationContext {
    pub profession: Profession,
    pub farming_level: u8,
}

impl From<&PlayerSettings> for AggregationContext {
    fn from(player: &PlayerSettings) -> Self {
        Self {
            profession: player.profession,
            farming_level: player.farming_level,
        }
    }
}

/// Outcome of harvesting `plan` on `day`.
///
/// Fertilizer quality only lasts for the planting season in the greenhouse.
pub fn harvest_for(
    plan: &Plan,
    plan_index: usize,
    day: u32,
    is_regrowth: bool,
    ctx: &AggregationContext,
) -> Harvest {
    let yields = harvest_yield(&plan.crop, ctx.farming_level, plan.amount);
    let mut quality_bonus = fertilizer_effect(plan.fertilizer_ref())
        .quality_bonus
        .unwrap_or(Decimal::ZERO);
    if plan.greenhouse && season_slot(day) != season_slot(plan.day) {
        quality_bonus = Decimal::ZERO;
    }
    let revenue = harvest_revenue(
        &plan.crop,
        yields,
        ctx.farming_level,
        quality_bonus,
        ctx.profession,
    );
    let cost = if is_regrowth {
        Decimal::ZERO
    } else {
        plan.cost.total_cost
    };
    Harvest {
        plan_day: plan.day,
        plan_index,
        day,
        yields,
        revenue,
        cost,
        profit: (revenue - cost).map(clean_zero),
        is_regrowth,
    }
}

/// Recompute one farm in place: plan costs, harvests, and every total.
///
/// Open-field crops are harvested until the end of their last season;
/// greenhouse crops until the end of the year.
pub fn aggregate_farm(farm: &mut Farm, ctx: &AggregationContext) {
    let greenhouse = farm.is_greenhouse();
    let Farm {
        plans,
        harvests,
        totals,
        ..
    } = farm;
    harvests.clear();
    *totals = FarmTotals::default();

    for (&day, day_plans) in plans.iter_mut() {
        for (index, plan) in day_plans.iter_mut().enumerate() {
            let cost = plan.refresh_cost().total_cost;
            totals.day.entry(day).or_default().add_planting(cost);
            let season = &mut totals.season[season_slot(day).min(3)];
            season.add_planting(cost);
            season.plantings += plan.amount;

            let limit = if greenhouse {
                YEAR_DAYS
            } else {
                plan.crop.end_day()
            };
            let days: Vec<u32> = crop_lifecycle(
                &plan.crop,
                day,
                Some(limit),
                plan.fertilizer_ref(),
                ctx.profession,
                greenhouse,
            )
            .iter()
            .map(|event| event.day)
            .collect();
            let plan_harvests: Vec<Harvest> = days
                .iter()
                .enumerate()
                .map(|(i, &harvest_day)| harvest_for(plan, index, harvest_day, i > 0, ctx))
                .collect();

            for harvest in &plan_harvests {
                totals
                    .day
                    .entry(harvest.day)
                    .or_default()
                    .add_revenue(harvest.revenue);
                let season = &mut totals.season[season_slot(harvest.day).min(3)];
                season.add_revenue(harvest.revenue);
                season.harvests += harvest.yields;
                harvests.entry(harvest.day).or_default().push(harvest.clone());
            }
            plan.harvests = plan_harvests;
        }
    }
    totals.sum_year();
}

/// Aggregate one farm of `years[year_index]`, then keep going through the
/// same farm of the following years while propagation applies.
///
/// Propagation applies when `full` is requested, when the farm just
/// aggregated holds regrowing crops, or when it is a greenhouse. Later years
/// are always aggregated with `full` set.
pub fn update(
    years: &mut [Year],
    year_index: usize,
    kind: FarmKind,
    full: bool,
    ctx: &AggregationContext,
) {
    let mut full = full;
    let mut index = year_index;
    while let Some(year) = years.get_mut(index) {
        let farm = year.farm_mut(kind);
        let propagate = full || farm.has_regrowing_crops(None) || farm.is_greenhouse();
        aggregate_farm(farm, ctx);
        debug!(
            year = index,
            %kind,
            plans = farm.plan_count(),
            harvest_days = farm.harvests.len(),
            "aggregated farm"
        );
        if !propagate {
            break;
        }
        full = true;
        index += 1;
    }
}
