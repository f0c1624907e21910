#![deny(warnings)]

//! Economic models for the crop planner.
//!
//! This crate provides the pure, deterministic game-balance rules:
//! - Seed and fertilizer cost of a planting
//! - Growth duration under fertilizer and profession modifiers
//! - Quality-tier distribution, average sell price, and harvest yield ranges
//! - Harvest lifecycles and multi-season profit projection
//!
//! Expected values are reported as `[min, max]` ranges, never sampled.

pub mod lifecycle;
pub mod projection;

pub use lifecycle::{crop_lifecycle, default_limit_day, HarvestEvent};
pub use projection::{multi_season_profit, ProjectionOptions, MAX_PROJECTION_SEASONS};

use crop_core::numeric::normalize_amount;
use crop_core::{fertilizer_effect, fertilizer_unit_price, Crop, FertilizerRef, Profession};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign, Sub};

/// Which end of a `[min, max]` range to read.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Extent {
    Min,
    Max,
}

/// An expectation range.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub min: Decimal,
    pub max: Decimal,
}

impl Span {
    pub fn new(min: Decimal, max: Decimal) -> Self {
        Self { min, max }
    }

    /// A range whose ends coincide.
    pub fn flat(value: Decimal) -> Self {
        Self::new(value, value)
    }

    pub fn get(self, extent: Extent) -> Decimal {
        match extent {
            Extent::Min => self.min,
            Extent::Max => self.max,
        }
    }

    /// Apply `f` to both ends.
    pub fn map(self, f: impl Fn(Decimal) -> Decimal) -> Self {
        Self::new(f(self.min), f(self.max))
    }
}

impl Add for Span {
    type Output = Span;
    fn add(self, rhs: Span) -> Span {
        Span::new(self.min + rhs.min, self.max + rhs.max)
    }
}

impl AddAssign for Span {
    fn add_assign(&mut self, rhs: Span) {
        self.min += rhs.min;
        self.max += rhs.max;
    }
}

impl Sub<Decimal> for Span {
    type Output = Span;
    fn sub(self, rhs: Decimal) -> Span {
        Span::new(self.min - rhs, self.max - rhs)
    }
}

/// Seed, fertilizer, and total cost of one planting.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlantingCost {
    pub seed_cost: Decimal,
    pub fertilizer_cost: Decimal,
    pub total_cost: Decimal,
}

/// Price of one seed.
pub fn seed_unit_price(crop: &Crop) -> Decimal {
    crop.seed_price.max(Decimal::ZERO)
}

/// Cost of planting `amount` seeds with one unit of fertilizer each.
///
/// Amounts below 1 are treated as 1. Never fails; unknown fertilizers cost nothing.
///
/// Example:
/// seed 50g, fertilizer 100g, amount 3 => 150g + 300g = 450g
pub fn total_planting_cost(crop: &Crop, fertilizer: FertilizerRef<'_>, amount: i64) -> PlantingCost {
    let amount = Decimal::from(normalize_amount(amount));
    let seed_cost = seed_unit_price(crop) * amount;
    let fertilizer_cost = fertilizer_unit_price(fertilizer) * amount;
    PlantingCost {
        seed_cost,
        fertilizer_cost,
        total_cost: seed_cost + fertilizer_cost,
    }
}

/// Days from planting to first harvest.
///
/// `floor(base × growth_modifier × 0.9 if agriculturist)`, at least 1. The
/// fertilizer and profession modifiers stack multiplicatively.
pub fn growth_days_with_modifiers(
    crop: &Crop,
    fertilizer: FertilizerRef<'_>,
    profession: Profession,
) -> u32 {
    let mut modifier = fertilizer_effect(fertilizer)
        .growth_modifier
        .unwrap_or(Decimal::ONE);
    if profession.has_growth_bonus() {
        modifier *= Decimal::new(9, 1);
    }
    let days = (Decimal::from(crop.base_growth_days()) * modifier).floor();
    crop_core::numeric::decimal_to_u32(days).max(1)
}

/// Days between harvests for regrowing crops.
pub fn regrow_days(crop: &Crop) -> Option<u32> {
    crop.regrow_days()
}

/// Probability of each quality tier.
///
/// Chances are capped independently and deliberately not renormalised: with
/// both caps binding they sum to more than 1, exactly as the game computes them.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct QualityDistribution {
    pub normal: Decimal,
    pub silver: Decimal,
    pub gold: Decimal,
}

/// Quality-tier chances for a farming level and fertilizer quality bonus.
pub fn quality_distribution(level: u8, quality_bonus: Decimal) -> QualityDistribution {
    let level = crop_core::numeric::clamp_farming_level(level as i64);
    let cap = Decimal::new(75, 2);
    let gold = (Decimal::from(level) * Decimal::new(1, 2) + quality_bonus).min(cap);
    let silver = (gold * Decimal::TWO).min(cap);
    let normal = (Decimal::ONE - (gold + silver)).max(Decimal::ZERO);
    QualityDistribution {
        normal,
        silver,
        gold,
    }
}

/// Chance of one tier (0 normal, 1 silver, 2 gold), capped at 1.
pub fn quality_chance(level: u8, quality: u8, quality_bonus: Decimal) -> Decimal {
    let d = quality_distribution(level, quality_bonus);
    match quality {
        0 => d.normal,
        1 => d.silver.min(Decimal::ONE),
        _ => d.gold.min(Decimal::ONE),
    }
}

/// Chance of one tier as a whole percentage.
pub fn quality_chance_percent(level: u8, quality: u8, quality_bonus: Decimal) -> Decimal {
    crop_core::numeric::round(quality_chance(level, quality, quality_bonus) * Decimal::ONE_HUNDRED, 0)
}

/// Expected sell price of one produce given the quality distribution.
pub fn average_sell_price(base_price: Decimal, level: u8, fertilizer: FertilizerRef<'_>) -> Decimal {
    let bonus = fertilizer_effect(fertilizer)
        .quality_bonus
        .unwrap_or(Decimal::ZERO);
    let d = quality_distribution(level, bonus);
    base_price * d.normal
        + base_price * Decimal::new(125, 2) * d.silver
        + base_price * Decimal::new(15, 1) * d.gold
}

/// Produce count of one harvest of `amount` plants.
///
/// The upper bound is a continuous expectation of level bonus drops, not a draw.
pub fn harvest_yield(crop: &Crop, level: u8, amount: u32) -> Span {
    let amount = Decimal::from(amount);
    let min = Decimal::from(crop.harvest.min);
    let capped = min + Decimal::ONE;
    let bound = if crop.harvest.level_increase.is_zero() {
        capped
    } else {
        let bonus = Decimal::from(level) / crop.harvest.level_increase;
        capped.min(Decimal::from(crop.harvest.max) + Decimal::ONE + bonus)
    };
    Span::new(min * amount, (bound - Decimal::ONE) * amount)
}

/// Revenue of one harvest.
///
/// Only the picked produce benefits from quality; extra drops sell at normal
/// quality. The tiller bonus applies to both ends after flooring.
pub fn harvest_revenue(
    crop: &Crop,
    yields: Span,
    level: u8,
    quality_bonus: Decimal,
    profession: Profession,
) -> Span {
    let normal = quality_chance(level, 0, quality_bonus);
    let silver = quality_chance(level, 1, quality_bonus);
    let gold = quality_chance(level, 2, quality_bonus);

    let min_price = crop.sell_price_at(0);
    let gold_price = crop.sell_price_at(2);
    let max_price = (min_price * normal + crop.sell_price_at(1) * silver + gold_price * gold)
        .min(gold_price);

    let mut revenue = Span::new(
        min_price.floor() * yields.min,
        max_price.floor() + min_price.floor() * (yields.max - Decimal::ONE).max(Decimal::ZERO),
    );
    if profession.has_tiller_bonus() {
        revenue = revenue.map(|v| (v * Decimal::new(11, 1)).floor());
    }
    revenue
}

/// Base sell price adjusted for the tiller profession, rounded to 2 decimals.
pub fn profession_sell_price(base: Decimal, profession: Profession) -> Decimal {
    if profession == Profession::Tiller {
        crop_core::numeric::round(base * Decimal::new(11, 1), 2)
    } else {
        crop_core::numeric::round(base, 2)
    }
}
