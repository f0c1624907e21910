#![deny(warnings)]

//! Core domain models and invariants for the crop planner.
//!
//! This crate defines the serializable catalog types (crops, fertilizers,
//! calendar events, player settings) with validation helpers and the numeric
//! coercions applied once at the data boundary.

pub mod calendar;
pub mod catalog;
pub mod crop;
pub mod fertilizer;
pub mod numeric;
pub mod player;

pub use calendar::{
    format_day, season_end_of, season_of_day, season_slot, year_end_of, CalendarEvent, Season,
    SEASON_DAYS, YEAR_DAYS,
};
pub use catalog::Catalog;
pub use crop::{Crop, CropId, HarvestSpec};
pub use fertilizer::{
    fertilizer_effect, fertilizer_effect_key, fertilizer_unit_price, Fertilizer, FertilizerEffect,
    FertilizerRef, NO_FERTILIZER_ID,
};
pub use player::{MiscSettings, Perk, PlayerSettings, Profession};

use rust_decimal::Decimal;
use std::collections::BTreeSet;
use thiserror::Error;

/// Application version string.
pub const VERSION: &str = "2.0";
/// Version tag of persisted plan data.
pub const DATA_VERSION: &str = "2";

/// Validation errors for catalog invariants.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    /// Identifier must be non-empty.
    #[error("crop identifier is empty")]
    MissingId,
    /// Price or cost must be non-negative.
    #[error("negative monetary value on {0}")]
    NegativeMoney(String),
    /// Outdoor crops need at least one season.
    #[error("crop {0} has no growing season")]
    NoSeasons(String),
    /// Harvest bounds must satisfy 1 <= min <= max.
    #[error("crop {0} has an invalid harvest range")]
    InvalidHarvest(String),
    /// The same identifier appears twice.
    #[error("duplicate identifier: {0}")]
    Duplicate(String),
}

/// Validate a crop definition.
pub fn validate_crop(crop: &Crop) -> Result<(), ValidationError> {
    if crop.id.0.trim().is_empty() {
        return Err(ValidationError::MissingId);
    }
    if crop.sell < Decimal::ZERO || crop.seed_price < Decimal::ZERO {
        return Err(ValidationError::NegativeMoney(crop.id.0.clone()));
    }
    if crop.seasons.is_empty() && !crop.wild {
        return Err(ValidationError::NoSeasons(crop.id.0.clone()));
    }
    if crop.harvest.min == 0 || crop.harvest.max < crop.harvest.min {
        return Err(ValidationError::InvalidHarvest(crop.id.0.clone()));
    }
    Ok(())
}

/// Validate a fertilizer entry.
pub fn validate_fertilizer(fertilizer: &Fertilizer) -> Result<(), ValidationError> {
    if fertilizer.id.trim().is_empty() {
        return Err(ValidationError::MissingId);
    }
    if fertilizer.buy < Decimal::ZERO {
        return Err(ValidationError::NegativeMoney(fertilizer.id.clone()));
    }
    Ok(())
}

/// Validate a full set of catalog entries, including identifier uniqueness.
pub fn validate_catalog(crops: &[Crop], fertilizers: &[Fertilizer]) -> Result<(), ValidationError> {
    let mut ids: BTreeSet<&CropId> = BTreeSet::new();
    for crop in crops {
        validate_crop(crop)?;
        if !ids.insert(&crop.id) {
            return Err(ValidationError::Duplicate(crop.id.0.clone()));
        }
    }
    let mut fert_ids: BTreeSet<&str> = BTreeSet::new();
    for fertilizer in fertilizers {
        validate_fertilizer(fertilizer)?;
        if !fert_ids.insert(&fertilizer.id) {
            return Err(ValidationError::Duplicate(fertilizer.id.clone()));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crop::fixtures::crop;
    use proptest::prelude::*;

    #[test]
    fn serde_roundtrip_crop() {
        let c = crop("tomato", &[2, 2, 3, 4, 3], Some(4), &[Season::Summer]);
        let s = serde_json::to_string(&c).unwrap();
        let back: Crop = serde_json::from_str(&s).unwrap();
        assert_eq!(back, c);
        assert_eq!(back.base_growth_days(), 14);
    }

    #[test]
    fn rejects_bad_entries() {
        let mut c = crop("x", &[3], None, &[]);
        assert_eq!(
            validate_crop(&c),
            Err(ValidationError::NoSeasons("x".into()))
        );
        c.wild = true;
        assert!(validate_crop(&c).is_ok());
        c.seed_price = Decimal::from(-1);
        assert!(matches!(
            validate_crop(&c),
            Err(ValidationError::NegativeMoney(_))
        ));
        let mut h = crop("y", &[3], None, &[Season::Fall]);
        h.harvest.max = 0;
        assert!(matches!(
            validate_crop(&h),
            Err(ValidationError::InvalidHarvest(_))
        ));
    }

    #[test]
    fn catalog_detects_duplicates() {
        let a = crop("kale", &[6], None, &[Season::Spring]);
        let err = validate_catalog(&[a.clone(), a], &[Fertilizer::none()]).unwrap_err();
        assert_eq!(err, ValidationError::Duplicate("kale".into()));
    }

    proptest! {
        #[test]
        fn growth_days_at_least_one(stages in proptest::collection::vec(0u32..10, 0..6)) {
            let c = crop("p", &stages, None, &[Season::Spring]);
            prop_assert!(c.base_growth_days() >= 1);
            prop_assert!(validate_crop(&c).is_ok());
        }
    }
}
