//! Harvest schedule of a single planting.

use crate::growth_days_with_modifiers;
use crop_core::{season_end_of, year_end_of, Crop, FertilizerRef, Profession};

/// One harvest of a planting.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HarvestEvent<'a> {
    pub day: u32,
    pub crop: &'a Crop,
}

/// Last day a planting may be harvested when the caller gives no bound: the
/// end of the planting season, or of the year in a greenhouse.
pub fn default_limit_day(plant_day: u32, greenhouse: bool) -> u32 {
    if greenhouse {
        year_end_of(plant_day)
    } else {
        season_end_of(plant_day)
    }
}

/// Ordered harvest days of `crop` planted on `plant_day`, none after `limit_day`.
///
/// The first harvest comes after the modified growth time; regrowing crops then
/// produce every regrow interval until the limit. An empty schedule means the
/// crop does not mature in time. Day 0 is not a planting day.
///
/// Example:
/// growth 10, regrow 4, planted day 1, limit 28 => 11, 15, 19, 23, 27
pub fn crop_lifecycle<'a>(
    crop: &'a Crop,
    plant_day: u32,
    limit_day: Option<u32>,
    fertilizer: FertilizerRef<'_>,
    profession: Profession,
    greenhouse: bool,
) -> Vec<HarvestEvent<'a>> {
    if plant_day == 0 {
        return Vec::new();
    }
    let limit = limit_day.unwrap_or_else(|| default_limit_day(plant_day, greenhouse));
    let Some(first) = plant_day
        .checked_add(growth_days_with_modifiers(crop, fertilizer, profession))
        .filter(|first| *first <= limit)
    else {
        return Vec::new();
    };

    let mut events = vec![HarvestEvent { day: first, crop }];
    if let Some(interval) = crop.regrow_days() {
        let mut next = first.checked_add(interval);
        while let Some(day) = next.filter(|day| *day <= limit) {
            events.push(HarvestEvent { day, crop });
            next = day.checked_add(interval);
        }
    }
    events
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::crop;
    use proptest::prelude::*;

    fn days(events: &[HarvestEvent<'_>]) -> Vec<u32> {
        events.iter().map(|e| e.day).collect()
    }

    #[test]
    fn single_harvest_inside_season() {
        let c = crop(&[8], None, 10, 10);
        let events = crop_lifecycle(&c, 1, Some(28), FertilizerRef::Nothing, Profession::None, false);
        assert_eq!(days(&events), vec![9]);
    }

    #[test]
    fn too_late_to_mature() {
        let c = crop(&[8], None, 10, 10);
        let events = crop_lifecycle(&c, 22, Some(28), FertilizerRef::Nothing, Profession::None, false);
        assert!(events.is_empty());
    }

    #[test]
    fn regrowth_repeats_until_limit() {
        let c = crop(&[10], Some(4), 10, 10);
        let events = crop_lifecycle(&c, 1, Some(28), FertilizerRef::Nothing, Profession::None, false);
        assert_eq!(days(&events), vec![11, 15, 19, 23, 27]);
    }

    #[test]
    fn default_limits_follow_farm_kind() {
        assert_eq!(default_limit_day(5, false), 28);
        assert_eq!(default_limit_day(30, false), 56);
        assert_eq!(default_limit_day(30, true), 112);
        let c = crop(&[10], Some(30), 10, 10);
        let open = crop_lifecycle(&c, 20, None, FertilizerRef::Nothing, Profession::None, false);
        assert!(open.is_empty());
        let indoor = crop_lifecycle(&c, 20, None, FertilizerRef::Nothing, Profession::None, true);
        assert_eq!(days(&indoor), vec![30, 60, 90]);
    }

    #[test]
    fn fertilizer_shortens_growth() {
        let c = crop(&[10], None, 10, 10);
        let events = crop_lifecycle(&c, 1, None, "speed-gro".into(), Profession::Agriculturist, false);
        // 10 * 0.9 * 0.9 = 8.1
        assert_eq!(days(&events), vec![9]);
        assert!(crop_lifecycle(&c, 0, None, FertilizerRef::Nothing, Profession::None, false).is_empty());
    }

    #[test]
    fn stops_at_the_end_of_the_day_range() {
        let c = crop(&[10], Some(4), 10, 10);
        let late = u32::MAX - 12;
        let events = crop_lifecycle(&c, late, Some(u32::MAX), FertilizerRef::Nothing, Profession::None, false);
        assert_eq!(days(&events), vec![late + 10]);
        let never = crop_lifecycle(&c, u32::MAX - 3, Some(u32::MAX), FertilizerRef::Nothing, Profession::None, false);
        assert!(never.is_empty());
        let huge = crop(&[u32::MAX, u32::MAX], None, 10, 10);
        assert!(crop_lifecycle(&huge, 1, None, FertilizerRef::Nothing, Profession::None, true).is_empty());
    }

    proptest! {
        #[test]
        fn extreme_days_never_overflow(
            growth in 1u32..=u32::MAX,
            regrow in proptest::option::of(1u32..=u32::MAX),
            plant in (u32::MAX - 1_000)..=u32::MAX,
        ) {
            let c = crop(&[growth], regrow, 10, 10);
            let events = crop_lifecycle(&c, plant, Some(u32::MAX), FertilizerRef::Nothing, Profession::None, false);
            prop_assert!(events.iter().all(|e| e.day > plant));
        }

        #[test]
        fn lifecycle_is_idempotent_and_bounded(
            growth in 1u32..30,
            regrow in proptest::option::of(1u32..10),
            plant in 1u32..112,
            limit in 1u32..224,
        ) {
            let c = crop(&[growth], regrow, 10, 10);
            let a = crop_lifecycle(&c, plant, Some(limit), FertilizerRef::Nothing, Profession::None, false);
            let b = crop_lifecycle(&c, plant, Some(limit), FertilizerRef::Nothing, Profession::None, false);
            prop_assert_eq!(days(&a), days(&b));
            prop_assert!(a.iter().all(|e| e.day > plant && e.day <= limit));
            prop_assert!(a.windows(2).all(|w| w[0].day < w[1].day));
        }
    }
}
