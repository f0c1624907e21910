//! Fertilizer catalog entries and the tolerant reference → effect resolver.
//!
//! Saved plans may reference fertilizers by stale identifiers, by display name,
//! or by a catalog entry, so resolution normalises the reference and falls back
//! through several tables before giving up with an empty effect.

use crate::numeric::lenient;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Identifier of the sentinel "no fertilizer" entry.
pub const NO_FERTILIZER_ID: &str = "none";

/// Gameplay effect of a fertilizer. At most one field is meaningful.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FertilizerEffect {
    /// Added to the gold-quality chance (0..1).
    pub quality_bonus: Option<Decimal>,
    /// Multiplier on growth days; below 1 speeds growth.
    pub growth_modifier: Option<Decimal>,
    /// Chance the soil stays watered overnight (0..1).
    pub water_retention: Option<Decimal>,
}

impl FertilizerEffect {
    /// True when the bundle carries no effect at all.
    pub fn is_empty(&self) -> bool {
        self.quality_bonus.is_none()
            && self.growth_modifier.is_none()
            && self.water_retention.is_none()
    }

    fn quality(bonus: Decimal) -> Self {
        Self {
            quality_bonus: Some(bonus),
            ..Self::default()
        }
    }

    fn growth(modifier: Decimal) -> Self {
        Self {
            growth_modifier: Some(modifier),
            ..Self::default()
        }
    }

    fn retention(chance: Decimal) -> Self {
        Self {
            water_retention: Some(chance),
            ..Self::default()
        }
    }
}

/// Fertilizer catalog entry.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Fertilizer {
    pub id: String,
    pub name: String,
    /// Buy price per unit in gold.
    #[serde(default, deserialize_with = "lenient::gold")]
    pub buy: Decimal,
}

impl Fertilizer {
    /// The sentinel entry: free and without effect.
    pub fn none() -> Self {
        Self {
            id: NO_FERTILIZER_ID.to_string(),
            name: "None".to_string(),
            buy: Decimal::ZERO,
        }
    }

    /// True for the sentinel entry.
    pub fn is_none(&self) -> bool {
        self.id == NO_FERTILIZER_ID
    }

    /// Resolved gameplay effect.
    pub fn effect(&self) -> FertilizerEffect {
        fertilizer_effect(FertilizerRef::Item(self))
    }
}

/// Any of the ways a planting can refer to its fertilizer.
#[derive(Clone, Copy, Debug)]
pub enum FertilizerRef<'a> {
    /// No fertilizer at all.
    Nothing,
    /// An identifier or display name as typed or persisted.
    Text(&'a str),
    /// A catalog entry.
    Item(&'a Fertilizer),
}

impl<'a> From<&'a Fertilizer> for FertilizerRef<'a> {
    fn from(f: &'a Fertilizer) -> Self {
        FertilizerRef::Item(f)
    }
}

impl<'a> From<&'a str> for FertilizerRef<'a> {
    fn from(s: &'a str) -> Self {
        FertilizerRef::Text(s)
    }
}

impl<'a> From<Option<&'a Fertilizer>> for FertilizerRef<'a> {
    fn from(f: Option<&'a Fertilizer>) -> Self {
        f.map_or(FertilizerRef::Nothing, FertilizerRef::Item)
    }
}

/// Lower-case, trim, and collapse whitespace runs to single spaces.
pub fn normalize_effect_name(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

fn key_for_id(id: &str) -> Option<&'static str> {
    Some(match id {
        "basic_fertilizer" => "basic fertilizer",
        "quality_fertilizer" => "quality fertilizer",
        "deluxe_fertilizer" => "deluxe fertilizer",
        "speed_gro" => "speed-gro",
        "delux_speed_gro" | "deluxe_speed_gro" => "deluxe speed-gro",
        "hyper_speed_gro" => "hyper speed-gro",
        "basic_retaining_soil" => "basic retaining soil",
        "quality_retaining_soil" => "quality retaining soil",
        "deluxe_retaining_soil" => "deluxe retaining soil",
        _ => return None,
    })
}

fn effect_for_key(key: &str) -> Option<FertilizerEffect> {
    Some(match key {
        "basic fertilizer" => FertilizerEffect::quality(Decimal::new(1, 2)),
        "quality fertilizer" => FertilizerEffect::quality(Decimal::new(2, 2)),
        "deluxe fertilizer" => FertilizerEffect::quality(Decimal::new(4, 2)),
        "speed-gro" => FertilizerEffect::growth(Decimal::new(9, 1)),
        "deluxe speed-gro" => FertilizerEffect::growth(Decimal::new(75, 2)),
        "hyper speed-gro" => FertilizerEffect::growth(Decimal::new(67, 2)),
        "basic retaining soil" => FertilizerEffect::retention(Decimal::new(33, 2)),
        "quality retaining soil" => FertilizerEffect::retention(Decimal::new(66, 2)),
        "deluxe retaining soil" => FertilizerEffect::retention(Decimal::ONE),
        _ => return None,
    })
}

/// Shop price used when a reference carries no catalog price of its own.
fn fallback_price_for_key(key: &str) -> Decimal {
    match key {
        "basic fertilizer" | "speed-gro" | "basic retaining soil" => Decimal::from(100),
        "quality fertilizer" | "deluxe speed-gro" | "quality retaining soil" => {
            Decimal::from(150)
        }
        _ => Decimal::ZERO,
    }
}

/// Canonical effect name for a reference, if it can be resolved.
pub fn fertilizer_effect_key(fertilizer: FertilizerRef<'_>) -> Option<&'static str> {
    let (id, name) = match fertilizer {
        FertilizerRef::Nothing => return None,
        FertilizerRef::Text(text) => (text.trim().to_lowercase(), normalize_effect_name(text)),
        FertilizerRef::Item(f) => {
            let id = f.id.trim().to_lowercase();
            let name = if f.name.trim().is_empty() {
                normalize_effect_name(&id)
            } else {
                normalize_effect_name(&f.name)
            };
            (id, name)
        }
    };
    if let Some(key) = key_for_id(&id) {
        return Some(key);
    }
    if let Some(key) = canonical_key(&name) {
        return Some(key);
    }
    canonical_key(&normalize_effect_name(&id.replace('_', " ")))
}

/// Map a normalised name onto the static key with the same spelling.
fn canonical_key(name: &str) -> Option<&'static str> {
    const KEYS: [&str; 9] = [
        "basic fertilizer",
        "quality fertilizer",
        "deluxe fertilizer",
        "speed-gro",
        "deluxe speed-gro",
        "hyper speed-gro",
        "basic retaining soil",
        "quality retaining soil",
        "deluxe retaining soil",
    ];
    KEYS.into_iter().find(|k| *k == name)
}

/// Effect bundle for any reference; empty when unresolvable.
pub fn fertilizer_effect(fertilizer: FertilizerRef<'_>) -> FertilizerEffect {
    fertilizer_effect_key(fertilizer)
        .and_then(effect_for_key)
        .unwrap_or_default()
}

/// Per-unit price of a fertilizer reference.
///
/// Catalog entries use their own buy price; bare text references fall back to
/// the shop price of the resolved fertilizer, or zero.
pub fn fertilizer_unit_price(fertilizer: FertilizerRef<'_>) -> Decimal {
    match fertilizer {
        FertilizerRef::Item(f) if f.is_none() => Decimal::ZERO,
        FertilizerRef::Item(f) if f.buy > Decimal::ZERO => f.buy,
        other => fertilizer_effect_key(other)
            .map(fallback_price_for_key)
            .unwrap_or(Decimal::ZERO),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fert(id: &str, name: &str, buy: i64) -> Fertilizer {
        Fertilizer {
            id: id.into(),
            name: name.into(),
            buy: Decimal::from(buy),
        }
    }

    #[test]
    fn resolves_ids_names_and_stale_forms() {
        assert_eq!(
            fertilizer_effect_key("delux_speed_gro".into()),
            Some("deluxe speed-gro")
        );
        assert_eq!(
            fertilizer_effect_key("  Quality   Fertilizer ".into()),
            Some("quality fertilizer")
        );
        let odd = fert("hyper_speed_gro", "", 0);
        assert_eq!(fertilizer_effect_key((&odd).into()), Some("hyper speed-gro"));
        let by_name = fert("whatever", "Deluxe Retaining Soil", 0);
        assert_eq!(
            fertilizer_effect_key((&by_name).into()),
            Some("deluxe retaining soil")
        );
    }

    #[test]
    fn unknown_references_have_no_effect() {
        assert!(fertilizer_effect("mystery dust".into()).is_empty());
        assert!(fertilizer_effect(FertilizerRef::Nothing).is_empty());
        assert!(Fertilizer::none().effect().is_empty());
    }

    #[test]
    fn effect_values() {
        let speed = fertilizer_effect("speed_gro".into());
        assert_eq!(speed.growth_modifier, Some(Decimal::new(9, 1)));
        assert_eq!(speed.quality_bonus, None);
        let deluxe = fertilizer_effect("deluxe fertilizer".into());
        assert_eq!(deluxe.quality_bonus, Some(Decimal::new(4, 2)));
    }

    #[test]
    fn prices_prefer_catalog_then_shop_table() {
        assert_eq!(
            fertilizer_unit_price((&fert("x", "", 100)).into()),
            Decimal::from(100)
        );
        assert_eq!(
            fertilizer_unit_price("quality_retaining_soil".into()),
            Decimal::from(150)
        );
        assert_eq!(fertilizer_unit_price("hyper_speed_gro".into()), Decimal::ZERO);
        assert_eq!(
            fertilizer_unit_price((&Fertilizer::none()).into()),
            Decimal::ZERO
        );
    }
}
