//! Serialized shapes of saved plans and player settings.

use crop_core::numeric::{lenient, parse_int_prefix};
use crop_core::{MiscSettings, PlayerSettings, Profession};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::warn;

fn one() -> u32 {
    1
}

/// One saved planting. A missing crop id reads as empty and never matches
/// a catalog crop.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanRecord {
    #[serde(default)]
    pub crop: String,
    #[serde(default = "one", deserialize_with = "lenient::amount")]
    pub amount: u32,
    /// Omitted when no fertilizer is used.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fertilizer: Option<String>,
}

impl PlanRecord {
    pub fn new(crop: impl Into<String>, amount: u32, fertilizer: Option<String>) -> Self {
        Self {
            crop: crop.into(),
            amount: amount.max(1),
            fertilizer,
        }
    }
}

/// Plans of one farm, keyed by day of the year.
pub type DayPlans = BTreeMap<u32, Vec<PlanRecord>>;

/// Plantings listed under one day; unreadable entries are skipped.
fn plan_entries(value: Value) -> Vec<PlanRecord> {
    let Value::Array(items) = value else {
        warn!("skipping plans that are not a list");
        return Vec::new();
    };
    items
        .into_iter()
        .filter_map(|item| match PlanRecord::deserialize(item) {
            Ok(plan) => Some(plan),
            Err(err) => {
                warn!(%err, "skipping unreadable plan");
                None
            }
        })
        .collect()
}

/// Deserialize day → plantings. Day keys are read like `parseInt`; days that
/// are not numbers and entries that are not plantings are dropped, so one
/// damaged planting never loses the rest of the farm.
pub fn day_plans<'de, D: Deserializer<'de>>(d: D) -> Result<DayPlans, D::Error> {
    let Value::Object(raw) = Value::deserialize(d)? else {
        return Ok(DayPlans::new());
    };
    let mut days = DayPlans::new();
    for (key, entries) in raw {
        let Some(day) = parse_int_prefix(&key).and_then(|d| u32::try_from(d).ok()) else {
            warn!(day = %key, "skipping plans under a non-numeric day");
            continue;
        };
        let plans = plan_entries(entries);
        if !plans.is_empty() {
            days.entry(day).or_default().extend(plans);
        }
    }
    Ok(days)
}

/// Saved plans of one year. Farms without plans are omitted.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearRecord {
    #[serde(
        default,
        deserialize_with = "day_plans",
        skip_serializing_if = "BTreeMap::is_empty"
    )]
    pub farm: DayPlans,
    #[serde(
        default,
        deserialize_with = "day_plans",
        skip_serializing_if = "BTreeMap::is_empty"
    )]
    pub greenhouse: DayPlans,
}

impl YearRecord {
    pub fn is_empty(&self) -> bool {
        self.plan_count() == 0
    }

    /// Number of plantings across both farms.
    pub fn plan_count(&self) -> usize {
        self.farm
            .values()
            .chain(self.greenhouse.values())
            .map(Vec::len)
            .sum()
    }
}

/// Deserialize a list of years. Empty years may have been saved as `null`;
/// any year that is not an object loads empty.
pub fn year_list<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<YearRecord>, D::Error> {
    let years = Vec::<Value>::deserialize(d)?;
    Ok(years
        .into_iter()
        .map(|year| YearRecord::deserialize(year).unwrap_or_default())
        .collect())
}

/// Saved player settings. The perk flags are written only when set.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerRecord {
    #[serde(default)]
    pub profession: String,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub tiller: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub agriculturist: bool,
    #[serde(default)]
    pub settings: MiscSettings,
    #[serde(default, deserialize_with = "lenient::farming_level")]
    pub level: u8,
}

impl From<&PlayerSettings> for PlayerRecord {
    fn from(player: &PlayerSettings) -> Self {
        Self {
            profession: player.profession.id().to_string(),
            tiller: player.profession.has_tiller_bonus(),
            agriculturist: player.profession.has_growth_bonus(),
            settings: player.settings.clone(),
            level: player.farming_level,
        }
    }
}

impl PlayerRecord {
    /// Rebuild player settings. An unknown or `none` profession falls back
    /// to the perk flags.
    pub fn to_settings(&self) -> PlayerSettings {
        let profession = match Profession::from_id(&self.profession) {
            Profession::None => Profession::from_perks(self.tiller, self.agriculturist),
            named => named,
        };
        PlayerSettings {
            profession,
            farming_level: crop_core::numeric::clamp_farming_level(self.level.into()),
            settings: self.settings.clone(),
        }
    }
}
