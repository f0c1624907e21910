//! Export and import of saved plans, including the flat v1 layout.

use crate::records::{year_list, PlanRecord, YearRecord};
use chrono::{DateTime, Utc};
use crop_core::numeric::lenient;
use crop_core::DATA_VERSION;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use thiserror::Error;

/// Import failures. Nothing is changed when an import fails.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("not valid JSON data to import: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid data to import: no plans")]
    MissingPlans,
    #[error("incompatible plan version {found:?}, expected {expected:?}")]
    VersionMismatch { found: String, expected: String },
}

/// File contents produced by an export.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportPayload {
    #[serde(deserialize_with = "year_list")]
    pub plans: Vec<YearRecord>,
    pub version: String,
}

/// Wrap saved plans for export under the current data version.
pub fn export_payload(plans: Vec<YearRecord>) -> ExportPayload {
    ExportPayload {
        plans,
        version: DATA_VERSION.to_string(),
    }
}

/// Suggested file name for an export taken at `now`.
pub fn export_file_name(now: DateTime<Utc>) -> String {
    format!("Crop Planner [{}].json", now.timestamp_millis())
}

fn version_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Parse an exported file.
///
/// The version may be stored as a string or a number; it must equal the
/// current data version.
pub fn parse_import(text: &str) -> Result<Vec<YearRecord>, ImportError> {
    let mut value: Value = serde_json::from_str(text)?;
    let plans = match value.get_mut("plans").map(Value::take) {
        None | Some(Value::Null) => return Err(ImportError::MissingPlans),
        Some(plans) => plans,
    };
    let found = value.get("version").map(version_text).unwrap_or_default();
    if found != DATA_VERSION {
        return Err(ImportError::VersionMismatch {
            found,
            expected: DATA_VERSION.to_string(),
        });
    }
    #[derive(Deserialize)]
    struct Plans(#[serde(deserialize_with = "year_list")] Vec<YearRecord>);
    let Plans(years) = serde_json::from_value(plans)?;
    Ok(years)
}

#[derive(Deserialize)]
struct LegacyPlan {
    #[serde(default)]
    crop: String,
    #[serde(default = "legacy_amount", deserialize_with = "lenient::amount")]
    amount: u32,
    #[serde(default)]
    fertilizer: Option<String>,
    #[serde(default, deserialize_with = "lenient::truthy")]
    greenhouse: bool,
}

fn legacy_amount() -> u32 {
    1
}

/// Convert v1 data, a flat day → plantings map with a greenhouse marker on
/// each planting, into a single year. Plantings of unknown crops, unreadable
/// plantings, and days that are not numbers are dropped.
///
/// Returns the year and the number of plantings kept.
pub fn parse_legacy(
    text: &str,
    is_known_crop: impl Fn(&str) -> bool,
) -> Result<(YearRecord, usize), ImportError> {
    let value: Value = serde_json::from_str(text)?;
    if value.is_null() {
        return Err(ImportError::MissingPlans);
    }
    let days: BTreeMap<String, Value> = serde_json::from_value(value)?;

    let mut year = YearRecord::default();
    let mut kept = 0;
    for (day, plans) in days {
        let Some(day) = crop_core::numeric::parse_int_prefix(&day)
            .and_then(|d| u32::try_from(d).ok())
        else {
            continue;
        };
        let Value::Array(plans) = plans else {
            continue;
        };
        for plan in plans {
            let Ok(plan) = LegacyPlan::deserialize(plan) else {
                continue;
            };
            if !is_known_crop(&plan.crop) {
                continue;
            }
            let target = if plan.greenhouse {
                &mut year.greenhouse
            } else {
                &mut year.farm
            };
            target
                .entry(day)
                .or_default()
                .push(PlanRecord::new(plan.crop, plan.amount, plan.fertilizer));
            kept += 1;
        }
    }
    Ok((year, kept))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn export_then_import() {
        let mut year = YearRecord::default();
        year.farm.insert(3, vec![PlanRecord::new("kale", 2, None)]);
        let text = serde_json::to_string(&export_payload(vec![year.clone()])).unwrap();
        assert_eq!(parse_import(&text).unwrap(), vec![year]);
    }

    #[test]
    fn import_rejects_bad_files() {
        assert!(matches!(parse_import("{nope"), Err(ImportError::Json(_))));
        assert!(matches!(
            parse_import(r#"{"version":"2"}"#),
            Err(ImportError::MissingPlans)
        ));
        assert!(matches!(
            parse_import(r#"{"plans":[],"version":"1"}"#),
            Err(ImportError::VersionMismatch { .. })
        ));
        assert!(parse_import(r#"{"plans":[null],"version":2}"#).is_ok());
    }

    #[test]
    fn legacy_splits_by_greenhouse_and_drops_unknown() {
        let text = r#"{
            "5": [{"crop":"kale","amount":3},{"crop":"kale","amount":1,"greenhouse":true}],
            "9": [{"crop":"mystery","amount":1}]
        }"#;
        let (year, kept) = parse_legacy(text, |c| c == "kale").unwrap();
        assert_eq!(kept, 2);
        assert_eq!(year.farm[&5], vec![PlanRecord::new("kale", 3, None)]);
        assert_eq!(year.greenhouse[&5].len(), 1);
        assert!(!year.farm.contains_key(&9));
        assert!(matches!(parse_legacy("null", |_| true), Err(ImportError::MissingPlans)));
    }

    #[test]
    fn legacy_reads_truthy_markers_and_skips_damage() {
        let text = r#"{
            "1": [{"crop":"kale","amount":2,"greenhouse":1}, {"amount":4}, "kale"],
            "2": [{"crop":"kale","greenhouse":0}, {"crop":"kale","greenhouse":"yes"}],
            "3": {"crop":"kale"},
            "soon": [{"crop":"kale"}]
        }"#;
        let (year, kept) = parse_legacy(text, |c| c == "kale").unwrap();
        assert_eq!(kept, 3);
        assert_eq!(year.greenhouse[&1], vec![PlanRecord::new("kale", 2, None)]);
        assert!(!year.farm.contains_key(&1));
        assert_eq!(year.farm[&2].len(), 1);
        assert_eq!(year.greenhouse[&2].len(), 1);
        assert!(!year.farm.contains_key(&3));
    }

    #[test]
    fn export_name_has_timestamp() {
        let now = DateTime::<Utc>::from_timestamp(1_700_000_000, 0).unwrap();
        assert_eq!(export_file_name(now), "Crop Planner [1700000000000].json");
    }
}
