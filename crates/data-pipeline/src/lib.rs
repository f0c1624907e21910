#![deny(warnings)]

//! Game data loading.
//!
//! Reads `config.json` (fertilizers, calendar events, optional full crop
//! records) and `planner-ready-data.json` (compact crop records) and turns
//! them into a [`Catalog`].

use crop_core::numeric::lenient;
use crop_core::{
    validate_crop, validate_fertilizer, CalendarEvent, Catalog, Crop, CropId, Fertilizer,
    HarvestSpec, Season, SEASON_DAYS,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

/// File holding fertilizers and events.
pub const CONFIG_FILE: &str = "config.json";
/// File holding planner-ready crops.
pub const PLANNER_DATA_FILE: &str = "planner-ready-data.json";

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Compact crop record of the planner data file.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawPlannerCrop {
    pub name: String,
    #[serde(default)]
    pub seasons: Vec<String>,
    #[serde(default, alias = "seedCost", alias = "buy", deserialize_with = "lenient::gold")]
    pub seed_price: Decimal,
    #[serde(default, deserialize_with = "lenient::gold")]
    pub sell_price: Decimal,
    #[serde(default, deserialize_with = "lenient::count")]
    pub growth_days: u32,
    #[serde(default, deserialize_with = "lenient::positive_days")]
    pub regrow_days: Option<u32>,
}

/// Turn a compact record into a catalog crop.
///
/// The id is the lower-cased name with whitespace runs replaced by `_`;
/// growth is a single stage and every harvest yields exactly one produce.
pub fn adapt_crop(raw: &RawPlannerCrop) -> Crop {
    Crop {
        id: CropId::from_name(&raw.name),
        name: raw.name.clone(),
        sell: raw.sell_price,
        seed_price: raw.seed_price,
        stages: vec![raw.growth_days.max(1)],
        regrow: raw.regrow_days,
        seasons: raw
            .seasons
            .iter()
            .filter_map(|s| Season::from_id(s))
            .collect(),
        harvest: HarvestSpec {
            min: 1,
            max: 1,
            level_increase: Decimal::ZERO,
            extra_chance: Decimal::ZERO,
        },
        wild: false,
        note: String::new(),
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct PlannerData {
    #[serde(default)]
    pub crops: Option<Vec<RawPlannerCrop>>,
}

/// Calendar event as listed in the config. A day that is not a number
/// reads as 0 and the event is dropped.
#[derive(Clone, Debug, Deserialize)]
pub struct RawEvent {
    #[serde(default, deserialize_with = "lenient::count")]
    pub day: u32,
    #[serde(default)]
    pub name: String,
    #[serde(default, deserialize_with = "lenient::truthy")]
    pub festival: bool,
}

/// Season id → events, skipping seasons that are not lists and entries that
/// are not events.
fn event_lists<'de, D: Deserializer<'de>>(
    d: D,
) -> Result<BTreeMap<String, Vec<RawEvent>>, D::Error> {
    let Value::Object(seasons) = Value::deserialize(d)? else {
        warn!("ignoring events that are not keyed by season");
        return Ok(BTreeMap::new());
    };
    Ok(seasons
        .into_iter()
        .map(|(season, events)| {
            let events = match events {
                Value::Array(items) => items
                    .into_iter()
                    .filter_map(|item| RawEvent::deserialize(item).ok())
                    .collect(),
                _ => Vec::new(),
            };
            (season, events)
        })
        .collect())
}

#[derive(Debug, Default, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub crops: Vec<Crop>,
    #[serde(default)]
    pub fertilizer: Vec<Fertilizer>,
    /// Season id to events of that season.
    #[serde(default, deserialize_with = "event_lists")]
    pub events: BTreeMap<String, Vec<RawEvent>>,
}

fn calendar_events(events: &BTreeMap<String, Vec<RawEvent>>) -> Vec<CalendarEvent> {
    let mut out = Vec::new();
    for (season_id, season_events) in events {
        let Some(season) = Season::from_id(season_id) else {
            warn!(season = %season_id, "ignoring events of unknown season");
            continue;
        };
        for event in season_events {
            if !(1..=SEASON_DAYS).contains(&event.day) {
                warn!(season = %season_id, day = event.day, name = %event.name, "ignoring event outside the season");
                continue;
            }
            out.push(CalendarEvent {
                day: event.day,
                season,
                name: event.name.clone(),
                festival: event.festival,
            });
        }
    }
    out
}

/// Build the catalog. Planner-ready crops replace the config's crop list
/// when present; entries failing validation are skipped.
pub fn build_catalog(config: ConfigFile, planner: PlannerData) -> Catalog {
    let crops = match planner.crops {
        Some(raw) => raw.iter().map(adapt_crop).collect(),
        None => config.crops,
    };
    let crops: Vec<Crop> = crops
        .into_iter()
        .filter(|crop| match validate_crop(crop) {
            Ok(()) => true,
            Err(err) => {
                warn!(crop = %crop.id, %err, "skipping crop");
                false
            }
        })
        .collect();
    let fertilizers: Vec<Fertilizer> = config
        .fertilizer
        .into_iter()
        .filter(|f| match validate_fertilizer(f) {
            Ok(()) => true,
            Err(err) => {
                warn!(fertilizer = %f.id, %err, "skipping fertilizer");
                false
            }
        })
        .collect();
    let events = calendar_events(&config.events);
    Catalog::new(crops, fertilizers, events)
}

async fn read_json<T: serde::de::DeserializeOwned>(path: PathBuf) -> Result<T, LoadError> {
    let text = tokio::fs::read_to_string(&path)
        .await
        .map_err(|source| LoadError::Io {
            path: path.clone(),
            source,
        })?;
    serde_json::from_str(&text).map_err(|source| LoadError::Json { path, source })
}

/// Load both data files from `dir` concurrently.
pub async fn load_data(dir: &Path) -> Result<Catalog, LoadError> {
    let (config, planner) = tokio::try_join!(
        read_json::<ConfigFile>(dir.join(CONFIG_FILE)),
        read_json::<PlannerData>(dir.join(PLANNER_DATA_FILE)),
    )?;
    let catalog = build_catalog(config, planner);
    info!(
        crops = catalog.crops().len(),
        fertilizers = catalog.fertilizers().len(),
        events = catalog.events().len(),
        dir = %dir.display(),
        "game data loaded"
    );
    Ok(catalog)
}
