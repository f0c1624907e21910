#![deny(warnings)]

//! Persistence layer: saved plan and player records, versioned key-value
//! stores (memory, directory, SQLite), and plan export/import.

pub mod records;
pub mod sqlite;
pub mod store;
pub mod transfer;

pub use records::{year_list, DayPlans, PlanRecord, PlayerRecord, YearRecord};
pub use sqlite::{default_sqlite_url, SqliteStore};
pub use store::{FileStore, KvStore, MemoryStore};
pub use transfer::{
    export_file_name, export_payload, parse_import, parse_legacy, ExportPayload, ImportError,
};

use crop_core::DATA_VERSION;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;
use tracing::debug;

/// Base key of the saved plans.
pub const PLANS_KEY: &str = "plans";
/// Base key of the saved player settings.
pub const PLAYER_KEY: &str = "player";

/// Storage failures.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("i/o error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("stored value is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("database error: {0}")]
    Sql(#[from] sqlx::Error),
    #[error("invalid store key {0:?}")]
    InvalidKey(String),
}

/// Store key carrying the data version, e.g. `plans_v2`.
pub fn versioned_key(key: &str) -> String {
    format!("{key}_v{DATA_VERSION}")
}

/// Serialize `value` under the versioned form of `key`.
pub fn save_json<T: Serialize + ?Sized>(
    store: &mut dyn KvStore,
    key: &str,
    value: &T,
) -> Result<(), StoreError> {
    let text = serde_json::to_string(value)?;
    let key = versioned_key(key);
    debug!(%key, bytes = text.len(), "saving");
    store.set(&key, text)
}

/// Read and parse the versioned form of `key`; `None` when absent or empty.
pub fn load_json<T: DeserializeOwned>(
    store: &dyn KvStore,
    key: &str,
) -> Result<Option<T>, StoreError> {
    match store.get(&versioned_key(key))? {
        Some(text) if !text.trim().is_empty() => Ok(Some(serde_json::from_str(&text)?)),
        _ => Ok(None),
    }
}

#[derive(Deserialize)]
struct SavedYears(#[serde(deserialize_with = "year_list")] Vec<YearRecord>);

pub fn save_plans(store: &mut dyn KvStore, years: &[YearRecord]) -> Result<(), StoreError> {
    save_json(store, PLANS_KEY, years)
}

pub fn load_plans(store: &dyn KvStore) -> Result<Option<Vec<YearRecord>>, StoreError> {
    Ok(load_json::<SavedYears>(store, PLANS_KEY)?.map(|SavedYears(years)| years))
}

pub fn save_player(store: &mut dyn KvStore, player: &PlayerRecord) -> Result<(), StoreError> {
    save_json(store, PLAYER_KEY, player)
}

pub fn load_player(store: &dyn KvStore) -> Result<Option<PlayerRecord>, StoreError> {
    load_json(store, PLAYER_KEY)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn keys_carry_data_version() {
        assert_eq!(versioned_key(PLANS_KEY), "plans_v2");
        assert_eq!(versioned_key(PLAYER_KEY), "player_v2");
    }

    #[test]
    fn plans_round_trip_through_store() {
        let mut store = MemoryStore::new();
        assert_eq!(load_plans(&store).unwrap(), None);
        let mut year = YearRecord::default();
        year.greenhouse.insert(40, vec![PlanRecord::new("melon", 9, None)]);
        save_plans(&mut store, &[year.clone(), YearRecord::default()]).unwrap();
        assert_eq!(
            load_plans(&store).unwrap(),
            Some(vec![year, YearRecord::default()])
        );
    }

    #[test]
    fn corrupt_entries_surface_errors() {
        let mut store = MemoryStore::new();
        store.set("player_v2", "{oops".into()).unwrap();
        assert!(matches!(load_player(&store), Err(StoreError::Json(_))));
        store.set("player_v2", "  ".into()).unwrap();
        assert_eq!(load_player(&store).unwrap(), None);
    }

    proptest! {
        #[test]
        fn amounts_survive_storage(amount in 1u32..100_000, day in 1u32..=112) {
            let mut store = MemoryStore::new();
            let mut year = YearRecord::default();
            year.farm.insert(day, vec![PlanRecord::new("kale", amount, Some("speed_gro".into()))]);
            save_plans(&mut store, std::slice::from_ref(&year)).unwrap();
            prop_assert_eq!(load_plans(&store).unwrap(), Some(vec![year]));
        }
    }
}
