#![deny(warnings)]

//! Initialise the SQLite save database and optionally seed it from a
//! directory store.

use persistence::{default_sqlite_url, FileStore, KvStore, SqliteStore, PLANS_KEY, PLAYER_KEY};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let mut args = std::env::args().skip(1);
    let url = args.next().unwrap_or_else(|| default_sqlite_url().to_string());
    let seed_dir = args.next();

    // Ensure the parent directory exists for file databases
    let path = url
        .strip_prefix("sqlite://")
        .or_else(|| url.strip_prefix("sqlite:"))
        .filter(|p| !p.starts_with(":memory:"));
    if let Some(path) = path {
        if let Some(parent) = std::path::Path::new(path).parent() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let store = SqliteStore::connect(&url).await?;

    if let Some(dir) = seed_dir {
        let files = FileStore::open(&dir)?;
        for base in [PLANS_KEY, PLAYER_KEY] {
            let key = persistence::versioned_key(base);
            if let Some(value) = files.get(&key)? {
                store.set(&key, &value).await?;
                tracing::info!(%key, from = %dir, "seeded entry");
            }
        }
    }
    println!("DB migrated at {} ({} entries)", url, store.keys().await?.len());
    Ok(())
}
