#![deny(warnings)]

//! Headless CLI: load game data and saved plans, then report the projected
//! finances of a year.

use anyhow::{Context, Result};
use crop_advisor::{CropQuery, CropSortKey};
use crop_core::numeric::format_currency;
use crop_core::{Profession, Season, VERSION};
use crop_econ::Extent;
use crop_runtime::{Finance, FarmKind, Planner};
use persistence::{
    export_file_name, versioned_key, FileStore, KvStore, MemoryStore, SqliteStore, PLANS_KEY,
    PLAYER_KEY,
};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn, Level};
use tracing_subscriber::EnvFilter;

/// Settings read from the optional YAML file; flags override them.
#[derive(Debug, Default, Deserialize)]
struct Settings {
    data_dir: Option<PathBuf>,
    store_dir: Option<PathBuf>,
    sqlite_url: Option<String>,
    year: Option<usize>,
}

#[derive(Debug, Default)]
struct Args {
    config: Option<PathBuf>,
    data_dir: Option<PathBuf>,
    store_dir: Option<PathBuf>,
    sqlite_url: Option<String>,
    year: Option<usize>,
    season: Option<Season>,
    greenhouse: bool,
    profession: Option<Profession>,
    farming_level: Option<i64>,
    hide_events: bool,
    top: usize,
    export: Option<PathBuf>,
    import: Option<PathBuf>,
    legacy_import: Option<PathBuf>,
    version: bool,
}

fn parse_args() -> Args {
    let mut args = Args {
        top: 5,
        ..Args::default()
    };
    let mut it = std::env::args().skip(1);
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--config" => args.config = it.next().map(PathBuf::from),
            "--data" => args.data_dir = it.next().map(PathBuf::from),
            "--store" => args.store_dir = it.next().map(PathBuf::from),
            "--sqlite" => args.sqlite_url = it.next(),
            "--year" => args.year = it.next().and_then(|s| s.parse().ok()),
            "--season" => args.season = it.next().and_then(|s| Season::from_id(&s)),
            "--greenhouse" => args.greenhouse = true,
            "--profession" => args.profession = it.next().map(|s| Profession::from_id(&s)),
            "--level" => args.farming_level = it.next().and_then(|s| s.parse().ok()),
            "--hide-events" => args.hide_events = true,
            "--top" => args.top = it.next().and_then(|s| s.parse().ok()).unwrap_or(5),
            "--export" => args.export = it.next().map(PathBuf::from),
            "--import" => args.import = it.next().map(PathBuf::from),
            "--legacy-import" => args.legacy_import = it.next().map(PathBuf::from),
            "--version" | "-V" => args.version = true,
            other => warn!(arg = other, "ignoring unknown argument"),
        }
    }
    args
}

fn load_settings(path: Option<&Path>) -> Result<Settings> {
    let Some(path) = path else {
        return Ok(Settings::default());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading settings {}", path.display()))?;
    serde_yaml::from_str(&text).with_context(|| format!("parsing settings {}", path.display()))
}

/// `./data` when present, else the game data bundled at build time.
fn default_data_dir() -> PathBuf {
    let local = PathBuf::from("data");
    if local.is_dir() {
        local
    } else {
        PathBuf::from(env!("BUNDLED_DATA_DIR"))
    }
}

fn finance_line(label: &str, finance: &Finance) -> String {
    format!(
        "{label:<8} | plantings: {:>6} | harvests: {:>6} - {:<6} | cost: {:>10} | revenue: {} - {} | profit: {} - {}",
        finance.plantings_text(),
        finance.harvests_text(Extent::Min),
        finance.harvests_text(Extent::Max),
        finance.cost_text(),
        format_currency(finance.revenue(Extent::Min), 0),
        format_currency(finance.revenue(Extent::Max), 0),
        format_currency(finance.profit(Extent::Min), 0),
        format_currency(finance.profit(Extent::Max), 0),
    )
}

fn print_report(planner: &Planner, top: usize) {
    let cursor = planner.cursor();
    let farm = planner.farm();
    println!(
        "Year {} | {} | {} plans",
        cursor.year + 1,
        cursor.mode,
        farm.plan_count()
    );
    for season in Season::ALL {
        println!("{}", finance_line(season.name(), &farm.totals.season[season.index()]));
    }
    println!("{}", finance_line("Year", &farm.totals.year));

    let summary = planner.season_summary();
    let optional = |v: Option<rust_decimal::Decimal>| v.map_or("-".to_string(), |v| v.to_string());
    println!(
        "{} dashboard | invested: {} | revenue: {} | net: {} | per tile: {} | ROI: {}%",
        cursor.season.name(),
        format_currency(summary.investment, 0),
        format_currency(summary.revenue, 0),
        format_currency(summary.net, 0),
        optional(summary.per_tile),
        optional(summary.roi),
    );

    if planner.player().settings.show_events {
        for event in planner
            .catalog()
            .events()
            .values()
            .filter(|e| e.season == cursor.season)
        {
            println!("  day {:>2}: {}", event.day, event.text());
        }
    }

    let query = CropQuery {
        seasons: vec![cursor.season],
        sort: CropSortKey::ProfitPerDay,
        descending: true,
        ..CropQuery::default()
    };
    let visible = planner.visible_crops(&query);
    for crop in visible.rows.iter().take(top) {
        let Some(metrics) = planner.metrics().get(&crop.id) else {
            continue;
        };
        let marker = if visible.best_crop.as_ref() == Some(&crop.id) {
            "*"
        } else {
            " "
        };
        println!(
            "{marker} {:<20} {:>4} days | {} /day",
            crop.name,
            metrics.growth_days,
            format_currency(metrics.profit_per_day, 1)
        );
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logging setup
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_max_level(Level::INFO)
        .init();

    let args = parse_args();
    if args.version {
        println!(
            "crop-planner {VERSION} ({} {})",
            env!("GIT_SHA"),
            env!("BUILD_DATE")
        );
        return Ok(());
    }
    let settings = load_settings(args.config.as_deref())?;
    let data_dir = args
        .data_dir
        .or(settings.data_dir)
        .unwrap_or_else(default_data_dir);
    let sqlite_url = args.sqlite_url.or(settings.sqlite_url);
    let store_dir = args.store_dir.or(settings.store_dir);
    info!(data = %data_dir.display(), ?store_dir, ?sqlite_url, "starting CLI");

    let catalog = data_pipeline::load_data(&data_dir)
        .await
        .with_context(|| format!("loading game data from {}", data_dir.display()))?;

    let sqlite = match &sqlite_url {
        Some(url) => Some(SqliteStore::connect(url).await?),
        None => None,
    };
    let store: Box<dyn KvStore> = match (&sqlite, &store_dir) {
        (Some(db), _) => Box::new(db.snapshot().await?),
        (None, Some(dir)) => Box::new(FileStore::open(dir)?),
        (None, None) => Box::new(MemoryStore::new()),
    };

    let mut planner = Planner::new(Arc::new(catalog)).with_store(store);
    planner.load()?;

    if let Some(path) = &args.legacy_import {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let kept = planner.legacy_import(&text)?;
        println!("Imported {kept} legacy plans");
    }
    if let Some(path) = &args.import {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let count = planner.import_json(&text)?;
        println!("Imported {count} plans");
    }

    for _ in 0..args.year.or(settings.year).unwrap_or(0) {
        planner.inc_year(true);
    }
    if let Some(season) = args.season {
        planner.set_season(season);
    }
    if let Some(profession) = args.profession {
        planner.set_profession(profession);
    }
    if let Some(level) = args.farming_level {
        planner.set_farming_level(level);
    }
    if args.hide_events {
        planner.set_show_events(false);
    }
    if args.greenhouse {
        planner.set_mode(FarmKind::Greenhouse);
    }
    print_report(&planner, args.top);

    if let Some(target) = &args.export {
        let path = if target.is_dir() {
            target.join(export_file_name(chrono::Utc::now()))
        } else {
            target.clone()
        };
        let text = serde_json::to_string_pretty(&planner.export())?;
        std::fs::write(&path, text).with_context(|| format!("writing {}", path.display()))?;
        println!("Exported plans to {}", path.display());
    }

    if let (Some(db), Some(store)) = (&sqlite, planner.store()) {
        for base in [PLANS_KEY, PLAYER_KEY] {
            let key = versioned_key(base);
            if let Some(value) = store.get(&key)? {
                db.set(&key, &value).await?;
            }
        }
    }
    Ok(())
}
