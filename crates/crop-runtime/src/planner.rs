//! The planning session: years of plans, the navigation cursor, player
//! settings, undo/redo history, and the backing store.

use crate::aggregate::{update, AggregationContext};
use crate::history::History;
use crate::model::{Farm, FarmKind, Plan, Year};
use crop_advisor::{
    generate_optimal_plan, refresh_metrics, visible_crops, CropMetrics, CropQuery, OptimalPlan,
    VisibleCrops,
};
use crop_core::numeric::{clean_zero, round};
use crop_core::{
    Catalog, Crop, CropId, Perk, PlayerSettings, Profession, Season, YEAR_DAYS,
};
use crop_econ::{crop_lifecycle, Extent};
use persistence::{
    export_payload, load_player, load_plans, parse_import, parse_legacy, save_plans, save_player,
    ExportPayload, ImportError, KvStore, PlayerRecord, StoreError, YearRecord,
};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Position of the planner view.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Cursor {
    pub year: usize,
    pub season: Season,
    pub mode: FarmKind,
}

/// Plan contents plus cursor, as kept by the undo/redo history.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Snapshot {
    pub years: Vec<YearRecord>,
    pub cursor: Cursor,
}

/// A planting about to be added.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewPlan {
    pub crop: Option<CropId>,
    pub amount: u32,
    pub fertilizer: Option<String>,
}

impl Default for NewPlan {
    fn default() -> Self {
        Self {
            crop: None,
            amount: 1,
            fertilizer: None,
        }
    }
}

impl NewPlan {
    pub fn new(crop: &str, amount: u32) -> Self {
        Self {
            crop: Some(CropId(crop.to_string())),
            amount,
            fertilizer: None,
        }
    }

    pub fn with_fertilizer(mut self, fertilizer: &str) -> Self {
        self.fertilizer = Some(fertilizer.to_string());
        self
    }
}

/// Why a plan could not be added, edited, or restored. The planner is left
/// unchanged whenever one of these is returned.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PlanError {
    #[error("no crop selected")]
    NoCrop,
    #[error("unknown crop {0:?}")]
    UnknownCrop(String),
    #[error("day {0} is outside the year")]
    DayOutOfRange(u32),
    #[error("{crop} cannot be planted on day {day}")]
    OutOfSeason { crop: String, day: u32 },
    #[error("no plan #{index} on day {day}")]
    NoSuchPlan { day: u32, index: usize },
    #[error("amount must be at least 1")]
    InvalidAmount,
    #[error("snapshot holds no years")]
    EmptySnapshot,
}

/// Rejected planting amount input.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AmountError {
    #[error("invalid amount {0:?}")]
    Invalid(String),
}

/// Interpret the amount field of the add-plan form.
///
/// All whitespace is ignored. Blank means 1. `<digits>g` buys as many seeds
/// as that much gold allows, at least one; a free seed buys one. Otherwise
/// the input must be digits only and positive.
pub fn parse_amount(input: &str, seed_price: Decimal) -> Result<u32, AmountError> {
    let input: String = input.chars().filter(|c| !c.is_whitespace()).collect();
    if input.is_empty() {
        return Ok(1);
    }
    let is_digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    let invalid = || AmountError::Invalid(input.clone());
    if let Some(gold) = input.strip_suffix(['g', 'G']) {
        if !is_digits(gold) {
            return Err(invalid());
        }
        if seed_price <= Decimal::ZERO {
            return Ok(1);
        }
        let gold = gold.parse::<Decimal>().map_err(|_| invalid())?;
        let seeds = (gold / seed_price).floor();
        return Ok(crop_core::numeric::decimal_to_u32(seeds).max(1));
    }
    if !is_digits(&input) {
        return Err(invalid());
    }
    match input.parse::<u32>() {
        Ok(amount) if amount > 0 => Ok(amount),
        _ => Err(invalid()),
    }
}

/// Totals of the season shown on the dashboard.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SeasonSummary {
    pub investment: Decimal,
    pub revenue: Decimal,
    pub net: Decimal,
    /// Net profit per seed planted, one decimal.
    pub per_tile: Option<Decimal>,
    /// Net profit over investment in percent, one decimal.
    pub roi: Option<Decimal>,
}

/// Everything the planner shows and edits.
#[derive(Clone, Debug)]
pub struct PlannerState {
    pub years: Vec<Year>,
    pub catalog: Arc<Catalog>,
    pub cursor: Cursor,
    pub player: PlayerSettings,
}

/// Planning session over one catalog. Mutations are recorded in the history
/// and written to the store when one is attached.
pub struct Planner {
    state: PlannerState,
    metrics: BTreeMap<CropId, CropMetrics>,
    /// Form contents of the next planting.
    pub draft: NewPlan,
    history: History<Snapshot>,
    store: Option<Box<dyn KvStore>>,
}

impl Planner {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        let player = PlayerSettings::default();
        let metrics = refresh_metrics(&catalog, player.profession, player.farming_level);
        Self {
            state: PlannerState {
                years: vec![Year::new(0)],
                catalog,
                cursor: Cursor::default(),
                player,
            },
            metrics,
            draft: NewPlan::default(),
            history: History::new(),
            store: None,
        }
    }

    pub fn with_store(mut self, store: Box<dyn KvStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Read the player and plans from the store and aggregate everything.
    /// Plans of crops missing from the catalog are dropped.
    pub fn load(&mut self) -> Result<(), StoreError> {
        let Some(store) = self.store.as_deref() else {
            return Ok(());
        };
        let player = unreadable_as_missing("player", load_player(store))?;
        let plans = unreadable_as_missing("plans", load_plans(store))?;

        if let Some(player) = player {
            self.state.player = player.to_settings();
            self.refresh_metrics();
        }
        if let Some(records) = plans {
            self.state.years = self.rebuild_years(&records);
            self.clamp_cursor();
        }
        self.aggregate_all();
        info!(
            years = self.state.years.len(),
            plans = self.plan_count(),
            profession = %self.state.player.profession,
            level = self.state.player.farming_level,
            "planner loaded"
        );
        Ok(())
    }

    pub fn state(&self) -> &PlannerState {
        &self.state
    }

    pub fn years(&self) -> &[Year] {
        &self.state.years
    }

    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.state.catalog
    }

    pub fn cursor(&self) -> Cursor {
        self.state.cursor
    }

    pub fn player(&self) -> &PlayerSettings {
        &self.state.player
    }

    pub fn metrics(&self) -> &BTreeMap<CropId, CropMetrics> {
        &self.metrics
    }

    pub fn store(&self) -> Option<&dyn KvStore> {
        self.store.as_deref()
    }

    pub fn current_year(&self) -> &Year {
        &self.state.years[self.state.cursor.year]
    }

    /// Farm of the current year in the current mode.
    pub fn farm(&self) -> &Farm {
        self.current_year().farm(self.state.cursor.mode)
    }

    pub fn plan_count(&self) -> usize {
        self.state.years.iter().map(Year::plan_count).sum()
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    fn context(&self) -> AggregationContext {
        AggregationContext::from(&self.state.player)
    }

    pub fn records(&self) -> Vec<YearRecord> {
        self.state.years.iter().map(Year::to_record).collect()
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            years: self.records(),
            cursor: self.state.cursor,
        }
    }

    fn rebuild_years(&self, records: &[YearRecord]) -> Vec<Year> {
        let catalog = &self.state.catalog;
        let mut years: Vec<Year> = records
            .iter()
            .enumerate()
            .map(|(index, record)| {
                let mut year = Year::new(index);
                for (kind, days) in [
                    (FarmKind::Farm, &record.farm),
                    (FarmKind::Greenhouse, &record.greenhouse),
                ] {
                    let farm = year.farm_mut(kind);
                    for (&day, plans) in days {
                        if !(1..=YEAR_DAYS).contains(&day) {
                            debug!(year = index, day, "skipping plans outside the year");
                            continue;
                        }
                        for record in plans {
                            let Some(crop) = catalog.crop_by_str(&record.crop) else {
                                debug!(crop = %record.crop, "dropping plan of unknown crop");
                                continue;
                            };
                            let fertilizer = catalog.fertilizer_or_none(record.fertilizer.as_deref());
                            farm.plans.entry(day).or_default().push(Plan::new(
                                day,
                                Arc::clone(crop),
                                fertilizer,
                                record.amount,
                                kind == FarmKind::Greenhouse,
                            ));
                        }
                    }
                }
                year
            })
            .collect();
        if years.is_empty() {
            years.push(Year::new(0));
        }
        years
    }

    fn clamp_cursor(&mut self) {
        let last = self.state.years.len().saturating_sub(1);
        self.state.cursor.year = self.state.cursor.year.min(last);
    }

    fn aggregate_all(&mut self) {
        let ctx = self.context();
        update(&mut self.state.years, 0, FarmKind::Farm, true, &ctx);
        update(&mut self.state.years, 0, FarmKind::Greenhouse, true, &ctx);
    }

    fn update_current(&mut self, full: bool) {
        let ctx = self.context();
        let cursor = self.state.cursor;
        update(&mut self.state.years, cursor.year, cursor.mode, full, &ctx);
    }

    fn save(&mut self) {
        let records = self.records();
        if let Some(store) = self.store.as_deref_mut() {
            if let Err(err) = save_plans(store, &records) {
                warn!(%err, "failed to save plans");
            }
        }
    }

    fn save_player(&mut self) {
        let record = PlayerRecord::from(&self.state.player);
        if let Some(store) = self.store.as_deref_mut() {
            if let Err(err) = save_player(store, &record) {
                warn!(%err, "failed to save player");
            }
        }
    }

    /// Run `change` and record the prior snapshot if anything changed.
    fn with_history<R>(&mut self, change: impl FnOnce(&mut Self) -> R) -> R {
        let before = self.snapshot();
        let result = change(self);
        let after = self.snapshot();
        self.history.record(before, &after);
        result
    }

    /// Add `plan` on `day` of the current year and farm.
    ///
    /// With `auto_replant`, a crop that does not regrow is planted again on
    /// each harvest day while another harvest still fits before the end of
    /// its growing window (or the year, in the greenhouse). All plantings
    /// form a single history entry. Returns the number of plantings added.
    pub fn add_plan(
        &mut self,
        day: u32,
        plan: &NewPlan,
        auto_replant: bool,
    ) -> Result<usize, PlanError> {
        let crop_id = plan.crop.as_ref().ok_or(PlanError::NoCrop)?;
        if plan.amount == 0 {
            return Err(PlanError::InvalidAmount);
        }
        let crop = self
            .state
            .catalog
            .crop(crop_id)
            .cloned()
            .ok_or_else(|| PlanError::UnknownCrop(crop_id.0.clone()))?;
        if !(1..=YEAR_DAYS).contains(&day) {
            return Err(PlanError::DayOutOfRange(day));
        }
        let greenhouse = self.state.cursor.mode == FarmKind::Greenhouse;
        if !crop.can_grow_on(day, greenhouse) {
            return Err(PlanError::OutOfSeason {
                crop: crop.name.clone(),
                day,
            });
        }
        let fertilizer = self
            .state
            .catalog
            .fertilizer_or_none(plan.fertilizer.as_deref());
        let amount = plan.amount;
        let profession = self.state.player.profession;

        let added = self.with_history(|planner| {
            let cursor = planner.state.cursor;
            let farm = planner.state.years[cursor.year].farm_mut(cursor.mode);
            let limit = if greenhouse { YEAR_DAYS } else { crop.end_day() };
            let mut day = day;
            let mut added = 0;
            loop {
                let next = Plan::new(day, Arc::clone(&crop), Arc::clone(&fertilizer), amount, greenhouse);
                farm.plans.entry(day).or_default().push(next);
                added += 1;
                if !auto_replant || crop.regrows() {
                    break;
                }
                match next_planting_day(&crop, day, limit, &fertilizer, profession, greenhouse) {
                    Some(next) => day = next,
                    None => break,
                }
            }
            planner.save();
            planner.update_current(crop.regrows());
            added
        });
        debug!(crop = %crop.id.as_str(), day, added, "plan added");
        Ok(added)
    }

    /// Remove the `index`th plan of `day` from the current farm.
    pub fn remove_plan(&mut self, day: u32, index: usize) -> Result<Plan, PlanError> {
        let cursor = self.state.cursor;
        if self.farm().plans_on(day).get(index).is_none() {
            return Err(PlanError::NoSuchPlan { day, index });
        }
        let removed = self.with_history(|planner| {
            let farm = planner.state.years[cursor.year].farm_mut(cursor.mode);
            let mut plans = farm.plans.remove(&day).unwrap_or_default();
            let removed = plans.remove(index);
            if !plans.is_empty() {
                farm.plans.insert(day, plans);
            }
            planner.save();
            planner.update_current(removed.crop.regrows());
            removed
        });
        Ok(removed)
    }

    /// Change the amount and fertilizer of an existing plan.
    pub fn edit_plan(
        &mut self,
        day: u32,
        index: usize,
        amount: u32,
        fertilizer: Option<&str>,
    ) -> Result<(), PlanError> {
        let cursor = self.state.cursor;
        if self.farm().plans_on(day).get(index).is_none() {
            return Err(PlanError::NoSuchPlan { day, index });
        }
        if amount == 0 {
            return Err(PlanError::InvalidAmount);
        }
        let fertilizer = self.state.catalog.fertilizer_or_none(fertilizer);
        self.with_history(|planner| {
            let farm = planner.state.years[cursor.year].farm_mut(cursor.mode);
            let mut full = false;
            if let Some(plan) = farm.plans.get_mut(&day).and_then(|p| p.get_mut(index)) {
                plan.amount = amount;
                plan.fertilizer = fertilizer;
                plan.refresh_cost();
                full = plan.crop.regrows();
            }
            planner.save();
            planner.update_current(full);
        });
        Ok(())
    }

    /// Remove every plan of the current season in the current farm.
    /// Clears the history.
    pub fn clear_season(&mut self) {
        let cursor = self.state.cursor;
        let farm = self.state.years[cursor.year].farm_mut(cursor.mode);
        let full = farm.has_regrowing_crops(Some(cursor.season));
        farm.clear_days(cursor.season.start(), cursor.season.end());
        self.history.clear();
        self.save();
        self.update_current(full);
        info!(year = cursor.year, season = %cursor.season, mode = %cursor.mode, "season cleared");
    }

    /// Remove every plan of the current year in the current farm.
    /// Clears the history.
    pub fn clear_year(&mut self) {
        let cursor = self.state.cursor;
        let farm = self.state.years[cursor.year].farm_mut(cursor.mode);
        let full = farm.has_regrowing_crops(None);
        farm.clear_days(1, YEAR_DAYS);
        self.history.clear();
        self.save();
        self.update_current(full);
        info!(year = cursor.year, mode = %cursor.mode, "year cleared");
    }

    /// Drop every year and start over with an empty first year.
    pub fn clear_all(&mut self) {
        self.state.years = vec![Year::new(0)];
        self.state.cursor.year = 0;
        self.history.clear();
        self.save();
        self.aggregate_all();
        info!("all plans cleared");
    }

    fn restore(&mut self, snapshot: &Snapshot) -> Result<(), PlanError> {
        if snapshot.years.is_empty() {
            return Err(PlanError::EmptySnapshot);
        }
        self.state.years = self.rebuild_years(&snapshot.years);
        self.state.cursor = snapshot.cursor;
        self.clamp_cursor();
        self.save();
        self.aggregate_all();
        Ok(())
    }

    /// Step back one history entry. Returns whether anything was restored.
    pub fn undo(&mut self) -> bool {
        let current = self.snapshot();
        let mut history = std::mem::take(&mut self.history);
        let result = history.undo(current, |snapshot| self.restore(snapshot));
        self.history = history;
        report_restore("undo", result)
    }

    /// Re-apply the last undone entry. Returns whether anything was restored.
    pub fn redo(&mut self) -> bool {
        let current = self.snapshot();
        let mut history = std::mem::take(&mut self.history);
        let result = history.redo(current, |snapshot| self.restore(snapshot));
        self.history = history;
        report_restore("redo", result)
    }

    /// Move to the next or previous year. Moving past the last year creates
    /// it; there is nothing before the first. Returns the new year index.
    pub fn inc_year(&mut self, forward: bool) -> usize {
        let cursor = &mut self.state.cursor;
        if forward {
            cursor.year += 1;
            if cursor.year == self.state.years.len() {
                self.state.years.push(Year::new(cursor.year));
            }
        } else if cursor.year > 0 {
            cursor.year -= 1;
        }
        cursor.year
    }

    /// Move to the next or previous season, crossing year boundaries.
    pub fn inc_season(&mut self, forward: bool) -> Cursor {
        let index = self.state.cursor.season.index();
        match (forward, index) {
            (true, 3) => {
                self.inc_year(true);
                self.set_season(Season::Spring);
            }
            (true, i) => self.set_season(Season::from_index(i + 1)),
            (false, 0) if self.state.cursor.year > 0 => {
                self.inc_year(false);
                self.set_season(Season::Winter);
            }
            (false, 0) => {}
            (false, i) => self.set_season(Season::from_index(i - 1)),
        }
        self.state.cursor
    }

    /// Show `season`; the crop picked for the next planting is cleared.
    pub fn set_season(&mut self, season: Season) {
        self.state.cursor.season = season;
        self.draft.crop = None;
    }

    pub fn set_mode(&mut self, mode: FarmKind) {
        self.state.cursor.mode = mode;
    }

    pub fn toggle_mode(&mut self) -> FarmKind {
        self.state.cursor.mode = self.state.cursor.mode.toggled();
        self.state.cursor.mode
    }

    /// Crops that can be planted in the current view.
    pub fn valid_crops(&self) -> Vec<Arc<Crop>> {
        let cursor = self.state.cursor;
        self.state
            .catalog
            .crops()
            .iter()
            .filter(|crop| {
                cursor.mode == FarmKind::Greenhouse || crop.can_grow_in_season(cursor.season)
            })
            .cloned()
            .collect()
    }

    pub fn set_profession(&mut self, profession: Profession) {
        self.state.player.profession = profession;
        self.player_changed();
    }

    pub fn set_farming_level(&mut self, level: i64) {
        self.state.player.set_farming_level(level);
        self.player_changed();
    }

    pub fn toggle_perk(&mut self, perk: Perk) {
        self.state.player.toggle_perk(perk);
        self.player_changed();
    }

    pub fn set_show_events(&mut self, show: bool) {
        self.state.player.settings.show_events = show;
        self.save_player();
    }

    fn refresh_metrics(&mut self) {
        let player = &self.state.player;
        self.metrics = refresh_metrics(&self.state.catalog, player.profession, player.farming_level);
    }

    fn player_changed(&mut self) {
        self.refresh_metrics();
        self.save_player();
        self.aggregate_all();
        debug!(
            profession = %self.state.player.profession,
            level = self.state.player.farming_level,
            "player changed"
        );
    }

    /// Dashboard figures of the current season in the current farm.
    pub fn season_summary(&self) -> SeasonSummary {
        let season = self.state.cursor.season;
        let farm = self.farm();
        let mut investment = Decimal::ZERO;
        let mut revenue = Decimal::ZERO;
        for day in season.start()..=season.end() {
            investment += farm.plans_on(day).iter().map(Plan::total_cost).sum::<Decimal>();
            revenue += farm
                .harvests_on(day)
                .iter()
                .map(|h| h.revenue(Extent::Min))
                .sum::<Decimal>();
        }
        let totals = &farm.totals.season[season.index()];
        let net = totals.profit(Extent::Min);
        let per_tile = (totals.plantings > 0)
            .then(|| clean_zero(round(net / Decimal::from(totals.plantings), 1)));
        let roi = (investment > Decimal::ZERO)
            .then(|| clean_zero(round(net / investment * Decimal::ONE_HUNDRED, 1)));
        SeasonSummary {
            investment: clean_zero(investment),
            revenue: clean_zero(revenue),
            net: clean_zero(net),
            per_tile,
            roi,
        }
    }

    /// The crop table under `query`.
    pub fn visible_crops(&self, query: &CropQuery) -> VisibleCrops {
        visible_crops(self.state.catalog.crops(), &self.metrics, query)
    }

    /// Greedy allocation of `tiles` among the crops plantable in the current view.
    pub fn optimal_plan(&self, tiles: i64, days_remaining: i64) -> OptimalPlan {
        let candidates: Vec<CropMetrics> = self
            .valid_crops()
            .iter()
            .filter_map(|crop| self.metrics.get(&crop.id).cloned())
            .collect();
        generate_optimal_plan(&candidates, tiles, days_remaining)
    }

    pub fn export(&self) -> ExportPayload {
        export_payload(self.records())
    }

    /// Replace every plan with an exported file. Returns the number of plans
    /// loaded; on error nothing changes.
    pub fn import_json(&mut self, text: &str) -> Result<usize, ImportError> {
        let records = parse_import(text)?;
        self.history.clear();
        self.state.years = self.rebuild_years(&records);
        self.clamp_cursor();
        self.save();
        self.aggregate_all();
        let count = self.plan_count();
        info!(years = self.state.years.len(), plans = count, "plans imported");
        Ok(count)
    }

    /// Replace every year with the single year of v1 data and move to it.
    /// Returns the number of plans kept.
    pub fn legacy_import(&mut self, text: &str) -> Result<usize, ImportError> {
        let catalog = Arc::clone(&self.state.catalog);
        let (record, kept) = parse_legacy(text, |id| catalog.crop_by_str(id).is_some())?;
        self.history.clear();
        self.state.years = self.rebuild_years(std::slice::from_ref(&record));
        self.state.cursor.year = 0;
        self.save();
        self.aggregate_all();
        info!(plans = kept, "legacy plans imported");
        Ok(kept)
    }
}

/// Saved values that are not valid JSON load as absent; store failures
/// still propagate.
fn unreadable_as_missing<T>(
    key: &str,
    loaded: Result<Option<T>, StoreError>,
) -> Result<Option<T>, StoreError> {
    match loaded {
        Err(StoreError::Json(err)) => {
            warn!(key, %err, "ignoring unreadable saved data");
            Ok(None)
        }
        other => other,
    }
}

/// First harvest day of a planting on `day` when a planting on that harvest
/// day would itself still be harvested by `limit`.
fn next_planting_day(
    crop: &Crop,
    day: u32,
    limit: u32,
    fertilizer: &crop_core::Fertilizer,
    profession: Profession,
    greenhouse: bool,
) -> Option<u32> {
    let fertilizer = crop_core::FertilizerRef::Item(fertilizer);
    let harvest = crop_lifecycle(crop, day, Some(limit), fertilizer, profession, greenhouse)
        .first()
        .map(|event| event.day)?;
    let fits = !crop_lifecycle(crop, harvest, Some(limit), fertilizer, profession, greenhouse)
        .is_empty();
    fits.then_some(harvest)
}

fn report_restore(action: &str, result: Option<Result<(), PlanError>>) -> bool {
    match result {
        Some(Ok(())) => {
            debug!(action, "history restored");
            true
        }
        Some(Err(err)) => {
            warn!(action, %err, "history entry could not be restored");
            false
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::fixtures::catalog;
    use persistence::{versioned_key, MemoryStore, PlanRecord, PLANS_KEY, PLAYER_KEY};
    use proptest::prelude::*;

    fn planner() -> Planner {
        Planner::new(catalog()).with_store(Box::new(MemoryStore::new()))
    }

    fn state_json(p: &Planner) -> String {
        serde_json::to_string(&p.snapshot()).unwrap()
    }

    #[test]
    fn parse_amount_rules() {
        let seed = Decimal::from(20);
        assert_eq!(parse_amount("", seed), Ok(1));
        assert_eq!(parse_amount(" 12 ", seed), Ok(12));
        assert_eq!(parse_amount("500g", seed), Ok(25));
        assert_eq!(parse_amount("5g", seed), Ok(1));
        assert_eq!(parse_amount("5g", Decimal::ZERO), Ok(1));
        assert_eq!(parse_amount("1 000 g", seed), Ok(50));
        assert_eq!(parse_amount("\t7\n", seed), Ok(7));
        assert!(parse_amount("0", seed).is_err());
        assert!(parse_amount("-3", seed).is_err());
        assert!(parse_amount("+5", seed).is_err());
        assert!(parse_amount("+5g", seed).is_err());
        assert!(parse_amount("g", seed).is_err());
        assert!(parse_amount("1.5", seed).is_err());
        assert!(parse_amount("lots", seed).is_err());
    }

    #[test]
    fn add_then_remove_returns_to_empty() {
        let mut p = planner();
        assert_eq!(p.add_plan(1, &NewPlan::new("parsnip", 2), false), Ok(1));
        assert_eq!(p.farm().totals.year.cost, Decimal::from(40));
        assert_eq!(p.farm().harvests_on(5).len(), 1);

        let removed = p.remove_plan(1, 0).unwrap();
        assert_eq!(removed.amount, 2);
        assert!(p.farm().plans.is_empty());
        assert!(p.farm().harvests.is_empty());
        assert!(p.farm().totals.year.is_empty());
        assert_eq!(
            p.remove_plan(1, 0).unwrap_err(),
            PlanError::NoSuchPlan { day: 1, index: 0 }
        );
    }

    #[test]
    fn invalid_plans_change_nothing() {
        let mut p = planner();
        let before = state_json(&p);
        assert_eq!(p.add_plan(1, &NewPlan::default(), false), Err(PlanError::NoCrop));
        assert_eq!(
            p.add_plan(1, &NewPlan::new("cactus", 1), false),
            Err(PlanError::UnknownCrop("cactus".into()))
        );
        assert_eq!(
            p.add_plan(113, &NewPlan::new("parsnip", 1), false),
            Err(PlanError::DayOutOfRange(113))
        );
        assert!(matches!(
            p.add_plan(1, &NewPlan::new("melon", 1), false),
            Err(PlanError::OutOfSeason { .. })
        ));
        assert_eq!(
            p.add_plan(1, &NewPlan::new("parsnip", 0), true),
            Err(PlanError::InvalidAmount)
        );
        assert_eq!(p.plan_count(), 0);
        assert_eq!(state_json(&p), before);
        assert!(!p.can_undo());

        p.set_mode(FarmKind::Greenhouse);
        assert_eq!(p.add_plan(1, &NewPlan::new("melon", 1), false), Ok(1));
    }

    #[test]
    fn auto_replant_is_one_history_entry() {
        let mut p = planner();
        assert_eq!(p.add_plan(1, &NewPlan::new("parsnip", 1), true), Ok(6));
        let days: Vec<u32> = p.farm().plans.keys().copied().collect();
        assert_eq!(days, vec![1, 5, 9, 13, 17, 21]);
        assert!(p.undo());
        assert_eq!(p.plan_count(), 0);
        assert!(!p.can_undo());

        // regrowing crops are planted once
        assert_eq!(p.add_plan(1, &NewPlan::new("strawberry", 1), true), Ok(1));
    }

    #[test]
    fn undo_restores_identical_state_and_redo_reapplies() {
        let mut p = planner();
        p.add_plan(3, &NewPlan::new("kale", 4).with_fertilizer("basic_fertilizer"), false)
            .unwrap();
        let before = state_json(&p);
        p.add_plan(7, &NewPlan::new("strawberry", 2), false).unwrap();
        let after = state_json(&p);

        assert!(p.undo());
        assert_eq!(state_json(&p), before);
        assert!(p.can_redo());
        assert!(p.redo());
        assert_eq!(state_json(&p), after);
        assert!(!p.redo());
    }

    #[test]
    fn edit_changes_cost_and_is_undoable() {
        let mut p = planner();
        p.add_plan(1, &NewPlan::new("parsnip", 1), false).unwrap();
        p.edit_plan(1, 0, 3, Some("basic_fertilizer")).unwrap();
        assert_eq!(p.farm().plans_on(1)[0].total_cost(), Decimal::from(360));
        assert_eq!(p.farm().totals.year.cost, Decimal::from(360));
        assert!(p.undo());
        assert_eq!(p.farm().totals.year.cost, Decimal::from(20));
        assert!(p.edit_plan(2, 0, 1, None).is_err());

        let before = state_json(&p);
        assert_eq!(p.edit_plan(1, 0, 0, None), Err(PlanError::InvalidAmount));
        assert_eq!(state_json(&p), before);
        assert_eq!(p.farm().plans_on(1)[0].amount, 1);
        // a rejected edit records nothing, so the undone edit can still be redone
        assert!(p.can_redo());
    }

    #[test]
    fn clearing_resets_history() {
        let mut p = planner();
        p.add_plan(1, &NewPlan::new("parsnip", 1), false).unwrap();
        p.set_season(Season::Summer);
        p.clear_season();
        assert_eq!(p.plan_count(), 1);
        p.set_season(Season::Spring);
        p.clear_season();
        assert_eq!(p.plan_count(), 0);
        assert!(!p.can_undo());

        p.add_plan(1, &NewPlan::new("parsnip", 1), false).unwrap();
        p.clear_year();
        assert_eq!(p.plan_count(), 0);

        p.inc_year(true);
        p.inc_year(true);
        p.clear_all();
        assert_eq!(p.years().len(), 1);
        assert_eq!(p.cursor().year, 0);
    }

    #[test]
    fn navigation_wraps_and_extends() {
        let mut p = planner();
        assert_eq!(p.inc_year(false), 0);
        assert_eq!(p.inc_year(true), 1);
        assert_eq!(p.years().len(), 2);
        p.inc_year(false);

        p.draft = NewPlan::new("parsnip", 1);
        p.set_season(Season::Winter);
        assert!(p.draft.crop.is_none());
        let c = p.inc_season(true);
        assert_eq!((c.year, c.season), (1, Season::Spring));
        let c = p.inc_season(false);
        assert_eq!((c.year, c.season), (0, Season::Winter));
        p.set_season(Season::Spring);
        assert_eq!(p.inc_season(false).season, Season::Spring);

        let names = |p: &Planner| -> Vec<String> {
            p.valid_crops().iter().map(|c| c.id.0.clone()).collect()
        };
        assert_eq!(names(&p), ["parsnip", "strawberry", "kale"]);
        assert_eq!(p.toggle_mode(), FarmKind::Greenhouse);
        assert_eq!(names(&p).len(), 4);
    }

    #[test]
    fn player_changes_reaggregate_and_persist() {
        let mut p = planner();
        p.add_plan(1, &NewPlan::new("parsnip", 10), false).unwrap();
        assert_eq!(p.farm().totals.year.revenue.min, Decimal::from(350));
        p.toggle_perk(Perk::Tiller);
        assert_eq!(p.player().profession, Profession::Tiller);
        assert_eq!(p.farm().totals.year.revenue.min, Decimal::from(385));
        p.set_farming_level(42);
        assert_eq!(p.player().farming_level, 10);
        p.set_show_events(false);

        let saved = load_player(p.store().unwrap()).unwrap().unwrap();
        assert!(saved.tiller);
        assert_eq!(saved.level, 10);
        assert!(!saved.settings.show_events);
        assert!(p.metrics()[&CropId("parsnip".into())].profit_per_day > Decimal::ZERO);

        p.set_profession(Profession::None);
        assert_eq!(p.farm().totals.year.revenue.min, Decimal::from(350));
        assert!(!load_player(p.store().unwrap()).unwrap().unwrap().tiller);
    }

    #[test]
    fn season_summary_figures() {
        let mut p = planner();
        assert_eq!(p.season_summary(), SeasonSummary::default());
        p.add_plan(1, &NewPlan::new("parsnip", 2), false).unwrap();
        let s = p.season_summary();
        assert_eq!(s.investment, Decimal::from(40));
        assert_eq!(s.revenue, Decimal::from(70));
        assert_eq!(s.net, Decimal::from(30));
        assert_eq!(s.per_tile, Some(Decimal::from(15)));
        assert_eq!(s.roi, Some(Decimal::from(75)));
    }

    #[test]
    fn load_drops_unknown_crops() {
        let mut store = MemoryStore::new();
        let mut year = YearRecord::default();
        year.farm.insert(
            1,
            vec![PlanRecord::new("parsnip", 3, None), PlanRecord::new("cactus", 1, None)],
        );
        save_plans(&mut store, &[year, YearRecord::default()]).unwrap();

        let mut p = Planner::new(catalog()).with_store(Box::new(store));
        p.load().unwrap();
        assert_eq!(p.years().len(), 2);
        assert_eq!(p.plan_count(), 1);
        assert_eq!(p.farm().totals.year.cost, Decimal::from(60));
    }

    #[test]
    fn load_survives_damaged_saves() {
        let mut store = MemoryStore::new();
        store
            .set(
                &versioned_key(PLANS_KEY),
                r#"[{"farm":{"1":[{"crop":"parsnip","amount":2},{"amount":1},"kale"]}}, 4]"#
                    .into(),
            )
            .unwrap();
        store.set(&versioned_key(PLAYER_KEY), "{not json".into()).unwrap();

        let mut p = Planner::new(catalog()).with_store(Box::new(store));
        p.load().unwrap();
        assert_eq!(p.years().len(), 2);
        assert_eq!(p.plan_count(), 1);
        assert_eq!(p.farm().totals.year.cost, Decimal::from(40));
        assert_eq!(p.player(), &PlayerSettings::default());

        let mut garbage = MemoryStore::new();
        garbage.set(&versioned_key(PLANS_KEY), "[[[".into()).unwrap();
        let mut q = Planner::new(catalog()).with_store(Box::new(garbage));
        q.load().unwrap();
        assert_eq!(q.years().len(), 1);
        assert_eq!(q.plan_count(), 0);
    }

    #[test]
    fn export_import_round_trip() {
        let mut p = planner();
        p.add_plan(1, &NewPlan::new("strawberry", 2), false).unwrap();
        p.set_mode(FarmKind::Greenhouse);
        p.add_plan(40, &NewPlan::new("melon", 1), false).unwrap();
        let text = serde_json::to_string(&p.export()).unwrap();

        let mut q = planner();
        q.add_plan(1, &NewPlan::new("parsnip", 1), false).unwrap();
        assert_eq!(q.import_json(&text).unwrap(), 2);
        assert_eq!(q.records(), p.records());
        assert!(!q.can_undo());

        let before = state_json(&q);
        assert!(matches!(
            q.import_json(r#"{"plans":[],"version":"1"}"#),
            Err(ImportError::VersionMismatch { .. })
        ));
        assert!(matches!(q.import_json("{}"), Err(ImportError::MissingPlans)));
        assert!(matches!(q.import_json("nope"), Err(ImportError::Json(_))));
        assert_eq!(state_json(&q), before);
    }

    #[test]
    fn legacy_import_fills_first_year() {
        let mut p = planner();
        let text = r#"{
            "1": [{"crop": "parsnip", "amount": 2}, {"crop": "cactus"}],
            "30": [{"crop": "melon", "amount": "3", "greenhouse": true}]
        }"#;
        assert_eq!(p.legacy_import(text).unwrap(), 2);
        assert_eq!(p.years()[0].farm.plan_count(), 1);
        assert_eq!(p.years()[0].greenhouse.plans_on(30)[0].amount, 3);
    }

    #[test]
    fn legacy_import_replaces_every_year() {
        let mut p = planner();
        p.add_plan(1, &NewPlan::new("kale", 1), false).unwrap();
        p.inc_year(true);
        p.add_plan(2, &NewPlan::new("parsnip", 1), false).unwrap();
        assert_eq!(p.years().len(), 2);

        let text = r#"{"1":[{"crop":"parsnip","amount":2,"greenhouse":1}]}"#;
        assert_eq!(p.legacy_import(text).unwrap(), 1);
        assert_eq!(p.years().len(), 1);
        assert_eq!(p.plan_count(), 1);
        assert_eq!(p.cursor().year, 0);
        assert_eq!(p.years()[0].greenhouse.plans_on(1)[0].amount, 2);
        assert!(p.years()[0].farm.plans.is_empty());
    }

    #[test]
    fn optimal_plan_uses_plantable_crops() {
        let p = planner();
        let plan = p.optimal_plan(10, 28);
        assert!(plan
            .allocations
            .iter()
            .all(|a| a.crop_name != "melon"));
    }

    proptest! {
        #[test]
        fn adding_and_removing_round_trips(days in proptest::collection::vec(1u32..=28, 1..8)) {
            let mut p = planner();
            let empty = state_json(&p);
            for day in &days {
                p.add_plan(*day, &NewPlan::new("strawberry", 1), false).unwrap();
            }
            prop_assert_eq!(p.plan_count(), days.len());
            for day in &days {
                p.remove_plan(*day, 0).unwrap();
            }
            prop_assert_eq!(state_json(&p), empty);
            prop_assert!(p.farm().totals.year.is_empty());
            prop_assert!(p.farm().harvests.is_empty());
        }
    }
}
