#![deny(warnings)]

//! Stateful planning runtime.
//!
//! Holds plans per year and farm, rebuilds harvests and financial totals
//! from them, and wraps every mutation in undo/redo history and storage.

pub mod aggregate;
pub mod finance;
pub mod history;
pub mod model;
pub mod planner;

pub use aggregate::{aggregate_farm, harvest_for, update, AggregationContext};
pub use finance::{FarmTotals, Finance};
pub use history::History;
pub use model::{Farm, FarmKind, Harvest, Plan, Year};
pub use planner::{
    parse_amount, AmountError, Cursor, NewPlan, PlanError, Planner, PlannerState, SeasonSummary,
    Snapshot,
};
