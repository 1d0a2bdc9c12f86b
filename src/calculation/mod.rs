//! Calculation logic for the laytime engine.
//!
//! This module contains the six components of the calculation pipeline:
//! the interval arithmetic primitive, the per-port-call activity
//! aggregator, the allowance allocator, the deduction/addition ledger, the
//! demurrage/despatch resolver, and the result assembler that ties them
//! together. Data flows strictly top-down; every component is a pure
//! function over domain types and the whole pipeline is stateless and
//! reentrant.

mod activity_totals;
mod adjustments;
mod allowance;
mod engine;
mod interval;
mod settlement;

pub use activity_totals::aggregate_port_activities;
pub use adjustments::{RowAdjustments, apply_adjustments};
pub use allowance::{AllowancePlan, RowAllowance, RowGrouping, allocate_allowances};
pub use engine::{CalculationInput, calculate_voyage};
pub use interval::{duration_minutes, interval_minutes, parse_event_time, round_minutes};
pub use settlement::{Settlement, apportion_cents, apportion_minutes, resolve_settlement};
