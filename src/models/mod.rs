//! Core data models for the laytime calculation engine.
//!
//! This module contains all the domain models used throughout the engine.

mod calculation;
mod cargo;
mod charter_party;
mod port_call;

pub use calculation::{
    ActivityContribution, AuditTrace, CalculationMethod, CalculationStatus, CalculationWarning,
    CargoPortLaytimeRow, LaytimeOutcome, PortCallUsage, VoyageTotals,
};
pub use cargo::Cargo;
pub use charter_party::{Allowance, AllowanceUnit, CharterParty};
pub use port_call::{CountBehavior, DeductionAddition, PortActivity, PortActivityKind, PortCall};
