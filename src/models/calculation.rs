//! Calculation output models for the laytime engine.
//!
//! This module contains the [`LaytimeOutcome`] type and its associated
//! structures: the per cargo/port-call rows, the voyage totals, and the
//! audit trace that records how every recorded activity contributed.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The calculation method chosen for a laytime calculation.
///
/// The three methods are mutually exclusive and differ in how the
/// allowance is grouped and how the final result aggregates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CalculationMethod {
    /// Each port call settles independently against its own allowance.
    Standard,
    /// Load and discharge time pool into a single laytime account.
    Reversible,
    /// Port calls settle independently; the voyage result is the per-cargo
    /// arithmetic mean of the per-port net results.
    Average,
}

/// Lifecycle status of a laytime calculation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CalculationStatus {
    /// Created and being populated by operators; not yet computed.
    Draft,
    /// Rows and totals reflect the current input snapshot.
    Computed,
}

/// One output row per (cargo, port call) pair in scope.
///
/// All time figures are minutes rounded to two decimal places; monetary
/// amounts are whole cents. The three grouping identifiers are `None`
/// whenever the method does not use them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CargoPortLaytimeRow {
    /// The cargo this row settles for.
    pub cargo_id: String,
    /// The port call this row settles for.
    pub port_call_id: String,
    /// Laytime allowed to this pairing, in minutes.
    pub laytime_allowed_minutes: Decimal,
    /// Laytime used by this pairing after adjustments, in minutes.
    /// Never negative.
    pub laytime_used_minutes: Decimal,
    /// Total deduction minutes applied to this row.
    pub deductions_minutes: Decimal,
    /// Total addition minutes applied to this row.
    pub additions_minutes: Decimal,
    /// Minutes in excess of the allowance (demurrage side).
    pub time_on_demurrage_minutes: Decimal,
    /// Minutes short of the allowance (despatch side).
    pub time_on_despatch_minutes: Decimal,
    /// Demurrage owed for this row, in cents.
    pub demurrage_amount_cents: Decimal,
    /// Despatch owed for this row, in cents.
    pub despatch_amount_cents: Decimal,
    /// Derived indicator: this row's account ran over its allowance.
    pub on_demurrage: bool,
    /// Rows pooled into one laytime account under the reversible method.
    pub reversible_group_id: Option<Uuid>,
    /// Rows whose allowance was split from one shared allowance.
    pub prorate_group_id: Option<Uuid>,
    /// Rows belonging to the same cargo across multiple ports (average
    /// method).
    pub cargo_match_group_id: Option<Uuid>,
}

/// Aggregated totals for a laytime calculation.
///
/// For the standard and reversible methods every figure is a straight sum
/// of the row-level figures; for the average method the demurrage/despatch
/// figures are the per-cargo means summed across cargoes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoyageTotals {
    /// Total allowed minutes across all rows.
    pub laytime_allowed_minutes: Decimal,
    /// Total used minutes across all rows.
    pub laytime_used_minutes: Decimal,
    /// Total deduction minutes across all rows.
    pub deductions_minutes: Decimal,
    /// Total addition minutes across all rows.
    pub additions_minutes: Decimal,
    /// Total demurrage minutes for the voyage.
    pub time_on_demurrage_minutes: Decimal,
    /// Total despatch minutes for the voyage.
    pub time_on_despatch_minutes: Decimal,
    /// Total demurrage owed, in cents.
    pub demurrage_amount_cents: Decimal,
    /// Total despatch owed, in cents.
    pub despatch_amount_cents: Decimal,
    /// Derived indicator: the voyage as a whole is on demurrage.
    pub on_demurrage: bool,
}

impl VoyageTotals {
    /// Totals with every figure at zero, as produced for an empty scope.
    pub fn zero() -> Self {
        Self {
            laytime_allowed_minutes: Decimal::ZERO,
            laytime_used_minutes: Decimal::ZERO,
            deductions_minutes: Decimal::ZERO,
            additions_minutes: Decimal::ZERO,
            time_on_demurrage_minutes: Decimal::ZERO,
            time_on_despatch_minutes: Decimal::ZERO,
            demurrage_amount_cents: Decimal::ZERO,
            despatch_amount_cents: Decimal::ZERO,
            on_demurrage: false,
        }
    }
}

/// How one recorded activity contributed to its port call's used time.
///
/// Every activity appears here, including malformed ones whose
/// contribution degraded to zero; nothing is silently dropped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityContribution {
    /// The activity this contribution was derived from.
    pub activity_id: String,
    /// The recorded event type.
    pub event_type: String,
    /// Unweighted duration in minutes.
    pub raw_minutes: Decimal,
    /// The counting weight applied, as a percentage.
    pub weight_percent: Decimal,
    /// Weighted minutes counted against laytime.
    pub weighted_minutes: Decimal,
}

/// The used-time breakdown for one port call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortCallUsage {
    /// The port call these figures belong to.
    pub port_call_id: String,
    /// Sum of unweighted durations; statement rendering needs this
    /// alongside the weighted figure.
    pub raw_minutes: Decimal,
    /// Sum of weighted contributions counted against laytime.
    pub weighted_minutes: Decimal,
    /// Per-activity breakdown, retained for audit.
    pub contributions: Vec<ActivityContribution>,
}

/// A non-blocking warning generated during calculation.
///
/// Warnings surface ignored records (scope mismatches) and method
/// misconfigurations without failing the calculation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalculationWarning {
    /// A code identifying the type of warning.
    pub code: String,
    /// A human-readable description of the warning.
    pub message: String,
}

impl CalculationWarning {
    /// Creates a new warning.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

/// The complete audit trace for a calculation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditTrace {
    /// Used-time breakdowns per port call.
    pub port_usages: Vec<PortCallUsage>,
    /// Any warnings generated during calculation.
    pub warnings: Vec<CalculationWarning>,
    /// The total calculation duration in microseconds.
    pub duration_us: u64,
}

/// The complete result of a laytime calculation.
///
/// A recompute always produces a full replacement of the prior row set and
/// totals; the surrounding system persists it atomically per calculation
/// id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaytimeOutcome {
    /// Identifier of this calculation.
    pub calculation_id: Uuid,
    /// When the calculation was performed.
    pub timestamp: DateTime<Utc>,
    /// The version of the engine that performed the calculation.
    pub engine_version: String,
    /// The voyage the calculation is scoped to.
    pub voyage_id: String,
    /// The method the calculation ran under.
    pub method: CalculationMethod,
    /// Lifecycle status after this run.
    pub status: CalculationStatus,
    /// The replacement set of cargo/port-call rows.
    pub rows: Vec<CargoPortLaytimeRow>,
    /// Aggregated voyage totals, re-derivable from the rows.
    pub totals: VoyageTotals,
    /// Complete audit trace for this run.
    pub audit_trace: AuditTrace,
}
