//! Result assembly for a full laytime calculation.
//!
//! Takes a consistent snapshot of a voyage's inputs and produces the
//! complete replacement row set plus voyage totals. Each row is built
//! independently and the totals are summed immutably afterwards; no row
//! ever observes a partially-updated pool during construction.

use std::collections::HashMap;
use std::time::Instant;

use chrono::Utc;
use rust_decimal::{Decimal, RoundingStrategy};
use uuid::Uuid;

use crate::config::EventProfile;
use crate::models::{
    AuditTrace, CalculationMethod, CalculationStatus, CalculationWarning, Cargo,
    CargoPortLaytimeRow, CharterParty, DeductionAddition, LaytimeOutcome, PortActivity, PortCall,
    PortCallUsage, VoyageTotals,
};

use super::activity_totals::aggregate_port_activities;
use super::adjustments::{RowAdjustments, apply_adjustments};
use super::allowance::{AllowancePlan, RowAllowance, allocate_allowances, split_conserving};
use super::interval::round_minutes;
use super::settlement::{Settlement, apportion_cents, apportion_minutes, resolve_settlement};

/// The consistent input snapshot for one calculation run.
///
/// The caller is responsible for reading all records within one logical
/// transaction before invoking the engine; the engine itself performs no
/// I/O and cannot detect a partially-updated snapshot.
#[derive(Debug, Clone)]
pub struct CalculationInput {
    /// Identifier to stamp on the outcome; a fresh one is generated when
    /// absent.
    pub calculation_id: Option<Uuid>,
    /// The voyage in scope.
    pub voyage_id: String,
    /// The calculation method to run under.
    pub method: CalculationMethod,
    /// Charter-party terms applying to the voyage.
    pub charter_parties: Vec<CharterParty>,
    /// Cargoes in scope.
    pub cargoes: Vec<Cargo>,
    /// Port calls in scope.
    pub port_calls: Vec<PortCall>,
    /// Recorded port activities.
    pub activities: Vec<PortActivity>,
    /// Manual deductions and additions.
    pub adjustments: Vec<DeductionAddition>,
}

/// Runs the full calculation pipeline over one input snapshot.
///
/// Pure and reentrant: identical inputs produce identical rows and totals
/// (the envelope timestamp aside), so a recompute is always a total
/// replacement of the prior output. Degenerate inputs never fail; they
/// degrade to zero contributions or warnings per the error-handling
/// design.
pub fn calculate_voyage(input: &CalculationInput, profile: &EventProfile) -> LaytimeOutcome {
    let started = Instant::now();
    let mut warnings: Vec<CalculationWarning> = Vec::new();

    let cargoes = in_scope_cargoes(input, &mut warnings);
    let port_calls = in_scope_port_calls(input, &mut warnings);

    let port_usages = aggregate_usage(input, &port_calls, profile, &mut warnings);

    let mut plan = allocate_allowances(
        &input.voyage_id,
        input.method,
        &input.charter_parties,
        &cargoes,
        &port_calls,
    );
    warnings.append(&mut plan.warnings);

    let used_raw = split_used_time(&plan, &port_calls, &port_usages);

    let (adjustments, mut adjustment_warnings) = apply_adjustments(&input.adjustments, &plan.rows);
    warnings.append(&mut adjustment_warnings);

    let used_net: Vec<Decimal> = used_raw
        .iter()
        .zip(&adjustments)
        .map(|(raw, adjustment)| {
            let net = *raw - adjustment.net_signed();
            round_minutes(net.max(Decimal::ZERO))
        })
        .collect();

    let settlements = settle_rows(input.method, &plan, &used_net, &input.charter_parties);

    let rows = assemble_rows(&plan, &used_net, &adjustments, &settlements);
    let totals = assemble_totals(input.method, &rows);

    LaytimeOutcome {
        calculation_id: input.calculation_id.unwrap_or_else(Uuid::new_v4),
        timestamp: Utc::now(),
        engine_version: env!("CARGO_PKG_VERSION").to_string(),
        voyage_id: input.voyage_id.clone(),
        method: input.method,
        status: CalculationStatus::Computed,
        rows,
        totals,
        audit_trace: AuditTrace {
            port_usages,
            warnings,
            duration_us: started.elapsed().as_micros() as u64,
        },
    }
}

/// Cargoes belonging to the calculation's voyage; others are excluded
/// with a warning.
fn in_scope_cargoes(input: &CalculationInput, warnings: &mut Vec<CalculationWarning>) -> Vec<Cargo> {
    let mut in_scope = Vec::with_capacity(input.cargoes.len());
    for cargo in &input.cargoes {
        if cargo.voyage_id == input.voyage_id {
            in_scope.push(cargo.clone());
        } else {
            warnings.push(CalculationWarning::new(
                "SCOPE_MISMATCH",
                format!(
                    "cargo '{}' belongs to voyage '{}', not '{}'",
                    cargo.id, cargo.voyage_id, input.voyage_id
                ),
            ));
        }
    }
    in_scope
}

/// Port calls belonging to the calculation's voyage; others are excluded
/// with a warning.
fn in_scope_port_calls(
    input: &CalculationInput,
    warnings: &mut Vec<CalculationWarning>,
) -> Vec<PortCall> {
    let mut in_scope = Vec::with_capacity(input.port_calls.len());
    for call in &input.port_calls {
        if call.voyage_id == input.voyage_id {
            in_scope.push(call.clone());
        } else {
            warnings.push(CalculationWarning::new(
                "SCOPE_MISMATCH",
                format!(
                    "port call '{}' belongs to voyage '{}', not '{}'",
                    call.id, call.voyage_id, input.voyage_id
                ),
            ));
        }
    }
    in_scope
}

/// Aggregates recorded activities into per-call usage, in rotation order.
///
/// Every in-scope port call gets a usage entry, activity-free ones
/// included; activities referencing a call outside the scope are ignored
/// with a warning.
fn aggregate_usage(
    input: &CalculationInput,
    port_calls: &[PortCall],
    profile: &EventProfile,
    warnings: &mut Vec<CalculationWarning>,
) -> Vec<PortCallUsage> {
    let mut by_call: HashMap<&str, Vec<&PortActivity>> = HashMap::new();
    for activity in &input.activities {
        if port_calls.iter().any(|call| call.id == activity.port_call_id) {
            by_call
                .entry(activity.port_call_id.as_str())
                .or_default()
                .push(activity);
        } else {
            warnings.push(CalculationWarning::new(
                "SCOPE_MISMATCH",
                format!(
                    "activity '{}' references port call '{}' outside the calculation scope",
                    activity.id, activity.port_call_id
                ),
            ));
        }
    }

    let mut ordered: Vec<&PortCall> = port_calls.iter().collect();
    ordered.sort_by_key(|call| call.sequence);

    ordered
        .iter()
        .map(|call| {
            let activities = by_call.remove(call.id.as_str()).unwrap_or_default();
            aggregate_port_activities(&call.id, &activities, profile)
        })
        .collect()
}

/// Splits each port call's weighted used time across its rows by the
/// within-call quantity shares, conserving the call total.
fn split_used_time(
    plan: &AllowancePlan,
    port_calls: &[PortCall],
    port_usages: &[PortCallUsage],
) -> Vec<Decimal> {
    let mut used = vec![Decimal::ZERO; plan.rows.len()];

    for call in port_calls {
        let indices: Vec<usize> = plan
            .rows
            .iter()
            .enumerate()
            .filter(|(_, row)| row.port_call_id == call.id)
            .map(|(index, _)| index)
            .collect();
        if indices.is_empty() {
            continue;
        }

        let weighted = port_usages
            .iter()
            .find(|usage| usage.port_call_id == call.id)
            .map(|usage| usage.weighted_minutes)
            .unwrap_or(Decimal::ZERO);

        let shares: Vec<Decimal> = indices.iter().map(|&i| plan.rows[i].port_share).collect();
        for (&index, portion) in indices.iter().zip(split_conserving(weighted, &shares)) {
            used[index] = portion;
        }
    }

    used
}

/// Resolves every row's demurrage/despatch position under the method.
fn settle_rows(
    method: CalculationMethod,
    plan: &AllowancePlan,
    used_net: &[Decimal],
    charter_parties: &[CharterParty],
) -> Vec<Settlement> {
    let by_id: HashMap<&str, &CharterParty> = charter_parties
        .iter()
        .map(|cp| (cp.id.as_str(), cp))
        .collect();
    let rates = |row: &RowAllowance| {
        by_id
            .get(row.charter_party_id.as_str())
            .map(|cp| (cp.demurrage_rate_per_day, cp.despatch_rate_per_day))
            .unwrap_or((Decimal::ZERO, Decimal::ZERO))
    };

    match method {
        CalculationMethod::Standard | CalculationMethod::Average => plan
            .rows
            .iter()
            .zip(used_net)
            .map(|(row, used)| {
                let (demurrage_rate, despatch_rate) = rates(row);
                resolve_settlement(row.allowed_minutes, *used, demurrage_rate, despatch_rate)
            })
            .collect(),
        CalculationMethod::Reversible => settle_pool(plan, used_net, &rates),
    }
}

/// Reversible settlement: resolve once on the pooled totals, then
/// apportion back to rows pro rata by used time. The apportioned figures
/// sum exactly to the pooled figures.
fn settle_pool(
    plan: &AllowancePlan,
    used_net: &[Decimal],
    rates: &impl Fn(&RowAllowance) -> (Decimal, Decimal),
) -> Vec<Settlement> {
    if plan.rows.is_empty() {
        return Vec::new();
    }

    let pool_allowed: Decimal = plan.rows.iter().map(|row| row.allowed_minutes).sum();
    let pool_used: Decimal = used_net.iter().copied().sum();
    let (demurrage_rate, despatch_rate) = rates(&plan.rows[0]);

    let pooled = resolve_settlement(pool_allowed, pool_used, demurrage_rate, despatch_rate);

    if pooled.demurrage_minutes > Decimal::ZERO {
        let minutes = apportion_minutes(pooled.demurrage_minutes, used_net);
        let cents = apportion_cents(pooled.demurrage_amount_cents, used_net);
        minutes
            .into_iter()
            .zip(cents)
            .map(|(demurrage_minutes, demurrage_amount_cents)| Settlement {
                on_demurrage: demurrage_minutes > Decimal::ZERO,
                demurrage_minutes,
                despatch_minutes: Decimal::ZERO,
                demurrage_amount_cents,
                despatch_amount_cents: Decimal::ZERO,
            })
            .collect()
    } else if pooled.despatch_minutes > Decimal::ZERO {
        let minutes = apportion_minutes(pooled.despatch_minutes, used_net);
        let cents = apportion_cents(pooled.despatch_amount_cents, used_net);
        minutes
            .into_iter()
            .zip(cents)
            .map(|(despatch_minutes, despatch_amount_cents)| Settlement {
                on_demurrage: false,
                demurrage_minutes: Decimal::ZERO,
                despatch_minutes,
                demurrage_amount_cents: Decimal::ZERO,
                despatch_amount_cents,
            })
            .collect()
    } else {
        vec![Settlement::zero(); plan.rows.len()]
    }
}

/// Builds the final output rows from the pipeline's index-aligned parts.
fn assemble_rows(
    plan: &AllowancePlan,
    used_net: &[Decimal],
    adjustments: &[RowAdjustments],
    settlements: &[Settlement],
) -> Vec<CargoPortLaytimeRow> {
    plan.rows
        .iter()
        .zip(used_net)
        .zip(adjustments)
        .zip(settlements)
        .map(|(((row, used), adjustment), settlement)| CargoPortLaytimeRow {
            cargo_id: row.cargo_id.clone(),
            port_call_id: row.port_call_id.clone(),
            laytime_allowed_minutes: row.allowed_minutes,
            laytime_used_minutes: *used,
            deductions_minutes: adjustment.deductions_minutes,
            additions_minutes: adjustment.additions_minutes,
            time_on_demurrage_minutes: settlement.demurrage_minutes,
            time_on_despatch_minutes: settlement.despatch_minutes,
            demurrage_amount_cents: settlement.demurrage_amount_cents,
            despatch_amount_cents: settlement.despatch_amount_cents,
            on_demurrage: settlement.on_demurrage,
            reversible_group_id: row.grouping.reversible_group_id(),
            prorate_group_id: row.grouping.prorate_group_id(),
            cargo_match_group_id: row.grouping.cargo_match_group_id(),
        })
        .collect()
}

/// Sums the emitted rows into voyage totals.
///
/// Standard and reversible totals are straight sums. Average overrides
/// the demurrage/despatch figures with the per-cargo arithmetic mean of
/// the per-port net results, summed across cargoes.
fn assemble_totals(method: CalculationMethod, rows: &[CargoPortLaytimeRow]) -> VoyageTotals {
    let mut totals = VoyageTotals::zero();

    for row in rows {
        totals.laytime_allowed_minutes += row.laytime_allowed_minutes;
        totals.laytime_used_minutes += row.laytime_used_minutes;
        totals.deductions_minutes += row.deductions_minutes;
        totals.additions_minutes += row.additions_minutes;
        totals.time_on_demurrage_minutes += row.time_on_demurrage_minutes;
        totals.time_on_despatch_minutes += row.time_on_despatch_minutes;
        totals.demurrage_amount_cents += row.demurrage_amount_cents;
        totals.despatch_amount_cents += row.despatch_amount_cents;
    }

    if method == CalculationMethod::Average {
        apply_cargo_means(rows, &mut totals);
    }

    totals.on_demurrage = totals.time_on_demurrage_minutes > Decimal::ZERO;
    totals
}

/// Replaces the summed demurrage/despatch figures with per-cargo means.
fn apply_cargo_means(rows: &[CargoPortLaytimeRow], totals: &mut VoyageTotals) {
    let mut order: Vec<&str> = Vec::new();
    let mut by_cargo: HashMap<&str, Vec<&CargoPortLaytimeRow>> = HashMap::new();
    for row in rows {
        let entry = by_cargo.entry(row.cargo_id.as_str()).or_default();
        if entry.is_empty() {
            order.push(row.cargo_id.as_str());
        }
        entry.push(row);
    }

    totals.time_on_demurrage_minutes = Decimal::ZERO;
    totals.time_on_despatch_minutes = Decimal::ZERO;
    totals.demurrage_amount_cents = Decimal::ZERO;
    totals.despatch_amount_cents = Decimal::ZERO;

    for cargo_id in order {
        let cargo_rows = &by_cargo[cargo_id];
        let count = Decimal::from(cargo_rows.len() as i64);

        let net_minutes: Decimal = cargo_rows
            .iter()
            .map(|row| row.time_on_demurrage_minutes - row.time_on_despatch_minutes)
            .sum();
        let net_cents: Decimal = cargo_rows
            .iter()
            .map(|row| row.demurrage_amount_cents - row.despatch_amount_cents)
            .sum();

        let mean_minutes = round_minutes(net_minutes / count);
        let mean_cents = (net_cents / count)
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);

        if mean_minutes >= Decimal::ZERO {
            totals.time_on_demurrage_minutes += mean_minutes;
        } else {
            totals.time_on_despatch_minutes += -mean_minutes;
        }
        if mean_cents >= Decimal::ZERO {
            totals.demurrage_amount_cents += mean_cents;
        } else {
            totals.despatch_amount_cents += -mean_cents;
        }
    }
}
