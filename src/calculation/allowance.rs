//! Allowance allocation across cargo/port-call pairings.
//!
//! Computes how much laytime each (cargo, port call) pairing is entitled
//! to under the selected calculation method, prorating shared allowances
//! across cargo quantities and pooled port calls. The charter-party
//! allowance is converted to canonical minutes exactly once, here.

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::models::{
    CalculationMethod, CalculationWarning, Cargo, CharterParty, PortActivityKind, PortCall,
};

use super::interval::round_minutes;

/// Grouping identifiers for one output row, typed per method so the
/// allowed combinations are enforced at construction instead of by
/// convention across three independently-nullable fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowGrouping {
    /// Standard method: rows from the same port call share a proration
    /// group.
    Standard {
        /// Rows whose allowance was split from this port call's allowance.
        prorate_group: Uuid,
    },
    /// Reversible method: every row belongs to one pooled laytime account.
    Reversible {
        /// The pooled laytime account.
        pool: Uuid,
        /// The display-level proration of the pooled allowance.
        prorate_group: Uuid,
    },
    /// Average method: per-port proration plus a per-cargo link across
    /// ports.
    Average {
        /// Rows whose allowance was split from this port call's allowance.
        prorate_group: Uuid,
        /// Rows for the same cargo across multiple ports.
        cargo_group: Uuid,
    },
}

impl RowGrouping {
    /// The reversible pool this row belongs to, if any.
    pub fn reversible_group_id(&self) -> Option<Uuid> {
        match self {
            RowGrouping::Reversible { pool, .. } => Some(*pool),
            _ => None,
        }
    }

    /// The proration group this row's allowance was split within.
    pub fn prorate_group_id(&self) -> Option<Uuid> {
        match self {
            RowGrouping::Standard { prorate_group }
            | RowGrouping::Reversible { prorate_group, .. }
            | RowGrouping::Average { prorate_group, .. } => Some(*prorate_group),
        }
    }

    /// The cargo-match group linking this cargo's rows across ports, if
    /// any.
    pub fn cargo_match_group_id(&self) -> Option<Uuid> {
        match self {
            RowGrouping::Average { cargo_group, .. } => Some(*cargo_group),
            _ => None,
        }
    }
}

/// The allowance allocated to one (cargo, port call) pairing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowAllowance {
    /// The cargo of the pairing.
    pub cargo_id: String,
    /// The port call of the pairing.
    pub port_call_id: String,
    /// The charter party whose rates settle this row.
    pub charter_party_id: String,
    /// Allowed minutes for this pairing.
    pub allowed_minutes: Decimal,
    /// This cargo's quantity share within its port call; used to split the
    /// call's used time and call-scoped adjustments across its rows.
    pub port_share: Decimal,
    /// Method-specific grouping identifiers.
    pub grouping: RowGrouping,
}

/// The full allocation produced for a calculation.
#[derive(Debug, Clone, Default)]
pub struct AllowancePlan {
    /// One entry per (cargo, port call) pairing in scope, in port-rotation
    /// order.
    pub rows: Vec<RowAllowance>,
    /// Non-blocking allocation warnings (missing charter party, empty
    /// reversible pool, unknown cargo references).
    pub warnings: Vec<CalculationWarning>,
}

/// Derives a deterministic grouping id from voyage-stable keys.
///
/// Recomputing a calculation with unchanged inputs must reproduce its row
/// set byte for byte, so grouping ids are UUIDv5 over the voyage id and
/// the grouped entity rather than random v4s.
fn group_id(voyage_id: &str, kind: &str, key: &str) -> Uuid {
    let name = format!("laytime:{voyage_id}:{kind}:{key}");
    Uuid::new_v5(&Uuid::NAMESPACE_OID, name.as_bytes())
}

/// Quantity shares for a set of cargoes, summing to one.
///
/// Proportional to quantity; cargoes with malformed quantities weigh
/// zero. When every weight is zero the split is even, which also covers
/// the all-equal tie case of a single-cargo group.
fn quantity_shares(cargoes: &[&Cargo]) -> Vec<Decimal> {
    let total: Decimal = cargoes.iter().map(|c| c.proration_weight()).sum();
    if total == Decimal::ZERO {
        let even = Decimal::ONE / Decimal::from(cargoes.len() as i64);
        return vec![even; cargoes.len()];
    }
    cargoes
        .iter()
        .map(|c| c.proration_weight() / total)
        .collect()
}

/// Splits a minute total across shares, conserving the total exactly.
///
/// Each portion is rounded to canonical precision and the rounding
/// remainder is absorbed by the largest share, so the portions always sum
/// to the original total.
pub(crate) fn split_conserving(total_minutes: Decimal, shares: &[Decimal]) -> Vec<Decimal> {
    if shares.is_empty() {
        return Vec::new();
    }

    let mut portions: Vec<Decimal> = shares
        .iter()
        .map(|share| round_minutes(total_minutes * share))
        .collect();

    let allocated: Decimal = portions.iter().copied().sum();
    let remainder = total_minutes - allocated;
    if remainder != Decimal::ZERO {
        let largest = shares
            .iter()
            .enumerate()
            .max_by(|(_, a), (_, b)| a.cmp(b))
            .map(|(index, _)| index)
            .unwrap_or(0);
        portions[largest] += remainder;
    }

    portions
}

/// Allocates the charter-party allowance across every (cargo, port call)
/// pairing in scope under the selected method.
///
/// Port calls are processed in rotation order. A port call with no
/// cargoes in scope produces no rows; one with no matching charter party
/// produces no rows and a warning.
pub fn allocate_allowances(
    voyage_id: &str,
    method: CalculationMethod,
    charter_parties: &[CharterParty],
    cargoes: &[Cargo],
    port_calls: &[PortCall],
) -> AllowancePlan {
    let mut plan = AllowancePlan::default();

    let mut ordered: Vec<&PortCall> = port_calls.iter().collect();
    ordered.sort_by_key(|call| call.sequence);

    match method {
        CalculationMethod::Standard | CalculationMethod::Average => {
            allocate_per_call(voyage_id, method, charter_parties, cargoes, &ordered, &mut plan);
        }
        CalculationMethod::Reversible => {
            allocate_pooled(voyage_id, charter_parties, cargoes, &ordered, &mut plan);
        }
    }

    plan
}

/// Resolves a port call's cargo references, warning about unknown ids.
fn cargoes_at_call<'a>(
    call: &PortCall,
    cargoes: &'a [Cargo],
    warnings: &mut Vec<CalculationWarning>,
) -> Vec<&'a Cargo> {
    let mut resolved = Vec::with_capacity(call.cargo_ids.len());
    for cargo_id in &call.cargo_ids {
        match cargoes.iter().find(|c| &c.id == cargo_id) {
            Some(cargo) => resolved.push(cargo),
            None => warnings.push(CalculationWarning::new(
                "UNKNOWN_CARGO",
                format!("port call '{}' references unknown cargo '{}'", call.id, cargo_id),
            )),
        }
    }
    resolved
}

/// Standard/Average allocation: each port call settles against the full
/// allowance of its matching charter party, split across the call's
/// cargoes by quantity.
fn allocate_per_call(
    voyage_id: &str,
    method: CalculationMethod,
    charter_parties: &[CharterParty],
    cargoes: &[Cargo],
    ordered: &[&PortCall],
    plan: &mut AllowancePlan,
) {
    for call in ordered {
        let at_call = cargoes_at_call(call, cargoes, &mut plan.warnings);
        if at_call.is_empty() {
            continue;
        }

        let Some(charter_party) = charter_parties.iter().find(|cp| cp.covers(call.activity))
        else {
            plan.warnings.push(CalculationWarning::new(
                "NO_CHARTER_PARTY",
                format!(
                    "no charter party covers port call '{}' ({:?})",
                    call.id, call.activity
                ),
            ));
            continue;
        };

        let total = round_minutes(charter_party.laytime_allowed.to_minutes());
        let shares = quantity_shares(&at_call);
        let portions = split_conserving(total, &shares);
        let prorate_group = group_id(voyage_id, "prorate", &call.id);

        for ((cargo, share), allowed) in at_call.iter().zip(&shares).zip(&portions) {
            let grouping = match method {
                CalculationMethod::Standard => RowGrouping::Standard { prorate_group },
                CalculationMethod::Average => RowGrouping::Average {
                    prorate_group,
                    cargo_group: group_id(voyage_id, "cargo-match", &cargo.id),
                },
                CalculationMethod::Reversible => unreachable!("pooled methods allocate separately"),
            };

            plan.rows.push(RowAllowance {
                cargo_id: cargo.id.clone(),
                port_call_id: call.id.clone(),
                charter_party_id: charter_party.id.clone(),
                allowed_minutes: *allowed,
                port_share: *share,
                grouping,
            });
        }
    }
}

/// Reversible allocation: load and discharge calls pool into one laytime
/// account; the allowance is prorated across the pool's rows by cargo
/// quantity for row-level display.
fn allocate_pooled(
    voyage_id: &str,
    charter_parties: &[CharterParty],
    cargoes: &[Cargo],
    ordered: &[&PortCall],
    plan: &mut AllowancePlan,
) {
    let Some(charter_party) = charter_parties
        .iter()
        .find(|cp| cp.reversible)
        .or_else(|| charter_parties.first())
    else {
        plan.warnings.push(CalculationWarning::new(
            "NO_CHARTER_PARTY",
            "no charter party supplied for reversible calculation",
        ));
        return;
    };

    // (call, cargoes) members of the pool, in rotation order
    let mut members: Vec<(&PortCall, Vec<&Cargo>)> = Vec::new();
    for call in ordered {
        if !matches!(
            call.activity,
            PortActivityKind::Load | PortActivityKind::Discharge
        ) {
            continue;
        }
        let at_call = cargoes_at_call(call, cargoes, &mut plan.warnings);
        if !at_call.is_empty() {
            members.push((call, at_call));
        }
    }

    if members.is_empty() {
        plan.warnings.push(CalculationWarning::new(
            "EMPTY_POOL",
            "reversible method selected but no load/discharge port call has cargo in scope",
        ));
        return;
    }

    let pool = group_id(voyage_id, "reversible", "pool");
    let prorate_group = group_id(voyage_id, "prorate", "pool");

    // Pool-wide display proration across every (cargo, call) pair.
    let pool_cargoes: Vec<&Cargo> = members
        .iter()
        .flat_map(|(_, at_call)| at_call.iter().copied())
        .collect();
    let pool_shares = quantity_shares(&pool_cargoes);
    let total = round_minutes(charter_party.laytime_allowed.to_minutes());
    let portions = split_conserving(total, &pool_shares);

    let mut pair_index = 0;
    for (call, at_call) in &members {
        let call_shares = quantity_shares(at_call);
        for (cargo, call_share) in at_call.iter().zip(&call_shares) {
            plan.rows.push(RowAllowance {
                cargo_id: cargo.id.clone(),
                port_call_id: call.id.clone(),
                charter_party_id: charter_party.id.clone(),
                allowed_minutes: portions[pair_index],
                port_share: *call_share,
                grouping: RowGrouping::Reversible {
                    pool,
                    prorate_group,
                },
            });
            pair_index += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Allowance, AllowanceUnit};
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn cargo(id: &str, quantity: &str) -> Cargo {
        Cargo {
            id: id.to_string(),
            voyage_id: "voy_001".to_string(),
            quantity: dec(quantity),
            unit: "mt".to_string(),
        }
    }

    fn port_call(id: &str, sequence: u32, activity: PortActivityKind, cargo_ids: &[&str]) -> PortCall {
        PortCall {
            id: id.to_string(),
            voyage_id: "voy_001".to_string(),
            sequence,
            activity,
            eta: None,
            etd: None,
            cargo_ids: cargo_ids.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn charter_party(id: &str, hours: &str, reversible: bool) -> CharterParty {
        CharterParty {
            id: id.to_string(),
            laytime_allowed: Allowance {
                value: dec(hours),
                unit: AllowanceUnit::Hours,
            },
            demurrage_rate_per_day: dec("10000"),
            despatch_rate_per_day: dec("5000"),
            reversible,
            applies_to: None,
        }
    }

    #[test]
    fn test_standard_single_cargo_gets_full_allowance() {
        let plan = allocate_allowances(
            "voy_001",
            CalculationMethod::Standard,
            &[charter_party("cp_001", "48", false)],
            &[cargo("cargo_001", "25000")],
            &[port_call("pc_001", 1, PortActivityKind::Load, &["cargo_001"])],
        );

        assert_eq!(plan.rows.len(), 1);
        assert_eq!(plan.rows[0].allowed_minutes, dec("2880"));
        assert_eq!(plan.rows[0].port_share, Decimal::ONE);
        assert!(plan.rows[0].grouping.reversible_group_id().is_none());
        assert!(plan.rows[0].grouping.prorate_group_id().is_some());
        assert!(plan.warnings.is_empty());
    }

    #[test]
    fn test_standard_prorates_by_quantity() {
        let plan = allocate_allowances(
            "voy_001",
            CalculationMethod::Standard,
            &[charter_party("cp_001", "48", false)],
            &[cargo("cargo_001", "30000"), cargo("cargo_002", "20000")],
            &[port_call(
                "pc_001",
                1,
                PortActivityKind::Load,
                &["cargo_001", "cargo_002"],
            )],
        );

        assert_eq!(plan.rows.len(), 2);
        assert_eq!(plan.rows[0].allowed_minutes, dec("1728"));
        assert_eq!(plan.rows[1].allowed_minutes, dec("1152"));
        assert_eq!(
            plan.rows[0].grouping.prorate_group_id(),
            plan.rows[1].grouping.prorate_group_id()
        );
    }

    #[test]
    fn test_equal_quantities_split_evenly() {
        let plan = allocate_allowances(
            "voy_001",
            CalculationMethod::Standard,
            &[charter_party("cp_001", "48", false)],
            &[cargo("cargo_001", "10000"), cargo("cargo_002", "10000")],
            &[port_call(
                "pc_001",
                1,
                PortActivityKind::Load,
                &["cargo_001", "cargo_002"],
            )],
        );

        assert_eq!(plan.rows[0].allowed_minutes, dec("1440"));
        assert_eq!(plan.rows[1].allowed_minutes, dec("1440"));
    }

    #[test]
    fn test_all_zero_quantities_split_evenly() {
        let plan = allocate_allowances(
            "voy_001",
            CalculationMethod::Standard,
            &[charter_party("cp_001", "48", false)],
            &[cargo("cargo_001", "0"), cargo("cargo_002", "0")],
            &[port_call(
                "pc_001",
                1,
                PortActivityKind::Load,
                &["cargo_001", "cargo_002"],
            )],
        );

        assert_eq!(plan.rows[0].allowed_minutes, dec("1440"));
        assert_eq!(plan.rows[1].allowed_minutes, dec("1440"));
    }

    #[test]
    fn test_proration_conserves_allowance_across_thirds() {
        let plan = allocate_allowances(
            "voy_001",
            CalculationMethod::Standard,
            &[CharterParty {
                laytime_allowed: Allowance {
                    value: dec("1000"),
                    unit: AllowanceUnit::Minutes,
                },
                ..charter_party("cp_001", "48", false)
            }],
            &[
                cargo("cargo_001", "100"),
                cargo("cargo_002", "100"),
                cargo("cargo_003", "100"),
            ],
            &[port_call(
                "pc_001",
                1,
                PortActivityKind::Load,
                &["cargo_001", "cargo_002", "cargo_003"],
            )],
        );

        let summed: Decimal = plan.rows.iter().map(|r| r.allowed_minutes).sum();
        assert_eq!(summed, dec("1000"));
        // Each portion stays within a cent-of-a-minute of the exact third
        for row in &plan.rows {
            assert!((row.allowed_minutes - dec("333.33")).abs() <= dec("0.01"));
        }
    }

    #[test]
    fn test_port_call_with_no_cargo_produces_no_rows() {
        let plan = allocate_allowances(
            "voy_001",
            CalculationMethod::Standard,
            &[charter_party("cp_001", "48", false)],
            &[cargo("cargo_001", "25000")],
            &[
                port_call("pc_001", 1, PortActivityKind::Load, &["cargo_001"]),
                port_call("pc_002", 2, PortActivityKind::Other, &[]),
            ],
        );

        assert_eq!(plan.rows.len(), 1);
        assert_eq!(plan.rows[0].port_call_id, "pc_001");
    }

    #[test]
    fn test_no_matching_charter_party_warns_and_skips() {
        let mut scoped = charter_party("cp_001", "48", false);
        scoped.applies_to = Some(PortActivityKind::Load);

        let plan = allocate_allowances(
            "voy_001",
            CalculationMethod::Standard,
            &[scoped],
            &[cargo("cargo_001", "25000")],
            &[port_call(
                "pc_001",
                1,
                PortActivityKind::Discharge,
                &["cargo_001"],
            )],
        );

        assert!(plan.rows.is_empty());
        assert_eq!(plan.warnings.len(), 1);
        assert_eq!(plan.warnings[0].code, "NO_CHARTER_PARTY");
    }

    #[test]
    fn test_activity_scoped_charter_parties_match_their_legs() {
        let mut load_terms = charter_party("cp_load", "48", false);
        load_terms.applies_to = Some(PortActivityKind::Load);
        let mut discharge_terms = charter_party("cp_disch", "72", false);
        discharge_terms.applies_to = Some(PortActivityKind::Discharge);

        let plan = allocate_allowances(
            "voy_001",
            CalculationMethod::Standard,
            &[load_terms, discharge_terms],
            &[cargo("cargo_001", "25000")],
            &[
                port_call("pc_001", 1, PortActivityKind::Load, &["cargo_001"]),
                port_call("pc_002", 2, PortActivityKind::Discharge, &["cargo_001"]),
            ],
        );

        assert_eq!(plan.rows.len(), 2);
        assert_eq!(plan.rows[0].charter_party_id, "cp_load");
        assert_eq!(plan.rows[0].allowed_minutes, dec("2880"));
        assert_eq!(plan.rows[1].charter_party_id, "cp_disch");
        assert_eq!(plan.rows[1].allowed_minutes, dec("4320"));
    }

    #[test]
    fn test_unknown_cargo_reference_warns_but_keeps_going() {
        let plan = allocate_allowances(
            "voy_001",
            CalculationMethod::Standard,
            &[charter_party("cp_001", "48", false)],
            &[cargo("cargo_001", "25000")],
            &[port_call(
                "pc_001",
                1,
                PortActivityKind::Load,
                &["cargo_001", "cargo_ghost"],
            )],
        );

        assert_eq!(plan.rows.len(), 1);
        assert_eq!(plan.warnings.len(), 1);
        assert_eq!(plan.warnings[0].code, "UNKNOWN_CARGO");
    }

    #[test]
    fn test_reversible_pools_load_and_discharge() {
        let plan = allocate_allowances(
            "voy_001",
            CalculationMethod::Reversible,
            &[charter_party("cp_001", "48", true)],
            &[cargo("cargo_001", "25000")],
            &[
                port_call("pc_001", 1, PortActivityKind::Load, &["cargo_001"]),
                port_call("pc_002", 2, PortActivityKind::Discharge, &["cargo_001"]),
            ],
        );

        assert_eq!(plan.rows.len(), 2);
        let pool_ids: Vec<_> = plan
            .rows
            .iter()
            .map(|r| r.grouping.reversible_group_id())
            .collect();
        assert!(pool_ids[0].is_some());
        assert_eq!(pool_ids[0], pool_ids[1]);

        // Display proration splits the single shared allowance
        let summed: Decimal = plan.rows.iter().map(|r| r.allowed_minutes).sum();
        assert_eq!(summed, dec("2880"));
    }

    #[test]
    fn test_reversible_excludes_other_calls_from_pool() {
        let plan = allocate_allowances(
            "voy_001",
            CalculationMethod::Reversible,
            &[charter_party("cp_001", "48", true)],
            &[cargo("cargo_001", "25000")],
            &[
                port_call("pc_001", 1, PortActivityKind::Load, &["cargo_001"]),
                port_call("pc_bunker", 2, PortActivityKind::Other, &["cargo_001"]),
                port_call("pc_002", 3, PortActivityKind::Discharge, &["cargo_001"]),
            ],
        );

        assert_eq!(plan.rows.len(), 2);
        assert!(plan.rows.iter().all(|r| r.port_call_id != "pc_bunker"));
    }

    #[test]
    fn test_reversible_without_poolable_calls_is_empty_with_warning() {
        let plan = allocate_allowances(
            "voy_001",
            CalculationMethod::Reversible,
            &[charter_party("cp_001", "48", true)],
            &[cargo("cargo_001", "25000")],
            &[port_call("pc_001", 1, PortActivityKind::Other, &["cargo_001"])],
        );

        assert!(plan.rows.is_empty());
        assert!(plan.warnings.iter().any(|w| w.code == "EMPTY_POOL"));
    }

    #[test]
    fn test_average_links_cargo_rows_across_ports() {
        let plan = allocate_allowances(
            "voy_001",
            CalculationMethod::Average,
            &[charter_party("cp_001", "48", false)],
            &[cargo("cargo_001", "25000"), cargo("cargo_002", "25000")],
            &[
                port_call("pc_001", 1, PortActivityKind::Load, &["cargo_001", "cargo_002"]),
                port_call(
                    "pc_002",
                    2,
                    PortActivityKind::Discharge,
                    &["cargo_001", "cargo_002"],
                ),
            ],
        );

        assert_eq!(plan.rows.len(), 4);

        let first_cargo_groups: Vec<_> = plan
            .rows
            .iter()
            .filter(|r| r.cargo_id == "cargo_001")
            .map(|r| r.grouping.cargo_match_group_id())
            .collect();
        assert_eq!(first_cargo_groups.len(), 2);
        assert_eq!(first_cargo_groups[0], first_cargo_groups[1]);

        let cross_cargo: Vec<_> = plan
            .rows
            .iter()
            .map(|r| r.grouping.cargo_match_group_id())
            .collect();
        assert_ne!(cross_cargo[0], cross_cargo[1]);

        assert!(plan.rows.iter().all(|r| r.grouping.reversible_group_id().is_none()));
    }

    #[test]
    fn test_allocation_is_deterministic() {
        let charter_parties = [charter_party("cp_001", "48", true)];
        let cargoes = [cargo("cargo_001", "30000"), cargo("cargo_002", "20000")];
        let port_calls = [
            port_call("pc_001", 1, PortActivityKind::Load, &["cargo_001", "cargo_002"]),
            port_call("pc_002", 2, PortActivityKind::Discharge, &["cargo_001"]),
        ];

        for method in [
            CalculationMethod::Standard,
            CalculationMethod::Reversible,
            CalculationMethod::Average,
        ] {
            let first =
                allocate_allowances("voy_001", method, &charter_parties, &cargoes, &port_calls);
            let second =
                allocate_allowances("voy_001", method, &charter_parties, &cargoes, &port_calls);
            assert_eq!(first.rows, second.rows);
        }
    }

    #[test]
    fn test_port_calls_processed_in_rotation_order() {
        let plan = allocate_allowances(
            "voy_001",
            CalculationMethod::Standard,
            &[charter_party("cp_001", "48", false)],
            &[cargo("cargo_001", "25000")],
            &[
                port_call("pc_late", 5, PortActivityKind::Discharge, &["cargo_001"]),
                port_call("pc_early", 1, PortActivityKind::Load, &["cargo_001"]),
            ],
        );

        assert_eq!(plan.rows[0].port_call_id, "pc_early");
        assert_eq!(plan.rows[1].port_call_id, "pc_late");
    }
}
