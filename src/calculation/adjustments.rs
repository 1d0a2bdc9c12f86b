//! Deduction/addition ledger.
//!
//! Applies the operator's manual adjustments to the used-time figure of
//! each cargo/port-call row. Entries are signed minutes: positive reduces
//! the time counted against the charterer (a deduction), negative grants
//! time back to the account (an addition). Both sides are tracked
//! separately for statement rendering and applied as one signed sum.

use rust_decimal::Decimal;

use crate::models::{CalculationWarning, DeductionAddition};

use super::allowance::{RowAllowance, split_conserving};

/// The adjustment totals accumulated for one row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowAdjustments {
    /// Minutes deducted from the row's used time.
    pub deductions_minutes: Decimal,
    /// Minutes added back to the row's used time.
    pub additions_minutes: Decimal,
}

impl RowAdjustments {
    /// The net signed minutes removed from the row's used time.
    ///
    /// A deduction of N and an addition of N cancel exactly, leaving the
    /// demurrage/despatch result unchanged.
    pub fn net_signed(&self) -> Decimal {
        self.deductions_minutes - self.additions_minutes
    }

    fn absorb(&mut self, signed_minutes: Decimal) {
        if signed_minutes >= Decimal::ZERO {
            self.deductions_minutes += signed_minutes;
        } else {
            self.additions_minutes += -signed_minutes;
        }
    }
}

/// Applies every adjustment entry to the row set.
///
/// Entries scoped to a (cargo, port call) pair land on that row; entries
/// scoped to a port call alone split across the call's rows by the same
/// quantity shares the allowance was prorated with. Entries referencing
/// ids outside the calculation's scope are ignored and surfaced as
/// warnings, never fatal.
///
/// Returns one [`RowAdjustments`] per row, index-aligned with `rows`.
pub fn apply_adjustments(
    entries: &[DeductionAddition],
    rows: &[RowAllowance],
) -> (Vec<RowAdjustments>, Vec<CalculationWarning>) {
    let mut adjustments = vec![RowAdjustments::default(); rows.len()];
    let mut warnings = Vec::new();

    for entry in entries {
        let at_call: Vec<usize> = rows
            .iter()
            .enumerate()
            .filter(|(_, row)| row.port_call_id == entry.port_call_id)
            .map(|(index, _)| index)
            .collect();

        if at_call.is_empty() {
            warnings.push(CalculationWarning::new(
                "SCOPE_MISMATCH",
                format!(
                    "adjustment '{}' references port call '{}' outside the calculation scope",
                    entry.id, entry.port_call_id
                ),
            ));
            continue;
        }

        match &entry.cargo_id {
            Some(cargo_id) => {
                let target = at_call
                    .iter()
                    .copied()
                    .find(|&index| &rows[index].cargo_id == cargo_id);
                match target {
                    Some(index) => adjustments[index].absorb(entry.minutes),
                    None => warnings.push(CalculationWarning::new(
                        "SCOPE_MISMATCH",
                        format!(
                            "adjustment '{}' references cargo '{}' not worked at port call '{}'",
                            entry.id, cargo_id, entry.port_call_id
                        ),
                    )),
                }
            }
            None => {
                let shares: Vec<Decimal> =
                    at_call.iter().map(|&index| rows[index].port_share).collect();
                let portions = split_conserving(entry.minutes, &shares);
                for (&index, portion) in at_call.iter().zip(portions) {
                    adjustments[index].absorb(portion);
                }
            }
        }
    }

    (adjustments, warnings)
}
