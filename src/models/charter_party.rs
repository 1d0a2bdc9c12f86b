//! Charter-party term models.
//!
//! A charter party fixes the commercial terms a laytime account settles
//! under: the allowed laytime, the daily demurrage and despatch rates, and
//! whether the load and discharge accounts are reversible.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::PortActivityKind;

/// Unit in which a charter party expresses its laytime allowance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AllowanceUnit {
    /// Allowance given directly in minutes.
    Minutes,
    /// Allowance given in running hours.
    Hours,
    /// Allowance given in running days.
    Days,
}

/// A laytime allowance: a value plus the unit it is expressed in.
///
/// # Example
///
/// ```
/// use laytime_engine::models::{Allowance, AllowanceUnit};
/// use rust_decimal::Decimal;
///
/// let allowance = Allowance {
///     value: Decimal::new(48, 0),
///     unit: AllowanceUnit::Hours,
/// };
/// assert_eq!(allowance.to_minutes(), Decimal::new(2880, 0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Allowance {
    /// The allowance value in the given unit.
    pub value: Decimal,
    /// The unit the value is expressed in.
    pub unit: AllowanceUnit,
}

impl Allowance {
    /// Converts the allowance to the engine's canonical unit (minutes).
    ///
    /// Conversion happens exactly once, when the allowance is allocated;
    /// downstream consumers only ever see minutes.
    pub fn to_minutes(&self) -> Decimal {
        match self.unit {
            AllowanceUnit::Minutes => self.value,
            AllowanceUnit::Hours => self.value * Decimal::new(60, 0),
            AllowanceUnit::Days => self.value * Decimal::new(1440, 0),
        }
    }
}

/// Per-voyage charter-party terms.
///
/// Immutable once a calculation begins. A voyage may carry several charter
/// parties (e.g. separate terms for the load and discharge legs), in which
/// case `applies_to` scopes each to an activity type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharterParty {
    /// Unique identifier for the charter party.
    pub id: String,
    /// The laytime the charterer is allowed before demurrage accrues.
    pub laytime_allowed: Allowance,
    /// Demurrage rate in cents per running day.
    pub demurrage_rate_per_day: Decimal,
    /// Despatch rate in cents per running day.
    pub despatch_rate_per_day: Decimal,
    /// Whether load and discharge time pool into a single laytime account.
    #[serde(default)]
    pub reversible: bool,
    /// Restricts these terms to port calls of one activity type.
    /// `None` means the terms cover any port call.
    #[serde(default)]
    pub applies_to: Option<PortActivityKind>,
}

impl CharterParty {
    /// Returns true if these terms cover a port call of the given activity.
    pub fn covers(&self, activity: PortActivityKind) -> bool {
        self.applies_to.is_none_or(|scoped| scoped == activity)
    }
}
