//! Demurrage/despatch resolution.
//!
//! Compares allowed against used time and converts the excess or
//! shortfall into money at the charter party's daily rates. Monetary
//! rounding happens once, at the final amount, never on intermediate
//! daily fractions.

use rust_decimal::{Decimal, RoundingStrategy};

use super::interval::round_minutes;

/// Minutes in a running day, the divisor for per-day rates.
const MINUTES_PER_DAY: Decimal = Decimal::from_parts(1440, 0, 0, false, 0);

/// The resolved demurrage/despatch position of one account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settlement {
    /// Minutes in excess of the allowance.
    pub demurrage_minutes: Decimal,
    /// Minutes short of the allowance.
    pub despatch_minutes: Decimal,
    /// Demurrage owed, in whole cents.
    pub demurrage_amount_cents: Decimal,
    /// Despatch owed, in whole cents.
    pub despatch_amount_cents: Decimal,
    /// Derived indicator: the account ran over its allowance.
    pub on_demurrage: bool,
}

impl Settlement {
    /// A settlement with every figure at zero.
    pub fn zero() -> Self {
        Self {
            demurrage_minutes: Decimal::ZERO,
            despatch_minutes: Decimal::ZERO,
            demurrage_amount_cents: Decimal::ZERO,
            despatch_amount_cents: Decimal::ZERO,
            on_demurrage: false,
        }
    }
}

/// Converts a minute figure to cents at a per-day rate.
///
/// `minutes / 1440 * rate_per_day`, rounded half-up to whole cents in a
/// single step.
fn amount_cents(minutes: Decimal, rate_per_day: Decimal) -> Decimal {
    (minutes / MINUTES_PER_DAY * rate_per_day)
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}

/// Resolves one laytime account against its allowance.
///
/// `used > allowed` puts the account on demurrage, `used < allowed` earns
/// despatch, equality settles flat. Exactly one side of the settlement is
/// ever non-zero.
///
/// # Example
///
/// ```
/// use laytime_engine::calculation::resolve_settlement;
/// use rust_decimal::Decimal;
///
/// let settlement = resolve_settlement(
///     Decimal::new(2880, 0),
///     Decimal::new(3000, 0),
///     Decimal::new(10000, 0),
///     Decimal::new(5000, 0),
/// );
/// assert_eq!(settlement.demurrage_minutes, Decimal::new(120, 0));
/// assert_eq!(settlement.demurrage_amount_cents, Decimal::new(833, 0));
/// ```
pub fn resolve_settlement(
    allowed_minutes: Decimal,
    used_minutes: Decimal,
    demurrage_rate_per_day: Decimal,
    despatch_rate_per_day: Decimal,
) -> Settlement {
    if used_minutes > allowed_minutes {
        let excess = round_minutes(used_minutes - allowed_minutes);
        Settlement {
            demurrage_minutes: excess,
            despatch_minutes: Decimal::ZERO,
            demurrage_amount_cents: amount_cents(excess, demurrage_rate_per_day),
            despatch_amount_cents: Decimal::ZERO,
            on_demurrage: excess > Decimal::ZERO,
        }
    } else if used_minutes < allowed_minutes {
        let shortfall = round_minutes(allowed_minutes - used_minutes);
        Settlement {
            demurrage_minutes: Decimal::ZERO,
            despatch_minutes: shortfall,
            demurrage_amount_cents: Decimal::ZERO,
            despatch_amount_cents: amount_cents(shortfall, despatch_rate_per_day),
            on_demurrage: false,
        }
    } else {
        Settlement::zero()
    }
}

/// Apportions a total across weights, reconciling the last entry so the
/// portions sum to the total exactly.
fn apportion(total: Decimal, weights: &[Decimal], decimals: u32) -> Vec<Decimal> {
    if weights.is_empty() {
        return Vec::new();
    }

    let weight_sum: Decimal = weights.iter().copied().sum();
    let shares: Vec<Decimal> = if weight_sum == Decimal::ZERO {
        let even = Decimal::ONE / Decimal::from(weights.len() as i64);
        vec![even; weights.len()]
    } else {
        weights.iter().map(|w| *w / weight_sum).collect()
    };

    let mut portions = Vec::with_capacity(shares.len());
    let mut allocated = Decimal::ZERO;
    for (index, share) in shares.iter().enumerate() {
        let portion = if index + 1 == shares.len() {
            total - allocated
        } else {
            (total * share)
                .round_dp_with_strategy(decimals, RoundingStrategy::MidpointAwayFromZero)
        };
        allocated += portion;
        portions.push(portion);
    }

    portions
}

/// Apportions pooled minutes across rows by used-time weight.
///
/// The last row absorbs the rounding remainder, so the row figures sum to
/// the pooled figure exactly, never approximately.
pub fn apportion_minutes(total_minutes: Decimal, used_weights: &[Decimal]) -> Vec<Decimal> {
    apportion(total_minutes, used_weights, 2)
}

/// Apportions a pooled cent amount across rows by used-time weight.
///
/// Same reconciliation rule as [`apportion_minutes`], at whole-cent
/// precision.
pub fn apportion_cents(total_cents: Decimal, used_weights: &[Decimal]) -> Vec<Decimal> {
    apportion(total_cents, used_weights, 0)
}
