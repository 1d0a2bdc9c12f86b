//! Cargo model.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A cargo parcel carried on a voyage.
///
/// The quantity is the proration key whenever a shared allowance is split
/// across the cargoes worked at a port call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cargo {
    /// Unique identifier for the cargo.
    pub id: String,
    /// The voyage this cargo belongs to.
    pub voyage_id: String,
    /// Quantity of the cargo. Missing quantities deserialize to zero.
    #[serde(default)]
    pub quantity: Decimal,
    /// Unit of the quantity (e.g. "mt", "cbm").
    #[serde(default)]
    pub unit: String,
}

impl Cargo {
    /// Returns the weight this cargo contributes to quantity proration.
    ///
    /// Malformed quantities (missing or non-positive) carry zero weight
    /// rather than failing the calculation; when every cargo in a group
    /// weighs zero the allocator falls back to an even split.
    pub fn proration_weight(&self) -> Decimal {
        if self.quantity > Decimal::ZERO {
            self.quantity
        } else {
            Decimal::ZERO
        }
    }
}
