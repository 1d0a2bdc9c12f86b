//! Request types for the laytime engine API.
//!
//! This module defines the JSON request structures for the `/calculate`
//! endpoint. The surrounding platform's records arrive with loose shapes
//! (optional ids, alternate field spellings, free-form timestamps and
//! counting labels); everything is normalized into the strict domain
//! types here, once, at the boundary.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::calculation::{CalculationInput, parse_event_time};
use crate::models::{
    Allowance, AllowanceUnit, CalculationMethod, Cargo, CharterParty, CountBehavior,
    DeductionAddition, PortActivity, PortActivityKind, PortCall,
};

/// Request body for the `/calculate` endpoint.
///
/// Carries the full input snapshot for one laytime calculation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalculationRequest {
    /// Identifier of the calculation being recomputed; a fresh one is
    /// generated when absent.
    #[serde(default)]
    pub calculation_id: Option<Uuid>,
    /// The voyage in scope.
    pub voyage_id: String,
    /// The calculation method to run under.
    pub method: CalculationMethod,
    /// Charter-party terms applying to the voyage.
    #[serde(default)]
    pub charter_parties: Vec<CharterPartyRequest>,
    /// Cargoes in scope.
    #[serde(default)]
    pub cargoes: Vec<CargoRequest>,
    /// Port calls in scope, in rotation order.
    #[serde(default)]
    pub port_calls: Vec<PortCallRequest>,
    /// Recorded port activities.
    #[serde(default)]
    pub activities: Vec<PortActivityRequest>,
    /// Manual deductions and additions.
    #[serde(default)]
    pub adjustments: Vec<AdjustmentRequest>,
}

impl CalculationRequest {
    /// Normalizes the request into the engine's input snapshot.
    ///
    /// Records without their own voyage id inherit the calculation's;
    /// explicit foreign voyage ids survive into the snapshot so the
    /// engine can warn about them.
    pub fn into_input(self) -> CalculationInput {
        let voyage_id = self.voyage_id;
        CalculationInput {
            calculation_id: self.calculation_id,
            method: self.method,
            charter_parties: self
                .charter_parties
                .into_iter()
                .map(CharterPartyRequest::into_domain)
                .collect(),
            cargoes: self
                .cargoes
                .into_iter()
                .map(|cargo| cargo.into_domain(&voyage_id))
                .collect(),
            port_calls: self
                .port_calls
                .into_iter()
                .map(|call| call.into_domain(&voyage_id))
                .collect(),
            activities: self
                .activities
                .into_iter()
                .enumerate()
                .map(|(index, activity)| activity.into_domain(index))
                .collect(),
            adjustments: self
                .adjustments
                .into_iter()
                .enumerate()
                .map(|(index, adjustment)| adjustment.into_domain(index))
                .collect(),
            voyage_id,
        }
    }
}

/// Charter-party terms in a calculation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CharterPartyRequest {
    /// Unique identifier for the charter party.
    pub id: String,
    /// The allowed laytime.
    pub laytime_allowed: AllowanceRequest,
    /// Demurrage rate in cents per running day.
    pub demurrage_rate_per_day: Decimal,
    /// Despatch rate in cents per running day.
    pub despatch_rate_per_day: Decimal,
    /// Whether load and discharge pool into one account.
    #[serde(default)]
    pub reversible: bool,
    /// Restricts the terms to one activity type.
    #[serde(default)]
    pub applies_to: Option<PortActivityKind>,
}

impl CharterPartyRequest {
    fn into_domain(self) -> CharterParty {
        CharterParty {
            id: self.id,
            laytime_allowed: Allowance {
                value: self.laytime_allowed.value,
                unit: self.laytime_allowed.unit,
            },
            demurrage_rate_per_day: self.demurrage_rate_per_day,
            despatch_rate_per_day: self.despatch_rate_per_day,
            reversible: self.reversible,
            applies_to: self.applies_to,
        }
    }
}

/// A laytime allowance in a calculation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllowanceRequest {
    /// The allowance value.
    pub value: Decimal,
    /// The unit the value is expressed in.
    pub unit: AllowanceUnit,
}

/// Cargo information in a calculation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CargoRequest {
    /// Unique identifier for the cargo.
    pub id: String,
    /// The voyage the cargo belongs to; defaults to the calculation's.
    #[serde(default)]
    pub voyage_id: Option<String>,
    /// Quantity of the cargo.
    #[serde(default)]
    pub quantity: Decimal,
    /// Unit of the quantity.
    #[serde(default)]
    pub unit: String,
}

impl CargoRequest {
    fn into_domain(self, calculation_voyage: &str) -> Cargo {
        Cargo {
            id: self.id,
            voyage_id: self
                .voyage_id
                .unwrap_or_else(|| calculation_voyage.to_string()),
            quantity: self.quantity,
            unit: self.unit,
        }
    }
}

/// Port call information in a calculation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortCallRequest {
    /// Unique identifier for the port call.
    pub id: String,
    /// The voyage the call belongs to; defaults to the calculation's.
    #[serde(default)]
    pub voyage_id: Option<String>,
    /// Position in the voyage's port rotation.
    pub sequence: u32,
    /// The cargo operation performed at this call.
    pub activity: PortActivityKind,
    /// Estimated time of arrival, display context only.
    #[serde(default)]
    pub eta: Option<String>,
    /// Estimated time of departure, display context only.
    #[serde(default)]
    pub etd: Option<String>,
    /// The cargoes worked at this call.
    #[serde(default)]
    pub cargo_ids: Vec<String>,
}

impl PortCallRequest {
    fn into_domain(self, calculation_voyage: &str) -> PortCall {
        PortCall {
            id: self.id,
            voyage_id: self
                .voyage_id
                .unwrap_or_else(|| calculation_voyage.to_string()),
            sequence: self.sequence,
            activity: self.activity,
            eta: self.eta.as_deref().and_then(parse_event_time),
            etd: self.etd.as_deref().and_then(parse_event_time),
            cargo_ids: self.cargo_ids,
        }
    }
}

/// Port activity information in a calculation request.
///
/// Timestamps arrive as strings and are parsed leniently; unparseable
/// values degrade to missing endpoints (zero contribution) rather than
/// rejecting the request. The `start`/`end` spellings used by older
/// statement-of-facts exports are accepted as aliases.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortActivityRequest {
    /// Unique identifier for the activity; synthesized when absent.
    #[serde(default)]
    pub id: Option<String>,
    /// The port call the activity was recorded against.
    pub port_call_id: String,
    /// Free-form event type.
    #[serde(default)]
    pub event_type: String,
    /// Start of the event window.
    #[serde(default, alias = "start")]
    pub from_datetime: Option<String>,
    /// End of the event window.
    #[serde(default, alias = "end")]
    pub to_datetime: Option<String>,
    /// Precomputed duration in minutes.
    #[serde(default)]
    pub duration_minutes: Option<Decimal>,
    /// Free-form counting behavior label; unknown labels fall back to the
    /// event-type profile.
    #[serde(default)]
    pub count_behavior: Option<String>,
}

impl PortActivityRequest {
    fn into_domain(self, index: usize) -> PortActivity {
        PortActivity {
            id: self.id.unwrap_or_else(|| format!("activity_{index}")),
            port_call_id: self.port_call_id,
            event_type: self.event_type,
            from_datetime: self.from_datetime.as_deref().and_then(parse_event_time),
            to_datetime: self.to_datetime.as_deref().and_then(parse_event_time),
            duration_minutes: self.duration_minutes,
            count_behavior: self.count_behavior.as_deref().and_then(CountBehavior::from_label),
        }
    }
}

/// Deduction/addition information in a calculation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdjustmentRequest {
    /// Unique identifier for the adjustment; synthesized when absent.
    #[serde(default)]
    pub id: Option<String>,
    /// The port call the adjustment applies to.
    pub port_call_id: String,
    /// Narrows the adjustment to one cargo.
    #[serde(default)]
    pub cargo_id: Option<String>,
    /// Signed minutes: positive deducts, negative adds back.
    pub minutes: Decimal,
    /// Operator-facing reason.
    #[serde(default)]
    pub reason: Option<String>,
}

impl AdjustmentRequest {
    fn into_domain(self, index: usize) -> DeductionAddition {
        DeductionAddition {
            id: self.id.unwrap_or_else(|| format!("adjustment_{index}")),
            port_call_id: self.port_call_id,
            cargo_id: self.cargo_id,
            minutes: self.minutes,
            reason: self.reason,
        }
    }
}
