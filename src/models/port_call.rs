//! Port call, port activity and adjustment models.
//!
//! A port call is one ordered stop of the voyage; port activities are the
//! recorded time-use events at that stop; deductions and additions are the
//! operator's manual adjustments to the laytime account.

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The kind of cargo operation a port call performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PortActivityKind {
    /// Loading cargo.
    Load,
    /// Discharging cargo.
    Discharge,
    /// Any other stop (bunkering, waiting, canal transit).
    Other,
}

/// How a recorded activity counts against laytime.
///
/// # Example
///
/// ```
/// use laytime_engine::models::CountBehavior;
/// use rust_decimal::Decimal;
///
/// assert_eq!(CountBehavior::Half.weight_percent(), Decimal::new(50, 0));
/// assert_eq!(CountBehavior::from_label("EXCLUDED"), Some(CountBehavior::Excluded));
/// assert_eq!(CountBehavior::from_label("whatever"), None);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CountBehavior {
    /// The full duration counts against laytime.
    Full,
    /// Half the duration counts (e.g. "time to count half" clauses).
    Half,
    /// The duration never counts (weather, Sunday-excepted time).
    Excluded,
}

impl CountBehavior {
    /// The counting weight as a percentage: Full 100, Half 50, Excluded 0.
    pub fn weight_percent(&self) -> Decimal {
        match self {
            CountBehavior::Full => Decimal::new(100, 0),
            CountBehavior::Half => Decimal::new(50, 0),
            CountBehavior::Excluded => Decimal::ZERO,
        }
    }

    /// Parses a free-form label as recorded by the surrounding platform.
    ///
    /// Returns `None` for unknown labels; the caller decides the fallback
    /// (profile lookup, then `Full`). An unknown behavior never drops the
    /// activity.
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "full" => Some(CountBehavior::Full),
            "half" => Some(CountBehavior::Half),
            "excluded" => Some(CountBehavior::Excluded),
            _ => None,
        }
    }
}

/// One ordered stop of a voyage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortCall {
    /// Unique identifier for the port call.
    pub id: String,
    /// The voyage this port call belongs to.
    pub voyage_id: String,
    /// Position of this call in the voyage's port rotation.
    pub sequence: u32,
    /// The cargo operation performed at this call.
    pub activity: PortActivityKind,
    /// Estimated time of arrival. Display context only, never a
    /// calculation input.
    #[serde(default)]
    pub eta: Option<NaiveDateTime>,
    /// Estimated time of departure. Display context only.
    #[serde(default)]
    pub etd: Option<NaiveDateTime>,
    /// The cargoes actually worked at this call; defines which
    /// (cargo, port call) pairs are in scope.
    #[serde(default)]
    pub cargo_ids: Vec<String>,
}

impl PortCall {
    /// Returns true if the given cargo is worked at this call.
    pub fn handles_cargo(&self, cargo_id: &str) -> bool {
        self.cargo_ids.iter().any(|id| id == cargo_id)
    }
}

/// A recorded time-use event bound to one port call.
///
/// Either a `from`/`to` window or a precomputed duration may be present;
/// a window takes precedence when both are usable. Records with neither
/// contribute zero minutes but are retained for audit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortActivity {
    /// Unique identifier for the activity.
    pub id: String,
    /// The port call this activity was recorded against.
    pub port_call_id: String,
    /// Free-form event type as recorded on the statement of facts
    /// (e.g. "loading", "rain_stoppage", "shifting").
    #[serde(default)]
    pub event_type: String,
    /// Start of the event window, if it parsed.
    #[serde(default)]
    pub from_datetime: Option<NaiveDateTime>,
    /// End of the event window, if it parsed.
    #[serde(default)]
    pub to_datetime: Option<NaiveDateTime>,
    /// Precomputed duration in minutes, used when no window is usable.
    #[serde(default)]
    pub duration_minutes: Option<Decimal>,
    /// Explicit counting behavior. `None` falls back to the event-type
    /// profile, then to `Full`.
    #[serde(default)]
    pub count_behavior: Option<CountBehavior>,
}

/// A signed manual adjustment to a laytime account, in minutes.
///
/// Positive minutes are a deduction (time excluded from counting against
/// the charterer); negative minutes are an addition (time granted back to
/// the account). An entry scoped to a cargo applies to that single
/// cargo/port-call row; without a cargo scope it applies to every cargo at
/// the port call, split by the same quantity proration as the allowance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeductionAddition {
    /// Unique identifier for the adjustment.
    pub id: String,
    /// The port call the adjustment applies to.
    pub port_call_id: String,
    /// Narrows the adjustment to one cargo at the port call.
    #[serde(default)]
    pub cargo_id: Option<String>,
    /// Signed minutes: positive reduces used time, negative increases it.
    pub minutes: Decimal,
    /// Operator-facing reason (weather, strike, shore breakdown).
    #[serde(default)]
    pub reason: Option<String>,
}

impl DeductionAddition {
    /// True when the entry reduces used time.
    pub fn is_deduction(&self) -> bool {
        self.minutes > Decimal::ZERO
    }

    /// True when the entry grants time back to the account.
    pub fn is_addition(&self) -> bool {
        self.minutes < Decimal::ZERO
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_count_behavior_weights() {
        assert_eq!(CountBehavior::Full.weight_percent(), dec("100"));
        assert_eq!(CountBehavior::Half.weight_percent(), dec("50"));
        assert_eq!(CountBehavior::Excluded.weight_percent(), dec("0"));
    }

    #[test]
    fn test_count_behavior_label_parsing() {
        assert_eq!(CountBehavior::from_label("full"), Some(CountBehavior::Full));
        assert_eq!(CountBehavior::from_label(" Half "), Some(CountBehavior::Half));
        assert_eq!(
            CountBehavior::from_label("EXCLUDED"),
            Some(CountBehavior::Excluded)
        );
        assert_eq!(CountBehavior::from_label("always"), None);
        assert_eq!(CountBehavior::from_label(""), None);
    }

    #[test]
    fn test_count_behavior_serialization() {
        let json = serde_json::to_string(&CountBehavior::Excluded).unwrap();
        assert_eq!(json, "\"excluded\"");

        let behavior: CountBehavior = serde_json::from_str("\"half\"").unwrap();
        assert_eq!(behavior, CountBehavior::Half);
    }

    #[test]
    fn test_port_call_handles_cargo() {
        let call = PortCall {
            id: "pc_001".to_string(),
            voyage_id: "voy_001".to_string(),
            sequence: 1,
            activity: PortActivityKind::Load,
            eta: None,
            etd: None,
            cargo_ids: vec!["cargo_001".to_string(), "cargo_002".to_string()],
        };

        assert!(call.handles_cargo("cargo_001"));
        assert!(call.handles_cargo("cargo_002"));
        assert!(!call.handles_cargo("cargo_003"));
    }

    #[test]
    fn test_port_call_deserialization_defaults() {
        let json = r#"{
            "id": "pc_001",
            "voyage_id": "voy_001",
            "sequence": 2,
            "activity": "discharge"
        }"#;

        let call: PortCall = serde_json::from_str(json).unwrap();
        assert_eq!(call.activity, PortActivityKind::Discharge);
        assert!(call.eta.is_none());
        assert!(call.cargo_ids.is_empty());
    }

    #[test]
    fn test_port_activity_deserialization_defaults() {
        let json = r#"{ "id": "act_001", "port_call_id": "pc_001" }"#;
        let activity: PortActivity = serde_json::from_str(json).unwrap();

        assert!(activity.from_datetime.is_none());
        assert!(activity.to_datetime.is_none());
        assert!(activity.duration_minutes.is_none());
        assert!(activity.count_behavior.is_none());
        assert_eq!(activity.event_type, "");
    }

    #[test]
    fn test_deduction_addition_sign_helpers() {
        let deduction = DeductionAddition {
            id: "adj_001".to_string(),
            port_call_id: "pc_001".to_string(),
            cargo_id: None,
            minutes: dec("120"),
            reason: Some("rain".to_string()),
        };
        assert!(deduction.is_deduction());
        assert!(!deduction.is_addition());

        let addition = DeductionAddition {
            minutes: dec("-60"),
            ..deduction.clone()
        };
        assert!(addition.is_addition());
        assert!(!addition.is_deduction());

        let zero = DeductionAddition {
            minutes: Decimal::ZERO,
            ..deduction
        };
        assert!(!zero.is_deduction());
        assert!(!zero.is_addition());
    }

    #[test]
    fn test_adjustment_serialization_round_trip() {
        let adjustment = DeductionAddition {
            id: "adj_001".to_string(),
            port_call_id: "pc_001".to_string(),
            cargo_id: Some("cargo_001".to_string()),
            minutes: dec("-45.5"),
            reason: None,
        };

        let json = serde_json::to_string(&adjustment).unwrap();
        let back: DeductionAddition = serde_json::from_str(&json).unwrap();
        assert_eq!(back, adjustment);
    }
}
