//! Activity aggregation per port call.
//!
//! Sums recorded port-activity durations into a single weighted used-time
//! figure per port call, alongside the unweighted raw sum that statement
//! rendering needs.

use rust_decimal::Decimal;

use crate::config::EventProfile;
use crate::models::{ActivityContribution, PortActivity, PortCallUsage};

use super::interval::{duration_minutes, interval_minutes};

/// Aggregates the activities recorded against one port call.
///
/// Each activity's counting behavior resolves in order: the explicit
/// behavior on the record, the event-type profile default, `Full`. An
/// activity with both window endpoints is measured from the window (an
/// inverted window contributes zero); one with a missing endpoint falls
/// back to its precomputed duration. Every activity appears in the
/// returned contribution list, zero-contribution ones included, so the
/// record stays available for audit.
pub fn aggregate_port_activities(
    port_call_id: &str,
    activities: &[&PortActivity],
    profile: &EventProfile,
) -> PortCallUsage {
    let full_rate = Decimal::new(100, 0);
    let mut contributions = Vec::with_capacity(activities.len());

    for activity in activities {
        let behavior = activity
            .count_behavior
            .unwrap_or_else(|| profile.default_behavior(&activity.event_type));
        let weight_percent = behavior.weight_percent();

        let (raw, weighted) =
            if activity.from_datetime.is_some() && activity.to_datetime.is_some() {
                (
                    interval_minutes(activity.from_datetime, activity.to_datetime, full_rate),
                    interval_minutes(activity.from_datetime, activity.to_datetime, weight_percent),
                )
            } else if let Some(duration) = activity.duration_minutes {
                (
                    duration_minutes(duration, full_rate),
                    duration_minutes(duration, weight_percent),
                )
            } else {
                (Decimal::ZERO, Decimal::ZERO)
            };

        contributions.push(ActivityContribution {
            activity_id: activity.id.clone(),
            event_type: activity.event_type.clone(),
            raw_minutes: raw,
            weight_percent,
            weighted_minutes: weighted,
        });
    }

    let raw_minutes = contributions.iter().map(|c| c.raw_minutes).sum();
    let weighted_minutes = contributions.iter().map(|c| c.weighted_minutes).sum();

    PortCallUsage {
        port_call_id: port_call_id.to_string(),
        raw_minutes,
        weighted_minutes,
        contributions,
    }
}
