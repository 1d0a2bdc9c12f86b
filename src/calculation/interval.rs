//! Interval arithmetic primitive.
//!
//! Converts a time window plus a rate multiplier into a time contribution
//! in the engine's canonical unit (minutes). This is the atomic unit every
//! higher computation builds on.

use chrono::NaiveDateTime;
use rust_decimal::{Decimal, RoundingStrategy};

/// Timestamp spellings accepted from the surrounding platform.
const EVENT_TIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Parses a recorded event timestamp.
///
/// Returns `None` for anything unparseable; the caller treats a missing
/// endpoint as a zero-contribution window rather than an error.
///
/// # Example
///
/// ```
/// use laytime_engine::calculation::parse_event_time;
///
/// assert!(parse_event_time("2026-03-01T08:00:00").is_some());
/// assert!(parse_event_time("2026-03-01 08:00").is_some());
/// assert!(parse_event_time("yesterday-ish").is_none());
/// ```
pub fn parse_event_time(raw: &str) -> Option<NaiveDateTime> {
    let trimmed = raw.trim();
    EVENT_TIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(trimmed, format).ok())
}

/// Rounds a minute figure to the engine's canonical precision.
///
/// Two decimal places, half away from zero. Applied once at each
/// component boundary, never accumulated across intermediate sums.
pub fn round_minutes(minutes: Decimal) -> Decimal {
    minutes.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Computes the minute contribution of a time window at a rate multiplier.
///
/// The rate is a percentage (100 = full). It is divided by 100 before
/// being applied and is deliberately not range-validated: callers may pass
/// values above 100 to model events charged above rate.
///
/// Fails softly to zero when either endpoint is missing or when
/// `end <= start`.
///
/// # Example
///
/// ```
/// use laytime_engine::calculation::{interval_minutes, parse_event_time};
/// use rust_decimal::Decimal;
///
/// let start = parse_event_time("2026-03-01T08:00:00");
/// let end = parse_event_time("2026-03-01T10:00:00");
///
/// assert_eq!(interval_minutes(start, end, Decimal::new(100, 0)), Decimal::new(120, 0));
/// assert_eq!(interval_minutes(start, end, Decimal::new(50, 0)), Decimal::new(60, 0));
/// assert_eq!(interval_minutes(end, start, Decimal::new(100, 0)), Decimal::ZERO);
/// ```
pub fn interval_minutes(
    start: Option<NaiveDateTime>,
    end: Option<NaiveDateTime>,
    rate_percent: Decimal,
) -> Decimal {
    let (Some(start), Some(end)) = (start, end) else {
        return Decimal::ZERO;
    };
    if end <= start {
        return Decimal::ZERO;
    }

    let seconds = Decimal::from((end - start).num_seconds());
    let raw = seconds / Decimal::new(60, 0) * (rate_percent / Decimal::ONE_HUNDRED);
    round_minutes(raw)
}

/// Computes the contribution of a precomputed duration at a rate
/// multiplier.
///
/// Used when an activity carries `duration_minutes` instead of a usable
/// window. Negative durations degrade to zero.
pub fn duration_minutes(duration: Decimal, rate_percent: Decimal) -> Decimal {
    if duration <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    round_minutes(duration * (rate_percent / Decimal::ONE_HUNDRED))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use proptest::prelude::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn ts(raw: &str) -> Option<NaiveDateTime> {
        parse_event_time(raw)
    }

    fn base_time() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 3, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_two_hour_window_at_full_rate() {
        let minutes = interval_minutes(
            ts("2026-03-01T08:00:00"),
            ts("2026-03-01T10:00:00"),
            dec("100"),
        );
        assert_eq!(minutes, dec("120"));
    }

    #[test]
    fn test_half_rate_halves_the_contribution() {
        let minutes = interval_minutes(
            ts("2026-03-01T08:00:00"),
            ts("2026-03-01T10:00:00"),
            dec("50"),
        );
        assert_eq!(minutes, dec("60"));
    }

    #[test]
    fn test_rate_above_hundred_is_not_clamped() {
        let minutes = interval_minutes(
            ts("2026-03-01T08:00:00"),
            ts("2026-03-01T10:00:00"),
            dec("150"),
        );
        assert_eq!(minutes, dec("180"));
    }

    #[test]
    fn test_zero_rate_yields_zero_regardless_of_duration() {
        let minutes = interval_minutes(
            ts("2026-03-01T00:00:00"),
            ts("2026-03-08T00:00:00"),
            dec("0"),
        );
        assert_eq!(minutes, Decimal::ZERO);
    }

    #[test]
    fn test_end_before_start_yields_zero() {
        let minutes = interval_minutes(
            ts("2026-03-01T10:00:00"),
            ts("2026-03-01T08:00:00"),
            dec("100"),
        );
        assert_eq!(minutes, Decimal::ZERO);
    }

    #[test]
    fn test_end_equal_to_start_yields_zero() {
        let at = ts("2026-03-01T08:00:00");
        assert_eq!(interval_minutes(at, at, dec("100")), Decimal::ZERO);
    }

    #[test]
    fn test_missing_endpoint_yields_zero() {
        let at = ts("2026-03-01T08:00:00");
        assert_eq!(interval_minutes(None, at, dec("100")), Decimal::ZERO);
        assert_eq!(interval_minutes(at, None, dec("100")), Decimal::ZERO);
        assert_eq!(interval_minutes(None, None, dec("100")), Decimal::ZERO);
    }

    #[test]
    fn test_sub_minute_window_rounds_to_two_decimals() {
        // 90 seconds at full rate = 1.5 minutes
        let minutes = interval_minutes(
            ts("2026-03-01T08:00:00"),
            ts("2026-03-01T08:01:30"),
            dec("100"),
        );
        assert_eq!(minutes, dec("1.5"));

        // 100 seconds = 1.666... minutes, rounded half-up to 1.67
        let minutes = interval_minutes(
            ts("2026-03-01T08:00:00"),
            ts("2026-03-01T08:01:40"),
            dec("100"),
        );
        assert_eq!(minutes, dec("1.67"));
    }

    #[test]
    fn test_parse_accepts_space_and_t_separators() {
        assert_eq!(ts("2026-03-01T08:00:00"), ts("2026-03-01 08:00:00"));
        assert_eq!(ts("2026-03-01T08:00"), ts("2026-03-01 08:00:00"));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_event_time("").is_none());
        assert!(parse_event_time("01/03/2026 08:00").is_none());
        assert!(parse_event_time("2026-13-40T99:00:00").is_none());
    }

    #[test]
    fn test_duration_fallback_applies_rate_and_clamps_negative() {
        assert_eq!(duration_minutes(dec("200"), dec("100")), dec("200"));
        assert_eq!(duration_minutes(dec("200"), dec("50")), dec("100"));
        assert_eq!(duration_minutes(dec("-200"), dec("100")), Decimal::ZERO);
        assert_eq!(duration_minutes(Decimal::ZERO, dec("100")), Decimal::ZERO);
    }

    proptest! {
        /// A valid window at a positive rate always contributes strictly
        /// positive minutes.
        #[test]
        fn prop_valid_window_is_strictly_positive(
            start_min in 0i64..100_000,
            len_min in 1i64..50_000,
            rate in 1i64..300,
        ) {
            let start = base_time() + chrono::Duration::minutes(start_min);
            let end = start + chrono::Duration::minutes(len_min);
            let minutes = interval_minutes(Some(start), Some(end), Decimal::from(rate));
            prop_assert!(minutes > Decimal::ZERO);
        }

        /// Contribution grows monotonically with the window length.
        #[test]
        fn prop_contribution_monotonic_in_duration(
            len_min in 1i64..50_000,
            extra_min in 1i64..50_000,
            rate in 1i64..300,
        ) {
            let start = base_time();
            let shorter = interval_minutes(
                Some(start),
                Some(start + chrono::Duration::minutes(len_min)),
                Decimal::from(rate),
            );
            let longer = interval_minutes(
                Some(start),
                Some(start + chrono::Duration::minutes(len_min + extra_min)),
                Decimal::from(rate),
            );
            prop_assert!(longer > shorter);
        }

        /// Doubling the rate doubles the contribution, within rounding
        /// tolerance.
        #[test]
        fn prop_contribution_linear_in_rate(
            len_min in 1i64..50_000,
            rate in 1i64..150,
        ) {
            let start = base_time();
            let end = start + chrono::Duration::minutes(len_min);
            let single = interval_minutes(Some(start), Some(end), Decimal::from(rate));
            let double = interval_minutes(Some(start), Some(end), Decimal::from(rate * 2));
            let difference = (double - single - single).abs();
            prop_assert!(difference <= Decimal::new(2, 2));
        }

        /// A reversed or empty window never contributes, never errors.
        #[test]
        fn prop_degenerate_window_is_exactly_zero(
            start_min in 0i64..50_000,
            backwards in 0i64..50_000,
            rate in 0i64..300,
        ) {
            let start = base_time() + chrono::Duration::minutes(start_min);
            let end = start - chrono::Duration::minutes(backwards);
            let minutes = interval_minutes(Some(start), Some(end), Decimal::from(rate));
            prop_assert_eq!(minutes, Decimal::ZERO);
        }
    }
}
