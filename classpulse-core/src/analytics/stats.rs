//! Small aggregate helpers shared by the analyzers.
//!
//! Every ratio here treats a zero denominator as a zero result.

use crate::types::{AttendanceRecord, MonthKey};

/// `numerator / denominator`, or 0 when the denominator is not positive.
pub fn safe_ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator > 0.0 {
        numerator / denominator
    } else {
        0.0
    }
}

/// Arithmetic mean, 0 for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    safe_ratio(values.iter().sum(), values.len() as f64)
}

/// Signed percentage change from `baseline` to `current`.
///
/// A positive value against a zero baseline counts as +100%.
pub fn percent_change(current: f64, baseline: f64) -> f64 {
    if baseline > 0.0 {
        (current / baseline - 1.0) * 100.0
    } else if current > 0.0 {
        100.0
    } else {
        0.0
    }
}

/// Sum of recorded head counts.
pub fn total_attendees(records: &[AttendanceRecord]) -> u64 {
    records
        .iter()
        .filter_map(|r| r.attendee_count)
        .map(u64::from)
        .sum()
}

/// Mean head count over records that have one.
pub fn average_attendees(records: &[AttendanceRecord]) -> f64 {
    let counted = records.iter().filter(|r| r.attendee_count.is_some()).count();
    safe_ratio(total_attendees(records) as f64, counted as f64)
}

/// Sessions per calendar month, spanning the earliest to the latest session
/// month inclusively.
pub fn sessions_per_month(records: &[AttendanceRecord]) -> f64 {
    let first = records.iter().map(|r| r.session_date).min();
    let last = records.iter().map(|r| r.session_date).max();
    match (first, last) {
        (Some(first), Some(last)) => {
            let months =
                MonthKey::span_inclusive(MonthKey::from_date(first), MonthKey::from_date(last));
            safe_ratio(records.len() as f64, f64::from(months))
        }
        _ => 0.0,
    }
}

/// Rate charged per attendee, over sessions that had at least one attendee.
pub fn cost_per_attendee(records: &[AttendanceRecord]) -> f64 {
    let (cost, attendees) = records
        .iter()
        .filter_map(|r| match r.attendee_count {
            Some(n) if n > 0 => Some((r.rate, u64::from(n))),
            _ => None,
        })
        .fold((0.0, 0u64), |(cost, people), (rate, n)| {
            (cost + rate, people + n)
        });
    safe_ratio(cost, attendees as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::test_support::{attended, record};

    #[test]
    fn test_percent_change() {
        assert!((percent_change(12.0, 10.0) - 20.0).abs() < 1e-9);
        assert!((percent_change(8.0, 10.0) + 20.0).abs() < 1e-9);
        assert_eq!(percent_change(5.0, 0.0), 100.0);
        assert_eq!(percent_change(0.0, 0.0), 0.0);
    }

    #[test]
    fn test_average_ignores_unrecorded() {
        let records = vec![
            record(1, "2025-03-04", "09:00", Some("09:00"), Some(10)),
            record(2, "2025-03-05", "09:00", Some("09:00"), None),
            record(3, "2025-03-06", "09:00", Some("09:00"), Some(0)),
        ];
        assert_eq!(total_attendees(&records), 10);
        assert_eq!(average_attendees(&records), 5.0);
        assert_eq!(average_attendees(&[]), 0.0);
    }

    #[test]
    fn test_sessions_per_month_spans_inclusively() {
        let records = vec![
            attended(1, "2025-01-31", 5),
            attended(2, "2025-02-01", 5),
            attended(3, "2025-03-15", 5),
        ];
        assert_eq!(sessions_per_month(&records), 1.0);
        assert_eq!(sessions_per_month(&records[..1]), 1.0);
        assert_eq!(sessions_per_month(&[]), 0.0);
    }

    #[test]
    fn test_cost_per_attendee_skips_empty_sessions() {
        let records = vec![
            attended(1, "2025-03-04", 10).with_rate(30.0),
            attended(2, "2025-03-05", 0).with_rate(30.0),
            attended(3, "2025-03-06", 5).with_rate(15.0),
        ];
        assert_eq!(cost_per_attendee(&records), 3.0);
        assert_eq!(cost_per_attendee(&records[1..2]), 0.0);
    }
}
