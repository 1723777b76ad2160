//! Monthly buckets and attendance trends.
//!
//! Records are grouped by the calendar month of their session date. The
//! trend of a metric compares the most recent months against everything
//! before them:
//!
//! ```text
//!  prior months                      recent months (up to 3)
//! ┌──────┬──────┬──────┬──────┐   ┌──────┬──────┬──────┐
//! │ Jan  │ Feb  │ Mar  │ Apr  │   │ May  │ Jun  │ Jul  │
//! └──────┴──────┴──────┴──────┘   └──────┴──────┴──────┘
//!        mean(prior.X)                 mean(recent.X)
//!
//!   trend_X = (mean(recent.X) / mean(prior.X) - 1) * 100
//! ```
//!
//! The recent window always leaves at least one prior month, so two months
//! of data are enough to produce a trend.

use std::collections::BTreeMap;

use serde::Serialize;

use super::distribution::{class_distribution, ClassDistribution};
use super::punctuality::punctuality_summary;
use super::stats::{average_attendees, mean, safe_ratio, total_attendees};
use crate::types::{AttendanceRecord, MonthKey};

/// Maximum number of months in the "recent" side of a trend.
pub const RECENT_MONTHS: usize = 3;

/// Aggregates for one calendar month.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthBucket {
    pub month: MonthKey,
    pub label: String,
    pub sessions: usize,
    pub total_attendees: u64,
    pub avg_attendees: f64,
    pub punctuality_rate: f64,
    pub by_class_type: ClassDistribution,
}

/// Month-by-month history with trend percentages.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendSummary {
    /// Buckets in ascending chronological order
    pub months: Vec<MonthBucket>,
    pub attendees_trend: f64,
    pub punctuality_trend: f64,
    pub sessions_trend: f64,
    /// Headline figure; mirrors `attendees_trend`
    pub global_trend: f64,
}

/// Group records by calendar month, keeping input order within each month.
pub fn group_by_month(records: &[AttendanceRecord]) -> BTreeMap<MonthKey, Vec<AttendanceRecord>> {
    let mut groups: BTreeMap<MonthKey, Vec<AttendanceRecord>> = BTreeMap::new();
    for record in records {
        groups.entry(record.month()).or_default().push(record.clone());
    }
    groups
}

/// Build the chronologically sorted month buckets.
pub fn monthly_buckets(records: &[AttendanceRecord]) -> Vec<MonthBucket> {
    group_by_month(records)
        .into_iter()
        .map(|(month, group)| MonthBucket {
            month,
            label: month.label(),
            sessions: group.len(),
            total_attendees: total_attendees(&group),
            avg_attendees: average_attendees(&group),
            punctuality_rate: punctuality_summary(&group).rate,
            by_class_type: class_distribution(&group),
        })
        .collect()
}

/// Compute monthly buckets and trends for `records`.
pub fn trend_summary(records: &[AttendanceRecord]) -> TrendSummary {
    let months = monthly_buckets(records);

    let (attendees_trend, punctuality_trend, sessions_trend) = if months.len() < 2 {
        (0.0, 0.0, 0.0)
    } else {
        let recent_len = RECENT_MONTHS.min(months.len() - 1);
        let (prior, recent) = months.split_at(months.len() - recent_len);
        (
            trend(prior, recent, |m| m.avg_attendees),
            trend(prior, recent, |m| m.punctuality_rate),
            trend(prior, recent, |m| m.sessions as f64),
        )
    };

    TrendSummary {
        months,
        attendees_trend,
        punctuality_trend,
        sessions_trend,
        global_trend: attendees_trend,
    }
}

fn trend(prior: &[MonthBucket], recent: &[MonthBucket], metric: impl Fn(&MonthBucket) -> f64) -> f64 {
    let prior_mean = mean(&prior.iter().map(&metric).collect::<Vec<_>>());
    let recent_mean = mean(&recent.iter().map(&metric).collect::<Vec<_>>());
    if prior_mean > 0.0 {
        (safe_ratio(recent_mean, prior_mean) - 1.0) * 100.0
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::test_support::{attended, record};

    #[test]
    fn test_buckets_sorted_and_unique() {
        let records = vec![
            attended(1, "2025-03-10", 4),
            attended(2, "2024-12-01", 6),
            attended(3, "2025-03-02", 8),
            attended(4, "2025-01-20", 10),
        ];
        let months = monthly_buckets(&records);

        let keys: Vec<_> = months.iter().map(|m| m.month.to_string()).collect();
        assert_eq!(keys, vec!["2024-12", "2025-01", "2025-03"]);
        assert_eq!(months[2].sessions, 2);
        assert_eq!(months[2].avg_attendees, 6.0);
        assert_eq!(months[2].label, "March 2025");
    }

    #[test]
    fn test_bucket_keeps_input_order() {
        let records = vec![attended(9, "2025-03-20", 4), attended(3, "2025-03-02", 8)];
        let groups = group_by_month(&records);
        let ids: Vec<_> = groups.values().next().unwrap().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![9, 3]);
    }

    #[test]
    fn test_single_month_has_no_trend() {
        let records = vec![attended(1, "2025-03-10", 4), attended(2, "2025-03-11", 8)];
        let summary = trend_summary(&records);
        assert_eq!(summary.months.len(), 1);
        assert_eq!(summary.attendees_trend, 0.0);
        assert_eq!(summary.punctuality_trend, 0.0);
        assert_eq!(summary.sessions_trend, 0.0);
        assert_eq!(summary.global_trend, 0.0);

        assert!(trend_summary(&[]).months.is_empty());
    }

    #[test]
    fn test_two_months_compare_last_against_first() {
        let records = vec![
            attended(1, "2025-01-10", 10),
            attended(2, "2025-02-10", 15),
            attended(3, "2025-02-11", 15),
        ];
        let summary = trend_summary(&records);
        assert!((summary.attendees_trend - 50.0).abs() < 1e-9);
        assert!((summary.sessions_trend - 100.0).abs() < 1e-9);
        assert_eq!(summary.punctuality_trend, 0.0);
        assert_eq!(summary.global_trend, summary.attendees_trend);
    }

    #[test]
    fn test_recent_window_is_last_three_months() {
        // Jan, Feb prior (avg 10); Mar, Apr, May recent (avg 20)
        let records = vec![
            attended(1, "2025-01-10", 10),
            attended(2, "2025-02-10", 10),
            attended(3, "2025-03-10", 20),
            attended(4, "2025-04-10", 20),
            attended(5, "2025-05-10", 20),
        ];
        let summary = trend_summary(&records);
        assert!((summary.attendees_trend - 100.0).abs() < 1e-9);
        assert_eq!(summary.sessions_trend, 0.0);
    }

    #[test]
    fn test_punctuality_trend() {
        let records = vec![
            record(1, "2025-01-10", "09:00", Some("09:00"), Some(5)),
            record(2, "2025-01-11", "09:00", Some("09:20"), Some(5)),
            record(3, "2025-02-10", "09:00", Some("08:50"), Some(5)),
        ];
        let summary = trend_summary(&records);
        // January 50%, February 100%
        assert!((summary.punctuality_trend - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_prior_mean_yields_zero() {
        let records = vec![attended(1, "2025-01-10", 0), attended(2, "2025-02-10", 12)];
        let summary = trend_summary(&records);
        assert_eq!(summary.attendees_trend, 0.0);
        assert_eq!(summary, trend_summary(&records));
    }
}
