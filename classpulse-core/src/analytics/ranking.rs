//! Cross-instructor leaderboards.

use std::cmp::Ordering;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::cohort::PeerRecords;
use super::punctuality::punctuality_summary;
use super::stats::average_attendees;
use super::window::TrailingWindow;
use crate::types::InstructorRef;

/// Default number of leaderboard entries.
pub const DEFAULT_LIMIT: usize = 10;

/// Metric a leaderboard is sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RankingMetric {
    Punctuality,
    AvgAttendees,
    SessionsPerMonth,
}

impl RankingMetric {
    pub fn as_str(&self) -> &'static str {
        match self {
            RankingMetric::Punctuality => "punctuality",
            RankingMetric::AvgAttendees => "avg_attendees",
            RankingMetric::SessionsPerMonth => "sessions_per_month",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RankingMetric::Punctuality => "Punctuality",
            RankingMetric::AvgAttendees => "Average attendees",
            RankingMetric::SessionsPerMonth => "Sessions per month",
        }
    }

    fn value(&self, entry: &RankingEntry) -> f64 {
        match self {
            RankingMetric::Punctuality => entry.punctuality,
            RankingMetric::AvgAttendees => entry.avg_attendees,
            RankingMetric::SessionsPerMonth => entry.sessions_per_month,
        }
    }
}

impl std::fmt::Display for RankingMetric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for RankingMetric {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "punctuality" => Ok(RankingMetric::Punctuality),
            "avg_attendees" => Ok(RankingMetric::AvgAttendees),
            "sessions_per_month" => Ok(RankingMetric::SessionsPerMonth),
            other => Err(format!(
                "unknown ranking metric '{}': expected punctuality, avg_attendees or sessions_per_month",
                other
            )),
        }
    }
}

/// One leaderboard row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankingEntry {
    /// 1-based
    pub position: usize,
    pub instructor: InstructorRef,
    pub sessions: usize,
    pub avg_attendees: f64,
    pub punctuality: f64,
    pub sessions_per_month: f64,
}

/// Rank instructors by `metric` over `window`.
///
/// Ties fall back to more sessions first, then to the lower instructor id.
/// Instructors without sessions in the window are left out.
pub fn rank_instructors(
    cohort: &[PeerRecords],
    window: &TrailingWindow,
    metric: RankingMetric,
    limit: usize,
) -> Vec<RankingEntry> {
    let mut entries: Vec<RankingEntry> = cohort
        .iter()
        .filter_map(|peer| {
            let records = window.filter(&peer.records);
            if records.is_empty() {
                return None;
            }
            Some(RankingEntry {
                position: 0,
                instructor: peer.instructor.clone(),
                sessions: records.len(),
                avg_attendees: average_attendees(&records),
                punctuality: punctuality_summary(&records).rate,
                sessions_per_month: window.per_month(records.len()),
            })
        })
        .collect();

    entries.sort_by(|a, b| {
        metric
            .value(b)
            .partial_cmp(&metric.value(a))
            .unwrap_or(Ordering::Equal)
            .then_with(|| b.sessions.cmp(&a.sessions))
            .then_with(|| a.instructor.id.cmp(&b.instructor.id))
    });
    entries.truncate(limit);
    for (i, entry) in entries.iter_mut().enumerate() {
        entry.position = i + 1;
    }

    tracing::debug!(
        metric = %metric,
        entries = entries.len(),
        window_days = window.days,
        "Ranked instructors"
    );
    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::test_support::{for_instructor, record};
    use chrono::NaiveDate;

    fn window() -> TrailingWindow {
        TrailingWindow::new(NaiveDate::from_ymd_opt(2025, 3, 31).unwrap(), 90)
    }

    fn peer(id: i64, sessions: usize, attendees: u32) -> PeerRecords {
        PeerRecords {
            instructor: InstructorRef::new(id, format!("Instructor {}", id)),
            records: (0..sessions)
                .map(|i| {
                    let date = format!("2025-03-{:02}", i % 28 + 1);
                    for_instructor(id, id * 100 + i as i64, &date, attendees)
                })
                .collect(),
        }
    }

    #[test]
    fn test_metric_parse() {
        let parse = |raw: &str| raw.parse::<RankingMetric>();
        assert_eq!(parse("Punctuality"), Ok(RankingMetric::Punctuality));
        assert_eq!(parse("AVG_ATTENDEES"), Ok(RankingMetric::AvgAttendees));
        assert_eq!(
            parse(" sessions_per_month "),
            Ok(RankingMetric::SessionsPerMonth)
        );
        assert!("alumnos".parse::<RankingMetric>().is_err());
        assert!("clases".parse::<RankingMetric>().is_err());
    }

    #[test]
    fn test_ties_break_on_sessions_then_id() {
        let cohort = vec![peer(3, 9, 10), peer(7, 12, 10), peer(5, 12, 10)];
        let ranking = rank_instructors(&cohort, &window(), RankingMetric::AvgAttendees, 10);

        let ids: Vec<_> = ranking.iter().map(|e| e.instructor.id).collect();
        assert_eq!(ids, vec![5, 7, 3]);
        let positions: Vec<_> = ranking.iter().map(|e| e.position).collect();
        assert_eq!(positions, vec![1, 2, 3]);
    }

    #[test]
    fn test_idle_instructors_are_excluded() {
        let mut stale = peer(2, 5, 30);
        for record in &mut stale.records {
            record.session_date = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        }
        let cohort = vec![peer(1, 4, 10), stale, peer(3, 0, 0)];
        let ranking = rank_instructors(&cohort, &window(), RankingMetric::AvgAttendees, 10);

        assert_eq!(ranking.len(), 1);
        assert_eq!(ranking[0].instructor.id, 1);
    }

    #[test]
    fn test_sorts_descending_and_truncates() {
        let cohort = vec![peer(1, 3, 8), peer(2, 6, 12), peer(3, 9, 10)];

        let by_attendance = rank_instructors(&cohort, &window(), RankingMetric::AvgAttendees, 2);
        let ids: Vec<_> = by_attendance.iter().map(|e| e.instructor.id).collect();
        assert_eq!(ids, vec![2, 3]);

        let by_volume =
            rank_instructors(&cohort, &window(), RankingMetric::SessionsPerMonth, 10);
        assert_eq!(by_volume[0].instructor.id, 3);
        assert!((by_volume[0].sessions_per_month - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_rank_by_punctuality() {
        let mut late = peer(1, 2, 10);
        late.records.push({
            let mut r = record(150, "2025-03-20", "09:00", Some("09:20"), Some(10));
            r.instructor_id = 1;
            r
        });
        let cohort = vec![late, peer(2, 2, 10)];
        let ranking = rank_instructors(&cohort, &window(), RankingMetric::Punctuality, 10);
        assert_eq!(ranking[0].instructor.id, 2);
        assert_eq!(ranking[0].punctuality, 100.0);
        assert!((ranking[1].punctuality - 200.0 / 3.0).abs() < 1e-9);
    }
}
