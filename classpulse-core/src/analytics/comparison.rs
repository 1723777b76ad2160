//! Month-over-month comparison.
//!
//! Comparing two months is a two-step flow:
//!
//! ```text
//! ComparisonRequest --validate--> Validation::Valid(ValidatedComparison) --compute--> MonthComparison
//!                             \-> Validation::Invalid(InsufficientData)
//! ```
//!
//! A [`ValidatedComparison`] can only be obtained from
//! [`ComparisonRequest::validate`], so `compute` never runs on a pair of
//! months that lacks data. Rejection is an ordinary value carrying a
//! human-readable reason, never an `Err`.

use serde::Serialize;

use super::cohort::CohortSnapshot;
use super::distribution::{class_distribution, ClassDistribution};
use super::punctuality::{punctuality_summary, PunctualitySummary};
use super::scoring::{composite_score, CompositeScore};
use super::stats::{average_attendees, percent_change};
use crate::types::{AttendanceRecord, ClassType, MonthKey};

/// Minimum sessions each month needs unless configured otherwise.
pub const DEFAULT_MIN_SESSIONS: usize = 3;

const HEADLINE_ATTENDANCE_WEIGHT: f64 = 0.45;
const HEADLINE_PUNCTUALITY_WEIGHT: f64 = 0.30;
const HEADLINE_SESSIONS_WEIGHT: f64 = 0.25;

// ============================================
// Validation
// ============================================

/// A request to compare `current` against `baseline`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ComparisonRequest {
    pub current: MonthKey,
    pub baseline: MonthKey,
    pub min_sessions: usize,
}

/// Why a comparison could not be made.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InsufficientData {
    pub current: MonthKey,
    pub baseline: MonthKey,
    pub reason: String,
}

/// Result of validating a [`ComparisonRequest`].
#[derive(Debug, Clone, PartialEq)]
pub enum Validation {
    Valid(ValidatedComparison),
    Invalid(InsufficientData),
}

/// Two months that both have enough sessions to compare.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedComparison {
    current: MonthKey,
    baseline: MonthKey,
    current_records: Vec<AttendanceRecord>,
    baseline_records: Vec<AttendanceRecord>,
}

impl ComparisonRequest {
    pub fn new(current: MonthKey, baseline: MonthKey) -> Self {
        Self {
            current,
            baseline,
            min_sessions: DEFAULT_MIN_SESSIONS,
        }
    }

    pub fn with_min_sessions(mut self, min_sessions: usize) -> Self {
        self.min_sessions = min_sessions;
        self
    }

    /// Check that both months have at least `min_sessions` records.
    pub fn validate(self, records: &[AttendanceRecord]) -> Validation {
        let current_records = records_in(records, self.current);
        let baseline_records = records_in(records, self.baseline);

        let problems: Vec<String> = [
            ("current", self.current, current_records.len()),
            ("comparison", self.baseline, baseline_records.len()),
        ]
        .into_iter()
        .filter_map(|(role, month, count)| self.problem(role, month, count))
        .collect();

        if problems.is_empty() {
            return Validation::Valid(ValidatedComparison {
                current: self.current,
                baseline: self.baseline,
                current_records,
                baseline_records,
            });
        }

        let reason = problems.join(" ");
        tracing::warn!(
            current = %self.current,
            baseline = %self.baseline,
            reason = %reason,
            "Month comparison rejected"
        );
        Validation::Invalid(InsufficientData {
            current: self.current,
            baseline: self.baseline,
            reason,
        })
    }

    fn problem(&self, role: &str, month: MonthKey, count: usize) -> Option<String> {
        if count == 0 {
            Some(format!(
                "No data available for the {} month ({}).",
                role,
                month.label()
            ))
        } else if count < self.min_sessions {
            Some(format!(
                "Insufficient data for the {} month ({}): {} sessions, at least {} required for a meaningful comparison.",
                role,
                month.label(),
                count,
                self.min_sessions
            ))
        } else {
            None
        }
    }
}

fn records_in(records: &[AttendanceRecord], month: MonthKey) -> Vec<AttendanceRecord> {
    records
        .iter()
        .filter(|r| month.contains(r.session_date))
        .cloned()
        .collect()
}

// ============================================
// Computation
// ============================================

/// Full metric summary for one month.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodSummary {
    pub month: MonthKey,
    pub label: String,
    pub sessions: usize,
    pub avg_attendees: f64,
    pub punctuality: PunctualitySummary,
    pub distribution: ClassDistribution,
    pub variety: f64,
    pub score: CompositeScore,
}

impl PeriodSummary {
    pub fn build(month: MonthKey, records: &[AttendanceRecord], cohort: &CohortSnapshot) -> Self {
        let distribution = class_distribution(records);
        Self {
            month,
            label: month.label(),
            sessions: records.len(),
            avg_attendees: average_attendees(records),
            punctuality: punctuality_summary(records),
            variety: distribution.variety(),
            distribution,
            score: composite_score(records, cohort),
        }
    }
}

/// Change in one class type's session count.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ClassTypeChange {
    pub class_type: ClassType,
    pub current: usize,
    pub baseline: usize,
    pub change: f64,
}

/// Signed percentage differences, current relative to baseline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricChanges {
    pub avg_attendees: f64,
    pub punctuality: f64,
    pub sessions: f64,
    pub variety: f64,
    pub score: f64,
    pub cost_per_attendee: f64,
    /// One entry per canonical class type
    pub by_class_type: Vec<ClassTypeChange>,
    /// Weighted blend of the attendance, punctuality and session changes
    pub headline: f64,
}

/// A computed comparison of two months.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthComparison {
    pub current: PeriodSummary,
    pub baseline: PeriodSummary,
    pub changes: MetricChanges,
}

/// Outcome of a comparison request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ComparisonOutcome {
    Computed(MonthComparison),
    Insufficient(InsufficientData),
}

impl ValidatedComparison {
    /// Summarize both months and difference them.
    pub fn compute(&self, cohort: &CohortSnapshot) -> MonthComparison {
        let current = PeriodSummary::build(self.current, &self.current_records, cohort);
        let baseline = PeriodSummary::build(self.baseline, &self.baseline_records, cohort);

        let avg_attendees = percent_change(current.avg_attendees, baseline.avg_attendees);
        let punctuality = percent_change(current.punctuality.rate, baseline.punctuality.rate);
        let sessions = percent_change(current.sessions as f64, baseline.sessions as f64);

        let by_class_type = ClassType::ALL
            .iter()
            .map(|&class_type| {
                let now = current.distribution.count(class_type);
                let before = baseline.distribution.count(class_type);
                ClassTypeChange {
                    class_type,
                    current: now,
                    baseline: before,
                    change: percent_change(now as f64, before as f64),
                }
            })
            .collect();

        let changes = MetricChanges {
            avg_attendees,
            punctuality,
            sessions,
            variety: percent_change(current.variety, baseline.variety),
            score: percent_change(current.score.score, baseline.score.score),
            cost_per_attendee: percent_change(
                current.score.cost_per_attendee,
                baseline.score.cost_per_attendee,
            ),
            by_class_type,
            headline: HEADLINE_ATTENDANCE_WEIGHT * avg_attendees
                + HEADLINE_PUNCTUALITY_WEIGHT * punctuality
                + HEADLINE_SESSIONS_WEIGHT * sessions,
        };

        MonthComparison {
            current,
            baseline,
            changes,
        }
    }
}

/// Validate and, when possible, compute a comparison.
pub fn compare_months(
    records: &[AttendanceRecord],
    request: ComparisonRequest,
    cohort: &CohortSnapshot,
) -> ComparisonOutcome {
    match request.validate(records) {
        Validation::Valid(valid) => ComparisonOutcome::Computed(valid.compute(cohort)),
        Validation::Invalid(insufficient) => ComparisonOutcome::Insufficient(insufficient),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::test_support::{attended, record, typed};

    fn month(raw: &str) -> MonthKey {
        raw.parse().unwrap()
    }

    fn request() -> ComparisonRequest {
        ComparisonRequest::new(month("2025-03"), month("2025-02"))
    }

    #[test]
    fn test_rejects_both_thin_months_current_first() {
        let records = vec![
            attended(1, "2025-03-03", 10),
            attended(2, "2025-03-04", 10),
            attended(3, "2025-02-03", 10),
        ];
        let Validation::Invalid(insufficient) = request().validate(&records) else {
            panic!("expected rejection");
        };
        let reason = &insufficient.reason;
        let march = reason.find("March 2025").unwrap();
        let february = reason.find("February 2025").unwrap();
        assert!(march < february);
        assert!(reason.contains("2 sessions"));
        assert!(reason.contains("1 sessions"));
    }

    #[test]
    fn test_rejects_empty_month() {
        let records: Vec<_> = (0..3)
            .map(|i| attended(i, &format!("2025-03-0{}", i + 1), 10))
            .collect();
        let Validation::Invalid(insufficient) = request().validate(&records) else {
            panic!("expected rejection");
        };
        assert_eq!(
            insufficient.reason,
            "No data available for the comparison month (February 2025)."
        );
    }

    #[test]
    fn test_min_sessions_is_configurable() {
        let records = vec![attended(1, "2025-03-03", 10), attended(2, "2025-02-03", 10)];
        let validation = request().with_min_sessions(1).validate(&records);
        assert!(matches!(validation, Validation::Valid(_)));
    }

    #[test]
    fn test_compute_differences() {
        let mut records = vec![
            // February: 4 sessions, avg 10, 3 of 4 on time
            attended(1, "2025-02-03", 10),
            attended(2, "2025-02-04", 10),
            attended(3, "2025-02-05", 10),
            record(4, "2025-02-06", "09:00", Some("09:15"), Some(10)),
            // March: 6 sessions, avg 15, all on time
        ];
        records.extend((0..6).map(|i| attended(10 + i, &format!("2025-03-1{}", i), 15)));

        let outcome = compare_months(&records, request(), &CohortSnapshot::empty());
        let ComparisonOutcome::Computed(comparison) = outcome else {
            panic!("expected a computed comparison");
        };

        assert_eq!(comparison.current.label, "March 2025");
        assert_eq!(comparison.baseline.label, "February 2025");
        assert_eq!(comparison.current.sessions, 6);
        assert_eq!(comparison.baseline.sessions, 4);

        let changes = &comparison.changes;
        assert!((changes.avg_attendees - 50.0).abs() < 1e-9);
        assert!((changes.sessions - 50.0).abs() < 1e-9);
        assert!((changes.punctuality - 100.0 / 3.0).abs() < 1e-9);
        assert_eq!(changes.variety, 0.0);
        let expected = 0.45 * 50.0 + 0.30 * (100.0 / 3.0) + 0.25 * 50.0;
        assert!((changes.headline - expected).abs() < 1e-9);

        let ride = changes.by_class_type[ClassType::Ride.index()];
        assert_eq!((ride.current, ride.baseline), (6, 4));
        assert_eq!(changes.by_class_type.len(), ClassType::ALL.len());
    }

    #[test]
    fn test_new_class_type_counts_as_full_increase() {
        let mut records: Vec<_> = (0..3)
            .map(|i| typed(i, &format!("2025-02-0{}", i + 1), ClassType::Ride))
            .collect();
        records.extend((0..3).map(|i| typed(10 + i, &format!("2025-03-0{}", i + 1), ClassType::Box)));

        let ComparisonOutcome::Computed(comparison) =
            compare_months(&records, request(), &CohortSnapshot::empty())
        else {
            panic!("expected a computed comparison");
        };
        let changes = &comparison.changes;
        assert_eq!(changes.by_class_type[ClassType::Box.index()].change, 100.0);
        assert_eq!(changes.by_class_type[ClassType::Ride.index()].change, -100.0);
        assert_eq!(changes.by_class_type[ClassType::Move.index()].change, 0.0);
    }
}
