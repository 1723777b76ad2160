//! The full metrics bundle for one instructor.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::cohort::CohortSnapshot;
use super::comparison::{compare_months, ComparisonOutcome, ComparisonRequest, DEFAULT_MIN_SESSIONS};
use super::distribution::{class_distribution, ClassDistribution};
use super::payout::{payout_summary, PayoutSummary};
use super::punctuality::{punctuality_summary, PunctualitySummary};
use super::scoring::{composite_score, CompositeScore};
use super::stats::{average_attendees, percent_change, sessions_per_month, total_attendees};
use super::trends::{trend_summary, TrendSummary};
use crate::error::{Error, Result};
use crate::types::{AttendanceRecord, InstructorId, MonthKey};

/// Parameters that shape a bundle. They form part of the cache key.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BundleParams {
    /// Restrict headline figures to this month
    pub focus_month: Option<MonthKey>,
    /// Compare `focus_month` against this month
    pub compare_month: Option<MonthKey>,
    pub cohort: CohortSnapshot,
    pub min_sessions: usize,
}

impl BundleParams {
    pub fn new() -> Self {
        Self {
            min_sessions: DEFAULT_MIN_SESSIONS,
            ..Self::default()
        }
    }

    pub fn focus(mut self, month: MonthKey) -> Self {
        self.focus_month = Some(month);
        self
    }

    pub fn compare_to(mut self, month: MonthKey) -> Self {
        self.compare_month = Some(month);
        self
    }

    pub fn with_cohort(mut self, cohort: CohortSnapshot) -> Self {
        self.cohort = cohort;
        self
    }

    pub fn with_min_sessions(mut self, min_sessions: usize) -> Self {
        self.min_sessions = min_sessions;
        self
    }
}

/// How the instructor stands against the cohort averages, as signed
/// percentage differences.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CohortComparison {
    pub cohort: CohortSnapshot,
    pub avg_attendees: f64,
    pub punctuality: f64,
    pub sessions_per_month: f64,
    pub variety: f64,
}

/// Everything computed for one instructor.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsBundle {
    pub instructor_id: InstructorId,
    /// "All time" or the focus month label
    pub period_label: String,
    pub sessions: usize,
    pub total_attendees: u64,
    pub avg_attendees: f64,
    pub sessions_per_month: f64,
    pub variety: f64,
    pub punctuality: PunctualitySummary,
    pub distribution: ClassDistribution,
    /// Always covers every supplied record
    pub trends: TrendSummary,
    pub score: CompositeScore,
    pub payout: PayoutSummary,
    pub cohort: Option<CohortComparison>,
    pub comparison: Option<ComparisonOutcome>,
    pub computed_at: DateTime<Utc>,
}

/// Compute the bundle for `instructor_id`.
///
/// Every record must belong to `instructor_id`.
pub fn build_bundle(
    instructor_id: InstructorId,
    records: &[AttendanceRecord],
    params: &BundleParams,
    computed_at: DateTime<Utc>,
) -> Result<MetricsBundle> {
    if let Some(stray) = records.iter().find(|r| r.instructor_id != instructor_id) {
        return Err(Error::Computation(format!(
            "record {} belongs to instructor {}, not {}",
            stray.id, stray.instructor_id, instructor_id
        )));
    }

    let (period_label, period): (String, Vec<AttendanceRecord>) = match params.focus_month {
        Some(month) => (
            month.label(),
            records
                .iter()
                .filter(|r| month.contains(r.session_date))
                .cloned()
                .collect(),
        ),
        None => ("All time".to_string(), records.to_vec()),
    };

    let distribution = class_distribution(&period);
    let punctuality = punctuality_summary(&period);
    let avg_attendees = average_attendees(&period);
    let per_month = sessions_per_month(&period);
    let variety = distribution.variety();

    let cohort = (!params.cohort.is_empty()).then(|| CohortComparison {
        cohort: params.cohort.clone(),
        avg_attendees: percent_change(avg_attendees, params.cohort.mean_attendees),
        punctuality: percent_change(punctuality.rate, params.cohort.mean_punctuality),
        sessions_per_month: percent_change(per_month, params.cohort.mean_sessions_per_month),
        variety: percent_change(variety, params.cohort.mean_variety),
    });

    let comparison = match (params.focus_month, params.compare_month) {
        (Some(current), Some(baseline)) => Some(compare_months(
            records,
            ComparisonRequest::new(current, baseline).with_min_sessions(params.min_sessions),
            &params.cohort,
        )),
        _ => None,
    };

    Ok(MetricsBundle {
        instructor_id,
        period_label,
        sessions: period.len(),
        total_attendees: total_attendees(&period),
        avg_attendees,
        sessions_per_month: per_month,
        variety,
        score: composite_score(&period, &params.cohort),
        payout: payout_summary(&period),
        punctuality,
        distribution,
        trends: trend_summary(records),
        cohort,
        comparison,
        computed_at,
    })
}
