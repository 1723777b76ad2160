//! Composite instructor score.
//!
//! Four components, each normalized to 0-100, are blended into one score:
//!
//! | Component | Weight | Normalization |
//! |-----------|--------|---------------|
//! | Punctuality | 0.30 | the punctuality rate |
//! | Attendance | 0.40 | `avg / cohort_mean * 50`, or `avg / 20 * 100` without a cohort |
//! | Frequency | 0.15 | `sessions_per_month / 20 * 100` |
//! | Cost | 0.15 | linear between the cohort's min and max cost per attendee |
//!
//! Attendance at the cohort mean scores 50, so beating peers is what moves an
//! instructor into the upper tiers.

use serde::{Deserialize, Serialize};

use super::cohort::{CohortSnapshot, CostRange};
use super::punctuality::punctuality_summary;
use super::stats::{average_attendees, cost_per_attendee, safe_ratio, sessions_per_month};
use crate::format::round1;
use crate::types::AttendanceRecord;

pub const PUNCTUALITY_WEIGHT: f64 = 0.30;
pub const ATTENDANCE_WEIGHT: f64 = 0.40;
pub const FREQUENCY_WEIGHT: f64 = 0.15;
pub const COST_WEIGHT: f64 = 0.15;

/// Average attendance that scores 100 when there is no cohort mean.
pub const ATTENDANCE_REFERENCE: f64 = 20.0;
/// Sessions per month that score 100.
pub const FREQUENCY_REFERENCE: f64 = 20.0;
/// Cost per attendee that scores 0 when there is no cohort cost data.
pub const COST_CEILING: f64 = 50.0;

/// Reporting tier for a score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreTier {
    Excellent,
    VeryGood,
    Good,
    Fair,
    NeedsImprovement,
}

impl ScoreTier {
    pub fn from_score(score: f64) -> Self {
        if score >= 85.0 {
            ScoreTier::Excellent
        } else if score >= 70.0 {
            ScoreTier::VeryGood
        } else if score >= 60.0 {
            ScoreTier::Good
        } else if score >= 50.0 {
            ScoreTier::Fair
        } else {
            ScoreTier::NeedsImprovement
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ScoreTier::Excellent => "Excellent",
            ScoreTier::VeryGood => "Very good",
            ScoreTier::Good => "Good",
            ScoreTier::Fair => "Fair",
            ScoreTier::NeedsImprovement => "Needs improvement",
        }
    }
}

/// Normalized score components, each 0-100.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreComponents {
    pub punctuality: f64,
    pub attendance: f64,
    pub frequency: f64,
    pub cost: f64,
}

impl ScoreComponents {
    /// Weighted blend, unrounded.
    pub fn weighted(&self) -> f64 {
        PUNCTUALITY_WEIGHT * self.punctuality
            + ATTENDANCE_WEIGHT * self.attendance
            + FREQUENCY_WEIGHT * self.frequency
            + COST_WEIGHT * self.cost
    }
}

/// An instructor's score against a cohort.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositeScore {
    /// 0-100, one decimal
    pub score: f64,
    pub tier: ScoreTier,
    pub components: ScoreComponents,
    pub cost_per_attendee: f64,
}

/// Score `records` against `cohort`.
pub fn composite_score(records: &[AttendanceRecord], cohort: &CohortSnapshot) -> CompositeScore {
    let cost = cost_per_attendee(records);
    let components = ScoreComponents {
        punctuality: punctuality_summary(records).rate,
        attendance: attendance_norm(average_attendees(records), cohort.mean_attendees),
        frequency: frequency_norm(sessions_per_month(records)),
        cost: cost_norm(cost, cohort.cost_range),
    };
    let score = round1(components.weighted().clamp(0.0, 100.0));

    CompositeScore {
        score,
        tier: ScoreTier::from_score(score),
        components,
        cost_per_attendee: cost,
    }
}

/// Attendance relative to the cohort mean, or to a fixed reference without one.
pub fn attendance_norm(avg_attendees: f64, cohort_mean: f64) -> f64 {
    let norm = if cohort_mean > 0.0 {
        safe_ratio(avg_attendees, cohort_mean) * 50.0
    } else {
        avg_attendees / ATTENDANCE_REFERENCE * 100.0
    };
    norm.clamp(0.0, 100.0)
}

pub fn frequency_norm(sessions_per_month: f64) -> f64 {
    (sessions_per_month / FREQUENCY_REFERENCE * 100.0).clamp(0.0, 100.0)
}

/// Lower cost scores higher. A zero cost means no paid attendance and scores 0.
pub fn cost_norm(cost: f64, range: Option<CostRange>) -> f64 {
    if cost <= 0.0 {
        return 0.0;
    }
    let norm = match range {
        Some(CostRange { min, max }) if max <= min => {
            if cost <= min {
                100.0
            } else {
                0.0
            }
        }
        Some(CostRange { min, max }) => (max - cost) / (max - min) * 100.0,
        None => (1.0 - cost / COST_CEILING) * 100.0,
    };
    norm.clamp(0.0, 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::test_support::{attended, record};

    /// 20 on-time sessions in March with 10 attendees each at `rate`.
    fn busy_month(rate: f64) -> Vec<AttendanceRecord> {
        (0..20)
            .map(|i| attended(i, &format!("2025-03-{:02}", i + 1), 10).with_rate(rate))
            .collect()
    }

    #[test]
    fn test_tier_thresholds() {
        assert_eq!(ScoreTier::from_score(85.0), ScoreTier::Excellent);
        assert_eq!(ScoreTier::from_score(84.9), ScoreTier::VeryGood);
        assert_eq!(ScoreTier::from_score(70.0), ScoreTier::VeryGood);
        assert_eq!(ScoreTier::from_score(60.0), ScoreTier::Good);
        assert_eq!(ScoreTier::from_score(50.0), ScoreTier::Fair);
        assert_eq!(ScoreTier::from_score(49.9), ScoreTier::NeedsImprovement);
        assert_eq!(ScoreTier::VeryGood.label(), "Very good");
    }

    #[test]
    fn test_score_at_cohort_mean_with_cheapest_cost() {
        let records = busy_month(30.0);
        let cohort = CohortSnapshot {
            peer_count: 4,
            mean_attendees: 10.0,
            cost_range: Some(CostRange { min: 3.0, max: 6.0 }),
            ..CohortSnapshot::empty()
        };
        let score = composite_score(&records, &cohort);

        assert_eq!(score.cost_per_attendee, 3.0);
        assert_eq!(score.components.punctuality, 100.0);
        assert_eq!(score.components.attendance, 50.0);
        assert_eq!(score.components.frequency, 100.0);
        assert_eq!(score.components.cost, 100.0);
        assert_eq!(score.score, 80.0);
        assert_eq!(score.tier, ScoreTier::VeryGood);
        assert_eq!(score.tier.label(), "Very good");
    }

    #[test]
    fn test_attendance_norm() {
        assert_eq!(attendance_norm(10.0, 10.0), 50.0);
        assert_eq!(attendance_norm(30.0, 10.0), 100.0);
        assert_eq!(attendance_norm(10.0, 0.0), 50.0);
        assert_eq!(attendance_norm(40.0, 0.0), 100.0);
        assert_eq!(attendance_norm(0.0, 0.0), 0.0);
    }

    #[test]
    fn test_cost_norm_cases() {
        // No paid attendance
        assert_eq!(cost_norm(0.0, Some(CostRange { min: 1.0, max: 3.0 })), 0.0);
        // Linear inside the range, clamped outside it
        assert_eq!(cost_norm(2.0, Some(CostRange { min: 1.0, max: 3.0 })), 50.0);
        assert_eq!(cost_norm(0.5, Some(CostRange { min: 1.0, max: 3.0 })), 100.0);
        assert_eq!(cost_norm(9.0, Some(CostRange { min: 1.0, max: 3.0 })), 0.0);
        // Degenerate range
        assert_eq!(cost_norm(2.0, Some(CostRange { min: 2.0, max: 2.0 })), 100.0);
        assert_eq!(cost_norm(2.5, Some(CostRange { min: 2.0, max: 2.0 })), 0.0);
        // Absolute fallback
        assert_eq!(cost_norm(25.0, None), 50.0);
        assert_eq!(cost_norm(50.0, None), 0.0);
        assert_eq!(cost_norm(80.0, None), 0.0);
    }

    #[test]
    fn test_empty_records_score_zero() {
        let score = composite_score(&[], &CohortSnapshot::empty());
        assert_eq!(score.score, 0.0);
        assert_eq!(score.components, ScoreComponents::default());
        assert_eq!(score.tier, ScoreTier::NeedsImprovement);
    }

    #[test]
    fn test_components_stay_in_range() {
        let records = vec![
            record(1, "2025-03-01", "09:00", Some("09:30"), Some(200)).with_rate(1.0),
            record(2, "2025-03-02", "09:00", None, None),
        ];
        let score = composite_score(&records, &CohortSnapshot::empty());
        for value in [
            score.components.punctuality,
            score.components.attendance,
            score.components.frequency,
            score.components.cost,
            score.score,
        ] {
            assert!((0.0..=100.0).contains(&value));
        }
        assert_eq!(score, composite_score(&records, &CohortSnapshot::empty()));
    }
}
