//! Analytics module for classpulse
//!
//! Pure computations over attendance records:
//! - Punctuality classification and rates
//! - Class-type distribution
//! - Monthly buckets and trends
//! - Composite scoring against a peer cohort
//! - Month-over-month comparison
//! - Leaderboards
//! - Session payouts
//!
//! [`bundle::build_bundle`] ties them together into one [`MetricsBundle`].
//! Nothing in this module does I/O or holds state; caching lives in
//! [`crate::cache`].

pub mod bundle;
pub mod cohort;
pub mod comparison;
pub mod distribution;
pub mod payout;
pub mod punctuality;
pub mod ranking;
pub mod scoring;
pub mod stats;
pub mod trends;
pub mod window;

#[cfg(test)]
pub(crate) mod test_support;

pub use bundle::{build_bundle, BundleParams, CohortComparison, MetricsBundle};
pub use cohort::{group_by_instructor, CohortSnapshot, CostRange, PeerRecords};
pub use comparison::{
    compare_months, ClassTypeChange, ComparisonOutcome, ComparisonRequest, InsufficientData,
    MetricChanges, MonthComparison, PeriodSummary, ValidatedComparison, Validation,
};
pub use distribution::{class_distribution, ClassDistribution, ClassTypeShare};
pub use payout::{payout_summary, session_payout, PayoutKind, PayoutSummary};
pub use punctuality::{punctuality_summary, Punctuality, PunctualitySummary};
pub use ranking::{rank_instructors, RankingEntry, RankingMetric};
pub use scoring::{composite_score, CompositeScore, ScoreComponents, ScoreTier};
pub use trends::{monthly_buckets, trend_summary, MonthBucket, TrendSummary};
pub use window::TrailingWindow;
