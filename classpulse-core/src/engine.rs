//! Metrics engine
//!
//! Entry point for the presentation layer. Owns the settings and the bundle
//! cache; everything else is delegated to [`crate::analytics`].

use std::sync::Arc;

use chrono::NaiveDate;

use crate::analytics::{
    build_bundle, rank_instructors, BundleParams, CohortSnapshot, MetricsBundle, PeerRecords,
    RankingEntry, RankingMetric, TrailingWindow,
};
use crate::cache::{CacheKey, Clock, MetricsCache, SystemClock};
use crate::config::Config;
use crate::error::Result;
use crate::types::{AttendanceRecord, InstructorId};

const BUNDLE_FUNCTION: &str = "metrics_bundle";

/// Computes and caches instructor metrics.
pub struct MetricsEngine {
    config: Config,
    clock: Arc<dyn Clock>,
    bundles: MetricsCache<Arc<MetricsBundle>>,
}

impl std::fmt::Debug for MetricsEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetricsEngine")
            .field("config", &self.config)
            .field("bundles", &self.bundles)
            .finish()
    }
}

impl MetricsEngine {
    pub fn new(config: Config, clock: Arc<dyn Clock>) -> Self {
        let bundles = MetricsCache::new(config.cache.ttl(), clock.clone());
        tracing::info!(
            ttl_secs = config.cache.ttl_secs,
            window_days = config.ranking.window_days,
            min_sessions = config.comparison.min_sessions,
            "Metrics engine ready"
        );
        Self {
            config,
            clock,
            bundles,
        }
    }

    /// Engine on the wall clock.
    pub fn with_config(config: Config) -> Self {
        Self::new(config, Arc::new(SystemClock))
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Bundle parameters preloaded with the configured minimum sample.
    pub fn params(&self) -> BundleParams {
        BundleParams::new().with_min_sessions(self.config.comparison.min_sessions)
    }

    /// Trailing window ending at `as_of`, sized from the ranking settings.
    pub fn window(&self, as_of: NaiveDate) -> TrailingWindow {
        TrailingWindow::new(as_of, self.config.ranking.window_days)
    }

    /// Peer averages over the configured window, leaving out `exclude`.
    pub fn cohort(
        &self,
        peers: &[PeerRecords],
        as_of: NaiveDate,
        exclude: Option<InstructorId>,
    ) -> CohortSnapshot {
        CohortSnapshot::from_peers(peers, &self.window(as_of), exclude)
    }

    /// Full metrics for `instructor`, served from cache when fresh.
    ///
    /// `records` must already be filtered to `instructor`.
    pub fn metrics_bundle(
        &self,
        instructor: InstructorId,
        records: &[AttendanceRecord],
        params: &BundleParams,
        force_recalculate: bool,
    ) -> Result<Arc<MetricsBundle>> {
        let key = CacheKey::new(instructor, BUNDLE_FUNCTION, params)?;
        self.bundles.get_or_compute(key, force_recalculate, || {
            let bundle = build_bundle(instructor, records, params, self.clock.now())?;
            tracing::info!(
                instructor,
                sessions = bundle.sessions,
                score = bundle.score.score,
                "Computed metrics bundle"
            );
            Ok(Arc::new(bundle))
        })
    }

    /// Leaderboard over the configured window. Not cached.
    pub fn ranking(
        &self,
        cohort: &[PeerRecords],
        as_of: NaiveDate,
        metric: RankingMetric,
        limit: Option<usize>,
    ) -> Vec<RankingEntry> {
        let limit = limit.unwrap_or(self.config.ranking.limit);
        rank_instructors(cohort, &self.window(as_of), metric, limit)
    }

    /// Drop cached results for `instructor`, or all of them.
    ///
    /// Call after any change to an instructor's records.
    pub fn invalidate(&self, instructor: Option<InstructorId>) -> usize {
        self.bundles.invalidate(instructor)
    }

    pub fn cached_entries(&self) -> usize {
        self.bundles.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::test_support::{attended, for_instructor};
    use crate::cache::ManualClock;
    use crate::types::InstructorRef;
    use chrono::Utc;
    use std::time::Duration;

    fn engine() -> (MetricsEngine, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(Utc::now()));
        (MetricsEngine::new(Config::default(), clock.clone()), clock)
    }

    fn records() -> Vec<AttendanceRecord> {
        (0..3)
            .map(|i| attended(i, &format!("2025-03-0{}", i + 1), 10))
            .collect()
    }

    #[test]
    fn test_bundle_is_cached_until_invalidated() {
        let (engine, _clock) = engine();
        let params = engine.params();

        let first = engine.metrics_bundle(1, &records(), &params, false).unwrap();
        let second = engine.metrics_bundle(1, &records(), &params, false).unwrap();
        assert!(Arc::ptr_eq(&first, &second));

        assert_eq!(engine.invalidate(Some(1)), 1);
        let third = engine.metrics_bundle(1, &records(), &params, false).unwrap();
        assert!(!Arc::ptr_eq(&first, &third));
    }

    #[test]
    fn test_distinct_params_get_distinct_entries() {
        let (engine, _clock) = engine();
        let all_time = engine.params();
        let march = engine.params().focus("2025-03".parse().unwrap());

        engine.metrics_bundle(1, &records(), &all_time, false).unwrap();
        engine.metrics_bundle(1, &records(), &march, false).unwrap();
        assert_eq!(engine.cached_entries(), 2);
    }

    #[test]
    fn test_bundle_expires_after_ttl() {
        let (engine, clock) = engine();
        let params = engine.params();
        let first = engine.metrics_bundle(1, &records(), &params, false).unwrap();
        clock.advance(Duration::from_secs(3600));
        let second = engine.metrics_bundle(1, &records(), &params, false).unwrap();
        assert!(!Arc::ptr_eq(&first, &second));
        assert!(second.computed_at > first.computed_at);
    }

    #[test]
    fn test_foreign_records_are_not_cached() {
        let (engine, _clock) = engine();
        let mut mixed = records();
        mixed.push(for_instructor(2, 50, "2025-03-09", 10));
        assert!(engine.metrics_bundle(1, &mixed, &engine.params(), false).is_err());
        assert_eq!(engine.cached_entries(), 0);
    }

    #[test]
    fn test_ranking_uses_configured_limit() {
        let (engine, _clock) = engine();
        let cohort: Vec<_> = (1..=12)
            .map(|id| PeerRecords {
                instructor: InstructorRef::new(id, format!("Instructor {}", id)),
                records: vec![for_instructor(id, id, "2025-03-01", id as u32)],
            })
            .collect();
        let as_of = NaiveDate::from_ymd_opt(2025, 3, 31).unwrap();

        let ranking = engine.ranking(&cohort, as_of, RankingMetric::AvgAttendees, None);
        assert_eq!(ranking.len(), 10);
        assert_eq!(ranking[0].instructor.id, 12);
        assert_eq!(
            engine
                .ranking(&cohort, as_of, RankingMetric::AvgAttendees, Some(3))
                .len(),
            3
        );
    }
}
