//! Peer cohort aggregation.
//!
//! A [`CohortSnapshot`] summarizes how the other instructors performed over a
//! trailing window. The scorer compares an instructor against it; an empty
//! snapshot makes the scorer fall back to absolute scales.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::distribution::class_distribution;
use super::punctuality::punctuality_summary;
use super::stats::{average_attendees, cost_per_attendee, mean};
use super::window::TrailingWindow;
use crate::types::{AttendanceRecord, InstructorId, InstructorRef};

/// One instructor together with their records.
#[derive(Debug, Clone, PartialEq)]
pub struct PeerRecords {
    pub instructor: InstructorRef,
    pub records: Vec<AttendanceRecord>,
}

/// Lowest and highest cost per attendee among peers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CostRange {
    pub min: f64,
    pub max: f64,
}

/// Peer averages used as the scoring baseline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CohortSnapshot {
    /// Peers with at least one session in the window
    pub peer_count: usize,
    pub mean_attendees: f64,
    pub mean_punctuality: f64,
    pub mean_sessions_per_month: f64,
    pub mean_variety: f64,
    /// `None` when no peer had a positive cost per attendee
    pub cost_range: Option<CostRange>,
}

impl CohortSnapshot {
    /// A snapshot without peer data.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.peer_count == 0
    }

    /// Aggregate peer record sets over `window`, skipping `exclude`.
    pub fn from_peers(
        peers: &[PeerRecords],
        window: &TrailingWindow,
        exclude: Option<InstructorId>,
    ) -> Self {
        let mut punctuality = Vec::new();
        let mut attendees = Vec::new();
        let mut frequency = Vec::new();
        let mut variety = Vec::new();
        let mut cost_range: Option<CostRange> = None;

        for peer in peers {
            if exclude == Some(peer.instructor.id) {
                continue;
            }
            let records = window.filter(&peer.records);
            if records.is_empty() {
                continue;
            }

            let summary = punctuality_summary(&records);
            if summary.determined() > 0 {
                punctuality.push(summary.rate);
            }
            attendees.push(average_attendees(&records));
            frequency.push(window.per_month(records.len()));
            variety.push(class_distribution(&records).variety());

            let cost = cost_per_attendee(&records);
            if cost > 0.0 {
                cost_range = Some(match cost_range {
                    None => CostRange {
                        min: cost,
                        max: cost,
                    },
                    Some(range) => CostRange {
                        min: range.min.min(cost),
                        max: range.max.max(cost),
                    },
                });
            }
        }

        let snapshot = Self {
            peer_count: attendees.len(),
            mean_attendees: mean(&attendees),
            mean_punctuality: mean(&punctuality),
            mean_sessions_per_month: mean(&frequency),
            mean_variety: mean(&variety),
            cost_range,
        };
        tracing::debug!(
            peers = snapshot.peer_count,
            window_days = window.days,
            "Built cohort snapshot"
        );
        snapshot
    }
}

/// Split a flat record list into per-instructor sets, ordered by instructor id.
///
/// Names come from `names`; instructors without one get a generic label.
pub fn group_by_instructor(
    records: &[AttendanceRecord],
    names: &BTreeMap<InstructorId, String>,
) -> Vec<PeerRecords> {
    let mut groups: BTreeMap<InstructorId, Vec<AttendanceRecord>> = BTreeMap::new();
    for record in records {
        groups
            .entry(record.instructor_id)
            .or_default()
            .push(record.clone());
    }
    groups
        .into_iter()
        .map(|(id, records)| PeerRecords {
            instructor: InstructorRef::new(id, instructor_name(id, names)),
            records,
        })
        .collect()
}

/// Display name for `id`, or "Instructor <id>" when unknown.
pub fn instructor_name(id: InstructorId, names: &BTreeMap<InstructorId, String>) -> String {
    names
        .get(&id)
        .cloned()
        .unwrap_or_else(|| format!("Instructor {}", id))
}
