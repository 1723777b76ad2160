//! Instructor pay per session.
//!
//! Sessions without an arrival time were cancelled or never registered and
//! are unpaid. A session the instructor showed up for but nobody attended
//! pays half the rate.

use serde::Serialize;

use crate::types::AttendanceRecord;

/// How a session is paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PayoutKind {
    Full,
    Half,
    Unpaid,
}

impl PayoutKind {
    pub fn classify(record: &AttendanceRecord) -> Self {
        match (record.arrival_time, record.attendee_count) {
            (None, _) => PayoutKind::Unpaid,
            (Some(_), None | Some(0)) => PayoutKind::Half,
            (Some(_), Some(_)) => PayoutKind::Full,
        }
    }
}

/// Amount owed for one session.
pub fn session_payout(record: &AttendanceRecord) -> f64 {
    match PayoutKind::classify(record) {
        PayoutKind::Full => record.rate,
        PayoutKind::Half => record.rate / 2.0,
        PayoutKind::Unpaid => 0.0,
    }
}

/// Pay totals over a set of sessions.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PayoutSummary {
    pub full: usize,
    pub half: usize,
    pub unpaid: usize,
    pub total: f64,
}

pub fn payout_summary(records: &[AttendanceRecord]) -> PayoutSummary {
    let mut summary = PayoutSummary::default();
    for record in records {
        match PayoutKind::classify(record) {
            PayoutKind::Full => summary.full += 1,
            PayoutKind::Half => summary.half += 1,
            PayoutKind::Unpaid => summary.unpaid += 1,
        }
        summary.total += session_payout(record);
    }
    summary
}
