//! Punctuality classification
//!
//! Each session is classified by how late the instructor arrived relative to
//! the slot's scheduled start:
//!
//! | Delay (minutes) | Class |
//! |-----------------|-------|
//! | `<= 0` | [`Punctuality::OnTime`] |
//! | `1..=10` | [`Punctuality::MinorDelay`] |
//! | `> 10` | [`Punctuality::MajorDelay`] |
//! | no arrival time | [`Punctuality::Undetermined`] |
//!
//! Undetermined sessions are left out of the punctuality rate denominator.

use serde::Serialize;

use crate::types::AttendanceRecord;

/// Largest delay (minutes) still counted as a minor delay.
pub const MINOR_DELAY_MAX_MINUTES: i64 = 10;

/// Punctuality class of a single session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Punctuality {
    OnTime,
    MinorDelay,
    MajorDelay,
    Undetermined,
}

impl Punctuality {
    /// Classify a session.
    pub fn classify(record: &AttendanceRecord) -> Self {
        match record.delay_minutes() {
            None => Punctuality::Undetermined,
            Some(delay) => Self::from_delay(delay),
        }
    }

    /// Classify a known delay in minutes.
    pub fn from_delay(delay_minutes: i64) -> Self {
        if delay_minutes <= 0 {
            Punctuality::OnTime
        } else if delay_minutes <= MINOR_DELAY_MAX_MINUTES {
            Punctuality::MinorDelay
        } else {
            Punctuality::MajorDelay
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Punctuality::OnTime => "On time",
            Punctuality::MinorDelay => "Minor delay",
            Punctuality::MajorDelay => "Major delay",
            Punctuality::Undetermined => "Undetermined",
        }
    }
}

/// Punctuality counts and rate over a set of sessions.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PunctualitySummary {
    pub on_time: usize,
    pub minor_delay: usize,
    pub major_delay: usize,
    pub undetermined: usize,
    /// On-time share of determined sessions, 0-100
    pub rate: f64,
    /// Mean delay in minutes over determined sessions (negative = early)
    pub mean_delay_minutes: f64,
}

impl PunctualitySummary {
    /// Sessions with a known arrival time (the rate denominator).
    pub fn determined(&self) -> usize {
        self.on_time + self.minor_delay + self.major_delay
    }
}

/// Summarize punctuality over `records`.
pub fn punctuality_summary(records: &[AttendanceRecord]) -> PunctualitySummary {
    let mut summary = PunctualitySummary::default();
    let mut total_delay = 0i64;

    for record in records {
        match record.delay_minutes() {
            None => summary.undetermined += 1,
            Some(delay) => {
                total_delay += delay;
                match Punctuality::from_delay(delay) {
                    Punctuality::OnTime => summary.on_time += 1,
                    Punctuality::MinorDelay => summary.minor_delay += 1,
                    _ => summary.major_delay += 1,
                }
            }
        }
    }

    let determined = summary.determined();
    if determined > 0 {
        summary.rate = summary.on_time as f64 / determined as f64 * 100.0;
        summary.mean_delay_minutes = total_delay as f64 / determined as f64;
    }

    summary
}
