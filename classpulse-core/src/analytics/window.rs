//! Trailing date windows used by rankings and cohort averages.

use chrono::{Duration, NaiveDate};
use serde::Serialize;

use crate::types::AttendanceRecord;

/// Average month length used to turn a day window into "sessions per month".
pub const DAYS_PER_MONTH: f64 = 30.0;

/// The inclusive date range `[as_of - days, as_of]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TrailingWindow {
    pub as_of: NaiveDate,
    pub days: u32,
}

impl TrailingWindow {
    pub fn new(as_of: NaiveDate, days: u32) -> Self {
        Self { as_of, days }
    }

    /// Clamps to `NaiveDate::MIN` when the window reaches past the calendar.
    pub fn start(&self) -> NaiveDate {
        self.as_of
            .checked_sub_signed(Duration::days(i64::from(self.days)))
            .unwrap_or(NaiveDate::MIN)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start() && date <= self.as_of
    }

    /// Records whose session date falls inside the window, in input order.
    pub fn filter(&self, records: &[AttendanceRecord]) -> Vec<AttendanceRecord> {
        records
            .iter()
            .filter(|r| self.contains(r.session_date))
            .cloned()
            .collect()
    }

    /// Window length expressed in 30-day months.
    pub fn months(&self) -> f64 {
        f64::from(self.days) / DAYS_PER_MONTH
    }

    /// `sessions / months()`, 0 for a zero-length window.
    pub fn per_month(&self, sessions: usize) -> f64 {
        super::stats::safe_ratio(sessions as f64, self.months())
    }
}
