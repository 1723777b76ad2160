//! Core domain types for classpulse
//!
//! These are the fixed-shape values the metrics engine consumes. They are
//! created by the ingestion boundary (see [`crate::ingest`]) and never
//! mutated by the engine.
//!
//! ## Terminology
//!
//! | Term | Definition |
//! |------|------------|
//! | **Instructor** | The person who teaches a class session, identified by a stable id |
//! | **Schedule slot** | A recurring weekly class definition (type, start time, duration) |
//! | **Attendance record** | One concrete occurrence of a slot on a date, with arrival time and head count |
//! | **Month key** | A (year, month) pair used to bucket and compare records |

use chrono::{Datelike, NaiveDate, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

/// Stable instructor identifier.
pub type InstructorId = i64;

// ============================================
// Class types
// ============================================

/// Canonical class categories offered by the studio.
///
/// Unknown or missing tags are folded into [`ClassType::Other`] when a record
/// is ingested, so analyzers never see an unrecognized value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ClassType {
    Move,
    Ride,
    Box,
    Other,
}

impl ClassType {
    /// All categories in canonical report order.
    pub const ALL: [ClassType; 4] = [
        ClassType::Move,
        ClassType::Ride,
        ClassType::Box,
        ClassType::Other,
    ];

    /// Normalize a raw tag. Matching is case-insensitive and ignores surrounding
    /// whitespace; anything unrecognized (or missing) becomes `Other`.
    pub fn normalize(raw: Option<&str>) -> Self {
        match raw.map(|s| s.trim().to_ascii_uppercase()).as_deref() {
            Some("MOVE") => ClassType::Move,
            Some("RIDE") => ClassType::Ride,
            Some("BOX") => ClassType::Box,
            _ => ClassType::Other,
        }
    }

    /// Returns the identifier used in exports
    pub fn as_str(&self) -> &'static str {
        match self {
            ClassType::Move => "MOVE",
            ClassType::Ride => "RIDE",
            ClassType::Box => "BOX",
            ClassType::Other => "OTHER",
        }
    }

    /// Position in [`ClassType::ALL`].
    pub fn index(&self) -> usize {
        match self {
            ClassType::Move => 0,
            ClassType::Ride => 1,
            ClassType::Box => 2,
            ClassType::Other => 3,
        }
    }
}

impl std::fmt::Display for ClassType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================
// Schedule and attendance
// ============================================

/// A recurring weekly class definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleSlot {
    pub id: i64,
    /// Display name of the class (e.g., "Morning Ride")
    pub name: String,
    pub class_type: ClassType,
    /// Scheduled start time of day
    pub scheduled_start: NaiveTime,
    pub duration_minutes: u32,
}

/// A person who teaches classes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstructorRef {
    pub id: InstructorId,
    pub name: String,
}

impl InstructorRef {
    pub fn new(id: InstructorId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// One concrete class session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    pub id: i64,
    pub schedule: ScheduleSlot,
    pub session_date: NaiveDate,
    pub instructor_id: InstructorId,
    /// When the instructor arrived; `None` while the session is pending or unregistered
    pub arrival_time: Option<NaiveTime>,
    /// Head count; `None` when attendance was not recorded
    pub attendee_count: Option<u32>,
    /// Per-class rate charged for this instructor
    pub rate: f64,
}

impl AttendanceRecord {
    /// Create a pending record (no arrival, no head count, zero rate).
    pub fn new(
        id: i64,
        instructor_id: InstructorId,
        schedule: ScheduleSlot,
        session_date: NaiveDate,
    ) -> Self {
        Self {
            id,
            schedule,
            session_date,
            instructor_id,
            arrival_time: None,
            attendee_count: None,
            rate: 0.0,
        }
    }

    pub fn with_arrival(mut self, arrival: NaiveTime) -> Self {
        self.arrival_time = Some(arrival);
        self
    }

    pub fn with_attendees(mut self, count: u32) -> Self {
        self.attendee_count = Some(count);
        self
    }

    pub fn with_rate(mut self, rate: f64) -> Self {
        self.rate = rate;
        self
    }

    pub fn class_type(&self) -> ClassType {
        self.schedule.class_type
    }

    /// Calendar month this session falls in.
    pub fn month(&self) -> MonthKey {
        MonthKey::from_date(self.session_date)
    }

    /// Arrival minus scheduled start, in whole minutes (seconds ignored).
    ///
    /// Negative when the instructor arrived early; `None` without an arrival time.
    pub fn delay_minutes(&self) -> Option<i64> {
        let arrival = self.arrival_time?;
        let start = self.schedule.scheduled_start;
        let to_minutes = |t: NaiveTime| i64::from(t.hour()) * 60 + i64::from(t.minute());
        Some(to_minutes(arrival) - to_minutes(start))
    }
}

// ============================================
// Calendar months
// ============================================

/// A calendar month, ordered chronologically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct MonthKey {
    year: i32,
    month: u32,
}

impl MonthKey {
    /// Returns `None` unless `month` is in 1..=12.
    pub fn new(year: i32, month: u32) -> Option<Self> {
        (1..=12)
            .contains(&month)
            .then_some(Self { year, month })
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    /// Display name (e.g., "March 2025").
    pub fn label(&self) -> String {
        crate::format::month_label(self.year, self.month)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }

    /// Number of calendar months from `start` to `end`, both included.
    ///
    /// Returns 0 when `end` precedes `start`.
    pub fn span_inclusive(start: MonthKey, end: MonthKey) -> u32 {
        let diff = end.ordinal() - start.ordinal();
        if diff < 0 {
            0
        } else {
            diff as u32 + 1
        }
    }

    fn ordinal(&self) -> i64 {
        i64::from(self.year) * 12 + i64::from(self.month) - 1
    }
}

impl std::fmt::Display for MonthKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl std::str::FromStr for MonthKey {
    type Err = String;

    /// Parse `YYYY-MM`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (year, month) = s
            .split_once('-')
            .ok_or_else(|| format!("invalid month '{}': expected YYYY-MM", s))?;
        let year: i32 = year
            .parse()
            .map_err(|_| format!("invalid year in '{}'", s))?;
        let month: u32 = month
            .parse()
            .map_err(|_| format!("invalid month in '{}'", s))?;
        MonthKey::new(year, month).ok_or_else(|| format!("month must be between 1 and 12, got {}", month))
    }
}
