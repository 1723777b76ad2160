//! Record ingestion boundary
//!
//! Raw attendance data arrives from an external collaborator (database rows,
//! a JSON export, ...) with loosely typed fields. [`RecordInput`] captures that
//! shape and [`RecordInput::into_record`] validates it once, producing the
//! fixed-shape [`AttendanceRecord`] the analyzers work on.
//!
//! Validation rules:
//! - `session_date` must be `YYYY-MM-DD`
//! - `scheduled_start` and `arrival_time` must be `HH:MM` or `HH:MM:SS`
//! - `attendee_count` must be non-negative when present
//! - `rate` must be finite and non-negative
//! - `class_type` is normalized case-insensitively; unknown values become `OTHER`

use std::collections::BTreeMap;

use crate::analytics::cohort::{group_by_instructor, instructor_name, PeerRecords};
use crate::error::{Error, Result};
use crate::types::{AttendanceRecord, ClassType, InstructorId, InstructorRef, ScheduleSlot};
use chrono::{NaiveDate, NaiveTime};
use serde::Deserialize;

/// Loosely typed attendance record as delivered by the persistence layer.
#[derive(Debug, Clone, Deserialize)]
pub struct RecordInput {
    pub id: i64,
    pub instructor_id: InstructorId,
    /// Instructor display name (optional, used by leaderboards)
    #[serde(default)]
    pub instructor_name: Option<String>,
    pub session_date: String,
    pub schedule_id: i64,
    #[serde(default)]
    pub class_name: Option<String>,
    #[serde(default)]
    pub class_type: Option<String>,
    pub scheduled_start: String,
    #[serde(default = "default_duration")]
    pub duration_minutes: u32,
    #[serde(default)]
    pub arrival_time: Option<String>,
    #[serde(default)]
    pub attendee_count: Option<i64>,
    #[serde(default)]
    pub rate: f64,
}

fn default_duration() -> u32 {
    60
}

impl RecordInput {
    /// Validate and convert into a domain record.
    pub fn into_record(self) -> Result<AttendanceRecord> {
        let record_id = self.id.to_string();

        let session_date = NaiveDate::parse_from_str(self.session_date.trim(), "%Y-%m-%d")
            .map_err(|e| {
                Error::malformed(
                    &record_id,
                    "session_date",
                    format!("'{}': {}", self.session_date, e),
                )
            })?;

        let scheduled_start = parse_time_of_day(&self.scheduled_start)
            .ok_or_else(|| Error::malformed(&record_id, "scheduled_start", bad_time(&self.scheduled_start)))?;

        let arrival_time = match self.arrival_time.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(
                parse_time_of_day(raw)
                    .ok_or_else(|| Error::malformed(&record_id, "arrival_time", bad_time(raw)))?,
            ),
        };

        let attendee_count = match self.attendee_count {
            None => None,
            Some(n) if n < 0 => {
                return Err(Error::malformed(
                    &record_id,
                    "attendee_count",
                    format!("must be non-negative, got {}", n),
                ))
            }
            Some(n) => Some(u32::try_from(n).map_err(|_| {
                Error::malformed(&record_id, "attendee_count", format!("{} is out of range", n))
            })?),
        };

        if !self.rate.is_finite() || self.rate < 0.0 {
            return Err(Error::malformed(
                &record_id,
                "rate",
                format!("must be a non-negative amount, got {}", self.rate),
            ));
        }

        let class_type = ClassType::normalize(self.class_type.as_deref());
        let schedule = ScheduleSlot {
            id: self.schedule_id,
            name: self
                .class_name
                .unwrap_or_else(|| class_type.as_str().to_string()),
            class_type,
            scheduled_start,
            duration_minutes: self.duration_minutes,
        };

        Ok(AttendanceRecord {
            id: self.id,
            schedule,
            session_date,
            instructor_id: self.instructor_id,
            arrival_time,
            attendee_count,
            rate: self.rate,
        })
    }
}

/// Validate a batch of raw records, failing on the first malformed one.
pub fn normalize_records(inputs: Vec<RecordInput>) -> Result<Vec<AttendanceRecord>> {
    let count = inputs.len();
    let records = inputs
        .into_iter()
        .map(RecordInput::into_record)
        .collect::<Result<Vec<_>>>()?;
    tracing::debug!(count, "Normalized attendance records");
    Ok(records)
}

/// Parse a JSON array of raw records and validate them.
pub fn parse_records_json(json: &str) -> Result<Vec<AttendanceRecord>> {
    let inputs: Vec<RecordInput> = serde_json::from_str(json)?;
    normalize_records(inputs)
}

/// Validated records plus the instructor names delivered alongside them.
#[derive(Debug, Clone, Default)]
pub struct RecordSet {
    pub records: Vec<AttendanceRecord>,
    pub instructor_names: BTreeMap<InstructorId, String>,
}

impl RecordSet {
    /// Validate raw inputs, keeping the first name seen for each instructor.
    pub fn from_inputs(inputs: Vec<RecordInput>) -> Result<Self> {
        let mut instructor_names = BTreeMap::new();
        for input in &inputs {
            if let Some(name) = input.instructor_name.as_deref().map(str::trim) {
                if !name.is_empty() {
                    instructor_names
                        .entry(input.instructor_id)
                        .or_insert_with(|| name.to_string());
                }
            }
        }
        Ok(Self {
            records: normalize_records(inputs)?,
            instructor_names,
        })
    }

    pub fn instructor(&self, id: InstructorId) -> InstructorRef {
        InstructorRef::new(id, instructor_name(id, &self.instructor_names))
    }

    /// Records owned by `id`, in input order.
    pub fn for_instructor(&self, id: InstructorId) -> Vec<AttendanceRecord> {
        self.records
            .iter()
            .filter(|r| r.instructor_id == id)
            .cloned()
            .collect()
    }

    /// Per-instructor record sets, ordered by instructor id.
    pub fn by_instructor(&self) -> Vec<PeerRecords> {
        group_by_instructor(&self.records, &self.instructor_names)
    }

    /// Most recent session date, if any.
    pub fn latest_date(&self) -> Option<NaiveDate> {
        self.records.iter().map(|r| r.session_date).max()
    }
}

/// Parse a JSON array of raw records into a [`RecordSet`].
pub fn parse_record_set(json: &str) -> Result<RecordSet> {
    let inputs: Vec<RecordInput> = serde_json::from_str(json)?;
    RecordSet::from_inputs(inputs)
}

fn parse_time_of_day(raw: &str) -> Option<NaiveTime> {
    let raw = raw.trim();
    NaiveTime::parse_from_str(raw, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M"))
        .ok()
}

fn bad_time(raw: &str) -> String {
    format!("'{}' is not a valid HH:MM or HH:MM:SS time", raw)
}
