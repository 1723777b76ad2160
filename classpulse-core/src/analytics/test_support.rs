//! Record builders shared by the analyzer tests.

use chrono::{NaiveDate, NaiveTime};

use crate::types::{AttendanceRecord, ClassType, InstructorId, ScheduleSlot};

fn date(raw: &str) -> NaiveDate {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").unwrap()
}

fn time(raw: &str) -> NaiveTime {
    NaiveTime::parse_from_str(raw, "%H:%M").unwrap()
}

fn slot(class_type: ClassType, start: &str) -> ScheduleSlot {
    ScheduleSlot {
        id: class_type.index() as i64 + 1,
        name: format!("{} {}", class_type.as_str(), start),
        class_type,
        scheduled_start: time(start),
        duration_minutes: 45,
    }
}

/// A Ride session for instructor 1.
pub fn record(
    id: i64,
    session_date: &str,
    start: &str,
    arrival: Option<&str>,
    attendees: Option<u32>,
) -> AttendanceRecord {
    let mut record = AttendanceRecord::new(id, 1, slot(ClassType::Ride, start), date(session_date));
    record.arrival_time = arrival.map(time);
    record.attendee_count = attendees;
    record
}

/// An on-time session of the given type with 10 attendees.
pub fn typed(id: i64, session_date: &str, class_type: ClassType) -> AttendanceRecord {
    AttendanceRecord::new(id, 1, slot(class_type, "09:00"), date(session_date))
        .with_arrival(time("09:00"))
        .with_attendees(10)
}

/// An on-time Ride session with the given head count.
pub fn attended(id: i64, session_date: &str, attendees: u32) -> AttendanceRecord {
    record(id, session_date, "09:00", Some("09:00"), Some(attendees))
}

/// An on-time session owned by `instructor`.
pub fn for_instructor(
    instructor: InstructorId,
    id: i64,
    session_date: &str,
    attendees: u32,
) -> AttendanceRecord {
    let mut record = attended(id, session_date, attendees);
    record.instructor_id = instructor;
    record
}
