//! Bell schedule lookup.

use crate::models::Period;
use chrono::{DateTime, FixedOffset, NaiveDateTime, Timelike, Utc};

/// Daily class windows in UTC as (start hour, start minute, end hour, end minute).
/// Local time is UTC+3, so period 1 runs 08:30–10:05 on the wall clock.
pub const BELL_SCHEDULE: [(u32, u32, u32, u32); 7] = [
    (5, 30, 7, 5),
    (7, 15, 8, 50),
    (9, 0, 10, 35),
    (10, 50, 12, 25),
    (12, 40, 14, 15),
    (14, 25, 16, 0),
    (16, 10, 17, 45),
];

/// Find the period whose window exactly matches the given start and end.
/// Dates are ignored; only hour and minute take part.
pub fn classify_period(start: &DateTime<Utc>, end: &DateTime<Utc>) -> Option<Period> {
    let key = (start.hour(), start.minute(), end.hour(), end.minute());
    BELL_SCHEDULE
        .iter()
        .position(|window| *window == key)
        .and_then(|index| Period::new(index as u8 + 1))
}

/// Convert a UTC timestamp to local wall-clock time at a fixed offset
pub fn to_local(timestamp: &DateTime<Utc>, offset: FixedOffset) -> NaiveDateTime {
    timestamp.with_timezone(&offset).naive_local()
}
