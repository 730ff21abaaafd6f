//! Calendar input: raw events as they come out of an ICS file.

mod calendar_import;

pub use calendar_import::*;

use chrono::{DateTime, Utc};

/// One VEVENT before any filtering. Every field may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawEvent {
    pub name: Option<String>,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    /// `INTERVAL` from the recurrence rule, kept for reference only
    pub interval: Option<u32>,
    pub location: Option<String>,
    pub teacher: Option<String>,
}

/// Everything the importer needs from one ICS file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CalendarFile {
    /// `X-WR-CALNAME`, e.g. `Расписание ИУ9-62Б`
    pub name: Option<String>,
    pub events: Vec<RawEvent>,
}
