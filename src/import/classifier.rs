//! Filtering of raw calendar events.
//
// Drops events that do not describe a class in a bookable room: military
// department classes, elective PE, department offices and anything whose
// location is not a recognised room label.

use crate::calendar::RawEvent;
use crate::error::ImportResult;
use chrono::{DateTime, Utc};
use log::debug;
use regex::Regex;

/// A raw event that passed every filter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarEvent {
    pub name: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub interval: Option<u32>,
    pub location: String,
    pub teacher: Option<String>,
}

pub struct EventClassifier {
    military: Regex,
    physical_education: Regex,
    department: Regex,
    ulk_room: Regex,
    gz_room: Regex,
}

impl EventClassifier {
    pub fn new() -> ImportResult<Self> {
        Ok(Self {
            military: Regex::new(r"(?i)вуц")?,
            physical_education: Regex::new(
                r"(?i)Элективный курс по физической культуре и спорту",
            )?,
            department: Regex::new(r"(?i)каф")?,
            ulk_room: Regex::new(r"^[0-9.]+[лаб]$")?,
            gz_room: Regex::new(r"^[0-9.]+(ю|аю)?$")?,
        })
    }

    /// Whether a location looks like a room in one of the two buildings
    pub fn is_room_label(&self, location: &str) -> bool {
        self.ulk_room.is_match(location) || self.gz_room.is_match(location)
    }

    /// Validate a raw event, returning `None` when it must be skipped
    pub fn classify(&self, raw: RawEvent) -> Option<CalendarEvent> {
        let (Some(name), Some(location), Some(start), Some(end)) =
            (raw.name, raw.location, raw.start, raw.end)
        else {
            return None;
        };
        if name.is_empty() || location.is_empty() {
            return None;
        }

        if self.military.is_match(&name) || self.physical_education.is_match(&name) {
            debug!("Skipping '{}': excluded course", name);
            return None;
        }
        if self.department.is_match(&location) {
            debug!("Skipping '{}': held at department office '{}'", name, location);
            return None;
        }
        if !self.is_room_label(&location) {
            debug!("Skipping '{}': unrecognised location '{}'", name, location);
            return None;
        }

        Some(CalendarEvent {
            name,
            start,
            end,
            interval: raw.interval,
            location,
            teacher: raw.teacher.filter(|t| !t.is_empty()),
        })
    }
}
