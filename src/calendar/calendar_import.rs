//! ICS import logic for the calendar module.
//
// Reads ICS files with the `ical` crate and maps the handful of properties the
// importer cares about onto `RawEvent` fields.

use super::{CalendarFile, RawEvent};
use crate::error::{ImportError, ImportResult};
use chrono::{DateTime, NaiveDateTime, Utc};
use ical::parser::ical::component::IcalEvent;
use log::debug;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

const TIMESTAMP_FORMAT: &str = "%Y%m%dT%H%M%SZ";
const CALENDAR_NAME: &str = "X-WR-CALNAME";

/// Event properties read by the importer. Everything else is ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventProperty {
    Summary,
    DtStart,
    DtEnd,
    RRule,
    Location,
    Description,
}

impl EventProperty {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "SUMMARY" => Some(Self::Summary),
            "DTSTART" => Some(Self::DtStart),
            "DTEND" => Some(Self::DtEnd),
            "RRULE" => Some(Self::RRule),
            "LOCATION" => Some(Self::Location),
            "DESCRIPTION" => Some(Self::Description),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Summary => "SUMMARY",
            Self::DtStart => "DTSTART",
            Self::DtEnd => "DTEND",
            Self::RRule => "RRULE",
            Self::Location => "LOCATION",
            Self::Description => "DESCRIPTION",
        }
    }
}

/// Read and parse an ICS file from disk
pub fn read_calendar_file(path: &Path) -> ImportResult<CalendarFile> {
    let file = File::open(path).map_err(|source| ImportError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    read_calendar(BufReader::new(file))
}

/// Parse ICS content from any buffered reader
pub fn read_calendar<R: BufRead>(reader: R) -> ImportResult<CalendarFile> {
    let mut result = CalendarFile::default();

    for calendar in ical::IcalParser::new(reader) {
        let calendar =
            calendar.map_err(|e| ImportError::InvalidFormat(format!("ICS parse error: {e}")))?;

        for property in &calendar.properties {
            if property.name == CALENDAR_NAME {
                result.name.clone_from(&property.value);
            }
        }

        for event in &calendar.events {
            result.events.push(parse_event(event)?);
        }
    }

    debug!(
        "Read calendar {:?} with {} events",
        result.name.as_deref().unwrap_or("<unnamed>"),
        result.events.len()
    );
    Ok(result)
}

fn parse_event(event: &IcalEvent) -> ImportResult<RawEvent> {
    let mut raw = RawEvent::default();

    for property in &event.properties {
        let Some(kind) = EventProperty::from_name(&property.name) else {
            continue;
        };
        let Some(value) = property.value.as_deref() else {
            continue;
        };

        match kind {
            EventProperty::Summary => raw.name = Some(value.to_string()),
            EventProperty::DtStart => raw.start = Some(parse_timestamp(kind, value)?),
            EventProperty::DtEnd => raw.end = Some(parse_timestamp(kind, value)?),
            EventProperty::RRule => raw.interval = parse_interval(value),
            EventProperty::Location => raw.location = Some(value.to_string()),
            EventProperty::Description => raw.teacher = Some(value.to_string()),
        }
    }

    Ok(raw)
}

/// Parse a UTC timestamp in `YYYYMMDDThhmmssZ` form
pub fn parse_timestamp(property: EventProperty, value: &str) -> ImportResult<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(value.trim(), TIMESTAMP_FORMAT)
        .map(|naive| naive.and_utc())
        .map_err(|_| ImportError::InvalidTimestamp {
            property: property.name(),
            value: value.to_string(),
        })
}

/// Extract `INTERVAL=<n>` from a recurrence rule
pub fn parse_interval(rrule: &str) -> Option<u32> {
    let raw = rrule
        .split(';')
        .filter_map(|part| part.split_once('='))
        .find(|(key, _)| key.trim().eq_ignore_ascii_case("INTERVAL"))
        .map(|(_, value)| value.trim())?;

    match raw.parse() {
        Ok(interval) => Some(interval),
        Err(_) => {
            debug!("Ignoring non-numeric RRULE interval '{}'", raw);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike, Weekday};

    const SAMPLE: &str = "BEGIN:VCALENDAR\r\n\
VERSION:2.0\r\n\
PRODID:-//test//EN\r\n\
X-WR-CALNAME:Расписание ИУ9-62Б\r\n\
BEGIN:VEVENT\r\n\
SUMMARY:Базы данных\r\n\
DTSTART:20220207T090000Z\r\n\
DTEND:20220207T103500Z\r\n\
RRULE:FREQ=WEEKLY;INTERVAL=2;UNTIL=20220601T000000Z\r\n\
LOCATION:325л\r\n\
DESCRIPTION:Иванов И. И.\r\n\
END:VEVENT\r\n\
BEGIN:VEVENT\r\n\
SUMMARY:Без места\r\n\
DTSTART:20220208T053000Z\r\n\
DTEND:20220208T070500Z\r\n\
END:VEVENT\r\n\
END:VCALENDAR\r\n";

    #[test]
    fn test_read_calendar_maps_properties() {
        let calendar = read_calendar(SAMPLE.as_bytes()).unwrap();
        assert_eq!(calendar.name.as_deref(), Some("Расписание ИУ9-62Б"));
        assert_eq!(calendar.events.len(), 2);

        let event = &calendar.events[0];
        assert_eq!(event.name.as_deref(), Some("Базы данных"));
        assert_eq!(event.location.as_deref(), Some("325л"));
        assert_eq!(event.teacher.as_deref(), Some("Иванов И. И."));
        assert_eq!(event.interval, Some(2));

        let start = event.start.unwrap();
        assert_eq!(start.weekday(), Weekday::Mon);
        assert_eq!((start.hour(), start.minute()), (9, 0));

        let bare = &calendar.events[1];
        assert!(bare.location.is_none());
        assert!(bare.interval.is_none());
    }

    #[test]
    fn test_malformed_timestamp_fails() {
        let content = SAMPLE.replace("DTSTART:20220207T090000Z", "DTSTART:2022-02-07 09:00");
        let err = read_calendar(content.as_bytes()).unwrap_err();
        assert!(matches!(err, ImportError::InvalidTimestamp { property: "DTSTART", .. }));
    }

    #[test]
    fn test_parse_interval() {
        assert_eq!(parse_interval("FREQ=WEEKLY;INTERVAL=1"), Some(1));
        assert_eq!(parse_interval("FREQ=WEEKLY;INTERVAL=2;UNTIL=20220601T000000Z"), Some(2));
        assert_eq!(parse_interval("FREQ=WEEKLY"), None);
        assert_eq!(parse_interval("FREQ=WEEKLY;INTERVAL=x"), None);
    }

    #[test]
    fn test_event_property_names_round_trip() {
        for name in ["SUMMARY", "DTSTART", "DTEND", "RRULE", "LOCATION", "DESCRIPTION"] {
            let property = EventProperty::from_name(name).unwrap();
            assert_eq!(property.name(), name);
        }
        assert!(EventProperty::from_name("UID").is_none());
    }
}
