//! Room label parsing: `325л` becomes number 325, suffix л, УЛК, floor 3.

use crate::error::{EntityKind, ImportError, ImportResult};
use crate::models::Building;
use regex::Regex;

/// Structured form of a room label
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomLabel {
    pub number: String,
    pub suffix: Option<String>,
    pub building: Building,
    pub floor: u32,
}

pub struct LocationResolver {
    suffix: Regex,
}

impl LocationResolver {
    pub fn new() -> ImportResult<Self> {
        Ok(Self { suffix: Regex::new(r"[а-яА-Я]+")? })
    }

    /// Split a label on its first run of Cyrillic letters
    pub fn split<'a>(&self, location: &'a str) -> (&'a str, Option<&'a str>) {
        match self.suffix.find(location) {
            Some(m) => (&location[..m.start()], Some(m.as_str())),
            None => (location, None),
        }
    }

    pub fn resolve(&self, location: &str) -> ImportResult<RoomLabel> {
        let (number, suffix) = self.split(location);
        let building = building_for(suffix)?;
        let floor = floor_of(number)?;

        Ok(RoomLabel {
            number: number.to_string(),
            suffix: suffix.map(str::to_string),
            building,
            floor,
        })
    }
}

/// Map a room suffix to its building. No suffix means the main building.
pub fn building_for(suffix: Option<&str>) -> ImportResult<Building> {
    match suffix {
        None => Ok(Building::Gz),
        Some("л" | "а" | "б") => Ok(Building::Ulk),
        Some("ю" | "аю") => Ok(Building::Gz),
        Some(other) => Err(ImportError::UnknownSuffix(other.to_string())),
    }
}

/// The floor is the first digit of the room number
pub fn floor_of(number: &str) -> ImportResult<u32> {
    let first = number
        .chars()
        .next()
        .ok_or_else(|| ImportError::validation(EntityKind::Audience, "empty audience number"))?;

    first.to_digit(10).ok_or_else(|| {
        ImportError::validation(
            EntityKind::Audience,
            format!("invalid audience number '{}'", number),
        )
    })
}
