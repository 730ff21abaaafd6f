//! Records produced by the import pipeline and handed to storage.

use chrono::{NaiveDateTime, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Generate a fresh record id
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// University building an audience belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Building {
    /// Educational-laboratory building
    #[serde(rename = "УЛК")]
    Ulk,
    /// Main building
    #[serde(rename = "ГЗ")]
    Gz,
}

impl Building {
    pub fn as_str(&self) -> &'static str {
        match self {
            Building::Ulk => "УЛК",
            Building::Gz => "ГЗ",
        }
    }
}

impl fmt::Display for Building {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl std::str::FromStr for Building {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "улк" | "ulk" => Ok(Building::Ulk),
            "гз" | "gz" => Ok(Building::Gz),
            other => Err(format!("unknown building: {}", other)),
        }
    }
}

/// Week parity of a biweekly class: numerator (odd) or denominator (even) week
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeekType {
    Odd,
    Even,
}

impl WeekType {
    /// Short label used in printed timetables
    pub fn label(&self) -> &'static str {
        match self {
            WeekType::Odd => "ЧС",
            WeekType::Even => "ЗН",
        }
    }
}

impl fmt::Display for WeekType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.label())
    }
}

impl std::str::FromStr for WeekType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "odd" | "чс" => Ok(WeekType::Odd),
            "even" | "зн" => Ok(WeekType::Even),
            other => Err(format!("unknown week type: {}", other)),
        }
    }
}

/// One of the seven daily class periods, 1 through 7
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Period(u8);

impl Period {
    pub const COUNT: u8 = 7;

    pub fn new(value: u8) -> Option<Self> {
        (1..=Self::COUNT).contains(&value).then_some(Period(value))
    }

    pub fn get(&self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for Period {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Period::new(value).ok_or_else(|| format!("period out of range: {}", value))
    }
}

impl From<Period> for u8 {
    fn from(period: Period) -> Self {
        period.0
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Audience {
    pub id: String,
    pub number: String,
    pub building: Building,
    pub floor: u32,
    pub suffix: Option<String>,
}

impl Audience {
    /// Room label as printed on the door, e.g. `325л`
    pub fn label(&self) -> String {
        format!("{}{}", self.number, self.suffix.as_deref().unwrap_or_default())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lesson {
    pub id: String,
    pub name: String,
    pub teacher_name: Option<String>,
    pub kind: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupLesson {
    pub id: String,
    pub group_id: String,
    pub lesson_id: String,
}

/// A class occurrence pinned to a weekday, period and week parity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    pub id: String,
    pub audience_id: String,
    pub lesson_id: String,
    pub week_type: WeekType,
    pub week_day: Weekday,
    /// Local wall-clock start
    pub start: NaiveDateTime,
    /// Local wall-clock end
    pub end: NaiveDateTime,
    pub period: Period,
}

impl Schedule {
    /// Fields the storage uniqueness constraint is built on
    pub fn natural_key(&self) -> (&str, &str, WeekType, u32, Period) {
        (
            self.audience_id.as_str(),
            self.lesson_id.as_str(),
            self.week_type,
            self.week_day.num_days_from_monday(),
            self.period,
        )
    }
}
