//! Odd/even week assignment for occurrences sharing a weekday and period.
//!
//! A slot holding one weekly occurrence yields an odd and an even row for the
//! same class. A slot holding two occurrences is a pair of biweekly classes:
//! the one starting earlier in the term is on odd weeks. More than two
//! occurrences in one slot means the source calendar is inconsistent.

use crate::error::{ImportError, ImportResult};
use crate::models::{new_id, Period, Schedule, WeekType};
use chrono::{DateTime, Datelike, FixedOffset, Utc, Weekday};
use std::collections::BTreeMap;

use super::period::to_local;

/// A classified occurrence with its identities already resolved
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotEntry {
    pub name: String,
    pub location: String,
    pub audience_id: String,
    pub lesson_id: String,
    pub period: Period,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl SlotEntry {
    /// Weekday the occurrence falls on, taken from its UTC start
    pub fn weekday(&self) -> Weekday {
        self.start.weekday()
    }
}

/// Occurrences bucketed by (weekday, period), Monday first
#[derive(Debug, Default)]
pub struct SlotTable {
    slots: BTreeMap<(u32, Period), (Weekday, Vec<SlotEntry>)>,
}

impl SlotTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: SlotEntry) {
        let weekday = entry.weekday();
        self.slots
            .entry((weekday.num_days_from_monday(), entry.period))
            .or_insert_with(|| (weekday, Vec::new()))
            .1
            .push(entry);
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Resolve every slot. Nothing is returned unless all slots resolve.
    pub fn resolve(&self, offset: FixedOffset) -> ImportResult<Vec<Schedule>> {
        let mut schedules = Vec::with_capacity(self.slots.len() * 2);
        for (weekday, entries) in self.slots.values() {
            schedules.extend(resolve_slot(*weekday, entries, offset)?);
        }
        Ok(schedules)
    }
}

/// Assign week types to the occurrences of a single slot
pub fn resolve_slot(
    weekday: Weekday,
    entries: &[SlotEntry],
    offset: FixedOffset,
) -> ImportResult<Vec<Schedule>> {
    match entries {
        [] => Ok(Vec::new()),
        [only] => Ok(vec![
            build(weekday, only, WeekType::Odd, offset),
            build(weekday, only, WeekType::Even, offset),
        ]),
        [first, second] => {
            let (odd, even) = match first.start.cmp(&second.start) {
                std::cmp::Ordering::Less => (first, second),
                std::cmp::Ordering::Greater => (second, first),
                std::cmp::Ordering::Equal => {
                    return Err(ImportError::AmbiguousParity {
                        weekday,
                        period: first.period.get(),
                        start: first.start.to_rfc3339(),
                    });
                }
            };
            Ok(vec![
                build(weekday, odd, WeekType::Odd, offset),
                build(weekday, even, WeekType::Even, offset),
            ])
        }
        [first, ..] => Err(ImportError::OverfullSlot {
            weekday,
            period: first.period.get(),
            count: entries.len(),
            events: entries
                .iter()
                .map(|e| format!("{} @ {} ({})", e.name, e.location, e.start.to_rfc3339()))
                .collect::<Vec<_>>()
                .join("; "),
        }),
    }
}

fn build(weekday: Weekday, entry: &SlotEntry, week_type: WeekType, offset: FixedOffset) -> Schedule {
    Schedule {
        id: new_id(),
        audience_id: entry.audience_id.clone(),
        lesson_id: entry.lesson_id.clone(),
        week_type,
        week_day: weekday,
        start: to_local(&entry.start, offset),
        end: to_local(&entry.end, offset),
        period: entry.period,
    }
}
