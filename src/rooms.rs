//! Free room lookup over imported schedules.

use crate::models::{Audience, Building, Period, WeekType};
use crate::storage::{ScheduleStorage, StorageResult};
use chrono::Weekday;
use std::collections::HashSet;

/// Slot to search, optionally narrowed to a building and floor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FreeAudienceFilter {
    pub week_day: Weekday,
    pub period: Period,
    pub week_type: WeekType,
    pub building: Option<Building>,
    pub floor: Option<u32>,
}

/// Audiences with no class in the given slot, sorted by building and number
pub fn free_audiences<S: ScheduleStorage + ?Sized>(
    storage: &S,
    filter: &FreeAudienceFilter,
) -> StorageResult<Vec<Audience>> {
    let busy: HashSet<String> = storage
        .list_schedules()?
        .into_iter()
        .filter(|s| {
            s.week_day == filter.week_day
                && s.period == filter.period
                && s.week_type == filter.week_type
        })
        .map(|s| s.audience_id)
        .collect();

    let mut free: Vec<Audience> = storage
        .list_audiences()?
        .into_iter()
        .filter(|a| filter.building.map_or(true, |b| a.building == b))
        .filter(|a| filter.floor.map_or(true, |f| a.floor == f))
        .filter(|a| !busy.contains(&a.id))
        .collect();

    free.sort_by(|a, b| {
        a.building
            .cmp(&b.building)
            .then_with(|| a.number.cmp(&b.number))
            .then_with(|| a.suffix.cmp(&b.suffix))
    });
    Ok(free)
}
