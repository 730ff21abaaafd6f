//! Lookup-or-create of groups, audiences and lessons for one import run.

use super::location::LocationResolver;
use crate::error::{EntityKind, ImportError, ImportResult};
use crate::models::{new_id, Audience, Group, Lesson};
use crate::storage::ScheduleStorage;
use log::debug;
use std::collections::HashMap;

/// Natural key to id mappings scoped to a single calendar file.
///
/// A key is looked up in storage at most once per run; later sightings reuse
/// the cached id.
#[derive(Debug, Default)]
pub struct IdentityCache {
    group_id: Option<String>,
    audiences: HashMap<String, String>,
    lessons: HashMap<String, String>,
    created: usize,
}

impl IdentityCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn audience_id(&self, location: &str) -> Option<&str> {
        self.audiences.get(location).map(String::as_str)
    }

    /// Number of entities this run had to create
    pub fn created(&self) -> usize {
        self.created
    }

    pub fn resolve_group<S: ScheduleStorage + ?Sized>(
        &mut self,
        storage: &mut S,
        name: &str,
    ) -> ImportResult<String> {
        if let Some(id) = &self.group_id {
            return Ok(id.clone());
        }

        let existing = storage
            .find_group(name)
            .map_err(|e| ImportError::storage("find", EntityKind::Group, e))?;
        let id = match existing {
            Some(group) => group.id,
            None => {
                let group = Group { id: new_id(), name: name.to_string() };
                storage
                    .save_group(&group)
                    .map_err(|e| ImportError::storage("save", EntityKind::Group, e))?;
                debug!("Created group '{}'", name);
                self.created += 1;
                group.id
            }
        };

        self.group_id = Some(id.clone());
        Ok(id)
    }

    pub fn resolve_audience<S: ScheduleStorage + ?Sized>(
        &mut self,
        storage: &mut S,
        resolver: &LocationResolver,
        location: &str,
    ) -> ImportResult<String> {
        if let Some(id) = self.audiences.get(location) {
            return Ok(id.clone());
        }

        let (number, suffix) = resolver.split(location);
        let existing = storage
            .find_audience(number, suffix)
            .map_err(|e| ImportError::storage("find", EntityKind::Audience, e))?;
        let id = match existing {
            Some(audience) => audience.id,
            None => {
                let label = resolver.resolve(location)?;
                let audience = Audience {
                    id: new_id(),
                    number: label.number,
                    building: label.building,
                    floor: label.floor,
                    suffix: label.suffix,
                };
                storage
                    .save_audience(&audience)
                    .map_err(|e| ImportError::storage("save", EntityKind::Audience, e))?;
                debug!("Created audience {} ({})", location, audience.building);
                self.created += 1;
                audience.id
            }
        };

        self.audiences.insert(location.to_string(), id.clone());
        Ok(id)
    }

    pub fn resolve_lesson<S: ScheduleStorage + ?Sized>(
        &mut self,
        storage: &mut S,
        name: &str,
        teacher: Option<&str>,
    ) -> ImportResult<String> {
        if let Some(id) = self.lessons.get(name) {
            return Ok(id.clone());
        }

        let existing = storage
            .find_lesson(name)
            .map_err(|e| ImportError::storage("find", EntityKind::Lesson, e))?;
        let id = match existing {
            Some(lesson) => lesson.id,
            None => {
                let lesson = Lesson {
                    id: new_id(),
                    name: name.to_string(),
                    teacher_name: teacher.map(str::to_string),
                    kind: None,
                };
                storage
                    .save_lesson(&lesson)
                    .map_err(|e| ImportError::storage("save", EntityKind::Lesson, e))?;
                debug!("Created lesson '{}'", name);
                self.created += 1;
                lesson.id
            }
        };

        self.lessons.insert(name.to_string(), id.clone());
        Ok(id)
    }
}
