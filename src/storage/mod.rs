//! Storage contract for imported schedules, plus an in-memory backend.
//!
//! Saves follow insert-or-ignore semantics: writing a record whose natural key
//! already exists is a no-op, never an error.

mod json_store;

pub use json_store::JsonStorage;

use crate::error::StorageError;
use crate::models::{Audience, Group, GroupLesson, Lesson, Schedule};
use serde::{Deserialize, Serialize};

pub type StorageResult<T> = std::result::Result<T, StorageError>;

pub trait ScheduleStorage {
    fn find_group(&self, name: &str) -> StorageResult<Option<Group>>;
    fn save_group(&mut self, group: &Group) -> StorageResult<()>;

    fn find_audience(&self, number: &str, suffix: Option<&str>) -> StorageResult<Option<Audience>>;
    fn save_audience(&mut self, audience: &Audience) -> StorageResult<()>;
    fn list_audiences(&self) -> StorageResult<Vec<Audience>>;

    fn find_lesson(&self, name: &str) -> StorageResult<Option<Lesson>>;
    fn save_lesson(&mut self, lesson: &Lesson) -> StorageResult<()>;

    fn save_group_lesson(&mut self, group_lesson: &GroupLesson) -> StorageResult<()>;

    fn save_schedules(&mut self, schedules: &[Schedule]) -> StorageResult<()>;
    fn list_schedules(&self) -> StorageResult<Vec<Schedule>>;

    /// Make previous writes durable
    fn flush(&mut self) -> StorageResult<()> {
        Ok(())
    }
}

/// All imported records, kept in memory
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryStorage {
    #[serde(default)]
    pub groups: Vec<Group>,
    #[serde(default)]
    pub audiences: Vec<Audience>,
    #[serde(default)]
    pub lessons: Vec<Lesson>,
    #[serde(default)]
    pub group_lessons: Vec<GroupLesson>,
    #[serde(default)]
    pub schedules: Vec<Schedule>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ScheduleStorage for MemoryStorage {
    fn find_group(&self, name: &str) -> StorageResult<Option<Group>> {
        Ok(self.groups.iter().find(|g| g.name == name).cloned())
    }

    fn save_group(&mut self, group: &Group) -> StorageResult<()> {
        if self.groups.iter().all(|g| g.name != group.name) {
            self.groups.push(group.clone());
        }
        Ok(())
    }

    fn find_audience(&self, number: &str, suffix: Option<&str>) -> StorageResult<Option<Audience>> {
        Ok(self
            .audiences
            .iter()
            .find(|a| a.number == number && a.suffix.as_deref() == suffix)
            .cloned())
    }

    fn save_audience(&mut self, audience: &Audience) -> StorageResult<()> {
        let exists = self
            .audiences
            .iter()
            .any(|a| a.number == audience.number && a.suffix == audience.suffix);
        if !exists {
            self.audiences.push(audience.clone());
        }
        Ok(())
    }

    fn list_audiences(&self) -> StorageResult<Vec<Audience>> {
        Ok(self.audiences.clone())
    }

    fn find_lesson(&self, name: &str) -> StorageResult<Option<Lesson>> {
        Ok(self.lessons.iter().find(|l| l.name == name).cloned())
    }

    fn save_lesson(&mut self, lesson: &Lesson) -> StorageResult<()> {
        if self.lessons.iter().all(|l| l.name != lesson.name) {
            self.lessons.push(lesson.clone());
        }
        Ok(())
    }

    fn save_group_lesson(&mut self, group_lesson: &GroupLesson) -> StorageResult<()> {
        let exists = self.group_lessons.iter().any(|gl| {
            gl.group_id == group_lesson.group_id && gl.lesson_id == group_lesson.lesson_id
        });
        if !exists {
            self.group_lessons.push(group_lesson.clone());
        }
        Ok(())
    }

    fn save_schedules(&mut self, schedules: &[Schedule]) -> StorageResult<()> {
        for schedule in schedules {
            let key = schedule.natural_key();
            if self.schedules.iter().all(|s| s.natural_key() != key) {
                self.schedules.push(schedule.clone());
            }
        }
        Ok(())
    }

    fn list_schedules(&self) -> StorageResult<Vec<Schedule>> {
        Ok(self.schedules.clone())
    }
}
