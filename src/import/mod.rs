//! Calendar import pipeline.
//!
//! One ICS file describes the weekly timetable of one student group. Importing
//! it classifies the events, resolves rooms, courses and the group to stored
//! ids, assigns each occurrence to a period and week parity, and writes the
//! resulting schedule rows.

pub mod classifier;
pub mod identity;
pub mod location;
pub mod parity;
pub mod period;

pub use classifier::{CalendarEvent, EventClassifier};
pub use identity::IdentityCache;
pub use location::{LocationResolver, RoomLabel};
pub use parity::{SlotEntry, SlotTable};
pub use period::classify_period;

use crate::calendar::{read_calendar_file, CalendarFile};
use crate::error::{EntityKind, ImportError, ImportResult};
use crate::models::{new_id, GroupLesson};
use crate::storage::ScheduleStorage;
use chrono::FixedOffset;
use log::{debug, error, info, warn};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use walkdir::WalkDir;

/// Calendar title prefix preceding the group name
pub const GROUP_PREFIX: &str = "Расписание ";

/// Extract the group name from a calendar title
pub fn group_name(calendar_name: Option<&str>) -> ImportResult<&str> {
    let title = calendar_name.unwrap_or_default();
    title
        .strip_prefix(GROUP_PREFIX)
        .filter(|name| !name.trim().is_empty())
        .ok_or_else(|| ImportError::InvalidGroupName(title.to_string()))
}

/// What one calendar file contributed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportReport {
    pub group: String,
    pub events_read: usize,
    pub events_accepted: usize,
    pub events_without_period: usize,
    pub entities_created: usize,
    pub lessons_linked: usize,
    pub schedules_written: usize,
}

/// Outcome of importing a directory of calendar files
#[derive(Debug, Default)]
pub struct DirectoryReport {
    pub imported: Vec<(PathBuf, ImportReport)>,
    pub failed: Vec<(PathBuf, ImportError)>,
    pub cancelled: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct ImportOptions {
    /// Fixed offset applied to stored start and end times
    pub offset: FixedOffset,
    /// Stop a directory import at the first failing file
    pub stop_on_error: bool,
}

impl ImportOptions {
    pub fn new(utc_offset_hours: i32) -> ImportResult<Self> {
        let offset = utc_offset_hours
            .checked_mul(3600)
            .and_then(FixedOffset::east_opt)
            .ok_or(ImportError::InvalidOffset(utc_offset_hours))?;
        Ok(Self { offset, stop_on_error: false })
    }
}

/// Drives calendar files through the pipeline into a storage backend
pub struct Importer<'a, S: ScheduleStorage + ?Sized> {
    storage: &'a mut S,
    classifier: EventClassifier,
    locations: LocationResolver,
    options: ImportOptions,
}

impl<'a, S: ScheduleStorage + ?Sized> Importer<'a, S> {
    pub fn new(storage: &'a mut S, options: ImportOptions) -> ImportResult<Self> {
        Ok(Self {
            storage,
            classifier: EventClassifier::new()?,
            locations: LocationResolver::new()?,
            options,
        })
    }

    /// Import one file and flush storage whether or not it succeeded
    pub fn import_file(&mut self, path: &Path) -> ImportResult<ImportReport> {
        let result = read_calendar_file(path).and_then(|calendar| self.import_calendar(calendar));
        let flushed = self.storage.flush().map_err(ImportError::Flush);
        let report = result?;
        flushed?;
        Ok(report)
    }

    pub fn import_calendar(&mut self, calendar: CalendarFile) -> ImportResult<ImportReport> {
        let group = group_name(calendar.name.as_deref())?.to_string();
        let mut cache = IdentityCache::new();
        let group_id = cache.resolve_group(&mut *self.storage, &group)?;

        let mut report = ImportReport {
            group: group.clone(),
            events_read: calendar.events.len(),
            ..ImportReport::default()
        };
        let mut lesson_ids = BTreeSet::new();
        let mut slots = SlotTable::new();

        for raw in calendar.events {
            let Some(event) = self.classifier.classify(raw) else {
                continue;
            };
            report.events_accepted += 1;

            let audience_id =
                cache.resolve_audience(&mut *self.storage, &self.locations, &event.location)?;
            let lesson_id =
                cache.resolve_lesson(&mut *self.storage, &event.name, event.teacher.as_deref())?;
            lesson_ids.insert(lesson_id.clone());

            let Some(period) = classify_period(&event.start, &event.end) else {
                warn!(
                    "Skipping '{}' at {} for group {}: {} - {} matches no class period",
                    event.name,
                    event.location,
                    group,
                    event.start.format("%a %H:%M"),
                    event.end.format("%H:%M")
                );
                report.events_without_period += 1;
                continue;
            };

            slots.push(SlotEntry {
                name: event.name,
                location: event.location,
                audience_id,
                lesson_id,
                period,
                start: event.start,
                end: event.end,
            });
        }

        // Resolve before writing so an inconsistent slot leaves no schedule rows
        let schedules = slots.resolve(self.options.offset)?;
        debug!("Group {}: {} slots, {} schedule rows", group, slots.len(), schedules.len());

        for lesson_id in lesson_ids {
            let link = GroupLesson { id: new_id(), group_id: group_id.clone(), lesson_id };
            self.storage
                .save_group_lesson(&link)
                .map_err(|e| ImportError::storage("save", EntityKind::GroupLesson, e))?;
            report.lessons_linked += 1;
        }

        self.storage
            .save_schedules(&schedules)
            .map_err(|e| ImportError::storage("save", EntityKind::Schedule, e))?;
        report.schedules_written = schedules.len();
        report.entities_created = cache.created();

        info!(
            "Imported group {}: {}/{} events, {} schedule rows",
            group, report.events_accepted, report.events_read, report.schedules_written
        );
        Ok(report)
    }

    /// Import every regular file directly inside `dir`, in name order.
    ///
    /// `cancel` is checked before each file. Failed files are logged and
    /// collected unless `stop_on_error` is set.
    pub fn import_dir(&mut self, dir: &Path, cancel: &AtomicBool) -> ImportResult<DirectoryReport> {
        let mut files = Vec::new();
        for entry in WalkDir::new(dir).min_depth(1).max_depth(1).sort_by_file_name() {
            let entry = entry.map_err(|e| ImportError::Read {
                path: dir.to_path_buf(),
                source: e.into(),
            })?;
            if entry.file_type().is_file() {
                files.push(entry.into_path());
            }
        }
        info!("Found {} calendar files in {}", files.len(), dir.display());

        let mut report = DirectoryReport::default();
        for path in files {
            if cancel.load(Ordering::SeqCst) {
                warn!("Import cancelled before {}", path.display());
                report.cancelled = true;
                break;
            }

            info!("Processing {}", path.display());
            match self.import_file(&path) {
                Ok(file_report) => report.imported.push((path, file_report)),
                Err(e) => {
                    error!("Failed to import {}: {}", path.display(), e);
                    report.failed.push((path, e));
                    if self.options.stop_on_error {
                        break;
                    }
                }
            }
        }

        Ok(report)
    }
}
