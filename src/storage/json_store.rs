use super::{MemoryStorage, ScheduleStorage, StorageResult};
use crate::error::StorageError;
use crate::models::{Audience, Group, GroupLesson, Lesson, Schedule};
use log::{debug, info};
use std::fs::{File, OpenOptions};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

// Maximum allowed size for the storage document (64MB)
const MAX_FILE_SIZE: u64 = 64 * 1024 * 1024;

/// Storage backed by a single JSON document on disk.
///
/// Records live in memory and are written out on `flush`, which the importer
/// calls once per calendar file.
pub struct JsonStorage {
    path: PathBuf,
    data: MemoryStorage,
    dirty: bool,
}

impl JsonStorage {
    /// Open the document at `path`, starting empty if it does not exist yet
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let path = path.as_ref().to_path_buf();
        let data = if path.exists() { load(&path)? } else { MemoryStorage::new() };

        info!(
            "Opened schedule storage {} ({} groups, {} audiences, {} schedules)",
            path.display(),
            data.groups.len(),
            data.audiences.len(),
            data.schedules.len()
        );
        Ok(Self { path, data, dirty: false })
    }

    pub fn data(&self) -> &MemoryStorage {
        &self.data
    }

    fn io_error(&self, source: std::io::Error) -> StorageError {
        StorageError::Io { path: self.path.clone(), source }
    }
}

fn load(path: &Path) -> StorageResult<MemoryStorage> {
    let io_error = |source| StorageError::Io { path: path.to_path_buf(), source };

    // Check file size before loading
    let size = std::fs::metadata(path).map_err(io_error)?.len();
    if size > MAX_FILE_SIZE {
        return Err(StorageError::TooLarge { path: path.to_path_buf(), size, limit: MAX_FILE_SIZE });
    }

    let reader = BufReader::new(File::open(path).map_err(io_error)?);
    serde_json::from_reader(reader)
        .map_err(|source| StorageError::Malformed { path: path.to_path_buf(), source })
}

impl ScheduleStorage for JsonStorage {
    fn find_group(&self, name: &str) -> StorageResult<Option<Group>> {
        self.data.find_group(name)
    }

    fn save_group(&mut self, group: &Group) -> StorageResult<()> {
        self.dirty = true;
        self.data.save_group(group)
    }

    fn find_audience(&self, number: &str, suffix: Option<&str>) -> StorageResult<Option<Audience>> {
        self.data.find_audience(number, suffix)
    }

    fn save_audience(&mut self, audience: &Audience) -> StorageResult<()> {
        self.dirty = true;
        self.data.save_audience(audience)
    }

    fn list_audiences(&self) -> StorageResult<Vec<Audience>> {
        self.data.list_audiences()
    }

    fn find_lesson(&self, name: &str) -> StorageResult<Option<Lesson>> {
        self.data.find_lesson(name)
    }

    fn save_lesson(&mut self, lesson: &Lesson) -> StorageResult<()> {
        self.dirty = true;
        self.data.save_lesson(lesson)
    }

    fn save_group_lesson(&mut self, group_lesson: &GroupLesson) -> StorageResult<()> {
        self.dirty = true;
        self.data.save_group_lesson(group_lesson)
    }

    fn save_schedules(&mut self, schedules: &[Schedule]) -> StorageResult<()> {
        self.dirty = true;
        self.data.save_schedules(schedules)
    }

    fn list_schedules(&self) -> StorageResult<Vec<Schedule>> {
        self.data.list_schedules()
    }

    fn flush(&mut self) -> StorageResult<()> {
        if !self.dirty {
            return Ok(());
        }

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }

        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&self.path)
            .map_err(|e| self.io_error(e))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, &self.data)
            .map_err(|source| StorageError::Malformed { path: self.path.clone(), source })?;
        writer.flush().map_err(|e| self.io_error(e))?;

        debug!("Flushed schedule storage to {}", self.path.display());
        self.dirty = false;
        Ok(())
    }
}
