pub mod calendar;
pub mod cli;
pub mod config;
pub mod error;
pub mod import;
pub mod models;
pub mod rooms;
pub mod storage;

// Re-export commonly used types
pub use config::Config;
pub use error::{ImportError, StorageError};
pub use import::{ImportOptions, ImportReport, Importer};
pub use models::{Audience, Building, Group, GroupLesson, Lesson, Period, Schedule, WeekType};
pub use storage::{JsonStorage, MemoryStorage, ScheduleStorage};
