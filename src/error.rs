//! Error types for the import pipeline and its storage backends

use chrono::Weekday;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Entity touched by a storage call, used to label storage failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Group,
    Audience,
    Lesson,
    GroupLesson,
    Schedule,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntityKind::Group => "group",
            EntityKind::Audience => "audience",
            EntityKind::Lesson => "lesson",
            EntityKind::GroupLesson => "group_lesson",
            EntityKind::Schedule => "schedule",
        };
        f.write_str(name)
    }
}

/// Failure reported by a storage backend
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Malformed storage document {path}: {source}")]
    Malformed {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("Storage document {path} is {size} bytes, limit is {limit}")]
    TooLarge { path: PathBuf, size: u64, limit: u64 },
}

/// Errors that abort the import of a single calendar file
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Failed to read calendar file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid calendar format: {0}")]
    InvalidFormat(String),

    #[error("Invalid {property} timestamp '{value}', expected YYYYMMDDThhmmssZ")]
    InvalidTimestamp { property: &'static str, value: String },

    #[error("UTC offset out of range: {0}h")]
    InvalidOffset(i32),

    #[error("Invalid group name: '{0}'")]
    InvalidGroupName(String),

    #[error("Failed to validate {kind}: {message}")]
    Validation { kind: EntityKind, message: String },

    #[error("Unknown building suffix: '{0}'")]
    UnknownSuffix(String),

    #[error("{count} occurrences claim slot {weekday} period {period}: {events}")]
    OverfullSlot {
        weekday: Weekday,
        period: u8,
        count: usize,
        events: String,
    },

    #[error("Cannot order biweekly occurrences in slot {weekday} period {period}: both start at {start}")]
    AmbiguousParity {
        weekday: Weekday,
        period: u8,
        start: String,
    },

    #[error("Cannot {operation} {entity}: {source}")]
    Storage {
        operation: &'static str,
        entity: EntityKind,
        #[source]
        source: StorageError,
    },

    #[error("Failed to flush storage: {0}")]
    Flush(#[source] StorageError),

    #[error("Invalid pattern: {0}")]
    Pattern(#[from] regex::Error),
}

impl ImportError {
    pub fn validation(kind: EntityKind, message: impl Into<String>) -> Self {
        Self::Validation { kind, message: message.into() }
    }

    pub fn storage(operation: &'static str, entity: EntityKind, source: StorageError) -> Self {
        Self::Storage { operation, entity, source }
    }
}

/// Result alias used across the import pipeline
pub type ImportResult<T> = std::result::Result<T, ImportError>;
