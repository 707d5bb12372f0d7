// ABOUTME: Error types for record persistence and Bikram-Sambat date parsing.
// ABOUTME: Provides StoreError for store/CSV I/O and DateError for rejected date strings.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while loading or writing persisted files.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Reading, writing or renaming a file failed.
    #[error("i/o error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The store file is not valid JSON.
    #[error("malformed store {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A CSV file could not be read or written.
    #[error("csv error on {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// The file parsed but does not have the expected shape.
    #[error("invalid store {path}: {reason}")]
    Invalid { path: PathBuf, reason: String },
}

impl StoreError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StoreError::Io {
            path: path.into(),
            source,
        }
    }

    pub fn json(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        StoreError::Json {
            path: path.into(),
            source,
        }
    }

    pub fn csv(path: impl Into<PathBuf>, source: csv::Error) -> Self {
        StoreError::Csv {
            path: path.into(),
            source,
        }
    }

    pub fn invalid(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        StoreError::Invalid {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

/// Reasons a delimited Bikram-Sambat date string is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DateError {
    #[error("expected 3 date components, found {0}")]
    ComponentCount(usize),

    #[error("date component {0:?} is not a number")]
    NotNumeric(String),

    #[error("year {0} is outside the supported range")]
    Year(u32),

    #[error("month {0} is out of range")]
    Month(u32),

    #[error("day {day} is out of range for month {month}")]
    Day { month: u32, day: u32 },
}
