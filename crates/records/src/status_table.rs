// ABOUTME: Daily case-status counts table persisted as CSV with `Case Type,Count` columns.
// ABOUTME: Updates counts for known case types in place and appends new case types at the end.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::atomic::write_atomic;
use crate::error::StoreError;

const HEADER: [&str; 2] = ["Case Type", "Count"];

/// One row of the counts table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCount {
    #[serde(rename = "Case Type")]
    pub case_type: String,
    #[serde(rename = "Count")]
    pub count: i64,
}

impl StatusCount {
    pub fn new(case_type: impl Into<String>, count: i64) -> Self {
        Self {
            case_type: case_type.into(),
            count,
        }
    }
}

/// What an upsert changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpsertSummary {
    pub updated: usize,
    pub appended: usize,
}

/// The counts table, kept in file order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusTable {
    rows: Vec<StatusCount>,
}

impl StatusTable {
    pub fn rows(&self) -> &[StatusCount] {
        &self.rows
    }

    pub fn get(&self, case_type: &str) -> Option<i64> {
        self.rows
            .iter()
            .find(|r| r.case_type == case_type)
            .map(|r| r.count)
    }

    /// Reads the table from `path`; a missing file is an empty table.
    pub fn load(path: &Path) -> Result<Self, StoreError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let mut reader = csv::Reader::from_path(path).map_err(|e| StoreError::csv(path, e))?;
        let rows = reader
            .deserialize()
            .collect::<Result<Vec<StatusCount>, _>>()
            .map_err(|e| StoreError::csv(path, e))?;
        Ok(Self { rows })
    }

    /// Sets the count of each known case type and appends unknown ones in input order.
    pub fn upsert(&mut self, counts: &[StatusCount]) -> UpsertSummary {
        let mut summary = UpsertSummary::default();
        for count in counts {
            match self.rows.iter_mut().find(|r| r.case_type == count.case_type) {
                Some(row) => {
                    row.count = count.count;
                    summary.updated += 1;
                }
                None => {
                    self.rows.push(count.clone());
                    summary.appended += 1;
                }
            }
        }
        summary
    }

    /// Writes the table, header first, replacing `path` atomically.
    pub fn save(&self, path: &Path) -> Result<(), StoreError> {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(Vec::new());
        writer
            .write_record(HEADER)
            .map_err(|e| StoreError::csv(path, e))?;
        for row in &self.rows {
            writer.serialize(row).map_err(|e| StoreError::csv(path, e))?;
        }
        let bytes = writer
            .into_inner()
            .map_err(|e| StoreError::io(path, e.into_error()))?;
        write_atomic(path, &bytes)
    }

    /// Loads the table at `path`, applies `counts` and writes it back.
    pub fn merge_counts(path: &Path, counts: &[StatusCount]) -> Result<UpsertSummary, StoreError> {
        let mut table = Self::load(path)?;
        let summary = table.upsert(counts);
        table.save(path)?;
        Ok(summary)
    }
}
