// ABOUTME: JSON case store keyed by case number, loaded, merged and written wholesale.
// ABOUTME: Writes pretty-printed UTF-8 with 4-space indent through an atomic temp-file rename.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::{Map, Value};

use crate::atomic::write_atomic;
use crate::error::StoreError;

/// Counts of what a merge did to the store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeSummary {
    /// Case numbers that were not in the store before.
    pub inserted: usize,
    /// Case numbers whose previous record was replaced.
    pub replaced: usize,
    /// Total case numbers in the store after the merge.
    pub total: usize,
}

/// Handle to the persisted case store file.
#[derive(Debug, Clone)]
pub struct Store {
    path: PathBuf,
}

impl Store {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the whole mapping. A missing or blank file yields an empty mapping.
    pub fn load(&self) -> Result<Map<String, Value>, StoreError> {
        if !self.path.exists() {
            return Ok(Map::new());
        }

        let content = fs::read_to_string(&self.path).map_err(|e| StoreError::io(&self.path, e))?;
        if content.trim().is_empty() {
            return Ok(Map::new());
        }

        match serde_json::from_str(&content).map_err(|e| StoreError::json(&self.path, e))? {
            Value::Object(map) => Ok(map),
            _ => Err(StoreError::invalid(
                &self.path,
                "top-level value is not an object",
            )),
        }
    }

    /// Writes the whole mapping, replacing the file atomically.
    pub fn save(&self, data: &Map<String, Value>) -> Result<(), StoreError> {
        let bytes = to_pretty_json(data).map_err(|e| StoreError::json(&self.path, e))?;
        write_atomic(&self.path, &bytes)
    }

    /// Overlays `batch` onto the stored mapping and writes it back.
    ///
    /// Each batch entry fully replaces the record for its case number; case numbers not in
    /// the batch are written back unchanged.
    pub fn merge<I, V>(&self, batch: I) -> Result<MergeSummary, StoreError>
    where
        I: IntoIterator<Item = (String, V)>,
        V: Into<Value>,
    {
        let mut data = self.load()?;
        let mut summary = MergeSummary::default();

        for (case_number, record) in batch {
            if data.insert(case_number, record.into()).is_some() {
                summary.replaced += 1;
            } else {
                summary.inserted += 1;
            }
        }
        summary.total = data.len();

        self.save(&data)?;
        tracing::debug!(
            path = %self.path.display(),
            inserted = summary.inserted,
            replaced = summary.replaced,
            "store written"
        );
        Ok(summary)
    }
}

/// Convenience wrapper for [`Store::merge`].
pub fn merge<I, V>(path: impl Into<PathBuf>, batch: I) -> Result<MergeSummary, StoreError>
where
    I: IntoIterator<Item = (String, V)>,
    V: Into<Value>,
{
    Store::new(path).merge(batch)
}

/// Serializes with a 4-space indent, leaving non-ASCII text unescaped.
pub fn to_pretty_json<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, serde_json::Error> {
    let mut buf = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut ser)?;
    Ok(buf)
}
