// ABOUTME: Case-number validation and CSV column input.
// ABOUTME: Case numbers look like `080-CR-0096`; malformed entries are logged and skipped.

use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::StoreError;

static CASE_NUMBER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]{3}-[A-Z]{2}-[0-9]{4}$").expect("valid case number regex"));

/// Returns true for `NNN-XX-NNNN` (three digits, two capitals, four digits).
pub fn is_valid_case_number(s: &str) -> bool {
    CASE_NUMBER_RE.is_match(s)
}

/// Reads case numbers from the named column of a CSV file with a header row.
///
/// Values are trimmed; blank cells are ignored and malformed case numbers are skipped
/// with a warning. A missing column is an error.
pub fn read_case_column(path: &Path, column: &str) -> Result<Vec<String>, StoreError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .map_err(|e| StoreError::csv(path, e))?;

    let headers = reader.headers().map_err(|e| StoreError::csv(path, e))?;
    let index = headers
        .iter()
        .position(|h| h.trim() == column)
        .ok_or_else(|| StoreError::invalid(path, format!("no column named {:?}", column)))?;

    let mut cases = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| StoreError::csv(path, e))?;
        let Some(value) = record.get(index).map(str::trim) else {
            continue;
        };
        if value.is_empty() {
            continue;
        }
        if is_valid_case_number(value) {
            cases.push(value.to_string());
        } else {
            tracing::warn!(case_number = value, "skipping malformed case number");
        }
    }
    Ok(cases)
}
