// ABOUTME: Extracts daily case-status counts from the portal index page.
// ABOUTME: Two-cell rows become (case type, count); rows whose count is not a number are skipped.

use nyaya_records::{clean_string, parse_number, StatusCount};
use scraper::Html;

use crate::extractors::locators::{locate, TableRole};
use crate::extractors::tables::{cell_text, own_rows, row_cells};

/// Reads the counts table. A page without the table yields no counts.
pub fn parse_status_counts(html: &str) -> Vec<StatusCount> {
    let doc = Html::parse_document(html);
    let Some(table) = locate(&doc, TableRole::DailyStatus) else {
        tracing::warn!("daily status table not found");
        return Vec::new();
    };

    own_rows(table)
        .into_iter()
        .filter_map(|row| {
            let cells = row_cells(row, &["th", "td"]);
            if cells.len() != 2 {
                return None;
            }
            let label = clean_string(&cell_text(cells[0]));
            let raw_count = cell_text(cells[1]);
            match parse_number(&raw_count).and_then(|n| i64::try_from(n).ok()) {
                Some(count) if !label.is_empty() => Some(StatusCount::new(label, count)),
                _ => {
                    tracing::debug!(label = %label, raw_count = %raw_count, "skipping status row without a count");
                    None
                }
            }
        })
        .collect()
}
