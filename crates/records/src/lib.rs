// ABOUTME: Record-side library for nyaya: tree model, cleaning, date normalization and persistence.
// ABOUTME: Provides the StringCleaner, DateNormalizer, StoreMerger and status counts table.

pub mod atomic;
pub mod bs_date;
pub mod case_numbers;
pub mod clean;
pub mod error;
pub mod status_table;
pub mod store;
pub mod tree;

pub use bs_date::{
    convert_date, normalize_dates, parse_number, to_devanagari_digits, BsDate, DATE_FIELDS,
};
pub use case_numbers::{is_valid_case_number, read_case_column};
pub use clean::{clean, clean_string};
pub use error::{DateError, StoreError};
pub use status_table::{StatusCount, StatusTable, UpsertSummary};
pub use store::{merge, to_pretty_json, MergeSummary, Store};
pub use tree::{Scalar, Tree};

/// Runs the full normalization pass over a tree: whitespace cleaning, then date conversion.
pub fn normalize(tree: &Tree) -> Tree {
    normalize_dates(&clean(tree))
}
