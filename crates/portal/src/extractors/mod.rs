// ABOUTME: Table extraction for portal pages: detail-page tables, search results and status counts.
// ABOUTME: Every table is found through the role-to-locator mapping in `locators`.

//! Extraction module.
//!
//! Submodules:
//! - `locators`: the single mapping from table role to CSS selector and ordinal.
//! - `selectors`: cache of compiled CSS selectors.
//! - `tables`: detail-page parsing into a `CaseRecord`.
//! - `search`: records-found check and detail-link lookup on the search response.
//! - `status`: the daily case-status counts table.

pub mod locators;
pub mod search;
pub mod selectors;
pub mod status;
pub mod tables;
