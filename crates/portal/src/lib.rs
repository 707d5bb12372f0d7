// ABOUTME: Library entry point for the judiciary portal client and page extractors.
// ABOUTME: Re-exports the public API: Client, Session, ClientBuilder, Options, CaseRecord, PortalError.

//! nyaya-portal - fetches case records from the Supreme Court portal.
//!
//! A [`Client`] opens a [`Session`] per run. The session submits each case number
//! to the search form, follows the detail link, and extracts the detail page's
//! tables into a [`CaseRecord`].
//!
//! # Example
//!
//! ```no_run
//! use nyaya_portal::{Client, PortalError};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), PortalError> {
//!     let client = Client::builder().build();
//!     let session = client.open_session()?;
//!     if let Some(record) = session.fetch_record("080-CR-0096").await? {
//!         println!("{}", record.case_details.len());
//!     }
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod error;
pub mod extractors;
pub mod options;
pub mod record;
pub mod resource;

pub use crate::client::{Client, Session};
pub use crate::error::{ErrorCode, PortalError};
pub use crate::extractors::locators::{locate, Locator, TableRole};
pub use crate::extractors::status::parse_status_counts;
pub use crate::extractors::tables::parse_detail_page;
pub use crate::options::{
    ClientBuilder, Options, DEFAULT_BASE_URL, DEFAULT_CASE_DETAILS_PATH, DEFAULT_STATUS_URL,
    DETAIL_LINK_TEXT,
};
pub use crate::record::{
    CaseDetails, CaseRecord, HearingDate, RelatedCase, SessionDetail, StatusEntry, TableRow,
    BLANK,
};
