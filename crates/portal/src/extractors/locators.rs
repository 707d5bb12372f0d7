// ABOUTME: The one place that says where each portal table lives: CSS selector plus ordinal.
// ABOUTME: The portal has no stable table ids, so a markup change means editing this mapping only.

use scraper::{ElementRef, Html};

use crate::extractors::selectors::get_or_compile;

/// What a table on a portal page holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TableRole {
    /// Caption/value pairs describing the case.
    CaseDetails,
    RelatedCases,
    HearingDates,
    StatusHistory,
    SessionDetails,
    /// The table listing matches on the search response.
    SearchResults,
    /// Case-type counts on the portal's index page.
    DailyStatus,
}

/// Finds the `index`-th element (0-based, document order) matching `selector`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Locator {
    pub selector: &'static str,
    pub index: usize,
}

impl TableRole {
    /// Detail-page roles in page order.
    pub const DETAIL_TABLES: [TableRole; 5] = [
        TableRole::CaseDetails,
        TableRole::RelatedCases,
        TableRole::HearingDates,
        TableRole::StatusHistory,
        TableRole::SessionDetails,
    ];

    pub const fn locator(self) -> Locator {
        match self {
            TableRole::CaseDetails => Locator { selector: "table.table-hover", index: 0 },
            TableRole::RelatedCases => Locator { selector: "table.table-bordered", index: 0 },
            TableRole::HearingDates => Locator { selector: "table.table-bordered", index: 1 },
            TableRole::StatusHistory => Locator { selector: "table.table-bordered", index: 2 },
            TableRole::SessionDetails => Locator { selector: "table.table-bordered", index: 3 },
            TableRole::SearchResults => Locator { selector: "table.table", index: 0 },
            TableRole::DailyStatus => Locator { selector: "table[width=\"100%\"]", index: 0 },
        }
    }
}

/// Returns the table for `role`, or `None` when the page does not have it.
pub fn locate<'a>(doc: &'a Html, role: TableRole) -> Option<ElementRef<'a>> {
    let Locator { selector, index } = role.locator();
    let selector = get_or_compile(selector)?;
    doc.select(&selector).nth(index)
}
