// ABOUTME: Parses a case detail page into a CaseRecord using the table locators.
// ABOUTME: Missing tables, header-only tables and short rows degrade to blank data instead of failing.

//! Detail-page table extraction.
//!
//! Key behaviors:
//! - The case-details table is read as caption/value cell pairs; a pair counts only when
//!   its first cell has the `caption` class. The caption's trailing colon is dropped.
//! - The four secondary tables skip their first (header) row and map each remaining row's
//!   cells positionally onto the row type. Missing cells are blank; extra cells are ignored.
//! - A secondary table that is absent, or has no data rows, yields exactly one placeholder row.
//! - Only rows and cells owned by the located table are read; nested tables are ignored.

use scraper::{ElementRef, Html, Node};

use crate::extractors::locators::{locate, TableRole};
use crate::extractors::selectors::get_or_compile;
use crate::record::{
    CaseDetails, CaseRecord, HearingDate, RelatedCase, SessionDetail, StatusEntry, TableRow,
};

const CAPTION_CLASS: &str = "caption";

/// Parses a detail page. Never fails; see the module docs for the degradation rules.
pub fn parse_detail_page(html: &str) -> CaseRecord {
    let doc = Html::parse_document(html);

    for role in TableRole::DETAIL_TABLES {
        if locate(&doc, role).is_none() {
            tracing::warn!(?role, "table not found on detail page, using blank data");
        }
    }

    CaseRecord {
        case_details: parse_case_details(locate(&doc, TableRole::CaseDetails)),
        related_cases: parse_rows::<RelatedCase>(locate(&doc, TableRole::RelatedCases)),
        hearing_dates: parse_rows::<HearingDate>(locate(&doc, TableRole::HearingDates)),
        status_history: parse_rows::<StatusEntry>(locate(&doc, TableRole::StatusHistory)),
        session_details: parse_rows::<SessionDetail>(locate(&doc, TableRole::SessionDetails)),
    }
}

fn parse_case_details(table: Option<ElementRef<'_>>) -> CaseDetails {
    let mut details = CaseDetails::new();
    let Some(table) = table else {
        return details;
    };

    for row in own_rows(table) {
        let cells = row_cells(row, &["td"]);
        for pair in cells.chunks(2) {
            let caption = pair[0];
            if !caption.value().classes().any(|c| c == CAPTION_CLASS) {
                continue;
            }
            let key = caption_key(&cell_text(caption));
            let value = pair.get(1).map(|cell| cell_text(*cell)).unwrap_or_default();
            details.insert(key, value);
        }
    }
    details
}

fn caption_key(text: &str) -> String {
    text.trim().trim_end_matches(':').trim_end().to_string()
}

fn parse_rows<R: TableRow>(table: Option<ElementRef<'_>>) -> Vec<R> {
    let rows = table.map(own_rows).unwrap_or_default();

    let parsed: Vec<R> = rows
        .iter()
        .skip(1)
        .filter_map(|row| {
            let cells: Vec<String> = row_cells(*row, &["td", "th"])
                .into_iter()
                .map(cell_text)
                .collect();
            (!cells.is_empty()).then(|| R::from_cells(&cells))
        })
        .collect();

    if parsed.is_empty() {
        vec![R::placeholder()]
    } else {
        parsed
    }
}

/// Rows belonging to `table` itself, excluding rows of nested tables.
pub(crate) fn own_rows(table: ElementRef<'_>) -> Vec<ElementRef<'_>> {
    let Some(tr) = get_or_compile("tr") else {
        return Vec::new();
    };
    table
        .select(&tr)
        .filter(|row| nearest_table(*row) == Some(table))
        .collect()
}

fn nearest_table(el: ElementRef<'_>) -> Option<ElementRef<'_>> {
    el.ancestors()
        .filter_map(ElementRef::wrap)
        .find(|a| a.value().name() == "table")
}

/// Direct child cells of `row` whose tag is one of `names`.
pub(crate) fn row_cells<'a>(row: ElementRef<'a>, names: &[&str]) -> Vec<ElementRef<'a>> {
    row.children()
        .filter_map(ElementRef::wrap)
        .filter(|cell| names.contains(&cell.value().name()))
        .collect()
}

/// Text of a cell with `<br>` read as a line break, trimmed at both ends.
pub(crate) fn cell_text(cell: ElementRef<'_>) -> String {
    let mut out = String::new();
    for node in cell.descendants() {
        match node.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(el) if el.name() == "br" => out.push('\n'),
            _ => {}
        }
    }
    out.trim().to_string()
}
