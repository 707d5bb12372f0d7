// ABOUTME: Reads the case search response: whether records were found and where the detail page is.
// ABOUTME: The detail link is the labelled anchor in any table cell, else the first row's anchor in the results table.

use scraper::{ElementRef, Html};

use crate::extractors::locators::{locate, TableRole};
use crate::extractors::selectors::get_or_compile;
use crate::extractors::tables::{own_rows, row_cells};
use crate::options::DETAIL_LINK_TEXT;

/// True when `marker` occurs in the search response. An empty marker never matches.
pub fn has_records(html: &str, marker: &str) -> bool {
    !marker.is_empty() && html.contains(marker)
}

/// Returns the raw `href` of the case detail link.
///
/// The first anchor inside a `td` whose text contains the detail-link label wins, wherever
/// its table sits on the page. Without one, the first anchor in the first data row of the
/// search results table is used.
pub fn find_detail_link(html: &str) -> Option<String> {
    let doc = Html::parse_document(html);
    let anchor_sel = get_or_compile("td a[href]")?;

    let labelled = doc
        .select(&anchor_sel)
        .filter(|a| a.text().collect::<String>().contains(DETAIL_LINK_TEXT))
        .find_map(href);
    if labelled.is_some() {
        return labelled;
    }

    let table = locate(&doc, TableRole::SearchResults)?;
    let row = own_rows(table)
        .into_iter()
        .find(|row| !row_cells(*row, &["td"]).is_empty())?;
    tracing::debug!("no labelled detail link, using the first result row");
    row.select(&get_or_compile("a[href]")?).next().and_then(href)
}

fn href(anchor: ElementRef<'_>) -> Option<String> {
    anchor
        .value()
        .attr("href")
        .map(str::trim)
        .filter(|href| !href.is_empty())
        .map(str::to_string)
}
