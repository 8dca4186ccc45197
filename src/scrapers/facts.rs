//! Mars facts table.
//!
//! The facts page is static HTML, so it is fetched without a browser. The
//! first table on the page holds one label column followed by one column per
//! planet; the first value column is Mars.

use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, instrument};

use super::{first_in_document_order, selector};
use crate::error::{ScrapeError, Stage};
use crate::models::FactsTable;
use crate::utils::normalize_ws;

static TABLE: Lazy<Selector> = Lazy::new(|| selector("table"));
static ROW: Lazy<Selector> = Lazy::new(|| selector("tr"));

fn is_cell(el: &ElementRef<'_>) -> bool {
    matches!(el.value().name(), "td" | "th")
}

/// True when the row sits in a `<thead>` or is made only of `<th>` cells.
fn is_header_row(row: &ElementRef<'_>, cells: &[ElementRef<'_>]) -> bool {
    let in_thead = row
        .ancestors()
        .filter_map(ElementRef::wrap)
        .any(|a| a.value().name() == "thead");
    in_thead || (!cells.is_empty() && cells.iter().all(|c| c.value().name() == "th"))
}

/// Text of a cell without the text of any table nested inside it.
fn cell_text(cell: &ElementRef<'_>) -> String {
    let text: String = cell
        .descendants()
        .filter(|node| {
            !node
                .ancestors()
                .take_while(|a| *a != **cell)
                .filter_map(ElementRef::wrap)
                .any(|a| a.value().name() == "table")
        })
        .filter_map(|node| node.value().as_text().map(|t| &**t))
        .collect();
    normalize_ws(&text)
}

/// Label and first value column of the first table on the page.
///
/// # Errors
///
/// [`ScrapeError::Structure`] if the page has no table, the table has no data
/// rows, or a data row has fewer than two cells.
#[instrument(level = "debug", skip_all)]
pub fn extract_facts(doc: &Html) -> Result<FactsTable, ScrapeError> {
    let table_count = doc.select(&TABLE).count();
    let table = first_in_document_order(doc.select(&TABLE))
        .ok_or_else(|| ScrapeError::structure(Stage::Facts, "no tables found on facts page"))?;

    let mut rows = Vec::new();
    for (index, row) in table.select(&ROW).enumerate() {
        // Rows of a nested table belong to that table.
        let owner = row
            .ancestors()
            .filter_map(ElementRef::wrap)
            .find(|a| a.value().name() == "table");
        if owner != Some(table) {
            continue;
        }

        let cells: Vec<ElementRef<'_>> = row
            .children()
            .filter_map(ElementRef::wrap)
            .filter(is_cell)
            .collect();
        if is_header_row(&row, &cells) {
            continue;
        }
        if cells.len() < 2 {
            return Err(ScrapeError::structure(
                Stage::Facts,
                format!(
                    "row {index} has {} cell(s), expected a label and a value",
                    cells.len()
                ),
            ));
        }
        rows.push((cell_text(&cells[0]), cell_text(&cells[1])));
    }

    if rows.is_empty() {
        return Err(ScrapeError::structure(
            Stage::Facts,
            "first table has no data rows",
        ));
    }

    debug!(tables = table_count, rows = rows.len(), "Extracted facts table");
    Ok(FactsTable { rows })
}
