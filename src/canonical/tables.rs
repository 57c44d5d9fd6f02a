//! Projection of per-page tables into grids of resolved cell text.

use super::anchor::TextIndex;
use super::types::{CanonicalTable, InvalidAnchorError, RawPage, RawRow, RawTable};

/// Resolve every table, page by page.
///
/// Rows keep the cell count the provider reported; ragged tables are neither padded nor
/// truncated. Cells without a layout reference become empty strings.
pub fn extract_tables(
    index: &TextIndex<'_>,
    pages: &[RawPage],
) -> Result<Vec<CanonicalTable>, InvalidAnchorError> {
    pages
        .iter()
        .flat_map(|page| &page.tables)
        .map(|table| extract_table(index, table))
        .collect()
}

fn extract_table(
    index: &TextIndex<'_>,
    table: &RawTable,
) -> Result<CanonicalTable, InvalidAnchorError> {
    Ok(CanonicalTable {
        headers: extract_rows(index, &table.header_rows)?,
        body: extract_rows(index, &table.body_rows)?,
    })
}

fn extract_rows(
    index: &TextIndex<'_>,
    rows: &[RawRow],
) -> Result<Vec<Vec<String>>, InvalidAnchorError> {
    rows.iter()
        .map(|row| {
            row.cells
                .iter()
                .map(|cell| {
                    index
                        .resolve(cell.layout_anchor.as_ref())
                        .map(Option::unwrap_or_default)
                })
                .collect::<Result<Vec<_>, _>>()
        })
        .collect()
}
