//! References as callers pass them to worksheet operations.
//!
//! Worksheets accept column letters in either case, the way the host
//! application does. Notation parsing in `xlbridge_common` stays strict.

use xlbridge_common::{CellRange, column_index, parse_cell};

use crate::error::Result;

fn folded(text: &str) -> String {
    text.trim().to_ascii_uppercase()
}

/// `(col, row)` of a single cell reference.
pub(crate) fn cell(text: &str) -> Result<(u32, u32)> {
    Ok(parse_cell(&folded(text))?)
}

/// A cell or `<cell>:<cell>` reference.
pub(crate) fn range(text: &str) -> Result<CellRange> {
    Ok(CellRange::parse(&folded(text))?)
}

/// 1-based index of a column given by its letters.
pub(crate) fn column(text: &str) -> Result<u32> {
    Ok(column_index(folded(text).trim_start_matches('$'))?)
}
