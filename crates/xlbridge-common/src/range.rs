//! Rectangular cell ranges in A1 notation.
//!
//! A [`CellRange`] is always ordered (`start <= end` on both axes) and 1-based.
//! Parsing accepts `$` absolute markers; serialization never emits them, so the
//! `Display` form is the canonical, comparison-stable notation.

use std::fmt;
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::coord::{self, cell_name, parse_cell};
use crate::error::RangeError;

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CellRange {
    pub start_col: u32,
    pub start_row: u32,
    pub end_col: u32,
    pub end_row: u32,
}

impl CellRange {
    /// Construct from 1-based bounds, validating order and grid limits.
    pub fn new(
        start_col: u32,
        start_row: u32,
        end_col: u32,
        end_row: u32,
    ) -> Result<Self, RangeError> {
        coord::check_col(start_col)?;
        coord::check_col(end_col)?;
        coord::check_row(start_row)?;
        coord::check_row(end_row)?;
        if start_col > end_col || start_row > end_row {
            return Err(RangeError::RangeOrder);
        }
        Ok(Self {
            start_col,
            start_row,
            end_col,
            end_row,
        })
    }

    /// A 1×1 range.
    pub fn single(col: u32, row: u32) -> Result<Self, RangeError> {
        Self::new(col, row, col, row)
    }

    /// Parse `<cell>` or `<cell>:<cell>`; a bare cell becomes a 1×1 range.
    pub fn parse(text: &str) -> Result<Self, RangeError> {
        let (first, second) = match text.split_once(':') {
            Some((a, b)) => (a, Some(b)),
            None => (text, None),
        };
        let (start_col, start_row) = parse_cell(first).map_err(|e| invalid(text, e))?;
        let (end_col, end_row) = match second {
            Some(cell) => parse_cell(cell).map_err(|e| invalid(text, e))?,
            None => (start_col, start_row),
        };
        Self::new(start_col, start_row, end_col, end_row)
    }

    pub fn width(&self) -> u32 {
        self.end_col - self.start_col + 1
    }

    pub fn height(&self) -> u32 {
        self.end_row - self.start_row + 1
    }

    pub fn cell_count(&self) -> u64 {
        u64::from(self.width()) * u64::from(self.height())
    }

    pub fn is_single_cell(&self) -> bool {
        self.start_col == self.end_col && self.start_row == self.end_row
    }

    pub fn contains(&self, col: u32, row: u32) -> bool {
        (self.start_col..=self.end_col).contains(&col)
            && (self.start_row..=self.end_row).contains(&row)
    }

    /// Smallest range covering both `self` and the given cell.
    pub fn expand_to(&self, col: u32, row: u32) -> Self {
        Self {
            start_col: self.start_col.min(col),
            start_row: self.start_row.min(row),
            end_col: self.end_col.max(col),
            end_row: self.end_row.max(row),
        }
    }

    /// Top-left cell name.
    pub fn start_cell(&self) -> String {
        // Bounds were validated on construction.
        cell_name(self.start_col, self.start_row).unwrap_or_default()
    }

    /// Bottom-right cell name.
    pub fn end_cell(&self) -> String {
        cell_name(self.end_col, self.end_row).unwrap_or_default()
    }

    /// Iterate every (column, row) pair row by row, left to right.
    pub fn cells(&self) -> Cells {
        Cells {
            range: *self,
            col: self.start_col,
            row: self.start_row,
        }
    }
}

fn invalid(text: &str, err: RangeError) -> RangeError {
    match err {
        RangeError::InvalidFormat(_) => RangeError::InvalidFormat(text.to_string()),
        other => other,
    }
}

impl fmt::Display for CellRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.start_cell(), self.end_cell())
    }
}

impl FromStr for CellRange {
    type Err = RangeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Row-major iterator over the cells of a [`CellRange`].
#[derive(Clone, Debug)]
pub struct Cells {
    range: CellRange,
    col: u32,
    row: u32,
}

impl Iterator for Cells {
    type Item = (u32, u32);

    fn next(&mut self) -> Option<Self::Item> {
        if self.row > self.range.end_row {
            return None;
        }
        let item = (self.col, self.row);
        if self.col == self.range.end_col {
            self.col = self.range.start_col;
            self.row += 1;
        } else {
            self.col += 1;
        }
        Some(item)
    }
}

/// Parse and re-serialize without absolute markers. Unparsable input is returned unchanged.
pub fn normalize_range(text: &str) -> String {
    match CellRange::parse(text) {
        Ok(range) => range.to_string(),
        Err(_) => text.to_string(),
    }
}
