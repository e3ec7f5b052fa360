//! Errors raised while parsing or constructing cell notation.

use std::error::Error;
use std::fmt;

use crate::coord::{MAX_COLUMNS, MAX_ROWS};

/// Failure to interpret or build a cell reference or range.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum RangeError {
    /// Text does not follow `<cell>` or `<cell>:<cell>` notation.
    InvalidFormat(String),
    /// A row or column index of 0 was supplied where 1-based indices are required.
    ZeroIndex,
    /// Row index beyond the last addressable row.
    RowOverflow(u32),
    /// Column index beyond the last addressable column.
    ColOverflow(u32),
    /// Start/end coordinates were not ordered (start <= end).
    RangeOrder,
}

impl fmt::Display for RangeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RangeError::InvalidFormat(text) => write!(f, "invalid range format: {text}"),
            RangeError::ZeroIndex => {
                write!(f, "row and column indices must be 1-based (>= 1)")
            }
            RangeError::RowOverflow(row) => write!(f, "row {row} exceeds {MAX_ROWS}"),
            RangeError::ColOverflow(col) => write!(f, "column {col} exceeds {MAX_COLUMNS}"),
            RangeError::RangeOrder => {
                write!(
                    f,
                    "range must be ordered so the start is above/left of the end"
                )
            }
        }
    }
}

impl Error for RangeError {}
