//! Conversions between 1-based (column, row) pairs and A1 cell names.
//!
//! Columns use the spreadsheet base-26 letter encoding without a zero digit
//! (`A` = 1 … `Z` = 26, `AA` = 27, …). Bounds match the xlsx grid limits:
//! 16,384 columns × 1,048,576 rows.

use crate::error::RangeError;

/// Last addressable column (`XFD`).
pub const MAX_COLUMNS: u32 = 16_384;
/// Last addressable row.
pub const MAX_ROWS: u32 = 1_048_576;

/// Convert a 1-based column index to its letters (`1` → `A`, `28` → `AB`).
pub fn column_letters(col: u32) -> Result<String, RangeError> {
    check_col(col)?;
    let mut col = col;
    let mut buf = Vec::with_capacity(3);
    while col > 0 {
        let rem = ((col - 1) % 26) as u8;
        buf.push(b'A' + rem);
        col = (col - 1) / 26;
    }
    buf.reverse();
    Ok(buf.into_iter().map(char::from).collect())
}

/// Convert column letters to a 1-based index. Only uppercase ASCII letters are accepted.
pub fn column_index(letters: &str) -> Result<u32, RangeError> {
    if letters.is_empty() {
        return Err(RangeError::InvalidFormat(letters.to_string()));
    }
    let mut col: u32 = 0;
    for ch in letters.bytes() {
        if !ch.is_ascii_uppercase() {
            return Err(RangeError::InvalidFormat(letters.to_string()));
        }
        col = col
            .checked_mul(26)
            .and_then(|c| c.checked_add(u32::from(ch - b'A') + 1))
            .ok_or(RangeError::ColOverflow(u32::MAX))?;
    }
    check_col(col)?;
    Ok(col)
}

/// Render a (column, row) pair as an A1 cell name without absolute markers.
pub fn cell_name(col: u32, row: u32) -> Result<String, RangeError> {
    check_row(row)?;
    let letters = column_letters(col)?;
    Ok(format!("{letters}{row}"))
}

/// Parse one cell reference (optionally carrying `$` markers) into (column, row).
pub fn parse_cell(text: &str) -> Result<(u32, u32), RangeError> {
    let invalid = || RangeError::InvalidFormat(text.to_string());

    let rest = text.strip_prefix('$').unwrap_or(text);
    let letters_len = rest.bytes().take_while(u8::is_ascii_uppercase).count();
    if letters_len == 0 {
        return Err(invalid());
    }
    let (letters, rest) = rest.split_at(letters_len);
    let digits = rest.strip_prefix('$').unwrap_or(rest);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }

    let col = column_index(letters)?;
    let row: u32 = digits
        .parse()
        .map_err(|_| RangeError::RowOverflow(u32::MAX))?;
    check_row(row)?;
    Ok((col, row))
}

pub(crate) fn check_col(col: u32) -> Result<(), RangeError> {
    match col {
        0 => Err(RangeError::ZeroIndex),
        c if c > MAX_COLUMNS => Err(RangeError::ColOverflow(c)),
        _ => Ok(()),
    }
}

pub(crate) fn check_row(row: u32) -> Result<(), RangeError> {
    match row {
        0 => Err(RangeError::ZeroIndex),
        r if r > MAX_ROWS => Err(RangeError::RowOverflow(r)),
        _ => Ok(()),
    }
}
