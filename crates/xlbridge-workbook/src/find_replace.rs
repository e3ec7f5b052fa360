use tracing::trace;
use xlbridge_common::cell_name;

use crate::address;
use crate::error::{BridgeError, Result};
use crate::traits::{CellValue, FindReplace, Worksheet};

/// Replace within one cell's text. Returns the new text and the number of
/// matches, or `None` when nothing matched.
///
/// Whole-cell mode counts one match. Case-insensitive substring mode
/// resumes scanning after each inserted replacement, so replacement text is
/// never matched again.
pub fn replace_in_text(
    value: &str,
    find: &str,
    replace: &str,
    match_case: bool,
    match_entire_cell: bool,
) -> Option<(String, usize)> {
    if find.is_empty() {
        return None;
    }
    if match_entire_cell {
        let matched = if match_case {
            value == find
        } else {
            value.to_lowercase() == find.to_lowercase()
        };
        return matched.then(|| (replace.to_string(), 1));
    }
    if match_case {
        let count = value.matches(find).count();
        return (count > 0).then(|| (value.replace(find, replace), count));
    }

    let needle: Vec<char> = find.to_lowercase().chars().collect();
    let mut out = String::with_capacity(value.len());
    let mut count = 0;
    let mut pos = 0;
    while pos < value.len() {
        let rest = &value[pos..];
        if let Some(len) = folded_prefix_len(rest, &needle) {
            out.push_str(replace);
            pos += len;
            count += 1;
        } else if let Some(c) = rest.chars().next() {
            out.push(c);
            pos += c.len_utf8();
        }
    }
    (count > 0).then_some((out, count))
}

/// Byte length of the prefix of `text` whose lowercase form equals `needle`.
fn folded_prefix_len(text: &str, needle: &[char]) -> Option<usize> {
    let mut k = 0;
    for (i, c) in text.char_indices() {
        for lower in c.to_lowercase() {
            if needle.get(k) != Some(&lower) {
                return None;
            }
            k += 1;
        }
        if k == needle.len() {
            return Some(i + c.len_utf8());
        }
    }
    None
}

/// Walk the request's range row by row, rewriting each literal cell that
/// matches. Formula cells are skipped. Returns the total number of matches.
pub fn run<W: Worksheet + ?Sized>(sheet: &W, request: &FindReplace) -> Result<usize> {
    if request.find.is_empty() {
        return Err(BridgeError::InvalidFormat(
            "find text must not be empty".to_string(),
        ));
    }
    let range_text = match &request.range {
        Some(range) => range.clone(),
        None => sheet.dimension()?,
    };
    if range_text.is_empty() {
        return Ok(0);
    }
    let range = address::range(&range_text)?;

    let mut total = 0;
    for (col, row) in range.cells() {
        let cell = cell_name(col, row)?;
        if sheet.has_formula(&cell)? {
            continue;
        }
        let value = sheet.get_value(&cell)?;
        if value.is_empty() {
            continue;
        }
        let text = value.to_string();
        if let Some((updated, matches)) = replace_in_text(
            &text,
            &request.find,
            &request.replace,
            request.match_case,
            request.match_entire_cell,
        ) {
            sheet.set_value(&cell, CellValue::Text(updated))?;
            trace!(cell = %cell, matches, "find/replace wrote cell");
            total += matches;
        }
    }
    Ok(total)
}
