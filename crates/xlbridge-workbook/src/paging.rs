//! Splitting a worksheet area into bounded pages.
//!
//! Pages are identified by their normalized range string. Callers remember
//! which strings they have consumed and ask for the remainder on the next
//! call; nothing here keeps state between calls.

use std::collections::HashSet;

use tracing::warn;
use xlbridge_common::{CellRange, normalize_range};

use crate::config::effective_page_size;
use crate::error::Result;

/// How a worksheet's area is cut into pages.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PagingStrategy {
    /// Full-width row bands of at most `page_size` cells over the used range.
    FixedSize { dimension: String, page_size: usize },
    /// Pages of a designated print area, cut at horizontal page breaks.
    PrintArea {
        print_area: String,
        breaks: Vec<u32>,
    },
}

impl PagingStrategy {
    /// Zero selects the default budget.
    pub fn fixed_size(dimension: impl Into<String>, page_size: usize) -> Self {
        PagingStrategy::FixedSize {
            dimension: dimension.into(),
            page_size: effective_page_size(page_size),
        }
    }

    pub fn print_area(print_area: impl Into<String>, breaks: Vec<u32>) -> Self {
        PagingStrategy::PrintArea {
            print_area: print_area.into(),
            breaks,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            PagingStrategy::FixedSize { .. } => "fixedSize",
            PagingStrategy::PrintArea { .. } => "printArea",
        }
    }

    /// Ordered page list. Never fails; an unusable area yields no pages.
    pub fn ranges(&self) -> Vec<String> {
        match self {
            PagingStrategy::FixedSize {
                dimension,
                page_size,
            } => fixed_size_ranges(dimension, *page_size),
            PagingStrategy::PrintArea { print_area, breaks } => {
                print_area_ranges(print_area, breaks)
            }
        }
    }
}

fn parse_area(kind: &'static str, text: &str) -> Option<CellRange> {
    if text.trim().is_empty() {
        return None;
    }
    match CellRange::parse(text.trim()) {
        Ok(range) => Some(range),
        Err(err) => {
            warn!(area = kind, text, error = %err, "paging area is not a range; no pages");
            None
        }
    }
}

fn band(range: &CellRange, start_row: u32, end_row: u32) -> Option<String> {
    CellRange::new(range.start_col, start_row, range.end_col, end_row)
        .ok()
        .map(|r| r.to_string())
}

/// Row bands of `max(1, page_size / width)` rows covering `dimension`.
pub fn fixed_size_ranges(dimension: &str, page_size: usize) -> Vec<String> {
    let Some(area) = parse_area("dimension", dimension) else {
        return Vec::new();
    };
    let page_size = effective_page_size(page_size) as u64;
    let rows_per_page = (page_size / u64::from(area.width())).max(1);

    let mut ranges = Vec::new();
    let mut row = u64::from(area.start_row);
    let end = u64::from(area.end_row);
    while row <= end {
        let page_end = row.saturating_add(rows_per_page - 1).min(end);
        // Both bounds are within `area`, so they fit in u32.
        match band(&area, row as u32, page_end as u32) {
            Some(r) => ranges.push(r),
            None => break,
        }
        row = page_end + 1;
    }
    ranges
}

/// Pages of `print_area` ending before each break row in
/// `(start_row, end_row]`. Other breaks are ignored.
pub fn print_area_ranges(print_area: &str, breaks: &[u32]) -> Vec<String> {
    let Some(area) = parse_area("printArea", print_area) else {
        return Vec::new();
    };
    let mut breaks: Vec<u32> = breaks
        .iter()
        .copied()
        .filter(|b| *b > area.start_row && *b <= area.end_row)
        .collect();
    breaks.sort_unstable();
    breaks.dedup();

    let mut ranges = Vec::with_capacity(breaks.len() + 1);
    let mut row = area.start_row;
    for brk in breaks {
        match band(&area, row, brk - 1) {
            Some(r) => ranges.push(r),
            None => return ranges,
        }
        row = brk;
    }
    if row <= area.end_row
        && let Some(r) = band(&area, row, area.end_row)
    {
        ranges.push(r);
    }
    ranges
}

/// Queries a backend answers for print-area paging.
pub trait PrintLayout {
    /// Empty when no print area is configured.
    fn print_area(&self) -> Result<String>;
    /// Rows that begin a new printed page.
    fn horizontal_page_breaks(&self) -> Result<Vec<u32>>;
    fn used_dimension(&self) -> Result<String>;
}

/// Print area when one is configured, fixed size otherwise.
pub fn select_strategy<L: PrintLayout + ?Sized>(
    layout: &L,
    page_size: usize,
) -> Result<PagingStrategy> {
    let area = layout.print_area()?;
    if area.trim().is_empty() {
        return Ok(PagingStrategy::fixed_size(
            layout.used_dimension()?,
            page_size,
        ));
    }
    Ok(PagingStrategy::print_area(
        area,
        layout.horizontal_page_breaks()?,
    ))
}

/// The element after the first exact match of `current`, or an empty
/// string when `current` is absent or last.
pub fn find_next_range(all: &[String], current: &str) -> String {
    all.iter()
        .position(|r| r == current)
        .and_then(|i| all.get(i + 1))
        .cloned()
        .unwrap_or_default()
}

/// `all` minus every range whose normalized form appears in `known`.
pub fn filter_remaining(all: &[String], known: &[String]) -> Vec<String> {
    if known.is_empty() {
        return all.to_vec();
    }
    let known: HashSet<String> = known.iter().map(|k| normalize_range(k)).collect();
    all.iter()
        .filter(|r| !known.contains(&normalize_range(r)))
        .cloned()
        .collect()
}

/// A computed page list with the lookups callers page through.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PagingRangeService {
    ranges: Vec<String>,
}

impl PagingRangeService {
    pub fn new(strategy: &PagingStrategy) -> Self {
        Self {
            ranges: strategy.ranges(),
        }
    }

    pub fn from_ranges(ranges: Vec<String>) -> Self {
        Self { ranges }
    }

    pub fn ranges(&self) -> &[String] {
        &self.ranges
    }

    pub fn first(&self) -> Option<&str> {
        self.ranges.first().map(String::as_str)
    }

    pub fn next_after(&self, current: &str) -> String {
        find_next_range(&self.ranges, current)
    }

    pub fn remaining(&self, known: &[String]) -> Vec<String> {
        filter_remaining(&self.ranges, known)
    }
}
