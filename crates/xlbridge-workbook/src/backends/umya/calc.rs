//! Formula results computed by the formualizer engine.

#[cfg(test)]
use std::sync::atomic::{AtomicUsize, Ordering};

use formualizer_workbook::{
    LiteralValue, LoadStrategy, SpreadsheetReader, UmyaAdapter, Workbook, WorkbookConfig,
};
use parking_lot::Mutex;
use tracing::{debug, trace};
use umya_spreadsheet::{Spreadsheet, writer};

use super::{BACKEND, map_xlsx_error};
use crate::error::{BridgeError, Result};
use crate::traits::CellValue;

struct Loaded {
    generation: u64,
    workbook: Workbook,
}

/// Engine workbook kept for the life of a document handle.
///
/// The engine is loaded from a snapshot of the in-memory book, so edits not
/// yet saved take part in results. A load is tagged with the book generation
/// it was taken at and reused until the book is written again.
#[derive(Default)]
pub(super) struct FormulaCache {
    loaded: Mutex<Option<Loaded>>,
    #[cfg(test)]
    loads: AtomicUsize,
}

impl FormulaCache {
    /// Evaluate the formula at `(col, row)` of `sheet`. `book` must be the
    /// state the caller read at `generation`.
    pub(super) fn evaluate(
        &self,
        book: &Spreadsheet,
        generation: u64,
        sheet: &str,
        col: u32,
        row: u32,
    ) -> Result<CellValue> {
        let mut loaded = self.loaded.lock();
        let workbook = match loaded.take() {
            Some(current) if current.generation == generation => loaded.insert(current),
            _ => {
                let workbook = load(book)?;
                #[cfg(test)]
                self.loads.fetch_add(1, Ordering::Relaxed);
                debug!(generation, "loaded formula engine snapshot");
                loaded.insert(Loaded {
                    generation,
                    workbook,
                })
            }
        };
        let value = workbook
            .workbook
            .evaluate_cell(sheet, row, col)
            .map_err(|e| BridgeError::from_backend(BACKEND, e))?;
        trace!(sheet, col, row, value = %value, "evaluated formula cell");
        Ok(from_literal(value))
    }

    #[cfg(test)]
    pub(super) fn loads(&self) -> usize {
        self.loads.load(Ordering::Relaxed)
    }
}

/// Write `book` to a scratch directory and load it into the engine.
fn load(book: &Spreadsheet) -> Result<Workbook> {
    let dir = tempfile::tempdir()?;
    let snapshot = dir.path().join("snapshot.xlsx");
    writer::xlsx::write(book, &snapshot).map_err(map_xlsx_error)?;

    let adapter =
        UmyaAdapter::open_path(&snapshot).map_err(|e| BridgeError::from_backend(BACKEND, e))?;
    Workbook::from_reader(adapter, LoadStrategy::EagerAll, WorkbookConfig::ephemeral())
        .map_err(|e| BridgeError::from_backend(BACKEND, e))
}

/// Engine errors read back as their code text, the way cached error
/// results do. Dates and times become serial numbers.
pub(super) fn from_literal(value: LiteralValue) -> CellValue {
    match value {
        LiteralValue::Int(i) => CellValue::Number(i as f64),
        LiteralValue::Number(n) => CellValue::Number(n),
        LiteralValue::Text(s) => CellValue::Text(s),
        LiteralValue::Boolean(b) => CellValue::Bool(b),
        LiteralValue::Error(e) => CellValue::Text(e.kind.to_string()),
        // A spilled result reads as its top-left element.
        LiteralValue::Array(rows) => rows
            .into_iter()
            .next()
            .and_then(|row| row.into_iter().next())
            .map(from_literal)
            .unwrap_or_default(),
        LiteralValue::Empty | LiteralValue::Pending => CellValue::Empty,
        other => match other.as_serial_number() {
            Some(serial) => CellValue::Number(serial),
            None => CellValue::Text(other.to_string()),
        },
    }
}
