//! Direct-file backend over `umya-spreadsheet`.
//!
//! The whole workbook is held in memory behind one lock shared by the
//! document and every worksheet handle taken from it. Nothing reaches the
//! file until [`Document::save`].

mod calc;
mod features;
mod style;
mod worksheet;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::debug;
use umya_spreadsheet::{Spreadsheet, Worksheet as Sheet, XlsxError, reader::xlsx, writer};

use crate::error::{BridgeError, Result};
use crate::traits::{BackendCaps, CellValue, DefinedName, Document, Worksheet};

pub use worksheet::UmyaWorksheet;

pub(crate) const BACKEND: &str = "umya";

pub(crate) type SharedBook = Arc<BookCell>;

/// The in-memory workbook plus the formula engine loaded from it.
///
/// Every write access bumps `generation`; the engine is reloaded only when
/// the generation it was built from is stale.
pub(crate) struct BookCell {
    book: RwLock<Spreadsheet>,
    generation: AtomicU64,
    formulas: calc::FormulaCache,
}

impl BookCell {
    fn new(book: Spreadsheet) -> Self {
        Self {
            book: RwLock::new(book),
            generation: AtomicU64::new(0),
            formulas: calc::FormulaCache::default(),
        }
    }

    pub(crate) fn read(&self) -> RwLockReadGuard<'_, Spreadsheet> {
        self.book.read()
    }

    pub(crate) fn write(&self) -> RwLockWriteGuard<'_, Spreadsheet> {
        let guard = self.book.write();
        self.generation.fetch_add(1, Ordering::AcqRel);
        guard
    }

    /// Result of the formula at `(col, row)` of `sheet`.
    pub(crate) fn evaluate(&self, sheet: &str, col: u32, row: u32) -> Result<CellValue> {
        let book = self.book.read();
        let generation = self.generation.load(Ordering::Acquire);
        self.formulas.evaluate(&book, generation, sheet, col, row)
    }
}

pub(crate) fn map_xlsx_error(err: XlsxError) -> BridgeError {
    match err {
        XlsxError::Io(e) => BridgeError::Io(e),
        other => BridgeError::from_backend(BACKEND, other),
    }
}

fn sheet_index(book: &Spreadsheet, name: &str) -> Option<usize> {
    book.get_sheet_collection_no_check()
        .iter()
        .position(|s| s.get_name() == name)
}

fn require_sheet(book: &Spreadsheet, name: &str) -> Result<usize> {
    sheet_index(book, name).ok_or_else(|| BridgeError::not_found("sheet", name))
}

/// Table names are unique across the workbook, ignoring case.
pub(crate) fn table_name_taken(book: &Spreadsheet, name: &str) -> bool {
    book.get_sheet_collection_no_check()
        .iter()
        .flat_map(|s| s.get_tables())
        .any(|t| t.get_name().eq_ignore_ascii_case(name))
}

/// First free `<base>_<n>` name, counting from 2.
fn unused_table_name(book: &Spreadsheet, base: &str) -> String {
    (2..)
        .map(|n| format!("{base}_{n}"))
        .find(|candidate| !table_name_taken(book, candidate))
        .unwrap_or_else(|| base.to_string())
}

/// Defined-name addresses are stored without the leading `=`.
fn address_of(refers_to: &str) -> &str {
    let trimmed = refers_to.trim();
    trimmed.strip_prefix('=').unwrap_or(trimmed)
}

/// A workbook file edited in memory.
pub struct UmyaDocument {
    book: SharedBook,
    path: PathBuf,
}

impl UmyaDocument {
    /// Read the whole file. A missing file is reported as `NotFound`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(BridgeError::not_found("file", path.display().to_string()));
        }
        // Full read: lazily read sheets trip the writer on save.
        let book = xlsx::read(path).map_err(map_xlsx_error)?;
        debug!(path = %path.display(), sheets = book.get_sheet_count(), "opened workbook file");
        Ok(Self {
            book: Arc::new(BookCell::new(book)),
            path: path.to_path_buf(),
        })
    }

    /// A new workbook with one empty sheet, written to `path` on save.
    pub fn create(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        debug!(path = %path.display(), "created workbook in memory");
        Self {
            book: Arc::new(BookCell::new(umya_spreadsheet::new_file())),
            path: path.to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Concrete handle for `name`, for callers that want the backend type.
    pub fn worksheet(&self, name: &str) -> Result<UmyaWorksheet> {
        let book = self.book.read();
        require_sheet(&book, name)?;
        Ok(UmyaWorksheet::new(Arc::clone(&self.book), name))
    }
}

impl Document for UmyaDocument {
    fn backend_name(&self) -> &'static str {
        BACKEND
    }

    fn capabilities(&self) -> BackendCaps {
        BackendCaps {
            charts: true,
            comments: true,
            conditional_formats: true,
            ..Default::default()
        }
    }

    fn sheet_names(&self) -> Result<Vec<String>> {
        let mut book = self.book.write();
        book.read_sheet_collection();
        Ok(book
            .get_sheet_collection_no_check()
            .iter()
            .map(|s| s.get_name().to_string())
            .collect())
    }

    fn find_sheet(&self, name: &str) -> Result<Box<dyn Worksheet>> {
        Ok(Box::new(self.worksheet(name)?))
    }

    fn create_sheet(&self, name: &str) -> Result<()> {
        let mut book = self.book.write();
        book.read_sheet_collection();
        book.new_sheet(name)
            .map_err(|e| BridgeError::from_backend(BACKEND, e))?;
        Ok(())
    }

    fn copy_sheet(&self, src: &str, dest: &str) -> Result<()> {
        let mut book = self.book.write();
        book.read_sheet_collection();
        let src_index = require_sheet(&book, src)?;
        if sheet_index(&book, dest).is_some() {
            return Err(BridgeError::InvalidFormat(format!(
                "sheet '{dest}' already exists"
            )));
        }
        let mut copy = book
            .get_sheet(&src_index)
            .cloned()
            .ok_or_else(|| BridgeError::not_found("sheet", src))?;
        copy.set_name(dest);
        // The copy's tables need names of their own before it joins the book.
        for table in copy.get_tables_mut().iter_mut() {
            let renamed = unused_table_name(&book, table.get_name());
            table.set_name(&renamed);
            table.set_display_name(&renamed);
        }
        book.add_sheet(copy)
            .map_err(|e| BridgeError::from_backend(BACKEND, e))?;

        let sheets = book.get_sheet_collection_mut();
        if let Some(added) = sheets.iter().position(|s| s.get_name() == dest) {
            let moved = sheets.remove(added);
            sheets.insert(src_index + 1, moved);
        }
        debug!(src, dest, "copied sheet");
        Ok(())
    }

    fn delete_sheet(&self, name: &str) -> Result<()> {
        let mut book = self.book.write();
        require_sheet(&book, name)?;
        book.remove_sheet_by_name(name)
            .map_err(|e| BridgeError::from_backend(BACKEND, e))
    }

    fn rename_sheet(&self, old: &str, new: &str) -> Result<()> {
        let mut book = self.book.write();
        book.read_sheet_collection();
        let index = require_sheet(&book, old)?;
        book.set_sheet_name(index, new.to_string())
            .map_err(|e| BridgeError::from_backend(BACKEND, e))
    }

    fn set_defined_name(&self, name: &DefinedName) -> Result<()> {
        let address = address_of(&name.refers_to).to_string();
        let mut book = self.book.write();
        book.read_sheet_collection();
        match &name.scope {
            Some(scope) => {
                let index = require_sheet(&book, scope)?;
                let sheet = book
                    .get_sheet_mut(&index)
                    .ok_or_else(|| BridgeError::not_found("sheet", scope.as_str()))?;
                sheet
                    .get_defined_names_mut()
                    .retain(|d| d.get_name() != name.name);
                sheet
                    .add_defined_name(name.name.as_str(), address.as_str())
                    .map_err(|e| BridgeError::from_backend(BACKEND, e))?;
                if let Some(last) = sheet.get_defined_names_mut().last_mut() {
                    last.set_local_sheet_id(index as u32);
                }
            }
            None => {
                book.get_defined_names_mut()
                    .retain(|d| d.get_name() != name.name);
                // Workbook-scoped names may also have been stored on a sheet.
                for sheet in book.get_sheet_collection_mut().iter_mut() {
                    sheet
                        .get_defined_names_mut()
                        .retain(|d| d.get_name() != name.name || d.has_local_sheet_id());
                }
                // Names are only constructible through a sheet; build one on
                // a scratch sheet and move it to the workbook list.
                let mut scratch = Sheet::default();
                scratch
                    .add_defined_name(name.name.as_str(), address.as_str())
                    .map_err(|e| BridgeError::from_backend(BACKEND, e))?;
                if let Some(defined) = scratch.get_defined_names_mut().pop() {
                    book.add_defined_names(defined);
                }
            }
        }
        Ok(())
    }

    fn defined_names(&self) -> Result<Vec<DefinedName>> {
        let mut book = self.book.write();
        book.read_sheet_collection();
        let sheet_names: Vec<String> = book
            .get_sheet_collection_no_check()
            .iter()
            .map(|s| s.get_name().to_string())
            .collect();

        let mut names: Vec<DefinedName> = book
            .get_defined_names()
            .iter()
            .map(|d| DefinedName::new(d.get_name(), d.get_address()))
            .collect();
        for sheet in book.get_sheet_collection_no_check() {
            for d in sheet.get_defined_names() {
                let mut name = DefinedName::new(d.get_name(), d.get_address());
                if d.has_local_sheet_id() {
                    name.scope = sheet_names.get(*d.get_local_sheet_id() as usize).cloned();
                }
                names.push(name);
            }
        }
        Ok(names)
    }

    fn save(&self) -> Result<()> {
        let mut book = self.book.write();
        let count = book.get_sheet_count();
        for i in 0..count {
            book.read_sheet(i);
        }
        writer::xlsx::write(&*book, &self.path).map_err(map_xlsx_error)?;
        debug!(path = %self.path.display(), "saved workbook file");
        Ok(())
    }
}
