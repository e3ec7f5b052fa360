use std::fmt;
use std::rc::Rc;

use tracing::debug;
use xlbridge_common::style::automation::{from_automation, to_automation};
use xlbridge_common::{CellStyle, column_letters, normalize_range};

use super::dispatch::{Dispatch, Variant, items, set};
use super::session::Session;
use super::{BACKEND, features, style};
use crate::address;
use crate::error::{BridgeError, Result};
use crate::paging::{PagingStrategy, PrintLayout, select_strategy};
use crate::traits::{
    CellValue, ChartSpec, Comment, ConditionalFormat, DataValidation, PivotTable, Table, Worksheet,
};

const XL_SRC_RANGE: i32 = 1;
const XL_YES: i32 = 1;

/// One sheet of a workbook open in the host application.
pub struct AutomationWorksheet {
    sheet: Rc<dyn Dispatch>,
    session: Rc<Session>,
}

fn has_formula(target: &dyn Dispatch) -> Result<bool> {
    Ok(target.get("HasFormula", &[])?.as_bool().unwrap_or(false))
}

fn to_variant(value: CellValue) -> Variant {
    match value {
        CellValue::Empty => Variant::Empty,
        CellValue::Bool(b) => Variant::Bool(b),
        CellValue::Number(n) => Variant::Float(n),
        CellValue::Text(s) => Variant::Text(s),
    }
}

fn to_cell_value(value: Variant) -> CellValue {
    match value {
        Variant::Empty | Variant::Missing | Variant::Object(_) => CellValue::Empty,
        Variant::Bool(b) => CellValue::Bool(b),
        Variant::Int(n) => CellValue::Number(n as f64),
        Variant::Float(n) => CellValue::Number(n),
        Variant::Text(s) => CellValue::Text(s),
        error @ Variant::Error(_) => CellValue::Text(error.to_text()),
    }
}

fn require_count(operation: &str, count: u32) -> Result<()> {
    if count == 0 {
        return Err(BridgeError::InvalidFormat(format!(
            "{operation} needs a positive count"
        )));
    }
    Ok(())
}

/// Last row or column of a block of `count` starting at `first`, checked
/// against the sheet bounds.
fn block_end(first: u32, count: u32, max: u32) -> Result<u32> {
    first
        .checked_add(count - 1)
        .filter(|end| *end <= max)
        .ok_or_else(|| BridgeError::InvalidFormat(format!("{count} from {first} exceeds {max}")))
}

/// The area of a print-area setting, without its sheet qualifier. Only the
/// first area of a multi-area setting is used.
fn print_area_of(text: &str) -> String {
    let first = text.split(',').next().unwrap_or_default();
    let area = first.rsplit_once('!').map_or(first, |(_, area)| area);
    normalize_range(area.trim())
}

impl AutomationWorksheet {
    pub(super) fn new(sheet: Rc<dyn Dispatch>, session: Rc<Session>) -> Self {
        Self { sheet, session }
    }

    fn range(&self, reference: &str) -> Result<Rc<dyn Dispatch>> {
        let area = address::range(reference)?;
        self.sheet.object("Range", &[Variant::from(area.to_string())])
    }

    /// Top-left cell of `reference`.
    fn cell(&self, reference: &str) -> Result<Rc<dyn Dispatch>> {
        let area = address::range(reference)?;
        self.sheet.object("Range", &[Variant::from(area.start_cell())])
    }

    fn rows(&self, row: u32, count: u32) -> Result<Rc<dyn Dispatch>> {
        if row == 0 {
            return Err(BridgeError::InvalidFormat("row numbers start at 1".into()));
        }
        let end = block_end(row, count, xlbridge_common::MAX_ROWS)?;
        self.sheet
            .object("Rows", &[Variant::from(format!("{row}:{end}"))])
    }

    fn columns(&self, column: &str, count: u32) -> Result<Rc<dyn Dispatch>> {
        let first = address::column(column)?;
        let end = block_end(first, count, xlbridge_common::MAX_COLUMNS)?;
        let address = format!("{}:{}", column_letters(first)?, column_letters(end)?);
        self.sheet.object("Columns", &[Variant::from(address)])
    }
}

impl PrintLayout for AutomationWorksheet {
    fn print_area(&self) -> Result<String> {
        let setup = self.sheet.object("PageSetup", &[])?;
        Ok(print_area_of(&setup.text("PrintArea")?))
    }

    fn horizontal_page_breaks(&self) -> Result<Vec<u32>> {
        items(self.sheet.object("HPageBreaks", &[])?.as_ref())?
            .iter()
            .map(|brk| {
                let row = brk.object("Location", &[])?.int("Row")?;
                u32::try_from(row).map_err(|_| {
                    BridgeError::from_backend(BACKEND, format!("page break at row {row}"))
                })
            })
            .collect()
    }

    fn used_dimension(&self) -> Result<String> {
        self.dimension()
    }
}

impl Worksheet for AutomationWorksheet {
    fn backend_name(&self) -> &'static str {
        BACKEND
    }

    fn name(&self) -> Result<String> {
        self.sheet.text("Name")
    }

    fn tables(&self) -> Result<Vec<Table>> {
        items(self.sheet.object("ListObjects", &[])?.as_ref())?
            .iter()
            .map(|list| {
                Ok(Table {
                    name: list.text("Name")?,
                    range: features::address_of(list.object("Range", &[])?.as_ref())?,
                })
            })
            .collect()
    }

    fn pivot_tables(&self) -> Result<Vec<PivotTable>> {
        items(self.sheet.call_object("PivotTables", &[])?.as_ref())?
            .iter()
            .map(|pivot| {
                Ok(PivotTable {
                    name: pivot.text("Name")?,
                    range: features::address_of(pivot.object("TableRange1", &[])?.as_ref())?,
                })
            })
            .collect()
    }

    fn add_table(&self, range: &str, name: &str) -> Result<()> {
        if self.tables()?.iter().any(|t| t.name == name) {
            return Err(BridgeError::InvalidFormat(format!(
                "table '{name}' already exists"
            )));
        }
        let source = self.range(range)?;
        let lists = self.sheet.object("ListObjects", &[])?;
        let list = lists.call_object(
            "Add",
            &[
                Variant::from(XL_SRC_RANGE),
                Variant::Object(source),
                Variant::Missing,
                Variant::from(XL_YES),
            ],
        )?;
        set(list.as_ref(), "Name", name)
    }

    fn set_value(&self, cell: &str, value: CellValue) -> Result<()> {
        set(self.cell(cell)?.as_ref(), "Value", to_variant(value))
    }

    fn set_formula(&self, cell: &str, formula: &str) -> Result<()> {
        let body = formula.trim().trim_start_matches('=');
        if body.is_empty() {
            return Err(BridgeError::InvalidFormat("empty formula".into()));
        }
        set(self.cell(cell)?.as_ref(), "Formula", format!("={body}"))
    }

    fn get_value(&self, cell: &str) -> Result<CellValue> {
        Ok(to_cell_value(self.cell(cell)?.get("Value", &[])?))
    }

    fn get_formula(&self, cell: &str) -> Result<String> {
        let target = self.cell(cell)?;
        if has_formula(target.as_ref())? {
            let formula = target.text("Formula")?;
            if formula.starts_with('=') {
                return Ok(formula);
            }
            return Ok(format!("={formula}"));
        }
        Ok(target.get("Value", &[])?.to_text())
    }

    fn has_formula(&self, cell: &str) -> Result<bool> {
        has_formula(self.cell(cell)?.as_ref())
    }

    fn dimension(&self) -> Result<String> {
        let used = self.sheet.object("UsedRange", &[])?;
        let address = features::address_of(used.as_ref())?;
        // An empty sheet still reports A1 as its used range.
        if address == "A1:A1" && used.get("Value", &[])?.is_empty() {
            return Ok(String::new());
        }
        Ok(address)
    }

    fn paging_strategy(&self, page_size: usize) -> Result<PagingStrategy> {
        select_strategy(self, page_size)
    }

    fn capture_picture(&self, range: &str) -> Result<String> {
        features::capture_picture(self.sheet.as_ref(), self.range(range)?.as_ref())
    }

    fn get_cell_style(&self, cell: &str) -> Result<CellStyle> {
        Ok(from_automation(&style::read(self.cell(cell)?.as_ref())?))
    }

    fn set_cell_style(&self, range: &str, cell_style: &CellStyle) -> Result<()> {
        style::apply(self.range(range)?.as_ref(), &to_automation(cell_style))
    }

    fn merge_cells(&self, range: &str) -> Result<()> {
        self.range(range)?.call("Merge", &[])?;
        Ok(())
    }

    fn unmerge_cells(&self, range: &str) -> Result<()> {
        self.range(range)?.call("UnMerge", &[])?;
        Ok(())
    }

    fn set_column_width(&self, start_col: &str, end_col: &str, width: f64) -> Result<()> {
        let first = address::column(start_col)?;
        let last = address::column(end_col)?;
        let (first, last) = (first.min(last), first.max(last));
        let columns = self.columns(&column_letters(first)?, last - first + 1)?;
        set(columns.as_ref(), "ColumnWidth", width)
    }

    fn set_row_height(&self, row: u32, height: f64) -> Result<()> {
        set(self.rows(row, 1)?.as_ref(), "RowHeight", height)
    }

    fn insert_rows(&self, row: u32, count: u32) -> Result<()> {
        require_count("insert_rows", count)?;
        self.rows(row, count)?.call("Insert", &[])?;
        debug!(row, count, "inserted rows");
        Ok(())
    }

    fn delete_rows(&self, row: u32, count: u32) -> Result<()> {
        require_count("delete_rows", count)?;
        self.rows(row, count)?.call("Delete", &[])?;
        debug!(row, count, "deleted rows");
        Ok(())
    }

    fn insert_columns(&self, column: &str, count: u32) -> Result<()> {
        require_count("insert_columns", count)?;
        self.columns(column, count)?.call("Insert", &[])?;
        debug!(column, count, "inserted columns");
        Ok(())
    }

    fn delete_columns(&self, column: &str, count: u32) -> Result<()> {
        require_count("delete_columns", count)?;
        self.columns(column, count)?.call("Delete", &[])?;
        debug!(column, count, "deleted columns");
        Ok(())
    }

    fn add_chart(&self, chart: &ChartSpec) -> Result<()> {
        features::add_chart(self.session.application(), self.sheet.as_ref(), chart)
    }

    fn freeze_panes(&self, cell: &str) -> Result<()> {
        features::freeze_panes(self.session.application(), self.sheet.as_ref(), cell)
    }

    fn add_data_validation(&self, range: &str, validation: &DataValidation) -> Result<()> {
        features::add_data_validation(self.range(range)?.as_ref(), validation)
    }

    fn add_comment(&self, cell: &str, _author: &str, text: &str) -> Result<()> {
        features::add_comment(self.cell(cell)?.as_ref(), text)
    }

    fn comments(&self) -> Result<Vec<Comment>> {
        features::comments(self.sheet.as_ref())
    }

    fn add_hyperlink(&self, cell: &str, url: &str, display: Option<&str>) -> Result<()> {
        features::add_hyperlink(self.sheet.as_ref(), self.cell(cell)?, url, display)
    }

    fn set_conditional_format(&self, range: &str, format: &ConditionalFormat) -> Result<()> {
        features::add_conditional_format(self.range(range)?.as_ref(), format)
    }
}

impl fmt::Debug for AutomationWorksheet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AutomationWorksheet").finish_non_exhaustive()
    }
}
