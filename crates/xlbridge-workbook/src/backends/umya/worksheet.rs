use tracing::debug;
use umya_spreadsheet::{
    CellRawValue, CellValue as UmyaValue, Table as UmyaTable, TableColumn, Worksheet as Sheet,
};
use xlbridge_common::style::ooxml::{from_native, to_native};
use xlbridge_common::{CellRange, CellStyle, column_letters};

use super::{BACKEND, SharedBook, features, style, table_name_taken};
use crate::address;
use crate::error::{BridgeError, Result};
use crate::paging::PagingStrategy;
use crate::traits::{
    CellValue, ChartSpec, Comment, ConditionalFormat, DataValidation, PivotTable, Table, Worksheet,
};

/// One sheet of an [`super::UmyaDocument`], addressed by name.
pub struct UmyaWorksheet {
    book: SharedBook,
    name: String,
}

fn convert_cell_value(cv: &UmyaValue) -> CellValue {
    let raw = cv.get_raw_value();
    if raw.is_empty() {
        return CellValue::Empty;
    }
    if raw.is_error() {
        return CellValue::Text(cv.get_value().to_string());
    }
    match raw {
        CellRawValue::Numeric(n) => CellValue::Number(*n),
        CellRawValue::Bool(b) => CellValue::Bool(*b),
        CellRawValue::String(s) => CellValue::Text(s.to_string()),
        CellRawValue::RichText(rt) => CellValue::Text(rt.get_text().to_string()),
        CellRawValue::Lazy(s) => {
            let txt = s.as_ref();
            if let Ok(n) = txt.parse::<f64>() {
                CellValue::Number(n)
            } else if txt.eq_ignore_ascii_case("TRUE") {
                CellValue::Bool(true)
            } else if txt.eq_ignore_ascii_case("FALSE") {
                CellValue::Bool(false)
            } else {
                CellValue::Text(txt.to_string())
            }
        }
        CellRawValue::Error(_) | CellRawValue::Empty => CellValue::Empty,
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

impl UmyaWorksheet {
    pub(super) fn new(book: SharedBook, name: &str) -> Self {
        Self {
            book,
            name: name.to_string(),
        }
    }

    fn with_sheet<T>(&self, f: impl FnOnce(&Sheet) -> Result<T>) -> Result<T> {
        let book = self.book.read();
        let sheet = book
            .get_sheet_by_name(&self.name)
            .ok_or_else(|| BridgeError::not_found("sheet", self.name.as_str()))?;
        f(sheet)
    }

    fn with_sheet_mut<T>(&self, f: impl FnOnce(&mut Sheet) -> Result<T>) -> Result<T> {
        let mut book = self.book.write();
        let sheet = book
            .get_sheet_by_name_mut(&self.name)
            .ok_or_else(|| BridgeError::not_found("sheet", self.name.as_str()))?;
        f(sheet)
    }

    /// Bounds of every stored cell, styled-only cells included.
    fn used_range(&self) -> Result<Option<CellRange>> {
        self.with_sheet(|sheet| {
            let mut bounds: Option<(u32, u32, u32, u32)> = None;
            for cell in sheet.get_cell_collection() {
                let coord = cell.get_coordinate();
                let (c, r) = (*coord.get_col_num(), *coord.get_row_num());
                bounds = Some(match bounds {
                    None => (c, r, c, r),
                    Some((c0, r0, c1, r1)) => (c0.min(c), r0.min(r), c1.max(c), r1.max(r)),
                });
            }
            match bounds {
                Some((c0, r0, c1, r1)) => Ok(Some(CellRange::new(c0, r0, c1, r1)?)),
                None => Ok(None),
            }
        })
    }
}

impl Worksheet for UmyaWorksheet {
    fn backend_name(&self) -> &'static str {
        BACKEND
    }

    fn name(&self) -> Result<String> {
        Ok(self.name.clone())
    }

    fn tables(&self) -> Result<Vec<Table>> {
        self.with_sheet(|sheet| {
            sheet
                .get_tables()
                .iter()
                .map(|table| -> Result<Table> {
                    let (start, end) = table.get_area();
                    let range = CellRange::new(
                        *start.get_col_num(),
                        *start.get_row_num(),
                        *end.get_col_num(),
                        *end.get_row_num(),
                    )?;
                    Ok(Table {
                        name: table.get_name().to_string(),
                        range: range.to_string(),
                    })
                })
                .collect()
        })
    }

    /// Pivot caches are not modelled by the engine.
    fn pivot_tables(&self) -> Result<Vec<PivotTable>> {
        Ok(Vec::new())
    }

    fn add_table(&self, range: &str, name: &str) -> Result<()> {
        let area = address::range(range)?;
        let start = area.start_cell();
        let end = area.end_cell();
        let mut book = self.book.write();
        if table_name_taken(&book, name) {
            return Err(BridgeError::InvalidFormat(format!(
                "table '{name}' already exists"
            )));
        }
        let sheet = book
            .get_sheet_by_name_mut(&self.name)
            .ok_or_else(|| BridgeError::not_found("sheet", self.name.as_str()))?;
        let mut table = UmyaTable::new(name, (start.as_str(), end.as_str()));
        // Column names come from the header row.
        for (i, col) in (area.start_col..=area.end_col).enumerate() {
            let header = sheet
                .get_cell((col, area.start_row))
                .map(|c| c.get_value().to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| format!("Column{}", i + 1));
            table.add_column(TableColumn::new(&header));
        }
        sheet.add_table(table);
        Ok(())
    }

    fn set_value(&self, cell: &str, value: CellValue) -> Result<()> {
        let (col, row) = address::cell(cell)?;
        self.with_sheet_mut(|sheet| {
            let target = sheet.get_cell_mut((col, row));
            match value {
                CellValue::Empty => {
                    target.set_blank();
                }
                CellValue::Bool(b) => {
                    target.set_value_bool(b);
                }
                CellValue::Number(n) => {
                    target.set_value_number(n);
                }
                CellValue::Text(s) => {
                    target.set_value_string(s);
                }
            }
            Ok(())
        })
    }

    fn set_formula(&self, cell: &str, formula: &str) -> Result<()> {
        let (col, row) = address::cell(cell)?;
        let formula = formula.trim();
        let formula = formula.strip_prefix('=').unwrap_or(formula);
        if formula.is_empty() {
            return Err(BridgeError::InvalidFormat("empty formula".to_string()));
        }
        self.with_sheet_mut(|sheet| {
            let target = sheet.get_cell_mut((col, row));
            target.set_formula(formula);
            target
                .get_cell_value_mut()
                .set_formula_result_default(String::new());
            Ok(())
        })
    }

    /// Formula cells are evaluated against the book as it stands, unsaved
    /// edits included.
    fn get_value(&self, cell: &str) -> Result<CellValue> {
        let (col, row) = address::cell(cell)?;
        let literal = self.with_sheet(|sheet| {
            Ok(match sheet.get_cell((col, row)) {
                Some(c) if c.is_formula() => None,
                Some(c) => Some(convert_cell_value(c.get_cell_value())),
                None => Some(CellValue::Empty),
            })
        })?;
        match literal {
            Some(value) => Ok(value),
            None => self.book.evaluate(&self.name, col, row),
        }
    }

    fn get_formula(&self, cell: &str) -> Result<String> {
        let (col, row) = address::cell(cell)?;
        let formula = self.with_sheet(|sheet| {
            Ok(sheet
                .get_cell((col, row))
                .filter(|c| c.is_formula())
                .map(|c| c.get_formula().to_string())
                .filter(|f| !f.is_empty()))
        })?;
        match formula {
            Some(f) if f.starts_with('=') => Ok(f),
            Some(f) => Ok(format!("={f}")),
            None => Ok(self.get_value(cell)?.to_string()),
        }
    }

    fn has_formula(&self, cell: &str) -> Result<bool> {
        let (col, row) = address::cell(cell)?;
        self.with_sheet(|sheet| Ok(sheet.get_cell((col, row)).is_some_and(|c| c.is_formula())))
    }

    fn dimension(&self) -> Result<String> {
        Ok(self
            .used_range()?
            .map(|r| r.to_string())
            .unwrap_or_default())
    }

    fn paging_strategy(&self, page_size: usize) -> Result<PagingStrategy> {
        Ok(PagingStrategy::fixed_size(self.dimension()?, page_size))
    }

    fn capture_picture(&self, _range: &str) -> Result<String> {
        Err(BridgeError::unsupported(BACKEND, "capture_picture"))
    }

    fn get_cell_style(&self, cell: &str) -> Result<CellStyle> {
        let (col, row) = address::range(cell).map(|r| (r.start_col, r.start_row))?;
        self.with_sheet(|sheet| {
            Ok(sheet
                .get_cell((col, row))
                .map(|c| from_native(&style::read(c.get_style())))
                .unwrap_or_default())
        })
    }

    fn set_cell_style(&self, range: &str, cell_style: &CellStyle) -> Result<()> {
        let area = address::range(range)?;
        let native = to_native(cell_style);
        self.with_sheet_mut(|sheet| {
            for (col, row) in area.cells() {
                let cell = sheet.get_cell_mut((col, row));
                let mut merged = cell.get_style().clone();
                style::apply(&mut merged, &native);
                cell.set_style(merged);
            }
            Ok(())
        })
    }

    fn merge_cells(&self, range: &str) -> Result<()> {
        let area = address::range(range)?;
        self.with_sheet_mut(|sheet| {
            sheet.add_merge_cells(area.to_string());
            Ok(())
        })
    }

    fn unmerge_cells(&self, range: &str) -> Result<()> {
        let area = address::range(range)?;
        self.with_sheet_mut(|sheet| {
            let merged = sheet.get_merge_cells_mut();
            let before = merged.len();
            merged.retain(|m| CellRange::parse(&m.get_range()).ok() != Some(area));
            if merged.len() == before {
                debug!(range = %area, "no merged range to remove");
            }
            Ok(())
        })
    }

    fn set_column_width(&self, start_col: &str, end_col: &str, width: f64) -> Result<()> {
        let (a, b) = (address::column(start_col)?, address::column(end_col)?);
        self.with_sheet_mut(|sheet| {
            for col in a.min(b)..=a.max(b) {
                let dim = sheet.get_column_dimension_by_number_mut(&col);
                dim.set_width(width);
                dim.set_best_fit(false);
                dim.set_auto_width(false);
            }
            Ok(())
        })
    }

    fn set_row_height(&self, row: u32, height: f64) -> Result<()> {
        if row == 0 {
            return Err(BridgeError::InvalidFormat("row numbers start at 1".to_string()));
        }
        self.with_sheet_mut(|sheet| {
            let dim = sheet.get_row_dimension_mut(&row);
            dim.set_height(height);
            dim.set_custom_height(true);
            Ok(())
        })
    }

    fn insert_rows(&self, row: u32, count: u32) -> Result<()> {
        require_count("insert_rows", count)?;
        if row == 0 {
            return Err(BridgeError::InvalidFormat("row numbers start at 1".to_string()));
        }
        self.with_sheet_mut(|sheet| {
            sheet.insert_new_row(&row, &count);
            Ok(())
        })
    }

    fn delete_rows(&self, row: u32, count: u32) -> Result<()> {
        require_count("delete_rows", count)?;
        if row == 0 {
            return Err(BridgeError::InvalidFormat("row numbers start at 1".to_string()));
        }
        self.with_sheet_mut(|sheet| {
            sheet.remove_row(&row, &count);
            Ok(())
        })
    }

    fn insert_columns(&self, column: &str, count: u32) -> Result<()> {
        require_count("insert_columns", count)?;
        let letters = column_letters(address::column(column)?)?;
        self.with_sheet_mut(|sheet| {
            sheet.insert_new_column(&letters, &count);
            Ok(())
        })
    }

    fn delete_columns(&self, column: &str, count: u32) -> Result<()> {
        require_count("delete_columns", count)?;
        let letters = column_letters(address::column(column)?)?;
        self.with_sheet_mut(|sheet| {
            sheet.remove_column(&letters, &count);
            Ok(())
        })
    }

    fn add_chart(&self, chart: &ChartSpec) -> Result<()> {
        self.with_sheet_mut(|sheet| features::add_chart(sheet, chart))
    }

    fn freeze_panes(&self, cell: &str) -> Result<()> {
        self.with_sheet_mut(|sheet| features::freeze_panes(sheet, cell))
    }

    fn add_data_validation(&self, range: &str, validation: &DataValidation) -> Result<()> {
        self.with_sheet_mut(|sheet| features::add_data_validation(sheet, range, validation))
    }

    fn add_comment(&self, cell: &str, author: &str, text: &str) -> Result<()> {
        self.with_sheet_mut(|sheet| features::add_comment(sheet, cell, author, text))
    }

    fn comments(&self) -> Result<Vec<Comment>> {
        self.with_sheet(features::comments)
    }

    fn add_hyperlink(&self, cell: &str, url: &str, display: Option<&str>) -> Result<()> {
        self.with_sheet_mut(|sheet| features::add_hyperlink(sheet, cell, url, display))
    }

    fn set_conditional_format(&self, range: &str, format: &ConditionalFormat) -> Result<()> {
        self.with_sheet_mut(|sheet| features::add_conditional_format(sheet, range, format))
    }
}

impl std::fmt::Debug for UmyaWorksheet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UmyaWorksheet")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}
