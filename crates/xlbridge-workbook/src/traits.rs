use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use xlbridge_common::CellStyle;

use crate::error::{BridgeError, Result};
use crate::paging::PagingStrategy;

/// A literal cell value as read from or written to a backend.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
#[derive(Clone, Debug, Default, PartialEq)]
pub enum CellValue {
    #[default]
    Empty,
    Bool(bool),
    Number(f64),
    Text(String),
}

impl CellValue {
    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.is_empty(),
            _ => false,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Bool(true) => f.write_str("TRUE"),
            CellValue::Bool(false) => f.write_str("FALSE"),
            CellValue::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => {
                write!(f, "{}", *n as i64)
            }
            CellValue::Number(n) => write!(f, "{n}"),
            CellValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<f64> for CellValue {
    fn from(v: f64) -> Self {
        CellValue::Number(v)
    }
}

impl From<i64> for CellValue {
    fn from(v: i64) -> Self {
        CellValue::Number(v as f64)
    }
}

impl From<i32> for CellValue {
    fn from(v: i32) -> Self {
        CellValue::Number(f64::from(v))
    }
}

impl From<bool> for CellValue {
    fn from(v: bool) -> Self {
        CellValue::Bool(v)
    }
}

impl From<String> for CellValue {
    fn from(v: String) -> Self {
        CellValue::Text(v)
    }
}

impl From<&str> for CellValue {
    fn from(v: &str) -> Self {
        CellValue::Text(v.to_string())
    }
}

/// What a backend can do beyond the common contract.
#[derive(Clone, Debug, Default)]
pub struct BackendCaps {
    /// Rendered snapshots of a range.
    pub picture_capture: bool,
    /// Paging along a designated print area and its page breaks.
    pub print_area_paging: bool,
    pub pivot_tables: bool,
    /// Formula results are recomputed by the backend rather than read
    /// from the last cached value.
    pub live_calculation: bool,
    pub charts: bool,
    pub comments: bool,
    pub conditional_formats: bool,
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Table {
    pub name: String,
    pub range: String,
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PivotTable {
    pub name: String,
    pub range: String,
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Comment {
    pub cell: String,
    pub author: String,
    pub text: String,
}

/// A workbook-level name. `scope` is the owning sheet for sheet-local names.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DefinedName {
    pub name: String,
    pub refers_to: String,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub scope: Option<String>,
}

impl DefinedName {
    pub fn new(name: impl Into<String>, refers_to: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            refers_to: refers_to.into(),
            scope: None,
        }
    }

    pub fn scoped(mut self, sheet: impl Into<String>) -> Self {
        self.scope = Some(sheet.into());
        self
    }
}

/// A workbook open in the host application.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WorkbookInfo {
    pub name: String,
    pub full_path: String,
    pub saved: bool,
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ChartKind {
    #[default]
    Col,
    Bar,
    Line,
    Pie,
    Area,
    Scatter,
}

impl ChartKind {
    /// Unknown names fall back to a column chart.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "bar" => ChartKind::Bar,
            "line" => ChartKind::Line,
            "pie" => ChartKind::Pie,
            "area" => ChartKind::Area,
            "scatter" => ChartKind::Scatter,
            _ => ChartKind::Col,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ChartSpec {
    /// Top-left anchor cell.
    pub position: String,
    pub kind: ChartKind,
    pub data_range: String,
    pub title: Option<String>,
}

impl ChartSpec {
    pub fn new(position: impl Into<String>, kind: ChartKind, data_range: impl Into<String>) -> Self {
        Self {
            position: position.into(),
            kind,
            data_range: data_range.into(),
            title: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into()).filter(|t: &String| !t.is_empty());
        self
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum ValidationRule {
    List(Vec<String>),
    Whole { min: String, max: String },
    Decimal { min: String, max: String },
}

impl ValidationRule {
    /// `list` splits `formula1` on commas; `whole` and `decimal` take the
    /// bounds from `formula1` and `formula2`.
    pub fn parse(kind: &str, formula1: &str, formula2: &str) -> Result<Self> {
        match kind {
            "list" => Ok(ValidationRule::List(
                formula1.split(',').map(|s| s.to_string()).collect(),
            )),
            "whole" => Ok(ValidationRule::Whole {
                min: formula1.to_string(),
                max: formula2.to_string(),
            }),
            "decimal" => Ok(ValidationRule::Decimal {
                min: formula1.to_string(),
                max: formula2.to_string(),
            }),
            other => Err(BridgeError::InvalidFormat(format!(
                "unsupported validation type: {other}"
            ))),
        }
    }

    /// The list formula as stored in a file: a quoted, comma-joined literal.
    pub fn list_formula(items: &[String]) -> String {
        format!("\"{}\"", items.join(","))
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct DataValidation {
    pub rule: ValidationRule,
    pub allow_blank: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CellOperator {
    Between,
    NotBetween,
    Equal,
    NotEqual,
    GreaterThan,
    LessThan,
    GreaterThanOrEqual,
    LessThanOrEqual,
}

impl CellOperator {
    /// Accepts the spelled-out criteria and their symbolic forms.
    pub fn parse(criteria: &str) -> Option<Self> {
        let op = match criteria.trim().to_ascii_lowercase().as_str() {
            "between" => CellOperator::Between,
            "not between" | "notbetween" => CellOperator::NotBetween,
            "equal to" | "equal" | "=" | "==" => CellOperator::Equal,
            "not equal to" | "not equal" | "notequal" | "!=" | "<>" => CellOperator::NotEqual,
            "greater than" | "greaterthan" | ">" => CellOperator::GreaterThan,
            "less than" | "lessthan" | "<" => CellOperator::LessThan,
            "greater than or equal to" | "greaterthanorequal" | ">=" => {
                CellOperator::GreaterThanOrEqual
            }
            "less than or equal to" | "lessthanorequal" | "<=" => CellOperator::LessThanOrEqual,
            _ => return None,
        };
        Some(op)
    }

    pub fn takes_two_values(self) -> bool {
        matches!(self, CellOperator::Between | CellOperator::NotBetween)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum ConditionalRule {
    Cell {
        operator: CellOperator,
        value: String,
        value2: Option<String>,
    },
    Top {
        rank: u32,
        percent: bool,
    },
    Duplicate,
    ColorScale {
        min: Option<String>,
        max: Option<String>,
    },
    DataBar {
        min: Option<String>,
        max: Option<String>,
    },
}

impl ConditionalRule {
    pub const DEFAULT_TOP_RANK: u32 = 10;

    /// Rule types are `cell`, `top`, `duplicate`, `colorScale` and `dataBar`.
    /// For `cell` a second value implies a between test when no criteria is
    /// given; for `top` a `%` criteria ranks by percent.
    pub fn parse(rule_type: &str, criteria: &str, value: &str, value2: &str) -> Result<Self> {
        let opt = |s: &str| Some(s.to_string()).filter(|s| !s.is_empty());
        match rule_type {
            "cell" => {
                let operator = if criteria.trim().is_empty() && !value2.is_empty() {
                    CellOperator::Between
                } else {
                    CellOperator::parse(criteria).ok_or_else(|| {
                        BridgeError::InvalidFormat(format!("unsupported criteria: {criteria}"))
                    })?
                };
                if operator.takes_two_values() && value2.is_empty() {
                    return Err(BridgeError::InvalidFormat(format!(
                        "criteria '{criteria}' needs two values"
                    )));
                }
                Ok(ConditionalRule::Cell {
                    operator,
                    value: value.to_string(),
                    value2: opt(value2),
                })
            }
            "top" => {
                let rank = match value.trim() {
                    "" => Self::DEFAULT_TOP_RANK,
                    v => v
                        .parse()
                        .map_err(|_| BridgeError::InvalidFormat(format!("invalid rank: {v}")))?,
                };
                Ok(ConditionalRule::Top {
                    rank,
                    percent: criteria.contains('%'),
                })
            }
            "duplicate" => Ok(ConditionalRule::Duplicate),
            "colorScale" => Ok(ConditionalRule::ColorScale {
                min: opt(value),
                max: opt(value2),
            }),
            "dataBar" => Ok(ConditionalRule::DataBar {
                min: opt(value),
                max: opt(value2),
            }),
            other => Err(BridgeError::InvalidFormat(format!(
                "unsupported conditional format type: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ConditionalFormat {
    pub rule: ConditionalRule,
    /// `#RRGGBB`.
    pub font_color: Option<String>,
    /// `#RRGGBB`, applied as a solid fill.
    pub fill_color: Option<String>,
}

impl ConditionalFormat {
    pub fn new(rule: ConditionalRule) -> Self {
        Self {
            rule,
            font_color: None,
            fill_color: None,
        }
    }

    pub fn has_style(&self) -> bool {
        self.font_color.is_some() || self.fill_color.is_some()
    }
}

pub const DEFAULT_SCALE_MIN_COLOR: &str = "#F8696B";
pub const DEFAULT_SCALE_MAX_COLOR: &str = "#63BE7B";
pub const DEFAULT_DATA_BAR_COLOR: &str = "#638EC6";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HyperlinkTarget {
    /// A place inside the workbook, e.g. `Sheet2!A1`.
    Location,
    External,
}

impl HyperlinkTarget {
    pub fn classify(url: &str) -> Self {
        if url.contains('!') && !url.starts_with("http") {
            HyperlinkTarget::Location
        } else {
            HyperlinkTarget::External
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FindReplace {
    /// Defaults to the used dimension.
    pub range: Option<String>,
    pub find: String,
    pub replace: String,
    pub match_case: bool,
    pub match_entire_cell: bool,
}

impl FindReplace {
    pub fn new(find: impl Into<String>, replace: impl Into<String>) -> Self {
        Self {
            find: find.into(),
            replace: replace.into(),
            ..Default::default()
        }
    }

    pub fn in_range(mut self, range: impl Into<String>) -> Self {
        self.range = Some(range.into()).filter(|r: &String| !r.is_empty());
        self
    }

    pub fn match_case(mut self, yes: bool) -> Self {
        self.match_case = yes;
        self
    }

    pub fn match_entire_cell(mut self, yes: bool) -> Self {
        self.match_entire_cell = yes;
        self
    }
}

/// Workbook-level operations, implemented once per backend.
pub trait Document {
    /// Short backend identifier reported with every result.
    fn backend_name(&self) -> &'static str;

    fn capabilities(&self) -> BackendCaps;

    /// Sheet names in workbook order.
    fn sheet_names(&self) -> Result<Vec<String>>;

    /// One handle per sheet, in workbook order.
    fn get_sheets(&self) -> Result<Vec<Box<dyn Worksheet>>> {
        self.sheet_names()?
            .iter()
            .map(|name| self.find_sheet(name))
            .collect()
    }

    fn find_sheet(&self, name: &str) -> Result<Box<dyn Worksheet>>;
    fn create_sheet(&self, name: &str) -> Result<()>;

    /// Copy `src` into a new sheet `dest` placed right after `src`.
    fn copy_sheet(&self, src: &str, dest: &str) -> Result<()>;
    fn delete_sheet(&self, name: &str) -> Result<()>;
    fn rename_sheet(&self, old: &str, new: &str) -> Result<()>;

    /// Create or replace a defined name.
    fn set_defined_name(&self, name: &DefinedName) -> Result<()>;
    fn defined_names(&self) -> Result<Vec<DefinedName>>;

    fn save(&self) -> Result<()>;
}

/// Sheet-level operations. Cells and ranges use A1 notation; columns are
/// given by letter and rows by 1-based number.
pub trait Worksheet {
    fn backend_name(&self) -> &'static str;

    fn name(&self) -> Result<String>;
    fn tables(&self) -> Result<Vec<Table>>;
    fn pivot_tables(&self) -> Result<Vec<PivotTable>>;
    fn add_table(&self, range: &str, name: &str) -> Result<()>;

    fn set_value(&self, cell: &str, value: CellValue) -> Result<()>;

    /// `formula` may carry a leading `=`.
    fn set_formula(&self, cell: &str, formula: &str) -> Result<()>;

    /// Calculated value of the cell, or its literal value when it holds no
    /// formula.
    fn get_value(&self, cell: &str) -> Result<CellValue>;

    /// Formula text with a leading `=`, or the cell's value as text when
    /// the cell holds no formula.
    fn get_formula(&self, cell: &str) -> Result<String>;

    fn has_formula(&self, cell: &str) -> Result<bool>;

    /// Normalized used range, empty for an empty sheet.
    fn dimension(&self) -> Result<String>;

    /// Zero selects the default budget.
    fn paging_strategy(&self, page_size: usize) -> Result<PagingStrategy>;

    fn paging_ranges(&self, page_size: usize) -> Result<Vec<String>> {
        Ok(self.paging_strategy(page_size)?.ranges())
    }

    /// Base64-encoded PNG of the rendered range.
    fn capture_picture(&self, range: &str) -> Result<String>;

    /// Style of the top-left cell of `cell`.
    fn get_cell_style(&self, cell: &str) -> Result<CellStyle>;

    /// Apply the specified parts of `style` to every cell of `range`.
    fn set_cell_style(&self, range: &str, style: &CellStyle) -> Result<()>;

    fn merge_cells(&self, range: &str) -> Result<()>;
    fn unmerge_cells(&self, range: &str) -> Result<()>;
    fn set_column_width(&self, start_col: &str, end_col: &str, width: f64) -> Result<()>;
    fn set_row_height(&self, row: u32, height: f64) -> Result<()>;
    fn insert_rows(&self, row: u32, count: u32) -> Result<()>;
    fn delete_rows(&self, row: u32, count: u32) -> Result<()>;
    fn insert_columns(&self, column: &str, count: u32) -> Result<()>;
    fn delete_columns(&self, column: &str, count: u32) -> Result<()>;

    fn add_chart(&self, chart: &ChartSpec) -> Result<()>;

    /// Rows above and columns left of `cell` stay in view.
    fn freeze_panes(&self, cell: &str) -> Result<()>;

    fn add_data_validation(&self, range: &str, validation: &DataValidation) -> Result<()>;

    /// Returns the number of replacements made.
    fn find_replace(&self, request: &FindReplace) -> Result<usize> {
        crate::find_replace::run(self, request)
    }

    fn add_comment(&self, cell: &str, author: &str, text: &str) -> Result<()>;
    fn comments(&self) -> Result<Vec<Comment>>;

    /// When `display` is given it also becomes the cell's value.
    fn add_hyperlink(&self, cell: &str, url: &str, display: Option<&str>) -> Result<()>;

    fn set_conditional_format(&self, range: &str, format: &ConditionalFormat) -> Result<()>;
}
