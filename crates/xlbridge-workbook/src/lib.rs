//! Spreadsheet documents behind one set of capability traits.
//!
//! A [`Document`] is served either by a live host application driven over
//! automation or by reading and writing the xlsx file directly.
//! [`BackendSelector`] picks one per path, and callers only ever see the
//! traits.
//!
//! ```no_run
//! use xlbridge_workbook::{BackendSelector, CellValue, OpenOptions};
//!
//! let doc = BackendSelector::new(OpenOptions::direct_file_only()).open("report.xlsx")?;
//! let sheet = doc.find_sheet("Sheet1")?;
//! sheet.set_value("A1", CellValue::from("Total"))?;
//! sheet.set_formula("B1", "=SUM(B2:B20)")?;
//! for page in sheet.paging_ranges(doc.page_size())? {
//!     println!("{page}");
//! }
//! doc.save()?;
//! # Ok::<(), xlbridge_workbook::BridgeError>(())
//! ```

mod address;
pub mod backends;
pub mod config;
pub mod error;
pub mod find_replace;
pub mod paging;
pub mod selector;
pub mod traits;

pub use backends::{
    AutomationDocument, AutomationWorksheet, HostApplication, UmyaDocument, UmyaWorksheet,
};
pub use config::{DEFAULT_PAGE_SIZE, OpenOptions, effective_page_size};
pub use error::{BridgeError, ErrorKind, Result};
pub use paging::{
    PagingRangeService, PagingStrategy, PrintLayout, filter_remaining, find_next_range,
    fixed_size_ranges, print_area_ranges, select_strategy,
};
pub use selector::{BackendSelector, OpenedDocument};
pub use traits::{
    BackendCaps, CellOperator, CellValue, ChartKind, ChartSpec, Comment, ConditionalFormat,
    ConditionalRule, DataValidation, DefinedName, Document, FindReplace, HyperlinkTarget,
    PivotTable, Table, ValidationRule, WorkbookInfo, Worksheet,
};

// Re-export for convenience
pub use xlbridge_common::{CellRange, CellStyle, normalize_range};
