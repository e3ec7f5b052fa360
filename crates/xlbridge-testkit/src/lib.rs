//! Fixture helpers shared by the xlbridge integration tests.

use std::path::{Path, PathBuf};

use umya_spreadsheet::Spreadsheet;

/// Build an xlsx file in a fresh temporary directory.
///
/// The closure receives a new book that already holds `Sheet1`. The
/// directory is kept on disk so the returned path outlives this call.
pub fn build_workbook<F>(f: F) -> PathBuf
where
    F: FnOnce(&mut Spreadsheet),
{
    let dir = tempfile::tempdir().expect("create fixture dir");
    let path = dir.keep().join("fixture.xlsx");
    write_workbook(&path, f);
    path
}

/// Build an xlsx file at `path`.
pub fn write_workbook<F>(path: &Path, f: F)
where
    F: FnOnce(&mut Spreadsheet),
{
    let mut book = umya_spreadsheet::new_file();
    f(&mut book);
    umya_spreadsheet::writer::xlsx::write(&book, path).expect("write fixture workbook");
}

/// A path inside a fresh temporary directory that does not exist yet.
pub fn missing_path(file_name: &str) -> PathBuf {
    let dir = tempfile::tempdir().expect("create fixture dir");
    dir.keep().join(file_name)
}

/// Re-read a saved workbook for assertions.
pub fn read_workbook(path: &Path) -> Spreadsheet {
    umya_spreadsheet::reader::xlsx::read(path).expect("read workbook")
}
