use crate::open;
use xlbridge_testkit::build_workbook;
use xlbridge_workbook::{CellValue, Document, ErrorKind};

fn names(doc: &dyn Document) -> Vec<String> {
    doc.sheet_names().unwrap()
}

#[test]
fn create_rename_delete() {
    let path = build_workbook(|_| {});
    let doc = open(&path);

    doc.create_sheet("Data").unwrap();
    assert_eq!(names(&doc), vec!["Sheet1", "Data"]);

    doc.rename_sheet("Data", "Archive").unwrap();
    assert_eq!(names(&doc), vec!["Sheet1", "Archive"]);
    assert!(doc.find_sheet("Data").err().unwrap().is_not_found());

    doc.delete_sheet("Archive").unwrap();
    assert_eq!(names(&doc), vec!["Sheet1"]);
    assert!(doc.delete_sheet("Archive").unwrap_err().is_not_found());
}

#[test]
fn copy_lands_after_source_with_contents() {
    let path = build_workbook(|book| {
        let sh = book.get_sheet_by_name_mut("Sheet1").unwrap();
        sh.get_cell_mut((1, 1)).set_value("header");
        book.new_sheet("Tail").unwrap();
    });
    let doc = open(&path);

    doc.copy_sheet("Sheet1", "Copy").unwrap();
    assert_eq!(names(&doc), vec!["Sheet1", "Copy", "Tail"]);
    let copy = doc.find_sheet("Copy").unwrap();
    assert_eq!(copy.name().unwrap(), "Copy");
    assert_eq!(copy.get_value("A1").unwrap(), CellValue::Text("header".into()));

    // The copy is independent of its source.
    copy.set_value("A1", CellValue::from("changed")).unwrap();
    let source = doc.find_sheet("Sheet1").unwrap();
    assert_eq!(source.get_value("A1").unwrap(), CellValue::Text("header".into()));
}

#[test]
fn copy_onto_existing_or_missing_sheet_fails() {
    let path = build_workbook(|book| {
        book.new_sheet("Other").unwrap();
    });
    let doc = open(&path);

    let err = doc.copy_sheet("Sheet1", "Other").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidFormat);
    assert!(doc.copy_sheet("Nope", "Fresh").unwrap_err().is_not_found());
    assert_eq!(names(&doc), vec!["Sheet1", "Other"]);
}

#[test]
fn get_sheets_follows_workbook_order() {
    let path = build_workbook(|book| {
        book.new_sheet("B").unwrap();
        book.new_sheet("C").unwrap();
    });
    let doc = open(&path);

    let sheets = doc.get_sheets().unwrap();
    let seen: Vec<String> = sheets.iter().map(|s| s.name().unwrap()).collect();
    assert_eq!(seen, vec!["Sheet1", "B", "C"]);
    assert!(sheets.iter().all(|s| s.backend_name() == "umya"));
}
