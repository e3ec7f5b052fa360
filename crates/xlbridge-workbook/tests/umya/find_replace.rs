use crate::open;
use xlbridge_testkit::build_workbook;
use xlbridge_workbook::{CellValue, Document, ErrorKind, FindReplace};

fn text_fixture() -> std::path::PathBuf {
    build_workbook(|book| {
        let sh = book.get_sheet_by_name_mut("Sheet1").unwrap();
        sh.get_cell_mut("A1").set_value("Draft report");
        sh.get_cell_mut("A2").set_value("draft");
        sh.get_cell_mut("B1").set_value("final");
        sh.get_cell_mut("B2").set_value("draft draft");
    })
}

fn text(doc: &dyn Document, cell: &str) -> CellValue {
    doc.find_sheet("Sheet1").unwrap().get_value(cell).unwrap()
}

#[test]
fn case_insensitive_over_used_range() {
    let path = text_fixture();
    let doc = open(&path);
    let sheet = doc.find_sheet("Sheet1").unwrap();

    let count = sheet.find_replace(&FindReplace::new("draft", "final")).unwrap();
    assert_eq!(count, 4);
    assert_eq!(text(&doc, "A1"), CellValue::Text("final report".into()));
    assert_eq!(text(&doc, "B2"), CellValue::Text("final final".into()));
}

#[test]
fn match_case_and_entire_cell() {
    let path = text_fixture();
    let doc = open(&path);
    let sheet = doc.find_sheet("Sheet1").unwrap();

    let request = FindReplace::new("draft", "done")
        .match_case(true)
        .match_entire_cell(true);
    assert_eq!(sheet.find_replace(&request).unwrap(), 1);
    assert_eq!(text(&doc, "A2"), CellValue::Text("done".into()));
    assert_eq!(text(&doc, "A1"), CellValue::Text("Draft report".into()));
    assert_eq!(text(&doc, "B2"), CellValue::Text("draft draft".into()));
}

#[test]
fn restricted_range_and_empty_needle() {
    let path = text_fixture();
    let doc = open(&path);
    let sheet = doc.find_sheet("Sheet1").unwrap();

    let request = FindReplace::new("draft", "x").in_range("B1:B2");
    assert_eq!(sheet.find_replace(&request).unwrap(), 2);
    assert_eq!(text(&doc, "A2"), CellValue::Text("draft".into()));

    let err = sheet.find_replace(&FindReplace::new("", "x")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidFormat);
}

#[test]
fn formula_cells_are_left_alone() {
    let path = build_workbook(|book| {
        let sh = book.get_sheet_by_name_mut("Sheet1").unwrap();
        sh.get_cell_mut("A1").set_value("draft");
        sh.get_cell_mut("B1").set_formula("A1&\" copy\"");
    });
    let doc = open(&path);
    let sheet = doc.find_sheet("Sheet1").unwrap();

    assert_eq!(sheet.find_replace(&FindReplace::new("draft", "final")).unwrap(), 1);
    assert_eq!(sheet.get_formula("B1").unwrap(), "=A1&\" copy\"");
    // The untouched formula now sees the replaced precedent.
    assert_eq!(text(&doc, "B1"), CellValue::Text("final copy".into()));
}
