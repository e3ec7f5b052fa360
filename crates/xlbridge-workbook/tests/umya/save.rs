use crate::open;
use xlbridge_testkit::{missing_path, read_workbook};
use xlbridge_workbook::{CellValue, Document, UmyaDocument};

#[test]
fn save_in_place_persists_edits() {
    let path = missing_path("save_test.xlsx");
    umya_spreadsheet::writer::xlsx::write(&umya_spreadsheet::new_file(), &path).unwrap();

    let doc = open(&path);
    let sheet = doc.find_sheet("Sheet1").unwrap();
    sheet.set_value("A1", CellValue::from(123.0)).unwrap();
    sheet.set_formula("B1", "=A1*2").unwrap();
    doc.save().unwrap();

    let reopened = open(&path);
    let sheet = reopened.find_sheet("Sheet1").unwrap();
    assert_eq!(sheet.get_value("A1").unwrap(), CellValue::Number(123.0));
    assert_eq!(sheet.get_formula("B1").unwrap(), "=A1*2");
}

#[test]
fn created_document_is_written_on_save() {
    let path = missing_path("fresh.xlsx");
    assert!(UmyaDocument::open(&path).err().unwrap().is_not_found());

    let doc = UmyaDocument::create(&path);
    assert_eq!(doc.sheet_names().unwrap(), vec!["Sheet1"]);
    doc.create_sheet("Summary").unwrap();
    doc.find_sheet("Summary")
        .unwrap()
        .set_value("A1", CellValue::from("ok"))
        .unwrap();
    assert!(!path.exists());
    doc.save().unwrap();

    let book = read_workbook(&path);
    assert_eq!(book.get_sheet_count(), 2);
    let reopened = open(&path);
    assert_eq!(
        reopened.find_sheet("Summary").unwrap().get_value("A1").unwrap(),
        CellValue::Text("ok".into())
    );
}

#[test]
fn structural_edits_survive_save() {
    let path = missing_path("structure.xlsx");
    let doc = UmyaDocument::create(&path);
    doc.create_sheet("Data").unwrap();
    doc.copy_sheet("Data", "Data2").unwrap();
    doc.rename_sheet("Sheet1", "Front").unwrap();
    doc.delete_sheet("Data").unwrap();
    doc.save().unwrap();

    let reopened = open(&path);
    assert_eq!(reopened.sheet_names().unwrap(), vec!["Front", "Data2"]);
}
