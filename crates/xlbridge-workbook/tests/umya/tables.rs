use crate::open;
use umya_spreadsheet::{Table as UmyaTable, TableColumn};
use xlbridge_testkit::{build_workbook, read_workbook};
use xlbridge_workbook::{Document, ErrorKind, Table};

fn header_fixture() -> std::path::PathBuf {
    build_workbook(|book| {
        let sh = book.get_sheet_by_name_mut("Sheet1").unwrap();
        sh.get_cell_mut((1, 1)).set_value("Region");
        sh.get_cell_mut((2, 1)).set_value("Amount");
        sh.get_cell_mut((1, 2)).set_value("North");
        sh.get_cell_mut((2, 2)).set_value_number(10);
        sh.get_cell_mut((1, 3)).set_value("South");
        sh.get_cell_mut((2, 3)).set_value_number(20);
    })
}

#[test]
fn existing_tables_are_listed() {
    let path = build_workbook(|book| {
        let sh = book.get_sheet_by_name_mut("Sheet1").unwrap();
        sh.get_cell_mut((1, 1)).set_value("Key");
        sh.get_cell_mut((2, 1)).set_value("Value");
        sh.get_cell_mut((1, 2)).set_value("a");
        sh.get_cell_mut((2, 2)).set_value_number(1);
        let mut table = UmyaTable::new("Lookup", ("A1", "B2"));
        table.add_column(TableColumn::new("Key"));
        table.add_column(TableColumn::new("Value"));
        sh.add_table(table);
    });
    let doc = open(&path);
    let sheet = doc.find_sheet("Sheet1").unwrap();

    assert_eq!(
        sheet.tables().unwrap(),
        vec![Table {
            name: "Lookup".into(),
            range: "A1:B2".into(),
        }]
    );
    assert!(sheet.pivot_tables().unwrap().is_empty());
}

#[test]
fn add_table_takes_headers_from_first_row() {
    let path = header_fixture();
    let doc = open(&path);
    let sheet = doc.find_sheet("Sheet1").unwrap();

    sheet.add_table("a1:c3", "Sales").unwrap();
    assert_eq!(
        sheet.tables().unwrap(),
        vec![Table {
            name: "Sales".into(),
            range: "A1:C3".into(),
        }]
    );
    doc.save().unwrap();

    let book = read_workbook(&path);
    let tables = book.get_sheet_by_name("Sheet1").unwrap().get_tables();
    assert_eq!(tables.len(), 1);
    let columns: Vec<&str> = tables[0].get_columns().iter().map(|c| c.get_name()).collect();
    assert_eq!(columns, vec!["Region", "Amount", "Column3"]);
}

#[test]
fn duplicate_table_name_is_rejected() {
    let path = header_fixture();
    let doc = open(&path);
    let sheet = doc.find_sheet("Sheet1").unwrap();

    sheet.add_table("A1:B3", "Sales").unwrap();
    let err = sheet.add_table("A1:B3", "Sales").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidFormat);
    assert_eq!(sheet.tables().unwrap().len(), 1);
}

#[test]
fn table_names_are_unique_across_sheets() {
    let path = header_fixture();
    let doc = open(&path);
    doc.find_sheet("Sheet1").unwrap().add_table("A1:B3", "Sales").unwrap();
    doc.create_sheet("Other").unwrap();

    let other = doc.find_sheet("Other").unwrap();
    let err = other.add_table("A1:B3", "SALES").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidFormat);
    assert!(other.tables().unwrap().is_empty());
}

#[test]
fn copied_sheet_gets_its_own_table_names() {
    let path = header_fixture();
    let doc = open(&path);
    doc.find_sheet("Sheet1").unwrap().add_table("A1:B3", "Sales").unwrap();

    doc.copy_sheet("Sheet1", "Copy").unwrap();
    doc.copy_sheet("Sheet1", "Copy2").unwrap();
    let names = |sheet: &str| -> Vec<String> {
        doc.find_sheet(sheet)
            .unwrap()
            .tables()
            .unwrap()
            .into_iter()
            .map(|t| t.name)
            .collect()
    };
    assert_eq!(names("Sheet1"), vec!["Sales"]);
    assert_eq!(names("Copy"), vec!["Sales_2"]);
    assert_eq!(names("Copy2"), vec!["Sales_3"]);
    doc.save().unwrap();

    let book = read_workbook(&path);
    let mut saved: Vec<String> = book
        .get_sheet_collection_no_check()
        .iter()
        .flat_map(|s| s.get_tables())
        .map(|t| t.get_display_name().to_string())
        .collect();
    saved.sort();
    assert_eq!(saved, vec!["Sales", "Sales_2", "Sales_3"]);
}
