use crate::fake::FakeApp;
use xlbridge_workbook::{AutomationDocument, CellValue, DefinedName, Document, ErrorKind};

const REPORT: &str = "C:\\Books\\Report.xlsx";

fn open_report(app: &std::rc::Rc<FakeApp>) -> AutomationDocument {
    AutomationDocument::open(app.session(), "c:/books/report.xlsx").expect("open report")
}

#[test]
fn reuses_workbook_already_open_in_host() {
    let app = FakeApp::new();
    app.workbooks.add_book(REPORT, &["Sheet1", "Data"]);

    let doc = open_report(&app);
    assert_eq!(doc.backend_name(), "automation");
    assert_eq!(doc.sheet_names().unwrap(), vec!["Sheet1", "Data"]);
    assert!(!app.calls().iter().any(|c| c.starts_with("Workbooks.Open")));
    assert!(doc.capabilities().picture_capture);
    assert!(doc.capabilities().print_area_paging);
}

#[test]
fn opens_file_from_disk_when_not_open() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("book.xlsx");
    std::fs::write(&path, b"").unwrap();
    let app = FakeApp::new();

    let doc = AutomationDocument::open(app.session(), &path).unwrap();
    assert_eq!(doc.path(), path.as_path());
    assert_eq!(
        app.calls(),
        vec![format!("Workbooks.Open {}", path.display())]
    );
}

#[test]
fn missing_file_is_not_found() {
    let app = FakeApp::new();
    let err = AutomationDocument::open(app.session(), "/no/such/dir/book.xlsx").unwrap_err();
    assert!(err.is_not_found());
    assert!(app.calls().is_empty());
}

#[test]
fn create_adds_and_saves_as() {
    let app = FakeApp::new();
    let doc = AutomationDocument::create(app.session(), "C:/out/new.xlsx").unwrap();
    assert_eq!(
        app.calls(),
        vec!["Workbooks.Add".to_string(), "SaveAs C:/out/new.xlsx".to_string()]
    );
    assert_eq!(doc.sheet_names().unwrap(), vec!["Sheet1"]);
}

#[test]
fn create_sheet_appends_and_rejects_duplicates() {
    let app = FakeApp::new();
    let book = app.workbooks.add_book(REPORT, &["Sheet1", "Data"]);
    let doc = open_report(&app);

    doc.create_sheet("Summary").unwrap();
    assert_eq!(book.sheets.names(), vec!["Sheet1", "Data", "Summary"]);
    assert!(app.calls().contains(&"Worksheets.Add after Data".to_string()));

    let err = doc.create_sheet("Data").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidFormat);
}

#[test]
fn copy_sheet_places_renamed_copy_after_source() {
    let app = FakeApp::new();
    let book = app.workbooks.add_book(REPORT, &["Sheet1", "Data"]);
    book.sheets
        .sheet("Sheet1")
        .unwrap()
        .put_value(1, 1, "header".into());
    let doc = open_report(&app);

    doc.copy_sheet("Sheet1", "Copy").unwrap();
    assert_eq!(book.sheets.names(), vec!["Sheet1", "Copy", "Data"]);
    let copy = doc.find_sheet("Copy").unwrap();
    assert_eq!(copy.get_value("A1").unwrap(), CellValue::Text("header".into()));

    assert_eq!(
        doc.copy_sheet("Sheet1", "Data").unwrap_err().kind(),
        ErrorKind::InvalidFormat
    );
    assert!(doc.copy_sheet("Nope", "Other").unwrap_err().is_not_found());
}

#[test]
fn delete_sheet_silences_alerts_around_delete() {
    let app = FakeApp::new();
    let book = app.workbooks.add_book(REPORT, &["Sheet1", "Scratch"]);
    let doc = open_report(&app);

    doc.delete_sheet("Scratch").unwrap();
    assert_eq!(book.sheets.names(), vec!["Sheet1"]);
    assert_eq!(
        app.calls(),
        vec![
            "Application.DisplayAlerts=FALSE".to_string(),
            "Delete Scratch".to_string(),
            "Application.DisplayAlerts=TRUE".to_string(),
        ]
    );
    assert!(doc.delete_sheet("Scratch").unwrap_err().is_not_found());
}

#[test]
fn rename_sheet() {
    let app = FakeApp::new();
    let book = app.workbooks.add_book(REPORT, &["Sheet1"]);
    let doc = open_report(&app);

    doc.rename_sheet("Sheet1", "Front").unwrap();
    assert_eq!(book.sheets.names(), vec!["Front"]);
    assert!(doc.rename_sheet("Sheet1", "Again").unwrap_err().is_not_found());
}

#[test]
fn defined_names_split_scope_and_drop_equals() {
    let app = FakeApp::new();
    let book = app.workbooks.add_book(REPORT, &["Sheet1", "Data"]);
    let doc = open_report(&app);

    doc.set_defined_name(&DefinedName::new("Total", "Sheet1!$A$1"))
        .unwrap();
    doc.set_defined_name(&DefinedName::new("Local", "=Data!$B$2").scoped("Data"))
        .unwrap();
    assert_eq!(
        book.names.entries(),
        vec![
            ("Total".to_string(), "=Sheet1!$A$1".to_string()),
            ("Data!Local".to_string(), "=Data!$B$2".to_string()),
        ]
    );

    let names = doc.defined_names().unwrap();
    assert_eq!(
        names,
        vec![
            DefinedName::new("Total", "Sheet1!$A$1"),
            DefinedName::new("Local", "Data!$B$2").scoped("Data"),
        ]
    );

    let err = doc
        .set_defined_name(&DefinedName::new("X", "Sheet1!$A$1").scoped("Missing"))
        .unwrap_err();
    assert!(err.is_not_found());
}

#[test]
fn save_goes_through_host() {
    let app = FakeApp::new();
    app.workbooks.add_book(REPORT, &["Sheet1"]);
    let doc = open_report(&app);

    doc.save().unwrap();
    assert_eq!(app.calls(), vec![format!("Save {REPORT}")]);
}
