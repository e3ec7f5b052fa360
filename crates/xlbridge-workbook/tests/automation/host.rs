use crate::fake::{FakeApp, FakeConnector};
use xlbridge_workbook::backends::automation::Variant;
use xlbridge_workbook::{
    BackendSelector, Document, ErrorKind, HostApplication, OpenOptions, WorkbookInfo,
};

const REPORT: &str = "C:\\Books\\Report.xlsx";

#[test]
fn lists_readable_workbooks() {
    let app = FakeApp::new();
    app.workbooks.add_book(REPORT, &["Sheet1"]);
    let broken = app.workbooks.add_book("C:\\Books\\Locked.xlsx", &["Sheet1"]);
    broken.readable.set(false);

    let host = HostApplication::from_session(app.session());
    assert_eq!(
        host.list_workbooks().unwrap(),
        vec![WorkbookInfo {
            name: "Report.xlsx".into(),
            full_path: REPORT.into(),
            saved: true,
        }]
    );
}

#[test]
fn opening_reveals_host_when_asked() {
    let app = FakeApp::new();
    app.workbooks.add_book(REPORT, &["Sheet1"]);

    let host = HostApplication::from_session(app.session());
    let doc = host.open_workbook("c:/books/report.xlsx").unwrap();
    assert_eq!(doc.sheet_names().unwrap(), vec!["Sheet1"]);
    assert_eq!(app.prop("Visible"), Some(Variant::Bool(true)));
}

#[test]
fn hidden_host_stays_hidden() {
    let app = FakeApp::new();
    let options = OpenOptions::default().with_show_host_application(false);
    let host = HostApplication::with_connector(&FakeConnector(app.clone()), &options).unwrap();

    host.create_workbook("C:/out/new.xlsx").unwrap();
    assert_eq!(app.prop("Visible"), None);
    assert_eq!(
        app.calls(),
        vec!["Workbooks.Add", "SaveAs C:/out/new.xlsx"]
    );
}

#[test]
fn runs_macros_with_string_arguments() {
    let app = FakeApp::new();
    let host = HostApplication::from_session(app.session());

    let result = host.run_macro("Module1.Build", &["a", "b"]).unwrap();
    assert_eq!(result, "ran Module1.Build,a,b");
    assert_eq!(app.calls(), vec!["Run Module1.Build a b"]);

    let err = host.run_macro("  ", &[]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidFormat);
    assert_eq!(app.calls().len(), 1);
}

#[test]
fn selector_prefers_live_host() {
    let app = FakeApp::new();
    app.workbooks.add_book(REPORT, &["Sheet1", "Data"]);
    let selector = BackendSelector::with_connector(OpenOptions::default(), FakeConnector(app));

    let doc = selector.open("c:/books/report.xlsx").unwrap();
    assert_eq!(doc.backend_name(), "automation");
    assert!(!doc.is_new());
    assert_eq!(doc.sheet_names().unwrap(), vec!["Sheet1", "Data"]);
}

#[test]
fn selector_falls_back_when_host_cannot_open() {
    let app = FakeApp::new();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("new.xlsx");
    let selector =
        BackendSelector::with_connector(OpenOptions::default(), FakeConnector(app.clone()));

    let doc = selector.open(&path).unwrap();
    assert_eq!(doc.backend_name(), "umya");
    assert!(doc.is_new());
    assert!(app.calls().is_empty());
}
