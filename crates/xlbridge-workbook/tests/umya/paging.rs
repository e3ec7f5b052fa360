use crate::open;
use xlbridge_testkit::build_workbook;
use xlbridge_workbook::{
    CellValue, DEFAULT_PAGE_SIZE, Document, ErrorKind, PagingRangeService, PagingStrategy,
};

fn grid_fixture() -> std::path::PathBuf {
    build_workbook(|book| {
        let sh = book.get_sheet_by_name_mut("Sheet1").unwrap();
        for row in 1..=10u32 {
            for col in 1..=3u32 {
                sh.get_cell_mut((col, row)).set_value_number(f64::from(row * col));
            }
        }
    })
}

#[test]
fn dimension_tracks_stored_cells() {
    let path = build_workbook(|book| {
        let sh = book.get_sheet_by_name_mut("Sheet1").unwrap();
        sh.get_cell_mut("B2").set_value("top");
        sh.get_cell_mut("D5").set_value("bottom");
    });
    let doc = open(&path);
    let sheet = doc.find_sheet("Sheet1").unwrap();
    assert_eq!(sheet.dimension().unwrap(), "B2:D5");

    sheet.set_value("F8", CellValue::from(1)).unwrap();
    assert_eq!(sheet.dimension().unwrap(), "B2:F8");

    doc.create_sheet("Blank").unwrap();
    let blank = doc.find_sheet("Blank").unwrap();
    assert_eq!(blank.dimension().unwrap(), "");
    assert!(blank.paging_ranges(100).unwrap().is_empty());
}

#[test]
fn fixed_size_pages_cover_used_range() {
    let path = grid_fixture();
    let doc = open(&path);
    let sheet = doc.find_sheet("Sheet1").unwrap();

    assert_eq!(
        sheet.paging_strategy(9).unwrap(),
        PagingStrategy::FixedSize {
            dimension: "A1:C10".into(),
            page_size: 9,
        }
    );
    assert_eq!(
        sheet.paging_ranges(9).unwrap(),
        vec!["A1:C3", "A4:C6", "A7:C9", "A10:C10"]
    );
    // Too small for one row still yields one row per page.
    assert_eq!(sheet.paging_ranges(2).unwrap().len(), 10);
}

#[test]
fn zero_page_size_uses_default() {
    let path = grid_fixture();
    let doc = open(&path);
    let sheet = doc.find_sheet("Sheet1").unwrap();

    match sheet.paging_strategy(0).unwrap() {
        PagingStrategy::FixedSize { page_size, .. } => assert_eq!(page_size, DEFAULT_PAGE_SIZE),
        other => panic!("unexpected strategy {other:?}"),
    }
    assert_eq!(sheet.paging_ranges(0).unwrap(), vec!["A1:C10"]);
}

#[test]
fn service_walks_pages_by_string() {
    let path = grid_fixture();
    let doc = open(&path);
    let sheet = doc.find_sheet("Sheet1").unwrap();

    let service = PagingRangeService::new(&sheet.paging_strategy(15).unwrap());
    assert_eq!(service.first(), Some("A1:C5"));
    assert_eq!(service.next_after("A1:C5"), "A6:C10");
    assert_eq!(service.next_after("A6:C10"), "");
    assert_eq!(service.remaining(&["A1:C5".to_string()]), vec!["A6:C10"]);
}

#[test]
fn capture_is_unsupported_without_host() {
    let path = grid_fixture();
    let doc = open(&path);
    let sheet = doc.find_sheet("Sheet1").unwrap();

    let err = sheet.capture_picture("A1:C3").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnsupportedOperation);
    assert!(!doc.capabilities().picture_capture);
    assert!(!doc.capabilities().print_area_paging);
}
