//! An in-memory stand-in for the host object model.
//!
//! Only the members the backend touches are modelled. Every write and
//! method call is appended to a shared log so tests can assert on the
//! sequence the backend issued.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::rc::{Rc, Weak};

use xlbridge_common::CellRange;
use xlbridge_workbook::BridgeError;
use xlbridge_workbook::backends::automation::{Connector, Dispatch, Session, Variant};
use xlbridge_workbook::{OpenOptions, Result};

pub type Log = Rc<RefCell<Vec<String>>>;

fn missing(object: &str, member: &str) -> BridgeError {
    BridgeError::from_backend("fake", format!("{object}.{member} is not modelled"))
}

fn arg(args: &[Variant], i: usize) -> Variant {
    args.get(i).cloned().unwrap_or_default()
}

fn index(args: &[Variant], len: usize) -> Result<usize> {
    let i = arg(args, 0).as_i64()?;
    if i < 1 || i as usize > len {
        return Err(BridgeError::from_backend("fake", format!("index {i} out of range")));
    }
    Ok(i as usize - 1)
}

fn address(area: &CellRange) -> String {
    if area.is_single_cell() {
        area.start_cell()
    } else {
        area.to_string()
    }
}

/// A bag of properties. Methods with no arguments read the same bag.
pub struct Props {
    values: RefCell<BTreeMap<String, Variant>>,
}

impl Props {
    pub fn new<const N: usize>(entries: [(&str, Variant); N]) -> Rc<Self> {
        Rc::new(Self {
            values: RefCell::new(
                entries
                    .into_iter()
                    .map(|(k, v)| (k.to_string(), v))
                    .collect(),
            ),
        })
    }
}

impl Dispatch for Props {
    fn get(&self, name: &str, _args: &[Variant]) -> Result<Variant> {
        self.values
            .borrow()
            .get(name)
            .cloned()
            .ok_or_else(|| missing("Props", name))
    }

    fn put(&self, name: &str, _args: &[Variant], value: Variant) -> Result<()> {
        self.values.borrow_mut().insert(name.to_string(), value);
        Ok(())
    }

    fn call(&self, name: &str, args: &[Variant]) -> Result<Variant> {
        self.get(name, args)
    }
}

/// Read-only `Count`/`Item` collection.
struct List(Vec<Rc<dyn Dispatch>>);

impl Dispatch for List {
    fn get(&self, name: &str, args: &[Variant]) -> Result<Variant> {
        match name {
            "Count" => Ok(Variant::Int(self.0.len() as i64)),
            "Item" => Ok(Variant::Object(Rc::clone(&self.0[index(args, self.0.len())?]))),
            _ => Err(missing("List", name)),
        }
    }

    fn put(&self, name: &str, _args: &[Variant], _value: Variant) -> Result<()> {
        Err(missing("List", name))
    }

    fn call(&self, name: &str, _args: &[Variant]) -> Result<Variant> {
        Err(missing("List", name))
    }
}

/// Accepts any write or call and only logs it.
struct Recorder {
    log: Log,
    label: String,
}

impl Dispatch for Recorder {
    fn get(&self, name: &str, _args: &[Variant]) -> Result<Variant> {
        Err(missing(&self.label, name))
    }

    fn put(&self, name: &str, _args: &[Variant], value: Variant) -> Result<()> {
        let line = format!("{}.{name}={}", self.label, value.to_text());
        self.log.borrow_mut().push(line);
        Ok(())
    }

    fn call(&self, name: &str, _args: &[Variant]) -> Result<Variant> {
        self.log.borrow_mut().push(format!("{} {name}", self.label));
        Ok(Variant::Empty)
    }
}

pub struct FakeApp {
    pub log: Log,
    pub workbooks: Rc<FakeWorkbooks>,
    props: RefCell<BTreeMap<String, Variant>>,
}

impl FakeApp {
    pub fn new() -> Rc<Self> {
        let log: Log = Rc::default();
        Rc::new(Self {
            workbooks: Rc::new(FakeWorkbooks {
                log: Rc::clone(&log),
                books: RefCell::default(),
            }),
            log,
            props: RefCell::default(),
        })
    }

    pub fn session(self: &Rc<Self>) -> Session {
        Session::from_application(Rc::clone(self) as Rc<dyn Dispatch>)
    }

    pub fn calls(&self) -> Vec<String> {
        self.log.borrow().clone()
    }

    pub fn prop(&self, name: &str) -> Option<Variant> {
        self.props.borrow().get(name).cloned()
    }
}

impl Dispatch for FakeApp {
    fn get(&self, name: &str, _args: &[Variant]) -> Result<Variant> {
        match name {
            "Workbooks" => Ok(Variant::Object(Rc::clone(&self.workbooks) as Rc<dyn Dispatch>)),
            _ => self.prop(name).ok_or_else(|| missing("Application", name)),
        }
    }

    fn put(&self, name: &str, _args: &[Variant], value: Variant) -> Result<()> {
        let line = format!("Application.{name}={}", value.to_text());
        self.log.borrow_mut().push(line);
        self.props.borrow_mut().insert(name.to_string(), value);
        Ok(())
    }

    fn call(&self, name: &str, args: &[Variant]) -> Result<Variant> {
        match name {
            "Run" => {
                let texts: Vec<String> = args.iter().map(Variant::to_text).collect();
                self.log.borrow_mut().push(format!("Run {}", texts.join(" ")));
                Ok(Variant::Text(format!("ran {}", texts.join(","))))
            }
            _ => Err(missing("Application", name)),
        }
    }
}

/// Connects every time to the same fake application.
pub struct FakeConnector(pub Rc<FakeApp>);

impl Connector for FakeConnector {
    fn connect(&self, _options: &OpenOptions) -> Result<Session> {
        Ok(self.0.session())
    }
}

pub struct FakeWorkbooks {
    log: Log,
    books: RefCell<Vec<Rc<FakeWorkbook>>>,
}

impl FakeWorkbooks {
    /// A workbook the host already has open.
    pub fn add_book(&self, full_name: &str, sheets: &[&str]) -> Rc<FakeWorkbook> {
        let names = Rc::new(FakeNames::default());
        let book = Rc::new(FakeWorkbook {
            log: Rc::clone(&self.log),
            full_name: RefCell::new(full_name.to_string()),
            sheets: FakeSheets::new(&self.log, &names, sheets),
            names,
            readable: Cell::new(true),
        });
        self.books.borrow_mut().push(Rc::clone(&book));
        book
    }
}

impl Dispatch for FakeWorkbooks {
    fn get(&self, name: &str, args: &[Variant]) -> Result<Variant> {
        let books = self.books.borrow();
        match name {
            "Count" => Ok(Variant::Int(books.len() as i64)),
            "Item" => Ok(Variant::Object(
                Rc::clone(&books[index(args, books.len())?]) as Rc<dyn Dispatch>
            )),
            _ => Err(missing("Workbooks", name)),
        }
    }

    fn put(&self, name: &str, _args: &[Variant], _value: Variant) -> Result<()> {
        Err(missing("Workbooks", name))
    }

    fn call(&self, name: &str, args: &[Variant]) -> Result<Variant> {
        match name {
            "Open" => {
                let path = arg(args, 0).to_text();
                self.log.borrow_mut().push(format!("Workbooks.Open {path}"));
                Ok(Variant::Object(self.add_book(&path, &["Sheet1"])))
            }
            "Add" => {
                self.log.borrow_mut().push("Workbooks.Add".to_string());
                Ok(Variant::Object(self.add_book("Book1", &["Sheet1"])))
            }
            _ => Err(missing("Workbooks", name)),
        }
    }
}

pub struct FakeWorkbook {
    log: Log,
    pub full_name: RefCell<String>,
    pub sheets: Rc<FakeSheets>,
    pub names: Rc<FakeNames>,
    /// Cleared to make property reads fail.
    pub readable: Cell<bool>,
}

impl Dispatch for FakeWorkbook {
    fn get(&self, name: &str, _args: &[Variant]) -> Result<Variant> {
        if !self.readable.get() {
            return Err(missing("Workbook", name));
        }
        let full_name = self.full_name.borrow().clone();
        match name {
            "FullName" => Ok(Variant::Text(full_name)),
            "Name" => {
                let file = full_name.rsplit(['\\', '/']).next().unwrap_or_default();
                Ok(Variant::from(file))
            }
            "Saved" => Ok(Variant::Bool(true)),
            "Worksheets" => Ok(Variant::Object(Rc::clone(&self.sheets) as Rc<dyn Dispatch>)),
            "Names" => Ok(Variant::Object(Rc::clone(&self.names) as Rc<dyn Dispatch>)),
            _ => Err(missing("Workbook", name)),
        }
    }

    fn put(&self, name: &str, _args: &[Variant], _value: Variant) -> Result<()> {
        Err(missing("Workbook", name))
    }

    fn call(&self, name: &str, args: &[Variant]) -> Result<Variant> {
        match name {
            "Save" => {
                let line = format!("Save {}", self.full_name.borrow());
                self.log.borrow_mut().push(line);
                Ok(Variant::Empty)
            }
            "SaveAs" => {
                let path = arg(args, 0).to_text();
                self.log.borrow_mut().push(format!("SaveAs {path}"));
                *self.full_name.borrow_mut() = path;
                Ok(Variant::Empty)
            }
            _ => Err(missing("Workbook", name)),
        }
    }
}

/// Workbook names. Sheet-scoped entries are stored as `Sheet!Name`.
#[derive(Default)]
pub struct FakeNames {
    entries: RefCell<Vec<(String, String)>>,
}

impl FakeNames {
    fn add(&self, name: String, refers_to: String) {
        let mut entries = self.entries.borrow_mut();
        entries.retain(|(n, _)| *n != name);
        entries.push((name, refers_to));
    }

    pub fn entries(&self) -> Vec<(String, String)> {
        self.entries.borrow().clone()
    }
}

impl Dispatch for FakeNames {
    fn get(&self, name: &str, args: &[Variant]) -> Result<Variant> {
        let entries = self.entries.borrow();
        match name {
            "Count" => Ok(Variant::Int(entries.len() as i64)),
            "Item" => {
                let (name, refers_to) = &entries[index(args, entries.len())?];
                Ok(Variant::Object(Props::new([
                    ("Name", Variant::from(name.as_str())),
                    ("RefersTo", Variant::from(refers_to.as_str())),
                ])))
            }
            _ => Err(missing("Names", name)),
        }
    }

    fn put(&self, name: &str, _args: &[Variant], _value: Variant) -> Result<()> {
        Err(missing("Names", name))
    }

    fn call(&self, name: &str, args: &[Variant]) -> Result<Variant> {
        match name {
            "Add" => {
                self.add(arg(args, 0).to_text(), arg(args, 1).to_text());
                Ok(Variant::Empty)
            }
            _ => Err(missing("Names", name)),
        }
    }
}

/// The `Names` collection seen from a sheet.
struct SheetNames {
    names: Rc<FakeNames>,
    sheet: String,
}

impl Dispatch for SheetNames {
    fn get(&self, name: &str, _args: &[Variant]) -> Result<Variant> {
        Err(missing("Sheet.Names", name))
    }

    fn put(&self, name: &str, _args: &[Variant], _value: Variant) -> Result<()> {
        Err(missing("Sheet.Names", name))
    }

    fn call(&self, name: &str, args: &[Variant]) -> Result<Variant> {
        match name {
            "Add" => {
                let scoped = format!("{}!{}", self.sheet, arg(args, 0).to_text());
                self.names.add(scoped, arg(args, 1).to_text());
                Ok(Variant::Empty)
            }
            _ => Err(missing("Sheet.Names", name)),
        }
    }
}

pub struct FakeSheets {
    log: Log,
    this: Weak<FakeSheets>,
    names: Rc<FakeNames>,
    list: RefCell<Vec<Rc<FakeSheet>>>,
}

impl FakeSheets {
    fn new(log: &Log, names: &Rc<FakeNames>, sheets: &[&str]) -> Rc<Self> {
        let collection = Rc::new_cyclic(|this: &Weak<FakeSheets>| FakeSheets {
            log: Rc::clone(log),
            this: this.clone(),
            names: Rc::clone(names),
            list: RefCell::default(),
        });
        for name in sheets {
            let sheet = collection.make_sheet(name);
            collection.list.borrow_mut().push(sheet);
        }
        collection
    }

    fn make_sheet(&self, name: &str) -> Rc<FakeSheet> {
        Rc::new_cyclic(|this| FakeSheet {
            log: Rc::clone(&self.log),
            this: this.clone(),
            parent: self.this.clone(),
            names: Rc::clone(&self.names),
            name: RefCell::new(name.to_string()),
            cells: RefCell::default(),
            print_area: RefCell::default(),
            breaks: RefCell::default(),
            tables: RefCell::default(),
            comments: RefCell::default(),
        })
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.list
            .borrow()
            .iter()
            .position(|s| *s.name.borrow() == name)
    }

    pub fn sheet(&self, name: &str) -> Option<Rc<FakeSheet>> {
        let at = self.position(name)?;
        self.list.borrow().get(at).cloned()
    }

    pub fn names(&self) -> Vec<String> {
        self.list
            .borrow()
            .iter()
            .map(|s| s.name.borrow().clone())
            .collect()
    }
}

impl Dispatch for FakeSheets {
    fn get(&self, name: &str, args: &[Variant]) -> Result<Variant> {
        let list = self.list.borrow();
        match name {
            "Count" => Ok(Variant::Int(list.len() as i64)),
            "Item" => Ok(Variant::Object(
                Rc::clone(&list[index(args, list.len())?]) as Rc<dyn Dispatch>
            )),
            _ => Err(missing("Worksheets", name)),
        }
    }

    fn put(&self, name: &str, _args: &[Variant], _value: Variant) -> Result<()> {
        Err(missing("Worksheets", name))
    }

    fn call(&self, name: &str, args: &[Variant]) -> Result<Variant> {
        if name != "Add" {
            return Err(missing("Worksheets", name));
        }
        let after = match arg(args, 1) {
            Variant::Object(sheet) => Some(sheet.text("Name")?),
            _ => None,
        };
        let count = self.list.borrow().len();
        let fresh = (count + 1..)
            .map(|n| format!("Sheet{n}"))
            .find(|n| self.position(n).is_none())
            .unwrap_or_default();
        let at = match &after {
            Some(after) => self.position(after).map_or(count, |i| i + 1),
            None => 0,
        };
        let sheet = self.make_sheet(&fresh);
        self.list.borrow_mut().insert(at, Rc::clone(&sheet));
        self.log
            .borrow_mut()
            .push(format!("Worksheets.Add after {}", after.unwrap_or_default()));
        Ok(Variant::Object(sheet))
    }
}

#[derive(Clone, Default)]
pub struct FakeCell {
    pub value: Variant,
    pub formula: Option<String>,
}

pub struct FakeSheet {
    log: Log,
    this: Weak<FakeSheet>,
    parent: Weak<FakeSheets>,
    names: Rc<FakeNames>,
    pub name: RefCell<String>,
    pub cells: RefCell<BTreeMap<(u32, u32), FakeCell>>,
    pub print_area: RefCell<String>,
    pub breaks: RefCell<Vec<u32>>,
    tables: RefCell<Vec<Rc<Props>>>,
    comments: RefCell<Vec<(CellRange, String)>>,
}

impl FakeSheet {
    pub fn put_value(&self, col: u32, row: u32, value: Variant) {
        self.cells.borrow_mut().insert(
            (col, row),
            FakeCell {
                value,
                formula: None,
            },
        );
    }

    fn range(&self, area: CellRange) -> Result<Variant> {
        let sheet = self
            .this
            .upgrade()
            .ok_or_else(|| missing("Worksheet", "Range"))?;
        Ok(Variant::Object(Rc::new(FakeRange {
            log: Rc::clone(&self.log),
            sheet,
            area,
        })))
    }

    fn used_area(&self) -> Result<CellRange> {
        let cells = self.cells.borrow();
        let used = cells
            .iter()
            .filter(|(_, c)| !c.value.is_empty() || c.formula.is_some())
            .map(|(k, _)| *k);
        let mut bounds: Option<(u32, u32, u32, u32)> = None;
        for (c, r) in used {
            bounds = Some(match bounds {
                None => (c, r, c, r),
                Some((c0, r0, c1, r1)) => (c0.min(c), r0.min(r), c1.max(c), r1.max(r)),
            });
        }
        let (c0, r0, c1, r1) = bounds.unwrap_or((1, 1, 1, 1));
        Ok(CellRange::new(c0, r0, c1, r1)?)
    }

    fn band(&self, kind: &str, args: &[Variant]) -> Variant {
        Variant::Object(Rc::new(Recorder {
            log: Rc::clone(&self.log),
            label: format!("{kind} {}", arg(args, 0).to_text()),
        }))
    }

    fn detached_copy(&self, name: String) -> Option<Rc<FakeSheet>> {
        let parent = self.parent.upgrade()?;
        let copy = parent.make_sheet(&name);
        *copy.cells.borrow_mut() = self.cells.borrow().clone();
        Some(copy)
    }
}

impl Dispatch for FakeSheet {
    fn get(&self, name: &str, args: &[Variant]) -> Result<Variant> {
        match name {
            "Name" => Ok(Variant::Text(self.name.borrow().clone())),
            "Index" => {
                let parent = self.parent.upgrade().ok_or_else(|| missing("Worksheet", name))?;
                let at = parent
                    .position(&self.name.borrow())
                    .ok_or_else(|| missing("Worksheet", name))?;
                Ok(Variant::Int(at as i64 + 1))
            }
            "Range" => self.range(CellRange::parse(&arg(args, 0).to_text())?),
            "UsedRange" => self.range(self.used_area()?),
            "Rows" => Ok(self.band("Rows", args)),
            "Columns" => Ok(self.band("Columns", args)),
            "PageSetup" => Ok(Variant::Object(Props::new([(
                "PrintArea",
                Variant::Text(self.print_area.borrow().clone()),
            )]))),
            "HPageBreaks" => {
                let breaks = self
                    .breaks
                    .borrow()
                    .iter()
                    .map(|row| {
                        let location = Props::new([("Row", Variant::from(*row))]);
                        Props::new([("Location", Variant::Object(location))]) as Rc<dyn Dispatch>
                    })
                    .collect();
                Ok(Variant::Object(Rc::new(List(breaks))))
            }
            "ListObjects" => {
                let sheet = self.this.upgrade().ok_or_else(|| missing("Worksheet", name))?;
                Ok(Variant::Object(Rc::new(FakeLists { sheet })))
            }
            "Names" => Ok(Variant::Object(Rc::new(SheetNames {
                names: Rc::clone(&self.names),
                sheet: self.name.borrow().clone(),
            }))),
            "Comments" => {
                let mut list: Vec<Rc<dyn Dispatch>> = Vec::new();
                for (area, text) in self.comments.borrow().iter() {
                    list.push(Props::new([
                        ("Parent", self.range(*area)?),
                        ("Author", Variant::from("host user")),
                        ("Text", Variant::from(text.as_str())),
                    ]));
                }
                Ok(Variant::Object(Rc::new(List(list))))
            }
            _ => Err(missing("Worksheet", name)),
        }
    }

    fn put(&self, name: &str, _args: &[Variant], value: Variant) -> Result<()> {
        match name {
            "Name" => {
                *self.name.borrow_mut() = value.to_text();
                Ok(())
            }
            _ => Err(missing("Worksheet", name)),
        }
    }

    fn call(&self, name: &str, args: &[Variant]) -> Result<Variant> {
        let own = self.name.borrow().clone();
        let parent = self.parent.upgrade().ok_or_else(|| missing("Worksheet", name))?;
        match name {
            "Delete" => {
                parent.list.borrow_mut().retain(|s| *s.name.borrow() != own);
                self.log.borrow_mut().push(format!("Delete {own}"));
                Ok(Variant::Empty)
            }
            "Copy" => {
                let after = match arg(args, 1) {
                    Variant::Object(sheet) => sheet.text("Name")?,
                    _ => own.clone(),
                };
                let copy = self
                    .detached_copy(format!("{own} (2)"))
                    .ok_or_else(|| missing("Worksheet", name))?;
                let at = parent.position(&after).map_or(0, |i| i + 1);
                parent.list.borrow_mut().insert(at, copy);
                self.log.borrow_mut().push(format!("Copy {own} after {after}"));
                Ok(Variant::Empty)
            }
            "PivotTables" => Ok(Variant::Object(Rc::new(List(Vec::new())))),
            _ => Err(missing("Worksheet", name)),
        }
    }
}

struct FakeLists {
    sheet: Rc<FakeSheet>,
}

impl Dispatch for FakeLists {
    fn get(&self, name: &str, args: &[Variant]) -> Result<Variant> {
        let tables = self.sheet.tables.borrow();
        match name {
            "Count" => Ok(Variant::Int(tables.len() as i64)),
            "Item" => Ok(Variant::Object(
                Rc::clone(&tables[index(args, tables.len())?]) as Rc<dyn Dispatch>
            )),
            _ => Err(missing("ListObjects", name)),
        }
    }

    fn put(&self, name: &str, _args: &[Variant], _value: Variant) -> Result<()> {
        Err(missing("ListObjects", name))
    }

    fn call(&self, name: &str, args: &[Variant]) -> Result<Variant> {
        if name != "Add" {
            return Err(missing("ListObjects", name));
        }
        let count = self.sheet.tables.borrow().len();
        let list = Props::new([
            ("Name", Variant::from(format!("Table{}", count + 1))),
            ("Range", arg(args, 1)),
        ]);
        self.sheet.tables.borrow_mut().push(Rc::clone(&list));
        Ok(Variant::Object(list))
    }
}

struct FakeRange {
    log: Log,
    sheet: Rc<FakeSheet>,
    area: CellRange,
}

impl FakeRange {
    fn top_left(&self) -> FakeCell {
        self.sheet
            .cells
            .borrow()
            .get(&(self.area.start_col, self.area.start_row))
            .cloned()
            .unwrap_or_default()
    }

    fn fill(&self, cell: FakeCell) {
        let mut cells = self.sheet.cells.borrow_mut();
        for key in self.area.cells() {
            cells.insert(key, cell.clone());
        }
    }
}

impl Dispatch for FakeRange {
    fn get(&self, name: &str, _args: &[Variant]) -> Result<Variant> {
        let cell = self.top_left();
        match name {
            "Value" => Ok(cell.value),
            "HasFormula" => Ok(Variant::Bool(cell.formula.is_some())),
            "Formula" => Ok(cell.formula.map_or(cell.value, Variant::Text)),
            "Address" => Ok(Variant::Text(address(&self.area))),
            _ => Err(missing("Range", name)),
        }
    }

    fn put(&self, name: &str, _args: &[Variant], value: Variant) -> Result<()> {
        match name {
            "Value" => self.fill(FakeCell {
                value,
                formula: None,
            }),
            "Formula" => self.fill(FakeCell {
                value: Variant::Empty,
                formula: Some(value.to_text()),
            }),
            _ => {
                let line = format!("{}.{name}={}", address(&self.area), value.to_text());
                self.log.borrow_mut().push(line);
            }
        }
        Ok(())
    }

    fn call(&self, name: &str, args: &[Variant]) -> Result<Variant> {
        match name {
            "AddComment" => {
                let cell = CellRange::single(self.area.start_col, self.area.start_row)?;
                self.sheet
                    .comments
                    .borrow_mut()
                    .push((cell, arg(args, 0).to_text()));
            }
            "ClearComments" => {
                let area = self.area;
                self.sheet
                    .comments
                    .borrow_mut()
                    .retain(|(cell, _)| !area.contains(cell.start_col, cell.start_row));
            }
            _ => {}
        }
        self.log
            .borrow_mut()
            .push(format!("{} {name}", address(&self.area)));
        Ok(Variant::Empty)
    }
}
