use std::fmt;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use tracing::debug;

use super::dispatch::{Dispatch, Variant, items, set};
use super::session::Session;
use super::worksheet::AutomationWorksheet;
use super::BACKEND;
use crate::error::{BridgeError, Result};
use crate::traits::{BackendCaps, DefinedName, Document, Worksheet};

/// Host paths compare without regard to case or separator style.
fn same_path(full_name: &str, path: &Path) -> bool {
    let canon = |s: &str| s.replace('/', "\\").to_lowercase();
    canon(full_name) == canon(&path.display().to_string())
}

/// `Sheet1!Local` and `'My Sheet'!Local` are sheet-scoped.
fn split_scope(name: &str) -> (Option<String>, &str) {
    match name.rsplit_once('!') {
        Some((sheet, local)) => {
            let sheet = sheet
                .strip_prefix('\'')
                .and_then(|s| s.strip_suffix('\''))
                .map_or_else(|| sheet.to_string(), |s| s.replace("''", "'"));
            (Some(sheet), local)
        }
        None => (None, name),
    }
}

fn formula_text(refers_to: &str) -> String {
    let trimmed = refers_to.trim();
    if trimmed.starts_with('=') {
        trimmed.to_string()
    } else {
        format!("={trimmed}")
    }
}

/// A workbook open in the host application.
pub struct AutomationDocument {
    workbook: Rc<dyn Dispatch>,
    session: Rc<Session>,
    path: PathBuf,
}

impl AutomationDocument {
    /// Use the workbook when the host already has `path` open, otherwise
    /// open it. A missing file is reported as `NotFound`.
    pub fn open(session: Session, path: impl AsRef<Path>) -> Result<Self> {
        Self::open_in(Rc::new(session), path.as_ref())
    }

    /// Add a workbook in the host and save it as `path`.
    pub fn create(session: Session, path: impl AsRef<Path>) -> Result<Self> {
        Self::create_in(Rc::new(session), path.as_ref())
    }

    pub(super) fn open_in(session: Rc<Session>, path: &Path) -> Result<Self> {
        let workbooks = session.workbooks()?;
        let already_open = items(workbooks.as_ref())?
            .into_iter()
            .find(|wb| wb.text("FullName").is_ok_and(|full| same_path(&full, path)));
        let workbook = match already_open {
            Some(workbook) => {
                debug!(path = %path.display(), "workbook already open in host");
                workbook
            }
            None => {
                if !path.exists() {
                    return Err(BridgeError::not_found("file", path.display().to_string()));
                }
                let opened = workbooks
                    .call_object("Open", &[Variant::from(path.display().to_string())])?;
                debug!(path = %path.display(), "opened workbook in host");
                opened
            }
        };
        Ok(Self {
            workbook,
            session,
            path: path.to_path_buf(),
        })
    }

    pub(super) fn create_in(session: Rc<Session>, path: &Path) -> Result<Self> {
        let workbook = session.workbooks()?.call_object("Add", &[])?;
        workbook.call("SaveAs", &[Variant::from(path.display().to_string())])?;
        debug!(path = %path.display(), "created workbook in host");
        Ok(Self {
            workbook,
            session,
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn worksheet(&self, name: &str) -> Result<AutomationWorksheet> {
        let sheet = self
            .find(name)?
            .ok_or_else(|| BridgeError::not_found("sheet", name))?;
        Ok(AutomationWorksheet::new(sheet, Rc::clone(&self.session)))
    }

    fn worksheets(&self) -> Result<Rc<dyn Dispatch>> {
        self.workbook.object("Worksheets", &[])
    }

    fn find(&self, name: &str) -> Result<Option<Rc<dyn Dispatch>>> {
        for sheet in items(self.worksheets()?.as_ref())? {
            if sheet.text("Name")? == name {
                return Ok(Some(sheet));
            }
        }
        Ok(None)
    }

    fn require_absent(&self, name: &str) -> Result<()> {
        if self.find(name)?.is_some() {
            return Err(BridgeError::InvalidFormat(format!(
                "sheet '{name}' already exists"
            )));
        }
        Ok(())
    }
}

impl Document for AutomationDocument {
    fn backend_name(&self) -> &'static str {
        BACKEND
    }

    fn capabilities(&self) -> BackendCaps {
        BackendCaps {
            picture_capture: true,
            print_area_paging: true,
            pivot_tables: true,
            live_calculation: true,
            charts: true,
            comments: true,
            conditional_formats: true,
        }
    }

    fn sheet_names(&self) -> Result<Vec<String>> {
        items(self.worksheets()?.as_ref())?
            .iter()
            .map(|sheet| sheet.text("Name"))
            .collect()
    }

    fn find_sheet(&self, name: &str) -> Result<Box<dyn Worksheet>> {
        Ok(Box::new(self.worksheet(name)?))
    }

    fn create_sheet(&self, name: &str) -> Result<()> {
        self.require_absent(name)?;
        let worksheets = self.worksheets()?;
        let count = worksheets.int("Count")?;
        let last = worksheets.object("Item", &[Variant::Int(count)])?;
        let added = worksheets.call_object("Add", &[Variant::Missing, Variant::Object(last)])?;
        set(added.as_ref(), "Name", name)
    }

    fn copy_sheet(&self, src: &str, dest: &str) -> Result<()> {
        let source = self
            .find(src)?
            .ok_or_else(|| BridgeError::not_found("sheet", src))?;
        self.require_absent(dest)?;
        let index = source.int("Index")?;
        source.call(
            "Copy",
            &[Variant::Missing, Variant::Object(Rc::clone(&source))],
        )?;
        let copy = self
            .worksheets()?
            .object("Item", &[Variant::Int(index + 1)])?;
        set(copy.as_ref(), "Name", dest)?;
        debug!(src, dest, "copied sheet");
        Ok(())
    }

    fn delete_sheet(&self, name: &str) -> Result<()> {
        let sheet = self
            .find(name)?
            .ok_or_else(|| BridgeError::not_found("sheet", name))?;
        // Deleting asks for confirmation unless alerts are off.
        let application = self.session.application();
        set(application, "DisplayAlerts", false)?;
        let deleted = sheet.call("Delete", &[]);
        set(application, "DisplayAlerts", true)?;
        deleted.map(|_| ())
    }

    fn rename_sheet(&self, old: &str, new: &str) -> Result<()> {
        let sheet = self
            .find(old)?
            .ok_or_else(|| BridgeError::not_found("sheet", old))?;
        set(sheet.as_ref(), "Name", new)
    }

    fn set_defined_name(&self, name: &DefinedName) -> Result<()> {
        let owner = match &name.scope {
            Some(scope) => self
                .find(scope)?
                .ok_or_else(|| BridgeError::not_found("sheet", scope.as_str()))?,
            None => Rc::clone(&self.workbook),
        };
        owner.object("Names", &[])?.call(
            "Add",
            &[
                Variant::from(name.name.as_str()),
                Variant::from(formula_text(&name.refers_to)),
            ],
        )?;
        Ok(())
    }

    fn defined_names(&self) -> Result<Vec<DefinedName>> {
        items(self.workbook.object("Names", &[])?.as_ref())?
            .iter()
            .map(|entry| {
                let full = entry.text("Name")?;
                let refers_to = entry.text("RefersTo")?;
                let (scope, local) = split_scope(&full);
                let refers_to = refers_to.strip_prefix('=').unwrap_or(&refers_to);
                Ok(DefinedName {
                    name: local.to_string(),
                    refers_to: refers_to.to_string(),
                    scope,
                })
            })
            .collect()
    }

    fn save(&self) -> Result<()> {
        self.workbook.call("Save", &[])?;
        debug!(path = %self.path.display(), "saved workbook in host");
        Ok(())
    }
}

impl fmt::Debug for AutomationDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AutomationDocument")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}
