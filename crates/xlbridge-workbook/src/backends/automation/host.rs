use std::path::Path;
use std::rc::Rc;

use tracing::debug;

use super::dispatch::{Variant, set};
use super::document::AutomationDocument;
use super::session::{ComConnector, Connector, Session};
use crate::config::OpenOptions;
use crate::error::{BridgeError, Result};
use crate::traits::WorkbookInfo;

/// The host application itself: its open workbooks and macros.
///
/// Dropping the value releases the application and, for a COM session,
/// the apartment bound when it was connected.
#[derive(Debug)]
pub struct HostApplication {
    session: Rc<Session>,
    show: bool,
}

impl HostApplication {
    pub fn connect(options: &OpenOptions) -> Result<Self> {
        Self::with_connector(&ComConnector, options)
    }

    pub fn with_connector<C: Connector + ?Sized>(
        connector: &C,
        options: &OpenOptions,
    ) -> Result<Self> {
        Ok(Self {
            session: Rc::new(connector.connect(options)?),
            show: options.show_host_application,
        })
    }

    pub fn from_session(session: Session) -> Self {
        Self {
            session: Rc::new(session),
            show: true,
        }
    }

    /// Workbooks whose properties cannot be read are skipped.
    pub fn list_workbooks(&self) -> Result<Vec<WorkbookInfo>> {
        let workbooks = self.session.workbooks()?;
        let count = workbooks.int("Count")?;
        let mut out = Vec::new();
        for i in 1..=count {
            let info = workbooks
                .object("Item", &[Variant::Int(i)])
                .and_then(|wb| {
                    Ok(WorkbookInfo {
                        name: wb.text("Name")?,
                        full_path: wb.text("FullName")?,
                        saved: wb.get("Saved", &[])?.as_bool()?,
                    })
                });
            match info {
                Ok(info) => out.push(info),
                Err(err) => debug!(index = i, error = %err, "skipped unreadable workbook"),
            }
        }
        Ok(out)
    }

    pub fn open_workbook(&self, path: impl AsRef<Path>) -> Result<AutomationDocument> {
        let doc = AutomationDocument::open_in(Rc::clone(&self.session), path.as_ref())?;
        self.reveal()?;
        Ok(doc)
    }

    pub fn create_workbook(&self, path: impl AsRef<Path>) -> Result<AutomationDocument> {
        let doc = AutomationDocument::create_in(Rc::clone(&self.session), path.as_ref())?;
        self.reveal()?;
        Ok(doc)
    }

    /// Run a macro by name with string arguments. An empty result reads as
    /// an empty string.
    pub fn run_macro(&self, name: &str, args: &[&str]) -> Result<String> {
        if name.trim().is_empty() {
            return Err(BridgeError::InvalidFormat("macro name is empty".into()));
        }
        let call_args: Vec<Variant> = std::iter::once(Variant::from(name))
            .chain(args.iter().map(|a| Variant::from(*a)))
            .collect();
        let result = self
            .session
            .application()
            .call("Run", &call_args)
            .map_err(|e| BridgeError::from_backend(super::BACKEND, format!("macro '{name}': {e}")))?;
        Ok(result.to_text())
    }

    fn reveal(&self) -> Result<()> {
        if self.show {
            set(self.session.application(), "Visible", true)?;
        }
        Ok(())
    }
}
