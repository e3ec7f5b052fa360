//! Acquiring a document for a path: the live host application first, then
//! the file itself, then a new empty workbook.

use std::fmt;
use std::ops::Deref;
use std::path::Path;

use tracing::debug;

use crate::backends::automation::{AutomationDocument, ComConnector, Connector};
use crate::backends::umya::UmyaDocument;
use crate::config::OpenOptions;
use crate::error::Result;
use crate::traits::Document;

/// Tries each backend in turn; the first that opens the path wins.
///
/// Failures of earlier steps are logged and swallowed. Only the last step's
/// error reaches the caller.
#[derive(Clone, Debug)]
pub struct BackendSelector<C: Connector = ComConnector> {
    options: OpenOptions,
    connector: C,
}

impl BackendSelector {
    pub fn new(options: OpenOptions) -> Self {
        Self::with_connector(options, ComConnector)
    }

    /// Options taken from the environment, see [`OpenOptions::from_env`].
    pub fn from_env() -> Self {
        Self::new(OpenOptions::from_env())
    }
}

impl Default for BackendSelector {
    fn default() -> Self {
        Self::new(OpenOptions::default())
    }
}

impl<C: Connector> BackendSelector<C> {
    pub fn with_connector(options: OpenOptions, connector: C) -> Self {
        Self { options, connector }
    }

    pub fn options(&self) -> &OpenOptions {
        &self.options
    }

    pub fn open(&self, path: impl AsRef<Path>) -> Result<OpenedDocument> {
        let path = path.as_ref();

        if self.options.prefer_automation {
            match self.open_live(path) {
                Ok(doc) => return Ok(self.selected(Box::new(doc), false, path)),
                Err(err) => debug!(
                    path = %path.display(),
                    error = %err,
                    "live automation unavailable, falling back to direct file"
                ),
            }
        }

        match UmyaDocument::open(path) {
            Ok(doc) => Ok(self.selected(Box::new(doc), false, path)),
            Err(err) if err.is_not_found() && self.options.create_if_missing => {
                debug!(path = %path.display(), error = %err, "file missing, creating new workbook");
                Ok(self.selected(Box::new(UmyaDocument::create(path)), true, path))
            }
            Err(err) => Err(err),
        }
    }

    fn open_live(&self, path: &Path) -> Result<AutomationDocument> {
        let session = self.connector.connect(&self.options)?;
        AutomationDocument::open(session, path)
    }

    fn selected(&self, document: Box<dyn Document>, created: bool, path: &Path) -> OpenedDocument {
        debug!(
            backend = document.backend_name(),
            path = %path.display(),
            created,
            "selected backend"
        );
        OpenedDocument {
            document,
            created,
            page_size: self.options.page_size,
        }
    }
}

/// A document handle that releases its backend when dropped.
///
/// For the live backend this also leaves the thread's apartment once the
/// last worksheet handle taken from it is gone.
pub struct OpenedDocument {
    document: Box<dyn Document>,
    created: bool,
    page_size: usize,
}

impl OpenedDocument {
    pub fn backend_name(&self) -> &'static str {
        self.document.backend_name()
    }

    /// The path did not exist and a new in-memory workbook was created.
    pub fn is_new(&self) -> bool {
        self.created
    }

    /// Paging budget from the options the document was opened with.
    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn into_inner(self) -> Box<dyn Document> {
        self.document
    }
}

impl Deref for OpenedDocument {
    type Target = dyn Document;

    fn deref(&self) -> &Self::Target {
        self.document.as_ref()
    }
}

impl fmt::Debug for OpenedDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenedDocument")
            .field("backend", &self.backend_name())
            .field("created", &self.created)
            .field("page_size", &self.page_size)
            .finish()
    }
}
