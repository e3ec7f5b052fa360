//! Live-automation backend: drives a running host spreadsheet application
//! through its object model.
//!
//! All calls go through the [`Dispatch`] seam. On Windows a [`ComConnector`]
//! binds the calling thread to a single-threaded COM apartment and attaches
//! to the host; the binding is released when the last handle of the
//! [`Session`] is dropped. Handles are `!Send` and stay on that thread.

mod apartment;
#[cfg(windows)]
mod com;
mod dispatch;
mod document;
mod features;
mod host;
mod session;
mod style;
mod worksheet;

pub use apartment::ApartmentGuard;
pub use dispatch::{Dispatch, Variant, error_text};
pub use document::AutomationDocument;
pub use host::HostApplication;
pub use session::{ComConnector, Connector, Session};
pub use worksheet::AutomationWorksheet;

pub(crate) const BACKEND: &str = "automation";
