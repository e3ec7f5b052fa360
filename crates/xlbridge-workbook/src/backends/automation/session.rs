use std::fmt;
use std::rc::Rc;

use crate::config::OpenOptions;
use crate::error::Result;

use super::apartment::ApartmentGuard;
use super::dispatch::Dispatch;

/// A bound host application.
///
/// The application object is released before the apartment it lives in;
/// every document and worksheet handle keeps the session alive through an
/// `Rc`, so the apartment outlives all of them.
pub struct Session {
    application: Rc<dyn Dispatch>,
    apartment: Option<ApartmentGuard>,
}

impl Session {
    /// Wrap an application object that needs no apartment of its own.
    pub fn from_application(application: Rc<dyn Dispatch>) -> Self {
        Self {
            application,
            apartment: None,
        }
    }

    pub fn application(&self) -> &dyn Dispatch {
        self.application.as_ref()
    }

    pub(crate) fn workbooks(&self) -> Result<Rc<dyn Dispatch>> {
        self.application.object("Workbooks", &[])
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("apartment", &self.apartment.is_some())
            .finish_non_exhaustive()
    }
}

/// Produces a bound host application on demand.
pub trait Connector {
    fn connect(&self, options: &OpenOptions) -> Result<Session>;
}

/// Attaches over COM: a running instance first, otherwise a new one.
#[derive(Clone, Copy, Debug, Default)]
pub struct ComConnector;

impl Connector for ComConnector {
    #[cfg(windows)]
    fn connect(&self, options: &OpenOptions) -> Result<Session> {
        let apartment = ApartmentGuard::enter()?;
        let application = super::com::attach(options.show_host_application)?;
        Ok(Session {
            application: Rc::new(application),
            apartment: Some(apartment),
        })
    }

    #[cfg(not(windows))]
    fn connect(&self, _options: &OpenOptions) -> Result<Session> {
        // Fails with BackendUnavailable off Windows.
        let _apartment = ApartmentGuard::enter()?;
        Err(crate::BridgeError::BackendUnavailable(
            "no COM host application on this platform".to_string(),
        ))
    }
}
