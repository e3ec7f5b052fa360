pub mod automation;
pub mod umya;

pub use automation::{AutomationDocument, AutomationWorksheet, HostApplication};
pub use umya::{UmyaDocument, UmyaWorksheet};
