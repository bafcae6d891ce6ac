//! Testy: fluent assertions over a test case, with call-site attribution,
//! labels and buffered output.

pub use crate::case::{CaseReport, HarnessCase, RecordingCase, TestCase};
pub use crate::config::HarnessConfig;
pub use crate::context::{
    BacktraceLocator, CallSite, CallerLocator, DiagnosticContext, Locate, BASE_SKIP_DEPTH,
};
pub use crate::errors::Failure;
pub use crate::facade::{new, new_case, Facade};
pub use crate::ledger::{Ledger, SharedLedger};

pub mod case;
pub mod config;
pub mod context;
pub mod errors;
pub mod facade;
pub mod ledger;
