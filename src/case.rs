//! Test-case primitives the facade reports into.
//!
//! The facade only needs three things from a test case: mark it failed, mark
//! it failed with a message at a location, and ask whether it has failed.
//! Both provided implementations use interior mutability because facades hold
//! the case by shared reference.

use std::cell::{Cell, RefCell};
use std::io::Write;

use termcolor::{Buffer, Color, ColorSpec, WriteColor};

use crate::config::HarnessConfig;
use crate::context::CallSite;

/// The host test-reporting primitive.
pub trait TestCase {
    /// Marks the case failed without a message.
    fn fail(&self);

    /// Marks the case failed and reports `message` at `site`.
    fn fail_at(&self, site: &CallSite, message: &str);

    fn failed(&self) -> bool;
}

// ============================================================================
// RECORDING CASE
// ============================================================================

/// A failure report as received by a test case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaseReport {
    pub site: CallSite,
    pub message: String,
}

/// In-memory test case. Useful as a throwaway case when testing helpers
/// that are expected to fail.
#[derive(Debug, Default)]
pub struct RecordingCase {
    failed: Cell<bool>,
    reports: RefCell<Vec<CaseReport>>,
}

impl RecordingCase {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of every report received so far, in arrival order.
    pub fn reports(&self) -> Vec<CaseReport> {
        self.reports.borrow().clone()
    }
}

impl TestCase for RecordingCase {
    fn fail(&self) {
        self.failed.set(true);
    }

    fn fail_at(&self, site: &CallSite, message: &str) {
        self.failed.set(true);
        self.reports.borrow_mut().push(CaseReport {
            site: site.clone(),
            message: message.to_string(),
        });
    }

    fn failed(&self) -> bool {
        self.failed.get()
    }
}

// ============================================================================
// HARNESS CASE
// ============================================================================

/// Test case for use inside `#[test]` functions.
///
/// Reports go to stderr (captured by libtest). Checks keep running after a
/// failure; when the case is dropped with failures recorded it panics, which
/// fails the surrounding test.
#[derive(Debug)]
pub struct HarnessCase {
    name: String,
    config: HarnessConfig,
    failures: Cell<usize>,
}

impl HarnessCase {
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_config(name, HarnessConfig::default())
    }

    pub fn with_config(name: impl Into<String>, config: HarnessConfig) -> Self {
        Self {
            name: name.into(),
            config,
            failures: Cell::new(0),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn failures(&self) -> usize {
        self.failures.get()
    }

    fn record(&self) {
        self.failures.set(self.failures.get() + 1);
    }

    fn render(&self, site: &CallSite, message: &str) -> String {
        let mut buffer = if self.config.use_colors {
            Buffer::ansi()
        } else {
            Buffer::no_color()
        };
        // Writes into an in-memory buffer cannot fail.
        let _ = buffer.set_color(ColorSpec::new().set_fg(Some(Color::Red)).set_bold(true));
        let _ = write!(buffer, "FAIL");
        let _ = buffer.reset();
        let _ = write!(buffer, " [{}] {site}: {message}", self.name);
        String::from_utf8_lossy(buffer.as_slice()).into_owned()
    }
}

impl TestCase for HarnessCase {
    fn fail(&self) {
        self.record();
    }

    fn fail_at(&self, site: &CallSite, message: &str) {
        self.record();
        eprintln!("{}", self.render(site, message));
    }

    fn failed(&self) -> bool {
        self.failures.get() > 0
    }
}

impl Drop for HarnessCase {
    fn drop(&mut self) {
        let failures = self.failures.get();
        if failures == 0 || !self.config.panic_on_drop || std::thread::panicking() {
            return;
        }
        let noun = if failures == 1 { "test" } else { "tests" };
        panic!("{}: {failures} {noun} failed", self.name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quiet() -> HarnessConfig {
        HarnessConfig::default().with_colors(false)
    }

    #[test]
    fn recording_case_keeps_reports_in_order() {
        let case = RecordingCase::new();
        assert!(!case.failed());

        case.fail_at(&CallSite::new("a.rs", 1), "first");
        case.fail_at(&CallSite::new("a.rs", 2), "second");

        let messages: Vec<_> = case.reports().into_iter().map(|r| r.message).collect();
        assert_eq!(messages, vec!["first", "second"]);
        assert!(case.failed());
    }

    #[test]
    fn bare_fail_leaves_no_report() {
        let case = RecordingCase::new();
        case.fail();
        assert!(case.failed());
        assert!(case.reports().is_empty());
    }

    #[test]
    fn harness_render_without_colors() {
        let case = HarnessCase::with_config("render", quiet());
        let line = case.render(&CallSite::new("/x/tests/t.rs", 9), "boom");
        assert_eq!(line, "FAIL [render] t.rs:9: boom");
    }

    #[test]
    fn harness_without_panic_on_drop_is_silent() {
        let case = HarnessCase::with_config("silent", quiet().with_panic_on_drop(false));
        case.fail();
        assert!(case.failed());
        assert_eq!(case.failures(), 1);
    }

    #[test]
    #[should_panic(expected = "dropped: 2 tests failed")]
    fn harness_panics_on_drop_with_failures() {
        let case = HarnessCase::with_config("dropped", quiet());
        case.fail();
        case.fail_at(&CallSite::unknown(), "boom");
    }
}
