//! Fail counter, output buffer and case summaries.
//!
//! One [`Ledger`] backs a whole facade lineage. Facades hold it through a
//! [`SharedLedger`] so `uplevel`/`label` derivations alias the same counts.

use std::cell::RefCell;
use std::rc::Rc;

/// Bookkeeping for one facade lineage.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Ledger {
    fail_count: usize,
    output: Vec<String>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_count(&self) -> usize {
        self.fail_count
    }

    pub fn output(&self) -> &[String] {
        &self.output
    }

    /// Appends one entry; entries are never reordered or merged.
    pub fn emit(&mut self, entry: String) {
        self.output.push(entry);
    }

    /// Increments the fail counter and returns the new count.
    pub fn count_failure(&mut self) -> usize {
        self.fail_count += 1;
        self.fail_count
    }

    /// Summary line followed by every output entry, one per line.
    pub fn summary(&self, name: Option<&str>) -> String {
        let status = status_line(self.fail_count);
        let mut summary = match name {
            Some(name) => format!("{name}: {status}"),
            None => status,
        };
        for entry in &self.output {
            summary.push('\n');
            summary.push_str(entry);
        }
        summary
    }
}

fn status_line(failures: usize) -> String {
    match failures {
        0 => "all tests passed".to_string(),
        1 => "1 test failed".to_string(),
        n => format!("{n} tests failed"),
    }
}

/// Shared, mutable handle to a [`Ledger`].
#[derive(Debug, Clone, Default)]
pub struct SharedLedger(Rc<RefCell<Ledger>>);

impl SharedLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit(&self, entry: String) {
        self.0.borrow_mut().emit(entry);
    }

    pub fn count_failure(&self) -> usize {
        self.0.borrow_mut().count_failure()
    }

    pub fn fail_count(&self) -> usize {
        self.0.borrow().fail_count()
    }

    /// Copy of the buffered entries.
    pub fn output(&self) -> Vec<String> {
        self.0.borrow().output().to_vec()
    }

    pub fn summary(&self, name: Option<&str>) -> String {
        self.0.borrow().summary(name)
    }
}
