//! The assertion facade.
//!
//! A [`Facade`] borrows a [`TestCase`] and turns fluent checks into failure
//! reports on it. Facades derived with [`Facade::uplevel`] and
//! [`Facade::label`] share the case, the fail counter and the output buffer
//! with their parent while carrying their own [`DiagnosticContext`].
//!
//! ```
//! use testy::{Facade, RecordingCase};
//!
//! let case = RecordingCase::new();
//! let is = Facade::named(&case, "arithmetic");
//! is.true_(1 + 1 == 2);
//! is.equal(2 * 2, 5);
//! assert_eq!(is.fail_count(), 1);
//! assert!(is.done().starts_with("arithmetic: 1 test failed"));
//! ```

use std::any::type_name;
use std::fmt::{self, Debug, Display};
use std::panic::Location;
use std::rc::Rc;

use crate::case::TestCase;
use crate::context::{join_parts, BacktraceLocator, CallSite, DiagnosticContext, Locate};
use crate::errors::Failure;
use crate::ledger::SharedLedger;

/// Path of this file as seen by debug info; frames in it are never a call
/// site.
pub(crate) const FACADE_SOURCE: &str = file!();

/// State shared by every facade of one lineage.
struct Lineage {
    ledger: SharedLedger,
    locator: Box<dyn Locate>,
    name: Option<String>,
}

/// Fluent assertions over a borrowed test case.
pub struct Facade<'a, C: TestCase + ?Sized> {
    case: &'a C,
    context: DiagnosticContext,
    lineage: Rc<Lineage>,
}

impl<'a, C: TestCase + ?Sized> Clone for Facade<'a, C> {
    fn clone(&self) -> Self {
        Self {
            case: self.case,
            context: self.context.clone(),
            lineage: Rc::clone(&self.lineage),
        }
    }
}

impl<'a, C: TestCase + ?Sized> Debug for Facade<'a, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Facade")
            .field("name", &self.lineage.name)
            .field("context", &self.context)
            .field("fail_count", &self.lineage.ledger.fail_count())
            .finish()
    }
}

impl<'a, C: TestCase + ?Sized> Facade<'a, C> {
    /// Root facade: depth 1, no label, zero failures, empty output.
    pub fn new(case: &'a C) -> Self {
        Self::build(case, None, Box::new(BacktraceLocator))
    }

    /// Root facade carrying a case name for [`Facade::done`].
    pub fn named(case: &'a C, name: impl Into<String>) -> Self {
        Self::build(case, Some(name.into()), Box::new(BacktraceLocator))
    }

    /// Root facade resolving call sites through `locator`.
    pub fn with_locator(case: &'a C, locator: impl Locate + 'static) -> Self {
        Self::build(case, None, Box::new(locator))
    }

    /// Named root facade resolving call sites through `locator`.
    pub fn named_with_locator(
        case: &'a C,
        name: impl Into<String>,
        locator: impl Locate + 'static,
    ) -> Self {
        Self::build(case, Some(name.into()), Box::new(locator))
    }

    fn build(case: &'a C, name: Option<String>, locator: Box<dyn Locate>) -> Self {
        Self {
            case,
            context: DiagnosticContext::root(),
            lineage: Rc::new(Lineage {
                ledger: SharedLedger::new(),
                locator,
                name,
            }),
        }
    }

    fn derive(&self, context: DiagnosticContext) -> Self {
        log::trace!(
            "derived facade: depth {} -> {}, label {:?}",
            self.context.skip_depth(),
            context.skip_depth(),
            context.label()
        );
        Self {
            case: self.case,
            context,
            lineage: Rc::clone(&self.lineage),
        }
    }

    // ------------------------------------------------------------------------
    // Context derivation
    // ------------------------------------------------------------------------

    /// A facade that attributes failures `levels` frames further up.
    ///
    /// Call it once per helper layer that should be seen through.
    pub fn uplevel(&self, levels: usize) -> Self {
        self.derive(self.context.uplevel(levels))
    }

    /// A facade whose messages are prefixed with `prefix` and the
    /// space-joined `values`, followed by `": "`.
    pub fn label(&self, prefix: &str, values: &[&dyn Display]) -> Self {
        let label = if values.is_empty() {
            prefix.to_string()
        } else {
            format!("{prefix} {}", join_parts(values))
        };
        self.derive(self.context.with_label(label))
    }

    pub fn context(&self) -> &DiagnosticContext {
        &self.context
    }

    pub fn name(&self) -> Option<&str> {
        self.lineage.name.as_deref()
    }

    // ------------------------------------------------------------------------
    // Checks
    // ------------------------------------------------------------------------

    /// Fails unless `condition` holds.
    #[track_caller]
    pub fn true_(&self, condition: bool) {
        if !condition {
            self.report(Location::caller(), Failure::ExpressionFalse);
        }
    }

    /// Fails if `condition` holds.
    #[track_caller]
    pub fn false_(&self, condition: bool) {
        if condition {
            self.report(Location::caller(), Failure::ExpressionTrue);
        }
    }

    /// Fails unless `got == want`. References compare by pointee.
    #[track_caller]
    pub fn equal<G, W>(&self, got: G, want: W)
    where
        G: PartialEq<W> + Debug,
        W: Debug,
    {
        if got != want {
            let failure = Failure::NotEqual {
                got: format!("{got:?}"),
                got_type: type_name::<G>(),
                want: format!("{want:?}"),
                want_type: type_name::<W>(),
            };
            self.report(Location::caller(), failure);
        }
    }

    /// Fails if `a == b`.
    #[track_caller]
    pub fn unequal<A, B>(&self, a: A, b: B)
    where
        A: PartialEq<B> + Debug,
    {
        if a == b {
            let failure = Failure::UnexpectedlyEqual {
                value: format!("{a:?}"),
            };
            self.report(Location::caller(), failure);
        }
    }

    // ------------------------------------------------------------------------
    // Free-form reporting
    // ------------------------------------------------------------------------

    /// Unconditional failure; `parts` are joined with single spaces.
    #[track_caller]
    pub fn error(&self, parts: &[&dyn Display]) {
        self.report(Location::caller(), Failure::Explicit(join_parts(parts)));
    }

    /// Unconditional failure built with `format_args!`.
    #[track_caller]
    pub fn errorf(&self, args: fmt::Arguments<'_>) {
        self.report(Location::caller(), Failure::Explicit(fmt::format(args)));
    }

    /// Buffers a non-failure line; `parts` are joined with single spaces.
    #[track_caller]
    pub fn log(&self, parts: &[&dyn Display]) {
        self.note(Location::caller(), &join_parts(parts));
    }

    /// Buffers a non-failure line built with `format_args!`.
    #[track_caller]
    pub fn logf(&self, args: fmt::Arguments<'_>) {
        self.note(Location::caller(), &fmt::format(args));
    }

    /// Marks the case failed without a message or output entry.
    pub fn fail(&self) {
        let count = self.lineage.ledger.count_failure();
        log::debug!("failure #{count} recorded without message");
        self.case.fail();
    }

    // ------------------------------------------------------------------------
    // Bookkeeping
    // ------------------------------------------------------------------------

    pub fn fail_count(&self) -> usize {
        self.lineage.ledger.fail_count()
    }

    /// True if this lineage recorded a failure or the case failed on its own.
    pub fn failed(&self) -> bool {
        self.fail_count() > 0 || self.case.failed()
    }

    /// Snapshot of the buffered entries, oldest first.
    pub fn output(&self) -> Vec<String> {
        self.lineage.ledger.output()
    }

    /// Summary line (`"<name>: all tests passed"`, `"<name>: N tests
    /// failed"`) followed by the buffered entries. Nothing is reset.
    pub fn done(&self) -> String {
        self.lineage.ledger.summary(self.name())
    }

    // ------------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------------

    fn resolve(&self, caller: &'static Location<'static>) -> CallSite {
        self.lineage.locator.locate(self.context.skip_depth(), caller)
    }

    fn report(&self, caller: &'static Location<'static>, failure: Failure) {
        let site = self.resolve(caller);
        let message = self.context.decorate(&failure.to_string());
        self.lineage.ledger.emit(format!("{site}: {message}"));
        let count = self.lineage.ledger.count_failure();
        log::debug!("failure #{count} ({}) at {site}", failure.kind_name());
        self.case.fail_at(&site, &message);
    }

    fn note(&self, caller: &'static Location<'static>, body: &str) {
        let site = self.resolve(caller);
        let message = self.context.decorate(body);
        self.lineage.ledger.emit(format!("{site}: {message}"));
    }
}

/// Root facade over `case`.
pub fn new<C: TestCase + ?Sized>(case: &C) -> Facade<'_, C> {
    Facade::new(case)
}

/// Named root facade over `case`.
pub fn new_case<C: TestCase + ?Sized>(case: &C, name: impl Into<String>) -> Facade<'_, C> {
    Facade::named(case, name)
}
