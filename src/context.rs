//! Diagnostic context and call-site resolution.
//!
//! A [`DiagnosticContext`] says how far up the stack a failure should be
//! attributed and which label, if any, prefixes its message. Contexts are
//! values: deriving one never touches the one it came from.
//!
//! Depth 1 is the line that invoked the assertion method. Each helper layer
//! that should be seen through adds one level with `uplevel(1)`.

use std::fmt;
use std::panic::Location;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use crate::facade::FACADE_SOURCE;

/// Depth of a freshly built facade: report the assertion call itself.
pub const BASE_SKIP_DEPTH: usize = 1;

// ============================================================================
// CALL SITES
// ============================================================================

/// A resolved source location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallSite {
    file: PathBuf,
    line: u32,
}

impl CallSite {
    pub fn new(file: impl Into<PathBuf>, line: u32) -> Self {
        Self {
            file: file.into(),
            line,
        }
    }

    /// Placeholder used when nothing better can be resolved.
    pub fn unknown() -> Self {
        Self::new("???", 1)
    }

    pub fn file(&self) -> &Path {
        &self.file
    }

    pub fn line(&self) -> u32 {
        self.line
    }
}

impl From<&Location<'_>> for CallSite {
    fn from(location: &Location<'_>) -> Self {
        Self::new(location.file(), location.line())
    }
}

impl fmt::Display for CallSite {
    /// Renders as `<basename>:<line>`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.file.file_name() {
            Some(name) => write!(f, "{}:{}", name.to_string_lossy(), self.line),
            None => write!(f, "???:{}", self.line),
        }
    }
}

// ============================================================================
// DIAGNOSTIC CONTEXT
// ============================================================================

/// Immutable `{skip_depth, label}` pair carried by every facade.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosticContext {
    skip_depth: usize,
    label: Option<Rc<str>>,
}

impl DiagnosticContext {
    pub fn root() -> Self {
        Self {
            skip_depth: BASE_SKIP_DEPTH,
            label: None,
        }
    }

    pub fn skip_depth(&self) -> usize {
        self.skip_depth
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Same label, `levels` more frames skipped.
    pub fn uplevel(&self, levels: usize) -> Self {
        Self {
            skip_depth: self.skip_depth.saturating_add(levels),
            label: self.label.clone(),
        }
    }

    /// Same depth, label replaced.
    pub fn with_label(&self, label: impl Into<Rc<str>>) -> Self {
        Self {
            skip_depth: self.skip_depth,
            label: Some(label.into()),
        }
    }

    /// Prefixes `body` with `"<label>: "` when a label is set.
    pub fn decorate(&self, body: &str) -> String {
        match &self.label {
            Some(label) => format!("{label}: {body}"),
            None => body.to_string(),
        }
    }
}

impl Default for DiagnosticContext {
    fn default() -> Self {
        Self::root()
    }
}

/// Joins displayable parts with single spaces, the way print-style
/// reporting functions join their operands.
pub fn join_parts(parts: &[&dyn fmt::Display]) -> String {
    let mut joined = String::new();
    for (i, part) in parts.iter().enumerate() {
        if i > 0 {
            joined.push(' ');
        }
        joined.push_str(&part.to_string());
    }
    joined
}

// ============================================================================
// LOCATORS
// ============================================================================

/// Source-location introspection: resolve the call site `depth` frames above
/// the assertion method.
///
/// `caller` is the depth-1 location captured by `#[track_caller]` on the
/// assertion method; implementations fall back to it when they cannot do
/// better.
pub trait Locate {
    fn locate(&self, depth: usize, caller: &'static Location<'static>) -> CallSite;
}

/// Locator for hosts without stack introspection: every depth resolves to
/// the immediate caller of the assertion method.
#[derive(Debug, Default, Clone, Copy)]
pub struct CallerLocator;

impl Locate for CallerLocator {
    fn locate(&self, _depth: usize, caller: &'static Location<'static>) -> CallSite {
        CallSite::from(caller)
    }
}

/// Default locator. Depth 1 comes straight from `#[track_caller]`; deeper
/// call sites are found by walking the stack.
///
/// The depth-1 frame is the first one outside the facade's own source file,
/// however the assertion was written (directly, or expanded from a local
/// macro whose debug info points into the macro body). Depth `n` is `n - 1`
/// frames further out.
///
/// Needs debug info for frames above the assertion call. Without it the
/// depth-1 location is reported instead.
#[derive(Debug, Default, Clone, Copy)]
pub struct BacktraceLocator;

impl Locate for BacktraceLocator {
    fn locate(&self, depth: usize, caller: &'static Location<'static>) -> CallSite {
        if depth <= BASE_SKIP_DEPTH {
            return CallSite::from(caller);
        }
        let frames = capture_frames();
        let anchor = match anchor_frame(&frames, caller) {
            Some(anchor) => anchor,
            None => {
                log::warn!(
                    "no facade frame on the stack above {}; reporting the assertion line",
                    CallSite::from(caller)
                );
                return CallSite::from(caller);
            }
        };
        match climb(&frames, anchor, depth - BASE_SKIP_DEPTH) {
            Some(site) => site,
            None => {
                log::warn!(
                    "could not resolve call site {} frames above {}; reporting the assertion line",
                    depth,
                    CallSite::from(caller)
                );
                CallSite::from(caller)
            }
        }
    }
}

/// One entry per source-level frame, innermost first. Inlined frames count
/// separately; frames without symbol info are `None`.
fn capture_frames() -> Vec<Option<CallSite>> {
    let mut frames = Vec::new();
    backtrace::trace(|frame| {
        let before = frames.len();
        backtrace::resolve_frame(frame, |symbol| {
            let site = match (symbol.filename(), symbol.lineno()) {
                (Some(file), Some(line)) => Some(CallSite::new(file, line)),
                _ => None,
            };
            frames.push(site);
        });
        if frames.len() == before {
            frames.push(None);
        }
        true
    });
    frames
}

/// Index of the depth-1 frame: the one just outside the outermost facade
/// frame. Falls back to an exact match on the `#[track_caller]` location
/// when no facade frame resolved.
fn anchor_frame(frames: &[Option<CallSite>], caller: &Location<'_>) -> Option<usize> {
    let exact = frames
        .iter()
        .position(|frame| frame.as_ref().is_some_and(|site| is_same_site(site, caller)));
    let structural = frames
        .iter()
        .rposition(|frame| frame.as_ref().is_some_and(is_facade_frame))
        .map(|outermost| outermost + 1);

    match (structural, exact) {
        (Some(structural), Some(exact)) if structural != exact => {
            log::debug!(
                "depth-1 frame {:?} differs from the frame at {} (macro expansion?)",
                frames.get(structural),
                CallSite::from(caller)
            );
            Some(structural)
        }
        (Some(structural), _) => Some(structural),
        (None, exact) => exact,
    }
}

fn climb(frames: &[Option<CallSite>], anchor: usize, levels: usize) -> Option<CallSite> {
    frames.get(anchor.checked_add(levels)?)?.clone()
}

/// Debug info usually carries absolute paths while `Location` carries the
/// path rustc was invoked with, so files are compared by suffix.
fn is_same_site(site: &CallSite, location: &Location<'_>) -> bool {
    site.line() == location.line() && site.file().ends_with(Path::new(location.file()))
}

/// True for frames inside this crate's `facade.rs`. A relative `file!()`
/// path is also checked against the manifest directory so a caller's own
/// `src/facade.rs` does not match.
fn is_facade_frame(site: &CallSite) -> bool {
    let source = Path::new(FACADE_SOURCE);
    let file = site.file();
    file.ends_with(source)
        && (source.is_absolute()
            || file.is_relative()
            || file.starts_with(env!("CARGO_MANIFEST_DIR")))
}
