//! Configuration for [`HarnessCase`](crate::case::HarnessCase).

/// How a harness-backed test case reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HarnessConfig {
    /// Color the `FAIL` tag on stderr.
    pub use_colors: bool,
    /// Panic on drop when failures were recorded, so libtest fails the test.
    pub panic_on_drop: bool,
}

impl HarnessConfig {
    pub fn with_colors(mut self, use_colors: bool) -> Self {
        self.use_colors = use_colors;
        self
    }

    pub fn with_panic_on_drop(mut self, panic_on_drop: bool) -> Self {
        self.panic_on_drop = panic_on_drop;
        self
    }
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            use_colors: atty::is(atty::Stream::Stderr),
            panic_on_drop: true,
        }
    }
}
