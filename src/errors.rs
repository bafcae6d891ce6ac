//! Testy Failure Kinds
//!
//! Every assertion that does not hold produces exactly one [`Failure`]. The
//! `Display` output of a failure is the message body that lands in the output
//! buffer and in the test case report (before any label or location is added).

use miette::Diagnostic;
use thiserror::Error;

/// The body of a single failed check.
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
pub enum Failure {
    #[error("Expression was not true")]
    #[diagnostic(code(testy::expression_false))]
    ExpressionFalse,

    #[error("Expression was not false")]
    #[diagnostic(code(testy::expression_true))]
    ExpressionTrue,

    #[error(
        "Values were not equal\n    Got: {got} ({got_type})\n    Wanted: {want} ({want_type})"
    )]
    #[diagnostic(code(testy::not_equal))]
    NotEqual {
        got: String,
        got_type: &'static str,
        want: String,
        want_type: &'static str,
    },

    #[error("Values were not unequal\n    Got: {value}")]
    #[diagnostic(code(testy::unexpectedly_equal))]
    UnexpectedlyEqual { value: String },

    /// Free-form failure raised by `error`/`errorf`.
    #[error("{0}")]
    #[diagnostic(code(testy::explicit))]
    Explicit(String),
}

impl Failure {
    /// Short, stable name of the failure kind, used in log records.
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Self::ExpressionFalse => "expression_false",
            Self::ExpressionTrue => "expression_true",
            Self::NotEqual { .. } => "not_equal",
            Self::UnexpectedlyEqual { .. } => "unexpectedly_equal",
            Self::Explicit(_) => "explicit",
        }
    }
}
