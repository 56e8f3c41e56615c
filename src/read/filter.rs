//! The predicate hook row assembly runs after a row is fully built (§6).

use crate::error::Result;
use crate::value::ColumnValue;

/// A row-level predicate. Evaluated once a row has been fully assembled;
/// there is no row-group or page-level statistics pruning here.
pub trait ColumnFilter {
    fn apply(&self, row: &[ColumnValue]) -> Result<bool>;
}

impl<F> ColumnFilter for F
where
    F: Fn(&[ColumnValue]) -> Result<bool>,
{
    fn apply(&self, row: &[ColumnValue]) -> Result<bool> {
        self(row)
    }
}

/// The source this engine is modeled on catches any exception a predicate
/// raises and silently drops the row, which can mask real bugs. This
/// engine makes the choice explicit instead of hard-coding either
/// behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PredicateFailurePolicy {
    /// A predicate error stops iteration; the error is surfaced once and
    /// the iterator reports exhaustion afterwards.
    Abort,
    /// A predicate error is treated as "row does not match" and iteration
    /// continues.
    SkipRow,
}
