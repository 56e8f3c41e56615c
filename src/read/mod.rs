//! The read path: column chunk decoding, row assembly, and the optional
//! predicate-filtered row iterator built on top of both (§4.9, §4.10, §6).

pub mod column_chunk_decoder;
pub mod filter;
pub mod row_assembler;

use crate::error::Result;
use crate::value::ColumnValue;
use filter::{ColumnFilter, PredicateFailurePolicy};
use row_assembler::RowAssembler;

/// Iterates assembled rows out of a `RowAssembler`, optionally applying a
/// `ColumnFilter`. Once an error is surfaced the iterator reports
/// exhaustion on every subsequent call, matching §6's propagation rule.
pub struct RowIterator<'a> {
    assembler: RowAssembler<'a>,
    filter: Option<Box<dyn ColumnFilter + 'a>>,
    policy: PredicateFailurePolicy,
    done: bool,
}

impl<'a> RowIterator<'a> {
    pub fn new(assembler: RowAssembler<'a>) -> Self {
        Self {
            assembler,
            filter: None,
            policy: PredicateFailurePolicy::Abort,
            done: false,
        }
    }

    pub fn with_filter(
        assembler: RowAssembler<'a>,
        filter: Box<dyn ColumnFilter + 'a>,
        policy: PredicateFailurePolicy,
    ) -> Self {
        Self {
            assembler,
            filter: Some(filter),
            policy,
            done: false,
        }
    }
}

impl<'a> Iterator for RowIterator<'a> {
    type Item = Result<Vec<ColumnValue>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        loop {
            let row = match self.assembler.next_row() {
                Ok(Some(row)) => row,
                Ok(None) => {
                    self.done = true;
                    return None;
                }
                Err(e) => {
                    self.done = true;
                    return Some(Err(e));
                }
            };

            let Some(filter) = &self.filter else {
                return Some(Ok(row));
            };

            match filter.apply(&row) {
                Ok(true) => return Some(Ok(row)),
                Ok(false) => continue,
                Err(e) => match self.policy {
                    PredicateFailurePolicy::Abort => {
                        self.done = true;
                        return Some(Err(e));
                    }
                    PredicateFailurePolicy::SkipRow => continue,
                },
            }
        }
    }
}
