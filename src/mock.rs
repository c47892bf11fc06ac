//! Recording executor for tests
//!
//! Compiled for this crate's unit tests and, with the `mock` feature, for
//! downstream tests. Backends without a bundled driver (MySQL, TiDB, Oracle)
//! are exercised through it.

use crate::executor::{LifeError, LifeExecutor};
use crate::value::{Row, SqlValue};
use std::cell::RefCell;
use std::collections::VecDeque;

/// A `LifeExecutor` that records statements instead of running them
///
/// `query_all` hands out queued result sets in order and returns an empty
/// result once the queue is drained. Any statement containing a substring
/// registered with [`MockExecutor::fail_on`] fails with `LifeError::QueryError`
/// (it is still recorded).
#[derive(Debug, Default)]
pub struct MockExecutor {
    log: RefCell<Vec<(String, Vec<SqlValue>)>>,
    results: RefCell<VecDeque<Vec<Row>>>,
    failures: Vec<String>,
    implicit_begin: bool,
}

impl MockExecutor {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail every statement whose text contains `pattern`
    #[must_use]
    pub fn fail_on(mut self, pattern: &str) -> Self {
        self.failures.push(pattern.to_string());
        self
    }

    /// Behave like a backend that opens transactions implicitly
    #[must_use]
    pub fn without_begin_statement(mut self) -> Self {
        self.implicit_begin = true;
        self
    }

    /// Queue the rows returned by the next `query_all`
    #[must_use]
    pub fn with_query_result(self, rows: Vec<Row>) -> Self {
        self.results.borrow_mut().push_back(rows);
        self
    }

    /// Statement texts in execution order
    pub fn statements(&self) -> Vec<String> {
        self.log.borrow().iter().map(|(sql, _)| sql.clone()).collect()
    }

    /// Statement texts with their bound parameters
    pub fn executed(&self) -> Vec<(String, Vec<SqlValue>)> {
        self.log.borrow().clone()
    }

    fn record(&self, query: &str, params: &[SqlValue]) -> Result<(), LifeError> {
        self.log
            .borrow_mut()
            .push((query.to_string(), params.to_vec()));
        match self.failures.iter().find(|p| query.contains(p.as_str())) {
            Some(pattern) => Err(LifeError::QueryError(format!(
                "mock failure on statement matching '{pattern}'"
            ))),
            None => Ok(()),
        }
    }
}

impl LifeExecutor for MockExecutor {
    fn execute(&self, query: &str, params: &[SqlValue]) -> Result<u64, LifeError> {
        self.record(query, params)?;
        Ok(0)
    }

    fn query_all(&self, query: &str, params: &[SqlValue]) -> Result<Vec<Row>, LifeError> {
        self.record(query, params)?;
        Ok(self.results.borrow_mut().pop_front().unwrap_or_default())
    }

    fn begin_statement(&self) -> Option<&'static str> {
        if self.implicit_begin {
            None
        } else {
            Some("BEGIN")
        }
    }
}
