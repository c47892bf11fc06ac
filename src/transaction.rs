//! Transaction Module
//!
//! Provides a statement-level transaction wrapper over any [`LifeExecutor`].
//!
//! This module provides:
//! - Transaction type that implements LifeExecutor
//! - Transaction isolation levels
//! - Nested transaction support (savepoints)
//! - Commit/rollback operations
//!
//! The version-table bootstrap runs inside one of these: the runner opens it,
//! the dialect adds statements, and only the runner commits or rolls back.

use crate::executor::{LifeError, LifeExecutor};
use crate::value::{Row, SqlValue};
use thiserror::Error;

#[cfg(feature = "tracing")]
use crate::tracing_helpers;

/// Transaction isolation level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IsolationLevel {
    /// Read uncommitted (PostgreSQL treats it as ReadCommitted)
    ReadUncommitted,
    /// Read committed (default)
    ReadCommitted,
    /// Repeatable read
    RepeatableRead,
    /// Serializable
    Serializable,
}

impl IsolationLevel {
    fn to_sql(self) -> &'static str {
        match self {
            IsolationLevel::ReadUncommitted => "READ UNCOMMITTED",
            IsolationLevel::ReadCommitted => "READ COMMITTED",
            IsolationLevel::RepeatableRead => "REPEATABLE READ",
            IsolationLevel::Serializable => "SERIALIZABLE",
        }
    }
}

/// Transaction error type
#[derive(Debug, Error)]
pub enum TransactionError {
    /// Statement issued by the transaction itself failed
    #[error("Transaction statement failed: {0}")]
    Executor(#[from] LifeError),
    /// Transaction already committed or rolled back
    #[error("Transaction has already been committed or rolled back")]
    TransactionClosed,
    /// Nested transaction error
    #[error("Nested transaction error: {0}")]
    NestedTransactionError(String),
}

impl From<TransactionError> for LifeError {
    fn from(err: TransactionError) -> Self {
        match err {
            TransactionError::Executor(e) => e,
            TransactionError::TransactionClosed => {
                LifeError::Other("Transaction closed".to_string())
            }
            TransactionError::NestedTransactionError(s) => LifeError::Other(s),
        }
    }
}

/// A database transaction
///
/// Borrows the executor for its whole lifetime. Statements run through
/// [`LifeExecutor`] on the transaction are rejected once it is closed.
///
/// # Examples
///
/// ```no_run
/// use shoreline::{LifeExecutor, LifeError, SqliteExecutor, Transaction};
///
/// # fn main() -> Result<(), LifeError> {
/// let executor = SqliteExecutor::open_in_memory()?;
/// let transaction = Transaction::begin(&executor)?;
/// transaction.execute("CREATE TABLE t (id INTEGER)", &[])?;
/// transaction.commit()?;
/// # Ok(())
/// # }
/// ```
pub struct Transaction<'a> {
    executor: &'a dyn LifeExecutor,
    depth: u32,
    closed: bool,
}

impl<'a> Transaction<'a> {
    /// Open a transaction with the executor's default isolation level
    ///
    /// # Errors
    ///
    /// Returns `TransactionError` if the begin statement fails.
    pub fn begin(executor: &'a dyn LifeExecutor) -> Result<Self, TransactionError> {
        Self::begin_with_isolation(executor, None)
    }

    /// Open a transaction, optionally setting the isolation level first
    ///
    /// When `executor` is itself an open [`Transaction`], a savepoint is
    /// opened inside it instead; committing or rolling back the result then
    /// only releases or rolls back to that savepoint.
    ///
    /// # Errors
    ///
    /// Returns `TransactionError` if either statement fails, or
    /// `TransactionError::NestedTransactionError` when an isolation level is
    /// requested inside an open transaction.
    pub fn begin_with_isolation(
        executor: &'a dyn LifeExecutor,
        isolation_level: Option<IsolationLevel>,
    ) -> Result<Self, TransactionError> {
        #[cfg(feature = "tracing")]
        let _span = tracing_helpers::begin_transaction_span().entered();

        if let Some(outer_depth) = executor.transaction_depth() {
            if isolation_level.is_some() {
                return Err(TransactionError::NestedTransactionError(
                    "isolation level cannot be changed inside an open transaction".to_string(),
                ));
            }
            let depth = outer_depth + 1;
            executor.execute(&format!("SAVEPOINT sp_{depth}"), &[])?;
            return Ok(Self {
                executor,
                depth,
                closed: false,
            });
        }

        if let Some(begin) = executor.begin_statement() {
            executor.execute(begin, &[])?;
        }

        if let Some(level) = isolation_level {
            let isolation_sql = format!("SET TRANSACTION ISOLATION LEVEL {}", level.to_sql());
            executor.execute(&isolation_sql, &[])?;
        }

        Ok(Self {
            executor,
            depth: 0,
            closed: false,
        })
    }

    /// Start a nested transaction (savepoint)
    ///
    /// # Errors
    ///
    /// Returns `TransactionError::TransactionClosed` if this transaction is
    /// closed, or the savepoint statement's error.
    pub fn begin_nested(&self) -> Result<Transaction<'a>, TransactionError> {
        if self.closed {
            return Err(TransactionError::TransactionClosed);
        }

        let savepoint_sql = format!("SAVEPOINT sp_{}", self.depth + 1);
        self.executor.execute(&savepoint_sql, &[])?;

        Ok(Transaction {
            executor: self.executor,
            depth: self.depth + 1,
            closed: false,
        })
    }

    /// Commit the transaction, or release the savepoint when nested
    ///
    /// # Errors
    ///
    /// Returns an error if the transaction has already been closed or the
    /// statement fails.
    pub fn commit(mut self) -> Result<(), TransactionError> {
        if self.closed {
            return Err(TransactionError::TransactionClosed);
        }

        #[cfg(feature = "tracing")]
        let _span = tracing_helpers::commit_transaction_span().entered();

        // Implicit-begin backends (Oracle) have no RELEASE SAVEPOINT; the
        // savepoint lapses when the outer transaction ends.
        if self.depth == 0 {
            self.executor.execute("COMMIT", &[])?;
        } else if self.executor.begin_statement().is_some() {
            let release_sql = format!("RELEASE SAVEPOINT sp_{}", self.depth);
            self.executor.execute(&release_sql, &[])?;
        }

        self.closed = true;
        Ok(())
    }

    /// Roll the transaction back, or roll back to the savepoint when nested
    ///
    /// # Errors
    ///
    /// Returns an error if the transaction has already been closed or the
    /// statement fails.
    pub fn rollback(mut self) -> Result<(), TransactionError> {
        if self.closed {
            return Err(TransactionError::TransactionClosed);
        }

        #[cfg(feature = "tracing")]
        let _span = tracing_helpers::rollback_transaction_span().entered();

        if self.depth == 0 {
            self.executor.execute("ROLLBACK", &[])?;
        } else {
            let rollback_sql = format!("ROLLBACK TO SAVEPOINT sp_{}", self.depth);
            self.executor.execute(&rollback_sql, &[])?;
        }

        self.closed = true;
        Ok(())
    }

    /// Savepoint depth, `0` for the outermost transaction
    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// Check if the transaction is closed
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    fn ensure_open(&self) -> Result<(), LifeError> {
        if self.closed {
            return Err(LifeError::Other("Transaction is closed".to_string()));
        }
        Ok(())
    }
}

impl LifeExecutor for Transaction<'_> {
    fn execute(&self, query: &str, params: &[SqlValue]) -> Result<u64, LifeError> {
        self.ensure_open()?;
        self.executor.execute(query, params)
    }

    fn query_all(&self, query: &str, params: &[SqlValue]) -> Result<Vec<Row>, LifeError> {
        self.ensure_open()?;
        self.executor.query_all(query, params)
    }

    fn begin_statement(&self) -> Option<&'static str> {
        self.executor.begin_statement()
    }

    fn transaction_depth(&self) -> Option<u32> {
        Some(self.depth)
    }
}
