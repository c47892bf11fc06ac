//! `LifeExecutor` Module
//!
//! Provides the `LifeExecutor` trait that abstracts blocking statement execution
//! over whichever driver backs the version table.
//!
//! Dialects never own a connection: the runner hands them a `&dyn LifeExecutor`
//! (or a [`Transaction`](crate::transaction::Transaction), which is one) and the
//! dialect only issues statements through it.

use crate::value::{Row, SqlValue};
use may_postgres::types::{ToSql, Type};
use may_postgres::{Client, Error as PostgresError, Row as PgRow};
use std::time::Instant;
use thiserror::Error;

#[cfg(feature = "tracing")]
use crate::tracing_helpers;

/// `LifeExecutor` error type
#[derive(Debug, Error)]
pub enum LifeError {
    /// `PostgreSQL` (or Redshift) error from `may_postgres`
    #[error("PostgreSQL error: {0}")]
    PostgresError(#[from] PostgresError),
    /// `SQLite` error from `rusqlite`
    #[error("SQLite error: {0}")]
    SqliteError(#[from] rusqlite::Error),
    /// Query execution error
    #[error("Query error: {0}")]
    QueryError(String),
    /// Row parsing/conversion error
    #[error("Parse error: {0}")]
    ParseError(String),
    /// Other execution errors
    #[error("Execution error: {0}")]
    Other(String),
}

/// Trait for executing database operations
///
/// Implementations exist for `may_postgres` ([`MayPostgresExecutor`]) and
/// `rusqlite` ([`SqliteExecutor`](crate::sqlite::SqliteExecutor)). Runners
/// targeting MySQL, TiDB or Oracle implement this trait over their own driver.
///
/// # Examples
///
/// ```no_run
/// use shoreline::{LifeExecutor, LifeError, SqlValue};
///
/// # fn example(executor: &dyn LifeExecutor) -> Result<(), LifeError> {
/// executor.execute(
///     "INSERT INTO db_version (version_id, is_applied) VALUES ($1, $2);",
///     &[SqlValue::Int(20240101), SqlValue::Bool(true)],
/// )?;
///
/// let rows = executor.query_all("SELECT version_id FROM db_version", &[])?;
/// let versions: Vec<i64> = rows
///     .iter()
///     .map(|r| r.get_i64(0))
///     .collect::<Result<_, _>>()?;
/// # Ok(())
/// # }
/// ```
pub trait LifeExecutor {
    /// Execute a SQL statement and return the number of rows affected
    ///
    /// # Errors
    ///
    /// Returns `LifeError` if the statement fails. Driver errors are returned
    /// unchanged inside the matching variant.
    fn execute(&self, query: &str, params: &[SqlValue]) -> Result<u64, LifeError>;

    /// Execute a query and return all rows, in the order the database produced them
    ///
    /// # Errors
    ///
    /// Returns `LifeError` if the query execution fails.
    fn query_all(&self, query: &str, params: &[SqlValue]) -> Result<Vec<Row>, LifeError>;

    /// Execute a query that must return exactly one row
    ///
    /// # Errors
    ///
    /// Returns `LifeError` if the query fails or does not return exactly one row.
    fn query_one(&self, query: &str, params: &[SqlValue]) -> Result<Row, LifeError> {
        let mut rows = self.query_all(query, params)?;
        match rows.len() {
            1 => Ok(rows.remove(0)),
            n => Err(LifeError::QueryError(format!(
                "expected exactly one row, query returned {n}"
            ))),
        }
    }

    /// Statement that opens a transaction on this connection
    ///
    /// `None` means the backend opens transactions implicitly (Oracle), so
    /// [`Transaction`](crate::transaction::Transaction) issues nothing on begin.
    fn begin_statement(&self) -> Option<&'static str> {
        Some("BEGIN")
    }

    /// Savepoint depth of the open transaction this executor runs in
    ///
    /// `None` for plain connections. A [`Transaction`](crate::transaction::Transaction)
    /// reports its own depth, so beginning a transaction on top of it opens a
    /// savepoint instead of a second top-level transaction.
    fn transaction_depth(&self) -> Option<u32> {
        None
    }
}

/// Implementation of `LifeExecutor` for `may_postgres::Client`
///
/// Serves both the `postgres` and `redshift` dialects.
pub struct MayPostgresExecutor {
    client: Client,
}

impl MayPostgresExecutor {
    /// Create a new executor from a `may_postgres::Client`
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Get a reference to the underlying client
    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Consume the executor and return the underlying client
    pub fn into_client(self) -> Client {
        self.client
    }
}

static NULL_PARAM: Option<i64> = None;

fn bind_params(params: &[SqlValue]) -> Vec<&dyn ToSql> {
    params
        .iter()
        .map(|value| match value {
            SqlValue::Null => &NULL_PARAM as &dyn ToSql,
            SqlValue::Bool(b) => b as &dyn ToSql,
            SqlValue::Int(v) => v as &dyn ToSql,
            SqlValue::Float(v) => v as &dyn ToSql,
            SqlValue::Text(s) => s as &dyn ToSql,
        })
        .collect()
}

fn convert_row(row: &PgRow) -> Result<Row, LifeError> {
    let mut values = Vec::with_capacity(row.len());
    for (idx, column) in row.columns().iter().enumerate() {
        let ty = column.type_();
        let value = if *ty == Type::BOOL {
            SqlValue::from(row.try_get::<_, Option<bool>>(idx)?)
        } else if *ty == Type::INT2 {
            SqlValue::from(row.try_get::<_, Option<i16>>(idx)?.map(i64::from))
        } else if *ty == Type::INT4 {
            SqlValue::from(row.try_get::<_, Option<i32>>(idx)?.map(i64::from))
        } else if *ty == Type::INT8 {
            SqlValue::from(row.try_get::<_, Option<i64>>(idx)?)
        } else if *ty == Type::FLOAT8 {
            row.try_get::<_, Option<f64>>(idx)?
                .map_or(SqlValue::Null, SqlValue::Float)
        } else if *ty == Type::TIMESTAMP {
            SqlValue::from(
                row.try_get::<_, Option<chrono::NaiveDateTime>>(idx)?
                    .map(|ts| ts.to_string()),
            )
        } else if *ty == Type::TIMESTAMPTZ {
            SqlValue::from(
                row.try_get::<_, Option<chrono::DateTime<chrono::Utc>>>(idx)?
                    .map(|ts| ts.naive_utc().to_string()),
            )
        } else {
            let text: Option<String> = row.try_get(idx).map_err(|e| {
                LifeError::ParseError(format!(
                    "unsupported column type {} for column '{}': {e}",
                    ty,
                    column.name()
                ))
            })?;
            SqlValue::from(text)
        };
        values.push(value);
    }
    Ok(Row::new(values))
}

impl LifeExecutor for MayPostgresExecutor {
    fn execute(&self, query: &str, params: &[SqlValue]) -> Result<u64, LifeError> {
        #[cfg(feature = "tracing")]
        let _span = tracing_helpers::execute_query_span(query).entered();

        let start = Instant::now();
        let bound = bind_params(params);
        let result = self
            .client
            .execute(query, &bound)
            .map_err(LifeError::PostgresError);
        log::trace!("postgres execute took {:?}", start.elapsed());

        result
    }

    fn query_all(&self, query: &str, params: &[SqlValue]) -> Result<Vec<Row>, LifeError> {
        #[cfg(feature = "tracing")]
        let _span = tracing_helpers::execute_query_span(query).entered();

        let start = Instant::now();
        let bound = bind_params(params);
        let rows = self
            .client
            .query(query, &bound)
            .map_err(LifeError::PostgresError)?;
        log::trace!(
            "postgres query returned {} rows in {:?}",
            rows.len(),
            start.elapsed()
        );

        rows.iter().map(convert_row).collect()
    }
}
