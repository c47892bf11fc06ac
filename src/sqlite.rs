//! `SQLite` executor backed by `rusqlite`
//!
//! Serves the `sqlite3` dialect. The connection is used on the caller's
//! thread only; every call blocks until `SQLite` returns.

use crate::executor::{LifeError, LifeExecutor};
use crate::value::{Row, SqlValue};
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection};
use std::path::Path;

#[cfg(feature = "tracing")]
use crate::tracing_helpers;

/// Implementation of `LifeExecutor` for a `rusqlite::Connection`
pub struct SqliteExecutor {
    conn: Connection,
}

impl SqliteExecutor {
    /// Wrap an already opened connection
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }

    /// Open (or create) a database file
    ///
    /// # Errors
    ///
    /// Returns `LifeError::SqliteError` if the file cannot be opened.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, LifeError> {
        Ok(Self::new(Connection::open(path)?))
    }

    /// Open a private in-memory database
    ///
    /// # Errors
    ///
    /// Returns `LifeError::SqliteError` if `SQLite` cannot allocate the database.
    pub fn open_in_memory() -> Result<Self, LifeError> {
        Ok(Self::new(Connection::open_in_memory()?))
    }

    /// Get a reference to the underlying connection
    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

fn to_sqlite(value: &SqlValue) -> Value {
    match value {
        SqlValue::Null => Value::Null,
        SqlValue::Bool(b) => Value::Integer(i64::from(*b)),
        SqlValue::Int(v) => Value::Integer(*v),
        SqlValue::Float(v) => Value::Real(*v),
        SqlValue::Text(s) => Value::Text(s.clone()),
    }
}

fn from_sqlite(value: Value) -> Result<SqlValue, LifeError> {
    match value {
        Value::Null => Ok(SqlValue::Null),
        Value::Integer(v) => Ok(SqlValue::Int(v)),
        Value::Real(v) => Ok(SqlValue::Float(v)),
        Value::Text(s) => Ok(SqlValue::Text(s)),
        Value::Blob(_) => Err(LifeError::ParseError(
            "BLOB columns are not supported".to_string(),
        )),
    }
}

impl LifeExecutor for SqliteExecutor {
    fn execute(&self, query: &str, params: &[SqlValue]) -> Result<u64, LifeError> {
        #[cfg(feature = "tracing")]
        let _span = tracing_helpers::execute_query_span(query).entered();

        let affected = self
            .conn
            .execute(query, params_from_iter(params.iter().map(to_sqlite)))?;
        Ok(affected as u64)
    }

    fn query_all(&self, query: &str, params: &[SqlValue]) -> Result<Vec<Row>, LifeError> {
        #[cfg(feature = "tracing")]
        let _span = tracing_helpers::execute_query_span(query).entered();

        let mut stmt = self.conn.prepare(query)?;
        let column_count = stmt.column_count();
        let raw_rows = stmt
            .query_map(params_from_iter(params.iter().map(to_sqlite)), |row| {
                (0..column_count)
                    .map(|idx| row.get::<_, Value>(idx))
                    .collect::<Result<Vec<_>, _>>()
            })?
            .collect::<Result<Vec<_>, _>>()?;

        raw_rows
            .into_iter()
            .map(|cells| {
                cells
                    .into_iter()
                    .map(from_sqlite)
                    .collect::<Result<Vec<_>, _>>()
                    .map(Row::new)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_execute_and_query_round_trip() {
        let executor = SqliteExecutor::open_in_memory().unwrap();
        executor
            .execute("CREATE TABLE t (id INTEGER PRIMARY KEY, flag INTEGER, label TEXT)", &[])
            .unwrap();
        let affected = executor
            .execute(
                "INSERT INTO t (flag, label) VALUES (?, ?)",
                &[SqlValue::Bool(true), SqlValue::Null],
            )
            .unwrap();
        assert_eq!(affected, 1);

        let rows = executor.query_all("SELECT id, flag, label FROM t", &[]).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get_i64(0).unwrap(), 1);
        assert!(rows[0].get_bool(1).unwrap());
        assert!(rows[0].get(2).unwrap().is_null());
    }

    #[test]
    fn test_query_error_is_propagated() {
        let executor = SqliteExecutor::open_in_memory().unwrap();
        let err = executor.query_all("SELECT * FROM missing_table", &[]).unwrap_err();
        assert!(matches!(err, LifeError::SqliteError(_)));
        assert!(err.to_string().contains("missing_table"));
    }

    #[test]
    fn test_query_one_requires_single_row() {
        let executor = SqliteExecutor::open_in_memory().unwrap();
        let row = executor.query_one("SELECT 42", &[]).unwrap();
        assert_eq!(row.get_i64(0).unwrap(), 42);

        let err = executor
            .query_one("SELECT 1 UNION ALL SELECT 2", &[])
            .unwrap_err();
        assert!(err.to_string().contains("exactly one row"));
    }
}
