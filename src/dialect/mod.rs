//! SQL dialects for the version table
//!
//! Each supported backend implements [`SqlDialect`]: the statements that create
//! the version table and record a version, the query that reads the history
//! back newest-first, and any setup the backend needs after the table exists.
//! Runners pick a dialect through a [`DialectRegistry`] and never branch on the
//! backend themselves.
//!
//! # Example
//!
//! ```rust,no_run
//! use shoreline::{DialectRegistry, SqliteExecutor};
//! use shoreline::migration::{create_version_table, insert_version};
//!
//! # fn main() -> Result<(), shoreline::MigrationError> {
//! let mut registry = DialectRegistry::default();
//! registry.set_active("sqlite3")?;
//!
//! let executor = SqliteExecutor::open_in_memory()?;
//! let dialect = registry.active();
//! create_version_table(&executor, dialect)?;
//! insert_version(&executor, dialect, 20240120120000, true)?;
//!
//! for row in dialect.db_version_query(&executor)? {
//!     let row = row?;
//!     println!("{} applied={}", row.version_id, row.is_applied);
//! }
//! # Ok(())
//! # }
//! ```

pub mod bootstrap;
pub mod mysql;
pub mod oracle;
pub mod postgres;
pub mod redshift;
pub mod registry;
pub mod sqlite;
pub mod tidb;

pub use bootstrap::AuxStep;
pub use mysql::MySqlDialect;
pub use oracle::OracleDialect;
pub use postgres::PostgresDialect;
pub use redshift::RedshiftDialect;
pub use registry::DialectRegistry;
pub use sqlite::Sqlite3Dialect;
pub use tidb::TiDbDialect;

use crate::executor::{LifeError, LifeExecutor};
use crate::migration::{MigrationError, VersionRow, VersionTableName};
use crate::transaction::Transaction;
use crate::value::{Row, SqlValue};
use std::fmt;
use std::str::FromStr;

/// Backends with a dialect implementation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DialectKind {
    Postgres,
    Mysql,
    Sqlite3,
    Redshift,
    Tidb,
    Oracle,
}

/// How a backend marks bind parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaceholderStyle {
    /// `$1, $2, ...`
    Numbered,
    /// `?, ?, ...`
    Positional,
}

impl PlaceholderStyle {
    /// Placeholder for the 1-based parameter `index`
    #[must_use]
    pub fn placeholder(self, index: usize) -> String {
        match self {
            PlaceholderStyle::Numbered => format!("${index}"),
            PlaceholderStyle::Positional => "?".to_string(),
        }
    }
}

impl DialectKind {
    /// Every supported backend, in registry order
    pub const ALL: [DialectKind; 6] = [
        DialectKind::Postgres,
        DialectKind::Mysql,
        DialectKind::Sqlite3,
        DialectKind::Redshift,
        DialectKind::Tidb,
        DialectKind::Oracle,
    ];

    /// Identifier accepted by [`DialectRegistry::set_active`]
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            DialectKind::Postgres => "postgres",
            DialectKind::Mysql => "mysql",
            DialectKind::Sqlite3 => "sqlite3",
            DialectKind::Redshift => "redshift",
            DialectKind::Tidb => "tidb",
            DialectKind::Oracle => "oracle",
        }
    }

    #[must_use]
    pub fn placeholder_style(self) -> PlaceholderStyle {
        match self {
            DialectKind::Postgres | DialectKind::Redshift => PlaceholderStyle::Numbered,
            DialectKind::Mysql | DialectKind::Sqlite3 | DialectKind::Tidb | DialectKind::Oracle => {
                PlaceholderStyle::Positional
            }
        }
    }

    /// `false` for backends whose `id` comes from a sequence and trigger
    /// created by [`SqlDialect::db_run_aux`]
    #[must_use]
    pub fn has_native_autoincrement(self) -> bool {
        !matches!(self, DialectKind::Oracle)
    }
}

impl fmt::Display for DialectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DialectKind {
    type Err = MigrationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DialectKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| MigrationError::UnknownDialect(s.to_string()))
    }
}

/// Backend-specific statements for the version table
///
/// The statement builders never touch the database and return the same text on
/// every call. `db_version_query` and `db_run_aux` block on the executor they
/// are given; neither commits nor rolls back.
pub trait SqlDialect: fmt::Debug + Send + Sync {
    /// Backend this dialect targets
    fn kind(&self) -> DialectKind;

    /// Version table every statement refers to
    fn table(&self) -> &VersionTableName;

    /// Complete DDL for the version table
    fn create_version_table_sql(&self) -> String;

    /// `INSERT` with two parameters: `version_id`, then `is_applied`
    fn insert_version_sql(&self) -> String;

    /// Check every object name this dialect will create against backend limits
    ///
    /// Runs before any DDL, so a name the backend would reject part-way through
    /// creation is caught while nothing exists yet.
    ///
    /// # Errors
    ///
    /// Returns `MigrationError::IdentifierTooLong` for a name over the limit.
    fn validate_identifiers(&self) -> Result<(), MigrationError> {
        Ok(())
    }

    /// Read `(version_id, is_applied)` rows, most recent event first
    ///
    /// The result set is fetched in full through [`LifeExecutor::query_all`]
    /// before this returns; the cursor then decodes one row per step. The
    /// version table holds one row per apply or rollback, so it stays small.
    ///
    /// # Errors
    ///
    /// Returns the executor's error unchanged if the query fails.
    fn db_version_query(&self, executor: &dyn LifeExecutor) -> Result<VersionRows, LifeError> {
        let rows = executor.query_all(&version_query_sql(self.table()), &[])?;
        Ok(VersionRows::new(rows))
    }

    /// Post-creation setup, run inside the transaction that created the table
    ///
    /// Backends with native auto-increment have nothing to do and return
    /// without touching `tx`.
    ///
    /// # Errors
    ///
    /// Returns `MigrationError::AuxiliarySetup` naming the step that failed.
    fn db_run_aux(&self, tx: &Transaction<'_>) -> Result<(), MigrationError> {
        let _ = tx;
        Ok(())
    }

    /// Bind value for the `is_applied` parameter of [`insert_version_sql`](Self::insert_version_sql)
    fn applied_flag(&self, applied: bool) -> SqlValue {
        SqlValue::Bool(applied)
    }
}

/// Build the dialect for `kind` writing to `table`
#[must_use]
pub fn dialect_for(kind: DialectKind, table: VersionTableName) -> Box<dyn SqlDialect> {
    match kind {
        DialectKind::Postgres => Box::new(PostgresDialect::new(table)),
        DialectKind::Mysql => Box::new(MySqlDialect::new(table)),
        DialectKind::Sqlite3 => Box::new(Sqlite3Dialect::new(table)),
        DialectKind::Redshift => Box::new(RedshiftDialect::new(table)),
        DialectKind::Tidb => Box::new(TiDbDialect::new(table)),
        DialectKind::Oracle => Box::new(OracleDialect::new(table)),
    }
}

/// `INSERT` template in `kind`'s placeholder style, ending with `terminator`
#[must_use]
pub fn insert_version_template(
    table: &VersionTableName,
    kind: DialectKind,
    terminator: &str,
) -> String {
    let style = kind.placeholder_style();
    format!(
        "INSERT INTO {table} (version_id, is_applied) VALUES ({}, {}){terminator}",
        style.placeholder(1),
        style.placeholder(2)
    )
}

/// History query shared by every backend
#[must_use]
pub fn version_query_sql(table: &VersionTableName) -> String {
    format!("SELECT version_id, is_applied FROM {table} ORDER BY id DESC")
}

/// Forward-only cursor over version rows, newest first
///
/// Holds the already fetched result set. Rows are decoded as they are pulled,
/// so a malformed row surfaces as an `Err` item at its position rather than
/// failing the whole query.
#[derive(Debug)]
pub struct VersionRows {
    rows: std::vec::IntoIter<Row>,
}

impl VersionRows {
    #[must_use]
    pub fn new(rows: Vec<Row>) -> Self {
        Self {
            rows: rows.into_iter(),
        }
    }
}

impl Iterator for VersionRows {
    type Item = Result<VersionRow, LifeError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.rows.next().map(|row| VersionRow::from_row(&row))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.rows.size_hint()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockExecutor;

    fn table() -> VersionTableName {
        VersionTableName::new("app_versions").unwrap()
    }

    fn count_placeholders(sql: &str, style: PlaceholderStyle) -> usize {
        match style {
            PlaceholderStyle::Positional => sql.matches('?').count(),
            PlaceholderStyle::Numbered => sql
                .match_indices('$')
                .filter(|(idx, _)| {
                    sql[idx + 1..]
                        .chars()
                        .next()
                        .is_some_and(|c| c.is_ascii_digit())
                })
                .count(),
        }
    }

    #[test]
    fn test_kind_round_trips_through_identifier() {
        for kind in DialectKind::ALL {
            assert_eq!(kind.as_str().parse::<DialectKind>().unwrap(), kind);
            assert_eq!(kind.to_string(), kind.as_str());
        }
    }

    #[test]
    fn test_unknown_identifier_is_rejected() {
        for name in ["unknown", "Postgres", "sqlite", "mssql", ""] {
            let err = name.parse::<DialectKind>().unwrap_err();
            assert!(matches!(err, MigrationError::UnknownDialect(ref n) if n == name));
        }
    }

    #[test]
    fn test_create_sql_names_table_and_declares_all_columns() {
        for kind in DialectKind::ALL {
            let dialect = dialect_for(kind, table());
            let sql = dialect.create_version_table_sql();
            assert!(sql.starts_with("CREATE TABLE app_versions ("), "{kind}: {sql}");
            for column in ["(id ", ", version_id ", ", is_applied ", ", tstamp "] {
                assert!(sql.contains(column), "{kind} is missing column {column}");
            }
        }
    }

    #[test]
    fn test_insert_sql_has_two_placeholders_in_backend_style() {
        for kind in DialectKind::ALL {
            let dialect = dialect_for(kind, table());
            let sql = dialect.insert_version_sql();
            let style = kind.placeholder_style();
            assert!(sql.starts_with("INSERT INTO app_versions (version_id, is_applied) VALUES ("));
            assert_eq!(count_placeholders(&sql, style), 2, "{kind}: {sql}");

            let other = match style {
                PlaceholderStyle::Numbered => PlaceholderStyle::Positional,
                PlaceholderStyle::Positional => PlaceholderStyle::Numbered,
            };
            assert_eq!(count_placeholders(&sql, other), 0, "{kind}: {sql}");
        }
    }

    #[test]
    fn test_statement_builders_are_idempotent() {
        for kind in DialectKind::ALL {
            let dialect = dialect_for(kind, table());
            assert_eq!(dialect.create_version_table_sql(), dialect.create_version_table_sql());
            assert_eq!(dialect.insert_version_sql(), dialect.insert_version_sql());
        }
    }

    #[test]
    fn test_dialect_for_reports_its_kind_and_table() {
        for kind in DialectKind::ALL {
            let dialect = dialect_for(kind, table());
            assert_eq!(dialect.kind(), kind);
            assert_eq!(dialect.table().as_str(), "app_versions");
        }
    }

    #[test]
    fn test_version_query_orders_by_id_descending() {
        for kind in DialectKind::ALL {
            let mock = MockExecutor::new();
            let dialect = dialect_for(kind, table());
            let rows: Vec<_> = dialect.db_version_query(&mock).unwrap().collect();
            assert!(rows.is_empty());
            assert_eq!(
                mock.statements(),
                vec!["SELECT version_id, is_applied FROM app_versions ORDER BY id DESC"]
            );
        }
    }

    #[test]
    fn test_version_query_error_is_returned_unchanged() {
        let mock = MockExecutor::new().fail_on("SELECT");
        let dialect = dialect_for(DialectKind::Mysql, table());
        let err = dialect.db_version_query(&mock).unwrap_err();
        assert!(matches!(err, LifeError::QueryError(_)));
    }

    #[test]
    fn test_version_rows_decode_lazily_in_order() {
        let mut rows = VersionRows::new(vec![
            Row::new(vec![SqlValue::Int(2), SqlValue::Bool(true)]),
            Row::new(vec![SqlValue::Int(1), SqlValue::Text("bogus".into())]),
            Row::new(vec![SqlValue::Int(1), SqlValue::Bool(true)]),
        ]);
        assert_eq!(rows.size_hint(), (3, Some(3)));
        assert_eq!(rows.next().unwrap().unwrap(), VersionRow::new(2, true));
        assert!(rows.next().unwrap().is_err());
        assert_eq!(rows.next().unwrap().unwrap(), VersionRow::new(1, true));
        assert!(rows.next().is_none());
    }

    #[test]
    fn test_native_autoincrement_backends_skip_aux_setup() {
        for kind in DialectKind::ALL
            .into_iter()
            .filter(|k| k.has_native_autoincrement())
        {
            let mock = MockExecutor::new();
            let tx = Transaction::begin(&mock).unwrap();
            dialect_for(kind, table()).db_run_aux(&tx).unwrap();
            assert_eq!(mock.statements(), vec!["BEGIN"], "{kind} touched the transaction");
        }
    }

    #[test]
    fn test_placeholder_rendering() {
        assert_eq!(PlaceholderStyle::Numbered.placeholder(2), "$2");
        assert_eq!(PlaceholderStyle::Positional.placeholder(2), "?");
    }

    #[test]
    fn test_insert_sql_follows_kind_placeholder_style() {
        let expected = [
            (DialectKind::Postgres, "VALUES ($1, $2);"),
            (DialectKind::Mysql, "VALUES (?, ?);"),
            (DialectKind::Sqlite3, "VALUES (?, ?);"),
            (DialectKind::Redshift, "VALUES ($1, $2);"),
            (DialectKind::Tidb, "VALUES (?, ?);"),
            (DialectKind::Oracle, "VALUES (?, ?)"),
        ];
        for (kind, tail) in expected {
            let sql = dialect_for(kind, table()).insert_version_sql();
            assert_eq!(
                sql,
                format!("INSERT INTO app_versions (version_id, is_applied) {tail}"),
                "{kind}"
            );
        }
    }
}
