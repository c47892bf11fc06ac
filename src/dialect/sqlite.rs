//! SQLite dialect
//!
//! `INTEGER PRIMARY KEY AUTOINCREMENT` keeps ids strictly increasing even after
//! deletes; booleans are stored as `0`/`1`.

use super::{insert_version_template, DialectKind, SqlDialect};
use crate::migration::VersionTableName;

#[derive(Debug, Clone)]
pub struct Sqlite3Dialect {
    table: VersionTableName,
}

impl Sqlite3Dialect {
    pub fn new(table: VersionTableName) -> Self {
        Self { table }
    }
}

impl SqlDialect for Sqlite3Dialect {
    fn kind(&self) -> DialectKind {
        DialectKind::Sqlite3
    }

    fn table(&self) -> &VersionTableName {
        &self.table
    }

    fn create_version_table_sql(&self) -> String {
        format!(
            "CREATE TABLE {} (id INTEGER PRIMARY KEY AUTOINCREMENT, \
             version_id INTEGER NOT NULL, is_applied INTEGER NOT NULL, \
             tstamp TIMESTAMP DEFAULT (datetime('now')));",
            self.table
        )
    }

    fn insert_version_sql(&self) -> String {
        insert_version_template(&self.table, self.kind(), ";")
    }
}
