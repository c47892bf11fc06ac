//! TiDB dialect
//!
//! TiDB speaks the MySQL protocol but spells the key out explicitly instead of
//! relying on the `serial` alias.

use super::{insert_version_template, DialectKind, SqlDialect};
use crate::migration::VersionTableName;

#[derive(Debug, Clone)]
pub struct TiDbDialect {
    table: VersionTableName,
}

impl TiDbDialect {
    pub fn new(table: VersionTableName) -> Self {
        Self { table }
    }
}

impl SqlDialect for TiDbDialect {
    fn kind(&self) -> DialectKind {
        DialectKind::Tidb
    }

    fn table(&self) -> &VersionTableName {
        &self.table
    }

    fn create_version_table_sql(&self) -> String {
        format!(
            "CREATE TABLE {} (id BIGINT UNSIGNED NOT NULL AUTO_INCREMENT UNIQUE, \
             version_id bigint NOT NULL, is_applied boolean NOT NULL, \
             tstamp timestamp NULL DEFAULT now(), PRIMARY KEY(id));",
            self.table
        )
    }

    fn insert_version_sql(&self) -> String {
        insert_version_template(&self.table, self.kind(), ";")
    }
}
