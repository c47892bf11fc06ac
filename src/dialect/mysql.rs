//! MySQL dialect
//!
//! MySQL accepts `serial` as shorthand for
//! `BIGINT UNSIGNED NOT NULL AUTO_INCREMENT UNIQUE` and `now()` as a
//! `timestamp` default, so the DDL matches PostgreSQL's. Placeholders are `?`.

use super::{insert_version_template, DialectKind, SqlDialect};
use crate::migration::VersionTableName;

#[derive(Debug, Clone)]
pub struct MySqlDialect {
    table: VersionTableName,
}

impl MySqlDialect {
    pub fn new(table: VersionTableName) -> Self {
        Self { table }
    }
}

impl SqlDialect for MySqlDialect {
    fn kind(&self) -> DialectKind {
        DialectKind::Mysql
    }

    fn table(&self) -> &VersionTableName {
        &self.table
    }

    fn create_version_table_sql(&self) -> String {
        format!(
            "CREATE TABLE {} (id serial NOT NULL, version_id bigint NOT NULL, \
             is_applied boolean NOT NULL, tstamp timestamp NULL DEFAULT now(), \
             PRIMARY KEY(id));",
            self.table
        )
    }

    fn insert_version_sql(&self) -> String {
        insert_version_template(&self.table, self.kind(), ";")
    }
}
