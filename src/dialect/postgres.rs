//! PostgreSQL dialect
//!
//! `serial` key, native `boolean`, numbered placeholders.

use super::{insert_version_template, DialectKind, SqlDialect};
use crate::migration::VersionTableName;

#[derive(Debug, Clone)]
pub struct PostgresDialect {
    table: VersionTableName,
}

impl PostgresDialect {
    pub fn new(table: VersionTableName) -> Self {
        Self { table }
    }
}

impl SqlDialect for PostgresDialect {
    fn kind(&self) -> DialectKind {
        DialectKind::Postgres
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
