//! Amazon Redshift dialect
//!
//! Redshift has no `serial`; `id` is an `identity(1, 1)` column and the
//! timestamp default is `sysdate`.

use super::{insert_version_template, DialectKind, SqlDialect};
use crate::migration::VersionTableName;

#[derive(Debug, Clone)]
pub struct RedshiftDialect {
    table: VersionTableName,
}

impl RedshiftDialect {
    pub fn new(table: VersionTableName) -> Self {
        Self { table }
    }
}

impl SqlDialect for RedshiftDialect {
    fn kind(&self) -> DialectKind {
        DialectKind::Redshift
    }

    fn table(&self) -> &VersionTableName {
        &self.table
    }

    fn create_version_table_sql(&self) -> String {
        format!(
            "CREATE TABLE {} (id integer NOT NULL identity(1, 1), version_id bigint NOT NULL, \
             is_applied boolean NOT NULL, tstamp timestamp NULL DEFAULT sysdate, \
             PRIMARY KEY(id));",
            self.table
        )
    }

    fn insert_version_sql(&self) -> String {
        insert_version_template(&self.table, self.kind(), ";")
    }
}
