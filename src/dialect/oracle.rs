//! Oracle dialect
//!
//! Oracle has no auto-increment column type here, so `id` is a plain
//! `NUMBER(19)` and [`db_run_aux`](SqlDialect::db_run_aux) adds the primary key,
//! a `<table>_id_seq` sequence and a before-insert trigger that fills `id` from
//! it. `is_applied` is a `CHAR(1)` flag written as `'1'`/`'0'`.
//!
//! Object names are kept within the 30-byte identifier limit of Oracle releases
//! before 12.2, so the unqualified table name can be at most 23 bytes long
//! (`<table>_id_seq` is the longest derived name).

use super::bootstrap::{run_steps, AuxStep};
use super::{insert_version_template, DialectKind, SqlDialect};
use crate::migration::{MigrationError, VersionTableName};
use crate::transaction::Transaction;
use crate::value::SqlValue;

#[cfg(feature = "tracing")]
use crate::tracing_helpers;

/// Identifier length limit of Oracle releases before 12.2
pub const MAX_IDENTIFIER_LEN: usize = 30;

#[derive(Debug, Clone)]
pub struct OracleDialect {
    table: VersionTableName,
}

impl OracleDialect {
    pub fn new(table: VersionTableName) -> Self {
        Self { table }
    }

    /// Name of the sequence backing `id`
    pub fn sequence_name(&self) -> String {
        format!("{}_id_seq", self.table)
    }

    /// Name of the before-insert trigger
    pub fn trigger_name(&self) -> String {
        format!("{}_bi", self.table)
    }

    fn primary_key_sql(&self) -> String {
        format!("ALTER TABLE {} ADD PRIMARY KEY (id)", self.table)
    }

    fn sequence_sql(&self) -> String {
        format!("CREATE SEQUENCE {}", self.sequence_name())
    }

    fn trigger_sql(&self) -> String {
        format!(
            "CREATE OR REPLACE TRIGGER {trigger}\n\
             BEFORE INSERT ON {table}\n\
             FOR EACH ROW\n\
             BEGIN\n\
             \x20 IF INSERTING THEN\n\
             \x20   IF :NEW.id IS NULL THEN\n\
             \x20     SELECT {sequence}.NEXTVAL INTO :NEW.id FROM dual;\n\
             \x20   END IF;\n\
             \x20 END IF;\n\
             END;",
            trigger = self.trigger_name(),
            table = self.table,
            sequence = self.sequence_name(),
        )
    }

    /// Bootstrap statements in execution order
    pub fn aux_steps(&self) -> Vec<(AuxStep, String)> {
        vec![
            (AuxStep::PrimaryKey, self.primary_key_sql()),
            (AuxStep::Sequence, self.sequence_sql()),
            (AuxStep::Trigger, self.trigger_sql()),
        ]
    }
}

impl SqlDialect for OracleDialect {
    fn kind(&self) -> DialectKind {
        DialectKind::Oracle
    }

    fn table(&self) -> &VersionTableName {
        &self.table
    }

    fn create_version_table_sql(&self) -> String {
        format!(
            "CREATE TABLE {} (id NUMBER(19), version_id NUMBER(19) NOT NULL, \
             is_applied CHAR(1) NOT NULL, \
             tstamp TIMESTAMP(6) DEFAULT SYS_EXTRACT_UTC(SYSTIMESTAMP))",
            self.table
        )
    }

    fn insert_version_sql(&self) -> String {
        insert_version_template(&self.table, self.kind(), "")
    }

    fn validate_identifiers(&self) -> Result<(), MigrationError> {
        for name in [
            self.table.to_string(),
            self.sequence_name(),
            self.trigger_name(),
        ] {
            // Schema and object names are limited separately.
            let object = name.rsplit('.').next().unwrap_or(&name);
            if object.len() > MAX_IDENTIFIER_LEN {
                return Err(MigrationError::IdentifierTooLong {
                    name,
                    max: MAX_IDENTIFIER_LEN,
                });
            }
        }
        Ok(())
    }

    fn db_run_aux(&self, tx: &Transaction<'_>) -> Result<(), MigrationError> {
        #[cfg(feature = "tracing")]
        let _span = tracing_helpers::run_aux_span(self.kind().as_str()).entered();

        run_steps(tx, &self.aux_steps())?;
        log::info!(
            "created primary key, sequence {} and trigger {} for {}",
            self.sequence_name(),
            self.trigger_name(),
            self.table
        );
        Ok(())
    }

    fn applied_flag(&self, applied: bool) -> SqlValue {
        SqlValue::Text(if applied { "1" } else { "0" }.to_string())
    }
}
