//! Version table management
//!
//! Thin helpers a runner calls with its executor and the active dialect. They
//! only ever create the table and append rows; existing rows are never updated
//! or deleted.

use crate::dialect::SqlDialect;
use crate::executor::LifeExecutor;
use crate::migration::{MigrationError, VersionRecord};
use crate::transaction::Transaction;
use crate::value::SqlValue;
use std::collections::HashSet;

/// Create the version table and run the dialect's post-creation setup
///
/// Both happen in one transaction, committed only if every statement
/// succeeded. When `executor` is the caller's own open [`Transaction`], the work
/// runs in a savepoint and the caller's transaction is left open. Callers are
/// responsible for checking that the table does not exist yet.
///
/// # Errors
///
/// Returns `MigrationError::IdentifierTooLong` before touching the database if
/// the dialect would create a name the backend rejects. Otherwise returns the
/// first failure (DDL, auxiliary setup, or commit); the transaction or
/// savepoint is rolled back before returning.
pub fn create_version_table(
    executor: &dyn LifeExecutor,
    dialect: &dyn SqlDialect,
) -> Result<(), MigrationError> {
    dialect.validate_identifiers()?;
    let tx = Transaction::begin(executor)?;

    let result = tx
        .execute(&dialect.create_version_table_sql(), &[])
        .map_err(MigrationError::from)
        .and_then(|_| dialect.db_run_aux(&tx));

    match result {
        Ok(()) => {
            tx.commit()?;
            log::info!(
                "created version table {} ({})",
                dialect.table(),
                dialect.kind()
            );
            Ok(())
        }
        Err(err) => {
            // Oracle commits DDL implicitly, so this cannot undo everything there.
            if let Err(rollback_err) = tx.rollback() {
                log::warn!("rollback after failed version table creation also failed: {rollback_err}");
            }
            Err(err)
        }
    }
}

/// Append an apply (`applied = true`) or rollback event for `version_id`
///
/// # Errors
///
/// Returns `MigrationError::Database` if the insert fails.
pub fn insert_version(
    executor: &dyn LifeExecutor,
    dialect: &dyn SqlDialect,
    version_id: i64,
    applied: bool,
) -> Result<(), MigrationError> {
    executor.execute(
        &dialect.insert_version_sql(),
        &[SqlValue::Int(version_id), dialect.applied_flag(applied)],
    )?;
    log::debug!(
        "recorded version {version_id} as {}",
        if applied { "applied" } else { "rolled back" }
    );
    Ok(())
}

/// Version the database is currently at
///
/// Walks the history newest-first. Once a version's newest event is a
/// rollback, its older rows are ignored; the first remaining applied row wins.
///
/// # Errors
///
/// Returns `MigrationError::Database` if the query fails or a row cannot be decoded.
pub fn current_version(
    executor: &dyn LifeExecutor,
    dialect: &dyn SqlDialect,
) -> Result<Option<i64>, MigrationError> {
    let mut rolled_back = HashSet::new();
    for row in dialect.db_version_query(executor)? {
        let row = row?;
        if rolled_back.contains(&row.version_id) {
            continue;
        }
        if row.is_applied {
            return Ok(Some(row.version_id));
        }
        rolled_back.insert(row.version_id);
    }
    Ok(None)
}

/// Versions whose newest event is an apply, newest event first
///
/// # Errors
///
/// Returns `MigrationError::Database` if the query fails or a row cannot be decoded.
pub fn applied_versions(
    executor: &dyn LifeExecutor,
    dialect: &dyn SqlDialect,
) -> Result<Vec<i64>, MigrationError> {
    let mut seen = HashSet::new();
    let mut applied = Vec::new();
    for row in dialect.db_version_query(executor)? {
        let row = row?;
        if seen.insert(row.version_id) && row.is_applied {
            applied.push(row.version_id);
        }
    }
    Ok(applied)
}

/// Full history including `id` and `tstamp`, newest first
///
/// # Errors
///
/// Returns `MigrationError::Database` if the query fails or a row cannot be decoded.
pub fn version_history(
    executor: &dyn LifeExecutor,
    dialect: &dyn SqlDialect,
) -> Result<Vec<VersionRecord>, MigrationError> {
    let sql = format!(
        "SELECT id, version_id, is_applied, tstamp FROM {} ORDER BY id DESC",
        dialect.table()
    );
    let records = executor
        .query_all(&sql, &[])?
        .iter()
        .map(VersionRecord::from_row)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(records)
}
