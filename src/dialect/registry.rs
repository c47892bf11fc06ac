//! Dialect selection
//!
//! The registry is an ordinary value owned by the runner and passed to whatever
//! needs the active dialect. Switching dialects takes `&mut self`, so a
//! selection can never change underneath a reader.

use super::{dialect_for, DialectKind, SqlDialect};
use crate::migration::{MigrationError, VersionTableName};
use std::sync::Arc;

/// Backend used when nothing else is configured
pub const DEFAULT_DIALECT: DialectKind = DialectKind::Postgres;

/// Holds the active dialect and the version table it writes to
#[derive(Debug, Clone)]
pub struct DialectRegistry {
    table: VersionTableName,
    active: Arc<dyn SqlDialect>,
}

impl Default for DialectRegistry {
    fn default() -> Self {
        Self::with_table(VersionTableName::default())
    }
}

impl DialectRegistry {
    /// Registry for `table`, starting on the default dialect
    pub fn with_table(table: VersionTableName) -> Self {
        Self::with_kind(DEFAULT_DIALECT, table)
    }

    /// Registry for `table`, starting on `kind`
    pub fn with_kind(kind: DialectKind, table: VersionTableName) -> Self {
        let active = Arc::from(dialect_for(kind, table.clone()));
        Self { table, active }
    }

    /// The current selection
    pub fn active(&self) -> &dyn SqlDialect {
        self.active.as_ref()
    }

    /// Shared handle to the current selection
    pub fn active_handle(&self) -> Arc<dyn SqlDialect> {
        Arc::clone(&self.active)
    }

    pub fn kind(&self) -> DialectKind {
        self.active.kind()
    }

    pub fn table(&self) -> &VersionTableName {
        &self.table
    }

    /// Switch to the dialect named `name`
    ///
    /// # Errors
    ///
    /// Returns `MigrationError::UnknownDialect` if `name` is not one of
    /// `postgres`, `mysql`, `sqlite3`, `redshift`, `tidb`, `oracle`; the previous
    /// selection stays active.
    pub fn set_active(&mut self, name: &str) -> Result<(), MigrationError> {
        let kind: DialectKind = name.parse()?;
        if kind != self.kind() {
            log::info!("switching version table dialect from {} to {kind}", self.kind());
        }
        self.active = Arc::from(dialect_for(kind, self.table.clone()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_postgres_on_default_table() {
        let registry = DialectRegistry::default();
        assert_eq!(registry.kind(), DialectKind::Postgres);
        assert_eq!(registry.table().as_str(), "db_version");
        assert!(registry.active().insert_version_sql().contains("$1"));
    }

    #[test]
    fn test_set_active_accepts_every_known_backend() {
        let table = VersionTableName::new("release_versions").unwrap();
        let mut registry = DialectRegistry::with_table(table.clone());

        for kind in DialectKind::ALL {
            registry.set_active(kind.as_str()).unwrap();
            assert_eq!(registry.kind(), kind);
            assert_eq!(
                registry.active().create_version_table_sql(),
                dialect_for(kind, table.clone()).create_version_table_sql()
            );
            assert!(registry
                .active()
                .create_version_table_sql()
                .contains("release_versions"));
        }
    }

    #[test]
    fn test_unknown_dialect_leaves_selection_unchanged() {
        let mut registry = DialectRegistry::default();
        registry.set_active("tidb").unwrap();

        let err = registry.set_active("unknown").unwrap_err();
        assert!(matches!(err, MigrationError::UnknownDialect(_)));
        assert_eq!(registry.kind(), DialectKind::Tidb);
    }

    #[test]
    fn test_handles_outlive_later_switches() {
        let mut registry = DialectRegistry::default();
        let handle = registry.active_handle();
        registry.set_active("sqlite3").unwrap();

        assert_eq!(handle.kind(), DialectKind::Postgres);
        assert_eq!(registry.kind(), DialectKind::Sqlite3);
    }
}
