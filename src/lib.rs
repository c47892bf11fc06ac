//! # Shoreline
//!
//! Version-table dialects for synchronous migration runners.
//!
//! A runner records every migration apply and rollback as a new row in a
//! version table. The SQL for that table differs per backend (serial vs.
//! identity vs. sequence-and-trigger keys, `$1` vs. `?` placeholders), so it
//! lives behind [`SqlDialect`], selected through a [`DialectRegistry`] and run
//! over any [`LifeExecutor`].
//!
//! Supported backends: `postgres`, `mysql`, `sqlite3`, `redshift`, `tidb`, `oracle`.

pub mod config;
pub mod connection;
pub mod dialect;
pub mod executor;
pub mod migration;
pub mod sqlite;
pub mod transaction;
pub mod value;

#[cfg(any(test, feature = "mock"))]
pub mod mock;
#[cfg(feature = "tracing")]
pub mod tracing_helpers;

pub use config::MigrationConfig;
pub use connection::{connect, ConnectionError};
pub use dialect::{dialect_for, DialectKind, DialectRegistry, SqlDialect, VersionRows};
pub use executor::{LifeError, LifeExecutor, MayPostgresExecutor};
pub use migration::{MigrationError, VersionRecord, VersionRow, VersionTableName};
pub use sqlite::SqliteExecutor;
pub use transaction::{IsolationLevel, Transaction, TransactionError};
pub use value::{Row, SqlValue};
