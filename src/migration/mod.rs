//! Version table support for migration runners
//!
//! This module provides the pieces a runner needs around the version table:
//! - The validated table name every dialect interpolates
//! - Row types for the version history
//! - Creation, append and read helpers that go through the active dialect
//! - The error type shared with the dialect layer
//!
//! Discovering, ordering and executing migration scripts stays with the runner.

pub mod error;
pub mod record;
pub mod table_name;
pub mod version_table;

pub use error::MigrationError;
pub use record::{VersionRecord, VersionRow};
pub use table_name::{VersionTableName, DEFAULT_VERSION_TABLE};
pub use version_table::{
    applied_versions, create_version_table, current_version, insert_version, version_history,
};
