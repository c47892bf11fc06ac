//! Migration-specific error types

use crate::connection::ConnectionError;
use crate::dialect::AuxStep;
use crate::executor::LifeError;
use crate::transaction::TransactionError;
use thiserror::Error;

/// Errors surfaced by the dialect layer and the version-table helpers
#[derive(Debug, Error)]
pub enum MigrationError {
    /// Dialect identifier is not one of the supported backends
    #[error("{0:?}: unknown dialect")]
    UnknownDialect(String),
    /// Version table name would not be safe to interpolate into SQL
    #[error("Invalid version table name {0:?}: expected an identifier, optionally schema-qualified")]
    InvalidTableName(String),
    /// A name derived from the version table exceeds the backend's identifier limit
    #[error("Identifier {name:?} is longer than the {max}-byte limit of this backend")]
    IdentifierTooLong { name: String, max: usize },
    /// A step of the post-creation bootstrap failed; later steps were not run
    #[error("Auxiliary setup failed while creating {step}: {source}")]
    AuxiliarySetup {
        step: AuxStep,
        #[source]
        source: LifeError,
    },
    /// Database execution error
    #[error("Database error: {0}")]
    Database(#[from] LifeError),
    /// Connection could not be established
    #[error("Connection error: {0}")]
    Connection(#[from] ConnectionError),
    /// Configuration could not be loaded or is invalid
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<TransactionError> for MigrationError {
    fn from(error: TransactionError) -> Self {
        MigrationError::Database(error.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_dialect_display() {
        let err = MigrationError::UnknownDialect("mssql".to_string());
        assert_eq!(err.to_string(), "\"mssql\": unknown dialect");
    }

    #[test]
    fn test_auxiliary_setup_names_step_and_keeps_source() {
        use std::error::Error as _;

        let err = MigrationError::AuxiliarySetup {
            step: AuxStep::Sequence,
            source: LifeError::QueryError("ORA-00955: name is already used".to_string()),
        };
        let display = err.to_string();
        assert!(display.contains("sequence"));
        assert!(display.contains("ORA-00955"));
        assert!(err.source().is_some());
    }

    #[test]
    fn test_identifier_too_long_display() {
        let err = MigrationError::IdentifierTooLong {
            name: "a_very_long_version_table_id_seq".to_string(),
            max: 30,
        };
        assert_eq!(
            err.to_string(),
            "Identifier \"a_very_long_version_table_id_seq\" is longer than the 30-byte limit of this backend"
        );
    }

    #[test]
    fn test_transaction_error_becomes_database_error() {
        let err: MigrationError = TransactionError::TransactionClosed.into();
        assert!(matches!(err, MigrationError::Database(_)));
    }
}
