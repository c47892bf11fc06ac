//! Post-creation bootstrap for backends without native auto-increment
//!
//! The steps depend on each other (the trigger reads the sequence, inserts rely
//! on the trigger), so they run strictly in order and the first failure stops
//! the pipeline. The caller's transaction is left open either way.

use crate::executor::LifeExecutor;
use crate::migration::MigrationError;
use crate::transaction::Transaction;
use std::fmt;

/// One statement of the bootstrap pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuxStep {
    /// Primary key constraint on `id`
    PrimaryKey,
    /// Sequence feeding `id`
    Sequence,
    /// Before-insert trigger filling `id` from the sequence
    Trigger,
}

impl fmt::Display for AuxStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AuxStep::PrimaryKey => "primary key",
            AuxStep::Sequence => "sequence",
            AuxStep::Trigger => "trigger",
        })
    }
}

/// Run `steps` in order inside `tx`
///
/// # Errors
///
/// Returns `MigrationError::AuxiliarySetup` for the first step whose statement
/// fails; no later step is attempted.
pub fn run_steps(tx: &Transaction<'_>, steps: &[(AuxStep, String)]) -> Result<(), MigrationError> {
    for (step, sql) in steps {
        tx.execute(sql, &[]).map_err(|source| {
            log::error!("version table bootstrap failed creating {step}: {source}");
            MigrationError::AuxiliarySetup {
                step: *step,
                source,
            }
        })?;
        log::debug!("version table bootstrap created {step}");
    }
    Ok(())
}
