//! `VersionRecord` and `VersionRow` - entries in the version table

use crate::executor::LifeError;
use crate::value::{Row, SqlValue};
use chrono::NaiveDateTime;

/// One lifecycle event in the version table
///
/// The table is append-only: applying and rolling back a migration both insert
/// a row. `id` and `tstamp` are always assigned by the database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionRecord {
    /// Backend-generated surrogate key, strictly increasing
    pub id: i64,

    /// Migration the event refers to
    pub version_id: i64,

    /// `true` for apply, `false` for rollback
    pub is_applied: bool,

    /// Row creation time in UTC (`None` when the backend left it null)
    pub tstamp: Option<NaiveDateTime>,
}

impl VersionRecord {
    /// Create a `VersionRecord` from a database row
    ///
    /// Expected column order: `id`, `version_id`, `is_applied`, `tstamp`
    ///
    /// # Errors
    ///
    /// Returns `LifeError` if a column is missing or cannot be decoded.
    pub fn from_row(row: &Row) -> Result<Self, LifeError> {
        let tstamp = match row.get(3)? {
            SqlValue::Null => None,
            SqlValue::Text(text) => Some(parse_timestamp(text)?),
            other => {
                return Err(LifeError::ParseError(format!(
                    "expected timestamp text, found {other}"
                )))
            }
        };

        Ok(Self {
            id: row.get_i64(0)?,
            version_id: row.get_i64(1)?,
            is_applied: row.get_bool(2)?,
            tstamp,
        })
    }
}

/// `version_id`/`is_applied` pair as returned by the version query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VersionRow {
    pub version_id: i64,
    pub is_applied: bool,
}

impl VersionRow {
    #[must_use]
    pub fn new(version_id: i64, is_applied: bool) -> Self {
        Self {
            version_id,
            is_applied,
        }
    }

    /// Decode a `SELECT version_id, is_applied ...` row
    ///
    /// # Errors
    ///
    /// Returns `LifeError::ParseError` if either column is missing or invalid.
    pub fn from_row(row: &Row) -> Result<Self, LifeError> {
        Ok(Self {
            version_id: row.get_i64(0)?,
            is_applied: row.get_bool(1)?,
        })
    }
}

fn parse_timestamp(text: &str) -> Result<NaiveDateTime, LifeError> {
    const FORMATS: [&str; 4] = [
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S",
    ];
    FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text.trim(), fmt).ok())
        .ok_or_else(|| {
            LifeError::ParseError(format!(
                "Failed to parse timestamp '{text}': unrecognized format"
            ))
        })
}
