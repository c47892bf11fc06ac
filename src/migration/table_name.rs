//! Version table naming
//!
//! Every statement a dialect produces interpolates this name, so it is
//! validated once up front instead of being quoted per backend.

use crate::migration::MigrationError;
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;
use std::str::FromStr;

/// Table name used when the runner does not configure one
pub const DEFAULT_VERSION_TABLE: &str = "db_version";

static TABLE_NAME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*(\.[A-Za-z_][A-Za-z0-9_]*)?$")
        .expect("version table name pattern is valid")
});

/// Validated name of the version table, optionally schema-qualified
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VersionTableName(String);

impl VersionTableName {
    /// Validate `name` as a version table name
    ///
    /// # Errors
    ///
    /// Returns `MigrationError::InvalidTableName` unless `name` is a plain
    /// identifier or `schema.identifier`.
    pub fn new(name: impl Into<String>) -> Result<Self, MigrationError> {
        let name = name.into();
        if TABLE_NAME_RE.is_match(&name) {
            Ok(Self(name))
        } else {
            Err(MigrationError::InvalidTableName(name))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for VersionTableName {
    fn default() -> Self {
        Self(DEFAULT_VERSION_TABLE.to_string())
    }
}

impl fmt::Display for VersionTableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for VersionTableName {
    type Err = MigrationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for VersionTableName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_name() {
        assert_eq!(VersionTableName::default().as_str(), DEFAULT_VERSION_TABLE);
    }

    #[test]
    fn test_accepts_identifiers_and_schema_qualified() {
        for name in ["db_version", "_versions", "Schema1.db_version", "v2"] {
            assert!(VersionTableName::new(name).is_ok(), "should accept {name}");
        }
    }

    #[test]
    fn test_rejects_unsafe_names() {
        for name in [
            "",
            "1table",
            "db version",
            "db_version; DROP TABLE users",
            "a.b.c",
            "\"quoted\"",
        ] {
            let err = VersionTableName::new(name).unwrap_err();
            assert!(matches!(err, MigrationError::InvalidTableName(_)), "should reject {name}");
        }
    }
}
