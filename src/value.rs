//! Backend-neutral values for statement parameters and result rows
//!
//! Every executor converts between its driver's native types and [`SqlValue`],
//! so the dialect layer can bind parameters and decode version rows without
//! knowing which database is on the other end of the connection.

use crate::executor::LifeError;
use std::fmt;

/// 2^63 as an `f64`
const I64_BOUND: f64 = 9_223_372_036_854_775_808.0;

/// A single parameter or result cell
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    /// SQL `NULL`
    Null,
    /// Native boolean
    Bool(bool),
    /// Any integer column, widened to `i64`
    Int(i64),
    /// Floating point column
    Float(f64),
    /// Text, character flags and timestamps rendered as text
    Text(String),
}

impl SqlValue {
    /// Returns `true` for [`SqlValue::Null`]
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, SqlValue::Null)
    }

    /// Interpret the value as an integer
    ///
    /// Text is accepted when it parses as a decimal integer, which is how some
    /// drivers hand back `NUMBER(19)` columns.
    ///
    /// # Errors
    ///
    /// Returns `LifeError::ParseError` for `NULL`, floats with a fractional part
    /// or outside the `i64` range, booleans, and non-numeric text.
    pub fn as_i64(&self) -> Result<i64, LifeError> {
        match self {
            SqlValue::Int(v) => Ok(*v),
            // i64::MAX is not representable as f64; 2^63 is the first value out of range.
            SqlValue::Float(v) if v.fract() == 0.0 && *v >= -I64_BOUND && *v < I64_BOUND => {
                Ok(*v as i64)
            }
            SqlValue::Text(s) => s
                .trim()
                .parse::<i64>()
                .map_err(|e| LifeError::ParseError(format!("'{s}' is not an integer: {e}"))),
            other => Err(LifeError::ParseError(format!(
                "expected integer, found {other}"
            ))),
        }
    }

    /// Interpret the value as a boolean flag
    ///
    /// Native booleans, `0`/`1` integers and single-character flags
    /// (`t`/`f`, `1`/`0`, `y`/`n`, case-insensitive) are all accepted.
    ///
    /// # Errors
    ///
    /// Returns `LifeError::ParseError` for anything else.
    pub fn as_bool(&self) -> Result<bool, LifeError> {
        match self {
            SqlValue::Bool(b) => Ok(*b),
            SqlValue::Int(0) => Ok(false),
            SqlValue::Int(1) => Ok(true),
            SqlValue::Text(s) => match s.trim().to_ascii_lowercase().as_str() {
                "t" | "true" | "1" | "y" => Ok(true),
                "f" | "false" | "0" | "n" => Ok(false),
                _ => Err(LifeError::ParseError(format!("'{s}' is not a boolean flag"))),
            },
            other => Err(LifeError::ParseError(format!(
                "expected boolean, found {other}"
            ))),
        }
    }
}

impl fmt::Display for SqlValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SqlValue::Null => write!(f, "NULL"),
            SqlValue::Bool(b) => write!(f, "{b}"),
            SqlValue::Int(v) => write!(f, "{v}"),
            SqlValue::Float(v) => write!(f, "{v}"),
            SqlValue::Text(s) => write!(f, "'{s}'"),
        }
    }
}

impl From<bool> for SqlValue {
    fn from(value: bool) -> Self {
        SqlValue::Bool(value)
    }
}

impl From<i64> for SqlValue {
    fn from(value: i64) -> Self {
        SqlValue::Int(value)
    }
}

impl From<i32> for SqlValue {
    fn from(value: i32) -> Self {
        SqlValue::Int(i64::from(value))
    }
}

impl From<&str> for SqlValue {
    fn from(value: &str) -> Self {
        SqlValue::Text(value.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(value: String) -> Self {
        SqlValue::Text(value)
    }
}

impl<T: Into<SqlValue>> From<Option<T>> for SqlValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(SqlValue::Null, Into::into)
    }
}

/// One result row, cells in select-list order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    values: Vec<SqlValue>,
}

impl Row {
    /// Build a row from its cells
    #[must_use]
    pub fn new(values: Vec<SqlValue>) -> Self {
        Self { values }
    }

    /// Number of cells
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// `true` when the row has no cells
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Borrow the cell at `idx`
    ///
    /// # Errors
    ///
    /// Returns `LifeError::ParseError` if `idx` is out of range.
    pub fn get(&self, idx: usize) -> Result<&SqlValue, LifeError> {
        self.values.get(idx).ok_or_else(|| {
            LifeError::ParseError(format!(
                "column index {idx} out of range for row with {} columns",
                self.values.len()
            ))
        })
    }

    /// Read the cell at `idx` as an integer
    ///
    /// # Errors
    ///
    /// Returns `LifeError::ParseError` if the index is out of range or the cell
    /// is not an integer.
    pub fn get_i64(&self, idx: usize) -> Result<i64, LifeError> {
        self.get(idx)?.as_i64()
    }

    /// Read the cell at `idx` as a boolean flag
    ///
    /// # Errors
    ///
    /// Returns `LifeError::ParseError` if the index is out of range or the cell
    /// is not a recognizable flag.
    pub fn get_bool(&self, idx: usize) -> Result<bool, LifeError> {
        self.get(idx)?.as_bool()
    }

    /// Consume the row and return its cells
    #[must_use]
    pub fn into_values(self) -> Vec<SqlValue> {
        self.values
    }
}

impl From<Vec<SqlValue>> for Row {
    fn from(values: Vec<SqlValue>) -> Self {
        Self::new(values)
    }
}
