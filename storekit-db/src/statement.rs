//! Safe wrapper around a `SQLite` prepared statement.
//!
//! This file contains **no `unsafe` code**. All FFI interaction is delegated to
//! [`ffi::RawStmt`] which encapsulates the raw pointers and C type conversions.

use super::error::{DbError, DbResult};
use super::ffi::{self, RawStmt};
use super::value::Value;

/// Result of a single `sqlite3_step` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepResult {
    /// A result row is available.
    Row,
    /// The statement has finished executing.
    Done,
}

/// A prepared `SQLite` statement.
///
/// Created via [`Connection::prepare`](super::Connection::prepare) and
/// finalized when dropped. A statement may outlive the [`Connection`]
/// value that prepared it: closing the connection defers the real release
/// until the statement is finalized.
///
/// [`Connection`]: super::Connection
pub struct Statement {
    raw: RawStmt,
}

fn col(idx: usize) -> i32 {
    i32::try_from(idx).unwrap_or(i32::MAX)
}

impl Statement {
    /// Wraps a raw statement handle.
    pub(super) const fn new(raw: RawStmt) -> Self {
        Self { raw }
    }

    /// Returns the number of placeholders in the compiled SQL.
    pub fn parameter_count(&self) -> usize {
        usize::try_from(self.raw.parameter_count()).unwrap_or(0)
    }

    /// Binds a slice of [`Value`]s to the statement parameters (1-indexed).
    ///
    /// The slice length must equal [`parameter_count`](Self::parameter_count);
    /// a mismatch fails with `SQLITE_RANGE` before anything is bound. The first
    /// failing bind aborts the loop.
    pub fn bind_values(&self, values: &[Value]) -> DbResult<()> {
        let expected = self.parameter_count();
        if values.len() != expected {
            return Err(DbError::new(
                ffi::SQLITE_RANGE,
                format!(
                    "statement expects {expected} parameter(s), {} supplied",
                    values.len()
                ),
            ));
        }
        for (i, val) in values.iter().enumerate() {
            let idx = i32::try_from(i + 1).map_err(|_| {
                DbError::new(ffi::SQLITE_RANGE, "parameter index overflow")
            })?;
            match val {
                Value::Int(v) => self.raw.bind_i32(idx, *v)?,
                Value::Integer(v) => self.raw.bind_i64(idx, *v)?,
                Value::Real(v) => self.raw.bind_f64(idx, *v)?,
                Value::Text(v) => self.raw.bind_text(idx, v)?,
                Value::Blob(v) => self.raw.bind_blob(idx, v)?,
                Value::Null => self.raw.bind_null(idx)?,
            }
        }
        Ok(())
    }

    /// Executes a single step.
    pub fn step(&self) -> DbResult<StepResult> {
        let rc = self.raw.step()?;
        if rc == ffi::SQLITE_ROW {
            Ok(StepResult::Row)
        } else {
            Ok(StepResult::Done)
        }
    }

    /// Returns the number of columns in the result set.
    pub fn column_count(&self) -> usize {
        usize::try_from(self.raw.column_count()).unwrap_or(0)
    }

    /// Returns the name of column `idx` as given by the `AS` clause or the
    /// column definition.
    pub fn column_name(&self, idx: usize) -> String {
        self.raw.column_name(col(idx)).unwrap_or_default()
    }

    /// Returns all column names in result order.
    pub fn column_names(&self) -> Vec<String> {
        (0..self.column_count()).map(|i| self.column_name(i)).collect()
    }

    /// Reads column `idx` of the current row, converting by its storage class.
    pub fn column_value(&self, idx: usize) -> Value {
        let i = col(idx);
        match self.raw.column_type(i) {
            ffi::SQLITE_INTEGER => Value::Integer(self.raw.column_i64(i)),
            ffi::SQLITE_FLOAT => Value::Real(self.raw.column_f64(i)),
            ffi::SQLITE_TEXT => Value::Text(self.raw.column_text(i)),
            ffi::SQLITE_BLOB => Value::Blob(self.raw.column_blob(i)),
            _ => Value::Null,
        }
    }

    /// Reads every column of the current row.
    pub fn row_values(&self) -> Vec<Value> {
        (0..self.column_count()).map(|i| self.column_value(i)).collect()
    }

    /// Reads a column as `i64`.
    pub fn column_i64(&self, idx: usize) -> i64 {
        self.raw.column_i64(col(idx))
    }

    /// Reads a column as a blob. Returns an empty `Vec` for NULL.
    pub fn column_blob(&self, idx: usize) -> Vec<u8> {
        self.raw.column_blob(col(idx))
    }

    /// Reads a column as a UTF-8 string. Returns an empty string for NULL.
    pub fn column_text(&self, idx: usize) -> String {
        self.raw.column_text(col(idx))
    }

    /// Returns `true` if the column is SQL NULL.
    pub fn is_column_null(&self, idx: usize) -> bool {
        self.raw.column_type(col(idx)) == ffi::SQLITE_NULL
    }
}

impl std::fmt::Debug for Statement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Statement")
            .field("columns", &self.column_count())
            .finish_non_exhaustive()
    }
}
