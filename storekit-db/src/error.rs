//! Error type for the safe `SQLite` wrapper.

use std::fmt;

/// Native `SQLite` status code, possibly carrying extended-code bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DbErrorCode(pub i32);

impl DbErrorCode {
    /// Strips the extended bits, so `SQLITE_CONSTRAINT_FOREIGNKEY` (787)
    /// compares equal to `SQLITE_CONSTRAINT` (19).
    #[must_use]
    pub const fn primary(self) -> i32 {
        self.0 & 0xff
    }
}

impl fmt::Display for DbErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.primary() == self.0 {
            write!(f, "{}", self.0)
        } else {
            write!(f, "{} (extended {})", self.primary(), self.0)
        }
    }
}

/// A failed call into `SQLite`: the status it returned and the connection's
/// error message at that point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbError {
    /// Status returned by the failing call.
    pub code: DbErrorCode,
    /// `sqlite3_errmsg` text, or a description produced by this crate for
    /// checks it makes itself (parameter count, empty SQL, ...).
    pub message: String,
}

impl DbError {
    pub(crate) fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code: DbErrorCode(code),
            message: message.into(),
        }
    }
}

impl fmt::Display for DbError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [sqlite status {}]", self.message, self.code)
    }
}

impl std::error::Error for DbError {}

/// Result alias used throughout this crate.
pub type DbResult<T> = Result<T, DbError>;
