//! Error record shared by every store backend.

use storekit_db::{DbError, DbErrorCode};
use strum::Display;
use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Which stage of an operation failed.
///
/// The `Display` form is the tag carried in error messages, e.g.
/// `"bind error"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum ErrorDomain {
    /// Opening the store handle failed.
    #[strum(serialize = "open error")]
    Open,
    /// Releasing the store handle failed.
    #[strum(serialize = "close error")]
    Close,
    /// Parameter count mismatch or a single parameter bind failed.
    #[strum(serialize = "bind error")]
    Bind,
    /// SQL did not compile, the store was not open, or an update ended with
    /// an unexpected status.
    #[strum(serialize = "prepare error")]
    Prepare,
    /// A failure that triggered an explicit rollback.
    #[strum(serialize = "transaction error")]
    Transaction,
    /// Advancing the row cursor failed.
    #[strum(serialize = "step error")]
    Step,
}

/// A failed store operation: domain tag, native status code, and the engine's
/// message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{domain} ({code}): {message}")]
pub struct StoreError {
    /// Stage that failed.
    pub domain: ErrorDomain,
    /// Native `SQLite` status code (extended codes are kept as-is).
    pub code: i32,
    /// Human-readable message from the engine's last-error state.
    pub message: String,
}

impl StoreError {
    /// Creates a new error record.
    pub fn new(domain: ErrorDomain, code: i32, message: impl Into<String>) -> Self {
        Self {
            domain,
            code,
            message: message.into(),
        }
    }

    /// Tags a database error with `domain`.
    #[must_use]
    pub fn from_db(domain: ErrorDomain, err: DbError) -> Self {
        Self {
            domain,
            code: err.code.0,
            message: err.message,
        }
    }

    /// The primary result code, e.g. `SQLITE_CONSTRAINT` for any of its
    /// extended constraint codes.
    #[must_use]
    pub const fn primary_code(&self) -> i32 {
        DbErrorCode(self.code).primary()
    }

    /// Re-tags the error, keeping code and message.
    #[must_use]
    pub const fn with_domain(mut self, domain: ErrorDomain) -> Self {
        self.domain = domain;
        self
    }
}
