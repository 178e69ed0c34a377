//! Minimal safe `SQLite` wrapper for storekit.
//!
//! This crate provides a small, safe Rust API over the `SQLite` C FFI. The raw
//! symbols come from `libsqlite3-sys`, which compiles the bundled `SQLite`
//! amalgamation into a static library.
//!
//! Consumer code (the relational store adapter, the CLI) uses only the safe
//! types defined here and never touches raw FFI directly. The `ffi` module is
//! the **only** file that contains `unsafe` code or C types.

mod ffi;

mod connection;
pub mod error;
mod statement;
pub mod value;

pub use connection::{Connection, OpenOptions};
pub use error::{DbError, DbErrorCode, DbResult};
pub use statement::{Statement, StepResult};
pub use value::Value;

/// Primary result codes callers match on, compared against
/// [`DbErrorCode::primary`].
pub mod codes {
    pub use super::ffi::{
        SQLITE_CONSTRAINT, SQLITE_DONE, SQLITE_ERROR, SQLITE_MISUSE, SQLITE_OK, SQLITE_RANGE,
        SQLITE_READONLY, SQLITE_ROW,
    };
}

#[cfg(test)]
mod tests;
