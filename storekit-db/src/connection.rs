//! Safe wrapper around a `SQLite` database connection.
//!
//! This file contains **no `unsafe` code**. All FFI interaction is delegated to
//! [`ffi::RawDb`] which encapsulates the raw pointers and C type conversions.

use super::error::{DbError, DbResult};
use super::ffi::{self, RawDb};
use super::statement::{Statement, StepResult};
use super::value::Value;

/// How [`Connection::open`] treats the database file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OpenOptions {
    /// Create the database if it does not exist yet.
    pub create: bool,
    /// Open without write access. Takes precedence over `create`.
    pub read_only: bool,
}

impl OpenOptions {
    /// Read-write access, creating the file when missing.
    #[must_use]
    pub const fn create() -> Self {
        Self {
            create: true,
            read_only: false,
        }
    }

    const fn flags(self) -> i32 {
        let base = if self.read_only {
            ffi::SQLITE_OPEN_READONLY
        } else if self.create {
            ffi::SQLITE_OPEN_READWRITE | ffi::SQLITE_OPEN_CREATE
        } else {
            ffi::SQLITE_OPEN_READWRITE
        };
        base | ffi::SQLITE_OPEN_FULLMUTEX | ffi::SQLITE_OPEN_URI
    }
}

/// A `SQLite` database connection.
///
/// Closed when dropped, or explicitly with [`close`](Self::close) to observe
/// the close status. Not `Sync` -- all access must happen from a single
/// thread.
pub struct Connection {
    db: RawDb,
}

impl Connection {
    /// Opens a database at `path`, which may also be `:memory:` or a
    /// `file:` URI.
    pub fn open(path: &str, options: OpenOptions) -> DbResult<Self> {
        let db = RawDb::open(path, options.flags())?;
        Ok(Self { db })
    }

    /// Opens a private in-memory database.
    pub fn open_in_memory() -> DbResult<Self> {
        Self::open(":memory:", OpenOptions::create())
    }

    /// Closes the connection and reports the close status.
    ///
    /// Statements that are still alive keep the underlying handle around until
    /// they are finalized.
    pub fn close(self) -> DbResult<()> {
        self.db.close()
    }

    /// Executes one or more SQL statements separated by semicolons.
    ///
    /// No result rows are returned. Suitable for DDL, PRAGMAs, and
    /// transaction control.
    pub fn execute_batch(&self, sql: &str) -> DbResult<()> {
        self.db.exec(sql)
    }

    /// Prepares a single SQL statement.
    pub fn prepare(&self, sql: &str) -> DbResult<Statement> {
        let raw_stmt = self.db.prepare(sql)?;
        Ok(Statement::new(raw_stmt))
    }

    /// Prepares and executes a single SQL statement with the given parameters.
    ///
    /// Returns the number of rows changed.
    pub fn execute(&self, sql: &str, params: &[Value]) -> DbResult<usize> {
        let stmt = self.prepare(sql)?;
        stmt.bind_values(params)?;
        stmt.step()?;
        Ok(self.changes())
    }

    /// Prepares and executes a statement, mapping exactly one result row.
    ///
    /// Returns an error if no row is returned.
    pub fn query_row<T>(
        &self,
        sql: &str,
        params: &[Value],
        mapper: impl FnOnce(&Statement) -> DbResult<T>,
    ) -> DbResult<T> {
        let stmt = self.prepare(sql)?;
        stmt.bind_values(params)?;
        match stmt.step()? {
            StepResult::Row => mapper(&stmt),
            StepResult::Done => {
                Err(DbError::new(ffi::SQLITE_DONE, "query returned no rows"))
            }
        }
    }

    /// Prepares a statement and collects all matching rows.
    pub fn query_map<T>(
        &self,
        sql: &str,
        params: &[Value],
        mapper: impl Fn(&Statement) -> DbResult<T>,
    ) -> DbResult<Vec<T>> {
        let stmt = self.prepare(sql)?;
        stmt.bind_values(params)?;
        let mut results = Vec::new();
        while stmt.step()? == StepResult::Row {
            results.push(mapper(&stmt)?);
        }
        Ok(results)
    }

    /// Sets the busy handler timeout in milliseconds.
    pub fn busy_timeout(&self, ms: u32) -> DbResult<()> {
        self.db.set_busy_timeout(i32::try_from(ms).unwrap_or(i32::MAX))
    }

    /// Returns `false` while an explicit transaction (`BEGIN`/`SAVEPOINT`) is
    /// open on this connection.
    pub fn is_autocommit(&self) -> bool {
        self.db.is_autocommit()
    }

    /// Returns the rowid of the most recent successful INSERT.
    pub fn last_insert_rowid(&self) -> i64 {
        self.db.last_insert_rowid()
    }

    /// Returns the number of rows changed by the most recent statement.
    pub fn changes(&self) -> usize {
        usize::try_from(self.db.changes()).unwrap_or(0)
    }
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection").finish_non_exhaustive()
    }
}
