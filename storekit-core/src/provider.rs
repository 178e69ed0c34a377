//! Capability contracts implemented by store backends.
//!
//! [`StoreProvider`] is the lifecycle every backend supports; its methods
//! default to no-ops for backends that need no setup. [`RelationalStoreProvider`]
//! adds SQL execution on top and is implemented by
//! [`SqliteStore`](crate::SqliteStore).

use std::collections::HashMap;

use storekit_db::Value;

use crate::error::{StoreError, StoreResult};

/// One result row as values in column order.
pub type Row = Vec<Value>;

/// One result row keyed by column name.
pub type RowMap = HashMap<String, Value>;

/// Callback receiving `(statement index, row)` while a transaction drains a
/// `SELECT`.
pub type RowCallback<'a> = &'a mut dyn FnMut(usize, RowMap);

/// Open/close lifecycle of a persistence backend.
///
/// Calls must be balanced: opening an already open store is undefined for the
/// backend and is the caller's responsibility to avoid.
pub trait StoreProvider {
    /// Opens or creates the backing store.
    ///
    /// # Errors
    ///
    /// Returns an [`ErrorDomain::Open`](crate::ErrorDomain::Open) error if the
    /// store cannot be opened.
    fn open(&mut self, name_or_path: &str, create_if_needed: bool) -> StoreResult<()> {
        let _ = (name_or_path, create_if_needed);
        Ok(())
    }

    /// Releases the backing store. Safe to call when nothing is open.
    ///
    /// # Errors
    ///
    /// Returns an [`ErrorDomain::Close`](crate::ErrorDomain::Close) error if
    /// the backend reports a failure while releasing.
    fn close(&mut self) -> StoreResult<()> {
        Ok(())
    }
}

/// SQL execution over raw SQL text and positional parameters.
///
/// At most one statement is live at a time: every `execute_*` call finalizes
/// whatever statement was live before, discarding undrained rows.
pub trait RelationalStoreProvider: StoreProvider {
    /// Prepares `sql`, binds `params` and leaves the row cursor positioned
    /// before the first row.
    ///
    /// # Errors
    ///
    /// `Prepare` if the SQL does not compile, `Bind` if the parameter count or
    /// a parameter bind fails. After a bind failure the statement stays live
    /// until the next prepare or close.
    fn execute_query(&mut self, sql: &str, params: &[Value]) -> StoreResult<()>;

    /// Prepares, binds and runs a statement that produces no rows.
    ///
    /// # Errors
    ///
    /// `Transaction` if the failure triggered a rollback of an open explicit
    /// transaction, `Prepare` otherwise.
    fn execute_update(&mut self, sql: &str, params: &[Value]) -> StoreResult<()>;

    /// Advances the cursor and returns the row in column order.
    ///
    /// `None` once the result set is exhausted or the step failed; the
    /// statement is finalized in both cases and a failure is visible through
    /// [`last_error`](Self::last_error).
    fn next_row(&mut self) -> Option<Row>;

    /// Like [`next_row`](Self::next_row) but keyed by column name.
    fn next_row_map(&mut self) -> Option<RowMap>;

    /// Runs a query and materializes every row.
    ///
    /// An empty vector means the query ran and matched nothing.
    ///
    /// # Errors
    ///
    /// Propagates the [`execute_query`](Self::execute_query) failure.
    fn result_set(&mut self, sql: &str, params: &[Value]) -> StoreResult<Vec<Row>> {
        self.execute_query(sql, params)?;
        let mut rows = Vec::new();
        while let Some(row) = self.next_row() {
            rows.push(row);
        }
        Ok(rows)
    }

    /// Runs a newline-separated script statement by statement.
    ///
    /// `param_sets[i]` holds the parameters for line `i`; missing entries bind
    /// nothing. Rows of `SELECT` lines are handed to `on_row` with the line
    /// index.
    ///
    /// # Errors
    ///
    /// Stops at the first failing statement and returns its error.
    fn execute_transaction(
        &mut self,
        script: &str,
        param_sets: Option<&[Option<Vec<Value>>]>,
        on_row: Option<RowCallback<'_>>,
    ) -> StoreResult<()>;

    /// Column count of the most recently prepared query.
    fn column_count(&self) -> usize;

    /// Column names of the most recently prepared query.
    fn column_names(&self) -> Vec<String>;

    /// Rowid of the most recent successful INSERT.
    fn last_insert_row_id(&self) -> i64;

    /// The error record of the most recent failing operation, cleared by a
    /// successful open or prepare.
    fn last_error(&self) -> Option<&StoreError>;
}
