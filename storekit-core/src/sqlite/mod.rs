//! `SQLite` implementation of the relational store contract.
//!
//! [`SqliteStore`] owns at most one [`Connection`] and at most one live
//! [`Statement`]. Every query or update replaces the live statement, which
//! finalizes the previous one. Row retrieval finalizes the statement once the
//! cursor stops yielding rows.

mod script;

use log::{debug, trace, warn};
use storekit_db::{
    codes, Connection, DbResult, OpenOptions, Statement, StepResult, Value,
};

use crate::config::{NullRepresentation, StoreConfig};
use crate::error::{ErrorDomain, StoreError, StoreResult};
use crate::provider::{RelationalStoreProvider, Row, RowCallback, RowMap, StoreProvider};
use script::ScriptStep;

/// Relational store backed by an embedded `SQLite` database.
///
/// Single-connection and single-threaded: every operation takes `&mut self`
/// and blocks until the engine returns. The store is `Send` but not `Sync`.
#[derive(Debug, Default)]
pub struct SqliteStore {
    config: StoreConfig,
    // Declared before `conn` so a live statement is finalized first on drop.
    statement: Option<Statement>,
    conn: Option<Connection>,
    column_count: usize,
    column_names: Vec<String>,
    last_error: Option<StoreError>,
}

impl SqliteStore {
    /// Creates a closed store with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a closed store that applies `config` on open.
    #[must_use]
    pub fn with_config(config: StoreConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// The configuration applied on open.
    #[must_use]
    pub const fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Whether a database handle is currently held.
    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.conn.is_some()
    }

    /// `false` while an explicit transaction is open on the connection.
    /// A closed store reports `true`.
    #[must_use]
    pub fn is_autocommit(&self) -> bool {
        self.conn.as_ref().is_none_or(Connection::is_autocommit)
    }

    /// Rows changed by the most recent update.
    #[must_use]
    pub fn changes(&self) -> usize {
        self.conn.as_ref().map_or(0, Connection::changes)
    }

    fn fail<T>(&mut self, err: StoreError) -> StoreResult<T> {
        self.last_error = Some(err.clone());
        Err(err)
    }

    fn configure(&self, conn: &Connection) -> DbResult<()> {
        if let Some(ms) = self.config.busy_timeout_ms {
            conn.busy_timeout(ms)?;
        }
        if self.config.foreign_keys {
            conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        }
        Ok(())
    }

    /// Drops the live statement and the column metadata cached for it.
    fn finalize_statement(&mut self) {
        self.statement = None;
        self.column_count = 0;
        self.column_names.clear();
    }

    /// Finalizes the previous statement, prepares `sql` and binds `params`.
    ///
    /// On a bind failure the new statement stays live.
    fn prepare_and_bind(&mut self, sql: &str, params: &[Value]) -> StoreResult<()> {
        if self.statement.is_some() {
            debug!("finalizing previous statement, undrained rows are discarded");
        }
        self.finalize_statement();

        let Some(conn) = self.conn.as_ref() else {
            return self.fail(StoreError::new(
                ErrorDomain::Prepare,
                codes::SQLITE_MISUSE,
                "store is not open",
            ));
        };
        let stmt = match conn.prepare(sql) {
            Ok(stmt) => stmt,
            Err(err) => return self.fail(StoreError::from_db(ErrorDomain::Prepare, err)),
        };
        trace!("prepared statement: {sql}");
        self.last_error = None;
        self.column_count = stmt.column_count();
        self.column_names = stmt.column_names();

        let bound = stmt.bind_values(params);
        self.statement = Some(stmt);
        if let Err(err) = bound {
            return self.fail(StoreError::from_db(ErrorDomain::Bind, err));
        }
        Ok(())
    }

    /// Drives the live statement to completion in a single step.
    fn step_update(&mut self) -> StoreResult<()> {
        let Some(stmt) = self.statement.take() else {
            return Err(StoreError::new(
                ErrorDomain::Prepare,
                codes::SQLITE_MISUSE,
                "no statement to execute",
            ));
        };
        let stepped = stmt.step();
        drop(stmt);
        self.finalize_statement();
        match stepped {
            Ok(StepResult::Done) => Ok(()),
            Ok(StepResult::Row) => Err(StoreError::new(
                ErrorDomain::Prepare,
                codes::SQLITE_ROW,
                "statement returned rows, run it with execute_query",
            )),
            Err(err) => Err(StoreError::from_db(ErrorDomain::Prepare, err)),
        }
    }

    /// Issues `ROLLBACK` if an explicit transaction is open. Returns whether
    /// a rollback was issued.
    fn rollback_open_transaction(&mut self) -> bool {
        let Some(conn) = self.conn.as_ref() else {
            return false;
        };
        if conn.is_autocommit() {
            return false;
        }
        warn!("rolling back open transaction");
        if let Err(err) = conn.execute_batch("ROLLBACK") {
            warn!("rollback failed: {err}");
        }
        true
    }

    /// Advances the live statement. On anything but a row the statement is
    /// finalized; a step failure is recorded under [`ErrorDomain::Step`].
    fn advance(&mut self) -> bool {
        let Some(stmt) = self.statement.as_ref() else {
            return false;
        };
        match stmt.step() {
            Ok(StepResult::Row) => true,
            Ok(StepResult::Done) => {
                self.finalize_statement();
                false
            }
            Err(err) => {
                let err = StoreError::from_db(ErrorDomain::Step, err);
                warn!("row retrieval stopped: {err}");
                self.last_error = Some(err);
                self.finalize_statement();
                false
            }
        }
    }

    fn current_values(&self) -> Option<Vec<Value>> {
        let stmt = self.statement.as_ref()?;
        Some((0..self.column_count).map(|i| stmt.column_value(i)).collect())
    }
}

impl StoreProvider for SqliteStore {
    /// Opens `name_or_path` (a file path, `:memory:` or a `file:` URI).
    ///
    /// Without `create_if_needed` a missing database fails to open. Opening
    /// an already open store releases the previous handle first.
    fn open(&mut self, name_or_path: &str, create_if_needed: bool) -> StoreResult<()> {
        if self.conn.is_some() {
            warn!("open called on an open store, releasing the previous handle");
            self.finalize_statement();
            self.conn = None;
        }
        let options = OpenOptions {
            create: create_if_needed,
            read_only: self.config.read_only,
        };
        let conn = match Connection::open(name_or_path, options) {
            Ok(conn) => conn,
            Err(err) => return self.fail(StoreError::from_db(ErrorDomain::Open, err)),
        };
        if let Err(err) = self.configure(&conn) {
            // `conn` is released here, no half-configured handle is kept.
            return self.fail(StoreError::from_db(ErrorDomain::Open, err));
        }
        debug!("opened sqlite store at {name_or_path}");
        self.conn = Some(conn);
        self.last_error = None;
        Ok(())
    }

    fn close(&mut self) -> StoreResult<()> {
        self.finalize_statement();
        let Some(conn) = self.conn.take() else {
            return Ok(());
        };
        debug!("closing sqlite store");
        match conn.close() {
            Ok(()) => Ok(()),
            Err(err) => self.fail(StoreError::from_db(ErrorDomain::Close, err)),
        }
    }
}

impl RelationalStoreProvider for SqliteStore {
    fn execute_query(&mut self, sql: &str, params: &[Value]) -> StoreResult<()> {
        self.prepare_and_bind(sql, params)
    }

    fn execute_update(&mut self, sql: &str, params: &[Value]) -> StoreResult<()> {
        let outcome = self
            .prepare_and_bind(sql, params)
            .and_then(|()| self.step_update());
        match outcome {
            Ok(()) => Ok(()),
            Err(err) => {
                let err = if self.rollback_open_transaction() {
                    err.with_domain(ErrorDomain::Transaction)
                } else {
                    err
                };
                self.fail(err)
            }
        }
    }

    fn next_row(&mut self) -> Option<Row> {
        if !self.advance() {
            return None;
        }
        let values = self.current_values()?;
        Some(match self.config.null_representation {
            NullRepresentation::Tagged => values,
            NullRepresentation::Legacy => values
                .into_iter()
                .map(|v| if v.is_null() { Value::Text(String::new()) } else { v })
                .collect(),
        })
    }

    fn next_row_map(&mut self) -> Option<RowMap> {
        if !self.advance() {
            return None;
        }
        let values = self.current_values()?;
        let legacy = self.config.null_representation == NullRepresentation::Legacy;
        Some(
            self.column_names
                .iter()
                .cloned()
                .zip(values)
                .filter(|(_, v)| !(legacy && v.is_null()))
                .collect(),
        )
    }

    fn execute_transaction(
        &mut self,
        script: &str,
        param_sets: Option<&[Option<Vec<Value>>]>,
        mut on_row: Option<RowCallback<'_>>,
    ) -> StoreResult<()> {
        let explicit = !self.is_autocommit();
        let steps = script::plan(script, explicit);
        debug!(
            "running transaction script: {} step(s), explicit transaction: {explicit}",
            steps.len()
        );

        for step in &steps {
            trace!("transaction {step}");
            let sql = step.sql();
            let result = match *step {
                ScriptStep::Line { index, sql: line } if script::is_select(line) => {
                    let params = param_sets
                        .and_then(|sets| sets.get(index))
                        .and_then(Option::as_deref)
                        .unwrap_or(&[]);
                    self.execute_query(&sql, params).and_then(|()| {
                        if let Some(callback) = on_row.as_mut() {
                            while let Some(row) = self.next_row_map() {
                                callback(index, row);
                            }
                        }
                        // Cleared by the prepare above, so anything here is a
                        // step failure from the drain.
                        self.last_error.clone().map_or(Ok(()), Err)
                    })
                }
                ScriptStep::Line { index, .. } => {
                    let params = param_sets
                        .and_then(|sets| sets.get(index))
                        .and_then(Option::as_deref)
                        .unwrap_or(&[]);
                    self.execute_update(&sql, params)
                }
                ScriptStep::Open | ScriptStep::Release => self.execute_update(&sql, &[]),
            };

            if let Err(err) = result {
                // A failed update has already rolled back; a failed query has
                // not. The script itself may also have opened the transaction.
                let err = if self.rollback_open_transaction() || explicit {
                    err.with_domain(ErrorDomain::Transaction)
                } else {
                    err
                };
                warn!("transaction aborted at {step}: {err}");
                return self.fail(err);
            }
        }
        Ok(())
    }

    fn column_count(&self) -> usize {
        self.column_count
    }

    fn column_names(&self) -> Vec<String> {
        self.column_names.clone()
    }

    fn last_insert_row_id(&self) -> i64 {
        self.conn.as_ref().map_or(0, Connection::last_insert_rowid)
    }

    fn last_error(&self) -> Option<&StoreError> {
        self.last_error.as_ref()
    }
}
