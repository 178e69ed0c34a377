//! Pluggable persistence contracts and a `SQLite` relational store.
//!
//! Backends implement [`StoreProvider`] for their open/close lifecycle, and
//! [`RelationalStoreProvider`] when they can execute SQL. [`SqliteStore`] is
//! the relational backend: it drives the `SQLite` C API through
//! [`storekit_db`], keeps at most one live prepared statement, and runs
//! newline-separated scripts as transactions with rollback on first failure.
//!
//! ```rust
//! use storekit_core::{RelationalStoreProvider, SqliteStore, StoreProvider, Value};
//!
//! let mut store = SqliteStore::new();
//! store.open(":memory:", true).expect("open");
//! store
//!     .execute_update("CREATE TABLE t (a TEXT)", &[])
//!     .expect("create");
//! store
//!     .execute_update("INSERT INTO t (a) VALUES (?)", &[Value::from("x")])
//!     .expect("insert");
//! let rows = store.result_set("SELECT a FROM t", &[]).expect("select");
//! assert_eq!(rows, vec![vec![Value::from("x")]]);
//! store.close().expect("close");
//! ```

#![deny(clippy::all, clippy::pedantic, clippy::nursery)]

pub mod config;
pub mod error;
pub mod logger;
pub mod provider;
mod sqlite;

pub use config::{NullRepresentation, StoreConfig};
pub use error::{ErrorDomain, StoreError, StoreResult};
pub use provider::{RelationalStoreProvider, Row, RowCallback, RowMap, StoreProvider};
pub use sqlite::SqliteStore;
pub use storekit_db::Value;
