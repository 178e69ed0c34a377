//! Common test utilities shared across integration tests.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use storekit_core::{RelationalStoreProvider, SqliteStore, StoreConfig, StoreProvider};
use uuid::Uuid;

/// A fresh database path inside `dir`. The file does not exist yet.
pub fn temp_db_path(dir: &Path) -> PathBuf {
    dir.join(format!("storekit-{}.sqlite3", Uuid::new_v4()))
}

pub fn path_str(path: &Path) -> &str {
    path.to_str().expect("utf-8 temp path")
}

/// Opens (creating if needed) a store at `path` with `config`.
pub fn open_store(path: &Path, config: StoreConfig) -> SqliteStore {
    let mut store = SqliteStore::with_config(config);
    store.open(path_str(path), true).expect("open store");
    store
}

pub fn create_notes_table(store: &mut SqliteStore) {
    store
        .execute_update(
            "CREATE TABLE notes (id INTEGER PRIMARY KEY, title TEXT NOT NULL, body BLOB)",
            &[],
        )
        .expect("create notes table");
}
