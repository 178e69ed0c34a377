//! Configuration for the `SQLite` store.

use serde::{Deserialize, Serialize};

use crate::error::{ErrorDomain, StoreError, StoreResult};

/// How SQL NULL columns appear in materialized rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NullRepresentation {
    /// `Value::Null` in both the sequence and the mapping form.
    #[default]
    Tagged,
    /// Empty text in the sequence form, key omitted in the mapping form.
    Legacy,
}

/// Options applied when a [`SqliteStore`](crate::SqliteStore) opens its
/// database.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StoreConfig {
    /// Open without write access.
    pub read_only: bool,
    /// Busy handler timeout set right after open.
    pub busy_timeout_ms: Option<u32>,
    /// Run `PRAGMA foreign_keys = ON` after open.
    pub foreign_keys: bool,
    /// Row representation of NULL columns.
    pub null_representation: NullRepresentation,
}

impl StoreConfig {
    /// Parses a JSON configuration document. Missing fields take defaults.
    ///
    /// # Errors
    ///
    /// Returns an [`ErrorDomain::Open`] error if the document is malformed.
    pub fn from_json(json: &str) -> StoreResult<Self> {
        serde_json::from_str(json).map_err(|err| {
            StoreError::new(ErrorDomain::Open, 0, format!("invalid store config: {err}"))
        })
    }
}
