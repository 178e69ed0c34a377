//! Raw FFI access to `SQLite`, linked through `libsqlite3-sys` (bundled
//! amalgamation).
//!
//! This is the **only** file in the crate that contains `unsafe` code or C
//! types. [`RawDb`] owns a `sqlite3*` handle and [`RawStmt`] owns a
//! `sqlite3_stmt*` handle; both expose checked, safe methods to the rest of
//! the crate and release their handle on drop.
//!
//! A [`RawStmt`] does not borrow the [`RawDb`] that prepared it. This is sound
//! because the database is always closed with `sqlite3_close_v2`: if a
//! statement is still alive at that point the connection becomes a zombie and
//! is deallocated only once the last statement is finalized, so the `db`
//! pointer kept by the statement for error reporting stays valid.

#![allow(dead_code)]

use std::ffi::{CStr, CString};
use std::os::raw::{c_char, c_int};
use std::ptr;

use libsqlite3_sys as sys;

use super::error::{DbError, DbResult};

// ── SQLite constants ────────────────────────────────────────────────────

/// Successful result.
pub const SQLITE_OK: c_int = 0;
/// Generic error.
pub const SQLITE_ERROR: c_int = 1;
/// Attempt to write a read-only database.
pub const SQLITE_READONLY: c_int = 8;
/// Constraint violation (`NOT NULL`, `UNIQUE`, foreign key, ...).
pub const SQLITE_CONSTRAINT: c_int = 19;
/// Library used incorrectly (e.g. nothing to prepare).
pub const SQLITE_MISUSE: c_int = 21;
/// Parameter index or count out of range.
pub const SQLITE_RANGE: c_int = 25;
pub const SQLITE_TOOBIG: c_int = 18;
/// `sqlite3_step` has another row ready.
pub const SQLITE_ROW: c_int = 100;
/// `sqlite3_step` has finished executing.
pub const SQLITE_DONE: c_int = 101;

// Column type constants
pub const SQLITE_INTEGER: c_int = 1;
pub const SQLITE_FLOAT: c_int = 2;
pub const SQLITE_TEXT: c_int = 3;
pub const SQLITE_BLOB: c_int = 4;
pub const SQLITE_NULL: c_int = 5;

// Open flags
pub const SQLITE_OPEN_READONLY: c_int = 0x0000_0001;
pub const SQLITE_OPEN_READWRITE: c_int = 0x0000_0002;
pub const SQLITE_OPEN_CREATE: c_int = 0x0000_0004;
pub const SQLITE_OPEN_URI: c_int = 0x0000_0040;
pub const SQLITE_OPEN_FULLMUTEX: c_int = 0x0001_0000;

// ── Helpers ─────────────────────────────────────────────────────────────

fn to_cstring(text: &str, what: &str) -> DbResult<CString> {
    CString::new(text)
        .map_err(|e| DbError::new(SQLITE_MISUSE, format!("nul in {what}: {e}")))
}

fn to_c_len(len: usize) -> DbResult<c_int> {
    c_int::try_from(len)
        .map_err(|_| DbError::new(SQLITE_TOOBIG, format!("value of {len} bytes is too large")))
}

/// Copies a NUL-terminated C string owned by `SQLite`.
///
/// # Safety
///
/// `ptr` must be null or point to a valid NUL-terminated string.
unsafe fn copy_cstr(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        None
    } else {
        Some(CStr::from_ptr(ptr).to_string_lossy().into_owned())
    }
}

fn errmsg(db: *mut sys::sqlite3) -> String {
    // Safety: `sqlite3_errmsg` accepts any connection pointer, including a
    // zombie one, and returns a string owned by the connection.
    unsafe { copy_cstr(sys::sqlite3_errmsg(db)) }
        .unwrap_or_else(|| "unknown error".to_string())
}

fn errstr(code: c_int) -> String {
    // Safety: `sqlite3_errstr` returns a static string for every code.
    unsafe { copy_cstr(sys::sqlite3_errstr(code)) }
        .unwrap_or_else(|| format!("sqlite status {code}"))
}

// ── Connection handle ───────────────────────────────────────────────────

/// Owned `sqlite3*` handle.
pub struct RawDb {
    db: *mut sys::sqlite3,
}

// Safety: connections are opened with SQLITE_OPEN_FULLMUTEX and the owning
// `Connection` is not `Sync`, so the handle is only used from one thread at a
// time.
unsafe impl Send for RawDb {}

impl RawDb {
    /// Opens a connection with `sqlite3_open_v2`.
    ///
    /// On failure the partially opened handle is closed before returning.
    pub fn open(path: &str, flags: c_int) -> DbResult<Self> {
        let c_path = to_cstring(path, "path")?;
        let mut db: *mut sys::sqlite3 = ptr::null_mut();
        // Safety: `c_path` is a valid C string and `db` a valid out pointer.
        let rc = unsafe { sys::sqlite3_open_v2(c_path.as_ptr(), &mut db, flags, ptr::null()) };
        if rc != SQLITE_OK {
            let msg = if db.is_null() {
                format!("sqlite3_open_v2 returned {rc}")
            } else {
                let m = errmsg(db);
                // Safety: `db` was produced by sqlite3_open_v2 and is not used again.
                unsafe {
                    sys::sqlite3_close_v2(db);
                }
                m
            };
            return Err(DbError::new(rc, msg));
        }
        Ok(Self { db })
    }

    /// Closes the handle, returning the status reported by `sqlite3_close_v2`.
    pub fn close(mut self) -> DbResult<()> {
        let db = std::mem::replace(&mut self.db, ptr::null_mut());
        // Safety: `db` is the live handle owned by `self`; it is nulled above so
        // `Drop` will not close it twice.
        let rc = unsafe { sys::sqlite3_close_v2(db) };
        if rc == SQLITE_OK {
            Ok(())
        } else {
            Err(DbError::new(rc, errstr(rc)))
        }
    }

    /// Runs `sql` through `sqlite3_exec` without a row callback.
    pub fn exec(&self, sql: &str) -> DbResult<()> {
        let c_sql = to_cstring(sql, "SQL")?;
        let mut err: *mut c_char = ptr::null_mut();
        // Safety: valid handle, valid C string, valid out pointer.
        let rc = unsafe {
            sys::sqlite3_exec(self.db, c_sql.as_ptr(), None, ptr::null_mut(), &mut err)
        };
        if rc != SQLITE_OK {
            // Safety: `err` is either null or a string allocated by SQLite that
            // we must release with sqlite3_free.
            let msg = unsafe {
                let msg = copy_cstr(err);
                if !err.is_null() {
                    sys::sqlite3_free(err.cast());
                }
                msg
            };
            return Err(DbError::new(rc, msg.unwrap_or_else(|| errmsg(self.db))));
        }
        Ok(())
    }

    /// Compiles a single statement.
    pub fn prepare(&self, sql: &str) -> DbResult<RawStmt> {
        let c_sql = to_cstring(sql, "SQL")?;
        let mut stmt: *mut sys::sqlite3_stmt = ptr::null_mut();
        // Safety: valid handle, valid C string (-1 = read to NUL), valid out pointer.
        let rc = unsafe {
            sys::sqlite3_prepare_v2(self.db, c_sql.as_ptr(), -1, &mut stmt, ptr::null_mut())
        };
        if rc != SQLITE_OK {
            return Err(DbError::new(rc, errmsg(self.db)));
        }
        if stmt.is_null() {
            // Empty input or only a comment: SQLite reports success but
            // hands back no statement.
            return Err(DbError::new(SQLITE_MISUSE, "no SQL statement to prepare"));
        }
        Ok(RawStmt { stmt, db: self.db })
    }

    pub fn set_busy_timeout(&self, ms: c_int) -> DbResult<()> {
        // Safety: valid handle.
        let rc = unsafe { sys::sqlite3_busy_timeout(self.db, ms) };
        if rc == SQLITE_OK {
            Ok(())
        } else {
            Err(DbError::new(rc, errmsg(self.db)))
        }
    }

    pub fn is_autocommit(&self) -> bool {
        // Safety: valid handle.
        unsafe { sys::sqlite3_get_autocommit(self.db) != 0 }
    }

    pub fn changes(&self) -> c_int {
        // Safety: valid handle.
        unsafe { sys::sqlite3_changes(self.db) }
    }

    pub fn last_insert_rowid(&self) -> i64 {
        // Safety: valid handle.
        unsafe { sys::sqlite3_last_insert_rowid(self.db) }
    }
}

impl Drop for RawDb {
    fn drop(&mut self) {
        if !self.db.is_null() {
            // Safety: the handle is owned by `self` and never used after this.
            unsafe {
                sys::sqlite3_close_v2(self.db);
            }
            self.db = ptr::null_mut();
        }
    }
}

// ── Statement handle ────────────────────────────────────────────────────

/// Owned `sqlite3_stmt*` handle. Finalized on drop.
pub struct RawStmt {
    stmt: *mut sys::sqlite3_stmt,
    /// Owning connection, kept for error messages only.
    db: *mut sys::sqlite3,
}

// Safety: see `RawDb`; a statement is only ever driven by its single owner.
unsafe impl Send for RawStmt {}

impl RawStmt {
    fn check(&self, rc: c_int) -> DbResult<()> {
        if rc == SQLITE_OK {
            Ok(())
        } else {
            Err(DbError::new(rc, errmsg(self.db)))
        }
    }

    pub fn parameter_count(&self) -> c_int {
        // Safety: `stmt` is a live statement owned by `self`.
        unsafe { sys::sqlite3_bind_parameter_count(self.stmt) }
    }

    pub fn bind_i32(&self, idx: c_int, value: i32) -> DbResult<()> {
        // Safety: live statement; SQLite range-checks `idx`.
        self.check(unsafe { sys::sqlite3_bind_int(self.stmt, idx, value) })
    }

    pub fn bind_i64(&self, idx: c_int, value: i64) -> DbResult<()> {
        // Safety: live statement; SQLite range-checks `idx`.
        self.check(unsafe { sys::sqlite3_bind_int64(self.stmt, idx, value) })
    }

    pub fn bind_f64(&self, idx: c_int, value: f64) -> DbResult<()> {
        // Safety: live statement; SQLite range-checks `idx`.
        self.check(unsafe { sys::sqlite3_bind_double(self.stmt, idx, value) })
    }

    pub fn bind_text(&self, idx: c_int, value: &str) -> DbResult<()> {
        let len = to_c_len(value.len())?;
        // Safety: pointer/length describe `value`; SQLITE_TRANSIENT makes
        // SQLite copy the bytes before returning.
        self.check(unsafe {
            sys::sqlite3_bind_text(
                self.stmt,
                idx,
                value.as_ptr().cast(),
                len,
                sys::SQLITE_TRANSIENT(),
            )
        })
    }

    pub fn bind_blob(&self, idx: c_int, value: &[u8]) -> DbResult<()> {
        let len = to_c_len(value.len())?;
        // Safety: pointer/length describe `value`; SQLITE_TRANSIENT makes
        // SQLite copy the bytes before returning.
        self.check(unsafe {
            sys::sqlite3_bind_blob(
                self.stmt,
                idx,
                value.as_ptr().cast(),
                len,
                sys::SQLITE_TRANSIENT(),
            )
        })
    }

    pub fn bind_null(&self, idx: c_int) -> DbResult<()> {
        // Safety: live statement; SQLite range-checks `idx`.
        self.check(unsafe { sys::sqlite3_bind_null(self.stmt, idx) })
    }

    /// Advances the statement. Returns `SQLITE_ROW` or `SQLITE_DONE`, any
    /// other status is turned into an error.
    pub fn step(&self) -> DbResult<c_int> {
        // Safety: live statement.
        let rc = unsafe { sys::sqlite3_step(self.stmt) };
        match rc {
            SQLITE_ROW | SQLITE_DONE => Ok(rc),
            _ => Err(DbError::new(rc, errmsg(self.db))),
        }
    }

    pub fn column_count(&self) -> c_int {
        // Safety: live statement.
        unsafe { sys::sqlite3_column_count(self.stmt) }
    }

    pub fn column_name(&self, idx: c_int) -> Option<String> {
        // Safety: live statement; out-of-range indexes return null.
        unsafe { copy_cstr(sys::sqlite3_column_name(self.stmt, idx)) }
    }

    pub fn column_type(&self, idx: c_int) -> c_int {
        // Safety: live statement.
        unsafe { sys::sqlite3_column_type(self.stmt, idx) }
    }

    pub fn column_i64(&self, idx: c_int) -> i64 {
        // Safety: live statement.
        unsafe { sys::sqlite3_column_int64(self.stmt, idx) }
    }

    pub fn column_f64(&self, idx: c_int) -> f64 {
        // Safety: live statement.
        unsafe { sys::sqlite3_column_double(self.stmt, idx) }
    }

    pub fn column_text(&self, idx: c_int) -> String {
        // Safety: live statement. `sqlite3_column_bytes` is called after the
        // text conversion so it reports the UTF-8 length; the slice is copied
        // before the next call into SQLite.
        unsafe {
            let ptr = sys::sqlite3_column_text(self.stmt, idx);
            let len = sys::sqlite3_column_bytes(self.stmt, idx);
            if ptr.is_null() || len <= 0 {
                return String::new();
            }
            let bytes = std::slice::from_raw_parts(ptr, len.unsigned_abs() as usize);
            String::from_utf8_lossy(bytes).into_owned()
        }
    }

    pub fn column_blob(&self, idx: c_int) -> Vec<u8> {
        // Safety: as for `column_text`.
        unsafe {
            let ptr = sys::sqlite3_column_blob(self.stmt, idx);
            let len = sys::sqlite3_column_bytes(self.stmt, idx);
            if ptr.is_null() || len <= 0 {
                return Vec::new();
            }
            std::slice::from_raw_parts(ptr.cast::<u8>(), len.unsigned_abs() as usize).to_vec()
        }
    }
}

impl Drop for RawStmt {
    fn drop(&mut self) {
        if !self.stmt.is_null() {
            // Safety: the statement is owned by `self` and never used after this.
            unsafe {
                sys::sqlite3_finalize(self.stmt);
            }
            self.stmt = ptr::null_mut();
        }
    }
}
