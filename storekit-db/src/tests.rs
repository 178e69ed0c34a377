//! Unit tests for the safe db wrapper.

use super::*;
use crate::params;

fn memory_with_table(ddl: &str) -> Connection {
    let conn = Connection::open_in_memory().expect("open in-memory db");
    conn.execute_batch(ddl).expect("create table");
    conn
}

#[test]
fn test_open_in_memory() {
    let conn = memory_with_table("CREATE TABLE t (id INTEGER PRIMARY KEY, val TEXT);");
    conn.execute(
        "INSERT INTO t (id, val) VALUES (?1, ?2)",
        params![1_i64, "hello"],
    )
    .expect("insert");
    let result = conn
        .query_row("SELECT val FROM t WHERE id = ?1", params![1_i64], |stmt| {
            Ok(stmt.column_text(0))
        })
        .expect("query");
    assert_eq!(result, "hello");
}

#[test]
fn test_query_row_no_rows_is_done_error() {
    let conn = memory_with_table("CREATE TABLE t (id INTEGER PRIMARY KEY);");
    let err = conn
        .query_row("SELECT id FROM t WHERE id = 999", &[], |stmt| {
            Ok(stmt.column_i64(0))
        })
        .expect_err("no rows");
    assert_eq!(err.code.0, codes::SQLITE_DONE);
}

#[test]
fn test_prepare_error_carries_engine_message() {
    let conn = Connection::open_in_memory().expect("open in-memory db");
    let err = conn.prepare("SELEC 1").expect_err("syntax error");
    assert_eq!(err.code.0, codes::SQLITE_ERROR);
    assert!(err.message.contains("syntax error"), "{err}");
}

#[test]
fn test_prepare_empty_sql_is_misuse() {
    let conn = Connection::open_in_memory().expect("open in-memory db");
    let err = conn.prepare("   ").expect_err("nothing to prepare");
    assert_eq!(err.code.0, codes::SQLITE_MISUSE);
}

#[test]
fn test_bind_count_mismatch_is_range_error() {
    let conn = Connection::open_in_memory().expect("open in-memory db");
    let stmt = conn.prepare("SELECT ?1, ?2").expect("prepare");
    assert_eq!(stmt.parameter_count(), 2);
    let err = stmt.bind_values(params![1_i64]).expect_err("too few");
    assert_eq!(err.code.0, codes::SQLITE_RANGE);
    let err = stmt
        .bind_values(params![1_i64, 2_i64, 3_i64])
        .expect_err("too many");
    assert_eq!(err.code.0, codes::SQLITE_RANGE);
    stmt.bind_values(params![1_i64, 2_i64]).expect("exact");
}

#[test]
fn test_column_values_by_storage_class() {
    let conn = Connection::open_in_memory().expect("open in-memory db");
    let stmt = conn
        .prepare("SELECT ?1, ?2, ?3, ?4, ?5, ?6")
        .expect("prepare");
    stmt.bind_values(&[
        Value::Int(7),
        Value::Integer(i64::MAX),
        Value::Real(2.5),
        Value::from("txt"),
        Value::from(vec![0_u8, 1, 2]),
        Value::Null,
    ])
    .expect("bind");
    assert_eq!(stmt.step().expect("step"), StepResult::Row);
    assert_eq!(
        stmt.row_values(),
        vec![
            Value::Integer(7),
            Value::Integer(i64::MAX),
            Value::Real(2.5),
            Value::Text("txt".to_string()),
            Value::Blob(vec![0, 1, 2]),
            Value::Null,
        ]
    );
    assert_eq!(stmt.step().expect("step"), StepResult::Done);
}

#[test]
fn test_column_names_follow_select_list() {
    let conn = memory_with_table("CREATE TABLE t (a INTEGER, b TEXT, c REAL);");
    let stmt = conn.prepare("SELECT c, a AS first FROM t").expect("prepare");
    assert_eq!(stmt.column_names(), vec!["c".to_string(), "first".to_string()]);
    let stmt = conn.prepare("SELECT * FROM t").expect("prepare");
    assert_eq!(stmt.column_count(), 3);
    assert_eq!(stmt.column_names(), vec!["a", "b", "c"]);
}

#[test]
fn test_explicit_transaction_toggles_autocommit() {
    let conn = memory_with_table("CREATE TABLE t (id INTEGER PRIMARY KEY);");
    assert!(conn.is_autocommit());
    conn.execute_batch("BEGIN").expect("begin");
    assert!(!conn.is_autocommit());
    conn.execute("INSERT INTO t (id) VALUES (?1)", params![99_i64])
        .expect("insert");
    conn.execute_batch("ROLLBACK").expect("rollback");
    assert!(conn.is_autocommit());
    let rows = conn
        .query_map("SELECT id FROM t", &[], |stmt| Ok(stmt.column_i64(0)))
        .expect("query");
    assert!(rows.is_empty());
}

#[test]
fn test_blob_round_trip() {
    let conn = memory_with_table("CREATE TABLE t (id INTEGER PRIMARY KEY, data BLOB);");
    let data = vec![0xDE, 0xAD, 0x00, 0xBE, 0xEF];
    conn.execute(
        "INSERT INTO t (id, data) VALUES (?1, ?2)",
        params![1_i64, data.as_slice()],
    )
    .expect("insert");
    let result = conn
        .query_row("SELECT data FROM t WHERE id = 1", &[], |stmt| {
            Ok(stmt.column_blob(0))
        })
        .expect("query");
    assert_eq!(result, data);
}

#[test]
fn test_null_handling() {
    let conn = memory_with_table("CREATE TABLE t (id INTEGER PRIMARY KEY, val TEXT);");
    conn.execute(
        "INSERT INTO t (id, val) VALUES (?1, ?2)",
        params![1_i64, None::<&str>],
    )
    .expect("insert");
    let result = conn
        .query_row("SELECT val FROM t WHERE id = 1", &[], |stmt| {
            Ok(stmt.is_column_null(0))
        })
        .expect("query");
    assert!(result);
}

#[test]
fn test_last_insert_rowid_and_changes() {
    let conn = memory_with_table("CREATE TABLE t (a TEXT);");
    conn.execute("INSERT INTO t (a) VALUES (?1)", params!["x"])
        .expect("insert");
    conn.execute("INSERT INTO t (a) VALUES (?1)", params!["y"])
        .expect("insert");
    assert_eq!(conn.last_insert_rowid(), 2);
    let changed = conn
        .execute("UPDATE t SET a = ?1", params!["z"])
        .expect("update");
    assert_eq!(changed, 2);
    assert_eq!(conn.changes(), 2);
}

#[test]
fn test_open_without_create_fails_for_missing_file() {
    let path = std::env::temp_dir().join(format!(
        "storekit-db-missing-{}.sqlite",
        uuid::Uuid::new_v4()
    ));
    let err = Connection::open(&path.to_string_lossy(), OpenOptions::default())
        .expect_err("missing file");
    assert_ne!(err.code.0, codes::SQLITE_OK);
    assert!(!path.exists());
}

#[test]
fn test_file_database_survives_reopen() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("reopen.sqlite");
    let path = path.to_string_lossy();
    {
        let conn = Connection::open(&path, OpenOptions::create()).expect("create");
        conn.execute_batch("CREATE TABLE t (v TEXT); INSERT INTO t VALUES ('kept');")
            .expect("seed");
        conn.close().expect("close");
    }
    let conn = Connection::open(&path, OpenOptions::default()).expect("reopen");
    let v = conn
        .query_row("SELECT v FROM t", &[], |stmt| Ok(stmt.column_text(0)))
        .expect("query");
    assert_eq!(v, "kept");
}

#[test]
fn test_read_only_rejects_writes() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("ro.sqlite");
    let path = path.to_string_lossy();
    Connection::open(&path, OpenOptions::create())
        .expect("create")
        .execute_batch("CREATE TABLE t (v INTEGER);")
        .expect("seed");
    let ro = Connection::open(
        &path,
        OpenOptions {
            create: false,
            read_only: true,
        },
    )
    .expect("open read-only");
    assert!(ro.execute("INSERT INTO t VALUES (1)", &[]).is_err());
}

#[test]
fn test_statement_outlives_connection() {
    let conn = Connection::open_in_memory().expect("open");
    let stmt = conn.prepare("SELECT 1").expect("prepare");
    conn.close().expect("close defers to statement");
    drop(stmt);
}

#[test]
fn test_value_conversions() {
    assert_eq!(Value::from(Some(3_i64)), Value::Integer(3));
    assert_eq!(Value::from(None::<&str>), Value::Null);
    assert_eq!(Value::from(true), Value::Int(1));
    assert_eq!(Value::from(&[0xAB_u8, 0x01][..]), Value::Blob(vec![0xAB, 0x01]));
    assert_eq!(Value::Int(-4).as_i64(), Some(-4));
    assert_eq!(Value::Real(1.0).as_i64(), None);
}

#[test]
fn test_error_code_primary_strips_extended_bits() {
    let extended = DbErrorCode(787);
    assert_eq!(extended.primary(), codes::SQLITE_CONSTRAINT);
    assert_eq!(extended.to_string(), "19 (extended 787)");
    assert_eq!(DbErrorCode(codes::SQLITE_READONLY).to_string(), "8");

    let conn = memory_with_table("CREATE TABLE t (v TEXT NOT NULL);");
    let err = conn
        .execute("INSERT INTO t (v) VALUES (?1)", &[Value::Null])
        .expect_err("not null constraint");
    assert_eq!(err.code.primary(), codes::SQLITE_CONSTRAINT);
    assert!(err.to_string().contains("NOT NULL"), "{err}");
}
