//! JSON rendering of result rows.

use serde_json::{json, Map, Number};
use storekit_core::{RowMap, Value};

/// Converts a column value to JSON. Blobs are rendered as hex strings and
/// non-finite reals as `null`.
pub fn value_to_json(value: &Value) -> serde_json::Value {
    match value {
        Value::Int(v) => json!(v),
        Value::Integer(v) => json!(v),
        Value::Real(v) => Number::from_f64(*v).map_or(serde_json::Value::Null, Into::into),
        Value::Text(v) => json!(v),
        Value::Blob(v) => json!(hex::encode(v)),
        Value::Null => serde_json::Value::Null,
    }
}

/// Zips column names with a positional row.
pub fn row_to_json(columns: &[String], row: &[Value]) -> serde_json::Value {
    let object: Map<String, serde_json::Value> = columns
        .iter()
        .cloned()
        .zip(row.iter().map(value_to_json))
        .collect();
    serde_json::Value::Object(object)
}

/// Renders a keyed row produced while a transaction script runs.
pub fn script_row_to_json(line: usize, row: &RowMap) -> serde_json::Value {
    let object: Map<String, serde_json::Value> = row
        .iter()
        .map(|(name, value)| (name.clone(), value_to_json(value)))
        .collect();
    json!({ "line": line, "row": object })
}
