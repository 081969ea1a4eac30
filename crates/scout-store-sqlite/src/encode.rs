//! Conversion between [`scout_core::value::Value`] and SQLite column values.
//!
//! Integers and text map one-to-one. Reals and blobs never appear in the
//! schema; if one is read anyway it is surfaced as text rather than dropped.

use rusqlite::types::Value as SqlValue;
use scout_core::value::{Record, Value};

pub fn encode_value(value: Value) -> SqlValue {
  match value {
    Value::Integer(i) => SqlValue::Integer(i),
    Value::Text(s) => SqlValue::Text(s),
    Value::Null => SqlValue::Null,
  }
}

pub fn decode_value(value: SqlValue) -> Value {
  match value {
    SqlValue::Integer(i) => Value::Integer(i),
    SqlValue::Text(s) => Value::Text(s),
    SqlValue::Real(f) => Value::Text(f.to_string()),
    SqlValue::Blob(b) => Value::Text(String::from_utf8_lossy(&b).into_owned()),
    SqlValue::Null => Value::Null,
  }
}

/// Read every column of `row` into a [`Record`] keyed by `columns`.
pub fn decode_row(
  row: &rusqlite::Row<'_>,
  columns: &[String],
) -> rusqlite::Result<Record> {
  let mut record = Record::new();
  for (idx, column) in columns.iter().enumerate() {
    let value: SqlValue = row.get(idx)?;
    record.insert(column.as_str(), decode_value(value));
  }
  Ok(record)
}
