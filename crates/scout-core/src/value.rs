//! Column values, rows read back from the store, and parameterized statements.
//!
//! Statements are always executed with bound parameters. [`Statement::render`]
//! exists so a statement can be logged in the literal form an operator would
//! paste into a SQL console, with every text value quoted and its embedded
//! single quotes doubled.

use std::{collections::BTreeMap, fmt};

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

// ─── Value ───────────────────────────────────────────────────────────────────

/// A single column value as exchanged with the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
  Integer(i64),
  Text(String),
  Null,
}

impl Value {
  pub fn as_int(&self) -> Option<i64> {
    match self {
      Value::Integer(i) => Some(*i),
      Value::Text(s) => s.trim().parse().ok(),
      Value::Null => None,
    }
  }

  pub fn as_text(&self) -> Option<String> {
    match self {
      Value::Integer(i) => Some(i.to_string()),
      Value::Text(s) => Some(s.clone()),
      Value::Null => None,
    }
  }

  /// Literal SQL form: integers bare, text single-quoted with `'` doubled.
  pub fn to_literal(&self) -> String {
    match self {
      Value::Integer(i) => i.to_string(),
      Value::Text(s) => format!("'{}'", escape_quotes(s)),
      Value::Null => "NULL".to_owned(),
    }
  }
}

impl From<i64> for Value {
  fn from(v: i64) -> Self { Value::Integer(v) }
}

impl From<String> for Value {
  fn from(v: String) -> Self { Value::Text(v) }
}

impl From<&str> for Value {
  fn from(v: &str) -> Self { Value::Text(v.to_owned()) }
}

/// Double every single quote so the value can sit inside a quoted SQL literal.
pub fn escape_quotes(s: &str) -> String { s.replace('\'', "''") }

// ─── Record ──────────────────────────────────────────────────────────────────

/// One row read from the store, keyed by lowercase column name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record(BTreeMap<String, Value>);

impl Record {
  pub fn new() -> Self { Self::default() }

  pub fn insert(&mut self, column: impl Into<String>, value: Value) {
    self.0.insert(column.into().to_lowercase(), value);
  }

  pub fn get(&self, column: &str) -> Option<&Value> {
    self.0.get(&column.to_lowercase())
  }

  pub fn int(&self, column: &str) -> Result<i64> {
    let value = self
      .get(column)
      .ok_or_else(|| Error::MissingColumn(column.to_owned()))?;
    value.as_int().ok_or_else(|| Error::ColumnType {
      column: column.to_owned(),
      wanted: "integer",
    })
  }

  pub fn text(&self, column: &str) -> Result<String> {
    let value = self
      .get(column)
      .ok_or_else(|| Error::MissingColumn(column.to_owned()))?;
    value.as_text().ok_or_else(|| Error::ColumnType {
      column: column.to_owned(),
      wanted: "text",
    })
  }
}

impl FromIterator<(String, Value)> for Record {
  fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
    let mut record = Record::new();
    for (column, value) in iter {
      record.insert(column, value);
    }
    record
  }
}

// ─── Columns ─────────────────────────────────────────────────────────────────

/// An ordered column/value list describing one row to write.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Columns(Vec<(&'static str, Value)>);

impl Columns {
  pub fn new() -> Self { Self::default() }

  /// Builder-style append.
  pub fn with(mut self, column: &'static str, value: impl Into<Value>) -> Self {
    self.push(column, value);
    self
  }

  pub fn push(&mut self, column: &'static str, value: impl Into<Value>) {
    self.0.push((column, value.into()));
  }

  pub fn is_empty(&self) -> bool { self.0.is_empty() }

  pub fn len(&self) -> usize { self.0.len() }

  pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
    self.0.iter().map(|(c, _)| *c)
  }

  pub fn values(&self) -> impl Iterator<Item = &Value> {
    self.0.iter().map(|(_, v)| v)
  }

  pub fn get(&self, column: &str) -> Option<&Value> {
    self.0.iter().find(|(c, _)| *c == column).map(|(_, v)| v)
  }

  pub fn into_values(self) -> Vec<Value> {
    self.0.into_iter().map(|(_, v)| v).collect()
  }
}

// ─── Statement ───────────────────────────────────────────────────────────────

/// A SQL statement with positional parameters `?1..?n`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
  pub sql:    String,
  pub params: Vec<Value>,
}

impl Statement {
  pub fn new(sql: impl Into<String>) -> Self {
    Self { sql: sql.into(), params: Vec::new() }
  }

  pub fn with_params(sql: impl Into<String>, params: Vec<Value>) -> Self {
    Self { sql: sql.into(), params }
  }

  /// Substitute every `?N` placeholder with its literal value.
  pub fn render(&self) -> String {
    let mut out = String::with_capacity(self.sql.len());
    let mut chars = self.sql.chars().peekable();
    while let Some(c) = chars.next() {
      if c != '?' {
        out.push(c);
        continue;
      }
      let mut digits = String::new();
      while let Some(d) = chars.peek().copied().filter(char::is_ascii_digit) {
        digits.push(d);
        chars.next();
      }
      match digits
        .parse::<usize>()
        .ok()
        .and_then(|n| n.checked_sub(1))
        .and_then(|i| self.params.get(i))
      {
        Some(value) => out.push_str(&value.to_literal()),
        None => {
          out.push('?');
          out.push_str(&digits);
        }
      }
    }
    out
  }
}

impl fmt::Display for Statement {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.render())
  }
}

/// What the store reports after executing a write statement.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Executed {
  pub rows_affected:  usize,
  pub last_insert_id: i64,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn render_doubles_embedded_quotes() {
    let stmt = Statement::with_params(
      "INSERT INTO customers (contextid, customer) VALUES (?1, ?2)",
      vec![Value::from("42"), Value::from("O'Brien's Clinic")],
    );
    assert_eq!(
      stmt.render(),
      "INSERT INTO customers (contextid, customer) VALUES ('42', 'O''Brien''s Clinic')"
    );
  }

  #[test]
  fn render_handles_two_digit_placeholders() {
    let params = (1..=11).map(Value::Integer).collect();
    let stmt = Statement::with_params("VALUES (?1, ?10, ?11)", params);
    assert_eq!(stmt.render(), "VALUES (1, 10, 11)");
  }

  #[test]
  fn record_columns_are_case_insensitive() {
    let mut record = Record::new();
    record.insert("ID", Value::Integer(7));
    record.insert("Stack", Value::from("12"));
    assert_eq!(record.int("id").unwrap(), 7);
    assert_eq!(record.text("stack").unwrap(), "12");
    assert!(matches!(record.int("name"), Err(Error::MissingColumn(_))));
  }
}
