//! Error types for `scout-core`.

use thiserror::Error;

use crate::normalize::SourceKind;

#[derive(Debug, Error)]
pub enum Error {
  /// A raw source record lacks a field the normalizer cannot default.
  #[error("malformed {source_kind} record: missing field {field:?}")]
  MalformedRecord {
    source_kind: SourceKind,
    field:       &'static str,
  },

  #[error("column {0:?} missing from row")]
  MissingColumn(String),

  #[error("column {column:?} has unexpected type (wanted {wanted})")]
  ColumnType {
    column: String,
    wanted: &'static str,
  },

  #[error("source {source_name} failed: {reason}")]
  SourceFetch {
    source_name: String,
    reason:      String,
  },

  #[error("serialization error: {0}")]
  Json(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
