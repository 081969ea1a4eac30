//! Error types for the sync engine.

use scout_core::table::Table;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error(transparent)]
  Core(#[from] scout_core::Error),

  /// A statement execution, commit or read against the store failed.
  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),

  /// A natural key never resolved to a surrogate id, even after an insert.
  #[error("unresolved reference: {key:?} in {table}")]
  UnresolvedReference { table: Table, key: String },

  #[error("table {0} looked up before it was loaded into the cache")]
  CacheNotLoaded(Table),

  #[error("table {0} is not mirrored by the cache")]
  NotCached(Table),

  #[error("failed to clear table {table}: {source}")]
  ClearFailed {
    table:  Table,
    #[source]
    source: Box<dyn std::error::Error + Send + Sync>,
  },

  #[error("run allocation failed: {0}")]
  RunAllocation(String),

  #[error("rows for {table} do not share one column set")]
  MismatchedColumns { table: Table },

  #[error("http error: {0}")]
  Http(#[from] reqwest::Error),

  #[error("csv error: {0}")]
  Csv(#[from] csv::Error),

  #[error("io error: {0}")]
  Io(#[from] std::io::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),
}

impl Error {
  pub fn store<E>(err: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Error::Store(Box::new(err))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
