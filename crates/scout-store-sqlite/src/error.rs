//! Error type for `scout-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("statement has {given} parameters, limit is {limit}")]
  TooManyParameters { given: usize, limit: usize },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
