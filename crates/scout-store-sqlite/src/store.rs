//! [`SqliteStore`], the SQLite implementation of [`Store`].

use std::path::Path;

use scout_core::{
  store::Store,
  value::{Executed, Record, Statement},
};

use crate::{
  Error, Result,
  encode::{decode_row, encode_value},
  schema::SCHEMA,
};

/// Bound-parameter ceiling of the bundled SQLite build.
pub const MAX_PARAMETERS: usize = 32_766;

// ─── Store ───────────────────────────────────────────────────────────────────

/// A storage tooling database backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, mostly for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  fn check_parameters(statement: &Statement) -> Result<()> {
    if statement.params.len() > MAX_PARAMETERS {
      return Err(Error::TooManyParameters {
        given: statement.params.len(),
        limit: MAX_PARAMETERS,
      });
    }
    Ok(())
  }
}

// ─── Store impl ──────────────────────────────────────────────────────────────

impl Store for SqliteStore {
  type Error = Error;

  async fn execute(&self, statement: Statement) -> Result<Executed> {
    Self::check_parameters(&statement)?;
    tracing::trace!(sql = %statement.sql, params = statement.params.len(), "execute");

    let Statement { sql, params } = statement;
    let params: Vec<_> = params.into_iter().map(encode_value).collect();

    let executed = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let rows_affected =
          tx.execute(&sql, rusqlite::params_from_iter(params.iter()))?;
        let last_insert_id = tx.last_insert_rowid();
        tx.commit()?;
        Ok(Executed { rows_affected, last_insert_id })
      })
      .await?;

    Ok(executed)
  }

  async fn query(&self, statement: Statement) -> Result<Vec<Record>> {
    Self::check_parameters(&statement)?;

    let Statement { sql, params } = statement;
    let params: Vec<_> = params.into_iter().map(encode_value).collect();

    let records = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let columns: Vec<String> =
          stmt.column_names().into_iter().map(str::to_owned).collect();
        let rows = stmt
          .query_map(rusqlite::params_from_iter(params.iter()), |row| {
            decode_row(row, &columns)
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    Ok(records)
  }
}
