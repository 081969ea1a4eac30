//! The batched writer: the only component that mutates the store.
//!
//! Every statement it issues is one transaction. Multi-row inserts are
//! flushed every `batch_size` rows; a failed flush is logged and its rows are
//! reported as unwritten, and the writer moves on to the next batch.

use std::{ops::Range, sync::Arc, time::Instant};

use serde::Serialize;
use scout_core::{
  store::Store,
  table::Table,
  value::{Columns, Executed, Statement, Value},
};

use crate::{Error, Result};

/// Rows per multi-row INSERT unless configured otherwise.
pub const DEFAULT_BATCH_SIZE: usize = 250;

// ─── Reports ─────────────────────────────────────────────────────────────────

/// A flushed batch that the store rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedFlush {
  /// Indices into the input rows covered by the rejected statement.
  pub rows:   Range<usize>,
  pub reason: String,
}

/// Outcome of one [`BatchWriter::insert_batch`] call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchReport {
  /// Row count of every successful flush, in flush order.
  pub flushed: Vec<usize>,
  pub failed:  Vec<FailedFlush>,
}

impl BatchReport {
  pub fn written(&self) -> usize { self.flushed.iter().sum() }

  pub fn is_complete(&self) -> bool { self.failed.is_empty() }

  /// Whether input row `idx` belonged to a rejected flush.
  pub fn is_unwritten(&self, idx: usize) -> bool {
    self.failed.iter().any(|f| f.rows.contains(&idx))
  }
}

// ─── Writer ──────────────────────────────────────────────────────────────────

pub struct BatchWriter<S> {
  store: Arc<S>,
}

impl<S> Clone for BatchWriter<S> {
  fn clone(&self) -> Self { Self { store: Arc::clone(&self.store) } }
}

impl<S: Store> BatchWriter<S> {
  pub fn new(store: Arc<S>) -> Self { Self { store } }

  async fn run(&self, statement: Statement) -> Result<Executed> {
    tracing::debug!(statement = %statement.render(), "executing");
    self.store.execute(statement).await.map_err(Error::store)
  }

  /// Insert a single row and return the id the store assigned to it.
  pub async fn insert_one(&self, table: Table, row: Columns) -> Result<i64> {
    let names: Vec<_> = row.names().collect();
    let statement = Statement::with_params(insert_sql(table, &names, 1), row.into_values());
    let executed = self.run(statement).await?;
    Ok(executed.last_insert_id)
  }

  /// Insert `rows` as multi-row statements of at most `batch_size` rows each.
  ///
  /// Flush order follows input order. Only a column mismatch between rows is
  /// an error; store failures are collected in the returned report.
  pub async fn insert_batch(
    &self,
    table: Table,
    rows: Vec<Columns>,
    batch_size: usize,
  ) -> Result<BatchReport> {
    let started = Instant::now();
    let mut report = BatchReport::default();
    let Some(first) = rows.first() else {
      return Ok(report);
    };

    let names: Vec<&'static str> = first.names().collect();
    if names.is_empty() || rows.iter().any(|r| !r.names().eq(names.iter().copied())) {
      return Err(Error::MismatchedColumns { table });
    }

    let batch_size = batch_size.max(1);
    let mut pending: Vec<Value> = Vec::with_capacity(batch_size * names.len());
    let mut batch_start = 0;

    for (idx, row) in rows.into_iter().enumerate() {
      pending.extend(row.into_values());
      let count = idx + 1 - batch_start;
      if count == batch_size {
        let params = std::mem::take(&mut pending);
        self.flush(table, &names, batch_start..idx + 1, params, &mut report).await;
        batch_start = idx + 1;
      }
    }

    if !pending.is_empty() {
      let end = batch_start + pending.len() / names.len();
      self.flush(table, &names, batch_start..end, pending, &mut report).await;
    }

    tracing::info!(
      %table,
      written = report.written(),
      failed_flushes = report.failed.len(),
      elapsed_ms = started.elapsed().as_millis() as u64,
      "batched insert finished"
    );
    Ok(report)
  }

  async fn flush(
    &self,
    table: Table,
    names: &[&'static str],
    rows: Range<usize>,
    params: Vec<Value>,
    report: &mut BatchReport,
  ) {
    let statement = Statement::with_params(insert_sql(table, names, rows.len()), params);
    match self.run(statement).await {
      Ok(_) => report.flushed.push(rows.len()),
      Err(err) => {
        tracing::error!(%table, rows = ?rows, error = %err, "batch flush failed");
        report.failed.push(FailedFlush { rows, reason: err.to_string() });
      }
    }
  }

  /// `UPDATE table SET <updates> WHERE <filter>`, each filter column an
  /// equality test. Returns the number of rows changed.
  pub async fn update(&self, table: Table, updates: &Columns, filter: &Columns) -> Result<usize> {
    let mut params: Vec<Value> = Vec::with_capacity(updates.len() + filter.len());
    let mut set = Vec::with_capacity(updates.len());
    for (name, value) in updates.names().zip(updates.values()) {
      params.push(value.clone());
      set.push(format!("{name} = ?{}", params.len()));
    }
    let mut conds = Vec::with_capacity(filter.len());
    for (name, value) in filter.names().zip(filter.values()) {
      params.push(value.clone());
      conds.push(format!("{name} = ?{}", params.len()));
    }

    let where_clause = if conds.is_empty() {
      String::new()
    } else {
      format!(" WHERE {}", conds.join(" AND "))
    };
    let sql = format!("UPDATE {table} SET {}{where_clause}", set.join(", "));
    let executed = self.run(Statement::with_params(sql, params)).await?;
    Ok(executed.rows_affected)
  }

  /// Delete every row of `table`. Callers must not insert into the table if
  /// this fails.
  pub async fn clear_table(&self, table: Table) -> Result<()> {
    let statement = Statement::new(format!("DELETE FROM {table}"));
    tracing::debug!(statement = %statement.render(), "executing");
    self
      .store
      .execute(statement)
      .await
      .map_err(|e| Error::ClearFailed { table, source: Box::new(e) })?;
    Ok(())
  }

  /// Stamp the refresh time of one source family in `updatetracking`.
  pub async fn touch_tracking(&self, column: &'static str, at: &str) -> Result<()> {
    let updates = Columns::new().with(column, at);
    self.update(Table::UpdateTracking, &updates, &Columns::new()).await?;
    Ok(())
  }
}

/// `INSERT INTO table (a, b) VALUES (?1, ?2), (?3, ?4), ...`
fn insert_sql(table: Table, names: &[&str], rows: usize) -> String {
  let width = names.len();
  let tuples: Vec<String> = (0..rows)
    .map(|r| {
      let placeholders: Vec<String> =
        (1..=width).map(|c| format!("?{}", r * width + c)).collect();
      format!("({})", placeholders.join(", "))
    })
    .collect();
  format!(
    "INSERT INTO {table} ({}) VALUES {}",
    names.join(", "),
    tuples.join(", ")
  )
}
