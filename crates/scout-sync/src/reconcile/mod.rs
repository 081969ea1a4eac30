//! Reconciliation of normalized source records against the cache.
//!
//! Each family decides per record whether to insert, update or do nothing,
//! and hands the resulting statements to the writer:
//!
//! - [`stack`]: diff-based; stacks update in place, webpools and webs are
//!   insert-if-absent.
//! - [`customer`]: full replace; the table is cleared and reloaded.
//! - [`fabric`]: append-only snapshot per run, plus zone membership edges.

pub mod customer;
pub mod fabric;
pub mod stack;

use futures::{StreamExt as _, stream};
use scout_core::{Result as CoreResult, normalize::SourceKind, record::RawRecord};

use crate::report::RecordFailure;

/// Apply `f` to every item with at most `limit` in flight, preserving input
/// order. One item failing never cancels the others.
pub async fn format_all<T, U, E, F>(items: Vec<T>, limit: usize, f: F) -> Vec<Result<U, E>>
where
  F: Fn(T) -> Result<U, E>,
{
  let f = &f;
  stream::iter(items)
    .map(|item| async move { f(item) })
    .buffered(limit.max(1))
    .collect()
    .await
}

/// Normalize every raw record, splitting successes from malformed records.
pub async fn normalize_all<T>(
  raws: Vec<RawRecord>,
  kind: SourceKind,
  limit: usize,
  normalize: fn(&RawRecord) -> CoreResult<T>,
) -> (Vec<T>, Vec<RecordFailure>) {
  let results = format_all(raws, limit, |raw| normalize(&raw)).await;

  let mut ok = Vec::with_capacity(results.len());
  let mut failures = Vec::new();
  for (idx, result) in results.into_iter().enumerate() {
    match result {
      Ok(record) => ok.push(record),
      Err(err) => {
        tracing::warn!(source_kind = %kind, record = idx, error = %err, "skipping malformed record");
        failures.push(RecordFailure::new(format!("#{idx}"), err));
      }
    }
  }
  (ok, failures)
}
