//! Customer reconciliation: full replace.
//!
//! The customer table holds exactly the latest export. It is cleared and then
//! refilled in batches; if the clear fails nothing is inserted.

use scout_core::{record::CustomerRecord, store::Store, table::Table, value::Columns};

use crate::{
  Result,
  context::SyncContext,
  report::{FamilyCounts, RecordFailure},
};

fn customer_columns(record: &CustomerRecord) -> Columns {
  Columns::new()
    .with("contextid", record.context_id.as_str())
    .with("customer", record.name.as_str())
    .with("status", record.status)
    .with("stackid", record.stack_number.as_str())
}

/// Replace the contents of `customers` with `records`.
pub async fn reconcile_customers<S: Store>(
  ctx: &mut SyncContext<S>,
  records: &[CustomerRecord],
) -> Result<FamilyCounts> {
  ctx.writer.clear_table(Table::Customers).await?;

  let rows = records.iter().map(customer_columns).collect();
  let report = ctx
    .writer
    .insert_batch(Table::Customers, rows, ctx.settings.batch_size)
    .await?;
  ctx.reload(Table::Customers).await?;

  let mut counts = FamilyCounts { inserted: report.written(), ..Default::default() };
  for flush in &report.failed {
    for idx in flush.rows.clone() {
      if let Some(record) = records.get(idx) {
        counts.failures.push(RecordFailure::new(&record.context_id, &flush.reason));
      }
    }
  }
  Ok(counts)
}

#[cfg(test)]
mod tests {
  use std::sync::Arc;

  use scout_core::{normalize::normalize_customer, value::Value};

  use super::*;
  use crate::{
    Error,
    context::PassSettings,
    testing::{RecordingStore, customer_raw, memory_store, seed},
  };

  fn customer(id: &str, name: &str, live: &str) -> CustomerRecord {
    normalize_customer(&customer_raw(id, name, live)).unwrap()
  }

  async fn context() -> (Arc<RecordingStore>, SyncContext<RecordingStore>) {
    let store = Arc::new(RecordingStore::new(memory_store().await));
    let ctx = SyncContext::new(store.clone(), PassSettings::default());
    (store, ctx)
  }

  #[tokio::test]
  async fn table_holds_exactly_the_incoming_set() {
    let (store, mut ctx) = context().await;
    for i in 0..5 {
      seed(
        store.as_ref(),
        Table::Customers,
        Columns::new()
          .with("contextid", format!("old-{i}"))
          .with("customer", "Old")
          .with("status", 0_i64)
          .with("stackid", "1"),
      )
      .await;
    }

    let incoming = [customer("1", "Alpha", "Y"), customer("2", "Beta", "N")];
    let counts = reconcile_customers(&mut ctx, &incoming).await.unwrap();

    assert_eq!(counts.inserted, 2);
    assert_eq!(store.row_count(Table::Customers).await, 2);
    let beta = ctx.cache.customers.find("2").unwrap().unwrap();
    assert_eq!(beta.status, 0);
    assert_eq!(ctx.cache.customers.find("1").unwrap().unwrap().status, 1);
  }

  #[tokio::test]
  async fn failed_clear_inserts_nothing() {
    let (store, mut ctx) = context().await;
    store.fail_when(|s| s.sql.starts_with("DELETE FROM customers"));

    let err = reconcile_customers(&mut ctx, &[customer("1", "Alpha", "Y")]).await.unwrap_err();
    assert!(matches!(err, Error::ClearFailed { table: Table::Customers, .. }));
    assert!(store.statements_for("INSERT").is_empty());
  }

  #[tokio::test]
  async fn embedded_quotes_are_stored_verbatim() {
    let (store, mut ctx) = context().await;
    reconcile_customers(&mut ctx, &[customer("7", "O'Brien's Clinic", "Y")]).await.unwrap();

    let rows = store.rows(Table::Customers).await;
    assert_eq!(rows[0].get("customer"), Some(&Value::from("O'Brien's Clinic")));

    let insert = &store.statements_for("INSERT INTO customers")[0];
    assert!(insert.render().contains("'O''Brien''s Clinic'"));
  }

  #[tokio::test]
  async fn rows_of_a_failed_flush_are_reported() {
    let (store, mut ctx) = context().await;
    ctx.settings.batch_size = 2;
    store.fail_when(|s| s.params.contains(&Value::from("3")));

    let incoming: Vec<_> = (1..=5).map(|i| customer(&i.to_string(), "C", "Y")).collect();
    let counts = reconcile_customers(&mut ctx, &incoming).await.unwrap();

    assert_eq!(counts.inserted, 3);
    let keys: Vec<_> = counts.failures.iter().map(|f| f.key.as_str()).collect();
    assert_eq!(keys, ["3", "4"]);
  }
}
