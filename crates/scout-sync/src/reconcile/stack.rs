//! Stack / webpool / web reconciliation.
//!
//! Stacks are the only entities here with an update path: each mutable
//! location column is compared against the cached row and only the columns
//! that differ are written. Webpools and webs are inserted when absent and
//! otherwise left alone.

use scout_core::{
  record::StackRecord,
  row::{StackRow, WebRow},
  store::Store,
  table::Table,
  value::Columns,
};

use crate::{
  Error, Result,
  context::SyncContext,
  report::{FamilyCounts, RecordFailure},
};

/// Reconcile every stack record in order. A failing record is reported and
/// does not stop the ones after it.
pub async fn reconcile_stacks<S: Store>(
  ctx: &mut SyncContext<S>,
  records: &[StackRecord],
) -> Result<FamilyCounts> {
  let mut counts = FamilyCounts::default();
  for record in records {
    if let Err(err) = reconcile_stack(ctx, record, &mut counts).await {
      tracing::error!(stack = %record.stack, error = %err, "stack reconciliation failed");
      counts.failures.push(RecordFailure::new(&record.stack, err));
    }
  }
  // Webs are appended as they are written; finish with a full mirror.
  ctx.reload(Table::Webs).await?;
  Ok(counts)
}

async fn reconcile_stack<S: Store>(
  ctx: &mut SyncContext<S>,
  record: &StackRecord,
  counts: &mut FamilyCounts,
) -> Result<()> {
  let cached = ctx.cache.stacks.find(&record.stack)?.cloned();

  let stack_id = match cached {
    None => {
      ctx.writer.insert_one(Table::Stacks, stack_columns(record)).await?;
      ctx.reload(Table::Stacks).await?;
      counts.inserted += 1;
      ctx
        .cache
        .stacks
        .id_of(&record.stack)?
        .ok_or_else(|| unresolved(Table::Stacks, &record.stack))?
    }
    Some(row) => {
      let changes = stack_changes(record, &row);
      if changes.is_empty() {
        counts.unchanged += 1;
      } else {
        tracing::info!(stack = %record.stack, columns = changes.len(), "updating stack");
        let filter = Columns::new().with("stack", record.stack.as_str());
        ctx.writer.update(Table::Stacks, &changes, &filter).await?;
        ctx.reload(Table::Stacks).await?;
        counts.updated += 1;
      }
      row.id
    }
  };

  for webpool in &record.webpools {
    let webpool_id = ensure_webpool(ctx, &webpool.name, stack_id, counts).await?;
    for web in &webpool.webs {
      if ctx.cache.webs.find(web)?.is_some() {
        continue;
      }
      let row = Columns::new().with("name", web.as_str()).with("webpoolid", webpool_id);
      let id = ctx.writer.insert_one(Table::Webs, row).await?;
      ctx.cache.webs.append(WebRow { id, name: web.clone(), webpoolid: webpool_id })?;
      counts.inserted += 1;
    }
  }
  Ok(())
}

async fn ensure_webpool<S: Store>(
  ctx: &mut SyncContext<S>,
  name: &str,
  stack_id: i64,
  counts: &mut FamilyCounts,
) -> Result<i64> {
  if let Some(id) = ctx.cache.webpools.id_of(name)? {
    return Ok(id);
  }
  let row = Columns::new().with("name", name).with("stackid", stack_id);
  ctx.writer.insert_one(Table::Webpools, row).await?;
  ctx.reload(Table::Webpools).await?;
  counts.inserted += 1;
  ctx
    .cache
    .webpools
    .id_of(name)?
    .ok_or_else(|| unresolved(Table::Webpools, name))
}

fn stack_columns(record: &StackRecord) -> Columns {
  Columns::new()
    .with("stack", record.stack.as_str())
    .with("locallocation", record.local_location.as_str())
    .with("prodlocation", record.prod_location.as_str())
    .with("remotelocation", record.remote_location.as_str())
}

/// Mutable columns whose incoming value differs from the cached row.
pub fn stack_changes(incoming: &StackRecord, cached: &StackRow) -> Columns {
  let mut changes = Columns::new();
  let pairs = [
    ("locallocation", &incoming.local_location, &cached.locallocation),
    ("prodlocation", &incoming.prod_location, &cached.prodlocation),
    ("remotelocation", &incoming.remote_location, &cached.remotelocation),
  ];
  for (column, new, old) in pairs {
    if new != old {
      changes.push(column, new.as_str());
    }
  }
  changes
}

fn unresolved(table: Table, key: &str) -> Error {
  Error::UnresolvedReference { table, key: key.to_owned() }
}

#[cfg(test)]
mod tests {
  use std::sync::Arc;

  use scout_core::normalize::normalize_stack;

  use super::*;
  use crate::{
    context::PassSettings,
    testing::{RecordingStore, memory_store, stack_raw},
  };

  async fn context() -> (Arc<RecordingStore>, SyncContext<RecordingStore>) {
    let store = Arc::new(RecordingStore::new(memory_store().await));
    let mut ctx = SyncContext::new(store.clone(), PassSettings::default());
    for table in [Table::Stacks, Table::Webpools, Table::Webs] {
      ctx.reload(table).await.unwrap();
    }
    (store, ctx)
  }

  fn stack(name: &str, prod: &str) -> StackRecord { normalize_stack(&stack_raw(name, prod)).unwrap() }

  #[test]
  fn changes_list_only_differing_columns() {
    let cached = StackRow {
      id:             1,
      stack:          "S1".into(),
      locallocation:  "A".into(),
      prodlocation:   "B".into(),
      remotelocation: "C".into(),
    };
    assert!(stack_changes(&stack("S1", "B"), &cached).is_empty());

    let changes = stack_changes(&stack("S1", "B2"), &cached);
    assert_eq!(changes.names().collect::<Vec<_>>(), vec!["prodlocation"]);
  }

  #[tokio::test]
  async fn new_stack_is_inserted_without_update() {
    let (store, mut ctx) = context().await;
    let counts = reconcile_stacks(&mut ctx, &[stack("S1", "B")]).await.unwrap();

    let inserts = store.statements_for("INSERT INTO stacks");
    assert_eq!(inserts.len(), 1);
    assert_eq!(
      inserts[0].render(),
      "INSERT INTO stacks (stack, locallocation, prodlocation, remotelocation) \
       VALUES ('S1', 'A', 'B', 'C')"
    );
    assert!(store.statements_for("UPDATE stacks").is_empty());
    // stack + two webpools + three webs
    assert_eq!(counts.inserted, 6);
    assert!(counts.failures.is_empty());
  }

  #[tokio::test]
  async fn identical_second_run_issues_no_writes() {
    let (store, mut ctx) = context().await;
    let records = [stack("S1", "B"), stack("S2", "B")];
    reconcile_stacks(&mut ctx, &records).await.unwrap();
    store.reset_log();

    let counts = reconcile_stacks(&mut ctx, &records).await.unwrap();
    assert!(store.statements().is_empty(), "{:?}", store.statements());
    assert_eq!(counts.unchanged, 2);
    assert_eq!(counts.inserted, 0);
  }

  #[tokio::test]
  async fn drifted_location_updates_one_column() {
    let (store, mut ctx) = context().await;
    reconcile_stacks(&mut ctx, &[stack("S1", "B")]).await.unwrap();
    store.reset_log();

    let counts = reconcile_stacks(&mut ctx, &[stack("S1", "B2")]).await.unwrap();
    let updates = store.statements_for("UPDATE stacks");
    assert_eq!(updates.len(), 1);
    assert_eq!(updates[0].render(), "UPDATE stacks SET prodlocation = 'B2' WHERE stack = 'S1'");
    assert_eq!(counts.updated, 1);
    assert_eq!(ctx.cache.stacks.find("S1").unwrap().unwrap().prodlocation, "B2");
  }

  #[tokio::test]
  async fn webpools_reference_stack_surrogate_id() {
    let (store, mut ctx) = context().await;
    reconcile_stacks(&mut ctx, &[stack("S9", "B")]).await.unwrap();

    let stack_id = ctx.cache.stacks.id_of("S9").unwrap().unwrap();
    let webpool = ctx.cache.webpools.find("wp-prod-S9").unwrap().unwrap();
    assert_eq!(webpool.stackid, stack_id);

    let web = ctx.cache.webs.find("webS902").unwrap().unwrap();
    assert_eq!(web.webpoolid, webpool.id);
    assert_eq!(store.row_count(Table::Webs).await, 3);
  }

  #[tokio::test]
  async fn shared_web_name_is_inserted_once() {
    let (store, mut ctx) = context().await;
    let mut record = stack("S1", "B");
    record.webpools[1].webs.push("webS101".into());

    reconcile_stacks(&mut ctx, &[record]).await.unwrap();
    assert_eq!(store.row_count(Table::Webs).await, 3);
  }

  #[tokio::test]
  async fn failing_record_does_not_block_the_next() {
    let (store, mut ctx) = context().await;
    store.fail_when(|s| {
      s.sql.starts_with("INSERT INTO stacks") && s.params.first().and_then(|p| p.as_text()).as_deref() == Some("BAD")
    });

    let counts = reconcile_stacks(&mut ctx, &[stack("BAD", "B"), stack("S2", "B")]).await.unwrap();
    assert_eq!(counts.failures.len(), 1);
    assert_eq!(counts.failures[0].key, "BAD");
    assert!(ctx.cache.stacks.find("S2").unwrap().is_some());
  }
}
