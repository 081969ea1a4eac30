//! Natural key → surrogate id resolution for the label tables.
//!
//! A name missing from the cache is inserted through the writer, the table is
//! reloaded, and the name is looked up again. A name that is still missing
//! after that is an [`Error::UnresolvedReference`].

use std::collections::BTreeSet;

use scout_core::{store::Store, table::Label, value::Columns};

use crate::{Error, Result, context::SyncContext};

/// Resolve one name, inserting it if the cache has never seen it.
pub async fn resolve<S: Store>(
  ctx: &mut SyncContext<S>,
  label: Label,
  name: &str,
) -> Result<i64> {
  if let Some(id) = ctx.cache.label(label).id_of(name)? {
    return Ok(id);
  }

  insert_label(ctx, label, name).await;
  ctx.reload(label.table()).await?;
  lookup(ctx, label, name)
}

/// Outcome of [`resolve_many`].
#[derive(Debug, Default)]
pub struct Resolved {
  pub inserted:   usize,
  pub unresolved: Vec<(String, Error)>,
}

/// Resolve a set of names in one sweep: insert every missing name, reload the
/// table once, then confirm each name is present.
///
/// Per-name failures are collected rather than returned; only a failed
/// reload aborts the sweep.
pub async fn resolve_many<S, I>(ctx: &mut SyncContext<S>, label: Label, names: I) -> Result<Resolved>
where
  S: Store,
  I: IntoIterator,
  I::Item: AsRef<str>,
{
  let names: BTreeSet<String> =
    names.into_iter().map(|n| n.as_ref().to_owned()).collect();

  let mut missing = Vec::new();
  for name in &names {
    if ctx.cache.label(label).id_of(name)?.is_none() {
      missing.push(name.as_str());
    }
  }

  let mut resolved = Resolved::default();
  if missing.is_empty() {
    return Ok(resolved);
  }

  for name in &missing {
    if insert_label(ctx, label, name).await {
      resolved.inserted += 1;
    }
  }
  ctx.reload(label.table()).await?;

  for name in missing {
    if let Err(err) = lookup(ctx, label, name) {
      tracing::warn!(%label, name, error = %err, "label did not resolve");
      resolved.unresolved.push((name.to_owned(), err));
    }
  }
  tracing::debug!(%label, inserted = resolved.inserted, "labels resolved");
  Ok(resolved)
}

/// Insert `{name}` into the label table. A failure is logged; the caller's
/// reload-and-lookup turns it into an unresolved reference.
async fn insert_label<S: Store>(ctx: &SyncContext<S>, label: Label, name: &str) -> bool {
  let row = Columns::new().with("name", name);
  match ctx.writer.insert_one(label.table(), row).await {
    Ok(_) => true,
    Err(err) => {
      tracing::error!(%label, name, error = %err, "label insert failed");
      false
    }
  }
}

fn lookup<S: Store>(ctx: &SyncContext<S>, label: Label, name: &str) -> Result<i64> {
  ctx
    .cache
    .label(label)
    .id_of(name)?
    .ok_or_else(|| Error::UnresolvedReference {
      table: label.table(),
      key:   name.to_owned(),
    })
}

#[cfg(test)]
mod tests {
  use std::sync::Arc;

  use scout_core::table::Table;

  use super::*;
  use crate::{
    context::PassSettings,
    testing::{RecordingStore, memory_store},
  };

  async fn context() -> (Arc<RecordingStore>, SyncContext<RecordingStore>) {
    let store = Arc::new(RecordingStore::new(memory_store().await));
    let mut ctx = SyncContext::new(store.clone(), PassSettings::default());
    ctx.reload(Table::Switch).await.unwrap();
    ctx.reload(Table::Zone).await.unwrap();
    (store, ctx)
  }

  #[tokio::test]
  async fn unseen_name_is_inserted_and_resolved() {
    let (store, mut ctx) = context().await;
    let id = resolve(&mut ctx, Label::Switch, "sw-new").await.unwrap();

    assert_eq!(store.statements_for("INSERT INTO switch").len(), 1);
    assert_eq!(ctx.cache.label(Label::Switch).id_of("sw-new").unwrap(), Some(id));
  }

  #[tokio::test]
  async fn known_name_is_not_reinserted() {
    let (store, mut ctx) = context().await;
    let first = resolve(&mut ctx, Label::Switch, "sw-a1").await.unwrap();
    let second = resolve(&mut ctx, Label::Switch, "sw-a1").await.unwrap();

    assert_eq!(first, second);
    assert_eq!(store.statements_for("INSERT INTO switch").len(), 1);
  }

  #[tokio::test]
  async fn resolved_name_survives_fresh_load_without_duplicates() {
    let (store, mut ctx) = context().await;
    resolve(&mut ctx, Label::Zone, "z_esx01").await.unwrap();
    resolve(&mut ctx, Label::Zone, "z_esx01").await.unwrap();

    let mut fresh = SyncContext::new(store.clone(), PassSettings::default());
    fresh.reload(Table::Zone).await.unwrap();
    let rows = fresh.cache.label(Label::Zone).rows().unwrap();
    assert_eq!(rows.iter().filter(|r| r.name == "z_esx01").count(), 1);
  }

  #[tokio::test]
  async fn failed_insert_is_unresolved_reference() {
    let (store, mut ctx) = context().await;
    store.fail_when(|s| s.sql.starts_with("INSERT INTO switch"));

    let err = resolve(&mut ctx, Label::Switch, "sw-x").await.unwrap_err();
    assert!(matches!(
      err,
      Error::UnresolvedReference { table: Table::Switch, ref key } if key == "sw-x"
    ));
  }

  #[tokio::test]
  async fn resolve_many_reloads_once() {
    let (store, mut ctx) = context().await;
    resolve(&mut ctx, Label::Zone, "z1").await.unwrap();

    let names = ["z1", "z2", "z3", "z2"];
    let resolved = resolve_many(&mut ctx, Label::Zone, names).await.unwrap();

    assert_eq!(resolved.inserted, 2);
    assert!(resolved.unresolved.is_empty());
    assert_eq!(store.statements_for("INSERT INTO zone").len(), 3);
    for name in ["z1", "z2", "z3"] {
      assert!(ctx.cache.label(Label::Zone).id_of(name).unwrap().is_some());
    }
  }

  #[tokio::test]
  async fn resolve_many_collects_failures() {
    let (store, mut ctx) = context().await;
    store.fail_when(|s| s.params.iter().any(|p| p.as_text().as_deref() == Some("bad")));

    let resolved = resolve_many(&mut ctx, Label::Zone, ["good", "bad"]).await.unwrap();
    assert_eq!(resolved.inserted, 1);
    assert_eq!(resolved.unresolved.len(), 1);
    assert_eq!(resolved.unresolved[0].0, "bad");
  }
}
