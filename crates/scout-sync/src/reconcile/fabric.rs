//! SAN-fabric reconciliation.
//!
//! Every switchport becomes a fresh `sannaventities` row under the pass's run
//! id; there is no update path. Each active zone on a port becomes an
//! `activezones` edge. Entities are flushed before edges, and edges whose
//! entity did not make it into the store are dropped.

use scout_core::{
  record::Switchport,
  store::Store,
  table::{Label, Table},
  value::{Columns, Statement, Value},
};

use super::format_all;
use crate::{
  Error, Result,
  cache::Cache,
  context::SyncContext,
  report::{FamilyCounts, RecordFailure},
  resolver::resolve_many,
};

/// Insert a `run` row stamped `captured_at` and read its id back.
///
/// The row is found again by its capture timestamp; if several runs share it
/// the highest id is the one just inserted.
pub async fn allocate_run<S: Store>(ctx: &mut SyncContext<S>, captured_at: &str) -> Result<i64> {
  let row = Columns::new().with("capturedatetime", captured_at);
  ctx
    .writer
    .insert_one(Table::Run, row)
    .await
    .map_err(|e| Error::RunAllocation(e.to_string()))?;

  let lookup = Statement::with_params(
    "SELECT id FROM run WHERE capturedatetime = ?1 ORDER BY id DESC LIMIT 1",
    vec![Value::from(captured_at)],
  );
  let records = ctx
    .store
    .query(lookup)
    .await
    .map_err(|e| Error::RunAllocation(e.to_string()))?;
  let run_id = records
    .first()
    .ok_or_else(|| Error::RunAllocation(format!("no run captured at {captured_at}")))?
    .int("id")?;

  ctx.reload(Table::Run).await?;
  tracing::info!(run_id, captured_at, "run allocated");
  Ok(run_id)
}

/// The raw value a port carries for `label`.
pub fn label_value(port: &Switchport, label: Label) -> &str {
  match label {
    Label::EntityType => &port.entity_type,
    Label::Fabric => &port.fabric,
    Label::Health => &port.health,
    Label::Status => &port.status,
    Label::Switch => &port.switch,
    Label::Zone => &port.zone_alias,
  }
}

/// Build the entity row and its membership edges for one port.
///
/// Every label must already be in the cache.
pub fn format_switchport(
  cache: &Cache,
  run_id: i64,
  port: &Switchport,
) -> Result<(Columns, Vec<Columns>)> {
  let lookup = |label: Label, name: &str| -> Result<i64> {
    cache
      .label(label)
      .id_of(name)?
      .ok_or_else(|| Error::UnresolvedReference { table: label.table(), key: name.to_owned() })
  };

  let mut entity = Columns::new()
    .with("runid", run_id)
    .with("id", port.id.as_str())
    .with("wwn", port.wwn.as_str())
    .with("portnumber", port.port_number.as_str())
    .with("slotnumber", port.slot_number.as_str())
    .with("remotewwn", port.remote_wwn.as_str())
    .with("ipaddress", port.ip_address.as_str())
    .with("devicename", port.device_name.as_str());
  for label in Label::ALL {
    entity.push(label.id_column(), lookup(label, label_value(port, label))?);
  }

  let memberships = port
    .active_zones
    .iter()
    .map(|zone| {
      Ok(
        Columns::new()
          .with("runid", run_id)
          .with("sannaventityid", port.id.as_str())
          .with("zoneid", lookup(Label::Zone, zone.as_str())?),
      )
    })
    .collect::<Result<Vec<_>>>()?;

  Ok((entity, memberships))
}

/// Write one run's switchport snapshot and its zone memberships.
pub async fn reconcile_fabric<S: Store>(
  ctx: &mut SyncContext<S>,
  run_id: i64,
  ports: &[Switchport],
) -> Result<FamilyCounts> {
  let mut counts = FamilyCounts::default();

  for label in Label::ALL {
    let names = ports.iter().map(|p| label_value(p, label));
    let resolved = if label == Label::Zone {
      let zones = ports.iter().flat_map(|p| p.active_zones.iter().map(String::as_str));
      resolve_many(ctx, label, names.chain(zones)).await?
    } else {
      resolve_many(ctx, label, names).await?
    };
    counts.inserted += resolved.inserted;
  }

  let formatted = format_all(
    ports.iter().collect::<Vec<_>>(),
    ctx.settings.format_concurrency,
    |port| format_switchport(&ctx.cache, run_id, port),
  )
  .await;

  let mut entities = Vec::with_capacity(ports.len());
  let mut entity_ports = Vec::with_capacity(ports.len());
  let mut memberships = Vec::new();
  for (port, result) in ports.iter().zip(formatted) {
    match result {
      Ok((entity, edges)) => {
        let idx = entities.len();
        entities.push(entity);
        entity_ports.push(port.id.as_str());
        memberships.extend(edges.into_iter().map(|edge| (idx, port.id.as_str(), edge)));
      }
      Err(err) => {
        tracing::warn!(port = %port.id, error = %err, "skipping switchport");
        counts.failures.push(RecordFailure::new(&port.id, err));
      }
    }
  }

  let batch_size = ctx.settings.batch_size;
  let report = ctx
    .writer
    .insert_batch(Table::SanNavEntities, entities, batch_size)
    .await?;
  counts.inserted += report.written();
  for flush in &report.failed {
    for idx in flush.rows.clone() {
      counts.failures.push(RecordFailure::new(entity_ports[idx], &flush.reason));
    }
  }

  let (edges, edge_ports): (Vec<_>, Vec<_>) = memberships
    .into_iter()
    .filter(|(idx, ..)| !report.is_unwritten(*idx))
    .map(|(_, port, edge)| (edge, port))
    .unzip();
  let linked = ctx
    .writer
    .insert_batch(Table::ActiveZones, edges, batch_size)
    .await?;
  counts.linked = linked.written();
  for flush in &linked.failed {
    for idx in flush.rows.clone() {
      counts.failures.push(RecordFailure::new(edge_ports[idx], &flush.reason));
    }
  }

  ctx.reload(Table::ActiveZones).await?;
  Ok(counts)
}
