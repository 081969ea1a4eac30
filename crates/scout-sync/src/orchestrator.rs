//! The run orchestrator: one full synchronization pass.
//!
//! Steps, in order:
//!
//! 1. warm the reference cache (fatal on failure)
//! 2. fetch every source, one after another
//! 3. stacks, webpools and webs
//! 4. customers (full replace)
//! 5. allocate a run id (fatal for the rest of the pass on failure)
//! 6. SAN-fabric entities and zone memberships under that run
//! 7. stamp `updatetracking` for every family that completed
//!
//! A family whose source failed or was skipped is reported and left alone;
//! the others still run.

use std::{sync::Arc, time::Instant};

use scout_core::{
  normalize::{SourceKind, normalize_customer, normalize_stack, normalize_switchport},
  record::RawRecord,
  source::Source,
  store::Store,
  table::Table,
};

use crate::{
  Result,
  context::{PassSettings, SyncContext},
  reconcile::{
    customer::reconcile_customers,
    fabric::{allocate_run, reconcile_fabric},
    normalize_all,
    stack::reconcile_stacks,
  },
  report::{Family, FamilyCounts, FamilyReport, Outcome, PassReport, RecordFailure},
};

/// One optional source per family. A missing source skips its family.
#[derive(Clone, Default)]
pub struct Sources {
  pub stacks:    Option<Arc<dyn Source>>,
  pub customers: Option<Arc<dyn Source>>,
  pub sannav:    Option<Arc<dyn Source>>,
}

impl Sources {
  fn get(&self, family: Family) -> Option<&Arc<dyn Source>> {
    match family {
      Family::Stacks => self.stacks.as_ref(),
      Family::Customers => self.customers.as_ref(),
      Family::SanNav => self.sannav.as_ref(),
    }
  }
}

/// Result of step 2 for one family.
enum Fetched {
  Records(Vec<RawRecord>),
  Failed(String),
  Skipped(String),
}

pub struct Orchestrator<S> {
  ctx:     SyncContext<S>,
  sources: Sources,
  skip:    Vec<Family>,
}

impl<S: Store> Orchestrator<S> {
  pub fn new(store: Arc<S>, settings: PassSettings, sources: Sources) -> Self {
    Self { ctx: SyncContext::new(store, settings), sources, skip: Vec::new() }
  }

  /// Leave `families` out of every pass.
  pub fn skip(mut self, families: impl IntoIterator<Item = Family>) -> Self {
    self.skip.extend(families);
    self
  }

  pub fn context(&self) -> &SyncContext<S> { &self.ctx }

  /// Run one pass. Only a cache warm-up failure is returned as `Err`; every
  /// other failure is recorded in the report.
  pub async fn run_pass(&mut self) -> Result<PassReport> {
    let started = Instant::now();
    let mut report = PassReport::default();

    self.warm_cache().await?;

    let stacks = self.fetch(Family::Stacks).await;
    let customers = self.fetch(Family::Customers).await;
    let sannav = self.fetch(Family::SanNav).await;

    let stacks = self.stack_family(stacks).await;
    report.families.push(stacks);
    let customers = self.customer_family(customers).await;
    report.families.push(customers);
    let sannav = self.sannav_family(sannav, &mut report).await;
    report.families.push(sannav);

    self.stamp_tracking(&report).await;

    report.elapsed_ms = elapsed_ms(started);
    tracing::info!(
      run_id = ?report.run_id,
      success = report.is_success(),
      elapsed_ms = report.elapsed_ms,
      "pass finished"
    );
    Ok(report)
  }

  async fn warm_cache(&mut self) -> Result<()> {
    let started = Instant::now();
    for table in Table::ID_TABLES.into_iter().chain(Table::CORE_TABLES) {
      self.ctx.reload(table).await?;
    }
    tracing::info!(elapsed_ms = elapsed_ms(started), "cache warmed");
    Ok(())
  }

  async fn fetch(&self, family: Family) -> Fetched {
    if self.skip.contains(&family) {
      return Fetched::Skipped("skipped by request".into());
    }
    let Some(source) = self.sources.get(family) else {
      return Fetched::Skipped("no source configured".into());
    };

    let started = Instant::now();
    match source.fetch().await {
      Ok(records) => {
        tracing::info!(
          %family,
          source = source.name(),
          records = records.len(),
          elapsed_ms = elapsed_ms(started),
          "source fetched"
        );
        Fetched::Records(records)
      }
      Err(err) => {
        tracing::error!(%family, source = source.name(), error = %err, "source fetch failed");
        Fetched::Failed(err.to_string())
      }
    }
  }

  async fn stack_family(&mut self, fetched: Fetched) -> FamilyReport {
    let started = Instant::now();
    let outcome = match fetched {
      Fetched::Records(raws) => {
        let (records, malformed) = normalize_all(
          raws,
          SourceKind::Topology,
          self.ctx.settings.format_concurrency,
          normalize_stack,
        )
        .await;
        completed(reconcile_stacks(&mut self.ctx, &records).await, malformed)
      }
      other => not_run(other),
    };
    finish(Family::Stacks, outcome, started)
  }

  async fn customer_family(&mut self, fetched: Fetched) -> FamilyReport {
    let started = Instant::now();
    let outcome = match fetched {
      Fetched::Records(raws) => {
        let (records, malformed) = normalize_all(
          raws,
          SourceKind::Customer,
          self.ctx.settings.format_concurrency,
          normalize_customer,
        )
        .await;
        completed(reconcile_customers(&mut self.ctx, &records).await, malformed)
      }
      other => not_run(other),
    };
    finish(Family::Customers, outcome, started)
  }

  async fn sannav_family(&mut self, fetched: Fetched, report: &mut PassReport) -> FamilyReport {
    let started = Instant::now();
    let raws = match fetched {
      Fetched::Records(raws) => raws,
      other => return finish(Family::SanNav, not_run(other), started),
    };

    let (ports, malformed) = normalize_all(
      raws,
      SourceKind::SanFabric,
      self.ctx.settings.format_concurrency,
      normalize_switchport,
    )
    .await;

    let run_id = match allocate_run(&mut self.ctx, &timestamp()).await {
      Ok(id) => id,
      Err(err) => {
        tracing::error!(error = %err, "run allocation failed, abandoning fabric snapshot");
        report.aborted = Some(err.to_string());
        let outcome = Outcome::Failed { reason: err.to_string() };
        return finish(Family::SanNav, outcome, started);
      }
    };
    report.run_id = Some(run_id);

    let outcome = completed(reconcile_fabric(&mut self.ctx, run_id, &ports).await, malformed);
    finish(Family::SanNav, outcome, started)
  }

  async fn stamp_tracking(&self, report: &PassReport) {
    for family in report.families.iter().filter(|f| f.counts().is_some()) {
      let column = family.family.tracking_column();
      if let Err(err) = self.ctx.writer.touch_tracking(column, &timestamp()).await {
        tracing::error!(family = %family.family, error = %err, "failed to record refresh time");
      }
    }
  }
}

fn completed(result: Result<FamilyCounts>, malformed: Vec<RecordFailure>) -> Outcome {
  match result {
    Ok(mut counts) => {
      let mut failures = malformed;
      failures.append(&mut counts.failures);
      counts.failures = failures;
      Outcome::Completed(counts)
    }
    Err(err) => Outcome::Failed { reason: err.to_string() },
  }
}

fn not_run(fetched: Fetched) -> Outcome {
  match fetched {
    Fetched::Failed(reason) => Outcome::Failed { reason },
    Fetched::Skipped(reason) => Outcome::Skipped { reason },
    Fetched::Records(_) => Outcome::Skipped { reason: "not reconciled".into() },
  }
}

fn finish(family: Family, outcome: Outcome, started: Instant) -> FamilyReport {
  let elapsed_ms = elapsed_ms(started);
  match &outcome {
    Outcome::Completed(c) => tracing::info!(
      %family,
      inserted = c.inserted,
      updated = c.updated,
      unchanged = c.unchanged,
      linked = c.linked,
      failed_records = c.failures.len(),
      elapsed_ms,
      "family reconciled"
    ),
    Outcome::Failed { reason } => tracing::error!(%family, %reason, elapsed_ms, "family failed"),
    Outcome::Skipped { reason } => tracing::info!(%family, %reason, "family skipped"),
  }
  FamilyReport { family, outcome, elapsed_ms }
}

/// Local wall-clock time in the store's `YYYY-MM-DD HH:MM:SS` form.
fn timestamp() -> String { chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string() }

fn elapsed_ms(started: Instant) -> u64 { started.elapsed().as_millis() as u64 }
