//! Per-family results of a pass, for logs and machine-readable output.

use std::fmt;

use serde::Serialize;

/// A group of related entities reconciled together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Family {
  Stacks,
  Customers,
  SanNav,
}

impl Family {
  pub const ALL: [Family; 3] = [Family::Stacks, Family::Customers, Family::SanNav];

  /// Column of `updatetracking` stamped when the family commits.
  pub fn tracking_column(self) -> &'static str {
    match self {
      Family::Stacks => "stacks",
      Family::Customers => "customers",
      Family::SanNav => "sannaventities",
    }
  }

  pub fn name(self) -> &'static str {
    match self {
      Family::Stacks => "stacks",
      Family::Customers => "customers",
      Family::SanNav => "sannav",
    }
  }
}

impl fmt::Display for Family {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.name()) }
}

impl std::str::FromStr for Family {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Family::ALL
      .into_iter()
      .find(|f| f.name() == s)
      .ok_or_else(|| format!("unknown family {s:?} (expected stacks, customers or sannav)"))
  }
}

/// One record that could not be reconciled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordFailure {
  /// Natural key of the record, or its position when no key could be read.
  pub key:    String,
  pub reason: String,
}

impl RecordFailure {
  pub fn new(key: impl Into<String>, reason: impl fmt::Display) -> Self {
    Self { key: key.into(), reason: reason.to_string() }
  }
}

/// Row-level tallies for one family.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FamilyCounts {
  pub inserted:  usize,
  pub updated:   usize,
  pub unchanged: usize,
  /// Membership edges written alongside the primary rows.
  pub linked:    usize,
  pub failures:  Vec<RecordFailure>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
  Completed(FamilyCounts),
  Failed { reason: String },
  Skipped { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FamilyReport {
  pub family:     Family,
  #[serde(flatten)]
  pub outcome:    Outcome,
  pub elapsed_ms: u64,
}

impl FamilyReport {
  pub fn is_failed(&self) -> bool { matches!(self.outcome, Outcome::Failed { .. }) }

  pub fn counts(&self) -> Option<&FamilyCounts> {
    match &self.outcome {
      Outcome::Completed(counts) => Some(counts),
      _ => None,
    }
  }
}

/// Everything a pass did, family by family.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PassReport {
  pub run_id:     Option<i64>,
  pub families:   Vec<FamilyReport>,
  /// Set when a prerequisite step failed and the pass stopped early.
  pub aborted:    Option<String>,
  pub elapsed_ms: u64,
}

impl PassReport {
  pub fn family(&self, family: Family) -> Option<&FamilyReport> {
    self.families.iter().find(|r| r.family == family)
  }

  pub fn is_success(&self) -> bool {
    self.aborted.is_none() && !self.families.iter().any(FamilyReport::is_failed)
  }
}

impl fmt::Display for PassReport {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    for report in &self.families {
      write!(f, "{:<10} ", report.family)?;
      match &report.outcome {
        Outcome::Completed(c) => write!(
          f,
          "ok      inserted={} updated={} unchanged={} linked={} failed_records={}",
          c.inserted,
          c.updated,
          c.unchanged,
          c.linked,
          c.failures.len()
        )?,
        Outcome::Failed { reason } => write!(f, "FAILED  {reason}")?,
        Outcome::Skipped { reason } => write!(f, "skipped {reason}")?,
      }
      writeln!(f, " ({} ms)", report.elapsed_ms)?;
    }
    if let Some(run_id) = self.run_id {
      writeln!(f, "run id: {run_id}")?;
    }
    if let Some(reason) = &self.aborted {
      writeln!(f, "pass aborted: {reason}")?;
    }
    write!(f, "total: {} ms", self.elapsed_ms)
  }
}
