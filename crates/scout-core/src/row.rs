//! Typed rows mirrored from the store into the reference cache.
//!
//! Each row type knows how to decode itself from a [`Record`] and which of its
//! fields is the natural key the cache searches on.

use serde::{Deserialize, Serialize};

use crate::{Result, value::Record};

/// A row type that can live in the reference cache.
pub trait CachedRow: Sized + Clone {
  fn from_record(record: &Record) -> Result<Self>;

  /// Surrogate id assigned by the store.
  fn id(&self) -> i64;

  /// Business key the cache looks rows up by.
  fn natural_key(&self) -> &str;
}

// ─── Label tables ────────────────────────────────────────────────────────────

/// A row in one of the `{id, name}` label tables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelRow {
  pub id:   i64,
  pub name: String,
}

impl CachedRow for LabelRow {
  fn from_record(record: &Record) -> Result<Self> {
    Ok(Self { id: record.int("id")?, name: record.text("name")? })
  }

  fn id(&self) -> i64 { self.id }

  fn natural_key(&self) -> &str { &self.name }
}

// ─── Stack topology ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackRow {
  pub id:             i64,
  pub stack:          String,
  pub locallocation:  String,
  pub prodlocation:   String,
  pub remotelocation: String,
}

impl CachedRow for StackRow {
  fn from_record(record: &Record) -> Result<Self> {
    Ok(Self {
      id:             record.int("id")?,
      stack:          record.text("stack")?,
      locallocation:  record.text("locallocation")?,
      prodlocation:   record.text("prodlocation")?,
      remotelocation: record.text("remotelocation")?,
    })
  }

  fn id(&self) -> i64 { self.id }

  fn natural_key(&self) -> &str { &self.stack }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebpoolRow {
  pub id:      i64,
  pub name:    String,
  pub stackid: i64,
}

impl CachedRow for WebpoolRow {
  fn from_record(record: &Record) -> Result<Self> {
    Ok(Self {
      id:      record.int("id")?,
      name:    record.text("name")?,
      stackid: record.int("stackid")?,
    })
  }

  fn id(&self) -> i64 { self.id }

  fn natural_key(&self) -> &str { &self.name }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebRow {
  pub id:        i64,
  pub name:      String,
  pub webpoolid: i64,
}

impl CachedRow for WebRow {
  fn from_record(record: &Record) -> Result<Self> {
    Ok(Self {
      id:        record.int("id")?,
      name:      record.text("name")?,
      webpoolid: record.int("webpoolid")?,
    })
  }

  fn id(&self) -> i64 { self.id }

  fn natural_key(&self) -> &str { &self.name }
}

// ─── Customers ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerRow {
  pub id:        i64,
  pub contextid: String,
  pub customer:  String,
  pub status:    i64,
  /// Stack number as supplied by the customer export.
  pub stackid:   String,
}

impl CachedRow for CustomerRow {
  fn from_record(record: &Record) -> Result<Self> {
    Ok(Self {
      id:        record.int("id")?,
      contextid: record.text("contextid")?,
      customer:  record.text("customer")?,
      status:    record.int("status")?,
      stackid:   record.text("stackid")?,
    })
  }

  fn id(&self) -> i64 { self.id }

  fn natural_key(&self) -> &str { &self.contextid }
}

// ─── Runs and fabric snapshots ───────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunRow {
  pub id:              i64,
  pub capturedatetime: String,
}

impl CachedRow for RunRow {
  fn from_record(record: &Record) -> Result<Self> {
    Ok(Self {
      id:              record.int("id")?,
      capturedatetime: record.text("capturedatetime")?,
    })
  }

  fn id(&self) -> i64 { self.id }

  fn natural_key(&self) -> &str { &self.capturedatetime }
}

/// One zone-membership edge of a fabric entity within a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveZoneRow {
  pub id:             i64,
  pub runid:          i64,
  pub sannaventityid: String,
  pub zoneid:         i64,
}

impl CachedRow for ActiveZoneRow {
  fn from_record(record: &Record) -> Result<Self> {
    Ok(Self {
      id:             record.int("id")?,
      runid:          record.int("runid")?,
      sannaventityid: record.text("sannaventityid")?,
      zoneid:         record.int("zoneid")?,
    })
  }

  fn id(&self) -> i64 { self.id }

  fn natural_key(&self) -> &str { &self.sannaventityid }
}
