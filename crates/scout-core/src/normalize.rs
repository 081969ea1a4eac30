//! Raw record normalizer: defaults, truncation and categorical mapping.
//!
//! Pure functions only; nothing here touches the store. A record missing a
//! field that has no sensible default fails with
//! [`Error::MalformedRecord`].

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value as Json;

use crate::{
  Error, Result,
  record::{
    CustomerRecord, NONE_LABEL, NormalizedRecord, RawRecord, StackRecord,
    Switchport, WebpoolRecord,
  },
};

/// Longest device name the fabric entity table accepts.
pub const DEVICE_NAME_MAX: usize = 50;

/// Which collaborator a raw record came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
  SanFabric,
  Topology,
  Customer,
}

impl fmt::Display for SourceKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(match self {
      SourceKind::SanFabric => "san-fabric",
      SourceKind::Topology => "topology",
      SourceKind::Customer => "customer",
    })
  }
}

/// Normalize one raw record of the given source kind.
pub fn normalize(raw: &RawRecord, kind: SourceKind) -> Result<NormalizedRecord> {
  Ok(match kind {
    SourceKind::SanFabric => NormalizedRecord::Switchport(normalize_switchport(raw)?),
    SourceKind::Topology => NormalizedRecord::Stack(normalize_stack(raw)?),
    SourceKind::Customer => NormalizedRecord::Customer(normalize_customer(raw)?),
  })
}

// ─── SAN fabric ──────────────────────────────────────────────────────────────

pub fn normalize_switchport(raw: &RawRecord) -> Result<Switchport> {
  let required = |field| required(raw, field, SourceKind::SanFabric);

  let active_zones = match raw.get("activeZones") {
    Some(Json::Array(items)) => items.iter().filter_map(json_text).collect(),
    Some(other) => json_text(other).into_iter().collect(),
    None => Vec::new(),
  };
  let active_zones = if active_zones.is_empty() {
    vec![NONE_LABEL.to_owned()]
  } else {
    active_zones
  };

  Ok(Switchport {
    id: required("id")?,
    wwn: required("wwn")?,
    port_number: required("portNumber")?,
    slot_number: required("slotNumber")?,
    remote_wwn: optional(raw, "remoteNodeWwn"),
    ip_address: required("ipAddress")?,
    device_name: device_name(raw),
    entity_type: entity_type(raw),
    fabric: required("fabricName")?,
    health: required("health")?,
    status: required("status")?,
    switch: required("switchName")?,
    zone_alias: optional(raw, "zoneAlias"),
    active_zones,
  })
}

/// Pick the connected device name: `remoteDevice` unless blank or
/// `localhost`, then `remotePort`, then `"none"`.
fn device_name(raw: &RawRecord) -> String {
  let remote_device = text(raw, "remoteDevice").filter(|d| d != "localhost");
  let name = remote_device
    .or_else(|| text(raw, "remotePort"))
    .unwrap_or_else(|| NONE_LABEL.to_owned());
  truncate_tail(&name, DEVICE_NAME_MAX)
}

/// Keep at most the last `max` characters of `s`.
pub fn truncate_tail(s: &str, max: usize) -> String {
  let len = s.chars().count();
  if len <= max {
    return s.to_owned();
  }
  s.chars().skip(len - max).collect()
}

fn entity_type(raw: &RawRecord) -> String {
  let classified = text(raw, "connectedDeviceType").and_then(|t| {
    if t == "Initiator" {
      Some("device")
    } else if t == "SWITCH" {
      Some("chassis")
    } else if t.contains("Target") {
      Some("storage")
    } else {
      None
    }
  });

  match classified {
    Some(label) => label.to_owned(),
    None => optional(raw, "entitytype"),
  }
}

// ─── Topology ────────────────────────────────────────────────────────────────

/// Locations that carry a webpool, in the order they are reconciled.
const WEBPOOL_LOCATIONS: [&str; 2] = ["prod", "remote"];

pub fn normalize_stack(raw: &RawRecord) -> Result<StackRecord> {
  let required = |field| required(raw, field, SourceKind::Topology);

  let mut webpools = Vec::with_capacity(WEBPOOL_LOCATIONS.len());
  for location in WEBPOOL_LOCATIONS {
    let (name_field, list_field) = match location {
      "prod" => ("prod_webpool_name", "prod_webpool"),
      _ => ("remote_webpool_name", "remote_webpool"),
    };
    let webs = required(list_field)?
      .split(',')
      .map(str::trim)
      .filter(|w| !w.is_empty())
      .map(str::to_owned)
      .collect();
    webpools.push(WebpoolRecord { name: required(name_field)?, webs });
  }

  Ok(StackRecord {
    stack: required("stack")?,
    local_location: required("local_location")?,
    prod_location: required("prod_location")?,
    remote_location: required("remote_location")?,
    webpools,
  })
}

// ─── Customers ───────────────────────────────────────────────────────────────

pub fn normalize_customer(raw: &RawRecord) -> Result<CustomerRecord> {
  let required = |field| required(raw, field, SourceKind::Customer);

  Ok(CustomerRecord {
    context_id:   required("ID")?,
    name:         required("NAME")?,
    status:       live_flag(&required("L")?),
    stack_number: required("STACKNUMBER")?,
  })
}

/// `'Y'` is live; every other value is not.
pub fn live_flag(value: &str) -> i64 { i64::from(value == "Y") }

// ─── Field access ────────────────────────────────────────────────────────────

fn json_text(value: &Json) -> Option<String> {
  match value {
    Json::String(s) => Some(s.clone()),
    Json::Number(n) => Some(n.to_string()),
    Json::Bool(b) => Some(b.to_string()),
    _ => None,
  }
}

/// Non-empty text value of `field`, if any.
fn text(raw: &RawRecord, field: &str) -> Option<String> {
  raw.get(field).and_then(json_text).filter(|s| !s.is_empty())
}

fn optional(raw: &RawRecord, field: &str) -> String {
  text(raw, field).unwrap_or_else(|| NONE_LABEL.to_owned())
}

fn required(
  raw: &RawRecord,
  field: &'static str,
  source_kind: SourceKind,
) -> Result<String> {
  raw
    .get(field)
    .and_then(json_text)
    .ok_or(Error::MalformedRecord { source_kind, field })
}
