//! Source records before and after normalization.

use serde::{Deserialize, Serialize};

/// A raw record exactly as a source collaborator returned it.
pub type RawRecord = serde_json::Map<String, serde_json::Value>;

/// Placeholder stored for optional attributes a source did not supply.
pub const NONE_LABEL: &str = "none";

/// A normalized record, tagged by the source family it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NormalizedRecord {
  Switchport(Switchport),
  Stack(StackRecord),
  Customer(CustomerRecord),
}

/// One switchport observation from the SAN-fabric inventory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Switchport {
  /// Source-provided port id; unique within one run.
  pub id:           String,
  pub wwn:          String,
  pub port_number:  String,
  pub slot_number:  String,
  pub remote_wwn:   String,
  pub ip_address:   String,
  pub device_name:  String,
  pub entity_type:  String,
  pub fabric:       String,
  pub health:       String,
  pub status:       String,
  pub switch:       String,
  pub zone_alias:   String,
  pub active_zones: Vec<String>,
}

/// A stack with its locations and its prod/remote webpools.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackRecord {
  pub stack:           String,
  pub local_location:  String,
  pub prod_location:   String,
  pub remote_location: String,
  pub webpools:        Vec<WebpoolRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebpoolRecord {
  pub name: String,
  pub webs: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerRecord {
  pub context_id:   String,
  pub name:         String,
  /// `1` when the customer is live, else `0`.
  pub status:       i64,
  pub stack_number: String,
}
