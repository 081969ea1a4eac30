//! The fixed set of tables the job reads and writes.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Every table in the storage schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Table {
  Zone,
  Switch,
  Fabric,
  Health,
  Status,
  EntityType,
  Stacks,
  Webpools,
  Webs,
  Customers,
  Run,
  SanNavEntities,
  ActiveZones,
  UpdateTracking,
}

impl Table {
  /// Lookup tables read into the cache at warm-up, in load order.
  pub const ID_TABLES: [Table; 10] = [
    Table::EntityType,
    Table::Fabric,
    Table::Health,
    Table::Run,
    Table::Stacks,
    Table::Status,
    Table::Switch,
    Table::Webpools,
    Table::Zone,
    Table::Webs,
  ];

  /// Fact tables read into the cache at warm-up, after [`Table::ID_TABLES`].
  pub const CORE_TABLES: [Table; 2] = [Table::Customers, Table::ActiveZones];

  pub fn name(self) -> &'static str {
    match self {
      Table::Zone => "zone",
      Table::Switch => "switch",
      Table::Fabric => "fabric",
      Table::Health => "health",
      Table::Status => "status",
      Table::EntityType => "entitytype",
      Table::Stacks => "stacks",
      Table::Webpools => "webpools",
      Table::Webs => "webs",
      Table::Customers => "customers",
      Table::Run => "run",
      Table::SanNavEntities => "sannaventities",
      Table::ActiveZones => "activezones",
      Table::UpdateTracking => "updatetracking",
    }
  }
}

impl fmt::Display for Table {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.name())
  }
}

/// The simple `{id, name}` label tables resolved by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Label {
  Zone,
  Switch,
  Fabric,
  Health,
  Status,
  EntityType,
}

impl Label {
  pub const ALL: [Label; 6] = [
    Label::EntityType,
    Label::Fabric,
    Label::Health,
    Label::Status,
    Label::Switch,
    Label::Zone,
  ];

  pub fn table(self) -> Table {
    match self {
      Label::Zone => Table::Zone,
      Label::Switch => Table::Switch,
      Label::Fabric => Table::Fabric,
      Label::Health => Table::Health,
      Label::Status => Table::Status,
      Label::EntityType => Table::EntityType,
    }
  }

  /// The foreign-key column a fabric entity row uses for this label.
  pub fn id_column(self) -> &'static str {
    match self {
      Label::Zone => "zoneid",
      Label::Switch => "switchid",
      Label::Fabric => "fabricid",
      Label::Health => "healthid",
      Label::Status => "statusid",
      Label::EntityType => "entitytypeid",
    }
  }
}

impl fmt::Display for Label {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    self.table().fmt(f)
  }
}
