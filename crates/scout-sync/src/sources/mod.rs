//! Concrete [`Source`](scout_core::source::Source) implementations.

mod customers;
mod sannav;
mod topology;

pub use customers::CustomerCsv;
pub use sannav::{SanNavClient, SanNavConfig, extract_switchports};
pub use topology::TopologyFile;

/// Wrap any failure as a core `SourceFetch` error for `source_name`.
pub(crate) fn fetch_error(source_name: &str, reason: impl std::fmt::Display) -> scout_core::Error {
  scout_core::Error::SourceFetch {
    source_name: source_name.to_owned(),
    reason:      reason.to_string(),
  }
}
