//! Error types for `haven-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// A required input was absent or blank. Raised before any write.
  #[error("missing required field: {0}")]
  MissingField(&'static str),

  #[error("forbidden: {0}")]
  Forbidden(String),

  /// A non-admin staff member tried to write a house-scoped record without
  /// being assigned to a house.
  #[error("staff member has no assigned house")]
  NoAssignedHouse,

  /// The authenticated identity matched no staff record and unprovisioned
  /// callers are configured to be rejected.
  #[error("no staff record for {0:?}")]
  UnknownStaff(String),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
