//! Error type for `haven-store-sqlite`.

use haven_core::{
  event::EventKind,
  store::{StoreError, StoreErrorKind},
};
use rusqlite::ErrorCode;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] haven_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("sqlite error: {0}")]
  Sqlite(#[from] rusqlite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  /// A stored column held a value the domain types do not recognise.
  #[error("decode error: {0}")]
  Decode(String),

  #[error("house not found: {0}")]
  HouseNotFound(Uuid),

  #[error("room not found: {0}")]
  RoomNotFound(Uuid),

  #[error("bed not found: {0}")]
  BedNotFound(Uuid),

  #[error("resident not found: {0}")]
  ResidentNotFound(Uuid),

  #[error("staff member not found: {0}")]
  StaffNotFound(Uuid),

  /// The conditional claim found the bed already occupied.
  #[error("bed {0} is already occupied")]
  BedOccupied(Uuid),

  /// The bed does not belong to the named room, or the room to the named
  /// house.
  #[error("bed {bed_id} is not in room {room_id} of house {house_id}")]
  HousingMismatch {
    house_id: Uuid,
    room_id:  Uuid,
    bed_id:   Uuid,
  },

  #[error("resident {0} is not active")]
  NotActive(Uuid),

  #[error("resident {0} is already active")]
  AlreadyActive(Uuid),

  /// Lifecycle events are only written by the transitions that own them.
  #[error("{0} events cannot be recorded directly")]
  LifecycleEvent(EventKind),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

fn is_constraint_violation(err: &rusqlite::Error) -> bool {
  matches!(
    err,
    rusqlite::Error::SqliteFailure(e, _) if e.code == ErrorCode::ConstraintViolation
  )
}

impl StoreError for Error {
  fn kind(&self) -> StoreErrorKind {
    match self {
      Self::HouseNotFound(_)
      | Self::RoomNotFound(_)
      | Self::BedNotFound(_)
      | Self::ResidentNotFound(_)
      | Self::StaffNotFound(_) => StoreErrorKind::NotFound,
      Self::BedOccupied(_) | Self::NotActive(_) | Self::AlreadyActive(_) => {
        StoreErrorKind::Conflict
      }
      Self::HousingMismatch { .. } | Self::LifecycleEvent(_) | Self::Core(_) => {
        StoreErrorKind::Invalid
      }
      Self::Sqlite(e) if is_constraint_violation(e) => StoreErrorKind::Conflict,
      Self::Database(tokio_rusqlite::Error::Rusqlite(e))
        if is_constraint_violation(e) =>
      {
        StoreErrorKind::Conflict
      }
      Self::Database(_)
      | Self::Sqlite(_)
      | Self::Json(_)
      | Self::Uuid(_)
      | Self::Decode(_) => StoreErrorKind::Internal,
    }
  }
}
