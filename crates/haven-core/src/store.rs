//! The `HousingStore` trait.
//!
//! Implemented by storage backends (e.g. `haven-store-sqlite`). Higher layers
//! (`haven-api`, `haven-server`) depend on this abstraction, not on any
//! concrete backend.
//!
//! Every resident transition that touches a bed (admit, discharge, re-admit,
//! transfer, delete) is a single atomic operation on the store: either the
//! resident row, the bed flags and the lifecycle event all change, or none of
//! them do. A bed claim only succeeds if the bed is free at the moment of the
//! write.

use std::future::Future;

use uuid::Uuid;

use crate::{
  audit::{AuditEntry, NewAuditEntry},
  event::{EventQuery, NewEvent, ResidentEvent},
  housing::{
    Bed, House, HouseCensus, NewBed, NewHouse, NewRoom, OccupancyIssue, Room,
    RoomOccupancy,
  },
  note::{NewNote, Note, NoteQuery},
  resident::{
    Admission, Discharge, LevelOfCare, Readmission, Resident, ResidentStatus,
    Transfer,
  },
  staff::{NewStaff, Staff},
};

// ─── Error classification ────────────────────────────────────────────────────

/// Coarse classification of a store rejection, used by transports to choose
/// a status code without knowing the backend's error type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreErrorKind {
  /// A referenced row does not exist.
  NotFound,
  /// The write conflicts with current state (bed taken, resident already
  /// discharged, ...).
  Conflict,
  /// The input is well-formed but inconsistent (bed not in the named room,
  /// validation failure).
  Invalid,
  /// Anything else: I/O, corruption, decoding.
  Internal,
}

pub trait StoreError: std::error::Error + Send + Sync + 'static {
  fn kind(&self) -> StoreErrorKind;
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a Haven storage backend.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait HousingStore: Send + Sync {
  type Error: StoreError;

  // ── Houses, rooms, beds ───────────────────────────────────────────────

  fn add_house(
    &self,
    input: NewHouse,
  ) -> impl Future<Output = Result<House, Self::Error>> + Send + '_;

  fn get_house(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<House>, Self::Error>> + Send + '_;

  fn list_houses(
    &self,
  ) -> impl Future<Output = Result<Vec<House>, Self::Error>> + Send + '_;

  /// Returns an error if the house does not exist.
  fn add_room(
    &self,
    input: NewRoom,
  ) -> impl Future<Output = Result<Room, Self::Error>> + Send + '_;

  fn list_rooms(
    &self,
    house_id: Option<Uuid>,
  ) -> impl Future<Output = Result<Vec<Room>, Self::Error>> + Send + '_;

  /// New beds start unoccupied. Returns an error if the room does not exist.
  fn add_bed(
    &self,
    input: NewBed,
  ) -> impl Future<Output = Result<Bed, Self::Error>> + Send + '_;

  fn get_bed(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Bed>, Self::Error>> + Send + '_;

  fn list_beds(
    &self,
    room_id: Option<Uuid>,
  ) -> impl Future<Output = Result<Vec<Bed>, Self::Error>> + Send + '_;

  /// Beds with `is_occupied = false`, optionally restricted to one house.
  /// There is no reservation: a bed listed here can be taken by another
  /// caller before it is claimed.
  fn available_beds(
    &self,
    house_id: Option<Uuid>,
  ) -> impl Future<Output = Result<Vec<Bed>, Self::Error>> + Send + '_;

  // ── Occupancy read models ─────────────────────────────────────────────

  fn room_occupancy(
    &self,
    house_id: Option<Uuid>,
  ) -> impl Future<Output = Result<Vec<RoomOccupancy>, Self::Error>> + Send + '_;

  fn census(
    &self,
  ) -> impl Future<Output = Result<Vec<HouseCensus>, Self::Error>> + Send + '_;

  /// Compare the `beds` table against the residents that claim them and
  /// report every disagreement. Read-only.
  fn reconcile_occupancy(
    &self,
  ) -> impl Future<Output = Result<Vec<OccupancyIssue>, Self::Error>> + Send + '_;

  // ── Resident transitions ──────────────────────────────────────────────

  /// Create an active resident bound to the admission's bed and mark the bed
  /// occupied. Fails without writing if the bed is taken or does not belong
  /// to the named room and house.
  fn admit(
    &self,
    admission: Admission,
  ) -> impl Future<Output = Result<Resident, Self::Error>> + Send + '_;

  /// Record a discharge event, mark the resident discharged and release any
  /// bed they hold. The resident must currently be active.
  fn discharge(
    &self,
    discharge: Discharge,
  ) -> impl Future<Output = Result<(Resident, ResidentEvent), Self::Error>>
  + Send
  + '_;

  /// Release the resident's old bed (if any), reactivate them into the new
  /// placement with level of care reset to `Active`, and claim the new bed.
  /// The resident must not currently be active.
  fn readmit(
    &self,
    readmission: Readmission,
  ) -> impl Future<Output = Result<Resident, Self::Error>> + Send + '_;

  /// Move an active resident to a different bed.
  fn transfer(
    &self,
    transfer: Transfer,
  ) -> impl Future<Output = Result<(Resident, ResidentEvent), Self::Error>>
  + Send
  + '_;

  fn change_level_of_care(
    &self,
    resident_id: Uuid,
    level: LevelOfCare,
    notes: Option<String>,
  ) -> impl Future<Output = Result<(Resident, ResidentEvent), Self::Error>>
  + Send
  + '_;

  /// Release any bed the resident holds and delete the resident row. The
  /// resident's events are kept. Returns the deleted resident.
  fn delete_resident(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Resident, Self::Error>> + Send + '_;

  fn get_resident(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Resident>, Self::Error>> + Send + '_;

  fn list_residents(
    &self,
    status: Option<ResidentStatus>,
  ) -> impl Future<Output = Result<Vec<Resident>, Self::Error>> + Send + '_;

  // ── Events ────────────────────────────────────────────────────────────

  /// Append a non-lifecycle event (shift note, UA, BAC). The event's house is
  /// the resident's current house.
  fn record_event(
    &self,
    input: NewEvent,
  ) -> impl Future<Output = Result<ResidentEvent, Self::Error>> + Send + '_;

  /// Events newest first.
  fn list_events(
    &self,
    query: EventQuery,
  ) -> impl Future<Output = Result<Vec<ResidentEvent>, Self::Error>> + Send + '_;

  // ── Staff ─────────────────────────────────────────────────────────────

  fn add_staff(
    &self,
    input: NewStaff,
  ) -> impl Future<Output = Result<Staff, Self::Error>> + Send + '_;

  fn get_staff(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Staff>, Self::Error>> + Send + '_;

  /// Case-insensitive lookup by email address.
  fn find_staff_by_email(
    &self,
    email: String,
  ) -> impl Future<Output = Result<Option<Staff>, Self::Error>> + Send + '_;

  fn list_staff(
    &self,
  ) -> impl Future<Output = Result<Vec<Staff>, Self::Error>> + Send + '_;

  /// Staff members with a PIN hash set.
  fn list_staff_with_pin(
    &self,
  ) -> impl Future<Output = Result<Vec<Staff>, Self::Error>> + Send + '_;

  fn assign_house(
    &self,
    staff_id: Uuid,
    house_id: Option<Uuid>,
  ) -> impl Future<Output = Result<Staff, Self::Error>> + Send + '_;

  /// Store (or clear) an already-hashed PIN.
  fn set_pin_hash(
    &self,
    staff_id: Uuid,
    pin_hash: Option<String>,
  ) -> impl Future<Output = Result<Staff, Self::Error>> + Send + '_;

  // ── Notes ─────────────────────────────────────────────────────────────

  fn add_note(
    &self,
    input: NewNote,
  ) -> impl Future<Output = Result<Note, Self::Error>> + Send + '_;

  /// Notes newest first, filtered by the query's house scope and window.
  fn list_notes(
    &self,
    query: NoteQuery,
  ) -> impl Future<Output = Result<Vec<Note>, Self::Error>> + Send + '_;

  // ── Audit ─────────────────────────────────────────────────────────────

  fn append_audit(
    &self,
    input: NewAuditEntry,
  ) -> impl Future<Output = Result<AuditEntry, Self::Error>> + Send + '_;

  /// Most recent entries first.
  fn list_audit(
    &self,
    limit: usize,
  ) -> impl Future<Output = Result<Vec<AuditEntry>, Self::Error>> + Send + '_;
}
