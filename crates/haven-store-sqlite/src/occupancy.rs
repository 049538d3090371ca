//! The occupancy assignment rule, as synchronous transactions.
//!
//! Each public function here is one resident transition. It opens a
//! transaction, performs every write the transition needs (resident row, bed
//! flags, lifecycle event) and commits. Any early return drops the
//! transaction and rolls everything back, so a failed transition never leaves
//! a resident pointing at a bed that is not marked as theirs.
//!
//! Bed claims are conditional (`... AND is_occupied = 0`); two transitions
//! racing for the same bed cannot both succeed.

use chrono::{DateTime, Utc};
use haven_core::{
  event::{EventDetail, NewEvent, ResidentEvent},
  housing::Placement,
  resident::{
    Admission, Discharge, LevelOfCare, Readmission, Resident, ResidentStatus,
    Transfer,
  },
};
use rusqlite::{Connection, OptionalExtension as _, Transaction, params};
use uuid::Uuid;

use crate::{
  Error, Result,
  encode::{
    RESIDENT_COLUMNS, RawResident, decode_uuid, encode_date, encode_dt,
    encode_uuid,
  },
};

// ─── Building blocks ─────────────────────────────────────────────────────────

pub(crate) fn load_resident(conn: &Connection, id: Uuid) -> Result<Resident> {
  conn
    .query_row(
      &format!("SELECT {RESIDENT_COLUMNS} FROM residents WHERE resident_id = ?1"),
      params![encode_uuid(id)],
      RawResident::from_row,
    )
    .optional()?
    .ok_or(Error::ResidentNotFound(id))?
    .into_resident()
}

/// Fail unless the bed exists, sits in the named room, and the room sits in
/// the named house.
fn check_placement(tx: &Transaction<'_>, placement: &Placement) -> Result<()> {
  let found: Option<(String, String)> = tx
    .query_row(
      "SELECT r.room_id, r.house_id
       FROM beds b JOIN rooms r ON r.room_id = b.room_id
       WHERE b.bed_id = ?1",
      params![encode_uuid(placement.bed_id)],
      |row| Ok((row.get(0)?, row.get(1)?)),
    )
    .optional()?;

  let (room_id, house_id) = found.ok_or(Error::BedNotFound(placement.bed_id))?;
  if decode_uuid(&room_id)? != placement.room_id
    || decode_uuid(&house_id)? != placement.house_id
  {
    return Err(Error::HousingMismatch {
      house_id: placement.house_id,
      room_id:  placement.room_id,
      bed_id:   placement.bed_id,
    });
  }
  Ok(())
}

/// Mark `bed_id` occupied by `resident_id`, but only if it is free right now.
fn claim_bed(tx: &Transaction<'_>, bed_id: Uuid, resident_id: Uuid) -> Result<()> {
  let changed = tx.execute(
    "UPDATE beds SET is_occupied = 1, occupied_by = ?1
     WHERE bed_id = ?2 AND is_occupied = 0",
    params![encode_uuid(resident_id), encode_uuid(bed_id)],
  )?;
  if changed == 0 {
    return Err(Error::BedOccupied(bed_id));
  }
  Ok(())
}

/// Free every bed held by `resident_id`. Releasing by holder rather than by
/// the resident's `bed_id` never frees a bed someone else holds.
fn release_beds_of(tx: &Transaction<'_>, resident_id: Uuid) -> Result<usize> {
  Ok(tx.execute(
    "UPDATE beds SET is_occupied = 0, occupied_by = NULL WHERE occupied_by = ?1",
    params![encode_uuid(resident_id)],
  )?)
}

fn insert_event(tx: &Transaction<'_>, event: &ResidentEvent) -> Result<()> {
  let detail_json = event.detail.to_json()?.to_string();
  let details_json = event
    .details
    .as_ref()
    .map(serde_json::to_string)
    .transpose()?;

  tx.execute(
    "INSERT INTO resident_events (
       event_id, resident_id, house_id, event_type, detail_json,
       notes, details_json, recorded_by, occurred_at
     ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
    params![
      encode_uuid(event.event_id),
      encode_uuid(event.resident_id),
      event.house_id.map(encode_uuid),
      event.detail.kind().as_ref(),
      detail_json,
      event.notes,
      details_json,
      event.recorded_by.map(encode_uuid),
      encode_dt(event.occurred_at),
    ],
  )?;
  Ok(())
}

fn new_event(
  resident_id: Uuid,
  house_id: Option<Uuid>,
  detail: EventDetail,
  notes: Option<String>,
  now: DateTime<Utc>,
) -> ResidentEvent {
  ResidentEvent {
    event_id: Uuid::new_v4(),
    resident_id,
    house_id,
    occurred_at: now,
    detail,
    notes,
    details: None,
    recorded_by: None,
  }
}

/// Append a non-lifecycle event, stamped with the resident's current house.
pub(crate) fn record_event(
  conn: &mut Connection,
  input: NewEvent,
  now: DateTime<Utc>,
) -> Result<ResidentEvent> {
  let kind = input.detail.kind();
  if kind.is_lifecycle() {
    return Err(Error::LifecycleEvent(kind));
  }

  let tx = conn.transaction()?;
  let resident = load_resident(&tx, input.resident_id)?;
  let mut event = new_event(
    input.resident_id,
    resident.house_id,
    input.detail,
    input.notes,
    now,
  );
  event.details = input.details;
  event.recorded_by = input.recorded_by;
  insert_event(&tx, &event)?;
  tx.commit()?;
  Ok(event)
}

// ─── Transitions ─────────────────────────────────────────────────────────────

pub(crate) fn admit(
  conn: &mut Connection,
  admission: Admission,
  now: DateTime<Utc>,
) -> Result<Resident> {
  let Admission { profile, level_of_care, admission_date, placement, notes } =
    admission;

  let resident = Resident {
    resident_id: Uuid::new_v4(),
    profile,
    status: ResidentStatus::Active,
    level_of_care,
    admission_date,
    discharge_date: None,
    house_id: Some(placement.house_id),
    room_id: Some(placement.room_id),
    bed_id: Some(placement.bed_id),
    is_active: true,
    admitted_at: Some(now),
    discharged_at: None,
    created_at: now,
  };

  let tx = conn.transaction()?;
  check_placement(&tx, &placement)?;
  claim_bed(&tx, placement.bed_id, resident.resident_id)?;

  let p = &resident.profile;
  tx.execute(
    &format!(
      "INSERT INTO residents ({RESIDENT_COLUMNS})
       VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10,
               ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20)"
    ),
    params![
      encode_uuid(resident.resident_id),
      p.first_name,
      p.last_name,
      p.date_of_birth.map(encode_date),
      p.gender,
      p.phone,
      p.email,
      p.emergency_contact_name,
      p.emergency_contact_phone,
      resident.status.as_ref(),
      resident.level_of_care.as_ref(),
      encode_date(resident.admission_date),
      Option::<String>::None,
      encode_uuid(placement.house_id),
      encode_uuid(placement.room_id),
      encode_uuid(placement.bed_id),
      resident.is_active,
      encode_dt(now),
      Option::<String>::None,
      encode_dt(now),
    ],
  )?;

  insert_event(
    &tx,
    &new_event(
      resident.resident_id,
      Some(placement.house_id),
      EventDetail::Admission {
        house_id:    placement.house_id,
        room_id:     placement.room_id,
        bed_id:      placement.bed_id,
        readmission: false,
      },
      notes,
      now,
    ),
  )?;

  tx.commit()?;
  Ok(resident)
}

pub(crate) fn discharge(
  conn: &mut Connection,
  discharge: Discharge,
  now: DateTime<Utc>,
) -> Result<(Resident, ResidentEvent)> {
  let tx = conn.transaction()?;
  let resident = load_resident(&tx, discharge.resident_id)?;
  if resident.status != ResidentStatus::Active {
    return Err(Error::NotActive(resident.resident_id));
  }

  let event = new_event(
    resident.resident_id,
    resident.house_id,
    EventDetail::Discharge {
      reason:           discharge.reason,
      discharge_type:   discharge.discharge_type,
      contact_verified: discharge.contact_verified,
    },
    discharge.notes,
    now,
  );
  insert_event(&tx, &event)?;

  tx.execute(
    "UPDATE residents
     SET status = ?1, is_active = 0, discharge_date = ?2, discharged_at = ?3
     WHERE resident_id = ?4",
    params![
      ResidentStatus::Discharged.as_ref(),
      encode_date(now.date_naive()),
      encode_dt(now),
      encode_uuid(resident.resident_id),
    ],
  )?;
  release_beds_of(&tx, resident.resident_id)?;

  let updated = load_resident(&tx, resident.resident_id)?;
  tx.commit()?;
  Ok((updated, event))
}

pub(crate) fn readmit(
  conn: &mut Connection,
  readmission: Readmission,
  now: DateTime<Utc>,
) -> Result<Resident> {
  let Readmission { resident_id, admission_date, placement, notes } = readmission;

  let tx = conn.transaction()?;
  let resident = load_resident(&tx, resident_id)?;
  if resident.status == ResidentStatus::Active {
    return Err(Error::AlreadyActive(resident_id));
  }
  check_placement(&tx, &placement)?;

  // Release the old bed, update the resident, then occupy the new bed.
  release_beds_of(&tx, resident_id)?;
  tx.execute(
    "UPDATE residents
     SET status = ?1, level_of_care = ?2, admission_date = ?3,
         discharge_date = NULL, house_id = ?4, room_id = ?5, bed_id = ?6,
         is_active = 1, admitted_at = ?7, discharged_at = NULL
     WHERE resident_id = ?8",
    params![
      ResidentStatus::Active.as_ref(),
      LevelOfCare::Active.as_ref(),
      encode_date(admission_date),
      encode_uuid(placement.house_id),
      encode_uuid(placement.room_id),
      encode_uuid(placement.bed_id),
      encode_dt(now),
      encode_uuid(resident_id),
    ],
  )?;
  claim_bed(&tx, placement.bed_id, resident_id)?;

  insert_event(
    &tx,
    &new_event(
      resident_id,
      Some(placement.house_id),
      EventDetail::Admission {
        house_id:    placement.house_id,
        room_id:     placement.room_id,
        bed_id:      placement.bed_id,
        readmission: true,
      },
      notes,
      now,
    ),
  )?;

  let updated = load_resident(&tx, resident_id)?;
  tx.commit()?;
  Ok(updated)
}

pub(crate) fn transfer(
  conn: &mut Connection,
  transfer: Transfer,
  now: DateTime<Utc>,
) -> Result<(Resident, ResidentEvent)> {
  let Transfer { resident_id, placement, notes } = transfer;

  let tx = conn.transaction()?;
  let resident = load_resident(&tx, resident_id)?;
  if resident.status != ResidentStatus::Active {
    return Err(Error::NotActive(resident_id));
  }
  check_placement(&tx, &placement)?;

  release_beds_of(&tx, resident_id)?;
  tx.execute(
    "UPDATE residents SET house_id = ?1, room_id = ?2, bed_id = ?3
     WHERE resident_id = ?4",
    params![
      encode_uuid(placement.house_id),
      encode_uuid(placement.room_id),
      encode_uuid(placement.bed_id),
      encode_uuid(resident_id),
    ],
  )?;
  claim_bed(&tx, placement.bed_id, resident_id)?;

  let event = new_event(
    resident_id,
    Some(placement.house_id),
    EventDetail::HousingChange {
      from_bed: resident.bed_id,
      to_bed:   placement.bed_id,
    },
    notes,
    now,
  );
  insert_event(&tx, &event)?;

  let updated = load_resident(&tx, resident_id)?;
  tx.commit()?;
  Ok((updated, event))
}

pub(crate) fn change_level_of_care(
  conn: &mut Connection,
  resident_id: Uuid,
  level: LevelOfCare,
  notes: Option<String>,
  now: DateTime<Utc>,
) -> Result<(Resident, ResidentEvent)> {
  let tx = conn.transaction()?;
  let resident = load_resident(&tx, resident_id)?;

  tx.execute(
    "UPDATE residents SET level_of_care = ?1 WHERE resident_id = ?2",
    params![level.as_ref(), encode_uuid(resident_id)],
  )?;

  let event = new_event(
    resident_id,
    resident.house_id,
    EventDetail::LevelChange { from: resident.level_of_care, to: level },
    notes,
    now,
  );
  insert_event(&tx, &event)?;

  let updated = load_resident(&tx, resident_id)?;
  tx.commit()?;
  Ok((updated, event))
}

pub(crate) fn delete_resident(conn: &mut Connection, id: Uuid) -> Result<Resident> {
  let tx = conn.transaction()?;
  let resident = load_resident(&tx, id)?;

  release_beds_of(&tx, id)?;
  tx.execute(
    "DELETE FROM residents WHERE resident_id = ?1",
    params![encode_uuid(id)],
  )?;

  tx.commit()?;
  Ok(resident)
}
