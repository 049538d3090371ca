//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as fixed-width RFC 3339 strings (microseconds, `Z`)
//! so that lexical order equals chronological order. Calendar dates are
//! `YYYY-MM-DD`. Enums are stored by their display name. UUIDs are stored as
//! hyphenated lowercase strings.

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use haven_core::{
  audit::AuditEntry,
  event::{EventDetail, ResidentEvent},
  housing::{Bed, House, Room},
  note::Note,
  resident::{Resident, ResidentProfile},
  staff::Staff,
};
use rusqlite::Row;
use uuid::Uuid;

use crate::{Error, Result};

// ─── Scalars ─────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

pub fn decode_opt_uuid(s: Option<String>) -> Result<Option<Uuid>> {
  s.as_deref().map(decode_uuid).transpose()
}

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::Decode(format!("timestamp {s:?}: {e}")))
}

pub fn decode_opt_dt(s: Option<String>) -> Result<Option<DateTime<Utc>>> {
  s.as_deref().map(decode_dt).transpose()
}

pub fn encode_date(d: NaiveDate) -> String { d.format("%Y-%m-%d").to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, "%Y-%m-%d")
    .map_err(|e| Error::Decode(format!("date {s:?}: {e}")))
}

pub fn decode_opt_date(s: Option<String>) -> Result<Option<NaiveDate>> {
  s.as_deref().map(decode_date).transpose()
}

/// Parse an enum stored by its display name.
pub fn decode_enum<T: FromStr>(s: &str, what: &str) -> Result<T> {
  s.parse()
    .map_err(|_| Error::Decode(format!("unknown {what}: {s:?}")))
}

// ─── Houses, rooms, beds ─────────────────────────────────────────────────────

pub const HOUSE_COLUMNS: &str = "house_id, name, gender, address, created_at";

pub struct RawHouse {
  pub house_id:   String,
  pub name:       String,
  pub gender:     String,
  pub address:    Option<String>,
  pub created_at: String,
}

impl RawHouse {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      house_id:   row.get(0)?,
      name:       row.get(1)?,
      gender:     row.get(2)?,
      address:    row.get(3)?,
      created_at: row.get(4)?,
    })
  }

  pub fn into_house(self) -> Result<House> {
    Ok(House {
      house_id:   decode_uuid(&self.house_id)?,
      name:       self.name,
      gender:     decode_enum(&self.gender, "house gender")?,
      address:    self.address,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

pub const ROOM_COLUMNS: &str = "room_id, house_id, label, capacity, created_at";

pub struct RawRoom {
  pub room_id:    String,
  pub house_id:   String,
  pub label:      String,
  pub capacity:   u32,
  pub created_at: String,
}

impl RawRoom {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      room_id:    row.get(0)?,
      house_id:   row.get(1)?,
      label:      row.get(2)?,
      capacity:   row.get(3)?,
      created_at: row.get(4)?,
    })
  }

  pub fn into_room(self) -> Result<Room> {
    Ok(Room {
      room_id:    decode_uuid(&self.room_id)?,
      house_id:   decode_uuid(&self.house_id)?,
      label:      self.label,
      capacity:   self.capacity,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

pub const BED_COLUMNS: &str =
  "b.bed_id, b.room_id, b.label, b.is_occupied, b.occupied_by, b.created_at";

pub struct RawBed {
  pub bed_id:      String,
  pub room_id:     String,
  pub label:       String,
  pub is_occupied: bool,
  pub occupied_by: Option<String>,
  pub created_at:  String,
}

impl RawBed {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      bed_id:      row.get(0)?,
      room_id:     row.get(1)?,
      label:       row.get(2)?,
      is_occupied: row.get(3)?,
      occupied_by: row.get(4)?,
      created_at:  row.get(5)?,
    })
  }

  pub fn into_bed(self) -> Result<Bed> {
    Ok(Bed {
      bed_id:      decode_uuid(&self.bed_id)?,
      room_id:     decode_uuid(&self.room_id)?,
      label:       self.label,
      is_occupied: self.is_occupied,
      occupied_by: decode_opt_uuid(self.occupied_by)?,
      created_at:  decode_dt(&self.created_at)?,
    })
  }
}

// ─── Residents ───────────────────────────────────────────────────────────────

pub const RESIDENT_COLUMNS: &str = "resident_id, first_name, last_name, \
   date_of_birth, gender, phone, email, emergency_contact_name, \
   emergency_contact_phone, status, level_of_care, admission_date, \
   discharge_date, house_id, room_id, bed_id, is_active, admitted_at, \
   discharged_at, created_at";

/// Raw strings read directly from a `residents` row.
pub struct RawResident {
  pub resident_id:             String,
  pub first_name:              String,
  pub last_name:               String,
  pub date_of_birth:           Option<String>,
  pub gender:                  Option<String>,
  pub phone:                   Option<String>,
  pub email:                   Option<String>,
  pub emergency_contact_name:  Option<String>,
  pub emergency_contact_phone: Option<String>,
  pub status:                  String,
  pub level_of_care:           String,
  pub admission_date:          String,
  pub discharge_date:          Option<String>,
  pub house_id:                Option<String>,
  pub room_id:                 Option<String>,
  pub bed_id:                  Option<String>,
  pub is_active:               bool,
  pub admitted_at:             Option<String>,
  pub discharged_at:           Option<String>,
  pub created_at:              String,
}

impl RawResident {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      resident_id:             row.get(0)?,
      first_name:              row.get(1)?,
      last_name:               row.get(2)?,
      date_of_birth:           row.get(3)?,
      gender:                  row.get(4)?,
      phone:                   row.get(5)?,
      email:                   row.get(6)?,
      emergency_contact_name:  row.get(7)?,
      emergency_contact_phone: row.get(8)?,
      status:                  row.get(9)?,
      level_of_care:           row.get(10)?,
      admission_date:          row.get(11)?,
      discharge_date:          row.get(12)?,
      house_id:                row.get(13)?,
      room_id:                 row.get(14)?,
      bed_id:                  row.get(15)?,
      is_active:               row.get(16)?,
      admitted_at:             row.get(17)?,
      discharged_at:           row.get(18)?,
      created_at:              row.get(19)?,
    })
  }

  pub fn into_resident(self) -> Result<Resident> {
    Ok(Resident {
      resident_id:    decode_uuid(&self.resident_id)?,
      profile:        ResidentProfile {
        first_name:              self.first_name,
        last_name:               self.last_name,
        date_of_birth:           decode_opt_date(self.date_of_birth)?,
        gender:                  self.gender,
        phone:                   self.phone,
        email:                   self.email,
        emergency_contact_name:  self.emergency_contact_name,
        emergency_contact_phone: self.emergency_contact_phone,
      },
      status:         decode_enum(&self.status, "resident status")?,
      level_of_care:  decode_enum(&self.level_of_care, "level of care")?,
      admission_date: decode_date(&self.admission_date)?,
      discharge_date: decode_opt_date(self.discharge_date)?,
      house_id:       decode_opt_uuid(self.house_id)?,
      room_id:        decode_opt_uuid(self.room_id)?,
      bed_id:         decode_opt_uuid(self.bed_id)?,
      is_active:      self.is_active,
      admitted_at:    decode_opt_dt(self.admitted_at)?,
      discharged_at:  decode_opt_dt(self.discharged_at)?,
      created_at:     decode_dt(&self.created_at)?,
    })
  }
}

// ─── Events ──────────────────────────────────────────────────────────────────

pub const EVENT_COLUMNS: &str = "event_id, resident_id, house_id, event_type, \
   detail_json, notes, details_json, recorded_by, occurred_at";

pub struct RawEvent {
  pub event_id:     String,
  pub resident_id:  String,
  pub house_id:     Option<String>,
  pub event_type:   String,
  pub detail_json:  String,
  pub notes:        Option<String>,
  pub details_json: Option<String>,
  pub recorded_by:  Option<String>,
  pub occurred_at:  String,
}

impl RawEvent {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      event_id:     row.get(0)?,
      resident_id:  row.get(1)?,
      house_id:     row.get(2)?,
      event_type:   row.get(3)?,
      detail_json:  row.get(4)?,
      notes:        row.get(5)?,
      details_json: row.get(6)?,
      recorded_by:  row.get(7)?,
      occurred_at:  row.get(8)?,
    })
  }

  pub fn into_event(self) -> Result<ResidentEvent> {
    let data: serde_json::Value = serde_json::from_str(&self.detail_json)?;
    let details = self
      .details_json
      .as_deref()
      .map(serde_json::from_str)
      .transpose()?;

    Ok(ResidentEvent {
      event_id: decode_uuid(&self.event_id)?,
      resident_id: decode_uuid(&self.resident_id)?,
      house_id: decode_opt_uuid(self.house_id)?,
      occurred_at: decode_dt(&self.occurred_at)?,
      detail: EventDetail::from_parts(&self.event_type, data)?,
      notes: self.notes,
      details,
      recorded_by: decode_opt_uuid(self.recorded_by)?,
    })
  }
}

// ─── Staff ───────────────────────────────────────────────────────────────────

pub const STAFF_COLUMNS: &str =
  "staff_id, name, role, email, pin_hash, house_id, created_at";

pub struct RawStaff {
  pub staff_id:   String,
  pub name:       String,
  pub role:       String,
  pub email:      String,
  pub pin_hash:   Option<String>,
  pub house_id:   Option<String>,
  pub created_at: String,
}

impl RawStaff {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      staff_id:   row.get(0)?,
      name:       row.get(1)?,
      role:       row.get(2)?,
      email:      row.get(3)?,
      pin_hash:   row.get(4)?,
      house_id:   row.get(5)?,
      created_at: row.get(6)?,
    })
  }

  pub fn into_staff(self) -> Result<Staff> {
    Ok(Staff {
      staff_id:   decode_uuid(&self.staff_id)?,
      name:       self.name,
      role:       decode_enum(&self.role, "staff role")?,
      email:      self.email,
      pin_hash:   self.pin_hash,
      house_id:   decode_opt_uuid(self.house_id)?,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

// ─── Notes ───────────────────────────────────────────────────────────────────

pub const NOTE_COLUMNS: &str =
  "note_id, kind, house_id, resident_id, shift, body, submitted_by, created_at";

pub struct RawNote {
  pub note_id:      String,
  pub kind:         String,
  pub house_id:     String,
  pub resident_id:  Option<String>,
  pub shift:        String,
  pub body:         String,
  pub submitted_by: Option<String>,
  pub created_at:   String,
}

impl RawNote {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      note_id:      row.get(0)?,
      kind:         row.get(1)?,
      house_id:     row.get(2)?,
      resident_id:  row.get(3)?,
      shift:        row.get(4)?,
      body:         row.get(5)?,
      submitted_by: row.get(6)?,
      created_at:   row.get(7)?,
    })
  }

  pub fn into_note(self) -> Result<Note> {
    Ok(Note {
      note_id:      decode_uuid(&self.note_id)?,
      kind:         decode_enum(&self.kind, "note kind")?,
      house_id:     decode_uuid(&self.house_id)?,
      resident_id:  decode_opt_uuid(self.resident_id)?,
      shift:        self.shift,
      body:         self.body,
      submitted_by: decode_opt_uuid(self.submitted_by)?,
      created_at:   decode_dt(&self.created_at)?,
    })
  }
}

// ─── Audit ───────────────────────────────────────────────────────────────────

pub const AUDIT_COLUMNS: &str =
  "audit_id, action, details_json, staff_id, recorded_at";

pub struct RawAudit {
  pub audit_id:     String,
  pub action:       String,
  pub details_json: String,
  pub staff_id:     Option<String>,
  pub recorded_at:  String,
}

impl RawAudit {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      audit_id:     row.get(0)?,
      action:       row.get(1)?,
      details_json: row.get(2)?,
      staff_id:     row.get(3)?,
      recorded_at:  row.get(4)?,
    })
  }

  pub fn into_entry(self) -> Result<AuditEntry> {
    Ok(AuditEntry {
      audit_id:    decode_uuid(&self.audit_id)?,
      action:      self.action,
      details:     serde_json::from_str(&self.details_json)?,
      staff_id:    decode_opt_uuid(self.staff_id)?,
      recorded_at: decode_dt(&self.recorded_at)?,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::TimeZone;

  #[test]
  fn timestamps_sort_lexically() {
    let early = Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap();
    let late = early + chrono::Duration::milliseconds(1500);
    assert!(encode_dt(early) < encode_dt(late));
    assert_eq!(encode_dt(early), "2026-01-02T03:04:05.000000Z");
    assert_eq!(decode_dt(&encode_dt(late)).unwrap(), late);
  }

  #[test]
  fn unknown_enum_is_a_decode_error() {
    let err = decode_enum::<haven_core::staff::StaffRole>("Janitor", "staff role")
      .unwrap_err();
    assert!(matches!(err, Error::Decode(_)));
  }
}
