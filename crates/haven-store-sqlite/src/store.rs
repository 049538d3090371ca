//! [`SqliteStore`], the SQLite implementation of [`HousingStore`].

use std::path::Path;

use chrono::Utc;
use haven_core::{
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
  scope::HouseScope,
  staff::{NewStaff, Staff},
  store::HousingStore,
};
use rusqlite::{OptionalExtension as _, params, params_from_iter};
use uuid::Uuid;

use crate::{
  Error, Result,
  encode::{
    AUDIT_COLUMNS, BED_COLUMNS, EVENT_COLUMNS, HOUSE_COLUMNS, NOTE_COLUMNS,
    RESIDENT_COLUMNS, ROOM_COLUMNS, RawAudit, RawBed, RawEvent, RawHouse,
    RawNote, RawResident, RawRoom, RawStaff, STAFF_COLUMNS, decode_uuid,
    encode_dt, encode_uuid,
  },
  occupancy,
  schema::SCHEMA,
};

/// SQLite `LIMIT` value meaning "no limit".
const NO_LIMIT: i64 = -1;

fn limit_param(limit: Option<usize>) -> i64 {
  limit.map_or(NO_LIMIT, |l| l as i64)
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Haven store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  pub(crate) conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn require_house(&self, id: Uuid) -> Result<()> {
    match self.get_house(id).await? {
      Some(_) => Ok(()),
      None => Err(Error::HouseNotFound(id)),
    }
  }

  async fn get_room(&self, id: Uuid) -> Result<Option<Room>> {
    let id_str = encode_uuid(id);
    let raw: Option<RawRoom> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {ROOM_COLUMNS} FROM rooms WHERE room_id = ?1"),
              params![id_str],
              RawRoom::from_row,
            )
            .optional()?,
        )
      })
      .await?;
    raw.map(RawRoom::into_room).transpose()
  }

  async fn query_beds(&self, sql: String, filter: Option<String>) -> Result<Vec<Bed>> {
    let raws: Vec<RawBed> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(params![filter], RawBed::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    raws.into_iter().map(RawBed::into_bed).collect()
  }

  async fn query_staff(
    &self,
    filter: Option<&'static str>,
    param: Option<String>,
  ) -> Result<Vec<Staff>> {
    let where_clause = filter.map(|f| format!("WHERE {f}")).unwrap_or_default();
    let raws: Vec<RawStaff> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {STAFF_COLUMNS} FROM staff {where_clause} ORDER BY name"
        ))?;
        let rows = stmt
          .query_map(params_from_iter(param), RawStaff::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    raws.into_iter().map(RawStaff::into_staff).collect()
  }

  /// Run an UPDATE against one staff row and return the updated record.
  async fn update_staff(
    &self,
    staff_id: Uuid,
    sql: &'static str,
    value: Option<String>,
  ) -> Result<Staff> {
    let id_str = encode_uuid(staff_id);
    let changed = self
      .conn
      .call(move |conn| Ok(conn.execute(sql, params![value, id_str])?))
      .await?;
    if changed == 0 {
      return Err(Error::StaffNotFound(staff_id));
    }
    self
      .get_staff(staff_id)
      .await?
      .ok_or(Error::StaffNotFound(staff_id))
  }
}

// ─── HousingStore impl ───────────────────────────────────────────────────────

impl HousingStore for SqliteStore {
  type Error = Error;

  // ── Houses, rooms, beds ───────────────────────────────────────────────────

  async fn add_house(&self, input: NewHouse) -> Result<House> {
    let house = House {
      house_id:   Uuid::new_v4(),
      name:       input.name,
      gender:     input.gender,
      address:    input.address,
      created_at: Utc::now(),
    };

    let id_str     = encode_uuid(house.house_id);
    let name       = house.name.clone();
    let gender_str = house.gender.as_ref().to_owned();
    let address    = house.address.clone();
    let at_str     = encode_dt(house.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          &format!("INSERT INTO houses ({HOUSE_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5)"),
          params![id_str, name, gender_str, address, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(house)
  }

  async fn get_house(&self, id: Uuid) -> Result<Option<House>> {
    let id_str = encode_uuid(id);
    let raw: Option<RawHouse> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {HOUSE_COLUMNS} FROM houses WHERE house_id = ?1"),
              params![id_str],
              RawHouse::from_row,
            )
            .optional()?,
        )
      })
      .await?;
    raw.map(RawHouse::into_house).transpose()
  }

  async fn list_houses(&self) -> Result<Vec<House>> {
    let raws: Vec<RawHouse> = self
      .conn
      .call(|conn| {
        let mut stmt =
          conn.prepare(&format!("SELECT {HOUSE_COLUMNS} FROM houses ORDER BY name"))?;
        let rows = stmt
          .query_map([], RawHouse::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    raws.into_iter().map(RawHouse::into_house).collect()
  }

  async fn add_room(&self, input: NewRoom) -> Result<Room> {
    self.require_house(input.house_id).await?;

    let room = Room {
      room_id:    Uuid::new_v4(),
      house_id:   input.house_id,
      label:      input.label,
      capacity:   input.capacity,
      created_at: Utc::now(),
    };

    let id_str    = encode_uuid(room.room_id);
    let house_str = encode_uuid(room.house_id);
    let label     = room.label.clone();
    let capacity  = room.capacity;
    let at_str    = encode_dt(room.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          &format!("INSERT INTO rooms ({ROOM_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5)"),
          params![id_str, house_str, label, capacity, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(room)
  }

  async fn list_rooms(&self, house_id: Option<Uuid>) -> Result<Vec<Room>> {
    let house_str = house_id.map(encode_uuid);
    let raws: Vec<RawRoom> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {ROOM_COLUMNS} FROM rooms
           WHERE (?1 IS NULL OR house_id = ?1)
           ORDER BY label"
        ))?;
        let rows = stmt
          .query_map(params![house_str], RawRoom::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    raws.into_iter().map(RawRoom::into_room).collect()
  }

  async fn add_bed(&self, input: NewBed) -> Result<Bed> {
    if self.get_room(input.room_id).await?.is_none() {
      return Err(Error::RoomNotFound(input.room_id));
    }

    let bed = Bed {
      bed_id:      Uuid::new_v4(),
      room_id:     input.room_id,
      label:       input.label,
      is_occupied: false,
      occupied_by: None,
      created_at:  Utc::now(),
    };

    let id_str   = encode_uuid(bed.bed_id);
    let room_str = encode_uuid(bed.room_id);
    let label    = bed.label.clone();
    let at_str   = encode_dt(bed.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO beds (bed_id, room_id, label, is_occupied, occupied_by, created_at)
           VALUES (?1, ?2, ?3, 0, NULL, ?4)",
          params![id_str, room_str, label, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(bed)
  }

  async fn get_bed(&self, id: Uuid) -> Result<Option<Bed>> {
    let mut beds = self
      .query_beds(
        format!("SELECT {BED_COLUMNS} FROM beds b WHERE b.bed_id = ?1"),
        Some(encode_uuid(id)),
      )
      .await?;
    Ok(beds.pop())
  }

  async fn list_beds(&self, room_id: Option<Uuid>) -> Result<Vec<Bed>> {
    self
      .query_beds(
        format!(
          "SELECT {BED_COLUMNS} FROM beds b
           WHERE (?1 IS NULL OR b.room_id = ?1)
           ORDER BY b.label"
        ),
        room_id.map(encode_uuid),
      )
      .await
  }

  async fn available_beds(&self, house_id: Option<Uuid>) -> Result<Vec<Bed>> {
    self
      .query_beds(
        format!(
          "SELECT {BED_COLUMNS} FROM beds b
           JOIN rooms r ON r.room_id = b.room_id
           WHERE b.is_occupied = 0 AND (?1 IS NULL OR r.house_id = ?1)
           ORDER BY r.label, b.label"
        ),
        house_id.map(encode_uuid),
      )
      .await
  }

  // ── Occupancy read models ─────────────────────────────────────────────────

  async fn room_occupancy(&self, house_id: Option<Uuid>) -> Result<Vec<RoomOccupancy>> {
    let house_str = house_id.map(encode_uuid);

    let raws: Vec<(String, String, String, String, u32, u32, u32)> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT r.room_id, r.house_id, h.name, r.label, r.capacity,
                  COUNT(b.bed_id), COALESCE(SUM(b.is_occupied), 0)
           FROM rooms r
           JOIN houses h    ON h.house_id = r.house_id
           LEFT JOIN beds b ON b.room_id  = r.room_id
           WHERE (?1 IS NULL OR r.house_id = ?1)
           GROUP BY r.room_id
           ORDER BY h.name, r.label",
        )?;
        let rows = stmt
          .query_map(params![house_str], |row| {
            Ok((
              row.get(0)?,
              row.get(1)?,
              row.get(2)?,
              row.get(3)?,
              row.get(4)?,
              row.get(5)?,
              row.get(6)?,
            ))
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws
      .into_iter()
      .map(|(room_id, house_id, house_name, label, capacity, beds, occupied)| {
        Ok(RoomOccupancy {
          room_id: decode_uuid(&room_id)?,
          house_id: decode_uuid(&house_id)?,
          house_name,
          label,
          capacity,
          bed_count: beds,
          occupied_beds: occupied,
        })
      })
      .collect()
  }

  async fn census(&self) -> Result<Vec<HouseCensus>> {
    let raws: Vec<(String, String, u32, u32, u32)> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT h.house_id, h.name,
             (SELECT COUNT(*) FROM beds b JOIN rooms r ON r.room_id = b.room_id
               WHERE r.house_id = h.house_id),
             (SELECT COUNT(*) FROM beds b JOIN rooms r ON r.room_id = b.room_id
               WHERE r.house_id = h.house_id AND b.is_occupied = 1),
             (SELECT COUNT(*) FROM residents res
               WHERE res.house_id = h.house_id AND res.status = 'Active')
           FROM houses h
           ORDER BY h.name",
        )?;
        let rows = stmt
          .query_map([], |row| {
            Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?))
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws
      .into_iter()
      .map(|(house_id, house_name, total, occupied, active)| {
        Ok(HouseCensus {
          house_id: decode_uuid(&house_id)?,
          house_name,
          total_beds: total,
          occupied_beds: occupied,
          active_residents: active,
        })
      })
      .collect()
  }

  async fn reconcile_occupancy(&self) -> Result<Vec<OccupancyIssue>> {
    type Rows = (
      Vec<(String, Option<String>)>,
      Vec<(String, String)>,
      Vec<(String, String)>,
    );

    let (orphaned, unrecorded, doubled): Rows = self
      .conn
      .call(|conn| {
        let orphaned = conn
          .prepare(
            "SELECT b.bed_id, b.occupied_by FROM beds b
             WHERE b.is_occupied = 1 AND NOT EXISTS (
               SELECT 1 FROM residents r
               WHERE r.resident_id = b.occupied_by
                 AND r.status = 'Active'
                 AND r.bed_id = b.bed_id)
             ORDER BY b.bed_id",
          )?
          .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        let unrecorded = conn
          .prepare(
            "SELECT r.bed_id, r.resident_id FROM residents r
             LEFT JOIN beds b ON b.bed_id = r.bed_id
             WHERE r.status = 'Active' AND r.bed_id IS NOT NULL
               AND (b.bed_id IS NULL
                    OR b.occupied_by IS NULL
                    OR b.occupied_by != r.resident_id)
             ORDER BY r.bed_id",
          )?
          .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        let doubled = conn
          .prepare(
            "SELECT bed_id, group_concat(resident_id) FROM residents
             WHERE status = 'Active' AND bed_id IS NOT NULL
             GROUP BY bed_id
             HAVING COUNT(*) > 1
             ORDER BY bed_id",
          )?
          .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok((orphaned, unrecorded, doubled))
      })
      .await?;

    let mut issues = Vec::new();
    for (bed_id, occupied_by) in orphaned {
      issues.push(OccupancyIssue::OccupiedWithoutHolder {
        bed_id:      decode_uuid(&bed_id)?,
        occupied_by: occupied_by.as_deref().map(decode_uuid).transpose()?,
      });
    }
    for (bed_id, resident_id) in unrecorded {
      issues.push(OccupancyIssue::HolderNotRecorded {
        bed_id:      decode_uuid(&bed_id)?,
        resident_id: decode_uuid(&resident_id)?,
      });
    }
    for (bed_id, residents) in doubled {
      let mut resident_ids = residents
        .split(',')
        .map(decode_uuid)
        .collect::<Result<Vec<_>>>()?;
      resident_ids.sort();
      issues.push(OccupancyIssue::DoubleBooked {
        bed_id: decode_uuid(&bed_id)?,
        resident_ids,
      });
    }

    if !issues.is_empty() {
      tracing::warn!(count = issues.len(), "occupancy reconciliation found issues");
    }
    Ok(issues)
  }

  // ── Resident transitions ──────────────────────────────────────────────────

  async fn admit(&self, admission: Admission) -> Result<Resident> {
    let bed_id = admission.placement.bed_id;
    let now = Utc::now();
    let result = self
      .conn
      .call(move |conn| Ok(occupancy::admit(conn, admission, now)))
      .await?;

    match &result {
      Ok(r) => tracing::info!(resident_id = %r.resident_id, %bed_id, "resident admitted"),
      Err(e) => tracing::warn!(%bed_id, error = %e, "admission rejected"),
    }
    result
  }

  async fn discharge(&self, discharge: Discharge) -> Result<(Resident, ResidentEvent)> {
    let resident_id = discharge.resident_id;
    let now = Utc::now();
    let result = self
      .conn
      .call(move |conn| Ok(occupancy::discharge(conn, discharge, now)))
      .await?;

    match &result {
      Ok((r, _)) => {
        tracing::info!(%resident_id, bed_id = ?r.bed_id, "resident discharged")
      }
      Err(e) => tracing::warn!(%resident_id, error = %e, "discharge rejected"),
    }
    result
  }

  async fn readmit(&self, readmission: Readmission) -> Result<Resident> {
    let resident_id = readmission.resident_id;
    let bed_id = readmission.placement.bed_id;
    let now = Utc::now();
    let result = self
      .conn
      .call(move |conn| Ok(occupancy::readmit(conn, readmission, now)))
      .await?;

    match &result {
      Ok(_) => tracing::info!(%resident_id, %bed_id, "resident re-admitted"),
      Err(e) => tracing::warn!(%resident_id, %bed_id, error = %e, "re-admission rejected"),
    }
    result
  }

  async fn transfer(&self, transfer: Transfer) -> Result<(Resident, ResidentEvent)> {
    let resident_id = transfer.resident_id;
    let bed_id = transfer.placement.bed_id;
    let now = Utc::now();
    let result = self
      .conn
      .call(move |conn| Ok(occupancy::transfer(conn, transfer, now)))
      .await?;

    match &result {
      Ok(_) => tracing::info!(%resident_id, %bed_id, "resident transferred"),
      Err(e) => tracing::warn!(%resident_id, %bed_id, error = %e, "transfer rejected"),
    }
    result
  }

  async fn change_level_of_care(
    &self,
    resident_id: Uuid,
    level:       LevelOfCare,
    notes:       Option<String>,
  ) -> Result<(Resident, ResidentEvent)> {
    let now = Utc::now();
    self
      .conn
      .call(move |conn| {
        Ok(occupancy::change_level_of_care(conn, resident_id, level, notes, now))
      })
      .await?
  }

  async fn delete_resident(&self, id: Uuid) -> Result<Resident> {
    let result = self
      .conn
      .call(move |conn| Ok(occupancy::delete_resident(conn, id)))
      .await?;

    match &result {
      Ok(r) => tracing::info!(resident_id = %id, bed_id = ?r.bed_id, "resident deleted"),
      Err(e) => tracing::warn!(resident_id = %id, error = %e, "delete rejected"),
    }
    result
  }

  async fn get_resident(&self, id: Uuid) -> Result<Option<Resident>> {
    let result = self
      .conn
      .call(move |conn| Ok(occupancy::load_resident(conn, id)))
      .await?;

    match result {
      Ok(r) => Ok(Some(r)),
      Err(Error::ResidentNotFound(_)) => Ok(None),
      Err(e) => Err(e),
    }
  }

  async fn list_residents(&self, status: Option<ResidentStatus>) -> Result<Vec<Resident>> {
    let status_str = status.map(|s| s.as_ref().to_owned());
    let raws: Vec<RawResident> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {RESIDENT_COLUMNS} FROM residents
           WHERE (?1 IS NULL OR status = ?1)
           ORDER BY last_name, first_name"
        ))?;
        let rows = stmt
          .query_map(params![status_str], RawResident::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    raws.into_iter().map(RawResident::into_resident).collect()
  }

  // ── Events ────────────────────────────────────────────────────────────────

  async fn record_event(&self, input: NewEvent) -> Result<ResidentEvent> {
    let resident_id = input.resident_id;
    let now = Utc::now();
    let result = self
      .conn
      .call(move |conn| Ok(occupancy::record_event(conn, input, now)))
      .await?;

    if let Ok(event) = &result {
      tracing::debug!(%resident_id, kind = %event.detail.kind(), "event recorded");
    }
    result
  }

  async fn list_events(&self, query: EventQuery) -> Result<Vec<ResidentEvent>> {
    let resident_str = query.resident_id.map(encode_uuid);
    let house_str    = query.house_id.map(encode_uuid);
    let since_str    = query.since.map(encode_dt);
    let kinds_json   = if query.kinds.is_empty() {
      None
    } else {
      let kinds: Vec<&str> = query.kinds.iter().map(|k| k.as_ref()).collect();
      Some(serde_json::to_string(&kinds)?)
    };
    let limit_val = limit_param(query.limit);

    let raws: Vec<RawEvent> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {EVENT_COLUMNS} FROM resident_events
           WHERE (?1 IS NULL OR resident_id = ?1)
             AND (?2 IS NULL OR house_id = ?2)
             AND (?3 IS NULL OR occurred_at >= ?3)
             AND (?4 IS NULL OR event_type IN (SELECT value FROM json_each(?4)))
           ORDER BY occurred_at DESC, rowid DESC
           LIMIT ?5"
        ))?;
        let rows = stmt
          .query_map(
            params![resident_str, house_str, since_str, kinds_json, limit_val],
            RawEvent::from_row,
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    raws.into_iter().map(RawEvent::into_event).collect()
  }

  // ── Staff ─────────────────────────────────────────────────────────────────

  async fn add_staff(&self, input: NewStaff) -> Result<Staff> {
    if let Some(house_id) = input.house_id {
      self.require_house(house_id).await?;
    }

    let staff = Staff {
      staff_id:   Uuid::new_v4(),
      name:       input.name,
      role:       input.role,
      email:      input.email.trim().to_owned(),
      pin_hash:   None,
      house_id:   input.house_id,
      created_at: Utc::now(),
    };

    let id_str    = encode_uuid(staff.staff_id);
    let name      = staff.name.clone();
    let role_str  = staff.role.as_ref().to_owned();
    let email     = staff.email.clone();
    let house_str = staff.house_id.map(encode_uuid);
    let at_str    = encode_dt(staff.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          &format!(
            "INSERT INTO staff ({STAFF_COLUMNS}) VALUES (?1, ?2, ?3, ?4, NULL, ?5, ?6)"
          ),
          params![id_str, name, role_str, email, house_str, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(staff)
  }

  async fn get_staff(&self, id: Uuid) -> Result<Option<Staff>> {
    let mut found = self
      .query_staff(Some("staff_id = ?1"), Some(encode_uuid(id)))
      .await?;
    Ok(found.pop())
  }

  async fn find_staff_by_email(&self, email: String) -> Result<Option<Staff>> {
    let mut found = self
      .query_staff(Some("email = ?1"), Some(email.trim().to_owned()))
      .await?;
    Ok(found.pop())
  }

  async fn list_staff(&self) -> Result<Vec<Staff>> {
    self.query_staff(None, None).await
  }

  async fn list_staff_with_pin(&self) -> Result<Vec<Staff>> {
    self.query_staff(Some("pin_hash IS NOT NULL"), None).await
  }

  async fn assign_house(&self, staff_id: Uuid, house_id: Option<Uuid>) -> Result<Staff> {
    if let Some(house_id) = house_id {
      self.require_house(house_id).await?;
    }
    self
      .update_staff(
        staff_id,
        "UPDATE staff SET house_id = ?1 WHERE staff_id = ?2",
        house_id.map(encode_uuid),
      )
      .await
  }

  async fn set_pin_hash(&self, staff_id: Uuid, pin_hash: Option<String>) -> Result<Staff> {
    self
      .update_staff(
        staff_id,
        "UPDATE staff SET pin_hash = ?1 WHERE staff_id = ?2",
        pin_hash,
      )
      .await
  }

  // ── Notes ─────────────────────────────────────────────────────────────────

  async fn add_note(&self, input: NewNote) -> Result<Note> {
    self.require_house(input.house_id).await?;

    let note = Note {
      note_id:      Uuid::new_v4(),
      kind:         input.kind,
      house_id:     input.house_id,
      resident_id:  input.resident_id,
      shift:        input.shift,
      body:         input.body,
      submitted_by: input.submitted_by,
      created_at:   Utc::now(),
    };

    let id_str        = encode_uuid(note.note_id);
    let kind_str      = note.kind.as_ref().to_owned();
    let house_str     = encode_uuid(note.house_id);
    let resident_str  = note.resident_id.map(encode_uuid);
    let shift         = note.shift.clone();
    let body          = note.body.clone();
    let submitter_str = note.submitted_by.map(encode_uuid);
    let at_str        = encode_dt(note.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          &format!(
            "INSERT INTO notes ({NOTE_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)"
          ),
          params![
            id_str,
            kind_str,
            house_str,
            resident_str,
            shift,
            body,
            submitter_str,
            at_str,
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(note)
  }

  async fn list_notes(&self, query: NoteQuery) -> Result<Vec<Note>> {
    let house_str = match query.scope {
      HouseScope::All => None,
      HouseScope::Only(h) => Some(encode_uuid(h)),
      HouseScope::Unassigned => return Ok(Vec::new()),
    };
    let kind_str  = query.kind.as_ref().to_owned();
    let since_str = query.since.map(encode_dt);
    let limit_val = limit_param(query.limit);

    let raws: Vec<RawNote> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {NOTE_COLUMNS} FROM notes
           WHERE kind = ?1
             AND (?2 IS NULL OR house_id = ?2)
             AND (?3 IS NULL OR created_at >= ?3)
           ORDER BY created_at DESC, rowid DESC
           LIMIT ?4"
        ))?;
        let rows = stmt
          .query_map(
            params![kind_str, house_str, since_str, limit_val],
            RawNote::from_row,
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    raws.into_iter().map(RawNote::into_note).collect()
  }

  // ── Audit ─────────────────────────────────────────────────────────────────

  async fn append_audit(&self, input: NewAuditEntry) -> Result<AuditEntry> {
    let entry = AuditEntry {
      audit_id:    Uuid::new_v4(),
      action:      input.action,
      details:     input.details,
      staff_id:    input.staff_id,
      recorded_at: Utc::now(),
    };

    let id_str      = encode_uuid(entry.audit_id);
    let action      = entry.action.clone();
    let details_str = entry.details.to_string();
    let staff_str   = entry.staff_id.map(encode_uuid);
    let at_str      = encode_dt(entry.recorded_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          &format!("INSERT INTO audit_log ({AUDIT_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5)"),
          params![id_str, action, details_str, staff_str, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(entry)
  }

  async fn list_audit(&self, limit: usize) -> Result<Vec<AuditEntry>> {
    let limit_val = limit as i64;
    let raws: Vec<RawAudit> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {AUDIT_COLUMNS} FROM audit_log ORDER BY recorded_at DESC, rowid DESC LIMIT ?1"
        ))?;
        let rows = stmt
          .query_map(params![limit_val], RawAudit::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    raws.into_iter().map(RawAudit::into_entry).collect()
  }
}
