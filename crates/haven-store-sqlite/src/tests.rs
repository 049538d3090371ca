//! Integration tests for `SqliteStore` against an in-memory database.

use chrono::{Duration, NaiveDate, Utc};
use haven_core::{
  audit::NewAuditEntry,
  event::{EventDetail, EventKind, EventQuery, NewEvent},
  housing::{Bed, House, HouseGender, NewBed, NewHouse, NewRoom, OccupancyIssue, Room},
  note::{NewNote, NoteKind, RecencyWindow},
  resident::{
    Admission, AdmissionRequest, DischargeRequest, LevelOfCare,
    ReadmissionRequest, ResidentProfile, ResidentStatus, TransferRequest,
  },
  scope::StaffContext,
  staff::{NewStaff, StaffRole},
  store::{HousingStore, StoreError, StoreErrorKind},
};
use uuid::Uuid;

use crate::{Error, SqliteStore, encode::encode_dt};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

async fn house(s: &SqliteStore, name: &str) -> House {
  s.add_house(NewHouse {
    name:    name.into(),
    gender:  HouseGender::Women,
    address: None,
  })
  .await
  .unwrap()
}

async fn room(s: &SqliteStore, house: &House, label: &str) -> Room {
  s.add_room(NewRoom { house_id: house.house_id, label: label.into(), capacity: 2 })
    .await
    .unwrap()
}

async fn bed(s: &SqliteStore, room: &Room, label: &str) -> Bed {
  s.add_bed(NewBed { room_id: room.room_id, label: label.into() })
    .await
    .unwrap()
}

fn intake(first: &str, last: &str, house: &House, room: &Room, bed: &Bed) -> AdmissionRequest {
  AdmissionRequest {
    profile: ResidentProfile {
      first_name: first.into(),
      last_name: last.into(),
      ..Default::default()
    },
    level_of_care: Some(LevelOfCare::Php),
    admission_date: NaiveDate::from_ymd_opt(2026, 9, 1),
    house_id: Some(house.house_id),
    room_id: Some(room.room_id),
    bed_id: Some(bed.bed_id),
    notes: None,
  }
}

fn admission(house: &House, room: &Room, bed: &Bed) -> Admission {
  intake("Jane", "Doe", house, room, bed).validate().unwrap()
}

/// A house with one room and one bed.
async fn single_bed(s: &SqliteStore) -> (House, Room, Bed) {
  let h = house(s, "Maple").await;
  let r = room(s, &h, "101").await;
  let b = bed(s, &r, "Bed 1").await;
  (h, r, b)
}

async fn resident_count(s: &SqliteStore) -> usize {
  s.list_residents(None).await.unwrap().len()
}

// ─── Housing ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn new_beds_start_free() {
  let s = store().await;
  let (h, r, b) = single_bed(&s).await;
  assert!(!b.is_occupied);

  let available = s.available_beds(Some(h.house_id)).await.unwrap();
  assert_eq!(available.len(), 1);
  assert_eq!(available[0].bed_id, b.bed_id);

  let in_room = s.list_beds(Some(r.room_id)).await.unwrap();
  assert_eq!(in_room.len(), 1);
}

#[tokio::test]
async fn room_requires_existing_house() {
  let s = store().await;
  let missing = Uuid::new_v4();
  let err = s
    .add_room(NewRoom { house_id: missing, label: "X".into(), capacity: 1 })
    .await
    .unwrap_err();
  assert!(matches!(err, Error::HouseNotFound(id) if id == missing));
  assert_eq!(err.kind(), StoreErrorKind::NotFound);
}

#[tokio::test]
async fn bed_requires_existing_room() {
  let s = store().await;
  let err = s
    .add_bed(NewBed { room_id: Uuid::new_v4(), label: "Bed 1".into() })
    .await
    .unwrap_err();
  assert!(matches!(err, Error::RoomNotFound(_)));
}

#[tokio::test]
async fn available_beds_filtered_by_house() {
  let s = store().await;
  let (a, _, _) = single_bed(&s).await;
  let b = house(&s, "Oak").await;
  let r = room(&s, &b, "201").await;
  bed(&s, &r, "Bed 1").await;
  bed(&s, &r, "Bed 2").await;

  assert_eq!(s.available_beds(Some(a.house_id)).await.unwrap().len(), 1);
  assert_eq!(s.available_beds(Some(b.house_id)).await.unwrap().len(), 2);
  assert_eq!(s.available_beds(None).await.unwrap().len(), 3);
}

// ─── Admit ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn admit_occupies_the_chosen_bed() {
  let s = store().await;
  let (h, r, b) = single_bed(&s).await;

  let jane = s.admit(admission(&h, &r, &b)).await.unwrap();
  assert_eq!(jane.status, ResidentStatus::Active);
  assert!(jane.is_active);
  assert_eq!(jane.discharge_date, None);
  assert_eq!(jane.bed_id, Some(b.bed_id));

  let bed = s.get_bed(b.bed_id).await.unwrap().unwrap();
  assert!(bed.is_occupied);
  assert_eq!(bed.occupied_by, Some(jane.resident_id));
  assert!(s.available_beds(None).await.unwrap().is_empty());

  let events = s
    .list_events(EventQuery { resident_id: Some(jane.resident_id), ..Default::default() })
    .await
    .unwrap();
  assert_eq!(events.len(), 1);
  assert!(matches!(
    events[0].detail,
    EventDetail::Admission { readmission: false, .. }
  ));
}

#[tokio::test]
async fn admit_without_bed_writes_nothing() {
  let s = store().await;
  let (h, r, b) = single_bed(&s).await;

  let mut req = intake("Jane", "Doe", &h, &r, &b);
  req.bed_id = None;
  assert!(matches!(
    req.validate(),
    Err(haven_core::Error::MissingField("bed_id"))
  ));

  assert_eq!(resident_count(&s).await, 0);
  assert!(!s.get_bed(b.bed_id).await.unwrap().unwrap().is_occupied);
}

#[tokio::test]
async fn admit_to_bed_in_another_room_is_rejected() {
  let s = store().await;
  let (h, _, b) = single_bed(&s).await;
  let other = room(&s, &h, "102").await;

  let err = s.admit(admission(&h, &other, &b)).await.unwrap_err();
  assert!(matches!(err, Error::HousingMismatch { .. }));
  assert_eq!(err.kind(), StoreErrorKind::Invalid);
  assert_eq!(resident_count(&s).await, 0);
  assert!(!s.get_bed(b.bed_id).await.unwrap().unwrap().is_occupied);
}

#[tokio::test]
async fn admit_to_missing_bed_is_rejected() {
  let s = store().await;
  let (h, r, _) = single_bed(&s).await;
  let ghost = Bed {
    bed_id:      Uuid::new_v4(),
    room_id:     r.room_id,
    label:       "ghost".into(),
    is_occupied: false,
    occupied_by: None,
    created_at:  Utc::now(),
  };

  let err = s.admit(admission(&h, &r, &ghost)).await.unwrap_err();
  assert!(matches!(err, Error::BedNotFound(_)));
  assert_eq!(resident_count(&s).await, 0);
}

#[tokio::test]
async fn admit_to_occupied_bed_conflicts_and_rolls_back() {
  let s = store().await;
  let (h, r, b) = single_bed(&s).await;
  let first = s.admit(admission(&h, &r, &b)).await.unwrap();

  let second = intake("John", "Roe", &h, &r, &b).validate().unwrap();
  let err = s.admit(second).await.unwrap_err();
  assert!(matches!(err, Error::BedOccupied(id) if id == b.bed_id));
  assert_eq!(err.kind(), StoreErrorKind::Conflict);

  assert_eq!(resident_count(&s).await, 1);
  let bed = s.get_bed(b.bed_id).await.unwrap().unwrap();
  assert_eq!(bed.occupied_by, Some(first.resident_id));
}

#[tokio::test]
async fn concurrent_admits_to_one_bed_yield_one_success() {
  let s = store().await;
  let (h, r, b) = single_bed(&s).await;

  let a = intake("Jane", "Doe", &h, &r, &b).validate().unwrap();
  let c = intake("John", "Roe", &h, &r, &b).validate().unwrap();
  let (ra, rc) = tokio::join!(s.admit(a), s.admit(c));

  let successes = [ra.is_ok(), rc.is_ok()].iter().filter(|ok| **ok).count();
  assert_eq!(successes, 1);
  assert_eq!(resident_count(&s).await, 1);
  assert!(s.reconcile_occupancy().await.unwrap().is_empty());
}

// ─── Discharge / re-admit ────────────────────────────────────────────────────

#[tokio::test]
async fn jane_doe_discharge_and_readmit() {
  let s = store().await;
  let a = house(&s, "House A").await;
  let r101 = room(&s, &a, "101").await;
  let r102 = room(&s, &a, "102").await;
  let bed1 = bed(&s, &r101, "Bed 1").await;
  let bed2 = bed(&s, &r102, "Bed 2").await;

  let jane = s.admit(admission(&a, &r101, &bed1)).await.unwrap();
  let b1 = s.get_bed(bed1.bed_id).await.unwrap().unwrap();
  assert_eq!(b1.occupied_by, Some(jane.resident_id));

  let discharge = DischargeRequest { reason: Some("WSA".into()), ..Default::default() }
    .validate(jane.resident_id)
    .unwrap();
  let (discharged, event) = s.discharge(discharge).await.unwrap();
  assert_eq!(discharged.status, ResidentStatus::Discharged);
  assert!(!discharged.is_active);
  assert!(discharged.discharge_date.is_some());
  assert!(discharged.discharged_at.is_some());
  assert!(matches!(event.detail, EventDetail::Discharge { ref reason, .. } if reason == "WSA"));

  let b1 = s.get_bed(bed1.bed_id).await.unwrap().unwrap();
  assert!(!b1.is_occupied);
  assert_eq!(b1.occupied_by, None);

  let stored = s
    .list_events(EventQuery {
      resident_id: Some(jane.resident_id),
      kinds: vec![EventKind::Discharge],
      ..Default::default()
    })
    .await
    .unwrap();
  assert_eq!(stored.len(), 1);
  assert!(matches!(stored[0].detail, EventDetail::Discharge { ref reason, .. } if reason == "WSA"));

  let readmission = ReadmissionRequest {
    admission_date: NaiveDate::from_ymd_opt(2026, 10, 15),
    house_id:       Some(a.house_id),
    room_id:        Some(r102.room_id),
    bed_id:         Some(bed2.bed_id),
    notes:          None,
  }
  .validate(jane.resident_id)
  .unwrap();
  let back = s.readmit(readmission).await.unwrap();
  assert_eq!(back.status, ResidentStatus::Active);
  assert_eq!(back.level_of_care, LevelOfCare::Active);
  assert_eq!(back.discharge_date, None);
  assert_eq!(back.admission_date, NaiveDate::from_ymd_opt(2026, 10, 15).unwrap());
  assert_eq!(back.room_id, Some(r102.room_id));
  assert_eq!(back.bed_id, Some(bed2.bed_id));

  let b2 = s.get_bed(bed2.bed_id).await.unwrap().unwrap();
  assert_eq!(b2.occupied_by, Some(jane.resident_id));
  let b1 = s.get_bed(bed1.bed_id).await.unwrap().unwrap();
  assert!(!b1.is_occupied);

  let history = s
    .list_events(EventQuery { resident_id: Some(jane.resident_id), ..Default::default() })
    .await
    .unwrap();
  assert_eq!(history.len(), 3);
  assert!(matches!(
    history[0].detail,
    EventDetail::Admission { readmission: true, .. }
  ));
}

#[tokio::test]
async fn discharge_requires_active_resident() {
  let s = store().await;
  let (h, r, b) = single_bed(&s).await;
  let jane = s.admit(admission(&h, &r, &b)).await.unwrap();

  let req = || {
    DischargeRequest { reason: Some("completed".into()), ..Default::default() }
      .validate(jane.resident_id)
      .unwrap()
  };
  s.discharge(req()).await.unwrap();
  let err = s.discharge(req()).await.unwrap_err();
  assert!(matches!(err, Error::NotActive(_)));
  assert_eq!(err.kind(), StoreErrorKind::Conflict);
}

#[tokio::test]
async fn readmit_active_resident_is_rejected() {
  let s = store().await;
  let (h, r, b) = single_bed(&s).await;
  let jane = s.admit(admission(&h, &r, &b)).await.unwrap();

  let readmission = ReadmissionRequest {
    admission_date: NaiveDate::from_ymd_opt(2026, 10, 1),
    house_id:       Some(h.house_id),
    room_id:        Some(r.room_id),
    bed_id:         Some(b.bed_id),
    notes:          None,
  }
  .validate(jane.resident_id)
  .unwrap();
  let err = s.readmit(readmission).await.unwrap_err();
  assert!(matches!(err, Error::AlreadyActive(_)));
}

#[tokio::test]
async fn readmit_into_taken_bed_leaves_resident_discharged() {
  let s = store().await;
  let h = house(&s, "Maple").await;
  let r = room(&s, &h, "101").await;
  let b1 = bed(&s, &r, "Bed 1").await;
  let b2 = bed(&s, &r, "Bed 2").await;

  let jane = s.admit(admission(&h, &r, &b1)).await.unwrap();
  s.discharge(
    DischargeRequest { reason: Some("WSA".into()), ..Default::default() }
      .validate(jane.resident_id)
      .unwrap(),
  )
  .await
  .unwrap();
  s.admit(intake("John", "Roe", &h, &r, &b2).validate().unwrap())
    .await
    .unwrap();

  let readmission = ReadmissionRequest {
    admission_date: NaiveDate::from_ymd_opt(2026, 10, 1),
    house_id:       Some(h.house_id),
    room_id:        Some(r.room_id),
    bed_id:         Some(b2.bed_id),
    notes:          None,
  }
  .validate(jane.resident_id)
  .unwrap();
  let err = s.readmit(readmission).await.unwrap_err();
  assert!(matches!(err, Error::BedOccupied(_)));

  let jane = s.get_resident(jane.resident_id).await.unwrap().unwrap();
  assert_eq!(jane.status, ResidentStatus::Discharged);
  assert_eq!(jane.bed_id, Some(b1.bed_id));
}

// ─── Transfer / level of care ────────────────────────────────────────────────

#[tokio::test]
async fn transfer_moves_the_bed_claim() {
  let s = store().await;
  let h = house(&s, "Maple").await;
  let r = room(&s, &h, "101").await;
  let b1 = bed(&s, &r, "Bed 1").await;
  let b2 = bed(&s, &r, "Bed 2").await;
  let jane = s.admit(admission(&h, &r, &b1)).await.unwrap();

  let transfer = TransferRequest {
    house_id: Some(h.house_id),
    room_id:  Some(r.room_id),
    bed_id:   Some(b2.bed_id),
    notes:    Some("closer to the office".into()),
  }
  .validate(jane.resident_id)
  .unwrap();
  let (moved, event) = s.transfer(transfer).await.unwrap();
  assert_eq!(moved.bed_id, Some(b2.bed_id));
  assert_eq!(
    event.detail,
    EventDetail::HousingChange { from_bed: Some(b1.bed_id), to_bed: b2.bed_id }
  );

  assert!(!s.get_bed(b1.bed_id).await.unwrap().unwrap().is_occupied);
  assert_eq!(
    s.get_bed(b2.bed_id).await.unwrap().unwrap().occupied_by,
    Some(jane.resident_id)
  );
  assert!(s.reconcile_occupancy().await.unwrap().is_empty());
}

#[tokio::test]
async fn level_change_records_from_and_to() {
  let s = store().await;
  let (h, r, b) = single_bed(&s).await;
  let jane = s.admit(admission(&h, &r, &b)).await.unwrap();

  let (updated, event) = s
    .change_level_of_care(jane.resident_id, LevelOfCare::Iop5Day, None)
    .await
    .unwrap();
  assert_eq!(updated.level_of_care, LevelOfCare::Iop5Day);
  assert_eq!(
    event.detail,
    EventDetail::LevelChange { from: LevelOfCare::Php, to: LevelOfCare::Iop5Day }
  );
}

// ─── Delete ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn delete_releases_bed_and_orphans_history() {
  let s = store().await;
  let (h, r, b) = single_bed(&s).await;
  let jane = s.admit(admission(&h, &r, &b)).await.unwrap();

  let deleted = s.delete_resident(jane.resident_id).await.unwrap();
  assert_eq!(deleted.resident_id, jane.resident_id);
  assert!(s.get_resident(jane.resident_id).await.unwrap().is_none());

  let bed = s.get_bed(b.bed_id).await.unwrap().unwrap();
  assert!(!bed.is_occupied);
  assert_eq!(bed.occupied_by, None);

  let events = s
    .list_events(EventQuery { resident_id: Some(jane.resident_id), ..Default::default() })
    .await
    .unwrap();
  assert_eq!(events.len(), 1);
}

#[tokio::test]
async fn delete_missing_resident_is_not_found() {
  let s = store().await;
  let err = s.delete_resident(Uuid::new_v4()).await.unwrap_err();
  assert!(matches!(err, Error::ResidentNotFound(_)));
}

// ─── Occupancy invariants ────────────────────────────────────────────────────

#[tokio::test]
async fn active_and_discharged_residents_match_bed_table() {
  let s = store().await;
  let h = house(&s, "Maple").await;
  let r = room(&s, &h, "101").await;
  let beds = [bed(&s, &r, "A").await, bed(&s, &r, "B").await, bed(&s, &r, "C").await];

  let mut ids = Vec::new();
  for (i, b) in beds.iter().enumerate() {
    let req = intake("Resident", &format!("{i}"), &h, &r, b).validate().unwrap();
    ids.push(s.admit(req).await.unwrap().resident_id);
  }
  s.discharge(
    DischargeRequest { reason: Some("completed".into()), ..Default::default() }
      .validate(ids[1])
      .unwrap(),
  )
  .await
  .unwrap();

  let beds = s.list_beds(None).await.unwrap();
  for resident in s.list_residents(None).await.unwrap() {
    match resident.status {
      ResidentStatus::Active => {
        let held = beds.iter().find(|b| Some(b.bed_id) == resident.bed_id).unwrap();
        assert!(held.is_occupied);
        assert_eq!(held.occupied_by, Some(resident.resident_id));
      }
      _ => assert!(beds.iter().all(|b| b.occupied_by != Some(resident.resident_id))),
    }
  }

  let active = s.list_residents(Some(ResidentStatus::Active)).await.unwrap();
  assert_eq!(active.len(), 2);
}

#[tokio::test]
async fn census_and_room_occupancy_count_beds() {
  let s = store().await;
  let h = house(&s, "Maple").await;
  let r = room(&s, &h, "101").await;
  let b1 = bed(&s, &r, "Bed 1").await;
  bed(&s, &r, "Bed 2").await;
  s.admit(admission(&h, &r, &b1)).await.unwrap();

  let census = s.census().await.unwrap();
  assert_eq!(census.len(), 1);
  assert_eq!(census[0].total_beds, 2);
  assert_eq!(census[0].occupied_beds, 1);
  assert_eq!(census[0].active_residents, 1);

  let rooms = s.room_occupancy(Some(h.house_id)).await.unwrap();
  assert_eq!(rooms.len(), 1);
  assert_eq!(rooms[0].bed_count, 2);
  assert_eq!(rooms[0].occupied_beds, 1);
  assert_eq!(rooms[0].available_beds(), 1);
}

#[tokio::test]
async fn reconcile_reports_injected_drift() {
  let s = store().await;
  let h = house(&s, "Maple").await;
  let r = room(&s, &h, "101").await;
  let b1 = bed(&s, &r, "Bed 1").await;
  let b2 = bed(&s, &r, "Bed 2").await;
  let jane = s.admit(admission(&h, &r, &b1)).await.unwrap();
  assert!(s.reconcile_occupancy().await.unwrap().is_empty());

  // Simulate a lost bed write and a stray claim.
  let stray = Uuid::new_v4();
  let (b1_id, b2_id) = (b1.bed_id.to_string(), b2.bed_id.to_string());
  s.conn
    .call(move |conn| {
      conn.execute(
        "UPDATE beds SET is_occupied = 0, occupied_by = NULL WHERE bed_id = ?1",
        [b1_id],
      )?;
      conn.execute(
        "UPDATE beds SET is_occupied = 1, occupied_by = ?1 WHERE bed_id = ?2",
        [stray.to_string(), b2_id],
      )?;
      Ok(())
    })
    .await
    .unwrap();

  let issues = s.reconcile_occupancy().await.unwrap();
  assert_eq!(issues.len(), 2);
  assert!(issues.contains(&OccupancyIssue::OccupiedWithoutHolder {
    bed_id:      b2.bed_id,
    occupied_by: Some(stray),
  }));
  assert!(issues.contains(&OccupancyIssue::HolderNotRecorded {
    bed_id:      b1.bed_id,
    resident_id: jane.resident_id,
  }));
}

// ─── Events ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn record_event_stamps_resident_house() {
  let s = store().await;
  let (h, r, b) = single_bed(&s).await;
  let jane = s.admit(admission(&h, &r, &b)).await.unwrap();

  let event = s
    .record_event(NewEvent {
      resident_id: jane.resident_id,
      detail:      EventDetail::Bac { level: 0.0 },
      notes:       None,
      details:     Some(serde_json::json!({ "device": "handheld" })),
      recorded_by: None,
    })
    .await
    .unwrap();
  assert_eq!(event.house_id, Some(h.house_id));

  let listed = s
    .list_events(EventQuery {
      house_id: Some(h.house_id),
      kinds: vec![EventKind::Bac, EventKind::Ua],
      ..Default::default()
    })
    .await
    .unwrap();
  assert_eq!(listed.len(), 1);
  assert_eq!(listed[0].details, Some(serde_json::json!({ "device": "handheld" })));
}

#[tokio::test]
async fn lifecycle_events_cannot_be_recorded_directly() {
  let s = store().await;
  let (h, r, b) = single_bed(&s).await;
  let jane = s.admit(admission(&h, &r, &b)).await.unwrap();

  let err = s
    .record_event(NewEvent {
      resident_id: jane.resident_id,
      detail:      EventDetail::Discharge {
        reason:           "WSA".into(),
        discharge_type:   None,
        contact_verified: None,
      },
      notes:       None,
      details:     None,
      recorded_by: None,
    })
    .await
    .unwrap_err();
  assert!(matches!(err, Error::LifecycleEvent(EventKind::Discharge)));
  assert_eq!(s.get_resident(jane.resident_id).await.unwrap().unwrap().status, ResidentStatus::Active);
}

// ─── Staff ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn staff_email_lookup_ignores_case() {
  let s = store().await;
  let staff = s
    .add_staff(NewStaff {
      name:     "Robin".into(),
      role:     StaffRole::Manager,
      email:    "Robin@Example.org".into(),
      house_id: None,
    })
    .await
    .unwrap();

  let found = s.find_staff_by_email("robin@example.ORG".into()).await.unwrap();
  assert_eq!(found.map(|f| f.staff_id), Some(staff.staff_id));
  assert!(s.find_staff_by_email("nobody@example.org".into()).await.unwrap().is_none());
}

#[tokio::test]
async fn duplicate_staff_email_conflicts() {
  let s = store().await;
  let new = || NewStaff {
    name:     "Robin".into(),
    role:     StaffRole::Manager,
    email:    "robin@example.org".into(),
    house_id: None,
  };
  s.add_staff(new()).await.unwrap();
  let err = s.add_staff(new()).await.unwrap_err();
  assert_eq!(err.kind(), StoreErrorKind::Conflict);
}

#[tokio::test]
async fn assign_house_and_pin() {
  let s = store().await;
  let h = house(&s, "Maple").await;
  let staff = s
    .add_staff(NewStaff {
      name:     "Sam".into(),
      role:     StaffRole::SupportStaff,
      email:    "sam@example.org".into(),
      house_id: None,
    })
    .await
    .unwrap();

  let assigned = s.assign_house(staff.staff_id, Some(h.house_id)).await.unwrap();
  assert_eq!(assigned.house_id, Some(h.house_id));

  let err = s.assign_house(staff.staff_id, Some(Uuid::new_v4())).await.unwrap_err();
  assert!(matches!(err, Error::HouseNotFound(_)));

  assert!(s.list_staff_with_pin().await.unwrap().is_empty());
  let with_pin = s.set_pin_hash(staff.staff_id, Some("$argon2id$stub".into())).await.unwrap();
  assert!(with_pin.has_pin());
  assert_eq!(s.list_staff_with_pin().await.unwrap().len(), 1);
  assert_eq!(s.list_staff().await.unwrap().len(), 1);

  let err = s.set_pin_hash(Uuid::new_v4(), None).await.unwrap_err();
  assert!(matches!(err, Error::StaffNotFound(_)));
}

// ─── Notes and scoping ───────────────────────────────────────────────────────

async fn note(s: &SqliteStore, kind: NoteKind, house: &House, body: &str) -> Uuid {
  s.add_note(NewNote {
    kind,
    house_id: house.house_id,
    resident_id: None,
    shift: "AM".into(),
    body: body.into(),
    submitted_by: None,
  })
  .await
  .unwrap()
  .note_id
}

#[tokio::test]
async fn non_admin_lists_only_their_house() {
  let s = store().await;
  let maple = house(&s, "Maple").await;
  let oak = house(&s, "Oak").await;
  note(&s, NoteKind::Turnover, &maple, "quiet night").await;
  note(&s, NoteKind::Turnover, &oak, "fire drill").await;
  note(&s, NoteKind::Observation, &maple, "not a turnover").await;

  let support = s
    .add_staff(NewStaff {
      name:     "Sam".into(),
      role:     StaffRole::SupportStaff,
      email:    "sam@example.org".into(),
      house_id: Some(maple.house_id),
    })
    .await
    .unwrap();
  let ctx = StaffContext::for_staff(&support);
  let query = ctx.note_query(NoteKind::Turnover, None, Utc::now()).unwrap();
  let notes = s.list_notes(query).await.unwrap();
  assert_eq!(notes.len(), 1);
  assert!(notes.iter().all(|n| n.house_id == maple.house_id));

  let admin = StaffContext { staff_id: None, role: StaffRole::Admin, house_id: None };
  let query = admin.note_query(NoteKind::Turnover, None, Utc::now()).unwrap();
  assert_eq!(s.list_notes(query).await.unwrap().len(), 2);
}

#[tokio::test]
async fn unassigned_non_admin_lists_nothing() {
  let s = store().await;
  let maple = house(&s, "Maple").await;
  note(&s, NoteKind::Observation, &maple, "restless").await;

  let ctx = StaffContext { staff_id: None, role: StaffRole::Manager, house_id: None };
  let query = ctx.note_query(NoteKind::Observation, None, Utc::now()).unwrap();
  assert!(s.list_notes(query).await.unwrap().is_empty());
}

#[tokio::test]
async fn recency_window_bounds_creation_time() {
  let s = store().await;
  let maple = house(&s, "Maple").await;
  note(&s, NoteKind::Observation, &maple, "today").await;
  let old = note(&s, NoteKind::Observation, &maple, "three days ago").await;

  let backdated = encode_dt(Utc::now() - Duration::days(3));
  let old_id = old.to_string();
  s.conn
    .call(move |conn| {
      conn.execute(
        "UPDATE notes SET created_at = ?1 WHERE note_id = ?2",
        [backdated, old_id],
      )?;
      Ok(())
    })
    .await
    .unwrap();

  let admin = StaffContext { staff_id: None, role: StaffRole::Admin, house_id: None };
  let now = Utc::now();
  let day = admin.note_query(NoteKind::Observation, None, now).unwrap();
  assert_eq!(s.list_notes(day).await.unwrap().len(), 1);

  let week = admin
    .note_query(NoteKind::Observation, Some(RecencyWindow::Last7Days), now)
    .unwrap();
  let listed = s.list_notes(week).await.unwrap();
  assert_eq!(listed.len(), 2);
  assert_eq!(listed[0].body, "today");
}

#[tokio::test]
async fn note_requires_existing_house() {
  let s = store().await;
  let err = s
    .add_note(NewNote {
      kind:         NoteKind::Turnover,
      house_id:     Uuid::new_v4(),
      resident_id:  None,
      shift:        "PM".into(),
      body:         "x".into(),
      submitted_by: None,
    })
    .await
    .unwrap_err();
  assert!(matches!(err, Error::HouseNotFound(_)));
}

// ─── Audit ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn audit_lists_newest_first() {
  let s = store().await;
  let who = Some(Uuid::new_v4());
  s.append_audit(NewAuditEntry::new("resident.admit", who, serde_json::json!({ "n": 1 })))
    .await
    .unwrap();
  s.append_audit(NewAuditEntry::new("resident.discharge", who, serde_json::json!({ "n": 2 })))
    .await
    .unwrap();

  let entries = s.list_audit(10).await.unwrap();
  assert_eq!(entries.len(), 2);
  assert_eq!(entries[0].action, "resident.discharge");
  assert_eq!(entries[1].details, serde_json::json!({ "n": 1 }));

  assert_eq!(s.list_audit(1).await.unwrap().len(), 1);
}
