//! Residents and the validated inputs for every housing transition.
//!
//! Inputs arrive from forms with optional fields. Each request type has a
//! `validate` method that either produces the fully-specified command the
//! store accepts or fails with [`Error::MissingField`] before anything is
//! written.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use uuid::Uuid;

use crate::{Error, Result, housing::Placement};

// ─── Status ──────────────────────────────────────────────────────────────────

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  AsRefStr,
)]
pub enum ResidentStatus {
  Active,
  Discharged,
  Pending,
}

/// Level of care (the resident's clinical status).
///
/// `Active` is what a re-admission resets the level to until it is
/// reassessed.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Default,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  AsRefStr,
)]
pub enum LevelOfCare {
  #[serde(rename = "PHP")]
  #[strum(serialize = "PHP")]
  Php,
  #[serde(rename = "IOP 5-day")]
  #[strum(serialize = "IOP 5-day")]
  Iop5Day,
  #[serde(rename = "IOP 3-day")]
  #[strum(serialize = "IOP 3-day")]
  Iop3Day,
  #[serde(rename = "OP")]
  #[strum(serialize = "OP")]
  Op,
  Halfway,
  #[default]
  Unknown,
  Active,
}

// ─── Resident ────────────────────────────────────────────────────────────────

/// Identity and contact fields captured at intake.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ResidentProfile {
  pub first_name:              String,
  pub last_name:               String,
  pub date_of_birth:           Option<NaiveDate>,
  pub gender:                  Option<String>,
  pub phone:                   Option<String>,
  pub email:                   Option<String>,
  pub emergency_contact_name:  Option<String>,
  pub emergency_contact_phone: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Resident {
  pub resident_id:    Uuid,
  #[serde(flatten)]
  pub profile:        ResidentProfile,
  pub status:         ResidentStatus,
  pub level_of_care:  LevelOfCare,
  pub admission_date: NaiveDate,
  pub discharge_date: Option<NaiveDate>,
  pub house_id:       Option<Uuid>,
  pub room_id:        Option<Uuid>,
  pub bed_id:         Option<Uuid>,
  /// Mirror of `status == Active`.
  pub is_active:      bool,
  pub admitted_at:    Option<DateTime<Utc>>,
  pub discharged_at:  Option<DateTime<Utc>>,
  pub created_at:     DateTime<Utc>,
}

impl Resident {
  pub fn full_name(&self) -> String {
    format!("{} {}", self.profile.first_name, self.profile.last_name)
  }

  /// The resident's current housing, if all three references are set.
  pub fn placement(&self) -> Option<Placement> {
    Some(Placement {
      house_id: self.house_id?,
      room_id:  self.room_id?,
      bed_id:   self.bed_id?,
    })
  }
}

// ─── Validation helpers ──────────────────────────────────────────────────────

fn require<T>(value: Option<T>, field: &'static str) -> Result<T> {
  value.ok_or(Error::MissingField(field))
}

fn require_text(value: &str, field: &'static str) -> Result<()> {
  if value.trim().is_empty() {
    return Err(Error::MissingField(field));
  }
  Ok(())
}

fn require_placement(
  house_id: Option<Uuid>,
  room_id: Option<Uuid>,
  bed_id: Option<Uuid>,
) -> Result<Placement> {
  Ok(Placement {
    house_id: require(house_id, "house_id")?,
    room_id:  require(room_id, "room_id")?,
    bed_id:   require(bed_id, "bed_id")?,
  })
}

// ─── Admit ───────────────────────────────────────────────────────────────────

/// Intake form payload.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AdmissionRequest {
  #[serde(flatten)]
  pub profile:        ResidentProfile,
  pub level_of_care:  Option<LevelOfCare>,
  pub admission_date: Option<NaiveDate>,
  pub house_id:       Option<Uuid>,
  pub room_id:        Option<Uuid>,
  pub bed_id:         Option<Uuid>,
  pub notes:          Option<String>,
}

/// A validated intake, ready for [`crate::store::HousingStore::admit`].
#[derive(Debug, Clone)]
pub struct Admission {
  pub profile:        ResidentProfile,
  pub level_of_care:  LevelOfCare,
  pub admission_date: NaiveDate,
  pub placement:      Placement,
  pub notes:          Option<String>,
}

impl AdmissionRequest {
  pub fn validate(self) -> Result<Admission> {
    require_text(&self.profile.first_name, "first_name")?;
    require_text(&self.profile.last_name, "last_name")?;
    let admission_date = require(self.admission_date, "admission_date")?;
    let placement =
      require_placement(self.house_id, self.room_id, self.bed_id)?;

    Ok(Admission {
      profile: self.profile,
      level_of_care: self.level_of_care.unwrap_or_default(),
      admission_date,
      placement,
      notes: self.notes,
    })
  }
}

// ─── Discharge ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DischargeRequest {
  pub reason:           Option<String>,
  pub discharge_type:   Option<String>,
  pub contact_verified: Option<bool>,
  pub notes:            Option<String>,
}

#[derive(Debug, Clone)]
pub struct Discharge {
  pub resident_id:      Uuid,
  pub reason:           String,
  pub discharge_type:   Option<String>,
  pub contact_verified: Option<bool>,
  pub notes:            Option<String>,
}

impl DischargeRequest {
  pub fn validate(self, resident_id: Uuid) -> Result<Discharge> {
    let reason = require(self.reason, "reason")?;
    require_text(&reason, "reason")?;
    Ok(Discharge {
      resident_id,
      reason,
      discharge_type: self.discharge_type,
      contact_verified: self.contact_verified,
      notes: self.notes,
    })
  }
}

// ─── Re-admit ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReadmissionRequest {
  pub admission_date: Option<NaiveDate>,
  pub house_id:       Option<Uuid>,
  pub room_id:        Option<Uuid>,
  pub bed_id:         Option<Uuid>,
  pub notes:          Option<String>,
}

#[derive(Debug, Clone)]
pub struct Readmission {
  pub resident_id:    Uuid,
  pub admission_date: NaiveDate,
  pub placement:      Placement,
  pub notes:          Option<String>,
}

impl ReadmissionRequest {
  pub fn validate(self, resident_id: Uuid) -> Result<Readmission> {
    let admission_date = require(self.admission_date, "admission_date")?;
    let placement =
      require_placement(self.house_id, self.room_id, self.bed_id)?;
    Ok(Readmission { resident_id, admission_date, placement, notes: self.notes })
  }
}

// ─── Transfer ────────────────────────────────────────────────────────────────

/// Move an active resident to a different bed.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TransferRequest {
  pub house_id: Option<Uuid>,
  pub room_id:  Option<Uuid>,
  pub bed_id:   Option<Uuid>,
  pub notes:    Option<String>,
}

#[derive(Debug, Clone)]
pub struct Transfer {
  pub resident_id: Uuid,
  pub placement:   Placement,
  pub notes:       Option<String>,
}

impl TransferRequest {
  pub fn validate(self, resident_id: Uuid) -> Result<Transfer> {
    let placement =
      require_placement(self.house_id, self.room_id, self.bed_id)?;
    Ok(Transfer { resident_id, placement, notes: self.notes })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn intake() -> AdmissionRequest {
    AdmissionRequest {
      profile: ResidentProfile {
        first_name: "Jane".into(),
        last_name: "Doe".into(),
        ..Default::default()
      },
      admission_date: NaiveDate::from_ymd_opt(2026, 10, 1),
      house_id: Some(Uuid::new_v4()),
      room_id: Some(Uuid::new_v4()),
      bed_id: Some(Uuid::new_v4()),
      ..Default::default()
    }
  }

  #[test]
  fn complete_intake_validates() {
    let admission = intake().validate().unwrap();
    assert_eq!(admission.level_of_care, LevelOfCare::Unknown);
    assert_eq!(admission.profile.first_name, "Jane");
  }

  #[test]
  fn intake_without_bed_is_rejected() {
    let mut req = intake();
    req.bed_id = None;
    assert!(matches!(req.validate(), Err(Error::MissingField("bed_id"))));
  }

  #[test]
  fn intake_without_house_is_rejected() {
    let mut req = intake();
    req.house_id = None;
    assert!(matches!(req.validate(), Err(Error::MissingField("house_id"))));
  }

  #[test]
  fn intake_with_blank_name_is_rejected() {
    let mut req = intake();
    req.profile.last_name = "   ".into();
    assert!(matches!(req.validate(), Err(Error::MissingField("last_name"))));
  }

  #[test]
  fn readmission_requires_date() {
    let req = ReadmissionRequest {
      admission_date: None,
      house_id:       Some(Uuid::new_v4()),
      room_id:        Some(Uuid::new_v4()),
      bed_id:         Some(Uuid::new_v4()),
      notes:          None,
    };
    assert!(matches!(
      req.validate(Uuid::new_v4()),
      Err(Error::MissingField("admission_date"))
    ));
  }

  #[test]
  fn discharge_requires_reason() {
    let req = DischargeRequest { reason: Some(" ".into()), ..Default::default() };
    assert!(matches!(
      req.validate(Uuid::new_v4()),
      Err(Error::MissingField("reason"))
    ));
  }

  #[test]
  fn level_of_care_uses_display_names() {
    assert_eq!(LevelOfCare::Iop5Day.as_ref(), "IOP 5-day");
    assert_eq!("OP".parse::<LevelOfCare>().unwrap(), LevelOfCare::Op);
    let json = serde_json::to_string(&LevelOfCare::Iop3Day).unwrap();
    assert_eq!(json, "\"IOP 3-day\"");
  }

  #[test]
  fn intake_form_deserializes_flat() {
    let req: AdmissionRequest = serde_json::from_value(serde_json::json!({
      "first_name": "Jane",
      "last_name": "Doe",
      "admission_date": "2026-10-01",
      "level_of_care": "PHP",
    }))
    .unwrap();
    assert_eq!(req.profile.first_name, "Jane");
    assert_eq!(req.level_of_care, Some(LevelOfCare::Php));
    assert!(req.bed_id.is_none());
  }
}
