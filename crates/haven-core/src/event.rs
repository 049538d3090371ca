//! Resident events: the append-only history of everything that happened to a
//! resident.
//!
//! Lifecycle events (admission, discharge, level change, housing change) are
//! written by the store as part of the corresponding transition. Observational
//! events (shift notes, UA and BAC results) are recorded directly.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use uuid::Uuid;

use crate::{Result, resident::LevelOfCare};

/// The `event_type` discriminant.
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
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum EventKind {
  Admission,
  Discharge,
  LevelChange,
  HousingChange,
  ShiftNote,
  Ua,
  Bac,
}

impl EventKind {
  /// Lifecycle kinds are only ever written by the store as a side effect of
  /// admit, discharge, re-admit, transfer or level change.
  pub fn is_lifecycle(self) -> bool {
    matches!(
      self,
      Self::Admission | Self::Discharge | Self::LevelChange | Self::HousingChange
    )
  }
}

/// The typed, event-specific payload. The variant name is the `event_type`
/// stored in the database.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event_type", content = "data", rename_all = "snake_case")]
pub enum EventDetail {
  Admission {
    house_id:    Uuid,
    room_id:     Uuid,
    bed_id:      Uuid,
    readmission: bool,
  },
  Discharge {
    reason:           String,
    discharge_type:   Option<String>,
    contact_verified: Option<bool>,
  },
  LevelChange {
    from: LevelOfCare,
    to:   LevelOfCare,
  },
  HousingChange {
    from_bed: Option<Uuid>,
    to_bed:   Uuid,
  },
  ShiftNote {
    shift: Option<String>,
  },
  /// Urine analysis result.
  Ua {
    level: String,
  },
  /// Breath alcohol concentration.
  Bac {
    level: f64,
  },
}

impl EventDetail {
  pub fn kind(&self) -> EventKind {
    match self {
      Self::Admission { .. } => EventKind::Admission,
      Self::Discharge { .. } => EventKind::Discharge,
      Self::LevelChange { .. } => EventKind::LevelChange,
      Self::HousingChange { .. } => EventKind::HousingChange,
      Self::ShiftNote { .. } => EventKind::ShiftNote,
      Self::Ua { .. } => EventKind::Ua,
      Self::Bac { .. } => EventKind::Bac,
    }
  }

  /// Serialise the inner payload (without the tag) for the `detail_json`
  /// column.
  pub fn to_json(&self) -> Result<serde_json::Value> {
    let full = serde_json::to_value(self)?;
    Ok(full.get("data").cloned().unwrap_or(serde_json::Value::Null))
  }

  /// Rebuild from the stored `event_type` and payload.
  pub fn from_parts(event_type: &str, data: serde_json::Value) -> Result<Self> {
    let wrapped = serde_json::json!({ "event_type": event_type, "data": data });
    Ok(serde_json::from_value(wrapped)?)
  }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResidentEvent {
  pub event_id:    Uuid,
  pub resident_id: Uuid,
  pub house_id:    Option<Uuid>,
  pub occurred_at: DateTime<Utc>,
  #[serde(flatten)]
  pub detail:      EventDetail,
  pub notes:       Option<String>,
  /// Free-form extra fields captured by the form that recorded the event.
  pub details:     Option<serde_json::Value>,
  pub recorded_by: Option<Uuid>,
}

/// Input to [`crate::store::HousingStore::record_event`].
#[derive(Debug, Clone)]
pub struct NewEvent {
  pub resident_id: Uuid,
  pub detail:      EventDetail,
  pub notes:       Option<String>,
  pub details:     Option<serde_json::Value>,
  pub recorded_by: Option<Uuid>,
}

/// Parameters for [`crate::store::HousingStore::list_events`].
#[derive(Debug, Clone, Default)]
pub struct EventQuery {
  pub resident_id: Option<Uuid>,
  pub house_id:    Option<Uuid>,
  pub kinds:       Vec<EventKind>,
  pub since:       Option<DateTime<Utc>>,
  pub limit:       Option<usize>,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn detail_roundtrips_through_parts() {
    let detail = EventDetail::Discharge {
      reason:           "WSA".into(),
      discharge_type:   Some("administrative".into()),
      contact_verified: Some(true),
    };
    let data = detail.to_json().unwrap();
    assert_eq!(data["reason"], "WSA");
    let back = EventDetail::from_parts(detail.kind().as_ref(), data).unwrap();
    assert_eq!(back, detail);
  }

  #[test]
  fn unknown_event_type_fails() {
    let err = EventDetail::from_parts("teleport", serde_json::json!({}));
    assert!(err.is_err());
  }

  #[test]
  fn lifecycle_kinds() {
    assert!(EventKind::Discharge.is_lifecycle());
    assert!(!EventKind::Ua.is_lifecycle());
    assert_eq!(EventKind::HousingChange.as_ref(), "housing_change");
  }
}
