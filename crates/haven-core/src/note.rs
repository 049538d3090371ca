//! Shift turnover and observation notes, and the recency windows used to
//! list them.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use uuid::Uuid;

use crate::{
  error::{Error, Result},
  scope::HouseScope,
};

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
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum NoteKind {
  /// Shift-handoff record for a house.
  Turnover,
  /// Behavioural or clinical observation, usually about one resident.
  Observation,
}

impl NoteKind {
  /// The window a list view uses when the caller does not pick one.
  pub fn default_window(self) -> RecencyWindow {
    match self {
      Self::Observation => RecencyWindow::Last24Hours,
      Self::Turnover => RecencyWindow::Last48Hours,
    }
  }
}

/// Lower bound on a record's creation time.
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
pub enum RecencyWindow {
  #[serde(rename = "24h")]
  #[strum(serialize = "24h")]
  Last24Hours,
  #[serde(rename = "48h")]
  #[strum(serialize = "48h")]
  Last48Hours,
  #[serde(rename = "7d")]
  #[strum(serialize = "7d")]
  Last7Days,
  /// No lower bound. Admin-only.
  #[serde(rename = "all")]
  #[strum(serialize = "all")]
  All,
}

impl RecencyWindow {
  pub fn duration(self) -> Option<Duration> {
    match self {
      Self::Last24Hours => Some(Duration::hours(24)),
      Self::Last48Hours => Some(Duration::hours(48)),
      Self::Last7Days => Some(Duration::days(7)),
      Self::All => None,
    }
  }

  /// The earliest creation time included by this window, relative to `now`.
  pub fn since(self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    self.duration().map(|d| now - d)
  }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Note {
  pub note_id:      Uuid,
  pub kind:         NoteKind,
  pub house_id:     Uuid,
  pub resident_id:  Option<Uuid>,
  /// Shift label, e.g. "AM", "PM", "Overnight".
  pub shift:        String,
  pub body:         String,
  pub submitted_by: Option<Uuid>,
  pub created_at:   DateTime<Utc>,
}

/// Input to [`crate::store::HousingStore::add_note`]. The house is already
/// stamped by [`crate::scope::StaffContext::stamp_house`].
#[derive(Debug, Clone)]
pub struct NewNote {
  pub kind:         NoteKind,
  pub house_id:     Uuid,
  pub resident_id:  Option<Uuid>,
  pub shift:        String,
  pub body:         String,
  pub submitted_by: Option<Uuid>,
}

impl NewNote {
  /// Reject a note with a blank shift label or body.
  pub fn validate(self) -> Result<Self> {
    if self.shift.trim().is_empty() {
      return Err(Error::MissingField("shift"));
    }
    if self.body.trim().is_empty() {
      return Err(Error::MissingField("body"));
    }
    Ok(self)
  }
}

/// Parameters for [`crate::store::HousingStore::list_notes`].
#[derive(Debug, Clone)]
pub struct NoteQuery {
  pub kind:  NoteKind,
  pub scope: HouseScope,
  pub since: Option<DateTime<Utc>>,
  pub limit: Option<usize>,
}
