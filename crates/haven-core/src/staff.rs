//! Staff members and their roles.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use uuid::Uuid;

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
pub enum StaffRole {
  Manager,
  #[serde(rename = "Support Staff")]
  #[strum(serialize = "Support Staff")]
  SupportStaff,
  Maintenance,
  #[serde(rename = "admin")]
  #[strum(serialize = "admin")]
  Admin,
}

impl StaffRole {
  pub fn is_admin(self) -> bool { matches!(self, Self::Admin) }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Staff {
  pub staff_id:   Uuid,
  pub name:       String,
  pub role:       StaffRole,
  pub email:      String,
  /// Argon2 PHC string. Never leaves the service.
  #[serde(skip_serializing, default)]
  pub pin_hash:   Option<String>,
  /// The house this staff member is pinned to, if any.
  pub house_id:   Option<Uuid>,
  pub created_at: DateTime<Utc>,
}

impl Staff {
  pub fn has_pin(&self) -> bool { self.pin_hash.is_some() }
}

/// Input to [`crate::store::HousingStore::add_staff`].
#[derive(Debug, Clone, Deserialize)]
pub struct NewStaff {
  pub name:     String,
  pub role:     StaffRole,
  pub email:    String,
  pub house_id: Option<Uuid>,
}
