//! Houses, rooms and beds, plus the read models derived from bed occupancy.
//!
//! A house owns rooms and a room owns beds. Bed occupancy (`is_occupied`,
//! `occupied_by`) is never written directly by callers; it changes only as a
//! side effect of the resident transitions in [`crate::store::HousingStore`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use uuid::Uuid;

// ─── House ───────────────────────────────────────────────────────────────────

/// Which residents a house accepts.
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
pub enum HouseGender {
  Men,
  Women,
  Coed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct House {
  pub house_id:   Uuid,
  pub name:       String,
  pub gender:     HouseGender,
  pub address:    Option<String>,
  pub created_at: DateTime<Utc>,
}

/// Input to [`crate::store::HousingStore::add_house`].
#[derive(Debug, Clone, Deserialize)]
pub struct NewHouse {
  pub name:    String,
  pub gender:  HouseGender,
  pub address: Option<String>,
}

// ─── Room ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Room {
  pub room_id:    Uuid,
  pub house_id:   Uuid,
  /// Room number or free-form label, e.g. "101".
  pub label:      String,
  pub capacity:   u32,
  pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewRoom {
  pub house_id: Uuid,
  pub label:    String,
  pub capacity: u32,
}

// ─── Bed ─────────────────────────────────────────────────────────────────────

/// A single bed. `is_occupied` is true exactly when `occupied_by` names an
/// active resident whose `bed_id` is this bed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bed {
  pub bed_id:      Uuid,
  pub room_id:     Uuid,
  pub label:       String,
  pub is_occupied: bool,
  pub occupied_by: Option<Uuid>,
  pub created_at:  DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewBed {
  pub room_id: Uuid,
  pub label:   String,
}

/// A fully-specified housing assignment. Every admit, re-admit and transfer
/// binds a resident to exactly one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placement {
  pub house_id: Uuid,
  pub room_id:  Uuid,
  pub bed_id:   Uuid,
}

// ─── Read models ─────────────────────────────────────────────────────────────

/// Per-room occupancy, computed on read.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomOccupancy {
  pub room_id:       Uuid,
  pub house_id:      Uuid,
  pub house_name:    String,
  pub label:         String,
  pub capacity:      u32,
  pub bed_count:     u32,
  pub occupied_beds: u32,
}

impl RoomOccupancy {
  pub fn available_beds(&self) -> u32 {
    self.bed_count.saturating_sub(self.occupied_beds)
  }
}

/// Per-house census snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HouseCensus {
  pub house_id:         Uuid,
  pub house_name:       String,
  pub total_beds:       u32,
  pub occupied_beds:    u32,
  pub active_residents: u32,
}

impl HouseCensus {
  /// Occupied beds as a percentage of total beds; zero for a house with no
  /// beds.
  pub fn occupancy_percent(&self) -> f64 {
    if self.total_beds == 0 {
      return 0.0;
    }
    f64::from(self.occupied_beds) * 100.0 / f64::from(self.total_beds)
  }
}

// ─── Reconciliation ──────────────────────────────────────────────────────────

/// A disagreement between the `beds` table and the `residents` table, as
/// reported by [`crate::store::HousingStore::reconcile_occupancy`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "issue", rename_all = "snake_case")]
pub enum OccupancyIssue {
  /// The bed is flagged occupied but no active resident holds it.
  OccupiedWithoutHolder {
    bed_id:      Uuid,
    occupied_by: Option<Uuid>,
  },
  /// An active resident points at a bed that is not marked as theirs.
  HolderNotRecorded { bed_id: Uuid, resident_id: Uuid },
  /// More than one active resident claims the same bed.
  DoubleBooked {
    bed_id:       Uuid,
    resident_ids: Vec<Uuid>,
  },
}

impl OccupancyIssue {
  pub fn bed_id(&self) -> Uuid {
    match self {
      Self::OccupiedWithoutHolder { bed_id, .. }
      | Self::HolderNotRecorded { bed_id, .. }
      | Self::DoubleBooked { bed_id, .. } => *bed_id,
    }
  }
}
