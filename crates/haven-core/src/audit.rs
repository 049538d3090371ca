//! Audit log entries. Append-only: the service never updates or deletes them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
  pub audit_id:    Uuid,
  /// Dotted action label, e.g. `resident.discharge`.
  pub action:      String,
  pub details:     serde_json::Value,
  pub staff_id:    Option<Uuid>,
  pub recorded_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewAuditEntry {
  pub action:   String,
  pub details:  serde_json::Value,
  pub staff_id: Option<Uuid>,
}

impl NewAuditEntry {
  pub fn new(
    action: impl Into<String>,
    staff_id: Option<Uuid>,
    details: serde_json::Value,
  ) -> Self {
    Self { action: action.into(), details, staff_id }
  }
}
