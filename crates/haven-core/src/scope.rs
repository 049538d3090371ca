//! The visibility scoping rule.
//!
//! A caller's staff record is resolved once per request into a
//! [`StaffContext`]. Every house-scoped read and write goes through it:
//! admins see every house, other staff see only the house they are assigned
//! to, and every note written by a non-admin is stamped with that house.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  Error, Result,
  note::{NoteKind, NoteQuery, RecencyWindow},
  staff::{Staff, StaffRole},
};

/// What to do with an authenticated identity that has no staff record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnprovisionedAccess {
  /// Treat the caller as an admin with full visibility.
  #[default]
  Admin,
  /// Reject the caller.
  Deny,
}

/// Which houses a caller may read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HouseScope {
  All,
  Only(Uuid),
  /// A non-admin with no house assignment sees nothing.
  Unassigned,
}

impl HouseScope {
  pub fn includes(self, house_id: Uuid) -> bool {
    match self {
      Self::All => true,
      Self::Only(h) => h == house_id,
      Self::Unassigned => false,
    }
  }
}

/// The resolved identity of the caller for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaffContext {
  /// `None` when the caller was admitted through the unprovisioned fallback.
  pub staff_id: Option<Uuid>,
  pub role:     StaffRole,
  pub house_id: Option<Uuid>,
}

impl StaffContext {
  /// Build the context for `identity` given the staff record (if any) whose
  /// email matched it.
  pub fn resolve(
    identity: &str,
    staff: Option<&Staff>,
    policy: UnprovisionedAccess,
  ) -> Result<Self> {
    match (staff, policy) {
      (Some(staff), _) => Ok(Self::for_staff(staff)),
      (None, UnprovisionedAccess::Admin) => Ok(Self {
        staff_id: None,
        role:     StaffRole::Admin,
        house_id: None,
      }),
      (None, UnprovisionedAccess::Deny) => {
        Err(Error::UnknownStaff(identity.to_owned()))
      }
    }
  }

  pub fn for_staff(staff: &Staff) -> Self {
    Self {
      staff_id: Some(staff.staff_id),
      role:     staff.role,
      house_id: staff.house_id,
    }
  }

  pub fn is_admin(&self) -> bool { self.role.is_admin() }

  pub fn house_scope(&self) -> HouseScope {
    if self.is_admin() {
      return HouseScope::All;
    }
    match self.house_id {
      Some(h) => HouseScope::Only(h),
      None => HouseScope::Unassigned,
    }
  }

  /// The house a new record written by this caller belongs to.
  ///
  /// Admins must name the house. Everyone else writes into their assigned
  /// house regardless of what they asked for.
  pub fn stamp_house(&self, requested: Option<Uuid>) -> Result<Uuid> {
    if self.is_admin() {
      return requested.ok_or(Error::MissingField("house_id"));
    }
    self.house_id.ok_or(Error::NoAssignedHouse)
  }

  pub fn check_window(&self, window: RecencyWindow) -> Result<()> {
    if window == RecencyWindow::All && !self.is_admin() {
      return Err(Error::Forbidden(
        "the unbounded window is restricted to admins".into(),
      ));
    }
    Ok(())
  }

  pub fn require_admin(&self) -> Result<()> { self.require_role(&[]) }

  /// Admins always pass; everyone else must hold one of `allowed`.
  pub fn require_role(&self, allowed: &[StaffRole]) -> Result<()> {
    if self.is_admin() || allowed.contains(&self.role) {
      return Ok(());
    }
    Err(Error::Forbidden(format!("role {} may not do this", self.role)))
  }

  /// Build the scoped, windowed listing query for `kind`.
  pub fn note_query(
    &self,
    kind: NoteKind,
    window: Option<RecencyWindow>,
    now: DateTime<Utc>,
  ) -> Result<NoteQuery> {
    let window = window.unwrap_or(kind.default_window());
    self.check_window(window)?;
    Ok(NoteQuery {
      kind,
      scope: self.house_scope(),
      since: window.since(now),
      limit: None,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn staff(role: StaffRole, house_id: Option<Uuid>) -> Staff {
    Staff {
      staff_id: Uuid::new_v4(),
      name: "Robin".into(),
      role,
      email: "robin@example.org".into(),
      pin_hash: None,
      house_id,
      created_at: Utc::now(),
    }
  }

  #[test]
  fn unprovisioned_caller_falls_back_to_admin() {
    let ctx =
      StaffContext::resolve("new@example.org", None, UnprovisionedAccess::Admin)
        .unwrap();
    assert!(ctx.is_admin());
    assert_eq!(ctx.staff_id, None);
    assert_eq!(ctx.house_scope(), HouseScope::All);
  }

  #[test]
  fn unprovisioned_caller_can_be_denied() {
    let err =
      StaffContext::resolve("new@example.org", None, UnprovisionedAccess::Deny)
        .unwrap_err();
    assert!(matches!(err, Error::UnknownStaff(ref who) if who == "new@example.org"));
  }

  #[test]
  fn non_admin_is_scoped_to_assigned_house() {
    let house = Uuid::new_v4();
    let s = staff(StaffRole::SupportStaff, Some(house));
    let ctx =
      StaffContext::resolve(&s.email, Some(&s), UnprovisionedAccess::Admin)
        .unwrap();
    assert_eq!(ctx.house_scope(), HouseScope::Only(house));
    assert!(ctx.house_scope().includes(house));
    assert!(!ctx.house_scope().includes(Uuid::new_v4()));
  }

  #[test]
  fn unassigned_non_admin_sees_nothing() {
    let ctx = StaffContext::for_staff(&staff(StaffRole::Manager, None));
    assert_eq!(ctx.house_scope(), HouseScope::Unassigned);
    assert!(matches!(ctx.stamp_house(None), Err(Error::NoAssignedHouse)));
  }

  #[test]
  fn non_admin_writes_are_stamped_with_own_house() {
    let house = Uuid::new_v4();
    let ctx = StaffContext::for_staff(&staff(StaffRole::SupportStaff, Some(house)));
    assert_eq!(ctx.stamp_house(Some(Uuid::new_v4())).unwrap(), house);
    assert_eq!(ctx.stamp_house(None).unwrap(), house);
  }

  #[test]
  fn admin_must_name_the_house() {
    let ctx = StaffContext::for_staff(&staff(StaffRole::Admin, None));
    let house = Uuid::new_v4();
    assert_eq!(ctx.stamp_house(Some(house)).unwrap(), house);
    assert!(matches!(ctx.stamp_house(None), Err(Error::MissingField("house_id"))));
  }

  #[test]
  fn unbounded_window_is_admin_only() {
    let manager = StaffContext::for_staff(&staff(StaffRole::Manager, Some(Uuid::new_v4())));
    let admin = StaffContext::for_staff(&staff(StaffRole::Admin, None));
    assert!(matches!(manager.check_window(RecencyWindow::All), Err(Error::Forbidden(_))));
    assert!(manager.check_window(RecencyWindow::Last7Days).is_ok());
    assert!(admin.check_window(RecencyWindow::All).is_ok());
  }

  #[test]
  fn note_query_applies_default_window() {
    let now = Utc::now();
    let house = Uuid::new_v4();
    let ctx = StaffContext::for_staff(&staff(StaffRole::SupportStaff, Some(house)));
    let q = ctx.note_query(NoteKind::Turnover, None, now).unwrap();
    assert_eq!(q.scope, HouseScope::Only(house));
    assert_eq!(q.since, RecencyWindow::Last48Hours.since(now));
  }

  #[test]
  fn role_guard() {
    let maint = StaffContext::for_staff(&staff(StaffRole::Maintenance, None));
    assert!(maint.require_role(&[StaffRole::Manager]).is_err());
    assert!(maint.require_admin().is_err());
    let admin = StaffContext::for_staff(&staff(StaffRole::Admin, None));
    assert!(admin.require_role(&[StaffRole::Manager]).is_ok());
  }
}
