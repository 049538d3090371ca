//! Per-request caller resolution.
//!
//! The authentication boundary in front of the service forwards the signed-in
//! identity in the `x-staff-email` header. [`Caller`] looks the address up in
//! the staff table once and hands handlers a [`StaffContext`].

use axum::{extract::FromRequestParts, http::request::Parts};
use haven_core::{scope::StaffContext, store::HousingStore};

use crate::{ApiState, error::ApiError};

pub const STAFF_EMAIL_HEADER: &str = "x-staff-email";

/// The resolved caller. Present in a handler means the request carried an
/// identity the scoping policy accepts.
#[derive(Debug, Clone)]
pub struct Caller(pub StaffContext);

impl<S> FromRequestParts<ApiState<S>> for Caller
where
  S: HousingStore + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &ApiState<S>,
  ) -> Result<Self, Self::Rejection> {
    let email = parts
      .headers
      .get(STAFF_EMAIL_HEADER)
      .and_then(|v| v.to_str().ok())
      .map(str::trim)
      .filter(|v| !v.is_empty())
      .ok_or_else(|| ApiError::Unauthorized(format!("missing {STAFF_EMAIL_HEADER} header")))?
      .to_owned();

    let staff = state
      .store
      .find_staff_by_email(email.clone())
      .await
      .map_err(ApiError::store)?;

    let ctx = StaffContext::resolve(&email, staff.as_ref(), state.access)?;
    if staff.is_none() {
      tracing::debug!(%email, "unprovisioned caller admitted with admin scope");
    }
    Ok(Caller(ctx))
  }
}
