//! Audit trail: the best-effort writer used after every mutation, and the
//! `/audit` listing.

use axum::{
  Json,
  extract::{Query, State},
};
use haven_core::{
  audit::{AuditEntry, NewAuditEntry},
  store::HousingStore,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{ApiState, context::Caller, error::ApiError};

const DEFAULT_LIMIT: usize = 100;

/// Append an audit entry after the primary write has already succeeded.
///
/// A failed insert is logged and swallowed: the mutation it describes stands.
pub async fn record<S: HousingStore>(
  store: &S,
  staff_id: Option<Uuid>,
  action: &str,
  details: serde_json::Value,
) {
  let entry = NewAuditEntry::new(action, staff_id, details);
  if let Err(e) = store.append_audit(entry).await {
    tracing::warn!(action, staff_id = ?staff_id, error = %e, "audit insert failed");
  }
}

#[derive(Debug, Deserialize)]
pub struct ListParams {
  pub limit: Option<usize>,
}

/// `GET /audit[?limit=<n>]`, admin only.
pub async fn list<S>(
  State(state): State<ApiState<S>>,
  Caller(ctx): Caller,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<AuditEntry>>, ApiError>
where
  S: HousingStore + 'static,
{
  ctx.require_admin()?;
  let entries = state
    .store
    .list_audit(params.limit.unwrap_or(DEFAULT_LIMIT))
    .await
    .map_err(ApiError::store)?;
  Ok(Json(entries))
}
