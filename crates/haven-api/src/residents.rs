//! Handlers for `/residents` endpoints: intake, the occupancy transitions,
//! and the resident event history.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/residents` | Optional `?status=Active\|Discharged\|Pending` |
//! | `POST`   | `/residents` | Admit. Body: [`AdmissionRequest`]; returns 201 |
//! | `GET`    | `/residents/{id}` | 404 if not found |
//! | `DELETE` | `/residents/{id}` | Admin or Manager. Releases the bed |
//! | `POST`   | `/residents/{id}/discharge` | Body: [`DischargeRequest`] |
//! | `POST`   | `/residents/{id}/readmit` | Body: [`ReadmissionRequest`] |
//! | `POST`   | `/residents/{id}/transfer` | Body: [`TransferRequest`] |
//! | `POST`   | `/residents/{id}/level` | Body: [`LevelBody`] |
//! | `GET`    | `/residents/{id}/events` | Optional `?kind`, `?limit` |
//! | `POST`   | `/residents/{id}/events` | Body: [`EventBody`]; `ua`, `bac`, `shift_note` only |

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use haven_core::{
  event::{EventDetail, EventKind, EventQuery, NewEvent, ResidentEvent},
  resident::{
    AdmissionRequest, DischargeRequest, LevelOfCare, ReadmissionRequest,
    Resident, ResidentStatus, TransferRequest,
  },
  staff::StaffRole,
  store::HousingStore,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use crate::{ApiState, audit, context::Caller, error::ApiError};

/// A resident transition that also produced an event.
#[derive(Debug, Serialize)]
pub struct TransitionResponse {
  pub resident: Resident,
  pub event:    ResidentEvent,
}

// ─── List / get ──────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ListParams {
  pub status: Option<ResidentStatus>,
}

/// `GET /residents[?status=<status>]`
pub async fn list<S>(
  State(state): State<ApiState<S>>,
  _caller: Caller,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<Resident>>, ApiError>
where
  S: HousingStore + 'static,
{
  let residents = state
    .store
    .list_residents(params.status)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(residents))
}

/// `GET /residents/{id}`
pub async fn get_one<S>(
  State(state): State<ApiState<S>>,
  _caller: Caller,
  Path(id): Path<Uuid>,
) -> Result<Json<Resident>, ApiError>
where
  S: HousingStore + 'static,
{
  let resident = state
    .store
    .get_resident(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("resident {id} not found")))?;
  Ok(Json(resident))
}

// ─── Admit ───────────────────────────────────────────────────────────────────

/// `POST /residents`. Validates before any write, then admits into the
/// chosen bed.
pub async fn admit<S>(
  State(state): State<ApiState<S>>,
  Caller(ctx): Caller,
  Json(body): Json<AdmissionRequest>,
) -> Result<impl IntoResponse, ApiError>
where
  S: HousingStore + 'static,
{
  let admission = body.validate()?;
  let resident = state.store.admit(admission).await.map_err(ApiError::store)?;
  audit::record(
    state.store.as_ref(),
    ctx.staff_id,
    "resident.admit",
    json!({
      "resident_id": resident.resident_id,
      "name": resident.full_name(),
      "bed_id": resident.bed_id,
    }),
  )
  .await;
  Ok((StatusCode::CREATED, Json(resident)))
}

// ─── Delete ──────────────────────────────────────────────────────────────────

/// `DELETE /residents/{id}`. Releases any held bed; event history is kept.
pub async fn delete_one<S>(
  State(state): State<ApiState<S>>,
  Caller(ctx): Caller,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError>
where
  S: HousingStore + 'static,
{
  ctx.require_role(&[StaffRole::Manager])?;
  let resident = state.store.delete_resident(id).await.map_err(ApiError::store)?;
  audit::record(
    state.store.as_ref(),
    ctx.staff_id,
    "resident.delete",
    json!({
      "resident_id": id,
      "name": resident.full_name(),
      "bed_id": resident.bed_id,
    }),
  )
  .await;
  Ok(StatusCode::NO_CONTENT)
}

// ─── Discharge / re-admit / transfer ─────────────────────────────────────────

/// `POST /residents/{id}/discharge`
pub async fn discharge<S>(
  State(state): State<ApiState<S>>,
  Caller(ctx): Caller,
  Path(id): Path<Uuid>,
  Json(body): Json<DischargeRequest>,
) -> Result<Json<TransitionResponse>, ApiError>
where
  S: HousingStore + 'static,
{
  let discharge = body.validate(id)?;
  let (resident, event) = state
    .store
    .discharge(discharge)
    .await
    .map_err(ApiError::store)?;
  audit::record(
    state.store.as_ref(),
    ctx.staff_id,
    "resident.discharge",
    json!({ "resident_id": id, "event_id": event.event_id }),
  )
  .await;
  Ok(Json(TransitionResponse { resident, event }))
}

/// `POST /residents/{id}/readmit`
pub async fn readmit<S>(
  State(state): State<ApiState<S>>,
  Caller(ctx): Caller,
  Path(id): Path<Uuid>,
  Json(body): Json<ReadmissionRequest>,
) -> Result<Json<Resident>, ApiError>
where
  S: HousingStore + 'static,
{
  let readmission = body.validate(id)?;
  let resident = state
    .store
    .readmit(readmission)
    .await
    .map_err(ApiError::store)?;
  audit::record(
    state.store.as_ref(),
    ctx.staff_id,
    "resident.readmit",
    json!({ "resident_id": id, "bed_id": resident.bed_id }),
  )
  .await;
  Ok(Json(resident))
}

/// `POST /residents/{id}/transfer`
pub async fn transfer<S>(
  State(state): State<ApiState<S>>,
  Caller(ctx): Caller,
  Path(id): Path<Uuid>,
  Json(body): Json<TransferRequest>,
) -> Result<Json<TransitionResponse>, ApiError>
where
  S: HousingStore + 'static,
{
  let transfer = body.validate(id)?;
  let (resident, event) = state
    .store
    .transfer(transfer)
    .await
    .map_err(ApiError::store)?;
  audit::record(
    state.store.as_ref(),
    ctx.staff_id,
    "resident.transfer",
    json!({ "resident_id": id, "event_id": event.event_id }),
  )
  .await;
  Ok(Json(TransitionResponse { resident, event }))
}

// ─── Level of care ───────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct LevelBody {
  pub level_of_care: LevelOfCare,
  pub notes:         Option<String>,
}

/// `POST /residents/{id}/level`
pub async fn change_level<S>(
  State(state): State<ApiState<S>>,
  Caller(ctx): Caller,
  Path(id): Path<Uuid>,
  Json(body): Json<LevelBody>,
) -> Result<Json<TransitionResponse>, ApiError>
where
  S: HousingStore + 'static,
{
  let (resident, event) = state
    .store
    .change_level_of_care(id, body.level_of_care, body.notes)
    .await
    .map_err(ApiError::store)?;
  audit::record(
    state.store.as_ref(),
    ctx.staff_id,
    "resident.level_change",
    json!({ "resident_id": id, "level_of_care": resident.level_of_care }),
  )
  .await;
  Ok(Json(TransitionResponse { resident, event }))
}

// ─── Events ──────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct EventParams {
  pub kind:  Option<EventKind>,
  pub limit: Option<usize>,
}

/// `GET /residents/{id}/events[?kind=<kind>][&limit=<n>]`, newest first.
pub async fn list_events<S>(
  State(state): State<ApiState<S>>,
  _caller: Caller,
  Path(id): Path<Uuid>,
  Query(params): Query<EventParams>,
) -> Result<Json<Vec<ResidentEvent>>, ApiError>
where
  S: HousingStore + 'static,
{
  let query = EventQuery {
    resident_id: Some(id),
    kinds: params.kind.into_iter().collect(),
    limit: params.limit,
    ..Default::default()
  };
  let events = state.store.list_events(query).await.map_err(ApiError::store)?;
  Ok(Json(events))
}

fn empty_object() -> serde_json::Value { json!({}) }

/// JSON body accepted by `POST /residents/{id}/events`.
///
/// `data` carries the kind-specific payload, e.g. `{"level": 0.02}` for `bac`.
#[derive(Debug, Deserialize)]
pub struct EventBody {
  pub event_type: EventKind,
  #[serde(default = "empty_object")]
  pub data:       serde_json::Value,
  pub notes:      Option<String>,
  pub details:    Option<serde_json::Value>,
}

/// `POST /residents/{id}/events`. Returns 201 and the stored event.
pub async fn record_event<S>(
  State(state): State<ApiState<S>>,
  Caller(ctx): Caller,
  Path(id): Path<Uuid>,
  Json(body): Json<EventBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: HousingStore + 'static,
{
  let detail = EventDetail::from_parts(body.event_type.as_ref(), body.data)?;
  let event = state
    .store
    .record_event(NewEvent {
      resident_id: id,
      detail,
      notes: body.notes,
      details: body.details,
      recorded_by: ctx.staff_id,
    })
    .await
    .map_err(ApiError::store)?;

  audit::record(
    state.store.as_ref(),
    ctx.staff_id,
    "resident.event",
    json!({
      "resident_id": id,
      "event_id": event.event_id,
      "event_type": event.detail.kind(),
    }),
  )
  .await;
  Ok((StatusCode::CREATED, Json(event)))
}
