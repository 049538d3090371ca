//! PIN-authenticated edge endpoints, used from shared house devices where
//! nobody is signed in. The PIN is the sole credential.
//!
//! | Method | Path | Body |
//! |--------|------|------|
//! | `POST` | `/edge/discharge` | `{"pin", "resident_id", "reason", ...}` |
//! | `POST` | `/edge/shift-note` | `{"pin", "house_id"?, "shift", "body"}` |

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use haven_api::{ApiError, audit, pin, residents::TransitionResponse};
use haven_core::{
  note::{NewNote, NoteKind},
  resident::DischargeRequest,
  scope::StaffContext,
  staff::Staff,
  store::HousingStore,
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::{AppState, error::Error};

/// Find the staff member whose PIN hash matches `code`. Verification runs on
/// the blocking pool.
pub async fn authenticate<S: HousingStore>(store: &S, code: String) -> Result<Staff, Error> {
  let candidates = store.list_staff_with_pin().await.map_err(ApiError::store)?;
  let matched = tokio::task::spawn_blocking(move || {
    pin::match_pin(&code, &candidates).cloned()
  })
  .await
  .map_err(|e| ApiError::Internal(format!("pin check panicked: {e}")))?;

  matched.ok_or_else(|| {
    tracing::warn!("edge request with unrecognised pin");
    Error::Unauthorized
  })
}

// ─── Discharge ───────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct DischargeBody {
  pub pin:         String,
  pub resident_id: Uuid,
  #[serde(flatten)]
  pub request:     DischargeRequest,
}

/// `POST /edge/discharge`
pub async fn discharge<S>(
  State(state): State<AppState<S>>,
  Json(body): Json<DischargeBody>,
) -> Result<Json<TransitionResponse>, Error>
where
  S: HousingStore + 'static,
{
  let staff = authenticate(state.store.as_ref(), body.pin).await?;
  let discharge = body.request.validate(body.resident_id)?;

  let (resident, event) = state
    .store
    .discharge(discharge)
    .await
    .map_err(ApiError::store)?;

  audit::record(
    state.store.as_ref(),
    Some(staff.staff_id),
    "edge.discharge",
    json!({ "resident_id": resident.resident_id, "event_id": event.event_id }),
  )
  .await;
  Ok(Json(TransitionResponse { resident, event }))
}

// ─── Shift note ──────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ShiftNoteBody {
  pub pin:         String,
  /// Only honoured for admins; other staff write into their own house.
  pub house_id:    Option<Uuid>,
  pub resident_id: Option<Uuid>,
  pub shift:       String,
  pub body:        String,
}

/// `POST /edge/shift-note`. Records a turnover note.
pub async fn shift_note<S>(
  State(state): State<AppState<S>>,
  Json(body): Json<ShiftNoteBody>,
) -> Result<impl IntoResponse, Error>
where
  S: HousingStore + 'static,
{
  let staff = authenticate(state.store.as_ref(), body.pin).await?;
  let ctx = StaffContext::for_staff(&staff);
  let house_id = ctx.stamp_house(body.house_id)?;

  let note = NewNote {
    kind: NoteKind::Turnover,
    house_id,
    resident_id: body.resident_id,
    shift: body.shift,
    body: body.body,
    submitted_by: Some(staff.staff_id),
  }
  .validate()?;

  let note = state.store.add_note(note).await.map_err(ApiError::store)?;

  audit::record(
    state.store.as_ref(),
    Some(staff.staff_id),
    "edge.shift_note",
    json!({ "note_id": note.note_id, "house_id": house_id }),
  )
  .await;
  Ok((StatusCode::CREATED, Json(note)))
}
