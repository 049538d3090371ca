//! Handlers for `/notes/{kind}`: shift turnover and observation notes.
//!
//! Both list and create go through the caller's [`StaffContext`]: non-admins
//! only ever read and write their assigned house.
//!
//! [`StaffContext`]: haven_core::scope::StaffContext

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use chrono::Utc;
use haven_core::{
  note::{NewNote, Note, NoteKind, RecencyWindow},
  store::HousingStore,
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::{ApiState, audit, context::Caller, error::ApiError};

#[derive(Debug, Deserialize)]
pub struct ListParams {
  /// `24h`, `48h`, `7d` or `all`. Defaults per kind.
  pub window: Option<RecencyWindow>,
  pub limit:  Option<usize>,
}

/// `GET /notes/{kind}[?window=<w>][&limit=<n>]`, newest first.
pub async fn list<S>(
  State(state): State<ApiState<S>>,
  Caller(ctx): Caller,
  Path(kind): Path<NoteKind>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<Note>>, ApiError>
where
  S: HousingStore + 'static,
{
  let mut query = ctx.note_query(kind, params.window, Utc::now())?;
  query.limit = params.limit;
  let notes = state.store.list_notes(query).await.map_err(ApiError::store)?;
  Ok(Json(notes))
}

#[derive(Debug, Deserialize)]
pub struct NoteBody {
  /// Required for admins; ignored for everyone else.
  pub house_id:    Option<Uuid>,
  pub resident_id: Option<Uuid>,
  pub shift:       String,
  pub body:        String,
}

/// `POST /notes/{kind}`. Returns 201 and the stored note, stamped with the
/// caller's house.
pub async fn create<S>(
  State(state): State<ApiState<S>>,
  Caller(ctx): Caller,
  Path(kind): Path<NoteKind>,
  Json(body): Json<NoteBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: HousingStore + 'static,
{
  let note = NewNote {
    kind,
    house_id: ctx.stamp_house(body.house_id)?,
    resident_id: body.resident_id,
    shift: body.shift,
    body: body.body,
    submitted_by: ctx.staff_id,
  }
  .validate()?;

  let note = state.store.add_note(note).await.map_err(ApiError::store)?;

  audit::record(
    state.store.as_ref(),
    ctx.staff_id,
    &format!("note.{kind}"),
    json!({ "note_id": note.note_id, "house_id": note.house_id }),
  )
  .await;
  Ok((StatusCode::CREATED, Json(note)))
}
