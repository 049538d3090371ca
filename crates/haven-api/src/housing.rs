//! Handlers for `/houses`, `/rooms` and `/beds`.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/houses` | |
//! | `POST` | `/houses` | Admin only. Body: [`NewHouse`] |
//! | `GET`  | `/rooms` | Optional `?house_id` |
//! | `POST` | `/rooms` | Admin only. Body: [`NewRoom`] |
//! | `GET`  | `/beds` | Optional `?room_id` |
//! | `POST` | `/beds` | Admin only. Body: [`NewBed`] |
//! | `GET`  | `/beds/available` | Optional `?house_id` |

use axum::{
  Json,
  extract::{Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use haven_core::{
  housing::{Bed, House, NewBed, NewHouse, NewRoom, Room},
  store::HousingStore,
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::{ApiState, audit, context::Caller, error::ApiError};

#[derive(Debug, Deserialize)]
pub struct HouseFilter {
  pub house_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct RoomFilter {
  pub room_id: Option<Uuid>,
}

fn require_label(value: &str, field: &'static str) -> Result<(), ApiError> {
  if value.trim().is_empty() {
    return Err(haven_core::Error::MissingField(field).into());
  }
  Ok(())
}

// ─── Houses ──────────────────────────────────────────────────────────────────

/// `GET /houses`
pub async fn list_houses<S>(
  State(state): State<ApiState<S>>,
  _caller: Caller,
) -> Result<Json<Vec<House>>, ApiError>
where
  S: HousingStore + 'static,
{
  let houses = state.store.list_houses().await.map_err(ApiError::store)?;
  Ok(Json(houses))
}

/// `POST /houses`
pub async fn create_house<S>(
  State(state): State<ApiState<S>>,
  Caller(ctx): Caller,
  Json(body): Json<NewHouse>,
) -> Result<impl IntoResponse, ApiError>
where
  S: HousingStore + 'static,
{
  ctx.require_admin()?;
  require_label(&body.name, "name")?;
  let house = state.store.add_house(body).await.map_err(ApiError::store)?;
  audit::record(
    state.store.as_ref(),
    ctx.staff_id,
    "house.create",
    json!({ "house_id": house.house_id, "name": house.name }),
  )
  .await;
  Ok((StatusCode::CREATED, Json(house)))
}

// ─── Rooms ───────────────────────────────────────────────────────────────────

/// `GET /rooms[?house_id=<id>]`
pub async fn list_rooms<S>(
  State(state): State<ApiState<S>>,
  _caller: Caller,
  Query(filter): Query<HouseFilter>,
) -> Result<Json<Vec<Room>>, ApiError>
where
  S: HousingStore + 'static,
{
  let rooms = state
    .store
    .list_rooms(filter.house_id)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(rooms))
}

/// `POST /rooms`
pub async fn create_room<S>(
  State(state): State<ApiState<S>>,
  Caller(ctx): Caller,
  Json(body): Json<NewRoom>,
) -> Result<impl IntoResponse, ApiError>
where
  S: HousingStore + 'static,
{
  ctx.require_admin()?;
  require_label(&body.label, "label")?;
  let room = state.store.add_room(body).await.map_err(ApiError::store)?;
  audit::record(
    state.store.as_ref(),
    ctx.staff_id,
    "room.create",
    json!({ "room_id": room.room_id, "house_id": room.house_id }),
  )
  .await;
  Ok((StatusCode::CREATED, Json(room)))
}

// ─── Beds ────────────────────────────────────────────────────────────────────

/// `GET /beds[?room_id=<id>]`
pub async fn list_beds<S>(
  State(state): State<ApiState<S>>,
  _caller: Caller,
  Query(filter): Query<RoomFilter>,
) -> Result<Json<Vec<Bed>>, ApiError>
where
  S: HousingStore + 'static,
{
  let beds = state
    .store
    .list_beds(filter.room_id)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(beds))
}

/// `POST /beds`. New beds are always unoccupied.
pub async fn create_bed<S>(
  State(state): State<ApiState<S>>,
  Caller(ctx): Caller,
  Json(body): Json<NewBed>,
) -> Result<impl IntoResponse, ApiError>
where
  S: HousingStore + 'static,
{
  ctx.require_admin()?;
  require_label(&body.label, "label")?;
  let bed = state.store.add_bed(body).await.map_err(ApiError::store)?;
  audit::record(
    state.store.as_ref(),
    ctx.staff_id,
    "bed.create",
    json!({ "bed_id": bed.bed_id, "room_id": bed.room_id }),
  )
  .await;
  Ok((StatusCode::CREATED, Json(bed)))
}

/// `GET /beds/available[?house_id=<id>]`
///
/// Offer list for the intake and re-admit forms. Nothing is reserved; the
/// claim happens when the admission is submitted.
pub async fn available_beds<S>(
  State(state): State<ApiState<S>>,
  _caller: Caller,
  Query(filter): Query<HouseFilter>,
) -> Result<Json<Vec<Bed>>, ApiError>
where
  S: HousingStore + 'static,
{
  let beds = state
    .store
    .available_beds(filter.house_id)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(beds))
}
