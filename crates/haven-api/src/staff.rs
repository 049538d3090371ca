//! Handlers for `/staff` endpoints. Admin only.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/staff` | |
//! | `POST` | `/staff` | Body: [`NewStaff`]; returns 201 |
//! | `PUT`  | `/staff/{id}/house` | Body: `{"house_id": "<id>"\|null}` |
//! | `PUT`  | `/staff/{id}/pin` | Body: `{"pin": "1234"\|null}` |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use haven_core::{
  staff::{NewStaff, Staff},
  store::HousingStore,
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::{ApiState, audit, context::Caller, error::ApiError, pin};

/// `GET /staff`
pub async fn list<S>(
  State(state): State<ApiState<S>>,
  Caller(ctx): Caller,
) -> Result<Json<Vec<Staff>>, ApiError>
where
  S: HousingStore + 'static,
{
  ctx.require_admin()?;
  let staff = state.store.list_staff().await.map_err(ApiError::store)?;
  Ok(Json(staff))
}

/// `POST /staff`
pub async fn create<S>(
  State(state): State<ApiState<S>>,
  Caller(ctx): Caller,
  Json(body): Json<NewStaff>,
) -> Result<impl IntoResponse, ApiError>
where
  S: HousingStore + 'static,
{
  ctx.require_admin()?;
  if body.email.trim().is_empty() {
    return Err(haven_core::Error::MissingField("email").into());
  }
  let staff = state.store.add_staff(body).await.map_err(ApiError::store)?;
  audit::record(
    state.store.as_ref(),
    ctx.staff_id,
    "staff.create",
    json!({ "staff_id": staff.staff_id, "role": staff.role }),
  )
  .await;
  Ok((StatusCode::CREATED, Json(staff)))
}

#[derive(Debug, Deserialize)]
pub struct HouseBody {
  pub house_id: Option<Uuid>,
}

/// `PUT /staff/{id}/house`. Pin a staff member to a house, or unpin with
/// `null`.
pub async fn assign_house<S>(
  State(state): State<ApiState<S>>,
  Caller(ctx): Caller,
  Path(id): Path<Uuid>,
  Json(body): Json<HouseBody>,
) -> Result<Json<Staff>, ApiError>
where
  S: HousingStore + 'static,
{
  ctx.require_admin()?;
  let staff = state
    .store
    .assign_house(id, body.house_id)
    .await
    .map_err(ApiError::store)?;
  audit::record(
    state.store.as_ref(),
    ctx.staff_id,
    "staff.assign_house",
    json!({ "staff_id": id, "house_id": body.house_id }),
  )
  .await;
  Ok(Json(staff))
}

#[derive(Debug, Deserialize)]
pub struct PinBody {
  pub pin: Option<String>,
}

/// `PUT /staff/{id}/pin`. Set or clear the PIN used at the edge endpoints.
pub async fn set_pin<S>(
  State(state): State<ApiState<S>>,
  Caller(ctx): Caller,
  Path(id): Path<Uuid>,
  Json(body): Json<PinBody>,
) -> Result<Json<Staff>, ApiError>
where
  S: HousingStore + 'static,
{
  ctx.require_admin()?;
  let hash = match body.pin {
    Some(code) => {
      let others = state
        .store
        .list_staff_with_pin()
        .await
        .map_err(ApiError::store)?
        .into_iter()
        .filter(|s| s.staff_id != id)
        .collect();
      Some(pin::hash_new_pin(code, others).await?)
    }
    None => None,
  };
  let cleared = hash.is_none();
  let staff = state
    .store
    .set_pin_hash(id, hash)
    .await
    .map_err(ApiError::store)?;
  audit::record(
    state.store.as_ref(),
    ctx.staff_id,
    "staff.set_pin",
    json!({ "staff_id": id, "cleared": cleared }),
  )
  .await;
  Ok(Json(staff))
}
