//! Handlers for `/occupancy` read models.

use axum::{
  Json,
  extract::{Query, State},
};
use haven_core::{
  housing::{HouseCensus, OccupancyIssue, RoomOccupancy},
  store::HousingStore,
};

use crate::{ApiState, context::Caller, error::ApiError, housing::HouseFilter};

/// `GET /occupancy/rooms[?house_id=<id>]`
pub async fn rooms<S>(
  State(state): State<ApiState<S>>,
  _caller: Caller,
  Query(filter): Query<HouseFilter>,
) -> Result<Json<Vec<RoomOccupancy>>, ApiError>
where
  S: HousingStore + 'static,
{
  let rooms = state
    .store
    .room_occupancy(filter.house_id)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(rooms))
}

/// `GET /occupancy/census`
pub async fn census<S>(
  State(state): State<ApiState<S>>,
  _caller: Caller,
) -> Result<Json<Vec<HouseCensus>>, ApiError>
where
  S: HousingStore + 'static,
{
  let census = state.store.census().await.map_err(ApiError::store)?;
  Ok(Json(census))
}

/// `GET /occupancy/reconcile`, admin only.
pub async fn reconcile<S>(
  State(state): State<ApiState<S>>,
  Caller(ctx): Caller,
) -> Result<Json<Vec<OccupancyIssue>>, ApiError>
where
  S: HousingStore + 'static,
{
  ctx.require_admin()?;
  let issues = state
    .store
    .reconcile_occupancy()
    .await
    .map_err(ApiError::store)?;
  Ok(Json(issues))
}
