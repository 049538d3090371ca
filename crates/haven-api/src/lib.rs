//! JSON REST API for Haven.
//!
//! Exposes an axum [`Router`] backed by any [`haven_core::store::HousingStore`].
//! Session handling and TLS are the caller's responsibility: the front door
//! authenticates the user and forwards their address in `x-staff-email`.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", haven_api::api_router(store.clone(), UnprovisionedAccess::Admin))
//! ```

pub mod audit;
pub mod context;
pub mod error;
pub mod housing;
pub mod notes;
pub mod occupancy;
pub mod pin;
pub mod residents;
pub mod staff;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post, put},
};
use haven_core::{scope::UnprovisionedAccess, store::HousingStore};

pub use context::{Caller, STAFF_EMAIL_HEADER};
pub use error::ApiError;

/// Shared state threaded through all API handlers.
pub struct ApiState<S> {
  pub store:  Arc<S>,
  /// Policy for authenticated identities with no staff record.
  pub access: UnprovisionedAccess,
}

impl<S> Clone for ApiState<S> {
  fn clone(&self) -> Self {
    Self { store: Arc::clone(&self.store), access: self.access }
  }
}

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>, access: UnprovisionedAccess) -> Router<()>
where
  S: HousingStore + 'static,
{
  Router::new()
    // Housing
    .route("/houses", get(housing::list_houses::<S>).post(housing::create_house::<S>))
    .route("/rooms", get(housing::list_rooms::<S>).post(housing::create_room::<S>))
    .route("/beds", get(housing::list_beds::<S>).post(housing::create_bed::<S>))
    .route("/beds/available", get(housing::available_beds::<S>))
    // Occupancy
    .route("/occupancy/rooms", get(occupancy::rooms::<S>))
    .route("/occupancy/census", get(occupancy::census::<S>))
    .route("/occupancy/reconcile", get(occupancy::reconcile::<S>))
    // Residents
    .route("/residents", get(residents::list::<S>).post(residents::admit::<S>))
    .route(
      "/residents/{id}",
      get(residents::get_one::<S>).delete(residents::delete_one::<S>),
    )
    .route("/residents/{id}/discharge", post(residents::discharge::<S>))
    .route("/residents/{id}/readmit", post(residents::readmit::<S>))
    .route("/residents/{id}/transfer", post(residents::transfer::<S>))
    .route("/residents/{id}/level", post(residents::change_level::<S>))
    .route(
      "/residents/{id}/events",
      get(residents::list_events::<S>).post(residents::record_event::<S>),
    )
    // Notes
    .route("/notes/{kind}", get(notes::list::<S>).post(notes::create::<S>))
    // Staff
    .route("/staff", get(staff::list::<S>).post(staff::create::<S>))
    .route("/staff/{id}/house", put(staff::assign_house::<S>))
    .route("/staff/{id}/pin", put(staff::set_pin::<S>))
    // Audit
    .route("/audit", get(audit::list::<S>))
    .with_state(ApiState { store, access })
}
