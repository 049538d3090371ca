//! The Haven service: configuration, router assembly, the PIN-authenticated
//! edge endpoints and the trigger-gated daily digest.
//!
//! The JSON API from [`haven_api`] is nested under `/api`.

pub mod digest;
pub mod edge;
pub mod error;
pub mod mail;

pub use error::Error;

use std::{path::PathBuf, sync::Arc};

use axum::{
  Router,
  routing::{get, post},
};
use haven_core::{scope::UnprovisionedAccess, store::HousingStore};
use mail::{EmailClient, EmailConfig};
use serde::Deserialize;
use tower_http::trace::TraceLayer;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `haven.toml` and `HAVEN_*`
/// environment variables.
#[derive(Deserialize, Clone)]
pub struct ServerConfig {
  pub host:                 String,
  pub port:                 u16,
  pub store_path:           PathBuf,
  /// Bearer key required by `POST /internal/digest`.
  pub trigger_key:          String,
  /// What to do with callers that have no staff record.
  #[serde(default)]
  pub unprovisioned_access: UnprovisionedAccess,
  pub email:                EmailConfig,
}

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through the server's own handlers.
pub struct AppState<S> {
  pub store:  Arc<S>,
  pub config: Arc<ServerConfig>,
  pub mailer: EmailClient,
}

impl<S> Clone for AppState<S> {
  fn clone(&self) -> Self {
    Self {
      store:  Arc::clone(&self.store),
      config: Arc::clone(&self.config),
      mailer: self.mailer.clone(),
    }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the full service router.
pub fn router<S>(state: AppState<S>) -> Router
where
  S: HousingStore + 'static,
{
  let api = haven_api::api_router(
    Arc::clone(&state.store),
    state.config.unprovisioned_access,
  );

  Router::new()
    .route("/health", get(health))
    .route("/edge/discharge", post(edge::discharge::<S>))
    .route("/edge/shift-note", post(edge::shift_note::<S>))
    .route("/internal/digest", post(digest::trigger::<S>))
    .with_state(state)
    .nest("/api", api)
    .layer(TraceLayer::new_for_http())
}

async fn health() -> &'static str { "ok" }

// ─── Integration tests ────────────────────────────────────────────────────────
