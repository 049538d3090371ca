//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use haven_core::store::{StoreError, StoreErrorKind};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("unauthorized: {0}")]
  Unauthorized(String),

  #[error("forbidden: {0}")]
  Forbidden(String),

  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("conflict: {0}")]
  Conflict(String),

  #[error("internal error: {0}")]
  Internal(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ApiError {
  /// Classify a backend rejection by its [`StoreErrorKind`].
  pub fn store<E: StoreError>(err: E) -> Self {
    match err.kind() {
      StoreErrorKind::NotFound => Self::NotFound(err.to_string()),
      StoreErrorKind::Conflict => Self::Conflict(err.to_string()),
      StoreErrorKind::Invalid => Self::BadRequest(err.to_string()),
      StoreErrorKind::Internal => Self::Store(Box::new(err)),
    }
  }
}

impl From<haven_core::Error> for ApiError {
  fn from(err: haven_core::Error) -> Self {
    use haven_core::Error as E;
    match err {
      E::MissingField(_) | E::Serialization(_) => Self::BadRequest(err.to_string()),
      E::Forbidden(_) | E::NoAssignedHouse | E::UnknownStaff(_) => {
        Self::Forbidden(err.to_string())
      }
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      ApiError::Unauthorized(m) => (StatusCode::UNAUTHORIZED, m.clone()),
      ApiError::Forbidden(m) => (StatusCode::FORBIDDEN, m.clone()),
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
      ApiError::Conflict(m) => (StatusCode::CONFLICT, m.clone()),
      ApiError::Internal(m) => {
        tracing::error!(error = %m, "internal error");
        (StatusCode::INTERNAL_SERVER_ERROR, m.clone())
      }
      ApiError::Store(e) => {
        tracing::error!(error = %e, "store error");
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
      }
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}
