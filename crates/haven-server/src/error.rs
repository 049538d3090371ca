//! Error types and axum `IntoResponse` implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use haven_api::ApiError;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// Wrong or missing PIN / trigger key.
  #[error("unauthorized")]
  Unauthorized,

  #[error(transparent)]
  Api(#[from] ApiError),

  #[error("template error: {0}")]
  Template(#[from] askama::Error),

  #[error("email provider request failed: {0}")]
  Mail(#[from] reqwest::Error),

  #[error("email provider returned status {0}")]
  MailRejected(u16),

  #[error("no digest recipients configured")]
  NoRecipients,
}

impl From<haven_core::Error> for Error {
  fn from(err: haven_core::Error) -> Self { Self::Api(err.into()) }
}

impl IntoResponse for Error {
  fn into_response(self) -> Response {
    let status = match self {
      Error::Api(inner) => return inner.into_response(),
      Error::Unauthorized => StatusCode::UNAUTHORIZED,
      Error::Template(_) | Error::NoRecipients => {
        tracing::error!(error = %self, "digest failed");
        StatusCode::INTERNAL_SERVER_ERROR
      }
      Error::Mail(_) | Error::MailRejected(_) => {
        tracing::error!(error = %self, "digest delivery failed");
        StatusCode::BAD_GATEWAY
      }
    };
    (status, Json(json!({ "error": self.to_string() }))).into_response()
  }
}
