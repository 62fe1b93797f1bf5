//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use mediacheck_core::dedup::DuplicateVerdict;
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("conflict: {0}")]
  Conflict(String),

  /// A blocking duplicate verdict; the matches ride along in the body.
  #[error("duplicate title")]
  Duplicate(DuplicateVerdict),

  /// Title or score failed the core validation rules.
  #[error("unprocessable: {0}")]
  Unprocessable(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl From<mediacheck_core::Error> for ApiError {
  fn from(e: mediacheck_core::Error) -> Self {
    use mediacheck_core::Error as E;
    match e {
      E::InvalidTitle(_) | E::ScoreOutOfRange(_) => {
        ApiError::Unprocessable(e.to_string())
      }
      E::EntryNotFound(_) | E::UserNotFound(_) => {
        ApiError::NotFound(e.to_string())
      }
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    match self {
      ApiError::NotFound(m) => {
        (StatusCode::NOT_FOUND, Json(json!({ "error": m }))).into_response()
      }
      ApiError::BadRequest(m) => {
        (StatusCode::BAD_REQUEST, Json(json!({ "error": m }))).into_response()
      }
      ApiError::Conflict(m) => {
        (StatusCode::CONFLICT, Json(json!({ "error": m }))).into_response()
      }
      ApiError::Duplicate(verdict) => {
        let message = match &verdict {
          DuplicateVerdict::ExactDuplicate { .. } => {
            "an entry with this title already exists"
          }
          _ => "similar titles already exist",
        };
        (
          StatusCode::CONFLICT,
          Json(json!({ "error": message, "duplicate": verdict })),
        )
          .into_response()
      }
      ApiError::Unprocessable(m) => (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(json!({ "error": m })),
      )
        .into_response(),
      ApiError::Store(e) => (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": e.to_string() })),
      )
        .into_response(),
    }
  }
}
