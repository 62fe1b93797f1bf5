//! Handlers for rating and status endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/entries/:id/rate` | Body: `{"user_id":"...","score":8.5}` |
//! | `POST` | `/entries/:id/status` | Body: `{"user_id":"...","status":"completed"}` |
//! | `GET`  | `/entries/:id/rating?user_id=` | 404 if the user never touched the entry |
//!
//! Both writes upsert the (user, entry) row and leave the entry's
//! aggregate score consistent before responding.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
};
use mediacheck_core::{
  rating::{Rating, WatchStatus, validate_score},
  store::CatalogueStore,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::ApiError;

/// 404 unless both the entry and the user exist.
async fn ensure_targets<S>(
  store: &Arc<S>,
  entry_id: Uuid,
  user_id: Uuid,
) -> Result<(), ApiError>
where
  S: CatalogueStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  store
    .get_entry(entry_id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or_else(|| ApiError::NotFound(format!("entry {entry_id} not found")))?;
  store
    .get_user(user_id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or_else(|| ApiError::NotFound(format!("user {user_id} not found")))?;
  Ok(())
}

// ─── Rate ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct RateBody {
  pub user_id: Uuid,
  pub score:   f64,
}

/// `POST /entries/:id/rate`
pub async fn rate<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
  Json(body): Json<RateBody>,
) -> Result<Json<Rating>, ApiError>
where
  S: CatalogueStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let score = validate_score(body.score)?;
  ensure_targets(&store, id, body.user_id).await?;

  let rating = store
    .rate(body.user_id, id, score)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(rating))
}

// ─── Status ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct StatusBody {
  pub user_id: Uuid,
  pub status:  WatchStatus,
}

/// `POST /entries/:id/status`
pub async fn set_status<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
  Json(body): Json<StatusBody>,
) -> Result<Json<Rating>, ApiError>
where
  S: CatalogueStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  ensure_targets(&store, id, body.user_id).await?;

  let rating = store
    .set_status(body.user_id, id, body.status)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(rating))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct RatingParams {
  pub user_id: Uuid,
}

/// `GET /entries/:id/rating?user_id=<id>`
pub async fn get_one<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
  Query(params): Query<RatingParams>,
) -> Result<Json<Rating>, ApiError>
where
  S: CatalogueStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let rating = store
    .get_rating(params.user_id, id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or_else(|| {
      ApiError::NotFound(format!(
        "no rating by user {} for entry {id}",
        params.user_id
      ))
    })?;
  Ok(Json(rating))
}
