//! Handlers for `/users` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/users` | Register; body: [`RegisterBody`] |
//! | `GET`  | `/users/:id` | 404 if not found |
//! | `GET`  | `/users/:id/collection` | Entries with the user's ratings |

use std::sync::Arc;

use argon2::{Argon2, PasswordHasher, password_hash::SaltString};
use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use mediacheck_core::{
  store::{CatalogueStore, CollectionItem},
  user::{NewUser, User},
};
use rand_core::OsRng;
use serde::Deserialize;
use uuid::Uuid;

use crate::error::ApiError;

// ─── Register ─────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct RegisterBody {
  pub username: String,
  pub email:    String,
  pub password: String,
}

/// `POST /users` — body: `{"username":"...","email":"...","password":"..."}`
///
/// The password is hashed here, at the request boundary; only the argon2
/// PHC string reaches the store.
pub async fn register<S>(
  State(store): State<Arc<S>>,
  Json(body): Json<RegisterBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: CatalogueStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let username = body.username.trim().to_owned();
  let email = body.email.trim().to_owned();
  if username.is_empty() || email.is_empty() || body.password.is_empty() {
    return Err(ApiError::BadRequest(
      "username, email and password are required".into(),
    ));
  }

  if store
    .find_user(&username)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .is_some()
  {
    return Err(ApiError::Conflict("username already exists".into()));
  }
  if store
    .find_user_by_email(&email)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .is_some()
  {
    return Err(ApiError::Conflict("email already exists".into()));
  }

  let salt = SaltString::generate(&mut OsRng);
  let password_hash = Argon2::default()
    .hash_password(body.password.as_bytes(), &salt)
    .map_err(|e| ApiError::Store(e.to_string().into()))?
    .to_string();

  let user = store
    .add_user(NewUser { username, email, password_hash })
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;

  Ok((StatusCode::CREATED, Json(user)))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /users/:id`
pub async fn get_one<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<User>, ApiError>
where
  S: CatalogueStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let user = store
    .get_user(id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or_else(|| ApiError::NotFound(format!("user {id} not found")))?;
  Ok(Json(user))
}

// ─── Collection ───────────────────────────────────────────────────────────────

/// `GET /users/:id/collection`
pub async fn collection<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Vec<CollectionItem>>, ApiError>
where
  S: CatalogueStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  store
    .get_user(id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or_else(|| ApiError::NotFound(format!("user {id} not found")))?;

  let items = store
    .user_collection(id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(items))
}
