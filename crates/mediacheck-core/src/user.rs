//! User accounts.
//!
//! Passwords are stored as argon2 PHC strings. Hashing happens at the
//! request boundary — this crate only carries the hash around.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// A registered user. The password hash is never serialised into API
/// responses.
#[derive(Debug, Clone, Serialize)]
pub struct User {
  pub user_id:       Uuid,
  pub username:      String,
  pub email:         String,
  #[serde(skip_serializing)]
  pub password_hash: String,
  pub created_at:    DateTime<Utc>,
}

/// Input to [`crate::store::CatalogueStore::add_user`].
/// `user_id` and `created_at` are always set by the store.
#[derive(Debug, Clone)]
pub struct NewUser {
  pub username:      String,
  pub email:         String,
  pub password_hash: String,
}
