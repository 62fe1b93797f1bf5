//! JSON REST API for MediaCheck.
//!
//! Exposes an axum [`Router`] backed by any
//! [`mediacheck_core::store::CatalogueStore`]. Transport and TLS concerns
//! are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", mediacheck_api::api_router(store.clone()))
//! ```

pub mod entries;
pub mod error;
pub mod ratings;
pub mod users;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use mediacheck_core::store::CatalogueStore;

pub use error::ApiError;

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router
/// regardless of its own state type.
pub fn api_router<S>(store: Arc<S>) -> Router<()>
where
  S: CatalogueStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  Router::new()
    // Users
    .route("/users", post(users::register::<S>))
    .route("/users/{id}", get(users::get_one::<S>))
    .route("/users/{id}/collection", get(users::collection::<S>))
    // Catalogue
    .route("/entries", get(entries::list::<S>).post(entries::create::<S>))
    .route("/entries/check-title", post(entries::check_title::<S>))
    .route("/entries/{id}", get(entries::get_one::<S>))
    .route("/entries/{id}/rename", post(entries::rename::<S>))
    // Ratings
    .route("/entries/{id}/rate", post(ratings::rate::<S>))
    .route("/entries/{id}/status", post(ratings::set_status::<S>))
    .route("/entries/{id}/rating", get(ratings::get_one::<S>))
    .with_state(store)
}

// ─── Integration tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  use axum::{
    body::Body,
    http::{Request, StatusCode, header},
  };
  use mediacheck_store_sqlite::SqliteStore;
  use serde_json::{Value, json};
  use tower::ServiceExt as _;
  use uuid::Uuid;

  async fn app() -> Router {
    let store = SqliteStore::open_in_memory().await.expect("in-memory store");
    api_router(Arc::new(store))
  }

  async fn send(
    app:    &Router,
    method: &str,
    uri:    &str,
    body:   Option<Value>,
  ) -> (StatusCode, Value) {
    let request = match body {
      Some(v) => Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(v.to_string()))
        .unwrap(),
      None => Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
      .await
      .unwrap();
    let value = if bytes.is_empty() {
      Value::Null
    } else {
      serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
  }

  async fn register(app: &Router, username: &str) -> Uuid {
    let (status, body) = send(
      app,
      "POST",
      "/users",
      Some(json!({
        "username": username,
        "email":    format!("{username}@example.com"),
        "password": "hunter2",
      })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "register failed: {body}");
    Uuid::parse_str(body["user_id"].as_str().unwrap()).unwrap()
  }

  async fn create_entry(app: &Router, title: &str, category: &str) -> Uuid {
    let (status, body) = send(
      app,
      "POST",
      "/entries",
      Some(json!({ "title": title, "category": category })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "create failed: {body}");
    Uuid::parse_str(body["entry_id"].as_str().unwrap()).unwrap()
  }

  // ── Users ───────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn register_returns_user_without_password_hash() {
    let app = app().await;
    let (status, body) = send(
      &app,
      "POST",
      "/users",
      Some(json!({
        "username": "alice",
        "email":    "alice@example.com",
        "password": "hunter2",
      })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["username"], "alice");
    assert!(body.get("password_hash").is_none(), "hash leaked: {body}");
  }

  #[tokio::test]
  async fn register_duplicate_username_conflicts() {
    let app = app().await;
    register(&app, "alice").await;

    let (status, _) = send(
      &app,
      "POST",
      "/users",
      Some(json!({
        "username": "alice",
        "email":    "other@example.com",
        "password": "hunter2",
      })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
  }

  #[tokio::test]
  async fn register_duplicate_email_conflicts() {
    let app = app().await;
    register(&app, "alice").await;

    let (status, _) = send(
      &app,
      "POST",
      "/users",
      Some(json!({
        "username": "alice2",
        "email":    "alice@example.com",
        "password": "hunter2",
      })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
  }

  #[tokio::test]
  async fn get_unknown_user_returns_404() {
    let app = app().await;
    let (status, _) =
      send(&app, "GET", &format!("/users/{}", Uuid::new_v4()), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
  }

  // ── Catalogue ───────────────────────────────────────────────────────────

  #[tokio::test]
  async fn create_and_get_entry() {
    let app = app().await;
    let id = create_entry(&app, "Inception", "cinema").await;

    let (status, body) =
      send(&app, "GET", &format!("/entries/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "Inception");
    assert_eq!(body["category"], "cinema");
    assert_eq!(body["aggregate_score"], Value::Null);
  }

  #[tokio::test]
  async fn list_entries_filters_by_category() {
    let app = app().await;
    create_entry(&app, "Inception", "cinema").await;
    create_entry(&app, "Monster", "manga").await;

    let (status, body) = send(&app, "GET", "/entries?category=manga", None).await;
    assert_eq!(status, StatusCode::OK);
    let listed = body.as_array().unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0]["title"], "Monster");
  }

  #[tokio::test]
  async fn exact_duplicate_blocks_create() {
    let app = app().await;
    create_entry(&app, "Inception", "cinema").await;

    let (status, body) = send(
      &app,
      "POST",
      "/entries",
      Some(json!({ "title": "inception", "category": "cinema" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["duplicate"]["verdict"], "exact_duplicate");
  }

  #[tokio::test]
  async fn near_duplicate_blocks_create_and_reports_matches() {
    let app = app().await;
    create_entry(&app, "Inception", "cinema").await;

    let (status, body) = send(
      &app,
      "POST",
      "/entries",
      Some(json!({ "title": "Incepton", "category": "cinema" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["duplicate"]["verdict"], "near_duplicate");

    let matches = body["duplicate"]["matches"].as_array().unwrap();
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0]["title"], "Inception");
    assert!(matches[0]["similarity_percent"].as_u64().unwrap() >= 85);
  }

  #[tokio::test]
  async fn same_title_in_another_category_is_allowed() {
    let app = app().await;
    create_entry(&app, "Inception", "cinema").await;
    // No conflict: categories are isolated.
    create_entry(&app, "Inception", "series").await;
  }

  #[tokio::test]
  async fn bare_numeric_title_is_unprocessable() {
    let app = app().await;
    let (status, _) = send(
      &app,
      "POST",
      "/entries",
      Some(json!({ "title": "42", "category": "cinema" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
  }

  #[tokio::test]
  async fn rename_skips_own_entry_but_blocks_on_others() {
    let app = app().await;
    let id = create_entry(&app, "Incepton", "cinema").await;
    create_entry(&app, "Interstellar", "cinema").await;

    // Fixing a typo in the entry's own title is fine.
    let (status, body) = send(
      &app,
      "POST",
      &format!("/entries/{id}/rename"),
      Some(json!({ "title": "Inception" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "rename failed: {body}");
    assert_eq!(body["title"], "Inception");

    // Renaming onto another entry's title is blocked.
    let (status, _) = send(
      &app,
      "POST",
      &format!("/entries/{id}/rename"),
      Some(json!({ "title": "interstellar" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
  }

  #[tokio::test]
  async fn check_title_reports_verdict_without_writing() {
    let app = app().await;
    create_entry(&app, "Inception", "cinema").await;

    let (status, body) = send(
      &app,
      "POST",
      "/entries/check-title",
      Some(json!({ "title": "Incepton", "category": "cinema" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["verdict"], "near_duplicate");

    // Nothing was created by the check.
    let (_, listed) = send(&app, "GET", "/entries", None).await;
    assert_eq!(listed.as_array().unwrap().len(), 1);
  }

  // ── Ratings ─────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn rating_updates_the_aggregate_score() {
    let app = app().await;
    let alice = register(&app, "alice").await;
    let bob = register(&app, "bob").await;
    let entry = create_entry(&app, "Inception", "cinema").await;

    let (status, body) = send(
      &app,
      "POST",
      &format!("/entries/{entry}/rate"),
      Some(json!({ "user_id": alice, "score": 8.0 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "rate failed: {body}");
    assert_eq!(body["score"], 8.0);

    send(
      &app,
      "POST",
      &format!("/entries/{entry}/rate"),
      Some(json!({ "user_id": bob, "score": 9.0 })),
    )
    .await;

    let (_, fetched) = send(&app, "GET", &format!("/entries/{entry}"), None).await;
    assert_eq!(fetched["aggregate_score"], 8.5);
  }

  #[tokio::test]
  async fn out_of_range_score_is_unprocessable() {
    let app = app().await;
    let alice = register(&app, "alice").await;
    let entry = create_entry(&app, "Inception", "cinema").await;

    let (status, _) = send(
      &app,
      "POST",
      &format!("/entries/{entry}/rate"),
      Some(json!({ "user_id": alice, "score": 10.5 })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
  }

  #[tokio::test]
  async fn rating_unknown_entry_returns_404() {
    let app = app().await;
    let alice = register(&app, "alice").await;

    let (status, _) = send(
      &app,
      "POST",
      &format!("/entries/{}/rate", Uuid::new_v4()),
      Some(json!({ "user_id": alice, "score": 7.0 })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
  }

  #[tokio::test]
  async fn check_status_clears_score_and_aggregate() {
    let app = app().await;
    let alice = register(&app, "alice").await;
    let entry = create_entry(&app, "Inception", "cinema").await;

    send(
      &app,
      "POST",
      &format!("/entries/{entry}/rate"),
      Some(json!({ "user_id": alice, "score": 8.0 })),
    )
    .await;

    let (status, body) = send(
      &app,
      "POST",
      &format!("/entries/{entry}/status"),
      Some(json!({ "user_id": alice, "status": "check" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "check");
    assert_eq!(body["score"], Value::Null);

    let (_, fetched) = send(&app, "GET", &format!("/entries/{entry}"), None).await;
    assert_eq!(fetched["aggregate_score"], Value::Null);
  }

  #[tokio::test]
  async fn get_rating_returns_404_before_first_interaction() {
    let app = app().await;
    let alice = register(&app, "alice").await;
    let entry = create_entry(&app, "Inception", "cinema").await;

    let (status, _) = send(
      &app,
      "GET",
      &format!("/entries/{entry}/rating?user_id={alice}"),
      None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
  }

  // ── Collection ──────────────────────────────────────────────────────────

  #[tokio::test]
  async fn collection_lists_rated_and_tracked_entries() {
    let app = app().await;
    let alice = register(&app, "alice").await;
    let film = create_entry(&app, "Inception", "cinema").await;
    let manga = create_entry(&app, "Monster", "manga").await;
    create_entry(&app, "Dark", "series").await;

    send(
      &app,
      "POST",
      &format!("/entries/{film}/rate"),
      Some(json!({ "user_id": alice, "score": 9.0 })),
    )
    .await;
    send(
      &app,
      "POST",
      &format!("/entries/{manga}/status"),
      Some(json!({ "user_id": alice, "status": "watching" })),
    )
    .await;

    let (status, body) =
      send(&app, "GET", &format!("/users/{alice}/collection"), None).await;
    assert_eq!(status, StatusCode::OK);
    let items = body.as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert!(items.iter().all(|i| i["rating"]["user_id"] == alice.to_string()));
  }

  #[tokio::test]
  async fn collection_of_unknown_user_returns_404() {
    let app = app().await;
    let (status, _) = send(
      &app,
      "GET",
      &format!("/users/{}/collection", Uuid::new_v4()),
      None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
  }
}
