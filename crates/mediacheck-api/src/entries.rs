//! Handlers for `/entries` catalogue endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/entries` | Optional `?category=cinema\|series\|manga\|music` |
//! | `POST` | `/entries` | Duplicate-gated create; 409 carries the verdict |
//! | `GET`  | `/entries/:id` | 404 if not found |
//! | `POST` | `/entries/:id/rename` | Duplicate-gated, entry excluded from its own check |
//! | `POST` | `/entries/check-title` | The checker's verdict, no write |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use mediacheck_core::{
  dedup::{self, DuplicateVerdict},
  entry::{Category, Entry, NewEntry},
  store::CatalogueStore,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::ApiError;

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ListParams {
  pub category: Option<Category>,
}

/// `GET /entries[?category=<category>]`
pub async fn list<S>(
  State(store): State<Arc<S>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<Entry>>, ApiError>
where
  S: CatalogueStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let entries = store
    .list_entries(params.category)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(entries))
}

// ─── Create ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CreateBody {
  pub title:    String,
  pub category: Category,
  pub url:      Option<String>,
  pub plot:     Option<String>,
  pub chapters: Option<String>,
  #[serde(default)]
  pub quotes:   Vec<String>,
}

/// `POST /entries` — the duplicate check runs against all existing titles
/// of the same category before anything is written. Both exact and near
/// verdicts block the create.
pub async fn create<S>(
  State(store): State<Arc<S>>,
  Json(body): Json<CreateBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: CatalogueStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let title = dedup::validate_title(&body.title)?.to_owned();

  let candidates = store
    .dedup_candidates(body.category, None)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  let verdict = dedup::check_duplicate(&title, body.category, &candidates, None)?;
  if verdict.is_duplicate() {
    return Err(ApiError::Duplicate(verdict));
  }

  let entry = store
    .add_entry(NewEntry {
      title,
      category: body.category,
      url: body.url,
      plot: body.plot,
      chapters: body.chapters,
      quotes: body.quotes,
    })
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;

  Ok((StatusCode::CREATED, Json(entry)))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /entries/:id`
pub async fn get_one<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Entry>, ApiError>
where
  S: CatalogueStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let entry = store
    .get_entry(id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or_else(|| ApiError::NotFound(format!("entry {id} not found")))?;
  Ok(Json(entry))
}

// ─── Rename ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct RenameBody {
  pub title: String,
}

/// `POST /entries/:id/rename` — body: `{"title":"..."}`
///
/// The entry's own id is excluded from the duplicate check, so renaming to
/// a variation of its current title never collides with itself.
pub async fn rename<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
  Json(body): Json<RenameBody>,
) -> Result<Json<Entry>, ApiError>
where
  S: CatalogueStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let entry = store
    .get_entry(id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or_else(|| ApiError::NotFound(format!("entry {id} not found")))?;

  let title = dedup::validate_title(&body.title)?.to_owned();

  let candidates = store
    .dedup_candidates(entry.category, Some(id))
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  let verdict =
    dedup::check_duplicate(&title, entry.category, &candidates, Some(id))?;
  if verdict.is_duplicate() {
    return Err(ApiError::Duplicate(verdict));
  }

  let renamed = store
    .rename_entry(id, title)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(renamed))
}

// ─── Check title ──────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CheckTitleBody {
  pub title:      String,
  pub category:   Category,
  pub exclude_id: Option<Uuid>,
}

/// `POST /entries/check-title` — run the duplicate checker and return its
/// verdict without writing anything.
pub async fn check_title<S>(
  State(store): State<Arc<S>>,
  Json(body): Json<CheckTitleBody>,
) -> Result<Json<DuplicateVerdict>, ApiError>
where
  S: CatalogueStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let candidates = store
    .dedup_candidates(body.category, body.exclude_id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  let verdict = dedup::check_duplicate(
    &body.title,
    body.category,
    &candidates,
    body.exclude_id,
  )?;
  Ok(Json(verdict))
}
