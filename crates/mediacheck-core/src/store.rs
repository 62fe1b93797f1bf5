//! The `CatalogueStore` trait and supporting read-model types.
//!
//! The trait is implemented by storage backends (e.g.
//! `mediacheck-store-sqlite`). The API layer depends on this abstraction,
//! not on any concrete backend.

use std::future::Future;

use serde::Serialize;
use uuid::Uuid;

use crate::{
  dedup::TitleRef,
  entry::{Category, Entry, NewEntry},
  rating::{Rating, WatchStatus},
  user::{NewUser, User},
};

// ─── Read models ─────────────────────────────────────────────────────────────

/// An entry paired with the owning user's rating — one item of a user's
/// collection view.
#[derive(Debug, Clone, Serialize)]
pub struct CollectionItem {
  pub entry:  Entry,
  pub rating: Rating,
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a MediaCheck catalogue backend.
///
/// Rating writes are upserts: the (user, entry) row is created on first
/// interaction and updated in place afterwards. Every write that can change
/// the set of scores for an entry recomputes that entry's aggregate before
/// returning.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait CatalogueStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Users ─────────────────────────────────────────────────────────────

  /// Create and persist a new user. Username and email are unique.
  fn add_user(
    &self,
    input: NewUser,
  ) -> impl Future<Output = Result<User, Self::Error>> + Send + '_;

  /// Retrieve a user by id. Returns `None` if not found.
  fn get_user(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + '_;

  /// Look up a user by username. Returns `None` if not found.
  fn find_user<'a>(
    &'a self,
    username: &'a str,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + 'a;

  /// Look up a user by email. Returns `None` if not found.
  fn find_user_by_email<'a>(
    &'a self,
    email: &'a str,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + 'a;

  // ── Catalogue entries ─────────────────────────────────────────────────

  /// Create and persist a new catalogue entry with no aggregate score.
  ///
  /// Callers run the duplicate check first; this method writes
  /// unconditionally.
  fn add_entry(
    &self,
    input: NewEntry,
  ) -> impl Future<Output = Result<Entry, Self::Error>> + Send + '_;

  /// Retrieve an entry by id. Returns `None` if not found.
  fn get_entry(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Entry>, Self::Error>> + Send + '_;

  /// List catalogue entries, optionally restricted to one category,
  /// ordered by aggregate score descending (unrated entries last), then
  /// newest first.
  fn list_entries(
    &self,
    category: Option<Category>,
  ) -> impl Future<Output = Result<Vec<Entry>, Self::Error>> + Send + '_;

  /// Change an entry's title. Callers run the duplicate check first, with
  /// the entry's own id excluded.
  fn rename_entry(
    &self,
    id: Uuid,
    title: String,
  ) -> impl Future<Output = Result<Entry, Self::Error>> + Send + '_;

  /// The duplicate checker's comparison set: all entries of `category`,
  /// excluding `exclude` (the entry being edited, if any).
  fn dedup_candidates(
    &self,
    category: Category,
    exclude: Option<Uuid>,
  ) -> impl Future<Output = Result<Vec<TitleRef>, Self::Error>> + Send + '_;

  // ── Ratings ───────────────────────────────────────────────────────────

  /// Upsert the (user, entry) rating with a new score and recompute the
  /// entry's aggregate. The score must already be within 0..=10; this is
  /// the write boundary that enforces it.
  fn rate(
    &self,
    user_id: Uuid,
    entry_id: Uuid,
    score: f64,
  ) -> impl Future<Output = Result<Rating, Self::Error>> + Send + '_;

  /// Upsert the (user, entry) status. Setting [`WatchStatus::Check`]
  /// forces the score to `None` and recomputes the entry's aggregate.
  fn set_status(
    &self,
    user_id: Uuid,
    entry_id: Uuid,
    status: WatchStatus,
  ) -> impl Future<Output = Result<Rating, Self::Error>> + Send + '_;

  /// Retrieve the (user, entry) rating. Returns `None` if the user has
  /// never interacted with the entry.
  fn get_rating(
    &self,
    user_id: Uuid,
    entry_id: Uuid,
  ) -> impl Future<Output = Result<Option<Rating>, Self::Error>> + Send + '_;

  /// All entries in the user's collection with their ratings, most
  /// recently added first.
  fn user_collection(
    &self,
    user_id: Uuid,
  ) -> impl Future<Output = Result<Vec<CollectionItem>, Self::Error>> + Send + '_;

  // ── Aggregate score ───────────────────────────────────────────────────

  /// Recompute `aggregate_score` for an entry from the full current set of
  /// non-null scores, write it back, and return it. `None` (not zero) when
  /// no scores qualify. Fails if the entry does not exist.
  fn recompute_aggregate(
    &self,
    entry_id: Uuid,
  ) -> impl Future<Output = Result<Option<f64>, Self::Error>> + Send + '_;
}
