//! Encoding and decoding helpers between Rust domain types and the
//! plain-text representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings, UUIDs as hyphenated lowercase
//! strings, quotes as compact JSON arrays, and the category/status enums as
//! their lowercase labels.

use chrono::{DateTime, Utc};
use mediacheck_core::{
  entry::{Category, Entry},
  rating::{Rating, WatchStatus},
  user::User,
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ────────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::Decode(e.to_string()))
}

// ─── Category ─────────────────────────────────────────────────────────────────

pub fn encode_category(c: Category) -> &'static str {
  match c {
    Category::Cinema => "cinema",
    Category::Series => "series",
    Category::Manga => "manga",
    Category::Music => "music",
  }
}

pub fn decode_category(s: &str) -> Result<Category> {
  match s {
    "cinema" => Ok(Category::Cinema),
    "series" => Ok(Category::Series),
    "manga" => Ok(Category::Manga),
    "music" => Ok(Category::Music),
    other => Err(Error::Decode(format!("unknown category: {other:?}"))),
  }
}

// ─── WatchStatus ──────────────────────────────────────────────────────────────

pub fn encode_status(s: WatchStatus) -> &'static str {
  match s {
    WatchStatus::Check => "check",
    WatchStatus::Watching => "watching",
    WatchStatus::Completed => "completed",
    WatchStatus::Dropped => "dropped",
  }
}

pub fn decode_status(s: &str) -> Result<WatchStatus> {
  match s {
    "check" => Ok(WatchStatus::Check),
    "watching" => Ok(WatchStatus::Watching),
    "completed" => Ok(WatchStatus::Completed),
    "dropped" => Ok(WatchStatus::Dropped),
    other => Err(Error::Decode(format!("unknown status: {other:?}"))),
  }
}

// ─── Quotes ───────────────────────────────────────────────────────────────────

pub fn encode_quotes(quotes: &[String]) -> Result<String> {
  Ok(serde_json::to_string(quotes)?)
}

pub fn decode_quotes(s: &str) -> Result<Vec<String>> {
  Ok(serde_json::from_str(s)?)
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from an `entries` row.
pub struct RawEntry {
  pub entry_id:        String,
  pub title:           String,
  pub category:        String,
  pub url:             Option<String>,
  pub plot:            Option<String>,
  pub chapters:        Option<String>,
  pub quotes:          String,
  pub aggregate_score: Option<f64>,
  pub created_at:      String,
}

impl RawEntry {
  pub fn into_entry(self) -> Result<Entry> {
    Ok(Entry {
      entry_id:        decode_uuid(&self.entry_id)?,
      title:           self.title,
      category:        decode_category(&self.category)?,
      url:             self.url,
      plot:            self.plot,
      chapters:        self.chapters,
      quotes:          decode_quotes(&self.quotes)?,
      aggregate_score: self.aggregate_score,
      created_at:      decode_dt(&self.created_at)?,
    })
  }
}

/// Raw strings read directly from a `ratings` row.
pub struct RawRating {
  pub user_id:    String,
  pub entry_id:   String,
  pub score:      Option<f64>,
  pub status:     String,
  pub added_at:   String,
  pub updated_at: String,
}

impl RawRating {
  pub fn into_rating(self) -> Result<Rating> {
    Ok(Rating {
      user_id:    decode_uuid(&self.user_id)?,
      entry_id:   decode_uuid(&self.entry_id)?,
      score:      self.score,
      status:     decode_status(&self.status)?,
      added_at:   decode_dt(&self.added_at)?,
      updated_at: decode_dt(&self.updated_at)?,
    })
  }
}

/// Raw strings read directly from a `users` row.
pub struct RawUser {
  pub user_id:       String,
  pub username:      String,
  pub email:         String,
  pub password_hash: String,
  pub created_at:    String,
}

impl RawUser {
  pub fn into_user(self) -> Result<User> {
    Ok(User {
      user_id:       decode_uuid(&self.user_id)?,
      username:      self.username,
      email:         self.email,
      password_hash: self.password_hash,
      created_at:    decode_dt(&self.created_at)?,
    })
  }
}
