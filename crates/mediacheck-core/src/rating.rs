//! Per-user ratings and the aggregate-score arithmetic.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

/// Inclusive score bounds. Enforced at the write boundary, before any score
/// reaches the aggregator.
pub const SCORE_MIN: f64 = 0.0;
pub const SCORE_MAX: f64 = 10.0;

/// Watch/read status of an entry within a user's collection.
///
/// `Check` (unseen, "want to check") doubles as the unrated sentinel:
/// setting it clears the user's score and removes it from the aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WatchStatus {
  Check,
  Watching,
  Completed,
  Dropped,
}

impl WatchStatus {
  /// Whether setting this status forces the score back to `None`.
  pub fn clears_score(&self) -> bool { matches!(self, Self::Check) }
}

/// A user's interaction with one catalogue entry. Exactly one row exists
/// per (user, entry) pair; it is created on first interaction via upsert
/// and never deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rating {
  pub user_id:    Uuid,
  pub entry_id:   Uuid,
  /// `None` until the user rates the entry, or after a status change
  /// clears it.
  pub score:      Option<f64>,
  pub status:     WatchStatus,
  pub added_at:   DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

/// Validate a score against [`SCORE_MIN`]..=[`SCORE_MAX`].
pub fn validate_score(score: f64) -> Result<f64> {
  if !score.is_finite() || !(SCORE_MIN..=SCORE_MAX).contains(&score) {
    return Err(Error::ScoreOutOfRange(score));
  }
  Ok(score)
}

/// Unweighted arithmetic mean at full precision. `None` for an empty set —
/// never zero, so an unrated entry is distinguishable from one rated 0.
pub fn mean(scores: &[f64]) -> Option<f64> {
  if scores.is_empty() {
    return None;
  }
  Some(scores.iter().sum::<f64>() / scores.len() as f64)
}
