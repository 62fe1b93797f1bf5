//! Error types for `mediacheck-core`.

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum Error {
  /// Candidate title failed the duplicate checker's length/format rules.
  #[error("invalid title: {0}")]
  InvalidTitle(String),

  #[error("score {0} is outside the 0..=10 range")]
  ScoreOutOfRange(f64),

  #[error("entry not found: {0}")]
  EntryNotFound(Uuid),

  #[error("user not found: {0}")]
  UserNotFound(Uuid),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
