//! Title deduplication — keeps the shared catalogue from accumulating
//! near-identical entries under the same category.
//!
//! [`check_duplicate`] is a pure function: deterministic, no side effects.
//! It runs before any write that creates or renames an entry; the write
//! path blocks on anything other than [`DuplicateVerdict::NoDuplicate`].

use serde::Serialize;
use uuid::Uuid;

use crate::{Error, Result, entry::Category};

/// Similarity ratio above which two normalized titles count as
/// near-duplicates.
pub const SIMILARITY_THRESHOLD: f64 = 0.85;

/// At most this many near matches are reported, best first.
pub const MAX_NEAR_MATCHES: usize = 3;

const MIN_TITLE_CHARS: usize = 2;
const MAX_TITLE_CHARS: usize = 200;
/// Titles containing a digit must be at least this long ("123" is noise,
/// "1984" is borderline, "Catch-22!" passes).
const MIN_DIGIT_TITLE_CHARS: usize = 5;

// ─── Verdict types ───────────────────────────────────────────────────────────

/// The id/title/category projection of an existing entry, as returned by
/// the datastore's dedup-candidates query.
#[derive(Debug, Clone)]
pub struct TitleRef {
  pub entry_id: Uuid,
  pub title:    String,
  pub category: Category,
}

/// A near-duplicate hit, annotated with its similarity as a whole
/// percentage.
#[derive(Debug, Clone, Serialize)]
pub struct NearMatch {
  pub entry_id:           Uuid,
  pub title:              String,
  pub similarity_percent: u8,
}

/// Outcome of a duplicate check.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "verdict", rename_all = "snake_case")]
pub enum DuplicateVerdict {
  NoDuplicate,
  ExactDuplicate { entry_id: Uuid, title: String },
  NearDuplicate { matches: Vec<NearMatch> },
}

impl DuplicateVerdict {
  pub fn is_duplicate(&self) -> bool { !matches!(self, Self::NoDuplicate) }
}

// ─── Checker ─────────────────────────────────────────────────────────────────

/// Decide whether `candidate` duplicates an existing title of the same
/// category.
///
/// `exclude` skips the entry being edited, so a rename never collides with
/// itself. The comparison set is restricted to `category`; the exact-match
/// pass short-circuits before any fuzzy comparison runs.
pub fn check_duplicate(
  candidate: &str,
  category:  Category,
  existing:  &[TitleRef],
  exclude:   Option<Uuid>,
) -> Result<DuplicateVerdict> {
  let candidate = validate_title(candidate)?;
  let normalized = normalize_title(candidate);
  let candidate_lower = candidate.to_lowercase();

  let pool: Vec<&TitleRef> = existing
    .iter()
    .filter(|t| t.category == category && Some(t.entry_id) != exclude)
    .collect();

  // Exact pass: normalized equality, or raw case-insensitive equality.
  for t in &pool {
    if normalize_title(&t.title) == normalized
      || t.title.to_lowercase() == candidate_lower
    {
      return Ok(DuplicateVerdict::ExactDuplicate {
        entry_id: t.entry_id,
        title:    t.title.clone(),
      });
    }
  }

  // Fuzzy pass over the normalized forms.
  let mut near: Vec<(f64, &TitleRef)> = pool
    .iter()
    .filter_map(|t| {
      let ratio = similarity_ratio(&normalized, &normalize_title(&t.title));
      (ratio > SIMILARITY_THRESHOLD).then_some((ratio, *t))
    })
    .collect();

  if near.is_empty() {
    return Ok(DuplicateVerdict::NoDuplicate);
  }

  near.sort_by(|a, b| {
    b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal)
  });
  near.truncate(MAX_NEAR_MATCHES);

  Ok(DuplicateVerdict::NearDuplicate {
    matches: near
      .into_iter()
      .map(|(ratio, t)| NearMatch {
        entry_id:           t.entry_id,
        title:              t.title.clone(),
        similarity_percent: (ratio * 100.0).round() as u8,
      })
      .collect(),
  })
}

/// Trim and validate a candidate title, returning the trimmed slice.
///
/// Length limits count characters, not bytes.
pub fn validate_title(raw: &str) -> Result<&str> {
  let title = raw.trim();
  let chars = title.chars().count();

  if chars < MIN_TITLE_CHARS {
    return Err(Error::InvalidTitle(
      "title must be at least 2 characters".into(),
    ));
  }
  if chars > MAX_TITLE_CHARS {
    return Err(Error::InvalidTitle(
      "title must be at most 200 characters".into(),
    ));
  }
  if chars < MIN_DIGIT_TITLE_CHARS && title.chars().any(|c| c.is_ascii_digit())
  {
    return Err(Error::InvalidTitle(
      "bare numeric titles are not allowed".into(),
    ));
  }

  Ok(title)
}

/// Canonical comparison form: lowercase, letters/digits/whitespace only,
/// whitespace runs collapsed to a single space, trimmed.
pub fn normalize_title(raw: &str) -> String {
  raw
    .to_lowercase()
    .chars()
    .filter(|c| c.is_alphanumeric() || c.is_whitespace())
    .collect::<String>()
    .split_whitespace()
    .collect::<Vec<_>>()
    .join(" ")
}

/// Matching-characters ratio: `2·M / T`, where `M` is the length of the
/// longest common subsequence of the two strings and `T` their combined
/// length. Ranges over [0, 1]; two empty strings are identical (1.0).
pub fn similarity_ratio(a: &str, b: &str) -> f64 {
  let a: Vec<char> = a.chars().collect();
  let b: Vec<char> = b.chars().collect();
  let total = a.len() + b.len();
  if total == 0 {
    return 1.0;
  }

  // Two-row LCS table: O(|a|·|b|) time, O(|b|) space.
  let mut prev = vec![0usize; b.len() + 1];
  let mut cur = vec![0usize; b.len() + 1];
  for ca in &a {
    for (j, cb) in b.iter().enumerate() {
      cur[j + 1] = if ca == cb {
        prev[j] + 1
      } else {
        cur[j].max(prev[j + 1])
      };
    }
    std::mem::swap(&mut prev, &mut cur);
  }
  let matching = prev[b.len()];

  2.0 * matching as f64 / total as f64
}

// ─── Tests ───────────────────────────────────────────────────────────────────
