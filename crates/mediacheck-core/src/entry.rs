//! Catalogue entries — the shared titles that users collect and rate.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The kind of media an entry catalogues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
  Cinema,
  Series,
  Manga,
  Music,
}

/// A catalogued title.
///
/// `aggregate_score` is a derived, cached field — the source of truth is
/// the set of per-user scores at any instant. It is written only by
/// [`crate::store::CatalogueStore::recompute_aggregate`] and stays `None`
/// until at least one rating exists.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entry {
  pub entry_id:        Uuid,
  pub title:           String,
  pub category:        Category,
  pub url:             Option<String>,
  pub plot:            Option<String>,
  /// Chapter notes; only meaningful for [`Category::Manga`].
  pub chapters:        Option<String>,
  pub quotes:          Vec<String>,
  pub aggregate_score: Option<f64>,
  pub created_at:      DateTime<Utc>,
}

/// Input to [`crate::store::CatalogueStore::add_entry`].
/// `entry_id` and `created_at` are always set by the store.
#[derive(Debug, Clone)]
pub struct NewEntry {
  pub title:    String,
  pub category: Category,
  pub url:      Option<String>,
  pub plot:     Option<String>,
  pub chapters: Option<String>,
  pub quotes:   Vec<String>,
}

impl NewEntry {
  /// Convenience constructor with all optional fields left empty.
  pub fn new(title: impl Into<String>, category: Category) -> Self {
    Self {
      title: title.into(),
      category,
      url: None,
      plot: None,
      chapters: None,
      quotes: Vec::new(),
    }
  }
}

/// Clean a submitted quote list: trim each quote and drop empties, the way
/// the submission form treats its newline-separated textarea.
pub fn clean_quotes(raw: impl IntoIterator<Item = String>) -> Vec<String> {
  raw
    .into_iter()
    .map(|q| q.trim().to_owned())
    .filter(|q| !q.is_empty())
    .collect()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn clean_quotes_trims_and_drops_empties() {
    let raw = vec![
      "  So long, and thanks for all the fish.  ".to_owned(),
      String::new(),
      "   ".to_owned(),
      "Don't panic.".to_owned(),
    ];
    assert_eq!(clean_quotes(raw), vec![
      "So long, and thanks for all the fish.",
      "Don't panic.",
    ]);
  }
}
