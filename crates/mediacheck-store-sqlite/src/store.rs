//! [`SqliteStore`] — the SQLite implementation of [`CatalogueStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use mediacheck_core::{
  dedup::TitleRef,
  entry::{Category, Entry, NewEntry, clean_quotes},
  rating::{Rating, WatchStatus, mean, validate_score},
  store::{CatalogueStore, CollectionItem},
  user::{NewUser, User},
};

use crate::{
  Error, Result,
  encode::{
    RawEntry, RawRating, RawUser, decode_category, decode_uuid,
    encode_category, encode_dt, encode_quotes, encode_status, encode_uuid,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A MediaCheck catalogue store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted. All
/// statements for one operation run inside a single `call` closure on the
/// store's serialized connection, so each write is one read-modify-write
/// unit.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Fail with [`Error::EntryNotFound`] unless the entry exists.
  async fn ensure_entry(&self, entry_id: Uuid) -> Result<()> {
    let id_str = encode_uuid(entry_id);
    let exists: bool = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT 1 FROM entries WHERE entry_id = ?1",
              rusqlite::params![id_str],
              |_| Ok(true),
            )
            .optional()?
            .unwrap_or(false),
        )
      })
      .await?;

    if exists {
      Ok(())
    } else {
      Err(Error::EntryNotFound(entry_id))
    }
  }

  /// Fail with [`Error::UserNotFound`] unless the user exists.
  async fn ensure_user(&self, user_id: Uuid) -> Result<()> {
    let id_str = encode_uuid(user_id);
    let exists: bool = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT 1 FROM users WHERE user_id = ?1",
              rusqlite::params![id_str],
              |_| Ok(true),
            )
            .optional()?
            .unwrap_or(false),
        )
      })
      .await?;

    if exists {
      Ok(())
    } else {
      Err(Error::UserNotFound(user_id))
    }
  }
}

// ─── CatalogueStore impl ─────────────────────────────────────────────────────

impl CatalogueStore for SqliteStore {
  type Error = Error;

  // ── Users ──────────────────────────────────────────────────────────────

  async fn add_user(&self, input: NewUser) -> Result<User> {
    let user = User {
      user_id:       Uuid::new_v4(),
      username:      input.username,
      email:         input.email,
      password_hash: input.password_hash,
      created_at:    Utc::now(),
    };

    let id_str   = encode_uuid(user.user_id);
    let username = user.username.clone();
    let email    = user.email.clone();
    let hash     = user.password_hash.clone();
    let at_str   = encode_dt(user.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO users (user_id, username, email, password_hash, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![id_str, username, email, hash, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(user)
  }

  async fn get_user(&self, id: Uuid) -> Result<Option<User>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawUser> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT user_id, username, email, password_hash, created_at
               FROM users WHERE user_id = ?1",
              rusqlite::params![id_str],
              |row| {
                Ok(RawUser {
                  user_id:       row.get(0)?,
                  username:      row.get(1)?,
                  email:         row.get(2)?,
                  password_hash: row.get(3)?,
                  created_at:    row.get(4)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawUser::into_user).transpose()
  }

  async fn find_user(&self, username: &str) -> Result<Option<User>> {
    let username = username.to_owned();

    let raw: Option<RawUser> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT user_id, username, email, password_hash, created_at
               FROM users WHERE username = ?1",
              rusqlite::params![username],
              |row| {
                Ok(RawUser {
                  user_id:       row.get(0)?,
                  username:      row.get(1)?,
                  email:         row.get(2)?,
                  password_hash: row.get(3)?,
                  created_at:    row.get(4)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawUser::into_user).transpose()
  }

  async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
    let email = email.to_owned();

    let raw: Option<RawUser> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT user_id, username, email, password_hash, created_at
               FROM users WHERE email = ?1",
              rusqlite::params![email],
              |row| {
                Ok(RawUser {
                  user_id:       row.get(0)?,
                  username:      row.get(1)?,
                  email:         row.get(2)?,
                  password_hash: row.get(3)?,
                  created_at:    row.get(4)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawUser::into_user).transpose()
  }

  // ── Catalogue entries ──────────────────────────────────────────────────

  async fn add_entry(&self, input: NewEntry) -> Result<Entry> {
    let entry = Entry {
      entry_id:        Uuid::new_v4(),
      title:           input.title,
      category:        input.category,
      url:             input.url,
      plot:            input.plot,
      chapters:        input.chapters,
      quotes:          clean_quotes(input.quotes),
      aggregate_score: None,
      created_at:      Utc::now(),
    };

    let id_str     = encode_uuid(entry.entry_id);
    let title      = entry.title.clone();
    let cat_str    = encode_category(entry.category).to_owned();
    let url        = entry.url.clone();
    let plot       = entry.plot.clone();
    let chapters   = entry.chapters.clone();
    let quotes_str = encode_quotes(&entry.quotes)?;
    let at_str     = encode_dt(entry.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO entries (
             entry_id, title, category, url, plot, chapters, quotes,
             aggregate_score, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, NULL, ?8)",
          rusqlite::params![
            id_str, title, cat_str, url, plot, chapters, quotes_str, at_str,
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(entry)
  }

  async fn get_entry(&self, id: Uuid) -> Result<Option<Entry>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawEntry> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT entry_id, title, category, url, plot, chapters, quotes,
                      aggregate_score, created_at
               FROM entries WHERE entry_id = ?1",
              rusqlite::params![id_str],
              |row| {
                Ok(RawEntry {
                  entry_id:        row.get(0)?,
                  title:           row.get(1)?,
                  category:        row.get(2)?,
                  url:             row.get(3)?,
                  plot:            row.get(4)?,
                  chapters:        row.get(5)?,
                  quotes:          row.get(6)?,
                  aggregate_score: row.get(7)?,
                  created_at:      row.get(8)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawEntry::into_entry).transpose()
  }

  async fn list_entries(&self, category: Option<Category>) -> Result<Vec<Entry>> {
    let cat_str = category.map(encode_category).map(str::to_owned);

    let raws: Vec<RawEntry> = self
      .conn
      .call(move |conn| {
        let map_row = |row: &rusqlite::Row<'_>| {
          Ok(RawEntry {
            entry_id:        row.get(0)?,
            title:           row.get(1)?,
            category:        row.get(2)?,
            url:             row.get(3)?,
            plot:            row.get(4)?,
            chapters:        row.get(5)?,
            quotes:          row.get(6)?,
            aggregate_score: row.get(7)?,
            created_at:      row.get(8)?,
          })
        };

        // Best-rated first, unrated entries last, newest breaking ties.
        let rows = if let Some(c) = cat_str {
          let mut stmt = conn.prepare(
            "SELECT entry_id, title, category, url, plot, chapters, quotes,
                    aggregate_score, created_at
             FROM entries WHERE category = ?1
             ORDER BY aggregate_score IS NULL, aggregate_score DESC,
                      created_at DESC",
          )?;
          stmt
            .query_map(rusqlite::params![c], map_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?
        } else {
          let mut stmt = conn.prepare(
            "SELECT entry_id, title, category, url, plot, chapters, quotes,
                    aggregate_score, created_at
             FROM entries
             ORDER BY aggregate_score IS NULL, aggregate_score DESC,
                      created_at DESC",
          )?;
          stmt
            .query_map([], map_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?
        };
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawEntry::into_entry).collect()
  }

  async fn rename_entry(&self, id: Uuid, title: String) -> Result<Entry> {
    let id_str = encode_uuid(id);

    let changed: usize = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE entries SET title = ?1 WHERE entry_id = ?2",
          rusqlite::params![title, id_str],
        )?)
      })
      .await?;

    if changed == 0 {
      return Err(Error::EntryNotFound(id));
    }

    self.get_entry(id).await?.ok_or(Error::EntryNotFound(id))
  }

  async fn dedup_candidates(
    &self,
    category: Category,
    exclude:  Option<Uuid>,
  ) -> Result<Vec<TitleRef>> {
    let cat_str     = encode_category(category).to_owned();
    let exclude_str = exclude.map(encode_uuid);

    let rows: Vec<(String, String, String)> = self
      .conn
      .call(move |conn| {
        let map_row = |row: &rusqlite::Row<'_>| {
          Ok((row.get(0)?, row.get(1)?, row.get(2)?))
        };

        let rows = if let Some(ex) = exclude_str {
          let mut stmt = conn.prepare(
            "SELECT entry_id, title, category FROM entries
             WHERE category = ?1 AND entry_id != ?2",
          )?;
          stmt
            .query_map(rusqlite::params![cat_str, ex], map_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?
        } else {
          let mut stmt = conn.prepare(
            "SELECT entry_id, title, category FROM entries
             WHERE category = ?1",
          )?;
          stmt
            .query_map(rusqlite::params![cat_str], map_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?
        };
        Ok(rows)
      })
      .await?;

    rows
      .into_iter()
      .map(|(id, title, cat)| {
        Ok(TitleRef {
          entry_id: decode_uuid(&id)?,
          title,
          category: decode_category(&cat)?,
        })
      })
      .collect()
  }

  // ── Ratings ────────────────────────────────────────────────────────────

  async fn rate(
    &self,
    user_id:  Uuid,
    entry_id: Uuid,
    score:    f64,
  ) -> Result<Rating> {
    // Write boundary: out-of-range scores never reach the aggregator.
    let score = validate_score(score)?;

    self.ensure_user(user_id).await?;
    self.ensure_entry(entry_id).await?;

    let user_str  = encode_uuid(user_id);
    let entry_str = encode_uuid(entry_id);
    let now_str   = encode_dt(Utc::now());

    let raw: RawRating = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO ratings (user_id, entry_id, score, status, added_at, updated_at)
           VALUES (?1, ?2, ?3, 'check', ?4, ?4)
           ON CONFLICT (user_id, entry_id)
           DO UPDATE SET score = excluded.score, updated_at = excluded.updated_at",
          rusqlite::params![user_str, entry_str, score, now_str],
        )?;

        let raw = conn.query_row(
          "SELECT user_id, entry_id, score, status, added_at, updated_at
           FROM ratings WHERE user_id = ?1 AND entry_id = ?2",
          rusqlite::params![user_str, entry_str],
          |row| {
            Ok(RawRating {
              user_id:    row.get(0)?,
              entry_id:   row.get(1)?,
              score:      row.get(2)?,
              status:     row.get(3)?,
              added_at:   row.get(4)?,
              updated_at: row.get(5)?,
            })
          },
        )?;
        Ok(raw)
      })
      .await?;

    self.recompute_aggregate(entry_id).await?;

    raw.into_rating()
  }

  async fn set_status(
    &self,
    user_id:  Uuid,
    entry_id: Uuid,
    status:   WatchStatus,
  ) -> Result<Rating> {
    self.ensure_user(user_id).await?;
    self.ensure_entry(entry_id).await?;

    let user_str   = encode_uuid(user_id);
    let entry_str  = encode_uuid(entry_id);
    let status_str = encode_status(status).to_owned();
    let now_str    = encode_dt(Utc::now());

    // The unrated sentinel also clears the score; other transitions leave
    // it untouched.
    let sql = if status.clears_score() {
      "INSERT INTO ratings (user_id, entry_id, score, status, added_at, updated_at)
       VALUES (?1, ?2, NULL, ?3, ?4, ?4)
       ON CONFLICT (user_id, entry_id)
       DO UPDATE SET status = excluded.status, score = NULL,
                     updated_at = excluded.updated_at"
    } else {
      "INSERT INTO ratings (user_id, entry_id, score, status, added_at, updated_at)
       VALUES (?1, ?2, NULL, ?3, ?4, ?4)
       ON CONFLICT (user_id, entry_id)
       DO UPDATE SET status = excluded.status,
                     updated_at = excluded.updated_at"
    };

    let raw: RawRating = self
      .conn
      .call(move |conn| {
        conn.execute(
          sql,
          rusqlite::params![user_str, entry_str, status_str, now_str],
        )?;

        let raw = conn.query_row(
          "SELECT user_id, entry_id, score, status, added_at, updated_at
           FROM ratings WHERE user_id = ?1 AND entry_id = ?2",
          rusqlite::params![user_str, entry_str],
          |row| {
            Ok(RawRating {
              user_id:    row.get(0)?,
              entry_id:   row.get(1)?,
              score:      row.get(2)?,
              status:     row.get(3)?,
              added_at:   row.get(4)?,
              updated_at: row.get(5)?,
            })
          },
        )?;
        Ok(raw)
      })
      .await?;

    if status.clears_score() {
      self.recompute_aggregate(entry_id).await?;
    }

    raw.into_rating()
  }

  async fn get_rating(
    &self,
    user_id:  Uuid,
    entry_id: Uuid,
  ) -> Result<Option<Rating>> {
    let user_str  = encode_uuid(user_id);
    let entry_str = encode_uuid(entry_id);

    let raw: Option<RawRating> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT user_id, entry_id, score, status, added_at, updated_at
               FROM ratings WHERE user_id = ?1 AND entry_id = ?2",
              rusqlite::params![user_str, entry_str],
              |row| {
                Ok(RawRating {
                  user_id:    row.get(0)?,
                  entry_id:   row.get(1)?,
                  score:      row.get(2)?,
                  status:     row.get(3)?,
                  added_at:   row.get(4)?,
                  updated_at: row.get(5)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawRating::into_rating).transpose()
  }

  async fn user_collection(&self, user_id: Uuid) -> Result<Vec<CollectionItem>> {
    let user_str = encode_uuid(user_id);

    let raws: Vec<(RawEntry, RawRating)> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT
             e.entry_id, e.title, e.category, e.url, e.plot, e.chapters,
             e.quotes, e.aggregate_score, e.created_at,
             r.user_id, r.entry_id, r.score, r.status, r.added_at, r.updated_at
           FROM ratings r
           JOIN entries e ON e.entry_id = r.entry_id
           WHERE r.user_id = ?1
           ORDER BY r.added_at DESC",
        )?;

        let rows = stmt
          .query_map(rusqlite::params![user_str], |row| {
            Ok((
              RawEntry {
                entry_id:        row.get(0)?,
                title:           row.get(1)?,
                category:        row.get(2)?,
                url:             row.get(3)?,
                plot:            row.get(4)?,
                chapters:        row.get(5)?,
                quotes:          row.get(6)?,
                aggregate_score: row.get(7)?,
                created_at:      row.get(8)?,
              },
              RawRating {
                user_id:    row.get(9)?,
                entry_id:   row.get(10)?,
                score:      row.get(11)?,
                status:     row.get(12)?,
                added_at:   row.get(13)?,
                updated_at: row.get(14)?,
              },
            ))
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(rows)
      })
      .await?;

    raws
      .into_iter()
      .map(|(e, r)| {
        Ok(CollectionItem {
          entry:  e.into_entry()?,
          rating: r.into_rating()?,
        })
      })
      .collect()
  }

  // ── Aggregate score ────────────────────────────────────────────────────

  async fn recompute_aggregate(&self, entry_id: Uuid) -> Result<Option<f64>> {
    self.ensure_entry(entry_id).await?;

    let entry_str = encode_uuid(entry_id);

    let aggregate: Option<f64> = self
      .conn
      .call(move |conn| {
        // Full scan of the entry's current score set rather than an
        // incremental running mean; self-correcting against any lost
        // update to the cached column.
        let mut stmt = conn.prepare(
          "SELECT score FROM ratings
           WHERE entry_id = ?1 AND score IS NOT NULL",
        )?;
        let scores = stmt
          .query_map(rusqlite::params![entry_str], |row| row.get::<_, f64>(0))?
          .collect::<rusqlite::Result<Vec<f64>>>()?;

        let aggregate = mean(&scores);
        conn.execute(
          "UPDATE entries SET aggregate_score = ?1 WHERE entry_id = ?2",
          rusqlite::params![aggregate, entry_str],
        )?;

        Ok(aggregate)
      })
      .await?;

    Ok(aggregate)
  }
}
