//! SQL schema for the MediaCheck SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! the `PRAGMA user_version` number.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS users (
    user_id       TEXT PRIMARY KEY,
    username      TEXT NOT NULL UNIQUE,
    email         TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,   -- argon2 PHC string
    created_at    TEXT NOT NULL    -- ISO 8601 UTC; server-assigned
);

CREATE TABLE IF NOT EXISTS entries (
    entry_id        TEXT PRIMARY KEY,
    title           TEXT NOT NULL,
    category        TEXT NOT NULL,  -- 'cinema' | 'series' | 'manga' | 'music'
    url             TEXT,
    plot            TEXT,
    chapters        TEXT,           -- meaningful only for category 'manga'
    quotes          TEXT NOT NULL DEFAULT '[]',  -- JSON array of strings
    aggregate_score REAL,           -- mean of non-null scores; NULL until rated
    created_at      TEXT NOT NULL
);

-- One row per (user, entry) pair, created on first interaction.
-- aggregate_score above is derived from score; never written directly.
CREATE TABLE IF NOT EXISTS ratings (
    user_id    TEXT NOT NULL REFERENCES users(user_id),
    entry_id   TEXT NOT NULL REFERENCES entries(entry_id),
    score      REAL,               -- NULL means no rating yet
    status     TEXT NOT NULL DEFAULT 'check',
    added_at   TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    PRIMARY KEY (user_id, entry_id)
);

CREATE INDEX IF NOT EXISTS entries_category_idx ON entries(category);
CREATE INDEX IF NOT EXISTS ratings_entry_idx    ON ratings(entry_id);
CREATE INDEX IF NOT EXISTS ratings_user_idx     ON ratings(user_id);

PRAGMA user_version = 1;
";
