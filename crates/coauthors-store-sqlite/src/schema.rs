//! SQL schema for the SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS users (
    user_id       INTEGER PRIMARY KEY AUTOINCREMENT,
    login         TEXT NOT NULL UNIQUE,
    display_name  TEXT NOT NULL,
    email         TEXT NOT NULL,
    nicename      TEXT NOT NULL,
    role          TEXT NOT NULL,   -- 'administrator' | 'editor' | 'author' | 'contributor' | 'subscriber'
    password_hash TEXT NOT NULL DEFAULT ''
);

CREATE TABLE IF NOT EXISTS posts (
    post_id     INTEGER PRIMARY KEY AUTOINCREMENT,
    author_id   INTEGER NOT NULL REFERENCES users(user_id),
    post_type   TEXT NOT NULL DEFAULT 'post',
    title       TEXT NOT NULL,
    content     TEXT NOT NULL,
    created_at  TEXT NOT NULL     -- RFC 3339 UTC
);

-- One row per (post, key). Deleting a post drops its metadata.
CREATE TABLE IF NOT EXISTS postmeta (
    post_id     INTEGER NOT NULL REFERENCES posts(post_id) ON DELETE CASCADE,
    meta_key    TEXT NOT NULL,
    meta_value  TEXT NOT NULL,    -- JSON
    PRIMARY KEY (post_id, meta_key)
);

CREATE TABLE IF NOT EXISTS options (
    name   TEXT PRIMARY KEY,
    value  TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS postmeta_key_idx ON postmeta(meta_key);
CREATE INDEX IF NOT EXISTS posts_created_idx ON posts(created_at);

PRAGMA user_version = 1;
";
