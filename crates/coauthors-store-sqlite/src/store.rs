//! [`SqliteStore`] is the SQLite implementation of every core store trait.

use std::path::Path;

use chrono::Utc;
use coauthors_core::{
  ids::{PostId, UserId},
  post::{NewPost, Post},
  store::{AccountStore, MetaStore, OptionStore, PostCatalog, Store, UserDirectory},
  user::{Account, NewAccount, User},
};
use rusqlite::OptionalExtension as _;
use serde_json::Value;

use crate::{
  Result,
  encode::{
    POST_COLUMNS, RawPost, RawUser, USER_COLUMNS, decode_meta, encode_dt, encode_meta,
    encode_post_type, encode_role,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A store backed by a single SQLite file.
///
/// Cloning is cheap: the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  pub(crate) conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let path = path.as_ref();
    tracing::debug!(path = %path.display(), "opening store");
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open a throwaway in-memory store.
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
}

impl Store for SqliteStore {
  type Error = crate::Error;
}

// ─── MetaStore impl ──────────────────────────────────────────────────────────

impl MetaStore for SqliteStore {
  async fn get_meta(&self, post: PostId, key: &str) -> Result<Option<Value>> {
    let key = key.to_owned();

    let raw: Option<String> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            "SELECT meta_value FROM postmeta WHERE post_id = ?1 AND meta_key = ?2",
            rusqlite::params![post.0, key],
            |row| row.get(0),
          )
          .optional()?)
      })
      .await?;

    Ok(raw.map(decode_meta))
  }

  async fn set_meta(&self, post: PostId, key: &str, value: Value) -> Result<()> {
    let key = key.to_owned();
    let value_str = encode_meta(&value)?;

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO postmeta (post_id, meta_key, meta_value) VALUES (?1, ?2, ?3)
           ON CONFLICT (post_id, meta_key) DO UPDATE SET meta_value = excluded.meta_value",
          rusqlite::params![post.0, key, value_str],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn delete_meta(&self, post: PostId, key: &str) -> Result<bool> {
    let key = key.to_owned();

    let deleted = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM postmeta WHERE post_id = ?1 AND meta_key = ?2",
          rusqlite::params![post.0, key],
        )?)
      })
      .await?;
    Ok(deleted > 0)
  }

  async fn posts_with_meta(&self, key: &str) -> Result<Vec<PostId>> {
    let key = key.to_owned();

    let ids: Vec<i64> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn
          .prepare("SELECT post_id FROM postmeta WHERE meta_key = ?1 ORDER BY post_id")?;
        let rows = stmt
          .query_map(rusqlite::params![key], |row| row.get(0))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    Ok(ids.into_iter().map(PostId).collect())
  }
}

// ─── OptionStore impl ────────────────────────────────────────────────────────

impl OptionStore for SqliteStore {
  async fn get_option(&self, name: &str) -> Result<Option<String>> {
    let name = name.to_owned();

    Ok(self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            "SELECT value FROM options WHERE name = ?1",
            rusqlite::params![name],
            |row| row.get(0),
          )
          .optional()?)
      })
      .await?)
  }

  async fn set_option(&self, name: &str, value: &str) -> Result<()> {
    let name = name.to_owned();
    let value = value.to_owned();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO options (name, value) VALUES (?1, ?2)
           ON CONFLICT (name) DO UPDATE SET value = excluded.value",
          rusqlite::params![name, value],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn delete_option(&self, name: &str) -> Result<bool> {
    let name = name.to_owned();

    let deleted = self
      .conn
      .call(move |conn| {
        Ok(conn.execute("DELETE FROM options WHERE name = ?1", rusqlite::params![name])?)
      })
      .await?;
    Ok(deleted > 0)
  }
}

// ─── UserDirectory / AccountStore impls ──────────────────────────────────────

impl UserDirectory for SqliteStore {
  async fn list_users(&self) -> Result<Vec<User>> {
    let raws: Vec<RawUser> = self
      .conn
      .call(|conn| {
        let mut stmt =
          conn.prepare(&format!("SELECT {USER_COLUMNS} FROM users ORDER BY user_id"))?;
        let rows = stmt
          .query_map([], RawUser::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawUser::into_user).collect()
  }

  async fn get_user(&self, id: UserId) -> Result<Option<User>> {
    let raw: Option<RawUser> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!("SELECT {USER_COLUMNS} FROM users WHERE user_id = ?1"),
            rusqlite::params![id.0],
            RawUser::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawUser::into_user).transpose()
  }
}

impl AccountStore for SqliteStore {
  async fn find_account(&self, login: &str) -> Result<Option<Account>> {
    let login = login.to_owned();

    let raw: Option<RawUser> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!("SELECT {USER_COLUMNS} FROM users WHERE login = ?1"),
            rusqlite::params![login],
            RawUser::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawUser::into_account).transpose()
  }

  async fn add_account(&self, input: NewAccount) -> Result<User> {
    let role_str = encode_role(input.role).to_owned();
    let NewAccount { login, display_name, email, nicename, role, password_hash } = input;
    let user = User {
      id: UserId(0),
      login: login.clone(),
      display_name: display_name.clone(),
      email: email.clone(),
      nicename: nicename.clone(),
      role,
    };

    let id: i64 = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO users (login, display_name, email, nicename, role, password_hash)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          rusqlite::params![login, display_name, email, nicename, role_str, password_hash],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await?;

    Ok(User { id: UserId(id), ..user })
  }
}

// ─── PostCatalog impl ────────────────────────────────────────────────────────

impl PostCatalog for SqliteStore {
  async fn get_post(&self, id: PostId) -> Result<Option<Post>> {
    let raw: Option<RawPost> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!("SELECT {POST_COLUMNS} FROM posts WHERE post_id = ?1"),
            rusqlite::params![id.0],
            RawPost::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawPost::into_post).transpose()
  }

  async fn list_posts(&self) -> Result<Vec<Post>> {
    let raws: Vec<RawPost> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {POST_COLUMNS} FROM posts ORDER BY created_at DESC, post_id DESC"
        ))?;
        let rows = stmt
          .query_map([], RawPost::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawPost::into_post).collect()
  }

  async fn insert_post(&self, input: NewPost) -> Result<Post> {
    let type_str = encode_post_type(input.post_type).to_owned();
    let at_str = encode_dt(Utc::now());
    let title = input.title.clone();
    let content = input.content.clone();
    let author = input.author;

    let id: i64 = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO posts (author_id, post_type, title, content, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![author.0, type_str, title, content, at_str],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await?;

    Ok(Post {
      id:        PostId(id),
      author:    input.author,
      post_type: input.post_type,
      title:     input.title,
      content:   input.content,
    })
  }
}
