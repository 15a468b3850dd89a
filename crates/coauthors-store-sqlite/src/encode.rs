//! Encoding and decoding helpers between domain types and SQLite columns.
//!
//! Timestamps are RFC 3339 strings, enums are lowercase names, metadata
//! values are JSON text.

use chrono::{DateTime, Utc};
use coauthors_core::{
  ids::{PostId, UserId},
  post::{Post, PostType},
  user::{Account, Role, User},
};
use serde_json::Value;

use crate::{Error, Result};

// ─── DateTime<Utc> ────────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

// ─── Role ─────────────────────────────────────────────────────────────────────

pub fn encode_role(role: Role) -> &'static str {
  match role {
    Role::Administrator => "administrator",
    Role::Editor => "editor",
    Role::Author => "author",
    Role::Contributor => "contributor",
    Role::Subscriber => "subscriber",
  }
}

pub fn decode_role(s: &str) -> Result<Role> {
  match s {
    "administrator" => Ok(Role::Administrator),
    "editor" => Ok(Role::Editor),
    "author" => Ok(Role::Author),
    "contributor" => Ok(Role::Contributor),
    "subscriber" => Ok(Role::Subscriber),
    other => Err(Error::Decode(format!("unknown role: {other:?}"))),
  }
}

// ─── PostType ─────────────────────────────────────────────────────────────────

pub fn encode_post_type(t: PostType) -> &'static str {
  match t {
    PostType::Post => "post",
    PostType::Page => "page",
  }
}

pub fn decode_post_type(s: &str) -> Result<PostType> {
  match s {
    "post" => Ok(PostType::Post),
    "page" => Ok(PostType::Page),
    other => Err(Error::Decode(format!("unknown post type: {other:?}"))),
  }
}

// ─── Meta values ──────────────────────────────────────────────────────────────

pub fn encode_meta(value: &Value) -> Result<String> { Ok(serde_json::to_string(value)?) }

/// Text that is not valid JSON (written by some other tool) comes back as a
/// JSON string rather than an error; the caller decides what it means.
pub fn decode_meta(raw: String) -> Value {
  serde_json::from_str(&raw).unwrap_or(Value::String(raw))
}

// ─── Row types ────────────────────────────────────────────────────────────────

pub const USER_COLUMNS: &str = "user_id, login, display_name, email, nicename, role, password_hash";

/// Raw values read directly from a `users` row (see [`USER_COLUMNS`]).
pub struct RawUser {
  pub user_id:       i64,
  pub login:         String,
  pub display_name:  String,
  pub email:         String,
  pub nicename:      String,
  pub role:          String,
  pub password_hash: String,
}

impl RawUser {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      user_id:       row.get(0)?,
      login:         row.get(1)?,
      display_name:  row.get(2)?,
      email:         row.get(3)?,
      nicename:      row.get(4)?,
      role:          row.get(5)?,
      password_hash: row.get(6)?,
    })
  }

  pub fn into_user(self) -> Result<User> { Ok(self.into_account()?.user) }

  pub fn into_account(self) -> Result<Account> {
    Ok(Account {
      user:          User {
        id:           UserId(self.user_id),
        login:        self.login,
        display_name: self.display_name,
        email:        self.email,
        nicename:     self.nicename,
        role:         decode_role(&self.role)?,
      },
      password_hash: self.password_hash,
    })
  }
}

pub const POST_COLUMNS: &str = "post_id, author_id, post_type, title, content";

/// Raw values read directly from a `posts` row (see [`POST_COLUMNS`]).
pub struct RawPost {
  pub post_id:   i64,
  pub author_id: i64,
  pub post_type: String,
  pub title:     String,
  pub content:   String,
}

impl RawPost {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      post_id:   row.get(0)?,
      author_id: row.get(1)?,
      post_type: row.get(2)?,
      title:     row.get(3)?,
      content:   row.get(4)?,
    })
  }

  pub fn into_post(self) -> Result<Post> {
    Ok(Post {
      id:        PostId(self.post_id),
      author:    UserId(self.author_id),
      post_type: decode_post_type(&self.post_type)?,
      title:     self.title,
      content:   self.content,
    })
  }
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  #[test]
  fn roles_roundtrip() {
    for role in [
      Role::Administrator,
      Role::Editor,
      Role::Author,
      Role::Contributor,
      Role::Subscriber,
    ] {
      assert_eq!(decode_role(encode_role(role)).unwrap(), role);
    }
    assert!(matches!(decode_role("root"), Err(Error::Decode(_))));
  }

  #[test]
  fn undecodable_meta_becomes_a_string() {
    assert_eq!(decode_meta("[3,7]".into()), json!([3, 7]));
    assert_eq!(decode_meta("a:2:{i:0;i:3;}".into()), json!("a:2:{i:0;i:3;}"));
  }
}
