//! Storage-facing collaborator traits.
//!
//! Backends (e.g. `coauthors-store-sqlite`) implement these; the editor, the
//! renderer and the lifecycle callbacks depend only on the traits. All
//! methods return `Send` futures so the traits work under multi-threaded
//! runtimes (tokio with `axum`).

use std::future::Future;

use serde_json::Value;

use crate::{
  ids::{PostId, UserId},
  post::{NewPost, Post},
  user::{Account, NewAccount, User},
};

/// Post metadata key holding the contributor list.
pub const CONTRIBUTORS_META_KEY: &str = "_pcauthors";

/// Option holding the installed version marker.
pub const VERSION_OPTION: &str = "pcauthors_version";

/// Error plumbing shared by every store trait, so a backend implementing
/// several of them exposes a single `Error` type.
pub trait Store: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;
}

// ─── Post metadata ────────────────────────────────────────────────────────────

/// Per-post key-value persistence.
///
/// Values are returned raw; callers normalize malformed data themselves.
/// `set_meta` overwrites the value for `(post, key)` atomically; concurrent
/// writers are last-write-wins.
pub trait MetaStore: Store {
  fn get_meta<'a>(
    &'a self,
    post: PostId,
    key: &'a str,
  ) -> impl Future<Output = Result<Option<Value>, Self::Error>> + Send + 'a;

  fn set_meta<'a>(
    &'a self,
    post: PostId,
    key: &'a str,
    value: Value,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// Remove the field. Returns whether anything was deleted.
  fn delete_meta<'a>(
    &'a self,
    post: PostId,
    key: &'a str,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;

  /// Every post that currently carries `key`.
  fn posts_with_meta<'a>(
    &'a self,
    key: &'a str,
  ) -> impl Future<Output = Result<Vec<PostId>, Self::Error>> + Send + 'a;

  /// Drop any cached state in front of the store. No-op by default.
  fn flush_cache(&self) -> impl Future<Output = Result<(), Self::Error>> + Send + '_ {
    async { Ok(()) }
  }
}

// ─── Options ──────────────────────────────────────────────────────────────────

/// Process-wide named settings.
pub trait OptionStore: Store {
  fn get_option<'a>(
    &'a self,
    name: &'a str,
  ) -> impl Future<Output = Result<Option<String>, Self::Error>> + Send + 'a;

  fn set_option<'a>(
    &'a self,
    name: &'a str,
    value: &'a str,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  fn delete_option<'a>(
    &'a self,
    name: &'a str,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;
}

// ─── Users ────────────────────────────────────────────────────────────────────

/// Enumerates and resolves users.
pub trait UserDirectory: Store {
  /// All users, unpaginated, ordered by id.
  fn list_users(&self) -> impl Future<Output = Result<Vec<User>, Self::Error>> + Send + '_;

  /// `None` for unknown ids.
  fn get_user(
    &self,
    id: UserId,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + '_;
}

/// Credential lookup used by the host to authenticate requests.
pub trait AccountStore: Store {
  fn find_account<'a>(
    &'a self,
    login: &'a str,
  ) -> impl Future<Output = Result<Option<Account>, Self::Error>> + Send + 'a;

  fn add_account(
    &self,
    input: NewAccount,
  ) -> impl Future<Output = Result<User, Self::Error>> + Send + '_;
}

// ─── Posts ────────────────────────────────────────────────────────────────────

/// The host's post table. Only what the host needs to drive the components.
pub trait PostCatalog: Store {
  fn get_post(
    &self,
    id: PostId,
  ) -> impl Future<Output = Result<Option<Post>, Self::Error>> + Send + '_;

  /// All posts, newest first.
  fn list_posts(&self) -> impl Future<Output = Result<Vec<Post>, Self::Error>> + Send + '_;

  fn insert_post(
    &self,
    input: NewPost,
  ) -> impl Future<Output = Result<Post, Self::Error>> + Send + '_;
}
