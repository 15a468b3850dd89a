//! Posts as seen by this crate: referenced, never owned.

use serde::{Deserialize, Serialize};

use crate::ids::{PostId, UserId};

/// Content type of a post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostType {
  Post,
  Page,
}

/// The host's post record. `content` is the already-rendered body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
  pub id:        PostId,
  pub author:    UserId,
  pub post_type: PostType,
  pub title:     String,
  pub content:   String,
}

/// Input for [`PostCatalog::insert_post`](crate::store::PostCatalog::insert_post).
#[derive(Debug, Clone)]
pub struct NewPost {
  pub author:    UserId,
  pub post_type: PostType,
  pub title:     String,
  pub content:   String,
}

/// What kind of page the host is currently composing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayContext {
  /// A single, standalone view of one post of the given type.
  Singular(PostType),
  /// Home page, archives, feeds, search results.
  Listing,
}

impl DisplayContext {
  /// True only for the standalone view of a regular post.
  pub fn is_single_post(&self) -> bool {
    matches!(self, Self::Singular(PostType::Post))
  }
}
