//! Users, roles and the capability seam.

use serde::{Deserialize, Serialize};

use crate::{
  ids::{PostId, UserId},
  post::Post,
};

/// Built-in roles of the hosting platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
  Administrator,
  Editor,
  Author,
  Contributor,
  Subscriber,
}

impl Role {
  /// Whether this role may edit posts at all (its own, at least).
  pub fn edits_posts(self) -> bool { !matches!(self, Role::Subscriber) }

  /// Whether this role may edit other users' posts.
  pub fn edits_others_posts(self) -> bool {
    matches!(self, Role::Administrator | Role::Editor)
  }
}

/// A directory entry. Only the fields the contributor components consume.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
  pub id:           UserId,
  pub login:        String,
  pub display_name: String,
  pub email:        String,
  /// URL slug used for the public author page.
  pub nicename:     String,
  pub role:         Role,
}

/// A user record together with its password hash, for authentication.
#[derive(Debug, Clone)]
pub struct Account {
  pub user:          User,
  /// PHC string produced by argon2.
  pub password_hash: String,
}

/// Input for [`AccountStore::add_account`](crate::store::AccountStore::add_account).
#[derive(Debug, Clone)]
pub struct NewAccount {
  pub login:         String,
  pub display_name:  String,
  pub email:         String,
  pub nicename:      String,
  pub role:          Role,
  pub password_hash: String,
}

// ─── Capabilities ─────────────────────────────────────────────────────────────

/// Named permission checks resolved by the identity provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
  /// Manage the contributor list of any post (`edit_others_posts`).
  ManageContributors,
  /// Edit one specific post.
  EditPost(PostId),
}

/// Identity and capability checks for the requesting user.
pub trait Capabilities {
  /// `None` for anonymous requests.
  fn user_id(&self) -> Option<UserId>;

  fn can(&self, cap: Capability) -> bool;
}

/// Role-based [`Capabilities`] for one request.
///
/// Post-specific checks need to know who wrote the post; attach the posts the
/// request is about with [`Viewer::with_post`]. Unknown posts are only
/// editable by roles that may edit other users' posts.
#[derive(Debug, Clone, Default)]
pub struct Viewer {
  user:       Option<User>,
  authorship: Vec<(PostId, UserId)>,
}

impl Viewer {
  pub fn anonymous() -> Self { Self::default() }

  pub fn signed_in(user: User) -> Self {
    Self { user: Some(user), authorship: Vec::new() }
  }

  pub fn with_post(mut self, post: &Post) -> Self {
    self.authorship.push((post.id, post.author));
    self
  }
}

impl Capabilities for Viewer {
  fn user_id(&self) -> Option<UserId> { self.user.as_ref().map(|u| u.id) }

  fn can(&self, cap: Capability) -> bool {
    let Some(user) = &self.user else { return false };
    match cap {
      Capability::ManageContributors => user.role.edits_others_posts(),
      Capability::EditPost(post) => {
        if user.role.edits_others_posts() {
          return true;
        }
        user.role.edits_posts()
          && self
            .authorship
            .iter()
            .any(|(id, author)| *id == post && *author == user.id)
      }
    }
  }
}
