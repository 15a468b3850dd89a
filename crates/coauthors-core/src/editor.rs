//! Contributor Editor: the admin-side checkbox list and its save path.

use std::sync::Arc;

use crate::{
  Error, Result,
  html::{escape_attr, escape_html},
  ids::{ContributorList, PostId},
  nonce::NonceService,
  post::{Post, PostType},
  store::{CONTRIBUTORS_META_KEY, MetaStore, UserDirectory},
  user::{Capabilities, Capability},
};

/// Action name the anti-forgery token is scoped to.
pub const NONCE_ACTION: &str = "pcauthors_save_metabox";
/// Form field carrying the anti-forgery token.
pub const NONCE_FIELD: &str = "pcauthors_nonce";
/// Form field carrying the selected user ids (repeated).
pub const CONTRIBUTORS_FIELD: &str = "PcAuthors[]";
/// Heading of the box the form is shown in.
pub const METABOX_TITLE: &str = "Contributors";

const NO_PERMISSION_NOTICE: &str = "You do not have permission to edit contributors.";

/// Everything `save_submission` needs to know about the request.
pub struct SaveRequest<'a, C: ?Sized> {
  pub nonce:     Option<&'a str>,
  /// Set when the save comes from an automated background re-save.
  pub autosave:  bool,
  pub identity:  &'a C,
  /// Raw values of every [`CONTRIBUTORS_FIELD`]; `None` if the field was
  /// absent from the submission.
  pub submitted: Option<Vec<String>>,
}

/// Why a save was skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
  MissingNonce,
  InvalidNonce,
  Autosave,
  CannotEditPost,
  CannotManageContributors,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
  Saved(ContributorList),
  Skipped(SkipReason),
}

pub struct ContributorEditor<M, D, N> {
  meta:      Arc<M>,
  directory: Arc<D>,
  nonces:    Arc<N>,
}

impl<M, D, N> ContributorEditor<M, D, N>
where
  M: MetaStore,
  D: UserDirectory,
  N: NonceService,
{
  pub fn new(meta: Arc<M>, directory: Arc<D>, nonces: Arc<N>) -> Self {
    Self { meta, directory, nonces }
  }

  /// The form is only offered on regular posts.
  pub fn applies_to(post: &Post) -> bool { post.post_type == PostType::Post }

  /// Render the checkbox list for `post`. Performs no writes.
  pub async fn render_form<C>(&self, post: &Post, identity: &C) -> Result<String>
  where
    C: Capabilities + ?Sized,
  {
    let users = self
      .directory
      .list_users()
      .await
      .map_err(|e| Error::Store(Box::new(e)))?;

    let stored = self
      .meta
      .get_meta(post.id, CONTRIBUTORS_META_KEY)
      .await
      .map_err(|e| Error::Store(Box::new(e)))?;
    let saved = ContributorList::from_meta(stored.as_ref());

    let token = self.nonces.issue(NONCE_ACTION, identity.user_id());
    let can_edit = identity.can(Capability::ManageContributors);

    let mut out = format!(
      "<input type=\"hidden\" id=\"{NONCE_FIELD}\" name=\"{NONCE_FIELD}\" value=\"{}\">\n",
      escape_attr(&token)
    );
    out.push_str("<div class=\"pcauthors-metabox\">\n");
    if !can_edit {
      out.push_str(&format!("<p>{}</p>\n", escape_html(NO_PERMISSION_NOTICE)));
    }
    out.push_str("<ul class=\"pcauthors-list\">\n");
    for user in &users {
      let checked = if saved.contains(user.id) { " checked" } else { "" };
      let disabled = if can_edit { "" } else { " disabled" };
      out.push_str(&format!(
        "<li><label><input type=\"checkbox\" name=\"{CONTRIBUTORS_FIELD}\" value=\"{}\"{checked}{disabled}> {}</label></li>\n",
        user.id,
        escape_html(&user.display_name),
      ));
    }
    out.push_str("</ul>\n</div>\n");
    Ok(out)
  }

  /// Validate and persist a submitted selection.
  ///
  /// Every rejected precondition is a silent skip: nothing is written and the
  /// reason is only reported back through [`SaveOutcome::Skipped`].
  pub async fn save_submission<C>(
    &self,
    post: PostId,
    request: SaveRequest<'_, C>,
  ) -> Result<SaveOutcome>
  where
    C: Capabilities + ?Sized,
  {
    if let Err(reason) = self.check(post, &request) {
      tracing::debug!(%post, ?reason, "contributor save skipped");
      return Ok(SaveOutcome::Skipped(reason));
    }

    let list = request
      .submitted
      .map(ContributorList::from_submission)
      .unwrap_or_default();

    self
      .meta
      .set_meta(post, CONTRIBUTORS_META_KEY, list.to_meta())
      .await
      .map_err(|e| Error::Store(Box::new(e)))?;

    tracing::info!(%post, contributors = list.len(), "contributors saved");
    Ok(SaveOutcome::Saved(list))
  }

  fn check<C>(&self, post: PostId, request: &SaveRequest<'_, C>) -> Result<(), SkipReason>
  where
    C: Capabilities + ?Sized,
  {
    let token = request.nonce.ok_or(SkipReason::MissingNonce)?;
    if !self
      .nonces
      .verify(token, NONCE_ACTION, request.identity.user_id())
    {
      return Err(SkipReason::InvalidNonce);
    }
    if request.autosave {
      return Err(SkipReason::Autosave);
    }
    if !request.identity.can(Capability::EditPost(post)) {
      return Err(SkipReason::CannotEditPost);
    }
    if !request.identity.can(Capability::ManageContributors) {
      return Err(SkipReason::CannotManageContributors);
    }
    Ok(())
  }
}
