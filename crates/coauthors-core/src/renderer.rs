//! Contributor Renderer: the public contributor box and its assets.

use std::sync::Arc;

use crate::{
  Error, Result,
  assets::{AssetRegistry, ScriptAsset, StyleAsset},
  html::{escape_html, escape_url},
  ids::{ContributorList, PostId},
  post::DisplayContext,
  site::Site,
  store::{CONTRIBUTORS_META_KEY, MetaStore, UserDirectory},
};

/// Avatar edge length in the contributor box, in pixels.
pub const AVATAR_SIZE: u32 = 32;

pub const STYLE_HANDLE: &str = "pcauthors-style";
pub const SCRIPT_HANDLE: &str = "pcauthors-script";
/// Generic DOM-utility library the script expects to be loaded.
pub const SCRIPT_DEPENDENCY: &str = "jquery";

const BOX_TITLE: &str = "Contributors";

pub struct ContributorRenderer<M, D> {
  meta:      Arc<M>,
  directory: Arc<D>,
  site:      Arc<Site>,
}

impl<M, D> ContributorRenderer<M, D>
where
  M: MetaStore,
  D: UserDirectory,
{
  pub fn new(meta: Arc<M>, directory: Arc<D>, site: Arc<Site>) -> Self {
    Self { meta, directory, site }
  }

  /// Append the contributor box to `body` when viewing a single post.
  ///
  /// Returns `body` unchanged outside single post views and for posts with
  /// no (or a malformed) contributor list. Ids that no longer resolve to a
  /// user are left out; the rest keep their stored order, duplicates
  /// included.
  pub async fn augment_content(
    &self,
    context: &DisplayContext,
    post: PostId,
    body: &str,
  ) -> Result<String> {
    if !context.is_single_post() {
      return Ok(body.to_owned());
    }

    let stored = self
      .meta
      .get_meta(post, CONTRIBUTORS_META_KEY)
      .await
      .map_err(|e| Error::Store(Box::new(e)))?;
    let contributors = ContributorList::from_meta(stored.as_ref());
    if contributors.is_empty() {
      return Ok(body.to_owned());
    }

    let mut out = String::with_capacity(body.len() + 256);
    out.push_str(body);
    out.push_str("<div class=\"pcauthors-box\">\n");
    out.push_str(&format!("<h3>{}</h3>\n<ul>\n", escape_html(BOX_TITLE)));

    for id in contributors.iter() {
      let user = self
        .directory
        .get_user(id)
        .await
        .map_err(|e| Error::Store(Box::new(e)))?;
      let Some(user) = user else {
        tracing::debug!(%post, user = %id, "skipping unresolved contributor");
        continue;
      };

      let avatar = self.site.avatar_url(&user, AVATAR_SIZE);
      out.push_str(&format!(
        "<li><img alt=\"\" src=\"{src}\" class=\"avatar avatar-{AVATAR_SIZE} photo\" height=\"{AVATAR_SIZE}\" width=\"{AVATAR_SIZE}\" loading=\"lazy\" decoding=\"async\"> <a href=\"{href}\">{name}</a></li>\n",
        src = escape_url(&avatar),
        href = escape_url(&self.site.author_url(&user)),
        name = escape_html(&user.display_name),
      ));
    }

    out.push_str("</ul>\n</div>\n");
    Ok(out)
  }

  /// Declare the box's stylesheet and script for single post views.
  pub fn declare_assets<R>(&self, context: &DisplayContext, registry: &mut R) -> Result<()>
  where
    R: AssetRegistry + ?Sized,
  {
    if !context.is_single_post() {
      return Ok(());
    }

    let version = Some(self.site.version().to_owned());
    registry.enqueue_style(StyleAsset {
      handle:  STYLE_HANDLE.to_owned(),
      src:     self.site.asset_url("css/pcauthors.css")?,
      deps:    Vec::new(),
      version: version.clone(),
    });
    registry.enqueue_script(ScriptAsset {
      handle:    SCRIPT_HANDLE.to_owned(),
      src:       self.site.asset_url("js/pcauthors.js")?,
      deps:      vec![SCRIPT_DEPENDENCY.to_owned()],
      version,
      in_footer: true,
    });
    Ok(())
  }
}
