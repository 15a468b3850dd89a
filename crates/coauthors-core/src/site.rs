//! Public URLs of the site: author pages, avatars, plugin assets.

use sha2::{Digest, Sha256};
use url::Url;

use crate::{Error, Result, user::User};

/// Default avatar service.
pub const GRAVATAR_URL: &str = "https://www.gravatar.com/avatar/";

#[derive(Debug, Clone)]
pub struct Site {
  base_url:   Url,
  assets_url: Url,
  avatar_url: Url,
  version:    String,
}

impl Site {
  /// Build from configuration strings. Each URL is treated as a directory,
  /// so a missing trailing slash is added.
  pub fn new(base_url: &str, assets_url: &str, avatar_url: &str, version: &str) -> Result<Self> {
    Ok(Self {
      base_url:   directory_url(base_url)?,
      assets_url: directory_url(assets_url)?,
      avatar_url: directory_url(avatar_url)?,
      version:    version.to_owned(),
    })
  }

  pub fn version(&self) -> &str { &self.version }

  /// `{base}/author/{nicename}/`
  pub fn author_url(&self, user: &User) -> String {
    let mut url = self.base_url.clone();
    if let Ok(mut segments) = url.path_segments_mut() {
      segments.pop_if_empty().extend(["author", user.nicename.as_str(), ""]);
    }
    url.into()
  }

  /// Gravatar-style URL keyed by the SHA-256 of the normalized e-mail.
  pub fn avatar_url(&self, user: &User, size: u32) -> String {
    let hash = hex::encode(Sha256::digest(user.email.trim().to_lowercase().as_bytes()));
    let mut url = self.avatar_url.clone();
    if let Ok(mut segments) = url.path_segments_mut() {
      segments.pop_if_empty().push(&hash);
    }
    url
      .query_pairs_mut()
      .append_pair("s", &size.to_string())
      .append_pair("d", "mm")
      .append_pair("r", "g");
    url.into()
  }

  /// Resolve a path relative to the plugin's asset root.
  pub fn asset_url(&self, path: &str) -> Result<String> {
    Ok(self.assets_url.join(path.trim_start_matches('/'))?.into())
  }
}

fn directory_url(raw: &str) -> Result<Url> {
  let mut url = Url::parse(raw)?;
  if url.cannot_be_a_base() {
    return Err(Error::NotABase(raw.to_owned()));
  }
  if !url.path().ends_with('/') {
    let path = format!("{}/", url.path());
    url.set_path(&path);
  }
  Ok(url)
}
