//! Activation and uninstall callbacks, invoked explicitly by the host.

use semver::Version;

use crate::{
  Error, Result, VERSION,
  store::{CONTRIBUTORS_META_KEY, MetaStore, OptionStore, VERSION_OPTION},
};

/// Oldest platform release the plugin supports.
pub const MINIMUM_PLATFORM_VERSION: &str = "5.0";

/// Summary of an uninstall sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UninstallReport {
  /// Posts whose contributor list was deleted.
  pub purged_posts: usize,
}

/// Refuse to activate on platforms older than [`MINIMUM_PLATFORM_VERSION`];
/// otherwise record the installed version marker.
pub async fn activate<O: OptionStore>(options: &O, platform_version: &str) -> Result<()> {
  let found = parse_platform_version(platform_version)?;
  let required = parse_platform_version(MINIMUM_PLATFORM_VERSION)?;
  if found < required {
    return Err(Error::UnsupportedPlatform {
      required: MINIMUM_PLATFORM_VERSION.to_owned(),
      found:    platform_version.to_owned(),
    });
  }

  options
    .set_option(VERSION_OPTION, VERSION)
    .await
    .map_err(|e| Error::Store(Box::new(e)))?;
  tracing::info!(version = VERSION, platform = platform_version, "activated");
  Ok(())
}

/// The version marker written by the last activation, if any.
pub async fn installed_version<O: OptionStore>(options: &O) -> Result<Option<String>> {
  options
    .get_option(VERSION_OPTION)
    .await
    .map_err(|e| Error::Store(Box::new(e)))
}

/// Remove every trace of the plugin: the version marker, then the
/// contributor list of every post that has one, then any cached metadata.
pub async fn uninstall<M, O>(meta: &M, options: &O) -> Result<UninstallReport>
where
  M: MetaStore,
  O: OptionStore,
{
  options
    .delete_option(VERSION_OPTION)
    .await
    .map_err(|e| Error::Store(Box::new(e)))?;

  let posts = meta
    .posts_with_meta(CONTRIBUTORS_META_KEY)
    .await
    .map_err(|e| Error::Store(Box::new(e)))?;

  let mut purged_posts = 0;
  for post in posts {
    if meta
      .delete_meta(post, CONTRIBUTORS_META_KEY)
      .await
      .map_err(|e| Error::Store(Box::new(e)))?
    {
      purged_posts += 1;
    }
  }

  meta.flush_cache().await.map_err(|e| Error::Store(Box::new(e)))?;

  tracing::info!(purged_posts, "uninstalled");
  Ok(UninstallReport { purged_posts })
}

/// Platform releases are dotted numbers of varying length (`5.0`, `6.4.2`,
/// `6.5-RC1`); missing components count as zero and extra ones are ignored.
fn parse_platform_version(raw: &str) -> Result<Version> {
  let (core, pre) = match raw.trim().split_once('-') {
    Some((core, pre)) => (core, Some(pre)),
    None => (raw.trim(), None),
  };
  let mut parts: Vec<&str> = core.split('.').take(3).collect();
  while parts.len() < 3 {
    parts.push("0");
  }
  let mut normalized = parts.join(".");
  if let Some(pre) = pre {
    normalized.push('-');
    normalized.push_str(pre);
  }
  Ok(Version::parse(&normalized)?)
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;
  use crate::{ids::PostId, memory::MemoryStore};

  #[tokio::test]
  async fn activation_writes_version_marker() {
    let store = MemoryStore::new();
    activate(&store, "6.4.2").await.unwrap();
    assert_eq!(installed_version(&store).await.unwrap().as_deref(), Some(VERSION));
  }

  #[tokio::test]
  async fn activation_accepts_the_minimum_version() {
    let store = MemoryStore::new();
    activate(&store, "5.0").await.unwrap();
    activate(&store, "5").await.unwrap();
  }

  #[tokio::test]
  async fn activation_refuses_old_platforms() {
    let store = MemoryStore::new();
    let err = activate(&store, "4.9.8").await.unwrap_err();
    assert!(matches!(err, Error::UnsupportedPlatform { .. }));
    assert_eq!(installed_version(&store).await.unwrap(), None);
  }

  #[tokio::test]
  async fn prerelease_of_minimum_is_too_old() {
    let store = MemoryStore::new();
    assert!(activate(&store, "5.0-RC1").await.is_err());
    assert!(activate(&store, "6.5-RC1").await.is_ok());
  }

  #[tokio::test]
  async fn garbage_version_is_an_error() {
    let store = MemoryStore::new();
    assert!(matches!(activate(&store, "latest").await, Err(Error::Version(_))));
  }

  #[tokio::test]
  async fn uninstall_purges_every_contributor_list() {
    let store = MemoryStore::new();
    activate(&store, "6.4").await.unwrap();
    store.seed_meta(PostId(1), CONTRIBUTORS_META_KEY, json!([3]));
    store.seed_meta(PostId(2), CONTRIBUTORS_META_KEY, json!([]));
    store.seed_meta(PostId(2), "_other", json!("kept"));

    let report = uninstall(&store, &store).await.unwrap();

    assert_eq!(report, UninstallReport { purged_posts: 2 });
    assert_eq!(installed_version(&store).await.unwrap(), None);
    assert!(store.posts_with_meta(CONTRIBUTORS_META_KEY).await.unwrap().is_empty());
    assert_eq!(store.get_meta(PostId(2), "_other").await.unwrap(), Some(json!("kept")));
  }

  #[tokio::test]
  async fn uninstall_on_clean_store_is_a_no_op() {
    let store = MemoryStore::new();
    let report = uninstall(&store, &store).await.unwrap();
    assert_eq!(report.purged_posts, 0);
  }
}
