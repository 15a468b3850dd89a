//! Read-through cache in front of a [`MetaStore`].

use std::collections::HashMap;

use parking_lot::RwLock;
use serde_json::Value;

use crate::{
  ids::PostId,
  store::{MetaStore, Store},
};

/// Caches `get_meta` results, including misses, per `(post, key)`.
///
/// Writes and deletes go through to the inner store first and then update
/// the cache. Writes made to the inner store behind this wrapper's back are
/// not seen until [`MetaStore::flush_cache`].
pub struct CachedMetaStore<S> {
  inner: S,
  state: RwLock<CacheState>,
}

#[derive(Default)]
struct CacheState {
  entries:    HashMap<(PostId, String), Option<Value>>,
  /// Bumped by every write, delete and flush. A read only fills the cache
  /// if no bump happened while it was fetching.
  generation: u64,
}

impl CacheState {
  fn store(&mut self, key: (PostId, String), value: Option<Value>) {
    self.entries.insert(key, value);
    self.generation += 1;
  }
}

impl<S> CachedMetaStore<S> {
  pub fn new(inner: S) -> Self {
    Self { inner, state: RwLock::new(CacheState::default()) }
  }

  /// Number of cached entries.
  pub fn cached(&self) -> usize { self.state.read().entries.len() }
}

impl<S: Store> Store for CachedMetaStore<S> {
  type Error = S::Error;
}

impl<S: MetaStore> MetaStore for CachedMetaStore<S> {
  async fn get_meta(&self, post: PostId, key: &str) -> Result<Option<Value>, S::Error> {
    let cache_key = (post, key.to_owned());
    let generation = {
      let state = self.state.read();
      if let Some(hit) = state.entries.get(&cache_key) {
        return Ok(hit.clone());
      }
      state.generation
    };

    let value = self.inner.get_meta(post, key).await?;

    let mut state = self.state.write();
    if state.generation == generation {
      state.entries.insert(cache_key, value.clone());
      return Ok(value);
    }
    // Something changed mid-fetch; a newer entry for this key wins and the
    // fetched value is not cached.
    tracing::trace!(post = post.0, key, "meta changed during fetch");
    Ok(state.entries.get(&cache_key).cloned().unwrap_or(value))
  }

  async fn set_meta(&self, post: PostId, key: &str, value: Value) -> Result<(), S::Error> {
    self.inner.set_meta(post, key, value.clone()).await?;
    self.state.write().store((post, key.to_owned()), Some(value));
    Ok(())
  }

  async fn delete_meta(&self, post: PostId, key: &str) -> Result<bool, S::Error> {
    let deleted = self.inner.delete_meta(post, key).await?;
    self.state.write().store((post, key.to_owned()), None);
    Ok(deleted)
  }

  async fn posts_with_meta(&self, key: &str) -> Result<Vec<PostId>, S::Error> {
    self.inner.posts_with_meta(key).await
  }

  async fn flush_cache(&self) -> Result<(), S::Error> {
    {
      let mut state = self.state.write();
      state.entries.clear();
      state.generation += 1;
    }
    self.inner.flush_cache().await
  }
}

#[cfg(test)]
mod tests {
  use std::{convert::Infallible, sync::Arc};

  use serde_json::json;
  use tokio::sync::Notify;

  use super::*;
  use crate::memory::MemoryStore;

  #[tokio::test]
  async fn reads_are_served_from_cache_until_flushed() {
    let backing = MemoryStore::new();
    backing.seed_meta(PostId(1), "_pcauthors", json!([3]));
    let cached = CachedMetaStore::new(backing.clone());

    assert_eq!(cached.get_meta(PostId(1), "_pcauthors").await.unwrap(), Some(json!([3])));

    // Changed behind the cache's back.
    backing.seed_meta(PostId(1), "_pcauthors", json!([7]));
    assert_eq!(cached.get_meta(PostId(1), "_pcauthors").await.unwrap(), Some(json!([3])));

    cached.flush_cache().await.unwrap();
    assert_eq!(cached.cached(), 0);
    assert_eq!(cached.get_meta(PostId(1), "_pcauthors").await.unwrap(), Some(json!([7])));
  }

  #[tokio::test]
  async fn misses_are_cached_too() {
    let backing = MemoryStore::new();
    let cached = CachedMetaStore::new(backing.clone());
    assert_eq!(cached.get_meta(PostId(1), "_pcauthors").await.unwrap(), None);
    assert_eq!(cached.cached(), 1);
  }

  #[tokio::test]
  async fn writes_go_through_and_update_cache() {
    let backing = MemoryStore::new();
    let cached = CachedMetaStore::new(backing.clone());
    cached.get_meta(PostId(1), "_pcauthors").await.unwrap();

    cached.set_meta(PostId(1), "_pcauthors", json!([5])).await.unwrap();
    assert_eq!(backing.get_meta(PostId(1), "_pcauthors").await.unwrap(), Some(json!([5])));
    assert_eq!(cached.get_meta(PostId(1), "_pcauthors").await.unwrap(), Some(json!([5])));

    assert!(cached.delete_meta(PostId(1), "_pcauthors").await.unwrap());
    assert_eq!(cached.get_meta(PostId(1), "_pcauthors").await.unwrap(), None);
    assert_eq!(backing.get_meta(PostId(1), "_pcauthors").await.unwrap(), None);
  }

  /// Pauses every `get_meta` after it has read the backing store, until
  /// released.
  struct SlowReads {
    backing: MemoryStore,
    fetched: Notify,
    release: Notify,
  }

  impl Store for SlowReads {
    type Error = Infallible;
  }

  impl MetaStore for SlowReads {
    async fn get_meta(&self, post: PostId, key: &str) -> Result<Option<Value>, Infallible> {
      let value = self.backing.get_meta(post, key).await?;
      self.fetched.notify_one();
      self.release.notified().await;
      Ok(value)
    }

    async fn set_meta(&self, post: PostId, key: &str, value: Value) -> Result<(), Infallible> {
      self.backing.set_meta(post, key, value).await
    }

    async fn delete_meta(&self, post: PostId, key: &str) -> Result<bool, Infallible> {
      self.backing.delete_meta(post, key).await
    }

    async fn posts_with_meta(&self, key: &str) -> Result<Vec<PostId>, Infallible> {
      self.backing.posts_with_meta(key).await
    }
  }

  fn slow(backing: MemoryStore) -> Arc<CachedMetaStore<SlowReads>> {
    Arc::new(CachedMetaStore::new(SlowReads {
      backing,
      fetched: Notify::new(),
      release: Notify::new(),
    }))
  }

  #[tokio::test]
  async fn write_during_a_read_is_not_overwritten() {
    let backing = MemoryStore::new();
    backing.seed_meta(PostId(1), "_pcauthors", json!([3]));
    let cached = slow(backing.clone());

    let reader = tokio::spawn({
      let cached = cached.clone();
      async move { cached.get_meta(PostId(1), "_pcauthors").await }
    });
    cached.inner.fetched.notified().await;

    cached.set_meta(PostId(1), "_pcauthors", json!([7])).await.unwrap();
    cached.inner.release.notify_one();

    assert_eq!(reader.await.unwrap().unwrap(), Some(json!([7])));
    assert_eq!(backing.get_meta(PostId(1), "_pcauthors").await.unwrap(), Some(json!([7])));
    assert_eq!(cached.get_meta(PostId(1), "_pcauthors").await.unwrap(), Some(json!([7])));
  }

  #[tokio::test]
  async fn flush_during_a_read_leaves_nothing_stale() {
    let backing = MemoryStore::new();
    backing.seed_meta(PostId(1), "_pcauthors", json!([3]));
    let cached = slow(backing.clone());

    let reader = tokio::spawn({
      let cached = cached.clone();
      async move { cached.get_meta(PostId(1), "_pcauthors").await }
    });
    cached.inner.fetched.notified().await;

    backing.seed_meta(PostId(1), "_pcauthors", json!([7]));
    cached.flush_cache().await.unwrap();
    cached.inner.release.notify_one();

    assert_eq!(reader.await.unwrap().unwrap(), Some(json!([3])));
    assert_eq!(cached.cached(), 0);

    cached.inner.release.notify_one();
    assert_eq!(cached.get_meta(PostId(1), "_pcauthors").await.unwrap(), Some(json!([7])));
  }
}
