//! In-process store for tests and embedding.
//!
//! Implements the metadata, option and directory traits over plain maps.
//! Cloning shares the underlying data.

use std::{
  collections::{BTreeMap, HashMap},
  convert::Infallible,
  sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
  },
};

use parking_lot::RwLock;
use serde_json::Value;

use crate::{
  ids::{PostId, UserId},
  store::{MetaStore, OptionStore, Store, UserDirectory},
  user::User,
};

#[derive(Default)]
struct Inner {
  meta:    HashMap<(PostId, String), Value>,
  options: HashMap<String, String>,
  users:   BTreeMap<UserId, User>,
}

#[derive(Clone, Default)]
pub struct MemoryStore {
  inner:       Arc<RwLock<Inner>>,
  meta_writes: Arc<AtomicUsize>,
}

impl MemoryStore {
  pub fn new() -> Self { Self::default() }

  pub fn with_users(users: impl IntoIterator<Item = User>) -> Self {
    let store = Self::new();
    {
      let mut inner = store.inner.write();
      for user in users {
        inner.users.insert(user.id, user);
      }
    }
    store
  }

  /// Store a raw value without counting it as a write.
  pub fn seed_meta(&self, post: PostId, key: &str, value: Value) {
    self.inner.write().meta.insert((post, key.to_owned()), value);
  }

  /// Number of `set_meta` calls served so far.
  pub fn meta_writes(&self) -> usize { self.meta_writes.load(Ordering::SeqCst) }
}

impl Store for MemoryStore {
  type Error = Infallible;
}

impl MetaStore for MemoryStore {
  async fn get_meta(&self, post: PostId, key: &str) -> Result<Option<Value>, Infallible> {
    Ok(self.inner.read().meta.get(&(post, key.to_owned())).cloned())
  }

  async fn set_meta(&self, post: PostId, key: &str, value: Value) -> Result<(), Infallible> {
    self.meta_writes.fetch_add(1, Ordering::SeqCst);
    self.inner.write().meta.insert((post, key.to_owned()), value);
    Ok(())
  }

  async fn delete_meta(&self, post: PostId, key: &str) -> Result<bool, Infallible> {
    Ok(self.inner.write().meta.remove(&(post, key.to_owned())).is_some())
  }

  async fn posts_with_meta(&self, key: &str) -> Result<Vec<PostId>, Infallible> {
    let mut posts: Vec<PostId> = self
      .inner
      .read()
      .meta
      .keys()
      .filter(|(_, k)| k == key)
      .map(|(post, _)| *post)
      .collect();
    posts.sort();
    Ok(posts)
  }
}

impl OptionStore for MemoryStore {
  async fn get_option(&self, name: &str) -> Result<Option<String>, Infallible> {
    Ok(self.inner.read().options.get(name).cloned())
  }

  async fn set_option(&self, name: &str, value: &str) -> Result<(), Infallible> {
    self.inner.write().options.insert(name.to_owned(), value.to_owned());
    Ok(())
  }

  async fn delete_option(&self, name: &str) -> Result<bool, Infallible> {
    Ok(self.inner.write().options.remove(name).is_some())
  }
}

impl UserDirectory for MemoryStore {
  async fn list_users(&self) -> Result<Vec<User>, Infallible> {
    Ok(self.inner.read().users.values().cloned().collect())
  }

  async fn get_user(&self, id: UserId) -> Result<Option<User>, Infallible> {
    Ok(self.inner.read().users.get(&id).cloned())
  }
}
