//! Route handlers.

pub mod assets;
pub mod edit;
pub mod save;
pub mod view;

use coauthors_core::{
  ids::PostId,
  post::Post,
  store::PostCatalog,
};

use crate::{AppState, SiteStore, error::Error};

/// Fetch a post or fail with 404.
async fn load_post<S: SiteStore>(state: &AppState<S>, id: i64) -> Result<Post, Error> {
  state
    .store
    .get_post(PostId(id))
    .await
    .map_err(|e| Error::Store(Box::new(e)))?
    .ok_or(Error::NotFound)
}
