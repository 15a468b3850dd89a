//! Public front end: the post listing and single post view.

use axum::{
  extract::{Path, State},
  response::Html,
};
use coauthors_core::{post::DisplayContext, store::PostCatalog};

use crate::{AppState, SiteStore, error::Error, handlers::load_post, pages};

/// `GET /`: every post and page, newest first. Bodies go through the
/// renderer like anywhere else, but a listing never gets the box.
pub async fn index<S: SiteStore>(State(state): State<AppState<S>>) -> Result<Html<String>, Error> {
  let posts = state
    .store
    .list_posts()
    .await
    .map_err(|e| Error::Store(Box::new(e)))?;

  let context = DisplayContext::Listing;
  let mut assets = (*state.assets).clone();
  state.renderer.declare_assets(&context, &mut assets)?;

  let mut body = String::from("<main>\n");
  for post in &posts {
    let content = state
      .renderer
      .augment_content(&context, post.id, &post.content)
      .await?;
    body.push_str(&pages::article(post, &content, true));
  }
  body.push_str("</main>\n");

  Ok(Html(pages::layout("Posts", &assets, &body)))
}

/// `GET /posts/{id}`
pub async fn single<S: SiteStore>(
  State(state): State<AppState<S>>,
  Path(id): Path<i64>,
) -> Result<Html<String>, Error> {
  let post = load_post(&state, id).await?;

  let context = DisplayContext::Singular(post.post_type);
  let mut assets = (*state.assets).clone();
  state.renderer.declare_assets(&context, &mut assets)?;

  let content = state
    .renderer
    .augment_content(&context, post.id, &post.content)
    .await?;
  let body = format!("<main>\n{}</main>\n", pages::article(&post, &content, false));

  Ok(Html(pages::layout(&post.title, &assets, &body)))
}
