//! `GET /admin/posts/{id}/edit`: the post edit screen with the contributor
//! metabox.

use axum::{
  extract::{Path, State},
  response::Html,
};
use coauthors_core::{
  assets::AssetManifest,
  user::{Capabilities as _, Capability, Viewer},
};

use crate::{
  AppState, Editor, SiteStore, auth::Authenticated, error::Error, handlers::load_post, pages,
};

pub async fn handler<S: SiteStore>(
  State(state): State<AppState<S>>,
  Authenticated(user): Authenticated,
  Path(id): Path<i64>,
) -> Result<Html<String>, Error> {
  let post = load_post(&state, id).await?;

  let viewer = Viewer::signed_in(user).with_post(&post);
  if !viewer.can(Capability::EditPost(post.id)) {
    return Err(Error::Forbidden);
  }

  let metabox = if Editor::<S>::applies_to(&post) {
    Some(state.editor.render_form(&post, &viewer).await?)
  } else {
    None
  };

  let body = pages::edit_screen(&post, metabox.as_deref());
  Ok(Html(pages::layout(
    &format!("Edit {}", post.title),
    &AssetManifest::new(),
    &body,
  )))
}
