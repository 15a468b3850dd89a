//! `POST /admin/posts/{id}`: the edit screen's form submission.

use axum::{
  Form,
  extract::{Path, State},
  response::Redirect,
};
use coauthors_core::{
  editor::{CONTRIBUTORS_FIELD, NONCE_FIELD, SaveRequest},
  user::Viewer,
};

use crate::{AppState, SiteStore, auth::Authenticated, error::Error, handlers::load_post};

const AUTOSAVE_FIELD: &str = "autosave";

/// The contributor-related fields of a posted edit form.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Submission {
  pub nonce:        Option<String>,
  pub autosave:     bool,
  /// `None` when no checkbox field was posted at all.
  pub contributors: Option<Vec<String>>,
}

impl Submission {
  /// Collect from raw form pairs; repeated contributor fields keep their
  /// order, the first nonce wins.
  pub fn from_fields(fields: Vec<(String, String)>) -> Self {
    let mut submission = Self::default();
    for (key, value) in fields {
      match key.as_str() {
        CONTRIBUTORS_FIELD => submission.contributors.get_or_insert_with(Vec::new).push(value),
        NONCE_FIELD if submission.nonce.is_none() => submission.nonce = Some(value),
        AUTOSAVE_FIELD => submission.autosave |= matches!(value.as_str(), "1" | "true"),
        _ => {}
      }
    }
    submission
  }
}

/// Hand the submission to the editor, then send the browser back to the edit
/// screen whatever the outcome.
pub async fn handler<S: SiteStore>(
  State(state): State<AppState<S>>,
  Authenticated(user): Authenticated,
  Path(id): Path<i64>,
  Form(fields): Form<Vec<(String, String)>>,
) -> Result<Redirect, Error> {
  let post = load_post(&state, id).await?;
  let viewer = Viewer::signed_in(user).with_post(&post);
  let submission = Submission::from_fields(fields);

  state
    .editor
    .save_submission(post.id, SaveRequest {
      nonce:     submission.nonce.as_deref(),
      autosave:  submission.autosave,
      identity:  &viewer,
      submitted: submission.contributors,
    })
    .await?;

  Ok(Redirect::to(&format!("/admin/posts/{}/edit", post.id)))
}
