//! HTTP Basic-auth extractor backed by the account table.

use argon2::{
  Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString,
};
use axum::extract::FromRequestParts;
use axum::http::{HeaderMap, request::Parts};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as B64;
use coauthors_core::{store::AccountStore, user::User};
use rand_core::OsRng;

use crate::{AppState, SiteStore, error::Error};

/// The signed-in user. Present in a handler means the request was
/// authenticated against a stored account.
pub struct Authenticated(pub User);

/// Produce the argon2 PHC string stored in `users.password_hash`.
pub fn hash_password(password: &str) -> Result<String, Error> {
  let salt = SaltString::generate(&mut OsRng);
  Ok(
    Argon2::default()
      .hash_password(password.as_bytes(), &salt)
      .map_err(|e| Error::PasswordHash(e.to_string()))?
      .to_string(),
  )
}

/// Check `password` against a PHC string. Malformed hashes never verify.
pub fn verify_password(password: &str, phc: &str) -> Result<(), Error> {
  let parsed_hash = PasswordHash::new(phc).map_err(|_| Error::Unauthorized)?;
  Argon2::default()
    .verify_password(password.as_bytes(), &parsed_hash)
    .map_err(|_| Error::Unauthorized)
}

/// Pull `(login, password)` out of an `Authorization: Basic` header.
pub fn credentials(headers: &HeaderMap) -> Result<(String, String), Error> {
  let header_val = headers
    .get(axum::http::header::AUTHORIZATION)
    .and_then(|v| v.to_str().ok())
    .ok_or(Error::Unauthorized)?;

  let encoded = header_val
    .strip_prefix("Basic ")
    .ok_or(Error::Unauthorized)?;

  let decoded = B64.decode(encoded).map_err(|_| Error::Unauthorized)?;
  let creds = std::str::from_utf8(&decoded).map_err(|_| Error::Unauthorized)?;

  let (login, password) = creds.split_once(':').ok_or(Error::Unauthorized)?;
  Ok((login.to_owned(), password.to_owned()))
}

impl<S: SiteStore> FromRequestParts<AppState<S>> for Authenticated {
  type Rejection = Error;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    let (login, password) = credentials(&parts.headers)?;

    let account = state
      .store
      .find_account(&login)
      .await
      .map_err(|e| Error::Store(Box::new(e)))?
      .ok_or(Error::Unauthorized)?;

    verify_password(&password, &account.password_hash)?;
    Ok(Authenticated(account.user))
  }
}

#[cfg(test)]
mod tests {
  use axum::http::{Request, header};
  use coauthors_core::user::{NewAccount, Role};
  use coauthors_store_sqlite::SqliteStore;

  use super::*;
  use crate::tests::config;

  async fn make_state(password: &str) -> AppState<SqliteStore> {
    let store = SqliteStore::open_in_memory().await.unwrap();
    store
      .add_account(NewAccount {
        login:         "user".into(),
        display_name:  "User".into(),
        email:         "user@example.com".into(),
        nicename:      "user".into(),
        role:          Role::Editor,
        password_hash: hash_password(password).unwrap(),
      })
      .await
      .unwrap();
    AppState::new(store, config()).unwrap()
  }

  /// Run the extractor over a bare request carrying `authorization`.
  async fn login_with(
    authorization: Option<&str>,
    state: &AppState<SqliteStore>,
  ) -> Result<Authenticated, Error> {
    let mut req = Request::builder();
    if let Some(value) = authorization {
      req = req.header(header::AUTHORIZATION, value);
    }
    let (mut parts, ()) = req.body(()).unwrap().into_parts();
    Authenticated::from_request_parts(&mut parts, state).await
  }

  fn basic(user: &str, pass: &str) -> String {
    format!("Basic {}", B64.encode(format!("{user}:{pass}")))
  }

  #[tokio::test]
  async fn stored_account_signs_in() {
    let state = make_state("secret").await;
    let Authenticated(user) = login_with(Some(&basic("user", "secret")), &state).await.unwrap();
    assert_eq!(user.login, "user");
    assert_eq!(user.role, Role::Editor);
  }

  #[tokio::test]
  async fn rejected_credentials() {
    let state = make_state("secret").await;
    for authorization in [
      Some(basic("user", "wrong")),
      Some(basic("nobody", "secret")),
      Some("Basic !!!not-base64!!!".to_string()),
      Some(format!("Bearer {}", B64.encode("user:secret"))),
      Some(format!("Basic {}", B64.encode("user-without-colon"))),
      None,
    ] {
      let result = login_with(authorization.as_deref(), &state).await;
      assert!(matches!(result, Err(Error::Unauthorized)), "{authorization:?}");
    }
  }

  #[test]
  fn accounts_without_a_password_never_verify() {
    assert!(matches!(verify_password("", ""), Err(Error::Unauthorized)));
  }

  #[test]
  fn hashes_are_salted() {
    let a = hash_password("pw").unwrap();
    let b = hash_password("pw").unwrap();
    assert_ne!(a, b);
    verify_password("pw", &a).unwrap();
    verify_password("pw", &b).unwrap();
  }
}
