//! Anti-forgery tokens scoped to an action name.

use chrono::{DateTime, TimeDelta, Utc};
use rand_core::{OsRng, RngCore as _};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq as _;

use crate::ids::UserId;

/// Issues and validates action-scoped tokens.
pub trait NonceService: Send + Sync {
  fn issue(&self, action: &str, user: Option<UserId>) -> String;

  fn verify(&self, token: &str, action: &str, user: Option<UserId>) -> bool;
}

/// Number of hex characters kept from the digest.
const TOKEN_LEN: usize = 20;

/// Keyed-hash tokens that rotate with time.
///
/// Time is cut into ticks of half the lifetime. A token is valid during the
/// tick it was issued in and the one after, so its effective age is between
/// half the lifetime and the full lifetime.
#[derive(Clone)]
pub struct HashNonces {
  secret:   Vec<u8>,
  lifetime: TimeDelta,
}

impl HashNonces {
  pub fn new(secret: impl Into<Vec<u8>>, lifetime: TimeDelta) -> Self {
    Self { secret: secret.into(), lifetime }
  }

  /// Use a fresh secret from the OS RNG. Tokens do not survive a restart.
  pub fn random(lifetime: TimeDelta) -> Self {
    let mut secret = vec![0u8; 32];
    OsRng.fill_bytes(&mut secret);
    Self::new(secret, lifetime)
  }

  fn tick(&self, now: DateTime<Utc>) -> i64 {
    let half = (self.lifetime.num_seconds() / 2).max(1);
    // Ceiling division; timestamps before the epoch are not a concern.
    (now.timestamp() + half - 1) / half
  }

  fn token_for(&self, tick: i64, action: &str, user: Option<UserId>) -> String {
    let uid = user.map_or(0, |u| u.0);
    let mut hasher = Sha256::new();
    hasher.update(&self.secret);
    hasher.update(format!("{tick}|{action}|{uid}").as_bytes());
    let mut token = hex::encode(hasher.finalize());
    token.truncate(TOKEN_LEN);
    token
  }

  pub fn issue_at(&self, now: DateTime<Utc>, action: &str, user: Option<UserId>) -> String {
    self.token_for(self.tick(now), action, user)
  }

  pub fn verify_at(
    &self,
    now: DateTime<Utc>,
    token: &str,
    action: &str,
    user: Option<UserId>,
  ) -> bool {
    if token.is_empty() {
      return false;
    }
    let tick = self.tick(now);
    [tick, tick - 1].into_iter().any(|t| {
      let expected = self.token_for(t, action, user);
      bool::from(expected.as_bytes().ct_eq(token.as_bytes()))
    })
  }
}

impl NonceService for HashNonces {
  fn issue(&self, action: &str, user: Option<UserId>) -> String {
    self.issue_at(Utc::now(), action, user)
  }

  fn verify(&self, token: &str, action: &str, user: Option<UserId>) -> bool {
    self.verify_at(Utc::now(), token, action, user)
  }
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone;

  use super::*;

  fn nonces() -> HashNonces { HashNonces::new(b"test-secret".to_vec(), TimeDelta::hours(24)) }

  fn at(secs: i64) -> DateTime<Utc> { Utc.timestamp_opt(secs, 0).unwrap() }

  #[test]
  fn issued_token_verifies() {
    let n = nonces();
    let token = n.issue_at(at(1_700_000_000), "save", Some(UserId(1)));
    assert_eq!(token.len(), TOKEN_LEN);
    assert!(n.verify_at(at(1_700_000_000), &token, "save", Some(UserId(1))));
  }

  #[test]
  fn token_is_scoped_to_action_and_user() {
    let n = nonces();
    let token = n.issue_at(at(1_700_000_000), "save", Some(UserId(1)));
    assert!(!n.verify_at(at(1_700_000_000), &token, "delete", Some(UserId(1))));
    assert!(!n.verify_at(at(1_700_000_000), &token, "save", Some(UserId(2))));
    assert!(!n.verify_at(at(1_700_000_000), &token, "save", None));
  }

  #[test]
  fn token_survives_one_tick_then_expires() {
    let n = nonces();
    let issued = 1_700_000_000;
    let token = n.issue_at(at(issued), "save", None);
    assert!(n.verify_at(at(issued + 12 * 3600), &token, "save", None));
    assert!(!n.verify_at(at(issued + 36 * 3600), &token, "save", None));
  }

  #[test]
  fn different_secrets_disagree() {
    let a = nonces();
    let b = HashNonces::new(b"other".to_vec(), TimeDelta::hours(24));
    let token = a.issue_at(at(1_700_000_000), "save", None);
    assert!(!b.verify_at(at(1_700_000_000), &token, "save", None));
  }

  #[test]
  fn empty_and_garbage_tokens_fail() {
    let n = nonces();
    assert!(!n.verify_at(at(1_700_000_000), "", "save", None));
    assert!(!n.verify_at(at(1_700_000_000), "not-a-token", "save", None));
  }
}
