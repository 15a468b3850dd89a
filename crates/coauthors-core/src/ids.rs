//! Identifiers and the contributor list: the only entity this crate owns.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

// ─── Identifiers ─────────────────────────────────────────────────────────────

/// Opaque identifier of a post owned by the host platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PostId(pub i64);

/// Opaque identifier of a user in the user directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub i64);

impl UserId {
  /// Sentinel produced when a submitted value has no integer prefix.
  pub const INVALID: UserId = UserId(0);

  /// Coerce an untrusted form value into a user id.
  ///
  /// Integer-prefix semantics: leading ASCII whitespace is skipped, an
  /// optional sign is accepted, then as many decimal digits as follow. No
  /// digits yields [`UserId::INVALID`]; overflow saturates.
  pub fn coerce(raw: &str) -> UserId {
    let s = raw.trim_start_matches([' ', '\t', '\n', '\r', '\x0b', '\x0c']);
    let (negative, digits) = match s.as_bytes().first() {
      Some(b'-') => (true, &s[1..]),
      Some(b'+') => (false, &s[1..]),
      _ => (false, s),
    };

    let mut value: i64 = 0;
    for b in digits.bytes().take_while(u8::is_ascii_digit) {
      let d = i64::from(b - b'0');
      value = match value.checked_mul(10).and_then(|v| v.checked_add(d)) {
        Some(v) => v,
        None => return UserId(if negative { i64::MIN } else { i64::MAX }),
      };
    }

    UserId(if negative { -value } else { value })
  }

  /// Coerce a stored JSON element the same way a submitted value would be.
  fn from_json(value: &Value) -> UserId {
    match value {
      Value::Number(n) => n
        .as_i64()
        .or_else(|| n.as_f64().map(|f| f as i64))
        .map(UserId)
        .unwrap_or(UserId::INVALID),
      Value::String(s) => UserId::coerce(s),
      Value::Bool(true) => UserId(1),
      _ => UserId::INVALID,
    }
  }
}

impl fmt::Display for PostId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.0) }
}

impl fmt::Display for UserId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.0) }
}

// ─── ContributorList ─────────────────────────────────────────────────────────

/// Ordered user ids credited on a post.
///
/// Order is submission order. Duplicates and invalid ids are kept exactly as
/// submitted; de-duplication and existence checks are not this type's job.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContributorList(Vec<UserId>);

impl ContributorList {
  pub fn new(ids: Vec<UserId>) -> Self { Self(ids) }

  /// Build a list from raw submitted form values, coercing each one.
  pub fn from_submission<I, S>(raw: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
  {
    Self(raw.into_iter().map(|s| UserId::coerce(s.as_ref())).collect())
  }

  /// Normalize whatever the metadata store returned.
  ///
  /// Absent values and anything that is not a JSON array become the empty
  /// list.
  pub fn from_meta(value: Option<&Value>) -> Self {
    match value {
      Some(Value::Array(items)) => Self(items.iter().map(UserId::from_json).collect()),
      _ => Self::default(),
    }
  }

  pub fn to_meta(&self) -> Value {
    Value::Array(self.0.iter().map(|id| Value::from(id.0)).collect())
  }

  pub fn contains(&self, id: UserId) -> bool { self.0.contains(&id) }

  pub fn is_empty(&self) -> bool { self.0.is_empty() }

  pub fn len(&self) -> usize { self.0.len() }

  pub fn iter(&self) -> impl Iterator<Item = UserId> + '_ { self.0.iter().copied() }

  pub fn as_slice(&self) -> &[UserId] { &self.0 }
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  #[test]
  fn coerce_plain_integers() {
    assert_eq!(UserId::coerce("5"), UserId(5));
    assert_eq!(UserId::coerce("  42"), UserId(42));
    assert_eq!(UserId::coerce("+7"), UserId(7));
    assert_eq!(UserId::coerce("-3"), UserId(-3));
  }

  #[test]
  fn coerce_takes_the_integer_prefix() {
    assert_eq!(UserId::coerce("12abc"), UserId(12));
    assert_eq!(UserId::coerce("5.9"), UserId(5));
    assert_eq!(UserId::coerce("0x1A"), UserId(0));
  }

  #[test]
  fn coerce_non_numeric_is_invalid() {
    assert_eq!(UserId::coerce("abc"), UserId::INVALID);
    assert_eq!(UserId::coerce(""), UserId::INVALID);
    assert_eq!(UserId::coerce("-"), UserId::INVALID);
  }

  #[test]
  fn coerce_saturates_on_overflow() {
    assert_eq!(UserId::coerce("99999999999999999999999"), UserId(i64::MAX));
    assert_eq!(UserId::coerce("-99999999999999999999999"), UserId(i64::MIN));
  }

  #[test]
  fn submission_keeps_order_duplicates_and_sentinels() {
    let list = ContributorList::from_submission(["5", "abc", "9", "5"]);
    assert_eq!(list.as_slice(), &[UserId(5), UserId(0), UserId(9), UserId(5)]);
  }

  #[test]
  fn from_meta_normalizes_malformed_values_to_empty() {
    assert!(ContributorList::from_meta(None).is_empty());
    assert!(ContributorList::from_meta(Some(&json!("3,7"))).is_empty());
    assert!(ContributorList::from_meta(Some(&json!({ "0": 3 }))).is_empty());
    assert!(ContributorList::from_meta(Some(&Value::Null)).is_empty());
  }

  #[test]
  fn from_meta_reads_arrays() {
    let list = ContributorList::from_meta(Some(&json!([3, "7", 3, null])));
    assert_eq!(list.as_slice(), &[UserId(3), UserId(7), UserId(3), UserId(0)]);
  }

  #[test]
  fn to_meta_is_an_integer_array() {
    let list = ContributorList::new(vec![UserId(3), UserId(7)]);
    assert_eq!(list.to_meta(), json!([3, 7]));
  }
}
