//! Error types for `coauthors-core`.
//!
//! Contributor-level failures (bad nonce, missing capability, unresolvable
//! user) are not errors; they are absorbed where they are detected. This type
//! only carries infrastructure failures.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),

  #[error("requires platform version {required} or higher, found {found}")]
  UnsupportedPlatform { required: String, found: String },

  #[error("invalid version string: {0}")]
  Version(#[from] semver::Error),

  #[error("invalid url: {0}")]
  Url(#[from] url::ParseError),

  #[error("url cannot be used as a base: {0}")]
  NotABase(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
