//! Error types for `flare-core`.

use thiserror::Error;

/// Why an otherwise well-formed request was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Forbidden {
  #[error("cannot join your own invite")]
  SelfJoin,
}

#[derive(Debug, Error)]
pub enum Error {
  #[error("invalid input: {0}")]
  Validation(String),

  #[error("{0} not found")]
  NotFound(String),

  #[error("conflict: {0}")]
  Conflict(String),

  #[error("forbidden: {0}")]
  Forbidden(Forbidden),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  /// Wrap a backend error. Used at every store call site.
  pub fn store<E>(e: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Store(Box::new(e))
  }

  pub fn not_found(what: impl Into<String>) -> Self {
    Self::NotFound(what.into())
  }
}

impl From<Forbidden> for Error {
  fn from(f: Forbidden) -> Self { Self::Forbidden(f) }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
