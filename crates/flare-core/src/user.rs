//! Caller identities and canonical pairs of them.
//!
//! A [`UserId`] is opaque: it is issued by whatever authenticates the caller
//! and is trusted unconditionally once it reaches this crate.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// An opaque identity supplied by the authentication layer.
#[derive(
  Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
  /// Wrap a raw identity string. Fails on empty or whitespace-only input.
  pub fn new(raw: impl Into<String>) -> Result<Self> {
    let raw = raw.into();
    if raw.trim().is_empty() {
      return Err(Error::Validation("user id must not be empty".into()));
    }
    Ok(Self(raw))
  }

  pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for UserId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

impl AsRef<str> for UserId {
  fn as_ref(&self) -> &str { &self.0 }
}

// ─── UserPair ────────────────────────────────────────────────────────────────

/// An unordered pair of distinct users, stored in canonical order so that
/// `{A, B}` and `{B, A}` are the same key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserPair {
  low:  UserId,
  high: UserId,
}

impl UserPair {
  /// Canonicalise two identities. Returns `None` when they are the same user.
  pub fn new(a: UserId, b: UserId) -> Option<Self> {
    match a.cmp(&b) {
      std::cmp::Ordering::Less => Some(Self { low: a, high: b }),
      std::cmp::Ordering::Greater => Some(Self { low: b, high: a }),
      std::cmp::Ordering::Equal => None,
    }
  }

  pub fn low(&self) -> &UserId { &self.low }

  pub fn high(&self) -> &UserId { &self.high }

  /// The member of the pair that is not `viewer`, or `None` if `viewer` is
  /// not a member at all.
  pub fn other(&self, viewer: &UserId) -> Option<&UserId> {
    if &self.low == viewer {
      Some(&self.high)
    } else if &self.high == viewer {
      Some(&self.low)
    } else {
      None
    }
  }
}
