//! Single-use invite codes.

use std::fmt;

use rand_core::RngCore;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result, permissions::Permissions, user::UserId};

/// Symbols an invite code is drawn from.
pub const ALPHABET: &[u8; 36] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Number of symbols in every invite code.
pub const CODE_LEN: usize = 8;

// Largest multiple of 36 that fits in a byte; bytes at or above it are
// redrawn so every symbol is equally likely.
const REJECT_AT: u8 = (u8::MAX / 36) * 36;

/// An 8-character code over `[A-Z0-9]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct InviteCode(String);

impl InviteCode {
  /// Draw a fresh code from `rng`.
  pub fn generate<R: RngCore + ?Sized>(rng: &mut R) -> Self {
    let mut code = String::with_capacity(CODE_LEN);
    let mut buf = [0u8; 16];
    while code.len() < CODE_LEN {
      rng.fill_bytes(&mut buf);
      for &b in buf.iter().filter(|&&b| b < REJECT_AT) {
        if code.len() == CODE_LEN {
          break;
        }
        code.push(ALPHABET[usize::from(b % 36)] as char);
      }
    }
    Self(code)
  }

  /// Validate user-supplied input. Surrounding whitespace is ignored; case
  /// is not folded.
  pub fn parse(raw: &str) -> Result<Self> {
    let raw = raw.trim();
    if raw.is_empty() {
      return Err(Error::Validation("invite code is required".into()));
    }
    if raw.len() != CODE_LEN || !raw.bytes().all(|b| ALPHABET.contains(&b)) {
      return Err(Error::Validation(format!(
        "invite code must be {CODE_LEN} characters from A-Z and 0-9"
      )));
    }
    Ok(Self(raw.to_owned()))
  }

  pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for InviteCode {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

impl TryFrom<String> for InviteCode {
  type Error = Error;

  fn try_from(s: String) -> Result<Self> { Self::parse(&s) }
}

impl From<InviteCode> for String {
  fn from(c: InviteCode) -> Self { c.0 }
}

// ─── Operation results ───────────────────────────────────────────────────────

/// Returned to the inviter by [`crate::service::InviteManager::create_invite`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssuedInvite {
  pub invite_code:     InviteCode,
  pub relationship_id: Uuid,
}

/// Returned to the joiner by [`crate::service::InviteManager::consume_invite`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JoinedBuddy {
  pub relationship_id: Uuid,
  /// The inviter, from the joiner's point of view.
  pub buddy:           UserId,
  pub permissions:     Permissions,
}
