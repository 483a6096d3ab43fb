//! Flare signals — urgency-tagged support requests between buddies.
//!
//! Signals are pull-only: a recipient sees them by listing, never by push.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use uuid::Uuid;

use crate::user::UserId;

/// Used when the sender leaves the message blank.
pub const DEFAULT_MESSAGE: &str = "Your buddy needs support right now.";

pub const MAX_MESSAGE_CHARS: usize = 200;

pub const MAX_RESPONSE_CHARS: usize = 500;

/// Upper bound on the number of signals returned by one listing.
pub const LIST_LIMIT: usize = 50;

#[derive(
  Debug,
  Clone,
  Copy,
  Default,
  PartialEq,
  Eq,
  PartialOrd,
  Ord,
  Serialize,
  Deserialize,
  AsRefStr,
  Display,
  EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Urgency {
  Low,
  #[default]
  Medium,
  High,
  Crisis,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlareSignal {
  pub flare_id:      Uuid,
  pub sender:        UserId,
  pub recipient:     UserId,
  pub message:       String,
  pub urgency_level: Urgency,
  pub is_read:       bool,
  pub responded_at:  Option<DateTime<Utc>>,
  pub response:      Option<String>,
  pub created_at:    DateTime<Utc>,
}

/// Input to [`crate::store::BuddyStore::insert_flare`]. The message has
/// already been normalised by [`normalize_message`].
#[derive(Debug, Clone)]
pub struct NewFlare {
  pub sender:        UserId,
  pub recipient:     UserId,
  pub message:       String,
  pub urgency_level: Urgency,
}

/// Blank or missing messages become [`DEFAULT_MESSAGE`]; long ones are cut
/// to [`MAX_MESSAGE_CHARS`] characters.
pub fn normalize_message(message: Option<&str>) -> String {
  match message.map(str::trim) {
    Some(m) if !m.is_empty() => truncate_chars(m, MAX_MESSAGE_CHARS),
    _ => DEFAULT_MESSAGE.to_owned(),
  }
}

/// Blank or missing responses are dropped so an earlier response survives.
pub fn normalize_response(response: Option<&str>) -> Option<String> {
  response
    .map(str::trim)
    .filter(|r| !r.is_empty())
    .map(|r| truncate_chars(r, MAX_RESPONSE_CHARS))
}

/// Truncate on a character boundary, not a byte boundary.
pub(crate) fn truncate_chars(s: &str, max: usize) -> String {
  match s.char_indices().nth(max) {
    Some((idx, _)) => s[..idx].to_owned(),
    None => s.to_owned(),
  }
}
