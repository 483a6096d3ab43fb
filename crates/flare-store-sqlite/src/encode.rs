//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as fixed-width RFC 3339 strings (nanosecond
//! precision, `Z` suffix) so that lexical order equals chronological order.
//! UUIDs are stored as hyphenated lowercase strings. Enums are stored by
//! their lowercase / snake_case names.

use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, Utc};
use flare_core::{
  check_in::CheckInShare,
  flare::{FlareSignal, Urgency},
  invite::InviteCode,
  permissions::Permissions,
  relationship::{Relationship, RelationshipStatus},
  user::{UserId, UserPair},
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Scalars ─────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

fn decode_opt_dt(s: Option<String>) -> Result<Option<DateTime<Utc>>> {
  s.as_deref().map(decode_dt).transpose()
}

pub fn decode_user(column: &'static str, s: String) -> Result<UserId> {
  UserId::new(s.clone()).map_err(|_| Error::Decode { column, value: s })
}

fn decode_enum<T: FromStr>(column: &'static str, s: String) -> Result<T> {
  T::from_str(&s).map_err(|_| Error::Decode { column, value: s })
}

// ─── Relationship rows ───────────────────────────────────────────────────────

/// Column list shared by every query that reads a [`RawRelationship`].
pub const RELATIONSHIP_COLUMNS: &str = "relationship_id, inviter, user_low, \
  user_high, status, invite_code, share_mood_data, allow_flare_signals, \
  share_journal_entries, created_at, updated_at, accepted_at";

/// Raw values read directly from a `relationships` row.
pub struct RawRelationship {
  pub relationship_id:       String,
  pub inviter:               String,
  pub user_low:              Option<String>,
  pub user_high:             Option<String>,
  pub status:                String,
  pub invite_code:           Option<String>,
  pub share_mood_data:       bool,
  pub allow_flare_signals:   bool,
  pub share_journal_entries: bool,
  pub created_at:            String,
  pub updated_at:            String,
  pub accepted_at:           Option<String>,
}

impl RawRelationship {
  /// Read a row selected with [`RELATIONSHIP_COLUMNS`].
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      relationship_id:       row.get(0)?,
      inviter:               row.get(1)?,
      user_low:              row.get(2)?,
      user_high:             row.get(3)?,
      status:                row.get(4)?,
      invite_code:           row.get(5)?,
      share_mood_data:       row.get(6)?,
      allow_flare_signals:   row.get(7)?,
      share_journal_entries: row.get(8)?,
      created_at:            row.get(9)?,
      updated_at:            row.get(10)?,
      accepted_at:           row.get(11)?,
    })
  }

  pub fn into_relationship(self) -> Result<Relationship> {
    let pair = match (self.user_low, self.user_high) {
      (Some(low), Some(high)) => {
        let low = decode_user("user_low", low)?;
        let high = decode_user("user_high", high)?;
        let value = format!("{low}/{high}");
        Some(
          UserPair::new(low, high)
            .ok_or(Error::Decode { column: "user_low", value })?,
        )
      }
      _ => None,
    };

    let invite_code = self
      .invite_code
      .map(|c| {
        InviteCode::parse(&c).map_err(|_| Error::Decode {
          column: "invite_code",
          value:  c,
        })
      })
      .transpose()?;

    Ok(Relationship {
      relationship_id: decode_uuid(&self.relationship_id)?,
      inviter: decode_user("inviter", self.inviter)?,
      pair,
      status: decode_enum::<RelationshipStatus>("status", self.status)?,
      invite_code,
      permissions: Permissions {
        share_mood_data:       self.share_mood_data,
        allow_flare_signals:   self.allow_flare_signals,
        share_journal_entries: self.share_journal_entries,
      },
      created_at: decode_dt(&self.created_at)?,
      updated_at: decode_dt(&self.updated_at)?,
      accepted_at: decode_opt_dt(self.accepted_at)?,
    })
  }
}

// ─── Flare rows ──────────────────────────────────────────────────────────────

pub const FLARE_COLUMNS: &str = "flare_id, sender, recipient, message, \
  urgency_level, is_read, responded_at, response, created_at";

/// Raw values read directly from a `flare_signals` row.
pub struct RawFlare {
  pub flare_id:      String,
  pub sender:        String,
  pub recipient:     String,
  pub message:       String,
  pub urgency_level: String,
  pub is_read:       bool,
  pub responded_at:  Option<String>,
  pub response:      Option<String>,
  pub created_at:    String,
}

impl RawFlare {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      flare_id:      row.get(0)?,
      sender:        row.get(1)?,
      recipient:     row.get(2)?,
      message:       row.get(3)?,
      urgency_level: row.get(4)?,
      is_read:       row.get(5)?,
      responded_at:  row.get(6)?,
      response:      row.get(7)?,
      created_at:    row.get(8)?,
    })
  }

  pub fn into_flare(self) -> Result<FlareSignal> {
    Ok(FlareSignal {
      flare_id:      decode_uuid(&self.flare_id)?,
      sender:        decode_user("sender", self.sender)?,
      recipient:     decode_user("recipient", self.recipient)?,
      message:       self.message,
      urgency_level: decode_enum::<Urgency>("urgency_level", self.urgency_level)?,
      is_read:       self.is_read,
      responded_at:  decode_opt_dt(self.responded_at)?,
      response:      self.response,
      created_at:    decode_dt(&self.created_at)?,
    })
  }
}

// ─── Check-in rows ───────────────────────────────────────────────────────────

pub const CHECK_IN_COLUMNS: &str =
  "share_id, sharer, recipient, mood_entry_id, shared_at, is_viewed";

/// Raw values read directly from a `check_in_shares` row.
pub struct RawCheckIn {
  pub share_id:      String,
  pub sharer:        String,
  pub recipient:     String,
  pub mood_entry_id: String,
  pub shared_at:     String,
  pub is_viewed:     bool,
}

impl RawCheckIn {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      share_id:      row.get(0)?,
      sharer:        row.get(1)?,
      recipient:     row.get(2)?,
      mood_entry_id: row.get(3)?,
      shared_at:     row.get(4)?,
      is_viewed:     row.get(5)?,
    })
  }

  pub fn into_check_in(self) -> Result<CheckInShare> {
    Ok(CheckInShare {
      share_id:      decode_uuid(&self.share_id)?,
      sharer:        decode_user("sharer", self.sharer)?,
      recipient:     decode_user("recipient", self.recipient)?,
      mood_entry_id: self.mood_entry_id,
      shared_at:     decode_dt(&self.shared_at)?,
      is_viewed:     self.is_viewed,
    })
  }
}
