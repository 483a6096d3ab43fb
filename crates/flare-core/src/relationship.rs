//! Buddy relationships and their viewer-relative projection.
//!
//! A mutual relationship is a single record keyed by the canonical
//! [`UserPair`]. While an invite is outstanding the record has no pair yet,
//! only the inviter and the invite code. What each side sees is computed on
//! read by [`Relationship::view_for`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use uuid::Uuid;

use crate::{
  invite::InviteCode,
  permissions::Permissions,
  user::{UserId, UserPair},
};

/// Lifecycle of a relationship record.
///
/// ```text
/// pending ──consume──▶ accepted ──block──▶ blocked
///    │
///    └─────decline───▶ declined
/// ```
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Serialize,
  Deserialize,
  AsRefStr,
  Display,
  EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum RelationshipStatus {
  Pending,
  Accepted,
  Declined,
  Blocked,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Relationship {
  pub relationship_id: Uuid,
  /// The user who generated the invite code.
  pub inviter:         UserId,
  /// Both members, once a second user has acted on the invite.
  pub pair:            Option<UserPair>,
  pub status:          RelationshipStatus,
  /// Present only while the invite is pending.
  pub invite_code:     Option<InviteCode>,
  pub permissions:     Permissions,
  pub created_at:      DateTime<Utc>,
  pub updated_at:      DateTime<Utc>,
  pub accepted_at:     Option<DateTime<Utc>>,
}

impl Relationship {
  /// The other member as seen by `viewer`.
  pub fn counterparty(&self, viewer: &UserId) -> Option<&UserId> {
    self.pair.as_ref().and_then(|p| p.other(viewer))
  }

  /// Project an accepted relationship onto one of its members. Returns `None`
  /// for any other status or for a non-member viewer.
  pub fn view_for(&self, viewer: &UserId) -> Option<BuddyView> {
    if self.status != RelationshipStatus::Accepted {
      return None;
    }
    let buddy = self.counterparty(viewer)?.clone();
    Some(BuddyView {
      relationship_id: self.relationship_id,
      buddy,
      permissions: self.permissions,
      since: self.accepted_at.unwrap_or(self.created_at),
    })
  }
}

/// One entry of a user's buddy list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuddyView {
  pub relationship_id: Uuid,
  pub buddy:           UserId,
  pub permissions:     Permissions,
  pub since:           DateTime<Utc>,
}
