//! Daily check-in shares: a pointer to one of the sharer's mood entries,
//! made visible to a buddy who has mood sharing enabled.
//!
//! Mood entries themselves live in another system; only the opaque entry id
//! is recorded here.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::user::UserId;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckInShare {
  pub share_id:      Uuid,
  pub sharer:        UserId,
  pub recipient:     UserId,
  pub mood_entry_id: String,
  pub shared_at:     DateTime<Utc>,
  pub is_viewed:     bool,
}

/// Input to [`crate::store::BuddyStore::insert_check_in`].
#[derive(Debug, Clone)]
pub struct NewCheckIn {
  pub sharer:        UserId,
  pub recipient:     UserId,
  pub mood_entry_id: String,
}
