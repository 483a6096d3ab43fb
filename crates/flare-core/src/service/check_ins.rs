//! Sharing daily mood check-ins with buddies.

use std::sync::Arc;

use uuid::Uuid;

use crate::{
  Error, Result,
  check_in::{CheckInShare, NewCheckIn},
  flare::LIST_LIMIT,
  permissions::Capability,
  service::PermissionGate,
  store::BuddyStore,
  user::UserId,
};

pub struct CheckInSharing<S> {
  store: Arc<S>,
  gate:  PermissionGate<S>,
}

impl<S> Clone for CheckInSharing<S> {
  fn clone(&self) -> Self {
    Self { store: Arc::clone(&self.store), gate: self.gate.clone() }
  }
}

impl<S: BuddyStore> CheckInSharing<S> {
  pub fn new(store: Arc<S>, gate: PermissionGate<S>) -> Self {
    Self { store, gate }
  }

  /// Share mood entry `mood_entry_id` with `buddy`, who must have an
  /// accepted relationship with `sharer` that allows mood sharing.
  pub async fn share(
    &self,
    sharer: UserId,
    buddy: UserId,
    mood_entry_id: &str,
  ) -> Result<Uuid> {
    let mood_entry_id = mood_entry_id.trim();
    if mood_entry_id.is_empty() {
      return Err(Error::Validation("mood entry id is required".into()));
    }
    if !self
      .gate
      .has_capability(&sharer, &buddy, Capability::ShareMoodData)
      .await?
    {
      return Err(Error::not_found("buddy relationship allowing mood sharing"));
    }

    let share = self
      .store
      .insert_check_in(NewCheckIn {
        sharer,
        recipient: buddy,
        mood_entry_id: mood_entry_id.to_owned(),
      })
      .await
      .map_err(Error::store)?;
    Ok(share.share_id)
  }

  pub async fn list(
    &self,
    recipient: UserId,
    unviewed_only: bool,
  ) -> Result<Vec<CheckInShare>> {
    self
      .store
      .list_check_ins(recipient, unviewed_only, LIST_LIMIT)
      .await
      .map_err(Error::store)
  }

  pub async fn mark_viewed(
    &self,
    share_id: Uuid,
    recipient: UserId,
  ) -> Result<CheckInShare> {
    self
      .store
      .mark_check_in_viewed(share_id, recipient)
      .await
      .map_err(Error::store)?
      .ok_or_else(|| Error::not_found("check-in share"))
  }
}
