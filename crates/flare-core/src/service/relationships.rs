//! Listing, removing and re-permissioning established relationships.

use std::sync::Arc;

use uuid::Uuid;

use crate::{
  Error, Result,
  permissions::{PermissionPatch, Permissions},
  relationship::{BuddyView, RelationshipStatus},
  store::BuddyStore,
  user::{UserId, UserPair},
};

pub struct Relationships<S> {
  store: Arc<S>,
}

impl<S> Clone for Relationships<S> {
  fn clone(&self) -> Self { Self { store: Arc::clone(&self.store) } }
}

impl<S: BuddyStore> Relationships<S> {
  pub fn new(store: Arc<S>) -> Self { Self { store } }

  /// Every accepted relationship of `user`, one entry per buddy.
  pub async fn list_accepted(&self, user: UserId) -> Result<Vec<BuddyView>> {
    let rels = self
      .store
      .list_for_user(user.clone(), RelationshipStatus::Accepted)
      .await
      .map_err(Error::store)?;
    Ok(rels.iter().filter_map(|r| r.view_for(&user)).collect())
  }

  /// Delete whatever exists between `user` and `buddy`. Succeeds when
  /// nothing was there.
  pub async fn remove_relationship(
    &self,
    user: UserId,
    buddy: UserId,
  ) -> Result<usize> {
    let Some(pair) = UserPair::new(user, buddy) else {
      return Ok(0);
    };
    self.store.delete_pair(pair).await.map_err(Error::store)
  }

  /// Merge `patch` into relationship `id`. Either participant may do this.
  pub async fn update_permissions(
    &self,
    id: Uuid,
    caller: UserId,
    patch: PermissionPatch,
  ) -> Result<Permissions> {
    patch.validate()?;
    self
      .store
      .update_permissions(id, caller, patch)
      .await
      .map_err(Error::store)?
      .map(|rel| rel.permissions)
      .ok_or_else(|| Error::not_found("buddy relationship"))
  }

  /// Move the accepted relationship between `user` and `buddy` to `blocked`.
  ///
  /// The blocker is not recorded, so either side can lift the block with
  /// [`Self::remove_relationship`].
  pub async fn block(&self, user: UserId, buddy: UserId) -> Result<Uuid> {
    let pair = UserPair::new(user, buddy)
      .ok_or_else(|| Error::not_found("buddy relationship"))?;
    self
      .store
      .transition_pair(
        pair,
        RelationshipStatus::Accepted,
        RelationshipStatus::Blocked,
      )
      .await
      .map_err(Error::store)?
      .map(|rel| rel.relationship_id)
      .ok_or_else(|| Error::not_found("buddy relationship"))
  }
}
