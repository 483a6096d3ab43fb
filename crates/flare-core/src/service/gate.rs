//! Read-only capability checks between two users.

use std::sync::Arc;

use crate::{
  Error, Result,
  permissions::Capability,
  relationship::RelationshipStatus,
  store::BuddyStore,
  user::{UserId, UserPair},
};

pub struct PermissionGate<S> {
  store: Arc<S>,
}

impl<S> Clone for PermissionGate<S> {
  fn clone(&self) -> Self { Self { store: Arc::clone(&self.store) } }
}

impl<S: BuddyStore> PermissionGate<S> {
  pub fn new(store: Arc<S>) -> Self { Self { store } }

  /// True iff `a` and `b` have an accepted relationship with `capability`
  /// switched on. Blocked relationships never pass.
  pub async fn has_capability(
    &self,
    a: &UserId,
    b: &UserId,
    capability: Capability,
  ) -> Result<bool> {
    let Some(pair) = UserPair::new(a.clone(), b.clone()) else {
      return Ok(false);
    };
    let rel = self.store.find_pair(pair).await.map_err(Error::store)?;
    Ok(rel.is_some_and(|r| {
      r.status == RelationshipStatus::Accepted
        && r.permissions.allows(capability)
    }))
  }
}
