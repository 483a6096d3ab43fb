//! Components that enforce pairing and signalling rules over a
//! [`BuddyStore`], and the [`BuddyService`] facade that bundles them.
//!
//! Every operation is an independent unit of work whose only suspension
//! points are store calls. Nothing here holds state across calls.

mod check_ins;
mod flares;
mod gate;
mod invites;
mod relationships;

use std::sync::Arc;

pub use check_ins::CheckInSharing;
pub use flares::FlareDispatcher;
pub use gate::PermissionGate;
pub use invites::InviteManager;
pub use relationships::Relationships;

use uuid::Uuid;

use crate::{
  Result,
  check_in::CheckInShare,
  flare::{FlareSignal, Urgency},
  invite::{IssuedInvite, JoinedBuddy},
  permissions::{Capability, PermissionPatch, Permissions},
  relationship::BuddyView,
  store::BuddyStore,
  user::UserId,
};

/// The caller-facing surface. Every method takes the authenticated caller
/// first.
pub struct BuddyService<S> {
  pub invites:       InviteManager<S>,
  pub relationships: Relationships<S>,
  pub gate:          PermissionGate<S>,
  pub flares:        FlareDispatcher<S>,
  pub check_ins:     CheckInSharing<S>,
}

impl<S> Clone for BuddyService<S> {
  fn clone(&self) -> Self {
    Self {
      invites:       self.invites.clone(),
      relationships: self.relationships.clone(),
      gate:          self.gate.clone(),
      flares:        self.flares.clone(),
      check_ins:     self.check_ins.clone(),
    }
  }
}

impl<S: BuddyStore> BuddyService<S> {
  pub fn new(store: Arc<S>) -> Self {
    Self::with_default_permissions(store, Permissions::DEFAULT)
  }

  /// Build the service with `defaults` as the permission set of every new
  /// relationship.
  pub fn with_default_permissions(store: Arc<S>, defaults: Permissions) -> Self {
    let gate = PermissionGate::new(Arc::clone(&store));
    Self {
      invites:       InviteManager::new(Arc::clone(&store), defaults),
      relationships: Relationships::new(Arc::clone(&store)),
      flares:        FlareDispatcher::new(Arc::clone(&store), gate.clone()),
      check_ins:     CheckInSharing::new(store, gate.clone()),
      gate,
    }
  }

  // ── Invites ───────────────────────────────────────────────────────────

  pub async fn generate_invite(&self, user: UserId) -> Result<IssuedInvite> {
    self.invites.create_invite(user).await
  }

  pub async fn consume_invite(
    &self,
    user: UserId,
    code: &str,
  ) -> Result<JoinedBuddy> {
    self.invites.consume_invite(code, user).await
  }

  pub async fn decline_invite(&self, user: UserId, code: &str) -> Result<Uuid> {
    self.invites.decline_invite(code, user).await
  }

  // ── Relationships ─────────────────────────────────────────────────────

  pub async fn list_relationships(&self, user: UserId) -> Result<Vec<BuddyView>> {
    self.relationships.list_accepted(user).await
  }

  pub async fn update_permissions(
    &self,
    user: UserId,
    relationship_id: Uuid,
    patch: PermissionPatch,
  ) -> Result<Permissions> {
    self
      .relationships
      .update_permissions(relationship_id, user, patch)
      .await
  }

  pub async fn remove_relationship(
    &self,
    user: UserId,
    buddy: UserId,
  ) -> Result<()> {
    self.relationships.remove_relationship(user, buddy).await?;
    Ok(())
  }

  pub async fn block_buddy(&self, user: UserId, buddy: UserId) -> Result<Uuid> {
    self.relationships.block(user, buddy).await
  }

  pub async fn has_capability(
    &self,
    a: &UserId,
    b: &UserId,
    capability: Capability,
  ) -> Result<bool> {
    self.gate.has_capability(a, b, capability).await
  }

  // ── Flares ────────────────────────────────────────────────────────────

  pub async fn send_flare(
    &self,
    user: UserId,
    buddy: UserId,
    message: Option<&str>,
    urgency_level: Urgency,
  ) -> Result<Uuid> {
    self.flares.send(user, buddy, message, urgency_level).await
  }

  pub async fn list_flares(
    &self,
    user: UserId,
    unread_only: bool,
  ) -> Result<Vec<FlareSignal>> {
    self.flares.list(user, unread_only).await
  }

  pub async fn respond_flare(
    &self,
    user: UserId,
    flare_id: Uuid,
    response: Option<&str>,
  ) -> Result<FlareSignal> {
    self.flares.respond(flare_id, user, response).await
  }

  // ── Check-ins ─────────────────────────────────────────────────────────

  pub async fn share_check_in(
    &self,
    user: UserId,
    buddy: UserId,
    mood_entry_id: &str,
  ) -> Result<Uuid> {
    self.check_ins.share(user, buddy, mood_entry_id).await
  }

  pub async fn list_check_ins(
    &self,
    user: UserId,
    unviewed_only: bool,
  ) -> Result<Vec<CheckInShare>> {
    self.check_ins.list(user, unviewed_only).await
  }

  pub async fn mark_check_in_viewed(
    &self,
    user: UserId,
    share_id: Uuid,
  ) -> Result<CheckInShare> {
    self.check_ins.mark_viewed(share_id, user).await
  }
}
