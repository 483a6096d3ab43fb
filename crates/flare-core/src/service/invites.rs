//! Issuing and consuming invite codes.

use std::sync::Arc;

use rand_core::OsRng;
use uuid::Uuid;

use crate::{
  Error, Forbidden, Result,
  invite::{InviteCode, IssuedInvite, JoinedBuddy},
  permissions::Permissions,
  relationship::{Relationship, RelationshipStatus},
  store::{BuddyStore, InsertInvite, NewInvite, ResolveInvite},
  user::{UserId, UserPair},
};

/// Issues single-use invite codes and turns them into relationships.
pub struct InviteManager<S> {
  store:    Arc<S>,
  defaults: Permissions,
}

impl<S> Clone for InviteManager<S> {
  fn clone(&self) -> Self {
    Self { store: Arc::clone(&self.store), defaults: self.defaults }
  }
}

impl<S: BuddyStore> InviteManager<S> {
  /// `defaults` is the permission set every new relationship starts with.
  pub fn new(store: Arc<S>, defaults: Permissions) -> Self {
    Self { store, defaults }
  }

  pub fn default_permissions(&self) -> Permissions { self.defaults }

  /// Generate a code and persist a pending relationship for `inviter`.
  ///
  /// A collision with a live code is not retried; it surfaces as
  /// [`Error::Conflict`].
  pub async fn create_invite(&self, inviter: UserId) -> Result<IssuedInvite> {
    let invite_code = InviteCode::generate(&mut OsRng);
    let outcome = self
      .store
      .insert_invite(NewInvite {
        inviter,
        invite_code: invite_code.clone(),
        permissions: self.defaults,
      })
      .await
      .map_err(Error::store)?;

    match outcome {
      InsertInvite::Inserted(rel) => Ok(IssuedInvite {
        invite_code,
        relationship_id: rel.relationship_id,
      }),
      InsertInvite::CodeTaken => {
        Err(Error::Conflict("invite code already active".into()))
      }
    }
  }

  /// Accept the invite holding `code` on behalf of `joiner`.
  pub async fn consume_invite(
    &self,
    code: &str,
    joiner: UserId,
  ) -> Result<JoinedBuddy> {
    let (code, invite) = self.pending(code, &joiner).await?;

    let pair = UserPair::new(invite.inviter.clone(), joiner.clone())
      .ok_or(Forbidden::SelfJoin)?;
    if self.store.find_pair(pair).await.map_err(Error::store)?.is_some() {
      return Err(Error::Conflict("buddy relationship already exists".into()));
    }

    let rel = self.resolve(code, joiner.clone(), RelationshipStatus::Accepted).await?;
    let buddy = rel
      .counterparty(&joiner)
      .cloned()
      .unwrap_or_else(|| rel.inviter.clone());

    Ok(JoinedBuddy {
      relationship_id: rel.relationship_id,
      buddy,
      permissions: rel.permissions,
    })
  }

  /// Turn down the invite holding `code`. The code stops working and the
  /// record is kept as `declined`.
  pub async fn decline_invite(&self, code: &str, user: UserId) -> Result<Uuid> {
    let (code, _invite) = self.pending(code, &user).await?;
    let rel = self.resolve(code, user, RelationshipStatus::Declined).await?;
    Ok(rel.relationship_id)
  }

  /// Validate `raw`, find its pending invite and refuse self-joins.
  async fn pending(
    &self,
    raw: &str,
    joiner: &UserId,
  ) -> Result<(InviteCode, Relationship)> {
    let code = InviteCode::parse(raw)?;
    let invite = self
      .store
      .find_pending_invite(code.clone())
      .await
      .map_err(Error::store)?
      .ok_or_else(|| Error::not_found("invite code"))?;

    if &invite.inviter == joiner {
      return Err(Forbidden::SelfJoin.into());
    }
    Ok((code, invite))
  }

  /// The compare-and-swap step; the pre-checks above may be stale by now.
  async fn resolve(
    &self,
    code: InviteCode,
    joiner: UserId,
    outcome: RelationshipStatus,
  ) -> Result<Relationship> {
    match self
      .store
      .resolve_invite(code, joiner, outcome)
      .await
      .map_err(Error::store)?
    {
      ResolveInvite::Resolved(rel) => Ok(rel),
      ResolveInvite::NotPending => Err(Error::not_found("invite code")),
      ResolveInvite::PairTaken => {
        Err(Error::Conflict("buddy relationship already exists".into()))
      }
    }
  }
}
