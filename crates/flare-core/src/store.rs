//! The `BuddyStore` trait and its outcome types.
//!
//! The trait is implemented by storage backends (e.g. `flare-store-sqlite`).
//! The components in [`crate::service`] depend on this abstraction, never on
//! a concrete backend. Every rule that two concurrent callers could race on
//! (invite code uniqueness, single-use consumption, one relationship per
//! pair) must be enforced by the backend in a single atomic statement; the
//! components only pre-check to produce friendlier errors.

use std::future::Future;

use uuid::Uuid;

use crate::{
  check_in::{CheckInShare, NewCheckIn},
  flare::{FlareSignal, NewFlare},
  invite::InviteCode,
  permissions::{PermissionPatch, Permissions},
  relationship::{Relationship, RelationshipStatus},
  user::{UserId, UserPair},
};

// ─── Inputs and outcomes ─────────────────────────────────────────────────────

/// Input to [`BuddyStore::insert_invite`].
#[derive(Debug, Clone)]
pub struct NewInvite {
  pub inviter:     UserId,
  pub invite_code: InviteCode,
  pub permissions: Permissions,
}

/// Result of [`BuddyStore::insert_invite`].
#[derive(Debug, Clone)]
pub enum InsertInvite {
  Inserted(Relationship),
  /// Another live invite already holds this code.
  CodeTaken,
}

/// Result of [`BuddyStore::resolve_invite`].
#[derive(Debug, Clone)]
pub enum ResolveInvite {
  Resolved(Relationship),
  /// No pending invite carries the code (never issued, or already used), or
  /// the joiner is the inviter.
  NotPending,
  /// The pair already has an accepted or blocked relationship.
  PairTaken,
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a Flare persistence backend.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait BuddyStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Relationships ─────────────────────────────────────────────────────

  /// Persist a pending relationship carrying `invite.invite_code`. A code
  /// collision is reported as [`InsertInvite::CodeTaken`], decided by the
  /// backend's uniqueness constraint.
  fn insert_invite(
    &self,
    invite: NewInvite,
  ) -> impl Future<Output = Result<InsertInvite, Self::Error>> + Send + '_;

  /// Look up the pending relationship holding `code`, if any.
  fn find_pending_invite(
    &self,
    code: InviteCode,
  ) -> impl Future<Output = Result<Option<Relationship>, Self::Error>> + Send + '_;

  /// Atomically move the pending invite holding `code` to `outcome`
  /// (`Accepted` or `Declined`), recording `joiner` as the second member and
  /// clearing the code. Exactly one of any number of concurrent callers for
  /// the same code can observe [`ResolveInvite::Resolved`].
  fn resolve_invite(
    &self,
    code: InviteCode,
    joiner: UserId,
    outcome: RelationshipStatus,
  ) -> impl Future<Output = Result<ResolveInvite, Self::Error>> + Send + '_;

  /// The accepted or blocked relationship for `pair`, if one exists.
  fn find_pair(
    &self,
    pair: UserPair,
  ) -> impl Future<Output = Result<Option<Relationship>, Self::Error>> + Send + '_;

  /// Every relationship with `status` whose pair contains `user`.
  fn list_for_user(
    &self,
    user: UserId,
    status: RelationshipStatus,
  ) -> impl Future<Output = Result<Vec<Relationship>, Self::Error>> + Send + '_;

  /// Delete every record for `pair`, whatever its status. Returns the number
  /// of rows removed.
  fn delete_pair(
    &self,
    pair: UserPair,
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + '_;

  /// Merge `patch` into the permissions of relationship `id` in one atomic
  /// write, provided `caller` participates in it. Returns `None` when the
  /// relationship is missing or `caller` is not a participant.
  fn update_permissions(
    &self,
    id: Uuid,
    caller: UserId,
    patch: PermissionPatch,
  ) -> impl Future<Output = Result<Option<Relationship>, Self::Error>> + Send + '_;

  /// Atomically move the relationship for `pair` from `from` to `to`.
  /// Returns `None` when no relationship for the pair is in state `from`.
  fn transition_pair(
    &self,
    pair: UserPair,
    from: RelationshipStatus,
    to: RelationshipStatus,
  ) -> impl Future<Output = Result<Option<Relationship>, Self::Error>> + Send + '_;

  // ── Flare signals ─────────────────────────────────────────────────────

  /// Persist a new, unread signal. `flare_id` and `created_at` are assigned
  /// by the store.
  fn insert_flare(
    &self,
    flare: NewFlare,
  ) -> impl Future<Output = Result<FlareSignal, Self::Error>> + Send + '_;

  /// Signals addressed to `recipient`, newest first, at most `limit`.
  fn list_flares(
    &self,
    recipient: UserId,
    unread_only: bool,
    limit: usize,
  ) -> impl Future<Output = Result<Vec<FlareSignal>, Self::Error>> + Send + '_;

  /// Mark signal `id` read and stamp `responded_at`, provided it is addressed
  /// to `recipient`. A `Some` response replaces any earlier one; `None` keeps
  /// it.
  fn respond_flare(
    &self,
    id: Uuid,
    recipient: UserId,
    response: Option<String>,
  ) -> impl Future<Output = Result<Option<FlareSignal>, Self::Error>> + Send + '_;

  // ── Check-in shares ───────────────────────────────────────────────────

  fn insert_check_in(
    &self,
    share: NewCheckIn,
  ) -> impl Future<Output = Result<CheckInShare, Self::Error>> + Send + '_;

  /// Shares addressed to `recipient`, newest first, at most `limit`.
  fn list_check_ins(
    &self,
    recipient: UserId,
    unviewed_only: bool,
    limit: usize,
  ) -> impl Future<Output = Result<Vec<CheckInShare>, Self::Error>> + Send + '_;

  /// Mark share `id` viewed, provided it is addressed to `recipient`.
  fn mark_check_in_viewed(
    &self,
    id: Uuid,
    recipient: UserId,
  ) -> impl Future<Output = Result<Option<CheckInShare>, Self::Error>> + Send + '_;
}
