//! Integration tests for `SqliteStore` and the `BuddyService` built on it,
//! against an in-memory database.

use std::sync::Arc;

use flare_core::{
  BuddyService, Error, Forbidden,
  flare::{DEFAULT_MESSAGE, MAX_MESSAGE_CHARS, Urgency},
  invite::InviteCode,
  permissions::{Capability, PermissionPatch, Permissions},
  relationship::RelationshipStatus,
  store::{BuddyStore, InsertInvite, NewInvite, ResolveInvite},
  user::{UserId, UserPair},
};
use uuid::Uuid;

use crate::SqliteStore;

async fn store() -> Arc<SqliteStore> {
  Arc::new(
    SqliteStore::open_in_memory()
      .await
      .expect("in-memory store"),
  )
}

async fn service() -> BuddyService<SqliteStore> {
  BuddyService::new(store().await)
}

fn uid(s: &str) -> UserId { UserId::new(s).unwrap() }

fn code(s: &str) -> InviteCode { InviteCode::parse(s).unwrap() }

/// `inviter` issues an invite and `joiner` consumes it.
async fn pair_up(svc: &BuddyService<SqliteStore>, inviter: &str, joiner: &str) -> Uuid {
  let invite = svc.generate_invite(uid(inviter)).await.unwrap();
  svc
    .consume_invite(uid(joiner), invite.invite_code.as_str())
    .await
    .unwrap()
    .relationship_id
}

// ─── Store: invites ──────────────────────────────────────────────────────────

#[tokio::test]
async fn insert_invite_persists_pending_row() {
  let s = store().await;
  let outcome = s
    .insert_invite(NewInvite {
      inviter:     uid("alice"),
      invite_code: code("ABCD1234"),
      permissions: Permissions::DEFAULT,
    })
    .await
    .unwrap();
  let InsertInvite::Inserted(rel) = outcome else {
    panic!("expected insert");
  };

  let fetched = s.find_pending_invite(code("ABCD1234")).await.unwrap().unwrap();
  assert_eq!(fetched.relationship_id, rel.relationship_id);
  assert_eq!(fetched.status, RelationshipStatus::Pending);
  assert_eq!(fetched.inviter, uid("alice"));
  assert!(fetched.pair.is_none());
  assert_eq!(fetched.invite_code, Some(code("ABCD1234")));
  assert_eq!(fetched.permissions, Permissions::DEFAULT);
}

#[tokio::test]
async fn store_rejects_duplicate_pending_code() {
  let s = store().await;
  let first = s
    .insert_invite(NewInvite {
      inviter:     uid("alice"),
      invite_code: code("SAME0000"),
      permissions: Permissions::DEFAULT,
    })
    .await
    .unwrap();
  assert!(matches!(first, InsertInvite::Inserted(_)));

  let second = s
    .insert_invite(NewInvite {
      inviter:     uid("bob"),
      invite_code: code("SAME0000"),
      permissions: Permissions::DEFAULT,
    })
    .await
    .unwrap();
  assert!(matches!(second, InsertInvite::CodeTaken));
}

#[tokio::test]
async fn resolve_invite_is_single_use() {
  let s = store().await;
  s.insert_invite(NewInvite {
    inviter:     uid("alice"),
    invite_code: code("ONCE0001"),
    permissions: Permissions::DEFAULT,
  })
  .await
  .unwrap();

  let first = s
    .resolve_invite(code("ONCE0001"), uid("bob"), RelationshipStatus::Accepted)
    .await
    .unwrap();
  let ResolveInvite::Resolved(rel) = first else {
    panic!("first resolve should win");
  };
  assert_eq!(rel.status, RelationshipStatus::Accepted);
  assert_eq!(rel.pair, UserPair::new(uid("alice"), uid("bob")));
  assert!(rel.invite_code.is_none());
  assert!(rel.accepted_at.is_some());

  let second = s
    .resolve_invite(code("ONCE0001"), uid("carol"), RelationshipStatus::Accepted)
    .await
    .unwrap();
  assert!(matches!(second, ResolveInvite::NotPending));
}

#[tokio::test]
async fn resolve_invite_refuses_inviter_as_joiner() {
  let s = store().await;
  s.insert_invite(NewInvite {
    inviter:     uid("alice"),
    invite_code: code("SELF0001"),
    permissions: Permissions::DEFAULT,
  })
  .await
  .unwrap();

  let outcome = s
    .resolve_invite(code("SELF0001"), uid("alice"), RelationshipStatus::Accepted)
    .await
    .unwrap();
  assert!(matches!(outcome, ResolveInvite::NotPending));
  assert!(s.find_pending_invite(code("SELF0001")).await.unwrap().is_some());
}

#[tokio::test]
async fn pair_index_rejects_second_accepted_relationship() {
  let s = store().await;
  for c in ["PAIR0001", "PAIR0002"] {
    s.insert_invite(NewInvite {
      inviter:     uid("alice"),
      invite_code: code(c),
      permissions: Permissions::DEFAULT,
    })
    .await
    .unwrap();
  }

  let first = s
    .resolve_invite(code("PAIR0001"), uid("bob"), RelationshipStatus::Accepted)
    .await
    .unwrap();
  assert!(matches!(first, ResolveInvite::Resolved(_)));

  // Skipping the service's pre-check: the index alone must refuse this.
  let second = s
    .resolve_invite(code("PAIR0002"), uid("bob"), RelationshipStatus::Accepted)
    .await
    .unwrap();
  assert!(matches!(second, ResolveInvite::PairTaken));
  assert!(s.find_pending_invite(code("PAIR0002")).await.unwrap().is_some());
}

// ─── Service: invites ────────────────────────────────────────────────────────

#[tokio::test]
async fn generated_invite_code_is_well_formed() {
  let svc = service().await;
  let invite = svc.generate_invite(uid("alice")).await.unwrap();
  let c = invite.invite_code.as_str();
  assert_eq!(c.len(), 8);
  assert!(c.bytes().all(|b| b.is_ascii_uppercase() || b.is_ascii_digit()));
}

#[tokio::test]
async fn consuming_own_invite_is_self_join() {
  let svc = service().await;
  let invite = svc.generate_invite(uid("alice")).await.unwrap();
  let err = svc
    .consume_invite(uid("alice"), invite.invite_code.as_str())
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Forbidden(Forbidden::SelfJoin)));
}

#[tokio::test]
async fn consume_returns_inviter_and_default_permissions() {
  let svc = service().await;
  let invite = svc.generate_invite(uid("alice")).await.unwrap();
  let joined = svc
    .consume_invite(uid("bob"), invite.invite_code.as_str())
    .await
    .unwrap();
  assert_eq!(joined.relationship_id, invite.relationship_id);
  assert_eq!(joined.buddy, uid("alice"));
  assert_eq!(joined.permissions, Permissions::DEFAULT);
}

#[tokio::test]
async fn second_consume_of_same_code_is_not_found() {
  let svc = service().await;
  let invite = svc.generate_invite(uid("alice")).await.unwrap();
  svc
    .consume_invite(uid("bob"), invite.invite_code.as_str())
    .await
    .unwrap();
  let err = svc
    .consume_invite(uid("carol"), invite.invite_code.as_str())
    .await
    .unwrap_err();
  assert!(matches!(err, Error::NotFound(_)));
}

#[tokio::test]
async fn consume_unknown_or_malformed_code() {
  let svc = service().await;
  let err = svc.consume_invite(uid("bob"), "ZZZZ9999").await.unwrap_err();
  assert!(matches!(err, Error::NotFound(_)));
  let err = svc.consume_invite(uid("bob"), "").await.unwrap_err();
  assert!(matches!(err, Error::Validation(_)));
}

#[tokio::test]
async fn consume_when_already_buddies_is_conflict() {
  let svc = service().await;
  pair_up(&svc, "alice", "bob").await;
  let invite = svc.generate_invite(uid("bob")).await.unwrap();
  let err = svc
    .consume_invite(uid("alice"), invite.invite_code.as_str())
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Conflict(_)));
}

#[tokio::test]
async fn concurrent_consumes_yield_exactly_one_success() {
  let svc = service().await;
  let invite = svc.generate_invite(uid("alice")).await.unwrap();
  let c = invite.invite_code.as_str();

  let (a, b) = tokio::join!(
    svc.consume_invite(uid("bob"), c),
    svc.consume_invite(uid("carol"), c),
  );

  let successes = [a.is_ok(), b.is_ok()].iter().filter(|ok| **ok).count();
  assert_eq!(successes, 1, "a = {a:?}, b = {b:?}");
  let loser = if a.is_ok() { b } else { a };
  assert!(matches!(
    loser,
    Err(Error::NotFound(_)) | Err(Error::Conflict(_))
  ));
}

#[tokio::test]
async fn concurrent_consumes_by_same_joiner_yield_one_success() {
  let svc = service().await;
  let invite = svc.generate_invite(uid("alice")).await.unwrap();
  let c = invite.invite_code.as_str();

  let results = consume_concurrently(&svc, c, 8).await;
  assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
  assert_eq!(svc.list_relationships(uid("alice")).await.unwrap().len(), 1);
}

async fn consume_concurrently(
  svc: &BuddyService<SqliteStore>,
  code: &str,
  n: usize,
) -> Vec<flare_core::Result<flare_core::invite::JoinedBuddy>> {
  let mut set = tokio::task::JoinSet::new();
  for _ in 0..n {
    let svc = svc.clone();
    let code = code.to_owned();
    set.spawn(async move { svc.consume_invite(uid("bob"), &code).await });
  }
  let mut out = Vec::with_capacity(n);
  while let Some(res) = set.join_next().await {
    out.push(res.expect("task panicked"));
  }
  out
}

#[tokio::test]
async fn declined_invite_cannot_be_used() {
  let svc = service().await;
  let invite = svc.generate_invite(uid("alice")).await.unwrap();
  let id = svc
    .decline_invite(uid("bob"), invite.invite_code.as_str())
    .await
    .unwrap();
  assert_eq!(id, invite.relationship_id);

  let err = svc
    .consume_invite(uid("bob"), invite.invite_code.as_str())
    .await
    .unwrap_err();
  assert!(matches!(err, Error::NotFound(_)));
  assert!(svc.list_relationships(uid("alice")).await.unwrap().is_empty());

  // A later invite between the same two users still works.
  pair_up(&svc, "alice", "bob").await;
  assert_eq!(svc.list_relationships(uid("bob")).await.unwrap().len(), 1);
}

// ─── Service: relationships ──────────────────────────────────────────────────

#[tokio::test]
async fn both_sides_list_each_other_exactly_once() {
  let svc = service().await;
  pair_up(&svc, "alice", "bob").await;

  let alice = svc.list_relationships(uid("alice")).await.unwrap();
  assert_eq!(alice.len(), 1);
  assert_eq!(alice[0].buddy, uid("bob"));

  let bob = svc.list_relationships(uid("bob")).await.unwrap();
  assert_eq!(bob.len(), 1);
  assert_eq!(bob[0].buddy, uid("alice"));
  assert_eq!(alice[0].relationship_id, bob[0].relationship_id);
}

#[tokio::test]
async fn pending_invites_are_not_listed() {
  let svc = service().await;
  svc.generate_invite(uid("alice")).await.unwrap();
  assert!(svc.list_relationships(uid("alice")).await.unwrap().is_empty());
}

#[tokio::test]
async fn remove_is_symmetric_and_idempotent() {
  let svc = service().await;
  pair_up(&svc, "alice", "bob").await;
  pair_up(&svc, "alice", "carol").await;

  svc.remove_relationship(uid("alice"), uid("bob")).await.unwrap();
  let alice = svc.list_relationships(uid("alice")).await.unwrap();
  assert_eq!(alice.len(), 1);
  assert_eq!(alice[0].buddy, uid("carol"));
  assert!(svc.list_relationships(uid("bob")).await.unwrap().is_empty());

  svc.remove_relationship(uid("bob"), uid("alice")).await.unwrap();
  svc.remove_relationship(uid("alice"), uid("alice")).await.unwrap();
  svc.remove_relationship(uid("dave"), uid("erin")).await.unwrap();
}

#[tokio::test]
async fn update_permissions_merges_supplied_flags() {
  let svc = service().await;
  let id = pair_up(&svc, "alice", "bob").await;

  let perms = svc
    .update_permissions(
      uid("bob"),
      id,
      PermissionPatch::set(Capability::ShareJournalEntries, true),
    )
    .await
    .unwrap();
  assert!(perms.share_journal_entries);
  assert!(perms.share_mood_data);
  assert!(perms.allow_flare_signals);

  // Both members see the same record.
  let alice = svc.list_relationships(uid("alice")).await.unwrap();
  assert!(alice[0].permissions.share_journal_entries);
}

#[tokio::test]
async fn update_permissions_by_outsider_is_not_found() {
  let svc = service().await;
  let id = pair_up(&svc, "alice", "bob").await;
  let patch = PermissionPatch::set(Capability::AllowFlareSignals, false);

  let err = svc
    .update_permissions(uid("mallory"), id, patch)
    .await
    .unwrap_err();
  assert!(matches!(err, Error::NotFound(_)));

  let err = svc
    .update_permissions(uid("alice"), Uuid::new_v4(), patch)
    .await
    .unwrap_err();
  assert!(matches!(err, Error::NotFound(_)));
}

#[tokio::test]
async fn empty_permission_patch_is_validation_error() {
  let svc = service().await;
  let id = pair_up(&svc, "alice", "bob").await;
  let err = svc
    .update_permissions(uid("alice"), id, PermissionPatch::default())
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Validation(_)));
}

#[tokio::test]
async fn custom_defaults_apply_to_new_relationships() {
  let defaults = Permissions {
    share_mood_data:       false,
    allow_flare_signals:   true,
    share_journal_entries: true,
  };
  let svc = BuddyService::with_default_permissions(store().await, defaults);
  pair_up(&svc, "alice", "bob").await;
  let bob = svc.list_relationships(uid("bob")).await.unwrap();
  assert_eq!(bob[0].permissions, defaults);
}

#[tokio::test]
async fn blocked_pair_is_hidden_and_cannot_rejoin() {
  let svc = service().await;
  let id = pair_up(&svc, "alice", "bob").await;

  assert_eq!(svc.block_buddy(uid("bob"), uid("alice")).await.unwrap(), id);
  assert!(svc.list_relationships(uid("alice")).await.unwrap().is_empty());
  assert!(
    !svc
      .has_capability(&uid("alice"), &uid("bob"), Capability::AllowFlareSignals)
      .await
      .unwrap()
  );

  let invite = svc.generate_invite(uid("alice")).await.unwrap();
  let err = svc
    .consume_invite(uid("bob"), invite.invite_code.as_str())
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Conflict(_)));

  // Blocking twice finds nothing accepted to block.
  let err = svc.block_buddy(uid("bob"), uid("alice")).await.unwrap_err();
  assert!(matches!(err, Error::NotFound(_)));

  // The blocked side can clear the block by removing the pair.
  svc.remove_relationship(uid("alice"), uid("bob")).await.unwrap();
  svc
    .consume_invite(uid("bob"), invite.invite_code.as_str())
    .await
    .unwrap();
}

// ─── Service: flares ─────────────────────────────────────────────────────────

#[tokio::test]
async fn flare_lifecycle_with_overwriting_response() {
  let svc = service().await;
  pair_up(&svc, "alice", "bob").await;

  let flare_id = svc
    .send_flare(uid("alice"), uid("bob"), Some("help"), Urgency::Crisis)
    .await
    .unwrap();

  let listed = svc.list_flares(uid("bob"), false).await.unwrap();
  assert_eq!(listed.len(), 1);
  assert_eq!(listed[0].flare_id, flare_id);
  assert_eq!(listed[0].urgency_level, Urgency::Crisis);
  assert_eq!(listed[0].message, "help");
  assert!(!listed[0].is_read);

  let flare = svc
    .respond_flare(uid("bob"), flare_id, Some("here"))
    .await
    .unwrap();
  assert!(flare.is_read);
  assert_eq!(flare.response.as_deref(), Some("here"));
  assert!(flare.responded_at.is_some());

  let flare = svc
    .respond_flare(uid("bob"), flare_id, Some("again"))
    .await
    .unwrap();
  assert_eq!(flare.response.as_deref(), Some("again"));

  // A bare acknowledgement keeps the last response.
  let flare = svc.respond_flare(uid("bob"), flare_id, None).await.unwrap();
  assert_eq!(flare.response.as_deref(), Some("again"));
}

#[tokio::test]
async fn flare_requires_allow_flare_signals() {
  let svc = service().await;
  let id = pair_up(&svc, "alice", "bob").await;
  svc
    .update_permissions(
      uid("alice"),
      id,
      PermissionPatch::set(Capability::AllowFlareSignals, false),
    )
    .await
    .unwrap();

  for (from, to) in [("alice", "bob"), ("bob", "alice")] {
    let err = svc
      .send_flare(uid(from), uid(to), None, Urgency::default())
      .await
      .unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
  }
}

#[tokio::test]
async fn flare_to_stranger_is_not_found() {
  let svc = service().await;
  let err = svc
    .send_flare(uid("alice"), uid("bob"), None, Urgency::High)
    .await
    .unwrap_err();
  assert!(matches!(err, Error::NotFound(_)));
}

#[tokio::test]
async fn flare_message_defaults_and_truncates() {
  let svc = service().await;
  pair_up(&svc, "alice", "bob").await;

  svc
    .send_flare(uid("alice"), uid("bob"), None, Urgency::Low)
    .await
    .unwrap();
  let long = "x".repeat(MAX_MESSAGE_CHARS + 50);
  svc
    .send_flare(uid("alice"), uid("bob"), Some(&long), Urgency::Low)
    .await
    .unwrap();

  let listed = svc.list_flares(uid("bob"), false).await.unwrap();
  assert_eq!(listed[0].message.len(), MAX_MESSAGE_CHARS);
  assert_eq!(listed[1].message, DEFAULT_MESSAGE);
}

#[tokio::test]
async fn unread_only_excludes_answered_flares() {
  let svc = service().await;
  pair_up(&svc, "alice", "bob").await;

  let answered = svc
    .send_flare(uid("alice"), uid("bob"), Some("one"), Urgency::Medium)
    .await
    .unwrap();
  let open = svc
    .send_flare(uid("alice"), uid("bob"), Some("two"), Urgency::High)
    .await
    .unwrap();
  svc.respond_flare(uid("bob"), answered, None).await.unwrap();

  let unread = svc.list_flares(uid("bob"), true).await.unwrap();
  assert_eq!(unread.len(), 1);
  assert_eq!(unread[0].flare_id, open);
  assert_eq!(svc.list_flares(uid("bob"), false).await.unwrap().len(), 2);
}

#[tokio::test]
async fn flares_are_newest_first_and_capped() {
  let svc = service().await;
  pair_up(&svc, "alice", "bob").await;

  let mut ids = Vec::new();
  for i in 0..55 {
    let msg = format!("flare {i}");
    ids.push(
      svc
        .send_flare(uid("alice"), uid("bob"), Some(&msg), Urgency::Low)
        .await
        .unwrap(),
    );
  }

  let listed = svc.list_flares(uid("bob"), false).await.unwrap();
  assert_eq!(listed.len(), 50);
  assert_eq!(listed[0].flare_id, *ids.last().unwrap());
  assert_eq!(listed[49].flare_id, ids[5]);
  assert!(svc.list_flares(uid("alice"), false).await.unwrap().is_empty());
}

#[tokio::test]
async fn only_recipient_can_respond() {
  let svc = service().await;
  pair_up(&svc, "alice", "bob").await;
  let flare_id = svc
    .send_flare(uid("alice"), uid("bob"), None, Urgency::Medium)
    .await
    .unwrap();

  let err = svc
    .respond_flare(uid("alice"), flare_id, Some("self"))
    .await
    .unwrap_err();
  assert!(matches!(err, Error::NotFound(_)));

  let err = svc
    .respond_flare(uid("bob"), Uuid::new_v4(), None)
    .await
    .unwrap_err();
  assert!(matches!(err, Error::NotFound(_)));
}

// ─── Service: check-ins ──────────────────────────────────────────────────────

#[tokio::test]
async fn check_in_share_lifecycle() {
  let svc = service().await;
  pair_up(&svc, "alice", "bob").await;

  let share_id = svc
    .share_check_in(uid("alice"), uid("bob"), "mood-2026-10-19")
    .await
    .unwrap();

  let listed = svc.list_check_ins(uid("bob"), true).await.unwrap();
  assert_eq!(listed.len(), 1);
  assert_eq!(listed[0].sharer, uid("alice"));
  assert_eq!(listed[0].mood_entry_id, "mood-2026-10-19");

  let viewed = svc
    .mark_check_in_viewed(uid("bob"), share_id)
    .await
    .unwrap();
  assert!(viewed.is_viewed);
  assert!(svc.list_check_ins(uid("bob"), true).await.unwrap().is_empty());
  assert_eq!(svc.list_check_ins(uid("bob"), false).await.unwrap().len(), 1);

  let err = svc
    .mark_check_in_viewed(uid("alice"), share_id)
    .await
    .unwrap_err();
  assert!(matches!(err, Error::NotFound(_)));
}

#[tokio::test]
async fn check_in_requires_mood_sharing() {
  let svc = service().await;
  let id = pair_up(&svc, "alice", "bob").await;
  svc
    .update_permissions(
      uid("bob"),
      id,
      PermissionPatch::set(Capability::ShareMoodData, false),
    )
    .await
    .unwrap();

  let err = svc
    .share_check_in(uid("alice"), uid("bob"), "mood-1")
    .await
    .unwrap_err();
  assert!(matches!(err, Error::NotFound(_)));

  let err = svc
    .share_check_in(uid("alice"), uid("bob"), "  ")
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Validation(_)));
}
