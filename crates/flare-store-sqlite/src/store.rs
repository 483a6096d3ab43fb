//! [`SqliteStore`] — the SQLite implementation of [`BuddyStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use flare_core::{
  check_in::{CheckInShare, NewCheckIn},
  flare::{FlareSignal, NewFlare},
  invite::InviteCode,
  permissions::PermissionPatch,
  relationship::{Relationship, RelationshipStatus},
  store::{BuddyStore, InsertInvite, NewInvite, ResolveInvite},
  user::{UserId, UserPair},
};

use crate::{
  Result,
  encode::{
    CHECK_IN_COLUMNS, FLARE_COLUMNS, RELATIONSHIP_COLUMNS, RawCheckIn,
    RawFlare, RawRelationship, encode_dt, encode_uuid,
  },
  schema::SCHEMA,
};

/// Whether `e` is a `UNIQUE` (or primary key) constraint failure, as opposed
/// to a `CHECK` failure or anything else.
fn is_unique_violation(e: &rusqlite::Error) -> bool {
  matches!(
    e,
    rusqlite::Error::SqliteFailure(f, _)
      if f.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
        || f.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY
  )
}

/// What the invite compare-and-swap produced, before decoding.
enum RawResolve {
  Row(RawRelationship),
  Missing,
  PairTaken,
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Flare buddy store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Run a statement that yields at most one relationship row.
  async fn relationship_row(
    &self,
    sql: String,
    params: Vec<String>,
  ) -> Result<Option<Relationship>> {
    let raw: Option<RawRelationship> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &sql,
              rusqlite::params_from_iter(params),
              RawRelationship::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawRelationship::into_relationship).transpose()
  }
}

// ─── BuddyStore impl ─────────────────────────────────────────────────────────

impl BuddyStore for SqliteStore {
  type Error = crate::Error;

  // ── Relationships ─────────────────────────────────────────────────────────

  async fn insert_invite(&self, invite: NewInvite) -> Result<InsertInvite> {
    let now = Utc::now();
    let rel = Relationship {
      relationship_id: Uuid::new_v4(),
      inviter:         invite.inviter,
      pair:            None,
      status:          RelationshipStatus::Pending,
      invite_code:     Some(invite.invite_code),
      permissions:     invite.permissions,
      created_at:      now,
      updated_at:      now,
      accepted_at:     None,
    };

    let id_str   = encode_uuid(rel.relationship_id);
    let inviter  = rel.inviter.to_string();
    let code     = rel.invite_code.as_ref().map(InviteCode::to_string);
    let perms    = rel.permissions;
    let at_str   = encode_dt(now);

    let inserted: bool = self
      .conn
      .call(move |conn| {
        let res = conn.execute(
          "INSERT INTO relationships (
             relationship_id, inviter, status, invite_code,
             share_mood_data, allow_flare_signals, share_journal_entries,
             created_at, updated_at
           ) VALUES (?1, ?2, 'pending', ?3, ?4, ?5, ?6, ?7, ?7)",
          rusqlite::params![
            id_str,
            inviter,
            code,
            perms.share_mood_data,
            perms.allow_flare_signals,
            perms.share_journal_entries,
            at_str,
          ],
        );
        match res {
          Ok(_) => Ok(true),
          Err(e) if is_unique_violation(&e) => Ok(false),
          Err(e) => Err(e.into()),
        }
      })
      .await?;

    Ok(if inserted {
      InsertInvite::Inserted(rel)
    } else {
      InsertInvite::CodeTaken
    })
  }

  async fn find_pending_invite(
    &self,
    code: InviteCode,
  ) -> Result<Option<Relationship>> {
    self
      .relationship_row(
        format!(
          "SELECT {RELATIONSHIP_COLUMNS} FROM relationships
           WHERE invite_code = ?1 AND status = 'pending'"
        ),
        vec![code.to_string()],
      )
      .await
  }

  async fn resolve_invite(
    &self,
    code: InviteCode,
    joiner: UserId,
    outcome: RelationshipStatus,
  ) -> Result<ResolveInvite> {
    let code_str    = code.to_string();
    let joiner_str  = joiner.to_string();
    let outcome_str = outcome.as_ref().to_owned();
    let at_str      = encode_dt(Utc::now());

    // The WHERE clause is the compare-and-swap: only a row that is still
    // pending with this code can match, and the code is cleared in the same
    // statement. The pair index turns a duplicate pairing into a failure.
    let raw: RawResolve = self
      .conn
      .call(move |conn| {
        let res = conn
          .query_row(
            &format!(
              "UPDATE relationships
               SET user_low    = min(inviter, ?2),
                   user_high   = max(inviter, ?2),
                   status      = ?3,
                   invite_code = NULL,
                   updated_at  = ?4,
                   accepted_at = CASE WHEN ?3 = 'accepted' THEN ?4 END
               WHERE invite_code = ?1
                 AND status = 'pending'
                 AND inviter != ?2
               RETURNING {RELATIONSHIP_COLUMNS}"
            ),
            rusqlite::params![code_str, joiner_str, outcome_str, at_str],
            RawRelationship::from_row,
          )
          .optional();
        match res {
          Ok(Some(row)) => Ok(RawResolve::Row(row)),
          Ok(None) => Ok(RawResolve::Missing),
          Err(e) if is_unique_violation(&e) => Ok(RawResolve::PairTaken),
          Err(e) => Err(e.into()),
        }
      })
      .await?;

    Ok(match raw {
      RawResolve::Row(raw) => ResolveInvite::Resolved(raw.into_relationship()?),
      RawResolve::PairTaken => ResolveInvite::PairTaken,
      RawResolve::Missing => ResolveInvite::NotPending,
    })
  }

  async fn find_pair(&self, pair: UserPair) -> Result<Option<Relationship>> {
    self
      .relationship_row(
        format!(
          "SELECT {RELATIONSHIP_COLUMNS} FROM relationships
           WHERE user_low = ?1 AND user_high = ?2
             AND status IN ('accepted', 'blocked')"
        ),
        vec![pair.low().to_string(), pair.high().to_string()],
      )
      .await
  }

  async fn list_for_user(
    &self,
    user: UserId,
    status: RelationshipStatus,
  ) -> Result<Vec<Relationship>> {
    let user_str   = user.to_string();
    let status_str = status.as_ref().to_owned();

    let raws: Vec<RawRelationship> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {RELATIONSHIP_COLUMNS} FROM relationships
           WHERE status = ?2 AND (user_low = ?1 OR user_high = ?1)
           ORDER BY COALESCE(accepted_at, created_at), rowid"
        ))?;
        let rows = stmt
          .query_map(
            rusqlite::params![user_str, status_str],
            RawRelationship::from_row,
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawRelationship::into_relationship).collect()
  }

  async fn delete_pair(&self, pair: UserPair) -> Result<usize> {
    let low  = pair.low().to_string();
    let high = pair.high().to_string();

    let removed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM relationships WHERE user_low = ?1 AND user_high = ?2",
          rusqlite::params![low, high],
        )?)
      })
      .await?;
    Ok(removed)
  }

  async fn update_permissions(
    &self,
    id: Uuid,
    caller: UserId,
    patch: PermissionPatch,
  ) -> Result<Option<Relationship>> {
    let id_str     = encode_uuid(id);
    let caller_str = caller.to_string();
    let at_str     = encode_dt(Utc::now());

    let raw: Option<RawRelationship> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "UPDATE relationships
                 SET share_mood_data       = COALESCE(?3, share_mood_data),
                     allow_flare_signals   = COALESCE(?4, allow_flare_signals),
                     share_journal_entries = COALESCE(?5, share_journal_entries),
                     updated_at            = ?6
                 WHERE relationship_id = ?1
                   AND (inviter = ?2 OR user_low = ?2 OR user_high = ?2)
                 RETURNING {RELATIONSHIP_COLUMNS}"
              ),
              rusqlite::params![
                id_str,
                caller_str,
                patch.share_mood_data,
                patch.allow_flare_signals,
                patch.share_journal_entries,
                at_str,
              ],
              RawRelationship::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawRelationship::into_relationship).transpose()
  }

  async fn transition_pair(
    &self,
    pair: UserPair,
    from: RelationshipStatus,
    to: RelationshipStatus,
  ) -> Result<Option<Relationship>> {
    self
      .relationship_row(
        format!(
          "UPDATE relationships
           SET status = ?4, updated_at = ?5
           WHERE user_low = ?1 AND user_high = ?2 AND status = ?3
           RETURNING {RELATIONSHIP_COLUMNS}"
        ),
        vec![
          pair.low().to_string(),
          pair.high().to_string(),
          from.as_ref().to_owned(),
          to.as_ref().to_owned(),
          encode_dt(Utc::now()),
        ],
      )
      .await
  }

  // ── Flare signals ─────────────────────────────────────────────────────────

  async fn insert_flare(&self, input: NewFlare) -> Result<FlareSignal> {
    let flare = FlareSignal {
      flare_id:      Uuid::new_v4(),
      sender:        input.sender,
      recipient:     input.recipient,
      message:       input.message,
      urgency_level: input.urgency_level,
      is_read:       false,
      responded_at:  None,
      response:      None,
      created_at:    Utc::now(),
    };

    let id_str        = encode_uuid(flare.flare_id);
    let sender_str    = flare.sender.to_string();
    let recipient_str = flare.recipient.to_string();
    let message       = flare.message.clone();
    let urgency_str   = flare.urgency_level.as_ref().to_owned();
    let at_str        = encode_dt(flare.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO flare_signals (
             flare_id, sender, recipient, message, urgency_level, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          rusqlite::params![
            id_str,
            sender_str,
            recipient_str,
            message,
            urgency_str,
            at_str,
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(flare)
  }

  async fn list_flares(
    &self,
    recipient: UserId,
    unread_only: bool,
    limit: usize,
  ) -> Result<Vec<FlareSignal>> {
    let recipient_str = recipient.to_string();
    let limit_val     = limit as i64;

    let raws: Vec<RawFlare> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {FLARE_COLUMNS} FROM flare_signals
           WHERE recipient = ?1 AND (?2 = 0 OR is_read = 0)
           ORDER BY created_at DESC, rowid DESC
           LIMIT ?3"
        ))?;
        let rows = stmt
          .query_map(
            rusqlite::params![recipient_str, unread_only, limit_val],
            RawFlare::from_row,
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawFlare::into_flare).collect()
  }

  async fn respond_flare(
    &self,
    id: Uuid,
    recipient: UserId,
    response: Option<String>,
  ) -> Result<Option<FlareSignal>> {
    let id_str        = encode_uuid(id);
    let recipient_str = recipient.to_string();
    let at_str        = encode_dt(Utc::now());

    let raw: Option<RawFlare> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "UPDATE flare_signals
                 SET is_read      = 1,
                     responded_at = ?3,
                     response     = COALESCE(?4, response)
                 WHERE flare_id = ?1 AND recipient = ?2
                 RETURNING {FLARE_COLUMNS}"
              ),
              rusqlite::params![id_str, recipient_str, at_str, response],
              RawFlare::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawFlare::into_flare).transpose()
  }

  // ── Check-in shares ───────────────────────────────────────────────────────

  async fn insert_check_in(&self, input: NewCheckIn) -> Result<CheckInShare> {
    let share = CheckInShare {
      share_id:      Uuid::new_v4(),
      sharer:        input.sharer,
      recipient:     input.recipient,
      mood_entry_id: input.mood_entry_id,
      shared_at:     Utc::now(),
      is_viewed:     false,
    };

    let id_str        = encode_uuid(share.share_id);
    let sharer_str    = share.sharer.to_string();
    let recipient_str = share.recipient.to_string();
    let entry         = share.mood_entry_id.clone();
    let at_str        = encode_dt(share.shared_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO check_in_shares (
             share_id, sharer, recipient, mood_entry_id, shared_at
           ) VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![id_str, sharer_str, recipient_str, entry, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(share)
  }

  async fn list_check_ins(
    &self,
    recipient: UserId,
    unviewed_only: bool,
    limit: usize,
  ) -> Result<Vec<CheckInShare>> {
    let recipient_str = recipient.to_string();
    let limit_val     = limit as i64;

    let raws: Vec<RawCheckIn> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {CHECK_IN_COLUMNS} FROM check_in_shares
           WHERE recipient = ?1 AND (?2 = 0 OR is_viewed = 0)
           ORDER BY shared_at DESC, rowid DESC
           LIMIT ?3"
        ))?;
        let rows = stmt
          .query_map(
            rusqlite::params![recipient_str, unviewed_only, limit_val],
            RawCheckIn::from_row,
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawCheckIn::into_check_in).collect()
  }

  async fn mark_check_in_viewed(
    &self,
    id: Uuid,
    recipient: UserId,
  ) -> Result<Option<CheckInShare>> {
    let id_str        = encode_uuid(id);
    let recipient_str = recipient.to_string();

    let raw: Option<RawCheckIn> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "UPDATE check_in_shares SET is_viewed = 1
                 WHERE share_id = ?1 AND recipient = ?2
                 RETURNING {CHECK_IN_COLUMNS}"
              ),
              rusqlite::params![id_str, recipient_str],
              RawCheckIn::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawCheckIn::into_check_in).transpose()
  }
}
