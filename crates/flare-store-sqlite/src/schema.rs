//! SQL schema for the Flare SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- One row per invite. Once a second user acts on the invite the row holds
-- the canonical pair (user_low < user_high) and stands for the whole mutual
-- relationship.
CREATE TABLE IF NOT EXISTS relationships (
    relationship_id       TEXT PRIMARY KEY,
    inviter               TEXT NOT NULL,
    user_low              TEXT,
    user_high             TEXT,
    status                TEXT NOT NULL DEFAULT 'pending',
    invite_code           TEXT UNIQUE,
    share_mood_data       INTEGER NOT NULL,
    allow_flare_signals   INTEGER NOT NULL,
    share_journal_entries INTEGER NOT NULL,
    created_at            TEXT NOT NULL,   -- RFC 3339 UTC, nanosecond precision
    updated_at            TEXT NOT NULL,
    accepted_at           TEXT,
    CHECK (status IN ('pending', 'accepted', 'declined', 'blocked')),
    CHECK ((user_low IS NULL) = (user_high IS NULL)),
    CHECK (user_low IS NULL OR user_low < user_high),
    CHECK ((status = 'pending') = (user_low IS NULL)),
    CHECK (status != 'pending' OR invite_code IS NOT NULL),
    CHECK (invite_code IS NULL OR (
      length(invite_code) = 8 AND invite_code NOT GLOB '*[^A-Z0-9]*'
    ))
);

-- At most one live relationship per pair. Declined invites do not count.
CREATE UNIQUE INDEX IF NOT EXISTS relationships_pair_idx
    ON relationships(user_low, user_high)
    WHERE status IN ('accepted', 'blocked');

CREATE INDEX IF NOT EXISTS relationships_low_idx  ON relationships(user_low);
CREATE INDEX IF NOT EXISTS relationships_high_idx ON relationships(user_high);

CREATE TABLE IF NOT EXISTS flare_signals (
    flare_id      TEXT PRIMARY KEY,
    sender        TEXT NOT NULL,
    recipient     TEXT NOT NULL,
    message       TEXT NOT NULL CHECK (length(message) <= 200),
    urgency_level TEXT NOT NULL DEFAULT 'medium'
                  CHECK (urgency_level IN ('low', 'medium', 'high', 'crisis')),
    is_read       INTEGER NOT NULL DEFAULT 0,
    responded_at  TEXT,
    response      TEXT CHECK (response IS NULL OR length(response) <= 500),
    created_at    TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS flare_signals_recipient_idx
    ON flare_signals(recipient, created_at);

CREATE TABLE IF NOT EXISTS check_in_shares (
    share_id      TEXT PRIMARY KEY,
    sharer        TEXT NOT NULL,
    recipient     TEXT NOT NULL,
    mood_entry_id TEXT NOT NULL CHECK (length(mood_entry_id) > 0),
    shared_at     TEXT NOT NULL,
    is_viewed     INTEGER NOT NULL DEFAULT 0
);

CREATE INDEX IF NOT EXISTS check_in_shares_recipient_idx
    ON check_in_shares(recipient, shared_at);

PRAGMA user_version = 1;
";
