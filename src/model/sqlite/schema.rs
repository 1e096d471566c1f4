use rusqlite::Connection;

use crate::error::Result;

/// Tables and indexes. Uniqueness rules live here so the store, not the
/// handlers, has the final word on duplicates.
const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS election_windows (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    start_time    TEXT NOT NULL,
    stop_time     TEXT NOT NULL,
    start_day     TEXT NOT NULL UNIQUE,
    registered_by TEXT NOT NULL,
    status        TEXT NOT NULL CHECK (status IN ('Scheduled', 'Started', 'Finished'))
);

CREATE TABLE IF NOT EXISTS constituencies (
    city_code TEXT PRIMARY KEY,
    province  TEXT NOT NULL,
    division  TEXT NOT NULL,
    district  TEXT NOT NULL,
    city      TEXT NOT NULL,
    seat_na   TEXT NOT NULL,
    seat_pp   TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS users (
    cnic          TEXT PRIMARY KEY,
    name          TEXT NOT NULL,
    phone         TEXT NOT NULL,
    password_hash TEXT NOT NULL,
    province      TEXT NOT NULL,
    division      TEXT NOT NULL,
    district      TEXT NOT NULL,
    city          TEXT NOT NULL,
    seat_na       TEXT NOT NULL,
    seat_pp       TEXT NOT NULL,
    gender        TEXT NOT NULL,
    role          TEXT NOT NULL DEFAULT 'Voter' CHECK (role IN ('Voter', 'Admin'))
);

CREATE TABLE IF NOT EXISTS parties (
    name        TEXT NOT NULL UNIQUE COLLATE NOCASE,
    symbol      TEXT NOT NULL UNIQUE COLLATE NOCASE,
    leader_cnic TEXT NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS candidates (
    id         INTEGER PRIMARY KEY AUTOINCREMENT,
    cnic       TEXT NOT NULL UNIQUE,
    name       TEXT NOT NULL,
    seat_type  TEXT NOT NULL CHECK (seat_type IN ('NA', 'PP')),
    seat       TEXT NOT NULL,
    party_name TEXT NOT NULL,
    symbol     TEXT NOT NULL,
    UNIQUE (seat, party_name)
);

CREATE TABLE IF NOT EXISTS votes (
    id             INTEGER PRIMARY KEY AUTOINCREMENT,
    window_id      INTEGER NOT NULL REFERENCES election_windows (id),
    voter_cnic     TEXT NOT NULL,
    seat           TEXT NOT NULL,
    candidate_cnic TEXT NOT NULL,
    CONSTRAINT uniq_vote UNIQUE (window_id, voter_cnic, seat)
);

CREATE INDEX IF NOT EXISTS votes_by_seat ON votes (seat);
CREATE INDEX IF NOT EXISTS windows_by_status ON election_windows (status);
";

/// Ensure that all the required tables and indexes exist.
///
/// This operation is idempotent.
pub fn ensure_schema_exists(conn: &Connection) -> Result<()> {
    debug!("Ensuring store schema exists");
    conn.execute_batch(SCHEMA)?;
    Ok(())
}
