use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::error::{Error, Result};
use crate::model::{
    common::seat::{normalize_seat, SeatType},
    sqlite::is_duplicate_key_error,
};

/// A candidate standing for one seat on behalf of one party.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub cnic: String,
    pub name: String,
    pub seat_type: SeatType,
    pub seat: String,
    pub party_name: String,
    pub symbol: String,
}

const COLUMNS: &str = "cnic, name, seat_type, seat, party_name, symbol";

impl Candidate {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            cnic: row.get(0)?,
            name: row.get(1)?,
            seat_type: row.get(2)?,
            seat: row.get(3)?,
            party_name: row.get(4)?,
            symbol: row.get(5)?,
        })
    }

    /// Insert the candidate. A party may field only one candidate per seat,
    /// and a CNIC may stand only once; the store enforces both.
    pub fn insert(&self, conn: &Connection) -> Result<()> {
        conn.execute(
            &format!("INSERT INTO candidates ({COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6)"),
            params![
                self.cnic,
                self.name,
                self.seat_type,
                normalize_seat(&self.seat),
                self.party_name,
                self.symbol,
            ],
        )
        .map_err(|err| {
            if is_duplicate_key_error(&err) {
                Error::rejected("duplicate candidate")
            } else {
                err.into()
            }
        })?;
        Ok(())
    }

    /// Does `party` already field a candidate on this seat?
    pub fn exists(conn: &Connection, seat_type: SeatType, seat: &str, party: &str) -> Result<bool> {
        Ok(conn
            .query_row(
                "SELECT 1 FROM candidates WHERE seat_type = ?1 AND seat = ?2 AND party_name = ?3",
                params![seat_type, normalize_seat(seat), party],
                |_| Ok(()),
            )
            .optional()?
            .is_some())
    }

    /// All candidates, grouped by seat.
    pub fn all(conn: &Connection) -> Result<Vec<Self>> {
        let mut stmt = conn.prepare(&format!(
            "SELECT {COLUMNS} FROM candidates ORDER BY seat, id"
        ))?;
        let candidates = stmt
            .query_map([], Self::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(candidates)
    }

    /// Candidates standing for `seat`.
    pub fn on_seat(conn: &Connection, seat: &str) -> Result<Vec<Self>> {
        let mut stmt = conn.prepare(&format!(
            "SELECT {COLUMNS} FROM candidates WHERE seat = ?1 ORDER BY id"
        ))?;
        let candidates = stmt
            .query_map([normalize_seat(seat)], Self::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(candidates)
    }

    pub fn count(conn: &Connection) -> Result<i64> {
        Ok(conn.query_row("SELECT COUNT(*) FROM candidates", [], |row| row.get(0))?)
    }

    pub fn record(&self) -> String {
        format!(
            "{},{},{},{},{},{}",
            self.cnic, self.name, self.seat_type, self.seat, self.party_name, self.symbol
        )
    }
}
