use rusqlite::{params, Connection, Row};

use crate::error::Result;
use crate::model::{common::seat::normalize_seat, election::WindowStatus};

/// Votes received by one candidate on a seat, across all finished windows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeatTally {
    pub candidate_cnic: String,
    pub candidate_name: String,
    pub party_name: String,
    pub votes: i64,
}

impl SeatTally {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            candidate_cnic: row.get(0)?,
            candidate_name: row.get(1)?,
            party_name: row.get(2)?,
            votes: row.get(3)?,
        })
    }

    /// Per-candidate totals for `seat`, highest first. Ties go to the lower CNIC.
    /// Votes in windows that have not finished are never counted.
    pub fn for_seat(conn: &Connection, seat: &str) -> Result<Vec<Self>> {
        let mut stmt = conn.prepare(
            "SELECT v.candidate_cnic, c.name, c.party_name, COUNT(*) AS votes
               FROM votes v
               JOIN election_windows w ON w.id = v.window_id
               JOIN candidates c ON c.cnic = v.candidate_cnic
              WHERE v.seat = ?1 AND w.status = ?2
              GROUP BY v.candidate_cnic, c.name, c.party_name
              ORDER BY votes DESC, v.candidate_cnic ASC",
        )?;
        let tallies = stmt
            .query_map(params![normalize_seat(seat), WindowStatus::Finished], Self::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(tallies)
    }

    pub fn record(&self) -> String {
        format!(
            "{},{},{},{}",
            self.candidate_cnic, self.candidate_name, self.party_name, self.votes
        )
    }
}

/// Votes received by a party's candidate on one seat, across all finished windows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartyTally {
    pub seat: String,
    pub votes: i64,
}

impl PartyTally {
    /// Per-seat totals for the party named `party` (case-insensitive), by seat.
    pub fn for_party(conn: &Connection, party: &str) -> Result<Vec<Self>> {
        let mut stmt = conn.prepare(
            "SELECT v.seat, COUNT(*)
               FROM votes v
               JOIN election_windows w ON w.id = v.window_id
               JOIN candidates c ON c.cnic = v.candidate_cnic
              WHERE LOWER(c.party_name) = LOWER(?1) AND w.status = ?2
              GROUP BY v.seat
              ORDER BY v.seat ASC",
        )?;
        let tallies = stmt
            .query_map(params![party.trim(), WindowStatus::Finished], |row| {
                Ok(Self {
                    seat: row.get(0)?,
                    votes: row.get(1)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(tallies)
    }

    pub fn record(&self) -> String {
        format!("{},{}", self.seat, self.votes)
    }
}
