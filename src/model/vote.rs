use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};

use crate::error::{Error, Result};
use crate::model::{
    common::seat::normalize_seat,
    election::ElectionWindow,
    sqlite::is_duplicate_key_error,
};

/// A single cast vote. Votes are append-only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vote {
    pub window_id: i64,
    pub voter_cnic: String,
    pub seat: String,
    pub candidate_cnic: String,
}

impl Vote {
    /// Record a vote for `candidate_cnic` on `seat` in the currently open window.
    ///
    /// Runs in one write-locking transaction. The `(window, voter, seat)`
    /// uniqueness constraint is the final authority on double voting, so any
    /// number of concurrent identical attempts yields exactly one success.
    pub fn cast(
        conn: &mut Connection,
        voter_cnic: &str,
        seat: &str,
        candidate_cnic: &str,
    ) -> Result<Self> {
        let seat = normalize_seat(seat);
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        // Checked before the window so a bad pairing is reported even when
        // no election is running.
        let on_seat = tx
            .query_row(
                "SELECT 1 FROM candidates WHERE cnic = ?1 AND seat = ?2",
                params![candidate_cnic, seat],
                |_| Ok(()),
            )
            .optional()?
            .is_some();
        if !on_seat {
            return Err(Error::CandidateNotOnSeat);
        }

        let window = ElectionWindow::latest_started(&tx)?.ok_or(Error::NoActiveElection)?;

        let vote = Self {
            window_id: window.id,
            voter_cnic: voter_cnic.to_string(),
            seat,
            candidate_cnic: candidate_cnic.to_string(),
        };
        tx.execute(
            "INSERT INTO votes (window_id, voter_cnic, seat, candidate_cnic)
             VALUES (?1, ?2, ?3, ?4)",
            params![vote.window_id, vote.voter_cnic, vote.seat, vote.candidate_cnic],
        )
        .map_err(|err| {
            if is_duplicate_key_error(&err) {
                Error::AlreadyVoted
            } else {
                err.into()
            }
        })?;
        tx.commit()?;
        Ok(vote)
    }
}
