use crate::error::Result;
use crate::model::tally::{PartyTally, SeatTally};
use crate::Backend;

use super::{reply::NO_RESULTS, Reply};

/// `getSeatResults;seat`
pub(super) async fn get_seat_results(backend: &Backend, payload: &str) -> Result<Reply> {
    let seat = payload.trim().to_string();
    let tallies = backend
        .store()
        .run(move |conn| SeatTally::for_seat(conn, &seat))
        .await?;
    Ok(Reply::records_or(tallies.iter().map(SeatTally::record), NO_RESULTS))
}

/// `getPartyResults;partyName`
pub(super) async fn get_party_results(backend: &Backend, payload: &str) -> Result<Reply> {
    let party = payload.trim().to_string();
    let tallies = backend
        .store()
        .run(move |conn| PartyTally::for_party(conn, &party))
        .await?;
    Ok(Reply::records_or(tallies.iter().map(PartyTally::record), NO_RESULTS))
}
