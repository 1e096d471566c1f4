use crate::error::{Error, Result};
use crate::model::{
    candidate::Candidate,
    common::seat::{parse_seat, SeatType},
    constituency::Constituency,
};
use crate::Backend;

use super::{
    payload::{exact_fields, fields},
    reply::{EXISTS, NO_CANDIDATE, NO_SEAT},
    Reply,
};

fn seat_type(raw: &str) -> Result<SeatType> {
    raw.parse()
        .map_err(|_| Error::rejected(format!("bad seat type '{raw}'")))
}

/// `checkCandidate;seatType,seat,partyName`: does the party already field
/// someone on this seat?
pub(super) async fn check_candidate(backend: &Backend, payload: &str) -> Result<Reply> {
    let [raw_type, seat, party] = fields(payload)?;
    let seat_type = seat_type(raw_type)?;
    let (seat, party) = (seat.to_string(), party.to_string());
    let exists = backend
        .store()
        .run(move |conn| Candidate::exists(conn, seat_type, &seat, &party))
        .await?;
    Ok(Reply::new(if exists { EXISTS } else { "OK" }))
}

/// `registerCandidate;cnic,name,seatType,seat,partyName,symbol`
pub(super) async fn register_candidate(backend: &Backend, payload: &str) -> Result<Reply> {
    let [cnic, name, raw_type, seat, party_name, symbol] = exact_fields(payload)?;
    let candidate = Candidate {
        cnic: cnic.to_string(),
        name: name.to_string(),
        seat_type: seat_type(raw_type)?,
        seat: seat.to_string(),
        party_name: party_name.to_string(),
        symbol: symbol.to_string(),
    };
    backend.store().run(move |conn| candidate.insert(conn)).await?;
    Ok(Reply::new("SUCCESS"))
}

/// `getAllCandidates`
pub(super) async fn get_all_candidates(backend: &Backend) -> Result<Reply> {
    let candidates = backend.store().run(|conn| Candidate::all(conn)).await?;
    Ok(Reply::records(candidates.iter().map(Candidate::record)))
}

/// `getCandidatesBySeat;seat`
pub(super) async fn get_candidates_by_seat(backend: &Backend, payload: &str) -> Result<Reply> {
    let (seat_type, seat) = parse_seat(payload).ok_or(Error::BadSeat)?;
    let candidates = backend
        .store()
        .run(move |conn| {
            if !Constituency::has_seat(conn, seat_type, &seat)? {
                return Ok(None);
            }
            Candidate::on_seat(conn, &seat).map(Some)
        })
        .await?;
    Ok(match candidates {
        None => Reply::new(NO_SEAT),
        Some(candidates) => Reply::records_or(candidates.iter().map(Candidate::record), NO_CANDIDATE),
    })
}

/// `getCandidatesCount`
pub(super) async fn get_candidates_count(backend: &Backend) -> Result<Reply> {
    let count = backend.store().run(|conn| Candidate::count(conn)).await?;
    Ok(Reply::new(count.to_string()))
}
