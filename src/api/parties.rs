use crate::error::Result;
use crate::model::party::Party;
use crate::Backend;

use super::{payload::exact_fields, reply::NO_MATCH, Reply};

/// `registerParty;name,symbol,leaderCnic`
pub(super) async fn register_party(backend: &Backend, payload: &str) -> Result<Reply> {
    let [name, symbol, leader_cnic] = exact_fields(payload)?;
    let party = Party {
        name: name.to_string(),
        symbol: symbol.to_string(),
        leader_cnic: leader_cnic.to_string(),
    };
    backend.store().run(move |conn| party.insert(conn)).await?;
    Ok(Reply::new("SUCCESS"))
}

/// `getParties`: `name|symbol` pairs in registration order.
pub(super) async fn get_parties(backend: &Backend) -> Result<Reply> {
    let parties = backend.store().run(|conn| Party::registered(conn)).await?;
    Ok(Reply::records(parties.iter().map(Party::label)))
}

/// `getAllParties`
pub(super) async fn get_all_parties(backend: &Backend) -> Result<Reply> {
    let parties = backend.store().run(|conn| Party::all(conn)).await?;
    Ok(Reply::records(parties.iter().map(Party::record)))
}

/// `searchPartyByName;text`
pub(super) async fn search_party_by_name(backend: &Backend, payload: &str) -> Result<Reply> {
    let text = payload.to_string();
    let parties = backend
        .store()
        .run(move |conn| Party::search(conn, &text))
        .await?;
    Ok(Reply::records_or(parties.iter().map(Party::record), NO_MATCH))
}

/// `getPartiesCount`
pub(super) async fn get_parties_count(backend: &Backend) -> Result<Reply> {
    let count = backend.store().run(|conn| Party::count(conn)).await?;
    Ok(Reply::new(count.to_string()))
}
