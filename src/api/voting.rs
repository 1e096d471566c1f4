use crate::error::Result;
use crate::model::vote::Vote;
use crate::Backend;

use super::{payload::fields, Reply};

/// `castVote;voterCnic,seat,candidateCnic`
pub(super) async fn cast_vote(backend: &Backend, payload: &str) -> Result<Reply> {
    let [voter, seat, candidate] = fields(payload)?;
    let (voter, seat, candidate) = (voter.to_string(), seat.to_string(), candidate.to_string());
    let vote = backend
        .store()
        .run(move |conn| Vote::cast(conn, &voter, &seat, &candidate))
        .await?;
    debug!("Vote recorded for {} in window {}", vote.seat, vote.window_id);
    Ok(Reply::new("OK:Vote cast"))
}
