//! The command registry: one request line in, one reply line out.
//!
//! A request is `command[;payload]`. Payload fields are comma-separated;
//! multi-record replies join records with `;` and fields with `,`.

use crate::error::Result;
use crate::Backend;

pub use reply::{Reply, ReplyClass};

mod candidates;
mod constituencies;
mod election;
mod parties;
mod payload;
pub mod reply;
mod results;
mod users;
mod voting;

/// Reply to a blank request line.
pub const EMPTY_REQUEST: &str = "ERROR: empty request";
/// Reply to a command name nobody handles.
pub const UNKNOWN_COMMAND: &str = "ERROR: unknown command";

/// Every command the server understands.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Command {
    Ping,
    // Election window
    RegisterElectionTime,
    StopElectionTime,
    GetElectionStatus,
    SelectElectionStopTime,
    // Voting and results
    CastVote,
    GetSeatResults,
    GetPartyResults,
    // Users
    CheckCnic,
    VerifyCnic,
    SignupUser,
    Login,
    UpdatePassword,
    GetUserName,
    GetAllVoters,
    SearchVoterByCnic,
    GetVotersNumber,
    // Constituencies
    GetConstituency,
    AddConstituency,
    // Parties
    RegisterParty,
    GetParties,
    GetAllParties,
    SearchPartyByName,
    GetPartiesCount,
    // Candidates
    CheckCandidate,
    RegisterCandidate,
    GetAllCandidates,
    GetCandidatesBySeat,
    GetCandidatesCount,
}

impl Command {
    pub const ALL: [Command; 29] = [
        Command::Ping,
        Command::RegisterElectionTime,
        Command::StopElectionTime,
        Command::GetElectionStatus,
        Command::SelectElectionStopTime,
        Command::CastVote,
        Command::GetSeatResults,
        Command::GetPartyResults,
        Command::CheckCnic,
        Command::VerifyCnic,
        Command::SignupUser,
        Command::Login,
        Command::UpdatePassword,
        Command::GetUserName,
        Command::GetAllVoters,
        Command::SearchVoterByCnic,
        Command::GetVotersNumber,
        Command::GetConstituency,
        Command::AddConstituency,
        Command::RegisterParty,
        Command::GetParties,
        Command::GetAllParties,
        Command::SearchPartyByName,
        Command::GetPartiesCount,
        Command::CheckCandidate,
        Command::RegisterCandidate,
        Command::GetAllCandidates,
        Command::GetCandidatesBySeat,
        Command::GetCandidatesCount,
    ];

    /// The name clients use on the wire.
    pub fn name(self) -> &'static str {
        match self {
            Command::Ping => "ping",
            Command::RegisterElectionTime => "registerElectionTime",
            Command::StopElectionTime => "stopElectionTime",
            Command::GetElectionStatus => "getElectionStatus",
            Command::SelectElectionStopTime => "selectElectionStopTime",
            Command::CastVote => "castVote",
            Command::GetSeatResults => "getSeatResults",
            Command::GetPartyResults => "getPartyResults",
            Command::CheckCnic => "checkCNIC",
            Command::VerifyCnic => "verifyCNIC",
            Command::SignupUser => "signupUser",
            Command::Login => "login",
            Command::UpdatePassword => "updatePassword",
            Command::GetUserName => "getUserName",
            Command::GetAllVoters => "getAllVoters",
            Command::SearchVoterByCnic => "searchVoterByCnic",
            Command::GetVotersNumber => "getVotersNumber",
            Command::GetConstituency => "getConstituency",
            Command::AddConstituency => "addConstituency",
            Command::RegisterParty => "registerParty",
            Command::GetParties => "getParties",
            Command::GetAllParties => "getAllParties",
            Command::SearchPartyByName => "searchPartyByName",
            Command::GetPartiesCount => "getPartiesCount",
            Command::CheckCandidate => "checkCandidate",
            Command::RegisterCandidate => "registerCandidate",
            Command::GetAllCandidates => "getAllCandidates",
            Command::GetCandidatesBySeat => "getCandidatesBySeat",
            Command::GetCandidatesCount => "getCandidatesCount",
        }
    }

    /// Look up a command by its wire name. Names are case-sensitive.
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|command| command.name() == name)
    }

    async fn handle(self, backend: &Backend, payload: &str) -> Result<Reply> {
        match self {
            Command::Ping => Ok(Reply::new("pong")),
            Command::RegisterElectionTime => election::register_election_time(backend, payload).await,
            Command::StopElectionTime => election::stop_election_time(backend, payload).await,
            Command::GetElectionStatus => election::get_election_status(backend).await,
            Command::SelectElectionStopTime => election::select_election_stop_time(backend).await,
            Command::CastVote => voting::cast_vote(backend, payload).await,
            Command::GetSeatResults => results::get_seat_results(backend, payload).await,
            Command::GetPartyResults => results::get_party_results(backend, payload).await,
            Command::CheckCnic => users::check_cnic(backend, payload).await,
            Command::VerifyCnic => users::verify_cnic(backend, payload).await,
            Command::SignupUser => users::signup_user(backend, payload).await,
            Command::Login => users::login(backend, payload).await,
            Command::UpdatePassword => users::update_password(backend, payload).await,
            Command::GetUserName => users::get_user_name(backend, payload).await,
            Command::GetAllVoters => users::get_all_voters(backend).await,
            Command::SearchVoterByCnic => users::search_voter_by_cnic(backend, payload).await,
            Command::GetVotersNumber => users::get_voters_number(backend).await,
            Command::GetConstituency => constituencies::get_constituency(backend, payload).await,
            Command::AddConstituency => constituencies::add_constituency(backend, payload).await,
            Command::RegisterParty => parties::register_party(backend, payload).await,
            Command::GetParties => parties::get_parties(backend).await,
            Command::GetAllParties => parties::get_all_parties(backend).await,
            Command::SearchPartyByName => parties::search_party_by_name(backend, payload).await,
            Command::GetPartiesCount => parties::get_parties_count(backend).await,
            Command::CheckCandidate => candidates::check_candidate(backend, payload).await,
            Command::RegisterCandidate => candidates::register_candidate(backend, payload).await,
            Command::GetAllCandidates => candidates::get_all_candidates(backend).await,
            Command::GetCandidatesBySeat => candidates::get_candidates_by_seat(backend, payload).await,
            Command::GetCandidatesCount => candidates::get_candidates_count(backend).await,
        }
    }
}

/// Split a request line into its command name and payload.
pub fn split_request(line: &str) -> (&str, &str) {
    let line = line.trim_end_matches(['\r', '\n']);
    match line.split_once(';') {
        Some((name, payload)) => (name.trim(), payload),
        None => (line.trim(), ""),
    }
}

/// Handle one request line. Never fails: every error becomes an `ERROR` reply.
pub async fn dispatch(backend: &Backend, line: &str) -> Reply {
    if line.trim().is_empty() {
        return Reply::new(EMPTY_REQUEST);
    }
    let (name, payload) = split_request(line);
    let Some(command) = Command::parse(name) else {
        return Reply::new(UNKNOWN_COMMAND);
    };
    command
        .handle(backend, payload)
        .await
        .unwrap_or_else(Reply::from)
}
