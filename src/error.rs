use r2d2::Error as PoolError;
use rusqlite::Error as DbError;
use thiserror::Error;
use tokio::task::JoinError;

use crate::api::Reply;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Db(#[from] DbError),
    #[error(transparent)]
    Pool(#[from] PoolError),
    #[error("Store task failed: {0}")]
    Join(#[from] JoinError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("bad format")]
    BadFormat,
    #[error("request too long")]
    RequestTooLong,
    #[error("bad field count")]
    BadFieldCount,
    #[error("bad timestamp '{0}'")]
    BadTimestamp(String),
    #[error("bad seat format")]
    BadSeat,
    #[error("Stop time must be after start time")]
    InvalidWindow,
    #[error("No active window.")]
    NoActiveWindow,
    #[error("No active election")]
    NoActiveElection,
    #[error("Candidate not on seat")]
    CandidateNotOnSeat,
    #[error("Already voted")]
    AlreadyVoted,
    #[error("{0}")]
    Rejected(String),
}

impl Error {
    pub fn rejected(msg: impl Into<String>) -> Self {
        Self::Rejected(msg.into())
    }
}

/// Every failure reaches the wire as a single `ERROR...` line.
impl From<Error> for Reply {
    fn from(err: Error) -> Self {
        match err {
            // The stop reply has always carried a space after the colon.
            Error::NoActiveWindow => Reply::new(format!("ERROR: {err}")),
            Error::Db(_) | Error::Pool(_) | Error::Join(_) | Error::Io(_) => {
                error!("Store failure: {err}");
                Reply::new(format!("ERROR:{err}"))
            }
            _ => Reply::new(format!("ERROR:{err}")),
        }
    }
}
