use std::fmt::{Display, Formatter};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};

/// States in the election window lifecycle.
///
/// `Scheduled -> Started -> Finished`, with `Finished` reachable directly
/// from either earlier state by a forced stop.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum WindowStatus {
    /// Registered, voting has not opened yet.
    Scheduled,
    /// Voting is open.
    Started,
    /// Voting has closed; votes are eligible for tallying.
    Finished,
}

impl WindowStatus {
    /// The status a window covering `[start, stop)` has at time `now`.
    pub fn at(start: DateTime<Utc>, stop: DateTime<Utc>, now: DateTime<Utc>) -> Self {
        if now < start {
            Self::Scheduled
        } else if now >= stop {
            Self::Finished
        } else {
            Self::Started
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Scheduled => "Scheduled",
            Self::Started => "Started",
            Self::Finished => "Finished",
        }
    }
}

impl Display for WindowStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WindowStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Scheduled" => Ok(Self::Scheduled),
            "Started" => Ok(Self::Started),
            "Finished" => Ok(Self::Finished),
            _ => Err(()),
        }
    }
}

impl ToSql for WindowStatus {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for WindowStatus {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|_| FromSqlError::InvalidType)
    }
}
