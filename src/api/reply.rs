use std::fmt::{Display, Formatter};

pub const NO_RESULTS: &str = "NO_RESULTS";
pub const NOT_FOUND: &str = "NOT_FOUND";
pub const NO_MATCH: &str = "NO_MATCH";
pub const DUPLICATE: &str = "DUPLICATE";
pub const NO_SEAT: &str = "NO_SEAT";
pub const NO_CANDIDATE: &str = "NO_CANDIDATE";
pub const EXISTS: &str = "EXISTS";
pub const INVALID: &str = "INVALID";
pub const NONE: &str = "NONE";

/// Replies that report a domain outcome rather than a success or a failure.
const SENTINELS: [&str; 9] = [
    NO_RESULTS,
    NOT_FOUND,
    NO_MATCH,
    DUPLICATE,
    NO_SEAT,
    NO_CANDIDATE,
    EXISTS,
    INVALID,
    NONE,
];

/// Broad kind of a reply, used for logging.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ReplyClass {
    Success,
    Sentinel,
    Error,
}

/// The single line written back to a client. Never contains a newline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply(String);

impl Reply {
    pub fn new(text: impl Into<String>) -> Self {
        let mut text = text.into();
        if text.contains(['\r', '\n']) {
            text = text.replace(['\r', '\n'], " ");
        }
        Self(text)
    }

    /// Join records with `;`. An empty listing is an empty line.
    pub fn records<I>(records: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        Self::new(records.into_iter().collect::<Vec<_>>().join(";"))
    }

    /// Join records with `;`, or reply with `sentinel` if there are none.
    pub fn records_or<I>(records: I, sentinel: &str) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let reply = Self::records(records);
        if reply.0.is_empty() {
            Self::new(sentinel)
        } else {
            reply
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_error(&self) -> bool {
        self.0.starts_with("ERROR")
    }

    pub fn class(&self) -> ReplyClass {
        if self.is_error() {
            ReplyClass::Error
        } else if SENTINELS.contains(&self.0.as_str()) {
            ReplyClass::Sentinel
        } else {
            ReplyClass::Success
        }
    }
}

impl Display for Reply {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Reply {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

impl From<String> for Reply {
    fn from(text: String) -> Self {
        Self::new(text)
    }
}
