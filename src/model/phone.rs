use std::{fmt::Display, ops::Deref, str::FromStr};

use phonenumber::{country, Mode, PhoneNumber};
use thiserror::Error;

/// A voter's phone number. Numbers without a country prefix are read as
/// Pakistani, and the number must be valid for its region.
#[derive(Debug, Clone)]
pub struct Phone {
    inner: PhoneNumber,
}

impl Deref for Phone {
    type Target = PhoneNumber;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

#[derive(Debug, Error)]
pub enum PhoneError {
    #[error("bad phone number: {0}")]
    Parse(#[from] phonenumber::ParseError),
    #[error("invalid phone number")]
    Invalid,
}

impl FromStr for Phone {
    type Err = PhoneError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let inner = phonenumber::parse(Some(country::Id::PK), s.trim())?;
        if !phonenumber::is_valid(&inner) {
            return Err(PhoneError::Invalid);
        }
        Ok(Self { inner })
    }
}

/// Formats in E.164, which is how numbers are stored.
impl Display for Phone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.inner.format().mode(Mode::E164).fmt(f)
    }
}

/// Two numbers are equal when they dial the same subscriber, however they
/// were written.
impl PartialEq for Phone {
    fn eq(&self, other: &Self) -> bool {
        self.to_string() == other.to_string()
    }
}

impl Eq for Phone {}
