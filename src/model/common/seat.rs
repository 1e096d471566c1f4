use std::fmt::{Display, Formatter};
use std::str::FromStr;

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};

/// The two assemblies a seat can belong to.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum SeatType {
    /// National Assembly.
    NA,
    /// Provincial Assembly.
    PP,
}

impl SeatType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NA => "NA",
            Self::PP => "PP",
        }
    }
}

impl Display for SeatType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SeatType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "NA" => Ok(Self::NA),
            "PP" => Ok(Self::PP),
            _ => Err(()),
        }
    }
}

impl ToSql for SeatType {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for SeatType {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|_| FromSqlError::InvalidType)
    }
}

/// Canonical form of a seat code: trimmed and upper-cased, e.g. `na-12` -> `NA-12`.
pub fn normalize_seat(raw: &str) -> String {
    raw.trim().to_ascii_uppercase()
}

/// Parse a seat code of the form `NA-<digits>` or `PP-<digits>`.
/// Returns the assembly and the canonical code.
pub fn parse_seat(raw: &str) -> Option<(SeatType, String)> {
    let seat = normalize_seat(raw);
    let (prefix, number) = seat.split_once('-')?;
    let seat_type = prefix.parse().ok()?;
    if number.is_empty() || !number.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some((seat_type, seat))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn good_seats() {
        assert_eq!(parse_seat("NA-1"), Some((SeatType::NA, "NA-1".to_string())));
        assert_eq!(
            parse_seat(" pp-120 "),
            Some((SeatType::PP, "PP-120".to_string()))
        );
    }

    #[test]
    fn bad_seats() {
        for seat in ["", "NA", "NA-", "NA-1a", "XX-1", "NA1", "-1", "NA--1"] {
            assert_eq!(parse_seat(seat), None, "{seat}");
        }
    }

    #[test]
    fn seat_types() {
        assert_eq!("na".parse::<SeatType>(), Ok(SeatType::NA));
        assert_eq!("PP".parse::<SeatType>(), Ok(SeatType::PP));
        assert!("senate".parse::<SeatType>().is_err());
        assert_eq!(SeatType::PP.to_string(), "PP");
    }
}
