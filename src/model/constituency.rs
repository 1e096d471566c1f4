use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::error::{Error, Result};
use crate::model::{common::seat::SeatType, sqlite::is_duplicate_key_error};

/// A city and the two seats it votes for. Keyed by city code, the first five
/// digits of a resident's CNIC.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Constituency {
    pub city_code: String,
    pub province: String,
    pub division: String,
    pub district: String,
    pub city: String,
    pub seat_na: String,
    pub seat_pp: String,
}

impl Constituency {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            city_code: row.get(0)?,
            province: row.get(1)?,
            division: row.get(2)?,
            district: row.get(3)?,
            city: row.get(4)?,
            seat_na: row.get(5)?,
            seat_pp: row.get(6)?,
        })
    }

    pub fn insert(&self, conn: &Connection) -> Result<()> {
        conn.execute(
            "INSERT INTO constituencies
                 (city_code, province, division, district, city, seat_na, seat_pp)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                self.city_code,
                self.province,
                self.division,
                self.district,
                self.city,
                self.seat_na,
                self.seat_pp,
            ],
        )
        .map_err(|err| {
            if is_duplicate_key_error(&err) {
                Error::rejected("City code exists")
            } else {
                err.into()
            }
        })?;
        Ok(())
    }

    pub fn by_code(conn: &Connection, city_code: &str) -> Result<Option<Self>> {
        Ok(conn
            .query_row(
                "SELECT city_code, province, division, district, city, seat_na, seat_pp
                   FROM constituencies WHERE city_code = ?1",
                [city_code],
                Self::from_row,
            )
            .optional()?)
    }

    /// Does any constituency vote for this seat?
    pub fn has_seat(conn: &Connection, seat_type: SeatType, seat: &str) -> Result<bool> {
        let sql = match seat_type {
            SeatType::NA => "SELECT 1 FROM constituencies WHERE seat_na = ?1 LIMIT 1",
            SeatType::PP => "SELECT 1 FROM constituencies WHERE seat_pp = ?1 LIMIT 1",
        };
        Ok(conn.query_row(sql, [seat], |_| Ok(())).optional()?.is_some())
    }

    /// Everything but the city code, as sent to clients.
    pub fn record(&self) -> String {
        [
            self.province.as_str(),
            &self.division,
            &self.district,
            &self.city,
            &self.seat_na,
            &self.seat_pp,
        ]
        .join(",")
    }
}

#[cfg(test)]
mod tests {
    use crate::model::sqlite::ensure_schema_exists;

    use super::*;

    fn lahore() -> Constituency {
        Constituency {
            city_code: "35202".to_string(),
            province: "Punjab".to_string(),
            division: "Lahore".to_string(),
            district: "Lahore".to_string(),
            city: "Lahore".to_string(),
            seat_na: "NA-1".to_string(),
            seat_pp: "PP-1".to_string(),
        }
    }

    #[test]
    fn insert_and_find() {
        let conn = Connection::open_in_memory().unwrap();
        ensure_schema_exists(&conn).unwrap();

        lahore().insert(&conn).unwrap();
        let found = Constituency::by_code(&conn, "35202").unwrap().unwrap();
        assert_eq!(found, lahore());
        assert_eq!(found.record(), "Punjab,Lahore,Lahore,Lahore,NA-1,PP-1");
        assert_eq!(Constituency::by_code(&conn, "99999").unwrap(), None);

        match lahore().insert(&conn) {
            Err(Error::Rejected(msg)) => assert_eq!(msg, "City code exists"),
            other => panic!("expected rejection, got {other:?}"),
        }

        assert!(Constituency::has_seat(&conn, SeatType::NA, "NA-1").unwrap());
        assert!(Constituency::has_seat(&conn, SeatType::PP, "PP-1").unwrap());
        assert!(!Constituency::has_seat(&conn, SeatType::PP, "NA-1").unwrap());
    }
}
