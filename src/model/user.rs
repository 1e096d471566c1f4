use std::fmt::{Display, Formatter};
use std::str::FromStr;

use rusqlite::{
    params,
    types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef},
    Connection, OptionalExtension, Row,
};

use crate::error::{Error, Result};
use crate::model::{phone::Phone, sqlite::is_duplicate_key_error};

/// What a user may do once logged in.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Role {
    Voter,
    Admin,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Voter => "Voter",
            Self::Admin => "Admin",
        }
    }
}

impl Display for Role {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = ();

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "Voter" => Ok(Self::Voter),
            "Admin" => Ok(Self::Admin),
            _ => Err(()),
        }
    }
}

impl ToSql for Role {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for Role {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|_| FromSqlError::InvalidType)
    }
}

/// Is this a well-formed CNIC, i.e. exactly 13 digits?
pub fn is_valid_cnic(cnic: &str) -> bool {
    cnic.len() == 13 && cnic.bytes().all(|b| b.is_ascii_digit())
}

/// A registered user. Passwords only ever arrive already hashed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub cnic: String,
    pub name: String,
    pub phone: String,
    pub password_hash: String,
    pub province: String,
    pub division: String,
    pub district: String,
    pub city: String,
    pub seat_na: String,
    pub seat_pp: String,
    pub gender: String,
    pub role: Role,
}

const COLUMNS: &str = "cnic, name, phone, password_hash, province, division, district, \
                       city, seat_na, seat_pp, gender, role";

impl User {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            cnic: row.get(0)?,
            name: row.get(1)?,
            phone: row.get(2)?,
            password_hash: row.get(3)?,
            province: row.get(4)?,
            division: row.get(5)?,
            district: row.get(6)?,
            city: row.get(7)?,
            seat_na: row.get(8)?,
            seat_pp: row.get(9)?,
            gender: row.get(10)?,
            role: row.get(11)?,
        })
    }

    /// Validate and normalise a new user's details before insertion.
    pub fn validate(mut self) -> Result<Self> {
        if !is_valid_cnic(&self.cnic) {
            return Err(Error::rejected("CNIC must be 13 digits"));
        }
        let phone: Phone = self
            .phone
            .parse()
            .map_err(|err| Error::rejected(format!("{err}")))?;
        self.phone = phone.to_string();
        Ok(self)
    }

    pub fn insert(&self, conn: &Connection) -> Result<()> {
        conn.execute(
            &format!(
                "INSERT INTO users ({COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)"
            ),
            params![
                self.cnic,
                self.name,
                self.phone,
                self.password_hash,
                self.province,
                self.division,
                self.district,
                self.city,
                self.seat_na,
                self.seat_pp,
                self.gender,
                self.role,
            ],
        )
        .map_err(|err| {
            if is_duplicate_key_error(&err) {
                Error::rejected("CNIC already registered")
            } else {
                err.into()
            }
        })?;
        Ok(())
    }

    /// Create the configured admin account unless that CNIC already exists.
    pub fn ensure_admin(conn: &Connection, cnic: &str, password_hash: &str) -> Result<bool> {
        let created = conn.execute(
            &format!(
                "INSERT OR IGNORE INTO users ({COLUMNS})
                 VALUES (?1, 'Administrator', '', ?2, '', '', '', '', '', '', '', ?3)"
            ),
            params![cnic, password_hash, Role::Admin],
        )?;
        Ok(created == 1)
    }

    pub fn exists(conn: &Connection, cnic: &str) -> Result<bool> {
        Ok(conn
            .query_row("SELECT 1 FROM users WHERE cnic = ?1", [cnic], |_| Ok(()))
            .optional()?
            .is_some())
    }

    pub fn by_cnic(conn: &Connection, cnic: &str) -> Result<Option<Self>> {
        Ok(conn
            .query_row(
                &format!("SELECT {COLUMNS} FROM users WHERE cnic = ?1"),
                [cnic],
                Self::from_row,
            )
            .optional()?)
    }

    /// The role of the user with these credentials, if they match.
    pub fn login(conn: &Connection, cnic: &str, password_hash: &str) -> Result<Option<Role>> {
        Ok(conn
            .query_row(
                "SELECT role FROM users WHERE cnic = ?1 AND password_hash = ?2",
                [cnic, password_hash],
                |row| row.get(0),
            )
            .optional()?)
    }

    /// Returns whether a user with that CNIC existed.
    pub fn update_password(conn: &Connection, cnic: &str, password_hash: &str) -> Result<bool> {
        let updated = conn.execute(
            "UPDATE users SET password_hash = ?1 WHERE cnic = ?2",
            [password_hash, cnic],
        )?;
        Ok(updated == 1)
    }

    /// All voters by name. Admins are never listed.
    pub fn voters(conn: &Connection) -> Result<Vec<Self>> {
        let mut stmt = conn.prepare(&format!(
            "SELECT {COLUMNS} FROM users WHERE role = ?1 ORDER BY name"
        ))?;
        let users = stmt
            .query_map([Role::Voter], Self::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(users)
    }

    pub fn voter_by_cnic(conn: &Connection, cnic: &str) -> Result<Option<Self>> {
        Ok(Self::by_cnic(conn, cnic)?.filter(|user| user.role == Role::Voter))
    }

    pub fn voter_count(conn: &Connection) -> Result<i64> {
        Ok(conn.query_row(
            "SELECT COUNT(*) FROM users WHERE role = ?1",
            [Role::Voter],
            |row| row.get(0),
        )?)
    }

    /// Summary shown in voter listings.
    pub fn record(&self) -> String {
        format!(
            "{},{},{},{},{}",
            self.cnic, self.name, self.phone, self.city, self.role
        )
    }

    /// Summary plus the voter's two seats.
    pub fn detail_record(&self) -> String {
        format!("{},{},{}", self.record(), self.seat_na, self.seat_pp)
    }
}
