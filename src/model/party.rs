use rusqlite::{params, Connection, Row};

use crate::error::{Error, Result};
use crate::model::sqlite::is_duplicate_key_error;

/// A registered party. Name and symbol are unique ignoring case; the leader
/// may lead only one party.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Party {
    pub name: String,
    pub symbol: String,
    pub leader_cnic: String,
}

impl Party {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            name: row.get(0)?,
            symbol: row.get(1)?,
            leader_cnic: row.get(2)?,
        })
    }

    pub fn insert(&self, conn: &Connection) -> Result<()> {
        conn.execute(
            "INSERT INTO parties (name, symbol, leader_cnic) VALUES (?1, ?2, ?3)",
            params![self.name, self.symbol, self.leader_cnic],
        )
        .map_err(|err| {
            if is_duplicate_key_error(&err) {
                Error::rejected("duplicate")
            } else {
                err.into()
            }
        })?;
        Ok(())
    }

    /// All parties in registration order.
    pub fn registered(conn: &Connection) -> Result<Vec<Self>> {
        Self::query(
            conn,
            "SELECT name, symbol, leader_cnic FROM parties ORDER BY rowid",
            [],
        )
    }

    /// All parties by name.
    pub fn all(conn: &Connection) -> Result<Vec<Self>> {
        Self::query(
            conn,
            "SELECT name, symbol, leader_cnic FROM parties ORDER BY name",
            [],
        )
    }

    /// Parties whose name contains `text`, ignoring case.
    pub fn search(conn: &Connection, text: &str) -> Result<Vec<Self>> {
        let pattern = format!("%{}%", text.trim().to_lowercase());
        Self::query(
            conn,
            "SELECT name, symbol, leader_cnic FROM parties
              WHERE LOWER(name) LIKE ?1 ORDER BY name",
            [pattern],
        )
    }

    pub fn count(conn: &Connection) -> Result<i64> {
        Ok(conn.query_row("SELECT COUNT(*) FROM parties", [], |row| row.get(0))?)
    }

    fn query<P: rusqlite::Params>(conn: &Connection, sql: &str, params: P) -> Result<Vec<Self>> {
        let mut stmt = conn.prepare(sql)?;
        let parties = stmt
            .query_map(params, Self::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(parties)
    }

    /// `name|symbol`, as shown on ballot pickers.
    pub fn label(&self) -> String {
        format!("{}|{}", self.name, self.symbol)
    }

    pub fn record(&self) -> String {
        format!("{},{},{}", self.name, self.symbol, self.leader_cnic)
    }
}
