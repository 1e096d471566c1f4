//! Example reference data for tests.

use rusqlite::Connection;

use crate::error::Result;
use crate::model::{
    candidate::Candidate,
    common::seat::SeatType,
    constituency::Constituency,
    party::Party,
    user::{Role, User},
};

pub const VOTER_CNIC: &str = "3520212345671";
pub const VOTER_NAME: &str = "Ayesha Khan";
pub const ADMIN_CNIC: &str = "3520299999991";
pub const PASSWORD_HASH: &str = "5e884898da28047151d0e56f8dc62927";
pub const C1_NAME: &str = "Imran Ali";
pub const C2_NAME: &str = "Sana Malik";
pub const C3_NAME: &str = "Omar Farooq";

impl Constituency {
    pub fn example() -> Self {
        Self {
            city_code: "35202".to_string(),
            province: "Punjab".to_string(),
            division: "Lahore".to_string(),
            district: "Lahore".to_string(),
            city: "Lahore".to_string(),
            seat_na: "NA-1".to_string(),
            seat_pp: "PP-1".to_string(),
        }
    }
}

impl Party {
    pub fn example1() -> Self {
        Self {
            name: "Alpha".to_string(),
            symbol: "Arrow".to_string(),
            leader_cnic: "3520200000001".to_string(),
        }
    }

    pub fn example2() -> Self {
        Self {
            name: "Beta".to_string(),
            symbol: "Book".to_string(),
            leader_cnic: "3520200000002".to_string(),
        }
    }
}

impl Candidate {
    /// `C1` and `C2` stand for `NA-1`; `C3` stands for `PP-1`.
    pub fn examples() -> Vec<Self> {
        let candidate = |cnic: &str, name: &str, seat_type: SeatType, seat: &str, party: &Party| Self {
            cnic: cnic.to_string(),
            name: name.to_string(),
            seat_type,
            seat: seat.to_string(),
            party_name: party.name.clone(),
            symbol: party.symbol.clone(),
        };
        vec![
            candidate("C1", C1_NAME, SeatType::NA, "NA-1", &Party::example1()),
            candidate("C2", C2_NAME, SeatType::NA, "NA-1", &Party::example2()),
            candidate("C3", C3_NAME, SeatType::PP, "PP-1", &Party::example1()),
        ]
    }
}

impl User {
    pub fn example_voter() -> Self {
        Self {
            cnic: VOTER_CNIC.to_string(),
            name: VOTER_NAME.to_string(),
            phone: "+923001234567".to_string(),
            password_hash: PASSWORD_HASH.to_string(),
            province: "Punjab".to_string(),
            division: "Lahore".to_string(),
            district: "Lahore".to_string(),
            city: "Lahore".to_string(),
            seat_na: "NA-1".to_string(),
            seat_pp: "PP-1".to_string(),
            gender: "Female".to_string(),
            role: Role::Voter,
        }
    }
}

/// Load one constituency, two parties, three candidates, a voter and an admin.
pub fn seed(conn: &Connection) -> Result<()> {
    Constituency::example().insert(conn)?;
    Party::example1().insert(conn)?;
    Party::example2().insert(conn)?;
    for candidate in Candidate::examples() {
        candidate.insert(conn)?;
    }
    User::example_voter().insert(conn)?;
    User::ensure_admin(conn, ADMIN_CNIC, PASSWORD_HASH)?;
    Ok(())
}
