//! `rusqlite` reports constraint failures through SQLite's extended result
//! codes rather than dedicated error variants. This module fills in the gaps.

use std::os::raw::c_int;

use rusqlite::{ffi, Error as DbError, ErrorCode};

pub const UNIQUE_VIOLATION: c_int = ffi::SQLITE_CONSTRAINT_UNIQUE;
pub const PRIMARY_KEY_VIOLATION: c_int = ffi::SQLITE_CONSTRAINT_PRIMARYKEY;

/// Return true if the given error is a uniqueness (or primary key) violation.
pub fn is_duplicate_key_error(err: &DbError) -> bool {
    if let DbError::SqliteFailure(ref e, _) = *err {
        return e.code == ErrorCode::ConstraintViolation
            && (e.extended_code == UNIQUE_VIOLATION || e.extended_code == PRIMARY_KEY_VIOLATION);
    }
    false
}
