mod errors;
mod schema;
mod store;

pub use errors::{is_duplicate_key_error, PRIMARY_KEY_VIOLATION, UNIQUE_VIOLATION};
pub use schema::ensure_schema_exists;
pub use store::Store;
