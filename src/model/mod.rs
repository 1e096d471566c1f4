pub mod candidate;
pub mod common;
pub mod constituency;
pub mod election;
pub mod party;
pub mod phone;
pub mod sqlite;
pub mod tally;
pub mod user;
pub mod vote;

#[cfg(test)]
pub mod examples;
