//! Wire-level value types shared across the model.

pub mod seat;
pub mod time;
