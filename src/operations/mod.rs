//! Modeling operations, each a command struct executed with `execute()`.

pub mod analysis;
pub mod creation;
pub mod fitting;
pub mod query;
pub mod repair;
pub mod sampling;
pub mod shaping;
pub mod transform;
