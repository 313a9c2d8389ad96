pub mod error;
pub mod geometry;
pub mod io;
pub mod math;
pub mod mesh;
pub mod operations;
pub mod tessellation;

pub use error::{Result, SweepkitError};
