mod sample_helix;

pub use sample_helix::{HelixParams, SampleHelix};
