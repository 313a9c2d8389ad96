mod make_pipe;

pub use make_pipe::{MakePipe, SweepParams};
