mod fill_holes;

pub use fill_holes::FillHoles;
