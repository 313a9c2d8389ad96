mod wall_thickness;

pub use wall_thickness::{ThicknessMap, ThicknessParams, WallThickness};
