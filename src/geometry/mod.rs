pub mod curve;

pub use curve::{Circle, Curve, CurveDomain, Line, PeriodicBSpline};
