mod bspline;
mod circle;
mod line;

pub use bspline::PeriodicBSpline;
pub(crate) use bspline::PeriodicKnots;
pub use circle::Circle;
pub use line::Line;

use crate::error::{GeometryError, Result};
use crate::math::{Point3, Vector3, TOLERANCE};

/// Parameter domain for a curve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurveDomain {
    /// Start of the parameter range.
    pub t_min: f64,
    /// End of the parameter range.
    pub t_max: f64,
}

impl CurveDomain {
    /// Creates a new curve domain.
    #[must_use]
    pub fn new(t_min: f64, t_max: f64) -> Self {
        Self { t_min, t_max }
    }

    /// Width of the parameter range.
    #[must_use]
    pub fn span(&self) -> f64 {
        self.t_max - self.t_min
    }

    /// Returns `true` if both ends of the range are finite.
    #[must_use]
    pub fn is_bounded(&self) -> bool {
        self.t_min.is_finite() && self.t_max.is_finite()
    }

    /// Maps `t` into `[t_min, t_max)` by whole periods.
    #[must_use]
    pub fn wrap(&self, t: f64) -> f64 {
        let span = self.span();
        let wrapped = (t - self.t_min).rem_euclid(span) + self.t_min;
        // rem_euclid can round up to exactly `span`.
        if wrapped >= self.t_max {
            self.t_min
        } else {
            wrapped
        }
    }
}

/// Trait for parametric curves in 3D space.
pub trait Curve {
    /// Evaluates the curve at parameter `t`, returning the 3D point.
    ///
    /// # Errors
    ///
    /// Returns an error if the parameter is out of range or evaluation fails.
    fn evaluate(&self, t: f64) -> Result<Point3>;

    /// Computes the first derivative `dC/dt` at parameter `t`.
    ///
    /// # Errors
    ///
    /// Returns an error if the parameter is out of range or evaluation fails.
    fn derivative(&self, t: f64) -> Result<Vector3>;

    /// Computes the unit tangent vector at parameter `t`.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::DegenerateTangent`] if the derivative vanishes.
    fn tangent(&self, t: f64) -> Result<Vector3> {
        let d = self.derivative(t)?;
        let len = d.norm();
        if len < TOLERANCE {
            return Err(GeometryError::DegenerateTangent(t).into());
        }
        Ok(d / len)
    }

    /// Returns the parameter domain of the curve.
    fn domain(&self) -> CurveDomain;

    /// Returns whether the curve is closed.
    fn is_closed(&self) -> bool;

    /// Returns whether the parameter domain wraps around.
    ///
    /// A periodic curve is closed and joins its start with matching
    /// derivatives, so sweeps treat it as seamless.
    fn is_periodic(&self) -> bool {
        false
    }
}
