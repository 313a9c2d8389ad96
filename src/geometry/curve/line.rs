use crate::error::{GeometryError, Result};
use crate::math::{Point3, Vector3, TOLERANCE};

use super::{Curve, CurveDomain};

/// A line defined by an origin point and a unit direction vector.
///
/// The parametric form is `P(t) = origin + t * direction`, so `t` is arc
/// length. [`Line::new`] gives an infinite line; [`Line::segment`] bounds the
/// domain to `[0, length]`, which is what a sweep spine needs.
#[derive(Debug, Clone)]
pub struct Line {
    origin: Point3,
    direction: Vector3,
    domain: CurveDomain,
}

impl Line {
    /// Creates a new infinite line from an origin and direction.
    ///
    /// # Errors
    ///
    /// Returns an error if the direction vector is zero-length.
    pub fn new(origin: Point3, direction: Vector3) -> Result<Self> {
        let len = direction.norm();
        if len < TOLERANCE {
            return Err(GeometryError::ZeroVector.into());
        }
        Ok(Self {
            origin,
            direction: direction / len,
            domain: CurveDomain::new(f64::NEG_INFINITY, f64::INFINITY),
        })
    }

    /// Creates the bounded segment from `start` to `end`.
    ///
    /// # Errors
    ///
    /// Returns an error if the two points coincide.
    pub fn segment(start: Point3, end: Point3) -> Result<Self> {
        let delta = end - start;
        let len = delta.norm();
        if len < TOLERANCE {
            return Err(GeometryError::Degenerate("segment endpoints coincide".into()).into());
        }
        Ok(Self {
            origin: start,
            direction: delta / len,
            domain: CurveDomain::new(0.0, len),
        })
    }

    /// Returns the origin point of the line.
    #[must_use]
    pub fn origin(&self) -> &Point3 {
        &self.origin
    }

    /// Returns the unit direction vector of the line.
    #[must_use]
    pub fn direction(&self) -> &Vector3 {
        &self.direction
    }
}

impl Curve for Line {
    fn evaluate(&self, t: f64) -> Result<Point3> {
        Ok(self.origin + self.direction * t)
    }

    fn derivative(&self, _t: f64) -> Result<Vector3> {
        Ok(self.direction)
    }

    fn domain(&self) -> CurveDomain {
        self.domain
    }

    fn is_closed(&self) -> bool {
        false
    }
}
